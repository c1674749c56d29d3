//! Typed setters, one per uniform channel.
//!
//! Each setter activates the program first, so interleaving calls across
//! programs always writes into the right one. Every setter checks its own
//! channel; an absent channel makes the call a no-op beyond activation.

use glam::{Mat4, Vec3, Vec4};

use super::channels::Uniform;
use super::device::Device;
use super::program::GpuProgram;

impl<D: Device> GpuProgram<D> {
    fn write_uniform(&self, uniform: Uniform, write: impl FnOnce(&D, &D::UniformLocation)) {
        self.use_program();
        match &self.uniforms[uniform.index()] {
            Some(location) => write(self.context.device(), location),
            None => tracing::trace!(channel = uniform.name(), "uniform absent; write skipped"),
        }
    }

    /// Sets `u_Model` and derives `u_ModelInvTr` from it.
    ///
    /// The inverse-transpose is only computed when the shader reads it.
    pub fn set_model_matrix(&self, model: &Mat4) {
        self.write_uniform(Uniform::Model, |device, location| {
            device.uniform_matrix_4(location, &model.to_cols_array());
        });
        self.write_uniform(Uniform::ModelInvTr, |device, location| {
            let inverse_transpose = model.transpose().inverse();
            device.uniform_matrix_4(location, &inverse_transpose.to_cols_array());
        });
    }

    pub fn set_view_proj_matrix(&self, view_proj: &Mat4) {
        self.write_uniform(Uniform::ViewProj, |device, location| {
            device.uniform_matrix_4(location, &view_proj.to_cols_array());
        });
    }

    pub fn set_geometry_color(&self, color: Vec4) {
        self.write_uniform(Uniform::Color, |device, location| {
            device.uniform_4_f32(location, color.to_array());
        });
    }

    pub fn set_time(&self, time: f32) {
        self.write_uniform(Uniform::Time, |device, location| {
            device.uniform_1_f32(location, time);
        });
    }

    pub fn set_heights_info(&self, heights_info: Vec4) {
        self.write_uniform(Uniform::HeightsInfo, |device, location| {
            device.uniform_4_f32(location, heights_info.to_array());
        });
    }

    pub fn set_camera_position(&self, position: Vec3) {
        self.write_uniform(Uniform::CameraPosition, |device, location| {
            device.uniform_3_f32(location, position.to_array());
        });
    }

    /// Selects which shading path the shader takes (`u_Shader`).
    pub fn set_shader_variant(&self, variant: i32) {
        self.write_uniform(Uniform::ShaderVariant, |device, location| {
            device.uniform_1_i32(location, variant);
        });
    }

    pub fn set_octaves(&self, octaves: i32) {
        self.write_uniform(Uniform::Octaves, |device, location| {
            device.uniform_1_i32(location, octaves);
        });
    }

    pub fn set_bias(&self, bias: f32) {
        self.write_uniform(Uniform::Bias, |device, location| {
            device.uniform_1_f32(location, bias);
        });
    }

    pub fn set_frequency(&self, frequency: f32) {
        self.write_uniform(Uniform::Frequency, |device, location| {
            device.uniform_1_f32(location, frequency);
        });
    }

    pub fn set_terrain_height(&self, height: f32) {
        self.write_uniform(Uniform::Height, |device, location| {
            device.uniform_1_f32(location, height);
        });
    }

    pub fn set_speed(&self, speed: f32) {
        self.write_uniform(Uniform::Speed, |device, location| {
            device.uniform_1_f32(location, speed);
        });
    }
}
