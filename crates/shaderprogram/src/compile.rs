use std::rc::Rc;

use crate::error::ProgramError;
use crate::gpu::{Device, GpuContext};
use crate::types::ShaderStage;

/// A single successfully compiled shader stage.
///
/// Only ever observable in the compiled state: a failed compile releases the
/// device object and returns [`ProgramError::Compile`]. The device shader is
/// deleted when the unit drops; a program it was linked into keeps working.
pub struct CompiledUnit<D: Device> {
    context: Rc<GpuContext<D>>,
    stage: ShaderStage,
    shader: D::Shader,
}

impl<D: Device> CompiledUnit<D> {
    pub fn compile(
        context: &Rc<GpuContext<D>>,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self, ProgramError> {
        let device = context.device();
        let shader = device
            .create_shader(stage)
            .map_err(|log| ProgramError::Compile { stage, log })?;
        let unit = Self {
            context: Rc::clone(context),
            stage,
            shader,
        };

        device.shader_source(shader, source);
        device.compile_shader(shader);
        if !device.shader_compile_status(shader) {
            let log = device.shader_info_log(shader);
            return Err(ProgramError::Compile { stage, log });
        }

        tracing::debug!(%stage, bytes = source.len(), "compiled shader stage");
        Ok(unit)
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn handle(&self) -> D::Shader {
        self.shader
    }
}

impl<D: Device> Drop for CompiledUnit<D> {
    fn drop(&mut self) {
        self.context.device().delete_shader(self.shader);
    }
}
