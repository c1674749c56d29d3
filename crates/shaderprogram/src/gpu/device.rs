use std::fmt::Debug;

use crate::types::{ShaderStage, Topology};

/// Primitive operations the program layer issues against a graphics device.
///
/// Implementations wrap a single device context and are driven from one
/// rendering thread. Location queries return `None` when the linked program
/// does not expose the requested name; that outcome is never an error.
pub trait Device {
    type Shader: Copy + Debug;
    type Program: Copy + Eq + Debug;
    type UniformLocation: Clone + Debug;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;
    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation>;

    /// Uploads a column-major 4×4 matrix.
    fn uniform_matrix_4(&self, location: &Self::UniformLocation, value: &[f32; 16]);
    fn uniform_4_f32(&self, location: &Self::UniformLocation, value: [f32; 4]);
    fn uniform_3_f32(&self, location: &Self::UniformLocation, value: [f32; 3]);
    fn uniform_1_f32(&self, location: &Self::UniformLocation, value: f32);
    fn uniform_1_i32(&self, location: &Self::UniformLocation, value: i32);

    fn enable_vertex_attrib_array(&self, index: u32);
    fn disable_vertex_attrib_array(&self, index: u32);
    /// Describes the currently bound array buffer as `size` floats per vertex.
    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32);

    /// Indexed draw over the bound element buffer: `u32` indices from offset zero.
    fn draw_elements_u32(&self, topology: Topology, count: u32);
}
