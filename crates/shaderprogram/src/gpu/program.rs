use std::rc::Rc;

use crate::compile::CompiledUnit;
use crate::error::ProgramError;
use crate::types::VERTEX_COMPONENTS;

use super::channels::{Attribute, Uniform};
use super::context::GpuContext;
use super::device::Device;
use super::drawable::Drawable;

/// A linked shader program with every channel resolved up front.
///
/// Channel locations are looked up exactly once, in [`GpuProgram::link`].
/// A channel the shader does not expose is stored as `None`; its setter then
/// returns without touching the device.
pub struct GpuProgram<D: Device> {
    pub(super) context: Rc<GpuContext<D>>,
    program: D::Program,
    attributes: [Option<u32>; Attribute::COUNT],
    pub(super) uniforms: [Option<D::UniformLocation>; Uniform::COUNT],
}

impl<D: Device> GpuProgram<D> {
    /// Attaches `units`, links them, and resolves all channels.
    ///
    /// The units may be dropped once this returns; the device keeps the
    /// compiled code inside the linked program.
    pub fn link(
        context: &Rc<GpuContext<D>>,
        units: &[CompiledUnit<D>],
    ) -> Result<Self, ProgramError> {
        let device = context.device();
        let program = device
            .create_program()
            .map_err(|log| ProgramError::Link { log })?;
        let mut linked = Self {
            context: Rc::clone(context),
            program,
            attributes: [None; Attribute::COUNT],
            uniforms: std::array::from_fn(|_| None),
        };

        for unit in units {
            device.attach_shader(program, unit.handle());
        }
        device.link_program(program);
        if !device.program_link_status(program) {
            let log = device.program_info_log(program);
            return Err(ProgramError::Link { log });
        }

        linked.resolve_channels();
        Ok(linked)
    }

    fn resolve_channels(&mut self) {
        let device = self.context.device();
        for attribute in Attribute::ALL {
            let location = device.attrib_location(self.program, attribute.name());
            if location.is_none() {
                tracing::trace!(channel = attribute.name(), "attribute absent");
            }
            self.attributes[attribute.index()] = location;
        }
        for uniform in Uniform::ALL {
            let location = device.uniform_location(self.program, uniform.name());
            if location.is_none() {
                tracing::trace!(channel = uniform.name(), "uniform absent");
            }
            self.uniforms[uniform.index()] = location;
        }

        tracing::debug!(
            program = ?self.program,
            attributes = self.attributes.iter().flatten().count(),
            uniforms = self.uniforms.iter().flatten().count(),
            "linked program and resolved channels"
        );
    }

    pub fn handle(&self) -> D::Program {
        self.program
    }

    pub fn context(&self) -> &Rc<GpuContext<D>> {
        &self.context
    }

    pub fn attribute_location(&self, attribute: Attribute) -> Option<u32> {
        self.attributes[attribute.index()]
    }

    pub fn has_uniform(&self, uniform: Uniform) -> bool {
        self.uniforms[uniform.index()].is_some()
    }

    /// Activates this program unless it is already the active one.
    pub fn use_program(&self) {
        self.context.activate(self.program);
    }

    /// Binds the geometry's position and normal streams, then issues one
    /// indexed draw.
    ///
    /// A stream is enabled only when the shader reads it and the geometry
    /// supplies it. Afterwards every attribute slot this program owns is
    /// disabled again, whether or not it was enabled for this draw.
    pub fn draw<G: Drawable<D> + ?Sized>(&self, geometry: &G) {
        self.use_program();
        let device = self.context.device();

        let position = self.attribute_location(Attribute::Position);
        let normal = self.attribute_location(Attribute::Normal);

        if let Some(index) = position {
            if geometry.bind_position(device) {
                enable_stream(device, index);
            }
        }
        if let Some(index) = normal {
            if geometry.bind_normal(device) {
                enable_stream(device, index);
            }
        }

        geometry.bind_index(device);
        device.draw_elements_u32(geometry.topology(), geometry.element_count());

        for index in [position, normal].into_iter().flatten() {
            device.disable_vertex_attrib_array(index);
        }
    }
}

fn enable_stream<D: Device>(device: &D, index: u32) {
    device.enable_vertex_attrib_array(index);
    device.vertex_attrib_pointer_f32(index, VERTEX_COMPONENTS, 0, 0);
}

impl<D: Device> Drop for GpuProgram<D> {
    fn drop(&mut self) {
        self.context.release(self.program);
        self.context.device().delete_program(self.program);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{Command, RecordingDevice};
    use crate::types::{ShaderStage, Topology};

    const VERTEX: &str = r"#version 300 es
in vec4 vs_Pos;
in vec4 vs_Nor;
in vec4 vs_Col;
uniform mat4 u_Model;
uniform mat4 u_ViewProj;
out vec4 fs_Nor;
void main() {
    fs_Nor = vs_Nor;
    gl_Position = u_ViewProj * u_Model * vs_Pos;
}
";

    const FRAGMENT: &str = r"#version 300 es
precision highp float;
uniform vec4 u_Color;
in vec4 fs_Nor;
out vec4 out_Col;
void main() {
    out_Col = u_Color;
}
";

    const POSITION_ONLY: &str = r"#version 300 es
in vec4 vs_Pos;
uniform mat4 u_ViewProj;
void main() {
    gl_Position = u_ViewProj * vs_Pos;
}
";

    const PLAIN_FRAGMENT: &str = r"#version 300 es
precision highp float;
out vec4 out_Col;
void main() {
    out_Col = vec4(1.0);
}
";

    struct Mesh {
        positions: bool,
        normals: bool,
        topology: Topology,
        count: u32,
    }

    impl Drawable<RecordingDevice> for Mesh {
        fn bind_position(&self, device: &RecordingDevice) -> bool {
            device.mark("bind position");
            self.positions
        }

        fn bind_normal(&self, device: &RecordingDevice) -> bool {
            device.mark("bind normal");
            self.normals
        }

        fn bind_index(&self, device: &RecordingDevice) {
            device.mark("bind index");
        }

        fn topology(&self) -> Topology {
            self.topology
        }

        fn element_count(&self) -> u32 {
            self.count
        }
    }

    fn context() -> Rc<GpuContext<RecordingDevice>> {
        Rc::new(GpuContext::new(RecordingDevice::new()))
    }

    fn build(
        context: &Rc<GpuContext<RecordingDevice>>,
        vertex: &str,
        fragment: &str,
    ) -> GpuProgram<RecordingDevice> {
        let units = [
            CompiledUnit::compile(context, ShaderStage::Vertex, vertex).unwrap(),
            CompiledUnit::compile(context, ShaderStage::Fragment, fragment).unwrap(),
        ];
        GpuProgram::link(context, &units).expect("link")
    }

    fn marker(label: &str) -> Command {
        Command::Marker {
            label: label.into(),
        }
    }

    #[test]
    fn resolves_declared_channels_only() {
        let context = context();
        let program = build(&context, VERTEX, FRAGMENT);

        assert_eq!(program.attribute_location(Attribute::Position), Some(0));
        assert_eq!(program.attribute_location(Attribute::Normal), Some(1));
        assert_eq!(program.attribute_location(Attribute::Color), Some(2));
        assert!(program.has_uniform(Uniform::Model));
        assert!(program.has_uniform(Uniform::ViewProj));
        assert!(program.has_uniform(Uniform::Color));
        assert!(!program.has_uniform(Uniform::Time));
        assert!(!program.has_uniform(Uniform::ModelInvTr));
    }

    #[test]
    fn link_does_not_activate_program() {
        let context = context();
        let _program = build(&context, VERTEX, FRAGMENT);
        assert_eq!(context.active_program(), None);
        assert_eq!(
            context
                .device()
                .count(|c| matches!(c, Command::UseProgram { .. })),
            0
        );
    }

    #[test]
    fn mismatched_interface_fails_to_link_and_releases_program() {
        let context = context();
        let units = [
            CompiledUnit::compile(&context, ShaderStage::Vertex, POSITION_ONLY).unwrap(),
            CompiledUnit::compile(&context, ShaderStage::Fragment, FRAGMENT).unwrap(),
        ];
        let err = GpuProgram::link(&context, &units)
            .err()
            .expect("fs_Nor is never written");

        assert!(matches!(&err, ProgramError::Link { log } if log.contains("fs_Nor")));
        let device = context.device();
        let created = device.commands().iter().find_map(|c| match c {
            Command::CreateProgram { program } => Some(*program),
            _ => None,
        });
        let program = created.expect("program object was allocated");
        assert_eq!(
            device.commands().last(),
            Some(&Command::DeleteProgram { program })
        );
        assert_eq!(context.active_program(), None);
    }

    #[test]
    fn use_program_binds_once_per_switch() {
        let context = context();
        let first = build(&context, VERTEX, FRAGMENT);
        let second = build(&context, POSITION_ONLY, PLAIN_FRAGMENT);
        let device = context.device();
        device.take_commands();

        first.use_program();
        first.use_program();
        first.use_program();
        assert_eq!(
            device.take_commands(),
            vec![Command::UseProgram {
                program: Some(first.handle())
            }]
        );

        second.use_program();
        first.use_program();
        first.use_program();
        assert_eq!(
            device.take_commands(),
            vec![
                Command::UseProgram {
                    program: Some(second.handle())
                },
                Command::UseProgram {
                    program: Some(first.handle())
                },
            ]
        );
        assert_eq!(context.active_program(), Some(first.handle()));
        assert_eq!(device.bound_program(), context.active_program());
    }

    #[test]
    fn recycled_handle_is_rebound_after_drop() {
        let context = context();
        let first = build(&context, VERTEX, FRAGMENT);
        first.use_program();
        let handle = first.handle();
        drop(first);
        assert_eq!(context.active_program(), None);

        let second = build(&context, VERTEX, FRAGMENT);
        assert_eq!(second.handle(), handle);
        context.device().take_commands();
        second.use_program();
        assert_eq!(
            context.device().take_commands(),
            vec![Command::UseProgram {
                program: Some(handle)
            }]
        );
        assert_eq!(context.device().bound_program(), context.active_program());
    }

    #[test]
    fn draw_binds_streams_and_restores_attribute_state() {
        let context = context();
        let program = build(&context, VERTEX, FRAGMENT);
        let device = context.device();
        device.take_commands();

        program.draw(&Mesh {
            positions: true,
            normals: true,
            topology: Topology::Triangles,
            count: 36,
        });

        assert_eq!(
            device.take_commands(),
            vec![
                Command::UseProgram {
                    program: Some(program.handle())
                },
                marker("bind position"),
                Command::EnableVertexAttribArray { index: 0 },
                Command::VertexAttribPointer {
                    index: 0,
                    size: 4,
                    stride: 0,
                    offset: 0
                },
                marker("bind normal"),
                Command::EnableVertexAttribArray { index: 1 },
                Command::VertexAttribPointer {
                    index: 1,
                    size: 4,
                    stride: 0,
                    offset: 0
                },
                marker("bind index"),
                Command::DrawElements {
                    topology: Topology::Triangles,
                    count: 36
                },
                Command::DisableVertexAttribArray { index: 0 },
                Command::DisableVertexAttribArray { index: 1 },
            ]
        );
        assert!(device.enabled_attributes().is_empty());
        assert!(device.errors().is_empty());
    }

    #[test]
    fn draw_without_normal_stream_leaves_normal_slot_disabled() {
        let context = context();
        let program = build(&context, VERTEX, FRAGMENT);
        let device = context.device();
        device.take_commands();

        program.draw(&Mesh {
            positions: true,
            normals: false,
            topology: Topology::TriangleStrip,
            count: 4,
        });

        let commands = device.take_commands();
        assert!(commands.contains(&Command::EnableVertexAttribArray { index: 0 }));
        assert!(!commands.contains(&Command::EnableVertexAttribArray { index: 1 }));
        assert!(commands.contains(&marker("bind index")));
        assert_eq!(
            commands
                .iter()
                .filter(|c| matches!(c, Command::DrawElements { .. }))
                .collect::<Vec<_>>(),
            vec![&Command::DrawElements {
                topology: Topology::TriangleStrip,
                count: 4
            }]
        );
        assert!(commands.contains(&Command::DisableVertexAttribArray { index: 1 }));
        assert!(!device.is_attrib_enabled(0));
        assert!(!device.is_attrib_enabled(1));
    }

    #[test]
    fn draw_skips_streams_the_shader_does_not_read() {
        let context = context();
        let program = build(&context, POSITION_ONLY, PLAIN_FRAGMENT);
        let device = context.device();
        device.take_commands();

        program.draw(&Mesh {
            positions: true,
            normals: true,
            topology: Topology::Lines,
            count: 2,
        });

        let commands = device.take_commands();
        assert!(!commands.contains(&marker("bind normal")));
        assert_eq!(
            commands
                .iter()
                .filter(|c| matches!(c, Command::EnableVertexAttribArray { .. }))
                .count(),
            1
        );
        assert!(device.enabled_attributes().is_empty());
    }

    #[test]
    fn draw_never_enables_color_stream() {
        let context = context();
        let program = build(&context, VERTEX, FRAGMENT);
        let color = program
            .attribute_location(Attribute::Color)
            .expect("vs_Col is declared");
        context.device().take_commands();

        program.draw(&Mesh {
            positions: true,
            normals: true,
            topology: Topology::Triangles,
            count: 3,
        });

        let commands = context.device().take_commands();
        assert!(!commands.contains(&Command::EnableVertexAttribArray { index: color }));
        assert!(!commands.contains(&Command::DisableVertexAttribArray { index: color }));
    }

    #[test]
    fn draw_without_position_stream_still_issues_draw() {
        let context = context();
        let program = build(&context, VERTEX, FRAGMENT);
        let device = context.device();
        device.take_commands();

        program.draw(&Mesh {
            positions: false,
            normals: false,
            topology: Topology::Points,
            count: 9,
        });

        let commands = device.take_commands();
        assert_eq!(
            commands
                .iter()
                .filter(|c| matches!(c, Command::EnableVertexAttribArray { .. }))
                .count(),
            0
        );
        assert!(commands.contains(&Command::DrawElements {
            topology: Topology::Points,
            count: 9
        }));
        assert!(commands.contains(&Command::DisableVertexAttribArray { index: 0 }));
        assert!(commands.contains(&Command::DisableVertexAttribArray { index: 1 }));
        assert!(!device.is_attrib_enabled(0));
        assert!(!device.is_attrib_enabled(1));
    }

    #[test]
    fn draws_a_mixed_list_of_geometry_through_trait_objects() {
        let context = context();
        let program = build(&context, VERTEX, FRAGMENT);
        let device = context.device();
        device.take_commands();

        let scene: Vec<Box<dyn Drawable<RecordingDevice>>> = vec![
            Box::new(Mesh {
                positions: true,
                normals: true,
                topology: Topology::Triangles,
                count: 6,
            }),
            Box::new(Mesh {
                positions: true,
                normals: false,
                topology: Topology::TriangleStrip,
                count: 4,
            }),
        ];
        for geometry in &scene {
            program.draw(&**geometry);
        }

        let draws: Vec<Command> = device
            .take_commands()
            .into_iter()
            .filter(|c| matches!(c, Command::DrawElements { .. }))
            .collect();
        assert_eq!(
            draws,
            vec![
                Command::DrawElements {
                    topology: Topology::Triangles,
                    count: 6
                },
                Command::DrawElements {
                    topology: Topology::TriangleStrip,
                    count: 4
                },
            ]
        );
        assert!(device.enabled_attributes().is_empty());
    }
}
