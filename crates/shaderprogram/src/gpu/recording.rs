//! Headless [`Device`] that records state-changing commands.
//!
//! Compile and link outcomes are derived from the GLSL declarations in the
//! submitted sources, which is enough to exercise channel resolution, absent
//! channels, and interface mismatches without a GPU. The scanner understands
//! one declaration per line (`in vec4 vs_Pos;`, `layout(location = 0) out
//! vec4 fs_Nor;`, `uniform mat4 u_Model;`, GLSL 1.00 `attribute`/`varying`).
//! Queries are not recorded. Misuse that a real driver would flag with
//! `GL_INVALID_OPERATION` is collected in [`RecordingDevice::errors`].

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use crate::types::{ShaderStage, Topology};

use super::device::Device;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    CreateShader { shader: u32, stage: ShaderStage },
    ShaderSource { shader: u32 },
    CompileShader { shader: u32 },
    DeleteShader { shader: u32 },
    CreateProgram { program: u32 },
    AttachShader { program: u32, shader: u32 },
    LinkProgram { program: u32 },
    DeleteProgram { program: u32 },
    UseProgram { program: Option<u32> },
    UniformMatrix4 { name: String, value: [f32; 16] },
    Uniform4f { name: String, value: [f32; 4] },
    Uniform3f { name: String, value: [f32; 3] },
    Uniform1f { name: String, value: f32 },
    Uniform1i { name: String, value: i32 },
    EnableVertexAttribArray { index: u32 },
    DisableVertexAttribArray { index: u32 },
    VertexAttribPointer {
        index: u32,
        size: i32,
        stride: i32,
        offset: i32,
    },
    DrawElements { topology: Topology, count: u32 },
    /// Free-form entry written by callers through [`RecordingDevice::mark`].
    Marker { label: String },
}

impl Command {
    pub fn is_uniform_write(&self) -> bool {
        matches!(
            self,
            Command::UniformMatrix4 { .. }
                | Command::Uniform4f { .. }
                | Command::Uniform3f { .. }
                | Command::Uniform1f { .. }
                | Command::Uniform1i { .. }
        )
    }
}

/// Uniform location handed out by [`RecordingDevice`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedLocation {
    pub program: u32,
    pub name: String,
}

#[derive(Default)]
struct Declarations {
    inputs: Vec<String>,
    outputs: Vec<String>,
    uniforms: Vec<String>,
}

struct ShaderRecord {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct ProgramRecord {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    attributes: Vec<String>,
    uniforms: Vec<String>,
}

#[derive(Default)]
struct State {
    next_handle: u32,
    free_programs: Vec<u32>,
    shaders: HashMap<u32, ShaderRecord>,
    programs: HashMap<u32, ProgramRecord>,
    active: Option<u32>,
    enabled: BTreeSet<u32>,
    commands: Vec<Command>,
    errors: Vec<String>,
}

impl State {
    fn allocate(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    fn check_location(&mut self, location: &RecordedLocation) {
        if self.active != Some(location.program) {
            self.errors.push(format!(
                "uniform '{}' of program {} written while {:?} is active",
                location.name, location.program, self.active
            ));
        }
    }
}

#[derive(Default)]
pub struct RecordingDevice {
    state: RefCell<State>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.state.borrow().commands.clone()
    }

    pub fn take_commands(&self) -> Vec<Command> {
        std::mem::take(&mut self.state.borrow_mut().commands)
    }

    pub fn uniform_writes(&self) -> Vec<Command> {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|command| command.is_uniform_write())
            .cloned()
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Command) -> bool) -> usize {
        self.state
            .borrow()
            .commands
            .iter()
            .filter(|command| predicate(command))
            .count()
    }

    pub fn mark(&self, label: impl Into<String>) {
        self.state.borrow_mut().commands.push(Command::Marker {
            label: label.into(),
        });
    }

    pub fn bound_program(&self) -> Option<u32> {
        self.state.borrow().active
    }

    pub fn is_attrib_enabled(&self, index: u32) -> bool {
        self.state.borrow().enabled.contains(&index)
    }

    pub fn enabled_attributes(&self) -> Vec<u32> {
        self.state.borrow().enabled.iter().copied().collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }

    fn push(&self, command: Command) {
        self.state.borrow_mut().commands.push(command);
    }

    fn write_uniform(&self, location: &RecordedLocation, command: Command) {
        let mut state = self.state.borrow_mut();
        state.check_location(location);
        state.commands.push(command);
    }
}

impl Device for RecordingDevice {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = RecordedLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let shader = state.allocate();
        state.shaders.insert(
            shader,
            ShaderRecord {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        state.commands.push(Command::CreateShader { shader, stage });
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.shaders.get_mut(&shader) {
            record.source = source.to_owned();
        }
        state.commands.push(Command::ShaderSource { shader });
    }

    fn compile_shader(&self, shader: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.shaders.get_mut(&shader) {
            if record.source.contains("void main") {
                record.compiled = true;
                record.log.clear();
            } else {
                record.compiled = false;
                record.log = "ERROR: 0:1: 'main' : function not defined".into();
            }
        }
        state.commands.push(Command::CompileShader { shader });
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|record| record.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|record| record.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        // Attached shaders stay alive until their program goes away.
        self.push(Command::DeleteShader { shader });
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let program = match state.free_programs.pop() {
            Some(recycled) => recycled,
            None => state.allocate(),
        };
        state.programs.insert(program, ProgramRecord::default());
        state.commands.push(Command::CreateProgram { program });
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.programs.get_mut(&program) {
            record.attached.push(shader);
        }
        state.commands.push(Command::AttachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        let attached = state
            .programs
            .get(&program)
            .map(|record| record.attached.clone())
            .unwrap_or_default();
        let outcome = link_interface(&state.shaders, &attached);
        if let Some(record) = state.programs.get_mut(&program) {
            match outcome {
                Ok((attributes, uniforms)) => {
                    record.linked = true;
                    record.log.clear();
                    record.attributes = attributes;
                    record.uniforms = uniforms;
                }
                Err(log) => {
                    record.linked = false;
                    record.log = log;
                    record.attributes.clear();
                    record.uniforms.clear();
                }
            }
        }
        state.commands.push(Command::LinkProgram { program });
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|record| record.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|record| record.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program).is_some() {
            state.free_programs.push(program);
        }
        // GL keeps a deleted program installed until another one replaces it,
        // but the name is free for reuse immediately.
        state.commands.push(Command::DeleteProgram { program });
    }

    fn use_program(&self, program: Option<u32>) {
        let mut state = self.state.borrow_mut();
        if let Some(handle) = program {
            let linked = state
                .programs
                .get(&handle)
                .is_some_and(|record| record.linked);
            if !linked {
                state
                    .errors
                    .push(format!("use_program({handle}) on an unlinked program"));
            }
        }
        state.active = program;
        state.commands.push(Command::UseProgram { program });
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        let record = state.programs.get(&program)?;
        record
            .attributes
            .iter()
            .position(|attribute| attribute == name)
            .and_then(|index| u32::try_from(index).ok())
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<RecordedLocation> {
        let state = self.state.borrow();
        let record = state.programs.get(&program)?;
        record
            .uniforms
            .iter()
            .any(|uniform| uniform == name)
            .then(|| RecordedLocation {
                program,
                name: name.to_owned(),
            })
    }

    fn uniform_matrix_4(&self, location: &RecordedLocation, value: &[f32; 16]) {
        self.write_uniform(
            location,
            Command::UniformMatrix4 {
                name: location.name.clone(),
                value: *value,
            },
        );
    }

    fn uniform_4_f32(&self, location: &RecordedLocation, value: [f32; 4]) {
        self.write_uniform(
            location,
            Command::Uniform4f {
                name: location.name.clone(),
                value,
            },
        );
    }

    fn uniform_3_f32(&self, location: &RecordedLocation, value: [f32; 3]) {
        self.write_uniform(
            location,
            Command::Uniform3f {
                name: location.name.clone(),
                value,
            },
        );
    }

    fn uniform_1_f32(&self, location: &RecordedLocation, value: f32) {
        self.write_uniform(
            location,
            Command::Uniform1f {
                name: location.name.clone(),
                value,
            },
        );
    }

    fn uniform_1_i32(&self, location: &RecordedLocation, value: i32) {
        self.write_uniform(
            location,
            Command::Uniform1i {
                name: location.name.clone(),
                value,
            },
        );
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        let mut state = self.state.borrow_mut();
        state.enabled.insert(index);
        state
            .commands
            .push(Command::EnableVertexAttribArray { index });
    }

    fn disable_vertex_attrib_array(&self, index: u32) {
        let mut state = self.state.borrow_mut();
        state.enabled.remove(&index);
        state
            .commands
            .push(Command::DisableVertexAttribArray { index });
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        self.push(Command::VertexAttribPointer {
            index,
            size,
            stride,
            offset,
        });
    }

    fn draw_elements_u32(&self, topology: Topology, count: u32) {
        let mut state = self.state.borrow_mut();
        if state.active.is_none() {
            state.errors.push("draw_elements with no active program".into());
        }
        state
            .commands
            .push(Command::DrawElements { topology, count });
    }
}

/// Resolves the attribute and uniform tables of a program, or the link log.
fn link_interface(
    shaders: &HashMap<u32, ShaderRecord>,
    attached: &[u32],
) -> Result<(Vec<String>, Vec<String>), String> {
    if attached.is_empty() {
        return Err("error: no shaders attached to program".into());
    }

    let mut attributes = Vec::new();
    let mut uniforms: Vec<String> = Vec::new();
    let mut vertex_outputs = Vec::new();
    let mut fragment_inputs = Vec::new();

    for handle in attached {
        let record = shaders
            .get(handle)
            .ok_or_else(|| format!("error: shader {handle} does not exist"))?;
        if !record.compiled {
            return Err(format!(
                "error: attached {} shader {handle} is not compiled",
                record.stage.label()
            ));
        }
        let declarations = scan_declarations(record.stage, &record.source);
        match record.stage {
            ShaderStage::Vertex => {
                attributes.extend(declarations.inputs);
                vertex_outputs.extend(declarations.outputs);
            }
            ShaderStage::Fragment => fragment_inputs.extend(declarations.inputs),
        }
        for uniform in declarations.uniforms {
            if !uniforms.contains(&uniform) {
                uniforms.push(uniform);
            }
        }
    }

    if let Some(missing) = fragment_inputs
        .iter()
        .find(|input| !vertex_outputs.contains(input))
    {
        return Err(format!(
            "error: fragment shader input '{missing}' is not written by the vertex shader"
        ));
    }

    Ok((attributes, uniforms))
}

fn scan_declarations(stage: ShaderStage, source: &str) -> Declarations {
    const MODIFIERS: [&str; 8] = [
        "flat",
        "smooth",
        "noperspective",
        "centroid",
        "invariant",
        "highp",
        "mediump",
        "lowp",
    ];

    let mut declarations = Declarations::default();
    for line in source.lines() {
        let line = line.split("//").next().unwrap_or_default().trim();
        let line = match line.strip_prefix("layout") {
            Some(rest) => match rest.find(')') {
                Some(close) => rest[close + 1..].trim_start(),
                None => continue,
            },
            None => line,
        };

        let tokens: Vec<&str> = line
            .split_whitespace()
            .filter(|token| !MODIFIERS.contains(token))
            .collect();
        let [qualifier, _ty, name, ..] = tokens.as_slice() else {
            continue;
        };
        let name = name.trim_end_matches(';');
        let name = name.split('[').next().unwrap_or(name);
        if !is_identifier(name) {
            continue;
        }

        let slot = match (stage, *qualifier) {
            (_, "uniform") => &mut declarations.uniforms,
            (ShaderStage::Vertex, "in" | "attribute") => &mut declarations.inputs,
            (ShaderStage::Vertex, "out" | "varying") => &mut declarations.outputs,
            (ShaderStage::Fragment, "in" | "varying") => &mut declarations.inputs,
            (ShaderStage::Fragment, "out") => &mut declarations.outputs,
            _ => continue,
        };
        slot.push(name.to_owned());
    }
    declarations
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(first) if first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scanner_reads_modern_and_legacy_declarations() {
        let vertex = scan_declarations(
            ShaderStage::Vertex,
            r"#version 300 es
layout(location = 0) in vec4 vs_Pos;
attribute vec4 vs_Nor; // legacy
uniform highp mat4 u_Model;
flat out vec4 fs_Col;
uniform float u_Weights[4];
uniform Block {
",
        );
        assert_eq!(vertex.inputs, vec!["vs_Pos", "vs_Nor"]);
        assert_eq!(vertex.outputs, vec!["fs_Col"]);
        assert_eq!(vertex.uniforms, vec!["u_Model", "u_Weights"]);

        let fragment = scan_declarations(
            ShaderStage::Fragment,
            "precision highp float;\nin vec4 fs_Col;\nout vec4 out_Col;\n",
        );
        assert_eq!(fragment.inputs, vec!["fs_Col"]);
        assert_eq!(fragment.outputs, vec!["out_Col"]);
        assert!(fragment.uniforms.is_empty());
    }

    #[test]
    fn recycles_deleted_program_names() {
        let device = RecordingDevice::new();
        let first = device.create_program().unwrap();
        device.delete_program(first);
        let second = device.create_program().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn flags_uniform_write_against_inactive_program() {
        let device = RecordingDevice::new();
        let location = RecordedLocation {
            program: 7,
            name: "u_Time".into(),
        };
        device.uniform_1_f32(&location, 1.0);
        assert_eq!(device.errors().len(), 1);
    }
}
