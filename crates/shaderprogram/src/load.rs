//! Builds programs from an on-disk [`ProgramManifest`].

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use glam::{Vec3, Vec4};
use programconfig::{ProgramManifest, UniformDefaults};

use crate::compile::CompiledUnit;
use crate::gpu::{Device, GpuContext, GpuProgram};
use crate::types::ShaderStage;

pub fn load_manifest(path: &Path) -> Result<ProgramManifest> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read program manifest at {}", path.display()))?;
    ProgramManifest::from_toml_str(&raw)
        .with_context(|| format!("failed to load program manifest at {}", path.display()))
}

/// Compiles every stage listed in `manifest`, links them, and pushes the
/// manifest's uniform defaults. Relative stage paths resolve against
/// `base_dir`. The manifest is validated first, so a hand-built one that
/// breaks the manifest rules is rejected before any device object exists.
pub fn build_program<D: Device>(
    context: &Rc<GpuContext<D>>,
    manifest: &ProgramManifest,
    base_dir: &Path,
) -> Result<GpuProgram<D>> {
    manifest.validate()?;

    let mut units = Vec::with_capacity(manifest.stages.len());
    for entry in &manifest.stages {
        let stage = ShaderStage::from(entry.kind);
        let path = base_dir.join(&entry.path);
        let source = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {stage} shader at {}", path.display()))?;
        let unit = CompiledUnit::compile(context, stage, &source)
            .with_context(|| format!("failed to compile shader at {}", path.display()))?;
        units.push(unit);
    }

    let program = GpuProgram::link(context, &units).context("failed to link program")?;
    drop(units);

    if !manifest.uniforms.is_empty() {
        apply_uniform_defaults(&program, &manifest.uniforms);
    }
    Ok(program)
}

/// Convenience wrapper: loads the manifest at `path` and builds it with
/// stage paths relative to the manifest's directory.
pub fn build_program_from_path<D: Device>(
    context: &Rc<GpuContext<D>>,
    path: &Path,
) -> Result<GpuProgram<D>> {
    let manifest = load_manifest(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    build_program(context, &manifest, base_dir)
}

pub fn apply_uniform_defaults<D: Device>(program: &GpuProgram<D>, defaults: &UniformDefaults) {
    if let Some(color) = defaults.color {
        program.set_geometry_color(Vec4::from_array(color));
    }
    if let Some(heights_info) = defaults.heights_info {
        program.set_heights_info(Vec4::from_array(heights_info));
    }
    if let Some(position) = defaults.camera_position {
        program.set_camera_position(Vec3::from_array(position));
    }
    if let Some(time) = defaults.time {
        program.set_time(time);
    }
    if let Some(variant) = defaults.shader_variant {
        program.set_shader_variant(variant);
    }
    if let Some(octaves) = defaults.octaves {
        program.set_octaves(octaves);
    }
    if let Some(bias) = defaults.bias {
        program.set_bias(bias);
    }
    if let Some(frequency) = defaults.frequency {
        program.set_frequency(frequency);
    }
    if let Some(height) = defaults.terrain_height {
        program.set_terrain_height(height);
    }
    if let Some(speed) = defaults.speed {
        program.set_speed(speed);
    }
}
