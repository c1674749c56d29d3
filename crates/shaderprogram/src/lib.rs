//! Shader program binding layer for the terrain renderer.
//!
//! Shader stages are compiled into [`CompiledUnit`]s, linked into a
//! [`GpuProgram`], and fed per-frame values through typed setters before
//! geometry is drawn:
//!
//! ```text
//!   CompiledUnit::compile ──▶ GpuProgram::link ──▶ set_* (uniforms)
//!                                  │                     │
//!                                  │ resolve channels    └─▶ GpuContext::activate
//!                                  ▼                              │
//!                        [attribute; uniform] tables     use_program (deduplicated)
//!                                  │
//!                                  └─▶ draw(Drawable) ──▶ draw_elements
//! ```
//!
//! Every program built on one [`GpuContext`] shares its active-program slot,
//! so switching back and forth between programs only re-binds when the active
//! one actually changes. The channel vocabulary in [`Attribute`] and
//! [`Uniform`] is fixed; shaders may leave any of it out.
//!
//! All of this is single-threaded by construction: contexts are shared through
//! `Rc` and never cross threads.

mod compile;
mod error;
mod gpu;
mod load;
mod types;

pub use compile::CompiledUnit;
pub use error::ProgramError;
pub use gpu::{
    Attribute, Command, Device, Drawable, GlDevice, GpuContext, GpuProgram, RecordedLocation,
    RecordingDevice, Uniform,
};
pub use load::{apply_uniform_defaults, build_program, build_program_from_path, load_manifest};
pub use programconfig::{ConfigError, ProgramManifest, StageEntry, StageKind, UniformDefaults};
pub use types::{ShaderStage, Topology, VERTEX_COMPONENTS};
