//! Device-facing half of the crate.
//!
//! - `device` is the seam: the primitive GL-style operations the program
//!   layer needs, implemented by `gl::GlDevice` for real contexts and by
//!   `recording::RecordingDevice` for headless runs.
//! - `context` owns a device plus the active-program slot shared by every
//!   program built on it.
//! - `channels` is the fixed attribute/uniform vocabulary.
//! - `program` links units, resolves channels, and drives draws.
//! - `uniforms` holds the typed per-channel setters.
//! - `drawable` is the geometry provider consumed by `draw`.

mod channels;
mod context;
mod device;
mod drawable;
mod gl;
mod program;
mod recording;
mod uniforms;

pub use channels::{Attribute, Uniform};
pub use context::GpuContext;
pub use device::Device;
pub use drawable::Drawable;
pub use gl::GlDevice;
pub use program::GpuProgram;
pub use recording::{Command, RecordedLocation, RecordingDevice};
