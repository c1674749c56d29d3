use thiserror::Error;

use crate::types::ShaderStage;

/// Failures that abort program construction. Both carry the device's
/// diagnostic log; the object being built is released before the error is
/// returned.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },
    #[error("program failed to link: {log}")]
    Link { log: String },
}

impl ProgramError {
    pub fn log(&self) -> &str {
        match self {
            ProgramError::Compile { log, .. } | ProgramError::Link { log } => log,
        }
    }
}
