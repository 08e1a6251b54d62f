use aurum_common::ConfigError;

use crate::LoopState;

/// Errors surfaced by the render loop and its backends.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The host cannot provide a render-capable surface. Fatal at init.
    #[error("render capability missing: {0}")]
    CapabilityMissing(String),
    #[error("cannot {action} while {state:?}")]
    InvalidTransition {
        state: LoopState,
        action: &'static str,
    },
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },
    /// A single frame could not be produced; the next tick tries again.
    #[error("frame skipped: {0}")]
    Frame(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
