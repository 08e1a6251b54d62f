//! Render loop for the particle field, independent of any graphics API.
//!
//! A [`RenderLoop`] owns a [`RenderContext`]: the acquired surface, the
//! particle buffers, the camera and the material. Backends plug in through
//! [`SurfaceHost`] and [`FrameSurface`]; hosts drive frames through
//! [`FrameScheduler`].
//!
//! # Invariants
//! - The loop moves `Uninitialized -> Running -> Disposed` and never back.
//! - Only a tick mutates particle positions, camera state and the smoothed
//!   pointer offset.
//! - Surface resources are released exactly once, on dispose or drop.
//! - No tick is requested after dispose returns.

mod camera;
mod context;
mod error;
mod headless;
mod render_loop;
mod surface;

pub use camera::{CameraRig, FieldPose};
pub use context::RenderContext;
pub use error::RenderError;
pub use headless::{HeadlessHost, HeadlessProbe, HeadlessRecord, HeadlessSurface};
pub use render_loop::{LoopState, LoopStats, RenderLoop, TickOutcome};
pub use surface::{
    Frame, FrameScheduler, FrameSurface, PointMaterial, SurfaceHost, SurfaceSize, SurfaceSpec,
};
