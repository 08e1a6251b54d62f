//! wgpu render backend for the particle field.
//!
//! Each particle is drawn as a small camera-facing quad, instanced from the
//! position buffer, with additive or alpha blending and no depth buffer.
//!
//! # Invariants
//! - The backend never reads or writes field state; it only draws frames.
//! - GPU buffers are destroyed once, on release.

mod gpu;
mod shaders;

pub use gpu::{WgpuHost, WgpuSurface};
