//! Pointer input: raw viewport-relative offsets smoothed once per frame.
//!
//! # Invariants
//! - Event handlers write only the raw offset; only the frame tick writes the
//!   smoothed offset.
//! - With the raw offset held constant, the smoothed offset approaches it
//!   monotonically and never overshoots.

pub mod pointer;

pub use pointer::{InputTracker, PointerState};
