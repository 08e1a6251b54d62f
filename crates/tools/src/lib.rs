//! Developer tooling: read-only inspection of a particle field.
//!
//! # Invariants
//! - Inspection never mutates the field it looks at.

pub mod inspector;

pub use inspector::{FieldSummary, ParticleInfo, ParticleInspector};
