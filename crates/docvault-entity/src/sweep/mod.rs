//! Deferred storage-repair entities.

pub mod model;

pub use model::{SweepKind, SweepTask};
