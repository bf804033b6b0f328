//! Folder entities.

pub mod model;

pub use model::{CreateFolder, Folder, OwnerType};
