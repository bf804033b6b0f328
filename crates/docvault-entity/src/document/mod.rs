//! Document entities.

pub mod model;
pub mod version;

pub use model::{CreateDocument, Document, DocumentLocation};
pub use version::DocumentVersion;
