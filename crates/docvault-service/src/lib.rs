//! # docvault-service
//!
//! Business logic services for DocVault. Each service orchestrates the
//! repositories, the object store, the permission oracle, and the event
//! dispatcher for one slice of the domain:
//!
//! - [`folder`] — folder CRUD, path propagation (rename/move cascades with
//!   post-commit object relocation), and subtree stats.
//! - [`document`] — uploads and version history, downloads, move/copy/
//!   delete, and streaming ZIP export.
//! - [`sweep`] — best-effort storage operations and the deferred repair
//!   queue for the ones that fail after their metadata committed.

pub mod access;
pub mod context;
pub mod document;
pub mod folder;
pub mod naming;
pub mod notify;
pub mod sweep;
