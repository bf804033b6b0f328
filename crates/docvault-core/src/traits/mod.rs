//! Traits for the external collaborators of the document store.
//!
//! Authorization decisions and notification fan-out are explicitly outside
//! this system; they appear here only as seams ([`access::AccessOracle`],
//! [`notify::EventSink`]). Object storage is the one collaborator DocVault
//! ships implementations for, behind [`storage::ObjectStore`].

pub mod access;
pub mod notify;
pub mod storage;
