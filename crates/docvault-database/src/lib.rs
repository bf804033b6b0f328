//! # docvault-database
//!
//! PostgreSQL connection management, migrations, and repository
//! implementations for DocVault. Repositories own a pool clone and expose
//! typed async methods; multi-row structural mutations (subtree path
//! rewrites, version allocation) run inside a single transaction so the
//! metadata side can never be left half-rewritten.

pub mod connection;
pub mod migration;
pub mod repositories;
