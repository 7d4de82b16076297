//! SQLite-backed cache namespaces.
//!
//! This module provides the persistent store behind the engine, using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - One namespace per generation, with a ready flag set after seeding
//! - Request-keyed entries (SHA-256 of method and URL)
//! - Cascading namespace deletion
//! - Automatic schema migrations

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod namespaces;
pub mod storage;

pub use crate::Error;

pub use connection::CacheDb;
pub use namespaces::NamespaceSummary;
pub use storage::CacheStorage;
