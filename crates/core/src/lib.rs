//! Core of swcache: an offline-first request interception engine.
//!
//! This crate provides:
//! - The engine and its lifecycle (setup, promotion, interception)
//! - Request routing and the caching strategies
//! - Cache namespaces with a SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod request;
pub mod response;
pub mod router;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheDb, CacheStorage, NamespaceSummary};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, Lifecycle, PromoteReport, ResponseFuture, SetupReport};
pub use error::Error;
pub use fetch::Fetcher;
pub use request::{Request, RequestMode};
pub use response::{Response, ResponseKind};
pub use router::Route;
