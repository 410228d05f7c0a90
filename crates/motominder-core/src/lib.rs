//! MotoMinder Core Library
//!
//! This crate provides the core functionality for MotoMinder, including:
//! - Storage (SQLite pool, versioned migrations)
//! - Commands (garage, bike, section, part and maintenance repositories)
//! - Tag catalogue and the tag index with AND semantics
//! - Tag-filtered multi-kind search
//! - API boundary types (response envelope, detail views, health)
//! - Configuration with file persistence

pub mod api;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Error, ErrorKind, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::domain::item::{ItemRef, ItemType};
    pub use crate::domain::search::{SearchQuery, SearchResults, SearchService};
    pub use crate::domain::tags::{TagIndex, TagRepository};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::storage::Database;
}
