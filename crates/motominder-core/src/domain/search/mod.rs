//! Search domain module
//!
//! Tag-filtered, multi-kind text search over garages, bikes, sections and
//! parts.
//!
//! # Architecture
//!
//! - **Entities**: `SearchQuery`, `SearchResults` and the per-kind hits
//! - **Repository**: `SearchRepository` for the parameterized text queries
//! - **Service**: `SearchService` composing tag filter, text match and tag
//!   enrichment
//!
//! # Example
//!
//! ```ignore
//! use motominder_core::domain::search::{SearchQuery, SearchService};
//!
//! let service = SearchService::new(db.clone());
//!
//! // Parts mentioning "chain" that are tagged both "winter" and "order"
//! let query = SearchQuery::new("chain")
//!     .with_tag_list("winter,order")
//!     .with_type("part");
//! let results = service.search(&query).await?;
//! ```

pub mod entity;
pub mod repository;
pub mod repository_trait;
pub mod service;

// Re-export main types
pub use entity::{BikeHit, GarageHit, PartHit, SearchHit, SearchQuery, SearchResults, SectionHit};
pub use repository::{SearchRepository, like_pattern};
pub use repository_trait::SearchRepositoryTrait;
pub use service::SearchService;
