//! Tags domain module
//!
//! Tags are free-form labels attached to garages, bikes, sections and parts
//! through `tagged_items`.
//!
//! # Architecture
//!
//! - **Entities**: `Tag`, `NewTag`, `TaggedItem`, `TagItems`
//! - **Repository**: `TagRepository` for the tag catalogue
//! - **Index**: `TagIndex` for AND-filter resolution and associations
//!
//! # Example
//!
//! ```ignore
//! use motominder_core::domain::item::{ItemRef, ItemType};
//! use motominder_core::domain::tags::{NewTag, TagIndex, TagRepository};
//!
//! let winter = TagRepository::new(&db).create(&NewTag::new("winter")).await?;
//! let index = TagIndex::new(&db);
//! index.assign(winter.id, ItemRef::Bike(bike_id), None).await?;
//!
//! let ids = index
//!     .resolve_ids_with_all_tags(ItemType::Bike, &["winter"])
//!     .await?;
//! ```

pub mod entity;
pub mod index;
pub mod repository;

pub use entity::{
    DEFAULT_TAG_COLOR, GroupedItems, NewTag, Tag, TagAssignment, TagItems, TaggedItem,
};
pub use index::{TagIndex, unique_names};
pub use repository::TagRepository;
