//! Repository trait for search persistence
//!
//! Abstracts the per-kind text queries and the tag lookups the search
//! service composes.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};

use crate::domain::item::ItemType;
use crate::domain::tags::Tag;
use crate::error::Result;

use super::entity::{BikeHit, GarageHit, PartHit, SectionHit};

/// Repository trait for search persistence
///
/// Every `search_*` method matches `text` case-insensitively against the
/// kind's text columns (empty `text` matches everything) and, when `ids` is
/// given, keeps only rows whose ID is in it.
#[async_trait]
pub trait SearchRepositoryTrait: Send + Sync {
    // ========== Text queries ==========

    /// Garages by name and notes
    async fn search_garages(
        &self,
        text: &str,
        ids: Option<&BTreeSet<i64>>,
    ) -> Result<Vec<GarageHit>>;

    /// Bikes by make, model, VIN and notes
    async fn search_bikes(&self, text: &str, ids: Option<&BTreeSet<i64>>) -> Result<Vec<BikeHit>>;

    /// Sections by name, description and notes
    async fn search_sections(
        &self,
        text: &str,
        ids: Option<&BTreeSet<i64>>,
    ) -> Result<Vec<SectionHit>>;

    /// Parts by name, description, notes, part number and supplier
    async fn search_parts(&self, text: &str, ids: Option<&BTreeSet<i64>>) -> Result<Vec<PartHit>>;

    // ========== Tags ==========

    /// IDs of items of `item_type` carrying every name in `tag_names`
    async fn ids_with_all_tags(
        &self,
        item_type: ItemType,
        tag_names: &[String],
    ) -> Result<BTreeSet<i64>>;

    /// Tags of many items of one kind, keyed by item ID
    async fn tags_for_items(
        &self,
        item_type: ItemType,
        item_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Tag>>>;
}
