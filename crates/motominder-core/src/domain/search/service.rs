//! Search service for orchestrating multi-kind search
//!
//! For each kind in scope: resolve the tag filter to an ID set, run the text
//! query restricted to it, then attach every hit's tags.

use super::entity::{SearchHit, SearchQuery, SearchResults};
use super::repository::SearchRepository;
use super::repository_trait::SearchRepositoryTrait;
use crate::domain::item::ItemType;
use crate::error::Result;
use crate::storage::Database;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Service answering tag-filtered text searches across all kinds
#[derive(Clone)]
pub struct SearchService {
    repository: Arc<dyn SearchRepositoryTrait>,
}

impl SearchService {
    /// Create a new search service over the given database
    pub fn new(db: Database) -> Self {
        Self::with_repository(Arc::new(SearchRepository::new(db)))
    }

    /// Create a service over any repository implementation
    pub fn with_repository(repository: Arc<dyn SearchRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Execute a search.
    ///
    /// Any failing sub-query fails the whole search; partial results are
    /// never returned.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults> {
        let mut results = SearchResults::default();
        let text = query.needle();

        for item_type in query.scope() {
            let ids = if query.has_tag_filter() {
                let ids = self
                    .repository
                    .ids_with_all_tags(item_type, &query.tags)
                    .await?;
                if ids.is_empty() {
                    tracing::debug!(%item_type, "No item carries every requested tag");
                    continue;
                }
                Some(ids)
            } else {
                None
            };

            self.search_kind(item_type, text, ids.as_ref(), &mut results)
                .await?;
        }

        tracing::debug!(
            text,
            tags = ?query.tags,
            entity_type = ?query.entity_type,
            total = results.total(),
            "Search completed"
        );
        Ok(results)
    }

    async fn search_kind(
        &self,
        item_type: ItemType,
        text: &str,
        ids: Option<&BTreeSet<i64>>,
        results: &mut SearchResults,
    ) -> Result<()> {
        match item_type {
            ItemType::Garage => {
                results.garages = self.repository.search_garages(text, ids).await?;
                self.attach_tags(item_type, &mut results.garages).await
            }
            ItemType::Bike => {
                results.bikes = self.repository.search_bikes(text, ids).await?;
                self.attach_tags(item_type, &mut results.bikes).await
            }
            ItemType::Section => {
                results.sections = self.repository.search_sections(text, ids).await?;
                self.attach_tags(item_type, &mut results.sections).await
            }
            ItemType::Part => {
                results.parts = self.repository.search_parts(text, ids).await?;
                self.attach_tags(item_type, &mut results.parts).await
            }
        }
    }

    async fn attach_tags<H: SearchHit>(&self, item_type: ItemType, hits: &mut [H]) -> Result<()> {
        if hits.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = hits.iter().map(SearchHit::item_id).collect();
        let mut tags = self.repository.tags_for_items(item_type, &ids).await?;

        for hit in hits.iter_mut() {
            hit.set_tags(tags.remove(&hit.item_id()).unwrap_or_default());
        }
        Ok(())
    }
}
