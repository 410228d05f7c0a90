//! Search API
//!
//! Maps the `query`, `tags` and `type` request parameters onto
//! [`SearchQuery`] and wraps the results with their metadata.

use super::ApiResponse;
use crate::Result;
use crate::domain::search::{SearchQuery, SearchResults, SearchService};
use crate::storage::Database;
use serde::{Deserialize, Serialize};

/// Raw search request parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
    /// Comma-separated tag names
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default, rename = "type")]
    pub entity_type: Option<String>,
}

impl SearchParams {
    pub fn to_query(&self) -> SearchQuery {
        let mut query = SearchQuery::new(self.query.clone().unwrap_or_default());
        if let Some(tags) = &self.tags {
            query = query.with_tag_list(tags);
        }
        if let Some(entity_type) = &self.entity_type {
            query = query.with_type(entity_type.clone());
        }
        query
    }
}

/// Metadata echoed next to search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    pub total_results: usize,
    pub query: String,
    pub tags: Vec<String>,
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
}

impl SearchMeta {
    pub fn new(query: &SearchQuery, results: &SearchResults) -> Self {
        Self {
            total_results: results.total(),
            query: query.text.clone(),
            tags: query.tags.clone(),
            entity_type: query.entity_type.clone(),
        }
    }
}

/// Run a search and build the response envelope
pub async fn search(
    db: &Database,
    params: &SearchParams,
) -> Result<ApiResponse<SearchResults, SearchMeta>> {
    let query = params.to_query();
    let results = SearchService::new(db.clone()).search(&query).await?;
    let meta = SearchMeta::new(&query, &results);
    Ok(ApiResponse::ok_with_meta(results, meta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{GarageRepository, NewGarage};
    use serde_json::json;

    #[test]
    fn test_params_to_query() {
        let params = SearchParams {
            query: Some("chain".into()),
            tags: Some("winter, order,".into()),
            entity_type: Some("Part".into()),
        };
        let query = params.to_query();
        assert_eq!(query.text, "chain");
        assert_eq!(query.tags, vec!["winter", "order"]);
        assert_eq!(query.entity_type.as_deref(), Some("Part"));

        let empty = SearchParams {
            entity_type: Some(String::new()),
            ..Default::default()
        }
        .to_query();
        assert_eq!(empty, SearchQuery::default());
    }

    #[tokio::test]
    async fn test_search_envelope() {
        let db = Database::in_memory().await.unwrap();
        GarageRepository::new(&db)
            .create(&NewGarage::new("Barn"))
            .await
            .unwrap();

        let params = SearchParams {
            query: Some("bar".into()),
            ..Default::default()
        };
        let response = search(&db, &params).await.unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["data"]["garages"][0]["name"], json!("Barn"));
        assert_eq!(value["data"]["garages"][0]["tags"], json!([]));
        assert_eq!(
            value["meta"],
            json!({"totalResults": 1, "query": "bar", "tags": [], "type": null})
        );
    }

    #[tokio::test]
    async fn test_unknown_type_echoes_raw_value() {
        let db = Database::in_memory().await.unwrap();
        GarageRepository::new(&db)
            .create(&NewGarage::new("Barn"))
            .await
            .unwrap();

        let params = SearchParams {
            entity_type: Some("boats".into()),
            ..Default::default()
        };
        let response = search(&db, &params).await.unwrap();
        let meta = response.meta.unwrap();
        assert_eq!(meta.total_results, 0);
        assert_eq!(meta.entity_type.as_deref(), Some("boats"));
        assert!(response.data.unwrap().is_empty());
    }
}
