//! Search repository for database operations
//!
//! Every text query is assembled with [`QueryBuilder`]: the column lists are
//! static per kind and user text only ever reaches SQLite as a bound
//! parameter.

use super::entity::{BikeHit, GarageHit, PartHit, SectionHit};
use super::repository_trait::SearchRepositoryTrait;
use crate::commands::bike::SELECT_BIKE;
use crate::domain::item::ItemType;
use crate::domain::tags::{Tag, TagIndex};
use crate::error::Result;
use crate::storage::Database;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::collections::{BTreeSet, HashMap};

/// How to text-search one kind
struct TextSearch {
    item_type: ItemType,
    /// SELECT ... FROM ... JOIN ..., without WHERE
    select: &'static str,
    /// Columns matched with LIKE
    columns: &'static [&'static str],
    id_column: &'static str,
    order_by: &'static str,
}

const GARAGES: TextSearch = TextSearch {
    item_type: ItemType::Garage,
    select: "SELECT g.id, g.name, g.location, g.notes, g.created_at, g.updated_at FROM garages g",
    columns: &["g.name", "g.notes"],
    id_column: "g.id",
    order_by: "g.name",
};

const BIKES: TextSearch = TextSearch {
    item_type: ItemType::Bike,
    select: SELECT_BIKE,
    columns: &["b.make", "b.model", "b.vin", "b.notes"],
    id_column: "b.id",
    order_by: "b.make, b.model",
};

const SECTIONS: TextSearch = TextSearch {
    item_type: ItemType::Section,
    select: r#"
        SELECT s.id, s.bike_id, s.name, s.description, s.notes, s.created_at, s.updated_at,
               b.make, b.model, b.year, g.name AS garage_name
        FROM sections s
        JOIN bikes b ON s.bike_id = b.id
        JOIN garages g ON b.garage_id = g.id
    "#,
    columns: &["s.name", "s.description", "s.notes"],
    id_column: "s.id",
    order_by: "s.name",
};

const PARTS: TextSearch = TextSearch {
    item_type: ItemType::Part,
    select: r#"
        SELECT p.id, p.section_id, p.name, p.description, p.part_number, p.supplier_info,
               p.replacement_url, p.purchase_date, p.installation_date, p.cost, p.notes,
               p.created_at, p.updated_at,
               s.name AS section_name, b.make, b.model, b.year, g.name AS garage_name
        FROM parts p
        JOIN sections s ON p.section_id = s.id
        JOIN bikes b ON s.bike_id = b.id
        JOIN garages g ON b.garage_id = g.id
    "#,
    columns: &["p.name", "p.description", "p.notes", "p.part_number", "p.supplier_info"],
    id_column: "p.id",
    order_by: "p.name",
};

/// Turn user text into a LIKE pattern matching it literally as a substring
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Repository for search database operations
#[derive(Debug, Clone)]
pub struct SearchRepository {
    db: Database,
}

impl SearchRepository {
    /// Create a new repository over the given database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn run_text_search<T>(
        &self,
        target: &TextSearch,
        text: &str,
        ids: Option<&BTreeSet<i64>>,
    ) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        if ids.is_some_and(BTreeSet::is_empty) {
            return Ok(Vec::new());
        }

        let pattern = (!text.is_empty()).then(|| like_pattern(text));

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(target.select);
        builder.push(" WHERE 1 = 1");

        if let Some(pattern) = pattern.as_deref() {
            builder.push(" AND (");
            let mut separated = builder.separated(" OR ");
            for column in target.columns {
                separated.push(column);
                separated.push_unseparated(" LIKE ");
                separated.push_bind_unseparated(pattern);
                separated.push_unseparated(" ESCAPE '\\'");
            }
            separated.push_unseparated(")");
        }

        // One JSON array parameter, so the ID set size is not bounded by
        // SQLite's variable limit
        if let Some(ids) = ids {
            builder.push(" AND ");
            builder.push(target.id_column);
            builder.push(" IN (SELECT value FROM json_each(");
            let list: Vec<String> = ids.iter().map(i64::to_string).collect();
            builder.push_bind(format!("[{}]", list.join(",")));
            builder.push("))");
        }

        builder.push(" ORDER BY ");
        builder.push(target.order_by);

        let rows: Vec<T> = builder.build_query_as().fetch_all(self.db.pool()).await?;

        tracing::debug!(
            item_type = %target.item_type,
            text,
            tag_filtered = ids.is_some(),
            count = rows.len(),
            "Ran text search"
        );
        Ok(rows)
    }
}

#[async_trait]
impl SearchRepositoryTrait for SearchRepository {
    async fn search_garages(
        &self,
        text: &str,
        ids: Option<&BTreeSet<i64>>,
    ) -> Result<Vec<GarageHit>> {
        self.run_text_search(&GARAGES, text, ids).await
    }

    async fn search_bikes(&self, text: &str, ids: Option<&BTreeSet<i64>>) -> Result<Vec<BikeHit>> {
        self.run_text_search(&BIKES, text, ids).await
    }

    async fn search_sections(
        &self,
        text: &str,
        ids: Option<&BTreeSet<i64>>,
    ) -> Result<Vec<SectionHit>> {
        self.run_text_search(&SECTIONS, text, ids).await
    }

    async fn search_parts(&self, text: &str, ids: Option<&BTreeSet<i64>>) -> Result<Vec<PartHit>> {
        self.run_text_search(&PARTS, text, ids).await
    }

    async fn ids_with_all_tags(
        &self,
        item_type: ItemType,
        tag_names: &[String],
    ) -> Result<BTreeSet<i64>> {
        TagIndex::new(&self.db)
            .resolve_ids_with_all_tags(item_type, tag_names)
            .await
    }

    async fn tags_for_items(
        &self,
        item_type: ItemType,
        item_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Tag>>> {
        TagIndex::new(&self.db)
            .tags_for_items(item_type, item_ids)
            .await
    }
}
