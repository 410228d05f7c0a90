//! Part management commands

use super::{optional_text, purge_tag_links, required_text};
use crate::domain::item::ItemRef;
use crate::storage::Database;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A part installed in one section of a bike
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Part {
    pub id: i64,
    pub section_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub part_number: Option<String>,
    pub supplier_info: Option<String>,
    pub replacement_url: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPart {
    #[serde(default)]
    pub section_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub supplier_info: Option<String>,
    #[serde(default)]
    pub replacement_url: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub installation_date: Option<NaiveDate>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewPart {
    pub fn new(section_id: i64, name: impl Into<String>) -> Self {
        Self {
            section_id: Some(section_id),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_part_number(mut self, part_number: impl Into<String>) -> Self {
        self.part_number = Some(part_number.into());
        self
    }

    pub fn with_supplier(mut self, supplier_info: impl Into<String>) -> Self {
        self.supplier_info = Some(supplier_info.into());
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    fn validate(&self) -> Result<(i64, String)> {
        let section_id = self
            .section_id
            .ok_or_else(|| Error::invalid("Section ID is required"))?;
        let name = required_text(&self.name, "Part name is required")?;
        if self.cost.is_some_and(|c| !c.is_finite() || c < 0.0) {
            return Err(Error::invalid("Cost must be a non-negative number"));
        }
        Ok((section_id, name))
    }
}

pub(crate) const SELECT_PART: &str = r#"
    SELECT id, section_id, name, description, part_number, supplier_info, replacement_url,
           purchase_date, installation_date, cost, notes, created_at, updated_at
    FROM parts
"#;

impl From<&Part> for NewPart {
    fn from(part: &Part) -> Self {
        Self {
            section_id: Some(part.section_id),
            name: part.name.clone(),
            description: part.description.clone(),
            part_number: part.part_number.clone(),
            supplier_info: part.supplier_info.clone(),
            replacement_url: part.replacement_url.clone(),
            purchase_date: part.purchase_date,
            installation_date: part.installation_date,
            cost: part.cost,
            notes: part.notes.clone(),
        }
    }
}

/// Part repository for database operations
pub struct PartRepository<'a> {
    db: &'a Database,
}

impl<'a> PartRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a part in an existing section
    pub async fn create(&self, input: &NewPart) -> Result<Part> {
        let (section_id, name) = input.validate()?;
        if !super::item_exists(self.db.pool(), ItemRef::Section(section_id)).await? {
            return Err(Error::SectionNotFound(section_id));
        }
        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO parts (section_id, name, description, part_number, supplier_info,
                               replacement_url, purchase_date, installation_date, cost, notes,
                               created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(section_id)
        .bind(&name)
        .bind(optional_text(&input.description))
        .bind(optional_text(&input.part_number))
        .bind(optional_text(&input.supplier_info))
        .bind(optional_text(&input.replacement_url))
        .bind(input.purchase_date)
        .bind(input.installation_date)
        .bind(input.cost)
        .bind(optional_text(&input.notes))
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        tracing::info!(part_id = id, section_id, name = %name, "Created part");
        self.require(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Part>> {
        let part = sqlx::query_as::<_, Part>(&format!("{SELECT_PART} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(part)
    }

    pub async fn require(&self, id: i64) -> Result<Part> {
        self.get(id).await?.ok_or(Error::PartNotFound(id))
    }

    /// List parts, optionally only those of one section
    pub async fn list(&self, section_id: Option<i64>) -> Result<Vec<Part>> {
        let parts = if let Some(section_id) = section_id {
            sqlx::query_as::<_, Part>(&format!(
                "{SELECT_PART} WHERE section_id = ? ORDER BY name"
            ))
            .bind(section_id)
            .fetch_all(self.db.pool())
            .await?
        } else {
            sqlx::query_as::<_, Part>(&format!("{SELECT_PART} ORDER BY name"))
                .fetch_all(self.db.pool())
                .await?
        };

        Ok(parts)
    }

    pub async fn update(&self, id: i64, input: &NewPart) -> Result<Part> {
        let (section_id, name) = input.validate()?;
        if !self.exists(id).await? {
            return Err(Error::PartNotFound(id));
        }
        if !super::item_exists(self.db.pool(), ItemRef::Section(section_id)).await? {
            return Err(Error::SectionNotFound(section_id));
        }

        sqlx::query(
            r#"
            UPDATE parts
            SET section_id = ?, name = ?, description = ?, part_number = ?, supplier_info = ?,
                replacement_url = ?, purchase_date = ?, installation_date = ?, cost = ?,
                notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(section_id)
        .bind(&name)
        .bind(optional_text(&input.description))
        .bind(optional_text(&input.part_number))
        .bind(optional_text(&input.supplier_info))
        .bind(optional_text(&input.replacement_url))
        .bind(input.purchase_date)
        .bind(input.installation_date)
        .bind(input.cost)
        .bind(optional_text(&input.notes))
        .bind(Utc::now())
        .bind(id)
        .execute(self.db.pool())
        .await?;

        self.require(id).await
    }

    /// Delete a part and its tag links. Maintenance records keep their row
    /// with the part reference cleared.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        purge_tag_links(&mut tx, ItemRef::Part(id)).await?;

        let result = sqlx::query("DELETE FROM parts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::PartNotFound(id));
        }

        tx.commit().await?;
        tracing::info!(part_id = id, "Deleted part");
        Ok(())
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        super::item_exists(self.db.pool(), ItemRef::Part(id)).await
    }
}
