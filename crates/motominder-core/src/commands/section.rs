//! Section management commands
//!
//! A section groups the parts of one bike (engine, brakes, electrics, ...).

use super::{optional_text, purge_tag_links, required_text};
use crate::domain::item::ItemRef;
use crate::storage::Database;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Section {
    pub id: i64,
    pub bike_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSection {
    #[serde(default)]
    pub bike_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewSection {
    pub fn new(bike_id: i64, name: impl Into<String>) -> Self {
        Self {
            bike_id: Some(bike_id),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    fn validate(&self) -> Result<(i64, String)> {
        let bike_id = self
            .bike_id
            .ok_or_else(|| Error::invalid("Bike ID is required"))?;
        let name = required_text(&self.name, "Section name is required")?;
        Ok((bike_id, name))
    }
}

pub(crate) const SELECT_SECTION: &str =
    "SELECT id, bike_id, name, description, notes, created_at, updated_at FROM sections";

impl From<&Section> for NewSection {
    fn from(section: &Section) -> Self {
        Self {
            bike_id: Some(section.bike_id),
            name: section.name.clone(),
            description: section.description.clone(),
            notes: section.notes.clone(),
        }
    }
}

/// Section repository for database operations
pub struct SectionRepository<'a> {
    db: &'a Database,
}

impl<'a> SectionRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a section on an existing bike
    pub async fn create(&self, input: &NewSection) -> Result<Section> {
        let (bike_id, name) = input.validate()?;
        if !super::item_exists(self.db.pool(), ItemRef::Bike(bike_id)).await? {
            return Err(Error::BikeNotFound(bike_id));
        }
        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO sections (bike_id, name, description, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(bike_id)
        .bind(&name)
        .bind(optional_text(&input.description))
        .bind(optional_text(&input.notes))
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        tracing::info!(section_id = id, bike_id, name = %name, "Created section");
        self.require(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<Section>> {
        let section = sqlx::query_as::<_, Section>(&format!("{SELECT_SECTION} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(section)
    }

    pub async fn require(&self, id: i64) -> Result<Section> {
        self.get(id).await?.ok_or(Error::SectionNotFound(id))
    }

    /// List sections, optionally only those of one bike
    pub async fn list(&self, bike_id: Option<i64>) -> Result<Vec<Section>> {
        let sections = if let Some(bike_id) = bike_id {
            sqlx::query_as::<_, Section>(&format!(
                "{SELECT_SECTION} WHERE bike_id = ? ORDER BY name"
            ))
            .bind(bike_id)
            .fetch_all(self.db.pool())
            .await?
        } else {
            sqlx::query_as::<_, Section>(&format!("{SELECT_SECTION} ORDER BY name"))
                .fetch_all(self.db.pool())
                .await?
        };

        Ok(sections)
    }

    pub async fn update(&self, id: i64, input: &NewSection) -> Result<Section> {
        let (bike_id, name) = input.validate()?;
        if !self.exists(id).await? {
            return Err(Error::SectionNotFound(id));
        }
        if !super::item_exists(self.db.pool(), ItemRef::Bike(bike_id)).await? {
            return Err(Error::BikeNotFound(bike_id));
        }

        sqlx::query(
            r#"
            UPDATE sections
            SET bike_id = ?, name = ?, description = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(bike_id)
        .bind(&name)
        .bind(optional_text(&input.description))
        .bind(optional_text(&input.notes))
        .bind(Utc::now())
        .bind(id)
        .execute(self.db.pool())
        .await?;

        self.require(id).await
    }

    /// Delete a section with its parts and all their tag links
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        purge_tag_links(&mut tx, ItemRef::Section(id)).await?;

        let result = sqlx::query("DELETE FROM sections WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::SectionNotFound(id));
        }

        tx.commit().await?;
        tracing::info!(section_id = id, "Deleted section");
        Ok(())
    }

    pub async fn exists(&self, id: i64) -> Result<bool> {
        super::item_exists(self.db.pool(), ItemRef::Section(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{BikeRepository, GarageRepository, NewBike, NewGarage};

    #[tokio::test]
    async fn test_section_lifecycle() {
        let db = Database::in_memory().await.unwrap();
        let garage = GarageRepository::new(&db)
            .create(&NewGarage::new("Home"))
            .await
            .unwrap();
        let bike = BikeRepository::new(&db)
            .create(&NewBike::new(garage.id, "Ducati", "Monster"))
            .await
            .unwrap();
        let repo = SectionRepository::new(&db);

        let brakes = repo
            .create(&NewSection::new(bike.id, "Brakes").with_description("Front and rear"))
            .await
            .unwrap();
        repo.create(&NewSection::new(bike.id, "Engine")).await.unwrap();

        let names: Vec<String> = repo
            .list(Some(bike.id))
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Brakes", "Engine"]);

        let renamed = repo
            .update(brakes.id, &NewSection::new(bike.id, "Brake system"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "Brake system");
        assert_eq!(renamed.description, None);

        repo.delete(brakes.id).await.unwrap();
        assert!(matches!(
            repo.require(brakes.id).await,
            Err(Error::SectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_section_requires_existing_bike() {
        let db = Database::in_memory().await.unwrap();
        let repo = SectionRepository::new(&db);

        let err = repo.create(&NewSection::new(5, "Engine")).await.unwrap_err();
        assert!(matches!(err, Error::BikeNotFound(5)));
    }
}
