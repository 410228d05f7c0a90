//! Garage management commands
//!
//! Garages are the root of the ownership chain.

use super::{optional_text, purge_tag_links, required_text};
use crate::domain::item::ItemRef;
use crate::storage::Database;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A garage holding bikes
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Garage {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a garage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewGarage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewGarage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

pub(crate) const SELECT_GARAGE: &str =
    "SELECT id, name, location, notes, created_at, updated_at FROM garages";

impl From<&Garage> for NewGarage {
    fn from(garage: &Garage) -> Self {
        Self {
            name: garage.name.clone(),
            location: garage.location.clone(),
            notes: garage.notes.clone(),
        }
    }
}

/// Garage repository for database operations
pub struct GarageRepository<'a> {
    db: &'a Database,
}

impl<'a> GarageRepository<'a> {
    /// Create a new garage repository
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a new garage
    pub async fn create(&self, input: &NewGarage) -> Result<Garage> {
        let name = required_text(&input.name, "Garage name is required")?;
        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO garages (name, location, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&name)
        .bind(optional_text(&input.location))
        .bind(optional_text(&input.notes))
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        tracing::info!(garage_id = id, name = %name, "Created garage");
        self.require(id).await
    }

    /// Get a garage by ID
    pub async fn get(&self, id: i64) -> Result<Option<Garage>> {
        let garage = sqlx::query_as::<_, Garage>(&format!("{SELECT_GARAGE} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(garage)
    }

    /// Get a garage by ID, failing when it does not exist
    pub async fn require(&self, id: i64) -> Result<Garage> {
        self.get(id).await?.ok_or(Error::GarageNotFound(id))
    }

    /// List all garages ordered by name
    pub async fn list(&self) -> Result<Vec<Garage>> {
        let garages = sqlx::query_as::<_, Garage>(&format!("{SELECT_GARAGE} ORDER BY name"))
            .fetch_all(self.db.pool())
            .await?;

        Ok(garages)
    }

    /// Replace a garage's fields
    pub async fn update(&self, id: i64, input: &NewGarage) -> Result<Garage> {
        let name = required_text(&input.name, "Garage name is required")?;

        let result = sqlx::query(
            "UPDATE garages SET name = ?, location = ?, notes = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&name)
        .bind(optional_text(&input.location))
        .bind(optional_text(&input.notes))
        .bind(Utc::now())
        .bind(id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::GarageNotFound(id));
        }

        self.require(id).await
    }

    /// Delete a garage, its bikes, sections and parts, and all their tag links
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        purge_tag_links(&mut tx, ItemRef::Garage(id)).await?;

        let result = sqlx::query("DELETE FROM garages WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::GarageNotFound(id));
        }

        tx.commit().await?;
        tracing::info!(garage_id = id, "Deleted garage");
        Ok(())
    }

    /// Check if a garage exists
    pub async fn exists(&self, id: i64) -> Result<bool> {
        super::item_exists(self.db.pool(), ItemRef::Garage(id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garage_crud() {
        let db = Database::in_memory().await.unwrap();
        let repo = GarageRepository::new(&db);

        let created = repo
            .create(&NewGarage::new("Home").with_location("Basement"))
            .await
            .unwrap();
        assert_eq!(created.name, "Home");
        assert_eq!(created.location.as_deref(), Some("Basement"));
        assert!(repo.exists(created.id).await.unwrap());

        let updated = repo
            .update(created.id, &NewGarage::new("Workshop").with_notes(""))
            .await
            .unwrap();
        assert_eq!(updated.name, "Workshop");
        assert_eq!(updated.location, None);
        assert_eq!(updated.notes, None);

        repo.delete(created.id).await.unwrap();
        assert!(repo.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_garage_name_required() {
        let db = Database::in_memory().await.unwrap();
        let repo = GarageRepository::new(&db);

        let err = repo.create(&NewGarage::new("  ")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let db = Database::in_memory().await.unwrap();
        let repo = GarageRepository::new(&db);

        repo.create(&NewGarage::new("Storage unit")).await.unwrap();
        repo.create(&NewGarage::new("Carport")).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["Carport", "Storage unit"]);
    }

    #[tokio::test]
    async fn test_missing_garage() {
        let db = Database::in_memory().await.unwrap();
        let repo = GarageRepository::new(&db);

        assert!(matches!(
            repo.update(99, &NewGarage::new("x")).await,
            Err(Error::GarageNotFound(99))
        ));
        assert!(matches!(repo.delete(99).await, Err(Error::GarageNotFound(99))));
    }
}
