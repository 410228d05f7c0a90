//! Bike management commands

use super::{optional_text, purge_tag_links, required_text};
use crate::domain::item::ItemRef;
use crate::storage::Database;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A bike parked in a garage
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bike {
    pub id: i64,
    pub garage_id: i64,
    pub make: String,
    pub model: String,
    pub year: Option<i64>,
    pub vin: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub current_mileage: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Name of the owning garage
    pub garage_name: String,
}

impl Bike {
    /// "Year Make Model" label used in listings
    pub fn display_name(&self) -> String {
        match self.year {
            Some(year) => format!("{} {} {}", year, self.make, self.model),
            None => format!("{} {}", self.make, self.model),
        }
    }
}

/// Fields accepted when creating or replacing a bike
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewBike {
    #[serde(default)]
    pub garage_id: Option<i64>,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub current_mileage: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewBike {
    pub fn new(garage_id: i64, make: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            garage_id: Some(garage_id),
            make: make.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    pub fn with_year(mut self, year: i64) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_vin(mut self, vin: impl Into<String>) -> Self {
        self.vin = Some(vin.into());
        self
    }

    pub fn with_mileage(mut self, mileage: i64) -> Self {
        self.current_mileage = Some(mileage);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    fn validate(&self) -> Result<(i64, String, String)> {
        let garage_id = self
            .garage_id
            .ok_or_else(|| Error::invalid("Garage ID is required"))?;
        let make = required_text(&self.make, "Bike make is required")?;
        let model = required_text(&self.model, "Bike model is required")?;
        if self.current_mileage.is_some_and(|m| m < 0) {
            return Err(Error::invalid("Mileage cannot be negative"));
        }
        Ok((garage_id, make, model))
    }
}

pub(crate) const SELECT_BIKE: &str = r#"
    SELECT b.id, b.garage_id, b.make, b.model, b.year, b.vin, b.purchase_date,
           b.current_mileage, b.notes, b.created_at, b.updated_at, g.name AS garage_name
    FROM bikes b
    JOIN garages g ON b.garage_id = g.id
"#;

impl From<&Bike> for NewBike {
    fn from(bike: &Bike) -> Self {
        Self {
            garage_id: Some(bike.garage_id),
            make: bike.make.clone(),
            model: bike.model.clone(),
            year: bike.year,
            vin: bike.vin.clone(),
            purchase_date: bike.purchase_date,
            current_mileage: Some(bike.current_mileage),
            notes: bike.notes.clone(),
        }
    }
}

/// Bike repository for database operations
pub struct BikeRepository<'a> {
    db: &'a Database,
}

impl<'a> BikeRepository<'a> {
    /// Create a new bike repository
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a bike in an existing garage
    pub async fn create(&self, input: &NewBike) -> Result<Bike> {
        let (garage_id, make, model) = input.validate()?;
        if !super::item_exists(self.db.pool(), ItemRef::Garage(garage_id)).await? {
            return Err(Error::GarageNotFound(garage_id));
        }
        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO bikes (garage_id, make, model, year, vin, purchase_date, current_mileage,
                               notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(garage_id)
        .bind(&make)
        .bind(&model)
        .bind(input.year)
        .bind(optional_text(&input.vin))
        .bind(input.purchase_date)
        .bind(input.current_mileage.unwrap_or(0))
        .bind(optional_text(&input.notes))
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        tracing::info!(bike_id = id, garage_id, make = %make, model = %model, "Created bike");
        self.require(id).await
    }

    /// Get a bike by ID
    pub async fn get(&self, id: i64) -> Result<Option<Bike>> {
        let bike = sqlx::query_as::<_, Bike>(&format!("{SELECT_BIKE} WHERE b.id = ?"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(bike)
    }

    /// Get a bike by ID, failing when it does not exist
    pub async fn require(&self, id: i64) -> Result<Bike> {
        self.get(id).await?.ok_or(Error::BikeNotFound(id))
    }

    /// List bikes, optionally only those in one garage
    pub async fn list(&self, garage_id: Option<i64>) -> Result<Vec<Bike>> {
        let bikes = if let Some(garage_id) = garage_id {
            sqlx::query_as::<_, Bike>(&format!(
                "{SELECT_BIKE} WHERE b.garage_id = ? ORDER BY b.make, b.model"
            ))
            .bind(garage_id)
            .fetch_all(self.db.pool())
            .await?
        } else {
            sqlx::query_as::<_, Bike>(&format!("{SELECT_BIKE} ORDER BY b.make, b.model"))
                .fetch_all(self.db.pool())
                .await?
        };

        Ok(bikes)
    }

    /// Replace a bike's fields (including moving it to another garage)
    pub async fn update(&self, id: i64, input: &NewBike) -> Result<Bike> {
        let (garage_id, make, model) = input.validate()?;
        if !self.exists(id).await? {
            return Err(Error::BikeNotFound(id));
        }
        if !super::item_exists(self.db.pool(), ItemRef::Garage(garage_id)).await? {
            return Err(Error::GarageNotFound(garage_id));
        }

        sqlx::query(
            r#"
            UPDATE bikes
            SET garage_id = ?, make = ?, model = ?, year = ?, vin = ?, purchase_date = ?,
                current_mileage = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(garage_id)
        .bind(&make)
        .bind(&model)
        .bind(input.year)
        .bind(optional_text(&input.vin))
        .bind(input.purchase_date)
        .bind(input.current_mileage.unwrap_or(0))
        .bind(optional_text(&input.notes))
        .bind(Utc::now())
        .bind(id)
        .execute(self.db.pool())
        .await?;

        self.require(id).await
    }

    /// Record a new odometer reading
    pub async fn set_mileage(&self, id: i64, mileage: i64) -> Result<Bike> {
        if mileage < 0 {
            return Err(Error::invalid("Mileage cannot be negative"));
        }
        let result = sqlx::query("UPDATE bikes SET current_mileage = ?, updated_at = ? WHERE id = ?")
            .bind(mileage)
            .bind(Utc::now())
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::BikeNotFound(id));
        }
        self.require(id).await
    }

    /// Delete a bike with its sections, parts, maintenance and tag links
    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;

        purge_tag_links(&mut tx, ItemRef::Bike(id)).await?;

        let result = sqlx::query("DELETE FROM bikes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::BikeNotFound(id));
        }

        tx.commit().await?;
        tracing::info!(bike_id = id, "Deleted bike");
        Ok(())
    }

    /// Check if a bike exists
    pub async fn exists(&self, id: i64) -> Result<bool> {
        super::item_exists(self.db.pool(), ItemRef::Bike(id)).await
    }
}
