//! Maintenance log and scheduling
//!
//! A maintenance record belongs to one bike and may point at the part that
//! was serviced. Records are either `completed` (history) or `scheduled`
//! (planned work with a due date).

use super::{optional_text, required_text};
use crate::domain::item::ItemRef;
use crate::storage::Database;
use crate::{Error, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a record is history or planned work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MaintenanceStatus {
    Scheduled,
    #[default]
    Completed,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
        }
    }

    /// Parse from a user-supplied string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A maintenance record as stored
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Maintenance {
    pub id: i64,
    pub bike_id: i64,
    pub part_id: Option<i64>,
    pub date: NaiveDate,
    pub mileage: Option<i64>,
    pub description: String,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: MaintenanceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A maintenance record with the bike and part it refers to
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MaintenanceEntry {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: Maintenance,
    pub make: String,
    pub model: String,
    pub part_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMaintenance {
    #[serde(default)]
    pub bike_id: Option<i64>,
    #[serde(default)]
    pub part_id: Option<i64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub mileage: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: Option<MaintenanceStatus>,
}

impl NewMaintenance {
    /// A completed service performed on `date`
    pub fn new(bike_id: i64, date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            bike_id: Some(bike_id),
            date: Some(date),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Planned work due on `due_date`
    pub fn scheduled(
        bike_id: i64,
        date: NaiveDate,
        due_date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            due_date: Some(due_date),
            status: Some(MaintenanceStatus::Scheduled),
            ..Self::new(bike_id, date, description)
        }
    }

    pub fn with_part(mut self, part_id: i64) -> Self {
        self.part_id = Some(part_id);
        self
    }

    pub fn with_mileage(mut self, mileage: i64) -> Self {
        self.mileage = Some(mileage);
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = Some(cost);
        self
    }

    fn validate(&self) -> Result<(i64, NaiveDate, String, MaintenanceStatus)> {
        let bike_id = self
            .bike_id
            .ok_or_else(|| Error::invalid("Bike ID is required"))?;
        let date = self
            .date
            .ok_or_else(|| Error::invalid("Maintenance date is required"))?;
        let description = required_text(&self.description, "Description is required")?;
        let status = self.status.unwrap_or_default();
        if status == MaintenanceStatus::Scheduled && self.due_date.is_none() {
            return Err(Error::invalid("Scheduled maintenance needs a due date"));
        }
        if self.mileage.is_some_and(|m| m < 0) {
            return Err(Error::invalid("Mileage cannot be negative"));
        }
        if self.cost.is_some_and(|c| !c.is_finite() || c < 0.0) {
            return Err(Error::invalid("Cost must be a non-negative number"));
        }
        Ok((bike_id, date, description, status))
    }
}

const SELECT_ENTRY: &str = r#"
    SELECT m.id, m.bike_id, m.part_id, m.date, m.mileage, m.description, m.cost, m.notes,
           m.due_date, m.status, m.created_at, m.updated_at,
           b.make, b.model, p.name AS part_name
    FROM maintenance m
    JOIN bikes b ON m.bike_id = b.id
    LEFT JOIN parts p ON m.part_id = p.id
"#;

impl From<&Maintenance> for NewMaintenance {
    fn from(record: &Maintenance) -> Self {
        Self {
            bike_id: Some(record.bike_id),
            part_id: record.part_id,
            date: Some(record.date),
            mileage: record.mileage,
            description: record.description.clone(),
            cost: record.cost,
            notes: record.notes.clone(),
            due_date: record.due_date,
            status: Some(record.status),
        }
    }
}

/// Maintenance repository for database operations
pub struct MaintenanceRepository<'a> {
    db: &'a Database,
}

impl<'a> MaintenanceRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    async fn check_refs(&self, bike_id: i64, part_id: Option<i64>) -> Result<()> {
        if !super::item_exists(self.db.pool(), ItemRef::Bike(bike_id)).await? {
            return Err(Error::BikeNotFound(bike_id));
        }
        if let Some(part_id) = part_id {
            if !super::item_exists(self.db.pool(), ItemRef::Part(part_id)).await? {
                return Err(Error::PartNotFound(part_id));
            }
        }
        Ok(())
    }

    /// Log a service or schedule one
    pub async fn create(&self, input: &NewMaintenance) -> Result<MaintenanceEntry> {
        let (bike_id, date, description, status) = input.validate()?;
        self.check_refs(bike_id, input.part_id).await?;
        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO maintenance (bike_id, part_id, date, mileage, description, cost, notes,
                                     due_date, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(bike_id)
        .bind(input.part_id)
        .bind(date)
        .bind(input.mileage)
        .bind(&description)
        .bind(input.cost)
        .bind(optional_text(&input.notes))
        .bind(input.due_date)
        .bind(status)
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        tracing::info!(maintenance_id = id, bike_id, %status, "Recorded maintenance");
        self.require(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<MaintenanceEntry>> {
        let entry = sqlx::query_as::<_, MaintenanceEntry>(&format!("{SELECT_ENTRY} WHERE m.id = ?"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(entry)
    }

    pub async fn require(&self, id: i64) -> Result<MaintenanceEntry> {
        self.get(id).await?.ok_or(Error::MaintenanceNotFound(id))
    }

    /// List records, newest first, optionally for one bike
    pub async fn list(&self, bike_id: Option<i64>) -> Result<Vec<MaintenanceEntry>> {
        let entries = if let Some(bike_id) = bike_id {
            sqlx::query_as::<_, MaintenanceEntry>(&format!(
                "{SELECT_ENTRY} WHERE m.bike_id = ? ORDER BY m.date DESC, m.id DESC"
            ))
            .bind(bike_id)
            .fetch_all(self.db.pool())
            .await?
        } else {
            sqlx::query_as::<_, MaintenanceEntry>(&format!(
                "{SELECT_ENTRY} ORDER BY m.date DESC, m.id DESC"
            ))
            .fetch_all(self.db.pool())
            .await?
        };

        Ok(entries)
    }

    /// Scheduled work due between `today` and `today + within_days`, both
    /// inclusive, soonest first
    pub async fn upcoming(&self, today: NaiveDate, within_days: u32) -> Result<Vec<MaintenanceEntry>> {
        let until = today + Duration::days(i64::from(within_days));

        let entries = sqlx::query_as::<_, MaintenanceEntry>(&format!(
            r#"{SELECT_ENTRY}
            WHERE m.status = ? AND m.due_date IS NOT NULL AND m.due_date >= ? AND m.due_date <= ?
            ORDER BY m.due_date, m.id"#
        ))
        .bind(MaintenanceStatus::Scheduled)
        .bind(today)
        .bind(until)
        .fetch_all(self.db.pool())
        .await?;

        tracing::debug!(%today, within_days, count = entries.len(), "Loaded upcoming maintenance");
        Ok(entries)
    }

    /// Mark scheduled work as done on `date`
    pub async fn complete(&self, id: i64, date: NaiveDate) -> Result<MaintenanceEntry> {
        let result = sqlx::query(
            "UPDATE maintenance SET status = ?, date = ?, updated_at = ? WHERE id = ?",
        )
        .bind(MaintenanceStatus::Completed)
        .bind(date)
        .bind(Utc::now())
        .bind(id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::MaintenanceNotFound(id));
        }

        tracing::info!(maintenance_id = id, %date, "Completed maintenance");
        self.require(id).await
    }

    pub async fn update(&self, id: i64, input: &NewMaintenance) -> Result<MaintenanceEntry> {
        let (bike_id, date, description, status) = input.validate()?;
        if self.get(id).await?.is_none() {
            return Err(Error::MaintenanceNotFound(id));
        }
        self.check_refs(bike_id, input.part_id).await?;

        sqlx::query(
            r#"
            UPDATE maintenance
            SET bike_id = ?, part_id = ?, date = ?, mileage = ?, description = ?, cost = ?,
                notes = ?, due_date = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(bike_id)
        .bind(input.part_id)
        .bind(date)
        .bind(input.mileage)
        .bind(&description)
        .bind(input.cost)
        .bind(optional_text(&input.notes))
        .bind(input.due_date)
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(self.db.pool())
        .await?;

        self.require(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM maintenance WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::MaintenanceNotFound(id));
        }

        tracing::info!(maintenance_id = id, "Deleted maintenance record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{
        BikeRepository, GarageRepository, NewBike, NewGarage, NewPart, NewSection,
        PartRepository, SectionRepository,
    };

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn setup() -> (Database, i64, i64) {
        let db = Database::in_memory().await.unwrap();
        let garage = GarageRepository::new(&db)
            .create(&NewGarage::new("Home"))
            .await
            .unwrap();
        let bike = BikeRepository::new(&db)
            .create(&NewBike::new(garage.id, "Suzuki", "DR650"))
            .await
            .unwrap();
        let section = SectionRepository::new(&db)
            .create(&NewSection::new(bike.id, "Drivetrain"))
            .await
            .unwrap();
        let part = PartRepository::new(&db)
            .create(&NewPart::new(section.id, "Chain"))
            .await
            .unwrap();
        (db, bike.id, part.id)
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(MaintenanceStatus::parse(" Scheduled"), Some(MaintenanceStatus::Scheduled));
        assert_eq!(MaintenanceStatus::parse("done"), None);
        assert_eq!(MaintenanceStatus::default(), MaintenanceStatus::Completed);
    }

    #[tokio::test]
    async fn test_log_and_list() {
        let (db, bike_id, part_id) = setup().await;
        let repo = MaintenanceRepository::new(&db);

        repo.create(&NewMaintenance::new(bike_id, day(2024, 1, 10), "Oil change").with_mileage(12_000))
            .await
            .unwrap();
        let chain = repo
            .create(
                &NewMaintenance::new(bike_id, day(2024, 3, 2), "Chain replaced")
                    .with_part(part_id)
                    .with_cost(89.0),
            )
            .await
            .unwrap();
        assert_eq!(chain.make, "Suzuki");
        assert_eq!(chain.part_name.as_deref(), Some("Chain"));
        assert_eq!(chain.record.status, MaintenanceStatus::Completed);

        let listed = repo.list(Some(bike_id)).await.unwrap();
        let descriptions: Vec<&str> = listed.iter().map(|e| e.record.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Chain replaced", "Oil change"]);
    }

    #[tokio::test]
    async fn test_validation_and_references() {
        let (db, bike_id, _) = setup().await;
        let repo = MaintenanceRepository::new(&db);

        assert!(matches!(
            repo.create(&NewMaintenance::new(bike_id, day(2024, 1, 1), " ")).await,
            Err(Error::InvalidInput(_))
        ));
        let mut no_due = NewMaintenance::new(bike_id, day(2024, 1, 1), "Valve check");
        no_due.status = Some(MaintenanceStatus::Scheduled);
        assert!(matches!(repo.create(&no_due).await, Err(Error::InvalidInput(_))));
        assert!(matches!(
            repo.create(&NewMaintenance::new(999, day(2024, 1, 1), "x")).await,
            Err(Error::BikeNotFound(999))
        ));
        assert!(matches!(
            repo.create(&NewMaintenance::new(bike_id, day(2024, 1, 1), "x").with_part(999))
                .await,
            Err(Error::PartNotFound(999))
        ));
        assert!(repo.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upcoming_and_complete() {
        let (db, bike_id, _) = setup().await;
        let repo = MaintenanceRepository::new(&db);
        let today = day(2024, 6, 1);

        let soon = repo
            .create(&NewMaintenance::scheduled(bike_id, today, day(2024, 6, 10), "Tyres"))
            .await
            .unwrap();
        repo.create(&NewMaintenance::scheduled(bike_id, today, day(2024, 6, 1), "Brake fluid"))
            .await
            .unwrap();
        repo.create(&NewMaintenance::scheduled(bike_id, today, day(2024, 9, 1), "Valves"))
            .await
            .unwrap();
        repo.create(&NewMaintenance::scheduled(bike_id, today, day(2024, 5, 1), "Overdue"))
            .await
            .unwrap();

        let upcoming = repo.upcoming(today, 30).await.unwrap();
        let descriptions: Vec<&str> =
            upcoming.iter().map(|e| e.record.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Brake fluid", "Tyres"]);

        let done = repo.complete(soon.record.id, day(2024, 6, 8)).await.unwrap();
        assert_eq!(done.record.status, MaintenanceStatus::Completed);
        assert_eq!(done.record.date, day(2024, 6, 8));
        assert_eq!(repo.upcoming(today, 30).await.unwrap().len(), 1);

        assert!(matches!(
            repo.complete(4242, today).await,
            Err(Error::MaintenanceNotFound(4242))
        ));
    }

    #[tokio::test]
    async fn test_part_delete_keeps_history() {
        let (db, bike_id, part_id) = setup().await;
        let repo = MaintenanceRepository::new(&db);

        let entry = repo
            .create(&NewMaintenance::new(bike_id, day(2024, 2, 2), "Chain lubed").with_part(part_id))
            .await
            .unwrap();
        PartRepository::new(&db).delete(part_id).await.unwrap();

        let entry = repo.require(entry.record.id).await.unwrap();
        assert_eq!(entry.record.part_id, None);
        assert_eq!(entry.part_name, None);

        BikeRepository::new(&db).delete(bike_id).await.unwrap();
        assert!(repo.get(entry.record.id).await.unwrap().is_none());
    }
}
