//! Commands module - entity store operations as library functions
//!
//! One repository per entity of the ownership chain
//! (garage -> bike -> section -> part) plus maintenance records.
//! These are used by the CLI and the HTTP server.

pub mod bike;
pub mod garage;
pub mod maintenance;
pub mod part;
pub mod section;

use crate::Result;
use crate::domain::item::{ItemRef, ItemType};
use sqlx::SqliteConnection;

pub use bike::{Bike, BikeRepository, NewBike};
pub use garage::{Garage, GarageRepository, NewGarage};
pub use maintenance::{
    Maintenance, MaintenanceEntry, MaintenanceRepository, MaintenanceStatus, NewMaintenance,
};
pub use part::{NewPart, Part, PartRepository};
pub use section::{NewSection, Section, SectionRepository};

/// Check whether the entity behind `item` exists
pub async fn item_exists<'e, E>(executor: E, item: ItemRef) -> Result<bool>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let sql = format!("SELECT 1 FROM {} WHERE id = ?", item.item_type().table());

    let row: Option<(i64,)> = sqlx::query_as(&sql)
        .bind(item.id())
        .fetch_optional(executor)
        .await?;

    Ok(row.is_some())
}

/// Tag links of a garage and everything its cascade removes
const PURGE_GARAGE_LINKS: &str = r#"
    DELETE FROM tagged_items
    WHERE (item_type = 'garage' AND item_id = ?)
       OR (item_type = 'bike' AND item_id IN (SELECT id FROM bikes WHERE garage_id = ?))
       OR (item_type = 'section' AND item_id IN (
            SELECT s.id FROM sections s JOIN bikes b ON s.bike_id = b.id
            WHERE b.garage_id = ?))
       OR (item_type = 'part' AND item_id IN (
            SELECT p.id FROM parts p
            JOIN sections s ON p.section_id = s.id
            JOIN bikes b ON s.bike_id = b.id
            WHERE b.garage_id = ?))
"#;

const PURGE_BIKE_LINKS: &str = r#"
    DELETE FROM tagged_items
    WHERE (item_type = 'bike' AND item_id = ?)
       OR (item_type = 'section' AND item_id IN (SELECT id FROM sections WHERE bike_id = ?))
       OR (item_type = 'part' AND item_id IN (
            SELECT p.id FROM parts p JOIN sections s ON p.section_id = s.id
            WHERE s.bike_id = ?))
"#;

const PURGE_SECTION_LINKS: &str = r#"
    DELETE FROM tagged_items
    WHERE (item_type = 'section' AND item_id = ?)
       OR (item_type = 'part' AND item_id IN (SELECT id FROM parts WHERE section_id = ?))
"#;

const PURGE_PART_LINKS: &str = "DELETE FROM tagged_items WHERE item_type = 'part' AND item_id = ?";

/// Remove the tag associations of `root` and of every descendant the
/// cascade delete of `root` will remove.
///
/// Must run in the same transaction as the delete itself, before it.
pub(crate) async fn purge_tag_links(conn: &mut SqliteConnection, root: ItemRef) -> Result<u64> {
    let (sql, binds) = match root.item_type() {
        ItemType::Garage => (PURGE_GARAGE_LINKS, 4),
        ItemType::Bike => (PURGE_BIKE_LINKS, 3),
        ItemType::Section => (PURGE_SECTION_LINKS, 2),
        ItemType::Part => (PURGE_PART_LINKS, 1),
    };

    let mut query = sqlx::query(sql);
    for _ in 0..binds {
        query = query.bind(root.id());
    }
    let removed = query.execute(&mut *conn).await?.rows_affected();

    tracing::debug!(item = %root, removed, "Purged tag associations");
    Ok(removed)
}

/// Trim a required text field, failing with `message` when it is blank
pub(crate) fn required_text(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::Error::invalid(message));
    }
    Ok(trimmed.to_string())
}

/// Empty strings are stored as NULL
pub(crate) fn optional_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
