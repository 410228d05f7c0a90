//! Details API
//!
//! One entity together with its direct children and its tags, serialized
//! flat: `{...garage, bikes, tags}`.

use crate::Result;
use crate::commands::{
    Bike, BikeRepository, Garage, GarageRepository, MaintenanceEntry, MaintenanceRepository, Part,
    PartRepository, Section, SectionRepository,
};
use crate::domain::item::{ItemRef, ItemType};
use crate::domain::tags::{Tag, TagIndex};
use crate::storage::Database;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarageDetail {
    #[serde(flatten)]
    pub garage: Garage,
    pub bikes: Vec<Bike>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BikeDetail {
    #[serde(flatten)]
    pub bike: Bike,
    pub sections: Vec<Section>,
    pub maintenance: Vec<MaintenanceEntry>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDetail {
    #[serde(flatten)]
    pub section: Section,
    pub parts: Vec<Part>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartDetail {
    #[serde(flatten)]
    pub part: Part,
    pub tags: Vec<Tag>,
}

async fn tags_of(db: &Database, item_type: ItemType, id: i64) -> Result<Vec<Tag>> {
    TagIndex::new(db).tags_for(ItemRef::new(item_type, id)).await
}

/// Load a garage with its bikes and tags
pub async fn garage(db: &Database, id: i64) -> Result<GarageDetail> {
    let garage = GarageRepository::new(db).require(id).await?;
    let bikes = BikeRepository::new(db).list(Some(id)).await?;
    let tags = tags_of(db, ItemType::Garage, id).await?;

    Ok(GarageDetail { garage, bikes, tags })
}

/// Load a bike with its sections, maintenance history and tags
pub async fn bike(db: &Database, id: i64) -> Result<BikeDetail> {
    let bike = BikeRepository::new(db).require(id).await?;
    let sections = SectionRepository::new(db).list(Some(id)).await?;
    let maintenance = MaintenanceRepository::new(db).list(Some(id)).await?;
    let tags = tags_of(db, ItemType::Bike, id).await?;

    Ok(BikeDetail {
        bike,
        sections,
        maintenance,
        tags,
    })
}

/// Load a section with its parts and tags
pub async fn section(db: &Database, id: i64) -> Result<SectionDetail> {
    let section = SectionRepository::new(db).require(id).await?;
    let parts = PartRepository::new(db).list(Some(id)).await?;
    let tags = tags_of(db, ItemType::Section, id).await?;

    Ok(SectionDetail {
        section,
        parts,
        tags,
    })
}

pub async fn part(db: &Database, id: i64) -> Result<PartDetail> {
    let part = PartRepository::new(db).require(id).await?;
    let tags = tags_of(db, ItemType::Part, id).await?;

    Ok(PartDetail { part, tags })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::commands::{NewBike, NewGarage, NewMaintenance, NewPart, NewSection};
    use crate::domain::tags::{NewTag, TagRepository};
    use chrono::NaiveDate;
    use serde_json::json;

    #[tokio::test]
    async fn test_garage_detail_is_flat() {
        let db = Database::in_memory().await.unwrap();
        let g = GarageRepository::new(&db)
            .create(&NewGarage::new("Barn").with_location("Farm"))
            .await
            .unwrap();
        BikeRepository::new(&db)
            .create(&NewBike::new(g.id, "Honda", "CB750"))
            .await
            .unwrap();
        let tag = TagRepository::new(&db)
            .create(&NewTag::new("winter"))
            .await
            .unwrap();
        TagIndex::new(&db)
            .assign(tag.id, ItemRef::new(ItemType::Garage, g.id), None)
            .await
            .unwrap();

        let detail = garage(&db, g.id).await.unwrap();
        let value = serde_json::to_value(&detail).unwrap();

        assert_eq!(value["id"], json!(g.id));
        assert_eq!(value["name"], json!("Barn"));
        assert_eq!(value["bikes"][0]["model"], json!("CB750"));
        assert_eq!(value["tags"][0]["name"], json!("winter"));
    }

    #[tokio::test]
    async fn test_bike_and_section_detail() {
        let db = Database::in_memory().await.unwrap();
        let g = GarageRepository::new(&db)
            .create(&NewGarage::new("Shed"))
            .await
            .unwrap();
        let b = BikeRepository::new(&db)
            .create(&NewBike::new(g.id, "Yamaha", "XT600"))
            .await
            .unwrap();
        let s = SectionRepository::new(&db)
            .create(&NewSection::new(b.id, "Drivetrain"))
            .await
            .unwrap();
        PartRepository::new(&db)
            .create(&NewPart::new(s.id, "Chain"))
            .await
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        MaintenanceRepository::new(&db)
            .create(&NewMaintenance::new(b.id, date, "Oil change"))
            .await
            .unwrap();

        let detail = bike(&db, b.id).await.unwrap();
        assert_eq!(detail.sections.len(), 1);
        assert_eq!(detail.maintenance.len(), 1);
        assert!(detail.tags.is_empty());

        let detail = section(&db, s.id).await.unwrap();
        assert_eq!(detail.parts[0].name, "Chain");
    }

    #[tokio::test]
    async fn test_missing_entity_is_not_found() {
        let db = Database::in_memory().await.unwrap();

        assert!(matches!(garage(&db, 9).await, Err(Error::GarageNotFound(9))));
        assert!(matches!(part(&db, 9).await, Err(Error::PartNotFound(9))));
    }
}
