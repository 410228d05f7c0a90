//! Tag entity and association types

use crate::commands::{Bike, Garage, Part, Section};
use crate::domain::item::{ItemRef, ItemType};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Color given to tags created without one
pub const DEFAULT_TAG_COLOR: &str = "#3498db";

/// A named label that can be attached to any garage, bike, section or part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    /// Display hint only
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or renaming a tag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTag {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl NewTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// One association between a tag and an item
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaggedItem {
    pub id: i64,
    pub tag_id: i64,
    pub item_type: ItemType,
    pub item_id: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TaggedItem {
    pub fn item(&self) -> ItemRef {
        ItemRef::new(self.item_type, self.item_id)
    }
}

/// Body of an assign or remove request: `{tagId, itemType, itemId, notes?}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagAssignment {
    #[serde(default)]
    pub tag_id: Option<i64>,
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl TagAssignment {
    pub fn new(tag_id: i64, item: ItemRef) -> Self {
        Self {
            tag_id: Some(tag_id),
            item_type: Some(item.item_type().to_string()),
            item_id: Some(item.id()),
            notes: None,
        }
    }

    /// Validate the request and split it into tag ID and item reference
    pub fn target(&self) -> Result<(i64, ItemRef)> {
        let (Some(tag_id), Some(item_type), Some(item_id)) =
            (self.tag_id, self.item_type.as_deref(), self.item_id)
        else {
            return Err(Error::invalid(
                "Tag ID, item type, and item ID are required",
            ));
        };

        let item_type = ItemType::parse(item_type).ok_or_else(|| {
            Error::invalid("Invalid item type. Must be one of: garage, bike, section, part")
        })?;

        Ok((tag_id, ItemRef::new(item_type, item_id)))
    }
}

/// Entities carrying one tag, grouped by kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupedItems {
    pub garages: Vec<Garage>,
    pub bikes: Vec<Bike>,
    pub sections: Vec<Section>,
    pub parts: Vec<Part>,
}

impl GroupedItems {
    pub fn len(&self) -> usize {
        self.garages.len() + self.bikes.len() + self.sections.len() + self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A tag with everything it is attached to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagItems {
    pub tag: Tag,
    pub items: GroupedItems,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_target() {
        let request = TagAssignment::new(3, ItemRef::Bike(8));
        assert_eq!(request.target().unwrap(), (3, ItemRef::Bike(8)));
    }

    #[test]
    fn test_assignment_requires_all_fields() {
        let request = TagAssignment {
            tag_id: Some(1),
            item_type: Some("bike".into()),
            ..Default::default()
        };
        assert!(matches!(
            request.target(),
            Err(Error::InvalidInput(msg)) if msg == "Tag ID, item type, and item ID are required"
        ));
    }

    #[test]
    fn test_assignment_rejects_unknown_kind() {
        let request = TagAssignment {
            tag_id: Some(1),
            item_type: Some("maintenance".into()),
            item_id: Some(1),
            notes: None,
        };
        assert!(matches!(request.target(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_assignment_deserializes_camel_case() {
        let request: TagAssignment =
            serde_json::from_str(r#"{"tagId": 2, "itemType": "Part", "itemId": 5}"#).unwrap();
        assert_eq!(request.target().unwrap(), (2, ItemRef::Part(5)));
    }
}
