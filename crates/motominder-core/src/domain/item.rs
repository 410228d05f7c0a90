//! Taggable item kinds and polymorphic item references
//!
//! `tagged_items` stores a plain `(item_type, item_id)` pair; no foreign key can
//! span the four entity tables, so the application validates the reference by
//! dispatching on [`ItemRef`] at write time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of entities that can carry tags and appear in search results
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ItemType {
    Garage,
    Bike,
    Section,
    Part,
}

impl ItemType {
    /// Every item type, in result order
    pub const ALL: [ItemType; 4] = [Self::Garage, Self::Bike, Self::Section, Self::Part];

    /// Convert to the string stored in `tagged_items.item_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Garage => "garage",
            Self::Bike => "bike",
            Self::Section => "section",
            Self::Part => "part",
        }
    }

    /// Table holding entities of this type
    pub fn table(&self) -> &'static str {
        match self {
            Self::Garage => "garages",
            Self::Bike => "bikes",
            Self::Section => "sections",
            Self::Part => "parts",
        }
    }

    /// Parse from a user-supplied string (trimmed, case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "garage" => Some(Self::Garage),
            "bike" => Some(Self::Bike),
            "section" => Some(Self::Section),
            "part" => Some(Self::Part),
            _ => None,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to one concrete entity of any taggable kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Garage(i64),
    Bike(i64),
    Section(i64),
    Part(i64),
}

impl ItemRef {
    /// Build a reference from its stored parts
    pub fn new(item_type: ItemType, id: i64) -> Self {
        match item_type {
            ItemType::Garage => Self::Garage(id),
            ItemType::Bike => Self::Bike(id),
            ItemType::Section => Self::Section(id),
            ItemType::Part => Self::Part(id),
        }
    }

    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Garage(_) => ItemType::Garage,
            Self::Bike(_) => ItemType::Bike,
            Self::Section(_) => ItemType::Section,
            Self::Part(_) => ItemType::Part,
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            Self::Garage(id) | Self::Bike(id) | Self::Section(id) | Self::Part(id) => id,
        }
    }

    /// The not-found error for this reference
    pub fn not_found(&self) -> crate::Error {
        use crate::Error;
        match *self {
            Self::Garage(id) => Error::GarageNotFound(id),
            Self::Bike(id) => Error::BikeNotFound(id),
            Self::Section(id) => Error::SectionNotFound(id),
            Self::Part(id) => Error::PartNotFound(id),
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.item_type(), self.id())
    }
}
