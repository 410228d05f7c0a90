//! Search query and result types

use crate::commands::{Bike, Garage, Part, Section};
use crate::domain::item::ItemType;
use crate::domain::tags::{Tag, unique_names};
use serde::{Deserialize, Serialize};

/// A search request: free text, an AND tag filter and an optional kind filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive substring to look for; empty matches everything
    pub text: String,

    /// Tag names every result must carry (empty means no tag filter)
    pub tags: Vec<String>,

    /// Raw kind filter as supplied by the caller
    pub entity_type: Option<String>,
}

impl SearchQuery {
    /// Create a query matching `text` across every kind
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Require every one of `tags` (names are trimmed, blanks and repeats dropped)
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let trimmed: Vec<String> = tags
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        self.tags = unique_names(&trimmed);
        self
    }

    /// Require a comma-separated tag list such as `"winter, project"`
    pub fn with_tag_list(self, list: &str) -> Self {
        self.with_tags(list.split(','))
    }

    /// Restrict to one kind. Blank values mean no restriction.
    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        let entity_type = entity_type.into();
        self.entity_type = if entity_type.trim().is_empty() {
            None
        } else {
            Some(entity_type)
        };
        self
    }

    /// Text used for matching
    pub fn needle(&self) -> &str {
        self.text.trim()
    }

    /// Kinds to search.
    ///
    /// All four without a filter, one for a known kind, none for anything
    /// else.
    pub fn scope(&self) -> Vec<ItemType> {
        match self.entity_type.as_deref() {
            None => ItemType::ALL.to_vec(),
            Some(raw) => ItemType::parse(raw).into_iter().collect(),
        }
    }

    pub fn has_tag_filter(&self) -> bool {
        !self.tags.is_empty()
    }
}

/// Common surface of result rows so tags can be attached generically
pub trait SearchHit {
    fn item_id(&self) -> i64;
    fn set_tags(&mut self, tags: Vec<Tag>);
    fn tags(&self) -> &[Tag];
}

macro_rules! impl_search_hit {
    ($hit:ty, $field:ident) => {
        impl SearchHit for $hit {
            fn item_id(&self) -> i64 {
                self.$field.id
            }

            fn set_tags(&mut self, tags: Vec<Tag>) {
                self.tags = tags;
            }

            fn tags(&self) -> &[Tag] {
                &self.tags
            }
        }
    };
}

/// A matching garage
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GarageHit {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub garage: Garage,
    #[sqlx(skip)]
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// A matching bike; `garage_name` travels on [`Bike`]
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BikeHit {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub bike: Bike,
    #[sqlx(skip)]
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// A matching section with its bike and garage
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SectionHit {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub section: Section,
    pub make: String,
    pub model: String,
    pub year: Option<i64>,
    pub garage_name: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// A matching part with its section, bike and garage
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PartHit {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub part: Part,
    pub section_name: String,
    pub make: String,
    pub model: String,
    pub year: Option<i64>,
    pub garage_name: String,
    #[sqlx(skip)]
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl_search_hit!(GarageHit, garage);
impl_search_hit!(BikeHit, bike);
impl_search_hit!(SectionHit, section);
impl_search_hit!(PartHit, part);

/// Search results, one sequence per kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    pub garages: Vec<GarageHit>,
    pub bikes: Vec<BikeHit>,
    pub sections: Vec<SectionHit>,
    pub parts: Vec<PartHit>,
}

impl SearchResults {
    /// Sum of the four sequence lengths
    pub fn total(&self) -> usize {
        self.garages.len() + self.bikes.len() + self.sections.len() + self.parts.len()
    }
}
