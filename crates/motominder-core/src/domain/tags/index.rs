//! Tag index - queries over `tagged_items`
//!
//! Resolves tag names to the items carrying all of them, lists the tags of an
//! item, and maintains associations.

use super::entity::{GroupedItems, Tag, TagItems, TaggedItem};
use super::repository::TagRepository;
use crate::commands::bike::SELECT_BIKE;
use crate::commands::garage::SELECT_GARAGE;
use crate::commands::part::SELECT_PART;
use crate::commands::section::SELECT_SECTION;
use crate::commands::{Bike, Garage, Part, Section, optional_text};
use crate::domain::item::{ItemRef, ItemType};
use crate::storage::Database;
use crate::{Error, Result};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use std::collections::{BTreeSet, HashMap};

/// Upper bound on bound parameters per `IN (...)` list
const MAX_IN_LIST: usize = 500;

const SELECT_ITEM_TAGS: &str = r#"
    SELECT t.id, t.name, t.color, t.created_at, t.updated_at
    FROM tags t
    JOIN tagged_items ti ON ti.tag_id = t.id
    WHERE ti.item_type = ? AND ti.item_id = ?
    ORDER BY t.name
"#;

/// A tag together with the item it is attached to
#[derive(sqlx::FromRow)]
struct ItemTagRow {
    item_id: i64,
    #[sqlx(flatten)]
    tag: Tag,
}

/// De-duplicate tag names, keeping first-seen order
pub fn unique_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut unique = Vec::new();
    for name in names {
        let name = name.as_ref();
        if seen.insert(name) {
            unique.push(name.to_string());
        }
    }
    unique
}

/// Index over tag associations
pub struct TagIndex<'a> {
    db: &'a Database,
}

impl<'a> TagIndex<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// IDs of `item_type` items that carry every one of `tag_names`.
    ///
    /// Unknown names match nothing, so any unknown name empties the result.
    /// An empty name set is a caller error; "no tag filter" must be handled
    /// before calling.
    pub async fn resolve_ids_with_all_tags<S: AsRef<str>>(
        &self,
        item_type: ItemType,
        tag_names: &[S],
    ) -> Result<BTreeSet<i64>> {
        let names = unique_names(tag_names);
        if names.is_empty() {
            return Err(Error::invalid("At least one tag name is required"));
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT ti.item_id FROM tagged_items ti JOIN tags t ON t.id = ti.tag_id WHERE ti.item_type = ",
        );
        builder.push_bind(item_type);
        builder.push(" AND t.name IN (");
        let mut separated = builder.separated(", ");
        for name in &names {
            separated.push_bind(name.as_str());
        }
        separated.push_unseparated(") GROUP BY ti.item_id HAVING COUNT(DISTINCT t.name) = ");
        builder.push_bind(names.len() as i64);

        let rows: Vec<(i64,)> = builder.build_query_as().fetch_all(self.db.pool()).await?;
        let ids: BTreeSet<i64> = rows.into_iter().map(|(id,)| id).collect();

        tracing::debug!(%item_type, tags = ?names, matched = ids.len(), "Resolved tag filter");
        Ok(ids)
    }

    /// Tags attached to one item, ordered by name
    pub async fn tags_for(&self, item: ItemRef) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(SELECT_ITEM_TAGS)
            .bind(item.item_type())
            .bind(item.id())
            .fetch_all(self.db.pool())
            .await?;

        Ok(tags)
    }

    /// Tags for many items of one kind at once, keyed by item ID.
    ///
    /// Items without tags are absent from the map.
    pub async fn tags_for_items(
        &self,
        item_type: ItemType,
        item_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<Tag>>> {
        let mut by_item: HashMap<i64, Vec<Tag>> = HashMap::new();

        for chunk in item_ids.chunks(MAX_IN_LIST) {
            let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
                "SELECT ti.item_id, t.id, t.name, t.color, t.created_at, t.updated_at \
                 FROM tags t JOIN tagged_items ti ON ti.tag_id = t.id WHERE ti.item_type = ",
            );
            builder.push_bind(item_type);
            builder.push(" AND ti.item_id IN (");
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(*id);
            }
            separated.push_unseparated(") ORDER BY t.name");

            let rows: Vec<ItemTagRow> = builder.build_query_as().fetch_all(self.db.pool()).await?;
            for row in rows {
                by_item.entry(row.item_id).or_default().push(row.tag);
            }
        }

        Ok(by_item)
    }

    /// Attach a tag to an item.
    ///
    /// The item check and the insert are one statement, so the write lock is
    /// taken up front and a concurrent duplicate loses on the unique index
    /// with [`Error::DuplicateAssignment`].
    pub async fn assign(
        &self,
        tag_id: i64,
        item: ItemRef,
        notes: Option<String>,
    ) -> Result<TaggedItem> {
        let pool = self.db.pool();
        TagRepository::new(self.db).require(tag_id).await?;

        let sql = format!(
            r#"
            INSERT INTO tagged_items (tag_id, item_type, item_id, notes, created_at)
            SELECT ?, ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM {} WHERE id = ?)
            "#,
            item.item_type().table()
        );

        let result = sqlx::query(&sql)
            .bind(tag_id)
            .bind(item.item_type())
            .bind(item.id())
            .bind(optional_text(&notes))
            .bind(Utc::now())
            .bind(item.id())
            .execute(pool)
            .await
            .map_err(|e| {
                if Error::is_unique_violation(&e) {
                    tracing::warn!(tag_id, %item, "Rejected duplicate tag assignment");
                    Error::DuplicateAssignment
                } else if Error::is_foreign_key_violation(&e) {
                    // tag deleted after the lookup
                    Error::TagNotFound(tag_id)
                } else {
                    Error::DatabaseError(e)
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(item.not_found());
        }

        let assignment = sqlx::query_as::<_, TaggedItem>(
            "SELECT id, tag_id, item_type, item_id, notes, created_at FROM tagged_items WHERE id = ?",
        )
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await?;

        tracing::info!(tag_id, %item, "Assigned tag");
        Ok(assignment)
    }

    /// Detach a tag from an item
    pub async fn remove(&self, tag_id: i64, item: ItemRef) -> Result<()> {
        let result = sqlx::query(
            "DELETE FROM tagged_items WHERE tag_id = ? AND item_type = ? AND item_id = ?",
        )
        .bind(tag_id)
        .bind(item.item_type())
        .bind(item.id())
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::AssignmentNotFound);
        }

        tracing::info!(tag_id, %item, "Removed tag");
        Ok(())
    }

    /// Everything a tag is attached to, grouped by kind
    pub async fn items_for_tag(&self, tag_id: i64) -> Result<TagItems> {
        let tag = TagRepository::new(self.db).require(tag_id).await?;
        let pool = self.db.pool();

        let garages = sqlx::query_as::<_, Garage>(&format!(
            "{SELECT_GARAGE} WHERE id IN ({}) ORDER BY name",
            tagged_ids_subquery("garage")
        ))
        .bind(tag_id)
        .fetch_all(pool)
        .await?;

        let bikes = sqlx::query_as::<_, Bike>(&format!(
            "{SELECT_BIKE} WHERE b.id IN ({}) ORDER BY b.make, b.model",
            tagged_ids_subquery("bike")
        ))
        .bind(tag_id)
        .fetch_all(pool)
        .await?;

        let sections = sqlx::query_as::<_, Section>(&format!(
            "{SELECT_SECTION} WHERE id IN ({}) ORDER BY name",
            tagged_ids_subquery("section")
        ))
        .bind(tag_id)
        .fetch_all(pool)
        .await?;

        let parts = sqlx::query_as::<_, Part>(&format!(
            "{SELECT_PART} WHERE id IN ({}) ORDER BY name",
            tagged_ids_subquery("part")
        ))
        .bind(tag_id)
        .fetch_all(pool)
        .await?;

        Ok(TagItems {
            tag,
            items: GroupedItems {
                garages,
                bikes,
                sections,
                parts,
            },
        })
    }

    /// Number of associations a tag has
    pub async fn assignment_count(&self, tag_id: i64) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tagged_items WHERE tag_id = ?")
                .bind(tag_id)
                .fetch_one(self.db.pool())
                .await?;

        Ok(count)
    }
}

/// `item_type` is one of the fixed literals above, never user input
fn tagged_ids_subquery(item_type: &str) -> String {
    format!("SELECT item_id FROM tagged_items WHERE tag_id = ? AND item_type = '{item_type}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{
        BikeRepository, GarageRepository, NewBike, NewGarage, NewPart, NewSection,
        PartRepository, SectionRepository,
    };
    use crate::domain::tags::entity::NewTag;
    use crate::storage::DatabaseConfig;

    struct Fixture {
        db: Database,
        garage: i64,
        bikes: Vec<i64>,
    }

    async fn fixture() -> Fixture {
        let db = Database::in_memory().await.unwrap();
        let garage = GarageRepository::new(&db)
            .create(&NewGarage::new("Home"))
            .await
            .unwrap()
            .id;
        let mut bikes = Vec::new();
        for (make, model) in [("Honda", "CB500"), ("KTM", "690"), ("Vespa", "PX")] {
            let bike = BikeRepository::new(&db)
                .create(&NewBike::new(garage, make, model))
                .await
                .unwrap();
            bikes.push(bike.id);
        }
        Fixture { db, garage, bikes }
    }

    async fn tag(db: &Database, name: &str) -> i64 {
        TagRepository::new(db).create(&NewTag::new(name)).await.unwrap().id
    }

    #[test]
    fn test_unique_names_keeps_first_seen_order() {
        assert_eq!(unique_names(&["b", "a", "b", "c", "a"]), vec!["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_and_semantics() {
        let f = fixture().await;
        let index = TagIndex::new(&f.db);
        let winter = tag(&f.db, "winter").await;
        let project = tag(&f.db, "project").await;

        index.assign(winter, ItemRef::Bike(f.bikes[0]), None).await.unwrap();
        index.assign(project, ItemRef::Bike(f.bikes[0]), None).await.unwrap();
        index.assign(winter, ItemRef::Bike(f.bikes[1]), None).await.unwrap();
        index.assign(project, ItemRef::Garage(f.garage), None).await.unwrap();

        let both = index
            .resolve_ids_with_all_tags(ItemType::Bike, &["winter", "project"])
            .await
            .unwrap();
        assert_eq!(both, BTreeSet::from([f.bikes[0]]));

        let winter_only = index
            .resolve_ids_with_all_tags(ItemType::Bike, &["winter"])
            .await
            .unwrap();
        assert_eq!(winter_only, BTreeSet::from([f.bikes[0], f.bikes[1]]));

        // duplicates in the request do not raise the bar
        let repeated = index
            .resolve_ids_with_all_tags(ItemType::Bike, &["winter", "winter"])
            .await
            .unwrap();
        assert_eq!(repeated, winter_only);

        let garages = index
            .resolve_ids_with_all_tags(ItemType::Garage, &["project"])
            .await
            .unwrap();
        assert_eq!(garages, BTreeSet::from([f.garage]));
    }

    #[tokio::test]
    async fn test_unknown_tag_matches_nothing() {
        let f = fixture().await;
        let index = TagIndex::new(&f.db);
        let winter = tag(&f.db, "winter").await;
        index.assign(winter, ItemRef::Bike(f.bikes[0]), None).await.unwrap();

        let ids = index
            .resolve_ids_with_all_tags(ItemType::Bike, &["winter", "nope"])
            .await
            .unwrap();
        assert!(ids.is_empty());

        let empty: [&str; 0] = [];
        assert!(matches!(
            index.resolve_ids_with_all_tags(ItemType::Bike, &empty).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_assign_validates_references() {
        let f = fixture().await;
        let index = TagIndex::new(&f.db);
        let winter = tag(&f.db, "winter").await;

        assert!(matches!(
            index.assign(999, ItemRef::Bike(f.bikes[0]), None).await,
            Err(Error::TagNotFound(999))
        ));
        assert!(matches!(
            index.assign(winter, ItemRef::Section(42), None).await,
            Err(Error::SectionNotFound(42))
        ));
        assert_eq!(index.assignment_count(winter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_assignment_is_conflict() {
        let f = fixture().await;
        let index = TagIndex::new(&f.db);
        let winter = tag(&f.db, "winter").await;
        let item = ItemRef::Bike(f.bikes[2]);

        let first = index
            .assign(winter, item, Some("stored for winter".into()))
            .await
            .unwrap();
        assert_eq!(first.item(), item);
        assert_eq!(first.notes.as_deref(), Some("stored for winter"));

        assert!(matches!(
            index.assign(winter, item, None).await,
            Err(Error::DuplicateAssignment)
        ));
        assert_eq!(index.assignment_count(winter).await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_assignments_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::with_path(dir.path().join("fleet.db")).max_connections(8);
        let db = Database::new(config).await.unwrap();

        for round in 0..10 {
            let garage = GarageRepository::new(&db)
                .create(&NewGarage::new(format!("Garage {round}")))
                .await
                .unwrap()
                .id;
            let tag_id = tag(&db, &format!("tag-{round}")).await;

            let mut handles = Vec::new();
            for _ in 0..8 {
                let db = db.clone();
                handles.push(tokio::spawn(async move {
                    TagIndex::new(&db)
                        .assign(tag_id, ItemRef::Garage(garage), None)
                        .await
                }));
            }

            let mut assigned = 0;
            for handle in handles {
                match handle.await.unwrap() {
                    Ok(_) => assigned += 1,
                    Err(Error::DuplicateAssignment) => {}
                    Err(e) => panic!("round {round}: unexpected error: {e}"),
                }
            }
            assert_eq!(assigned, 1, "round {round}");
            assert_eq!(TagIndex::new(&db).assignment_count(tag_id).await.unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn test_round_trip() {
        let f = fixture().await;
        let index = TagIndex::new(&f.db);
        let b = tag(&f.db, "b-tag").await;
        let a = tag(&f.db, "a-tag").await;
        let item = ItemRef::Bike(f.bikes[1]);

        index.assign(b, item, None).await.unwrap();
        index.assign(a, item, None).await.unwrap();

        let names: Vec<String> = index
            .tags_for(item)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["a-tag", "b-tag"]);

        let items = index.items_for_tag(a).await.unwrap();
        assert_eq!(items.items.bikes.len(), 1);
        assert_eq!(items.items.bikes[0].id, f.bikes[1]);
        assert!(items.items.garages.is_empty());

        index.remove(a, item).await.unwrap();
        assert_eq!(index.tags_for(item).await.unwrap().len(), 1);
        assert!(index.items_for_tag(a).await.unwrap().items.is_empty());

        assert!(matches!(index.remove(a, item).await, Err(Error::AssignmentNotFound)));
    }

    #[tokio::test]
    async fn test_tags_for_items_batches() {
        let f = fixture().await;
        let index = TagIndex::new(&f.db);
        let winter = tag(&f.db, "winter").await;
        let sold = tag(&f.db, "sold").await;

        index.assign(winter, ItemRef::Bike(f.bikes[0]), None).await.unwrap();
        index.assign(sold, ItemRef::Bike(f.bikes[0]), None).await.unwrap();
        index.assign(sold, ItemRef::Bike(f.bikes[2]), None).await.unwrap();

        let map = index
            .tags_for_items(ItemType::Bike, &f.bikes)
            .await
            .unwrap();
        let first: Vec<&str> = map[&f.bikes[0]].iter().map(|t| t.name.as_str()).collect();
        assert_eq!(first, vec!["sold", "winter"]);
        assert!(!map.contains_key(&f.bikes[1]));
        assert_eq!(map[&f.bikes[2]].len(), 1);

        assert!(index.tags_for_items(ItemType::Part, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_tag_or_item_drops_associations() {
        let f = fixture().await;
        let index = TagIndex::new(&f.db);
        let winter = tag(&f.db, "winter").await;

        let section = SectionRepository::new(&f.db)
            .create(&NewSection::new(f.bikes[0], "Engine"))
            .await
            .unwrap();
        let part = PartRepository::new(&f.db)
            .create(&NewPart::new(section.id, "Piston"))
            .await
            .unwrap();
        index.assign(winter, ItemRef::Part(part.id), None).await.unwrap();
        index.assign(winter, ItemRef::Section(section.id), None).await.unwrap();
        index.assign(winter, ItemRef::Bike(f.bikes[1]), None).await.unwrap();

        BikeRepository::new(&f.db).delete(f.bikes[0]).await.unwrap();
        assert_eq!(index.assignment_count(winter).await.unwrap(), 1);

        TagRepository::new(&f.db).delete(winter).await.unwrap();
        assert!(matches!(
            index.items_for_tag(winter).await,
            Err(Error::TagNotFound(_))
        ));
        assert!(index.tags_for(ItemRef::Bike(f.bikes[1])).await.unwrap().is_empty());
    }
}
