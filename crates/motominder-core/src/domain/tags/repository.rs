//! Tag catalogue persistence

use super::entity::{DEFAULT_TAG_COLOR, NewTag, Tag};
use crate::commands::{optional_text, required_text};
use crate::storage::Database;
use crate::{Error, Result};
use chrono::Utc;

pub(crate) const SELECT_TAG: &str = "SELECT id, name, color, created_at, updated_at FROM tags";

/// Repository for the tag catalogue
pub struct TagRepository<'a> {
    db: &'a Database,
}

impl<'a> TagRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All tags ordered by name
    pub async fn list(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(&format!("{SELECT_TAG} ORDER BY name"))
            .fetch_all(self.db.pool())
            .await?;

        Ok(tags)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Tag>> {
        let tag = sqlx::query_as::<_, Tag>(&format!("{SELECT_TAG} WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(tag)
    }

    pub async fn require(&self, id: i64) -> Result<Tag> {
        self.get(id).await?.ok_or(Error::TagNotFound(id))
    }

    /// Create a tag. Names are unique.
    pub async fn create(&self, input: &NewTag) -> Result<Tag> {
        let name = required_text(&input.name, "Tag name is required")?;
        let color = optional_text(&input.color).unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string());
        let now = Utc::now();

        let id = sqlx::query(
            "INSERT INTO tags (name, color, created_at, updated_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&name)
        .bind(&color)
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await
        .map_err(|e| duplicate_name_or(e, &name))?
        .last_insert_rowid();

        tracing::info!(tag_id = id, name = %name, "Created tag");
        self.require(id).await
    }

    /// Rename or recolor a tag. A missing color keeps the current one.
    pub async fn update(&self, id: i64, input: &NewTag) -> Result<Tag> {
        let name = required_text(&input.name, "Tag name is required")?;
        let current = self.require(id).await?;
        let color = optional_text(&input.color).unwrap_or(current.color);

        sqlx::query("UPDATE tags SET name = ?, color = ?, updated_at = ? WHERE id = ?")
            .bind(&name)
            .bind(&color)
            .bind(Utc::now())
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(|e| duplicate_name_or(e, &name))?;

        self.require(id).await
    }

    /// Delete a tag; its associations go with it
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::TagNotFound(id));
        }

        tracing::info!(tag_id = id, "Deleted tag");
        Ok(())
    }
}

fn duplicate_name_or(err: sqlx::Error, name: &str) -> Error {
    if Error::is_unique_violation(&err) {
        tracing::warn!(tag = name, "Rejected duplicate tag name");
        Error::DuplicateTagName(name.to_string())
    } else {
        Error::DatabaseError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_defaults_color() {
        let db = Database::in_memory().await.unwrap();
        let repo = TagRepository::new(&db);

        let tag = repo.create(&NewTag::new(" winter ")).await.unwrap();
        assert_eq!(tag.name, "winter");
        assert_eq!(tag.color, DEFAULT_TAG_COLOR);

        let red = repo
            .create(&NewTag::new("needs-work").with_color("#e74c3c"))
            .await
            .unwrap();
        assert_eq!(red.color, "#e74c3c");

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["needs-work", "winter"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_is_conflict() {
        let db = Database::in_memory().await.unwrap();
        let repo = TagRepository::new(&db);

        repo.create(&NewTag::new("race")).await.unwrap();
        let err = repo.create(&NewTag::new("race")).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateTagName(ref n) if n == "race"));

        // names are case-sensitive
        repo.create(&NewTag::new("Race")).await.unwrap();
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_color_and_checks_name() {
        let db = Database::in_memory().await.unwrap();
        let repo = TagRepository::new(&db);

        let a = repo.create(&NewTag::new("a").with_color("#000000")).await.unwrap();
        repo.create(&NewTag::new("b")).await.unwrap();

        let renamed = repo.update(a.id, &NewTag::new("c")).await.unwrap();
        assert_eq!(renamed.name, "c");
        assert_eq!(renamed.color, "#000000");

        assert!(matches!(
            repo.update(a.id, &NewTag::new("b")).await,
            Err(Error::DuplicateTagName(_))
        ));
        assert!(matches!(
            repo.update(404, &NewTag::new("z")).await,
            Err(Error::TagNotFound(404))
        ));
        assert!(matches!(repo.create(&NewTag::new("")).await, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::in_memory().await.unwrap();
        let repo = TagRepository::new(&db);

        let tag = repo.create(&NewTag::new("gone")).await.unwrap();
        repo.delete(tag.id).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
        assert!(matches!(repo.delete(tag.id).await, Err(Error::TagNotFound(_))));
    }
}
