use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use shared::{Child, SavedSnack};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Row, SqlitePool};

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Foreign keys are off by default in SQLite; saved snacks must not
        // outlive their child.
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS children (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                exclusions TEXT NOT NULL DEFAULT ''
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS child_snacks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                child_id INTEGER NOT NULL REFERENCES children(id) ON DELETE CASCADE,
                snack TEXT NOT NULL,
                image_url TEXT NOT NULL DEFAULT ''
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// List every child in the roster, oldest first.
    pub async fn list_children(&self) -> Result<Vec<Child>> {
        let rows = sqlx::query("SELECT id, name, exclusions FROM children ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;
        Ok(rows.iter().map(child_from_row).collect())
    }

    /// Retrieve a child by id
    pub async fn get_child(&self, id: i64) -> Result<Option<Child>> {
        let row = sqlx::query("SELECT id, name, exclusions FROM children WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.as_ref().map(child_from_row))
    }

    /// Fetch the children matching the given ids. Unknown ids are simply
    /// absent from the result.
    pub async fn children_by_ids(&self, ids: &[i64]) -> Result<Vec<Child>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT id, name, exclusions FROM children WHERE id IN ({placeholders}) ORDER BY id"
        );
        let mut query = sqlx::query(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query.fetch_all(&*self.pool).await?;
        Ok(rows.iter().map(child_from_row).collect())
    }

    /// Insert a new child and return the stored row with its assigned id.
    pub async fn insert_child(&self, name: &str, exclusions: &str) -> Result<Child> {
        let result = sqlx::query("INSERT INTO children (name, exclusions) VALUES (?, ?)")
            .bind(name)
            .bind(exclusions)
            .execute(&*self.pool)
            .await?;
        Ok(Child {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            exclusions: exclusions.to_string(),
        })
    }

    /// Overwrite a child's name and exclusions. Returns false when the id is
    /// unknown.
    pub async fn update_child(&self, child: &Child) -> Result<bool> {
        let result = sqlx::query("UPDATE children SET name = ?, exclusions = ? WHERE id = ?")
            .bind(&child.name)
            .bind(&child.exclusions)
            .bind(child.id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a child by id. Saved snacks for the child are removed by the
    /// cascade. Returns false when the id is unknown.
    pub async fn delete_child(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM children WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the snacks saved for one child, oldest first.
    pub async fn list_snacks_for_child(&self, child_id: i64) -> Result<Vec<SavedSnack>> {
        let rows = sqlx::query(
            "SELECT id, snack, image_url FROM child_snacks WHERE child_id = ? ORDER BY id",
        )
        .bind(child_id)
        .fetch_all(&*self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|row| SavedSnack {
                id: row.get("id"),
                snack: row.get("snack"),
                image_url: row.get("image_url"),
            })
            .collect())
    }

    /// Look up a saved snack by its child and exact text, returning its id.
    pub async fn find_saved_snack(&self, child_id: i64, snack: &str) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT id FROM child_snacks WHERE child_id = ? AND snack = ?")
            .bind(child_id)
            .bind(snack)
            .fetch_optional(&*self.pool)
            .await?;
        Ok(row.map(|r| r.get("id")))
    }

    /// Persist a snack for a child and return the new row id.
    pub async fn insert_snack(&self, child_id: i64, snack: &str, image_url: &str) -> Result<i64> {
        let result =
            sqlx::query("INSERT INTO child_snacks (child_id, snack, image_url) VALUES (?, ?, ?)")
                .bind(child_id)
                .bind(snack)
                .bind(image_url)
                .execute(&*self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// Delete a saved snack by id. Returns false when the id is unknown.
    pub async fn delete_snack(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM child_snacks WHERE id = ?")
            .bind(id)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn child_from_row(row: &sqlx::sqlite::SqliteRow) -> Child {
    Child {
        id: row.get("id"),
        name: row.get("name"),
        exclusions: row.get("exclusions"),
    }
}
