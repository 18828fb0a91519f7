//! Catalog taxonomy queries (categories and styles).
//!
//! The two tables have identical shapes and identical CRUD, so one
//! repository serves both; the table name comes from a fixed enum, never
//! from user input.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use marigold_core::UserId;

use super::RepositoryError;

/// Which taxonomy table a repository instance operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogTable {
    Categories,
    Styles,
}

impl CatalogTable {
    const fn table(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Styles => "styles",
        }
    }
}

/// A category or style row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogEntry {
    pub id: i32,
    pub name: String,
    pub is_listed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const ENTRY_COLUMNS: &str = "id, name, is_listed, created_at, updated_at";

/// Map a unique-index violation on `LOWER(name)` to a `Conflict`.
fn map_insert_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict("name already in use".to_owned());
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for catalog taxonomy CRUD.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
    table: CatalogTable,
}

impl<'a> CatalogRepository<'a> {
    /// Create a repository over the `categories` table.
    #[must_use]
    pub const fn categories(pool: &'a PgPool) -> Self {
        Self {
            pool,
            table: CatalogTable::Categories,
        }
    }

    /// Create a repository over the `styles` table.
    #[must_use]
    pub const fn styles(pool: &'a PgPool) -> Self {
        Self {
            pool,
            table: CatalogTable::Styles,
        }
    }

    /// List every entry, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<CatalogEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM {} ORDER BY created_at DESC",
            self.table.table()
        );
        let entries = sqlx::query_as::<_, CatalogEntry>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(entries)
    }

    /// Insert a new entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is already taken
    /// (case-insensitive, enforced by a unique index on `LOWER(name)`).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &self,
        name: &str,
        is_listed: bool,
        created_by: UserId,
    ) -> Result<CatalogEntry, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} (name, is_listed, created_by)
             VALUES ($1, $2, $3)
             RETURNING {ENTRY_COLUMNS}",
            self.table.table()
        );
        sqlx::query_as::<_, CatalogEntry>(&sql)
            .bind(name)
            .bind(is_listed)
            .bind(created_by.as_i32())
            .fetch_one(self.pool)
            .await
            .map_err(map_insert_error)
    }

    /// Get an entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: i32) -> Result<Option<CatalogEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM {} WHERE id = $1",
            self.table.table()
        );
        let entry = sqlx::query_as::<_, CatalogEntry>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(entry)
    }

    /// Apply a partial update; `None` fields keep their current value.
    ///
    /// Returns `None` if no entry has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a rename collides with an
    /// existing name. Returns `RepositoryError::Database` for other
    /// database errors.
    pub async fn update(
        &self,
        id: i32,
        name: Option<&str>,
        is_listed: Option<bool>,
    ) -> Result<Option<CatalogEntry>, RepositoryError> {
        let sql = format!(
            "UPDATE {}
             SET name = COALESCE($2, name),
                 is_listed = COALESCE($3, is_listed),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {ENTRY_COLUMNS}",
            self.table.table()
        );
        sqlx::query_as::<_, CatalogEntry>(&sql)
            .bind(id)
            .bind(name)
            .bind(is_listed)
            .fetch_optional(self.pool)
            .await
            .map_err(map_insert_error)
    }

    /// Flip the listed flag, returning the new value.
    ///
    /// Returns `None` if no entry has this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn toggle_listing(&self, id: i32) -> Result<Option<bool>, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET is_listed = NOT is_listed, updated_at = NOW()
             WHERE id = $1 RETURNING is_listed",
            self.table.table()
        );
        let is_listed = sqlx::query_scalar::<_, bool>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(is_listed)
    }

    /// Hard-delete an entry. Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: i32) -> Result<bool, RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 RETURNING id", self.table.table());
        let deleted = sqlx::query_scalar::<_, i32>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(deleted.is_some())
    }

    /// Count entries for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table.table());
        let count = sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_table_names() {
        assert_eq!(CatalogTable::Categories.table(), "categories");
        assert_eq!(CatalogTable::Styles.table(), "styles");
    }
}
