//! User queries for the admin panel.
//!
//! Customer listing, block toggling, and the login-time account lookup.
//! Queries bind at runtime via `sqlx::query_as`; row structs convert into
//! domain types with `TryFrom` so invalid stored data surfaces as
//! [`RepositoryError::DataCorruption`] instead of panicking.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use marigold_core::{Email, Phone, UserId};

use super::RepositoryError;
use crate::models::user::{AdminAccount, Customer};

/// Sort order for the customer listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest accounts first.
    Asc,
    /// Newest accounts first (default).
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse the `sort` query parameter; anything but `asc` means descending.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == "asc" { Self::Asc } else { Self::Desc }
    }

    /// The query-string value for building pagination links.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One page of the customer listing plus the total match count.
#[derive(Debug)]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub total: i64,
}

/// Outcome of a block toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockToggle {
    /// The flag was flipped; carries the new value.
    Toggled { is_blocked: bool },
    /// The target is an admin account, which can never be blocked.
    AdminAccount,
}

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for customer listing queries.
#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: i32,
    full_name: String,
    email: String,
    phone: Option<String>,
    is_blocked: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for Customer {
    type Error = RepositoryError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let phone = row
            .phone
            .as_deref()
            .map(Phone::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
            })?;

        Ok(Self {
            id: UserId::new(row.id),
            full_name: row.full_name,
            email,
            phone,
            is_blocked: row.is_blocked,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for the admin login lookup.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: i32,
    full_name: String,
    email: String,
    password_hash: Option<String>,
    google_id: Option<String>,
    is_admin: bool,
    is_blocked: bool,
}

impl TryFrom<AccountRow> for AdminAccount {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            full_name: row.full_name,
            password_hash: row.password_hash,
            google_id: row.google_id,
            is_admin: row.is_admin,
            is_blocked: row.is_blocked,
        })
    }
}

/// Turn a raw search term into an `ILIKE` pattern with wildcards escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user queries made from the admin panel.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Look up an account by email for the admin login flow.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_account_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<AdminAccount>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(
            r"
            SELECT id, full_name, email, password_hash, google_id,
                   is_admin, is_blocked
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Fetch one page of the customer listing.
    ///
    /// Admin accounts are excluded. An empty search term matches everyone;
    /// otherwise it is a case-insensitive substring match over name, email,
    /// and phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a row is invalid.
    pub async fn customer_page(
        &self,
        search: &str,
        sort: SortOrder,
        page: i64,
        per_page: i64,
    ) -> Result<CustomerPage, RepositoryError> {
        let offset = (page - 1) * per_page;
        let pattern = like_pattern(search);

        // The ORDER BY direction comes from a fixed enum, never user input.
        let list_sql = format!(
            r"
            SELECT id, full_name, email, phone, is_blocked, created_at
            FROM users
            WHERE is_admin = FALSE
              AND ($1 = '' OR full_name ILIKE $2 OR email ILIKE $2 OR phone ILIKE $2)
            ORDER BY created_at {}
            LIMIT $3 OFFSET $4
            ",
            sort.sql()
        );

        let rows = sqlx::query_as::<_, CustomerRow>(&list_sql)
            .bind(search)
            .bind(&pattern)
            .bind(per_page)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM users
            WHERE is_admin = FALSE
              AND ($1 = '' OR full_name ILIKE $2 OR email ILIKE $2 OR phone ILIKE $2)
            ",
        )
        .bind(search)
        .bind(&pattern)
        .fetch_one(self.pool)
        .await?;

        let customers = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Customer>, _>>()?;

        Ok(CustomerPage { customers, total })
    }

    /// Count non-admin accounts for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_customers(&self) -> Result<i64, RepositoryError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE is_admin = FALSE")
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Flip the `is_blocked` flag on a customer account.
    ///
    /// Admin accounts are never touched: the UPDATE itself carries the
    /// `is_admin = FALSE` guard, so a racing promotion cannot slip a block
    /// onto an admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has this ID.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn toggle_block(&self, id: UserId) -> Result<BlockToggle, RepositoryError> {
        let updated = sqlx::query_scalar::<_, bool>(
            r"
            UPDATE users
            SET is_blocked = NOT is_blocked, updated_at = NOW()
            WHERE id = $1 AND is_admin = FALSE
            RETURNING is_blocked
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        if let Some(is_blocked) = updated {
            return Ok(BlockToggle::Toggled { is_blocked });
        }

        // No row updated: either the user is an admin or does not exist.
        let is_admin =
            sqlx::query_scalar::<_, bool>("SELECT is_admin FROM users WHERE id = $1")
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        match is_admin {
            Some(true) => Ok(BlockToggle::AdminAccount),
            _ => Err(RepositoryError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("desc"), SortOrder::Desc);
        // Anything unexpected falls back to newest-first
        assert_eq!(SortOrder::parse("ASC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse(""), SortOrder::Desc);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("jane"), "%jane%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }
}
