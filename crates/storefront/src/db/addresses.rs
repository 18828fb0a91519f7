//! Address repository for database operations.
//!
//! Every read and write is scoped by the owning user's id so one customer
//! can never touch another customer's address book.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use marigold_core::{AddressId, AddressLabel, Phone, UserId};

use super::RepositoryError;
use crate::models::address::{Address, AddressInput};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` address queries.
#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    label: String,
    recipient_name: String,
    phone: String,
    address_line: String,
    city: String,
    state: String,
    pincode: String,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AddressRow> for Address {
    type Error = RepositoryError;

    fn try_from(row: AddressRow) -> Result<Self, Self::Error> {
        let label: AddressLabel = row.label.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid address label in database: {e}"))
        })?;

        let phone = Phone::parse(&row.phone).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid phone in database: {e}"))
        })?;

        Ok(Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            label,
            recipient_name: row.recipient_name,
            phone,
            address_line: row.address_line,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            is_default: row.is_default,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all addresses for a user, default first, newest after.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, user_id, label, recipient_name, phone, address_line,
                   city, state, pincode, is_default, created_at, updated_at
            FROM addresses
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get one address, scoped to its owner.
    ///
    /// Returns `None` when the address doesn't exist or belongs to someone
    /// else; the two cases are indistinguishable on purpose.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<Option<Address>, RepositoryError> {
        let row = sqlx::query_as::<_, AddressRow>(
            r"
            SELECT id, user_id, label, recipient_name, phone, address_line,
                   city, state, pincode, is_default, created_at, updated_at
            FROM addresses
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create an address for a user.
    ///
    /// When `is_default` is set, any previous default for the same user is
    /// cleared inside the same transaction so at most one default exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1")
                .bind(user_id.as_i32())
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(
            r"
            INSERT INTO addresses
                (user_id, label, recipient_name, phone, address_line,
                 city, state, pincode, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, label, recipient_name, phone, address_line,
                      city, state, pincode, is_default, created_at, updated_at
            ",
        )
        .bind(user_id.as_i32())
        .bind(input.label.as_str())
        .bind(&input.recipient_name)
        .bind(input.phone.as_str())
        .bind(&input.address_line)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.pincode)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row.try_into()
    }

    /// Update an address, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist or
    /// belongs to another user.
    /// Returns `RepositoryError::Database` if the transaction fails.
    pub async fn update_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query("UPDATE addresses SET is_default = FALSE WHERE user_id = $1 AND id <> $2")
                .bind(user_id.as_i32())
                .bind(id.as_i32())
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query(
            r"
            UPDATE addresses
            SET label = $3, recipient_name = $4, phone = $5, address_line = $6,
                city = $7, state = $8, pincode = $9, is_default = $10,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(input.label.as_str())
        .bind(&input.recipient_name)
        .bind(input.phone.as_str())
        .bind(&input.address_line)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.pincode)
        .bind(input.is_default)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;
        Ok(())
    }

    /// Delete an address, scoped to its owner.
    ///
    /// # Returns
    ///
    /// Returns `true` if the address was deleted, `false` if it didn't exist
    /// (or belongs to another user).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_for_user(
        &self,
        id: AddressId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(id.as_i32())
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
