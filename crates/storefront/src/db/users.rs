//! User repository for database operations.
//!
//! Queries bind at runtime via `sqlx::query_as`; row structs derive `FromRow`
//! and convert into domain types with `TryFrom` so invalid stored data
//! surfaces as [`RepositoryError::DataCorruption`] instead of panicking.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use marigold_core::{Email, Phone, UserId};

use super::RepositoryError;
use crate::models::user::User;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    full_name: String,
    email: String,
    phone: Option<String>,
    google_id: Option<String>,
    profile_image: Option<String>,
    is_admin: bool,
    is_blocked: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
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
            google_id: row.google_id,
            profile_image: row.profile_image,
            is_admin: row.is_admin,
            is_blocked: row.is_blocked,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row type for login queries that also need the stored password hash.
#[derive(Debug, sqlx::FromRow)]
struct UserAuthRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, full_name, email, phone, google_id, profile_image,
                   is_admin, is_blocked, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, full_name, email, phone, google_id, profile_image,
                   is_admin, is_blocked, created_at, updated_at
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user by their Google account ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_google_id(&self, google_id: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, full_name, email, phone, google_id, profile_image,
                   is_admin, is_blocked, created_at, updated_at
            FROM users
            WHERE google_id = $1
            ",
        )
        .bind(google_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a user along with their stored password hash (for login and
    /// password-reset eligibility checks).
    ///
    /// The hash is `None` for accounts created through Google sign-in that
    /// never set a password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_auth_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(User, Option<String>)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserAuthRow>(
            r"
            SELECT id, full_name, email, phone, google_id, profile_image,
                   is_admin, is_blocked, created_at, updated_at, password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => {
                let hash = r.password_hash;
                let user = User::try_from(r.user)?;
                Ok(Some((user, hash)))
            }
            None => Ok(None),
        }
    }

    /// Check whether an email address is already registered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Check whether a phone number is already registered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn phone_exists(&self, phone: &Phone) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)",
        )
        .bind(phone.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Create a user from a verified signup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or phone was taken
    /// between verification and insert.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_from_signup(
        &self,
        full_name: &str,
        email: &Email,
        phone: &Phone,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (full_name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, email, phone, google_id, profile_image,
                      is_admin, is_blocked, created_at, updated_at
            ",
        )
        .bind(full_name)
        .bind(email.as_str())
        .bind(phone.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email or phone already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Create a user from a Google sign-in (no password, no phone yet).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_from_google(
        &self,
        full_name: &str,
        email: &Email,
        google_id: &str,
        profile_image: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (full_name, email, google_id, profile_image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, full_name, email, phone, google_id, profile_image,
                      is_admin, is_blocked, created_at, updated_at
            ",
        )
        .bind(full_name)
        .bind(email.as_str())
        .bind(google_id)
        .bind(profile_image)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Attach a Google account ID to an existing user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn link_google(
        &self,
        id: UserId,
        google_id: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET google_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(google_id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replace a user's password hash, keyed by email (the password-reset
    /// flow identifies the account by its verified email).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has that email.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_password(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Replace a user's email address after a completed email-change flow.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if another user took the email.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_email(&self, id: UserId, email: &Email) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(email.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Update a user's name and phone number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the phone belongs to another user.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_profile(
        &self,
        id: UserId,
        full_name: &str,
        phone: &Phone,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET full_name = $2, phone = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(full_name)
        .bind(phone.as_str())
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("phone already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Store the path of a freshly uploaded profile image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_profile_image(
        &self,
        id: UserId,
        profile_image: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET profile_image = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(profile_image)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Check the blocked flag for a user (used by the per-request middleware).
    ///
    /// Returns `None` if the user no longer exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_blocked(&self, id: UserId) -> Result<Option<bool>, RepositoryError> {
        let blocked = sqlx::query_scalar::<_, bool>(
            "SELECT is_blocked FROM users WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(blocked)
    }
}
