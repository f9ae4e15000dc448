//! Repository for the `contacts` table.
//!
//! A contact is live only when the contact itself and its account are both
//! non-deleted; every read enforces the account half with an EXISTS
//! subquery.

use sqlx::PgPool;

use crm_core::pagination::PageParams;
use crm_core::types::DbId;

use crate::models::contact::{Contact, CreateContact, UpdateContact};
use crate::repositories::like_pattern;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, account_id, first_name, last_name, email, phone, title, created_at, updated_at";

/// Account-liveness guard appended to every read.
const ACCOUNT_LIVE: &str =
    "EXISTS (SELECT 1 FROM accounts a WHERE a.id = contacts.account_id AND a.deleted_at IS NULL)";

/// Provides CRUD operations for contacts.
pub struct ContactRepo;

impl ContactRepo {
    /// Insert a new contact, returning the created row.
    ///
    /// The caller is responsible for verifying the target account is live.
    pub async fn create(pool: &PgPool, input: &CreateContact) -> Result<Contact, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (account_id, first_name, last_name, email, phone, title)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(input.account_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    /// Find a contact by ID. Excludes soft-deleted rows and contacts whose
    /// account is soft-deleted.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts
             WHERE id = $1 AND deleted_at IS NULL AND {ACCOUNT_LIVE}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List contacts, newest first, with optional search across first name,
    /// last name, and email.
    pub async fn list(
        pool: &PgPool,
        page: PageParams,
        q: Option<&str>,
    ) -> Result<(Vec<Contact>, i64), sqlx::Error> {
        let pattern = like_pattern(q);

        let filter = format!(
            "deleted_at IS NULL AND {ACCOUNT_LIVE}
               AND ($1::text IS NULL
                    OR first_name ILIKE $1
                    OR last_name ILIKE $1
                    OR email ILIKE $1)"
        );

        let query = format!(
            "SELECT {COLUMNS} FROM contacts
             WHERE {filter}
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, Contact>(&query)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM contacts WHERE {filter}");
        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// List the live contacts of one account, newest first. Used by the
    /// account detail view.
    pub async fn list_by_account(pool: &PgPool, account_id: DbId) -> Result<Vec<Contact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM contacts
             WHERE account_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Update a contact. Only non-`None` fields in `input` are applied.
    ///
    /// The caller is responsible for verifying a new `account_id` is live.
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateContact,
    ) -> Result<Option<Contact>, sqlx::Error> {
        let query = format!(
            "UPDATE contacts SET
                account_id = COALESCE($2, account_id),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                title = COALESCE($7, title)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Contact>(&query)
            .bind(id)
            .bind(input.account_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.title)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a contact by ID. Returns `true` if a row was marked
    /// deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE contacts SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// True if the contact and its account are both non-deleted.
    pub async fn is_live(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1 FROM contacts c
                 JOIN accounts a ON a.id = c.account_id
                 WHERE c.id = $1 AND c.deleted_at IS NULL AND a.deleted_at IS NULL
             )",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
