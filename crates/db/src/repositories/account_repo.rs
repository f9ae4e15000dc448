//! Repository for the `accounts` table.

use sqlx::PgPool;

use crm_core::pagination::PageParams;
use crm_core::types::DbId;

use crate::models::account::{Account, AccountDetail, CreateAccount, UpdateAccount};
use crate::repositories::{like_pattern, ActivityRepo, ContactRepo, DealRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, industry, website, phone, created_at, updated_at";

/// Provides CRUD operations for accounts, including the cascading
/// soft delete of dependent contacts, deals, and activities.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (name, industry, website, phone)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(&input.name)
            .bind(&input.industry)
            .bind(&input.website)
            .bind(&input.phone)
            .fetch_one(pool)
            .await
    }

    /// Find an account by ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by ID together with its live contacts, deals, and
    /// directly linked activities.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<AccountDetail>, sqlx::Error> {
        let Some(account) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let contacts = ContactRepo::list_by_account(pool, id).await?;
        let deals = DealRepo::list_by_account(pool, id).await?;
        let activities = ActivityRepo::list_by_account(pool, id).await?;
        Ok(Some(AccountDetail {
            account,
            contacts,
            deals,
            activities,
        }))
    }

    /// List accounts, newest first, with optional name search.
    ///
    /// Returns the page of rows plus the total row count for the same
    /// filter, for building pagination metadata.
    pub async fn list(
        pool: &PgPool,
        page: PageParams,
        q: Option<&str>,
    ) -> Result<(Vec<Account>, i64), sqlx::Error> {
        let pattern = like_pattern(q);

        let query = format!(
            "SELECT {COLUMNS} FROM accounts
             WHERE deleted_at IS NULL
               AND ($1::text IS NULL OR name ILIKE $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, Account>(&query)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM accounts
             WHERE deleted_at IS NULL
               AND ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

        Ok((items, total))
    }

    /// Update an account. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAccount,
    ) -> Result<Option<Account>, sqlx::Error> {
        let query = format!(
            "UPDATE accounts SET
                name = COALESCE($2, name),
                industry = COALESCE($3, industry),
                website = COALESCE($4, website),
                phone = COALESCE($5, phone)
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.industry)
            .bind(&input.website)
            .bind(&input.phone)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an account and cascade to its contacts, deals, and
    /// directly linked activities, all within one transaction.
    ///
    /// Every cascaded row receives the same `deleted_at` instant
    /// (transaction-time `NOW()`). Returns `false` without side effects if
    /// the account does not exist or is already deleted.
    pub async fn soft_delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE accounts SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE contacts SET deleted_at = NOW()
             WHERE account_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE deals SET deleted_at = NOW()
             WHERE account_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE activities SET deleted_at = NOW()
             WHERE account_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// True if the account exists and is not soft-deleted.
    pub async fn is_live(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM accounts WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
