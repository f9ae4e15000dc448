//! Repository for the `deals` table.
//!
//! Like contacts, a deal is live only when both the deal and its account
//! are non-deleted. Deleting a deal cascades to its activities.

use sqlx::PgPool;

use crm_core::pagination::PageParams;
use crm_core::types::DbId;

use crate::models::deal::{CreateDeal, Deal, DealChanges, DealDetail, DealStage};
use crate::repositories::{like_pattern, ActivityRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, account_id, name, stage, amount, close_date, created_at, updated_at";

/// Account-liveness guard appended to every read.
const ACCOUNT_LIVE: &str =
    "EXISTS (SELECT 1 FROM accounts a WHERE a.id = deals.account_id AND a.deleted_at IS NULL)";

/// Filters accepted by [`DealRepo::list`].
#[derive(Debug, Clone, Default)]
pub struct DealFilter {
    pub q: Option<String>,
    pub account_id: Option<DbId>,
    pub stage: Option<DealStage>,
}

/// Provides CRUD operations for deals, including the cascading soft delete
/// of dependent activities.
pub struct DealRepo;

impl DealRepo {
    /// Insert a new deal, returning the created row.
    ///
    /// The caller is responsible for verifying the target account is live.
    pub async fn create(pool: &PgPool, input: &CreateDeal) -> Result<Deal, sqlx::Error> {
        let query = format!(
            "INSERT INTO deals (account_id, name, stage, amount, close_date)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deal>(&query)
            .bind(input.account_id)
            .bind(&input.name)
            .bind(input.stage)
            .bind(input.amount)
            .bind(input.close_date)
            .fetch_one(pool)
            .await
    }

    /// Find a deal by ID. Excludes soft-deleted rows and deals whose
    /// account is soft-deleted.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Deal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM deals
             WHERE id = $1 AND deleted_at IS NULL AND {ACCOUNT_LIVE}"
        );
        sqlx::query_as::<_, Deal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a deal by ID together with its live activities.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<DealDetail>, sqlx::Error> {
        let Some(deal) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let activities = ActivityRepo::list_by_deal(pool, id).await?;
        Ok(Some(DealDetail { deal, activities }))
    }

    /// List deals, newest first, with optional name search plus account and
    /// stage filters.
    pub async fn list(
        pool: &PgPool,
        page: PageParams,
        filter: &DealFilter,
    ) -> Result<(Vec<Deal>, i64), sqlx::Error> {
        let pattern = like_pattern(filter.q.as_deref());

        let where_clause = format!(
            "deleted_at IS NULL AND {ACCOUNT_LIVE}
               AND ($1::text IS NULL OR name ILIKE $1)
               AND ($2::bigint IS NULL OR account_id = $2)
               AND ($3::deal_stage IS NULL OR stage = $3)"
        );

        let query = format!(
            "SELECT {COLUMNS} FROM deals
             WHERE {where_clause}
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5"
        );
        let items = sqlx::query_as::<_, Deal>(&query)
            .bind(&pattern)
            .bind(filter.account_id)
            .bind(filter.stage)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM deals WHERE {where_clause}");
        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(&pattern)
            .bind(filter.account_id)
            .bind(filter.stage)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// List the live deals of one account, newest first. Used by the
    /// account detail view.
    pub async fn list_by_account(pool: &PgPool, account_id: DbId) -> Result<Vec<Deal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM deals
             WHERE account_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Deal>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a fully-resolved update to a deal.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &DealChanges,
    ) -> Result<Option<Deal>, sqlx::Error> {
        let query = format!(
            "UPDATE deals SET
                account_id = $2,
                name = $3,
                stage = $4,
                amount = $5,
                close_date = $6
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Deal>(&query)
            .bind(id)
            .bind(changes.account_id)
            .bind(&changes.name)
            .bind(changes.stage)
            .bind(changes.amount)
            .bind(changes.close_date)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a deal and cascade to its activities within one
    /// transaction.
    ///
    /// Both updates share the same `deleted_at` instant (transaction-time
    /// `NOW()`). Returns `false` without side effects if the deal does not
    /// exist or is already deleted.
    pub async fn soft_delete_cascade(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query(
            "UPDATE deals SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            "UPDATE activities SET deleted_at = NOW()
             WHERE deal_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// True if the deal and its account are both non-deleted.
    pub async fn is_live(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1 FROM deals d
                 JOIN accounts a ON a.id = d.account_id
                 WHERE d.id = $1 AND d.deleted_at IS NULL AND a.deleted_at IS NULL
             )",
        )
        .bind(id)
        .fetch_one(pool)
        .await
    }
}
