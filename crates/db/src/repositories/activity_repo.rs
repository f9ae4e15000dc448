//! Repository for the `activities` table.
//!
//! Activities carry up to three optional parent references. Visibility
//! rules:
//!
//! - A list without parent filters shows an activity when at least one of
//!   its referenced parents is live.
//! - A list filtered by a parent requires that parent to be live.
//! - Get-by-id hides the activity when any referenced parent is dead.

use sqlx::PgPool;

use crm_core::pagination::PageParams;
use crm_core::types::DbId;

use crate::models::activity::{Activity, ActivityChanges, ActivityType, CreateActivity};
use crate::repositories::like_pattern;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, type, subject, body, status, due_date, \
                       account_id, contact_id, deal_id, created_at, updated_at";

/// True when the referenced account exists and is live.
const ACCOUNT_LIVE: &str = "EXISTS (SELECT 1 FROM accounts pa \
     WHERE pa.id = activities.account_id AND pa.deleted_at IS NULL)";

/// True when the referenced contact and its account are both live.
const CONTACT_LIVE: &str = "EXISTS (SELECT 1 FROM contacts pc \
     JOIN accounts pca ON pca.id = pc.account_id \
     WHERE pc.id = activities.contact_id \
       AND pc.deleted_at IS NULL AND pca.deleted_at IS NULL)";

/// True when the referenced deal and its account are both live.
const DEAL_LIVE: &str = "EXISTS (SELECT 1 FROM deals pd \
     JOIN accounts pda ON pda.id = pd.account_id \
     WHERE pd.id = activities.deal_id \
       AND pd.deleted_at IS NULL AND pda.deleted_at IS NULL)";

/// Filters accepted by [`ActivityRepo::list`].
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub q: Option<String>,
    pub account_id: Option<DbId>,
    pub contact_id: Option<DbId>,
    pub deal_id: Option<DbId>,
    pub activity_type: Option<ActivityType>,
}

/// Provides CRUD operations for activities plus parent-liveness checks.
pub struct ActivityRepo;

impl ActivityRepo {
    /// Insert a new activity, returning the created row.
    ///
    /// The caller is responsible for the at-least-one-parent rule and for
    /// verifying each referenced parent is live.
    pub async fn create(pool: &PgPool, input: &CreateActivity) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO activities
                (type, subject, body, status, due_date, account_id, contact_id, deal_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(input.activity_type)
            .bind(&input.subject)
            .bind(&input.body)
            .bind(&input.status)
            .bind(input.due_date)
            .bind(input.account_id)
            .bind(input.contact_id)
            .bind(input.deal_id)
            .fetch_one(pool)
            .await
    }

    /// Find an activity by ID. Excludes soft-deleted rows and rows with
    /// any dead parent reference.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activities
             WHERE id = $1 AND deleted_at IS NULL
               AND (account_id IS NULL OR {ACCOUNT_LIVE})
               AND (contact_id IS NULL OR {CONTACT_LIVE})
               AND (deal_id IS NULL OR {DEAL_LIVE})"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an activity by ID without checking parent liveness. Used by
    /// the update flow, which re-validates the merged parent references
    /// itself.
    pub async fn find_by_id_unchecked(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM activities WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List activities, newest first, with optional subject/body search,
    /// parent filters, and a type filter.
    pub async fn list(
        pool: &PgPool,
        page: PageParams,
        filter: &ActivityFilter,
    ) -> Result<(Vec<Activity>, i64), sqlx::Error> {
        let pattern = like_pattern(filter.q.as_deref());

        // With a parent filter, that parent must be live. Without any,
        // fall back to the any-live-parent rule (EXISTS is false for a
        // null reference, so a plain OR suffices).
        let where_clause = format!(
            "deleted_at IS NULL
               AND ($1::bigint IS NULL OR (account_id = $1 AND {ACCOUNT_LIVE}))
               AND ($2::bigint IS NULL OR (contact_id = $2 AND {CONTACT_LIVE}))
               AND ($3::bigint IS NULL OR (deal_id = $3 AND {DEAL_LIVE}))
               AND ($1::bigint IS NOT NULL OR $2::bigint IS NOT NULL OR $3::bigint IS NOT NULL
                    OR {ACCOUNT_LIVE} OR {CONTACT_LIVE} OR {DEAL_LIVE})
               AND ($4::activity_type IS NULL OR type = $4)
               AND ($5::text IS NULL OR subject ILIKE $5 OR body ILIKE $5)"
        );

        let query = format!(
            "SELECT {COLUMNS} FROM activities
             WHERE {where_clause}
             ORDER BY created_at DESC
             LIMIT $6 OFFSET $7"
        );
        let items = sqlx::query_as::<_, Activity>(&query)
            .bind(filter.account_id)
            .bind(filter.contact_id)
            .bind(filter.deal_id)
            .bind(filter.activity_type)
            .bind(&pattern)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        let count_query = format!("SELECT COUNT(*) FROM activities WHERE {where_clause}");
        let total = sqlx::query_scalar::<_, i64>(&count_query)
            .bind(filter.account_id)
            .bind(filter.contact_id)
            .bind(filter.deal_id)
            .bind(filter.activity_type)
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

        Ok((items, total))
    }

    /// List the live activities directly linked to one account, newest
    /// first. Used by the account detail view.
    pub async fn list_by_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<Activity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activities
             WHERE account_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// List the live activities linked to one deal, newest first. Used by
    /// the deal detail view.
    pub async fn list_by_deal(pool: &PgPool, deal_id: DbId) -> Result<Vec<Activity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM activities
             WHERE deal_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(deal_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a fully-resolved update to an activity.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ActivityChanges,
    ) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!(
            "UPDATE activities SET
                type = $2,
                subject = $3,
                body = $4,
                status = $5,
                due_date = $6,
                account_id = $7,
                contact_id = $8,
                deal_id = $9
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .bind(changes.activity_type)
            .bind(&changes.subject)
            .bind(&changes.body)
            .bind(&changes.status)
            .bind(changes.due_date)
            .bind(changes.account_id)
            .bind(changes.contact_id)
            .bind(changes.deal_id)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an activity by ID. Returns `true` if a row was marked
    /// deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE activities SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Check each non-null parent reference against the live tables.
    ///
    /// Returns the entity name and ID of the first missing (nonexistent or
    /// soft-deleted, directly or via its account) parent, or `None` when
    /// every referenced parent is live.
    pub async fn find_missing_parent(
        pool: &PgPool,
        account_id: Option<DbId>,
        contact_id: Option<DbId>,
        deal_id: Option<DbId>,
    ) -> Result<Option<(&'static str, DbId)>, sqlx::Error> {
        use crate::repositories::{AccountRepo, ContactRepo, DealRepo};

        if let Some(id) = account_id {
            if !AccountRepo::is_live(pool, id).await? {
                return Ok(Some(("Account", id)));
            }
        }
        if let Some(id) = contact_id {
            if !ContactRepo::is_live(pool, id).await? {
                return Ok(Some(("Contact", id)));
            }
        }
        if let Some(id) = deal_id {
            if !DealRepo::is_live(pool, id).await? {
                return Ok(Some(("Deal", id)));
            }
        }
        Ok(None)
    }
}
