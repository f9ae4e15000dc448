//! Handlers for the `/activities` resource.
//!
//! Activities are validated against two rules on every write:
//!
//! 1. At least one of account_id / contact_id / deal_id must be set
//!    (400 when violated).
//! 2. Every parent reference that is set must resolve to a live record,
//!    including its account ancestor (404 naming the missing parent).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crm_core::error::CoreError;
use crm_core::pagination::{Page, PageParams};
use crm_core::types::DbId;
use crm_db::models::activity::{Activity, ActivityType, CreateActivity, UpdateActivity};
use crm_db::repositories::activity_repo::ActivityFilter;
use crm_db::repositories::ActivityRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Message returned when a write would leave an activity with no parent.
const NO_PARENT_MSG: &str =
    "Activity must be linked to at least one parent (Account, Contact, or Deal)";

/// Query parameters for the activity listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ActivityListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Search term matched against subject and body.
    pub q: Option<String>,
    pub account_id: Option<DbId>,
    pub contact_id: Option<DbId>,
    pub deal_id: Option<DbId>,
    #[serde(rename = "type")]
    pub activity_type: Option<ActivityType>,
}

/// POST /api/v1/activities
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateActivity>,
) -> AppResult<(StatusCode, Json<Activity>)> {
    input.validate()?;
    if !input.has_parent() {
        return Err(AppError::Core(CoreError::Validation(NO_PARENT_MSG.into())));
    }
    require_live_parents(&state, input.account_id, input.contact_id, input.deal_id).await?;

    let activity = ActivityRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// GET /api/v1/activities
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ActivityListQuery>,
) -> AppResult<Json<Page<Activity>>> {
    let page = PageParams {
        page: params.page,
        page_size: params.page_size,
    };
    let filter = ActivityFilter {
        q: params.q,
        account_id: params.account_id,
        contact_id: params.contact_id,
        deal_id: params.deal_id,
        activity_type: params.activity_type,
    };
    let (items, total) = ActivityRepo::list(&state.pool, page, &filter).await?;
    Ok(Json(Page::new(items, page, total)))
}

/// GET /api/v1/activities/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Activity>> {
    let activity = ActivityRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id,
        }))?;
    Ok(Json(activity))
}

/// PUT /api/v1/activities/{id}
///
/// Partial update: absent fields are unchanged; explicit `null` clears
/// nullable fields, including parent references. The merged result must
/// still have at least one live parent.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateActivity>,
) -> AppResult<Json<Activity>> {
    input.validate()?;

    let current = ActivityRepo::find_by_id_unchecked(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id,
        }))?;

    let changes = input.apply_to(&current);
    if !changes.has_parent() {
        return Err(AppError::Core(CoreError::Validation(NO_PARENT_MSG.into())));
    }
    require_live_parents(&state, changes.account_id, changes.contact_id, changes.deal_id).await?;

    let activity = ActivityRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id,
        }))?;
    Ok(Json(activity))
}

/// DELETE /api/v1/activities/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = ActivityRepo::soft_delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Activity",
            id,
        }))
    }
}

/// 404 (naming the offending parent) unless every non-null parent
/// reference resolves to a live record.
async fn require_live_parents(
    state: &AppState,
    account_id: Option<DbId>,
    contact_id: Option<DbId>,
    deal_id: Option<DbId>,
) -> AppResult<()> {
    match ActivityRepo::find_missing_parent(&state.pool, account_id, contact_id, deal_id).await? {
        Some((entity, id)) => Err(AppError::Core(CoreError::NotFound { entity, id })),
        None => Ok(()),
    }
}
