//! Handlers for the `/deals` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crm_core::error::CoreError;
use crm_core::pagination::{Page, PageParams};
use crm_core::types::DbId;
use crm_db::models::deal::{CreateDeal, Deal, DealDetail, DealStage, UpdateDeal};
use crm_db::repositories::deal_repo::DealFilter;
use crm_db::repositories::{AccountRepo, DealRepo};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Query parameters for the deal listing endpoint.
#[derive(Debug, Deserialize)]
pub struct DealListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Search term matched against the deal name.
    pub q: Option<String>,
    pub account_id: Option<DbId>,
    pub stage: Option<DealStage>,
}

/// POST /api/v1/deals
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateDeal>,
) -> AppResult<(StatusCode, Json<Deal>)> {
    input.validate()?;
    require_live_account(&state, input.account_id).await?;
    let deal = DealRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(deal)))
}

/// GET /api/v1/deals
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<DealListQuery>,
) -> AppResult<Json<Page<Deal>>> {
    let page = PageParams {
        page: params.page,
        page_size: params.page_size,
    };
    let filter = DealFilter {
        q: params.q,
        account_id: params.account_id,
        stage: params.stage,
    };
    let (items, total) = DealRepo::list(&state.pool, page, &filter).await?;
    Ok(Json(Page::new(items, page, total)))
}

/// GET /api/v1/deals/{id}
///
/// Returns the deal together with its live activities.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DealDetail>> {
    let detail = DealRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Deal", id }))?;
    Ok(Json(detail))
}

/// PUT /api/v1/deals/{id}
///
/// Partial update: absent fields are unchanged; explicit `null` clears
/// `amount` / `close_date`. A changed `account_id` must point at a live
/// account.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateDeal>,
) -> AppResult<Json<Deal>> {
    input.validate()?;

    let current = DealRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Deal", id }))?;

    if let Some(account_id) = input.account_id {
        require_live_account(&state, account_id).await?;
    }

    let changes = input.apply_to(&current);
    let deal = DealRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Deal", id }))?;
    Ok(Json(deal))
}

/// DELETE /api/v1/deals/{id}
///
/// Soft-deletes the deal and cascades to its activities in one
/// transaction.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = DealRepo::soft_delete_cascade(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound { entity: "Deal", id }))
    }
}

/// 404 unless the account exists and is live.
async fn require_live_account(state: &AppState, id: DbId) -> AppResult<()> {
    if AccountRepo::is_live(&state.pool, id).await? {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id,
        }))
    }
}
