//! Handlers for the `/accounts` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crm_core::error::CoreError;
use crm_core::pagination::{Page, PageParams};
use crm_core::types::DbId;
use crm_db::models::account::{Account, AccountDetail, CreateAccount, UpdateAccount};
use crm_db::repositories::AccountRepo;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Query parameters for the account listing endpoint.
#[derive(Debug, Deserialize)]
pub struct AccountListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Search term matched against the account name.
    pub q: Option<String>,
}

/// POST /api/v1/accounts
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateAccount>,
) -> AppResult<(StatusCode, Json<Account>)> {
    input.validate()?;
    let account = AccountRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// GET /api/v1/accounts
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<AccountListQuery>,
) -> AppResult<Json<Page<Account>>> {
    let page = PageParams {
        page: params.page,
        page_size: params.page_size,
    };
    let (items, total) = AccountRepo::list(&state.pool, page, params.q.as_deref()).await?;
    Ok(Json(Page::new(items, page, total)))
}

/// GET /api/v1/accounts/{id}
///
/// Returns the account together with its live contacts, deals, and
/// activities.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<AccountDetail>> {
    let detail = AccountRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id,
        }))?;
    Ok(Json(detail))
}

/// PUT /api/v1/accounts/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateAccount>,
) -> AppResult<Json<Account>> {
    input.validate()?;
    let account = AccountRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id,
        }))?;
    Ok(Json(account))
}

/// DELETE /api/v1/accounts/{id}
///
/// Soft-deletes the account and cascades to its contacts, deals, and
/// activities in one transaction.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = AccountRepo::soft_delete_cascade(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Account",
            id,
        }))
    }
}
