//! Handlers for the `/contacts` resource.
//!
//! Contacts must always belong to a live account, so create and re-parent
//! operations verify the target account before touching the row.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crm_core::error::CoreError;
use crm_core::pagination::{Page, PageParams};
use crm_core::types::DbId;
use crm_db::models::contact::{Contact, CreateContact, UpdateContact};
use crm_db::repositories::{AccountRepo, ContactRepo};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Query parameters for the contact listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ContactListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Search term matched against first name, last name, and email.
    pub q: Option<String>,
}

/// POST /api/v1/contacts
pub async fn create(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateContact>,
) -> AppResult<(StatusCode, Json<Contact>)> {
    input.validate()?;
    require_live_account(&state, input.account_id).await?;
    let contact = ContactRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /api/v1/contacts
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ContactListQuery>,
) -> AppResult<Json<Page<Contact>>> {
    let page = PageParams {
        page: params.page,
        page_size: params.page_size,
    };
    let (items, total) = ContactRepo::list(&state.pool, page, params.q.as_deref()).await?;
    Ok(Json(Page::new(items, page, total)))
}

/// GET /api/v1/contacts/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Contact>> {
    let contact = ContactRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Contact",
            id,
        }))?;
    Ok(Json(contact))
}

/// PUT /api/v1/contacts/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateContact>,
) -> AppResult<Json<Contact>> {
    input.validate()?;
    if let Some(account_id) = input.account_id {
        require_live_account(&state, account_id).await?;
    }
    let contact = ContactRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Contact",
            id,
        }))?;
    Ok(Json(contact))
}

/// DELETE /api/v1/contacts/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = ContactRepo::soft_delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Contact",
            id,
        }))
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
