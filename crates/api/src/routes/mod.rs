pub mod accounts;
pub mod activities;
pub mod contacts;
pub mod deals;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /accounts            list, create
/// /accounts/{id}       get (with related entities), update, delete (cascades)
///
/// /contacts            list, create
/// /contacts/{id}       get, update, delete
///
/// /deals               list, create
/// /deals/{id}          get (with activities), update, delete (cascades)
///
/// /activities          list, create
/// /activities/{id}     get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/contacts", contacts::router())
        .nest("/deals", deals::router())
        .nest("/activities", activities::router())
}
