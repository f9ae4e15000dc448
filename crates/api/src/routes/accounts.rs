//! Route definitions for the `/accounts` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::account;
use crate::state::AppState;

/// Routes mounted at `/accounts`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete (cascades to contacts, deals, activities)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(account::list).post(account::create))
        .route(
            "/{id}",
            get(account::get_by_id)
                .put(account::update)
                .delete(account::delete),
        )
}
