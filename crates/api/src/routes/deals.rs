//! Route definitions for the `/deals` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::deal;
use crate::state::AppState;

/// Routes mounted at `/deals`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// GET    /{id}   -> get_by_id
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete (cascades to activities)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(deal::list).post(deal::create))
        .route(
            "/{id}",
            get(deal::get_by_id).put(deal::update).delete(deal::delete),
        )
}
