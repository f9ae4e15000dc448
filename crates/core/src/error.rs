use crate::types::DbId;

/// Domain errors surfaced by handlers.
///
/// Conflict (409) and internal (500) responses are produced at the HTTP
/// layer from classified database errors, so they have no variant here.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),
}
