//! Repositories: one per entity table.
//!
//! Repositories speak `sqlx::Error`; translating "row missing" into a 404
//! is the handlers' job.

pub mod account_repo;
pub mod activity_repo;
pub mod contact_repo;
pub mod deal_repo;

pub use account_repo::AccountRepo;
pub use activity_repo::ActivityRepo;
pub use contact_repo::ContactRepo;
pub use deal_repo::DealRepo;

/// Turn an optional user-supplied search term into an ILIKE pattern.
///
/// Whitespace-only terms count as absent.
pub(crate) fn like_pattern(q: Option<&str>) -> Option<String> {
    q.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{s}%"))
}
