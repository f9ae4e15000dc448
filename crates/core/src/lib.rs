//! Shared domain types for the CRM backend.
//!
//! Holds the pieces every other crate needs: ID and timestamp aliases,
//! the domain error enum, and pure pagination logic.

pub mod error;
pub mod pagination;
pub mod types;
