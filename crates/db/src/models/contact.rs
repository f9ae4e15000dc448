//! Contact entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crm_core::types::{DbId, Timestamp};

use crate::models::empty_string_as_none;

/// A contact row from the `contacts` table.
///
/// Every contact belongs to exactly one account.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Contact {
    pub id: DbId,
    pub account_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new contact.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContact {
    pub account_id: DbId,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
}

/// DTO for updating an existing contact. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContact {
    pub account_id: Option<DbId>,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: Option<String>,
}
