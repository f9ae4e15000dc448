//! Account entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crm_core::types::{DbId, Timestamp};

use crate::models::activity::Activity;
use crate::models::contact::Contact;
use crate::models::deal::Deal;
use crate::models::empty_string_as_none;

/// An account row from the `accounts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Account {
    pub id: DbId,
    pub name: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Account detail response: the account plus its live children.
#[derive(Debug, Clone, Serialize)]
pub struct AccountDetail {
    #[serde(flatten)]
    pub account: Account,
    pub contacts: Vec<Contact>,
    pub deals: Vec<Deal>,
    pub activities: Vec<Activity>,
}

/// DTO for creating a new account.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAccount {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
    pub phone: Option<String>,
}

/// DTO for updating an existing account. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateAccount {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    pub industry: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(url(message = "Invalid website URL"))]
    pub website: Option<String>,
    pub phone: Option<String>,
}
