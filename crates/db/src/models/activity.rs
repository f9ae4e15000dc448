//! Activity entity model, type enum, and DTOs.
//!
//! Activities are the one entity with optional parent references: an
//! activity may link to an account, a contact, and/or a deal, and must
//! always link to at least one. The at-least-one rule and the liveness of
//! each referenced parent are enforced by the handlers on create and
//! update.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crm_core::types::{DbId, Timestamp};

use crate::models::double_option;

/// Kind of activity. Stored as the Postgres enum `activity_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "activity_type", rename_all = "snake_case")]
pub enum ActivityType {
    Note,
    Task,
    Call,
    Meeting,
}

/// An activity row from the `activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub activity_type: ActivityType,
    pub subject: String,
    pub body: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<Timestamp>,
    pub account_id: Option<DbId>,
    pub contact_id: Option<DbId>,
    pub deal_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new activity.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateActivity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,
    pub body: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<Timestamp>,
    pub account_id: Option<DbId>,
    pub contact_id: Option<DbId>,
    pub deal_id: Option<DbId>,
}

impl CreateActivity {
    /// True if at least one parent reference is set.
    pub fn has_parent(&self) -> bool {
        self.account_id.is_some() || self.contact_id.is_some() || self.deal_id.is_some()
    }
}

/// DTO for updating an existing activity.
///
/// Nullable columns (`body`, `status`, `due_date`, and the three parent
/// references) use the double-`Option` encoding: a missing key leaves the
/// column unchanged, an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateActivity {
    #[serde(rename = "type")]
    pub activity_type: Option<ActivityType>,
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub body: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<Timestamp>>,
    #[serde(default, deserialize_with = "double_option")]
    pub account_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub contact_id: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub deal_id: Option<Option<DbId>>,
}

/// Fully-resolved column values for an activity update, produced by merging
/// an [`UpdateActivity`] onto the current row.
#[derive(Debug, Clone)]
pub struct ActivityChanges {
    pub activity_type: ActivityType,
    pub subject: String,
    pub body: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<Timestamp>,
    pub account_id: Option<DbId>,
    pub contact_id: Option<DbId>,
    pub deal_id: Option<DbId>,
}

impl ActivityChanges {
    /// True if at least one parent reference remains set after the merge.
    pub fn has_parent(&self) -> bool {
        self.account_id.is_some() || self.contact_id.is_some() || self.deal_id.is_some()
    }
}

impl UpdateActivity {
    /// Merge this partial update onto the current row.
    pub fn apply_to(&self, current: &Activity) -> ActivityChanges {
        ActivityChanges {
            activity_type: self.activity_type.unwrap_or(current.activity_type),
            subject: self
                .subject
                .clone()
                .unwrap_or_else(|| current.subject.clone()),
            body: merge(&self.body, &current.body),
            status: merge(&self.status, &current.status),
            due_date: merge(&self.due_date, &current.due_date),
            account_id: merge(&self.account_id, &current.account_id),
            contact_id: merge(&self.contact_id, &current.contact_id),
            deal_id: merge(&self.deal_id, &current.deal_id),
        }
    }
}

/// Resolve a double-`Option` field against the current column value.
fn merge<T: Clone>(update: &Option<Option<T>>, current: &Option<T>) -> Option<T> {
    match update {
        Some(value) => value.clone(),
        None => current.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn activity() -> Activity {
        Activity {
            id: 1,
            activity_type: ActivityType::Call,
            subject: "Intro call".to_string(),
            body: Some("Agenda".to_string()),
            status: None,
            due_date: None,
            account_id: Some(10),
            contact_id: Some(20),
            deal_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn apply_to_keeps_unspecified_parents() {
        let changes = UpdateActivity::default().apply_to(&activity());
        assert_eq!(changes.account_id, Some(10));
        assert_eq!(changes.contact_id, Some(20));
        assert_eq!(changes.deal_id, None);
        assert!(changes.has_parent());
    }

    #[test]
    fn explicit_null_clears_a_parent() {
        let update: UpdateActivity = serde_json::from_str(r#"{"contact_id": null}"#).unwrap();
        let changes = update.apply_to(&activity());
        assert_eq!(changes.account_id, Some(10));
        assert_eq!(changes.contact_id, None);
        assert!(changes.has_parent());
    }

    #[test]
    fn nulling_every_parent_leaves_no_parent() {
        let update: UpdateActivity =
            serde_json::from_str(r#"{"account_id": null, "contact_id": null, "deal_id": null}"#)
                .unwrap();
        let changes = update.apply_to(&activity());
        assert!(!changes.has_parent());
    }

    #[test]
    fn reassigning_a_parent_keeps_the_others() {
        let update: UpdateActivity = serde_json::from_str(r#"{"deal_id": 30}"#).unwrap();
        let changes = update.apply_to(&activity());
        assert_eq!(changes.deal_id, Some(30));
        assert_eq!(changes.account_id, Some(10));
    }

    #[test]
    fn type_field_uses_wire_name() {
        let update: UpdateActivity = serde_json::from_str(r#"{"type": "meeting"}"#).unwrap();
        assert_eq!(update.activity_type, Some(ActivityType::Meeting));
    }
}
