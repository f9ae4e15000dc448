//! Deal entity model, stage enum, and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crm_core::types::{DbId, Timestamp};

use crate::models::activity::Activity;
use crate::models::double_option;

/// Pipeline stage of a deal. Stored as the Postgres enum `deal_stage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "deal_stage", rename_all = "snake_case")]
pub enum DealStage {
    Lead,
    Qualified,
    Proposal,
    Negotiation,
    ClosedWon,
    ClosedLost,
}

/// A deal row from the `deals` table.
///
/// Every deal belongs to exactly one account.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Deal {
    pub id: DbId,
    pub account_id: DbId,
    pub name: String,
    pub stage: DealStage,
    pub amount: Option<f64>,
    pub close_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Deal detail response: the deal plus its live activities.
#[derive(Debug, Clone, Serialize)]
pub struct DealDetail {
    #[serde(flatten)]
    pub deal: Deal,
    pub activities: Vec<Activity>,
}

/// DTO for creating a new deal.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDeal {
    pub account_id: DbId,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub stage: DealStage,
    #[validate(range(exclusive_min = 0.0, message = "Amount must be positive"))]
    pub amount: Option<f64>,
    pub close_date: Option<Timestamp>,
}

/// DTO for updating an existing deal.
///
/// `amount` and `close_date` use the double-`Option` encoding: a missing key
/// leaves the column unchanged, an explicit `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDeal {
    pub account_id: Option<DbId>,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    pub stage: Option<DealStage>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(custom(function = "amount_positive"))]
    pub amount: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub close_date: Option<Option<Timestamp>>,
}

/// Fully-resolved column values for a deal update, produced by merging an
/// [`UpdateDeal`] onto the current row.
#[derive(Debug, Clone)]
pub struct DealChanges {
    pub account_id: DbId,
    pub name: String,
    pub stage: DealStage,
    pub amount: Option<f64>,
    pub close_date: Option<Timestamp>,
}

impl UpdateDeal {
    /// Merge this partial update onto the current row.
    pub fn apply_to(&self, current: &Deal) -> DealChanges {
        DealChanges {
            account_id: self.account_id.unwrap_or(current.account_id),
            name: self.name.clone().unwrap_or_else(|| current.name.clone()),
            stage: self.stage.unwrap_or(current.stage),
            amount: match self.amount {
                Some(value) => value,
                None => current.amount,
            },
            close_date: match self.close_date {
                Some(value) => value,
                None => current.close_date,
            },
        }
    }
}

// The derive unwraps both `Option` layers before calling, so absent and
// explicit-null amounts skip this check.
fn amount_positive(amount: f64) -> Result<(), ValidationError> {
    if amount <= 0.0 {
        return Err(ValidationError::new("amount_positive")
            .with_message("Amount must be positive".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn deal() -> Deal {
        Deal {
            id: 1,
            account_id: 10,
            name: "Renewal".to_string(),
            stage: DealStage::Qualified,
            amount: Some(5000.0),
            close_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn apply_to_keeps_unspecified_fields() {
        let changes = UpdateDeal::default().apply_to(&deal());
        assert_eq!(changes.account_id, 10);
        assert_eq!(changes.name, "Renewal");
        assert_eq!(changes.stage, DealStage::Qualified);
        assert_eq!(changes.amount, Some(5000.0));
    }

    #[test]
    fn apply_to_replaces_specified_fields() {
        let update = UpdateDeal {
            stage: Some(DealStage::ClosedWon),
            amount: Some(Some(7500.0)),
            ..Default::default()
        };
        let changes = update.apply_to(&deal());
        assert_eq!(changes.stage, DealStage::ClosedWon);
        assert_eq!(changes.amount, Some(7500.0));
    }

    #[test]
    fn explicit_null_clears_amount() {
        let update = UpdateDeal {
            amount: Some(None),
            ..Default::default()
        };
        let changes = update.apply_to(&deal());
        assert_eq!(changes.amount, None);
    }

    #[test]
    fn missing_amount_key_preserves_current_value() {
        // Deserialization: absent key -> None, null -> Some(None).
        let update: UpdateDeal = serde_json::from_str(r#"{"name": "Bigger"}"#).unwrap();
        assert!(update.amount.is_none());

        let update: UpdateDeal = serde_json::from_str(r#"{"amount": null}"#).unwrap();
        assert_eq!(update.amount, Some(None));
    }

    #[test]
    fn zero_amount_fails_validation() {
        let update = UpdateDeal {
            amount: Some(Some(0.0)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn negative_amount_fails_validation() {
        let update = UpdateDeal {
            amount: Some(Some(-10.0)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn null_and_positive_amounts_pass_validation() {
        let update: UpdateDeal = serde_json::from_str(r#"{"amount": null}"#).unwrap();
        assert!(update.validate().is_ok());

        let update = UpdateDeal {
            amount: Some(Some(250.0)),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
    }
}
