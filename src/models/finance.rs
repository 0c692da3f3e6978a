// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Conta de luz")]
    pub description: String,

    #[schema(example = "180.40")]
    pub amount: Decimal,

    #[schema(example = "Utilities")]
    pub category: String,

    #[schema(value_type = String, format = Date, example = "2025-03-10")]
    pub expense_date: NaiveDate,

    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("Amount must be greater than zero.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpensePayload {
    #[validate(length(min = 1, message = "Description is required."))]
    pub description: String,

    #[validate(custom(function = "validate_positive"))]
    pub amount: Decimal,

    #[validate(length(min = 1, message = "Category is required."))]
    pub category: String,

    /// Se omitida, usa a data de hoje.
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-10")]
    pub expense_date: Option<NaiveDate>,

    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expense_amount_must_be_positive() {
        let mut payload = CreateExpensePayload {
            description: "Aluguel".into(),
            amount: Decimal::ZERO,
            category: "Rent".into(),
            expense_date: None,
            notes: None,
        };
        assert!(payload.validate().is_err());

        payload.amount = Decimal::new(1500, 0);
        assert!(payload.validate().is_ok());
    }
}
