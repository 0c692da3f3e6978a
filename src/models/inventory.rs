// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Bebidas")]
    pub name: String,
    pub description: Option<String>,
    /// Campo legado: nenhuma escrita mantém este contador.
    pub product_count: i32,
    pub created_at: DateTime<Utc>,
}

// --- Produtos ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub category_id: Option<Uuid>,
    #[schema(example = "Coca-Cola 350ml")]
    pub name: String,
    #[schema(example = "BEB-0001")]
    pub sku: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    #[schema(example = "5.50")]
    pub price: Decimal,
    #[schema(example = "3.20")]
    pub cost: Decimal,
    /// Só muda através do livro-razão de estoque.
    pub stock: i32,
    /// Informativo (usado no dashboard), nenhuma regra bloqueia venda.
    pub low_stock_threshold: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Livro-razão ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stock_log_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLogType {
    Sale,
    Return,
    In,
    Out,
    Adjustment,
}

/// Linha imutável do histórico de estoque.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLog {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub change_amount: i32,
    pub final_stock: i32,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub log_type: StockLogType,
    pub reason: String,
    pub performed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Um movimento pedido ao livro-razão (ainda não aplicado).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: Uuid,
    pub amount: i32,
    pub log_type: StockLogType,
    pub reason: String,
}

/// Linha pronta para ser gravada no histórico.
#[derive(Debug, Clone)]
pub struct NewStockLog {
    pub product_id: Uuid,
    pub product_name: String,
    pub change_amount: i32,
    pub final_stock: i32,
    pub log_type: StockLogType,
    pub reason: String,
    pub performed_by: Uuid,
}

/// Saldo de um produto logo após um incremento.
#[derive(Debug, Clone, FromRow)]
pub struct ProductStock {
    pub name: String,
    pub stock: i32,
}

/// Reconstrói o saldo a partir do saldo inicial e do histórico (em ordem de criação).
pub fn replay_stock(initial_stock: i32, logs: &[StockLog]) -> i32 {
    logs.iter().fold(initial_stock, |acc, log| acc + log.change_amount)
}

/// Ajuste gerado quando a edição do produto traz um estoque diferente do atual.
pub fn stock_update_change(
    product_id: Uuid,
    current: i32,
    requested: Option<i32>,
) -> Result<Option<StockChange>, &'static str> {
    let Some(requested) = requested else {
        return Ok(None);
    };
    if requested == current {
        return Ok(None);
    }
    let amount = requested
        .checked_sub(current)
        .ok_or("Stock change out of range.")?;
    Ok(Some(StockChange {
        product_id,
        amount,
        log_type: StockLogType::Adjustment,
        reason: "Manual stock update".into(),
    }))
}

/// Saldo inicial do cadastro, lançado como entrada.
pub fn initial_stock_change(product_id: Uuid, initial: i32) -> Option<StockChange> {
    (initial > 0).then(|| StockChange {
        product_id,
        amount: initial,
        log_type: StockLogType::In,
        reason: "Initial stock".into(),
    })
}

// ---
// Payloads
// ---

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("Value cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "SKU is required."))]
    pub sku: String,
    pub barcode: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub price: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub cost: Decimal,
    /// Estoque inicial, lançado no livro-razão como entrada.
    #[validate(range(min = 0, message = "Initial stock cannot be negative."))]
    #[serde(default)]
    pub stock: i32,
    #[validate(range(min = 0, message = "Threshold cannot be negative."))]
    #[serde(default)]
    pub low_stock_threshold: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "Name cannot be empty."))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "SKU cannot be empty."))]
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub category_id: Option<Uuid>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Option<Decimal>,
    #[validate(custom(function = "validate_not_negative"))]
    pub cost: Option<Decimal>,
    /// Se diferente do atual, a diferença vira um ajuste no livro-razão.
    pub stock: Option<i32>,
    #[validate(range(min = 0, message = "Threshold cannot be negative."))]
    pub low_stock_threshold: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockPayload {
    #[schema(example = 5)]
    pub amount: i32,
    /// IN, OUT ou ADJUSTMENT.
    #[serde(rename = "type")]
    pub log_type: StockLogType,
    #[validate(length(min = 1, message = "Reason is required."))]
    pub reason: String,
}

impl AdjustStockPayload {
    /// Converte o pedido manual em um movimento com sinal.
    pub fn signed_amount(&self) -> Result<i32, &'static str> {
        if self.amount == 0 {
            return Err("Amount must not be zero.");
        }
        // i32::MIN não tem módulo representável
        let magnitude = self.amount.checked_abs().ok_or("Amount out of range.");
        match self.log_type {
            StockLogType::In => magnitude,
            StockLogType::Out => magnitude.map(|m| -m),
            StockLogType::Adjustment => Ok(self.amount),
            StockLogType::Sale | StockLogType::Return => {
                Err("SALE and RETURN movements come from orders.")
            }
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct StockLogQuery {
    pub product_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adjust(amount: i32, log_type: StockLogType) -> AdjustStockPayload {
        AdjustStockPayload { amount, log_type, reason: "count".into() }
    }

    #[test]
    fn manual_in_and_out_ignore_the_sign_sent() {
        assert_eq!(adjust(-4, StockLogType::In).signed_amount(), Ok(4));
        assert_eq!(adjust(4, StockLogType::Out).signed_amount(), Ok(-4));
        assert_eq!(adjust(-2, StockLogType::Adjustment).signed_amount(), Ok(-2));
    }

    #[test]
    fn manual_adjustment_rejects_zero_and_order_types() {
        assert!(adjust(0, StockLogType::In).signed_amount().is_err());
        assert!(adjust(1, StockLogType::Sale).signed_amount().is_err());
        assert!(adjust(1, StockLogType::Return).signed_amount().is_err());
        assert!(adjust(i32::MIN, StockLogType::In).signed_amount().is_err());
        assert!(adjust(i32::MIN, StockLogType::Out).signed_amount().is_err());
        assert_eq!(adjust(i32::MIN, StockLogType::Adjustment).signed_amount(), Ok(i32::MIN));
    }

    #[test]
    fn editing_stock_books_the_difference() {
        let id = Uuid::new_v4();
        let change = stock_update_change(id, 10, Some(7)).unwrap().unwrap();
        assert_eq!((change.amount, change.log_type), (-3, StockLogType::Adjustment));
        assert!(stock_update_change(id, 10, Some(10)).unwrap().is_none());
        assert!(stock_update_change(id, 10, None).unwrap().is_none());
    }

    #[test]
    fn editing_stock_past_the_integer_range_is_rejected() {
        let id = Uuid::new_v4();
        assert!(stock_update_change(id, -5, Some(i32::MAX)).is_err());
        assert!(stock_update_change(id, 5, Some(i32::MIN)).is_err());
        let change = stock_update_change(id, -5, Some(10)).unwrap().unwrap();
        assert_eq!(change.amount, 15);
    }

    #[test]
    fn zero_initial_stock_books_nothing() {
        let id = Uuid::new_v4();
        assert!(initial_stock_change(id, 0).is_none());
        assert_eq!(initial_stock_change(id, 5).map(|c| c.amount), Some(5));
    }

    #[test]
    fn stock_log_type_uses_the_wire_names() {
        assert_eq!(serde_json::to_value(StockLogType::In).unwrap(), "IN");
        assert_eq!(serde_json::to_value(StockLogType::Adjustment).unwrap(), "ADJUSTMENT");
    }
}
