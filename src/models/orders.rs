// src/models/orders.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::inventory::{StockChange, StockLogType};

// --- Enums ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
    ];

    /// Tabela de transições: de quais status se pode chegar em `self`.
    /// Hoje qualquer status leva a qualquer outro; apertar a regra é só editar aqui.
    pub fn allowed_from(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Pending
            | OrderStatus::Processing
            | OrderStatus::Completed
            | OrderStatus::Cancelled
            | OrderStatus::Returned => &Self::ALL,
        }
    }

    pub fn can_transition_from(self, previous: OrderStatus) -> bool {
        self.allowed_from().contains(&previous)
    }

    /// Status em que a mercadoria já saiu do estoque.
    pub fn holds_stock(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Processing)
    }

    /// Status que devolvem a mercadoria quando vindos de um status que a segura.
    pub fn releases_stock(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Returned)
    }

    pub fn counts_toward_revenue(self) -> bool {
        !self.releases_stock()
    }

    /// Status deixados de fora da receita do dashboard.
    pub fn revenue_excluded() -> Vec<OrderStatus> {
        Self::ALL.into_iter().filter(|s| !s.counts_toward_revenue()).collect()
    }

    pub fn as_db_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Returned => "RETURNED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderItemType {
    #[default]
    Sale,
    Return,
}

// --- Estruturas ---

/// Linha do pedido, guardada como documento JSONB dentro do pedido.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    #[serde(default)]
    pub product_name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "5.50")]
    pub price_at_time: Decimal,
    #[serde(default, rename = "type")]
    pub item_type: OrderItemType,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub customer_id: Option<Uuid>,
    #[schema(value_type = Vec<OrderItem>)]
    pub items: Json<Vec<OrderItem>>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    #[schema(example = "150.50")]
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pedido ainda não persistido (o que o service manda gravar).
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub payment_method: Option<String>,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_by: Uuid,
}

// ---
// Payloads
// ---

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.message = Some("Value cannot be negative.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub customer_id: Option<Uuid>,

    #[validate(length(min = 1, message = "An order needs at least one item."), nested)]
    pub items: Vec<OrderItem>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub discount_amount: Decimal,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub tax_amount: Decimal,

    /// Se omitido, é calculado a partir dos itens.
    pub total_amount: Option<Decimal>,

    pub payment_method: Option<String>,

    #[serde(default = "default_order_status")]
    pub status: OrderStatus,

    pub notes: Option<String>,
}

fn default_order_status() -> OrderStatus {
    OrderStatus::Completed
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusPayload {
    pub status: OrderStatus,
}

// ---
// Regras puras de totais e estoque
// ---

/// Σ vendas − Σ devoluções (quantidade × preço).
pub fn order_subtotal(items: &[OrderItem]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |acc, item| {
        let line = Decimal::from(item.quantity) * item.price_at_time;
        match item.item_type {
            OrderItemType::Sale => acc + line,
            OrderItemType::Return => acc - line,
        }
    })
}

/// Referência curta usada no histórico de estoque: "Order #" + 6 últimos caracteres.
pub fn order_reference(order_id: Uuid) -> String {
    let id = order_id.to_string();
    format!("Order #{}", &id[id.len() - 6..])
}

/// Movimentos de estoque disparados na criação do pedido.
pub fn stock_effects_on_create(status: OrderStatus, items: &[OrderItem], reason: &str) -> Vec<StockChange> {
    if !status.holds_stock() {
        return Vec::new();
    }

    items
        .iter()
        .map(|item| match item.item_type {
            OrderItemType::Return => StockChange {
                product_id: item.product_id,
                amount: item.quantity,
                log_type: StockLogType::Return,
                reason: reason.to_string(),
            },
            OrderItemType::Sale => StockChange {
                product_id: item.product_id,
                amount: -item.quantity,
                log_type: StockLogType::Sale,
                reason: reason.to_string(),
            },
        })
        .collect()
}

/// Movimentos disparados por troca de status. Só itens de venda voltam ao estoque;
/// itens de devolução não são revertidos.
pub fn stock_effects_on_transition(
    previous: OrderStatus,
    next: OrderStatus,
    items: &[OrderItem],
    reason: &str,
) -> Vec<StockChange> {
    if !(previous.holds_stock() && next.releases_stock()) {
        return Vec::new();
    }

    let log_type = if next == OrderStatus::Returned {
        StockLogType::Return
    } else {
        StockLogType::Adjustment
    };

    items
        .iter()
        .filter(|item| item.item_type == OrderItemType::Sale)
        .map(|item| StockChange {
            product_id: item.product_id,
            amount: item.quantity,
            log_type,
            reason: reason.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn item(quantity: i32, price: &str, item_type: OrderItemType) -> OrderItem {
        OrderItem {
            product_id: Uuid::new_v4(),
            product_name: "Café".into(),
            quantity,
            price_at_time: dec(price),
            item_type,
        }
    }

    #[test]
    fn every_status_is_reachable_from_every_status() {
        for next in OrderStatus::ALL {
            for previous in OrderStatus::ALL {
                assert!(next.can_transition_from(previous));
            }
        }
    }

    #[test]
    fn subtotal_subtracts_returned_lines() {
        let items = vec![item(2, "10.00", OrderItemType::Sale), item(1, "4.50", OrderItemType::Return)];
        assert_eq!(order_subtotal(&items), dec("15.50"));
    }

    #[test]
    fn pending_orders_do_not_touch_stock() {
        let items = vec![item(3, "1", OrderItemType::Sale)];
        assert!(stock_effects_on_create(OrderStatus::Pending, &items, "x").is_empty());
        assert!(stock_effects_on_create(OrderStatus::Cancelled, &items, "x").is_empty());
    }

    #[test]
    fn completed_order_sells_and_takes_back_returns() {
        let items = vec![item(3, "1", OrderItemType::Sale), item(2, "1", OrderItemType::Return)];
        let effects = stock_effects_on_create(OrderStatus::Processing, &items, "Order");

        assert_eq!(effects.len(), 2);
        assert_eq!((effects[0].amount, effects[0].log_type), (-3, StockLogType::Sale));
        assert_eq!((effects[1].amount, effects[1].log_type), (2, StockLogType::Return));
    }

    #[test]
    fn cancelling_restores_only_sale_lines_as_adjustment() {
        let items = vec![item(3, "1", OrderItemType::Sale), item(2, "1", OrderItemType::Return)];
        let effects = stock_effects_on_transition(OrderStatus::Completed, OrderStatus::Cancelled, &items, "x");

        assert_eq!(effects.len(), 1);
        assert_eq!((effects[0].amount, effects[0].log_type), (3, StockLogType::Adjustment));
    }

    #[test]
    fn returning_restores_sale_lines_as_return() {
        let items = vec![item(4, "1", OrderItemType::Sale)];
        let effects = stock_effects_on_transition(OrderStatus::Processing, OrderStatus::Returned, &items, "x");
        assert_eq!((effects[0].amount, effects[0].log_type), (4, StockLogType::Return));
    }

    #[test]
    fn transitions_outside_the_release_path_have_no_effect() {
        let items = vec![item(4, "1", OrderItemType::Sale)];
        assert!(stock_effects_on_transition(OrderStatus::Pending, OrderStatus::Cancelled, &items, "x").is_empty());
        assert!(stock_effects_on_transition(OrderStatus::Cancelled, OrderStatus::Completed, &items, "x").is_empty());
        assert!(stock_effects_on_transition(OrderStatus::Completed, OrderStatus::Processing, &items, "x").is_empty());
    }

    #[test]
    fn cancelled_and_returned_do_not_count_as_revenue() {
        assert!(!OrderStatus::Cancelled.counts_toward_revenue());
        assert!(!OrderStatus::Returned.counts_toward_revenue());
        assert!(OrderStatus::Pending.counts_toward_revenue());
        assert!(OrderStatus::Completed.counts_toward_revenue());
        assert_eq!(
            OrderStatus::revenue_excluded(),
            vec![OrderStatus::Cancelled, OrderStatus::Returned]
        );
    }

    #[test]
    fn order_reference_uses_last_six_chars() {
        let id = Uuid::parse_str("6f1c2d3e-4a5b-4c6d-8e7f-0123456789ab").unwrap();
        assert_eq!(order_reference(id), "Order #6789ab");
    }
}
