// src/models/purchasing.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::inventory::{StockChange, StockLogType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "purchase_order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    Draft,
    Ordered,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub const ALL: [PurchaseOrderStatus; 4] = [
        PurchaseOrderStatus::Draft,
        PurchaseOrderStatus::Ordered,
        PurchaseOrderStatus::Received,
        PurchaseOrderStatus::Cancelled,
    ];

    /// Sem restrição por enquanto: qualquer status pode ir para qualquer outro.
    pub fn allowed_from(self) -> &'static [PurchaseOrderStatus] {
        &Self::ALL
    }

    pub fn can_transition_from(self, previous: PurchaseOrderStatus) -> bool {
        self.allowed_from().contains(&previous)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    /// Itens sem produto (ex.: material de consumo) não entram no estoque.
    pub product_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Product name is required."))]
    pub product_name: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i32,
    #[schema(example = "2.75")]
    pub unit_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub supplier_id: Option<Uuid>,
    #[schema(value_type = Vec<PurchaseOrderItem>)]
    pub items: Json<Vec<PurchaseOrderItem>>,
    pub total_cost: Decimal,
    pub status: PurchaseOrderStatus,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPurchaseOrder {
    pub supplier_id: Option<Uuid>,
    pub items: Vec<PurchaseOrderItem>,
    pub total_cost: Decimal,
    pub status: PurchaseOrderStatus,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_by: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrderPayload {
    pub supplier_id: Option<Uuid>,
    #[validate(length(min = 1, message = "A purchase order needs at least one item."), nested)]
    pub items: Vec<PurchaseOrderItem>,
    pub total_cost: Option<Decimal>,
    #[serde(default = "default_po_status")]
    pub status: PurchaseOrderStatus,
    pub expected_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn default_po_status() -> PurchaseOrderStatus {
    PurchaseOrderStatus::Draft
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePurchaseOrderStatusPayload {
    pub status: PurchaseOrderStatus,
}

pub fn purchase_total(items: &[PurchaseOrderItem]) -> Decimal {
    items
        .iter()
        .map(|i| Decimal::from(i.quantity) * i.unit_cost)
        .sum()
}

/// "PO #" + os 6 últimos caracteres do id.
pub fn receipt_reason(po_id: Uuid) -> String {
    let id = po_id.to_string();
    format!("PO #{}", &id[id.len() - 6..])
}

/// Entradas de estoque ao receber a mercadoria. Só a entrada em RECEIVED
/// (vinda de outro status) gera movimento; sair de RECEIVED não estorna.
pub fn receipt_effects(
    po_id: Uuid,
    previous: PurchaseOrderStatus,
    next: PurchaseOrderStatus,
    items: &[PurchaseOrderItem],
) -> Vec<StockChange> {
    if next != PurchaseOrderStatus::Received || previous == PurchaseOrderStatus::Received {
        return Vec::new();
    }

    let reason = receipt_reason(po_id);
    items
        .iter()
        .filter_map(|item| {
            item.product_id.map(|product_id| StockChange {
                product_id,
                amount: item.quantity,
                log_type: StockLogType::In,
                reason: reason.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: Option<Uuid>, quantity: i32) -> PurchaseOrderItem {
        PurchaseOrderItem {
            product_id,
            product_name: "Farinha 5kg".into(),
            quantity,
            unit_cost: "2.50".parse().unwrap(),
        }
    }

    #[test]
    fn receipt_reason_uses_last_six_chars() {
        let id = Uuid::parse_str("6f1c2d3e-4a5b-4c6d-8e7f-0123456789ab").unwrap();
        assert_eq!(receipt_reason(id), "PO #6789ab");
    }

    #[test]
    fn receiving_books_in_for_linked_items_only() {
        let product = Uuid::new_v4();
        let items = vec![line(Some(product), 5), line(None, 2)];
        let effects = receipt_effects(
            Uuid::new_v4(),
            PurchaseOrderStatus::Ordered,
            PurchaseOrderStatus::Received,
            &items,
        );

        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].product_id, product);
        assert_eq!(effects[0].amount, 5);
        assert_eq!(effects[0].log_type, StockLogType::In);
    }

    #[test]
    fn receiving_twice_or_leaving_received_does_nothing() {
        let items = vec![line(Some(Uuid::new_v4()), 5)];
        let id = Uuid::new_v4();
        assert!(receipt_effects(id, PurchaseOrderStatus::Received, PurchaseOrderStatus::Received, &items).is_empty());
        assert!(receipt_effects(id, PurchaseOrderStatus::Received, PurchaseOrderStatus::Cancelled, &items).is_empty());
    }

    #[test]
    fn total_is_quantity_times_unit_cost() {
        let items = vec![line(None, 4), line(None, 2)];
        assert_eq!(purchase_total(&items), "15.00".parse::<Decimal>().unwrap());
    }
}
