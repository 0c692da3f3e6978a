// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::orders::Order;

/// Cards e lista de pedidos recentes da tela inicial.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_customers: i64,
    pub low_stock_count: i64,
    // Pedidos CANCELLED e RETURNED ficam de fora
    #[schema(example = "12500.00")]
    pub total_revenue: Decimal,
    pub total_expenses: Decimal,
    pub recent_orders: Vec<Order>,
}
