// src/services/order_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::orders::{
        order_reference, order_subtotal, stock_effects_on_create, stock_effects_on_transition,
        CreateOrderPayload, NewOrder, Order, OrderStatus,
    },
    services::stock_ledger::{apply_stock_changes, StockStore},
};

/// Escritas de pedidos que andam junto com o estoque e o cliente.
pub trait SalesStore: StockStore {
    async fn insert_order(&mut self, scope: &TenantScope, order: &NewOrder) -> Result<Order, AppError>;

    async fn find_order(&mut self, scope: &TenantScope, order_id: Uuid) -> Result<Option<Order>, AppError>;

    async fn set_order_status(
        &mut self,
        scope: &TenantScope,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, AppError>;

    /// Soma ao `totalSpent` e marca a data do último pedido. `false` se o cliente não existe.
    async fn credit_customer(
        &mut self,
        scope: &TenantScope,
        customer_id: Uuid,
        amount: Decimal,
    ) -> Result<bool, AppError>;
}

#[derive(Clone, Default)]
pub struct OrderService;

impl OrderService {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_order<S: SalesStore>(
        &self,
        store: &mut S,
        scope: &TenantScope,
        created_by: Uuid,
        payload: CreateOrderPayload,
    ) -> Result<Order, AppError> {
        let subtotal = order_subtotal(&payload.items);
        let total_amount = payload
            .total_amount
            .unwrap_or(subtotal - payload.discount_amount + payload.tax_amount);

        let new_order = NewOrder {
            customer_id: payload.customer_id,
            items: payload.items,
            subtotal,
            discount_amount: payload.discount_amount,
            tax_amount: payload.tax_amount,
            total_amount,
            payment_method: payload.payment_method,
            status: payload.status,
            notes: payload.notes,
            created_by,
        };

        let order = store.insert_order(scope, &new_order).await?;

        let effects = stock_effects_on_create(order.status, &order.items, &order_reference(order.id));
        apply_stock_changes(store, scope, &effects, created_by).await?;

        // O gasto do cliente sobe sempre, seja qual for o status inicial.
        if let Some(customer_id) = order.customer_id {
            if !store.credit_customer(scope, customer_id, order.total_amount).await? {
                tracing::warn!(%customer_id, order_id = %order.id, "Cliente do pedido não encontrado");
            }
        }

        tracing::info!(order_id = %order.id, status = ?order.status, "Pedido criado");
        Ok(order)
    }

    pub async fn update_order_status<S: SalesStore>(
        &self,
        store: &mut S,
        scope: &TenantScope,
        performed_by: Uuid,
        order_id: Uuid,
        next: OrderStatus,
    ) -> Result<Order, AppError> {
        let order = store
            .find_order(scope, order_id)
            .await?
            .ok_or(AppError::NotFound("Order"))?;

        let previous = order.status;
        if !next.can_transition_from(previous) {
            return Err(AppError::BadRequest(format!(
                "Cannot change order status from {} to {}",
                previous.as_db_str(),
                next.as_db_str()
            )));
        }

        let reason = format!("{} {}", order_reference(order.id), next.as_db_str().to_lowercase());
        let effects = stock_effects_on_transition(previous, next, &order.items, &reason);

        let updated = store.set_order_status(scope, order_id, next).await?;
        apply_stock_changes(store, scope, &effects, performed_by).await?;

        tracing::info!(%order_id, from = ?previous, to = ?next, "Status do pedido alterado");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use sqlx::types::Json;

    use super::*;
    use crate::{
        middleware::tenancy::test_scope,
        models::{
            inventory::{replay_stock, StockLogType},
            orders::{OrderItem, OrderItemType},
        },
        services::stock_ledger::memory::MemoryStore,
    };

    #[derive(Default)]
    struct MemorySales {
        stock: MemoryStore,
        orders: Vec<Order>,
        customers: HashMap<(Uuid, Uuid), Decimal>,
    }

    impl StockStore for MemorySales {
        async fn increment_stock(
            &mut self,
            scope: &TenantScope,
            product_id: Uuid,
            delta: i32,
        ) -> Result<Option<crate::models::inventory::ProductStock>, AppError> {
            self.stock.increment_stock(scope, product_id, delta).await
        }

        async fn append_stock_log(
            &mut self,
            scope: &TenantScope,
            entry: &crate::models::inventory::NewStockLog,
        ) -> Result<crate::models::inventory::StockLog, AppError> {
            self.stock.append_stock_log(scope, entry).await
        }
    }

    impl SalesStore for MemorySales {
        async fn insert_order(&mut self, scope: &TenantScope, o: &NewOrder) -> Result<Order, AppError> {
            let order = Order {
                id: Uuid::new_v4(),
                tenant_id: scope.tenant_id(),
                customer_id: o.customer_id,
                items: Json(o.items.clone()),
                subtotal: o.subtotal,
                discount_amount: o.discount_amount,
                tax_amount: o.tax_amount,
                total_amount: o.total_amount,
                payment_method: o.payment_method.clone(),
                status: o.status,
                notes: o.notes.clone(),
                created_by: Some(o.created_by),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.orders.push(order.clone());
            Ok(order)
        }

        async fn find_order(&mut self, scope: &TenantScope, id: Uuid) -> Result<Option<Order>, AppError> {
            Ok(self
                .orders
                .iter()
                .find(|o| o.id == id && o.tenant_id == scope.tenant_id())
                .cloned())
        }

        async fn set_order_status(
            &mut self,
            scope: &TenantScope,
            id: Uuid,
            status: OrderStatus,
        ) -> Result<Order, AppError> {
            let order = self
                .orders
                .iter_mut()
                .find(|o| o.id == id && o.tenant_id == scope.tenant_id())
                .ok_or(AppError::NotFound("Order"))?;
            order.status = status;
            Ok(order.clone())
        }

        async fn credit_customer(
            &mut self,
            scope: &TenantScope,
            customer_id: Uuid,
            amount: Decimal,
        ) -> Result<bool, AppError> {
            match self.customers.get_mut(&(scope.tenant_id(), customer_id)) {
                Some(total) => {
                    *total += amount;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    fn sale(product_id: Uuid, quantity: i32, item_type: OrderItemType) -> OrderItem {
        OrderItem {
            product_id,
            product_name: "Refrigerante".into(),
            quantity,
            price_at_time: Decimal::new(500, 2),
            item_type,
        }
    }

    fn payload(items: Vec<OrderItem>, status: OrderStatus, customer_id: Option<Uuid>) -> CreateOrderPayload {
        CreateOrderPayload {
            customer_id,
            items,
            discount_amount: Decimal::ZERO,
            tax_amount: Decimal::ZERO,
            total_amount: None,
            payment_method: Some("CASH".into()),
            status,
            notes: None,
        }
    }

    #[tokio::test]
    async fn completed_sale_books_one_sale_log() {
        let scope = test_scope();
        let mut store = MemorySales::default();
        let product = store.stock.add_product(&scope, "Refrigerante", 10);

        OrderService::new()
            .create_order(
                &mut store,
                &scope,
                Uuid::new_v4(),
                payload(vec![sale(product, 3, OrderItemType::Sale)], OrderStatus::Completed, None),
            )
            .await
            .unwrap();

        assert_eq!(store.stock.stock_of(&scope, product), 7);
        let logs = store.stock.logs_for(product);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].log_type, StockLogType::Sale);
        assert_eq!(logs[0].change_amount, -3);
        assert_eq!(logs[0].final_stock, 7);
    }

    #[tokio::test]
    async fn cancelling_restores_stock_but_keeps_customer_spend() {
        let scope = test_scope();
        let mut store = MemorySales::default();
        let product = store.stock.add_product(&scope, "Refrigerante", 10);
        let customer = Uuid::new_v4();
        store.customers.insert((scope.tenant_id(), customer), Decimal::ZERO);
        let service = OrderService::new();
        let user = Uuid::new_v4();

        let order = service
            .create_order(
                &mut store,
                &scope,
                user,
                payload(vec![sale(product, 3, OrderItemType::Sale)], OrderStatus::Completed, Some(customer)),
            )
            .await
            .unwrap();
        assert_eq!(order.total_amount, Decimal::new(1500, 2));
        let spent = store.customers[&(scope.tenant_id(), customer)];
        assert_eq!(spent, Decimal::new(1500, 2));

        let updated = service
            .update_order_status(&mut store, &scope, user, order.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Cancelled);
        assert_eq!(store.stock.stock_of(&scope, product), 10);
        let logs = store.stock.logs_for(product);
        let last = logs.last().unwrap();
        assert_eq!((last.log_type, last.change_amount, last.final_stock), (StockLogType::Adjustment, 3, 10));
        assert_eq!(store.customers[&(scope.tenant_id(), customer)], spent);
        assert_eq!(replay_stock(10, &logs), 10);
    }

    #[tokio::test]
    async fn return_lines_come_back_in_and_are_not_reversed() {
        let scope = test_scope();
        let mut store = MemorySales::default();
        let product = store.stock.add_product(&scope, "Refrigerante", 10);
        let service = OrderService::new();
        let user = Uuid::new_v4();

        let order = service
            .create_order(
                &mut store,
                &scope,
                user,
                payload(vec![sale(product, 2, OrderItemType::Return)], OrderStatus::Processing, None),
            )
            .await
            .unwrap();
        assert_eq!(store.stock.stock_of(&scope, product), 12);

        service
            .update_order_status(&mut store, &scope, user, order.id, OrderStatus::Returned)
            .await
            .unwrap();
        assert_eq!(store.stock.stock_of(&scope, product), 12);
    }

    #[tokio::test]
    async fn order_cancelled_on_creation_still_counts_as_spend() {
        let scope = test_scope();
        let mut store = MemorySales::default();
        let product = store.stock.add_product(&scope, "Refrigerante", 10);
        let customer = Uuid::new_v4();
        store.customers.insert((scope.tenant_id(), customer), Decimal::ZERO);

        OrderService::new()
            .create_order(
                &mut store,
                &scope,
                Uuid::new_v4(),
                payload(vec![sale(product, 1, OrderItemType::Sale)], OrderStatus::Cancelled, Some(customer)),
            )
            .await
            .unwrap();

        assert_eq!(store.stock.stock_of(&scope, product), 10);
        assert_eq!(store.customers[&(scope.tenant_id(), customer)], Decimal::new(500, 2));
    }

    #[tokio::test]
    async fn explicit_total_wins_over_computed_one() {
        let scope = test_scope();
        let mut store = MemorySales::default();
        let product = store.stock.add_product(&scope, "Refrigerante", 10);
        let mut body = payload(vec![sale(product, 2, OrderItemType::Sale)], OrderStatus::Pending, None);
        body.discount_amount = Decimal::new(100, 2);
        body.tax_amount = Decimal::new(50, 2);

        let computed = OrderService::new()
            .create_order(&mut store, &scope, Uuid::new_v4(), body)
            .await
            .unwrap();
        assert_eq!(computed.total_amount, Decimal::new(950, 2));

        let mut body = payload(vec![sale(product, 2, OrderItemType::Sale)], OrderStatus::Pending, None);
        body.total_amount = Some(Decimal::new(999, 2));
        let explicit = OrderService::new()
            .create_order(&mut store, &scope, Uuid::new_v4(), body)
            .await
            .unwrap();
        assert_eq!(explicit.total_amount, Decimal::new(999, 2));
    }

    #[tokio::test]
    async fn orders_of_other_tenants_are_not_found() {
        let scope = test_scope();
        let mut store = MemorySales::default();
        let product = store.stock.add_product(&scope, "Refrigerante", 10);
        let service = OrderService::new();

        let order = service
            .create_order(
                &mut store,
                &scope,
                Uuid::new_v4(),
                payload(vec![sale(product, 1, OrderItemType::Sale)], OrderStatus::Completed, None),
            )
            .await
            .unwrap();

        let err = service
            .update_order_status(&mut store, &test_scope(), Uuid::new_v4(), order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Order")));
        assert_eq!(store.stock.stock_of(&scope, product), 9);
    }
}
