// src/services/purchasing_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::purchasing::{
        purchase_total, receipt_effects, CreatePurchaseOrderPayload, NewPurchaseOrder, PurchaseOrder,
        PurchaseOrderStatus,
    },
    services::stock_ledger::{apply_stock_changes, StockStore},
};

pub trait PurchasingStore: StockStore {
    async fn insert_purchase_order(
        &mut self,
        scope: &TenantScope,
        po: &NewPurchaseOrder,
    ) -> Result<PurchaseOrder, AppError>;

    async fn find_purchase_order(
        &mut self,
        scope: &TenantScope,
        po_id: Uuid,
    ) -> Result<Option<PurchaseOrder>, AppError>;

    async fn set_purchase_order_status(
        &mut self,
        scope: &TenantScope,
        po_id: Uuid,
        status: PurchaseOrderStatus,
    ) -> Result<PurchaseOrder, AppError>;
}

#[derive(Clone, Default)]
pub struct PurchasingService;

impl PurchasingService {
    pub fn new() -> Self {
        Self
    }

    // Criar o pedido de compra não mexe no estoque.
    pub async fn create_purchase_order<S: PurchasingStore>(
        &self,
        store: &mut S,
        scope: &TenantScope,
        created_by: Uuid,
        payload: CreatePurchaseOrderPayload,
    ) -> Result<PurchaseOrder, AppError> {
        let total_cost = payload.total_cost.unwrap_or_else(|| purchase_total(&payload.items));

        let po = NewPurchaseOrder {
            supplier_id: payload.supplier_id,
            items: payload.items,
            total_cost,
            status: payload.status,
            expected_date: payload.expected_date,
            notes: payload.notes,
            created_by,
        };

        store.insert_purchase_order(scope, &po).await
    }

    pub async fn update_status<S: PurchasingStore>(
        &self,
        store: &mut S,
        scope: &TenantScope,
        performed_by: Uuid,
        po_id: Uuid,
        next: PurchaseOrderStatus,
    ) -> Result<PurchaseOrder, AppError> {
        let po = store
            .find_purchase_order(scope, po_id)
            .await?
            .ok_or(AppError::NotFound("Purchase order"))?;

        if !next.can_transition_from(po.status) {
            return Err(AppError::BadRequest("Invalid purchase order status change".into()));
        }

        let effects = receipt_effects(po.id, po.status, next, &po.items);
        let updated = store.set_purchase_order_status(scope, po_id, next).await?;
        let logs = apply_stock_changes(store, scope, &effects, performed_by).await?;

        if !logs.is_empty() {
            tracing::info!(%po_id, entries = logs.len(), "Mercadoria do pedido de compra recebida");
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use sqlx::types::Json;

    use super::*;
    use crate::{
        middleware::tenancy::test_scope,
        models::{
            inventory::{NewStockLog, ProductStock, StockLog, StockLogType},
            purchasing::{receipt_reason, PurchaseOrderItem},
        },
        services::stock_ledger::memory::MemoryStore,
    };

    #[derive(Default)]
    struct MemoryPurchasing {
        stock: MemoryStore,
        pos: Vec<PurchaseOrder>,
    }

    impl StockStore for MemoryPurchasing {
        async fn increment_stock(
            &mut self,
            scope: &TenantScope,
            product_id: Uuid,
            delta: i32,
        ) -> Result<Option<ProductStock>, AppError> {
            self.stock.increment_stock(scope, product_id, delta).await
        }

        async fn append_stock_log(&mut self, scope: &TenantScope, entry: &NewStockLog) -> Result<StockLog, AppError> {
            self.stock.append_stock_log(scope, entry).await
        }
    }

    impl PurchasingStore for MemoryPurchasing {
        async fn insert_purchase_order(
            &mut self,
            scope: &TenantScope,
            po: &NewPurchaseOrder,
        ) -> Result<PurchaseOrder, AppError> {
            let record = PurchaseOrder {
                id: Uuid::new_v4(),
                tenant_id: scope.tenant_id(),
                supplier_id: po.supplier_id,
                items: Json(po.items.clone()),
                total_cost: po.total_cost,
                status: po.status,
                expected_date: po.expected_date,
                notes: po.notes.clone(),
                created_by: Some(po.created_by),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            self.pos.push(record.clone());
            Ok(record)
        }

        async fn find_purchase_order(
            &mut self,
            scope: &TenantScope,
            po_id: Uuid,
        ) -> Result<Option<PurchaseOrder>, AppError> {
            Ok(self
                .pos
                .iter()
                .find(|p| p.id == po_id && p.tenant_id == scope.tenant_id())
                .cloned())
        }

        async fn set_purchase_order_status(
            &mut self,
            scope: &TenantScope,
            po_id: Uuid,
            status: PurchaseOrderStatus,
        ) -> Result<PurchaseOrder, AppError> {
            let po = self
                .pos
                .iter_mut()
                .find(|p| p.id == po_id && p.tenant_id == scope.tenant_id())
                .ok_or(AppError::NotFound("Purchase order"))?;
            po.status = status;
            Ok(po.clone())
        }
    }

    fn body(product_id: Uuid, quantity: i32) -> CreatePurchaseOrderPayload {
        CreatePurchaseOrderPayload {
            supplier_id: None,
            items: vec![PurchaseOrderItem {
                product_id: Some(product_id),
                product_name: "Farinha".into(),
                quantity,
                unit_cost: Decimal::new(300, 2),
            }],
            total_cost: None,
            status: PurchaseOrderStatus::Ordered,
            expected_date: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn creating_a_purchase_order_does_not_touch_stock() {
        let scope = test_scope();
        let mut store = MemoryPurchasing::default();
        let product = store.stock.add_product(&scope, "Farinha", 4);

        let po = PurchasingService::new()
            .create_purchase_order(&mut store, &scope, Uuid::new_v4(), body(product, 5))
            .await
            .unwrap();

        assert_eq!(po.total_cost, Decimal::new(1500, 2));
        assert_eq!(store.stock.stock_of(&scope, product), 4);
        assert!(store.stock.logs.is_empty());
    }

    #[tokio::test]
    async fn receiving_books_stock_in_once() {
        let scope = test_scope();
        let mut store = MemoryPurchasing::default();
        let product = store.stock.add_product(&scope, "Farinha", 4);
        let service = PurchasingService::new();
        let user = Uuid::new_v4();

        let po = service
            .create_purchase_order(&mut store, &scope, user, body(product, 5))
            .await
            .unwrap();

        service
            .update_status(&mut store, &scope, user, po.id, PurchaseOrderStatus::Received)
            .await
            .unwrap();

        assert_eq!(store.stock.stock_of(&scope, product), 9);
        let logs = store.stock.logs_for(product);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].log_type, StockLogType::In);
        assert_eq!(logs[0].change_amount, 5);
        assert_eq!(logs[0].reason, receipt_reason(po.id));

        // Receber de novo ou cancelar depois não mexe no saldo.
        service
            .update_status(&mut store, &scope, user, po.id, PurchaseOrderStatus::Received)
            .await
            .unwrap();
        service
            .update_status(&mut store, &scope, user, po.id, PurchaseOrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(store.stock.stock_of(&scope, product), 9);
        assert_eq!(store.stock.logs_for(product).len(), 1);
    }

    #[tokio::test]
    async fn unknown_purchase_order_is_not_found() {
        let scope = test_scope();
        let mut store = MemoryPurchasing::default();

        let err = PurchasingService::new()
            .update_status(&mut store, &scope, Uuid::new_v4(), Uuid::new_v4(), PurchaseOrderStatus::Received)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
