// src/db/purchasing_repo.rs

use sqlx::{types::Json, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::purchasing::{NewPurchaseOrder, PurchaseOrder, PurchaseOrderStatus},
    services::purchasing_service::PurchasingStore,
};

#[derive(Clone, Default)]
pub struct PurchasingRepository;

impl PurchasingRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_purchase_orders<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Vec<PurchaseOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pos = sqlx::query_as::<_, PurchaseOrder>(
            "SELECT * FROM purchase_orders WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(scope.tenant_id())
        .fetch_all(executor)
        .await?;
        Ok(pos)
    }
}

impl PurchasingStore for PgConnection {
    async fn insert_purchase_order(
        &mut self,
        scope: &TenantScope,
        po: &NewPurchaseOrder,
    ) -> Result<PurchaseOrder, AppError> {
        let record = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            INSERT INTO purchase_orders (
                tenant_id, supplier_id, items, total_cost, status,
                expected_date, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(po.supplier_id)
        .bind(Json(&po.items))
        .bind(po.total_cost)
        .bind(po.status)
        .bind(po.expected_date)
        .bind(po.notes.as_deref())
        .bind(po.created_by)
        .fetch_one(&mut *self)
        .await?;
        Ok(record)
    }

    async fn find_purchase_order(
        &mut self,
        scope: &TenantScope,
        po_id: Uuid,
    ) -> Result<Option<PurchaseOrder>, AppError> {
        let po = sqlx::query_as::<_, PurchaseOrder>(
            "SELECT * FROM purchase_orders WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(scope.tenant_id())
        .bind(po_id)
        .fetch_optional(&mut *self)
        .await?;
        Ok(po)
    }

    async fn set_purchase_order_status(
        &mut self,
        scope: &TenantScope,
        po_id: Uuid,
        status: PurchaseOrderStatus,
    ) -> Result<PurchaseOrder, AppError> {
        sqlx::query_as::<_, PurchaseOrder>(
            r#"
            UPDATE purchase_orders SET status = $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(po_id)
        .bind(status)
        .fetch_optional(&mut *self)
        .await?
        .ok_or(AppError::NotFound("Purchase order"))
    }
}
