// src/db/orders_repo.rs

use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::orders::{NewOrder, Order, OrderStatus},
    services::order_service::SalesStore,
};

#[derive(Clone, Default)]
pub struct OrderRepository;

impl OrderRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_orders<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Vec<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(scope.tenant_id())
        .fetch_all(executor)
        .await?;
        Ok(orders)
    }

    pub async fn recent_orders<'e, E>(&self, executor: E, scope: &TenantScope, limit: i64) -> Result<Vec<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE tenant_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(scope.tenant_id())
        .bind(limit)
        .fetch_all(executor)
        .await?;
        Ok(orders)
    }

    pub async fn get_order<'e, E>(&self, executor: E, scope: &TenantScope, order_id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE tenant_id = $1 AND id = $2")
            .bind(scope.tenant_id())
            .bind(order_id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    /// Soma de `total_amount` ignorando os status informados.
    pub async fn revenue_excluding<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        excluded: &[OrderStatus],
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let excluded: Vec<&str> = excluded.iter().map(|s| s.as_db_str()).collect();
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount), 0)
            FROM orders
            WHERE tenant_id = $1 AND status::text <> ALL($2)
            "#,
        )
        .bind(scope.tenant_id())
        .bind(excluded)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}

impl SalesStore for PgConnection {
    async fn insert_order(&mut self, scope: &TenantScope, order: &NewOrder) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                tenant_id, customer_id, items, subtotal, discount_amount,
                tax_amount, total_amount, payment_method, status, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(order.customer_id)
        .bind(Json(&order.items))
        .bind(order.subtotal)
        .bind(order.discount_amount)
        .bind(order.tax_amount)
        .bind(order.total_amount)
        .bind(order.payment_method.as_deref())
        .bind(order.status)
        .bind(order.notes.as_deref())
        .bind(order.created_by)
        .fetch_one(&mut *self)
        .await?;
        Ok(order)
    }

    async fn find_order(&mut self, scope: &TenantScope, order_id: Uuid) -> Result<Option<Order>, AppError> {
        // Trava o pedido até o fim da transação da requisição.
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(scope.tenant_id())
        .bind(order_id)
        .fetch_optional(&mut *self)
        .await?;
        Ok(order)
    }

    async fn set_order_status(
        &mut self,
        scope: &TenantScope,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, AppError> {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders SET status = $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(order_id)
        .bind(status)
        .fetch_optional(&mut *self)
        .await?
        .ok_or(AppError::NotFound("Order"))
    }

    async fn credit_customer(
        &mut self,
        scope: &TenantScope,
        customer_id: Uuid,
        amount: Decimal,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE customers
            SET total_spent = total_spent + $3, last_order_date = NOW(), updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(scope.tenant_id())
        .bind(customer_id)
        .bind(amount)
        .execute(&mut *self)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
