// src/db/dashboard_repo.rs

use sqlx::{Executor, FromRow, Postgres};

use crate::{common::error::AppError, middleware::tenancy::TenantScope};

#[derive(Debug, FromRow)]
pub struct DashboardCounts {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_customers: i64,
    pub low_stock_count: i64,
}

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // Contadores dos cards, numa ida só ao banco.
    pub async fn counts<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<DashboardCounts, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let counts = sqlx::query_as::<_, DashboardCounts>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM products WHERE tenant_id = $1) AS total_products,
                (SELECT COUNT(*) FROM orders WHERE tenant_id = $1) AS total_orders,
                (SELECT COUNT(*) FROM customers WHERE tenant_id = $1) AS total_customers,
                (SELECT COUNT(*) FROM products
                  WHERE tenant_id = $1 AND stock <= low_stock_threshold) AS low_stock_count
            "#,
        )
        .bind(scope.tenant_id())
        .fetch_one(executor)
        .await?;
        Ok(counts)
    }
}
