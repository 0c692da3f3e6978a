// src/services/dashboard_service.rs

use sqlx::PgConnection;

use crate::{
    common::error::AppError,
    db::{DashboardRepository, FinanceRepository, OrderRepository},
    middleware::tenancy::TenantScope,
    models::{dashboard::DashboardStats, orders::OrderStatus},
};

/// Quantos pedidos aparecem no card de "recentes".
const RECENT_ORDERS: i64 = 10;

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    order_repo: OrderRepository,
    finance_repo: FinanceRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, order_repo: OrderRepository, finance_repo: FinanceRepository) -> Self {
        Self { repo, order_repo, finance_repo }
    }

    pub async fn get_stats(&self, conn: &mut PgConnection, scope: &TenantScope) -> Result<DashboardStats, AppError> {
        let counts = self.repo.counts(&mut *conn, scope).await?;
        let total_revenue = self
            .order_repo
            .revenue_excluding(&mut *conn, scope, &OrderStatus::revenue_excluded())
            .await?;
        let total_expenses = self.finance_repo.total_expenses(&mut *conn, scope).await?;
        let recent_orders = self.order_repo.recent_orders(&mut *conn, scope, RECENT_ORDERS).await?;

        Ok(DashboardStats {
            total_products: counts.total_products,
            total_orders: counts.total_orders,
            total_customers: counts.total_customers,
            low_stock_count: counts.low_stock_count,
            total_revenue,
            total_expenses,
            recent_orders,
        })
    }
}
