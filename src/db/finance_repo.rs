// src/db/finance_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::finance::{CreateExpensePayload, Expense},
};

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_expenses<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expenses = sqlx::query_as::<_, Expense>(
            "SELECT * FROM expenses WHERE tenant_id = $1 ORDER BY expense_date DESC, created_at DESC",
        )
        .bind(scope.tenant_id())
        .fetch_all(executor)
        .await?;
        Ok(expenses)
    }

    pub async fn create_expense<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        payload: &CreateExpensePayload,
        expense_date: NaiveDate,
        created_by: Uuid,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (tenant_id, description, amount, category, expense_date, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(&payload.description)
        .bind(payload.amount)
        .bind(&payload.category)
        .bind(expense_date)
        .bind(payload.notes.as_deref())
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(expense)
    }

    pub async fn delete_expense<'e, E>(&self, executor: E, scope: &TenantScope, expense_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM expenses WHERE tenant_id = $1 AND id = $2")
            .bind(scope.tenant_id())
            .bind(expense_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn total_expenses<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: Decimal = sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM expenses WHERE tenant_id = $1")
            .bind(scope.tenant_id())
            .fetch_one(executor)
            .await?;
        Ok(total)
    }
}
