// src/services/finance_service.rs

use chrono::Utc;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    middleware::tenancy::TenantScope,
    models::finance::{CreateExpensePayload, Expense},
};

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository) -> Self {
        Self { repo }
    }

    pub async fn list_expenses<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Vec<Expense>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_expenses(executor, scope).await
    }

    /// Lança a despesa; sem data informada, vale a de hoje (UTC).
    pub async fn create_expense<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        created_by: Uuid,
        payload: &CreateExpensePayload,
    ) -> Result<Expense, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let expense_date = payload.expense_date.unwrap_or_else(|| Utc::now().date_naive());
        self.repo
            .create_expense(executor, scope, payload, expense_date, created_by)
            .await
    }

    pub async fn delete_expense<'e, E>(&self, executor: E, scope: &TenantScope, expense_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_expense(executor, scope, expense_id).await? {
            return Err(AppError::NotFound("Expense"));
        }
        Ok(())
    }
}
