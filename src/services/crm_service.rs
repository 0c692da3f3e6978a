// src/services/crm_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CrmRepository,
    middleware::tenancy::TenantScope,
    models::crm::{CreateCustomerPayload, CreateSupplierPayload, Customer, Supplier, UpdateCustomerPayload},
};

#[derive(Clone)]
pub struct CrmService {
    repo: CrmRepository,
}

impl CrmService {
    pub fn new(repo: CrmRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list_customers<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_customers(executor, scope).await
    }

    pub async fn create_customer<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        payload: &CreateCustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_customer(executor, scope, payload).await
    }

    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        customer_id: Uuid,
        payload: &UpdateCustomerPayload,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .update_customer(executor, scope, customer_id, payload)
            .await?
            .ok_or(AppError::NotFound("Customer"))
    }

    // Pedidos antigos continuam apontando para o id removido.
    pub async fn delete_customer<'e, E>(&self, executor: E, scope: &TenantScope, customer_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_customer(executor, scope, customer_id).await? {
            return Err(AppError::NotFound("Customer"));
        }
        Ok(())
    }

    // =========================================================================
    //  FORNECEDORES
    // =========================================================================

    pub async fn list_suppliers<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_suppliers(executor, scope).await
    }

    pub async fn create_supplier<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        payload: &CreateSupplierPayload,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.create_supplier(executor, scope, payload).await
    }

    pub async fn delete_supplier<'e, E>(&self, executor: E, scope: &TenantScope, supplier_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_supplier(executor, scope, supplier_id).await? {
            return Err(AppError::NotFound("Supplier"));
        }
        Ok(())
    }
}
