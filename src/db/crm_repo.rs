// src/db/crm_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::crm::{CreateCustomerPayload, CreateSupplierPayload, Customer, Supplier, UpdateCustomerPayload},
};

#[derive(Clone, Default)]
pub struct CrmRepository;

impl CrmRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    pub async fn list_customers<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Vec<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(scope.tenant_id())
        .fetch_all(executor)
        .await?;
        Ok(customers)
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
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (tenant_id, name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(&payload.name)
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.address.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(customer)
    }

    // totalSpent e lastOrderDate não passam por aqui: só o fluxo de pedidos mexe neles.
    pub async fn update_customer<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        customer_id: Uuid,
        payload: &UpdateCustomerPayload,
    ) -> Result<Option<Customer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(customer_id)
        .bind(payload.name.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.address.as_deref())
        .fetch_optional(executor)
        .await?;
        Ok(customer)
    }

    pub async fn delete_customer<'e, E>(&self, executor: E, scope: &TenantScope, customer_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE tenant_id = $1 AND id = $2")
            .bind(scope.tenant_id())
            .bind(customer_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  FORNECEDORES
    // =========================================================================

    pub async fn list_suppliers<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Vec<Supplier>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT * FROM suppliers WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(scope.tenant_id())
        .fetch_all(executor)
        .await?;
        Ok(suppliers)
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
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (tenant_id, name, contact_name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(&payload.name)
        .bind(payload.contact_name.as_deref())
        .bind(payload.email.as_deref())
        .bind(payload.phone.as_deref())
        .bind(payload.address.as_deref())
        .fetch_one(executor)
        .await?;
        Ok(supplier)
    }

    pub async fn delete_supplier<'e, E>(&self, executor: E, scope: &TenantScope, supplier_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM suppliers WHERE tenant_id = $1 AND id = $2")
            .bind(scope.tenant_id())
            .bind(supplier_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
