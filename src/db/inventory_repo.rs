// src/db/inventory_repo.rs

use sqlx::{Executor, PgConnection, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::inventory::{
        Category, CreateProductPayload, NewStockLog, Product, ProductStock, StockLog,
        UpdateProductPayload,
    },
    services::stock_ledger::StockStore,
};

#[derive(Clone, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Vec<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE tenant_id = $1 ORDER BY created_at DESC",
        )
        .bind(scope.tenant_id())
        .fetch_all(executor)
        .await?;
        Ok(products)
    }

    pub async fn find_product<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        product_id: Uuid,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE tenant_id = $1 AND id = $2")
            .bind(scope.tenant_id())
            .bind(product_id)
            .fetch_optional(executor)
            .await?;
        Ok(product)
    }

    /// Insere com estoque zero; o saldo inicial entra depois pelo livro-razão.
    pub async fn insert_product<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        payload: &CreateProductPayload,
        barcode: Option<&str>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                tenant_id, category_id, name, sku, barcode, description,
                price, cost, stock, low_stock_threshold
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9)
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(payload.category_id)
        .bind(&payload.name)
        .bind(&payload.sku)
        .bind(barcode)
        .bind(payload.description.as_deref())
        .bind(payload.price)
        .bind(payload.cost)
        .bind(payload.low_stock_threshold)
        .fetch_one(executor)
        .await
        .map_err(AppError::from_unique_violation)
    }

    /// Atualiza os dados cadastrais. O estoque fica de fora (só o livro-razão mexe nele).
    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        product_id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Option<Product>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($3, name),
                sku = COALESCE($4, sku),
                barcode = COALESCE($5, barcode),
                category_id = COALESCE($6, category_id),
                description = COALESCE($7, description),
                price = COALESCE($8, price),
                cost = COALESCE($9, cost),
                low_stock_threshold = COALESCE($10, low_stock_threshold),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(product_id)
        .bind(payload.name.as_deref())
        .bind(payload.sku.as_deref())
        .bind(payload.barcode.as_deref())
        .bind(payload.category_id)
        .bind(payload.description.as_deref())
        .bind(payload.price)
        .bind(payload.cost)
        .bind(payload.low_stock_threshold)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from_unique_violation)
    }

    pub async fn delete_product<'e, E>(&self, executor: E, scope: &TenantScope, product_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE tenant_id = $1 AND id = $2")
            .bind(scope.tenant_id())
            .bind(product_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Categorias
    // ---

    pub async fn list_categories<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE tenant_id = $1 ORDER BY name ASC")
                .bind(scope.tenant_id())
                .fetch_all(executor)
                .await?;
        Ok(categories)
    }

    pub async fn insert_category<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        name: &str,
        description: Option<&str>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (tenant_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await?;
        Ok(category)
    }

    // Produtos da categoria continuam apontando para ela (sem integridade referencial).
    pub async fn delete_category<'e, E>(&self, executor: E, scope: &TenantScope, category_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM categories WHERE tenant_id = $1 AND id = $2")
            .bind(scope.tenant_id())
            .bind(category_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ---
    // Histórico
    // ---

    /// Últimos 100 movimentos da loja, mais recentes primeiro.
    pub async fn list_stock_logs<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        product_id: Option<Uuid>,
    ) -> Result<Vec<StockLog>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let logs = sqlx::query_as::<_, StockLog>(
            r#"
            SELECT * FROM stock_logs
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR product_id = $2)
            ORDER BY created_at DESC
            LIMIT 100
            "#,
        )
        .bind(scope.tenant_id())
        .bind(product_id)
        .fetch_all(executor)
        .await?;
        Ok(logs)
    }
}

// O incremento é um único UPDATE ... RETURNING, então duas requisições
// no mesmo produto não perdem atualização.
impl StockStore for PgConnection {
    async fn increment_stock(
        &mut self,
        scope: &TenantScope,
        product_id: Uuid,
        delta: i32,
    ) -> Result<Option<ProductStock>, AppError> {
        let level = sqlx::query_as::<_, ProductStock>(
            r#"
            UPDATE products SET stock = stock + $3, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING name, stock
            "#,
        )
        .bind(scope.tenant_id())
        .bind(product_id)
        .bind(delta)
        .fetch_optional(&mut *self)
        .await?;
        Ok(level)
    }

    async fn append_stock_log(&mut self, scope: &TenantScope, entry: &NewStockLog) -> Result<StockLog, AppError> {
        let log = sqlx::query_as::<_, StockLog>(
            r#"
            INSERT INTO stock_logs (
                tenant_id, product_id, product_name, change_amount,
                final_stock, type, reason, performed_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(entry.product_id)
        .bind(&entry.product_name)
        .bind(entry.change_amount)
        .bind(entry.final_stock)
        .bind(entry.log_type)
        .bind(&entry.reason)
        .bind(entry.performed_by)
        .fetch_one(&mut *self)
        .await?;
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    const INIT_MIGRATION: &str = include_str!("../../migrations/20250101000000_init.sql");

    fn normalized(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn sku_is_unique_per_tenant_only() {
        let sql = normalized(INIT_MIGRATION);
        assert!(sql.contains("CONSTRAINT products_tenant_sku_key UNIQUE (tenant_id, sku)"));
        // nenhuma unicidade global de SKU: outra loja pode repetir o código
        assert!(!sql.contains("UNIQUE (sku)"));
        assert!(sql.contains("sku TEXT NOT NULL,"));
    }
}
