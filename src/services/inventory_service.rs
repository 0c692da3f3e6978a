// src/services/inventory_service.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryRepository,
    middleware::tenancy::TenantScope,
    models::inventory::{
        initial_stock_change, stock_update_change, AdjustStockPayload, Category, CreateCategoryPayload,
        CreateProductPayload, Product, StockChange, StockLog, UpdateProductPayload,
    },
    models::tenancy::Tenant,
    services::{settings_service::SettingsService, stock_ledger::apply_stock_change},
};

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    settings_service: SettingsService,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository, settings_service: SettingsService) -> Self {
        Self { inventory_repo, settings_service }
    }

    // --- PRODUTOS ---

    pub async fn list_products(&self, conn: &mut PgConnection, scope: &TenantScope) -> Result<Vec<Product>, AppError> {
        self.inventory_repo.list_products(conn, scope).await
    }

    /// Cadastra o produto. Sem código de barras e com geração automática ligada,
    /// um código é emitido; o estoque inicial entra no livro-razão como IN.
    pub async fn create_product(
        &self,
        conn: &mut PgConnection,
        tenant: &Tenant,
        scope: &TenantScope,
        performed_by: Uuid,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError> {
        let barcode = match payload.barcode.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Some(code.to_string()),
            _ => self.auto_barcode(&mut *conn, tenant, scope).await?,
        };

        let mut product = self
            .inventory_repo
            .insert_product(&mut *conn, scope, payload, barcode.as_deref())
            .await?;

        if let Some(change) = initial_stock_change(product.id, payload.stock) {
            if let Some(log) = apply_stock_change(&mut *conn, scope, &change, performed_by).await? {
                product.stock = log.final_stock;
            }
        }

        tracing::info!(product_id = %product.id, sku = %product.sku, "Produto cadastrado");
        Ok(product)
    }

    async fn auto_barcode(
        &self,
        conn: &mut PgConnection,
        tenant: &Tenant,
        scope: &TenantScope,
    ) -> Result<Option<String>, AppError> {
        let settings = self.settings_service.get_settings(&mut *conn, scope).await?;
        if !settings.barcode_auto_generate {
            return Ok(None);
        }
        let issued = self.settings_service.issue_barcode(conn, scope, &tenant.slug).await?;
        Ok(Some(issued.barcode))
    }

    /// Atualiza o cadastro. Um `stock` diferente do atual vira ajuste no livro-razão.
    pub async fn update_product(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        performed_by: Uuid,
        product_id: Uuid,
        payload: &UpdateProductPayload,
    ) -> Result<Product, AppError> {
        let mut product = self
            .inventory_repo
            .update_product(&mut *conn, scope, product_id, payload)
            .await?
            .ok_or(AppError::NotFound("Product"))?;

        let change = stock_update_change(product.id, product.stock, payload.stock)
            .map_err(|msg| AppError::BadRequest(msg.to_string()))?;
        if let Some(change) = change {
            if let Some(log) = apply_stock_change(&mut *conn, scope, &change, performed_by).await? {
                product.stock = log.final_stock;
            }
        }

        Ok(product)
    }

    pub async fn delete_product(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        product_id: Uuid,
    ) -> Result<(), AppError> {
        if !self.inventory_repo.delete_product(conn, scope, product_id).await? {
            return Err(AppError::NotFound("Product"));
        }
        tracing::info!(%product_id, "Produto removido");
        Ok(())
    }

    // --- ESTOQUE ---

    /// Movimento manual (IN, OUT ou ADJUSTMENT).
    pub async fn adjust_stock(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        performed_by: Uuid,
        product_id: Uuid,
        payload: &AdjustStockPayload,
    ) -> Result<StockLog, AppError> {
        let amount = payload
            .signed_amount()
            .map_err(|msg| AppError::BadRequest(msg.to_string()))?;

        let change = StockChange {
            product_id,
            amount,
            log_type: payload.log_type,
            reason: payload.reason.clone(),
        };

        apply_stock_change(conn, scope, &change, performed_by)
            .await?
            .ok_or(AppError::NotFound("Product"))
    }

    pub async fn list_stock_logs(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        product_id: Option<Uuid>,
    ) -> Result<Vec<StockLog>, AppError> {
        self.inventory_repo.list_stock_logs(conn, scope, product_id).await
    }

    // --- CATEGORIAS ---

    pub async fn list_categories(&self, conn: &mut PgConnection, scope: &TenantScope) -> Result<Vec<Category>, AppError> {
        self.inventory_repo.list_categories(conn, scope).await
    }

    pub async fn create_category(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        payload: &CreateCategoryPayload,
    ) -> Result<Category, AppError> {
        self.inventory_repo
            .insert_category(conn, scope, &payload.name, payload.description.as_deref())
            .await
    }

    pub async fn delete_category(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        category_id: Uuid,
    ) -> Result<(), AppError> {
        if !self.inventory_repo.delete_category(conn, scope, category_id).await? {
            return Err(AppError::NotFound("Category"));
        }
        Ok(())
    }
}
