// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::begin_tenant_tx, error::AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, CurrentTenant},
        rbac::{PermManageProducts, RequirePermission},
        tenancy::TenantScope,
    },
    models::inventory::{
        AdjustStockPayload, Category, CreateCategoryPayload, CreateProductPayload, Product, StockLog,
        StockLogQuery, UpdateProductPayload,
    },
};

// ---
// Produtos
// ---

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Catalog",
    responses((status = 200, description = "Produtos da loja", body = Vec<Product>)),
    security(("api_jwt" = []))
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let products = app_state.inventory_service.list_products(&mut tx, &scope).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(products)))
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto cadastrado", body = Product),
        (status = 400, description = "Dados inválidos ou SKU repetido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageProducts>,
    AuthenticatedUser(user): AuthenticatedUser,
    CurrentTenant(tenant): CurrentTenant,
    scope: TenantScope,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let product = app_state
        .inventory_service
        .create_product(&mut tx, &tenant, &scope, user.id, &payload)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Catalog",
    request_body = UpdateProductPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageProducts>,
    AuthenticatedUser(user): AuthenticatedUser,
    scope: TenantScope,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let product = app_state
        .inventory_service
        .update_product(&mut tx, &scope, user.id, product_id, &payload)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(product)))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageProducts>,
    scope: TenantScope,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    app_state.inventory_service.delete_product(&mut tx, &scope, product_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/stock",
    tag = "Catalog",
    request_body = AdjustStockPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 201, description = "Movimento registrado", body = StockLog),
        (status = 400, description = "Quantidade zero ou tipo reservado a pedidos"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_stock(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageProducts>,
    AuthenticatedUser(user): AuthenticatedUser,
    scope: TenantScope,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<AdjustStockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let log = app_state
        .inventory_service
        .adjust_stock(&mut tx, &scope, user.id, product_id, &payload)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(log)))
}

// ---
// Histórico de estoque
// ---

#[utoipa::path(
    get,
    path = "/api/stock-logs",
    tag = "Catalog",
    params(StockLogQuery),
    responses((status = 200, description = "Últimos 100 movimentos", body = Vec<StockLog>)),
    security(("api_jwt" = []))
)]
pub async fn list_stock_logs(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Query(query): Query<StockLogQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let logs = app_state
        .inventory_service
        .list_stock_logs(&mut tx, &scope, query.product_id)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(logs)))
}

// ---
// Categorias
// ---

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    responses((status = 200, description = "Categorias da loja", body = Vec<Category>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let categories = app_state.inventory_service.list_categories(&mut tx, &scope).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(categories)))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Catalog",
    request_body = CreateCategoryPayload,
    responses((status = 201, description = "Categoria criada", body = Category)),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageProducts>,
    scope: TenantScope,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let category = app_state.inventory_service.create_category(&mut tx, &scope, &payload).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Categoria removida"),
        (status = 404, description = "Categoria não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageProducts>,
    scope: TenantScope,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    app_state.inventory_service.delete_category(&mut tx, &scope, category_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
