// src/handlers/crm.rs

use axum::{
    extract::{Path, State},
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
        rbac::{PermManageOrders, PermManageProducts, RequirePermission},
        tenancy::TenantScope,
    },
    models::crm::{CreateCustomerPayload, CreateSupplierPayload, Customer, Supplier, UpdateCustomerPayload},
};

// =============================================================================
//  CLIENTES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "CRM",
    responses((status = 200, description = "Clientes da loja", body = Vec<Customer>)),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let customers = app_state.crm_service.list_customers(&mut *tx, &scope).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(customers)))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "CRM",
    request_body = CreateCustomerPayload,
    responses((status = 201, description = "Cliente criado", body = Customer)),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageOrders>,
    scope: TenantScope,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let customer = app_state.crm_service.create_customer(&mut *tx, &scope, &payload).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    tag = "CRM",
    request_body = UpdateCustomerPayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_customer(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageOrders>,
    scope: TenantScope,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<UpdateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let customer = app_state
        .crm_service
        .update_customer(&mut *tx, &scope, customer_id, &payload)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(customer)))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_customer(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageOrders>,
    scope: TenantScope,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    app_state.crm_service.delete_customer(&mut *tx, &scope, customer_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  FORNECEDORES
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/suppliers",
    tag = "CRM",
    responses((status = 200, description = "Fornecedores da loja", body = Vec<Supplier>)),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let suppliers = app_state.crm_service.list_suppliers(&mut *tx, &scope).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(suppliers)))
}

#[utoipa::path(
    post,
    path = "/api/suppliers",
    tag = "CRM",
    request_body = CreateSupplierPayload,
    responses((status = 201, description = "Fornecedor criado", body = Supplier)),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageProducts>,
    scope: TenantScope,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let supplier = app_state.crm_service.create_supplier(&mut *tx, &scope, &payload).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

#[utoipa::path(
    delete,
    path = "/api/suppliers/{id}",
    tag = "CRM",
    params(("id" = Uuid, Path, description = "ID do fornecedor")),
    responses(
        (status = 204, description = "Fornecedor removido"),
        (status = 404, description = "Fornecedor não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_supplier(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageProducts>,
    scope: TenantScope,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    app_state.crm_service.delete_supplier(&mut *tx, &scope, supplier_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
