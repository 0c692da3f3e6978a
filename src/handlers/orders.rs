// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::begin_tenant_tx, error::AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, CurrentTenant},
        rbac::{PermManageOrders, RequirePermission},
        tenancy::TenantScope,
    },
    models::orders::{CreateOrderPayload, Order, UpdateOrderStatusPayload},
};

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Sales",
    responses((status = 200, description = "Pedidos da loja, mais recentes primeiro", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let orders = app_state.order_repo.list_orders(&mut *tx, &scope).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(orders)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido", body = Order),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    scope: TenantScope,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let order = app_state
        .order_repo
        .get_order(&mut *tx, &scope, order_id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Sales",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado; estoque baixado se COMPLETED/PROCESSING", body = Order),
        (status = 400, description = "Pedido sem itens ou valores inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageOrders>,
    AuthenticatedUser(user): AuthenticatedUser,
    scope: TenantScope,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    // Pedido, estoque e cliente na mesma transação
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let order = app_state
        .order_service
        .create_order(&mut *tx, &scope, user.id, payload)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}/status",
    tag = "Sales",
    request_body = UpdateOrderStatusPayload,
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Status alterado; cancelamento/devolução repõe o estoque", body = Order),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageOrders>,
    AuthenticatedUser(user): AuthenticatedUser,
    scope: TenantScope,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let order = app_state
        .order_service
        .update_order_status(&mut *tx, &scope, user.id, order_id, payload.status)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/receipt",
    tag = "Sales",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Recibo em PDF", content_type = "application/pdf"),
        (status = 404, description = "Pedido não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_order_receipt(
    State(app_state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
    scope: TenantScope,
    Path(order_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let pdf_bytes = app_state
        .document_service
        .order_receipt_pdf(&mut tx, &scope, &tenant, order_id)
        .await?;
    tx.commit().await?;

    // Headers para o navegador mostrar ou baixar o PDF
    let disposition = format!("inline; filename=\"receipt_{}.pdf\"", order_id);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, pdf_bytes).into_response())
}
