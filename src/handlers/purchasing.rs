// src/handlers/purchasing.rs

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
        auth::AuthenticatedUser,
        rbac::{PermManageOrders, RequirePermission},
        tenancy::TenantScope,
    },
    models::purchasing::{CreatePurchaseOrderPayload, PurchaseOrder, UpdatePurchaseOrderStatusPayload},
};

#[utoipa::path(
    get,
    path = "/api/purchase-orders",
    tag = "Purchasing",
    responses((status = 200, description = "Pedidos de compra da loja", body = Vec<PurchaseOrder>)),
    security(("api_jwt" = []))
)]
pub async fn list_purchase_orders(
    State(app_state): State<AppState>,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let pos = app_state.purchasing_repo.list_purchase_orders(&mut *tx, &scope).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(pos)))
}

#[utoipa::path(
    post,
    path = "/api/purchase-orders",
    tag = "Purchasing",
    request_body = CreatePurchaseOrderPayload,
    responses((status = 201, description = "Pedido de compra criado (sem efeito no estoque)", body = PurchaseOrder)),
    security(("api_jwt" = []))
)]
pub async fn create_purchase_order(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageOrders>,
    AuthenticatedUser(user): AuthenticatedUser,
    scope: TenantScope,
    Json(payload): Json<CreatePurchaseOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let po = app_state
        .purchasing_service
        .create_purchase_order(&mut *tx, &scope, user.id, payload)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(po)))
}

#[utoipa::path(
    put,
    path = "/api/purchase-orders/{id}/status",
    tag = "Purchasing",
    request_body = UpdatePurchaseOrderStatusPayload,
    params(("id" = Uuid, Path, description = "ID do pedido de compra")),
    responses(
        (status = 200, description = "Status alterado; RECEIVED dá entrada no estoque", body = PurchaseOrder),
        (status = 404, description = "Pedido de compra não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_purchase_order_status(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageOrders>,
    AuthenticatedUser(user): AuthenticatedUser,
    scope: TenantScope,
    Path(po_id): Path<Uuid>,
    Json(payload): Json<UpdatePurchaseOrderStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let po = app_state
        .purchasing_service
        .update_status(&mut *tx, &scope, user.id, po_id, payload.status)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(po)))
}
