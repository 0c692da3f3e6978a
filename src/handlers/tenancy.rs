// src/handlers/tenancy.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{db_utils::begin_tenant_tx, error::AppError},
    config::AppState,
    middleware::{rbac::RequireAdmin, tenancy::TenantScope},
    models::tenancy::{Tenant, UpdateTenantPayload},
};

#[utoipa::path(
    put,
    path = "/api/tenant",
    tag = "Tenancy",
    request_body = UpdateTenantPayload,
    responses((status = 200, description = "Dados da loja atualizados", body = Tenant)),
    security(("api_jwt" = []))
)]
pub async fn update_tenant(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    scope: TenantScope,
    Json(payload): Json<UpdateTenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let tenant = app_state.tenant_service.update_tenant(&mut *tx, &scope, &payload).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(tenant)))
}
