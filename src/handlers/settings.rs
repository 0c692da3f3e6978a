// src/handlers/settings.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::{db_utils::begin_tenant_tx, error::AppError},
    config::AppState,
    middleware::{
        auth::CurrentTenant,
        rbac::{PermManageSettings, RequirePermission},
        tenancy::TenantScope,
    },
    models::settings::{IssuedBarcode, Settings, UpdateSettingsPayload},
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses((status = 200, description = "Configurações (criadas com padrões na primeira leitura)", body = Settings)),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let settings = app_state.settings_service.get_settings(&mut tx, &scope).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsPayload,
    responses((status = 200, description = "Configurações gravadas", body = Settings)),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageSettings>,
    scope: TenantScope,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let updated = app_state.settings_service.update_settings(&mut tx, &scope, &payload).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(updated)))
}

// POST /api/settings/barcode
#[utoipa::path(
    post,
    path = "/api/settings/barcode",
    tag = "Settings",
    responses(
        (status = 201, description = "Próximo código de barras da sequência", body = IssuedBarcode),
        (status = 400, description = "Prefixo incompatível com o formato")
    ),
    security(("api_jwt" = []))
)]
pub async fn issue_barcode(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermManageSettings>,
    CurrentTenant(tenant): CurrentTenant,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let issued = app_state.settings_service.issue_barcode(&mut tx, &scope, &tenant.slug).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(issued)))
}
