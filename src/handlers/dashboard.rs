// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::{db_utils::begin_tenant_tx, error::AppError},
    config::AppState,
    middleware::{
        rbac::{PermViewDashboard, RequirePermission},
        tenancy::TenantScope,
    },
    models::dashboard::DashboardStats,
};

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "Dashboard",
    responses((status = 200, description = "Indicadores da loja", body = DashboardStats)),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    _guard: RequirePermission<PermViewDashboard>,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let stats = app_state.dashboard_service.get_stats(&mut tx, &scope).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(stats)))
}
