// src/handlers/finance.rs

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
    middleware::{auth::AuthenticatedUser, rbac::RequireAdmin, tenancy::TenantScope},
    models::finance::{CreateExpensePayload, Expense},
};

#[utoipa::path(
    get,
    path = "/api/expenses",
    tag = "Finance",
    responses((status = 200, description = "Despesas da loja", body = Vec<Expense>)),
    security(("api_jwt" = []))
)]
pub async fn list_expenses(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let expenses = app_state.finance_service.list_expenses(&mut *tx, &scope).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(expenses)))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    tag = "Finance",
    request_body = CreateExpensePayload,
    responses((status = 201, description = "Despesa lançada", body = Expense)),
    security(("api_jwt" = []))
)]
pub async fn create_expense(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    AuthenticatedUser(user): AuthenticatedUser,
    scope: TenantScope,
    Json(payload): Json<CreateExpensePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let expense = app_state
        .finance_service
        .create_expense(&mut *tx, &scope, user.id, &payload)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da despesa")),
    responses(
        (status = 204, description = "Despesa removida"),
        (status = 404, description = "Despesa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_expense(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    scope: TenantScope,
    Path(expense_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    app_state.finance_service.delete_expense(&mut *tx, &scope, expense_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
