// src/handlers/users.rs

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
    models::auth::{InviteUserPayload, InviteUserResponse, PublicUser, UpdatePinPayload, UpdateRolePayload},
};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses((status = 200, description = "Usuários da loja", body = Vec<PublicUser>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    scope: TenantScope,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let users = app_state.user_service.list_users(&mut tx, &scope).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(users)))
}

/// Atende tanto POST /users quanto POST /users/invite.
#[utoipa::path(
    post,
    path = "/api/users/invite",
    tag = "Users",
    request_body = InviteUserPayload,
    responses(
        (status = 201, description = "Usuário criado (senha provisória se nenhuma foi enviada)", body = InviteUserResponse),
        (status = 400, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn invite_user(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    scope: TenantScope,
    Json(payload): Json<InviteUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let response = app_state.user_service.invite_user(&mut tx, &scope, payload).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    tag = "Users",
    request_body = UpdateRolePayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Cargo atualizado", body = PublicUser),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user_role(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    scope: TenantScope,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let user = app_state.user_service.update_role(&mut tx, &scope, user_id, payload).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(user)))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}/pin",
    tag = "Users",
    request_body = UpdatePinPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "PIN definido", body = PublicUser),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user_pin(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    scope: TenantScope,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdatePinPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    let user = app_state.user_service.update_pin(&mut tx, &scope, user_id, &payload.pin).await?;
    tx.commit().await?;

    Ok((StatusCode::OK, Json(user)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário removido"),
        (status = 400, description = "Tentativa de remover a própria conta"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    _guard: RequireAdmin,
    AuthenticatedUser(acting_user): AuthenticatedUser,
    scope: TenantScope,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let mut tx = begin_tenant_tx(&app_state, &scope).await?;
    app_state.user_service.delete_user(&mut tx, &scope, &acting_user, user_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
