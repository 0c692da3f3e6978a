// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::OnceLock;
use thiserror::Error;

// Definido uma única vez no boot (ver main.rs). Em produção escondemos os detalhes.
static EXPOSE_ERROR_DETAILS: OnceLock<bool> = OnceLock::new();

pub fn set_expose_error_details(expose: bool) {
    let _ = EXPOSE_ERROR_DETAILS.set(expose);
}

fn expose_error_details() -> bool {
    *EXPOSE_ERROR_DETAILS.get().unwrap_or(&true)
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("A product with this SKU already exists")]
    SkuAlreadyExists,

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authorized, token missing or invalid")]
    InvalidToken,

    #[error("Not authorized, user no longer exists")]
    UserNotFound,

    #[error("Tenant account is suspended")]
    TenantSuspended,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Document rendering failed: {0}")]
    DocumentError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::EmailAlreadyExists
            | AppError::SkuAlreadyExists
            | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken | AppError::UserNotFound => {
                StatusCode::UNAUTHORIZED
            }
            AppError::TenantSuspended | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_)
            | AppError::DocumentError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Traduz violações de unicidade do Postgres pelo nome da constraint.
    pub fn from_unique_violation(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return Self::for_unique_constraint(db_err.constraint());
            }
        }
        e.into()
    }

    fn for_unique_constraint(constraint: Option<&str>) -> Self {
        match constraint {
            Some("users_email_key") => AppError::EmailAlreadyExists,
            Some("products_tenant_sku_key") => AppError::SkuAlreadyExists,
            Some(other) => AppError::Conflict(format!("Duplicate value violates '{}'", other)),
            None => AppError::Conflict("Duplicate value".into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let expose = expose_error_details();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro interno do servidor: {:?}", self);
        }

        let message = match &self {
            // Nunca vazamos detalhes de banco/JWT/bcrypt na mensagem principal.
            e if e.status() == StatusCode::INTERNAL_SERVER_ERROR => "Something went wrong".to_string(),
            e => e.to_string(),
        };

        let mut body = json!({ "message": message });

        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(field.to_string(), messages);
            }
            body["details"] = json!(details);
        }

        if expose {
            body["error"] = json!(format!("{:?}", self));
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: AppError) -> (StatusCode, serde_json::Value) {
        let resp = error.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_credentials_is_unauthorized_with_uniform_message() {
        let (status, json) = body_of(AppError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Invalid credentials");
    }

    #[tokio::test]
    async fn suspended_tenant_is_forbidden() {
        let (status, _) = body_of(AppError::TenantSuspended).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn conflicts_map_to_bad_request() {
        assert_eq!(body_of(AppError::EmailAlreadyExists).await.0, StatusCode::BAD_REQUEST);
        assert_eq!(body_of(AppError::SkuAlreadyExists).await.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unique_constraints_map_to_their_variants() {
        assert!(matches!(
            AppError::for_unique_constraint(Some("products_tenant_sku_key")),
            AppError::SkuAlreadyExists
        ));
        assert!(matches!(
            AppError::for_unique_constraint(Some("users_email_key")),
            AppError::EmailAlreadyExists
        ));
        assert!(matches!(
            AppError::for_unique_constraint(Some("tenants_slug_key")),
            AppError::Conflict(msg) if msg.contains("tenants_slug_key")
        ));
        assert!(matches!(AppError::for_unique_constraint(None), AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn not_found_names_the_entity() {
        let (status, json) = body_of(AppError::NotFound("Order")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Order not found");
    }

    #[tokio::test]
    async fn internal_errors_hide_their_cause_in_message() {
        let (status, json) = body_of(AppError::InternalServerError(anyhow::anyhow!("pool exhausted"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], "Something went wrong");
    }

    #[tokio::test]
    async fn validation_errors_carry_field_details() {
        let mut errors = validator::ValidationErrors::new();
        let mut err = validator::ValidationError::new("length");
        err.message = Some("Name is required".into());
        errors.add("name", err);

        let (status, json) = body_of(AppError::ValidationError(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"]["name"][0], "Name is required");
    }
}
