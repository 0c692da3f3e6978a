// src/middleware/tenancy.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::{common::error::AppError, models::tenancy::Tenant};

/// Prova de que a requisição foi autenticada para uma loja.
///
/// Só o `auth_guard` cria um `TenantScope` (a partir da loja do usuário do token),
/// e todo repositório de dados da loja exige um. Assim não existe caminho para
/// consultar dados de uma loja com um id vindo do cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    tenant_id: Uuid,
}

impl TenantScope {
    pub(crate) fn bind(tenant: &Tenant) -> Self {
        Self { tenant_id: tenant.id }
    }

    /// Usado no signup, quando a loja acabou de nascer dentro da transação.
    pub(crate) fn for_new_tenant(tenant_id: Uuid) -> Self {
        Self { tenant_id }
    }

    pub fn tenant_id(&self) -> Uuid {
        self.tenant_id
    }
}

impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantScope>()
            .copied()
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
pub(crate) fn test_scope() -> TenantScope {
    TenantScope { tenant_id: Uuid::new_v4() }
}
