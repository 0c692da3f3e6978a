// src/services/tenancy_service.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    db::TenantRepository,
    middleware::tenancy::TenantScope,
    models::tenancy::{Tenant, UpdateTenantPayload},
};

#[derive(Clone)]
pub struct TenantService {
    tenant_repo: TenantRepository,
}

impl TenantService {
    pub fn new(tenant_repo: TenantRepository) -> Self {
        Self { tenant_repo }
    }

    /// Atualiza os dados cadastrais da loja do chamador (nunca de outra).
    pub async fn update_tenant<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        payload: &UpdateTenantPayload,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = self.tenant_repo.update_tenant(executor, scope, payload).await?;
        tracing::info!(tenant_id = %tenant.id, "Dados da loja atualizados");
        Ok(tenant)
    }
}
