// src/services/settings_service.rs

use sqlx::PgConnection;

use crate::{
    common::error::AppError,
    db::SettingsRepository,
    middleware::tenancy::TenantScope,
    models::settings::{format_barcode, IssuedBarcode, Settings, UpdateSettingsPayload},
};

#[derive(Clone)]
pub struct SettingsService {
    repo: SettingsRepository,
}

impl SettingsService {
    pub fn new(repo: SettingsRepository) -> Self {
        Self { repo }
    }

    /// Primeira leitura cria o documento com os padrões.
    pub async fn get_settings(&self, conn: &mut PgConnection, scope: &TenantScope) -> Result<Settings, AppError> {
        self.repo.get_or_create(conn, scope).await
    }

    pub async fn update_settings(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        payload: &UpdateSettingsPayload,
    ) -> Result<Settings, AppError> {
        self.repo.upsert(conn, scope, payload).await
    }

    /// Reserva o próximo número e monta o código conforme a política da loja.
    pub async fn issue_barcode(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        tenant_slug: &str,
    ) -> Result<IssuedBarcode, AppError> {
        self.repo.get_or_create(&mut *conn, scope).await?;
        let settings = self.repo.advance_barcode_sequence(&mut *conn, scope).await?;
        let sequence = settings.barcode_next_sequence - 1;

        let barcode = format_barcode(
            settings.barcode_format,
            settings.barcode_prefix_strategy,
            settings.barcode_prefix.as_deref(),
            tenant_slug,
            sequence,
        )
        .map_err(AppError::BadRequest)?;

        tracing::debug!(%barcode, sequence, "Código de barras emitido");
        Ok(IssuedBarcode { barcode, sequence, format: settings.barcode_format })
    }
}
