// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    middleware::tenancy::TenantScope,
    models::settings::{Settings, UpdateSettingsPayload},
};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    /// Lê as configurações; se a loja ainda não tem, cria com os padrões.
    pub async fn get_or_create<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Settings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, Settings>(
            r#"
            WITH created AS (
                INSERT INTO settings (tenant_id) VALUES ($1)
                ON CONFLICT (tenant_id) DO NOTHING
                RETURNING *
            )
            SELECT * FROM created
            UNION ALL
            SELECT * FROM settings WHERE tenant_id = $1
            LIMIT 1
            "#,
        )
        .bind(scope.tenant_id())
        .fetch_one(executor)
        .await?;
        Ok(settings)
    }

    /// Grava o documento inteiro. A sequência de código de barras nunca volta.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        input: &UpdateSettingsPayload,
    ) -> Result<Settings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, Settings>(
            r#"
            INSERT INTO settings (
                tenant_id, currency, timezone, tax_rate,
                receipt_header, receipt_footer, receipt_show_logo, receipt_show_tax, receipt_template,
                barcode_format, barcode_prefix_strategy, barcode_prefix,
                barcode_next_sequence, barcode_auto_generate, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW())
            ON CONFLICT (tenant_id) DO UPDATE SET
                currency = EXCLUDED.currency,
                timezone = EXCLUDED.timezone,
                tax_rate = EXCLUDED.tax_rate,
                receipt_header = EXCLUDED.receipt_header,
                receipt_footer = EXCLUDED.receipt_footer,
                receipt_show_logo = EXCLUDED.receipt_show_logo,
                receipt_show_tax = EXCLUDED.receipt_show_tax,
                receipt_template = EXCLUDED.receipt_template,
                barcode_format = EXCLUDED.barcode_format,
                barcode_prefix_strategy = EXCLUDED.barcode_prefix_strategy,
                barcode_prefix = EXCLUDED.barcode_prefix,
                barcode_next_sequence = GREATEST(settings.barcode_next_sequence, EXCLUDED.barcode_next_sequence),
                barcode_auto_generate = EXCLUDED.barcode_auto_generate,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .bind(&input.currency)
        .bind(&input.timezone)
        .bind(input.tax_rate)
        .bind(input.receipt_header.as_deref())
        .bind(input.receipt_footer.as_deref())
        .bind(input.receipt_show_logo)
        .bind(input.receipt_show_tax)
        .bind(input.receipt_template)
        .bind(input.barcode_format)
        .bind(input.barcode_prefix_strategy)
        .bind(input.barcode_prefix.as_deref())
        .bind(input.barcode_next_sequence)
        .bind(input.barcode_auto_generate)
        .fetch_one(executor)
        .await?;
        Ok(settings)
    }

    /// Reserva o próximo número da sequência (busca-e-incrementa atômico).
    /// Devolve as configurações já com o contador avançado.
    pub async fn advance_barcode_sequence<'e, E>(&self, executor: E, scope: &TenantScope) -> Result<Settings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Settings>(
            r#"
            UPDATE settings
            SET barcode_next_sequence = barcode_next_sequence + 1, updated_at = NOW()
            WHERE tenant_id = $1
            RETURNING *
            "#,
        )
        .bind(scope.tenant_id())
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("Settings"))
    }
}
