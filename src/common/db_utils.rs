// src/common/db_utils.rs

use sqlx::{PgConnection, Postgres, Transaction};

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::tenancy::TenantScope;

/// Abre a transação da requisição já "travada" na loja do chamador.
pub(crate) async fn begin_tenant_tx(
    app_state: &AppState,
    scope: &TenantScope,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = app_state.db_pool.begin().await?;
    bind_tenant(&mut tx, scope).await?;
    Ok(tx)
}

/// Seta `app.tenant_id` para as políticas de RLS.
/// O `set_config(..., true)` vale só até o commit/rollback, então a conexão
/// volta limpa para a pool.
pub(crate) async fn bind_tenant(conn: &mut PgConnection, scope: &TenantScope) -> Result<(), AppError> {
    sqlx::query("SELECT set_config('app.tenant_id', $1, true)")
        .bind(scope.tenant_id().to_string())
        .execute(conn)
        .await?;
    Ok(())
}
