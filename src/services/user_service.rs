// src/services/user_service.rs

use sqlx::PgConnection;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    middleware::tenancy::TenantScope,
    models::auth::{InviteUserPayload, InviteUserResponse, PublicUser, UpdateRolePayload, User},
    services::auth::hash_secret,
};

/// Senha provisória do convite: UUID v4 inteiro em hex (32 caracteres).
fn temporary_password() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Ninguém remove a própria conta.
fn ensure_not_self(acting_user: &User, target_id: Uuid) -> Result<(), AppError> {
    if acting_user.id == target_id {
        return Err(AppError::BadRequest("You cannot delete your own account".into()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
}

impl UserService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    pub async fn list_users(&self, conn: &mut PgConnection, scope: &TenantScope) -> Result<Vec<PublicUser>, AppError> {
        let users = self.user_repo.list_users(conn, scope).await?;
        Ok(users.into_iter().map(PublicUser::from).collect())
    }

    /// Cria um usuário na loja do chamador. Sem senha, gera uma provisória
    /// e a devolve uma única vez na resposta.
    pub async fn invite_user(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        payload: InviteUserPayload,
    ) -> Result<InviteUserResponse, AppError> {
        if self.user_repo.email_exists(&mut *conn, &payload.email).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        let (password, temporary_password) = match payload.password {
            Some(password) => (password, None),
            None => {
                let generated = temporary_password();
                (generated.clone(), Some(generated))
            }
        };
        let password_hash = hash_secret(&password).await?;
        let permissions = payload
            .permissions
            .unwrap_or_else(|| payload.role.default_permissions());

        let user = self
            .user_repo
            .create_user(
                &mut *conn,
                scope,
                &payload.name,
                &payload.email,
                &password_hash,
                payload.role,
                &permissions,
            )
            .await?;

        tracing::info!(user_id = %user.id, role = ?user.role, "Usuário convidado");
        Ok(InviteUserResponse { user: user.into(), temporary_password })
    }

    pub async fn update_role(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        user_id: Uuid,
        payload: UpdateRolePayload,
    ) -> Result<PublicUser, AppError> {
        let permissions = payload
            .permissions
            .unwrap_or_else(|| payload.role.default_permissions());

        self.user_repo
            .update_role(conn, scope, user_id, payload.role, &permissions)
            .await?
            .map(PublicUser::from)
            .ok_or(AppError::NotFound("User"))
    }

    pub async fn update_pin(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        user_id: Uuid,
        pin: &str,
    ) -> Result<PublicUser, AppError> {
        let pin_hash = hash_secret(pin).await?;
        self.user_repo
            .update_pin(conn, scope, user_id, &pin_hash)
            .await?
            .map(PublicUser::from)
            .ok_or(AppError::NotFound("User"))
    }

    pub async fn delete_user(
        &self,
        conn: &mut PgConnection,
        scope: &TenantScope,
        acting_user: &User,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        ensure_not_self(acting_user, user_id)?;

        if !self.user_repo.delete_user(conn, scope, user_id).await? {
            return Err(AppError::NotFound("User"));
        }
        tracing::info!(%user_id, "Usuário removido");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::auth::UserRole;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@loja.com".into(),
            password_hash: String::new(),
            role: UserRole::Admin,
            permissions: vec![],
            pin_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn temporary_password_is_long_enough_to_log_in() {
        let password = temporary_password();
        assert_eq!(password.len(), 32);
        assert_ne!(password, temporary_password());
    }

    #[test]
    fn deleting_yourself_is_refused() {
        let me = user();
        assert!(matches!(ensure_not_self(&me, me.id), Err(AppError::BadRequest(_))));
        assert!(ensure_not_self(&me, Uuid::new_v4()).is_ok());
    }
}
