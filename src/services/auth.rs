// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{db_utils::bind_tenant, error::AppError},
    db::{SettingsRepository, TenantRepository, UserRepository},
    middleware::tenancy::TenantScope,
    models::{
        auth::{AuthResponse, Claims, LoginPayload, SignupPayload, User, UserRole, ADMIN_DEFAULT_PERMISSIONS},
        tenancy::{slugify, Tenant},
    },
};

/// Validade dos tokens emitidos.
const TOKEN_TTL_DAYS: i64 = 30;

/// Hash bcrypt fora do runtime (é CPU pesada).
pub async fn hash_secret(secret: &str) -> Result<String, AppError> {
    let secret = secret.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&secret, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

async fn verify_secret(secret: &str, hashed: &str) -> Result<bool, AppError> {
    let secret = secret.to_owned();
    let hashed = hashed.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&secret, &hashed))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(valid)
}

pub fn issue_token(secret: &str, user_id: Uuid, tenant_id: Uuid) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        sub: user_id,
        tid: tenant_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

/// Qualquer falha (assinatura, formato, expiração) vira `InvalidToken`.
pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

/// Decide o login depois da senha conferida.
/// A senha vem antes da suspensão: quem erra a senha não descobre o estado da loja.
fn admit_login(password_ok: bool, tenant: Option<&Tenant>) -> Result<(), AppError> {
    if !password_ok {
        return Err(AppError::InvalidCredentials);
    }
    match tenant {
        None => Err(AppError::InvalidCredentials),
        Some(t) if t.is_suspended() => Err(AppError::TenantSuspended),
        Some(_) => Ok(()),
    }
}

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    user_repo: UserRepository,
    tenant_repo: TenantRepository,
    settings_repo: SettingsRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(
        pool: PgPool,
        user_repo: UserRepository,
        tenant_repo: TenantRepository,
        settings_repo: SettingsRepository,
        jwt_secret: String,
    ) -> Self {
        Self { pool, user_repo, tenant_repo, settings_repo, jwt_secret }
    }

    /// Cria loja, administrador e configurações padrão numa transação só.
    pub async fn signup(&self, payload: &SignupPayload) -> Result<AuthResponse, AppError> {
        // Hashing fora da transação, não toca no banco
        let password_hash = hash_secret(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        if self.user_repo.email_exists(&mut *tx, &payload.email).await? {
            return Err(AppError::EmailAlreadyExists);
        }

        let slug = self.unique_slug(&mut tx, &payload.company_name).await?;
        let tenant = self.tenant_repo.create_tenant(&mut *tx, &payload.company_name, &slug).await?;

        let scope = TenantScope::for_new_tenant(tenant.id);
        bind_tenant(&mut tx, &scope).await?;

        let permissions: Vec<String> = ADMIN_DEFAULT_PERMISSIONS.iter().map(|s| s.to_string()).collect();
        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                &scope,
                &payload.admin_name,
                &payload.email,
                &password_hash,
                UserRole::Admin,
                &permissions,
            )
            .await?;

        self.settings_repo.get_or_create(&mut *tx, &scope).await?;

        // Se qualquer passo acima falhar, o drop do tx desfaz tudo.
        tx.commit().await?;

        tracing::info!(tenant_id = %tenant.id, slug = %tenant.slug, "Nova loja cadastrada");

        let token = issue_token(&self.jwt_secret, user.id, tenant.id)?;
        Ok(AuthResponse { token, user: user.into(), tenant })
    }

    // slug base, depois base-1, base-2, ... até achar um livre
    async fn unique_slug(&self, conn: &mut PgConnection, company_name: &str) -> Result<String, AppError> {
        let base = match slugify(company_name) {
            s if s.is_empty() => "store".to_string(),
            s => s,
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.tenant_repo.slug_exists(&mut *conn, &candidate).await? {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        Ok(candidate)
    }

    pub async fn login(&self, payload: &LoginPayload) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(&self.pool, &payload.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_ok = verify_secret(&payload.password, &user.password_hash).await?;
        let tenant = self.tenant_repo.find_by_id(&self.pool, user.tenant_id).await?;
        admit_login(password_ok, tenant.as_ref())?;

        let tenant = self.tenant_repo.touch_last_activity(&self.pool, user.tenant_id).await?;

        let token = issue_token(&self.jwt_secret, user.id, tenant.id)?;
        Ok(AuthResponse { token, user: user.into(), tenant })
    }

    /// Resolve o token em (usuário, loja). A loja vem do usuário, não do token.
    pub async fn authenticate(&self, token: &str) -> Result<(User, Tenant), AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        let user = self
            .user_repo
            .find_by_id(&self.pool, claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let tenant = self
            .tenant_repo
            .find_by_id(&self.pool, user.tenant_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if tenant.is_suspended() {
            return Err(AppError::TenantSuspended);
        }

        Ok((user, tenant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tenancy::{SubscriptionStatus, SubscriptionTier, TenantStatus};

    const SECRET: &str = "test-secret";

    fn tenant(status: TenantStatus) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            name: "Padaria Central".into(),
            slug: "padaria-central".into(),
            subscription_tier: SubscriptionTier::Free,
            subscription_status: SubscriptionStatus::Active,
            status,
            email: None,
            phone: None,
            address: None,
            last_activity_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn token_carries_user_and_tenant() {
        let (user_id, tenant_id) = (Uuid::new_v4(), Uuid::new_v4());
        let token = issue_token(SECRET, user_id, tenant_id).unwrap();
        let claims = decode_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.tid, tenant_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token("other", Uuid::new_v4(), Uuid::new_v4()).unwrap();
        assert!(matches!(decode_token(SECRET, &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let past = Utc::now() - Duration::days(2);
        let claims = Claims {
            sub: Uuid::new_v4(),
            tid: Uuid::new_v4(),
            exp: (past + Duration::hours(1)).timestamp() as usize,
            iat: past.timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_ref())).unwrap();

        assert!(matches!(decode_token(SECRET, &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn wrong_password_hides_tenant_state() {
        let suspended = tenant(TenantStatus::Suspended);
        assert!(matches!(admit_login(false, Some(&suspended)), Err(AppError::InvalidCredentials)));
    }

    #[test]
    fn right_password_on_suspended_tenant_is_forbidden() {
        let suspended = tenant(TenantStatus::Suspended);
        assert!(matches!(admit_login(true, Some(&suspended)), Err(AppError::TenantSuspended)));
        assert!(admit_login(true, Some(&tenant(TenantStatus::Active))).is_ok());
        assert!(admit_login(true, Some(&tenant(TenantStatus::Pending))).is_ok());
    }
}
