// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::tenancy::Tenant;

// --- Permissões finas ---
pub const VIEW_DASHBOARD: &str = "VIEW_DASHBOARD";
pub const MANAGE_PRODUCTS: &str = "MANAGE_PRODUCTS";
pub const MANAGE_ORDERS: &str = "MANAGE_ORDERS";
pub const MANAGE_USERS: &str = "MANAGE_USERS";
pub const MANAGE_SETTINGS: &str = "MANAGE_SETTINGS";

/// Conjunto padrão dado ao administrador criado no signup.
pub const ADMIN_DEFAULT_PERMISSIONS: [&str; 5] = [
    VIEW_DASHBOARD,
    MANAGE_PRODUCTS,
    MANAGE_ORDERS,
    MANAGE_USERS,
    MANAGE_SETTINGS,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Manager,
    Cashier,
    Salesman,
    User,
}

impl UserRole {
    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }

    /// Permissões usadas quando o convite não informa nenhuma.
    pub fn default_permissions(self) -> Vec<String> {
        let slugs: &[&str] = match self {
            UserRole::SuperAdmin | UserRole::Admin => &ADMIN_DEFAULT_PERMISSIONS,
            UserRole::Manager => &[VIEW_DASHBOARD, MANAGE_PRODUCTS, MANAGE_ORDERS],
            UserRole::Cashier | UserRole::Salesman => &[MANAGE_ORDERS],
            UserRole::User => &[],
        };
        slugs.iter().map(|s| s.to_string()).collect()
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    #[schema(example = "Maria Souza")]
    pub name: String,
    #[schema(example = "maria@padaria.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub role: UserRole,
    #[schema(example = json!(["VIEW_DASHBOARD", "MANAGE_ORDERS"]))]
    pub permissions: Vec<String>,

    #[serde(skip_serializing)]
    pub pin_hash: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_permission(&self, slug: &str) -> bool {
        self.role.is_admin() || self.permissions.iter().any(|p| p == slug)
    }
}

/// Visão pública do usuário (o que vai para o frontend).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub permissions: Vec<String>,
    pub has_pin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            tenant_id: user.tenant_id,
            name: user.name,
            email: user.email,
            role: user.role,
            permissions: user.permissions,
            has_pin: user.pin_hash.is_some(),
            created_at: user.created_at,
        }
    }
}

// Dados para o signup (loja + administrador)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    #[validate(length(min = 1, message = "Company name is required."))]
    #[schema(example = "Padaria Central")]
    pub company_name: String,
    #[validate(length(min = 1, message = "Admin name is required."))]
    #[schema(example = "Maria Souza")]
    pub admin_name: String,
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters."))]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "Email is required."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

// Resposta de autenticação (signup e login)
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
    pub tenant: Tenant,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user: PublicUser,
    pub tenant: Tenant,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // ID do usuário
    pub tid: Uuid,  // ID da loja no momento da emissão
    pub exp: usize, // Expiração
    pub iat: usize, // Emissão
}

// --- Administração de usuários ---

fn validate_pin(pin: &str) -> Result<(), ValidationError> {
    let ok = (4..=6).contains(&pin.len()) && pin.chars().all(|c| c.is_ascii_digit());
    if !ok {
        let mut err = ValidationError::new("pin");
        err.message = Some("PIN must have 4 to 6 digits.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteUserPayload {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "A valid email is required."))]
    pub email: String,
    /// Sem senha, o convite gera uma senha temporária.
    #[validate(length(min = 6, message = "Password must have at least 6 characters."))]
    pub password: Option<String>,
    pub role: UserRole,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteUserResponse {
    pub user: PublicUser,
    /// Só é devolvida quando foi gerada pelo servidor.
    pub temporary_password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolePayload {
    pub role: UserRole,
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePinPayload {
    #[validate(custom(function = "validate_pin"))]
    #[schema(example = "1234")]
    pub pin: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admins_hold_every_permission() {
        let perms = UserRole::Admin.default_permissions();
        for slug in ADMIN_DEFAULT_PERMISSIONS {
            assert!(perms.iter().any(|p| p == slug));
        }
    }

    #[test]
    fn cashier_defaults_to_orders_only() {
        assert_eq!(UserRole::Cashier.default_permissions(), vec![MANAGE_ORDERS.to_string()]);
        assert!(UserRole::User.default_permissions().is_empty());
    }

    #[test]
    fn pin_must_be_four_to_six_digits() {
        assert!(UpdatePinPayload { pin: "1234".into() }.validate().is_ok());
        assert!(UpdatePinPayload { pin: "123".into() }.validate().is_err());
        assert!(UpdatePinPayload { pin: "12a4".into() }.validate().is_err());
        assert!(UpdatePinPayload { pin: "1234567".into() }.validate().is_err());
    }

    #[test]
    fn role_serializes_screaming_snake_case() {
        assert_eq!(serde_json::to_value(UserRole::SuperAdmin).unwrap(), json!("SUPER_ADMIN"));
    }
}
