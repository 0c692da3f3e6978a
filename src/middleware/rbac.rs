// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{self, User},
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião). Administradores passam sempre.
pub struct RequirePermission<T>(pub PhantomData<T>);

pub(crate) fn check_permission(user: &User, slug: &str) -> Result<(), AppError> {
    if user.has_permission(slug) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "You need the '{}' permission to perform this action",
            slug
        )))
    }
}

pub(crate) fn check_admin(user: &User) -> Result<(), AppError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin access required".into()))
    }
}

fn user_from_parts(parts: &Parts) -> Result<&User, AppError> {
    parts
        .extensions
        .get::<AuthenticatedUser>()
        .map(|u| &u.0)
        .ok_or(AppError::InvalidToken)
}

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        check_permission(user_from_parts(parts)?, T::slug())?;
        Ok(RequirePermission(PhantomData))
    }
}

/// Só ADMIN e SUPER_ADMIN.
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        check_admin(user_from_parts(parts)?)?;
        Ok(RequireAdmin)
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermViewDashboard;
impl PermissionDef for PermViewDashboard {
    fn slug() -> &'static str { auth::VIEW_DASHBOARD }
}

pub struct PermManageProducts;
impl PermissionDef for PermManageProducts {
    fn slug() -> &'static str { auth::MANAGE_PRODUCTS }
}

pub struct PermManageOrders;
impl PermissionDef for PermManageOrders {
    fn slug() -> &'static str { auth::MANAGE_ORDERS }
}

pub struct PermManageSettings;
impl PermissionDef for PermManageSettings {
    fn slug() -> &'static str { auth::MANAGE_SETTINGS }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: UserRole, permissions: &[&str]) -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Ana".into(),
            email: "ana@loja.com".into(),
            password_hash: String::new(),
            role,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            pin_hash: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_passes_every_permission_check() {
        let admin = user(UserRole::Admin, &[]);
        assert!(check_permission(&admin, auth::MANAGE_SETTINGS).is_ok());
        assert!(check_admin(&admin).is_ok());
    }

    #[test]
    fn cashier_needs_the_slug() {
        let cashier = user(UserRole::Cashier, &[auth::MANAGE_ORDERS]);
        assert!(check_permission(&cashier, auth::MANAGE_ORDERS).is_ok());
        assert!(matches!(
            check_permission(&cashier, auth::MANAGE_PRODUCTS),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(check_admin(&cashier), Err(AppError::Forbidden(_))));
    }
}
