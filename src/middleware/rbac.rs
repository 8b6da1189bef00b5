// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, middleware::auth::AuthenticatedUser, models::auth::UserRole};

/// 1. O Trait que define quais cargos passam pelo portão
pub trait RoleGate: Send + Sync + 'static {
    fn allowed() -> &'static [UserRole];
}

/// 2. O Extractor (Guardião)
pub struct RequireRole<G>(pub PhantomData<G>);

pub fn check_role(role: UserRole, allowed: &[UserRole]) -> Result<(), AppError> {
    if allowed.contains(&role) {
        return Ok(());
    }
    let names: Vec<&str> = allowed
        .iter()
        .map(|r| match r {
            UserRole::Owner => "OWNER",
            UserRole::User => "USER",
        })
        .collect();
    Err(AppError::Forbidden(format!(
        "Acesso restrito a: {}.",
        names.join(", ")
    )))
}

// 3. Implementação do FromRequestParts
impl<G, S> FromRequestParts<S> for RequireRole<G>
where
    G: RoleGate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A. Extrai Usuário (colocado pelo auth_guard)
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        // B. Confere o cargo
        check_role(user.0.role, G::allowed())?;

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PORTÕES (TIPOS)
// ---

pub struct OwnerOnly;
impl RoleGate for OwnerOnly {
    fn allowed() -> &'static [UserRole] {
        &[UserRole::Owner]
    }
}

pub struct Staff;
impl RoleGate for Staff {
    fn allowed() -> &'static [UserRole] {
        &[UserRole::User, UserRole::Owner]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_gate_rejects_plain_users() {
        assert!(check_role(UserRole::Owner, OwnerOnly::allowed()).is_ok());
        assert!(matches!(
            check_role(UserRole::User, OwnerOnly::allowed()),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn staff_gate_admits_both_roles() {
        assert!(check_role(UserRole::User, Staff::allowed()).is_ok());
        assert!(check_role(UserRole::Owner, Staff::allowed()).is_ok());
    }
}
