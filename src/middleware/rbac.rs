// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::auth::AuthenticatedUser;
use crate::{
    common::error::AppError,
    models::auth::{Role, SessionUser},
};

/// A set of roles allowed through an endpoint.
pub trait RoleRequirement: Send + Sync + 'static {
    fn allows(role: Role) -> bool;
}

/// Extractor that admits only users whose role satisfies `T`.
pub struct RequireRole<T> {
    pub user: SessionUser,
    _requirement: PhantomData<T>,
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleRequirement,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !T::allows(user.role) {
            tracing::warn!(user_id = %user.id, role = %user.role, path = %parts.uri.path(), "role not allowed");
            return Err(AppError::Forbidden(user.role.to_string()));
        }

        Ok(RequireRole { user, _requirement: PhantomData })
    }
}

// ---
// Requirements
// ---

pub struct VendorAccess;
impl RoleRequirement for VendorAccess {
    fn allows(role: Role) -> bool {
        matches!(role, Role::Vendor | Role::Admin)
    }
}

pub struct AdminAccess;
impl RoleRequirement for AdminAccess {
    fn allows(role: Role) -> bool {
        role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_access_admits_admins_too() {
        assert!(VendorAccess::allows(Role::Vendor));
        assert!(VendorAccess::allows(Role::Admin));
        assert!(!VendorAccess::allows(Role::User));
    }

    #[test]
    fn admin_access_is_exclusive() {
        assert!(AdminAccess::allows(Role::Admin));
        assert!(!AdminAccess::allows(Role::Vendor));
    }
}
