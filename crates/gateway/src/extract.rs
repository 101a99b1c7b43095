//! Request extractors for authentication
//!
//! Handlers declare the access level they need in their signature:
//! `AuthUser` for any authenticated caller, `AdminUser` for moderation
//! and catalog writes. Unauthenticated access to a guarded route yields
//! 401, an authenticated caller without the admin role yields 403.

use crate::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use mangaforge_common::{
    auth::{extract_bearer_token, Role},
    errors::AppError,
};

/// An authenticated caller, extracted from the bearer token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized {
                message: "Missing Authorization header".to_string(),
            })?;

        let token = extract_bearer_token(auth_header).ok_or_else(|| AppError::Unauthorized {
            message: "Expected a bearer token".to_string(),
        })?;

        let claims = state.jwt.validate_token(token)?;

        Ok(AuthUser {
            user_id: claims.user_id()?,
            role: claims.role,
        })
    }
}

/// An authenticated caller holding the admin role
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if user.role != Role::Admin {
            return Err(AppError::Forbidden {
                message: "Admin role required".to_string(),
            });
        }

        Ok(AdminUser(user))
    }
}
