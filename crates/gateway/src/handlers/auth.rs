//! Authentication handlers: register, login, current user

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extract::AuthUser;
use crate::handlers::{self, ApiResponse, UserData};
use crate::AppState;
use mangaforge_common::{
    db::Repository,
    errors::{AppError, Result},
    workflow::{RegisterUser, UserWorkflow},
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 255))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthData {
    pub token: String,
    pub user: UserData,
}

/// Register a new reader account and issue a token
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let workflow = UserWorkflow::new(state.db.clone());
    let user = workflow
        .register(RegisterUser {
            name: request.name,
            email: request.email,
            password: request.password,
        })
        .await?;

    let token = state.jwt.generate_token(user.id, user.user_role())?;

    Ok(handlers::created(
        AuthData {
            token,
            user: UserData::from_model(&user),
        },
        "Registered successfully",
    ))
}

/// Verify credentials and issue a token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>> {
    let workflow = UserWorkflow::new(state.db.clone());
    let user = workflow.login(&request.email, &request.password).await?;

    let token = state.jwt.generate_token(user.id, user.user_role())?;

    Ok(handlers::ok(
        AuthData {
            token,
            user: UserData::from_model(&user),
        },
        "Logged in successfully",
    ))
}

/// Current authenticated user
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<UserData>>> {
    let repo = Repository::new(state.db.clone());

    let user = repo
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound {
            id: auth.user_id.to_string(),
        })?;

    Ok(handlers::ok(
        UserData::from_model(&user),
        "User retrieved successfully",
    ))
}
