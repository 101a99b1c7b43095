//! Profile handlers for the authenticated user
//!
//! The update request enumerates exactly the fields a user may change;
//! anything else in the body is rejected by deserialization, not filtered
//! after the fact.

use axum::{extract::State, Json};
use serde::Deserialize;
use validator::Validate;

use crate::extract::AuthUser;
use crate::handlers::{self, ApiResponse, UserData};
use crate::AppState;
use mangaforge_common::{
    auth::verify_password,
    db::Repository,
    errors::{AppError, Result},
    workflow::{UpdateProfile, UserWorkflow},
};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "handlers::double_option")]
    pub bio: Option<Option<String>>,

    #[serde(default, deserialize_with = "handlers::double_option")]
    pub avatar: Option<Option<String>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    pub current_password: String,

    #[validate(length(min = 8, max = 255))]
    pub new_password: String,
}

async fn current_user(state: &AppState, auth: AuthUser) -> Result<mangaforge_common::db::models::User> {
    Repository::new(state.db.clone())
        .find_user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| AppError::UserNotFound {
            id: auth.user_id.to_string(),
        })
}

/// Update profile fields (name, bio, avatar)
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserData>>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let user = current_user(&state, auth).await?;

    let user = UserWorkflow::new(state.db.clone())
        .update_profile(
            user,
            UpdateProfile {
                name: request.name,
                bio: request.bio,
                avatar: request.avatar,
            },
        )
        .await?;

    Ok(handlers::ok(
        UserData::from_model(&user),
        "Profile updated successfully",
    ))
}

/// Change the account password
pub async fn update_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<()>>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let user = current_user(&state, auth).await?;

    if !verify_password(&request.current_password, &user.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    UserWorkflow::new(state.db.clone())
        .update_password(user, &request.new_password)
        .await?;

    Ok(handlers::ok_empty("Password updated successfully"))
}
