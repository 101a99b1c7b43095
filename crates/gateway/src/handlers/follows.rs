//! Follow handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::extract::AuthUser;
use crate::handlers::{self, ApiResponse, MangaData};
use crate::AppState;
use mangaforge_common::{
    db::Repository,
    errors::{AppError, Result},
    workflow::FollowWorkflow,
};

#[derive(Debug, Serialize)]
pub struct ToggleData {
    pub following: bool,
}

/// Toggle follow state for a manga, reporting the new state
pub async fn toggle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<ToggleData>>> {
    let repo = Repository::new(state.db.clone());

    let manga = repo
        .find_manga_by_slug(&slug, false)
        .await?
        .ok_or(AppError::MangaNotFound { slug })?;

    let outcome = FollowWorkflow::new(state.db.clone())
        .toggle(auth.user_id, manga.id)
        .await?;

    let message = if outcome.following {
        "Followed successfully"
    } else {
        "Unfollowed successfully"
    };

    Ok(handlers::ok(
        ToggleData {
            following: outcome.following,
        },
        message,
    ))
}

/// Manga followed by the current user, most recently followed first
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<MangaData>>>> {
    let manga = FollowWorkflow::new(state.db.clone())
        .list_followed(auth.user_id)
        .await?;

    Ok(handlers::ok(
        manga.iter().map(MangaData::from_model).collect(),
        "Followed manga retrieved successfully",
    ))
}
