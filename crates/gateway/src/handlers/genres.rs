//! Genre handlers (public reads)

use axum::{
    extract::{Path, State},
    Json,
};

use crate::handlers::{self, ApiResponse, GenreData};
use crate::AppState;
use mangaforge_common::{
    db::Repository,
    errors::{AppError, Result},
};

/// List all genres
pub async fn index(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<GenreData>>>> {
    let repo = Repository::new(state.db.clone());

    let genres = repo.list_genres().await?;

    Ok(handlers::ok(
        genres.iter().map(GenreData::from_model).collect(),
        "Genres retrieved successfully",
    ))
}

/// Show single genre by slug
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<GenreData>>> {
    let repo = Repository::new(state.db.clone());

    let genre = repo
        .find_genre_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound {
            resource_type: "genre".to_string(),
            id: slug,
        })?;

    Ok(handlers::ok(
        GenreData::from_model(&genre),
        "Genre retrieved successfully",
    ))
}
