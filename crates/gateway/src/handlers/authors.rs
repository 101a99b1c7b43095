//! Author handlers (public reads)

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::handlers::{self, ApiResponse, AuthorData, MangaData};
use crate::AppState;
use mangaforge_common::{
    db::Repository,
    errors::{AppError, Result},
};

#[derive(Debug, Serialize)]
pub struct AuthorDetail {
    #[serde(flatten)]
    pub author: AuthorData,
    pub manga: Vec<MangaData>,
}

/// List all authors
pub async fn index(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<AuthorData>>>> {
    let repo = Repository::new(state.db.clone());

    let authors = repo.list_authors().await?;

    Ok(handlers::ok(
        authors.iter().map(AuthorData::from_model).collect(),
        "Authors retrieved successfully",
    ))
}

/// Show single author by slug, with their manga
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<AuthorDetail>>> {
    let repo = Repository::new(state.db.clone());

    let author = repo
        .find_author_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound {
            resource_type: "author".to_string(),
            id: slug,
        })?;

    let manga = repo.author_manga(&author).await?;

    Ok(handlers::ok(
        AuthorDetail {
            author: AuthorData::from_model(&author),
            manga: manga.iter().map(MangaData::from_model).collect(),
        },
        "Author retrieved successfully",
    ))
}
