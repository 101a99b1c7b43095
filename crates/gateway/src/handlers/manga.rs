//! Manga catalog handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::extract::AdminUser;
use crate::handlers::{self, ApiResponse, MangaData, PageData};
use crate::AppState;
use mangaforge_common::{
    db::{models::MangaStatus, MangaFilters, Repository},
    errors::{AppError, Result},
    metrics,
    workflow::{CreateManga, MangaWithRelations, MangaWorkflow, UpdateManga},
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub genre: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

/// Request to create a new manga
#[derive(Debug, Deserialize, Validate)]
pub struct StoreMangaRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    pub alt_titles: Option<serde_json::Value>,

    pub description: Option<String>,

    pub status: Option<String>,

    #[validate(url)]
    pub cover_image: Option<String>,

    #[serde(default)]
    pub genre_ids: Vec<i64>,

    #[serde(default)]
    pub author_ids: Vec<i64>,
}

/// Request to update a manga.
///
/// Absent keys leave fields untouched; explicit nulls clear nullable
/// fields. Relation keys present - even as empty lists - sync the set.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMangaRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "handlers::double_option")]
    pub alt_titles: Option<Option<serde_json::Value>>,

    #[serde(default, deserialize_with = "handlers::double_option")]
    pub description: Option<Option<String>>,

    pub status: Option<String>,

    #[serde(default, deserialize_with = "handlers::double_option")]
    pub cover_image: Option<Option<String>>,

    pub genre_ids: Option<Vec<i64>>,

    pub author_ids: Option<Vec<i64>>,
}

fn parse_status(status: Option<&str>) -> Result<Option<MangaStatus>> {
    match status {
        None => Ok(None),
        Some(s) => MangaStatus::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::Validation {
                message: format!("Unknown status '{}'", s),
                field: Some("status".to_string()),
            }),
    }
}

fn page_params(page: Option<u64>, per_page: Option<u64>) -> (u64, u64) {
    (
        page.unwrap_or(1).max(1),
        per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
    )
}

fn hydrated(result: MangaWithRelations) -> MangaData {
    MangaData::with_relations(&result.manga, &result.authors, &result.genres, None)
}

/// List manga with pagination and filters
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<PageData<MangaData>>>> {
    let repo = Repository::new(state.db.clone());

    let filters = MangaFilters {
        status: parse_status(query.status.as_deref())?,
        genre: query.genre,
    };
    let (page, per_page) = page_params(query.page, query.per_page);

    let result = repo.list_manga(&filters, page, per_page).await?;

    Ok(handlers::ok(
        PageData {
            items: result.items.iter().map(MangaData::from_model).collect(),
            total: result.total,
            page: result.page,
            per_page: result.per_page,
        },
        "Manga retrieved successfully",
    ))
}

/// Show single manga by slug; every read counts as a view
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<MangaData>>> {
    let repo = Repository::new(state.db.clone());

    let manga = repo
        .find_manga_by_slug(&slug, false)
        .await?
        .ok_or(AppError::MangaNotFound { slug })?;

    repo.increment_views(manga.id).await?;
    metrics::record_manga_view();

    let authors = repo.manga_authors(&manga).await?;
    let genres = repo.manga_genres(&manga).await?;
    let chapters_count = repo.approved_chapter_count(manga.id).await?;

    Ok(handlers::ok(
        MangaData::with_relations(&manga, &authors, &genres, Some(chapters_count)),
        "Manga retrieved successfully",
    ))
}

/// Get popular manga, ranked by view count
pub async fn popular(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<MangaData>>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
    let repo = Repository::new(state.db.clone());

    let manga = repo.popular_manga(limit).await?;

    Ok(handlers::ok(
        manga.iter().map(MangaData::from_model).collect(),
        "Popular manga retrieved successfully",
    ))
}

/// Get latest updated manga
pub async fn latest(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ApiResponse<Vec<MangaData>>>> {
    let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
    let repo = Repository::new(state.db.clone());

    let manga = repo.latest_manga(limit).await?;

    Ok(handlers::ok(
        manga.iter().map(MangaData::from_model).collect(),
        "Latest manga retrieved successfully",
    ))
}

/// Search manga by keyword; a blank keyword lists everything
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<PageData<MangaData>>>> {
    let repo = Repository::new(state.db.clone());
    let (page, per_page) = page_params(query.page, query.per_page);

    let result = repo
        .search_manga(query.q.as_deref().unwrap_or(""), page, per_page)
        .await?;

    Ok(handlers::ok(
        PageData {
            items: result.items.iter().map(MangaData::from_model).collect(),
            total: result.total,
            page: result.page,
            per_page: result.per_page,
        },
        "Search results retrieved successfully",
    ))
}

/// Create new manga (admin only)
pub async fn store(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(request): Json<StoreMangaRequest>,
) -> Result<(StatusCode, Json<ApiResponse<MangaData>>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let status = parse_status(request.status.as_deref())?;

    let workflow = MangaWorkflow::new(state.db.clone());
    let result = workflow
        .create(CreateManga {
            title: request.title,
            alt_titles: request.alt_titles,
            description: request.description,
            status,
            cover_image: request.cover_image,
            genre_ids: request.genre_ids,
            author_ids: request.author_ids,
        })
        .await?;

    Ok(handlers::created(
        hydrated(result),
        "Manga created successfully",
    ))
}

/// Update manga (admin only)
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(slug): Path<String>,
    Json(request): Json<UpdateMangaRequest>,
) -> Result<Json<ApiResponse<MangaData>>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let manga = repo
        .find_manga_by_slug(&slug, false)
        .await?
        .ok_or(AppError::MangaNotFound { slug })?;

    let status = parse_status(request.status.as_deref())?;

    let workflow = MangaWorkflow::new(state.db.clone());
    let result = workflow
        .update(
            manga,
            UpdateManga {
                title: request.title,
                alt_titles: request.alt_titles,
                description: request.description,
                status,
                cover_image: request.cover_image,
                genre_ids: request.genre_ids,
                author_ids: request.author_ids,
            },
        )
        .await?;

    Ok(handlers::ok(
        hydrated(result),
        "Manga updated successfully",
    ))
}

/// Soft delete manga (admin only)
pub async fn destroy(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    let repo = Repository::new(state.db.clone());
    let manga = repo
        .find_manga_by_slug(&slug, false)
        .await?
        .ok_or(AppError::MangaNotFound { slug })?;

    MangaWorkflow::new(state.db.clone()).soft_delete(manga).await?;

    Ok(handlers::ok_empty("Manga deleted successfully"))
}
