//! Chapter handlers: public reads, admin upload/replace, moderation
//!
//! Admin mutations accept multipart/form-data: scalar fields `number` and
//! `title` plus any number of `images` file parts, stored in upload order.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::extract::AdminUser;
use crate::handlers::{self, ApiResponse, ChapterData};
use crate::AppState;
use mangaforge_common::{
    db::Repository,
    errors::{AppError, Result},
    storage::UploadFile,
    workflow::{ChapterWorkflow, CreateChapter, UpdateChapter},
};

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

/// Scalar + file fields collected from a chapter multipart form
#[derive(Debug, Default)]
struct ChapterForm {
    number: Option<Decimal>,
    title_present: bool,
    title: Option<String>,
    images: Vec<UploadFile>,
}

async fn parse_chapter_form(mut multipart: Multipart) -> Result<ChapterForm> {
    let mut form = ChapterForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidFormat {
            message: format!("Malformed multipart body: {}", e),
        })?
    {
        match field.name().unwrap_or("") {
            "number" => {
                let text = field.text().await.map_err(|e| AppError::InvalidFormat {
                    message: format!("Unreadable 'number' field: {}", e),
                })?;
                let number = Decimal::from_str(text.trim()).map_err(|_| AppError::Validation {
                    message: format!("'{}' is not a valid chapter number", text),
                    field: Some("number".to_string()),
                })?;
                if number < Decimal::ZERO {
                    return Err(AppError::Validation {
                        message: "Chapter number must be at least 0".to_string(),
                        field: Some("number".to_string()),
                    });
                }
                form.number = Some(number);
            }
            "title" => {
                let text = field.text().await.map_err(|e| AppError::InvalidFormat {
                    message: format!("Unreadable 'title' field: {}", e),
                })?;
                // An empty title field is an explicit clear
                form.title_present = true;
                form.title = if text.is_empty() { None } else { Some(text) };
            }
            "images" | "images[]" => {
                let filename = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(|e| AppError::InvalidFormat {
                    message: format!("Unreadable image upload: {}", e),
                })?;
                form.images.push(UploadFile::new(filename, data.to_vec()));
            }
            _ => {}
        }
    }

    Ok(form)
}

fn parse_number(raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|_| AppError::InvalidFormat {
        message: format!("'{}' is not a valid chapter number", raw),
    })
}

/// List approved chapters for a manga
pub async fn index(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChapterData>>>> {
    let repo = Repository::new(state.db.clone());

    let manga = repo
        .find_manga_by_slug(&slug, false)
        .await?
        .ok_or(AppError::MangaNotFound { slug })?;

    let chapters = repo.approved_chapters(manga.id).await?;

    Ok(handlers::ok(
        chapters.iter().map(ChapterData::from_model).collect(),
        "Chapters retrieved successfully",
    ))
}

/// Show a single approved chapter with its page images
pub async fn show(
    State(state): State<AppState>,
    Path((slug, number)): Path<(String, String)>,
) -> Result<Json<ApiResponse<ChapterData>>> {
    let number = parse_number(&number)?;
    let repo = Repository::new(state.db.clone());

    let manga = repo
        .find_manga_by_slug(&slug, false)
        .await?
        .ok_or(AppError::MangaNotFound { slug })?;

    let chapter = repo
        .find_chapter_by_number(manga.id, number, true)
        .await?
        .ok_or_else(|| AppError::ChapterNotFound {
            id: number.to_string(),
        })?;

    let images = repo.chapter_images(chapter.id).await?;

    Ok(handlers::ok(
        ChapterData::with_images(&chapter, &images, state.store.as_ref()),
        "Chapter retrieved successfully",
    ))
}

/// Create new chapter with images (admin only)
pub async fn store(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<ChapterData>>)> {
    let repo = Repository::new(state.db.clone());

    let manga = repo
        .find_manga_by_slug(&slug, false)
        .await?
        .ok_or(AppError::MangaNotFound { slug })?;

    let form = parse_chapter_form(multipart).await?;
    let number = form.number.ok_or_else(|| AppError::MissingField {
        field: "number".to_string(),
    })?;

    let workflow = ChapterWorkflow::new(state.db.clone(), state.store.clone());
    let result = workflow
        .create(
            &manga,
            CreateChapter {
                number,
                title: form.title,
                uploader_id: admin.user_id,
                images: form.images,
            },
        )
        .await?;

    Ok(handlers::created(
        ChapterData::with_images(&result.chapter, &result.images, state.store.as_ref()),
        "Chapter created successfully",
    ))
}

/// Update chapter fields and/or replace its images (admin only)
pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((slug, number)): Path<(String, String)>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ChapterData>>> {
    let number = parse_number(&number)?;
    let repo = Repository::new(state.db.clone());

    let manga = repo
        .find_manga_by_slug(&slug, false)
        .await?
        .ok_or(AppError::MangaNotFound { slug })?;

    let chapter = repo
        .find_chapter_by_number(manga.id, number, false)
        .await?
        .ok_or_else(|| AppError::ChapterNotFound {
            id: number.to_string(),
        })?;

    let form = parse_chapter_form(multipart).await?;

    let workflow = ChapterWorkflow::new(state.db.clone(), state.store.clone());
    let result = workflow
        .update(
            chapter,
            UpdateChapter {
                number: form.number,
                title: if form.title_present {
                    Some(form.title)
                } else {
                    None
                },
                images: form.images,
            },
        )
        .await?;

    Ok(handlers::ok(
        ChapterData::with_images(&result.chapter, &result.images, state.store.as_ref()),
        "Chapter updated successfully",
    ))
}

/// Permanently delete a chapter (admin only)
pub async fn destroy(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path((slug, number)): Path<(String, String)>,
) -> Result<Json<ApiResponse<()>>> {
    let number = parse_number(&number)?;
    let repo = Repository::new(state.db.clone());

    let manga = repo
        .find_manga_by_slug(&slug, false)
        .await?
        .ok_or(AppError::MangaNotFound { slug })?;

    let chapter = repo
        .find_chapter_by_number(manga.id, number, false)
        .await?
        .ok_or_else(|| AppError::ChapterNotFound {
            id: number.to_string(),
        })?;

    ChapterWorkflow::new(state.db.clone(), state.store.clone())
        .delete(chapter)
        .await?;

    Ok(handlers::ok_empty("Chapter deleted successfully"))
}

/// List pending chapters for moderation (admin only), newest first
pub async fn pending(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<ApiResponse<Vec<ChapterData>>>> {
    let repo = Repository::new(state.db.clone());

    let chapters = repo.pending_chapters().await?;

    let items = chapters
        .iter()
        .map(|(chapter, manga)| {
            let mut data = ChapterData::from_model(chapter);
            data.manga_title = manga.as_ref().map(|m| m.title.clone());
            data
        })
        .collect();

    Ok(handlers::ok(items, "Pending chapters retrieved successfully"))
}

/// Approve a pending chapter (admin only)
pub async fn approve(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ChapterData>>> {
    let repo = Repository::new(state.db.clone());

    let chapter = repo
        .find_chapter_by_id(id)
        .await?
        .ok_or_else(|| AppError::ChapterNotFound { id: id.to_string() })?;

    let chapter = ChapterWorkflow::new(state.db.clone(), state.store.clone())
        .approve(chapter)
        .await?;

    Ok(handlers::ok(
        ChapterData::from_model(&chapter),
        "Chapter approved successfully",
    ))
}

/// Reject a pending chapter (admin only); shares its teardown with delete
pub async fn reject(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    body: Option<Json<RejectRequest>>,
) -> Result<Json<ApiResponse<()>>> {
    let repo = Repository::new(state.db.clone());

    let chapter = repo
        .find_chapter_by_id(id)
        .await?
        .ok_or_else(|| AppError::ChapterNotFound { id: id.to_string() })?;

    let reason = body.as_ref().and_then(|b| b.reason.as_deref());

    ChapterWorkflow::new(state.db.clone(), state.store.clone())
        .reject(chapter, reason)
        .await?;

    Ok(handlers::ok_empty("Chapter rejected successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_accepts_fractional_chapters() {
        assert_eq!(parse_number("10.5").unwrap(), Decimal::from_str("10.5").unwrap());
        assert_eq!(parse_number("3").unwrap(), Decimal::from_str("3").unwrap());
    }

    #[test]
    fn test_parse_number_rejects_garbage() {
        assert!(matches!(
            parse_number("ten"),
            Err(AppError::InvalidFormat { .. })
        ));
    }
}
