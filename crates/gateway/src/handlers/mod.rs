//! Request handlers
//!
//! Every endpoint responds with the `{success, message, data}` envelope;
//! paginated endpoints nest the page under `data`. Errors are translated
//! by `AppError::into_response` - handlers never build error bodies.

pub mod auth;
pub mod authors;
pub mod chapters;
pub mod follows;
pub mod genres;
pub mod health;
pub mod manga;
pub mod me;

use axum::{http::StatusCode, Json};
use mangaforge_common::db::models::{Author, Chapter, ChapterImage, Genre, MangaSeries, User};
use mangaforge_common::storage::ImageStore;
use serde::{Deserialize, Deserializer, Serialize};

/// Standard response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

/// 200 OK with data
pub fn ok<T: Serialize>(data: T, message: &str) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: message.to_string(),
        data: Some(data),
    })
}

/// 201 Created with data
pub fn created<T: Serialize>(data: T, message: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            message: message.to_string(),
            data: Some(data),
        }),
    )
}

/// 200 OK without data
pub fn ok_empty(message: &str) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        message: message.to_string(),
        data: None,
    })
}

/// One page of serialized items
#[derive(Debug, Serialize)]
pub struct PageData<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Deserialize helper distinguishing an absent key (outer `None`) from an
/// explicit `null` (inner `None`). Used by partial-update request types.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}

// ============================================================================
// Response data types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MangaData {
    pub id: i64,
    pub title: String,
    pub alt_titles: Option<serde_json::Value>,
    pub slug: String,
    pub description: Option<String>,
    pub status: String,
    pub cover_image: Option<String>,
    pub views_count: i64,
    pub average_rating: String,
    pub created_at: String,
    pub updated_at: String,

    // Relations, present only when hydrated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors: Option<Vec<AuthorData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<GenreData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapters_count: Option<u64>,
}

impl MangaData {
    pub fn from_model(manga: &MangaSeries) -> Self {
        Self {
            id: manga.id,
            title: manga.title.clone(),
            alt_titles: manga.alt_titles.clone(),
            slug: manga.slug.clone(),
            description: manga.description.clone(),
            status: manga.status.clone(),
            cover_image: manga.cover_image.clone(),
            views_count: manga.views_count,
            average_rating: manga.average_rating.to_string(),
            created_at: manga.created_at.to_rfc3339(),
            updated_at: manga.updated_at.to_rfc3339(),
            authors: None,
            genres: None,
            chapters_count: None,
        }
    }

    pub fn with_relations(
        manga: &MangaSeries,
        authors: &[Author],
        genres: &[Genre],
        chapters_count: Option<u64>,
    ) -> Self {
        let mut data = Self::from_model(manga);
        data.authors = Some(authors.iter().map(AuthorData::from_model).collect());
        data.genres = Some(genres.iter().map(GenreData::from_model).collect());
        data.chapters_count = chapters_count;
        data
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorData {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl AuthorData {
    pub fn from_model(author: &Author) -> Self {
        Self {
            id: author.id,
            name: author.name.clone(),
            slug: author.slug.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenreData {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl GenreData {
    pub fn from_model(genre: &Genre) -> Self {
        Self {
            id: genre.id,
            name: genre.name.clone(),
            slug: genre.slug.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterData {
    pub id: i64,
    pub manga_series_id: i64,
    pub uploader_id: i64,
    pub number: String,
    pub title: Option<String>,
    pub slug: String,
    pub is_approved: bool,
    pub created_at: String,
    pub updated_at: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ChapterImageData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manga_title: Option<String>,
}

impl ChapterData {
    pub fn from_model(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id,
            manga_series_id: chapter.manga_series_id,
            uploader_id: chapter.uploader_id,
            number: chapter.number.to_string(),
            title: chapter.title.clone(),
            slug: chapter.slug.clone(),
            is_approved: chapter.is_approved,
            created_at: chapter.created_at.to_rfc3339(),
            updated_at: chapter.updated_at.to_rfc3339(),
            images: None,
            manga_title: None,
        }
    }

    pub fn with_images(chapter: &Chapter, images: &[ChapterImage], store: &dyn ImageStore) -> Self {
        let mut data = Self::from_model(chapter);
        data.images = Some(
            images
                .iter()
                .map(|image| ChapterImageData::from_model(image, store))
                .collect(),
        );
        data
    }
}

#[derive(Debug, Serialize)]
pub struct ChapterImageData {
    pub id: i64,
    pub order: i32,
    pub url: String,
}

impl ChapterImageData {
    pub fn from_model(image: &ChapterImage, store: &dyn ImageStore) -> Self {
        Self {
            id: image.id,
            order: image.order,
            url: store.url(&image.path),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserData {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub profile_slug: String,
    pub role: String,
    pub created_at: String,
}

impl UserData {
    pub fn from_model(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            bio: user.bio.clone(),
            profile_slug: user.profile_slug.clone(),
            role: user.role.clone(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        bio: Option<Option<String>>,
    }

    #[test]
    fn test_double_option_distinguishes_null_from_absent() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.bio, None);

        let cleared: Patch = serde_json::from_str(r#"{"bio": null}"#).unwrap();
        assert_eq!(cleared.bio, Some(None));

        let set: Patch = serde_json::from_str(r#"{"bio": "hi"}"#).unwrap();
        assert_eq!(set.bio, Some(Some("hi".to_string())));
    }

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(&ApiResponse {
            success: true,
            message: "ok".to_string(),
            data: Some(vec![1, 2, 3]),
        })
        .unwrap();

        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "ok");
        assert_eq!(body["data"][0], 1);
    }
}
