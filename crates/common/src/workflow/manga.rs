//! Manga workflow
//!
//! Create/update of a series plus its author/genre associations. Create
//! *attaches* the given relation ids (adding to whatever exists, no-op on
//! conflict); update *syncs* them (the provided set, even when empty,
//! becomes the full set) - the asymmetry is intentional and covered by
//! tests at the API layer.

use crate::db::models::*;
use crate::db::{DbPool, Repository};
use crate::errors::{AppError, Result};
use crate::slug::slugify;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;

/// Input for manga creation
#[derive(Debug, Default)]
pub struct CreateManga {
    pub title: String,
    pub alt_titles: Option<serde_json::Value>,
    pub description: Option<String>,
    pub status: Option<MangaStatus>,
    pub cover_image: Option<String>,
    pub genre_ids: Vec<i64>,
    pub author_ids: Vec<i64>,
}

/// Input for manga update.
///
/// Nullable scalar fields distinguish "absent" (leave unchanged) from
/// "null" (explicit clear). Relation keys present - even as an empty
/// list - sync the full set; absent keys leave relations untouched.
#[derive(Debug, Default)]
pub struct UpdateManga {
    pub title: Option<String>,
    pub alt_titles: Option<Option<serde_json::Value>>,
    pub description: Option<Option<String>>,
    pub status: Option<MangaStatus>,
    pub cover_image: Option<Option<String>>,
    pub genre_ids: Option<Vec<i64>>,
    pub author_ids: Option<Vec<i64>>,
}

/// A manga hydrated with its relations
#[derive(Debug, Clone)]
pub struct MangaWithRelations {
    pub manga: MangaSeries,
    pub authors: Vec<Author>,
    pub genres: Vec<Genre>,
}

/// Orchestrates manga mutations
pub struct MangaWorkflow {
    db: DbPool,
}

impl MangaWorkflow {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    fn repo(&self) -> Repository {
        Repository::new(self.db.clone())
    }

    /// Create a new manga series and attach the given relations
    pub async fn create(&self, input: CreateManga) -> Result<MangaWithRelations> {
        let repo = self.repo();

        self.validate_relation_ids(&repo, &input.genre_ids, &input.author_ids)
            .await?;

        let slug = repo.unique_manga_slug(&slugify(&input.title)).await?;
        let status = input.status.unwrap_or(MangaStatus::Ongoing);
        let now = chrono::Utc::now();

        let txn = self.db.write().begin().await?;

        let manga = MangaSeriesActiveModel {
            title: Set(input.title),
            alt_titles: Set(input.alt_titles),
            slug: Set(slug),
            description: Set(input.description),
            status: Set(status.as_str().to_string()),
            cover_image: Set(input.cover_image),
            views_count: Set(0),
            average_rating: Set(sea_orm::prelude::Decimal::ZERO),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
            ..Default::default()
        };

        let manga = manga.insert(&txn).await?;

        attach_genres(&txn, manga.id, &input.genre_ids).await?;
        attach_authors(&txn, manga.id, &input.author_ids).await?;

        txn.commit().await?;

        info!(manga_id = manga.id, slug = %manga.slug, "Manga created");

        self.hydrate(manga).await
    }

    /// Apply a partial update; sync relations when their keys are present
    pub async fn update(&self, manga: MangaSeries, input: UpdateManga) -> Result<MangaWithRelations> {
        let repo = self.repo();

        self.validate_relation_ids(
            &repo,
            input.genre_ids.as_deref().unwrap_or(&[]),
            input.author_ids.as_deref().unwrap_or(&[]),
        )
        .await?;

        // A changed title regenerates the slug; old URLs are not preserved
        let new_slug = match input.title {
            Some(ref title) if *title != manga.title => {
                Some(repo.unique_manga_slug(&slugify(title)).await?)
            }
            _ => None,
        };

        let manga_id = manga.id;
        let now = chrono::Utc::now();

        let txn = self.db.write().begin().await?;

        let mut active: MangaSeriesActiveModel = manga.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(slug) = new_slug {
            active.slug = Set(slug);
        }
        if let Some(alt_titles) = input.alt_titles {
            active.alt_titles = Set(alt_titles);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(status) = input.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(cover_image) = input.cover_image {
            active.cover_image = Set(cover_image);
        }
        active.updated_at = Set(now.into());

        let manga = active.update(&txn).await?;

        if let Some(ref genre_ids) = input.genre_ids {
            GenreMangaSeriesEntity::delete_many()
                .filter(GenreMangaSeriesColumn::MangaSeriesId.eq(manga_id))
                .exec(&txn)
                .await?;
            attach_genres(&txn, manga_id, genre_ids).await?;
        }

        if let Some(ref author_ids) = input.author_ids {
            AuthorMangaSeriesEntity::delete_many()
                .filter(AuthorMangaSeriesColumn::MangaSeriesId.eq(manga_id))
                .exec(&txn)
                .await?;
            attach_authors(&txn, manga_id, author_ids).await?;
        }

        txn.commit().await?;

        info!(manga_id, "Manga updated");

        self.hydrate(manga).await
    }

    /// Soft-delete a manga: the row stays, marked deleted, and drops out
    /// of normal queries
    pub async fn soft_delete(&self, manga: MangaSeries) -> Result<()> {
        let manga_id = manga.id;

        let mut active: MangaSeriesActiveModel = manga.into();
        active.deleted_at = Set(Some(chrono::Utc::now().into()));

        active.update(self.db.write()).await?;

        info!(manga_id, "Manga soft-deleted");
        Ok(())
    }

    async fn validate_relation_ids(
        &self,
        repo: &Repository,
        genre_ids: &[i64],
        author_ids: &[i64],
    ) -> Result<()> {
        if !genre_ids.is_empty() && repo.count_genres_in(genre_ids).await? != genre_ids.len() as u64
        {
            return Err(AppError::Validation {
                message: "One or more genre ids do not exist".to_string(),
                field: Some("genre_ids".to_string()),
            });
        }

        if !author_ids.is_empty()
            && repo.count_authors_in(author_ids).await? != author_ids.len() as u64
        {
            return Err(AppError::Validation {
                message: "One or more author ids do not exist".to_string(),
                field: Some("author_ids".to_string()),
            });
        }

        Ok(())
    }

    async fn hydrate(&self, manga: MangaSeries) -> Result<MangaWithRelations> {
        let repo = self.repo();
        let authors = repo.manga_authors(&manga).await?;
        let genres = repo.manga_genres(&manga).await?;

        Ok(MangaWithRelations {
            manga,
            authors,
            genres,
        })
    }
}

/// Attach genres; attaching an already-attached id is a no-op conflict
async fn attach_genres<C: ConnectionTrait>(conn: &C, manga_id: i64, genre_ids: &[i64]) -> Result<()> {
    if genre_ids.is_empty() {
        return Ok(());
    }

    let links = genre_ids.iter().map(|&genre_id| GenreMangaSeriesActiveModel {
        genre_id: Set(genre_id),
        manga_series_id: Set(manga_id),
    });

    GenreMangaSeriesEntity::insert_many(links)
        .on_conflict(
            OnConflict::columns([
                GenreMangaSeriesColumn::GenreId,
                GenreMangaSeriesColumn::MangaSeriesId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}

/// Attach authors; same conflict semantics as genres
async fn attach_authors<C: ConnectionTrait>(
    conn: &C,
    manga_id: i64,
    author_ids: &[i64],
) -> Result<()> {
    if author_ids.is_empty() {
        return Ok(());
    }

    let links = author_ids.iter().map(|&author_id| AuthorMangaSeriesActiveModel {
        author_id: Set(author_id),
        manga_series_id: Set(manga_id),
    });

    AuthorMangaSeriesEntity::insert_many(links)
        .on_conflict(
            OnConflict::columns([
                AuthorMangaSeriesColumn::AuthorId,
                AuthorMangaSeriesColumn::MangaSeriesId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(())
}
