//! Chapter workflow
//!
//! State machine over the approval flag:
//! pending (initial) -> approved via approve, pending -> removed via
//! reject, approved or pending -> removed via delete. There is no
//! approved -> pending transition.
//!
//! Transaction flow for create/update:
//! 1. Begin transaction
//! 2. Write chapter record
//! 3. Store images
//! 4. Write chapter image records
//! 5. Commit (or roll back and delete the just-stored files)

use crate::db::models::*;
use crate::db::{is_unique_violation, DbPool, Repository};
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::slug::slugify;
use crate::storage::{ImageStore, StoredImage, UploadFile};
use sea_orm::prelude::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Input for chapter creation
#[derive(Debug)]
pub struct CreateChapter {
    pub number: Decimal,
    pub title: Option<String>,
    pub uploader_id: i64,
    pub images: Vec<UploadFile>,
}

/// Input for chapter update.
///
/// `title` distinguishes "absent" (leave unchanged) from "null"
/// (explicit clear). A non-empty `images` list replaces the full set;
/// absent or empty leaves existing images untouched.
#[derive(Debug, Default)]
pub struct UpdateChapter {
    pub number: Option<Decimal>,
    pub title: Option<Option<String>>,
    pub images: Vec<UploadFile>,
}

/// A chapter hydrated with its page images
#[derive(Debug, Clone)]
pub struct ChapterWithImages {
    pub chapter: Chapter,
    pub images: Vec<ChapterImage>,
}

/// Slug for a chapter, derived from the manga title and chapter number
pub fn chapter_slug(manga_title: &str, number: Decimal) -> String {
    slugify(&format!("{} {}", manga_title, number))
}

/// Approving is only valid for pending chapters
pub fn ensure_can_approve(chapter: &Chapter) -> Result<()> {
    if chapter.is_approved {
        return Err(AppError::InvalidStateTransition {
            message: "Chapter is already approved".to_string(),
        });
    }
    Ok(())
}

/// Rejecting is only valid for pending chapters
pub fn ensure_can_reject(chapter: &Chapter) -> Result<()> {
    if chapter.is_approved {
        return Err(AppError::InvalidStateTransition {
            message: "Cannot reject an approved chapter. Use delete instead.".to_string(),
        });
    }
    Ok(())
}

/// Orchestrates chapter mutations across the entity store and image store
pub struct ChapterWorkflow {
    db: DbPool,
    store: Arc<dyn ImageStore>,
}

impl ChapterWorkflow {
    pub fn new(db: DbPool, store: Arc<dyn ImageStore>) -> Self {
        Self { db, store }
    }

    fn repo(&self) -> Repository {
        Repository::new(self.db.clone())
    }

    /// Create a chapter with images.
    ///
    /// Uploads always start pending regardless of any caller-supplied
    /// flag. The duplicate-number invariant is checked before any store
    /// mutation; the unique constraint catches the concurrent race.
    pub async fn create(&self, manga: &MangaSeries, input: CreateChapter) -> Result<ChapterWithImages> {
        let start = Instant::now();

        if self
            .repo()
            .chapter_number_taken(manga.id, input.number, None)
            .await?
        {
            return Err(AppError::DuplicateChapterNumber {
                number: input.number.to_string(),
            });
        }

        let now = chrono::Utc::now();

        let txn = self.db.write().begin().await?;

        let chapter = ChapterActiveModel {
            manga_series_id: Set(manga.id),
            uploader_id: Set(input.uploader_id),
            number: Set(input.number),
            title: Set(input.title.clone()),
            slug: Set(chapter_slug(&manga.title, input.number)),
            is_approved: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            deleted_at: Set(None),
            ..Default::default()
        };

        let chapter = match chapter.insert(&txn).await {
            Ok(chapter) => chapter,
            Err(e) if is_unique_violation(&e) => {
                // Lost the race on (manga_series_id, number)
                return Err(AppError::DuplicateChapterNumber {
                    number: input.number.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut stored_paths: Vec<String> = Vec::new();

        if !input.images.is_empty() {
            let stored = self
                .store
                .store_many(&input.images, manga.id, chapter.id)
                .await?;
            stored_paths = stored.iter().map(|s| s.path.clone()).collect();

            if let Err(e) = insert_image_rows(&txn, chapter.id, &stored, now).await {
                drop(txn);
                self.cleanup_uploaded(&stored_paths).await;
                return Err(e);
            }
        }

        if let Err(e) = txn.commit().await {
            self.cleanup_uploaded(&stored_paths).await;
            return Err(e.into());
        }

        metrics::record_chapter_upload(start.elapsed().as_secs_f64(), stored_paths.len());

        info!(
            chapter_id = chapter.id,
            manga_id = manga.id,
            number = %chapter.number,
            images = stored_paths.len(),
            "Chapter created"
        );

        let images = self.repo().chapter_images(chapter.id).await?;
        Ok(ChapterWithImages { chapter, images })
    }

    /// Update chapter fields and/or replace its images.
    ///
    /// Image replacement is all-or-nothing: a non-empty list deletes every
    /// existing image row and installs the new set. Old files are removed
    /// from storage only after the new rows are committed, so a failed
    /// upload leaves the previous state recoverable.
    pub async fn update(&self, chapter: Chapter, input: UpdateChapter) -> Result<ChapterWithImages> {
        let repo = self.repo();

        if let Some(number) = input.number {
            if number != chapter.number
                && repo
                    .chapter_number_taken(chapter.manga_series_id, number, Some(chapter.id))
                    .await?
            {
                return Err(AppError::DuplicateChapterNumber {
                    number: number.to_string(),
                });
            }
        }

        let manga_id = chapter.manga_series_id;
        let chapter_id = chapter.id;
        let replace_images = !input.images.is_empty();

        let mut old_paths: Vec<String> = if replace_images {
            repo.chapter_images(chapter_id)
                .await?
                .into_iter()
                .map(|image| image.path)
                .collect()
        } else {
            Vec::new()
        };

        // The slug embeds the chapter number, so a number change recomputes it
        let new_slug = match input.number {
            Some(number) if number != chapter.number => repo
                .find_manga_by_id(manga_id)
                .await?
                .map(|manga| chapter_slug(&manga.title, number)),
            _ => None,
        };

        let now = chrono::Utc::now();

        let txn = self.db.write().begin().await?;

        let mut active: ChapterActiveModel = chapter.into();
        if let Some(number) = input.number {
            active.number = Set(number);
        }
        if let Some(slug) = new_slug {
            active.slug = Set(slug);
        }
        if let Some(title) = input.title.clone() {
            active.title = Set(title);
        }
        active.updated_at = Set(now.into());

        let chapter = match active.update(&txn).await {
            Ok(chapter) => chapter,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::DuplicateChapterNumber {
                    number: input.number.unwrap_or_default().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let mut new_paths: Vec<String> = Vec::new();

        if replace_images {
            let stored = self.store.store_many(&input.images, manga_id, chapter_id).await?;
            new_paths = stored.iter().map(|s| s.path.clone()).collect();

            let replace = async {
                ChapterImageEntity::delete_many()
                    .filter(ChapterImageColumn::ChapterId.eq(chapter_id))
                    .exec(&txn)
                    .await?;
                insert_image_rows(&txn, chapter_id, &stored, now).await
            };

            if let Err(e) = replace.await {
                drop(txn);
                self.cleanup_uploaded(&new_paths).await;
                return Err(e);
            }
        }

        if let Err(e) = txn.commit().await {
            self.cleanup_uploaded(&new_paths).await;
            return Err(e.into());
        }

        // Old files go only after the new rows are committed. Paths reused
        // by the new set (same page position, same extension) must survive.
        if replace_images {
            old_paths.retain(|path| !new_paths.contains(path));
            if !old_paths.is_empty() && !self.store.delete_many(&old_paths).await.unwrap_or(false) {
                warn!(chapter_id, "Some replaced chapter images were left behind");
            }
        }

        info!(
            chapter_id,
            manga_id,
            images_replaced = replace_images,
            "Chapter updated"
        );

        let images = self.repo().chapter_images(chapter_id).await?;
        Ok(ChapterWithImages { chapter, images })
    }

    /// Permanently delete a chapter and its images.
    ///
    /// Hard delete: image rows first, then the chapter row, bypassing the
    /// soft-delete marker. Storage cleanup happens after the commit; if it
    /// fails the operation still reports success - data integrity takes
    /// precedence and the orphaned files are logged for manual cleanup.
    pub async fn delete(&self, chapter: Chapter) -> Result<bool> {
        let manga_id = chapter.manga_series_id;
        let chapter_id = chapter.id;

        let txn = self.db.write().begin().await?;

        ChapterImageEntity::delete_many()
            .filter(ChapterImageColumn::ChapterId.eq(chapter_id))
            .exec(&txn)
            .await?;

        ChapterEntity::delete_by_id(chapter_id).exec(&txn).await?;

        txn.commit().await?;

        match self.store.delete_chapter_dir(manga_id, chapter_id).await {
            Ok(true) => {}
            Ok(false) | Err(_) => {
                warn!(
                    manga_id,
                    chapter_id, "Chapter storage directory left behind; manual cleanup needed"
                );
            }
        }

        info!(chapter_id, manga_id, "Chapter deleted");

        Ok(true)
    }

    /// Approve a pending chapter for public display
    pub async fn approve(&self, chapter: Chapter) -> Result<Chapter> {
        ensure_can_approve(&chapter)?;

        let mut active: ChapterActiveModel = chapter.into();
        active.is_approved = Set(true);
        active.updated_at = Set(chrono::Utc::now().into());

        let chapter = active.update(self.db.write()).await?;

        metrics::record_moderation("approve");
        info!(chapter_id = chapter.id, "Chapter approved");

        Ok(chapter)
    }

    /// Reject a pending chapter.
    ///
    /// Shares its implementation with delete; the reason is accepted for a
    /// future audit trail and currently only lands in the logs.
    pub async fn reject(&self, chapter: Chapter, reason: Option<&str>) -> Result<bool> {
        ensure_can_reject(&chapter)?;

        info!(
            chapter_id = chapter.id,
            reason = reason.unwrap_or("(none)"),
            "Chapter rejected"
        );
        metrics::record_moderation("reject");

        self.delete(chapter).await
    }

    /// Best-effort removal of files uploaded during a failed attempt
    async fn cleanup_uploaded(&self, paths: &[String]) {
        if paths.is_empty() {
            return;
        }

        if !self.store.delete_many(paths).await.unwrap_or(false) {
            warn!(
                count = paths.len(),
                "Failed to clean up uploaded files after rollback"
            );
        }
    }
}

/// Insert one image row per stored file, order = input index + 1
async fn insert_image_rows<C: ConnectionTrait>(
    conn: &C,
    chapter_id: i64,
    stored: &[StoredImage],
    now: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
    for image in stored {
        let row = ChapterImageActiveModel {
            chapter_id: Set(chapter_id),
            order: Set(image.index as i32 + 1),
            path: Set(image.path.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        row.insert(conn).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn chapter(is_approved: bool) -> Chapter {
        let now = chrono::Utc::now();
        Chapter {
            id: 1,
            manga_series_id: 1,
            uploader_id: 7,
            number: Decimal::from_str("10.5").unwrap(),
            title: Some("Bonus".to_string()),
            slug: "one-piece-10-5".to_string(),
            is_approved,
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_chapter_slug() {
        let number = Decimal::from_str("10.5").unwrap();
        assert_eq!(chapter_slug("One Piece", number), "one-piece-10-5");

        let whole = Decimal::from_str("3").unwrap();
        assert_eq!(chapter_slug("Berserk", whole), "berserk-3");
    }

    #[test]
    fn test_approve_requires_pending() {
        assert!(ensure_can_approve(&chapter(false)).is_ok());

        let err = ensure_can_approve(&chapter(true)).unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_reject_requires_pending() {
        assert!(ensure_can_reject(&chapter(false)).is_ok());

        let err = ensure_can_reject(&chapter(true)).unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition { .. }));
    }
}
