//! Follow workflow
//!
//! Toggle/query of the user-follows-manga relation. Follow and unfollow
//! are idempotent; the composite primary key on the join table is the
//! actual safety net under concurrent double-submission.

use crate::db::models::*;
use crate::db::{DbPool, Repository};
use crate::errors::Result;
use crate::metrics;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::info;

/// Outcome of a follow toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub following: bool,
}

/// Orchestrates follow mutations
pub struct FollowWorkflow {
    db: DbPool,
}

impl FollowWorkflow {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    fn repo(&self) -> Repository {
        Repository::new(self.db.clone())
    }

    /// Toggle the follow state, reporting the new state
    pub async fn toggle(&self, user_id: i64, manga_id: i64) -> Result<ToggleOutcome> {
        let following = if self.repo().is_following(user_id, manga_id).await? {
            self.unfollow(user_id, manga_id).await?;
            false
        } else {
            self.follow(user_id, manga_id).await?;
            true
        };

        metrics::record_follow_toggle(following);

        Ok(ToggleOutcome { following })
    }

    /// Idempotent add; a second follow leaves exactly one row
    pub async fn follow(&self, user_id: i64, manga_id: i64) -> Result<()> {
        let row = FollowActiveModel {
            user_id: Set(user_id),
            manga_series_id: Set(manga_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        FollowEntity::insert(row)
            .on_conflict(
                OnConflict::columns([FollowColumn::UserId, FollowColumn::MangaSeriesId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.write())
            .await?;

        info!(user_id, manga_id, "Follow added");
        Ok(())
    }

    /// Idempotent remove; unfollowing when not following is a no-op
    pub async fn unfollow(&self, user_id: i64, manga_id: i64) -> Result<()> {
        FollowEntity::delete_many()
            .filter(FollowColumn::UserId.eq(user_id))
            .filter(FollowColumn::MangaSeriesId.eq(manga_id))
            .exec(self.db.write())
            .await?;

        info!(user_id, manga_id, "Follow removed");
        Ok(())
    }

    /// Check whether a user follows a manga
    pub async fn is_following(&self, user_id: i64, manga_id: i64) -> Result<bool> {
        self.repo().is_following(user_id, manga_id).await
    }

    /// Manga followed by a user, most recently followed first
    pub async fn list_followed(&self, user_id: i64) -> Result<Vec<MangaSeries>> {
        self.repo().followed_manga(user_id).await
    }
}
