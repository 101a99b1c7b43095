//! Repository pattern for database operations
//!
//! Query functions over the entity store. Filters that the source material
//! expressed as implicit query scopes (approved/pending chapters, soft-delete
//! exclusion) are explicit functions or parameters here; multi-step mutations
//! live in the workflow layer, which owns transaction boundaries.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::slug::slug_candidate;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbBackend, EntityTrait, JoinType, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Statement,
};
use serde::Serialize;

/// Filters accepted by the manga list endpoint
#[derive(Debug, Clone, Default)]
pub struct MangaFilters {
    /// Exact status match
    pub status: Option<MangaStatus>,

    /// Genre slug, matched through the join relation
    pub genre: Option<String>,
}

/// One page of manga results
#[derive(Debug, Clone, Serialize)]
pub struct MangaPage {
    pub items: Vec<MangaSeries>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Manga Operations
    // ========================================================================

    /// Find manga by slug, excluding soft-deleted rows unless asked otherwise
    pub async fn find_manga_by_slug(
        &self,
        slug: &str,
        include_deleted: bool,
    ) -> Result<Option<MangaSeries>> {
        let mut query = MangaSeriesEntity::find().filter(MangaSeriesColumn::Slug.eq(slug));

        if !include_deleted {
            query = query.filter(MangaSeriesColumn::DeletedAt.is_null());
        }

        query.one(self.read_conn()).await.map_err(Into::into)
    }

    /// Find manga by ID
    pub async fn find_manga_by_id(&self, id: i64) -> Result<Option<MangaSeries>> {
        MangaSeriesEntity::find_by_id(id)
            .filter(MangaSeriesColumn::DeletedAt.is_null())
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Check whether a manga slug is taken (soft-deleted rows keep their slug)
    pub async fn manga_slug_exists(&self, slug: &str) -> Result<bool> {
        let count = MangaSeriesEntity::find()
            .filter(MangaSeriesColumn::Slug.eq(slug))
            .count(self.write_conn())
            .await?;

        Ok(count > 0)
    }

    /// Resolve a unique manga slug by appending a numeric suffix on collision
    pub async fn unique_manga_slug(&self, base: &str) -> Result<String> {
        for attempt in 0..100 {
            let candidate = slug_candidate(base, attempt);
            if !self.manga_slug_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(AppError::Internal {
            message: format!("Could not find a unique slug for '{}'", base),
        })
    }

    /// List manga with optional filters, newest-created first
    pub async fn list_manga(
        &self,
        filters: &MangaFilters,
        page: u64,
        per_page: u64,
    ) -> Result<MangaPage> {
        let mut query = MangaSeriesEntity::find().filter(MangaSeriesColumn::DeletedAt.is_null());

        if let Some(status) = filters.status {
            query = query.filter(MangaSeriesColumn::Status.eq(status.as_str()));
        }

        if let Some(ref genre_slug) = filters.genre {
            query = query
                .join(
                    JoinType::InnerJoin,
                    genre_manga_series::Relation::MangaSeries.def().rev(),
                )
                .join(JoinType::InnerJoin, genre_manga_series::Relation::Genre.def())
                .filter(GenreColumn::Slug.eq(genre_slug.as_str()));
        }

        query = query.order_by_desc(MangaSeriesColumn::CreatedAt);

        self.paginate_manga(query, page, per_page).await
    }

    /// Search manga by keyword across title, description, and alternate titles.
    ///
    /// A blank keyword is a no-op filter: the result matches an unfiltered
    /// list() call at equal page size.
    pub async fn search_manga(&self, keyword: &str, page: u64, per_page: u64) -> Result<MangaPage> {
        let keyword = keyword.trim();

        if keyword.is_empty() {
            return self.list_manga(&MangaFilters::default(), page, per_page).await;
        }

        let pattern = format!("%{}%", keyword);

        let query = MangaSeriesEntity::find()
            .filter(MangaSeriesColumn::DeletedAt.is_null())
            .filter(
                Condition::any()
                    .add(Expr::col(MangaSeriesColumn::Title).ilike(pattern.clone()))
                    .add(Expr::col(MangaSeriesColumn::Description).ilike(pattern.clone()))
                    .add(Expr::cust_with_values(
                        "CAST(alt_titles AS TEXT) ILIKE $1",
                        [pattern],
                    )),
            )
            .order_by_desc(MangaSeriesColumn::CreatedAt);

        self.paginate_manga(query, page, per_page).await
    }

    async fn paginate_manga(
        &self,
        query: sea_orm::Select<MangaSeriesEntity>,
        page: u64,
        per_page: u64,
    ) -> Result<MangaPage> {
        let per_page = per_page.max(1);
        let page = page.max(1);

        let paginator = query.paginate(self.read_conn(), per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;

        Ok(MangaPage {
            items,
            total,
            page,
            per_page,
        })
    }

    /// Get popular manga, ranked by the denormalized view counter
    pub async fn popular_manga(&self, limit: u64) -> Result<Vec<MangaSeries>> {
        MangaSeriesEntity::find()
            .filter(MangaSeriesColumn::DeletedAt.is_null())
            .order_by_desc(MangaSeriesColumn::ViewsCount)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Get latest updated manga
    pub async fn latest_manga(&self, limit: u64) -> Result<Vec<MangaSeries>> {
        MangaSeriesEntity::find()
            .filter(MangaSeriesColumn::DeletedAt.is_null())
            .order_by_desc(MangaSeriesColumn::UpdatedAt)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Atomically increment the view counter; every read counts
    pub async fn increment_views(&self, manga_id: i64) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE manga_series SET views_count = views_count + 1 WHERE id = $1",
            vec![manga_id.into()],
        );

        use sea_orm::ConnectionTrait;
        self.write_conn().execute(stmt).await?;
        Ok(())
    }

    /// Authors attached to a manga
    pub async fn manga_authors(&self, manga: &MangaSeries) -> Result<Vec<Author>> {
        manga
            .find_related(AuthorEntity)
            .order_by_asc(AuthorColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Genres attached to a manga
    pub async fn manga_genres(&self, manga: &MangaSeries) -> Result<Vec<Genre>> {
        manga
            .find_related(GenreEntity)
            .order_by_asc(GenreColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Count approved chapters of a manga
    pub async fn approved_chapter_count(&self, manga_id: i64) -> Result<u64> {
        ChapterEntity::find()
            .filter(ChapterColumn::MangaSeriesId.eq(manga_id))
            .filter(ChapterColumn::IsApproved.eq(true))
            .filter(ChapterColumn::DeletedAt.is_null())
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Chapter Operations
    // ========================================================================

    /// Approved chapters of a manga, ordered by chapter number
    pub async fn approved_chapters(&self, manga_id: i64) -> Result<Vec<Chapter>> {
        ChapterEntity::find()
            .filter(ChapterColumn::MangaSeriesId.eq(manga_id))
            .filter(ChapterColumn::IsApproved.eq(true))
            .filter(ChapterColumn::DeletedAt.is_null())
            .order_by_asc(ChapterColumn::Number)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Pending chapters for the moderation queue, newest first, with
    /// their parent manga hydrated for display
    pub async fn pending_chapters(&self) -> Result<Vec<(Chapter, Option<MangaSeries>)>> {
        ChapterEntity::find()
            .filter(ChapterColumn::IsApproved.eq(false))
            .filter(ChapterColumn::DeletedAt.is_null())
            .order_by_desc(ChapterColumn::CreatedAt)
            .find_also_related(MangaSeriesEntity)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find a chapter of a manga by its number
    pub async fn find_chapter_by_number(
        &self,
        manga_id: i64,
        number: sea_orm::prelude::Decimal,
        approved_only: bool,
    ) -> Result<Option<Chapter>> {
        let mut query = ChapterEntity::find()
            .filter(ChapterColumn::MangaSeriesId.eq(manga_id))
            .filter(ChapterColumn::Number.eq(number))
            .filter(ChapterColumn::DeletedAt.is_null());

        if approved_only {
            query = query.filter(ChapterColumn::IsApproved.eq(true));
        }

        query.one(self.read_conn()).await.map_err(Into::into)
    }

    /// Find a chapter by ID
    pub async fn find_chapter_by_id(&self, id: i64) -> Result<Option<Chapter>> {
        ChapterEntity::find_by_id(id)
            .filter(ChapterColumn::DeletedAt.is_null())
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Check whether a chapter number is already taken within a manga.
    ///
    /// Soft-deleted rows still hold their number (the unique constraint
    /// covers them), so they are included here on purpose.
    pub async fn chapter_number_taken(
        &self,
        manga_id: i64,
        number: sea_orm::prelude::Decimal,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let mut query = ChapterEntity::find()
            .filter(ChapterColumn::MangaSeriesId.eq(manga_id))
            .filter(ChapterColumn::Number.eq(number));

        if let Some(id) = exclude_id {
            query = query.filter(ChapterColumn::Id.ne(id));
        }

        let count = query.count(self.write_conn()).await?;
        Ok(count > 0)
    }

    /// Images of a chapter in page order
    pub async fn chapter_images(&self, chapter_id: i64) -> Result<Vec<ChapterImage>> {
        ChapterImageEntity::find()
            .filter(ChapterImageColumn::ChapterId.eq(chapter_id))
            .order_by_asc(ChapterImageColumn::Order)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Author Operations
    // ========================================================================

    /// List all authors ordered by name
    pub async fn list_authors(&self) -> Result<Vec<Author>> {
        AuthorEntity::find()
            .order_by_asc(AuthorColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find author by slug
    pub async fn find_author_by_slug(&self, slug: &str) -> Result<Option<Author>> {
        AuthorEntity::find()
            .filter(AuthorColumn::Slug.eq(slug))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Manga credited to an author
    pub async fn author_manga(&self, author: &Author) -> Result<Vec<MangaSeries>> {
        author
            .find_related(MangaSeriesEntity)
            .filter(MangaSeriesColumn::DeletedAt.is_null())
            .order_by_desc(MangaSeriesColumn::CreatedAt)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Count how many of the given author IDs exist
    pub async fn count_authors_in(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        AuthorEntity::find()
            .filter(AuthorColumn::Id.is_in(ids.iter().copied()))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Genre Operations
    // ========================================================================

    /// List all genres ordered by name
    pub async fn list_genres(&self) -> Result<Vec<Genre>> {
        GenreEntity::find()
            .order_by_asc(GenreColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find genre by slug
    pub async fn find_genre_by_slug(&self, slug: &str) -> Result<Option<Genre>> {
        GenreEntity::find()
            .filter(GenreColumn::Slug.eq(slug))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Count how many of the given genre IDs exist
    pub async fn count_genres_in(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        GenreEntity::find()
            .filter(GenreColumn::Id.is_in(ids.iter().copied()))
            .count(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Find user by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Email.eq(email))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find user by ID
    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        UserEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find user by profile slug
    pub async fn find_user_by_profile_slug(&self, slug: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::ProfileSlug.eq(slug))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Check whether a profile slug is taken
    pub async fn profile_slug_exists(&self, slug: &str) -> Result<bool> {
        let count = UserEntity::find()
            .filter(UserColumn::ProfileSlug.eq(slug))
            .count(self.write_conn())
            .await?;

        Ok(count > 0)
    }

    /// Resolve a unique profile slug by appending a numeric suffix on collision
    pub async fn unique_profile_slug(&self, base: &str) -> Result<String> {
        for attempt in 0..100 {
            let candidate = slug_candidate(base, attempt);
            if !self.profile_slug_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Err(AppError::Internal {
            message: format!("Could not find a unique profile slug for '{}'", base),
        })
    }

    // ========================================================================
    // Follow Operations
    // ========================================================================

    /// Check whether a user follows a manga
    pub async fn is_following(&self, user_id: i64, manga_id: i64) -> Result<bool> {
        let count = FollowEntity::find()
            .filter(FollowColumn::UserId.eq(user_id))
            .filter(FollowColumn::MangaSeriesId.eq(manga_id))
            .count(self.read_conn())
            .await?;

        Ok(count > 0)
    }

    /// Manga followed by a user, most recently followed first
    pub async fn followed_manga(&self, user_id: i64) -> Result<Vec<MangaSeries>> {
        let rows = FollowEntity::find()
            .filter(FollowColumn::UserId.eq(user_id))
            .order_by_desc(FollowColumn::CreatedAt)
            .find_also_related(MangaSeriesEntity)
            .all(self.read_conn())
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(_, manga)| manga)
            .filter(|m| !m.is_deleted())
            .collect())
    }
}
