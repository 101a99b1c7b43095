//! SeaORM entity models
//!
//! Database entities for the MangaForge catalog

pub mod author;
pub mod author_manga_series;
pub mod chapter;
pub mod chapter_image;
pub mod follow;
pub mod genre;
pub mod genre_manga_series;
pub mod manga_series;
pub mod user;

pub use manga_series::{
    ActiveModel as MangaSeriesActiveModel, Column as MangaSeriesColumn, Entity as MangaSeriesEntity,
    MangaStatus, Model as MangaSeries,
};

pub use chapter::{
    ActiveModel as ChapterActiveModel, Column as ChapterColumn, Entity as ChapterEntity,
    Model as Chapter,
};

pub use chapter_image::{
    ActiveModel as ChapterImageActiveModel, Column as ChapterImageColumn,
    Entity as ChapterImageEntity, Model as ChapterImage,
};

pub use author::{
    ActiveModel as AuthorActiveModel, Column as AuthorColumn, Entity as AuthorEntity,
    Model as Author,
};

pub use genre::{
    ActiveModel as GenreActiveModel, Column as GenreColumn, Entity as GenreEntity, Model as Genre,
};

pub use user::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as UserEntity, Model as User,
};

pub use follow::{
    ActiveModel as FollowActiveModel, Column as FollowColumn, Entity as FollowEntity,
    Model as Follow,
};

pub use author_manga_series::{
    ActiveModel as AuthorMangaSeriesActiveModel, Column as AuthorMangaSeriesColumn,
    Entity as AuthorMangaSeriesEntity, Model as AuthorMangaSeriesLink,
};

pub use genre_manga_series::{
    ActiveModel as GenreMangaSeriesActiveModel, Column as GenreMangaSeriesColumn,
    Entity as GenreMangaSeriesEntity, Model as GenreMangaSeriesLink,
};
