//! Chapter entity
//!
//! A chapter starts pending (`is_approved = false`) and is invisible to
//! public readers until a moderator approves it. (manga_series_id, number)
//! is unique; the number is a decimal so bonus chapters like 10.5 work.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chapters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub manga_series_id: i64,

    pub uploader_id: i64,

    /// Decimal for .5 chapters (e.g., 10, 10.5, 11)
    #[sea_orm(column_type = "Decimal(Some((6, 2)))")]
    pub number: Decimal,

    #[sea_orm(column_type = "Text", nullable)]
    pub title: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub slug: String,

    /// Moderation flag; false = pending
    pub is_approved: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    pub fn is_pending(&self) -> bool {
        !self.is_approved
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::manga_series::Entity",
        from = "Column::MangaSeriesId",
        to = "super::manga_series::Column::Id",
        on_delete = "Cascade"
    )]
    MangaSeries,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploaderId",
        to = "super::user::Column::Id"
    )]
    Uploader,

    #[sea_orm(has_many = "super::chapter_image::Entity")]
    Images,
}

impl Related<super::manga_series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MangaSeries.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploader.def()
    }
}

impl Related<super::chapter_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
