//! Chapter image (page) entity
//!
//! Stores the storage path, not a full URL - the public URL is derived
//! on read via the image store. (chapter_id, order) is unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chapter_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub chapter_id: i64,

    /// Page order within the chapter (1, 2, 3, ...)
    pub order: i32,

    /// Storage path (e.g., "chapters/1/42/001.jpg")
    #[sea_orm(column_type = "Text")]
    pub path: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chapter::Entity",
        from = "Column::ChapterId",
        to = "super::chapter::Column::Id",
        on_delete = "Cascade"
    )]
    Chapter,
}

impl Related<super::chapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
