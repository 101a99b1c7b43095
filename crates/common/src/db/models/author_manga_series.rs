//! Author / manga series join entity
//!
//! Composite primary key; attaching the same pair twice is a no-op
//! conflict, not a duplicate row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "author_manga_series")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub author_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub manga_series_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::author::Entity",
        from = "Column::AuthorId",
        to = "super::author::Column::Id",
        on_delete = "Cascade"
    )]
    Author,

    #[sea_orm(
        belongs_to = "super::manga_series::Entity",
        from = "Column::MangaSeriesId",
        to = "super::manga_series::Column::Id",
        on_delete = "Cascade"
    )]
    MangaSeries,
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::manga_series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MangaSeries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
