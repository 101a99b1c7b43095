//! Genre / manga series join entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "genre_manga_series")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub genre_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub manga_series_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::genre::Entity",
        from = "Column::GenreId",
        to = "super::genre::Column::Id",
        on_delete = "Cascade"
    )]
    Genre,

    #[sea_orm(
        belongs_to = "super::manga_series::Entity",
        from = "Column::MangaSeriesId",
        to = "super::manga_series::Column::Id",
        on_delete = "Cascade"
    )]
    MangaSeries,
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Genre.def()
    }
}

impl Related<super::manga_series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MangaSeries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
