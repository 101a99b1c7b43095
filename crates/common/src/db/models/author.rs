//! Author entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "authors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(column_type = "Text", unique)]
    pub slug: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::author_manga_series::Entity")]
    AuthorMangaSeries,
}

impl Related<super::author_manga_series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AuthorMangaSeries.def()
    }
}

impl Related<super::manga_series::Entity> for Entity {
    fn to() -> RelationDef {
        super::author_manga_series::Relation::MangaSeries.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::author_manga_series::Relation::Author.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
