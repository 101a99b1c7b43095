//! Follow join entity (user follows manga)
//!
//! The composite primary key is the safety net against duplicate follows;
//! re-following after an unfollow creates a fresh row with a new timestamp.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub manga_series_id: i64,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::manga_series::Entity",
        from = "Column::MangaSeriesId",
        to = "super::manga_series::Column::Id",
        on_delete = "Cascade"
    )]
    MangaSeries,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::manga_series::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MangaSeries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
