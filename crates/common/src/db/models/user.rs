//! User entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(column_type = "Text", unique)]
    pub email: String,

    /// Argon2 hash, never the plaintext
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub password_hash: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub avatar: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    #[sea_orm(column_type = "Text", unique)]
    pub profile_slug: String,

    /// "reader" or "admin"
    #[sea_orm(column_type = "Text")]
    pub role: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Get the role as an enum
    pub fn user_role(&self) -> crate::auth::Role {
        crate::auth::Role::parse(&self.role).unwrap_or(crate::auth::Role::Reader)
    }

    pub fn is_admin(&self) -> bool {
        self.user_role() == crate::auth::Role::Admin
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::chapter::Entity")]
    UploadedChapters,

    #[sea_orm(has_many = "super::follow::Entity")]
    Follows,
}

impl Related<super::chapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UploadedChapters.def()
    }
}

impl Related<super::manga_series::Entity> for Entity {
    fn to() -> RelationDef {
        super::follow::Relation::MangaSeries.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::follow::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
