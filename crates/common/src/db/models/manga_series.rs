//! Manga series entity - the core entity of the catalog

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publication status enum
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MangaStatus {
    Ongoing,
    Completed,
    Hiatus,
    Cancelled,
}

impl MangaStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MangaStatus::Ongoing => "ongoing",
            MangaStatus::Completed => "completed",
            MangaStatus::Hiatus => "hiatus",
            MangaStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ongoing" => Some(MangaStatus::Ongoing),
            "completed" => Some(MangaStatus::Completed),
            "hiatus" => Some(MangaStatus::Hiatus),
            "cancelled" => Some(MangaStatus::Cancelled),
            _ => None,
        }
    }
}

impl From<MangaStatus> for String {
    fn from(status: MangaStatus) -> Self {
        status.as_str().to_string()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "manga_series")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    /// Alternate titles per locale: {"en": "...", "vi": ["...", "..."]}
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub alt_titles: Option<Json>,

    #[sea_orm(column_type = "Text", unique)]
    pub slug: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub cover_image: Option<String>,

    /// Denormalized view counter, incremented on every detail read
    pub views_count: i64,

    /// Pre-calculated rating (0.00 to 5.00)
    #[sea_orm(column_type = "Decimal(Some((3, 2)))")]
    pub average_rating: Decimal,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    /// Soft-delete marker; queries exclude non-null values by default
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Get the publication status as an enum
    pub fn manga_status(&self) -> MangaStatus {
        MangaStatus::parse(&self.status).unwrap_or(MangaStatus::Ongoing)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::chapter::Entity")]
    Chapters,

    #[sea_orm(has_many = "super::follow::Entity")]
    Follows,
}

impl Related<super::chapter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapters.def()
    }
}

impl Related<super::author::Entity> for Entity {
    fn to() -> RelationDef {
        super::author_manga_series::Relation::Author.def()
    }

    fn via() -> Option<RelationDef> {
        Some(
            super::author_manga_series::Relation::MangaSeries
                .def()
                .rev(),
        )
    }
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        super::genre_manga_series::Relation::Genre.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::genre_manga_series::Relation::MangaSeries.def().rev())
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::follow::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::follow::Relation::MangaSeries.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            MangaStatus::Ongoing,
            MangaStatus::Completed,
            MangaStatus::Hiatus,
            MangaStatus::Cancelled,
        ] {
            assert_eq!(MangaStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(MangaStatus::parse("unknown"), None);
    }
}
