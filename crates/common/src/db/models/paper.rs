//! Paper entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub paper_id: i32,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[serde(rename = "abstract")]
    #[sea_orm(column_name = "abstract", column_type = "Text", nullable)]
    pub abstract_text: Option<String>,

    pub year: Option<i32>,

    #[sea_orm(unique)]
    pub doi: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub pdf_url: Option<String>,

    pub pages: Option<String>,

    pub venue_id: Option<i32>,

    /// Cached count maintained outside the application
    pub citation_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::VenueId",
        to = "super::venue::Column::VenueId",
        on_delete = "SetNull"
    )]
    Venue,

    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
