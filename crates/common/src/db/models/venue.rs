//! Publication venue entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Venue kind, stored as text with a CHECK constraint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueType {
    Conference,
    Journal,
}

impl From<VenueType> for String {
    fn from(kind: VenueType) -> Self {
        match kind {
            VenueType::Conference => "conference".to_string(),
            VenueType::Journal => "journal".to_string(),
        }
    }
}

// impact_factor is a float, so no Eq
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "venues")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub venue_id: i32,

    pub name: String,

    pub short_name: Option<String>,

    #[serde(rename = "type")]
    #[sea_orm(column_name = "type")]
    pub venue_type: String,

    pub publisher: Option<String>,

    pub impact_factor: Option<f64>,

    pub issn_or_isbn: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::paper::Entity")]
    Papers,
}

impl Related<super::paper::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Papers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
