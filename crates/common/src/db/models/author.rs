//! Author entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "authors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub author_id: i32,

    pub name: String,

    pub affiliation: Option<String>,

    pub email: Option<String>,

    pub orcid_id: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub research_interests: Option<String>,

    pub institution_id: Option<i32>,

    /// Cached metric maintained outside the application
    pub h_index: i32,

    /// Cached metric maintained outside the application
    pub citation_count: i32,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::institution::Entity",
        from = "Column::InstitutionId",
        to = "super::institution::Column::InstitutionId",
        on_delete = "SetNull"
    )]
    Institution,
}

impl Related<super::institution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Institution.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
