//! Citation edge between two papers

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "citations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub citation_id: i32,

    /// Paper that contains the citation
    pub citing_paper_id: i32,

    /// Paper that is being cited
    pub cited_paper_id: i32,

    /// The sentence/context containing the citation
    #[sea_orm(column_type = "Text", nullable)]
    pub citation_context: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::paper::Entity",
        from = "Column::CitingPaperId",
        to = "super::paper::Column::PaperId",
        on_delete = "Cascade"
    )]
    CitingPaper,

    #[sea_orm(
        belongs_to = "super::paper::Entity",
        from = "Column::CitedPaperId",
        to = "super::paper::Column::PaperId",
        on_delete = "Cascade"
    )]
    CitedPaper,
}

impl ActiveModelBehavior for ActiveModel {}
