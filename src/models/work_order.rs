use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub site_id: String,
    pub unit_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub priority: String, // 'low', 'normal', 'high', 'urgent'
    pub status: String,   // 'open', 'in_progress', 'resolved', 'cancelled'
    pub reported_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Unit,
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderDto {
    pub id: Option<i32>,
    pub site_id: Option<String>,
    pub unit_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub reported_by: Option<String>,
}

impl From<Model> for WorkOrderDto {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            site_id: Some(model.site_id),
            unit_id: model.unit_id,
            title: model.title,
            description: model.description,
            priority: Some(model.priority),
            status: Some(model.status),
            reported_by: model.reported_by,
        }
    }
}
