use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::checklist::{calculate_progress, ChecklistStep};
use crate::domain::DomainError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lease_checklists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub lease_id: i32,
    pub steps: String, // JSON array of ChecklistStep
    pub total_steps: i32,
    pub completed_steps: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lease::Entity",
        from = "Column::LeaseId",
        to = "super::lease::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Lease,
}

impl Related<super::lease::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lease.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn parsed_steps(&self) -> Result<Vec<ChecklistStep>, DomainError> {
        Ok(serde_json::from_str(&self.steps)?)
    }

    pub fn progress(&self) -> u32 {
        calculate_progress(self.completed_steps, self.total_steps)
    }

    pub fn to_json(&self) -> Result<serde_json::Value, DomainError> {
        Ok(serde_json::json!({
            "id": self.id,
            "leaseId": self.lease_id,
            "steps": self.parsed_steps()?,
            "totalSteps": self.total_steps,
            "completedSteps": self.completed_steps,
            "progress": self.progress(),
            "createdAt": self.created_at,
            "updatedAt": self.updated_at,
        }))
    }
}
