use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only transition log. Rows are created once and never mutated
/// or deleted; history belongs to the entity, referenced by entity id.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stage_transitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String, // uuid
    pub entity_type: String, // 'lease' | 'application'
    pub entity_id: i32,
    pub from_stage: String,
    pub to_stage: String,
    pub transition_type: String, // 'manual' | 'automatic'
    pub confirmation_acknowledged: bool,
    pub bypass_reason: Option<String>,
    pub bypass_category: Option<String>,
    pub checklist_snapshot: Option<String>, // JSON, point-in-time copy
    pub performed_by: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for serde_json::Value {
    fn from(model: Model) -> Self {
        let snapshot: serde_json::Value = model
            .checklist_snapshot
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or(serde_json::Value::Null);
        serde_json::json!({
            "id": model.id,
            "entityType": model.entity_type,
            "entityId": model.entity_id,
            "fromStage": model.from_stage,
            "toStage": model.to_stage,
            "transitionType": model.transition_type,
            "confirmationAcknowledged": model.confirmation_acknowledged,
            "bypassReason": model.bypass_reason,
            "bypassCategory": model.bypass_category,
            "checklistSnapshot": snapshot,
            "performedBy": model.performed_by,
            "createdAt": model.created_at,
        })
    }
}
