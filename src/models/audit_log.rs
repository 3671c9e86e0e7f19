use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit trail. Individual entries made inside a bulk run
/// carry the bulk action id so the batch can be reviewed as one unit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub entity_type: String,
    pub entity_id: i32,
    pub action: String,
    pub performed_by: String,
    pub bulk_action_id: Option<String>,
    pub changes: Option<String>, // opaque JSON diff
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for serde_json::Value {
    fn from(model: Model) -> Self {
        let changes: serde_json::Value = model
            .changes
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or(serde_json::Value::Null);
        serde_json::json!({
            "id": model.id,
            "entityType": model.entity_type,
            "entityId": model.entity_id,
            "action": model.action,
            "performedBy": model.performed_by,
            "bulkActionId": model.bulk_action_id,
            "changes": changes,
            "createdAt": model.created_at,
        })
    }
}
