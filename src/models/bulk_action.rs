use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Created before a bulk run with the requested count, finalized exactly
/// once with the success/failure tally after the loop.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bulk_actions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String, // uuid
    pub performed_by: String,
    pub action_type: String,
    pub application_count: i32,
    pub success_count: i32,
    pub failure_count: i32,
    pub params: Option<String>, // opaque JSON
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for serde_json::Value {
    fn from(model: Model) -> Self {
        let params: serde_json::Value = model
            .params
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or(serde_json::Value::Null);
        serde_json::json!({
            "id": model.id,
            "performedBy": model.performed_by,
            "actionType": model.action_type,
            "applicationCount": model.application_count,
            "successCount": model.success_count,
            "failureCount": model.failure_count,
            "params": params,
            "createdAt": model.created_at,
        })
    }
}
