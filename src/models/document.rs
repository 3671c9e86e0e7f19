use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String, // uuid
    pub site_id: String,
    pub entity_type: String, // 'lease', 'application', 'unit', 'tenant'
    pub entity_id: i32,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
    pub blob_key: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for serde_json::Value {
    fn from(model: Model) -> Self {
        serde_json::json!({
            "id": model.id,
            "siteId": model.site_id,
            "entityType": model.entity_type,
            "entityId": model.entity_id,
            "filename": model.filename,
            "contentType": model.content_type,
            "size": model.size,
            "createdAt": model.created_at,
        })
    }
}
