use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub site_id: String,
    pub unit_id: Option<i32>,
    pub applicant_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    // 'new', 'contacted', 'tour_scheduled', 'documents_pending',
    // 'under_review', 'approved', 'rejected', 'converted'
    pub status: String,
    pub screening_score: Option<i32>,
    pub screening_label: Option<String>,
    pub screening_flags: Option<String>, // JSON array
    pub notes: Option<String>,
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
        on_delete = "SetNull"
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
pub struct ApplicationDto {
    pub id: Option<i32>,
    pub site_id: Option<String>,
    pub unit_id: Option<i32>,
    pub applicant_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl From<Model> for serde_json::Value {
    fn from(model: Model) -> Self {
        let flags: serde_json::Value = model
            .screening_flags
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or(serde_json::Value::Null);
        serde_json::json!({
            "id": model.id,
            "siteId": model.site_id,
            "unitId": model.unit_id,
            "applicantName": model.applicant_name,
            "email": model.email,
            "phone": model.phone,
            "status": model.status,
            "screeningScore": model.screening_score,
            "screeningLabel": model.screening_label,
            "screeningFlags": flags,
            "notes": model.notes,
            "createdAt": model.created_at,
            "updatedAt": model.updated_at,
        })
    }
}
