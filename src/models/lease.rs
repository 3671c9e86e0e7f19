use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "leases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub site_id: String,
    pub unit_id: i32,
    pub tenant_id: i32,
    pub start_date: String,
    pub end_date: String,
    pub rent_amount: f64,
    pub deposit_amount: f64,
    // 'draft', 'pending_signature', 'signed', 'active', 'expiring_soon',
    // 'expired', 'terminated'
    pub status: String,
    pub onboarding_pending: bool,
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
        on_delete = "Cascade"
    )]
    Unit,
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Tenant,
}

impl Related<super::unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Unit.def()
    }
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseDto {
    pub id: Option<i32>,
    pub site_id: Option<String>,
    pub unit_id: i32,
    pub tenant_id: i32,
    pub start_date: String,
    pub end_date: String,
    pub rent_amount: f64,
    pub deposit_amount: f64,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl From<Model> for serde_json::Value {
    fn from(model: Model) -> Self {
        serde_json::json!({
            "id": model.id,
            "siteId": model.site_id,
            "unitId": model.unit_id,
            "tenantId": model.tenant_id,
            "startDate": model.start_date,
            "endDate": model.end_date,
            "rentAmount": model.rent_amount,
            "depositAmount": model.deposit_amount,
            "status": model.status,
            "onboardingPending": model.onboarding_pending,
            "notes": model.notes,
            "createdAt": model.created_at,
            "updatedAt": model.updated_at,
        })
    }
}
