use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "units")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub property_id: i32,
    pub unit_number: String,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_feet: Option<i32>,
    pub rent_amount: f64,
    pub status: String, // 'vacant', 'occupied', 'maintenance'
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Property,
    #[sea_orm(has_many = "super::lease::Entity")]
    Lease,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::lease::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lease.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDto {
    pub id: Option<i32>,
    pub property_id: i32,
    pub unit_number: String,
    pub bedrooms: i32,
    pub bathrooms: f64,
    pub square_feet: Option<i32>,
    pub rent_amount: f64,
    pub status: Option<String>,
}

impl From<Model> for UnitDto {
    fn from(model: Model) -> Self {
        Self {
            id: Some(model.id),
            property_id: model.property_id,
            unit_number: model.unit_number,
            bedrooms: model.bedrooms,
            bathrooms: model.bathrooms,
            square_feet: model.square_feet,
            rent_amount: model.rent_amount,
            status: Some(model.status),
        }
    }
}
