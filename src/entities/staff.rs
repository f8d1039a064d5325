//! Staff entity - A care worker employed at a service location.
//!
//! `staff_code` is the identifier shown to users, including in compliance
//! error messages.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    /// Unique identifier for the staff member
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Staff code (e.g. "S001")
    #[sea_orm(unique)]
    pub staff_code: String,
    /// Full name
    pub full_name: String,
    /// Whether the staff member holds a specialist qualification
    pub is_specialist: bool,
    /// Location the staff member belongs to
    pub location_id: i64,
}

/// Defines relationships between Staff and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each staff member belongs to one location
    #[sea_orm(
        belongs_to = "super::service_location::Entity",
        from = "Column::LocationId",
        to = "super::service_location::Column::Id"
    )]
    ServiceLocation,
    /// One staff member has many contracts over time
    #[sea_orm(has_many = "super::staff_contract::Entity")]
    Contracts,
    /// One staff member has many work records
    #[sea_orm(has_many = "super::work_record::Entity")]
    WorkRecords,
}

impl Related<super::service_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceLocation.def()
    }
}

impl Related<super::staff_contract::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contracts.def()
    }
}

impl Related<super::work_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
