//! Service location entity - One physical office of the care provider.
//!
//! Staff are attached to exactly one location, and monthly staffing status
//! is rolled up per location.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Service location database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_locations")]
pub struct Model {
    /// Unique identifier for the location
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Office code used by administrators (e.g. "LOC001")
    #[sea_orm(unique)]
    pub location_code: String,
    /// Display name of the office
    pub location_name: String,
}

/// Defines relationships between `ServiceLocation` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One location employs many staff members
    #[sea_orm(has_many = "super::staff::Entity")]
    Staff,
    /// One location has one staffing status row per month
    #[sea_orm(has_many = "super::staffing_status::Entity")]
    StaffingStatus,
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl Related<super::staffing_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StaffingStatus.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
