//! Staffing status entity - Monthly FTE totals of a location against a required level.
//!
//! One row per (`location_id`, `calculation_month`); recomputing a month
//! overwrites the previous figures.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staffing status database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staffing_statuses")]
pub struct Model {
    /// Unique identifier for the status row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Location the figures belong to
    pub location_id: i64,
    /// First day of the calculated month
    pub calculation_month: Date,
    /// Sum of every staff member's FTE for the month
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub total_fte: Decimal,
    /// Sum of the FTE of specialist staff only
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub specialist_fte: Decimal,
    /// FTE level required for the add-on payment, supplied by the caller
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub required_fte: Decimal,
    /// Whether `total_fte` reaches `required_fte`
    pub is_sufficient: bool,
}

/// Defines relationships between `StaffingStatus` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each status row belongs to one location
    #[sea_orm(
        belongs_to = "super::service_location::Entity",
        from = "Column::LocationId",
        to = "super::service_location::Column::Id"
    )]
    ServiceLocation,
}

impl Related<super::service_location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceLocation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
