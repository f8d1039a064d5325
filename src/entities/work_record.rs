//! Work record entity - Minutes a staff member worked for one service on one day.
//!
//! At most one row exists per (`staff_id`, `work_date`, `service_type`).
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Work record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_records")]
pub struct Model {
    /// Unique identifier for the work record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Staff member who did the work
    pub staff_id: i64,
    /// Day the work was performed
    pub work_date: Date,
    /// Service the time is booked against (e.g. `"Hodei"`, `"Miniha"`)
    pub service_type: String,
    /// Worked minutes, never negative
    pub duration_minutes: i32,
}

/// Defines relationships between `WorkRecord` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each work record belongs to one staff member
    #[sea_orm(
        belongs_to = "super::staff::Entity",
        from = "Column::StaffId",
        to = "super::staff::Column::Id"
    )]
    Staff,
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
