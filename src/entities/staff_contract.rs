//! Staff contract entity - Contracted weekly hours effective from a start date.
//!
//! A staff member accumulates contracts over time; the contract effective on a
//! given day is the one with the latest `contract_start_date` on or before it.
//! Historical rows are kept so FTE can be computed retroactively.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Staff contract database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff_contracts")]
pub struct Model {
    /// Unique identifier for the contract
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Staff member this contract belongs to
    pub staff_id: i64,
    /// First day the contract is effective
    pub contract_start_date: Date,
    /// Contracted hours per week, two decimal places (e.g. 37.50)
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub weekly_contracted_hours: Decimal,
    /// Full-time contract flag; full-time staff are bound by the concurrent-duty rule
    pub is_full_time: bool,
}

/// Defines relationships between `StaffContract` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each contract belongs to one staff member
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
