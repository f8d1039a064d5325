//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod service_location;
pub mod staff;
pub mod staff_contract;
pub mod staffing_status;
pub mod work_record;

// Re-export specific types to avoid conflicts
pub use service_location::{
    Column as ServiceLocationColumn, Entity as ServiceLocation, Model as ServiceLocationModel,
};
pub use staff::{Column as StaffColumn, Entity as Staff, Model as StaffModel};
pub use staff_contract::{
    Column as StaffContractColumn, Entity as StaffContract, Model as StaffContractModel,
};
pub use staffing_status::{
    Column as StaffingStatusColumn, Entity as StaffingStatus, Model as StaffingStatusModel,
};
pub use work_record::{Column as WorkRecordColumn, Entity as WorkRecord, Model as WorkRecordModel};
