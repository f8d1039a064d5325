//! Core business logic - framework-agnostic and free of any CLI concerns.

/// Concurrent-duty rule applied to every work record write
pub mod compliance;

/// Staff contracts and effective-contract lookup
pub mod contract;

/// FTE calculation against the effective contract
pub mod fte;

/// Service locations, staff and roster seeding
pub mod roster;

/// Monthly location staffing status
pub mod staffing_status;

/// Storage seam shared by the rule and the FTE calculation
pub mod store;

/// Work record persistence
pub mod work_record;
