//! Unified error type for the staffing compliance core.
//!
//! Compliance violations are policy conflicts and are reported to the caller
//! verbatim; storage failures are wrapped from `SeaORM`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors produced by roster management, work-record writes and FTE reporting.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A full-time staff member tried to book a secondary service without a
    /// primary-service record on the same day
    #[error(
        "staff {staff_code} is under a full-time contract and has no primary-service \
         ({primary_service}) record on {work_date}; cannot register {service_type}"
    )]
    ComplianceViolation {
        /// Staff code of the offending staff member
        staff_code: String,
        /// Day the record was meant for
        work_date: NaiveDate,
        /// Service that was rejected
        service_type: String,
        /// Service that has to be recorded first
        primary_service: String,
    },

    /// No staff member matches the given id or code
    #[error("Staff not found: {staff}")]
    StaffNotFound {
        /// Id or code that was looked up
        staff: String,
    },

    /// No location matches the given id or code
    #[error("Service location not found: {location}")]
    LocationNotFound {
        /// Id or code that was looked up
        location: String,
    },

    /// No work record has the given id
    #[error("Work record not found: {id}")]
    WorkRecordNotFound {
        /// Work record id
        id: i64,
    },

    /// A record for the same staff, day and service already exists
    #[error("A {service_type} record for staff {staff_code} on {work_date} already exists")]
    DuplicateWorkRecord {
        /// Staff code
        staff_code: String,
        /// Day of the record
        work_date: NaiveDate,
        /// Service of the record
        service_type: String,
    },

    /// A contract starting on the same day already exists for the staff member
    #[error("Staff {staff_code} already has a contract starting on {start_date}")]
    DuplicateContract {
        /// Staff code
        staff_code: String,
        /// Start date that collided
        start_date: NaiveDate,
    },

    /// Duration must be zero or more minutes
    #[error("Invalid duration: {minutes} minutes")]
    InvalidDuration {
        /// Rejected value
        minutes: i32,
    },

    /// Weekly hours must lie within a week
    #[error("Invalid weekly contracted hours: {hours} (must be between 0 and 168)")]
    InvalidContractHours {
        /// Rejected value
        hours: Decimal,
    },

    /// End date lies before start date
    #[error("Invalid date range: {start} to {end}")]
    InvalidDateRange {
        /// Range start
        start: NaiveDate,
        /// Range end
        end: NaiveDate,
    },

    /// Month could not be parsed or has no representable bounds
    #[error("Invalid month: {month}")]
    InvalidMonth {
        /// Rejected input
        month: String,
    },
}

impl Error {
    /// Whether the failure came from lock contention or a serialization
    /// conflict, meaning the same write may succeed when attempted again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Database(err) => {
                let message = err.to_string();
                [
                    "database is locked",
                    "database table is locked",
                    "could not serialize access",
                    "deadlock detected",
                ]
                .iter()
                .any(|needle| message.contains(needle))
            }
            _ => false,
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
