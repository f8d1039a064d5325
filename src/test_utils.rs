//! Shared test utilities for `carestaff`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating roster entities with sensible defaults.

use crate::{
    core::{
        compliance::ConcurrentDutyRule,
        contract::{self, NewContract},
        roster::{self, NewStaff},
        work_record::WorkRecordService,
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test staff member with sensible defaults.
///
/// # Defaults
/// * `full_name`: `"Test <code>"`
/// * `is_specialist`: false
pub async fn create_test_staff(
    db: &DatabaseConnection,
    staff_code: &str,
    location_id: i64,
) -> Result<entities::staff::Model> {
    roster::create_staff(
        db,
        NewStaff {
            staff_code: staff_code.to_string(),
            full_name: format!("Test {staff_code}"),
            is_specialist: false,
            location_id,
        },
    )
    .await
}

/// Marks an existing staff member as a specialist.
pub async fn set_specialist(
    db: &DatabaseConnection,
    staff: &entities::staff::Model,
) -> Result<entities::staff::Model> {
    let mut active_model: entities::staff::ActiveModel = staff.clone().into();
    active_model.is_specialist = Set(true);
    Ok(active_model.update(db).await?)
}

/// Creates a contract through the regular contract path.
pub async fn create_test_contract(
    db: &DatabaseConnection,
    staff_id: i64,
    start: NaiveDate,
    weekly_hours: Decimal,
    is_full_time: bool,
) -> Result<entities::staff_contract::Model> {
    contract::create_contract(
        db,
        NewContract {
            staff_id,
            contract_start_date: start,
            weekly_contracted_hours: weekly_hours,
            is_full_time,
        },
    )
    .await
}

/// Inserts a work record directly, bypassing the concurrent-duty rule.
/// Use this to arrange data the rule would otherwise reject.
pub async fn insert_raw_work_record(
    db: &DatabaseConnection,
    staff_id: i64,
    work_date: NaiveDate,
    service_type: &str,
    duration_minutes: i32,
) -> Result<entities::work_record::Model> {
    let record = entities::work_record::ActiveModel {
        staff_id: Set(staff_id),
        work_date: Set(work_date),
        service_type: Set(service_type.to_string()),
        duration_minutes: Set(duration_minutes),
        ..Default::default()
    };
    Ok(record.insert(db).await?)
}

/// Work record service with `"Hodei"` as primary service and three attempts.
pub fn test_service() -> WorkRecordService {
    WorkRecordService::new(ConcurrentDutyRule::new("Hodei"), 3)
}

/// Sets up a complete test environment with one location and one staff member.
/// Returns (db, staff) for common test scenarios.
pub async fn setup_with_staff(
    staff_code: &str,
) -> Result<(DatabaseConnection, entities::staff::Model)> {
    let db = setup_test_db().await?;
    let location =
        roster::create_location(&db, "LOC001".to_string(), "Test Location".to_string()).await?;
    let staff = create_test_staff(&db, staff_code, location.id).await?;
    Ok((db, staff))
}

/// Routes `tracing` output through the test harness so it shows up for
/// failing tests only. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// A `SQLite` database file in the system temp directory, removed on drop.
/// Unlike `sqlite::memory:`, several connections can share it, so writers
/// genuinely contend for the database lock.
pub struct FileDb {
    path: std::path::PathBuf,
}

impl FileDb {
    /// Creates the file with all tables initialized.
    pub async fn create(name: &str) -> Result<Self> {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = std::env::temp_dir().join(format!(
            "carestaff-{name}-{}-{nanos}.sqlite",
            std::process::id()
        ));
        let file_db = Self { path };

        let db = file_db.connect().await?;
        crate::config::database::create_tables(&db).await?;
        db.close().await?;
        Ok(file_db)
    }

    /// Opens a new, independent connection pool on the file.
    pub async fn connect(&self) -> Result<DatabaseConnection> {
        let url = format!("sqlite://{}?mode=rwc", self.path.display());
        Ok(sea_orm::Database::connect(&url).await?)
    }
}

impl Drop for FileDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm", "-journal"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}
