//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`; the composite unique indexes that the
//! entity derive cannot express are added afterwards with `sea_query`.

use crate::entities::{
    ServiceLocation, Staff, StaffContract, StaffingStatus, WorkRecord, staff_contract,
    staffing_status, work_record,
};
use crate::errors::Result;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info, instrument};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/carestaff.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable or
/// returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// File path of a file-backed `SQLite` URL, or `None` for other URLs and
/// in-memory databases.
fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Some(Path::new(path))
}

/// Establishes a connection to the database named by [`get_database_url`],
/// creating the directory of a file-backed `SQLite` database first.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    if let Some(parent) = sqlite_file_path(&database_url)
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)?;
    }
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes if they do not exist yet.
///
/// Tables are created parent-first so the foreign keys generated from the
/// entity relations resolve.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let tables = [
        schema
            .create_table_from_entity(ServiceLocation)
            .if_not_exists()
            .to_owned(),
        schema.create_table_from_entity(Staff).if_not_exists().to_owned(),
        schema
            .create_table_from_entity(StaffContract)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(WorkRecord)
            .if_not_exists()
            .to_owned(),
        schema
            .create_table_from_entity(StaffingStatus)
            .if_not_exists()
            .to_owned(),
    ];
    for table in &tables {
        db.execute(builder.build(table)).await?;
    }

    for index in unique_indexes() {
        db.execute(builder.build(&index)).await?;
    }

    info!("Database tables and indexes ensured.");
    Ok(())
}

fn unique_indexes() -> [IndexCreateStatement; 3] {
    [
        // Serves the "latest contract on or before D" lookup as well.
        Index::create()
            .name("idx_unique_contract_staff_start")
            .table(StaffContract)
            .col(staff_contract::Column::StaffId)
            .col(staff_contract::Column::ContractStartDate)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_unique_work_record_staff_date_service")
            .table(WorkRecord)
            .col(work_record::Column::StaffId)
            .col(work_record::Column::WorkDate)
            .col(work_record::Column::ServiceType)
            .unique()
            .if_not_exists()
            .to_owned(),
        Index::create()
            .name("idx_unique_staffing_status_location_month")
            .table(StaffingStatus)
            .col(staffing_status::Column::LocationId)
            .col(staffing_status::Column::CalculationMonth)
            .unique()
            .if_not_exists()
            .to_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        service_location::Model as ServiceLocationModel, staff::Model as StaffModel,
        staff_contract::Model as StaffContractModel,
        staffing_status::Model as StaffingStatusModel, work_record::Model as WorkRecordModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path(DEFAULT_DATABASE_URL),
            Some(Path::new("data/carestaff.sqlite"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("sqlite://:memory:"), None);
        assert_eq!(sqlite_file_path("postgres://localhost/care"), None);
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ServiceLocationModel> = ServiceLocation::find().limit(1).all(&db).await?;
        let _: Vec<StaffModel> = Staff::find().limit(1).all(&db).await?;
        let _: Vec<StaffContractModel> = StaffContract::find().limit(1).all(&db).await?;
        let _: Vec<WorkRecordModel> = WorkRecord::find().limit(1).all(&db).await?;
        let _: Vec<StaffingStatusModel> = StaffingStatus::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
