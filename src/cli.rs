//! Command-line interface.
//!
//! A thin layer over [`crate::core`]: every subcommand resolves codes to ids,
//! calls one core operation and prints the result.

use crate::{
    config::settings::Config,
    core::{
        compliance::ConcurrentDutyRule,
        fte::{self, FteOutcome},
        roster, staffing_status,
        work_record::{NewWorkRecord, WorkRecordService},
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Staffing compliance for home-care providers
#[derive(Debug, Parser)]
#[command(name = "carestaff")]
#[command(version)]
#[command(about = "Records care work, enforces the concurrent-duty rule and reports FTE", long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Seeds locations, staff and contracts from config.toml
    Seed,

    /// Records a day of work for a staff member
    Record {
        /// Staff code
        #[arg(short, long)]
        staff: String,

        /// Day worked (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,

        /// Service type
        #[arg(long)]
        service: String,

        /// Minutes worked
        #[arg(short, long)]
        minutes: i32,
    },

    /// Computes the FTE of a staff member over a date range
    Fte {
        /// Staff code
        #[arg(short, long)]
        staff: String,

        /// First day of the range (YYYY-MM-DD)
        #[arg(long)]
        from: NaiveDate,

        /// Last day of the range (YYYY-MM-DD)
        #[arg(long)]
        to: NaiveDate,
    },

    /// Computes and stores the monthly staffing status of a location
    Status {
        /// Location code
        #[arg(short, long)]
        location: String,

        /// Month (YYYY-MM)
        #[arg(short, long)]
        month: String,

        /// FTE the location must reach
        #[arg(short, long)]
        required: Decimal,
    },
}

/// Runs a parsed command and returns the text to print.
pub async fn run(command: Commands, db: &DatabaseConnection, config: &Config) -> Result<String> {
    match command {
        Commands::Seed => {
            let summary = roster::seed_roster(db, config).await?;
            Ok(format!(
                "Seeded {} location(s), {} staff member(s), {} contract(s)",
                summary.locations_created, summary.staff_created, summary.contracts_created
            ))
        }
        Commands::Record {
            staff,
            date,
            service,
            minutes,
        } => {
            let member = find_staff(db, &staff).await?;
            let service_layer = WorkRecordService::new(
                ConcurrentDutyRule::new(config.compliance.primary_service_type.clone()),
                config.compliance.max_write_attempts,
            );
            let record = service_layer
                .create_work_record(
                    db,
                    NewWorkRecord {
                        staff_id: member.id,
                        work_date: date,
                        service_type: service,
                        duration_minutes: minutes,
                    },
                )
                .await?;
            Ok(format!(
                "Recorded #{}: {} {} {} ({} min)",
                record.id,
                member.staff_code,
                record.work_date,
                record.service_type,
                record.duration_minutes
            ))
        }
        Commands::Fte { staff, from, to } => {
            let member = find_staff(db, &staff).await?;
            let outcome = fte::compute_fte_snapshot(db, member.id, from, to).await?;
            Ok(format_fte_line(&member.staff_code, from, to, outcome))
        }
        Commands::Status {
            location,
            month,
            required,
        } => {
            let loc = roster::get_location_by_code(db, &location)
                .await?
                .ok_or_else(|| Error::LocationNotFound {
                    location: location.clone(),
                })?;
            let month = staffing_status::parse_month(&month)?;
            let report =
                staffing_status::compute_monthly_status(db, loc.id, month, required).await?;
            Ok(staffing_status::format_status_summary(&report))
        }
    }
}

async fn find_staff(
    db: &DatabaseConnection,
    staff_code: &str,
) -> Result<crate::entities::staff::Model> {
    roster::get_staff_by_code(db, staff_code)
        .await?
        .ok_or_else(|| Error::StaffNotFound {
            staff: staff_code.to_string(),
        })
}

fn format_fte_line(staff_code: &str, from: NaiveDate, to: NaiveDate, outcome: FteOutcome) -> String {
    let note = match outcome {
        FteOutcome::Computed(_) => "",
        FteOutcome::EmptyRange => " (empty range)",
        FteOutcome::NoWorkRecorded => " (no work recorded)",
        FteOutcome::NoContract => " (no contract at period start)",
        FteOutcome::ZeroBenchmark => " (zero-hour contract)",
    };
    format!("{staff_code} {from}..{to}: FTE {:.2}{note}", outcome.ratio())
}
