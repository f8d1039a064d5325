//! Monthly staffing status of a location.
//!
//! Sums every staff member's FTE over a calendar month, keeps a separate
//! subtotal for specialists, and compares the total with the FTE level an
//! add-on payment requires. The required level is defined outside this crate
//! and passed in by the caller. Results are stored one row per location and
//! month; recomputing a month overwrites the row.

use crate::{
    core::{fte, roster},
    entities::{ServiceLocation, StaffingStatus, staffing_status},
    errors::{Error, Result},
};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::{info, instrument, warn};

/// FTE of one staff member within a monthly status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffFte {
    /// Staff code
    pub staff_code: String,
    /// Specialist flag
    pub is_specialist: bool,
    /// How the figure was reached
    pub outcome: fte::FteOutcome,
}

/// Result of computing a location's month.
#[derive(Debug, Clone)]
pub struct MonthlyStatusReport {
    /// Stored status row
    pub status: staffing_status::Model,
    /// Per-staff breakdown in staff code order
    pub staff: Vec<StaffFte>,
}

/// First and last day of the month containing `day`.
pub fn month_bounds(day: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || Error::InvalidMonth {
        month: day.format("%Y-%m").to_string(),
    };

    let first = day.with_day(1).ok_or_else(invalid)?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;
    Ok((first, last))
}

/// Parses a `YYYY-MM` month into its first day.
pub fn parse_month(month: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d").map_err(|_| {
        Error::InvalidMonth {
            month: month.to_string(),
        }
    })
}

/// Computes and stores the staffing status of a location for the month
/// containing `month`.
///
/// All reads and the final upsert happen inside one transaction, so the
/// figures stem from a single consistent view of the work records.
#[instrument(skip(db))]
pub async fn compute_monthly_status(
    db: &DatabaseConnection,
    location_id: i64,
    month: NaiveDate,
    required_fte: Decimal,
) -> Result<MonthlyStatusReport> {
    let (first, last) = month_bounds(month)?;
    let txn = db.begin().await?;

    ServiceLocation::find_by_id(location_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::LocationNotFound {
            location: location_id.to_string(),
        })?;

    let mut total_fte = Decimal::ZERO;
    let mut specialist_fte = Decimal::ZERO;
    let mut breakdown = Vec::new();

    for member in roster::list_staff_for_location(&txn, location_id).await? {
        let outcome = fte::assess_fte(&txn, member.id, first, last).await?;
        if outcome.is_absorbed() {
            warn!(
                staff_code = %member.staff_code,
                ?outcome,
                "Staff member counted as 0.00 FTE because of missing contract data"
            );
        }

        total_fte += outcome.ratio();
        if member.is_specialist {
            specialist_fte += outcome.ratio();
        }
        breakdown.push(StaffFte {
            staff_code: member.staff_code,
            is_specialist: member.is_specialist,
            outcome,
        });
    }

    let is_sufficient = total_fte >= required_fte;

    let existing = StaffingStatus::find()
        .filter(staffing_status::Column::LocationId.eq(location_id))
        .filter(staffing_status::Column::CalculationMonth.eq(first))
        .one(&txn)
        .await?;

    let mut status = if let Some(row) = existing {
        let mut active_model: staffing_status::ActiveModel = row.into();
        active_model.total_fte = Set(total_fte);
        active_model.specialist_fte = Set(specialist_fte);
        active_model.required_fte = Set(required_fte);
        active_model.is_sufficient = Set(is_sufficient);
        active_model.update(&txn).await?
    } else {
        staffing_status::ActiveModel {
            location_id: Set(location_id),
            calculation_month: Set(first),
            total_fte: Set(total_fte),
            specialist_fte: Set(specialist_fte),
            required_fte: Set(required_fte),
            is_sufficient: Set(is_sufficient),
            ..Default::default()
        }
        .insert(&txn)
        .await?
    };

    txn.commit().await?;
    normalize(&mut status);

    info!(
        location_id,
        month = %first.format("%Y-%m"),
        total_fte = %status.total_fte,
        specialist_fte = %status.specialist_fte,
        required_fte = %status.required_fte,
        is_sufficient,
        "Staffing status computed"
    );

    Ok(MonthlyStatusReport {
        status,
        staff: breakdown,
    })
}

/// Retrieves the stored status of a location for the month containing `month`.
pub async fn get_monthly_status(
    db: &DatabaseConnection,
    location_id: i64,
    month: NaiveDate,
) -> Result<Option<staffing_status::Model>> {
    let (first, _) = month_bounds(month)?;
    let status = StaffingStatus::find()
        .filter(staffing_status::Column::LocationId.eq(location_id))
        .filter(staffing_status::Column::CalculationMonth.eq(first))
        .one(db)
        .await?;

    Ok(status.map(|mut s| {
        normalize(&mut s);
        s
    }))
}

// SQLite hands decimals back through f64; restore the column's scale.
fn normalize(status: &mut staffing_status::Model) {
    status.total_fte = status.total_fte.round_dp(2);
    status.specialist_fte = status.specialist_fte.round_dp(2);
    status.required_fte = status.required_fte.round_dp(2);
}

/// Formats a monthly report into a human-readable summary string.
#[must_use]
pub fn format_status_summary(report: &MonthlyStatusReport) -> String {
    use std::fmt::Write;

    let status = &report.status;
    let verdict = if status.is_sufficient {
        "sufficient"
    } else {
        "insufficient"
    };

    let mut summary = format!(
        "Staffing status - {} - total FTE {:.2} (specialists {:.2}) / required {:.2}: {}\n",
        status.calculation_month.format("%Y-%m"),
        status.total_fte,
        status.specialist_fte,
        status.required_fte,
        verdict
    );

    for member in &report.staff {
        let note = match member.outcome {
            fte::FteOutcome::NoContract => " (no contract)",
            fte::FteOutcome::ZeroBenchmark => " (zero-hour contract)",
            _ => "",
        };
        let specialist = if member.is_specialist { " *" } else { "" };
        // write! into a String cannot fail
        let _ = writeln!(
            summary,
            "  {}{} - {:.2}{}",
            member.staff_code,
            specialist,
            member.outcome.ratio(),
            note
        );
    }

    summary
}
