//! Full-time-equivalent (FTE) calculation.
//!
//! FTE here is the share of a staff member's **own** contracted time that
//! they actually worked over a period:
//!
//! ```text
//! fte = worked minutes / (weekly contracted hours × days / 7 × 60)
//! ```
//!
//! The denominator is the individual contract, not an organisation-wide
//! full-time standard, so a 20 h/week employee who works 20 h/week scores
//! `1.00`. Add-on payment eligibility downstream depends on this definition;
//! changing it to a headcount FTE changes those outcomes.
//!
//! The benchmark contract is the one effective on the first day of the
//! period. Every "cannot compute" situation yields `0.00`; [`assess_fte`]
//! reports which one occurred and each is logged at `warn`.

use crate::{
    core::store::StaffingStore,
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{debug, instrument, warn};

const DAYS_PER_WEEK: Decimal = dec!(7);
const MINUTES_PER_HOUR: Decimal = dec!(60);

/// Ratios are reported to two places, halves rounded up (0.505 -> 0.51).
const RATIO_ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// How an FTE figure came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FteOutcome {
    /// Ratio computed from worked minutes and a non-zero benchmark
    Computed(Decimal),
    /// The period ends before it starts
    EmptyRange,
    /// No worked minutes in the period
    NoWorkRecorded,
    /// No contract effective on the first day of the period
    NoContract,
    /// The effective contract has zero weekly hours
    ZeroBenchmark,
}

impl FteOutcome {
    /// The ratio reported to callers; `0.00` for every absorbed case.
    #[must_use]
    pub fn ratio(&self) -> Decimal {
        match self {
            Self::Computed(ratio) => *ratio,
            Self::EmptyRange | Self::NoWorkRecorded | Self::NoContract | Self::ZeroBenchmark => {
                dec!(0.00)
            }
        }
    }

    /// Whether a zero ratio stands in for missing data rather than idle time.
    #[must_use]
    pub const fn is_absorbed(&self) -> bool {
        matches!(self, Self::NoContract | Self::ZeroBenchmark)
    }
}

/// Contracted minutes for a period of `days` days at `weekly_hours` per week.
#[must_use]
pub fn benchmark_minutes(weekly_hours: Decimal, days: i64) -> Decimal {
    let weeks = Decimal::from(days) / DAYS_PER_WEEK;
    weekly_hours * weeks * MINUTES_PER_HOUR
}

/// Computes the FTE of a staff member over `[start, end]` and reports how
/// the figure was reached.
#[instrument(skip(store))]
pub async fn assess_fte<S>(
    store: &S,
    staff_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<FteOutcome>
where
    S: StaffingStore,
{
    if end < start {
        warn!("FTE requested for an inverted date range; reporting 0.00");
        return Ok(FteOutcome::EmptyRange);
    }

    let actual_minutes = store.sum_duration(staff_id, start, end).await?;
    if actual_minutes == 0 {
        debug!("No worked minutes in range");
        return Ok(FteOutcome::NoWorkRecorded);
    }

    let Some(contract) = store.find_effective_contract(staff_id, start).await? else {
        warn!(
            actual_minutes,
            "No contract effective at period start; FTE absorbed as 0.00"
        );
        return Ok(FteOutcome::NoContract);
    };

    let days = (end - start).num_days() + 1;
    let benchmark = benchmark_minutes(contract.weekly_contracted_hours, days);
    if benchmark.is_zero() {
        warn!(
            contract_id = contract.id,
            "Effective contract has zero weekly hours; FTE absorbed as 0.00"
        );
        return Ok(FteOutcome::ZeroBenchmark);
    }

    let ratio = (Decimal::from(actual_minutes) / benchmark)
        .round_dp_with_strategy(2, RATIO_ROUNDING);
    debug!(actual_minutes, %benchmark, %ratio, "FTE computed");
    Ok(FteOutcome::Computed(ratio))
}

/// Computes the FTE ratio of a staff member over `[start, end]`, rounded to
/// two decimal places. Missing data yields `0.00`.
pub async fn compute_fte<S>(
    store: &S,
    staff_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Decimal>
where
    S: StaffingStore,
{
    Ok(assess_fte(store, staff_id, start, end).await?.ratio())
}

/// Like [`assess_fte`], but both reads run inside one transaction so a
/// concurrent write cannot land between the minute total and the contract
/// lookup.
pub async fn compute_fte_snapshot(
    db: &DatabaseConnection,
    staff_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<FteOutcome> {
    let txn = db.begin().await?;
    let outcome = assess_fte(&txn, staff_id, start, end).await?;
    txn.commit().await?;
    Ok(outcome)
}
