//! Contract business logic - Weekly contracted hours over time.
//!
//! Contracts are append-only: a change of hours or of full-time status is a
//! new contract with a later start date. At most one contract may start on a
//! given day for the same staff member.

use crate::{
    core::store::StaffingStore,
    entities::{Staff, StaffContract, staff_contract},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{QueryOrder, Set, SqlErr, prelude::*};
use tracing::{info, instrument};

const HOURS_PER_WEEK: Decimal = dec!(168);

/// Input for a new contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContract {
    /// Staff member the contract belongs to
    pub staff_id: i64,
    /// First effective day
    pub contract_start_date: NaiveDate,
    /// Contracted hours per week; rounded to two decimal places
    pub weekly_contracted_hours: Decimal,
    /// Full-time flag
    pub is_full_time: bool,
}

/// Creates a contract for an existing staff member.
///
/// # Errors
/// * [`Error::InvalidContractHours`] when hours are negative or exceed a week
/// * [`Error::StaffNotFound`] for an unknown staff member
/// * [`Error::DuplicateContract`] when a contract already starts on that day
#[instrument(skip(db))]
pub async fn create_contract(
    db: &DatabaseConnection,
    new_contract: NewContract,
) -> Result<staff_contract::Model> {
    let hours = new_contract.weekly_contracted_hours.round_dp(2);
    if hours < Decimal::ZERO || hours > HOURS_PER_WEEK {
        return Err(Error::InvalidContractHours {
            hours: new_contract.weekly_contracted_hours,
        });
    }

    let staff = Staff::find_by_id(new_contract.staff_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::StaffNotFound {
            staff: new_contract.staff_id.to_string(),
        })?;

    let contract = staff_contract::ActiveModel {
        staff_id: Set(new_contract.staff_id),
        contract_start_date: Set(new_contract.contract_start_date),
        weekly_contracted_hours: Set(hours),
        is_full_time: Set(new_contract.is_full_time),
        ..Default::default()
    };

    let mut result = contract.insert(db).await.map_err(|e| {
        if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            Error::DuplicateContract {
                staff_code: staff.staff_code.clone(),
                start_date: new_contract.contract_start_date,
            }
        } else {
            e.into()
        }
    })?;
    result.weekly_contracted_hours = result.weekly_contracted_hours.round_dp(2);

    info!(
        staff_code = %staff.staff_code,
        start_date = %result.contract_start_date,
        weekly_hours = %result.weekly_contracted_hours,
        is_full_time = result.is_full_time,
        "Created staff contract"
    );
    Ok(result)
}

/// Lists every contract of a staff member, latest start first.
pub async fn list_contracts_for_staff(
    db: &DatabaseConnection,
    staff_id: i64,
) -> Result<Vec<staff_contract::Model>> {
    let contracts = StaffContract::find()
        .filter(staff_contract::Column::StaffId.eq(staff_id))
        .order_by_desc(staff_contract::Column::ContractStartDate)
        .all(db)
        .await?;

    Ok(contracts
        .into_iter()
        .map(|mut c| {
            c.weekly_contracted_hours = c.weekly_contracted_hours.round_dp(2);
            c
        })
        .collect())
}

/// Returns the contract effective on `as_of`, if any.
pub async fn find_effective_contract(
    db: &DatabaseConnection,
    staff_id: i64,
    as_of: NaiveDate,
) -> Result<Option<staff_contract::Model>> {
    db.find_effective_contract(staff_id, as_of).await
}
