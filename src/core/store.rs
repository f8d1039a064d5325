//! Storage seam of the compliance core.
//!
//! The validator and the FTE calculator only ever ask four questions of the
//! database. [`StaffingStore`] names them, so both rules can run against a
//! live connection, an open transaction, or an in-memory fake in tests. Every
//! `SeaORM` connection type gets the implementation for free.

use crate::{
    entities::{Staff, StaffContract, WorkRecord, staff, staff_contract, work_record},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::{FromQueryResult, QueryOrder, QuerySelect, prelude::*, sea_query::Expr};

/// Read access needed by the concurrent-duty rule and the FTE calculation.
#[allow(async_fn_in_trait)]
pub trait StaffingStore {
    /// Looks up a staff member by primary key.
    async fn find_staff(&self, staff_id: i64) -> Result<Option<staff::Model>>;

    /// Returns the contract effective on `as_of`: the one with the latest
    /// `contract_start_date` that is not after `as_of`.
    async fn find_effective_contract(
        &self,
        staff_id: i64,
        as_of: NaiveDate,
    ) -> Result<Option<staff_contract::Model>>;

    /// Whether a record of `primary_service` exists for the staff member on
    /// `work_date`, ignoring the record with id `excluding_id`.
    async fn exists_primary_record(
        &self,
        staff_id: i64,
        work_date: NaiveDate,
        primary_service: &str,
        excluding_id: Option<i64>,
    ) -> Result<bool>;

    /// Total worked minutes of the staff member between `start` and `end`
    /// inclusive, across all services.
    async fn sum_duration(&self, staff_id: i64, start: NaiveDate, end: NaiveDate) -> Result<i64>;
}

#[derive(Debug, FromQueryResult)]
struct DurationTotal {
    total: Option<i64>,
}

impl<C> StaffingStore for C
where
    C: ConnectionTrait,
{
    async fn find_staff(&self, staff_id: i64) -> Result<Option<staff::Model>> {
        Staff::find_by_id(staff_id)
            .one(self)
            .await
            .map_err(Into::into)
    }

    async fn find_effective_contract(
        &self,
        staff_id: i64,
        as_of: NaiveDate,
    ) -> Result<Option<staff_contract::Model>> {
        let contract = StaffContract::find()
            .filter(staff_contract::Column::StaffId.eq(staff_id))
            .filter(staff_contract::Column::ContractStartDate.lte(as_of))
            .order_by_desc(staff_contract::Column::ContractStartDate)
            .one(self)
            .await?;

        // SQLite hands decimals back through f64; restore the column's scale.
        Ok(contract.map(|mut c| {
            c.weekly_contracted_hours = c.weekly_contracted_hours.round_dp(2);
            c
        }))
    }

    async fn exists_primary_record(
        &self,
        staff_id: i64,
        work_date: NaiveDate,
        primary_service: &str,
        excluding_id: Option<i64>,
    ) -> Result<bool> {
        let mut query = WorkRecord::find()
            .filter(work_record::Column::StaffId.eq(staff_id))
            .filter(work_record::Column::WorkDate.eq(work_date))
            .filter(work_record::Column::ServiceType.eq(primary_service));

        if let Some(id) = excluding_id {
            query = query.filter(work_record::Column::Id.ne(id));
        }

        Ok(query.count(self).await? > 0)
    }

    async fn sum_duration(&self, staff_id: i64, start: NaiveDate, end: NaiveDate) -> Result<i64> {
        let total = WorkRecord::find()
            .select_only()
            .column_as(
                Expr::col(work_record::Column::DurationMinutes).sum(),
                "total",
            )
            .filter(work_record::Column::StaffId.eq(staff_id))
            .filter(work_record::Column::WorkDate.between(start, end))
            .into_model::<DurationTotal>()
            .one(self)
            .await?;

        Ok(total.and_then(|t| t.total).unwrap_or(0))
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory store used to exercise the rules without a database.

    use super::StaffingStore;
    use crate::{
        entities::{staff, staff_contract, work_record},
        errors::Result,
    };
    use chrono::NaiveDate;

    #[derive(Debug, Default)]
    pub(crate) struct MemoryStore {
        pub(crate) staff: Vec<staff::Model>,
        pub(crate) contracts: Vec<staff_contract::Model>,
        pub(crate) records: Vec<work_record::Model>,
    }

    impl StaffingStore for MemoryStore {
        async fn find_staff(&self, staff_id: i64) -> Result<Option<staff::Model>> {
            Ok(self.staff.iter().find(|s| s.id == staff_id).cloned())
        }

        async fn find_effective_contract(
            &self,
            staff_id: i64,
            as_of: NaiveDate,
        ) -> Result<Option<staff_contract::Model>> {
            Ok(self
                .contracts
                .iter()
                .filter(|c| c.staff_id == staff_id && c.contract_start_date <= as_of)
                .max_by_key(|c| c.contract_start_date)
                .cloned())
        }

        async fn exists_primary_record(
            &self,
            staff_id: i64,
            work_date: NaiveDate,
            primary_service: &str,
            excluding_id: Option<i64>,
        ) -> Result<bool> {
            Ok(self.records.iter().any(|r| {
                r.staff_id == staff_id
                    && r.work_date == work_date
                    && r.service_type == primary_service
                    && Some(r.id) != excluding_id
            }))
        }

        async fn sum_duration(
            &self,
            staff_id: i64,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<i64> {
            Ok(self
                .records
                .iter()
                .filter(|r| r.staff_id == staff_id && r.work_date >= start && r.work_date <= end)
                .map(|r| i64::from(r.duration_minutes))
                .sum())
        }
    }
}
