//! Concurrent-duty rule ("kenmu senju" check).
//!
//! A staff member on a full-time contract may only book time against a
//! secondary service on a day for which their primary-service time is already
//! recorded. Part-time staff, staff without any contract, and primary-service
//! records are never constrained.
//!
//! The check reads state and decides; it never writes. Callers must run it in
//! the same transaction as the write it guards (see
//! [`crate::core::work_record`]).

use crate::{
    core::store::StaffingStore,
    errors::{Error, Result},
};
use chrono::NaiveDate;
use tracing::{debug, info};

/// A work record about to be created or updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRecordDraft {
    /// Staff member the time belongs to
    pub staff_id: i64,
    /// Day of the work
    pub work_date: NaiveDate,
    /// Service the time is booked against
    pub service_type: String,
    /// Worked minutes
    pub duration_minutes: i32,
    /// Id of the record being replaced on update; excluded from lookups
    pub existing_id: Option<i64>,
}

/// The concurrent-duty rule, parameterised by the service that counts as primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcurrentDutyRule {
    primary_service: String,
}

impl ConcurrentDutyRule {
    /// Creates the rule with `primary_service` as the designated primary duty.
    pub fn new(primary_service: impl Into<String>) -> Self {
        Self {
            primary_service: primary_service.into(),
        }
    }

    /// The service type treated as the primary duty.
    #[must_use]
    pub fn primary_service(&self) -> &str {
        &self.primary_service
    }

    /// Whether `service_type` is the primary duty.
    #[must_use]
    pub fn is_primary(&self, service_type: &str) -> bool {
        service_type == self.primary_service
    }

    /// Checks a draft against the rule.
    ///
    /// # Errors
    /// Returns [`Error::ComplianceViolation`] when a full-time staff member
    /// books a secondary service on a day without a primary-service record,
    /// or a storage error if the lookups fail.
    pub async fn validate<S>(&self, store: &S, draft: &WorkRecordDraft) -> Result<()>
    where
        S: StaffingStore,
    {
        let Some(contract) = store
            .find_effective_contract(draft.staff_id, draft.work_date)
            .await?
        else {
            debug!(
                staff_id = draft.staff_id,
                work_date = %draft.work_date,
                "No contract in effect; concurrent-duty rule not applied"
            );
            return Ok(());
        };

        if !contract.is_full_time {
            return Ok(());
        }

        if self.is_primary(&draft.service_type) {
            return Ok(());
        }

        let primary_recorded = store
            .exists_primary_record(
                draft.staff_id,
                draft.work_date,
                &self.primary_service,
                draft.existing_id,
            )
            .await?;
        if primary_recorded {
            return Ok(());
        }

        let staff_code = store
            .find_staff(draft.staff_id)
            .await?
            .map_or_else(|| draft.staff_id.to_string(), |s| s.staff_code);

        info!(
            staff_code = %staff_code,
            work_date = %draft.work_date,
            service_type = %draft.service_type,
            "Rejected work record: no primary-service record on the same day"
        );

        Err(Error::ComplianceViolation {
            staff_code,
            work_date: draft.work_date,
            service_type: draft.service_type.clone(),
            primary_service: self.primary_service.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::store::memory::MemoryStore;
    use crate::entities::{staff, staff_contract, work_record};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const STAFF_ID: i64 = 1;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rule() -> ConcurrentDutyRule {
        ConcurrentDutyRule::new("Hodei")
    }

    fn store_with_contract(hours: Decimal, is_full_time: bool) -> MemoryStore {
        MemoryStore {
            staff: vec![staff::Model {
                id: STAFF_ID,
                staff_code: "STF001".to_string(),
                full_name: "Taro Jokin".to_string(),
                is_specialist: true,
                location_id: 1,
            }],
            contracts: vec![staff_contract::Model {
                id: 1,
                staff_id: STAFF_ID,
                contract_start_date: date(2025, 1, 1),
                weekly_contracted_hours: hours,
                is_full_time,
            }],
            records: Vec::new(),
        }
    }

    fn record(id: i64, day: NaiveDate, service: &str) -> work_record::Model {
        work_record::Model {
            id,
            staff_id: STAFF_ID,
            work_date: day,
            service_type: service.to_string(),
            duration_minutes: 60,
        }
    }

    fn draft(day: NaiveDate, service: &str) -> WorkRecordDraft {
        WorkRecordDraft {
            staff_id: STAFF_ID,
            work_date: day,
            service_type: service.to_string(),
            duration_minutes: 60,
            existing_id: None,
        }
    }

    #[tokio::test]
    async fn test_full_time_secondary_with_primary_passes() {
        let mut store = store_with_contract(dec!(40), true);
        store.records.push(record(1, date(2025, 12, 10), "Hodei"));

        let result = rule()
            .validate(&store, &draft(date(2025, 12, 10), "Miniha"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_full_time_secondary_without_primary_fails() {
        let mut store = store_with_contract(dec!(40), true);
        // Primary on a different day does not count
        store.records.push(record(1, date(2025, 12, 10), "Hodei"));

        let result = rule()
            .validate(&store, &draft(date(2025, 12, 11), "Miniha"))
            .await;
        match result {
            Err(Error::ComplianceViolation {
                staff_code,
                work_date,
                service_type,
                primary_service,
            }) => {
                assert_eq!(staff_code, "STF001");
                assert_eq!(work_date, date(2025, 12, 11));
                assert_eq!(service_type, "Miniha");
                assert_eq!(primary_service, "Hodei");
            }
            other => panic!("expected compliance violation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_part_time_is_never_constrained() {
        let store = store_with_contract(dec!(20), false);

        for service in ["Miniha", "Hodei", "Other"] {
            let result = rule()
                .validate(&store, &draft(date(2025, 12, 11), service))
                .await;
            assert!(result.is_ok(), "{service} should pass for part-time staff");
        }
    }

    #[tokio::test]
    async fn test_primary_never_needs_precondition() {
        let store = store_with_contract(dec!(40), true);

        let result = rule()
            .validate(&store, &draft(date(2025, 12, 11), "Hodei"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_missing_contract_passes() {
        let mut store = store_with_contract(dec!(40), true);
        store.contracts.clear();

        let result = rule()
            .validate(&store, &draft(date(2025, 12, 11), "Miniha"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_contract_starting_after_work_date_is_ignored() {
        let store = store_with_contract(dec!(40), true);

        // Full-time contract only begins 2025-01-01
        let result = rule()
            .validate(&store, &draft(date(2024, 12, 31), "Miniha"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_update_does_not_count_itself_as_primary() {
        let mut store = store_with_contract(dec!(40), true);
        store.records.push(record(7, date(2025, 12, 10), "Hodei"));

        // Turning the only primary record into a secondary one must fail
        let mut changed = draft(date(2025, 12, 10), "Miniha");
        changed.existing_id = Some(7);

        let result = rule().validate(&store, &changed).await;
        assert!(matches!(result, Err(Error::ComplianceViolation { .. })));
    }

    #[tokio::test]
    async fn test_violation_falls_back_to_staff_id_without_staff_row() {
        let mut store = store_with_contract(dec!(40), true);
        store.staff.clear();

        let result = rule()
            .validate(&store, &draft(date(2025, 12, 11), "Miniha"))
            .await;
        assert!(matches!(
            result,
            Err(Error::ComplianceViolation { ref staff_code, .. }) if staff_code == "1"
        ));
    }

    #[test]
    fn test_is_primary() {
        let rule = rule();
        assert!(rule.is_primary("Hodei"));
        assert!(!rule.is_primary("hodei"));
        assert!(!rule.is_primary("Miniha"));
        assert_eq!(rule.primary_service(), "Hodei");
    }
}
