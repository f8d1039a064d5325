//! Work record business logic - The guarded write path for worked time.
//!
//! Every create and update runs the concurrent-duty rule and the write inside
//! one serializable transaction, so a secondary-service record can
//! never commit on the strength of a primary record that is not there. The
//! unique index on (staff, day, service) backs this up at the storage level.
//! Writes that lose a lock or serialization conflict are retried; compliance
//! violations are not.

use crate::{
    core::compliance::{ConcurrentDutyRule, WorkRecordDraft},
    core::store::StaffingStore,
    entities::{Staff, WorkRecord, staff, work_record},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{
    DatabaseTransaction, DbBackend, IsolationLevel, QueryOrder, Set, SqlErr, TransactionTrait,
    prelude::*,
};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Pause before a retried write, multiplied by the attempt number.
const RETRY_BACKOFF: Duration = Duration::from_millis(15);

/// Input for a new work record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWorkRecord {
    /// Staff member the time belongs to
    pub staff_id: i64,
    /// Day of the work
    pub work_date: NaiveDate,
    /// Service the time is booked against
    pub service_type: String,
    /// Worked minutes
    pub duration_minutes: i32,
}

/// Changes to an existing work record; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkRecordChanges {
    /// New day
    pub work_date: Option<NaiveDate>,
    /// New service
    pub service_type: Option<String>,
    /// New duration
    pub duration_minutes: Option<i32>,
}

/// Guarded write access to work records.
#[derive(Debug, Clone)]
pub struct WorkRecordService {
    rule: ConcurrentDutyRule,
    max_attempts: u32,
}

impl WorkRecordService {
    /// Creates the service. `max_attempts` is clamped to at least one.
    #[must_use]
    pub fn new(rule: ConcurrentDutyRule, max_attempts: u32) -> Self {
        Self {
            rule,
            max_attempts: max_attempts.max(1),
        }
    }

    /// The rule applied to every write.
    #[must_use]
    pub const fn rule(&self) -> &ConcurrentDutyRule {
        &self.rule
    }

    /// Validates and inserts a new work record.
    ///
    /// # Errors
    /// * [`Error::InvalidDuration`] for a negative duration
    /// * [`Error::StaffNotFound`] for an unknown staff member
    /// * [`Error::ComplianceViolation`] when the concurrent-duty rule rejects the record
    /// * [`Error::DuplicateWorkRecord`] when the same staff, day and service is already recorded
    #[instrument(skip(self, db))]
    pub async fn create_work_record(
        &self,
        db: &DatabaseConnection,
        record: NewWorkRecord,
    ) -> Result<work_record::Model> {
        check_duration(record.duration_minutes)?;

        let draft = WorkRecordDraft {
            staff_id: record.staff_id,
            work_date: record.work_date,
            service_type: record.service_type,
            duration_minutes: record.duration_minutes,
            existing_id: None,
        };

        let created = self
            .with_retry(db, |txn| {
                let draft = draft.clone();
                async move {
                    let model = self.insert_checked(&txn, &draft).await?;
                    Ok((txn, model))
                }
            })
            .await?;

        info!(
            work_record_id = created.id,
            staff_id = created.staff_id,
            work_date = %created.work_date,
            service_type = %created.service_type,
            duration_minutes = created.duration_minutes,
            "Created work record"
        );
        Ok(created)
    }

    /// Applies `changes` to an existing record after re-running validation,
    /// ignoring the record's own current state.
    ///
    /// # Errors
    /// As [`Self::create_work_record`], plus [`Error::WorkRecordNotFound`].
    #[instrument(skip(self, db))]
    pub async fn update_work_record(
        &self,
        db: &DatabaseConnection,
        work_record_id: i64,
        changes: WorkRecordChanges,
    ) -> Result<work_record::Model> {
        if let Some(minutes) = changes.duration_minutes {
            check_duration(minutes)?;
        }

        let updated = self
            .with_retry(db, |txn| {
                let changes = changes.clone();
                async move {
                    let model = self.update_checked(&txn, work_record_id, &changes).await?;
                    Ok((txn, model))
                }
            })
            .await?;

        info!(
            work_record_id = updated.id,
            work_date = %updated.work_date,
            service_type = %updated.service_type,
            duration_minutes = updated.duration_minutes,
            "Updated work record"
        );
        Ok(updated)
    }

    async fn insert_checked(
        &self,
        txn: &DatabaseTransaction,
        draft: &WorkRecordDraft,
    ) -> Result<work_record::Model> {
        let staff = require_staff(txn, draft.staff_id).await?;
        self.rule.validate(txn, draft).await?;

        let model = work_record::ActiveModel {
            staff_id: Set(draft.staff_id),
            work_date: Set(draft.work_date),
            service_type: Set(draft.service_type.clone()),
            duration_minutes: Set(draft.duration_minutes),
            ..Default::default()
        };

        model
            .insert(txn)
            .await
            .map_err(|e| map_unique_violation(e, &staff, draft))
    }

    async fn update_checked(
        &self,
        txn: &DatabaseTransaction,
        work_record_id: i64,
        changes: &WorkRecordChanges,
    ) -> Result<work_record::Model> {
        let existing = WorkRecord::find_by_id(work_record_id)
            .one(txn)
            .await?
            .ok_or(Error::WorkRecordNotFound { id: work_record_id })?;

        let draft = WorkRecordDraft {
            staff_id: existing.staff_id,
            work_date: changes.work_date.unwrap_or(existing.work_date),
            service_type: changes
                .service_type
                .clone()
                .unwrap_or_else(|| existing.service_type.clone()),
            duration_minutes: changes.duration_minutes.unwrap_or(existing.duration_minutes),
            existing_id: Some(existing.id),
        };

        let staff = require_staff(txn, draft.staff_id).await?;
        self.rule.validate(txn, &draft).await?;

        let mut active_model: work_record::ActiveModel = existing.into();
        active_model.work_date = Set(draft.work_date);
        active_model.service_type = Set(draft.service_type.clone());
        active_model.duration_minutes = Set(draft.duration_minutes);

        active_model
            .update(txn)
            .await
            .map_err(|e| map_unique_violation(e, &staff, &draft))
    }

    /// Runs `op` in a fresh serializable transaction, committing on success
    /// and retrying while the failure is a lock or serialization conflict.
    async fn with_retry<F, Fut>(&self, db: &DatabaseConnection, op: F) -> Result<work_record::Model>
    where
        F: Fn(DatabaseTransaction) -> Fut,
        Fut: Future<Output = Result<(DatabaseTransaction, work_record::Model)>>,
    {
        let mut attempt = 1;
        loop {
            let result = match begin_serializable(db).await {
                Ok(txn) => match op(txn).await {
                    // The transaction is rolled back when dropped on error.
                    Ok((txn, model)) => txn.commit().await.map(|()| model).map_err(Error::from),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };

            match result {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let backoff = RETRY_BACKOFF * attempt;
                    warn!(
                        attempt,
                        ?backoff,
                        error = %e,
                        "Work record write conflicted; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

/// `SQLite` transactions are serializable as they are and sea-orm cannot set
/// an isolation level there, so only other backends get one. The crate only
/// enables `sqlx-sqlite`; the `SERIALIZABLE` branch is reached once another
/// backend feature (e.g. `sqlx-postgres`) is turned on.
async fn begin_serializable(db: &DatabaseConnection) -> Result<DatabaseTransaction> {
    let txn = if db.get_database_backend() == DbBackend::Sqlite {
        db.begin().await?
    } else {
        db.begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?
    };
    Ok(txn)
}

fn check_duration(minutes: i32) -> Result<()> {
    if minutes < 0 {
        return Err(Error::InvalidDuration { minutes });
    }
    Ok(())
}

async fn require_staff<C>(db: &C, staff_id: i64) -> Result<staff::Model>
where
    C: ConnectionTrait,
{
    db.find_staff(staff_id)
        .await?
        .ok_or_else(|| Error::StaffNotFound {
            staff: staff_id.to_string(),
        })
}

fn map_unique_violation(err: DbErr, staff: &staff::Model, draft: &WorkRecordDraft) -> Error {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        Error::DuplicateWorkRecord {
            staff_code: staff.staff_code.clone(),
            work_date: draft.work_date,
            service_type: draft.service_type.clone(),
        }
    } else {
        err.into()
    }
}

/// Deletes a work record.
///
/// Secondary-service records of the same day are left in place; the rule
/// only guards writes.
#[instrument(skip(db))]
pub async fn delete_work_record(db: &DatabaseConnection, work_record_id: i64) -> Result<()> {
    let result = WorkRecord::delete_by_id(work_record_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::WorkRecordNotFound { id: work_record_id });
    }
    info!(work_record_id, "Deleted work record");
    Ok(())
}

/// Retrieves a work record by id.
pub async fn get_work_record_by_id(
    db: &DatabaseConnection,
    work_record_id: i64,
) -> Result<Option<work_record::Model>> {
    WorkRecord::find_by_id(work_record_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the work records of a staff member between `start` and `end`
/// inclusive, newest day first.
pub async fn list_work_records(
    db: &DatabaseConnection,
    staff_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<work_record::Model>> {
    if end < start {
        return Err(Error::InvalidDateRange { start, end });
    }

    let records = WorkRecord::find()
        .filter(work_record::Column::StaffId.eq(staff_id))
        .filter(work_record::Column::WorkDate.between(start, end))
        .order_by_desc(work_record::Column::WorkDate)
        .order_by_asc(work_record::Column::ServiceType)
        .all(db)
        .await?;
    debug!(staff_id, count = records.len(), "Listed work records");
    Ok(records)
}

/// Lists every staff member's records for one day.
pub async fn list_work_records_on(
    db: &DatabaseConnection,
    work_date: NaiveDate,
) -> Result<Vec<(work_record::Model, Option<staff::Model>)>> {
    WorkRecord::find()
        .filter(work_record::Column::WorkDate.eq(work_date))
        .find_also_related(Staff)
        .order_by_asc(work_record::Column::StaffId)
        .all(db)
        .await
        .map_err(Into::into)
}
