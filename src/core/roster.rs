//! Roster business logic - Service locations and staff members.
//!
//! Provides creation and lookup of locations and staff, plus seeding of the
//! roster (including contracts) from configuration.

use crate::{
    config::settings::Config,
    core::contract::{self, NewContract},
    entities::{ServiceLocation, Staff, StaffContract, service_location, staff, staff_contract},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{debug, info, instrument};

/// Summary of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Locations inserted
    pub locations_created: usize,
    /// Staff members inserted
    pub staff_created: usize,
    /// Contracts inserted
    pub contracts_created: usize,
}

/// Creates a new service location.
pub async fn create_location(
    db: &DatabaseConnection,
    location_code: String,
    location_name: String,
) -> Result<service_location::Model> {
    if location_code.trim().is_empty() {
        return Err(Error::Config {
            message: "Location code cannot be empty".to_string(),
        });
    }

    let location = service_location::ActiveModel {
        location_code: Set(location_code.trim().to_string()),
        location_name: Set(location_name),
        ..Default::default()
    };

    let result = location.insert(db).await?;
    Ok(result)
}

/// Finds a location by its code.
pub async fn get_location_by_code(
    db: &DatabaseConnection,
    location_code: &str,
) -> Result<Option<service_location::Model>> {
    ServiceLocation::find()
        .filter(service_location::Column::LocationCode.eq(location_code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Input for a new staff member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaff {
    /// Staff code, unique across the provider
    pub staff_code: String,
    /// Full name
    pub full_name: String,
    /// Specialist qualification flag
    pub is_specialist: bool,
    /// Location the staff member belongs to
    pub location_id: i64,
}

/// Creates a new staff member at an existing location.
pub async fn create_staff(db: &DatabaseConnection, new_staff: NewStaff) -> Result<staff::Model> {
    if new_staff.staff_code.trim().is_empty() {
        return Err(Error::Config {
            message: "Staff code cannot be empty".to_string(),
        });
    }

    ServiceLocation::find_by_id(new_staff.location_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::LocationNotFound {
            location: new_staff.location_id.to_string(),
        })?;

    let staff = staff::ActiveModel {
        staff_code: Set(new_staff.staff_code.trim().to_string()),
        full_name: Set(new_staff.full_name),
        is_specialist: Set(new_staff.is_specialist),
        location_id: Set(new_staff.location_id),
        ..Default::default()
    };

    let result = staff.insert(db).await?;
    Ok(result)
}

/// Finds a staff member by id.
pub async fn get_staff_by_id(
    db: &DatabaseConnection,
    staff_id: i64,
) -> Result<Option<staff::Model>> {
    Staff::find_by_id(staff_id).one(db).await.map_err(Into::into)
}

/// Finds a staff member by code.
pub async fn get_staff_by_code(
    db: &DatabaseConnection,
    staff_code: &str,
) -> Result<Option<staff::Model>> {
    Staff::find()
        .filter(staff::Column::StaffCode.eq(staff_code))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the staff of a location ordered by staff code.
pub async fn list_staff_for_location<C>(db: &C, location_id: i64) -> Result<Vec<staff::Model>>
where
    C: ConnectionTrait,
{
    Staff::find()
        .filter(staff::Column::LocationId.eq(location_id))
        .order_by_asc(staff::Column::StaffCode)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Seeds locations, staff and contracts from configuration.
///
/// Rows that already exist (same location code, staff code, or staff and
/// contract start date) are left untouched, so seeding can run on every start.
#[instrument(skip(db, config))]
pub async fn seed_roster(db: &DatabaseConnection, config: &Config) -> Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    for location in &config.locations {
        if get_location_by_code(db, &location.code).await?.is_none() {
            create_location(db, location.code.clone(), location.name.clone()).await?;
            summary.locations_created += 1;
        }
    }

    for staff_config in &config.staff {
        let location = get_location_by_code(db, &staff_config.location)
            .await?
            .ok_or_else(|| Error::LocationNotFound {
                location: staff_config.location.clone(),
            })?;

        let staff = if let Some(existing) = get_staff_by_code(db, &staff_config.code).await? {
            debug!(staff_code = %existing.staff_code, "Staff already present; skipping");
            existing
        } else {
            summary.staff_created += 1;
            create_staff(
                db,
                NewStaff {
                    staff_code: staff_config.code.clone(),
                    full_name: staff_config.full_name.clone(),
                    is_specialist: staff_config.is_specialist,
                    location_id: location.id,
                },
            )
            .await?
        };

        for contract_config in &staff_config.contracts {
            let exists = StaffContract::find()
                .filter(staff_contract::Column::StaffId.eq(staff.id))
                .filter(staff_contract::Column::ContractStartDate.eq(contract_config.start_date))
                .one(db)
                .await?
                .is_some();
            if exists {
                continue;
            }

            contract::create_contract(
                db,
                NewContract {
                    staff_id: staff.id,
                    contract_start_date: contract_config.start_date,
                    weekly_contracted_hours: contract_config.weekly_hours,
                    is_full_time: contract_config.is_full_time,
                },
            )
            .await?;
            summary.contracts_created += 1;
        }
    }

    info!(
        locations = summary.locations_created,
        staff = summary.staff_created,
        contracts = summary.contracts_created,
        "Roster seeded"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::parse_config;
    use crate::test_utils::*;

    const ROSTER: &str = r#"
        [[locations]]
        code = "LOC001"
        name = "Head office"

        [[staff]]
        code = "S001"
        full_name = "Taro Jokin"
        location = "LOC001"
        is_specialist = true

        [[staff.contracts]]
        start_date = "2025-01-01"
        weekly_hours = 40
        is_full_time = true

        [[staff]]
        code = "S002"
        full_name = "Hanako Hijokin"
        location = "LOC001"

        [[staff.contracts]]
        start_date = "2025-01-01"
        weekly_hours = 20
    "#;

    #[tokio::test]
    async fn test_create_and_find_staff() -> Result<()> {
        let db = setup_test_db().await?;
        let location = create_location(&db, "LOC001".to_string(), "Head office".to_string()).await?;

        let staff = create_staff(
            &db,
            NewStaff {
                staff_code: "  S001 ".to_string(),
                full_name: "Taro Jokin".to_string(),
                is_specialist: true,
                location_id: location.id,
            },
        )
        .await?;
        assert_eq!(staff.staff_code, "S001");

        let by_code = get_staff_by_code(&db, "S001").await?.unwrap();
        assert_eq!(by_code.id, staff.id);
        let by_id = get_staff_by_id(&db, staff.id).await?.unwrap();
        assert!(by_id.is_specialist);
        assert!(get_staff_by_code(&db, "S999").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_staff_requires_location() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_staff(
            &db,
            NewStaff {
                staff_code: "S001".to_string(),
                full_name: "Taro Jokin".to_string(),
                is_specialist: false,
                location_id: 7,
            },
        )
        .await;
        assert!(matches!(result, Err(Error::LocationNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_codes_are_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_location(&db, "   ".to_string(), "Nowhere".to_string()).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_staff_for_location() -> Result<()> {
        let (db, first) = setup_with_staff("S002").await?;
        create_test_staff(&db, "S001", first.location_id).await?;
        let elsewhere = create_location(&db, "LOC002".to_string(), "Branch".to_string()).await?;
        create_test_staff(&db, "S003", elsewhere.id).await?;

        let codes: Vec<_> = list_staff_for_location(&db, first.location_id)
            .await?
            .into_iter()
            .map(|s| s.staff_code)
            .collect();
        assert_eq!(codes, vec!["S001", "S002"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_roster_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(ROSTER)?;

        let first = seed_roster(&db, &config).await?;
        assert_eq!(
            first,
            SeedSummary {
                locations_created: 1,
                staff_created: 2,
                contracts_created: 2,
            }
        );

        let second = seed_roster(&db, &config).await?;
        assert_eq!(second, SeedSummary::default());

        let taro = get_staff_by_code(&db, "S001").await?.unwrap();
        let contracts = contract::list_contracts_for_staff(&db, taro.id).await?;
        assert_eq!(contracts.len(), 1);
        assert!(contracts[0].is_full_time);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_roster_unknown_location() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(
            r#"
            [[staff]]
            code = "S001"
            full_name = "Taro Jokin"
            location = "LOC404"
            "#,
        )?;

        let result = seed_roster(&db, &config).await;
        assert!(matches!(result, Err(Error::LocationNotFound { .. })));
        Ok(())
    }
}
