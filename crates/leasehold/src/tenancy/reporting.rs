use std::io::Write;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::domain::{Lease, LeaseStatus, TenantId, Unit};
use super::error::TenancyResult;
use super::hierarchy::require_tenant;
use super::lifecycle::effective_status;
use super::repository::TenancyTx;

/// Active leases ending between `today` and `today + within_days`, soonest first.
pub(crate) fn expiring_leases(
    tx: &dyn TenancyTx,
    today: NaiveDate,
    within_days: u32,
) -> TenancyResult<Vec<Lease>> {
    let horizon = today
        .checked_add_signed(Duration::days(i64::from(within_days)))
        .unwrap_or(NaiveDate::MAX);

    let mut leases: Vec<Lease> = tx
        .leases_with_status(LeaseStatus::Active)?
        .into_iter()
        .filter(|lease| lease.end_date >= today && lease.end_date <= horizon)
        .collect();
    leases.sort_by(|a, b| a.end_date.cmp(&b.end_date).then_with(|| a.id.cmp(&b.id)));
    Ok(leases)
}

/// Live units with no active lease covering `as_of`.
///
/// A property-wide lease occupies every unit of its property.
pub(crate) fn vacant_units(tx: &dyn TenancyTx, as_of: NaiveDate) -> TenancyResult<Vec<Unit>> {
    let mut vacant = Vec::new();
    for property in tx.properties()? {
        if property.is_archived() {
            continue;
        }

        let occupying: Vec<Lease> = tx
            .leases_on(&property.id)?
            .into_iter()
            .filter(|lease| {
                effective_status(lease, as_of) == LeaseStatus::Active
                    && lease.term().contains(as_of)
            })
            .collect();

        for unit in tx.units_in(&property.id)? {
            if unit.is_archived() {
                continue;
            }
            let occupied = occupying
                .iter()
                .any(|lease| lease.shares_scope_with(&unit.property_id, Some(&unit.id)));
            if !occupied {
                vacant.push(unit);
            }
        }
    }

    vacant.sort_by(|a, b| {
        a.property_id
            .cmp(&b.property_id)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(vacant)
}

/// Every lease a tenant is party to, as primary or co-tenant, oldest first.
pub(crate) fn leases_for_tenant(
    tx: &dyn TenancyTx,
    tenant_id: &TenantId,
    as_of: NaiveDate,
) -> TenancyResult<Vec<Lease>> {
    require_tenant(tx, tenant_id)?;

    let mut leases = tx.leases_for_tenant(tenant_id)?;
    for lease in &mut leases {
        lease.status = effective_status(lease, as_of);
    }
    leases.sort_by(|a, b| {
        a.start_date
            .cmp(&b.start_date)
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(leases)
}

/// One rent-roll line as exported to spreadsheets.
#[derive(Debug, Clone, Serialize)]
pub struct RentRollRow<'a> {
    pub lease_id: &'a str,
    pub property_id: &'a str,
    pub unit_id: Option<&'a str>,
    pub tenant_id: &'a str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent: i64,
    pub deposit: i64,
    pub status: &'static str,
}

impl<'a> From<&'a Lease> for RentRollRow<'a> {
    fn from(lease: &'a Lease) -> Self {
        Self {
            lease_id: lease.id.as_str(),
            property_id: lease.property_id.as_str(),
            unit_id: lease.unit_id.as_ref().map(|unit| unit.as_str()),
            tenant_id: lease.tenant_id.as_str(),
            start_date: lease.start_date,
            end_date: lease.end_date,
            rent: lease.rent,
            deposit: lease.deposit,
            status: lease.status.label(),
        }
    }
}

/// Write `leases` as a CSV rent roll with a header row.
pub fn write_rent_roll<'a, W, I>(writer: W, leases: I) -> Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = &'a Lease>,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for lease in leases {
        csv_writer.serialize(RentRollRow::from(lease))?;
    }
    csv_writer.flush()?;
    Ok(())
}
