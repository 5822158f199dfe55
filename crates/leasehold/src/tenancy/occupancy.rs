//! Occupancy exclusivity and co-tenant bookkeeping.
//!
//! Two leases collide when they share an occupancy scope (same property, and
//! either one is property-wide or both name the same unit), their inclusive
//! terms overlap, and both are still live. The check here runs inside the
//! writing transaction; the store repeats it as an exclusion constraint.

use chrono::{DateTime, Utc};

use super::domain::{
    DateRange, EntityKind, Lease, LeaseId, LeaseStatus, PropertyId, TenantId, TenantLease,
    TenantLeaseId, UnitId,
};
use super::error::{ConflictReason, TenancyError, TenancyResult, ValidationError};
use super::hierarchy::{require_lease, require_property, require_tenant, require_unit_of};
use super::repository::TenancyTx;

/// First live lease in the scope whose term overlaps `range`, skipping `exclude`.
pub fn find_conflict<'a, I>(
    leases: I,
    property_id: &PropertyId,
    unit_id: Option<&UnitId>,
    range: &DateRange,
    exclude: Option<&LeaseId>,
) -> Option<&'a Lease>
where
    I: IntoIterator<Item = &'a Lease>,
{
    leases.into_iter().find(|lease| {
        exclude.map_or(true, |skip| &lease.id != skip)
            && lease.blocks(property_id, unit_id, range)
    })
}

/// Already-active lease that would overlap `candidate` once it is activated.
pub fn activation_conflict<'a, I>(candidate: &Lease, leases: I) -> Option<&'a Lease>
where
    I: IntoIterator<Item = &'a Lease>,
{
    find_conflict(
        leases
            .into_iter()
            .filter(|lease| lease.status == LeaseStatus::Active),
        &candidate.property_id,
        candidate.unit_id.as_ref(),
        &candidate.term(),
        Some(&candidate.id),
    )
}

pub(crate) fn ensure_ordered(range: &DateRange) -> Result<(), ValidationError> {
    if range.is_ordered() {
        Ok(())
    } else {
        Err(ValidationError::InvertedDateRange {
            start: range.start,
            end: range.end,
        })
    }
}

/// Reject `range` when a live lease already holds the scope.
pub(crate) fn ensure_available(
    tx: &dyn TenancyTx,
    property_id: &PropertyId,
    unit_id: Option<&UnitId>,
    range: &DateRange,
    exclude: Option<&LeaseId>,
) -> TenancyResult<()> {
    let leases = tx.leases_on(property_id)?;
    match find_conflict(&leases, property_id, unit_id, range, exclude) {
        Some(existing) => Err(TenancyError::Conflict(ConflictReason::OverlappingLease {
            existing: existing.id.clone(),
        })),
        None => Ok(()),
    }
}

/// Read-only availability check for a prospective lease window.
pub(crate) fn check_availability(
    tx: &dyn TenancyTx,
    property_id: &PropertyId,
    unit_id: Option<&UnitId>,
    range: &DateRange,
) -> TenancyResult<bool> {
    ensure_ordered(range)?;
    require_property(tx, property_id)?;
    if let Some(unit_id) = unit_id {
        require_unit_of(tx, property_id, unit_id)?;
    }

    match ensure_available(tx, property_id, unit_id, range, None) {
        Ok(()) => Ok(true),
        Err(TenancyError::Conflict(_)) => Ok(false),
        Err(other) => Err(other),
    }
}

pub(crate) fn add_co_tenant(
    tx: &mut dyn TenancyTx,
    lease_id: &LeaseId,
    tenant_id: &TenantId,
    now: DateTime<Utc>,
) -> TenancyResult<TenantLease> {
    let lease = require_lease(tx, lease_id)?;
    require_tenant(tx, tenant_id)?;

    if lease.involves(tenant_id) {
        return Err(TenancyError::Conflict(ConflictReason::PrimaryTenant));
    }
    if tx.tenant_lease(tenant_id, lease_id)?.is_some() {
        return Err(TenancyError::Conflict(ConflictReason::DuplicateCoTenant));
    }

    let row = TenantLease {
        id: TenantLeaseId::generate(),
        tenant_id: tenant_id.clone(),
        lease_id: lease_id.clone(),
        created_at: now,
        updated_at: now,
    };
    tx.insert_tenant_lease(row.clone())?;
    Ok(row)
}

pub(crate) fn remove_co_tenant(
    tx: &mut dyn TenancyTx,
    lease_id: &LeaseId,
    tenant_id: &TenantId,
) -> TenancyResult<()> {
    let row = tx.tenant_lease(tenant_id, lease_id)?.ok_or_else(|| {
        TenancyError::not_found(EntityKind::TenantLease, format!("{tenant_id}/{lease_id}"))
    })?;
    tx.delete_tenant_lease(&row.id)?;
    Ok(())
}

pub(crate) fn co_tenants(
    tx: &dyn TenancyTx,
    lease_id: &LeaseId,
) -> TenancyResult<Vec<TenantLease>> {
    require_lease(tx, lease_id)?;
    let mut rows = tx.tenant_leases_for(lease_id)?;
    rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Ok(rows)
}
