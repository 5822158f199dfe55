//! Ownership rules for the Landlord → Property → Unit tree.
//!
//! Removal is a soft archive: rows keep their ids so historical leases still
//! resolve, but archived rows are treated as absent by every lookup here.

use chrono::{DateTime, Utc};

use super::domain::{
    EntityKind, Landlord, LandlordId, Lease, LeaseId, NewLandlord, NewProperty, NewTenant,
    NewUnit, PostalAddress, Property, PropertyId, Tenant, TenantId, Unit, UnitId,
};
use super::error::{ConflictReason, TenancyError, TenancyResult, ValidationError};
use super::repository::TenancyTx;

pub(crate) fn non_blank(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(trimmed.to_string())
}

fn sanitize_address(address: PostalAddress) -> Result<PostalAddress, ValidationError> {
    Ok(PostalAddress {
        address_line1: non_blank(&address.address_line1, "address_line1")?,
        address_line2: address
            .address_line2
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty()),
        city: non_blank(&address.city, "city")?,
        state: non_blank(&address.state, "state")?,
        zip: non_blank(&address.zip, "zip")?,
    })
}

pub(crate) fn require_landlord(tx: &dyn TenancyTx, id: &LandlordId) -> TenancyResult<Landlord> {
    tx.landlord(id)?
        .filter(|landlord| !landlord.is_archived())
        .ok_or_else(|| TenancyError::not_found(EntityKind::Landlord, id))
}

pub(crate) fn require_property(tx: &dyn TenancyTx, id: &PropertyId) -> TenancyResult<Property> {
    tx.property(id)?
        .filter(|property| !property.is_archived())
        .ok_or_else(|| TenancyError::not_found(EntityKind::Property, id))
}

pub(crate) fn require_unit(tx: &dyn TenancyTx, id: &UnitId) -> TenancyResult<Unit> {
    tx.unit(id)?
        .filter(|unit| !unit.is_archived())
        .ok_or_else(|| TenancyError::not_found(EntityKind::Unit, id))
}

pub(crate) fn require_tenant(tx: &dyn TenancyTx, id: &TenantId) -> TenancyResult<Tenant> {
    tx.tenant(id)?
        .ok_or_else(|| TenancyError::not_found(EntityKind::Tenant, id))
}

pub(crate) fn require_lease(tx: &dyn TenancyTx, id: &LeaseId) -> TenancyResult<Lease> {
    tx.lease(id)?
        .ok_or_else(|| TenancyError::not_found(EntityKind::Lease, id))
}

/// Resolve a unit and make sure it sits inside `property_id`.
pub(crate) fn require_unit_of(
    tx: &dyn TenancyTx,
    property_id: &PropertyId,
    unit_id: &UnitId,
) -> TenancyResult<Unit> {
    let unit = require_unit(tx, unit_id)?;
    if &unit.property_id != property_id {
        return Err(ValidationError::UnitOutsideProperty {
            unit_id: unit_id.to_string(),
            property_id: property_id.to_string(),
        }
        .into());
    }
    Ok(unit)
}

pub(crate) fn create_landlord(
    tx: &mut dyn TenancyTx,
    input: NewLandlord,
    now: DateTime<Utc>,
) -> TenancyResult<Landlord> {
    let landlord = Landlord {
        id: LandlordId::generate(),
        name: non_blank(&input.name, "name")?,
        created_at: now,
        updated_at: now,
        archived_at: None,
    };
    tx.insert_landlord(landlord.clone())?;
    Ok(landlord)
}

pub(crate) fn create_property(
    tx: &mut dyn TenancyTx,
    input: NewProperty,
    now: DateTime<Utc>,
) -> TenancyResult<Property> {
    let NewProperty {
        owner_id,
        name,
        address,
    } = input;

    let name = non_blank(&name, "name")?;
    let address = sanitize_address(address)?;
    let owner = require_landlord(tx, &owner_id)?;

    let property = Property {
        id: PropertyId::generate(),
        name,
        address,
        owner_id: owner.id,
        created_at: now,
        updated_at: now,
        archived_at: None,
    };
    tx.insert_property(property.clone())?;
    Ok(property)
}

pub(crate) fn create_unit(
    tx: &mut dyn TenancyTx,
    property_id: &PropertyId,
    input: NewUnit,
    now: DateTime<Utc>,
) -> TenancyResult<Unit> {
    let name = non_blank(&input.name, "name")?;
    let property = require_property(tx, property_id)?;

    let unit = Unit {
        id: UnitId::generate(),
        property_id: property.id,
        name,
        created_at: now,
        updated_at: now,
        archived_at: None,
    };
    tx.insert_unit(unit.clone())?;
    Ok(unit)
}

pub(crate) fn create_tenant(
    tx: &mut dyn TenancyTx,
    input: NewTenant,
    now: DateTime<Utc>,
) -> TenancyResult<Tenant> {
    let tenant = Tenant {
        id: TenantId::generate(),
        name: non_blank(&input.name, "name")?,
        created_at: now,
        updated_at: now,
    };
    tx.insert_tenant(tenant.clone())?;
    Ok(tenant)
}

/// Archive a landlord that no longer owns any live property.
pub(crate) fn delete_landlord(
    tx: &mut dyn TenancyTx,
    id: &LandlordId,
    now: DateTime<Utc>,
) -> TenancyResult<()> {
    let mut landlord = require_landlord(tx, id)?;

    let owned = tx
        .properties_owned_by(id)?
        .into_iter()
        .filter(|property| !property.is_archived())
        .count();
    if owned > 0 {
        return Err(TenancyError::Conflict(
            ConflictReason::LandlordOwnsProperties { count: owned },
        ));
    }

    landlord.archived_at = Some(now);
    landlord.updated_at = now;
    tx.update_landlord(landlord)?;
    Ok(())
}

/// Archive a property and cascade the archive to its units.
///
/// Refused while any pending or active lease still references the property.
/// Returns the number of units archived alongside it.
pub(crate) fn delete_property(
    tx: &mut dyn TenancyTx,
    id: &PropertyId,
    now: DateTime<Utc>,
) -> TenancyResult<usize> {
    let mut property = require_property(tx, id)?;

    let live = tx
        .leases_on(id)?
        .into_iter()
        .filter(|lease| lease.status.is_live())
        .count();
    if live > 0 {
        return Err(TenancyError::Conflict(
            ConflictReason::PropertyHasLiveLeases { count: live },
        ));
    }

    let mut archived_units = 0;
    for mut unit in tx.units_in(id)? {
        if unit.is_archived() {
            continue;
        }
        unit.archived_at = Some(now);
        unit.updated_at = now;
        tx.update_unit(unit)?;
        archived_units += 1;
    }

    property.archived_at = Some(now);
    property.updated_at = now;
    tx.update_property(property)?;
    Ok(archived_units)
}

pub(crate) fn reassign_property(
    tx: &mut dyn TenancyTx,
    id: &PropertyId,
    new_owner_id: &LandlordId,
    now: DateTime<Utc>,
) -> TenancyResult<Property> {
    let mut property = require_property(tx, id)?;
    let owner = require_landlord(tx, new_owner_id)?;

    property.owner_id = owner.id;
    property.updated_at = now;
    tx.update_property(property.clone())?;
    Ok(property)
}
