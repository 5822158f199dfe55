//! Lease state machine.
//!
//! ```text
//! PENDING --activate--> ACTIVE --expire--> EXPIRED
//!    |                    |
//!    +----terminate-------+--terminate--> INACTIVE
//! ```
//!
//! Expiry is the only transition driven by the calendar; the others need an
//! explicit caller action.

use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{Lease, LeaseId, LeaseStatus, NewLease};
use super::error::{ConflictReason, TenancyError, TenancyResult, ValidationError};
use super::hierarchy::{
    non_blank, require_lease, require_property, require_tenant, require_unit_of,
};
use super::occupancy::{activation_conflict, ensure_available, ensure_ordered};
use super::repository::TenancyTx;

/// Administrative or calendar-driven lease transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseAction {
    Activate,
    Terminate,
    Expire,
}

impl LeaseAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Terminate => "terminate",
            Self::Expire => "expire",
        }
    }

    /// Target status when `self` is applied in `from`, if the move is legal.
    pub const fn apply(self, from: LeaseStatus) -> Option<LeaseStatus> {
        match (self, from) {
            (Self::Activate, LeaseStatus::Pending) => Some(LeaseStatus::Active),
            (Self::Terminate, LeaseStatus::Pending | LeaseStatus::Active) => {
                Some(LeaseStatus::Inactive)
            }
            (Self::Expire, LeaseStatus::Active) => Some(LeaseStatus::Expired),
            _ => None,
        }
    }
}

/// Status a lease should be reported with on `as_of`, accounting for a lapsed term.
pub fn effective_status(lease: &Lease, as_of: NaiveDate) -> LeaseStatus {
    if lease.status == LeaseStatus::Active && as_of > lease.end_date {
        LeaseStatus::Expired
    } else {
        lease.status
    }
}

pub(crate) fn validate_terms(input: &NewLease) -> Result<(), ValidationError> {
    ensure_ordered(&input.term())?;
    if input.rent < 0 {
        return Err(ValidationError::NegativeRent(input.rent));
    }
    if input.deposit < 0 {
        return Err(ValidationError::NegativeDeposit(input.deposit));
    }
    Ok(())
}

fn transition(lease: &Lease, action: LeaseAction) -> TenancyResult<LeaseStatus> {
    action
        .apply(lease.status)
        .ok_or_else(|| TenancyError::InvalidTransition {
            lease_id: lease.id.clone(),
            from: lease.status,
            action: action.label(),
            reason: format!("{} leases cannot {}", lease.status, action.label()),
        })
}

/// Validate and insert a new lease in `PENDING`.
pub(crate) fn create_lease(
    tx: &mut dyn TenancyTx,
    input: NewLease,
    now: DateTime<Utc>,
) -> TenancyResult<Lease> {
    validate_terms(&input)?;

    let property = require_property(tx, &input.property_id)?;
    require_tenant(tx, &input.tenant_id)?;
    if let Some(unit_id) = &input.unit_id {
        require_unit_of(tx, &property.id, unit_id)?;
    }

    let term = input.term();
    ensure_available(tx, &property.id, input.unit_id.as_ref(), &term, None)?;

    let lease = Lease {
        id: LeaseId::generate(),
        property_id: property.id,
        unit_id: input.unit_id,
        tenant_id: input.tenant_id,
        start_date: input.start_date,
        end_date: input.end_date,
        rent: input.rent,
        deposit: input.deposit,
        status: LeaseStatus::Pending,
        termination_reason: None,
        terminated_on: None,
        created_at: now,
        updated_at: now,
    };
    tx.insert_lease(lease.clone())?;
    Ok(lease)
}

/// Confirm a pending lease whose term covers `today`.
pub(crate) fn activate_lease(
    tx: &mut dyn TenancyTx,
    id: &LeaseId,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> TenancyResult<Lease> {
    let mut lease = require_lease(tx, id)?;
    let next = transition(&lease, LeaseAction::Activate)?;

    if !lease.term().contains(today) {
        let reason = if today < lease.start_date {
            format!("term starts on {}", lease.start_date)
        } else {
            format!("term ended on {}", lease.end_date)
        };
        return Err(TenancyError::InvalidTransition {
            lease_id: lease.id,
            from: lease.status,
            action: LeaseAction::Activate.label(),
            reason,
        });
    }

    let neighbours = tx.leases_on(&lease.property_id)?;
    if let Some(existing) = activation_conflict(&lease, &neighbours) {
        return Err(TenancyError::Conflict(ConflictReason::OverlappingLease {
            existing: existing.id.clone(),
        }));
    }

    lease.status = next;
    lease.updated_at = now;
    tx.update_lease(lease.clone())?;
    Ok(lease)
}

/// End a pending or active lease early.
pub(crate) fn terminate_lease(
    tx: &mut dyn TenancyTx,
    id: &LeaseId,
    reason: &str,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> TenancyResult<Lease> {
    let reason = non_blank(reason, "reason")?;
    let mut lease = require_lease(tx, id)?;
    let next = transition(&lease, LeaseAction::Terminate)?;

    lease.status = next;
    lease.termination_reason = Some(reason);
    lease.terminated_on = Some(today);
    lease.updated_at = now;
    tx.update_lease(lease.clone())?;
    Ok(lease)
}

/// Move a lapsed active lease to `EXPIRED`; a no-op in every other case.
///
/// Returns the lease and whether this call changed it.
pub(crate) fn recompute_expiry(
    tx: &mut dyn TenancyTx,
    id: &LeaseId,
    as_of: NaiveDate,
    now: DateTime<Utc>,
) -> TenancyResult<(Lease, bool)> {
    let mut lease = require_lease(tx, id)?;
    if lease.status != LeaseStatus::Active || as_of <= lease.end_date {
        return Ok((lease, false));
    }

    lease.status = transition(&lease, LeaseAction::Expire)?;
    lease.updated_at = now;
    tx.update_lease(lease.clone())?;
    Ok((lease, true))
}

/// Expire every lapsed active lease, returning the ids that changed.
pub(crate) fn sweep_expired(
    tx: &mut dyn TenancyTx,
    as_of: NaiveDate,
    now: DateTime<Utc>,
) -> TenancyResult<Vec<LeaseId>> {
    let mut expired = Vec::new();
    for lease in tx.leases_with_status(LeaseStatus::Active)? {
        let (_, changed) = recompute_expiry(tx, &lease.id, as_of, now)?;
        if changed {
            expired.push(lease.id);
        }
    }
    Ok(expired)
}
