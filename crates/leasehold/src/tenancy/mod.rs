//! Tenancy data model: ownership hierarchy, lease lifecycle, and occupancy rules.
//!
//! Operations go through [`TenancyService`], which runs each call in a single
//! store transaction. [`MemoryStore`] is the bundled store; it enforces the
//! same keys and constraints a relational backend would.

pub mod clock;
pub mod domain;
pub mod error;
pub(crate) mod hierarchy;
pub mod lifecycle;
pub mod memory;
pub mod occupancy;
pub mod reporting;
pub mod repository;
pub mod router;
pub mod service;
pub mod sweep;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    DateRange, EntityKind, Landlord, LandlordId, Lease, LeaseId, LeaseStatus, NewLandlord,
    NewLease, NewProperty, NewTenant, NewUnit, PostalAddress, Property, PropertyId, Tenant,
    TenantId, TenantLease, TenantLeaseId, Unit, UnitId,
};
pub use error::{ConflictReason, TenancyError, TenancyResult, ValidationError};
pub use lifecycle::{effective_status, LeaseAction};
pub use memory::MemoryStore;
pub use reporting::{write_rent_roll, RentRollRow};
pub use repository::{StoreError, TenancyStore, TenancyTx};
pub use router::{status_for, tenancy_router};
pub use service::TenancyService;
pub use sweep::{run_expiry_sweep, sweep_once};
