use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::domain::{
    DateRange, Landlord, LandlordId, Lease, LeaseId, NewLandlord, NewLease, NewProperty,
    NewTenant, NewUnit, Property, PropertyId, Tenant, TenantId, TenantLease, Unit, UnitId,
};
use super::error::{TenancyError, TenancyResult};
use super::repository::TenancyStore;
use super::{hierarchy, lifecycle, occupancy, reporting};

/// Service composing the ownership, lifecycle, and occupancy rules over a store.
///
/// Every operation runs in exactly one store transaction, so the invariant
/// checks and the writes they guard commit or roll back together.
pub struct TenancyService<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> TenancyService<S>
where
    S: TenancyStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn create_landlord(&self, input: NewLandlord) -> TenancyResult<Landlord> {
        let now = self.clock.now();
        let landlord = self
            .store
            .transaction(|tx| hierarchy::create_landlord(tx, input, now))?;
        info!(landlord_id = %landlord.id, "landlord created");
        Ok(landlord)
    }

    pub fn create_property(&self, input: NewProperty) -> TenancyResult<Property> {
        let now = self.clock.now();
        let property = self
            .store
            .transaction(|tx| hierarchy::create_property(tx, input, now))?;
        info!(
            property_id = %property.id,
            owner_id = %property.owner_id,
            "property created"
        );
        Ok(property)
    }

    pub fn create_unit(&self, property_id: &PropertyId, input: NewUnit) -> TenancyResult<Unit> {
        let now = self.clock.now();
        let unit = self
            .store
            .transaction(|tx| hierarchy::create_unit(tx, property_id, input, now))?;
        info!(unit_id = %unit.id, property_id = %unit.property_id, "unit created");
        Ok(unit)
    }

    pub fn create_tenant(&self, input: NewTenant) -> TenancyResult<Tenant> {
        let now = self.clock.now();
        let tenant = self
            .store
            .transaction(|tx| hierarchy::create_tenant(tx, input, now))?;
        info!(tenant_id = %tenant.id, "tenant created");
        Ok(tenant)
    }

    /// Archive a landlord; refused while it still owns live properties.
    pub fn delete_landlord(&self, id: &LandlordId) -> TenancyResult<()> {
        let now = self.clock.now();
        self.store
            .transaction(|tx| hierarchy::delete_landlord(tx, id, now))
            .map_err(|err| log_rejection("delete_landlord", err))?;
        info!(landlord_id = %id, "landlord archived");
        Ok(())
    }

    /// Archive a property together with its units.
    pub fn delete_property(&self, id: &PropertyId) -> TenancyResult<()> {
        let now = self.clock.now();
        let units = self
            .store
            .transaction(|tx| hierarchy::delete_property(tx, id, now))
            .map_err(|err| log_rejection("delete_property", err))?;
        info!(property_id = %id, units, "property archived");
        Ok(())
    }

    pub fn reassign_property(
        &self,
        id: &PropertyId,
        new_owner_id: &LandlordId,
    ) -> TenancyResult<Property> {
        let now = self.clock.now();
        let property = self
            .store
            .transaction(|tx| hierarchy::reassign_property(tx, id, new_owner_id, now))?;
        info!(property_id = %id, owner_id = %new_owner_id, "property reassigned");
        Ok(property)
    }

    pub fn create_lease(&self, input: NewLease) -> TenancyResult<Lease> {
        let now = self.clock.now();
        let lease = self
            .store
            .transaction(|tx| lifecycle::create_lease(tx, input, now))
            .map_err(|err| log_rejection("create_lease", err))?;
        info!(
            lease_id = %lease.id,
            property_id = %lease.property_id,
            start = %lease.start_date,
            end = %lease.end_date,
            "lease drafted"
        );
        Ok(lease)
    }

    /// Fetch a lease; a lapsed active lease is reported as expired.
    pub fn get_lease(&self, id: &LeaseId) -> TenancyResult<Lease> {
        let today = self.clock.today();
        let mut lease = self
            .store
            .transaction(|tx| hierarchy::require_lease(tx, id))?;
        lease.status = lifecycle::effective_status(&lease, today);
        Ok(lease)
    }

    pub fn activate_lease(&self, id: &LeaseId) -> TenancyResult<Lease> {
        let today = self.clock.today();
        let now = self.clock.now();
        let lease = self
            .store
            .transaction(|tx| lifecycle::activate_lease(tx, id, today, now))
            .map_err(|err| log_rejection("activate_lease", err))?;
        info!(lease_id = %lease.id, "lease activated");
        Ok(lease)
    }

    pub fn terminate_lease(&self, id: &LeaseId, reason: &str) -> TenancyResult<Lease> {
        let today = self.clock.today();
        let now = self.clock.now();
        let lease = self
            .store
            .transaction(|tx| lifecycle::terminate_lease(tx, id, reason, today, now))
            .map_err(|err| log_rejection("terminate_lease", err))?;
        info!(lease_id = %lease.id, reason, "lease terminated");
        Ok(lease)
    }

    pub fn recompute_expiry(&self, id: &LeaseId, as_of: NaiveDate) -> TenancyResult<Lease> {
        let now = self.clock.now();
        let (lease, changed) = self
            .store
            .transaction(|tx| lifecycle::recompute_expiry(tx, id, as_of, now))?;
        if changed {
            info!(lease_id = %lease.id, %as_of, "lease expired");
        } else {
            debug!(lease_id = %lease.id, status = %lease.status, %as_of, "expiry unchanged");
        }
        Ok(lease)
    }

    /// Expire every lapsed active lease in one pass.
    pub fn sweep_expired(&self, as_of: NaiveDate) -> TenancyResult<Vec<LeaseId>> {
        let now = self.clock.now();
        let expired = self
            .store
            .transaction(|tx| lifecycle::sweep_expired(tx, as_of, now))?;
        info!(%as_of, expired = expired.len(), "expiry sweep finished");
        Ok(expired)
    }

    pub fn add_co_tenant(
        &self,
        lease_id: &LeaseId,
        tenant_id: &TenantId,
    ) -> TenancyResult<TenantLease> {
        let now = self.clock.now();
        let row = self
            .store
            .transaction(|tx| occupancy::add_co_tenant(tx, lease_id, tenant_id, now))
            .map_err(|err| log_rejection("add_co_tenant", err))?;
        info!(lease_id = %lease_id, tenant_id = %tenant_id, "co-tenant added");
        Ok(row)
    }

    pub fn remove_co_tenant(
        &self,
        lease_id: &LeaseId,
        tenant_id: &TenantId,
    ) -> TenancyResult<()> {
        self.store
            .transaction(|tx| occupancy::remove_co_tenant(tx, lease_id, tenant_id))
            .map_err(|err| log_rejection("remove_co_tenant", err))?;
        info!(lease_id = %lease_id, tenant_id = %tenant_id, "co-tenant removed");
        Ok(())
    }

    pub fn co_tenants(&self, lease_id: &LeaseId) -> TenancyResult<Vec<TenantLease>> {
        self.store.transaction(|tx| occupancy::co_tenants(tx, lease_id))
    }

    /// Whether a new lease for `start..=end` would be accepted right now.
    pub fn check_availability(
        &self,
        property_id: &PropertyId,
        unit_id: Option<&UnitId>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> TenancyResult<bool> {
        let range = DateRange::new(start, end);
        self.store
            .transaction(|tx| occupancy::check_availability(tx, property_id, unit_id, &range))
    }

    pub fn list_expiring_leases(&self, within_days: u32) -> TenancyResult<Vec<Lease>> {
        let today = self.clock.today();
        self.store
            .transaction(|tx| reporting::expiring_leases(tx, today, within_days))
    }

    pub fn vacant_units(&self, as_of: NaiveDate) -> TenancyResult<Vec<Unit>> {
        self.store.transaction(|tx| reporting::vacant_units(tx, as_of))
    }

    pub fn leases_for_tenant(&self, tenant_id: &TenantId) -> TenancyResult<Vec<Lease>> {
        let today = self.clock.today();
        self.store
            .transaction(|tx| reporting::leases_for_tenant(tx, tenant_id, today))
    }
}

fn log_rejection(operation: &'static str, err: TenancyError) -> TenancyError {
    match &err {
        TenancyError::Store(source) => {
            warn!(operation, error = %source, "tenancy store failure")
        }
        other => debug!(operation, kind = other.kind(), error = %other, "operation rejected"),
    }
    err
}
