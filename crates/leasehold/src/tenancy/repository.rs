use super::domain::{
    EntityKind, Landlord, LandlordId, Lease, LeaseId, LeaseStatus, Property, PropertyId, Tenant,
    TenantId, TenantLease, TenantLeaseId, Unit, UnitId,
};

/// Error enumeration for relational store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint '{0}' violated")]
    UniqueViolation(&'static str),
    #[error("foreign key constraint '{0}' violated")]
    ForeignKeyViolation(&'static str),
    #[error("exclusion constraint '{0}' violated")]
    ExclusionViolation(&'static str),
    #[error("{entity} row '{id}' does not exist")]
    NotFound { entity: EntityKind, id: String },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Transactional storage abstraction so the tenancy rules can be exercised in isolation.
///
/// Implementations run `work` with serializable isolation: either every write
/// made through the handle is committed, or (when `work` returns `Err`) none is.
pub trait TenancyStore: Send + Sync {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn TenancyTx) -> Result<T, E>;
}

/// Row-level access inside one transaction.
///
/// Inserts enforce primary-key uniqueness and parent foreign keys. Lease
/// writes additionally enforce the occupancy exclusion constraint (no two
/// live leases in the same scope with overlapping terms), and tenant lease
/// inserts the (`tenant_id`, `lease_id`) unique constraint.
pub trait TenancyTx {
    fn landlord(&self, id: &LandlordId) -> Result<Option<Landlord>, StoreError>;
    fn insert_landlord(&mut self, landlord: Landlord) -> Result<(), StoreError>;
    fn update_landlord(&mut self, landlord: Landlord) -> Result<(), StoreError>;

    fn property(&self, id: &PropertyId) -> Result<Option<Property>, StoreError>;
    fn properties_owned_by(&self, owner_id: &LandlordId) -> Result<Vec<Property>, StoreError>;
    fn properties(&self) -> Result<Vec<Property>, StoreError>;
    fn insert_property(&mut self, property: Property) -> Result<(), StoreError>;
    fn update_property(&mut self, property: Property) -> Result<(), StoreError>;

    fn unit(&self, id: &UnitId) -> Result<Option<Unit>, StoreError>;
    fn units_in(&self, property_id: &PropertyId) -> Result<Vec<Unit>, StoreError>;
    fn insert_unit(&mut self, unit: Unit) -> Result<(), StoreError>;
    fn update_unit(&mut self, unit: Unit) -> Result<(), StoreError>;

    fn tenant(&self, id: &TenantId) -> Result<Option<Tenant>, StoreError>;
    fn insert_tenant(&mut self, tenant: Tenant) -> Result<(), StoreError>;

    fn lease(&self, id: &LeaseId) -> Result<Option<Lease>, StoreError>;
    fn leases_on(&self, property_id: &PropertyId) -> Result<Vec<Lease>, StoreError>;
    fn leases_with_status(&self, status: LeaseStatus) -> Result<Vec<Lease>, StoreError>;
    fn leases_for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Lease>, StoreError>;
    fn insert_lease(&mut self, lease: Lease) -> Result<(), StoreError>;
    fn update_lease(&mut self, lease: Lease) -> Result<(), StoreError>;

    fn tenant_lease(
        &self,
        tenant_id: &TenantId,
        lease_id: &LeaseId,
    ) -> Result<Option<TenantLease>, StoreError>;
    fn tenant_leases_for(&self, lease_id: &LeaseId) -> Result<Vec<TenantLease>, StoreError>;
    fn insert_tenant_lease(&mut self, row: TenantLease) -> Result<(), StoreError>;
    fn delete_tenant_lease(&mut self, id: &TenantLeaseId) -> Result<(), StoreError>;
}
