use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::domain::{
    EntityKind, Landlord, LandlordId, Lease, LeaseId, LeaseStatus, Property, PropertyId, Tenant,
    TenantId, TenantLease, TenantLeaseId, Unit, UnitId,
};
use super::repository::{StoreError, TenancyStore, TenancyTx};

pub const LEASE_OCCUPANCY_EXCLUSION: &str = "leases_occupancy_excl";
pub const TENANT_LEASE_PAIR_UNIQUE: &str = "tenant_leases_tenant_id_lease_id_key";

#[derive(Debug, Default, Clone)]
struct Tables {
    landlords: BTreeMap<LandlordId, Landlord>,
    properties: BTreeMap<PropertyId, Property>,
    units: BTreeMap<UnitId, Unit>,
    tenants: BTreeMap<TenantId, Tenant>,
    leases: BTreeMap<LeaseId, Lease>,
    tenant_leases: BTreeMap<TenantLeaseId, TenantLease>,
}

/// In-memory relational store.
///
/// A transaction holds the table lock for its whole duration and works on a
/// private copy of the tables, which replaces the committed state only when
/// the closure succeeds.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TenancyStore for MemoryStore {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn TenancyTx) -> Result<T, E>,
    {
        let mut committed = self
            .tables
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;

        let mut tx = MemoryTx {
            tables: committed.clone(),
        };
        let value = work(&mut tx)?;
        *committed = tx.tables;
        Ok(value)
    }
}

struct MemoryTx {
    tables: Tables,
}

fn missing(entity: EntityKind, id: impl ToString) -> StoreError {
    StoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

impl MemoryTx {
    fn check_lease_row(&self, lease: &Lease) -> Result<(), StoreError> {
        if !self.tables.properties.contains_key(&lease.property_id) {
            return Err(StoreError::ForeignKeyViolation("leases_property_id_fkey"));
        }
        if !self.tables.tenants.contains_key(&lease.tenant_id) {
            return Err(StoreError::ForeignKeyViolation("leases_tenant_id_fkey"));
        }
        if let Some(unit_id) = &lease.unit_id {
            if !self.tables.units.contains_key(unit_id) {
                return Err(StoreError::ForeignKeyViolation("leases_unit_id_fkey"));
            }
        }

        let excluded = self
            .tables
            .leases
            .values()
            .any(|other| lease.contends_with(other));
        if excluded {
            return Err(StoreError::ExclusionViolation(LEASE_OCCUPANCY_EXCLUSION));
        }
        Ok(())
    }
}

impl TenancyTx for MemoryTx {
    fn landlord(&self, id: &LandlordId) -> Result<Option<Landlord>, StoreError> {
        Ok(self.tables.landlords.get(id).cloned())
    }

    fn insert_landlord(&mut self, landlord: Landlord) -> Result<(), StoreError> {
        if self.tables.landlords.contains_key(&landlord.id) {
            return Err(StoreError::UniqueViolation("landlords_pkey"));
        }
        self.tables.landlords.insert(landlord.id.clone(), landlord);
        Ok(())
    }

    fn update_landlord(&mut self, landlord: Landlord) -> Result<(), StoreError> {
        match self.tables.landlords.get_mut(&landlord.id) {
            Some(row) => {
                *row = landlord;
                Ok(())
            }
            None => Err(missing(EntityKind::Landlord, &landlord.id)),
        }
    }

    fn property(&self, id: &PropertyId) -> Result<Option<Property>, StoreError> {
        Ok(self.tables.properties.get(id).cloned())
    }

    fn properties_owned_by(&self, owner_id: &LandlordId) -> Result<Vec<Property>, StoreError> {
        Ok(self
            .tables
            .properties
            .values()
            .filter(|property| &property.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn properties(&self) -> Result<Vec<Property>, StoreError> {
        Ok(self.tables.properties.values().cloned().collect())
    }

    fn insert_property(&mut self, property: Property) -> Result<(), StoreError> {
        if self.tables.properties.contains_key(&property.id) {
            return Err(StoreError::UniqueViolation("properties_pkey"));
        }
        if !self.tables.landlords.contains_key(&property.owner_id) {
            return Err(StoreError::ForeignKeyViolation("properties_owner_id_fkey"));
        }
        self.tables.properties.insert(property.id.clone(), property);
        Ok(())
    }

    fn update_property(&mut self, property: Property) -> Result<(), StoreError> {
        if !self.tables.landlords.contains_key(&property.owner_id) {
            return Err(StoreError::ForeignKeyViolation("properties_owner_id_fkey"));
        }
        match self.tables.properties.get_mut(&property.id) {
            Some(row) => {
                *row = property;
                Ok(())
            }
            None => Err(missing(EntityKind::Property, &property.id)),
        }
    }

    fn unit(&self, id: &UnitId) -> Result<Option<Unit>, StoreError> {
        Ok(self.tables.units.get(id).cloned())
    }

    fn units_in(&self, property_id: &PropertyId) -> Result<Vec<Unit>, StoreError> {
        Ok(self
            .tables
            .units
            .values()
            .filter(|unit| &unit.property_id == property_id)
            .cloned()
            .collect())
    }

    fn insert_unit(&mut self, unit: Unit) -> Result<(), StoreError> {
        if self.tables.units.contains_key(&unit.id) {
            return Err(StoreError::UniqueViolation("units_pkey"));
        }
        if !self.tables.properties.contains_key(&unit.property_id) {
            return Err(StoreError::ForeignKeyViolation("units_property_id_fkey"));
        }
        self.tables.units.insert(unit.id.clone(), unit);
        Ok(())
    }

    fn update_unit(&mut self, unit: Unit) -> Result<(), StoreError> {
        match self.tables.units.get_mut(&unit.id) {
            Some(row) => {
                *row = unit;
                Ok(())
            }
            None => Err(missing(EntityKind::Unit, &unit.id)),
        }
    }

    fn tenant(&self, id: &TenantId) -> Result<Option<Tenant>, StoreError> {
        Ok(self.tables.tenants.get(id).cloned())
    }

    fn insert_tenant(&mut self, tenant: Tenant) -> Result<(), StoreError> {
        if self.tables.tenants.contains_key(&tenant.id) {
            return Err(StoreError::UniqueViolation("tenants_pkey"));
        }
        self.tables.tenants.insert(tenant.id.clone(), tenant);
        Ok(())
    }

    fn lease(&self, id: &LeaseId) -> Result<Option<Lease>, StoreError> {
        Ok(self.tables.leases.get(id).cloned())
    }

    fn leases_on(&self, property_id: &PropertyId) -> Result<Vec<Lease>, StoreError> {
        Ok(self
            .tables
            .leases
            .values()
            .filter(|lease| &lease.property_id == property_id)
            .cloned()
            .collect())
    }

    fn leases_with_status(&self, status: LeaseStatus) -> Result<Vec<Lease>, StoreError> {
        Ok(self
            .tables
            .leases
            .values()
            .filter(|lease| lease.status == status)
            .cloned()
            .collect())
    }

    fn leases_for_tenant(&self, tenant_id: &TenantId) -> Result<Vec<Lease>, StoreError> {
        Ok(self
            .tables
            .leases
            .values()
            .filter(|lease| {
                lease.involves(tenant_id)
                    || self
                        .tables
                        .tenant_leases
                        .values()
                        .any(|row| &row.tenant_id == tenant_id && row.lease_id == lease.id)
            })
            .cloned()
            .collect())
    }

    fn insert_lease(&mut self, lease: Lease) -> Result<(), StoreError> {
        if self.tables.leases.contains_key(&lease.id) {
            return Err(StoreError::UniqueViolation("leases_pkey"));
        }
        self.check_lease_row(&lease)?;
        self.tables.leases.insert(lease.id.clone(), lease);
        Ok(())
    }

    fn update_lease(&mut self, lease: Lease) -> Result<(), StoreError> {
        if !self.tables.leases.contains_key(&lease.id) {
            return Err(missing(EntityKind::Lease, &lease.id));
        }
        self.check_lease_row(&lease)?;
        self.tables.leases.insert(lease.id.clone(), lease);
        Ok(())
    }

    fn tenant_lease(
        &self,
        tenant_id: &TenantId,
        lease_id: &LeaseId,
    ) -> Result<Option<TenantLease>, StoreError> {
        Ok(self
            .tables
            .tenant_leases
            .values()
            .find(|row| &row.tenant_id == tenant_id && &row.lease_id == lease_id)
            .cloned())
    }

    fn tenant_leases_for(&self, lease_id: &LeaseId) -> Result<Vec<TenantLease>, StoreError> {
        Ok(self
            .tables
            .tenant_leases
            .values()
            .filter(|row| &row.lease_id == lease_id)
            .cloned()
            .collect())
    }

    fn insert_tenant_lease(&mut self, row: TenantLease) -> Result<(), StoreError> {
        if self.tables.tenant_leases.contains_key(&row.id) {
            return Err(StoreError::UniqueViolation("tenant_leases_pkey"));
        }
        if !self.tables.tenants.contains_key(&row.tenant_id) {
            return Err(StoreError::ForeignKeyViolation("tenant_leases_tenant_id_fkey"));
        }
        if !self.tables.leases.contains_key(&row.lease_id) {
            return Err(StoreError::ForeignKeyViolation("tenant_leases_lease_id_fkey"));
        }
        let duplicate = self.tables.tenant_leases.values().any(|existing| {
            existing.tenant_id == row.tenant_id && existing.lease_id == row.lease_id
        });
        if duplicate {
            return Err(StoreError::UniqueViolation(TENANT_LEASE_PAIR_UNIQUE));
        }
        self.tables.tenant_leases.insert(row.id.clone(), row);
        Ok(())
    }

    fn delete_tenant_lease(&mut self, id: &TenantLeaseId) -> Result<(), StoreError> {
        self.tables
            .tenant_leases
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| missing(EntityKind::TenantLease, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    use crate::tenancy::domain::PostalAddress;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn seed(tx: &mut dyn TenancyTx) -> Result<(PropertyId, TenantId), StoreError> {
        let now = Utc::now();
        let landlord = Landlord {
            id: LandlordId::from("landlord-1"),
            name: "Acme".to_string(),
            created_at: now,
            updated_at: now,
            archived_at: None,
        };
        let property = Property {
            id: PropertyId::from("property-1"),
            name: "Parkview".to_string(),
            address: PostalAddress {
                address_line1: "1 Park Ave".to_string(),
                address_line2: None,
                city: "Des Moines".to_string(),
                state: "IA".to_string(),
                zip: "50309".to_string(),
            },
            owner_id: landlord.id.clone(),
            created_at: now,
            updated_at: now,
            archived_at: None,
        };
        let tenant = Tenant {
            id: TenantId::from("tenant-1"),
            name: "Sarah".to_string(),
            created_at: now,
            updated_at: now,
        };
        let ids = (property.id.clone(), tenant.id.clone());
        tx.insert_landlord(landlord)?;
        tx.insert_property(property)?;
        tx.insert_tenant(tenant)?;
        Ok(ids)
    }

    fn lease(
        id: &str,
        property_id: &PropertyId,
        tenant_id: &TenantId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Lease {
        let now = Utc::now();
        Lease {
            id: LeaseId::from(id),
            property_id: property_id.clone(),
            unit_id: None,
            tenant_id: tenant_id.clone(),
            start_date: start,
            end_date: end,
            rent: 1200,
            deposit: 1800,
            status: LeaseStatus::Pending,
            termination_reason: None,
            terminated_on: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn failed_transaction_rolls_back_every_write() {
        let store = MemoryStore::new();

        let result: Result<(), StoreError> = store.transaction(|tx| {
            seed(tx)?;
            Err(StoreError::Unavailable("simulated abort".to_string()))
        });
        assert!(result.is_err());

        let landlord = store
            .transaction(|tx| tx.landlord(&LandlordId::from("landlord-1")))
            .expect("read succeeds");
        assert!(landlord.is_none(), "aborted insert must not be visible");
    }

    #[test]
    fn exclusion_constraint_rejects_overlapping_live_leases() {
        let store = MemoryStore::new();
        let (property_id, tenant_id) = store.transaction(seed).expect("seed");

        store
            .transaction(|tx| {
                tx.insert_lease(lease(
                    "lease-a",
                    &property_id,
                    &tenant_id,
                    day(2024, 1, 1),
                    day(2024, 12, 31),
                ))
            })
            .expect("first lease inserts");

        let err = store
            .transaction(|tx| {
                tx.insert_lease(lease(
                    "lease-b",
                    &property_id,
                    &tenant_id,
                    day(2024, 6, 1),
                    day(2024, 6, 30),
                ))
            })
            .expect_err("overlap is excluded");
        assert_eq!(err, StoreError::ExclusionViolation(LEASE_OCCUPANCY_EXCLUSION));
    }

    #[test]
    fn tenant_lease_pairs_are_unique() {
        let store = MemoryStore::new();
        let (property_id, tenant_id) = store.transaction(seed).expect("seed");
        let lease_id = LeaseId::from("lease-a");

        store
            .transaction(|tx| {
                tx.insert_lease(lease(
                    "lease-a",
                    &property_id,
                    &tenant_id,
                    day(2024, 1, 1),
                    day(2024, 12, 31),
                ))
            })
            .expect("lease inserts");

        let row = |id: &str| TenantLease {
            id: TenantLeaseId::from(id),
            tenant_id: tenant_id.clone(),
            lease_id: lease_id.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        store
            .transaction(|tx| tx.insert_tenant_lease(row("tl-1")))
            .expect("first pairing inserts");
        let err = store
            .transaction(|tx| tx.insert_tenant_lease(row("tl-2")))
            .expect_err("duplicate pairing rejected");
        assert_eq!(err, StoreError::UniqueViolation(TENANT_LEASE_PAIR_UNIQUE));
    }

    #[test]
    fn foreign_keys_are_enforced_on_insert() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let orphan = Unit {
            id: UnitId::from("unit-1"),
            property_id: PropertyId::from("missing"),
            name: "Unit 203".to_string(),
            created_at: now,
            updated_at: now,
            archived_at: None,
        };

        let err = store
            .transaction(|tx| tx.insert_unit(orphan))
            .expect_err("orphan unit rejected");
        assert_eq!(err, StoreError::ForeignKeyViolation("units_property_id_fkey"));
    }
}
