use std::sync::Arc;

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::tenancy::{
    tenancy_router, FixedClock, Landlord, Lease, MemoryStore, NewLandlord, NewLease, NewProperty,
    NewTenant, NewUnit, PostalAddress, Property, StoreError, TenancyService, TenancyStore,
    TenancyTx, Tenant, Unit,
};

pub(super) type Service = TenancyService<MemoryStore>;

pub(super) fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn today() -> NaiveDate {
    day(2024, 1, 15)
}

pub(super) fn service_on(today: NaiveDate) -> Service {
    TenancyService::with_clock(
        Arc::new(MemoryStore::new()),
        Arc::new(FixedClock::new(today)),
    )
}

pub(super) fn build_service() -> Service {
    service_on(today())
}

/// Second view over the same store with the calendar moved to `today`.
pub(super) fn later(service: &Service, today: NaiveDate) -> Service {
    TenancyService::with_clock(Arc::clone(service.store()), Arc::new(FixedClock::new(today)))
}

pub(super) fn address() -> PostalAddress {
    PostalAddress {
        address_line1: "100 Grand Ave".to_string(),
        address_line2: Some("Suite 2".to_string()),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip: "50309".to_string(),
    }
}

pub(super) struct Portfolio {
    pub(super) landlord: Landlord,
    pub(super) property: Property,
    pub(super) tenant: Tenant,
}

pub(super) fn seed(service: &Service) -> Portfolio {
    let landlord = service
        .create_landlord(NewLandlord {
            name: "Acme Holdings".to_string(),
        })
        .expect("landlord created");
    let property = service
        .create_property(NewProperty {
            owner_id: landlord.id.clone(),
            name: "Parkview".to_string(),
            address: address(),
        })
        .expect("property created");
    let tenant = tenant(service, "Sarah Lee");
    Portfolio {
        landlord,
        property,
        tenant,
    }
}

pub(super) fn tenant(service: &Service, name: &str) -> Tenant {
    service
        .create_tenant(NewTenant {
            name: name.to_string(),
        })
        .expect("tenant created")
}

pub(super) fn unit(service: &Service, portfolio: &Portfolio, name: &str) -> Unit {
    service
        .create_unit(
            &portfolio.property.id,
            NewUnit {
                name: name.to_string(),
            },
        )
        .expect("unit created")
}

pub(super) fn lease_terms(portfolio: &Portfolio, start: NaiveDate, end: NaiveDate) -> NewLease {
    NewLease {
        property_id: portfolio.property.id.clone(),
        unit_id: None,
        tenant_id: portfolio.tenant.id.clone(),
        start_date: start,
        end_date: end,
        rent: 1200,
        deposit: 1800,
    }
}

/// Drafts and activates a lease covering all of 2024.
pub(super) fn active_lease(service: &Service, portfolio: &Portfolio) -> Lease {
    let lease = service
        .create_lease(lease_terms(portfolio, day(2024, 1, 1), day(2024, 12, 31)))
        .expect("lease drafted");
    service.activate_lease(&lease.id).expect("lease activated")
}

pub(super) struct UnavailableStore;

impl TenancyStore for UnavailableStore {
    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut dyn TenancyTx) -> Result<T, E>,
    {
        Err(StoreError::Unavailable("database offline".to_string()).into())
    }
}

pub(super) fn unavailable_service() -> TenancyService<UnavailableStore> {
    TenancyService::with_clock(Arc::new(UnavailableStore), Arc::new(FixedClock::new(today())))
}

pub(super) fn router_with_service(service: Service) -> axum::Router {
    tenancy_router(Arc::new(service), 30)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
