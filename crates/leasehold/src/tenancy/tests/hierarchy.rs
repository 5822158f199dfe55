use super::common::*;

use crate::tenancy::{
    ConflictReason, EntityKind, LandlordId, LeaseStatus, NewLandlord, NewProperty, NewUnit,
    TenancyError, ValidationError,
};

#[test]
fn property_requires_an_existing_landlord() {
    let service = build_service();

    let err = service
        .create_property(NewProperty {
            owner_id: LandlordId::from("ghost"),
            name: "Parkview".to_string(),
            address: address(),
        })
        .expect_err("unknown owner rejected");

    assert!(matches!(
        err,
        TenancyError::NotFound {
            entity: EntityKind::Landlord,
            ..
        }
    ));
}

#[test]
fn blank_names_fail_validation() {
    let service = build_service();

    let err = service
        .create_landlord(NewLandlord {
            name: "   ".to_string(),
        })
        .expect_err("blank name rejected");
    assert!(matches!(
        err,
        TenancyError::Validation(ValidationError::BlankField("name"))
    ));

    let portfolio = seed(&service);
    let mut address = address();
    address.city = String::new();
    let err = service
        .create_property(NewProperty {
            owner_id: portfolio.landlord.id.clone(),
            name: "Riverside".to_string(),
            address,
        })
        .expect_err("blank city rejected");
    assert!(matches!(
        err,
        TenancyError::Validation(ValidationError::BlankField("city"))
    ));
}

#[test]
fn names_are_trimmed_on_create() {
    let service = build_service();
    let landlord = service
        .create_landlord(NewLandlord {
            name: "  Acme Holdings ".to_string(),
        })
        .expect("landlord created");
    assert_eq!(landlord.name, "Acme Holdings");
}

#[test]
fn landlord_with_properties_cannot_be_deleted() {
    let service = build_service();
    let portfolio = seed(&service);

    let err = service
        .delete_landlord(&portfolio.landlord.id)
        .expect_err("owner of a property");
    assert!(matches!(
        err,
        TenancyError::Conflict(ConflictReason::LandlordOwnsProperties { count: 1 })
    ));

    service
        .delete_property(&portfolio.property.id)
        .expect("empty property archived");
    service
        .delete_landlord(&portfolio.landlord.id)
        .expect("landlord archived once properties are gone");

    let err = service
        .create_property(NewProperty {
            owner_id: portfolio.landlord.id.clone(),
            name: "Riverside".to_string(),
            address: address(),
        })
        .expect_err("archived landlord is absent");
    assert!(matches!(err, TenancyError::NotFound { .. }));
}

#[test]
fn reassigning_ownership_frees_the_previous_landlord() {
    let service = build_service();
    let portfolio = seed(&service);
    let buyer = service
        .create_landlord(NewLandlord {
            name: "Birch Partners".to_string(),
        })
        .expect("buyer created");

    let property = service
        .reassign_property(&portfolio.property.id, &buyer.id)
        .expect("ownership moved");
    assert_eq!(property.owner_id, buyer.id);

    service
        .delete_landlord(&portfolio.landlord.id)
        .expect("seller no longer owns anything");
    let err = service
        .reassign_property(&portfolio.property.id, &portfolio.landlord.id)
        .expect_err("archived landlord cannot take ownership");
    assert!(matches!(
        err,
        TenancyError::NotFound {
            entity: EntityKind::Landlord,
            ..
        }
    ));
}

#[test]
fn property_with_live_lease_cannot_be_deleted() {
    let service = build_service();
    let portfolio = seed(&service);
    let lease = service
        .create_lease(lease_terms(&portfolio, day(2024, 2, 1), day(2024, 7, 31)))
        .expect("lease drafted");

    let err = service
        .delete_property(&portfolio.property.id)
        .expect_err("pending lease holds the property");
    assert!(matches!(
        err,
        TenancyError::Conflict(ConflictReason::PropertyHasLiveLeases { count: 1 })
    ));

    let terminated = service
        .terminate_lease(&lease.id, "applicant withdrew")
        .expect("lease terminated");
    assert_eq!(terminated.status, LeaseStatus::Inactive);
    service
        .delete_property(&portfolio.property.id)
        .expect("historical leases do not block deletion");
}

#[test]
fn deleting_a_property_archives_its_units() {
    let service = build_service();
    let portfolio = seed(&service);
    unit(&service, &portfolio, "101");
    unit(&service, &portfolio, "102");
    assert_eq!(
        service.vacant_units(today()).expect("report runs").len(),
        2
    );

    service
        .delete_property(&portfolio.property.id)
        .expect("property archived");

    assert!(service.vacant_units(today()).expect("report runs").is_empty());
    let err = service
        .create_unit(
            &portfolio.property.id,
            NewUnit {
                name: "103".to_string(),
            },
        )
        .expect_err("archived property is absent");
    assert!(matches!(
        err,
        TenancyError::NotFound {
            entity: EntityKind::Property,
            ..
        }
    ));
}

#[test]
fn lease_unit_must_belong_to_the_lease_property() {
    let service = build_service();
    let portfolio = seed(&service);
    let other = service
        .create_property(NewProperty {
            owner_id: portfolio.landlord.id.clone(),
            name: "Riverside".to_string(),
            address: address(),
        })
        .expect("second property");
    let foreign_unit = service
        .create_unit(
            &other.id,
            NewUnit {
                name: "R1".to_string(),
            },
        )
        .expect("unit created");

    let mut terms = lease_terms(&portfolio, day(2024, 2, 1), day(2024, 7, 31));
    terms.unit_id = Some(foreign_unit.id);
    let err = service.create_lease(terms).expect_err("unit outside property");
    assert!(matches!(
        err,
        TenancyError::Validation(ValidationError::UnitOutsideProperty { .. })
    ));
}

#[test]
fn store_outage_surfaces_as_store_error() {
    let service = unavailable_service();
    let err = service
        .create_landlord(NewLandlord {
            name: "Acme Holdings".to_string(),
        })
        .expect_err("store offline");
    assert!(matches!(err, TenancyError::Store(_)));
    assert_eq!(err.kind(), "store_unavailable");
}
