use chrono::{Duration, NaiveDate, Utc};
use clap::Args;
use leasehold::config::AppConfig;
use leasehold::error::AppError;
use leasehold::tenancy::{
    write_rent_roll, ConflictReason, FixedClock, Landlord, Lease, MemoryStore, NewLandlord,
    NewLease, NewProperty, NewTenant, NewUnit, PostalAddress, Property, TenancyError,
    TenancyService, Tenant, Unit,
};
use std::sync::Arc;

type DemoService = TenancyService<MemoryStore>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Calendar day the demo treats as today (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the rent roll as CSV at the end of the walkthrough.
    #[arg(long)]
    pub(crate) rent_roll: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct SweepArgs {
    /// Day to evaluate expiry against (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExpiringReportArgs {
    /// Look-ahead window in days. Defaults to APP_EXPIRING_WINDOW_DAYS.
    #[arg(long)]
    pub(crate) within_days: Option<u32>,
    /// Emit CSV instead of a plain listing.
    #[arg(long)]
    pub(crate) csv: bool,
}

/// Sample portfolio: one landlord, one property with three units, and a lease
/// per unit at different points of the lifecycle.
pub(crate) struct DemoPortfolio {
    pub(crate) landlord: Landlord,
    pub(crate) property: Property,
    pub(crate) units: Vec<Unit>,
    pub(crate) tenants: Vec<Tenant>,
    pub(crate) leases: Vec<Lease>,
}

fn service_on(store: &Arc<MemoryStore>, today: NaiveDate) -> DemoService {
    TenancyService::with_clock(Arc::clone(store), Arc::new(FixedClock::new(today)))
}

/// Seed relative to `service.today()`: unit 101 ends in 29 days, unit 102 runs
/// for most of a year, unit 203 is drafted to start in two weeks.
pub(crate) fn seed_portfolio(service: &DemoService) -> Result<DemoPortfolio, TenancyError> {
    let today = service.today();

    let landlord = service.create_landlord(NewLandlord {
        name: "Acme Property Group".to_string(),
    })?;
    let property = service.create_property(NewProperty {
        owner_id: landlord.id.clone(),
        name: "Parkview Apartments".to_string(),
        address: PostalAddress {
            address_line1: "2200 Park Ave".to_string(),
            address_line2: None,
            city: "Des Moines".to_string(),
            state: "IA".to_string(),
            zip: "50321".to_string(),
        },
    })?;

    let mut units = Vec::new();
    for name in ["101", "102", "203"] {
        units.push(service.create_unit(
            &property.id,
            NewUnit {
                name: name.to_string(),
            },
        )?);
    }

    let mut tenants = Vec::new();
    for name in ["Sarah Johnson", "Miguel Ortiz", "Priya Patel"] {
        tenants.push(service.create_tenant(NewTenant {
            name: name.to_string(),
        })?);
    }

    let terms = [
        (today - Duration::days(335), today + Duration::days(29), true),
        (today - Duration::days(30), today + Duration::days(335), true),
        (today + Duration::days(14), today + Duration::days(379), false),
    ];
    let mut leases = Vec::new();
    for ((unit, tenant), (start, end, activate)) in units.iter().zip(&tenants).zip(terms) {
        let lease = service.create_lease(NewLease {
            property_id: property.id.clone(),
            unit_id: Some(unit.id.clone()),
            tenant_id: tenant.id.clone(),
            start_date: start,
            end_date: end,
            rent: 1150,
            deposit: 1150,
        })?;
        let lease = if activate {
            service.activate_lease(&lease.id)?
        } else {
            lease
        };
        leases.push(lease);
    }

    Ok(DemoPortfolio {
        landlord,
        property,
        units,
        tenants,
        leases,
    })
}

fn print_lease(lease: &Lease, portfolio: &DemoPortfolio) {
    let unit = lease
        .unit_id
        .as_ref()
        .and_then(|id| portfolio.units.iter().find(|unit| &unit.id == id))
        .map_or("whole property", |unit| unit.name.as_str());
    let tenant = portfolio
        .tenants
        .iter()
        .find(|tenant| tenant.id == lease.tenant_id)
        .map_or("unknown tenant", |tenant| tenant.name.as_str());
    println!(
        "  - {} | unit {} | {} -> {} | {}",
        tenant, unit, lease.start_date, lease.end_date, lease.status
    );
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let store = Arc::new(MemoryStore::new());
    let service = service_on(&store, today);

    println!("Leasehold tenancy demo ({today})");
    let portfolio = seed_portfolio(&service)?;
    println!(
        "- {} owns {} ({} units)",
        portfolio.landlord.name,
        portfolio.property.name,
        portfolio.units.len()
    );
    println!("Leases:");
    for lease in &portfolio.leases {
        print_lease(lease, &portfolio);
    }

    let occupied_unit = &portfolio.units[1];
    let overlap = service.create_lease(NewLease {
        property_id: portfolio.property.id.clone(),
        unit_id: Some(occupied_unit.id.clone()),
        tenant_id: portfolio.tenants[2].id.clone(),
        start_date: today,
        end_date: today + Duration::days(90),
        rent: 1200,
        deposit: 1200,
    });
    match overlap {
        Err(TenancyError::Conflict(ConflictReason::OverlappingLease { existing })) => {
            println!(
                "\nDouble booking of unit {} refused (held by lease {existing})",
                occupied_unit.name
            )
        }
        Err(err) => println!("\nDouble booking refused: {err}"),
        Ok(lease) => println!("\nUnexpectedly accepted overlapping lease {}", lease.id),
    }

    let shared = &portfolio.leases[0];
    service.add_co_tenant(&shared.id, &portfolio.tenants[2].id)?;
    println!(
        "Added {} as co-tenant on unit {}",
        portfolio.tenants[2].name, portfolio.units[0].name
    );
    if let Err(err) = service.add_co_tenant(&shared.id, &portfolio.tenants[2].id) {
        println!("  Second add refused: {err}");
    }

    let expiring = service.list_expiring_leases(30)?;
    println!("\nExpiring within 30 days: {}", expiring.len());
    for lease in &expiring {
        print_lease(lease, &portfolio);
    }

    let after_term = today + Duration::days(30);
    let later = service_on(&store, after_term);
    let expired = later.sweep_expired(after_term)?;
    println!("\nSweep on {after_term}: {} lease(s) expired", expired.len());
    let vacant = later.vacant_units(after_term)?;
    let names: Vec<&str> = vacant.iter().map(|unit| unit.name.as_str()).collect();
    println!("Vacant units on {after_term}: {}", names.join(", "));

    if args.rent_roll {
        println!("\nRent roll:");
        let leases: Vec<Lease> = portfolio
            .leases
            .iter()
            .map(|lease| later.get_lease(&lease.id))
            .collect::<Result<_, _>>()?;
        write_rent_roll(std::io::stdout(), &leases)?;
    }

    Ok(())
}

pub(crate) fn run_sweep(args: SweepArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let store = Arc::new(MemoryStore::new());
    let portfolio = seed_portfolio(&service_on(&store, as_of - Duration::days(45)))?;

    let service = service_on(&store, as_of);
    let expired = service.sweep_expired(as_of)?;
    println!(
        "Expiry sweep as of {as_of}: {} of {} lease(s) expired",
        expired.len(),
        portfolio.leases.len()
    );
    for id in &expired {
        let lease = service.get_lease(id)?;
        print_lease(&lease, &portfolio);
    }
    Ok(())
}

pub(crate) fn run_expiring_report(args: ExpiringReportArgs) -> Result<(), AppError> {
    let within_days = match args.within_days {
        Some(days) => days,
        None => AppConfig::load()?.tenancy.expiring_window_days,
    };
    let today = Utc::now().date_naive();
    let store = Arc::new(MemoryStore::new());
    let service = service_on(&store, today);
    let portfolio = seed_portfolio(&service)?;

    let expiring = service.list_expiring_leases(within_days)?;
    if args.csv {
        write_rent_roll(std::io::stdout(), &expiring)?;
        return Ok(());
    }

    println!("Leases expiring within {within_days} days of {today}:");
    if expiring.is_empty() {
        println!("  (none)");
    }
    for lease in &expiring {
        print_lease(lease, &portfolio);
    }
    Ok(())
}
