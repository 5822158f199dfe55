use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{
    LandlordId, LeaseId, NewLandlord, NewLease, NewProperty, NewTenant, NewUnit, PropertyId,
    TenantId, UnitId,
};
use super::error::{TenancyError, TenancyResult};
use super::repository::TenancyStore;
use super::service::TenancyService;

/// Shared handler state: the service plus the default reporting window.
pub struct TenancyApi<S> {
    service: Arc<TenancyService<S>>,
    expiring_window_days: u32,
}

impl<S> Clone for TenancyApi<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            expiring_window_days: self.expiring_window_days,
        }
    }
}

/// Router builder exposing the tenancy service over JSON.
pub fn tenancy_router<S>(service: Arc<TenancyService<S>>, expiring_window_days: u32) -> Router
where
    S: TenancyStore + 'static,
{
    let state = TenancyApi {
        service,
        expiring_window_days,
    };

    Router::new()
        .route("/api/v1/landlords", post(create_landlord_handler::<S>))
        .route("/api/v1/landlords/:landlord_id", delete(delete_landlord_handler::<S>))
        .route("/api/v1/properties", post(create_property_handler::<S>))
        .route(
            "/api/v1/properties/:property_id",
            delete(delete_property_handler::<S>),
        )
        .route(
            "/api/v1/properties/:property_id/owner",
            post(reassign_property_handler::<S>),
        )
        .route(
            "/api/v1/properties/:property_id/units",
            post(create_unit_handler::<S>),
        )
        .route(
            "/api/v1/properties/:property_id/availability",
            get(availability_handler::<S>),
        )
        .route("/api/v1/tenants", post(create_tenant_handler::<S>))
        .route(
            "/api/v1/tenants/:tenant_id/leases",
            get(tenant_leases_handler::<S>),
        )
        .route("/api/v1/leases", post(create_lease_handler::<S>))
        .route("/api/v1/leases/:lease_id", get(get_lease_handler::<S>))
        .route(
            "/api/v1/leases/:lease_id/activate",
            post(activate_lease_handler::<S>),
        )
        .route(
            "/api/v1/leases/:lease_id/terminate",
            post(terminate_lease_handler::<S>),
        )
        .route(
            "/api/v1/leases/:lease_id/expiry",
            post(recompute_expiry_handler::<S>),
        )
        .route(
            "/api/v1/leases/:lease_id/co-tenants",
            get(co_tenants_handler::<S>).post(add_co_tenant_handler::<S>),
        )
        .route(
            "/api/v1/leases/:lease_id/co-tenants/:tenant_id",
            delete(remove_co_tenant_handler::<S>),
        )
        .route(
            "/api/v1/reports/expiring-leases",
            get(expiring_leases_handler::<S>),
        )
        .route(
            "/api/v1/reports/vacant-units",
            get(vacant_units_handler::<S>),
        )
        .with_state(state)
}

/// HTTP status used when surfacing a tenancy error.
pub fn status_for(err: &TenancyError) -> StatusCode {
    match err {
        TenancyError::NotFound { .. } => StatusCode::NOT_FOUND,
        TenancyError::Conflict(_) | TenancyError::InvalidTransition { .. } => StatusCode::CONFLICT,
        TenancyError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TenancyError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

pub(crate) fn error_response(err: TenancyError) -> Response {
    let payload = json!({
        "error": err.to_string(),
        "kind": err.kind(),
    });
    (status_for(&err), Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: TenancyResult<T>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => error_response(err),
    }
}

fn respond_empty(result: TenancyResult<()>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReassignRequest {
    pub(crate) owner_id: LandlordId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TerminateRequest {
    pub(crate) reason: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoTenantRequest {
    pub(crate) tenant_id: TenantId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityQuery {
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    #[serde(default)]
    pub(crate) unit_id: Option<UnitId>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AvailabilityView {
    pub(crate) property_id: PropertyId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) unit_id: Option<UnitId>,
    pub(crate) start_date: NaiveDate,
    pub(crate) end_date: NaiveDate,
    pub(crate) available: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsOfQuery {
    #[serde(default)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ExpiringQuery {
    #[serde(default)]
    pub(crate) within_days: Option<u32>,
}

pub(crate) async fn create_landlord_handler<S>(
    State(api): State<TenancyApi<S>>,
    Json(input): Json<NewLandlord>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(StatusCode::CREATED, api.service.create_landlord(input))
}

pub(crate) async fn delete_landlord_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(landlord_id): Path<String>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond_empty(api.service.delete_landlord(&LandlordId(landlord_id)))
}

pub(crate) async fn create_property_handler<S>(
    State(api): State<TenancyApi<S>>,
    Json(input): Json<NewProperty>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(StatusCode::CREATED, api.service.create_property(input))
}

pub(crate) async fn delete_property_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(property_id): Path<String>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond_empty(api.service.delete_property(&PropertyId(property_id)))
}

pub(crate) async fn reassign_property_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(property_id): Path<String>,
    Json(request): Json<ReassignRequest>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(
        StatusCode::OK,
        api.service
            .reassign_property(&PropertyId(property_id), &request.owner_id),
    )
}

pub(crate) async fn create_unit_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(property_id): Path<String>,
    Json(input): Json<NewUnit>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(
        StatusCode::CREATED,
        api.service.create_unit(&PropertyId(property_id), input),
    )
}

pub(crate) async fn availability_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(property_id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> Response
where
    S: TenancyStore + 'static,
{
    let property_id = PropertyId(property_id);
    let result = api
        .service
        .check_availability(
            &property_id,
            query.unit_id.as_ref(),
            query.start_date,
            query.end_date,
        )
        .map(|available| AvailabilityView {
            property_id: property_id.clone(),
            unit_id: query.unit_id.clone(),
            start_date: query.start_date,
            end_date: query.end_date,
            available,
        });
    respond(StatusCode::OK, result)
}

pub(crate) async fn create_tenant_handler<S>(
    State(api): State<TenancyApi<S>>,
    Json(input): Json<NewTenant>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(StatusCode::CREATED, api.service.create_tenant(input))
}

pub(crate) async fn tenant_leases_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(tenant_id): Path<String>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(
        StatusCode::OK,
        api.service.leases_for_tenant(&TenantId(tenant_id)),
    )
}

pub(crate) async fn create_lease_handler<S>(
    State(api): State<TenancyApi<S>>,
    Json(input): Json<NewLease>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(StatusCode::CREATED, api.service.create_lease(input))
}

pub(crate) async fn get_lease_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(lease_id): Path<String>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(StatusCode::OK, api.service.get_lease(&LeaseId(lease_id)))
}

pub(crate) async fn activate_lease_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(lease_id): Path<String>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(StatusCode::OK, api.service.activate_lease(&LeaseId(lease_id)))
}

pub(crate) async fn terminate_lease_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(lease_id): Path<String>,
    Json(request): Json<TerminateRequest>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(
        StatusCode::OK,
        api.service
            .terminate_lease(&LeaseId(lease_id), &request.reason),
    )
}

pub(crate) async fn recompute_expiry_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(lease_id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: TenancyStore + 'static,
{
    let as_of = query.as_of.unwrap_or_else(|| api.service.today());
    respond(
        StatusCode::OK,
        api.service.recompute_expiry(&LeaseId(lease_id), as_of),
    )
}

pub(crate) async fn co_tenants_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(lease_id): Path<String>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(StatusCode::OK, api.service.co_tenants(&LeaseId(lease_id)))
}

pub(crate) async fn add_co_tenant_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path(lease_id): Path<String>,
    Json(request): Json<CoTenantRequest>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond(
        StatusCode::CREATED,
        api.service
            .add_co_tenant(&LeaseId(lease_id), &request.tenant_id),
    )
}

pub(crate) async fn remove_co_tenant_handler<S>(
    State(api): State<TenancyApi<S>>,
    Path((lease_id, tenant_id)): Path<(String, String)>,
) -> Response
where
    S: TenancyStore + 'static,
{
    respond_empty(
        api.service
            .remove_co_tenant(&LeaseId(lease_id), &TenantId(tenant_id)),
    )
}

pub(crate) async fn expiring_leases_handler<S>(
    State(api): State<TenancyApi<S>>,
    Query(query): Query<ExpiringQuery>,
) -> Response
where
    S: TenancyStore + 'static,
{
    let within_days = query.within_days.unwrap_or(api.expiring_window_days);
    respond(StatusCode::OK, api.service.list_expiring_leases(within_days))
}

pub(crate) async fn vacant_units_handler<S>(
    State(api): State<TenancyApi<S>>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: TenancyStore + 'static,
{
    let as_of = query.as_of.unwrap_or_else(|| api.service.today());
    respond(StatusCode::OK, api.service.vacant_units(as_of))
}
