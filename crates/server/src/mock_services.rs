//! Mock collaborator services backed by the customer dataset.
//!
//! Endpoints:
//! - `GET  /api/crm/customer/{id}`: customer profile
//! - `GET  /api/crm/customer/phone/{phone}`: customer profile by phone number
//! - `POST /api/crm/verify-kyc`: phone/address match check
//! - `GET  /api/crm/customers/list`: customer directory
//! - `GET  /api/credit-bureau/score/{id}`: score and rating
//! - `GET  /api/credit-bureau/report/{id}`: full credit report
//! - `GET  /api/offers/preapproved/{id}`: pre-approved offer tiers
//! - `POST /api/offers/calculate-emi`: amortization for given terms
//! - `GET  /api/offers/interest-rates`: rate slabs by score band
//!
//! Every response is wrapped in a `{success, data}` envelope; failures carry `{success, error}`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

use loanline_core::domain::customer::{
    CreditReport, CustomerId, CustomerProfile, KycRequest, KycResult, OfferCatalog,
};
use loanline_core::underwriting::Amortization;
use loanline_store::{offer_catalog, rate_slabs, CustomerDataset, RateSlab};

#[derive(Clone)]
pub struct MockServicesState {
    dataset: Arc<CustomerDataset>,
}

#[derive(Debug, Serialize)]
pub struct ServiceResponse<T> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ServiceError {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct CustomerListing {
    pub customer_id: CustomerId,
    pub name: String,
    pub city: String,
    pub credit_score: u32,
    pub pre_approved_limit: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CreditScoreSummary {
    pub customer_id: CustomerId,
    pub credit_score: u32,
    pub max_score: u32,
    pub rating: String,
    pub risk_category: String,
}

#[derive(Debug, Deserialize)]
pub struct EmiRequest {
    pub principal: f64,
    pub annual_rate: f64,
    pub tenure_months: u32,
}

type ServiceResult<T> = Result<Json<ServiceResponse<T>>, (StatusCode, Json<ServiceError>)>;

pub fn router(dataset: Arc<CustomerDataset>) -> Router {
    Router::new()
        .route("/api/crm/customer/{id}", get(customer))
        .route("/api/crm/customer/phone/{phone}", get(customer_by_phone))
        .route("/api/crm/verify-kyc", post(verify_kyc))
        .route("/api/crm/customers/list", get(list_customers))
        .route("/api/credit-bureau/score/{id}", get(credit_score))
        .route("/api/credit-bureau/report/{id}", get(credit_report))
        .route("/api/offers/preapproved/{id}", get(preapproved_offers))
        .route("/api/offers/calculate-emi", post(calculate_emi))
        .route("/api/offers/interest-rates", get(interest_rates))
        .with_state(MockServicesState { dataset })
}

fn ok<T>(data: T) -> ServiceResult<T> {
    Ok(Json(ServiceResponse { success: true, data }))
}

fn failure(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ServiceError>) {
    (status, Json(ServiceError { success: false, error: error.into() }))
}

fn customer_not_found() -> (StatusCode, Json<ServiceError>) {
    failure(StatusCode::NOT_FOUND, "Customer not found")
}

async fn customer(
    Path(id): Path<String>,
    State(state): State<MockServicesState>,
) -> ServiceResult<CustomerProfile> {
    let profile = state.dataset.find(&CustomerId::new(id)).ok_or_else(customer_not_found)?;
    ok(profile.clone())
}

async fn customer_by_phone(
    Path(phone): Path<String>,
    State(state): State<MockServicesState>,
) -> ServiceResult<CustomerProfile> {
    let profile = state.dataset.find_by_phone(&phone).ok_or_else(customer_not_found)?;
    ok(profile.clone())
}

async fn verify_kyc(
    State(state): State<MockServicesState>,
    Json(request): Json<KycRequest>,
) -> ServiceResult<KycResult> {
    let profile = state.dataset.find(&request.customer_id).ok_or_else(customer_not_found)?;
    let result = KycResult::evaluate(profile, &request);
    info!(
        event_name = "mock.kyc_checked",
        customer_id = %request.customer_id,
        verified = result.verified,
        "kyc match check served"
    );
    ok(result)
}

async fn list_customers(
    State(state): State<MockServicesState>,
) -> ServiceResult<Vec<CustomerListing>> {
    let customers = state
        .dataset
        .customers()
        .iter()
        .map(|profile| CustomerListing {
            customer_id: profile.customer_id.clone(),
            name: profile.name.clone(),
            city: profile.city.clone(),
            credit_score: profile.credit_score,
            pre_approved_limit: profile.pre_approved_limit,
        })
        .collect();
    ok(customers)
}

async fn credit_score(
    Path(id): Path<String>,
    State(state): State<MockServicesState>,
) -> ServiceResult<CreditScoreSummary> {
    let report = report_for(&state, id)?;
    ok(CreditScoreSummary {
        customer_id: report.customer_id,
        credit_score: report.credit_score,
        max_score: report.max_score,
        rating: report.rating.label().to_owned(),
        risk_category: report.risk_category,
    })
}

async fn credit_report(
    Path(id): Path<String>,
    State(state): State<MockServicesState>,
) -> ServiceResult<CreditReport> {
    ok(report_for(&state, id)?)
}

fn report_for(
    state: &MockServicesState,
    id: String,
) -> Result<CreditReport, (StatusCode, Json<ServiceError>)> {
    let profile = state.dataset.find(&CustomerId::new(id)).ok_or_else(customer_not_found)?;
    Ok(CreditReport::for_profile(profile, Local::now().date_naive()))
}

async fn preapproved_offers(
    Path(id): Path<String>,
    State(state): State<MockServicesState>,
) -> ServiceResult<OfferCatalog> {
    let profile = state.dataset.find(&CustomerId::new(id)).ok_or_else(customer_not_found)?;
    ok(offer_catalog(profile, Local::now().date_naive()))
}

async fn calculate_emi(Json(request): Json<EmiRequest>) -> Response {
    match Amortization::compute(request.principal, request.annual_rate, request.tenure_months) {
        Ok(schedule) => ok(schedule).into_response(),
        Err(error) => failure(StatusCode::BAD_REQUEST, error.to_string()).into_response(),
    }
}

async fn interest_rates() -> ServiceResult<Vec<RateSlab>> {
    ok(rate_slabs())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use loanline_store::CustomerDataset;

    use super::router;

    fn app() -> Router {
        router(Arc::new(CustomerDataset::embedded().expect("embedded dataset")))
    }

    async fn call(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.expect("router responds");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body readable");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request builds")
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn customer_lookup_wraps_profile_in_envelope() {
        let (status, body) = call(get("/api/crm/customer/CUST001")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Rajesh Kumar");
        assert_eq!(body["data"]["pre_approved_limit"], 300000.0);

        let (status, body) = call(get("/api/crm/customer/phone/+91-9876543210")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["customer_id"], "CUST001");
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found() {
        let (status, body) = call(get("/api/credit-bureau/score/CUST404")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Customer not found");
    }

    #[tokio::test]
    async fn credit_score_carries_rating_band() {
        let (status, body) = call(get("/api/credit-bureau/score/CUST001")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["credit_score"], 780);
        assert_eq!(body["data"]["max_score"], 900);
        assert_eq!(body["data"]["rating"], "Very Good");
    }

    #[tokio::test]
    async fn preapproved_offers_list_tiers() {
        let (status, body) = call(get("/api/offers/preapproved/CUST003")).await;
        assert_eq!(status, StatusCode::OK);
        let offers = body["data"]["offers"].as_array().expect("offers array");
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0]["tier"], "Instant Approval");
        assert_eq!(offers[1]["max_amount"], 200000.0);
        assert_eq!(offers[1]["interest_rate"], 11.5);
    }

    #[tokio::test]
    async fn kyc_check_reports_field_matches() {
        let (status, body) = call(post(
            "/api/crm/verify-kyc",
            serde_json::json!({"customer_id": "CUST001", "phone": "+91 98765 43210"}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["verified"], true);

        let (_, body) = call(post(
            "/api/crm/verify-kyc",
            serde_json::json!({"customer_id": "CUST001", "address": "Park Street, Kolkata"}),
        ))
        .await;
        assert_eq!(body["data"]["verified"], false);
    }

    #[tokio::test]
    async fn emi_calculator_validates_terms() {
        let (status, body) = call(post(
            "/api/offers/calculate-emi",
            serde_json::json!({"principal": 150000, "annual_rate": 11.5, "tenure_months": 24}),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["monthly_emi"], 7026.05);

        let (status, body) = call(post(
            "/api/offers/calculate-emi",
            serde_json::json!({"principal": -5, "annual_rate": 11.5, "tenure_months": 24}),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn directory_and_rate_slabs_are_listed() {
        let (_, body) = call(get("/api/crm/customers/list")).await;
        assert_eq!(body["data"].as_array().map(Vec::len), Some(10));

        let (_, body) = call(get("/api/offers/interest-rates")).await;
        assert_eq!(body["data"][0]["category"], "Premium");
    }
}
