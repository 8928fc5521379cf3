//! Fixture-backed collaborators: CRM, credit bureau, offer catalog and KYC matching over a
//! customer dataset. The dataset ships embedded and can be replaced by a JSON file.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use loanline_core::domain::customer::{
    normalize_phone, CreditReport, CustomerId, CustomerProfile, KycRequest, KycResult, LoanOffer,
    OfferCatalog,
};
use loanline_core::gateways::{
    CreditScoreGateway, CustomerProfileGateway, GatewayError, KycGateway, OfferCatalogGateway,
};

use crate::sessions::StoreError;

const EMBEDDED_CUSTOMERS: &str = include_str!("../data/customers.json");
const TENURE_OPTIONS: [u32; 5] = [12, 24, 36, 48, 60];
const OFFER_VALIDITY_DAYS: u64 = 30;
const ENHANCED_OFFER_MIN_SCORE: u32 = 700;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerDataset {
    customers: Vec<CustomerProfile>,
}

impl CustomerDataset {
    pub fn new(customers: Vec<CustomerProfile>) -> Self {
        Self { customers }
    }

    pub fn embedded() -> Result<Self, StoreError> {
        Self::from_json(EMBEDDED_CUSTOMERS)
    }

    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        serde_json::from_str(raw).map_err(|error| StoreError::Decode(error.to_string()))
    }

    pub fn from_path(path: &Path) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path).map_err(|error| {
            StoreError::Backend(format!("could not read `{}`: {error}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn customers(&self) -> &[CustomerProfile] {
        &self.customers
    }

    pub fn find(&self, id: &CustomerId) -> Option<&CustomerProfile> {
        self.customers.iter().find(|customer| customer.customer_id == *id)
    }

    pub fn find_by_phone(&self, phone: &str) -> Option<&CustomerProfile> {
        let wanted = normalize_phone(phone);
        self.customers.iter().find(|customer| normalize_phone(&customer.phone) == wanted)
    }
}

/// Annual rate for a customer and amount: score band base rate with a discount for large loans.
pub fn offer_rate(credit_score: u32, amount: f64) -> f64 {
    let base: f64 = match credit_score {
        800.. => 10.5,
        750..=799 => 11.5,
        700..=749 => 12.5,
        _ => 14.5,
    };
    let adjustment = if amount >= 500_000.0 {
        0.5
    } else if amount >= 300_000.0 {
        0.25
    } else {
        0.0
    };
    ((base - adjustment) * 100.0).round() / 100.0
}

/// Pre-approved tiers for a profile. Profiles without a limit have no offers.
pub fn offer_catalog(profile: &CustomerProfile, today: NaiveDate) -> OfferCatalog {
    let mut offers = Vec::new();
    if let Some(limit) = profile.pre_approved_limit {
        let instant_rate = offer_rate(profile.credit_score, limit);
        offers.push(LoanOffer {
            tier: "Instant Approval".to_owned(),
            max_amount: limit,
            interest_rate: instant_rate,
            tenure_options: TENURE_OPTIONS.to_vec(),
            processing_fee: 0.0,
            features: vec![
                "Instant approval - No documentation required".to_owned(),
                "Disbursal within 24 hours".to_owned(),
                format!("Special rate of {instant_rate}% p.a."),
            ],
        });

        if profile.credit_score >= ENHANCED_OFFER_MIN_SCORE {
            let enhanced_amount = limit * 2.0;
            let enhanced_rate = offer_rate(profile.credit_score, enhanced_amount);
            offers.push(LoanOffer {
                tier: "Enhanced Offer".to_owned(),
                max_amount: enhanced_amount,
                interest_rate: enhanced_rate,
                tenure_options: TENURE_OPTIONS.to_vec(),
                processing_fee: enhanced_amount * 0.01,
                features: vec![
                    "Salary slip verification required".to_owned(),
                    format!("Competitive rate of {enhanced_rate}% p.a."),
                    "Quick approval subject to income verification".to_owned(),
                ],
            });
        }
    }

    OfferCatalog {
        customer_id: profile.customer_id.clone(),
        customer_name: profile.name.clone(),
        credit_score: profile.credit_score,
        offers,
        valid_until: today.checked_add_days(Days::new(OFFER_VALIDITY_DAYS)).unwrap_or(today),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSlab {
    pub credit_score_range: String,
    pub rate: String,
    pub category: String,
}

pub fn rate_slabs() -> Vec<RateSlab> {
    [
        ("800-900", "10.5% - 11.0%", "Premium"),
        ("750-799", "11.5% - 12.0%", "Excellent"),
        ("700-749", "12.5% - 13.0%", "Good"),
        ("Below 700", "14.5% - 16.0%", "Standard"),
    ]
    .into_iter()
    .map(|(range, rate, category)| RateSlab {
        credit_score_range: range.to_owned(),
        rate: rate.to_owned(),
        category: category.to_owned(),
    })
    .collect()
}

#[derive(Clone)]
pub struct FixtureGateways {
    dataset: Arc<CustomerDataset>,
}

impl FixtureGateways {
    pub fn new(dataset: CustomerDataset) -> Self {
        Self { dataset: Arc::new(dataset) }
    }

    pub fn embedded() -> Result<Self, StoreError> {
        Ok(Self::new(CustomerDataset::embedded()?))
    }

    pub fn dataset(&self) -> &CustomerDataset {
        &self.dataset
    }

    fn profile(&self, id: &CustomerId) -> Result<&CustomerProfile, GatewayError> {
        self.dataset.find(id).ok_or_else(|| GatewayError::not_found("customer", id.as_str()))
    }
}

#[async_trait]
impl CustomerProfileGateway for FixtureGateways {
    async fn customer(&self, id: &CustomerId) -> Result<CustomerProfile, GatewayError> {
        self.profile(id).cloned()
    }
}

#[async_trait]
impl CreditScoreGateway for FixtureGateways {
    async fn credit_report(&self, id: &CustomerId) -> Result<CreditReport, GatewayError> {
        let profile = self.profile(id)?;
        Ok(CreditReport::for_profile(profile, Local::now().date_naive()))
    }
}

#[async_trait]
impl OfferCatalogGateway for FixtureGateways {
    async fn offers(&self, id: &CustomerId) -> Result<OfferCatalog, GatewayError> {
        let profile = self.profile(id)?;
        Ok(offer_catalog(profile, Local::now().date_naive()))
    }
}

#[async_trait]
impl KycGateway for FixtureGateways {
    async fn verify(&self, request: &KycRequest) -> Result<KycResult, GatewayError> {
        let profile = self.profile(&request.customer_id)?;
        Ok(KycResult::evaluate(profile, request))
    }
}
