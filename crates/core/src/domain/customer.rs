use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExistingLoan {
    #[serde(rename = "type")]
    pub loan_type: String,
    pub amount: f64,
    pub emi: f64,
}

/// Customer record as held by the CRM.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: CustomerId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub age: Option<u32>,
    pub credit_score: u32,
    #[serde(default)]
    pub pre_approved_limit: Option<f64>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub existing_loans: Vec<ExistingLoan>,
}

impl CustomerProfile {
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("there")
    }

    pub fn total_outstanding_debt(&self) -> f64 {
        self.existing_loans.iter().map(|loan| loan.amount).sum()
    }

    pub fn total_monthly_emi(&self) -> f64 {
        self.existing_loans.iter().map(|loan| loan.emi).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditRating {
    Excellent,
    #[serde(rename = "Very Good")]
    VeryGood,
    Good,
    Fair,
    Poor,
}

impl CreditRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            800.. => Self::Excellent,
            750..=799 => Self::VeryGood,
            700..=749 => Self::Good,
            650..=699 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::VeryGood => "Very Good",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::Poor => "Poor",
        }
    }

    pub fn risk_category(self) -> &'static str {
        match self {
            Self::Excellent | Self::VeryGood => "Low Risk",
            Self::Good => "Medium Risk",
            Self::Fair => "Medium-High Risk",
            Self::Poor => "High Risk",
        }
    }
}

pub const MAX_CREDIT_SCORE: u32 = 900;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreditReport {
    pub customer_id: CustomerId,
    pub credit_score: u32,
    pub max_score: u32,
    pub rating: CreditRating,
    pub risk_category: String,
    pub total_outstanding_debt: f64,
    pub total_monthly_emi: f64,
    pub active_loans: usize,
    pub report_date: NaiveDate,
}

impl CreditReport {
    pub fn for_profile(profile: &CustomerProfile, report_date: NaiveDate) -> Self {
        let rating = CreditRating::from_score(profile.credit_score);
        Self {
            customer_id: profile.customer_id.clone(),
            credit_score: profile.credit_score,
            max_score: MAX_CREDIT_SCORE,
            rating,
            risk_category: rating.risk_category().to_owned(),
            total_outstanding_debt: profile.total_outstanding_debt(),
            total_monthly_emi: profile.total_monthly_emi(),
            active_loans: profile.existing_loans.len(),
            report_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanOffer {
    pub tier: String,
    pub max_amount: f64,
    pub interest_rate: f64,
    pub tenure_options: Vec<u32>,
    pub processing_fee: f64,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Ordered pre-approved offers for one customer. An empty list is a valid answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OfferCatalog {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub credit_score: u32,
    pub offers: Vec<LoanOffer>,
    pub valid_until: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycRequest {
    pub customer_id: CustomerId,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub verified: bool,
    pub provided: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycResult {
    pub customer_id: CustomerId,
    pub verified: bool,
    #[serde(default)]
    pub phone: Option<FieldMatch>,
    #[serde(default)]
    pub address: Option<FieldMatch>,
}

impl KycResult {
    /// Checks the supplied fields against the stored profile. Phone numbers compare with
    /// spaces and dashes stripped, addresses by case-insensitive containment.
    pub fn evaluate(profile: &CustomerProfile, request: &KycRequest) -> Self {
        let phone = request.phone.as_ref().map(|provided| FieldMatch {
            verified: normalize_phone(provided) == normalize_phone(&profile.phone),
            provided: provided.clone(),
        });
        let address = request.address.as_ref().map(|provided| FieldMatch {
            verified: !provided.trim().is_empty()
                && profile.address.to_lowercase().contains(&provided.trim().to_lowercase()),
            provided: provided.clone(),
        });
        let verified = [&phone, &address].into_iter().flatten().all(|field| field.verified);

        Self { customer_id: profile.customer_id.clone(), verified, phone, address }
    }

    pub fn mismatched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.phone.as_ref().is_some_and(|field| !field.verified) {
            fields.push("phone number");
        }
        if self.address.as_ref().is_some_and(|field| !field.verified) {
            fields.push("address");
        }
        fields
    }
}

pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|ch| !matches!(ch, ' ' | '-')).collect();
    match digits.strip_prefix("+91") {
        Some(rest) if rest.len() == 10 => rest.to_owned(),
        _ => digits,
    }
}

#[cfg(test)]
mod tests {
    use super::{CreditRating, CustomerId, CustomerProfile, ExistingLoan, KycRequest, KycResult};

    fn profile() -> CustomerProfile {
        CustomerProfile {
            customer_id: CustomerId::new("CUST001"),
            name: "Rajesh Kumar".to_owned(),
            phone: "+91-9876543210".to_owned(),
            email: "rajesh.kumar@email.com".to_owned(),
            address: "123 MG Road, Bangalore".to_owned(),
            city: "Bangalore".to_owned(),
            age: Some(35),
            credit_score: 780,
            pre_approved_limit: Some(100_000.0),
            salary: Some(75_000.0),
            existing_loans: vec![ExistingLoan {
                loan_type: "car".to_owned(),
                amount: 200_000.0,
                emi: 8_500.0,
            }],
        }
    }

    #[test]
    fn credit_rating_bands_follow_score_thresholds() {
        let cases = [
            (850, "Excellent", "Low Risk"),
            (800, "Excellent", "Low Risk"),
            (799, "Very Good", "Low Risk"),
            (720, "Good", "Medium Risk"),
            (650, "Fair", "Medium-High Risk"),
            (649, "Poor", "High Risk"),
        ];
        for (score, label, risk) in cases {
            let rating = CreditRating::from_score(score);
            assert_eq!(rating.label(), label, "score {score}");
            assert_eq!(rating.risk_category(), risk, "score {score}");
        }
    }

    #[test]
    fn first_name_uses_leading_token() {
        assert_eq!(profile().first_name(), "Rajesh");
        assert_eq!(profile().total_monthly_emi(), 8_500.0);
    }

    #[test]
    fn kyc_phone_match_ignores_formatting() {
        let request = KycRequest {
            customer_id: CustomerId::new("CUST001"),
            phone: Some("98765 43210".to_owned()),
            address: Some("mg road".to_owned()),
        };
        let result = KycResult::evaluate(&profile(), &request);
        assert!(result.verified);
        assert!(result.mismatched_fields().is_empty());
    }

    #[test]
    fn kyc_reports_each_mismatching_field() {
        let request = KycRequest {
            customer_id: CustomerId::new("CUST001"),
            phone: Some("9000000000".to_owned()),
            address: Some("Park Street".to_owned()),
        };
        let result = KycResult::evaluate(&profile(), &request);
        assert!(!result.verified);
        assert_eq!(result.mismatched_fields(), vec!["phone number", "address"]);
    }
}
