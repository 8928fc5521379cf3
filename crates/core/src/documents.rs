use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{customer::CustomerProfile, loan::LoanDetails};

/// Durable record of a generated sanction letter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionArtifact {
    pub file_name: String,
    pub path: PathBuf,
    pub content_type: String,
    pub reference_number: String,
    pub loan_account_number: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("missing required customer fields: {}", .0.join(", "))]
    MissingCustomerFields(Vec<&'static str>),
    #[error("missing required loan fields: {}", .0.join(", "))]
    MissingLoanFields(Vec<&'static str>),
    #[error("failed to render sanction letter: {0}")]
    Render(String),
    #[error("failed to convert sanction letter: {0}")]
    Conversion(String),
    #[error("failed to write sanction letter: {0}")]
    Io(String),
}

#[async_trait]
pub trait DocumentEmitter: Send + Sync {
    async fn generate(
        &self,
        profile: &CustomerProfile,
        loan: &LoanDetails,
    ) -> Result<SanctionArtifact, DocumentError>;
}

/// Rejects inputs that would produce an incomplete letter. Nothing is written on failure.
pub fn validate_sanction_inputs(
    profile: &CustomerProfile,
    loan: &LoanDetails,
) -> Result<(), DocumentError> {
    let customer_fields = [
        ("customer_id", profile.customer_id.as_str()),
        ("name", profile.name.as_str()),
        ("email", profile.email.as_str()),
        ("phone", profile.phone.as_str()),
        ("address", profile.address.as_str()),
    ];
    let missing: Vec<&'static str> = customer_fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(DocumentError::MissingCustomerFields(missing));
    }

    let mut missing = Vec::new();
    if !(loan.loan_amount.is_finite() && loan.loan_amount > 0.0) {
        missing.push("loan_amount");
    }
    if loan.tenure_months == 0 {
        missing.push("tenure_months");
    }
    if !(loan.interest_rate.is_finite() && loan.interest_rate >= 0.0) {
        missing.push("interest_rate");
    }
    if !(loan.monthly_emi.is_finite() && loan.monthly_emi > 0.0) {
        missing.push("monthly_emi");
    }
    if !missing.is_empty() {
        return Err(DocumentError::MissingLoanFields(missing));
    }
    Ok(())
}

/// `SL` followed by the sanction timestamp and four random digits.
pub fn sanction_reference(now: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(1000..=9999);
    format!("SL{}{suffix}", now.format("%Y%m%d%H%M%S"))
}

/// `LA` followed by the sanction year and ten random digits.
pub fn loan_account_number(now: DateTime<Utc>) -> String {
    let suffix: u64 = rand::thread_rng().gen_range(1_000_000_000..=9_999_999_999);
    format!("LA{}{suffix}", now.format("%Y"))
}

pub fn disbursement_date(sanctioned_on: NaiveDate) -> NaiveDate {
    sanctioned_on.checked_add_days(Days::new(2)).unwrap_or(sanctioned_on)
}

pub fn artifact_file_name(
    profile: &CustomerProfile,
    sanctioned_on: NaiveDate,
    reference_number: &str,
    extension: &str,
) -> String {
    format!(
        "sanction_letter_{}_{}_{reference_number}.{extension}",
        profile.customer_id,
        sanctioned_on.format("%Y%m%d")
    )
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::{
        artifact_file_name, disbursement_date, loan_account_number, sanction_reference,
        validate_sanction_inputs, DocumentError,
    };
    use crate::domain::{
        customer::{CustomerId, CustomerProfile},
        loan::LoanDetails,
    };

    fn profile() -> CustomerProfile {
        CustomerProfile {
            customer_id: CustomerId::new("CUST002"),
            name: "Priya Sharma".to_owned(),
            phone: "+91-9876543211".to_owned(),
            email: "priya.sharma@email.com".to_owned(),
            address: "456 Park Street, Mumbai".to_owned(),
            city: "Mumbai".to_owned(),
            age: Some(29),
            credit_score: 820,
            pre_approved_limit: Some(500_000.0),
            salary: Some(120_000.0),
            existing_loans: Vec::new(),
        }
    }

    fn loan() -> LoanDetails {
        LoanDetails {
            loan_amount: 200_000.0,
            tenure_months: 24,
            interest_rate: 10.5,
            monthly_emi: 9_275.0,
            total_payment: 222_600.0,
            total_interest: 22_600.0,
            credit_score: 820,
            salary_verified: false,
        }
    }

    #[test]
    fn complete_inputs_validate() {
        assert_eq!(validate_sanction_inputs(&profile(), &loan()), Ok(()));
    }

    #[test]
    fn missing_contact_fields_are_listed() {
        let mut profile = profile();
        profile.email.clear();
        profile.address = "  ".to_owned();
        assert_eq!(
            validate_sanction_inputs(&profile, &loan()),
            Err(DocumentError::MissingCustomerFields(vec!["email", "address"]))
        );
    }

    #[test]
    fn missing_loan_fields_are_listed() {
        let mut loan = loan();
        loan.monthly_emi = 0.0;
        loan.tenure_months = 0;
        let error = validate_sanction_inputs(&profile(), &loan).expect_err("invalid loan");
        assert_eq!(error, DocumentError::MissingLoanFields(vec!["tenure_months", "monthly_emi"]));
        assert_eq!(error.to_string(), "missing required loan fields: tenure_months, monthly_emi");
    }

    #[test]
    fn reference_numbers_follow_format() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).single().expect("valid timestamp");
        let reference = sanction_reference(now);
        assert!(reference.starts_with("SL20260314092653"));
        assert_eq!(reference.len(), "SL".len() + 14 + 4);

        let account = loan_account_number(now);
        assert!(account.starts_with("LA2026"));
        assert_eq!(account.len(), "LA".len() + 4 + 10);
        assert!(account[2..].chars().all(|ch| ch.is_ascii_digit()));
    }

    #[test]
    fn disbursement_is_two_days_after_sanction() {
        let sanctioned = NaiveDate::from_ymd_opt(2026, 12, 30).expect("valid date");
        let expected = NaiveDate::from_ymd_opt(2027, 1, 1).expect("valid date");
        assert_eq!(disbursement_date(sanctioned), expected);
        assert_eq!(
            artifact_file_name(&profile(), sanctioned, "SL1", "pdf"),
            "sanction_letter_CUST002_20261230_SL1.pdf"
        );
    }
}
