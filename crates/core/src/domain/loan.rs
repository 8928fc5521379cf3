use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Loan requirements collected from the conversation. Either field may still be missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub amount: Option<f64>,
    pub tenure_months: Option<u32>,
}

impl LoanRequest {
    /// Merges newly stated values, keeping earlier ones where nothing new was said.
    /// Returns true when the stored amount changed.
    pub fn merge(&mut self, amount: Option<f64>, tenure_months: Option<u32>) -> bool {
        let mut amount_changed = false;
        if let Some(amount) = amount.filter(|value| value.is_finite() && *value > 0.0) {
            amount_changed = self.amount != Some(amount);
            self.amount = Some(amount);
        }
        if let Some(tenure) = tenure_months.filter(|value| *value > 0) {
            self.tenure_months = Some(tenure);
        }
        amount_changed
    }

    pub fn is_complete(&self) -> bool {
        self.terms().is_some()
    }

    pub fn terms(&self) -> Option<LoanTerms> {
        match (self.amount, self.tenure_months) {
            (Some(amount), Some(tenure_months)) => LoanTerms::new(amount, tenure_months).ok(),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    amount: f64,
    tenure_months: u32,
}

impl LoanTerms {
    pub fn new(amount: f64, tenure_months: u32) -> Result<Self, DomainError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "loan amount must be a positive number, got {amount}"
            )));
        }
        if tenure_months == 0 {
            return Err(DomainError::InvalidInput(
                "loan tenure must be at least one month".to_owned(),
            ));
        }
        Ok(Self { amount, tenure_months })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn tenure_months(&self) -> u32 {
        self.tenure_months
    }
}

/// Final terms of an approved loan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanDetails {
    pub loan_amount: f64,
    pub tenure_months: u32,
    pub interest_rate: f64,
    pub monthly_emi: f64,
    pub total_payment: f64,
    pub total_interest: f64,
    pub credit_score: u32,
    pub salary_verified: bool,
}

#[cfg(test)]
mod tests {
    use super::{LoanRequest, LoanTerms};

    #[test]
    fn merge_keeps_previous_values_when_nothing_new_is_stated() {
        let mut request = LoanRequest::default();
        assert!(request.merge(Some(200_000.0), None));
        assert!(!request.is_complete());

        assert!(!request.merge(None, Some(24)));
        assert_eq!(request.amount, Some(200_000.0));
        assert_eq!(request.tenure_months, Some(24));
        assert!(request.is_complete());

        assert!(request.merge(Some(300_000.0), None));
        assert_eq!(request.tenure_months, Some(24));
    }

    #[test]
    fn merge_ignores_non_positive_values() {
        let mut request = LoanRequest::default();
        request.merge(Some(-5.0), Some(0));
        assert_eq!(request, LoanRequest::default());
    }

    #[test]
    fn terms_reject_invalid_values() {
        assert!(LoanTerms::new(0.0, 12).is_err());
        assert!(LoanTerms::new(f64::NAN, 12).is_err());
        assert!(LoanTerms::new(50_000.0, 0).is_err());
        let terms = LoanTerms::new(50_000.0, 12).expect("valid terms");
        assert_eq!(terms.amount(), 50_000.0);
        assert_eq!(terms.tenure_months(), 12);
    }
}
