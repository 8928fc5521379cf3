use serde::{Deserialize, Serialize};

use crate::{domain::loan::LoanTerms, errors::DomainError};

/// Rounds a currency amount to the smallest unit (paise).
pub fn round_currency(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Reducing-balance monthly installment at full precision.
///
/// Callers reject non-positive principal and tenure before calling.
pub fn monthly_installment_exact(
    principal: f64,
    annual_rate_percent: f64,
    tenure_months: u32,
) -> f64 {
    let monthly_rate = annual_rate_percent / 1200.0;
    let periods = tenure_months as f64;
    if monthly_rate == 0.0 {
        return principal / periods;
    }

    let growth = (1.0 + monthly_rate).powf(periods);
    if !growth.is_finite() {
        // (1+r)^n / ((1+r)^n - 1) tends to 1 as n grows.
        return principal * monthly_rate;
    }
    principal * monthly_rate * growth / (growth - 1.0)
}

/// Monthly installment rounded to paise.
pub fn monthly_installment(principal: f64, annual_rate_percent: f64, tenure_months: u32) -> f64 {
    round_currency(monthly_installment_exact(principal, annual_rate_percent, tenure_months))
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amortization {
    pub principal: f64,
    pub interest_rate: f64,
    pub tenure_months: u32,
    pub monthly_emi: f64,
    pub total_payment: f64,
    pub total_interest: f64,
}

impl Amortization {
    pub fn for_terms(terms: LoanTerms, annual_rate_percent: f64) -> Result<Self, DomainError> {
        if !annual_rate_percent.is_finite() || annual_rate_percent < 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "interest rate must be a non-negative number, got {annual_rate_percent}"
            )));
        }

        let exact =
            monthly_installment_exact(terms.amount(), annual_rate_percent, terms.tenure_months());
        let total_payment = exact * terms.tenure_months() as f64;
        Ok(Self {
            principal: round_currency(terms.amount()),
            interest_rate: annual_rate_percent,
            tenure_months: terms.tenure_months(),
            monthly_emi: round_currency(exact),
            total_payment: round_currency(total_payment),
            total_interest: round_currency(total_payment - terms.amount()),
        })
    }

    pub fn compute(
        principal: f64,
        annual_rate_percent: f64,
        tenure_months: u32,
    ) -> Result<Self, DomainError> {
        Self::for_terms(LoanTerms::new(principal, tenure_months)?, annual_rate_percent)
    }
}

#[cfg(test)]
mod tests {
    use super::{monthly_installment, Amortization};

    #[test]
    fn installment_matches_reference_values() {
        let cases = [
            (50_000.0, 10.5, 12, 4_407.43),
            (50_000.0, 12.5, 12, 4_454.14),
            (150_000.0, 11.5, 12, 13_292.26),
            (150_000.0, 11.5, 24, 7_026.05),
            (100_000.0, 12.0, 12, 8_884.88),
        ];
        for (principal, rate, tenure, expected) in cases {
            assert_eq!(
                monthly_installment(principal, rate, tenure),
                expected,
                "emi({principal}, {rate}, {tenure})"
            );
        }
    }

    #[test]
    fn zero_rate_is_straight_line() {
        assert_eq!(monthly_installment(120_000.0, 0.0, 12), 10_000.0);
        let schedule = Amortization::compute(100_000.0, 0.0, 12).expect("valid terms");
        assert_eq!(schedule.monthly_emi, 8_333.33);
        assert_eq!(schedule.total_payment, 100_000.0);
        assert_eq!(schedule.total_interest, 0.0);
    }

    #[test]
    fn installment_is_deterministic() {
        let first = monthly_installment(275_000.0, 11.25, 36);
        let second = monthly_installment(275_000.0, 11.25, 36);
        assert_eq!(first.to_bits(), second.to_bits());
    }

    #[test]
    fn very_long_tenure_does_not_overflow() {
        let emi = monthly_installment(100_000.0, 12.0, u32::MAX);
        assert!(emi.is_finite());
        assert_eq!(emi, 1_000.0);
    }

    #[test]
    fn totals_derive_from_full_precision_installment() {
        let schedule = Amortization::compute(100_000.0, 12.0, 12).expect("valid terms");
        assert_eq!(schedule.monthly_emi, 8_884.88);
        assert_eq!(schedule.total_payment, 106_618.55);
        assert_eq!(schedule.total_interest, 6_618.55);
    }

    #[test]
    fn rejects_invalid_inputs() {
        assert!(Amortization::compute(0.0, 12.0, 12).is_err());
        assert!(Amortization::compute(10_000.0, 12.0, 0).is_err());
        assert!(Amortization::compute(10_000.0, -1.0, 12).is_err());
    }
}
