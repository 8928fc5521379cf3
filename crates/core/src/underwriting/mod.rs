//! Loan eligibility: installment arithmetic, ordered decision rules and rate tier selection.

pub mod emi;
pub mod rules;
pub mod tiers;

pub use emi::{monthly_installment, round_currency, Amortization};
pub use rules::{
    Decision, DecisionKind, EligibilityEngine, EligibilityInput, EligibilityPolicy, Rejection,
    RejectionReason,
};
pub use tiers::select_interest_rate;
