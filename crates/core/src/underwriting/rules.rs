use serde::{Deserialize, Serialize};

use crate::{
    config::UnderwritingConfig,
    domain::loan::{LoanDetails, LoanTerms},
    errors::DomainError,
    underwriting::emi::{round_currency, Amortization},
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EligibilityPolicy {
    pub min_credit_score: u32,
    pub conditional_multiplier: f64,
    pub max_emi_ratio: f64,
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self { min_credit_score: 700, conditional_multiplier: 2.0, max_emi_ratio: 0.5 }
    }
}

impl From<&UnderwritingConfig> for EligibilityPolicy {
    fn from(config: &UnderwritingConfig) -> Self {
        Self {
            min_credit_score: config.min_credit_score,
            conditional_multiplier: config.conditional_multiplier,
            max_emi_ratio: config.max_emi_ratio,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EligibilityInput {
    pub credit_score: u32,
    pub terms: LoanTerms,
    pub pre_approved_limit: f64,
    pub interest_rate: f64,
    /// Income proof supplied through the salary side channel, if any.
    pub stated_salary: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    InstantApproval,
    ConditionalApproval,
    PendingSalarySlip,
    Rejected,
}

impl DecisionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InstantApproval => "instant_approval",
            Self::ConditionalApproval => "conditional_approval",
            Self::PendingSalarySlip => "pending_salary_slip",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    CreditScore,
    EmiRatio,
    HighAmount,
}

impl RejectionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreditScore => "credit_score",
            Self::EmiRatio => "emi_ratio",
            Self::HighAmount => "high_amount",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    CreditScore { credit_score: u32, min_credit_score: u32 },
    EmiRatio {
        monthly_emi: f64,
        salary: f64,
        emi_to_salary_ratio: f64,
        max_emi_ratio: f64,
        pre_approved_limit: f64,
    },
    HighAmount { requested_amount: f64, pre_approved_limit: f64, max_eligible_amount: f64 },
}

impl Rejection {
    pub fn reason(&self) -> RejectionReason {
        match self {
            Self::CreditScore { .. } => RejectionReason::CreditScore,
            Self::EmiRatio { .. } => RejectionReason::EmiRatio,
            Self::HighAmount { .. } => RejectionReason::HighAmount,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    InstantApproval { loan: LoanDetails },
    ConditionalApproval { loan: LoanDetails, emi_to_salary_ratio: f64 },
    PendingSalarySlip { requested_amount: f64, pre_approved_limit: f64, max_eligible_amount: f64 },
    Rejected(Rejection),
}

impl Decision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            Self::InstantApproval { .. } => DecisionKind::InstantApproval,
            Self::ConditionalApproval { .. } => DecisionKind::ConditionalApproval,
            Self::PendingSalarySlip { .. } => DecisionKind::PendingSalarySlip,
            Self::Rejected(_) => DecisionKind::Rejected,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.loan_details().is_some()
    }

    pub fn requires_salary_slip(&self) -> bool {
        matches!(self, Self::PendingSalarySlip { .. })
    }

    pub fn loan_details(&self) -> Option<&LoanDetails> {
        match self {
            Self::InstantApproval { loan } | Self::ConditionalApproval { loan, .. } => Some(loan),
            Self::PendingSalarySlip { .. } | Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

/// Ordered eligibility rules. The first matching rule decides.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EligibilityEngine {
    policy: EligibilityPolicy,
}

impl EligibilityEngine {
    pub fn new(policy: EligibilityPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    pub fn assess(&self, input: &EligibilityInput) -> Result<Decision, DomainError> {
        validate(input)?;
        let policy = &self.policy;
        let amount = input.terms.amount();
        let limit = input.pre_approved_limit;

        if input.credit_score < policy.min_credit_score {
            return Ok(Decision::Rejected(Rejection::CreditScore {
                credit_score: input.credit_score,
                min_credit_score: policy.min_credit_score,
            }));
        }

        if amount <= limit {
            let schedule = Amortization::for_terms(input.terms, input.interest_rate)?;
            return Ok(Decision::InstantApproval {
                loan: loan_details(&schedule, input.credit_score, false),
            });
        }

        let max_eligible_amount = limit * policy.conditional_multiplier;
        if amount <= max_eligible_amount {
            let Some(salary) = input.stated_salary else {
                return Ok(Decision::PendingSalarySlip {
                    requested_amount: amount,
                    pre_approved_limit: limit,
                    max_eligible_amount,
                });
            };

            let schedule = Amortization::for_terms(input.terms, input.interest_rate)?;
            let ratio = schedule.monthly_emi / salary;
            if ratio > policy.max_emi_ratio {
                return Ok(Decision::Rejected(Rejection::EmiRatio {
                    monthly_emi: schedule.monthly_emi,
                    salary,
                    emi_to_salary_ratio: ratio,
                    max_emi_ratio: policy.max_emi_ratio,
                    pre_approved_limit: limit,
                }));
            }
            return Ok(Decision::ConditionalApproval {
                loan: loan_details(&schedule, input.credit_score, true),
                emi_to_salary_ratio: ratio,
            });
        }

        Ok(Decision::Rejected(Rejection::HighAmount {
            requested_amount: amount,
            pre_approved_limit: limit,
            max_eligible_amount,
        }))
    }
}

fn validate(input: &EligibilityInput) -> Result<(), DomainError> {
    if !input.pre_approved_limit.is_finite() || input.pre_approved_limit < 0.0 {
        return Err(DomainError::InvalidInput(
            "pre-approved limit must be a non-negative number".to_owned(),
        ));
    }
    if let Some(salary) = input.stated_salary {
        if !salary.is_finite() || salary <= 0.0 {
            return Err(DomainError::InvalidInput("stated salary must be positive".to_owned()));
        }
    }
    Ok(())
}

fn loan_details(schedule: &Amortization, credit_score: u32, salary_verified: bool) -> LoanDetails {
    LoanDetails {
        loan_amount: schedule.principal,
        tenure_months: schedule.tenure_months,
        interest_rate: schedule.interest_rate,
        monthly_emi: schedule.monthly_emi,
        total_payment: schedule.total_payment,
        total_interest: round_currency(schedule.total_interest),
        credit_score,
        salary_verified,
    }
}
