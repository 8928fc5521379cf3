use std::fmt;

use serde::{Deserialize, Serialize};

/// Conversation stages in their forward order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Sales,
    AwaitingVerificationConfirmation,
    Verification,
    AwaitingUnderwritingConfirmation,
    Underwriting,
    AwaitingSanctionConfirmation,
    SanctionLetter,
    End,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Sales,
        Stage::AwaitingVerificationConfirmation,
        Stage::Verification,
        Stage::AwaitingUnderwritingConfirmation,
        Stage::Underwriting,
        Stage::AwaitingSanctionConfirmation,
        Stage::SanctionLetter,
        Stage::End,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::AwaitingVerificationConfirmation => "awaiting_verification_confirmation",
            Self::Verification => "verification",
            Self::AwaitingUnderwritingConfirmation => "awaiting_underwriting_confirmation",
            Self::Underwriting => "underwriting",
            Self::AwaitingSanctionConfirmation => "awaiting_sanction_confirmation",
            Self::SanctionLetter => "sanction_letter",
            Self::End => "end",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::End)
    }

    pub fn awaits_confirmation(self) -> bool {
        matches!(
            self,
            Self::AwaitingVerificationConfirmation
                | Self::AwaitingUnderwritingConfirmation
                | Self::AwaitingSanctionConfirmation
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User answer to a pending proposal, as decided by a confirmation classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Affirm,
    Deny,
    Unclear,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowEvent {
    RequirementsCollected,
    VerificationConfirmed,
    ChangeRequested,
    ConfirmationUnclear,
    VerificationPassed,
    VerificationFailed,
    GatewayUnavailable,
    UnderwritingConfirmed,
    MissingLoanRequest,
    MissingProfile,
    LoanApproved,
    SalarySlipRequired,
    LoanRejected,
    SalarySubmitted,
    SanctionRequested,
    EmailRequested,
    SanctionIssued,
    SanctionFailed,
}

pub const LOAN_AMOUNT: &str = "loan_amount";
pub const TENURE_MONTHS: &str = "tenure_months";
pub const CUSTOMER_PROFILE: &str = "customer_profile";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FlowContext {
    pub missing_required_fields: Vec<String>,
}

impl FlowContext {
    pub fn missing_from(&self, required: &[&str]) -> Vec<String> {
        self.missing_required_fields
            .iter()
            .filter(|field| required.contains(&field.as_str()))
            .cloned()
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    PromptForMissingFields,
    PresentSummary,
    RepeatPrompt,
    RunVerification,
    PresentProfile,
    ExplainFailure,
    RetryLater,
    RunUnderwriting,
    PresentLoanTerms,
    RequestSalarySlip,
    ExplainRejection,
    GenerateSanctionLetter,
    PromiseEmail,
    CloseConversation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: Stage,
    pub to: Stage,
    pub event: FlowEvent,
    pub actions: Vec<FlowAction>,
}
