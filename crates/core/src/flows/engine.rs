use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::flows::states::{
    FlowAction, FlowContext, FlowEvent, Stage, TransitionOutcome, CUSTOMER_PROFILE, LOAN_AMOUNT,
    TENURE_MONTHS,
};

pub trait FlowDefinition {
    fn initial_stage(&self) -> Stage;
    fn transition(
        &self,
        current: &Stage,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// Stage table of the loan application conversation.
#[derive(Clone, Debug, Default)]
pub struct LoanApplicationFlow;

impl FlowDefinition for LoanApplicationFlow {
    fn initial_stage(&self) -> Stage {
        Stage::Sales
    }

    fn transition(
        &self,
        current: &Stage,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_loan_application(current, event, context)
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_stage(&self) -> Stage {
        self.flow.initial_stage()
    }

    pub fn apply(
        &self,
        current: &Stage,
        event: &FlowEvent,
        context: &FlowContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &Stage,
        event: &FlowEvent,
        context: &FlowContext,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event, context);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit.session_id.clone(),
                        audit.correlation_id.clone(),
                        "flow.transition_applied",
                        AuditCategory::Flow,
                        audit.actor.clone(),
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", outcome.from.as_str())
                    .with_metadata("to", outcome.to.as_str())
                    .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit.session_id.clone(),
                        audit.correlation_id.clone(),
                        "flow.transition_rejected",
                        AuditCategory::Flow,
                        audit.actor.clone(),
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("stage", current.as_str())
                    .with_metadata("event", format!("{event:?}"))
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

impl Default for FlowEngine<LoanApplicationFlow> {
    fn default() -> Self {
        Self::new(LoanApplicationFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("missing required fields before transition from {stage:?}: {missing_fields:?}")]
    MissingRequiredFields { stage: Stage, missing_fields: Vec<String> },
    #[error("invalid transition from {stage:?} using event {event:?}")]
    InvalidTransition { stage: Stage, event: FlowEvent },
}

fn require(
    stage: Stage,
    context: &FlowContext,
    required: &[&str],
) -> Result<(), FlowTransitionError> {
    let missing_fields = context.missing_from(required);
    if missing_fields.is_empty() {
        Ok(())
    } else {
        Err(FlowTransitionError::MissingRequiredFields { stage, missing_fields })
    }
}

fn transition_loan_application(
    current: &Stage,
    event: &FlowEvent,
    context: &FlowContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use FlowAction::{
        CloseConversation, ExplainFailure, ExplainRejection, GenerateSanctionLetter,
        PresentLoanTerms, PresentProfile, PresentSummary, PromiseEmail, PromptForMissingFields,
        RepeatPrompt, RequestSalarySlip, RetryLater, RunUnderwriting, RunVerification,
    };
    use FlowEvent::{
        ChangeRequested, ConfirmationUnclear, EmailRequested, GatewayUnavailable, LoanApproved,
        LoanRejected, MissingLoanRequest, MissingProfile, RequirementsCollected, SalarySlipRequired,
        SalarySubmitted, SanctionFailed, SanctionIssued, SanctionRequested, UnderwritingConfirmed,
        VerificationConfirmed, VerificationFailed, VerificationPassed,
    };
    use Stage::{
        AwaitingSanctionConfirmation, AwaitingUnderwritingConfirmation,
        AwaitingVerificationConfirmation, End, Sales, SanctionLetter, Underwriting, Verification,
    };

    let loan_fields = [LOAN_AMOUNT, TENURE_MONTHS];

    let (to, actions) = match (*current, *event) {
        (Sales, RequirementsCollected) => {
            require(*current, context, &loan_fields)?;
            (AwaitingVerificationConfirmation, vec![PresentSummary])
        }
        (Sales, SalarySubmitted) => {
            require(*current, context, &loan_fields)?;
            (Underwriting, vec![RunUnderwriting])
        }
        (AwaitingVerificationConfirmation, VerificationConfirmed) => {
            (Verification, vec![RunVerification])
        }
        (AwaitingVerificationConfirmation, ChangeRequested)
        | (AwaitingUnderwritingConfirmation, ChangeRequested) => {
            (Sales, vec![PromptForMissingFields])
        }
        (stage, ConfirmationUnclear) if stage.awaits_confirmation() => (stage, vec![RepeatPrompt]),
        (Verification, VerificationPassed) => {
            (AwaitingUnderwritingConfirmation, vec![PresentProfile])
        }
        (Verification, VerificationFailed) => (Sales, vec![ExplainFailure]),
        (Verification, GatewayUnavailable) | (Underwriting, GatewayUnavailable) => {
            (*current, vec![RetryLater])
        }
        (AwaitingUnderwritingConfirmation, UnderwritingConfirmed) => {
            require(*current, context, &loan_fields)?;
            (Underwriting, vec![RunUnderwriting])
        }
        (AwaitingUnderwritingConfirmation, MissingLoanRequest)
        | (Underwriting, MissingLoanRequest) => (Sales, vec![PromptForMissingFields]),
        (Underwriting, MissingProfile) => (Verification, vec![ExplainFailure]),
        (Underwriting, LoanApproved) => {
            require(*current, context, &[LOAN_AMOUNT, TENURE_MONTHS, CUSTOMER_PROFILE])?;
            (AwaitingSanctionConfirmation, vec![PresentLoanTerms])
        }
        (Underwriting, SalarySlipRequired) => (Sales, vec![RequestSalarySlip]),
        (Underwriting, LoanRejected) => (Sales, vec![ExplainRejection]),
        (AwaitingSanctionConfirmation, SanctionRequested) => {
            (SanctionLetter, vec![GenerateSanctionLetter])
        }
        (AwaitingSanctionConfirmation, EmailRequested) => {
            (End, vec![PromiseEmail, CloseConversation])
        }
        (SanctionLetter, SanctionIssued) => (End, vec![CloseConversation]),
        (SanctionLetter, SanctionFailed) => (End, vec![ExplainFailure]),
        _ => {
            return Err(FlowTransitionError::InvalidTransition { stage: *current, event: *event });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: *event, actions })
}
