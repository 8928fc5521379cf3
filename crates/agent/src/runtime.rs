use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use loanline_core::audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, TracingAuditSink,
};
use loanline_core::config::AppConfig;
use loanline_core::documents::{DocumentEmitter, DocumentError};
use loanline_core::domain::customer::{CustomerId, CustomerProfile, KycRequest};
use loanline_core::domain::session::{ConversationSnapshot, Session, SessionId, SessionSummary};
use loanline_core::errors::{ApplicationError, DomainError};
use loanline_core::flows::{
    Confirmation, FlowEngine, FlowEvent, LoanApplicationFlow, Stage, TransitionOutcome,
};
use loanline_core::gateways::{GatewayError, Gateways};
use loanline_core::underwriting::{
    monthly_installment, select_interest_rate, Decision, EligibilityEngine, EligibilityInput,
    EligibilityPolicy,
};
use loanline_core::UnderwritingRecord;
use loanline_store::{SessionLocks, SessionStore};

use crate::confirmation::{ConfirmationClassifier, ConfirmationPrompt, KeywordClassifier};
use crate::conversation::{RequirementExtractor, StatedRequirements};
use crate::guardrails::{GuardrailDecision, GuardrailIntent, GuardrailPolicy};
use crate::messages;

const ACTOR: &str = "loan_assistant";

#[derive(Clone, Debug, PartialEq)]
pub struct AssistantSettings {
    pub max_steps: u32,
    pub policy: EligibilityPolicy,
    pub default_interest_rate: f64,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self { max_steps: 10, policy: EligibilityPolicy::default(), default_interest_rate: 12.5 }
    }
}

impl From<&AppConfig> for AssistantSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_steps: config.conversation.max_steps,
            policy: EligibilityPolicy::from(&config.underwriting),
            default_interest_rate: config.underwriting.default_interest_rate,
        }
    }
}

/// A generated sanction letter read back for download.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactDownload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Drives conversations through the loan application stages.
///
/// Every operation holds the session's lock for its whole read-modify-write, so messages for
/// one session are applied strictly in order while other sessions proceed independently.
/// Collaborator failures never escape as errors: they become assistant messages and the
/// stage stays where a retry can pick it up.
pub struct LoanAssistant {
    store: Arc<dyn SessionStore>,
    locks: SessionLocks,
    gateways: Gateways,
    emitter: Arc<dyn DocumentEmitter>,
    classifier: Arc<dyn ConfirmationClassifier>,
    audit: Arc<dyn AuditSink>,
    extractor: RequirementExtractor,
    guardrails: GuardrailPolicy,
    flow: FlowEngine<LoanApplicationFlow>,
    eligibility: EligibilityEngine,
    default_interest_rate: f64,
}

/// Per-operation context threaded through the stage handlers.
struct Turn {
    audit: AuditContext,
}

impl Turn {
    fn new(session_id: &SessionId) -> Self {
        let correlation_id = format!("req-{}", Uuid::new_v4());
        Self { audit: AuditContext::new(Some(session_id.clone()), correlation_id, ACTOR) }
    }

    fn correlation_id(&self) -> &str {
        &self.audit.correlation_id
    }
}

impl LoanAssistant {
    pub fn new(
        store: Arc<dyn SessionStore>,
        gateways: Gateways,
        emitter: Arc<dyn DocumentEmitter>,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            store,
            locks: SessionLocks::default(),
            gateways,
            emitter,
            classifier: Arc::new(KeywordClassifier),
            audit: Arc::new(TracingAuditSink),
            extractor: RequirementExtractor::new(),
            guardrails: GuardrailPolicy::with_max_steps(settings.max_steps),
            flow: FlowEngine::default(),
            eligibility: EligibilityEngine::new(settings.policy),
            default_interest_rate: settings.default_interest_rate,
        }
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ConfirmationClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn max_steps(&self) -> u32 {
        self.guardrails.max_steps
    }

    pub async fn session_count(&self) -> Result<usize, ApplicationError> {
        Ok(self.store.count().await?)
    }

    /// Opens a session for a known customer and greets them by first name.
    pub async fn start_conversation(
        &self,
        customer_id: CustomerId,
    ) -> Result<ConversationSnapshot, ApplicationError> {
        let session_id = SessionId::generate();
        let _guard = self.locks.acquire(&session_id).await;
        let turn = Turn::new(&session_id);

        let mut session = Session::new(session_id);
        session.bind_customer(customer_id.clone());

        let profile = match self.gateways.profiles.customer(&customer_id).await {
            Ok(profile) => Some(profile),
            Err(error) => {
                self.log_gateway_failure(&turn, "customer_profile", &error);
                None
            }
        };
        let has_offers = match self.gateways.offers.offers(&customer_id).await {
            Ok(catalog) => !catalog.offers.is_empty(),
            Err(error) => {
                self.log_gateway_failure(&turn, "offer_catalog", &error);
                false
            }
        };

        session.push_assistant(messages::greeting(profile.as_ref(), has_offers));
        if let Some(profile) = profile {
            session.cache_profile(profile)?;
        }

        tracing::info!(
            event_name = "conversation.started",
            correlation_id = %turn.correlation_id(),
            session_id = %session.id(),
            customer_id = %customer_id,
            "conversation started"
        );
        self.store.put(session.clone()).await?;
        Ok(session.snapshot())
    }

    /// Applies one user message. Unknown or absent session ids start a new session.
    pub async fn process_message(
        &self,
        session_id: Option<SessionId>,
        customer_id: Option<CustomerId>,
        text: &str,
    ) -> Result<ConversationSnapshot, ApplicationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::InvalidInput("message must not be empty".to_owned()).into());
        }

        let session_id = session_id.unwrap_or_else(SessionId::generate);
        let _guard = self.locks.acquire(&session_id).await;
        let turn = Turn::new(&session_id);

        let mut session = match self.store.get(&session_id).await? {
            Some(session) => session,
            None => Session::new(session_id.clone()),
        };
        if let Some(customer_id) = customer_id {
            self.bind_customer(&mut session, customer_id);
        }

        let step_count = session.push_user(text);
        let intent = GuardrailIntent::InboundMessage {
            session_id: session_id.to_string(),
            step_count,
        };
        if let GuardrailDecision::Deny { reason_code, user_message, .. } =
            self.guardrails.evaluate(&intent)
        {
            self.refuse(&mut session, &turn, &intent, reason_code, user_message);
            self.store.put(session.clone()).await?;
            return Ok(session.snapshot());
        }

        self.dispatch(&mut session, &turn, text).await?;

        self.store.put(session.clone()).await?;
        Ok(session.snapshot())
    }

    /// Records income proof for a session waiting on it and re-runs underwriting.
    /// Does not count as a conversation step.
    pub async fn submit_salary(
        &self,
        session_id: &SessionId,
        salary_amount: f64,
    ) -> Result<ConversationSnapshot, ApplicationError> {
        let _guard = self.locks.acquire(session_id).await;
        let turn = Turn::new(session_id);
        let mut session = self.load(session_id).await?;

        let intent = GuardrailIntent::SalarySubmission {
            session_id: session_id.to_string(),
            awaiting_salary_slip: session.requires_salary_slip(),
            salary_amount,
        };
        if let GuardrailDecision::Deny { reason_code, user_message, .. } =
            self.guardrails.evaluate(&intent)
        {
            self.emit_guardrail_audit(&turn, &intent, reason_code);
            return Err(DomainError::InvalidInput(user_message).into());
        }

        session.record_salary(salary_amount)?;
        session.push_assistant(messages::salary_received(salary_amount));
        self.transition(&mut session, &turn, FlowEvent::SalarySubmitted)?;
        self.run_underwriting(&mut session, &turn).await?;

        self.store.put(session.clone()).await?;
        Ok(session.snapshot())
    }

    pub async fn download_artifact(
        &self,
        session_id: &SessionId,
    ) -> Result<ArtifactDownload, ApplicationError> {
        let session = self.load(session_id).await?;
        let Some(artifact) = session.sanction_artifact() else {
            return Err(ApplicationError::NotFound("sanction letter not found".to_owned()));
        };
        let bytes = read_artifact(&artifact.path).await?;
        Ok(ArtifactDownload {
            file_name: artifact.file_name.clone(),
            content_type: artifact.content_type.clone(),
            bytes,
        })
    }

    pub async fn session_summary(
        &self,
        session_id: &SessionId,
    ) -> Result<SessionSummary, ApplicationError> {
        Ok(self.load(session_id).await?.summary())
    }

    pub async fn delete_session(&self, session_id: &SessionId) -> Result<bool, ApplicationError> {
        let guard = self.locks.acquire(session_id).await;
        let deleted = self.store.delete(session_id).await?;
        self.locks.forget(session_id, guard);
        if deleted {
            tracing::info!(
                event_name = "conversation.deleted",
                session_id = %session_id,
                "session deleted"
            );
        }
        Ok(deleted)
    }

    async fn load(&self, session_id: &SessionId) -> Result<Session, ApplicationError> {
        self.store
            .get(session_id)
            .await?
            .ok_or_else(|| ApplicationError::SessionNotFound(session_id.clone()))
    }

    fn bind_customer(&self, session: &mut Session, customer_id: CustomerId) {
        if !session.bind_customer(customer_id.clone())
            && session.customer_id() != Some(&customer_id)
        {
            tracing::debug!(
                event_name = "conversation.customer_rebind_ignored",
                session_id = %session.id(),
                customer_id = %customer_id,
                "customer id is already bound"
            );
        }
    }

    async fn dispatch(
        &self,
        session: &mut Session,
        turn: &Turn,
        text: &str,
    ) -> Result<(), ApplicationError> {
        let stated = self.extractor.extract(text);
        if let Some(customer_id) = stated.customer_id.clone() {
            self.bind_customer(session, customer_id);
        }
        if let Some(phone) = stated.phone.as_deref() {
            session.set_stated_phone(phone);
        }

        match session.stage() {
            Stage::Sales => {
                let amount_changed =
                    session.merge_loan_request(stated.loan_amount, stated.tenure_months);
                self.collect_requirements(session, turn, amount_changed, stated.mentions_loan())
            }
            stage @ (Stage::AwaitingVerificationConfirmation
            | Stage::AwaitingUnderwritingConfirmation
            | Stage::AwaitingSanctionConfirmation) => {
                let Some(prompt) = ConfirmationPrompt::for_stage(stage) else {
                    return Ok(());
                };
                let answer = self.classifier.classify(prompt, text).await;
                tracing::debug!(
                    event_name = "conversation.confirmation_classified",
                    correlation_id = %turn.correlation_id(),
                    session_id = %session.id(),
                    prompt = prompt.as_str(),
                    answer = ?answer,
                    "confirmation classified"
                );
                self.resolve_confirmation(session, turn, prompt, answer, &stated).await
            }
            Stage::Verification => self.run_verification(session, turn).await,
            Stage::Underwriting => self.run_underwriting(session, turn).await,
            Stage::SanctionLetter => self.run_sanction(session, turn).await,
            Stage::End => {
                session.set_quick_replies(Vec::new());
                session.push_assistant(messages::conversation_closed());
                Ok(())
            }
        }
    }

    fn collect_requirements(
        &self,
        session: &mut Session,
        turn: &Turn,
        amount_changed: bool,
        mentions_loan: bool,
    ) -> Result<(), ApplicationError> {
        session.set_quick_replies(Vec::new());
        if session.requires_salary_slip() && !(amount_changed || mentions_loan) {
            session.push_assistant(messages::salary_reminder());
            return Ok(());
        }
        if session.loan_request().is_complete() {
            self.transition(session, turn, FlowEvent::RequirementsCollected)?;
            session.push_assistant(messages::requirements_summary(session.loan_request()));
            session.set_quick_replies(messages::quick_replies(ConfirmationPrompt::Verification));
        } else {
            let prompt =
                messages::requirements_prompt(session.loan_request(), session.customer_profile());
            session.push_assistant(prompt);
        }
        Ok(())
    }

    async fn resolve_confirmation(
        &self,
        session: &mut Session,
        turn: &Turn,
        prompt: ConfirmationPrompt,
        answer: Confirmation,
        stated: &StatedRequirements,
    ) -> Result<(), ApplicationError> {
        session.set_quick_replies(Vec::new());
        match (prompt, answer) {
            (_, Confirmation::Unclear) => {
                self.transition(session, turn, FlowEvent::ConfirmationUnclear)?;
                session.push_assistant(messages::unclear_answer(prompt));
                session.set_quick_replies(messages::quick_replies(prompt));
                Ok(())
            }
            (ConfirmationPrompt::Verification, Confirmation::Affirm) => {
                self.transition(session, turn, FlowEvent::VerificationConfirmed)?;
                self.run_verification(session, turn).await
            }
            (ConfirmationPrompt::Underwriting, Confirmation::Affirm) => {
                if session.loan_request().is_complete() {
                    self.transition(session, turn, FlowEvent::UnderwritingConfirmed)?;
                    self.run_underwriting(session, turn).await
                } else {
                    self.transition(session, turn, FlowEvent::MissingLoanRequest)?;
                    session.push_assistant(messages::missing_loan_details());
                    Ok(())
                }
            }
            (ConfirmationPrompt::Verification | ConfirmationPrompt::Underwriting, _) => {
                self.transition(session, turn, FlowEvent::ChangeRequested)?;
                let amount_changed =
                    session.merge_loan_request(stated.loan_amount, stated.tenure_months);
                if stated.mentions_loan() {
                    // The correction came with the refusal; summarise it right away.
                    return self.collect_requirements(session, turn, amount_changed, true);
                }
                let reply = if prompt == ConfirmationPrompt::Verification {
                    messages::change_details()
                } else {
                    messages::correction_requested()
                };
                session.push_assistant(reply);
                Ok(())
            }
            (ConfirmationPrompt::Sanction, Confirmation::Affirm) => {
                self.transition(session, turn, FlowEvent::SanctionRequested)?;
                self.run_sanction(session, turn).await
            }
            (ConfirmationPrompt::Sanction, _) => {
                self.transition(session, turn, FlowEvent::EmailRequested)?;
                session.push_assistant(messages::email_promise(session.customer_profile()));
                session.mark_complete();
                Ok(())
            }
        }
    }

    async fn run_verification(
        &self,
        session: &mut Session,
        turn: &Turn,
    ) -> Result<(), ApplicationError> {
        session.set_quick_replies(Vec::new());
        let Some(customer_id) = session.customer_id().cloned() else {
            session.push_assistant(messages::missing_customer_id());
            self.transition(session, turn, FlowEvent::VerificationFailed)?;
            return Ok(());
        };

        let profile = match session.customer_profile().cloned() {
            Some(profile) => profile,
            None => match self.gateways.profiles.customer(&customer_id).await {
                Ok(profile) => profile,
                Err(error) => {
                    return self.verification_gateway_failure(
                        session,
                        turn,
                        "customer_profile",
                        error,
                    );
                }
            },
        };

        if profile.pre_approved_limit.is_none() {
            session.push_assistant(messages::incomplete_profile());
            self.transition(session, turn, FlowEvent::VerificationFailed)?;
            return Ok(());
        }

        if let Some(phone) = session.stated_phone().map(str::to_owned) {
            let request =
                KycRequest { customer_id: customer_id.clone(), phone: Some(phone), address: None };
            match self.gateways.kyc.verify(&request).await {
                Ok(result) if result.verified => {}
                Ok(result) => {
                    session.push_assistant(messages::kyc_mismatch(&result.mismatched_fields()));
                    self.transition(session, turn, FlowEvent::VerificationFailed)?;
                    return Ok(());
                }
                Err(error) => {
                    return self.verification_gateway_failure(session, turn, "kyc", error);
                }
            }
        }

        session.push_assistant(messages::verified_profile(&profile));
        session.cache_profile(profile)?;
        self.transition(session, turn, FlowEvent::VerificationPassed)?;
        session.set_quick_replies(messages::quick_replies(ConfirmationPrompt::Underwriting));
        Ok(())
    }

    fn verification_gateway_failure(
        &self,
        session: &mut Session,
        turn: &Turn,
        collaborator: &'static str,
        error: GatewayError,
    ) -> Result<(), ApplicationError> {
        self.log_gateway_failure(turn, collaborator, &error);
        if error.is_not_found() {
            session.push_assistant(messages::customer_not_found());
            self.transition(session, turn, FlowEvent::VerificationFailed)?;
        } else {
            session.push_assistant(messages::verification_unavailable());
            self.transition(session, turn, FlowEvent::GatewayUnavailable)?;
        }
        Ok(())
    }

    async fn run_underwriting(
        &self,
        session: &mut Session,
        turn: &Turn,
    ) -> Result<(), ApplicationError> {
        session.set_quick_replies(Vec::new());
        let Some(terms) = session.loan_request().terms() else {
            session.push_assistant(messages::missing_loan_details());
            self.transition(session, turn, FlowEvent::MissingLoanRequest)?;
            return Ok(());
        };
        let Some((customer_id, pre_approved_limit)) = verified_customer(session.customer_profile())
        else {
            session.push_assistant(messages::verification_incomplete());
            self.transition(session, turn, FlowEvent::MissingProfile)?;
            return Ok(());
        };

        let report = match self.gateways.credit.credit_report(&customer_id).await {
            Ok(report) => report,
            Err(error) => {
                self.log_gateway_failure(turn, "credit_score", &error);
                if error.is_not_found() {
                    session.push_assistant(messages::verification_incomplete());
                    self.transition(session, turn, FlowEvent::MissingProfile)?;
                } else {
                    session.push_assistant(messages::assessment_unavailable());
                    self.transition(session, turn, FlowEvent::GatewayUnavailable)?;
                }
                return Ok(());
            }
        };

        let interest_rate = match self.gateways.offers.offers(&customer_id).await {
            Ok(catalog) => {
                select_interest_rate(&catalog.offers, terms.amount(), self.default_interest_rate)
            }
            Err(error) => {
                self.log_gateway_failure(turn, "offer_catalog", &error);
                self.default_interest_rate
            }
        };

        let input = EligibilityInput {
            credit_score: report.credit_score,
            terms,
            pre_approved_limit,
            interest_rate,
            stated_salary: session.stated_salary(),
        };
        let decision = match self.eligibility.assess(&input) {
            Ok(decision) => decision,
            Err(error) => {
                tracing::warn!(
                    event_name = "underwriting.invalid_input",
                    correlation_id = %turn.correlation_id(),
                    session_id = %session.id(),
                    error = %error,
                    "eligibility inputs rejected"
                );
                session.push_assistant(messages::incomplete_profile());
                self.transition(session, turn, FlowEvent::MissingProfile)?;
                return Ok(());
            }
        };

        let estimated_emi =
            monthly_installment(terms.amount(), interest_rate, terms.tenure_months());
        self.emit_decision_audit(turn, &decision, interest_rate);
        session.record_underwriting(UnderwritingRecord::new(decision.clone(), interest_rate))?;
        session.push_assistant(messages::decision_message(&decision, interest_rate, estimated_emi));

        match decision {
            Decision::InstantApproval { .. } | Decision::ConditionalApproval { .. } => {
                self.transition(session, turn, FlowEvent::LoanApproved)?;
                session.set_quick_replies(messages::quick_replies(ConfirmationPrompt::Sanction));
            }
            Decision::PendingSalarySlip { .. } => {
                self.transition(session, turn, FlowEvent::SalarySlipRequired)?;
            }
            Decision::Rejected(_) => {
                self.transition(session, turn, FlowEvent::LoanRejected)?;
            }
        }
        Ok(())
    }

    async fn run_sanction(
        &self,
        session: &mut Session,
        turn: &Turn,
    ) -> Result<(), ApplicationError> {
        session.set_quick_replies(Vec::new());
        let loan =
            session.underwriting().and_then(|record| record.decision.loan_details()).cloned();
        let (Some(profile), Some(loan)) = (session.customer_profile().cloned(), loan) else {
            let error = DocumentError::MissingLoanFields(vec!["loan_details"]);
            session.push_assistant(messages::sanction_failed(&error));
            self.transition(session, turn, FlowEvent::SanctionFailed)?;
            return Ok(());
        };

        match self.emitter.generate(&profile, &loan).await {
            Ok(artifact) => {
                tracing::info!(
                    event_name = "document.sanction_letter_written",
                    correlation_id = %turn.correlation_id(),
                    session_id = %session.id(),
                    file_name = %artifact.file_name,
                    reference_number = %artifact.reference_number,
                    "sanction letter generated"
                );
                self.audit.emit(
                    self.event(turn, "document.sanction_letter_generated", AuditOutcome::Success)
                        .with_metadata("file_name", artifact.file_name.clone())
                        .with_metadata("reference_number", artifact.reference_number.clone()),
                );
                session.push_assistant(messages::sanction_issued(&artifact, &loan));
                session.attach_artifact(artifact)?;
                self.transition(session, turn, FlowEvent::SanctionIssued)?;
                session.mark_complete();
            }
            Err(error) => {
                tracing::error!(
                    event_name = "document.sanction_letter_failed",
                    correlation_id = %turn.correlation_id(),
                    session_id = %session.id(),
                    error = %error,
                    "sanction letter generation failed"
                );
                self.audit.emit(
                    self.event(turn, "document.sanction_letter_failed", AuditOutcome::Failed)
                        .with_metadata("error", error.to_string()),
                );
                session.push_assistant(messages::sanction_failed(&error));
                self.transition(session, turn, FlowEvent::SanctionFailed)?;
            }
        }
        Ok(())
    }

    fn transition(
        &self,
        session: &mut Session,
        turn: &Turn,
        event: FlowEvent,
    ) -> Result<TransitionOutcome, ApplicationError> {
        let outcome = self
            .flow
            .apply_with_audit(
                &session.stage(),
                &event,
                &session.flow_context(),
                self.audit.as_ref(),
                &turn.audit,
            )
            .map_err(DomainError::from)?;
        session.apply_transition(&outcome)?;
        tracing::info!(
            event_name = "conversation.stage_changed",
            correlation_id = %turn.correlation_id(),
            session_id = %session.id(),
            stage = %outcome.to,
            from = %outcome.from,
            flow_event = ?outcome.event,
            "stage transition applied"
        );
        Ok(outcome)
    }

    fn refuse(
        &self,
        session: &mut Session,
        turn: &Turn,
        intent: &GuardrailIntent,
        reason_code: &'static str,
        user_message: String,
    ) {
        tracing::warn!(
            event_name = "guardrail.refused",
            correlation_id = %turn.correlation_id(),
            session_id = %session.id(),
            stage = %session.stage(),
            reason_code,
            step_count = session.step_count(),
            "message refused"
        );
        self.emit_guardrail_audit(turn, intent, reason_code);
        session.set_quick_replies(Vec::new());
        session.push_assistant(user_message);
    }

    fn emit_guardrail_audit(&self, turn: &Turn, intent: &GuardrailIntent, reason_code: &str) {
        self.audit.emit(
            self.event(turn, "guardrail.refused", AuditOutcome::Rejected)
                .with_metadata("action", intent.action_key())
                .with_metadata("reason_code", reason_code),
        );
    }

    fn emit_decision_audit(&self, turn: &Turn, decision: &Decision, interest_rate: f64) {
        let mut event = AuditEvent::new(
            turn.audit.session_id.clone(),
            turn.audit.correlation_id.clone(),
            "underwriting.decision",
            AuditCategory::Underwriting,
            ACTOR,
            AuditOutcome::Success,
        )
        .with_metadata("decision", decision.kind().as_str())
        .with_metadata("interest_rate", interest_rate.to_string());
        if let Some(rejection) = decision.rejection() {
            event = event.with_metadata("reason", rejection.reason().as_str());
        }
        self.audit.emit(event);
    }

    fn event(&self, turn: &Turn, event_type: &str, outcome: AuditOutcome) -> AuditEvent {
        let category = if event_type.starts_with("document.") {
            AuditCategory::Document
        } else {
            AuditCategory::Ingress
        };
        AuditEvent::new(
            turn.audit.session_id.clone(),
            turn.audit.correlation_id.clone(),
            event_type,
            category,
            ACTOR,
            outcome,
        )
    }

    fn log_gateway_failure(&self, turn: &Turn, collaborator: &'static str, error: &GatewayError) {
        tracing::warn!(
            event_name = "gateway.call_failed",
            correlation_id = %turn.correlation_id(),
            collaborator,
            not_found = error.is_not_found(),
            error = %error,
            "collaborator call failed"
        );
    }
}

fn verified_customer(profile: Option<&CustomerProfile>) -> Option<(CustomerId, f64)> {
    let profile = profile?;
    Some((profile.customer_id.clone(), profile.pre_approved_limit?))
}

async fn read_artifact(path: &Path) -> Result<Vec<u8>, ApplicationError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            Err(ApplicationError::NotFound("sanction letter file is missing".to_owned()))
        }
        Err(error) => Err(ApplicationError::Persistence(format!(
            "failed to read sanction letter `{}`: {error}",
            path.display()
        ))),
    }
}
