use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    documents::SanctionArtifact,
    domain::{
        customer::{CustomerId, CustomerProfile},
        loan::LoanRequest,
    },
    errors::DomainError,
    flows::{FlowContext, Stage, TransitionOutcome, CUSTOMER_PROFILE, LOAN_AMOUNT, TENURE_MONTHS},
    underwriting::{Decision, DecisionKind},
};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub value: String,
}

impl QuickReply {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingRecord {
    pub decision: Decision,
    pub interest_rate: f64,
    pub assessed_at: DateTime<Utc>,
}

impl UnderwritingRecord {
    pub fn new(decision: Decision, interest_rate: f64) -> Self {
        Self { decision, interest_rate, assessed_at: Utc::now() }
    }

    pub fn approved(&self) -> bool {
        self.decision.is_approved()
    }

    pub fn decision_kind(&self) -> DecisionKind {
        self.decision.kind()
    }

    pub fn computed_emi(&self) -> Option<f64> {
        self.decision.loan_details().map(|loan| loan.monthly_emi)
    }
}

/// State of one conversation. Mutators enforce the cross-field invariants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    id: SessionId,
    messages: Vec<ChatMessage>,
    stage: Stage,
    customer_id: Option<CustomerId>,
    customer_profile: Option<CustomerProfile>,
    loan_request: LoanRequest,
    stated_phone: Option<String>,
    stated_salary: Option<f64>,
    underwriting: Option<UnderwritingRecord>,
    requires_salary_slip: bool,
    step_count: u32,
    conversation_complete: bool,
    sanction_artifact: Option<SanctionArtifact>,
    quick_replies: Vec<QuickReply>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            messages: Vec::new(),
            stage: Stage::Sales,
            customer_id: None,
            customer_profile: None,
            loan_request: LoanRequest::default(),
            stated_phone: None,
            stated_salary: None,
            underwriting: None,
            requires_salary_slip: false,
            step_count: 0,
            conversation_complete: false,
            sanction_artifact: None,
            quick_replies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn customer_id(&self) -> Option<&CustomerId> {
        self.customer_id.as_ref()
    }

    pub fn customer_profile(&self) -> Option<&CustomerProfile> {
        self.customer_profile.as_ref()
    }

    pub fn loan_request(&self) -> &LoanRequest {
        &self.loan_request
    }

    pub fn stated_phone(&self) -> Option<&str> {
        self.stated_phone.as_deref()
    }

    pub fn stated_salary(&self) -> Option<f64> {
        self.stated_salary
    }

    pub fn underwriting(&self) -> Option<&UnderwritingRecord> {
        self.underwriting.as_ref()
    }

    pub fn is_approved(&self) -> bool {
        self.underwriting.as_ref().is_some_and(UnderwritingRecord::approved)
    }

    pub fn requires_salary_slip(&self) -> bool {
        self.requires_salary_slip
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.stage.awaits_confirmation()
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn conversation_complete(&self) -> bool {
        self.conversation_complete
    }

    pub fn sanction_artifact(&self) -> Option<&SanctionArtifact> {
        self.sanction_artifact.as_ref()
    }

    pub fn quick_replies(&self) -> &[QuickReply] {
        &self.quick_replies
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Appends an inbound message and counts it as one step.
    pub fn push_user(&mut self, content: impl Into<String>) -> u32 {
        self.messages.push(ChatMessage { role: Role::User, content: content.into() });
        self.step_count = self.step_count.saturating_add(1);
        self.touch();
        self.step_count
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage { role: Role::Assistant, content: content.into() });
        self.touch();
    }

    pub fn user_messages(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|message| message.role == Role::User)
            .map(|message| message.content.as_str())
    }

    pub fn set_quick_replies(&mut self, replies: Vec<QuickReply>) {
        self.quick_replies = replies;
    }

    /// Binds the customer on first assignment. Later ids are ignored.
    pub fn bind_customer(&mut self, customer_id: CustomerId) -> bool {
        if self.customer_id.is_some() {
            return false;
        }
        self.customer_id = Some(customer_id);
        self.touch();
        true
    }

    pub fn cache_profile(&mut self, profile: CustomerProfile) -> Result<(), DomainError> {
        match &self.customer_id {
            Some(bound) if *bound != profile.customer_id => {
                return Err(DomainError::InvariantViolation(format!(
                    "profile for `{}` does not belong to customer `{bound}`",
                    profile.customer_id
                )));
            }
            Some(_) => {}
            None => self.customer_id = Some(profile.customer_id.clone()),
        }
        self.customer_profile = Some(profile);
        self.touch();
        Ok(())
    }

    /// Merges stated loan requirements. A changed amount drops a pending income-proof request.
    pub fn merge_loan_request(&mut self, amount: Option<f64>, tenure_months: Option<u32>) -> bool {
        let amount_changed = self.loan_request.merge(amount, tenure_months);
        if amount_changed {
            self.requires_salary_slip = false;
        }
        self.touch();
        amount_changed
    }

    pub fn set_stated_phone(&mut self, phone: impl Into<String>) {
        self.stated_phone = Some(phone.into());
        self.touch();
    }

    pub fn flow_context(&self) -> FlowContext {
        let mut missing_required_fields = Vec::new();
        if self.loan_request.amount.is_none() {
            missing_required_fields.push(LOAN_AMOUNT.to_owned());
        }
        if self.loan_request.tenure_months.is_none() {
            missing_required_fields.push(TENURE_MONTHS.to_owned());
        }
        if self.customer_profile.is_none() {
            missing_required_fields.push(CUSTOMER_PROFILE.to_owned());
        }
        FlowContext { missing_required_fields }
    }

    pub fn apply_transition(&mut self, outcome: &TransitionOutcome) -> Result<(), DomainError> {
        if outcome.from != self.stage {
            return Err(DomainError::InvariantViolation(format!(
                "transition from {} applied to session at {}",
                outcome.from, self.stage
            )));
        }
        // A salary slip is only collected in sales; underwriting asks again if it still applies.
        if self.stage == Stage::Sales && outcome.to != Stage::Sales {
            self.requires_salary_slip = false;
        }
        self.stage = outcome.to;
        self.touch();
        Ok(())
    }

    /// Stores an underwriting decision. An approval is final for the session.
    pub fn record_underwriting(&mut self, record: UnderwritingRecord) -> Result<(), DomainError> {
        if self.is_approved() {
            return Err(DomainError::InvariantViolation(
                "underwriting result is already approved".to_owned(),
            ));
        }
        if record.approved()
            && (!self.loan_request.is_complete() || self.customer_profile.is_none())
        {
            return Err(DomainError::InvariantViolation(
                "approval requires a complete loan request and a verified profile".to_owned(),
            ));
        }
        self.requires_salary_slip = record.decision.requires_salary_slip();
        self.underwriting = Some(record);
        self.touch();
        Ok(())
    }

    pub fn record_salary(&mut self, amount: f64) -> Result<(), DomainError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "salary amount must be positive, got {amount}"
            )));
        }
        if !self.requires_salary_slip {
            return Err(DomainError::InvalidInput(
                "this application is not waiting for a salary slip".to_owned(),
            ));
        }
        self.stated_salary = Some(amount);
        self.requires_salary_slip = false;
        self.touch();
        Ok(())
    }

    pub fn attach_artifact(&mut self, artifact: SanctionArtifact) -> Result<(), DomainError> {
        if !self.is_approved() {
            return Err(DomainError::InvariantViolation(
                "sanction artifact requires an approved underwriting result".to_owned(),
            ));
        }
        self.sanction_artifact = Some(artifact);
        self.touch();
        Ok(())
    }

    pub fn mark_complete(&mut self) {
        self.conversation_complete = true;
        self.touch();
    }

    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            session_id: self.id.clone(),
            messages: self.messages.clone(),
            current_stage: self.stage,
            requires_salary_slip: self.requires_salary_slip,
            conversation_complete: self.conversation_complete,
            sanction_letter_available: self.sanction_artifact.is_some(),
            sanction_artifact_ref: self
                .sanction_artifact
                .as_ref()
                .map(|artifact| artifact.file_name.clone()),
            quick_replies: self.quick_replies.clone(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            current_stage: self.stage,
            customer_id: self.customer_id.clone(),
            loan_amount: self.loan_request.amount,
            tenure_months: self.loan_request.tenure_months,
            requires_salary_slip: self.requires_salary_slip,
            conversation_complete: self.conversation_complete,
            step_count: self.step_count,
            message_count: self.messages.len(),
            created_at: self.created_at,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Host-facing view of a session after one processed operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub session_id: SessionId,
    pub messages: Vec<ChatMessage>,
    pub current_stage: Stage,
    pub requires_salary_slip: bool,
    pub conversation_complete: bool,
    pub sanction_letter_available: bool,
    pub sanction_artifact_ref: Option<String>,
    pub quick_replies: Vec<QuickReply>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub current_stage: Stage,
    pub customer_id: Option<CustomerId>,
    pub loan_amount: Option<f64>,
    pub tenure_months: Option<u32>,
    pub requires_salary_slip: bool,
    pub conversation_complete: bool,
    pub step_count: u32,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
}
