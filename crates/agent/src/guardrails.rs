pub const STEP_LIMIT_MESSAGE: &str =
    "I apologize, but we've reached the conversation limit. Please start a new session.";

#[derive(Clone, Debug, PartialEq)]
pub enum GuardrailIntent {
    /// A chat message, counted after it has been appended to the session.
    InboundMessage { session_id: String, step_count: u32 },
    /// Income proof submitted through the salary side channel.
    SalarySubmission { session_id: String, awaiting_salary_slip: bool, salary_amount: f64 },
}

impl GuardrailIntent {
    pub fn session_id(&self) -> &str {
        match self {
            Self::InboundMessage { session_id, .. } | Self::SalarySubmission { session_id, .. } => {
                session_id
            }
        }
    }

    pub fn action_key(&self) -> &'static str {
        match self {
            Self::InboundMessage { .. } => "conversation.inbound_message",
            Self::SalarySubmission { .. } => "underwriting.salary_submission",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow,
    Deny { reason_code: &'static str, user_message: String, fallback_path: &'static str },
}

impl GuardrailDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    pub max_steps: u32,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self { max_steps: 10 }
    }
}

impl GuardrailPolicy {
    pub fn with_max_steps(max_steps: u32) -> Self {
        Self { max_steps }
    }

    pub fn evaluate(&self, intent: &GuardrailIntent) -> GuardrailDecision {
        match intent {
            GuardrailIntent::InboundMessage { step_count, .. } if *step_count > self.max_steps => {
                GuardrailDecision::Deny {
                    reason_code: "step_limit_exceeded",
                    user_message: STEP_LIMIT_MESSAGE.to_string(),
                    fallback_path: "start_new_session",
                }
            }
            GuardrailIntent::InboundMessage { .. } => GuardrailDecision::Allow,
            GuardrailIntent::SalarySubmission { salary_amount, .. }
                if !salary_amount.is_finite() || *salary_amount <= 0.0 =>
            {
                GuardrailDecision::Deny {
                    reason_code: "invalid_salary_amount",
                    user_message: "Salary amount must be a positive number.".to_string(),
                    fallback_path: "resubmit_salary",
                }
            }
            GuardrailIntent::SalarySubmission { awaiting_salary_slip: false, .. } => {
                GuardrailDecision::Deny {
                    reason_code: "salary_not_requested",
                    user_message: "This application is not waiting for a salary slip."
                        .to_string(),
                    fallback_path: "continue_conversation",
                }
            }
            GuardrailIntent::SalarySubmission { .. } => GuardrailDecision::Allow,
        }
    }
}
