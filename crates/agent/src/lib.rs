//! Conversation runtime of the loan application assistant.
//!
//! Each inbound message goes through a fixed loop:
//! 1. **Guardrails** (`guardrails`) - refuse messages past the step ceiling
//! 2. **Extraction** (`conversation`) - pull amounts, tenures, phones and customer ids from text
//! 3. **Confirmation** (`confirmation`, `llm`) - label answers to pending proposals
//! 4. **Stage handling** (`runtime`) - drive the flow engine and the collaborators
//! 5. **Replies** (`messages`) - render the assistant's text and quick replies
//!
//! The language model only labels confirmations. Eligibility, rates and stage changes are
//! decided by `loanline-core`.

pub mod confirmation;
pub mod conversation;
pub mod guardrails;
pub mod llm;
pub mod messages;
pub mod runtime;

pub use confirmation::{ConfirmationClassifier, ConfirmationPrompt, KeywordClassifier};
pub use conversation::{RequirementExtractor, StatedRequirements};
pub use guardrails::{GuardrailDecision, GuardrailIntent, GuardrailPolicy, STEP_LIMIT_MESSAGE};
pub use llm::{LlmClient, LlmConfirmationClassifier};
pub use runtime::{ArtifactDownload, AssistantSettings, LoanAssistant};
