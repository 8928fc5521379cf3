use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use loanline_core::flows::{Confirmation, Stage};

/// The proposal a user is answering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationPrompt {
    /// Proceed to identity verification, or change the loan details.
    Verification,
    /// The presented profile is correct and underwriting may run.
    Underwriting,
    /// Generate the sanction letter now (affirm) or have it emailed later (deny).
    Sanction,
}

impl ConfirmationPrompt {
    pub fn for_stage(stage: Stage) -> Option<Self> {
        match stage {
            Stage::AwaitingVerificationConfirmation => Some(Self::Verification),
            Stage::AwaitingUnderwritingConfirmation => Some(Self::Underwriting),
            Stage::AwaitingSanctionConfirmation => Some(Self::Sanction),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verification => "verification",
            Self::Underwriting => "underwriting",
            Self::Sanction => "sanction",
        }
    }

    fn affirm_words(self) -> &'static [&'static str] {
        match self {
            Self::Verification => {
                &["yes", "yeah", "yep", "proceed", "proceed_verification", "ok", "okay", "sure"]
            }
            Self::Underwriting => &["yes", "yeah", "proceed", "correct", "proceed_underwriting"],
            Self::Sanction => &["generate", "sanction", "yes", "generate_sanction"],
        }
    }

    fn deny_words(self) -> &'static [&'static str] {
        match self {
            Self::Verification => &["no", "nope", "change", "change_details"],
            Self::Underwriting => {
                &["no", "update", "update_details", "wrong", "incorrect", "not"]
            }
            Self::Sanction => &["email", "later", "email_later"],
        }
    }
}

/// Maps a free-text answer onto `Affirm`, `Deny` or `Unclear` before it reaches the flow.
#[async_trait]
pub trait ConfirmationClassifier: Send + Sync {
    async fn classify(&self, prompt: ConfirmationPrompt, text: &str) -> Confirmation;
}

/// Vocabulary match over whole words. Answers that contain both an affirmative and a
/// negative word are unclear.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn classify_text(&self, prompt: ConfirmationPrompt, text: &str) -> Confirmation {
        let tokens = tokenize(text);
        let has_any = |words: &[&str]| tokens.iter().any(|token| words.contains(&token.as_str()));

        match (has_any(prompt.affirm_words()), has_any(prompt.deny_words())) {
            (true, false) => Confirmation::Affirm,
            (false, true) => Confirmation::Deny,
            _ => Confirmation::Unclear,
        }
    }
}

#[async_trait]
impl ConfirmationClassifier for KeywordClassifier {
    async fn classify(&self, prompt: ConfirmationPrompt, text: &str) -> Confirmation {
        self.classify_text(prompt, text)
    }
}

fn tokenize(text: &str) -> Vec<String> {
    let sanitized: String = text
        .to_lowercase()
        .chars()
        .map(|character| {
            if character.is_alphanumeric() || character == '_' { character } else { ' ' }
        })
        .collect();
    sanitized.split_whitespace().map(str::to_owned).collect()
}
