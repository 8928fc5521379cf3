use anyhow::Result;
use async_trait::async_trait;

use loanline_core::flows::Confirmation;

use crate::confirmation::{ConfirmationClassifier, ConfirmationPrompt, KeywordClassifier};

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Asks a language model to label the answer. Falls back to the keyword vocabulary when the
/// model fails or answers outside the three labels.
pub struct LlmConfirmationClassifier<C> {
    client: C,
    fallback: KeywordClassifier,
}

impl<C> LlmConfirmationClassifier<C>
where
    C: LlmClient,
{
    pub fn new(client: C) -> Self {
        Self { client, fallback: KeywordClassifier }
    }
}

#[async_trait]
impl<C> ConfirmationClassifier for LlmConfirmationClassifier<C>
where
    C: LlmClient,
{
    async fn classify(&self, prompt: ConfirmationPrompt, text: &str) -> Confirmation {
        let request = classification_prompt(prompt, text);
        match self.client.complete(&request).await {
            Ok(reply) => match parse_label(&reply) {
                Some(label) => label,
                None => {
                    tracing::debug!(
                        event_name = "confirmation.unparsed_label",
                        prompt = prompt.as_str(),
                        "language model reply carried no label"
                    );
                    self.fallback.classify_text(prompt, text)
                }
            },
            Err(error) => {
                tracing::warn!(
                    event_name = "confirmation.llm_failed",
                    prompt = prompt.as_str(),
                    error = %error,
                    "falling back to keyword confirmation"
                );
                self.fallback.classify_text(prompt, text)
            }
        }
    }
}

fn classification_prompt(prompt: ConfirmationPrompt, text: &str) -> String {
    let question = match prompt {
        ConfirmationPrompt::Verification => {
            "We asked whether to proceed with verifying the customer's details for the loan \
             summary shown. AFFIRM means proceed, DENY means the customer wants to change details."
        }
        ConfirmationPrompt::Underwriting => {
            "We showed the customer's verified profile and asked whether it is correct. AFFIRM \
             means the details are correct, DENY means something must be updated."
        }
        ConfirmationPrompt::Sanction => {
            "We asked whether to generate the sanction letter now. AFFIRM means generate now, \
             DENY means email it later."
        }
    };
    format!(
        "{question}\nClassify the customer's reply as exactly one word: AFFIRM, DENY or UNCLEAR.\n\
         Reply: \"{}\"",
        text.replace('"', "'")
    )
}

fn parse_label(reply: &str) -> Option<Confirmation> {
    let label = reply.trim().trim_matches(|c: char| !c.is_ascii_alphabetic()).to_ascii_uppercase();
    match label.split_whitespace().next()? {
        "AFFIRM" => Some(Confirmation::Affirm),
        "DENY" => Some(Confirmation::Deny),
        "UNCLEAR" => Some(Confirmation::Unclear),
        _ => None,
    }
}
