use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use loanline_agent::{AssistantSettings, LoanAssistant, STEP_LIMIT_MESSAGE};
use loanline_core::audit::InMemoryAuditSink;
use loanline_core::documents::{
    artifact_file_name, loan_account_number, sanction_reference, DocumentEmitter, DocumentError,
    SanctionArtifact,
};
use loanline_core::domain::customer::{CustomerId, CustomerProfile};
use loanline_core::domain::loan::LoanDetails;
use loanline_core::domain::session::{ConversationSnapshot, Role, SessionId};
use loanline_core::errors::{ApplicationError, DomainError};
use loanline_core::flows::Stage;
use loanline_core::gateways::{CustomerProfileGateway, GatewayError, Gateways};
use loanline_store::{FixtureGateways, InMemorySessionStore};

#[tokio::test]
async fn instant_approval_reaches_sanction_letter() {
    let harness = Harness::new();

    let snapshot = harness.say(None, Some("CUST001"), "I need 50000 for 12 months").await;
    assert_eq!(snapshot.current_stage, Stage::AwaitingVerificationConfirmation);
    assert_eq!(reply_values(&snapshot), ["proceed_verification", "change_details"]);
    let session_id = snapshot.session_id.clone();

    let snapshot = harness.say(Some(&session_id), None, "proceed_verification").await;
    assert_eq!(snapshot.current_stage, Stage::AwaitingUnderwritingConfirmation);

    let snapshot = harness.say(Some(&session_id), None, "proceed_underwriting").await;
    assert_eq!(snapshot.current_stage, Stage::AwaitingSanctionConfirmation);
    assert_eq!(reply_values(&snapshot), ["generate_sanction", "email_later"]);

    let snapshot = harness.say(Some(&session_id), None, "generate_sanction").await;
    assert_eq!(snapshot.current_stage, Stage::End);
    assert!(snapshot.conversation_complete);
    assert!(snapshot.sanction_letter_available);
    assert!(snapshot.quick_replies.is_empty());

    let download =
        harness.assistant.download_artifact(&session_id).await.expect("artifact downloads");
    assert_eq!(Some(download.file_name.clone()), snapshot.sanction_artifact_ref);
    assert!(download.file_name.starts_with("sanction_letter_CUST001_"));
    assert!(String::from_utf8_lossy(&download.bytes).contains("Rajesh Kumar"));

    let decisions: Vec<_> = harness
        .audit
        .events()
        .into_iter()
        .filter(|event| event.event_type == "underwriting.decision")
        .collect();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].metadata["decision"], "instant_approval");
    assert_eq!(decisions[0].metadata["interest_rate"], "11.25");
}

#[tokio::test]
async fn denial_keeps_collected_loan_fields() {
    let harness = Harness::new();
    let snapshot = harness.say(None, Some("CUST001"), "50000 for 12 months please").await;
    let session_id = snapshot.session_id.clone();

    let snapshot = harness.say(Some(&session_id), None, "no").await;
    assert_eq!(snapshot.current_stage, Stage::Sales);

    let summary = harness.assistant.session_summary(&session_id).await.expect("summary");
    assert_eq!(summary.loan_amount, Some(50_000.0));
    assert_eq!(summary.tenure_months, Some(12));
}

#[tokio::test]
async fn denial_with_new_amount_is_summarised_again() {
    let harness = Harness::new();
    let snapshot = harness.say(None, Some("CUST001"), "50000 for 12 months").await;
    let session_id = snapshot.session_id.clone();

    let snapshot = harness.say(Some(&session_id), None, "no, make it 2 lakh").await;
    assert_eq!(snapshot.current_stage, Stage::AwaitingVerificationConfirmation);

    let summary = harness.assistant.session_summary(&session_id).await.expect("summary");
    assert_eq!(summary.loan_amount, Some(200_000.0));
    assert_eq!(summary.tenure_months, Some(12));
}

#[tokio::test]
async fn unclear_answer_repeats_the_prompt() {
    let harness = Harness::new();
    let snapshot = harness.say(None, Some("CUST001"), "50000 for 12 months").await;
    let session_id = snapshot.session_id.clone();

    let snapshot = harness.say(Some(&session_id), None, "what does that mean?").await;
    assert_eq!(snapshot.current_stage, Stage::AwaitingVerificationConfirmation);
    assert_eq!(reply_values(&snapshot), ["proceed_verification", "change_details"]);
}

#[tokio::test]
async fn messages_past_the_step_ceiling_are_refused() {
    let harness = Harness::with_settings(AssistantSettings { max_steps: 3, ..Default::default() });
    let snapshot = harness.say(None, Some("CUST001"), "50000 for 12 months").await;
    let session_id = snapshot.session_id.clone();
    harness.say(Some(&session_id), None, "hmm").await;
    harness.say(Some(&session_id), None, "hmm").await;

    for _ in 0..2 {
        let snapshot = harness.say(Some(&session_id), None, "yes").await;
        assert_eq!(snapshot.current_stage, Stage::AwaitingVerificationConfirmation);
        assert_eq!(last_reply(&snapshot), STEP_LIMIT_MESSAGE);
        assert!(snapshot.quick_replies.is_empty());
    }

    let summary = harness.assistant.session_summary(&session_id).await.expect("summary");
    assert_eq!(summary.step_count, 5);
    assert!(harness
        .audit
        .events()
        .iter()
        .any(|event| event.event_type == "guardrail.refused"
            && event.metadata["reason_code"] == "step_limit_exceeded"));
}

#[tokio::test]
async fn amount_above_limit_waits_for_salary_then_approves() {
    let harness = Harness::new();
    let session_id = harness.reach_underwriting("CUST003", "150000 for 12 months").await;

    let snapshot = harness.say(Some(&session_id), None, "yes").await;
    assert_eq!(snapshot.current_stage, Stage::Sales);
    assert!(snapshot.requires_salary_slip);
    assert!(last_reply(&snapshot).contains("13,292"));

    let snapshot =
        harness.assistant.submit_salary(&session_id, 45_000.0).await.expect("salary accepted");
    assert_eq!(snapshot.current_stage, Stage::AwaitingSanctionConfirmation);
    assert!(!snapshot.requires_salary_slip);

    let summary = harness.assistant.session_summary(&session_id).await.expect("summary");
    assert_eq!(summary.step_count, 3, "salary submission is not a conversation step");
}

#[tokio::test]
async fn restated_tenure_while_waiting_for_salary_reassesses_before_asking_again() {
    let harness = Harness::new();
    let session_id = harness.reach_underwriting("CUST003", "150000 for 12 months").await;
    let snapshot = harness.say(Some(&session_id), None, "yes").await;
    assert!(snapshot.requires_salary_slip);

    let snapshot = harness.say(Some(&session_id), None, "make it 24 months").await;
    assert_eq!(snapshot.current_stage, Stage::AwaitingVerificationConfirmation);
    assert!(!snapshot.requires_salary_slip);

    let error = harness
        .assistant
        .submit_salary(&session_id, 60_000.0)
        .await
        .expect_err("salary is not pending outside sales");
    assert!(matches!(error, ApplicationError::Domain(DomainError::InvalidInput(_))));

    let snapshot = harness.say(Some(&session_id), None, "yes").await;
    assert_eq!(snapshot.current_stage, Stage::AwaitingUnderwritingConfirmation);
    let snapshot = harness.say(Some(&session_id), None, "yes").await;
    assert_eq!(snapshot.current_stage, Stage::Sales);
    assert!(snapshot.requires_salary_slip);

    let snapshot =
        harness.assistant.submit_salary(&session_id, 60_000.0).await.expect("salary accepted");
    assert_eq!(snapshot.current_stage, Stage::AwaitingSanctionConfirmation);
    assert!(last_reply(&snapshot).contains("7,026"));
}

#[tokio::test]
async fn salary_with_high_emi_ratio_is_rejected() {
    let harness = Harness::new();
    let session_id = harness.reach_underwriting("CUST003", "150000 for 12 months").await;
    harness.say(Some(&session_id), None, "yes").await;

    let snapshot =
        harness.assistant.submit_salary(&session_id, 20_000.0).await.expect("salary accepted");
    assert_eq!(snapshot.current_stage, Stage::Sales);
    assert!(!snapshot.requires_salary_slip);
    assert!(!snapshot.sanction_letter_available);
}

#[tokio::test]
async fn salary_is_refused_when_not_requested() {
    let harness = Harness::new();
    let snapshot = harness.say(None, Some("CUST001"), "50000 for 12 months").await;

    let error = harness
        .assistant
        .submit_salary(&snapshot.session_id, 60_000.0)
        .await
        .expect_err("no salary slip pending");
    assert!(matches!(error, ApplicationError::Domain(DomainError::InvalidInput(_))));

    let missing = harness
        .assistant
        .submit_salary(&SessionId::new("missing"), 60_000.0)
        .await
        .expect_err("unknown session");
    assert!(matches!(missing, ApplicationError::SessionNotFound(_)));
}

#[tokio::test]
async fn low_credit_score_is_rejected() {
    let harness = Harness::new();
    let session_id = harness.reach_underwriting("CUST004", "100000 for 24 months").await;

    let snapshot = harness.say(Some(&session_id), None, "yes").await;
    assert_eq!(snapshot.current_stage, Stage::Sales);
    assert!(!snapshot.requires_salary_slip);

    let decision = harness
        .audit
        .events()
        .into_iter()
        .find(|event| event.event_type == "underwriting.decision")
        .expect("decision audited");
    assert_eq!(decision.metadata["reason"], "credit_score");
}

#[tokio::test]
async fn unknown_customer_fails_verification() {
    let harness = Harness::new();
    let snapshot = harness.say(None, Some("CUST999"), "50000 for 12 months").await;

    let snapshot = harness.say(Some(&snapshot.session_id), None, "yes").await;
    assert_eq!(snapshot.current_stage, Stage::Sales);
    assert!(snapshot.quick_replies.is_empty());
}

#[tokio::test]
async fn mismatched_phone_fails_verification() {
    let harness = Harness::new();
    let snapshot = harness
        .say(None, Some("CUST001"), "50000 for 12 months, my phone number is 9123456789")
        .await;

    let snapshot = harness.say(Some(&snapshot.session_id), None, "yes").await;
    assert_eq!(snapshot.current_stage, Stage::Sales);
    assert!(last_reply(&snapshot).contains("phone"));
}

#[tokio::test]
async fn unavailable_profile_service_keeps_verification_pending() {
    let fixtures = Arc::new(FixtureGateways::embedded().expect("fixtures"));
    let mut gateways = Gateways::uniform(fixtures);
    gateways.profiles = Arc::new(UnavailableProfiles);
    let harness = Harness::build(gateways, AssistantSettings::default(), Emitter::Directory);

    let snapshot = harness.say(None, Some("CUST001"), "50000 for 12 months").await;
    let session_id = snapshot.session_id.clone();

    let snapshot = harness.say(Some(&session_id), None, "yes").await;
    assert_eq!(snapshot.current_stage, Stage::Verification);

    let snapshot = harness.say(Some(&session_id), None, "please try again").await;
    assert_eq!(snapshot.current_stage, Stage::Verification);
}

#[tokio::test]
async fn email_later_closes_without_a_letter() {
    let harness = Harness::new();
    let session_id = harness.reach_sanction("CUST001").await;

    let snapshot = harness.say(Some(&session_id), None, "email_later").await;
    assert_eq!(snapshot.current_stage, Stage::End);
    assert!(snapshot.conversation_complete);
    assert!(!snapshot.sanction_letter_available);
    assert!(last_reply(&snapshot).contains("rajesh.kumar@email.com"));

    let error = harness.assistant.download_artifact(&session_id).await.expect_err("no letter");
    assert!(matches!(error, ApplicationError::NotFound(_)));
}

#[tokio::test]
async fn failed_letter_ends_without_completion() {
    let fixtures = Arc::new(FixtureGateways::embedded().expect("fixtures"));
    let harness = Harness::build(
        Gateways::uniform(fixtures),
        AssistantSettings::default(),
        Emitter::Failing,
    );
    let session_id = harness.reach_sanction("CUST001").await;

    let snapshot = harness.say(Some(&session_id), None, "generate_sanction").await;
    assert_eq!(snapshot.current_stage, Stage::End);
    assert!(!snapshot.conversation_complete);
    assert!(!snapshot.sanction_letter_available);
}

#[tokio::test]
async fn messages_after_the_end_do_not_reopen_the_flow() {
    let harness = Harness::new();
    let session_id = harness.reach_sanction("CUST001").await;
    harness.say(Some(&session_id), None, "email_later").await;

    let snapshot = harness.say(Some(&session_id), None, "I want another 80000 for 6 months").await;
    assert_eq!(snapshot.current_stage, Stage::End);
    assert_eq!(snapshot.messages.last().map(|message| message.role), Some(Role::Assistant));
}

#[tokio::test]
async fn greeting_uses_first_name_and_unknown_ids_start_sessions() {
    let harness = Harness::new();
    let snapshot = harness
        .assistant
        .start_conversation(CustomerId::new("CUST001"))
        .await
        .expect("conversation starts");
    assert_eq!(snapshot.current_stage, Stage::Sales);
    assert!(last_reply(&snapshot).contains("Rajesh"));

    let fresh = harness.say(Some(&SessionId::new("client-chosen")), None, "hello").await;
    assert_eq!(fresh.session_id, SessionId::new("client-chosen"));
    assert_eq!(fresh.current_stage, Stage::Sales);
    assert_eq!(harness.assistant.session_count().await.expect("count"), 2);
}

#[tokio::test]
async fn blank_messages_are_rejected_and_sessions_can_be_deleted() {
    let harness = Harness::new();
    let error = harness.assistant.process_message(None, None, "   ").await.expect_err("blank");
    assert!(matches!(error, ApplicationError::Domain(DomainError::InvalidInput(_))));

    let snapshot = harness.say(None, None, "hello").await;
    assert!(harness.assistant.delete_session(&snapshot.session_id).await.expect("delete"));
    assert!(!harness.assistant.delete_session(&snapshot.session_id).await.expect("delete"));
    let missing = harness.assistant.session_summary(&snapshot.session_id).await;
    assert!(matches!(missing, Err(ApplicationError::SessionNotFound(_))));
}

#[tokio::test]
async fn concurrent_messages_for_one_session_are_all_applied() {
    let harness = Arc::new(Harness::new());
    let snapshot = harness.say(None, None, "hello").await;
    let session_id = snapshot.session_id.clone();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let harness = Arc::clone(&harness);
        let session_id = session_id.clone();
        handles.push(tokio::spawn(async move {
            harness.say(Some(&session_id), None, "still thinking").await
        }));
    }
    for handle in handles {
        handle.await.expect("task joins");
    }

    let summary = harness.assistant.session_summary(&session_id).await.expect("summary");
    assert_eq!(summary.step_count, 5);
    assert_eq!(summary.message_count, 10);
}

enum Emitter {
    Directory,
    Failing,
}

struct Harness {
    assistant: LoanAssistant,
    audit: InMemoryAuditSink,
    _output: TempDir,
}

impl Harness {
    fn new() -> Self {
        Self::with_settings(AssistantSettings::default())
    }

    fn with_settings(settings: AssistantSettings) -> Self {
        let fixtures = Arc::new(FixtureGateways::embedded().expect("fixtures"));
        Self::build(Gateways::uniform(fixtures), settings, Emitter::Directory)
    }

    fn build(gateways: Gateways, settings: AssistantSettings, emitter: Emitter) -> Self {
        let output = TempDir::new().expect("temp dir");
        let emitter: Arc<dyn DocumentEmitter> = match emitter {
            Emitter::Directory => Arc::new(DirectoryEmitter { dir: output.path().to_path_buf() }),
            Emitter::Failing => Arc::new(FailingEmitter),
        };
        let audit = InMemoryAuditSink::default();
        let assistant = LoanAssistant::new(
            Arc::new(InMemorySessionStore::default()),
            gateways,
            emitter,
            settings,
        )
        .with_audit_sink(Arc::new(audit.clone()));
        Self { assistant, audit, _output: output }
    }

    async fn say(
        &self,
        session_id: Option<&SessionId>,
        customer_id: Option<&str>,
        text: &str,
    ) -> ConversationSnapshot {
        self.assistant
            .process_message(session_id.cloned(), customer_id.map(CustomerId::new), text)
            .await
            .expect("message processed")
    }

    async fn reach_underwriting(&self, customer_id: &str, request: &str) -> SessionId {
        let snapshot = self.say(None, Some(customer_id), request).await;
        let session_id = snapshot.session_id.clone();
        let snapshot = self.say(Some(&session_id), None, "yes").await;
        assert_eq!(snapshot.current_stage, Stage::AwaitingUnderwritingConfirmation);
        session_id
    }

    async fn reach_sanction(&self, customer_id: &str) -> SessionId {
        let session_id = self.reach_underwriting(customer_id, "50000 for 12 months").await;
        let snapshot = self.say(Some(&session_id), None, "yes").await;
        assert_eq!(snapshot.current_stage, Stage::AwaitingSanctionConfirmation);
        session_id
    }
}

fn reply_values(snapshot: &ConversationSnapshot) -> Vec<&str> {
    snapshot.quick_replies.iter().map(|reply| reply.value.as_str()).collect()
}

fn last_reply(snapshot: &ConversationSnapshot) -> &str {
    snapshot
        .messages
        .iter()
        .rev()
        .find(|message| message.role == Role::Assistant)
        .map(|message| message.content.as_str())
        .unwrap_or_default()
}

struct DirectoryEmitter {
    dir: std::path::PathBuf,
}

#[async_trait]
impl DocumentEmitter for DirectoryEmitter {
    async fn generate(
        &self,
        profile: &CustomerProfile,
        loan: &LoanDetails,
    ) -> Result<SanctionArtifact, DocumentError> {
        let now = Utc::now();
        let reference_number = sanction_reference(now);
        let file_name = artifact_file_name(profile, now.date_naive(), &reference_number, "html");
        let path = self.dir.join(&file_name);
        let body = format!("<p>{} sanctioned {}</p>", profile.name, loan.loan_amount);
        tokio::fs::write(&path, body).await.map_err(|error| DocumentError::Io(error.to_string()))?;
        Ok(SanctionArtifact {
            file_name,
            path,
            content_type: "text/html".to_owned(),
            reference_number,
            loan_account_number: loan_account_number(now),
            generated_at: now,
        })
    }
}

struct FailingEmitter;

#[async_trait]
impl DocumentEmitter for FailingEmitter {
    async fn generate(
        &self,
        _profile: &CustomerProfile,
        _loan: &LoanDetails,
    ) -> Result<SanctionArtifact, DocumentError> {
        Err(DocumentError::Conversion("renderer exited with status 1".to_owned()))
    }
}

struct UnavailableProfiles;

#[async_trait]
impl CustomerProfileGateway for UnavailableProfiles {
    async fn customer(&self, _id: &CustomerId) -> Result<CustomerProfile, GatewayError> {
        Err(GatewayError::Unavailable("connection refused".to_owned()))
    }
}
