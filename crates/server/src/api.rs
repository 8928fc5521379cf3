//! Chat API consumed by the web frontend.
//!
//! - `POST   /api/chat`: process one user message
//! - `POST   /api/upload-salary-slip`: submit income proof
//! - `POST   /api/start-conversation?customer_id=`: greet a known customer
//! - `GET    /api/download-sanction-letter/{session_id}`: download the generated letter
//! - `GET    /api/session/{session_id}`: session summary
//! - `DELETE /api/session/{session_id}`: drop a session

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use loanline_agent::LoanAssistant;
use loanline_core::domain::customer::CustomerId;
use loanline_core::domain::session::{
    ChatMessage, ConversationSnapshot, QuickReply, SessionId, SessionSummary,
};
use loanline_core::errors::{ApplicationError, DomainError, InterfaceError};
use loanline_core::flows::Stage;

#[derive(Clone)]
pub struct ApiState {
    assistant: Arc<LoanAssistant>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SalarySlipRequest {
    pub session_id: String,
    pub salary_amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct StartConversationQuery {
    pub customer_id: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub session_id: SessionId,
    pub messages: Vec<ChatMessage>,
    pub current_stage: Stage,
    pub requires_salary_slip: bool,
    pub conversation_complete: bool,
    pub sanction_letter_available: bool,
    pub quick_replies: Vec<QuickReply>,
}

impl From<ConversationSnapshot> for ChatResponse {
    fn from(snapshot: ConversationSnapshot) -> Self {
        Self {
            session_id: snapshot.session_id,
            messages: snapshot.messages,
            current_stage: snapshot.current_stage,
            requires_salary_slip: snapshot.requires_salary_slip,
            conversation_complete: snapshot.conversation_complete,
            sanction_letter_available: snapshot.sanction_letter_available,
            quick_replies: snapshot.quick_replies,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub session_id: SessionId,
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    pub correlation_id: String,
}

/// Maps application failures onto HTTP statuses with a user-safe body.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    fn from_application(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            InterfaceError::BadRequest { .. } => (StatusCode::BAD_REQUEST, "bad_request"),
            InterfaceError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            InterfaceError::ServiceUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "service_unavailable")
            }
            InterfaceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        let message = match &self.0 {
            InterfaceError::Internal { .. } | InterfaceError::ServiceUnavailable { .. } => {
                self.0.user_message().to_owned()
            }
            other => other.message().to_owned(),
        };
        let body = ErrorBody {
            error: code,
            message,
            correlation_id: self.0.correlation_id().to_owned(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(assistant: Arc<LoanAssistant>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/upload-salary-slip", post(upload_salary_slip))
        .route("/api/start-conversation", post(start_conversation))
        .route("/api/download-sanction-letter/{session_id}", get(download_sanction_letter))
        .route("/api/session/{session_id}", get(session_summary).delete(delete_session))
        .with_state(ApiState { assistant })
}

fn correlation_id() -> String {
    format!("req-{}", Uuid::new_v4())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|raw| raw.trim().to_owned()).filter(|raw| !raw.is_empty())
}

fn log_failure(route: &'static str, correlation_id: &str, error: &ApplicationError) {
    warn!(
        event_name = "api.request_failed",
        route,
        correlation_id = %correlation_id,
        error = %error,
        "request failed"
    );
}

async fn chat(
    State(state): State<ApiState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let correlation_id = correlation_id();
    let session_id = non_blank(request.session_id).map(SessionId::new);
    let customer_id = non_blank(request.customer_id).map(CustomerId::new);
    info!(
        event_name = "api.chat_received",
        correlation_id = %correlation_id,
        session_id = session_id.as_ref().map(SessionId::as_str).unwrap_or("new"),
        "chat message received"
    );

    let snapshot = state
        .assistant
        .process_message(session_id, customer_id, &request.message)
        .await
        .map_err(|error| {
            log_failure("chat", &correlation_id, &error);
            ApiError::from_application(error, &correlation_id)
        })?;
    Ok(Json(snapshot.into()))
}

async fn upload_salary_slip(
    State(state): State<ApiState>,
    Json(request): Json<SalarySlipRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let correlation_id = correlation_id();
    let session_id = SessionId::new(request.session_id);
    let snapshot = state
        .assistant
        .submit_salary(&session_id, request.salary_amount)
        .await
        .map_err(|error| {
            log_failure("upload_salary_slip", &correlation_id, &error);
            ApiError::from_application(error, &correlation_id)
        })?;
    Ok(Json(snapshot.into()))
}

async fn start_conversation(
    State(state): State<ApiState>,
    Query(query): Query<StartConversationQuery>,
) -> ApiResult<Json<ChatResponse>> {
    let correlation_id = correlation_id();
    let Some(customer_id) = non_blank(Some(query.customer_id)) else {
        let error = DomainError::InvalidInput("customer_id must not be empty".to_owned()).into();
        return Err(ApiError::from_application(error, &correlation_id));
    };
    let snapshot = state
        .assistant
        .start_conversation(CustomerId::new(customer_id))
        .await
        .map_err(|error| {
            log_failure("start_conversation", &correlation_id, &error);
            ApiError::from_application(error, &correlation_id)
        })?;
    Ok(Json(snapshot.into()))
}

async fn download_sanction_letter(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> ApiResult<Response> {
    let correlation_id = correlation_id();
    let download =
        state.assistant.download_artifact(&SessionId::new(session_id)).await.map_err(|error| {
            log_failure("download_sanction_letter", &correlation_id, &error);
            ApiError::from_application(error, &correlation_id)
        })?;

    let disposition = format!("attachment; filename=\"{}\"", download.file_name);
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, download.content_type), (header::CONTENT_DISPOSITION, disposition)],
        download.bytes,
    )
        .into_response())
}

async fn session_summary(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionSummary>> {
    let correlation_id = correlation_id();
    let summary =
        state.assistant.session_summary(&SessionId::new(session_id)).await.map_err(|error| {
            ApiError::from_application(error, &correlation_id)
        })?;
    Ok(Json(summary))
}

async fn delete_session(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let correlation_id = correlation_id();
    let session_id = SessionId::new(session_id);
    let deleted = state.assistant.delete_session(&session_id).await.map_err(|error| {
        log_failure("delete_session", &correlation_id, &error);
        ApiError::from_application(error, &correlation_id)
    })?;
    if !deleted {
        return Err(ApiError::from_application(
            ApplicationError::SessionNotFound(session_id),
            &correlation_id,
        ));
    }
    Ok(Json(DeleteResponse { session_id, deleted }))
}
