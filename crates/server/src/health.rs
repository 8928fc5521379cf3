use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use loanline_agent::LoanAssistant;
use loanline_core::config::GatewayMode;

use crate::gateway_client::HttpGateways;

#[derive(Clone)]
pub struct HealthState {
    pub assistant: Arc<LoanAssistant>,
    pub gateway_mode: GatewayMode,
    pub http_gateways: Option<HttpGateways>,
    pub renders_pdf: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub sessions: HealthCheck,
    pub gateways: HealthCheck,
    pub documents: HealthCheck,
    pub active_sessions: usize,
    pub gateway_mode: GatewayMode,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let (sessions, active_sessions) = match state.assistant.session_count().await {
        Ok(count) => {
            (HealthCheck { status: "ready", detail: format!("{count} active sessions") }, count)
        }
        Err(error) => {
            let detail = format!("session store failed: {error}");
            (HealthCheck { status: "degraded", detail }, 0)
        }
    };
    let gateways = gateway_check(&state).await;
    let documents = if state.renders_pdf {
        HealthCheck { status: "ready", detail: "sanction letters rendered as PDF".to_owned() }
    } else {
        HealthCheck {
            status: "ready",
            detail: "wkhtmltopdf unavailable, sanction letters rendered as HTML".to_owned(),
        }
    };

    let ready = sessions.status == "ready" && gateways.status == "ready";
    if !ready {
        warn!(
            event_name = "system.health.degraded",
            sessions = sessions.status,
            gateways = gateways.status,
            "health check degraded"
        );
    }

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "loanline-server runtime initialized".to_owned(),
        },
        sessions,
        gateways,
        documents,
        active_sessions,
        gateway_mode: state.gateway_mode,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

async fn gateway_check(state: &HealthState) -> HealthCheck {
    match (&state.gateway_mode, &state.http_gateways) {
        (GatewayMode::Fixture, _) => {
            HealthCheck { status: "ready", detail: "serving embedded customer fixtures".to_owned() }
        }
        (GatewayMode::Http, Some(client)) => match client.probe().await {
            Ok(()) => HealthCheck {
                status: "ready",
                detail: format!("collaborators reachable at {}", client.base_url()),
            },
            Err(error) => HealthCheck {
                status: "degraded",
                detail: format!("collaborator probe failed: {error}"),
            },
        },
        (GatewayMode::Http, None) => HealthCheck {
            status: "degraded",
            detail: "http gateway mode without a configured client".to_owned(),
        },
    }
}
