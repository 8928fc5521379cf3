use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use loanline_agent::{
    AssistantSettings, ConfirmationClassifier, KeywordClassifier, LlmConfirmationClassifier,
    LoanAssistant,
};
use loanline_core::config::{AppConfig, ClassifierMode, ConfigError, GatewayMode, LoadOptions};
use loanline_core::documents::DocumentError;
use loanline_core::gateways::{GatewayError, Gateways};
use loanline_store::{CustomerDataset, FixtureGateways, InMemorySessionStore, StoreError};

use crate::gateway_client::HttpGateways;
use crate::health::HealthState;
use crate::llm_client::ChatCompletionsClient;
use crate::sanction_letter::SanctionLetterEmitter;

pub struct Application {
    pub config: AppConfig,
    pub assistant: Arc<LoanAssistant>,
    pub dataset: Arc<CustomerDataset>,
    pub http_gateways: Option<HttpGateways>,
    pub renders_pdf: bool,
}

impl Application {
    pub fn health_state(&self) -> HealthState {
        HealthState {
            assistant: self.assistant.clone(),
            gateway_mode: self.config.gateways.mode,
            http_gateways: self.http_gateways.clone(),
            renders_pdf: self.renders_pdf,
        }
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("customer fixtures could not be loaded: {0}")]
    Fixtures(#[source] StoreError),
    #[error("sanction letter renderer could not be initialized: {0}")]
    Documents(#[source] DocumentError),
    #[error("collaborator client could not be built: {0}")]
    Gateway(#[source] GatewayError),
    #[error("confirmation classifier could not be built: {0}")]
    Classifier(String),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        gateway_mode = ?config.gateways.mode,
        "starting application bootstrap"
    );

    let dataset = match &config.gateways.fixtures_path {
        Some(path) => CustomerDataset::from_path(path),
        None => CustomerDataset::embedded(),
    }
    .map_err(BootstrapError::Fixtures)?;
    info!(
        event_name = "system.bootstrap.fixtures_loaded",
        correlation_id = "bootstrap",
        customers = dataset.customers().len(),
        "customer fixtures loaded"
    );

    let (gateways, http_gateways) = match config.gateways.mode {
        GatewayMode::Fixture => {
            (Gateways::uniform(Arc::new(FixtureGateways::new(dataset.clone()))), None)
        }
        GatewayMode::Http => {
            let client =
                HttpGateways::from_config(&config.gateways).map_err(BootstrapError::Gateway)?;
            info!(
                event_name = "system.bootstrap.http_gateways",
                correlation_id = "bootstrap",
                base_url = %client.base_url(),
                "collaborators will be reached over HTTP"
            );
            (Gateways::uniform(Arc::new(client.clone())), Some(client))
        }
    };

    let emitter =
        SanctionLetterEmitter::new(&config.documents).map_err(BootstrapError::Documents)?;
    let renders_pdf = emitter.renders_pdf();

    let classifier = build_classifier(&config)?;

    let assistant = LoanAssistant::new(
        Arc::new(InMemorySessionStore::default()),
        gateways,
        Arc::new(emitter),
        AssistantSettings::from(&config),
    )
    .with_classifier(classifier);
    info!(
        event_name = "system.bootstrap.ready",
        correlation_id = "bootstrap",
        max_steps = assistant.max_steps(),
        classifier = ?config.classifier.mode,
        renders_pdf,
        "loan assistant initialized"
    );

    Ok(Application {
        config,
        assistant: Arc::new(assistant),
        dataset: Arc::new(dataset),
        http_gateways,
        renders_pdf,
    })
}

fn build_classifier(
    config: &AppConfig,
) -> Result<Arc<dyn ConfirmationClassifier>, BootstrapError> {
    match config.classifier.mode {
        ClassifierMode::Keyword => Ok(Arc::new(KeywordClassifier)),
        ClassifierMode::Llm => {
            let client = ChatCompletionsClient::from_config(&config.classifier)
                .map_err(|error| BootstrapError::Classifier(format!("{error:#}")))?;
            info!(
                event_name = "system.bootstrap.llm_classifier",
                correlation_id = "bootstrap",
                endpoint = %client.endpoint(),
                model = %config.classifier.model,
                "confirmations will be labelled by a language model"
            );
            Ok(Arc::new(LlmConfirmationClassifier::new(client)))
        }
    }
}
