use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub underwriting: UnderwritingConfig,
    pub conversation: ConversationConfig,
    pub classifier: ClassifierConfig,
    pub gateways: GatewayConfig,
    pub documents: DocumentConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
    pub frontend_origin: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnderwritingConfig {
    pub min_credit_score: u32,
    pub conditional_multiplier: f64,
    pub max_emi_ratio: f64,
    pub default_interest_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConversationConfig {
    pub max_steps: u32,
}

/// Confirmation labelling. `llm` talks to an OpenAI-compatible chat completions endpoint.
#[derive(Clone, Debug)]
pub struct ClassifierConfig {
    pub mode: ClassifierMode,
    pub base_url: Option<String>,
    pub model: String,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub mode: GatewayMode,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub api_key: Option<SecretString>,
    pub fixtures_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentConfig {
    pub output_dir: PathBuf,
    pub lender_name: String,
    pub support_phone: String,
    pub support_email: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
    Fixture,
    Http,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    Keyword,
    Llm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub gateway_mode: Option<GatewayMode>,
    pub gateway_base_url: Option<String>,
    pub document_output_dir: Option<PathBuf>,
    pub max_steps: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for UnderwritingConfig {
    fn default() -> Self {
        Self {
            min_credit_score: 700,
            conditional_multiplier: 2.0,
            max_emi_ratio: 0.5,
            default_interest_rate: 12.5,
        }
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self { max_steps: 10 }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::Keyword,
            base_url: None,
            model: "llama3.1".to_string(),
            api_key: None,
            timeout_secs: 10,
        }
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("generated_documents"),
            lender_name: "Loanline Finance Ltd.".to_string(),
            support_phone: "1800-123-4567".to_string(),
            support_email: "support@loanline.example".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
                frontend_origin: Some("http://localhost:3000".to_string()),
            },
            underwriting: UnderwritingConfig::default(),
            conversation: ConversationConfig::default(),
            classifier: ClassifierConfig::default(),
            gateways: GatewayConfig {
                mode: GatewayMode::Fixture,
                base_url: None,
                timeout_secs: 10,
                api_key: None,
                fixtures_path: None,
            },
            documents: DocumentConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for GatewayMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fixture" => Ok(Self::Fixture),
            "http" => Ok(Self::Http),
            other => Err(ConfigError::Validation(format!(
                "unsupported gateway mode `{other}` (expected fixture|http)"
            ))),
        }
    }
}

impl std::str::FromStr for ClassifierMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "llm" => Ok(Self::Llm),
            other => Err(ConfigError::Validation(format!(
                "unsupported classifier mode `{other}` (expected keyword|llm)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("loanline.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
            if let Some(frontend_origin) = server.frontend_origin {
                self.server.frontend_origin = Some(frontend_origin);
            }
        }

        if let Some(underwriting) = patch.underwriting {
            if let Some(min_credit_score) = underwriting.min_credit_score {
                self.underwriting.min_credit_score = min_credit_score;
            }
            if let Some(conditional_multiplier) = underwriting.conditional_multiplier {
                self.underwriting.conditional_multiplier = conditional_multiplier;
            }
            if let Some(max_emi_ratio) = underwriting.max_emi_ratio {
                self.underwriting.max_emi_ratio = max_emi_ratio;
            }
            if let Some(default_interest_rate) = underwriting.default_interest_rate {
                self.underwriting.default_interest_rate = default_interest_rate;
            }
        }

        if let Some(conversation) = patch.conversation {
            if let Some(max_steps) = conversation.max_steps {
                self.conversation.max_steps = max_steps;
            }
        }

        if let Some(classifier) = patch.classifier {
            if let Some(mode) = classifier.mode {
                self.classifier.mode = mode;
            }
            if let Some(base_url) = classifier.base_url {
                self.classifier.base_url = Some(base_url);
            }
            if let Some(model) = classifier.model {
                self.classifier.model = model;
            }
            if let Some(classifier_api_key_value) = classifier.api_key {
                self.classifier.api_key = Some(secret_value(classifier_api_key_value));
            }
            if let Some(timeout_secs) = classifier.timeout_secs {
                self.classifier.timeout_secs = timeout_secs;
            }
        }

        if let Some(gateways) = patch.gateways {
            if let Some(mode) = gateways.mode {
                self.gateways.mode = mode;
            }
            if let Some(base_url) = gateways.base_url {
                self.gateways.base_url = Some(base_url);
            }
            if let Some(timeout_secs) = gateways.timeout_secs {
                self.gateways.timeout_secs = timeout_secs;
            }
            if let Some(gateway_api_key_value) = gateways.api_key {
                self.gateways.api_key = Some(secret_value(gateway_api_key_value));
            }
            if let Some(fixtures_path) = gateways.fixtures_path {
                self.gateways.fixtures_path = Some(fixtures_path);
            }
        }

        if let Some(documents) = patch.documents {
            if let Some(output_dir) = documents.output_dir {
                self.documents.output_dir = output_dir;
            }
            if let Some(lender_name) = documents.lender_name {
                self.documents.lender_name = lender_name;
            }
            if let Some(support_phone) = documents.support_phone {
                self.documents.support_phone = support_phone;
            }
            if let Some(support_email) = documents.support_email {
                self.documents.support_email = support_email;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("LOANLINE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("LOANLINE_SERVER_PORT") {
            self.server.port = parse_u16("LOANLINE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("LOANLINE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("LOANLINE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }
        if let Some(value) = read_env("LOANLINE_SERVER_FRONTEND_ORIGIN") {
            self.server.frontend_origin = Some(value);
        }

        if let Some(value) = read_env("LOANLINE_UNDERWRITING_MIN_CREDIT_SCORE") {
            self.underwriting.min_credit_score =
                parse_u32("LOANLINE_UNDERWRITING_MIN_CREDIT_SCORE", &value)?;
        }
        if let Some(value) = read_env("LOANLINE_UNDERWRITING_CONDITIONAL_MULTIPLIER") {
            self.underwriting.conditional_multiplier =
                parse_f64("LOANLINE_UNDERWRITING_CONDITIONAL_MULTIPLIER", &value)?;
        }
        if let Some(value) = read_env("LOANLINE_UNDERWRITING_MAX_EMI_RATIO") {
            self.underwriting.max_emi_ratio =
                parse_f64("LOANLINE_UNDERWRITING_MAX_EMI_RATIO", &value)?;
        }
        if let Some(value) = read_env("LOANLINE_UNDERWRITING_DEFAULT_INTEREST_RATE") {
            self.underwriting.default_interest_rate =
                parse_f64("LOANLINE_UNDERWRITING_DEFAULT_INTEREST_RATE", &value)?;
        }

        if let Some(value) = read_env("LOANLINE_CONVERSATION_MAX_STEPS") {
            self.conversation.max_steps = parse_u32("LOANLINE_CONVERSATION_MAX_STEPS", &value)?;
        }

        if let Some(value) = read_env("LOANLINE_CLASSIFIER_MODE") {
            self.classifier.mode = value.parse()?;
        }
        if let Some(value) = read_env("LOANLINE_CLASSIFIER_BASE_URL") {
            self.classifier.base_url = Some(value);
        }
        if let Some(value) = read_env("LOANLINE_CLASSIFIER_MODEL") {
            self.classifier.model = value;
        }
        if let Some(value) = read_env("LOANLINE_CLASSIFIER_API_KEY") {
            self.classifier.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("LOANLINE_CLASSIFIER_TIMEOUT_SECS") {
            self.classifier.timeout_secs = parse_u64("LOANLINE_CLASSIFIER_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("LOANLINE_GATEWAYS_MODE") {
            self.gateways.mode = value.parse()?;
        }
        if let Some(value) = read_env("LOANLINE_GATEWAYS_BASE_URL") {
            self.gateways.base_url = Some(value);
        }
        if let Some(value) = read_env("LOANLINE_GATEWAYS_TIMEOUT_SECS") {
            self.gateways.timeout_secs = parse_u64("LOANLINE_GATEWAYS_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("LOANLINE_GATEWAYS_API_KEY") {
            self.gateways.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("LOANLINE_GATEWAYS_FIXTURES_PATH") {
            self.gateways.fixtures_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("LOANLINE_DOCUMENTS_OUTPUT_DIR") {
            self.documents.output_dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("LOANLINE_DOCUMENTS_LENDER_NAME") {
            self.documents.lender_name = value;
        }

        let log_level =
            read_env("LOANLINE_LOGGING_LEVEL").or_else(|| read_env("LOANLINE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("LOANLINE_LOGGING_FORMAT").or_else(|| read_env("LOANLINE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(gateway_mode) = overrides.gateway_mode {
            self.gateways.mode = gateway_mode;
        }
        if let Some(gateway_base_url) = overrides.gateway_base_url {
            self.gateways.base_url = Some(gateway_base_url);
        }
        if let Some(output_dir) = overrides.document_output_dir {
            self.documents.output_dir = output_dir;
        }
        if let Some(max_steps) = overrides.max_steps {
            self.conversation.max_steps = max_steps;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_underwriting(&self.underwriting)?;
        validate_conversation(&self.conversation)?;
        validate_classifier(&self.classifier)?;
        validate_gateways(&self.gateways)?;
        validate_documents(&self.documents)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("loanline.toml"), PathBuf::from("config/loanline.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    if let Some(origin) = &server.frontend_origin {
        if !origin.starts_with("http://") && !origin.starts_with("https://") {
            return Err(ConfigError::Validation(
                "server.frontend_origin must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_underwriting(underwriting: &UnderwritingConfig) -> Result<(), ConfigError> {
    if underwriting.min_credit_score > 900 {
        return Err(ConfigError::Validation(
            "underwriting.min_credit_score must be in range 0..=900".to_string(),
        ));
    }

    if !underwriting.conditional_multiplier.is_finite()
        || underwriting.conditional_multiplier < 1.0
    {
        return Err(ConfigError::Validation(
            "underwriting.conditional_multiplier must be at least 1.0".to_string(),
        ));
    }

    if !(underwriting.max_emi_ratio > 0.0 && underwriting.max_emi_ratio <= 1.0) {
        return Err(ConfigError::Validation(
            "underwriting.max_emi_ratio must be in range (0, 1]".to_string(),
        ));
    }

    if !(underwriting.default_interest_rate >= 0.0 && underwriting.default_interest_rate <= 100.0)
    {
        return Err(ConfigError::Validation(
            "underwriting.default_interest_rate must be a percentage in range 0..=100".to_string(),
        ));
    }

    Ok(())
}

fn validate_conversation(conversation: &ConversationConfig) -> Result<(), ConfigError> {
    if conversation.max_steps == 0 {
        return Err(ConfigError::Validation(
            "conversation.max_steps must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_classifier(classifier: &ClassifierConfig) -> Result<(), ConfigError> {
    if classifier.timeout_secs == 0 || classifier.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "classifier.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    match classifier.mode {
        ClassifierMode::Llm => {
            let base_url = classifier.base_url.as_deref().map(str::trim).unwrap_or_default();
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ConfigError::Validation(
                    "classifier.base_url must be an http(s) URL when classifier.mode is llm"
                        .to_string(),
                ));
            }
            if classifier.model.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "classifier.model must not be empty when classifier.mode is llm".to_string(),
                ));
            }
        }
        ClassifierMode::Keyword => {}
    }

    Ok(())
}

fn validate_gateways(gateways: &GatewayConfig) -> Result<(), ConfigError> {
    if gateways.timeout_secs == 0 || gateways.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "gateways.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if let Some(api_key) = &gateways.api_key {
        if api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::Validation(
                "gateways.api_key must not be blank when set".to_string(),
            ));
        }
    }

    match gateways.mode {
        GatewayMode::Http => {
            let base_url = gateways.base_url.as_deref().map(str::trim).unwrap_or_default();
            if base_url.is_empty() {
                return Err(ConfigError::Validation(
                    "gateways.base_url is required when gateways.mode is http".to_string(),
                ));
            }
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err(ConfigError::Validation(
                    "gateways.base_url must start with http:// or https://".to_string(),
                ));
            }
        }
        GatewayMode::Fixture => {}
    }

    Ok(())
}

fn validate_documents(documents: &DocumentConfig) -> Result<(), ConfigError> {
    if documents.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("documents.output_dir must not be empty".to_string()));
    }

    if documents.lender_name.trim().is_empty() {
        return Err(ConfigError::Validation("documents.lender_name must not be empty".to_string()));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    underwriting: Option<UnderwritingPatch>,
    conversation: Option<ConversationPatch>,
    classifier: Option<ClassifierPatch>,
    gateways: Option<GatewayPatch>,
    documents: Option<DocumentPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    frontend_origin: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UnderwritingPatch {
    min_credit_score: Option<u32>,
    conditional_multiplier: Option<f64>,
    max_emi_ratio: Option<f64>,
    default_interest_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct ConversationPatch {
    max_steps: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ClassifierPatch {
    mode: Option<ClassifierMode>,
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayPatch {
    mode: Option<GatewayMode>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    api_key: Option<String>,
    fixtures_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct DocumentPatch {
    output_dir: Option<PathBuf>,
    lender_name: Option<String>,
    support_phone: Option<String>,
    support_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
