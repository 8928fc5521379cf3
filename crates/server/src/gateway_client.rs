//! HTTP clients for the customer, credit bureau, offer and KYC collaborators.
//!
//! Every collaborator answers with a `{success, data | error}` envelope. A 404 maps to
//! `GatewayError::NotFound`, transport failures to `Unavailable`, bad payloads to `Decode`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use loanline_core::config::GatewayConfig;
use loanline_core::domain::customer::{
    CreditReport, CustomerId, CustomerProfile, KycRequest, KycResult, OfferCatalog,
};
use loanline_core::gateways::{
    CreditScoreGateway, CustomerProfileGateway, GatewayError, KycGateway, OfferCatalogGateway,
};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct HttpGateways {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl HttpGateways {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        api_key: Option<SecretString>,
    ) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| GatewayError::Unavailable(error.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { client, base_url, api_key })
    }

    /// Builds a client from the `gateways` config section. Requires `base_url`.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let base_url = config.base_url.clone().ok_or_else(|| {
            GatewayError::Unavailable("gateways.base_url is not configured".to_owned())
        })?;
        Self::new(base_url, Duration::from_secs(config.timeout_secs), config.api_key.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lightweight reachability check against the rate slab listing.
    pub async fn probe(&self) -> Result<(), GatewayError> {
        let request = self.client.get(self.url("/api/offers/interest-rates"));
        self.fetch::<serde_json::Value>(request, "interest rates", "all").await.map(|_| ())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    async fn fetch<T>(
        &self,
        request: RequestBuilder,
        resource: &'static str,
        id: &str,
    ) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|error| GatewayError::Unavailable(error.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(GatewayError::not_found(resource, id));
        }
        if !status.is_success() {
            return Err(GatewayError::Unavailable(format!("{resource} service returned {status}")));
        }

        let envelope: Envelope<T> =
            response.json().await.map_err(|error| GatewayError::Decode(error.to_string()))?;
        match envelope {
            Envelope { success: true, data: Some(data), .. } => Ok(data),
            Envelope { error, .. } => Err(GatewayError::Decode(
                error.unwrap_or_else(|| format!("{resource} response carried no data")),
            )),
        }
    }
}

#[async_trait]
impl CustomerProfileGateway for HttpGateways {
    async fn customer(&self, id: &CustomerId) -> Result<CustomerProfile, GatewayError> {
        let request = self.client.get(self.url(&format!("/api/crm/customer/{id}")));
        self.fetch(request, "customer", id.as_str()).await
    }
}

#[async_trait]
impl CreditScoreGateway for HttpGateways {
    async fn credit_report(&self, id: &CustomerId) -> Result<CreditReport, GatewayError> {
        let request = self.client.get(self.url(&format!("/api/credit-bureau/report/{id}")));
        self.fetch(request, "credit report", id.as_str()).await
    }
}

#[async_trait]
impl OfferCatalogGateway for HttpGateways {
    async fn offers(&self, id: &CustomerId) -> Result<OfferCatalog, GatewayError> {
        let request = self.client.get(self.url(&format!("/api/offers/preapproved/{id}")));
        self.fetch(request, "offer catalog", id.as_str()).await
    }
}

#[async_trait]
impl KycGateway for HttpGateways {
    async fn verify(&self, request: &KycRequest) -> Result<KycResult, GatewayError> {
        let builder = self.client.post(self.url("/api/crm/verify-kyc")).json(request);
        self.fetch(builder, "customer", request.customer_id.as_str()).await
    }
}
