use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::customer::{
    CreditReport, CustomerId, CustomerProfile, KycRequest, KycResult, OfferCatalog,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{resource} `{id}` was not found")]
    NotFound { resource: &'static str, id: String },
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("collaborator response could not be decoded: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound { resource, id: id.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[async_trait]
pub trait CustomerProfileGateway: Send + Sync {
    async fn customer(&self, id: &CustomerId) -> Result<CustomerProfile, GatewayError>;
}

#[async_trait]
pub trait CreditScoreGateway: Send + Sync {
    async fn credit_report(&self, id: &CustomerId) -> Result<CreditReport, GatewayError>;
}

#[async_trait]
pub trait OfferCatalogGateway: Send + Sync {
    async fn offers(&self, id: &CustomerId) -> Result<OfferCatalog, GatewayError>;
}

#[async_trait]
pub trait KycGateway: Send + Sync {
    async fn verify(&self, request: &KycRequest) -> Result<KycResult, GatewayError>;
}

/// The external collaborators consulted while processing a message.
#[derive(Clone)]
pub struct Gateways {
    pub profiles: Arc<dyn CustomerProfileGateway>,
    pub credit: Arc<dyn CreditScoreGateway>,
    pub offers: Arc<dyn OfferCatalogGateway>,
    pub kyc: Arc<dyn KycGateway>,
}

impl Gateways {
    /// Uses one implementation for every collaborator.
    pub fn uniform<G>(gateway: Arc<G>) -> Self
    where
        G: CustomerProfileGateway
            + CreditScoreGateway
            + OfferCatalogGateway
            + KycGateway
            + 'static,
    {
        Self {
            profiles: gateway.clone(),
            credit: gateway.clone(),
            offers: gateway.clone(),
            kyc: gateway,
        }
    }
}
