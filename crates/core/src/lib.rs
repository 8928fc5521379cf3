//! Domain core of the loan application assistant: session model, stage flow,
//! eligibility rules, collaborator contracts and configuration.

pub mod audit;
pub mod config;
pub mod documents;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod gateways;
pub mod underwriting;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use documents::{DocumentEmitter, DocumentError, SanctionArtifact};
pub use domain::customer::{
    CreditRating, CreditReport, CustomerId, CustomerProfile, KycRequest, KycResult, LoanOffer,
    OfferCatalog,
};
pub use domain::loan::{LoanDetails, LoanRequest, LoanTerms};
pub use domain::session::{
    ChatMessage, ConversationSnapshot, QuickReply, Role, Session, SessionId, SessionSummary,
    UnderwritingRecord,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{Confirmation, FlowEngine, FlowEvent, LoanApplicationFlow, Stage};
pub use gateways::{GatewayError, Gateways};
pub use underwriting::{Decision, DecisionKind, EligibilityEngine, EligibilityPolicy};
