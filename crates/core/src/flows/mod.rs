pub mod engine;
pub mod states;

pub use engine::{FlowDefinition, FlowEngine, FlowTransitionError, LoanApplicationFlow};
pub use states::{
    Confirmation, FlowAction, FlowContext, FlowEvent, Stage, TransitionOutcome, CUSTOMER_PROFILE,
    LOAN_AMOUNT, TENURE_MONTHS,
};
