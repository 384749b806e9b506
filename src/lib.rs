pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod error_translation;
pub mod exec;
pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod security;

// Re-export commonly used types for convenience
pub use error::{ErrorKind, GwError, GwResult};
pub use pipeline::{Completed, Pipeline, Request};
pub use security::{
    Action, ConfirmationBroker, Decision, DenyReason, ExecutionContext, Intent, Registry, SafetyGate, Tier,
};
