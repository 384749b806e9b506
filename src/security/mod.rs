//! Operation safety policy.
//!
//! Every git / GitHub operation is classified into a [`Tier`] by the
//! [`Registry`], judged by the [`SafetyGate`] against the caller's
//! [`Intent`] and [`ExecutionContext`], and, when the gate asks for it,
//! confirmed by a human through the [`ConfirmationBroker`].

pub mod action;
pub mod broker;
pub mod context;
pub mod gate;
pub mod protected;
pub mod rate_limit;
pub mod refspec;
pub mod registry;

pub use action::{Action, ActionParseError, Domain, GitOp, GithubOp, Operation};
pub use broker::{ConfirmationBroker, Prompter, TerminalPrompter, Verdict};
pub use context::{ExecutionContext, Intent, InteractivitySignals};
pub use gate::{Decision, DenyReason, Evaluation, SafetyGate, Warning};
pub use protected::{ProtectedResourceSet, DEFAULT_PROTECTED_RESOURCES};
pub use rate_limit::{RateLimitMonitor, RateQuota};
pub use refspec::{Destination, PushRefspec, RefspecError};
pub use registry::{Registry, Tier};
