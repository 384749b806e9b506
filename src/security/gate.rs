use std::fmt;
use tracing::{debug, warn};

use crate::security::action::Action;
use crate::security::context::{ExecutionContext, Intent};
use crate::security::protected::ProtectedResourceSet;
use crate::security::registry::{Registry, Tier};

/// Why an action was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    WriteFlagRequired,
    WriteAndForceRequired,
    ProtectedResource { resource: String },
    UserDeclined,
    NonInteractiveConfirmation,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::WriteFlagRequired => "write flag required",
            DenyReason::WriteAndForceRequired => "write and force flags required",
            DenyReason::ProtectedResource { .. } => "protected resource",
            DenyReason::UserDeclined => "user declined",
            DenyReason::NonInteractiveConfirmation => {
                "confirmation required but non-interactive context"
            }
        }
    }

    /// Corrective hint shown next to the refusal, if there is one.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            DenyReason::WriteFlagRequired => Some("Add --write to confirm this operation".to_string()),
            DenyReason::WriteAndForceRequired => {
                Some("Add --write --force to confirm this destructive operation".to_string())
            }
            DenyReason::ProtectedResource { resource } => Some(format!(
                "'{}' is protected and cannot be targeted by this operation. Use a feature branch instead.",
                resource
            )),
            DenyReason::UserDeclined => None,
            DenyReason::NonInteractiveConfirmation => Some(
                "Run from an interactive terminal, or unset GW_AGENT_MODE / GW_MCP_SERVER / NO_INTERACTIVE"
                    .to_string(),
            ),
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The gate's verdict for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    RequireConfirmation,
    Deny(DenyReason),
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::RequireConfirmation => "require_confirmation",
            Decision::Deny(_) => "deny",
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, Decision::Deny(_))
    }
}

/// Non-blocking notes attached to a decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    RateLimited { remaining: u64, threshold: u64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::RateLimited { remaining, .. } => {
                write!(f, "Rate limit warning: {} requests remaining", remaining)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub tier: Tier,
    pub decision: Decision,
    pub warnings: Vec<Warning>,
}

/// Combines the registry, the protected set and the execution context into
/// a decision
#[derive(Debug, Clone)]
pub struct SafetyGate {
    registry: Registry,
    protected: ProtectedResourceSet,
}

impl SafetyGate {
    pub fn new(registry: Registry, protected: ProtectedResourceSet) -> Self {
        Self {
            registry,
            protected,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn protected(&self) -> &ProtectedResourceSet {
        &self.protected
    }

    pub fn evaluate(&self, action: &Action, intent: &Intent, context: &ExecutionContext) -> Evaluation {
        if !action.operation().is_recognized() {
            warn!(action = %action, "unrecognized operation, classifying as PROTECTED");
        }

        let tier = self.registry.classify(action.operation());
        let decision = self.decide(tier, action, intent, context);

        let mut warnings = Vec::new();
        if let Some(remaining) = context.rate_limit_remaining {
            if context.rate_limit_low() {
                warnings.push(Warning::RateLimited {
                    remaining,
                    threshold: context.rate_limit_warn_threshold,
                });
            }
        }

        debug!(
            action = %action,
            tier = %tier,
            decision = decision.as_str(),
            write = intent.write,
            force = intent.force,
            interactive = context.interactive,
            "gate evaluated"
        );

        Evaluation {
            tier,
            decision,
            warnings,
        }
    }

    fn decide(&self, tier: Tier, action: &Action, intent: &Intent, context: &ExecutionContext) -> Decision {
        match tier {
            Tier::Read => Decision::Allow,
            Tier::Write => {
                if intent.write {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::WriteFlagRequired)
                }
            }
            Tier::Dangerous => Self::decide_dangerous(intent, context),
            Tier::Protected => {
                // Checked before any flag: nothing overrides a protected target
                if let Some(target) = action.target() {
                    if self.protected.is_protected(target) {
                        return Decision::Deny(DenyReason::ProtectedResource {
                            resource: target.to_string(),
                        });
                    }
                }
                Self::decide_dangerous(intent, context)
            }
        }
    }

    fn decide_dangerous(intent: &Intent, context: &ExecutionContext) -> Decision {
        if !(intent.write && intent.force) {
            return Decision::Deny(DenyReason::WriteAndForceRequired);
        }

        if context.interactive {
            Decision::RequireConfirmation
        } else {
            Decision::Allow
        }
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new(Registry::new(), ProtectedResourceSet::default())
    }
}
