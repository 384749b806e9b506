use crossterm::style::Stylize;
use serde_json::{json, Value};

use crate::error::GwError;
use crate::error_translation::ErrorTranslator;
use crate::exec::ParsedOutput;
use crate::pipeline::Completed;
use crate::security::{Action, Decision, Evaluation, Operation, Tier, Warning};

/// How results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Colors and symbols
    Human,
    /// Plain text: no colors, no symbols
    Agent,
    /// Structured JSON on stdout
    Json,
}

impl OutputMode {
    pub fn from_flags(json: bool, agent: bool) -> Self {
        if json {
            OutputMode::Json
        } else if agent {
            OutputMode::Agent
        } else {
            OutputMode::Human
        }
    }
}

pub struct Reporter {
    mode: OutputMode,
}

impl Reporter {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn success(&self, completed: &Completed) {
        if self.mode == OutputMode::Json {
            println!("{}", pretty(&success_payload(completed)));
            return;
        }

        for warning in &completed.warnings {
            self.warning(warning);
        }

        let stdout = completed.result.stdout.trim_end();
        if !stdout.is_empty() {
            println!("{}", stdout);
        }

        if let Some(summary) = summary_line(completed) {
            match self.mode {
                OutputMode::Human => println!("{} {}", "✓".green(), summary),
                _ => println!("{}", summary),
            }
        }
    }

    /// Report an error, along with any warnings the gate attached before it.
    pub fn failure(&self, error: &GwError, warnings: &[Warning]) {
        let explained = ErrorTranslator::explain(error);

        match self.mode {
            OutputMode::Json => {
                println!("{}", pretty(&error_payload(error, warnings)));
            }
            OutputMode::Human => {
                for warning in warnings {
                    self.warning(warning);
                }
                eprintln!("{} {}", "✗".red(), explained.simple_message);
                if let Some(suggestion) = &explained.suggestion {
                    eprintln!("  {}", suggestion.as_str().dim());
                }
            }
            OutputMode::Agent => {
                for warning in warnings {
                    self.warning(warning);
                }
                eprintln!("error: {}", explained.simple_message);
                if let Some(suggestion) = &explained.suggestion {
                    eprintln!("suggestion: {}", suggestion);
                }
            }
        }
    }

    pub fn warning(&self, warning: &Warning) {
        match self.mode {
            OutputMode::Human => eprintln!("{} {}", "⚠".yellow(), warning),
            OutputMode::Agent => eprintln!("warning: {}", warning),
            OutputMode::Json => {}
        }
    }

    /// Print a gate evaluation (no execution happened)
    pub fn evaluation(&self, action: &Action, evaluation: &Evaluation) {
        if self.mode == OutputMode::Json {
            println!("{}", pretty(&evaluation_payload(action, evaluation)));
            return;
        }

        println!("{}: {}", action, evaluation.tier);
        let verdict = match &evaluation.decision {
            Decision::Deny(reason) => format!("deny ({})", reason),
            other => other.as_str().to_string(),
        };
        match (self.mode, &evaluation.decision) {
            (OutputMode::Human, Decision::Allow) => println!("decision: {}", verdict.green()),
            (OutputMode::Human, Decision::Deny(_)) => println!("decision: {}", verdict.red()),
            (OutputMode::Human, _) => println!("decision: {}", verdict.yellow()),
            _ => println!("decision: {}", verdict),
        }

        if let Decision::Deny(reason) = &evaluation.decision {
            if let Some(suggestion) = reason.suggestion() {
                println!("suggestion: {}", suggestion);
            }
        }
        for warning in &evaluation.warnings {
            self.warning(warning);
        }
    }

    /// Print the operation registry grouped by tier
    pub fn tiers(&self, entries: &[(Operation, Tier)], protected: &[&str]) {
        if self.mode == OutputMode::Json {
            let operations: Vec<Value> = entries
                .iter()
                .map(|(op, tier)| {
                    json!({"domain": op.domain().as_str(), "action": op.name(), "tier": tier.as_str()})
                })
                .collect();
            println!(
                "{}",
                pretty(&json!({"operations": operations, "protected_resources": protected}))
            );
            return;
        }

        for tier in [Tier::Read, Tier::Write, Tier::Dangerous, Tier::Protected] {
            let names: Vec<String> = entries
                .iter()
                .filter(|(_, t)| *t == tier)
                .map(|(op, _)| op.to_string())
                .collect();
            let label = format!("{:<10}", tier.as_str());
            match self.mode {
                OutputMode::Human => println!("{} {}", label.bold(), names.join(", ")),
                _ => println!("{} {}", label, names.join(", ")),
            }
        }
        println!("Protected resources: {}", protected.join(", "));
        println!("Unknown actions are treated as PROTECTED.");
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn summary_line(completed: &Completed) -> Option<String> {
    match &completed.result.parsed {
        Some(ParsedOutput::CommitHash(hash)) => Some(format!("Committed {}", hash)),
        Some(ParsedOutput::Created { number, url }) => Some(format!("Created #{}: {}", number, url)),
        _ => None,
    }
}

fn parsed_payload(parsed: &ParsedOutput) -> Value {
    match parsed {
        ParsedOutput::CommitHash(hash) => json!({"hash": hash}),
        ParsedOutput::Created { number, url } => json!({"number": number, "url": url}),
        ParsedOutput::Json(value) => value.clone(),
    }
}

pub fn success_payload(completed: &Completed) -> Value {
    let result = &completed.result;
    let mut payload = json!({
        "action": completed.action.name(),
        "domain": completed.action.domain().as_str(),
        "tier": completed.tier.as_str(),
        "command": result.command,
        "exit_code": result.exit_code,
        "warnings": completed.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    });

    if let Some(target) = completed.action.target() {
        payload["target"] = json!(target);
    }

    match &result.parsed {
        Some(parsed) => payload["data"] = parsed_payload(parsed),
        None => payload["output"] = json!(result.stdout),
    }

    payload
}

pub fn error_payload(error: &GwError, warnings: &[Warning]) -> Value {
    json!({
        "error": error.message(),
        "suggestion": error.suggestion(),
        "kind": error.kind().map(|kind| kind.as_str()),
        "warnings": warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    })
}

pub fn evaluation_payload(action: &Action, evaluation: &Evaluation) -> Value {
    let (decision, reason, suggestion) = match &evaluation.decision {
        Decision::Deny(reason) => ("deny", Some(reason.message()), reason.suggestion()),
        other => (other.as_str(), None, None),
    };

    json!({
        "domain": action.domain().as_str(),
        "action": action.name(),
        "target": action.target(),
        "tier": evaluation.tier.as_str(),
        "decision": decision,
        "reason": reason,
        "suggestion": suggestion,
        "warnings": evaluation.warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
    })
}
