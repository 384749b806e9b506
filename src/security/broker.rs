use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};

use crate::security::gate::{Decision, DenyReason};

/// Something that can put a yes/no question to a human
pub trait Prompter {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Asks on stderr, reads the answer from stdin. Anything but an explicit
/// yes (including EOF) is a no.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        let mut stderr = io::stderr();
        write!(stderr, "{} {} [y/N] ", "?".yellow().bold(), prompt)?;
        stderr.flush()?;

        let mut answer = String::new();
        let read = io::stdin().lock().read_line(&mut answer)?;
        if read == 0 {
            return Ok(false);
        }

        Ok(is_affirmative(&answer))
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// A decision with no confirmation left to obtain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// Turns `RequireConfirmation` into a final verdict
pub struct ConfirmationBroker<P: Prompter> {
    interactive: bool,
    prompter: P,
}

impl<P: Prompter> ConfirmationBroker<P> {
    pub fn new(interactive: bool, prompter: P) -> Self {
        Self {
            interactive,
            prompter,
        }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Resolve a gate decision. Only `RequireConfirmation` ever prompts;
    /// in a non-interactive context it is refused without prompting.
    pub fn resolve(&mut self, decision: &Decision, prompt: &str) -> Verdict {
        match decision {
            Decision::Allow => Verdict::Allow,
            Decision::Deny(reason) => Verdict::Deny(reason.clone()),
            Decision::RequireConfirmation => {
                if !self.interactive {
                    warn!("confirmation required in a non-interactive context, refusing");
                    return Verdict::Deny(DenyReason::NonInteractiveConfirmation);
                }

                match self.prompter.confirm(prompt) {
                    Ok(true) => {
                        info!("confirmation granted");
                        Verdict::Allow
                    }
                    Ok(false) => Verdict::Deny(DenyReason::UserDeclined),
                    Err(e) => {
                        warn!(err = %e, "confirmation prompt failed, treating as declined");
                        Verdict::Deny(DenyReason::UserDeclined)
                    }
                }
            }
        }
    }
}
