use crossterm::tty::IsTty;

/// Set by automation clients to declare an unattended caller.
pub const AGENT_MODE_ENV: &str = "GW_AGENT_MODE";
/// Set when gw runs behind an MCP server.
pub const MCP_SERVER_ENV: &str = "GW_MCP_SERVER";
/// Generic escape hatch for anything else that cannot answer prompts.
pub const NON_INTERACTIVE_ENV: &str = "NO_INTERACTIVE";

/// Flags the caller declares on the command line. Never inferred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub write: bool,
    pub force: bool,
}

impl Intent {
    pub fn new(write: bool, force: bool) -> Self {
        Self { write, force }
    }

    pub fn read_only() -> Self {
        Self::default()
    }
}

/// Raw facts that decide whether a human can be asked anything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InteractivitySignals {
    pub stdin_is_tty: bool,
    pub agent_mode: bool,
    pub mcp_server: bool,
    pub non_interactive: bool,
    /// `--json` / `--agent`: output is for a program, not a person
    pub structured_output: bool,
}

impl InteractivitySignals {
    /// Read the signals from the current process.
    pub fn from_env() -> Self {
        Self {
            stdin_is_tty: std::io::stdin().is_tty(),
            agent_mode: env_flag(AGENT_MODE_ENV),
            mcp_server: env_flag(MCP_SERVER_ENV),
            non_interactive: env_flag(NON_INTERACTIVE_ENV),
            structured_output: false,
        }
    }

    pub fn with_structured_output(mut self, structured_output: bool) -> Self {
        self.structured_output = structured_output;
        self
    }

    /// Interactive only when every signal agrees.
    pub fn is_interactive(&self) -> bool {
        self.stdin_is_tty
            && !self.agent_mode
            && !self.mcp_server
            && !self.non_interactive
            && !self.structured_output
    }
}

/// A marker counts as set when present and non-empty.
fn env_flag(name: &str) -> bool {
    std::env::var_os(name).is_some_and(|value| !value.is_empty())
}

/// Per-invocation environment the gate decides against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    pub interactive: bool,
    pub rate_limit_remaining: Option<u64>,
    pub rate_limit_warn_threshold: u64,
}

impl ExecutionContext {
    pub fn new(interactive: bool, rate_limit_warn_threshold: u64) -> Self {
        Self {
            interactive,
            rate_limit_remaining: None,
            rate_limit_warn_threshold,
        }
    }

    pub fn from_signals(signals: &InteractivitySignals, rate_limit_warn_threshold: u64) -> Self {
        Self::new(signals.is_interactive(), rate_limit_warn_threshold)
    }

    pub fn with_rate_limit_remaining(mut self, remaining: Option<u64>) -> Self {
        self.rate_limit_remaining = remaining;
        self
    }

    /// Remaining quota is known and at or below the threshold.
    pub fn rate_limit_low(&self) -> bool {
        self.rate_limit_remaining
            .is_some_and(|remaining| remaining <= self.rate_limit_warn_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tty() -> InteractivitySignals {
        InteractivitySignals {
            stdin_is_tty: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_tty_without_markers_is_interactive() {
        assert!(tty().is_interactive());
    }

    #[test]
    fn test_no_tty_is_never_interactive() {
        assert!(!InteractivitySignals::default().is_interactive());
    }

    #[test]
    fn test_each_marker_forces_non_interactive() {
        let agent = InteractivitySignals { agent_mode: true, ..tty() };
        let mcp = InteractivitySignals { mcp_server: true, ..tty() };
        let override_ = InteractivitySignals { non_interactive: true, ..tty() };
        let structured = tty().with_structured_output(true);

        assert!(!agent.is_interactive());
        assert!(!mcp.is_interactive());
        assert!(!override_.is_interactive());
        assert!(!structured.is_interactive());
    }

    #[test]
    fn test_rate_limit_low() {
        let ctx = ExecutionContext::new(true, 100);
        assert!(!ctx.rate_limit_low());

        assert!(ctx.with_rate_limit_remaining(Some(99)).rate_limit_low());
        assert!(ctx.with_rate_limit_remaining(Some(100)).rate_limit_low());
        assert!(!ctx.with_rate_limit_remaining(Some(101)).rate_limit_low());
    }

    #[test]
    fn test_from_signals() {
        let ctx = ExecutionContext::from_signals(&tty(), 50);
        assert!(ctx.interactive);
        assert_eq!(ctx.rate_limit_warn_threshold, 50);
        assert_eq!(ctx.rate_limit_remaining, None);

        let ctx = ExecutionContext::from_signals(&tty().with_structured_output(true), 50);
        assert!(!ctx.interactive);
    }
}
