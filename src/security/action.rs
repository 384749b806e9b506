use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ActionParseError {
    #[error("Unknown domain: {0} (expected 'git' or 'github')")]
    UnknownDomain(String),
}

/// Resource domain an operation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Git,
    Github,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Git => "git",
            Domain::Github => "github",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "git" => Ok(Domain::Git),
            "github" | "gh" => Ok(Domain::Github),
            other => Err(ActionParseError::UnknownDomain(other.to_string())),
        }
    }
}

/// Git operations known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GitOp {
    Status,
    Log,
    Diff,
    Blame,
    Show,
    Add,
    Commit,
    Pull,
    Push,
    BranchCreate,
    Stash,
    Switch,
    Unstage,
    Reset,
    Rebase,
    Merge,
    ForcePush,
}

impl GitOp {
    pub const ALL: &'static [GitOp] = &[
        GitOp::Status,
        GitOp::Log,
        GitOp::Diff,
        GitOp::Blame,
        GitOp::Show,
        GitOp::Add,
        GitOp::Commit,
        GitOp::Pull,
        GitOp::Push,
        GitOp::BranchCreate,
        GitOp::Stash,
        GitOp::Switch,
        GitOp::Unstage,
        GitOp::Reset,
        GitOp::Rebase,
        GitOp::Merge,
        GitOp::ForcePush,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GitOp::Status => "status",
            GitOp::Log => "log",
            GitOp::Diff => "diff",
            GitOp::Blame => "blame",
            GitOp::Show => "show",
            GitOp::Add => "add",
            GitOp::Commit => "commit",
            GitOp::Pull => "pull",
            GitOp::Push => "push",
            GitOp::BranchCreate => "branch-create",
            GitOp::Stash => "stash",
            GitOp::Switch => "switch",
            GitOp::Unstage => "unstage",
            GitOp::Reset => "reset",
            GitOp::Rebase => "rebase",
            GitOp::Merge => "merge",
            GitOp::ForcePush => "force-push",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }
}

/// GitHub operations known to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GithubOp {
    PrList,
    PrView,
    PrCreate,
    IssueList,
    IssueView,
    IssueCreate,
    RunList,
    RunView,
    RunWatch,
    RunRerun,
    RunCancel,
    RateLimit,
}

impl GithubOp {
    pub const ALL: &'static [GithubOp] = &[
        GithubOp::PrList,
        GithubOp::PrView,
        GithubOp::PrCreate,
        GithubOp::IssueList,
        GithubOp::IssueView,
        GithubOp::IssueCreate,
        GithubOp::RunList,
        GithubOp::RunView,
        GithubOp::RunWatch,
        GithubOp::RunRerun,
        GithubOp::RunCancel,
        GithubOp::RateLimit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GithubOp::PrList => "pr_list",
            GithubOp::PrView => "pr_view",
            GithubOp::PrCreate => "pr_create",
            GithubOp::IssueList => "issue_list",
            GithubOp::IssueView => "issue_view",
            GithubOp::IssueCreate => "issue_create",
            GithubOp::RunList => "run_list",
            GithubOp::RunView => "run_view",
            GithubOp::RunWatch => "run_watch",
            GithubOp::RunRerun => "run_rerun",
            GithubOp::RunCancel => "run_cancel",
            GithubOp::RateLimit => "rate_limit",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }
}

/// A single operation, closed over the known set plus an explicit escape
/// hatch for names nobody registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Git(GitOp),
    Github(GithubOp),
    Unrecognized { domain: Domain, name: String },
}

impl Operation {
    /// Resolve a domain-scoped name. Never fails: unknown names become
    /// `Operation::Unrecognized`.
    pub fn parse(domain: Domain, name: &str) -> Self {
        let known = match domain {
            Domain::Git => GitOp::from_name(name).map(Operation::Git),
            Domain::Github => GithubOp::from_name(name).map(Operation::Github),
        };

        known.unwrap_or_else(|| Operation::Unrecognized {
            domain,
            name: name.to_string(),
        })
    }

    pub fn domain(&self) -> Domain {
        match self {
            Operation::Git(_) => Domain::Git,
            Operation::Github(_) => Domain::Github,
            Operation::Unrecognized { domain, .. } => *domain,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Operation::Git(op) => op.name(),
            Operation::Github(op) => op.name(),
            Operation::Unrecognized { name, .. } => name,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Operation::Unrecognized { .. })
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.domain(), self.name())
    }
}

/// An operation plus the resource it is aimed at (branch, run id, ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    operation: Operation,
    target: Option<String>,
}

impl Action {
    pub fn new(operation: Operation, target: Option<String>) -> Self {
        Self { operation, target }
    }

    pub fn git(op: GitOp) -> Self {
        Self::new(Operation::Git(op), None)
    }

    pub fn github(op: GithubOp) -> Self {
        Self::new(Operation::Github(op), None)
    }

    /// Build an action from the raw caller strings.
    pub fn parse(domain: &str, name: &str, target: Option<&str>) -> Result<Self, ActionParseError> {
        let domain: Domain = domain.parse()?;
        Ok(Self::new(
            Operation::parse(domain, name),
            target.map(str::to_string),
        ))
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn domain(&self) -> Domain {
        self.operation.domain()
    }

    pub fn name(&self) -> &str {
        self.operation.name()
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => write!(f, "{} ({})", self.operation, target),
            None => write!(f, "{}", self.operation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_git_operation() {
        assert_eq!(
            Operation::parse(Domain::Git, "force-push"),
            Operation::Git(GitOp::ForcePush)
        );
        assert_eq!(
            Operation::parse(Domain::Git, "branch-create"),
            Operation::Git(GitOp::BranchCreate)
        );
    }

    #[test]
    fn test_parse_known_github_operation() {
        assert_eq!(
            Operation::parse(Domain::Github, "run_cancel"),
            Operation::Github(GithubOp::RunCancel)
        );
    }

    #[test]
    fn test_names_are_scoped_to_domain() {
        // "push" is a git name, not a github one
        let op = Operation::parse(Domain::Github, "push");
        assert!(!op.is_recognized());
        assert_eq!(op.domain(), Domain::Github);
        assert_eq!(op.name(), "push");
    }

    #[test]
    fn test_every_registered_name_round_trips() {
        for op in GitOp::ALL {
            assert_eq!(Operation::parse(Domain::Git, op.name()), Operation::Git(*op));
        }
        for op in GithubOp::ALL {
            assert_eq!(
                Operation::parse(Domain::Github, op.name()),
                Operation::Github(*op)
            );
        }
    }

    #[test]
    fn test_domain_aliases() {
        assert_eq!("gh".parse::<Domain>(), Ok(Domain::Github));
        assert_eq!("github".parse::<Domain>(), Ok(Domain::Github));
        assert!("svn".parse::<Domain>().is_err());
    }

    #[test]
    fn test_action_parse_with_target() {
        let action = Action::parse("git", "force-push", Some("main")).unwrap();
        assert_eq!(action.domain(), Domain::Git);
        assert_eq!(action.name(), "force-push");
        assert_eq!(action.target(), Some("main"));
        assert_eq!(action.to_string(), "git force-push (main)");
    }
}
