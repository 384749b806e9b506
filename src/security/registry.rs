use std::fmt;

use crate::security::action::{GitOp, GithubOp, Operation};

/// Risk tier of an operation. Ordered from least to most restrictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Read,
    Write,
    Dangerous,
    Protected,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Read => "READ",
            Tier::Write => "WRITE",
            Tier::Dangerous => "DANGEROUS",
            Tier::Protected => "PROTECTED",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static operation → tier table
///
/// Classification is a pure lookup. Anything the table does not name is
/// `Tier::Protected`, so a typo or a new subcommand can never slip through
/// with fewer requirements than a force-push.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registry;

impl Registry {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, operation: &Operation) -> Tier {
        match operation {
            Operation::Git(op) => Self::git_tier(*op),
            Operation::Github(op) => Self::github_tier(*op),
            Operation::Unrecognized { .. } => Tier::Protected,
        }
    }

    fn git_tier(op: GitOp) -> Tier {
        match op {
            GitOp::Status | GitOp::Log | GitOp::Diff | GitOp::Blame | GitOp::Show => Tier::Read,
            GitOp::Add
            | GitOp::Commit
            | GitOp::Pull
            | GitOp::Push
            | GitOp::BranchCreate
            | GitOp::Stash
            | GitOp::Switch
            | GitOp::Unstage => Tier::Write,
            GitOp::Reset | GitOp::Rebase | GitOp::Merge => Tier::Dangerous,
            GitOp::ForcePush => Tier::Protected,
        }
    }

    fn github_tier(op: GithubOp) -> Tier {
        match op {
            GithubOp::PrList
            | GithubOp::PrView
            | GithubOp::IssueList
            | GithubOp::IssueView
            | GithubOp::RunList
            | GithubOp::RunView
            | GithubOp::RunWatch
            | GithubOp::RateLimit => Tier::Read,
            GithubOp::PrCreate
            | GithubOp::IssueCreate
            | GithubOp::RunRerun
            | GithubOp::RunCancel => Tier::Write,
        }
    }

    /// Every registered operation with its tier, git first.
    pub fn entries(&self) -> Vec<(Operation, Tier)> {
        GitOp::ALL
            .iter()
            .map(|op| Operation::Git(*op))
            .chain(GithubOp::ALL.iter().map(|op| Operation::Github(*op)))
            .map(|op| {
                let tier = self.classify(&op);
                (op, tier)
            })
            .collect()
    }
}
