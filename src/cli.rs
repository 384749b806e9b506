//! Command-line surface. Each subcommand maps onto exactly one registered
//! operation and the literal argument vector passed to git / gh.

use clap::{Parser, Subcommand, ValueEnum};

use crate::error::{GwError, GwResult};
use crate::exec::{Invocation, OutputParser};
use crate::security::refspec::reject_option_like;
use crate::security::{Action, Destination, GitOp, GithubOp, PushRefspec};

#[derive(Debug, Parser)]
#[command(
    name = "gw",
    version,
    about = "Git and GitHub operations with safety guards",
    long_about = "Git and GitHub operations with safety guards.\n\n\
        Safety tiers:\n  \
        READ       status, log, diff, blame, show (always safe)\n  \
        WRITE      commit, push, pull, add, branch (require --write)\n  \
        DANGEROUS  reset, rebase, merge (require --write --force)\n  \
        PROTECTED  force-push to a protected branch (always blocked)"
)]
pub struct Cli {
    /// Structured JSON output; never prompts
    #[arg(long, global = true)]
    pub json: bool,

    /// Plain output for automation; never prompts
    #[arg(long, global = true)]
    pub agent: bool,

    /// Confirm a write operation
    #[arg(long, global = true)]
    pub write: bool,

    /// Confirm a destructive operation (together with --write)
    #[arg(long, global = true)]
    pub force: bool,

    /// Debug diagnostics on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Git operations
    #[command(subcommand)]
    Git(GitCommand),

    /// GitHub operations (via gh)
    #[command(subcommand)]
    Gh(GhCommand),

    /// Show how the safety gate would judge an action, without running it
    Check {
        /// git or github
        domain: String,
        /// Action name, e.g. force-push or run_cancel
        action: String,
        /// Branch, run id, ... the action targets
        #[arg(long)]
        target: Option<String>,
    },

    /// List every known action by safety tier
    Tiers,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ResetMode {
    Soft,
    Mixed,
    Hard,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StashAction {
    Push,
    Pop,
    Apply,
    List,
}

#[derive(Debug, Subcommand)]
pub enum GitCommand {
    /// Show working tree status
    Status {
        /// Machine-readable output
        #[arg(long)]
        porcelain: bool,
    },
    /// Show commit log
    Log {
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        author: Option<String>,
        /// e.g. "3 days ago"
        #[arg(long)]
        since: Option<String>,
        #[arg(long = "file")]
        file: Option<String>,
    },
    /// Show changes
    Diff {
        #[arg(long)]
        staged: bool,
        file: Option<String>,
    },
    /// Show who changed each line of a file
    Blame { file: String },
    /// Show a commit
    Show {
        #[arg(default_value = "HEAD")]
        revision: String,
    },
    /// Stage files
    Add {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Create a commit
    Commit {
        #[arg(short, long)]
        message: String,
    },
    /// Pull from a remote
    Pull {
        remote: Option<String>,
        branch: Option<String>,
        #[arg(long)]
        rebase: bool,
    },
    /// Push to a remote
    Push {
        #[arg(default_value = "origin")]
        remote: String,
        branch: Option<String>,
        #[arg(short = 'u', long)]
        set_upstream: bool,
    },
    /// Create a branch
    Branch {
        name: String,
        start_point: Option<String>,
    },
    /// Stash changes
    Stash {
        #[arg(value_enum, default_value = "push")]
        action: StashAction,
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Switch branches
    Switch {
        branch: String,
        #[arg(short = 'c', long)]
        create: bool,
    },
    /// Remove files from the index
    Unstage {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Reset HEAD (dangerous)
    Reset {
        #[arg(default_value = "HEAD")]
        revision: String,
        #[arg(long, value_enum, default_value = "mixed")]
        mode: ResetMode,
    },
    /// Rebase onto another branch (dangerous)
    Rebase { onto: String },
    /// Merge a branch (dangerous)
    Merge {
        branch: String,
        #[arg(long)]
        no_ff: bool,
    },
    /// Force-push with lease (blocked for protected branches)
    #[command(name = "force-push")]
    ForcePush {
        #[arg(default_value = "origin")]
        remote: String,
        /// Defaults to the current branch
        branch: Option<String>,
    },
}

impl GitCommand {
    /// Resolve the action and argument vector. `current_branch` is only
    /// called for commands whose target defaults to the checked-out branch.
    pub fn plan<F>(self, current_branch: F) -> GwResult<(Action, Invocation)>
    where
        F: FnOnce() -> GwResult<String>,
    {
        for operand in self.operands() {
            reject_option_like(operand).map_err(|e| GwError::InvalidAction(e.to_string()))?;
        }

        let planned = match self {
            GitCommand::Status { porcelain } => {
                let args = if porcelain {
                    vec!["status", "--porcelain=v2", "--branch"]
                } else {
                    vec!["status", "--short", "--branch"]
                };
                (Action::git(GitOp::Status), Invocation::new(args))
            }
            GitCommand::Log {
                limit,
                author,
                since,
                file,
            } => {
                let mut args = vec!["log".to_string(), "--oneline".to_string(), format!("-n{}", limit)];
                if let Some(author) = author {
                    args.push(format!("--author={}", author));
                }
                if let Some(since) = since {
                    args.push(format!("--since={}", since));
                }
                if let Some(file) = file {
                    args.push("--".to_string());
                    args.push(file);
                }
                (Action::git(GitOp::Log), Invocation::new(args))
            }
            GitCommand::Diff { staged, file } => {
                let mut args = vec!["diff".to_string()];
                if staged {
                    args.push("--staged".to_string());
                }
                if let Some(file) = file {
                    args.push("--".to_string());
                    args.push(file);
                }
                (Action::git(GitOp::Diff), Invocation::new(args))
            }
            GitCommand::Blame { file } => (
                Action::git(GitOp::Blame),
                Invocation::new(["blame".to_string(), "--".to_string(), file]),
            ),
            GitCommand::Show { revision } => (
                Action::git(GitOp::Show).with_target(revision.clone()),
                Invocation::new(["show".to_string(), "--stat".to_string(), revision]),
            ),
            GitCommand::Add { paths } => {
                let args = ["add".to_string(), "--".to_string()].into_iter().chain(paths);
                (Action::git(GitOp::Add), Invocation::new(args))
            }
            GitCommand::Commit { message } => (
                Action::git(GitOp::Commit),
                Invocation::new(["commit".to_string(), "-m".to_string(), message])
                    .parsed(OutputParser::CommitHash),
            ),
            GitCommand::Pull {
                remote,
                branch,
                rebase,
            } => {
                let mut args = vec!["pull".to_string()];
                if rebase {
                    args.push("--rebase".to_string());
                }
                args.extend(remote);
                args.extend(branch.clone());
                let action = match branch {
                    Some(branch) => Action::git(GitOp::Pull).with_target(branch),
                    None => Action::git(GitOp::Pull),
                };
                (action, Invocation::new(args))
            }
            GitCommand::Push {
                remote,
                branch,
                set_upstream,
            } => {
                // (refspec as typed, branch it writes)
                let target = match branch {
                    Some(spec) => {
                        let refspec = parse_refspec(&spec)?;
                        if refspec.forced {
                            return Err(GwError::InvalidAction(format!(
                                "'{}' is a forced update; use 'gw git force-push'",
                                spec
                            )));
                        }
                        let branch = destination_branch(refspec.destination, current_branch)?;
                        Some((spec, branch))
                    }
                    None if set_upstream => {
                        let branch = current_branch()?;
                        Some((branch.clone(), branch))
                    }
                    None => None,
                };
                let mut args = vec!["push".to_string()];
                if set_upstream {
                    args.push("--set-upstream".to_string());
                }
                args.push(remote);
                let action = match target {
                    Some((spec, branch)) => {
                        args.push(spec);
                        Action::git(GitOp::Push).with_target(branch)
                    }
                    None => Action::git(GitOp::Push),
                };
                (action, Invocation::new(args))
            }
            GitCommand::Branch { name, start_point } => {
                let mut args = vec!["branch".to_string(), name.clone()];
                args.extend(start_point);
                (
                    Action::git(GitOp::BranchCreate).with_target(name),
                    Invocation::new(args),
                )
            }
            GitCommand::Stash { action, message } => {
                let mut args = vec!["stash".to_string()];
                match action {
                    StashAction::Push => {
                        args.push("push".to_string());
                        if let Some(message) = message {
                            args.push("-m".to_string());
                            args.push(message);
                        }
                    }
                    StashAction::Pop => args.push("pop".to_string()),
                    StashAction::Apply => args.push("apply".to_string()),
                    StashAction::List => args.push("list".to_string()),
                }
                (Action::git(GitOp::Stash), Invocation::new(args))
            }
            GitCommand::Switch { branch, create } => {
                let mut args = vec!["switch".to_string()];
                if create {
                    args.push("-c".to_string());
                }
                args.push(branch.clone());
                (Action::git(GitOp::Switch).with_target(branch), Invocation::new(args))
            }
            GitCommand::Unstage { paths } => {
                let args = ["restore".to_string(), "--staged".to_string(), "--".to_string()]
                    .into_iter()
                    .chain(paths);
                (Action::git(GitOp::Unstage), Invocation::new(args))
            }
            GitCommand::Reset { revision, mode } => {
                let flag = match mode {
                    ResetMode::Soft => "--soft",
                    ResetMode::Mixed => "--mixed",
                    ResetMode::Hard => "--hard",
                };
                (
                    Action::git(GitOp::Reset).with_target(revision.clone()),
                    Invocation::new(["reset".to_string(), flag.to_string(), revision]),
                )
            }
            GitCommand::Rebase { onto } => (
                Action::git(GitOp::Rebase).with_target(onto.clone()),
                Invocation::new(["rebase".to_string(), onto]),
            ),
            GitCommand::Merge { branch, no_ff } => {
                let mut args = vec!["merge".to_string()];
                if no_ff {
                    args.push("--no-ff".to_string());
                }
                args.push(branch.clone());
                (Action::git(GitOp::Merge).with_target(branch), Invocation::new(args))
            }
            GitCommand::ForcePush { remote, branch } => {
                // Gate on the branch the push writes, never on the refspec text
                let (spec, branch) = match branch {
                    Some(spec) => {
                        let refspec = parse_refspec(&spec)?;
                        let branch = destination_branch(refspec.destination, current_branch)?;
                        (spec, branch)
                    }
                    None => {
                        let branch = current_branch()?;
                        (branch.clone(), branch)
                    }
                };
                (
                    Action::git(GitOp::ForcePush).with_target(branch),
                    Invocation::new(["push".to_string(), "--force-with-lease".to_string(), remote, spec]),
                )
            }
        };

        Ok(planned)
    }

    /// Free-form arguments that reach git outside a `--` separator
    fn operands(&self) -> Vec<&str> {
        match self {
            GitCommand::Show { revision } | GitCommand::Reset { revision, .. } => vec![revision.as_str()],
            GitCommand::Pull { remote, branch, .. } => remote.iter().chain(branch).map(String::as_str).collect(),
            GitCommand::Push { remote, branch, .. } | GitCommand::ForcePush { remote, branch } => {
                std::iter::once(remote).chain(branch).map(String::as_str).collect()
            }
            GitCommand::Branch { name, start_point } => {
                std::iter::once(name).chain(start_point).map(String::as_str).collect()
            }
            GitCommand::Switch { branch, .. } | GitCommand::Merge { branch, .. } => vec![branch.as_str()],
            GitCommand::Rebase { onto } => vec![onto.as_str()],
            _ => Vec::new(),
        }
    }
}

fn parse_refspec(spec: &str) -> GwResult<PushRefspec> {
    PushRefspec::parse(spec).map_err(|e| GwError::InvalidAction(e.to_string()))
}

fn destination_branch<F>(destination: Destination, current_branch: F) -> GwResult<String>
where
    F: FnOnce() -> GwResult<String>,
{
    match destination {
        Destination::Branch(branch) => Ok(branch),
        Destination::CurrentBranch => current_branch(),
    }
}

#[derive(Debug, Subcommand)]
pub enum GhCommand {
    /// Pull requests
    #[command(subcommand)]
    Pr(PrCommand),
    /// Issues
    #[command(subcommand)]
    Issue(IssueCommand),
    /// Workflow runs
    #[command(subcommand)]
    Run(RunCommand),
    /// Show the remaining GitHub API quota
    #[command(name = "rate-limit")]
    RateLimit,
}

#[derive(Debug, Subcommand)]
pub enum PrCommand {
    List {
        #[arg(long, default_value = "open")]
        state: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    View { number: u64 },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long, default_value = "main")]
        base: String,
        #[arg(long)]
        draft: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum IssueCommand {
    List {
        #[arg(long, default_value = "open")]
        state: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        #[arg(long)]
        label: Vec<String>,
    },
    View { number: u64 },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long)]
        label: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum RunCommand {
    List {
        #[arg(short = 'w', long)]
        workflow: Option<String>,
        #[arg(short = 'b', long)]
        branch: Option<String>,
        /// queued, in_progress, completed, ...
        #[arg(short = 's', long)]
        status: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    View {
        run_id: u64,
        /// Full logs
        #[arg(long)]
        log: bool,
        /// Only failed job logs
        #[arg(long)]
        log_failed: bool,
    },
    /// Block until the run completes
    Watch { run_id: u64 },
    Rerun {
        run_id: u64,
        /// Only rerun failed jobs
        #[arg(long)]
        failed: bool,
    },
    Cancel { run_id: u64 },
}

const PR_LIST_FIELDS: &str = "number,title,state,headRefName,author,url";
const PR_VIEW_FIELDS: &str = "number,title,state,body,headRefName,baseRefName,mergeable,url";
const ISSUE_LIST_FIELDS: &str = "number,title,state,labels,url";
const ISSUE_VIEW_FIELDS: &str = "number,title,state,body,labels,url";
const RUN_LIST_FIELDS: &str = "databaseId,displayTitle,status,conclusion,workflowName,headBranch,event,createdAt,url";
const RUN_VIEW_FIELDS: &str =
    "databaseId,displayTitle,status,conclusion,workflowName,headBranch,event,createdAt,url,jobs";

impl GhCommand {
    /// Resolve the action and argument vector. `repo` (owner/name) is
    /// appended as `--repo` to every repository-scoped command.
    pub fn plan(self, repo: Option<&str>) -> (Action, Invocation) {
        let (action, mut invocation, repo_scoped) = match self {
            GhCommand::Pr(cmd) => {
                let (action, invocation) = cmd.plan();
                (action, invocation, true)
            }
            GhCommand::Issue(cmd) => {
                let (action, invocation) = cmd.plan();
                (action, invocation, true)
            }
            GhCommand::Run(cmd) => {
                let (action, invocation) = cmd.plan();
                (action, invocation, true)
            }
            GhCommand::RateLimit => (
                Action::github(GithubOp::RateLimit),
                Invocation::new(["api", "rate_limit"]).parsed(OutputParser::Json),
                false,
            ),
        };

        if let (true, Some(repo)) = (repo_scoped, repo) {
            invocation.args.push("--repo".to_string());
            invocation.args.push(repo.to_string());
        }

        (action, invocation)
    }
}

impl PrCommand {
    fn plan(self) -> (Action, Invocation) {
        match self {
            PrCommand::List { state, limit } => (
                Action::github(GithubOp::PrList),
                Invocation::new([
                    "pr".to_string(),
                    "list".to_string(),
                    "--state".to_string(),
                    state,
                    "--limit".to_string(),
                    limit.to_string(),
                    "--json".to_string(),
                    PR_LIST_FIELDS.to_string(),
                ])
                .parsed(OutputParser::Json),
            ),
            PrCommand::View { number } => (
                Action::github(GithubOp::PrView).with_target(number.to_string()),
                Invocation::new([
                    "pr".to_string(),
                    "view".to_string(),
                    number.to_string(),
                    "--json".to_string(),
                    PR_VIEW_FIELDS.to_string(),
                ])
                .parsed(OutputParser::Json),
            ),
            PrCommand::Create {
                title,
                body,
                base,
                draft,
            } => {
                let mut args = vec![
                    "pr".to_string(),
                    "create".to_string(),
                    "--title".to_string(),
                    title,
                    "--body".to_string(),
                    body,
                    "--base".to_string(),
                    base.clone(),
                ];
                if draft {
                    args.push("--draft".to_string());
                }
                (
                    Action::github(GithubOp::PrCreate).with_target(base),
                    Invocation::new(args).parsed(OutputParser::CreatedUrl),
                )
            }
        }
    }
}

impl IssueCommand {
    fn plan(self) -> (Action, Invocation) {
        match self {
            IssueCommand::List { state, limit, label } => {
                let mut args = vec![
                    "issue".to_string(),
                    "list".to_string(),
                    "--state".to_string(),
                    state,
                    "--limit".to_string(),
                    limit.to_string(),
                ];
                for label in label {
                    args.push("--label".to_string());
                    args.push(label);
                }
                args.push("--json".to_string());
                args.push(ISSUE_LIST_FIELDS.to_string());
                (
                    Action::github(GithubOp::IssueList),
                    Invocation::new(args).parsed(OutputParser::Json),
                )
            }
            IssueCommand::View { number } => (
                Action::github(GithubOp::IssueView).with_target(number.to_string()),
                Invocation::new([
                    "issue".to_string(),
                    "view".to_string(),
                    number.to_string(),
                    "--json".to_string(),
                    ISSUE_VIEW_FIELDS.to_string(),
                ])
                .parsed(OutputParser::Json),
            ),
            IssueCommand::Create { title, body, label } => {
                let mut args = vec![
                    "issue".to_string(),
                    "create".to_string(),
                    "--title".to_string(),
                    title,
                    "--body".to_string(),
                    body,
                ];
                for label in label {
                    args.push("--label".to_string());
                    args.push(label);
                }
                (
                    Action::github(GithubOp::IssueCreate),
                    Invocation::new(args).parsed(OutputParser::CreatedUrl),
                )
            }
        }
    }
}

impl RunCommand {
    fn plan(self) -> (Action, Invocation) {
        match self {
            RunCommand::List {
                workflow,
                branch,
                status,
                limit,
            } => {
                let mut args = vec![
                    "run".to_string(),
                    "list".to_string(),
                    "--limit".to_string(),
                    limit.to_string(),
                ];
                for (flag, value) in [("--workflow", workflow), ("--branch", branch), ("--status", status)] {
                    if let Some(value) = value {
                        args.push(flag.to_string());
                        args.push(value);
                    }
                }
                args.push("--json".to_string());
                args.push(RUN_LIST_FIELDS.to_string());
                (
                    Action::github(GithubOp::RunList),
                    Invocation::new(args).parsed(OutputParser::Json),
                )
            }
            RunCommand::View {
                run_id,
                log,
                log_failed,
            } => {
                let action = Action::github(GithubOp::RunView).with_target(run_id.to_string());
                let invocation = if log_failed {
                    Invocation::new(["run".to_string(), "view".to_string(), run_id.to_string(), "--log-failed".to_string()])
                        .streamed()
                } else if log {
                    Invocation::new(["run".to_string(), "view".to_string(), run_id.to_string(), "--log".to_string()])
                        .streamed()
                } else {
                    Invocation::new([
                        "run".to_string(),
                        "view".to_string(),
                        run_id.to_string(),
                        "--json".to_string(),
                        RUN_VIEW_FIELDS.to_string(),
                    ])
                    .parsed(OutputParser::Json)
                };
                (action, invocation)
            }
            RunCommand::Watch { run_id } => (
                Action::github(GithubOp::RunWatch).with_target(run_id.to_string()),
                Invocation::new(["run".to_string(), "watch".to_string(), run_id.to_string()]).streamed(),
            ),
            RunCommand::Rerun { run_id, failed } => {
                let mut args = vec!["run".to_string(), "rerun".to_string(), run_id.to_string()];
                if failed {
                    args.push("--failed".to_string());
                }
                (
                    Action::github(GithubOp::RunRerun).with_target(run_id.to_string()),
                    Invocation::new(args),
                )
            }
            RunCommand::Cancel { run_id } => (
                Action::github(GithubOp::RunCancel).with_target(run_id.to_string()),
                Invocation::new(["run".to_string(), "cancel".to_string(), run_id.to_string()]),
            ),
        }
    }
}
