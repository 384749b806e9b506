//! Reduce a `git push` refspec to the remote branch it writes.
//!
//! The gate checks protection by branch name, so whatever the caller types
//! (`HEAD:main`, `+feature:refs/heads/production`, `@`) must be resolved to
//! the destination branch first. Anything that does not reduce to a single
//! branch is refused.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RefspecError {
    #[error("'{0}' looks like an option, not a branch")]
    OptionLike(String),

    #[error("'{0}' deletes a remote branch, which gw does not do")]
    Deletion(String),

    #[error("'{0}' does not name a single remote branch")]
    Unsupported(String),
}

/// Where a push lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Branch(String),
    /// `HEAD` or `@`: the checked-out branch
    CurrentBranch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushRefspec {
    /// Leading `+`: non-fast-forward update
    pub forced: bool,
    pub destination: Destination,
}

impl PushRefspec {
    pub fn parse(spec: &str) -> Result<Self, RefspecError> {
        reject_option_like(spec)?;

        let (forced, rest) = match spec.strip_prefix('+') {
            Some(rest) => (true, rest),
            None => (false, spec),
        };

        let dst = match rest.split_once(':') {
            Some(("", _)) => return Err(RefspecError::Deletion(spec.to_string())),
            Some((_, dst)) => dst,
            None => rest,
        };

        let destination = match dst {
            "HEAD" | "@" => Destination::CurrentBranch,
            _ => {
                let name = dst.strip_prefix("refs/heads/").unwrap_or(dst);
                if !is_plain_branch(name) {
                    return Err(RefspecError::Unsupported(spec.to_string()));
                }
                Destination::Branch(name.to_string())
            }
        };

        Ok(Self { forced, destination })
    }
}

/// Positional operands are handed to git verbatim; one starting with `-`
/// would be read as a flag.
pub fn reject_option_like(operand: &str) -> Result<(), RefspecError> {
    if operand.starts_with('-') {
        return Err(RefspecError::OptionLike(operand.to_string()));
    }
    Ok(())
}

fn is_plain_branch(name: &str) -> bool {
    !name.is_empty()
        && name != "HEAD"
        && !name.starts_with("refs/")
        && !name.starts_with('-')
        && !name.contains([':', '*', '^', '~', '?', '[', '\\', ' '])
        && !name.contains("..")
        && !name.contains("@{")
}
