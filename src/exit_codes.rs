//! Stable exit codes for the gw CLI.

use crate::error::{ErrorKind, GwError};

/// Command ran and succeeded.
pub const OK: i32 = 0;
/// The external tool ran and exited non-zero (or timed out).
pub const EXECUTION_FAILED: i32 = 1;
/// The safety gate or the confirmation step refused the action.
pub const DENIED: i32 = 2;
/// git / gh could not be found or started.
pub const TOOL_UNAVAILABLE: i32 = 3;
/// The tool succeeded but its output could not be interpreted.
pub const PARSE_FAILED: i32 = 4;
/// Bad configuration, unknown action, I/O trouble.
pub const INVALID: i32 = 5;

pub fn for_error(error: &GwError) -> i32 {
    match error.kind() {
        Some(ErrorKind::PolicyDenied) => DENIED,
        Some(ErrorKind::ToolUnavailable) => TOOL_UNAVAILABLE,
        Some(ErrorKind::ExecutionFailed) => EXECUTION_FAILED,
        Some(ErrorKind::ParseFailed) => PARSE_FAILED,
        Some(ErrorKind::RateLimited) | None => INVALID,
    }
}
