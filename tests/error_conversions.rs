use gw::config::ConfigError;
use gw::exit_codes;
use gw::security::DenyReason;
use gw::{ErrorKind, GwError};
use std::error::Error;

/// Test that ConfigError converts to GwError::Config
#[test]
fn test_config_error_converts_to_gw_error() {
    let err: GwError = ConfigError::DirectoryNotFound.into();
    assert!(matches!(err, GwError::Config(_)));
    assert_eq!(err.kind(), None);
    assert_eq!(exit_codes::for_error(&err), exit_codes::INVALID);
}

/// Test that std::io::Error converts to GwError::Io
#[test]
fn test_io_error_converts_to_gw_error() {
    let err: GwError = std::io::Error::new(std::io::ErrorKind::NotFound, "test").into();
    assert!(matches!(err, GwError::Io(_)));
    assert!(err.source().is_some());
}

#[test]
fn test_policy_denied_display_and_kind() {
    let err = GwError::denied(DenyReason::WriteFlagRequired);
    assert_eq!(err.to_string(), "Safety check failed: write flag required");
    assert_eq!(err.message(), "write flag required");
    assert_eq!(err.kind(), Some(ErrorKind::PolicyDenied));
    assert_eq!(exit_codes::for_error(&err), exit_codes::DENIED);
}

#[test]
fn test_protected_resource_message_does_not_leak_name_into_reason() {
    let err = GwError::denied(DenyReason::ProtectedResource {
        resource: "production".to_string(),
    });
    assert_eq!(err.message(), "protected resource");
    assert!(err.suggestion().is_some());
}

#[test]
fn test_execution_failed_display() {
    let err = GwError::ExecutionFailed {
        command: "git push".to_string(),
        exit_code: Some(1),
        stderr: "rejected\n".to_string(),
    };
    assert_eq!(err.to_string(), "Command 'git push' failed with exit code 1: rejected");
    assert_eq!(exit_codes::for_error(&err), exit_codes::EXECUTION_FAILED);

    let err = GwError::ExecutionFailed {
        command: "gh run watch 1".to_string(),
        exit_code: None,
        stderr: "timed out after 5s".to_string(),
    };
    assert_eq!(err.to_string(), "Command 'gh run watch 1' failed: timed out after 5s");
}

#[test]
fn test_tool_unavailable_suggests_install() {
    let err = GwError::ToolUnavailable {
        tool: "gh".to_string(),
        detail: "No such file or directory".to_string(),
    };
    assert_eq!(err.kind(), Some(ErrorKind::ToolUnavailable));
    assert!(err.suggestion().unwrap().contains("cli.github.com"));
    assert_eq!(exit_codes::for_error(&err), exit_codes::TOOL_UNAVAILABLE);
}

#[test]
fn test_parse_failed_exit_code() {
    let err = GwError::ParseFailed {
        tool: "gh".to_string(),
        detail: "expected value at line 1".to_string(),
    };
    assert_eq!(err.kind(), Some(ErrorKind::ParseFailed));
    assert_eq!(exit_codes::for_error(&err), exit_codes::PARSE_FAILED);
}

#[test]
fn test_error_kind_names_are_stable() {
    let names: Vec<&str> = [
        ErrorKind::PolicyDenied,
        ErrorKind::ToolUnavailable,
        ErrorKind::ExecutionFailed,
        ErrorKind::ParseFailed,
        ErrorKind::RateLimited,
    ]
    .iter()
    .map(|kind| kind.as_str())
    .collect();

    assert_eq!(
        names,
        vec!["policy_denied", "tool_unavailable", "execution_failed", "parse_failed", "rate_limited"]
    );
}
