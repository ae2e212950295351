//! Error types for process execution.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::ExecutionResult;

/// Result type for process execution.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while running the cluster-management tool.
#[derive(Debug, Error)]
pub enum Error {
    /// The process exited without settling its completion.
    #[error("process exited without reporting completion")]
    Abandoned,

    /// The tool ran and exited with a non-zero status.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// IO operation failed.
    #[error("{0}: {1}")]
    Io(&'static str, #[source] io::Error),
}

impl Error {
    /// Returns the structured result if the tool ran and failed.
    #[must_use]
    pub const fn execution_result(&self) -> Option<&ExecutionResult> {
        match self {
            Self::Execution(e) => Some(&e.result),
            _ => None,
        }
    }
}

/// A non-zero exit from the tool.
///
/// The message is the tool's stderr followed by its stdout.
#[derive(Debug)]
pub struct ExecutionError {
    message: String,
    result: ExecutionResult,
}

impl ExecutionError {
    /// Builds the error for a failed result, or returns the result if it succeeded.
    ///
    /// # Errors
    ///
    /// Returns the `ExecutionError` when the exit code is non-zero.
    pub fn check(result: ExecutionResult) -> std::result::Result<ExecutionResult, Self> {
        if result.success() {
            return Ok(result);
        }

        let message = [result.stderr_text(), result.stdout_text()]
            .into_iter()
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n");

        Err(Self { message, result })
    }

    /// Returns the combined stderr and stdout text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the result of the failed invocation.
    #[must_use]
    pub const fn result(&self) -> &ExecutionResult {
        &self.result
    }

    /// Consumes the error, returning the result of the failed invocation.
    #[must_use]
    pub fn into_result(self) -> ExecutionResult {
        self.result
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "command exited with code {}", self.result.exit_code)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for ExecutionError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32, stdout: &[&str], stderr: &[&str]) -> ExecutionResult {
        ExecutionResult {
            exit_code,
            stdout: stdout.iter().map(ToString::to_string).collect(),
            stderr: stderr.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_zero_exit_is_not_an_error() {
        let checked = ExecutionError::check(result(0, &["ok"], &["noise"])).unwrap();

        assert_eq!(checked.stdout, vec!["ok"]);
    }

    #[test]
    fn test_message_is_stderr_then_stdout() {
        let err = ExecutionError::check(result(2, &["partial output"], &["disk full"]))
            .unwrap_err();

        assert_eq!(err.message(), "disk full\npartial output");
        assert_eq!(err.result().exit_code, 2);
        assert_eq!(err.to_string(), "disk full\npartial output");
    }

    #[test]
    fn test_silent_failure_mentions_exit_code() {
        let err = ExecutionError::check(result(3, &[], &[])).unwrap_err();

        assert_eq!(err.message(), "");
        assert_eq!(err.to_string(), "command exited with code 3");
    }

    #[test]
    fn test_error_exposes_execution_result() {
        let err: Error = ExecutionError::check(result(1, &[], &["boom"]))
            .unwrap_err()
            .into();

        assert_eq!(err.execution_result().map(|r| r.exit_code), Some(1));
        assert!(Error::Abandoned.execution_result().is_none());
    }
}
