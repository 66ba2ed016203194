//! Cumulative status messages
//!
//! Every user-facing operation reports through a [`StatusReport`]: messages
//! accumulate in order and the report carries the worst severity seen so far.
//! Once an error is recorded, further user messages are dropped so the error
//! stays visible.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameSaveResult;

/// Message severity, ordered from least to most important
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Intermediate step completed
    Info,
    /// A user-requested task completed
    User,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::User => write!(f, "ok"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Which messages a report keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusVerbosity {
    /// Errors only
    Errors,
    /// Errors and completed tasks
    #[default]
    User,
    /// Everything, including intermediate steps
    Info,
}

#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    verbosity: StatusVerbosity,
    messages: Vec<String>,
    severity: Option<Severity>,
}

impl StatusReport {
    pub fn new(verbosity: StatusVerbosity) -> Self {
        Self {
            verbosity,
            ..Self::default()
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
        self.severity = Some(Severity::Error);
    }

    pub fn user(&mut self, message: impl Into<String>) {
        if self.verbosity < StatusVerbosity::User || self.has_error() {
            return;
        }
        self.messages.push(message.into());
        self.raise(Severity::User);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        if self.verbosity < StatusVerbosity::Info {
            return;
        }
        self.messages.push(message.into());
        self.raise(Severity::Info);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.severity = None;
    }

    /// Report the outcome of an operation, returning its value on success
    pub fn record<T>(&mut self, result: GameSaveResult<T>, success: &str) -> Option<T> {
        match result {
            Ok(value) => {
                self.user(success);
                Some(value)
            }
            Err(e) => {
                self.error(e.to_string());
                None
            }
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    pub fn has_error(&self) -> bool {
        self.severity == Some(Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    fn raise(&mut self, severity: Severity) {
        self.severity = self.severity.max(Some(severity));
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages.join("  "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameSaveError;

    #[test]
    fn test_messages_accumulate() {
        let mut report = StatusReport::new(StatusVerbosity::Info);
        report.info("Revert for backup taken.");
        report.user("Restore completed.");

        assert_eq!(report.to_string(), "Revert for backup taken.  Restore completed.");
        assert_eq!(report.severity(), Some(Severity::User));
    }

    #[test]
    fn test_error_outranks_user() {
        let mut report = StatusReport::new(StatusVerbosity::User);
        report.error("Backup not found");
        report.user("Restore completed.");
        report.info("ignored at this verbosity");

        assert_eq!(report.messages(), ["Backup not found"]);
        assert!(report.has_error());
    }

    #[test]
    fn test_info_does_not_lower_severity() {
        let mut report = StatusReport::new(StatusVerbosity::Info);
        report.error("failed");
        report.info("detail");
        assert_eq!(report.severity(), Some(Severity::Error));
        assert_eq!(report.messages().len(), 2);
    }

    #[test]
    fn test_errors_only_verbosity() {
        let mut report = StatusReport::new(StatusVerbosity::Errors);
        report.user("done");
        assert!(report.is_empty());
        assert_eq!(report.severity(), None);
    }

    #[test]
    fn test_record() {
        let mut report = StatusReport::default();
        assert_eq!(report.record(Ok(3), "Backup created."), Some(3));

        let failed: GameSaveResult<()> = Err(GameSaveError::EmptyTag);
        assert_eq!(report.record(failed, "never shown"), None);
        assert_eq!(report.to_string(), "Backup created.  Tag cannot be empty");

        report.clear();
        assert!(report.is_empty());
        assert_eq!(report.severity(), None);
    }
}
