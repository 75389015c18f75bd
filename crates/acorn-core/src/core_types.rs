//! Core type definitions shared across the bot pipeline.
//!
//! These types form the contract between the hosting webhook environment,
//! the dispatcher, and the execution backends: the inbound mention event,
//! the outbound reply, and the normalized execution request/result pair
//! every backend maps its own wire format onto.

use serde::{Deserialize, Serialize};

use crate::langs::LangId;

/// Normalized outcome classification shared by all execution backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Accepted,
    CompileError,
    RuntimeError,
    TimeLimitExceeded,
    MemoryLimitExceeded,
    InternalError,
}

impl RunStatus {
    /// Human-readable form used on the reply's status line.
    pub fn label(&self) -> &'static str {
        match self {
            RunStatus::Accepted => "OK",
            RunStatus::CompileError => "Compile Error",
            RunStatus::RuntimeError => "Runtime Error",
            RunStatus::TimeLimitExceeded => "Time Limit Exceeded",
            RunStatus::MemoryLimitExceeded => "Memory Limit Exceeded",
            RunStatus::InternalError => "Internal Error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub lang: LangId,
    pub code: String,
    pub stdin: Option<String>,
}

/// One result schema for every backend. Optional fields are present only
/// when the backend reported them; `exit_code` is a string because one
/// backend suffixes it with a signal name (e.g. `"139 (SIGSEGV)"`).
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub status: RunStatus,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<String>,
    pub exec_time_ms: Option<f64>,
    pub memory_kb: Option<f64>,
    /// Backend-resolved display name, e.g. `"C++ (gcc HEAD 14.0.0)"`.
    pub lang_name: Option<String>,
}

impl ExecutionResult {
    pub fn new(status: RunStatus) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            exec_time_ms: None,
            memory_kb: None,
            lang_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Home,
    Followers,
    Specified,
}

/// Inbound mention, as handed over by the hosting webhook environment.
/// Webhook deduplication happens before this point; `event_id` is carried
/// for logging and alert context only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionEvent {
    pub event_id: String,
    pub text: String,
    pub sender_id: String,
    pub sender_username: String,
    /// `None` for senders on the bot's own instance.
    pub sender_host: Option<String>,
    pub sender_name: String,
    pub sender_is_bot: bool,
    pub visibility: Visibility,
}

/// Outbound reply text. Addressing and visibility propagation belong to
/// the host's reply sender; `notable` asks it to mark the reply for
/// operator visibility (the unknown-error apology path sets it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub notable: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            notable: false,
        }
    }

    pub fn notable(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            notable: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(RunStatus::Accepted.label(), "OK");
        assert_eq!(RunStatus::TimeLimitExceeded.label(), "Time Limit Exceeded");
    }

    #[test]
    fn test_visibility_wire_names() {
        let v: Visibility = serde_json::from_str("\"specified\"").unwrap();
        assert_eq!(v, Visibility::Specified);
    }
}
