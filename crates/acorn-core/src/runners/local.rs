//! In-process backend.
//!
//! Exists so the pipeline can be exercised end to end without network
//! access: `text` echoes the code block back. `brainfuck` is declared so
//! name resolution and help stay honest about the plan, but execution
//! fails explicitly instead of pretending to interpret anything.

use async_trait::async_trait;

use crate::core_types::{ExecutionRequest, ExecutionResult, RunStatus};
use crate::errors::BotError;
use crate::runners::{Runner, RunnerDescriptor};

static DESCRIPTOR: RunnerDescriptor = RunnerDescriptor {
    id: "local",
    aliases: &["local", "gas"],
    langs: &["text", "brainfuck"],
};

pub struct LocalRunner;

impl LocalRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Runner for LocalRunner {
    fn descriptor(&self) -> &RunnerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, BotError> {
        match request.lang {
            "text" => {
                let mut result = ExecutionResult::new(RunStatus::Accepted);
                result.stdout = request.code.clone();
                result.exec_time_ms = Some(0.0);
                Ok(result)
            }
            "brainfuck" => Err(BotError::Backend(
                "the brainfuck interpreter is not implemented yet, hang on!".to_string(),
            )),
            other => Err(BotError::Backend(format!(
                "the local runner cannot run {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(lang: &'static str, code: &str) -> ExecutionRequest {
        ExecutionRequest {
            lang,
            code: code.to_string(),
            stdin: None,
        }
    }

    #[tokio::test]
    async fn test_text_echoes_code() {
        let runner = LocalRunner::new();
        let result = runner.execute(&request("text", "hello there")).await.unwrap();
        assert_eq!(result.status, RunStatus::Accepted);
        assert_eq!(result.stdout, "hello there");
        assert_eq!(result.stderr, "");
        assert_eq!(result.exec_time_ms, Some(0.0));
        assert_eq!(result.exit_code, None);
    }

    #[tokio::test]
    async fn test_brainfuck_fails_explicitly() {
        let runner = LocalRunner::new();
        let err = runner.execute(&request("brainfuck", "+.")).await.unwrap_err();
        match err {
            BotError::Backend(message) => assert!(message.contains("not implemented")),
            other => panic!("expected a backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undeclared_language_is_rejected() {
        let runner = LocalRunner::new();
        assert!(runner.execute(&request("python", "print(1)")).await.is_err());
    }
}
