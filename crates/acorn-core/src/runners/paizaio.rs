//! paiza.io backend.
//!
//! Two-phase API: create a job with a long-poll flag, then fetch its
//! details once the long poll returns. Build-phase and run-phase output are
//! concatenated in that order; the reported time (seconds) and memory
//! (bytes) are converted to the milliseconds/kilobytes the result schema
//! carries.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::PaizaioConfig;
use crate::core_types::{ExecutionRequest, ExecutionResult, RunStatus};
use crate::errors::BotError;
use crate::langs::LangId;
use crate::runners::{Runner, RunnerDescriptor};

const LONGPOLL_TIMEOUT_SECS: f64 = 10.0;

#[rustfmt::skip]
static DESCRIPTOR: RunnerDescriptor = RunnerDescriptor {
    id: "paizaio",
    aliases: &["paiza.io", "paiza", "paizaio"],
    langs: &[
        "bash", "c", "csharp", "cpp", "clojure", "cobol",
        "coffeescript", "d", "elixir", "erlang", "fsharp", "go",
        "haskell", "java", "javascript", "kotlin", "mysql",
        "nako", "objectivec", "perl", "php", "python2",
        "python", "r", "ruby", "rust", "scala", "scheme",
        "swift", "typescript", "visualbasic",
        "lisp", "brainfuck", "text",
    ],
};

pub struct PaizaioRunner {
    client: Client,
    api_base: String,
    api_key: String,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    api_key: &'a str,
    source_code: &'a str,
    language: &'a str,
    input: &'a str,
    longpoll: bool,
    longpoll_timeout: f64,
}

#[derive(Deserialize)]
struct CreateResponse {
    #[serde(default)]
    id: String,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct JobDetails {
    #[serde(default)]
    status: String,
    build_stdout: Option<String>,
    build_stderr: Option<String>,
    build_result: Option<String>,
    stdout: Option<String>,
    stderr: Option<String>,
    exit_code: Option<i64>,
    /// Run-phase wall time in seconds, as a decimal string.
    time: Option<String>,
    /// Run-phase peak memory in bytes.
    memory: Option<f64>,
    result: Option<String>,
    error: Option<String>,
}

impl PaizaioRunner {
    pub fn new(config: &PaizaioConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// paiza.io's language ids differ from the canonical ids for a few
    /// languages.
    fn language_id(lang: LangId) -> &'static str {
        match lang {
            "objectivec" => "objective-c",
            "python2" => "python",
            "python" => "python3",
            "visualbasic" => "vb",
            "lisp" => "commonlisp",
            "nako" => "nadesiko",
            "text" => "plain",
            other => other,
        }
    }
}

fn result_from_details(details: &JobDetails) -> ExecutionResult {
    let status = if details.status != "completed" {
        // The long-poll window elapsed without the job finishing; treat it
        // as a backend fault rather than guessing at a partial result.
        RunStatus::InternalError
    } else if details
        .build_result
        .as_deref()
        .is_some_and(|r| r != "success")
    {
        RunStatus::CompileError
    } else if details.result.as_deref() == Some("failure") {
        RunStatus::RuntimeError
    } else if details.result.as_deref() == Some("timeout") {
        RunStatus::TimeLimitExceeded
    } else {
        RunStatus::Accepted
    };

    let mut result = ExecutionResult::new(status);
    result.stdout.push_str(details.build_stdout.as_deref().unwrap_or(""));
    result.stderr.push_str(details.build_stderr.as_deref().unwrap_or(""));
    result.stdout.push_str(details.stdout.as_deref().unwrap_or(""));
    result.stderr.push_str(details.stderr.as_deref().unwrap_or(""));
    result.exit_code = details.exit_code.map(|code| code.to_string());
    result.exec_time_ms = details
        .time
        .as_deref()
        .and_then(|t| t.parse::<f64>().ok())
        .map(|seconds| seconds * 1000.0);
    result.memory_kb = details.memory.map(|bytes| bytes / 1000.0);
    result
}

#[async_trait]
impl Runner for PaizaioRunner {
    fn descriptor(&self) -> &RunnerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, BotError> {
        let language = Self::language_id(request.lang);
        log::debug!("paiza.io create: language={}", language);

        let payload = CreateRequest {
            api_key: &self.api_key,
            source_code: &request.code,
            language,
            input: request.stdin.as_deref().unwrap_or(""),
            longpoll: true,
            longpoll_timeout: LONGPOLL_TIMEOUT_SECS,
        };
        let response = self
            .client
            .post(format!("{}/runners/create", self.api_base))
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Backend(format!(
                "paiza.io create failed with status {}: {}",
                status, body
            )));
        }
        let created: CreateResponse = response
            .json()
            .await
            .map_err(|e| BotError::Backend(format!("malformed paiza.io create response: {}", e)))?;
        if let Some(error) = created.error {
            return Err(BotError::Backend(format!("paiza.io: {}", error)));
        }

        let url = format!(
            "{}/runners/get_details?api_key={}&id={}",
            self.api_base,
            urlencoding::encode(&self.api_key),
            urlencoding::encode(&created.id),
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Backend(format!(
                "paiza.io get_details failed with status {}: {}",
                status, body
            )));
        }
        let details: JobDetails = response
            .json()
            .await
            .map_err(|e| BotError::Backend(format!("malformed paiza.io details response: {}", e)))?;
        if let Some(error) = details.error {
            return Err(BotError::Backend(format!("paiza.io: {}", error)));
        }

        log::debug!("paiza.io details: status={} result={:?}", details.status, details.result);
        Ok(result_from_details(&details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_id_translation() {
        assert_eq!(PaizaioRunner::language_id("python"), "python3");
        assert_eq!(PaizaioRunner::language_id("python2"), "python");
        assert_eq!(PaizaioRunner::language_id("objectivec"), "objective-c");
        assert_eq!(PaizaioRunner::language_id("visualbasic"), "vb");
        assert_eq!(PaizaioRunner::language_id("lisp"), "commonlisp");
        assert_eq!(PaizaioRunner::language_id("nako"), "nadesiko");
        assert_eq!(PaizaioRunner::language_id("text"), "plain");
        assert_eq!(PaizaioRunner::language_id("ruby"), "ruby");
    }

    fn completed() -> JobDetails {
        JobDetails {
            status: "completed".to_string(),
            ..JobDetails::default()
        }
    }

    #[test]
    fn test_unfinished_job_is_an_internal_error() {
        let details = JobDetails {
            status: "running".to_string(),
            ..JobDetails::default()
        };
        assert_eq!(result_from_details(&details).status, RunStatus::InternalError);
    }

    #[test]
    fn test_build_failure_maps_to_compile_error() {
        let details = JobDetails {
            build_result: Some("failure".to_string()),
            build_stderr: Some("undefined reference".to_string()),
            ..completed()
        };
        let result = result_from_details(&details);
        assert_eq!(result.status, RunStatus::CompileError);
        assert_eq!(result.stderr, "undefined reference");
    }

    #[test]
    fn test_run_failure_and_timeout() {
        let failure = JobDetails {
            result: Some("failure".to_string()),
            ..completed()
        };
        assert_eq!(result_from_details(&failure).status, RunStatus::RuntimeError);

        let timeout = JobDetails {
            result: Some("timeout".to_string()),
            ..completed()
        };
        assert_eq!(
            result_from_details(&timeout).status,
            RunStatus::TimeLimitExceeded
        );
    }

    #[test]
    fn test_success_concatenates_build_then_run_output() {
        let details = JobDetails {
            build_result: Some("success".to_string()),
            build_stdout: Some("building\n".to_string()),
            stdout: Some("hello\n".to_string()),
            result: Some("success".to_string()),
            exit_code: Some(0),
            time: Some("0.04".to_string()),
            memory: Some(8_336_000.0),
            ..completed()
        };
        let result = result_from_details(&details);
        assert_eq!(result.status, RunStatus::Accepted);
        assert_eq!(result.stdout, "building\nhello\n");
        assert_eq!(result.exit_code, Some("0".to_string()));
        assert_eq!(result.exec_time_ms, Some(40.0));
        assert_eq!(result.memory_kb, Some(8336.0));
    }
}
