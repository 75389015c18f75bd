//! The run command: fenced-block argument parsing, runner/language
//! resolution, backend invocation, and reply formatting.

use regex::Regex;

use crate::core_types::{ExecutionRequest, ExecutionResult};
use crate::errors::BotError;
use crate::langs::{LangId, LanguageCatalog};
use crate::runners::{RunnerId, RunnerRegistry};
use crate::text::{normalize_token, truncate_bytes};

/// Output sections are cut at this many bytes before the ellipsis marker.
const OUTPUT_LIMIT: usize = 1024;

pub struct RunCommand {
    catalog: LanguageCatalog,
    runners: RunnerRegistry,
    fence: Regex,
}

struct FencedBlock<'a> {
    label: &'a str,
    body: &'a str,
    start: usize,
    end: usize,
}

impl RunCommand {
    pub fn new(catalog: LanguageCatalog, runners: RunnerRegistry) -> Self {
        let fence = Regex::new(r"(?s)```([^\n]*)\n(.*?)\n?```").unwrap();
        Self {
            catalog,
            runners,
            fence,
        }
    }

    /// Runs the full pipeline. Sender mistakes and backend failures come
    /// back as a rendered `[ERROR]` line; anything else propagates to the
    /// dispatcher's unknown-error path.
    pub async fn execute(&self, params: &str) -> Result<String, BotError> {
        match self.run_inner(params).await {
            Ok(text) => Ok(text),
            Err(err) if err.is_recoverable() => Ok(format!("[ERROR] {}", err)),
            Err(err) => Err(err),
        }
    }

    async fn run_inner(&self, params: &str) -> Result<String, BotError> {
        let code_block = self
            .find_block(params, 0)
            .ok_or_else(|| BotError::UserInput("no code block found".to_string()))?;
        let stdin = self
            .find_block(params, code_block.end)
            .map(|block| block.body.to_string());

        let head = &params[..code_block.start];
        let (runner_name, lang) = self.parse_options(head)?;

        let lang = match lang {
            Some(lang) => lang,
            None => self.catalog.resolve(code_block.label).ok_or_else(|| {
                BotError::UserInput("please specify a language".to_string())
            })?,
        };
        let runner_id = match runner_name {
            Some(id) => id,
            None => self
                .runners
                .find(None, Some(lang))
                .first()
                .copied()
                .ok_or_else(|| {
                    BotError::UserInput(format!("no runner supports {}", lang))
                })?,
        };
        let runner = self.runners.get(runner_id).ok_or_else(|| {
            BotError::Internal(format!("runner {} vanished from the registry", runner_id))
        })?;
        if !runner.descriptor().supports(lang) {
            return Err(BotError::UserInput(format!(
                "{} cannot run {}",
                runner_id, lang
            )));
        }

        let request = ExecutionRequest {
            lang,
            code: code_block.body.to_string(),
            stdin,
        };
        log::info!(
            "run: lang={} runner={} code_len={}",
            lang,
            runner_id,
            request.code.len()
        );
        let result = runner.execute(&request).await?;
        Ok(format_result(lang, runner_id, &request, &result))
    }

    fn find_block<'a>(&self, params: &'a str, from: usize) -> Option<FencedBlock<'a>> {
        let caps = self.fence.captures(&params[from..])?;
        let whole = caps.get(0).expect("group 0 always participates");
        Some(FencedBlock {
            label: caps.get(1).map(|m| m.as_str()).unwrap_or("").trim(),
            body: caps.get(2).map(|m| m.as_str()).unwrap_or(""),
            start: from + whole.start(),
            end: from + whole.end(),
        })
    }

    /// Option tokens ahead of the code block. Each token must resolve as a
    /// runner name or a language alias; the first hit per category sticks.
    fn parse_options(&self, head: &str) -> Result<(Option<RunnerId>, Option<LangId>), BotError> {
        let mut runner: Option<RunnerId> = None;
        let mut lang: Option<LangId> = None;
        for raw in head.split_whitespace() {
            let token = normalize_token(raw);
            if let Some(id) = self.runners.find(Some(&token), None).first().copied() {
                if runner.is_none() {
                    runner = Some(id);
                }
            } else if let Some(resolved) = self.catalog.resolve(&token) {
                if lang.is_none() {
                    lang = Some(resolved);
                }
            } else {
                return Err(BotError::UserInput(format!("invalid option: {}", raw)));
            }
        }
        Ok((runner, lang))
    }
}

fn format_result(
    lang: LangId,
    runner_id: RunnerId,
    request: &ExecutionRequest,
    result: &ExecutionResult,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push(output_section("stdout", &result.stdout));
    lines.push(output_section("stderr", &result.stderr));
    if let Some(code) = result.exit_code.as_deref() {
        if !code.is_empty() && code != "0" {
            lines.push(format!("exit code: {}", code));
        }
    }
    let lang_display = result.lang_name.clone().unwrap_or_else(|| lang.to_string());
    lines.push(format!("language: {} ({})", lang_display, runner_id));
    lines.push(format!("code length: {} bytes", request.code.len()));
    lines.push(format!("status: {}", result.status.label()));
    if let Some(time) = result.exec_time_ms {
        lines.push(format!("time: {} ms", time));
    }
    if let Some(memory) = result.memory_kb {
        lines.push(format!("memory: {} KB", memory));
    }
    lines.join("\n")
}

fn output_section(label: &str, body: &str) -> String {
    if body.is_empty() {
        return format!("{}:", label);
    }
    format!("{}:\n```\n{}\n```", label, truncate_bytes(body, OUTPUT_LIMIT))
}
