//! Wandbox backend.
//!
//! Single compile-and-run call, but the compiler to use has to be
//! discovered first: the capability list is filtered by the language's
//! Wandbox display name, then narrowed by compiler-name patterns where one
//! display name covers several toolchains (four Python variants), and for
//! C++ the boost flag is read out of the compiler's switch metadata instead
//! of being hardcoded.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::WandboxConfig;
use crate::core_types::{ExecutionRequest, ExecutionResult, RunStatus};
use crate::errors::BotError;
use crate::langs::LangId;
use crate::runners::{Runner, RunnerDescriptor};

#[rustfmt::skip]
static DESCRIPTOR: RunnerDescriptor = RunnerDescriptor {
    id: "wandbox",
    aliases: &["wandbox", "wand", "wandbox.org"],
    langs: &[
        "bash", "c", "csharp", "cpp", "crystal", "d", "elixir", "erlang",
        "go", "groovy", "haskell", "java", "javascript", "julia",
        "lazyk", "lisp", "lua", "nim", "ocaml", "openssl",
        "pascal", "perl", "php", "pony", "pypy", "pypy2", "python", "python2",
        "r", "ruby", "rust", "scala", "sqlite", "swift", "typescript", "vim", "zig",
    ],
};

pub struct WandboxRunner {
    client: Client,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct CompilerInfo {
    name: String,
    version: String,
    language: String,
    #[serde(rename = "display-name")]
    display_name: String,
    #[serde(default)]
    switches: Vec<CompilerSwitch>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum CompilerSwitch {
    /// On/off toggles; nothing in them matters for compiler selection.
    Single {},
    Select {
        #[serde(default)]
        name: String,
        #[serde(default)]
        options: Vec<SwitchOption>,
    },
}

#[derive(Debug, Deserialize)]
struct SwitchOption {
    #[serde(rename = "display-flags", default)]
    display_flags: String,
}

#[derive(Serialize)]
struct CompileRequest<'a> {
    compiler: &'a str,
    code: &'a str,
    stdin: &'a str,
    #[serde(rename = "compiler-option-raw")]
    compiler_option_raw: String,
}

#[derive(Debug, Default, Deserialize)]
struct CompileResponse {
    #[serde(default)]
    status: String,
    signal: Option<String>,
    #[serde(default)]
    compiler_output: String,
    #[serde(default)]
    compiler_error: String,
    #[serde(default)]
    compiler_message: String,
    #[serde(default)]
    program_output: String,
    #[serde(default)]
    program_error: String,
}

impl WandboxRunner {
    pub fn new(config: &WandboxConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.clone(),
        }
    }

    /// Wandbox groups compilers by display language name.
    fn display_language(lang: LangId) -> Option<&'static str> {
        let name = match lang {
            "bash" => "Bash script",
            "c" => "C",
            "csharp" => "C#",
            "cpp" => "C++",
            "crystal" => "Crystal",
            "d" => "D",
            "elixir" => "Elixir",
            "erlang" => "Erlang",
            "go" => "Go",
            "groovy" => "Groovy",
            "haskell" => "Haskell",
            "java" => "Java",
            "javascript" => "JavaScript",
            "julia" => "Julia",
            "lazyk" => "Lazy K",
            "lisp" => "Lisp",
            "lua" => "Lua",
            "nim" => "Nim",
            "ocaml" => "OCaml",
            "openssl" => "OpenSSL",
            "pascal" => "Pascal",
            "perl" => "Perl",
            "php" => "PHP",
            "pony" => "Pony",
            "pypy" | "pypy2" | "python" | "python2" => "Python",
            "r" => "R",
            "ruby" => "Ruby",
            "rust" => "Rust",
            "scala" => "Scala",
            "sqlite" => "SQL",
            "swift" => "Swift",
            "typescript" => "TypeScript",
            "vim" => "Vim script",
            "zig" => "Zig",
            _ => return None,
        };
        Some(name)
    }
}

/// Picks the first listed compiler that satisfies the language's selection
/// rules. For C++ the returned flag is the first boost option that
/// actually carries compile flags, read from the switch metadata.
fn select_compiler<'a>(
    compilers: &'a [CompilerInfo],
    lang: LangId,
    display_language: &str,
) -> Option<(&'a CompilerInfo, Option<String>)> {
    for compiler in compilers {
        if compiler.language != display_language {
            continue;
        }
        let mut boost_flag = None;
        if display_language == "C++" {
            if !compiler.name.to_lowercase().contains("gcc-") {
                continue;
            }
            match boost_option_flag(compiler) {
                Some(flag) => boost_flag = Some(flag),
                None => continue,
            }
        }
        if display_language == "Python" {
            let pattern = match lang {
                "pypy" => "pypy-3",
                "pypy2" => "pypy-2",
                "python" => "cpython-3",
                "python2" => "cpython-2",
                _ => "",
            };
            if !pattern.is_empty() && !compiler.name.to_lowercase().contains(pattern) {
                continue;
            }
        }
        return Some((compiler, boost_flag));
    }
    None
}

fn boost_option_flag(compiler: &CompilerInfo) -> Option<String> {
    compiler.switches.iter().find_map(|switch| match switch {
        CompilerSwitch::Select { name, options } if name.to_lowercase().contains("boost") => options
            .iter()
            .find(|option| !option.display_flags.is_empty())
            .map(|option| option.display_flags.clone()),
        _ => None,
    })
}

fn result_from_response(response: &CompileResponse, lang_name: String) -> ExecutionResult {
    let exit_status = response.status.trim().parse::<i64>().unwrap_or(-1);
    let status = if exit_status != 0 {
        if response.compiler_message.is_empty() {
            RunStatus::RuntimeError
        } else {
            RunStatus::CompileError
        }
    } else {
        RunStatus::Accepted
    };

    let mut result = ExecutionResult::new(status);
    result.stdout.push_str(&response.compiler_output);
    result.stderr.push_str(&response.compiler_error);
    result.stdout.push_str(&response.program_output);
    result.stderr.push_str(&response.program_error);
    let mut exit_code = response.status.clone();
    if let Some(signal) = &response.signal {
        exit_code = format!("{} ({})", exit_code, signal);
    }
    result.exit_code = Some(exit_code);
    result.lang_name = Some(lang_name);
    result
}

#[async_trait]
impl Runner for WandboxRunner {
    fn descriptor(&self) -> &RunnerDescriptor {
        &DESCRIPTOR
    }

    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, BotError> {
        let display_language = Self::display_language(request.lang).ok_or_else(|| {
            BotError::Backend(format!("Wandbox does not know {}", request.lang))
        })?;

        let response = self
            .client
            .get(format!("{}/list.json", self.api_base))
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Backend(format!(
                "Wandbox list failed with status {}: {}",
                status, body
            )));
        }
        let compilers: Vec<CompilerInfo> = response
            .json()
            .await
            .map_err(|e| BotError::Backend(format!("malformed Wandbox compiler list: {}", e)))?;

        let (compiler, boost_flag) = select_compiler(&compilers, request.lang, display_language)
            .ok_or_else(|| {
                BotError::Backend(format!(
                    "Wandbox has no usable compiler for {}",
                    display_language
                ))
            })?;
        log::debug!("wandbox compiler: {} ({})", compiler.name, display_language);

        let compiler_option_raw = if request.lang == "cpp" {
            let boost = boost_flag.unwrap_or_default();
            format!("-O2\n-march=native\n{}", boost)
        } else {
            String::new()
        };
        let payload = CompileRequest {
            compiler: &compiler.name,
            code: &request.code,
            stdin: request.stdin.as_deref().unwrap_or(""),
            compiler_option_raw,
        };
        let response = self
            .client
            .post(format!("{}/compile.json", self.api_base))
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Backend(format!(
                "Wandbox compile failed with status {}: {}",
                status, body
            )));
        }
        let compiled: CompileResponse = response
            .json()
            .await
            .map_err(|e| BotError::Backend(format!("malformed Wandbox compile response: {}", e)))?;

        let lang_name = format!(
            "{} ({} {})",
            display_language, compiler.display_name, compiler.version
        );
        Ok(result_from_response(&compiled, lang_name))
    }
}
