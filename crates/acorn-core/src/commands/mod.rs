//! Command set and help generation.
//!
//! Commands form a closed set: resolution maps a normalized name onto
//! [`CommandId`] and dispatch is a total match, so there is no string-keyed
//! handler lookup to fall out of sync with the help listing. The descriptor
//! table is insertion-ordered and drives both.

use crate::core_types::MentionEvent;
use crate::errors::BotError;
use crate::text::{normalize_token, truncate_chars};

pub mod run;

pub use run::RunCommand;

/// Longest echoed token in the unknown-command message.
const TOKEN_ECHO_LIMIT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    Help,
    Run,
}

pub struct CommandInfo {
    pub id: CommandId,
    pub name: &'static str,
    pub description: &'static str,
    pub usages: &'static [&'static str],
}

pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        id: CommandId::Help,
        name: "help",
        description: "shows what I can do",
        usages: &[
            "shows the command list.",
            "<command> shows how to use that command.",
        ],
    },
    CommandInfo {
        id: CommandId::Run,
        name: "run",
        description: "runs a code snippet on an execution backend",
        usages: &[
            "```<lang>\n<code>\n``` runs the fenced code block.",
            "<runner and/or lang> ```\n<code>\n``` picks a runner or language explicitly.",
            "```<lang>\n<code>\n``` ```\n<stdin>\n``` feeds the second block to the program.",
        ],
    },
];

pub struct CommandRegistry {
    run: RunCommand,
}

impl CommandRegistry {
    pub fn new(run: RunCommand) -> Self {
        Self { run }
    }

    /// Exact lookup over the descriptor table after normalization.
    pub fn resolve(&self, name: &str) -> Option<CommandId> {
        let name = normalize_token(name);
        COMMANDS
            .iter()
            .find(|command| command.name == name)
            .map(|command| command.id)
    }

    pub async fn dispatch(
        &self,
        id: CommandId,
        params: &str,
        _event: &MentionEvent,
    ) -> Result<String, BotError> {
        match id {
            CommandId::Help => Ok(self.help(params)),
            CommandId::Run => self.run.execute(params).await,
        }
    }

    /// `help` with no argument lists every command; with an argument it
    /// prints that command's usage lines, or the unknown-command message.
    pub fn help(&self, params: &str) -> String {
        let token = params.split_whitespace().next().unwrap_or("");
        if token.is_empty() {
            return self.overview();
        }
        let name = normalize_token(token);
        match COMMANDS.iter().find(|command| command.name == name) {
            Some(command) => {
                let usages = command
                    .usages
                    .iter()
                    .map(|usage| format!("{} {}", command.name, usage))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "{}: {}\n\nUsage:\n{}",
                    command.name, command.description, usages
                )
            }
            None => Self::unknown_command(token),
        }
    }

    fn overview(&self) -> String {
        let listing = COMMANDS
            .iter()
            .map(|command| format!("{}: {}", command.name, command.description))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "See my profile for what this bot is about!\n\nCommands:\n{}\n\nUse help <command> to see how each one works!",
            listing
        )
    }

    pub fn unknown_command(token: &str) -> String {
        format!(
            "[ERROR] there is no {} command, sorry!",
            truncate_chars(token, TOKEN_ECHO_LIMIT)
        )
    }
}
