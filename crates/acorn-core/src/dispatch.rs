//! Mention dispatch: the front door of the pipeline.
//!
//! Extracts the actionable prompt from the inbound text, gates it through
//! the rate limiter, and routes it to a command or the conversational
//! fallback. This is also where the unknown-error policy lives: anything
//! the lower layers could not turn into a chat line becomes an apology
//! reply marked for operator visibility, a raised alert, and the original
//! error handed back to the host.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::alerts::AlertSink;
use crate::commands::{CommandRegistry, RunCommand};
use crate::config::{BotConfig, BotIdentity};
use crate::core_types::{MentionEvent, Reply};
use crate::errors::BotError;
use crate::langs::LanguageCatalog;
use crate::ratelimit::{Gate, RateLimiter};
use crate::runners::RunnerRegistry;
use crate::store::ExpiryStore;

/// Outcome of one inbound event, for the host to act on.
#[derive(Debug)]
pub enum Dispatch {
    /// Nothing to send (own note, bot sender, or rate-limited silence).
    Silent,
    Reply(Reply),
    /// Unknown failure: send the apology, then alert on the error.
    Failed { reply: Reply, error: BotError },
}

pub struct MentionDispatcher {
    identity: BotIdentity,
    mention: Regex,
    commands: CommandRegistry,
    limiter: RateLimiter,
    alerts: Arc<dyn AlertSink>,
}

impl MentionDispatcher {
    pub fn new(
        identity: BotIdentity,
        commands: CommandRegistry,
        limiter: RateLimiter,
        alerts: Arc<dyn AlertSink>,
    ) -> Result<Self, BotError> {
        // The prompt is whatever follows "@username" or "@username@host",
        // provided the mention is not embedded in a longer identifier and
        // the prompt starts with something that could not continue one.
        let pattern = format!(
            r"(?is)(?:^|[^0-9a-z])@{}(?:@{})?([^0-9a-z_\-.@].*)$",
            regex::escape(&identity.username),
            regex::escape(&identity.host),
        );
        let mention = Regex::new(&pattern)
            .map_err(|e| BotError::Config(format!("bad mention pattern: {}", e)))?;
        Ok(Self {
            identity,
            mention,
            commands,
            limiter,
            alerts,
        })
    }

    /// Wires up the production pipeline: builtin catalog and runners, the
    /// full command set, and the rate limiter over the given store.
    pub fn from_config(
        config: &BotConfig,
        store: Arc<dyn ExpiryStore>,
        alerts: Arc<dyn AlertSink>,
    ) -> Result<Self, BotError> {
        let catalog = LanguageCatalog::builtin();
        let runners = RunnerRegistry::builtin(config);
        let commands = CommandRegistry::new(RunCommand::new(catalog, runners));
        let limiter = RateLimiter::new(store, config);
        Self::new(config.identity.clone(), commands, limiter, alerts)
    }

    pub async fn handle(&self, event: &MentionEvent, now: DateTime<Utc>) -> Dispatch {
        if event.sender_id == self.identity.user_id || event.sender_is_bot {
            return Dispatch::Silent;
        }
        match self.limiter.check(event, now).await {
            Ok(Gate::Pass) => {}
            Ok(Gate::Notice(text)) => return Dispatch::Reply(Reply::plain(text)),
            Ok(Gate::Drop) => return Dispatch::Silent,
            Err(error) => return self.fail(event, error).await,
        }
        match self.respond(event).await {
            Ok(reply) => Dispatch::Reply(reply),
            Err(error) => self.fail(event, error).await,
        }
    }

    async fn respond(&self, event: &MentionEvent) -> Result<Reply, BotError> {
        let prompt = self.extract_prompt(&event.text).trim();
        log::debug!("prompt from {}: {:?}", event.sender_username, prompt);
        if prompt.is_empty() {
            return Ok(Reply::plain(self.commands.help("")));
        }
        if let Some(rest) = prompt.strip_prefix('/') {
            let (name, params) = split_command(rest);
            let text = match self.commands.resolve(name) {
                Some(id) => self.commands.dispatch(id, params, event).await?,
                None => self.commands.help(name),
            };
            return Ok(Reply::plain(text.trim().to_string()));
        }
        Ok(Reply::plain(format!(
            "{}! *rolls around*",
            event.sender_name
        )))
    }

    /// The capture holds everything after the mention; no match means the
    /// mention reached us in a form the pattern does not cover, which is
    /// treated like an empty prompt.
    fn extract_prompt<'a>(&self, text: &'a str) -> &'a str {
        self.mention
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .unwrap_or("")
    }

    async fn fail(&self, event: &MentionEvent, error: BotError) -> Dispatch {
        log::error!("unhandled error for event {}: {}", event.event_id, error);
        self.alerts.raise(&event.event_id, &error).await;
        Dispatch::Failed {
            reply: Reply::notable("[ERROR] sorry, something unexpected broke on my end!"),
            error,
        }
    }
}

/// Splits `/command params` after the slash: the name runs to the first
/// whitespace, which is consumed as the single separator.
fn split_command(rest: &str) -> (&str, &str) {
    match rest.split_once(|c: char| c.is_whitespace()) {
        Some((name, params)) => (name, params),
        None => (rest, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Visibility;
    use crate::store::MemoryStore;

    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingSink {
        raised: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn raise(&self, context: &str, error: &BotError) {
            self.raised
                .lock()
                .unwrap()
                .push(format!("{}: {}", context, error));
        }
    }

    fn config() -> BotConfig {
        BotConfig::from_yaml(
            "identity:\n  user_id: \"bot1\"\n  username: acorn\n  host: example.social\n",
        )
        .unwrap()
    }

    fn dispatcher() -> MentionDispatcher {
        MentionDispatcher::from_config(
            &config(),
            Arc::new(MemoryStore::new()),
            Arc::new(crate::alerts::LogAlertSink),
        )
        .unwrap()
    }

    fn event(text: &str) -> MentionEvent {
        MentionEvent {
            event_id: "e1".to_string(),
            text: text.to_string(),
            sender_id: "alice1".to_string(),
            sender_username: "alice".to_string(),
            sender_host: None,
            sender_name: "Alice".to_string(),
            sender_is_bot: false,
            visibility: Visibility::Home,
        }
    }

    fn reply_text(dispatch: Dispatch) -> String {
        match dispatch {
            Dispatch::Reply(reply) => reply.text,
            other => panic!("expected a reply, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_prompt_gets_the_help_overview() {
        let dispatcher = dispatcher();
        let text = reply_text(dispatcher.handle(&event("@acorn"), Utc::now()).await);
        assert!(text.contains("Commands:"), "{}", text);
    }

    #[tokio::test]
    async fn test_prompt_extraction_accepts_host_suffix_and_case() {
        let dispatcher = dispatcher();
        let text = reply_text(
            dispatcher
                .handle(&event("hey @Acorn@Example.Social /help run"), Utc::now())
                .await,
        );
        assert!(text.contains("run:"), "{}", text);
        assert!(text.contains("Usage:"), "{}", text);
    }

    #[tokio::test]
    async fn test_mention_embedded_in_identifier_is_ignored() {
        let dispatcher = dispatcher();
        // "@acorn" inside another handle is not a mention of us.
        let text = reply_text(
            dispatcher
                .handle(&event("cc @acorn_fanclub nice bot"), Utc::now())
                .await,
        );
        assert!(text.contains("Commands:"), "{}", text);
    }

    #[tokio::test]
    async fn test_slash_command_runs_local_backend() {
        let dispatcher = dispatcher();
        let text = reply_text(
            dispatcher
                .handle(&event("@acorn /run ```text\nping\n```"), Utc::now())
                .await,
        );
        assert!(text.contains("stdout:\n```\nping\n```"), "{}", text);
        assert!(text.contains("language: text (local)"), "{}", text);
        assert!(text.contains("status: OK"), "{}", text);
    }

    #[tokio::test]
    async fn test_unknown_command_falls_through_to_help() {
        let dispatcher = dispatcher();
        let text = reply_text(
            dispatcher
                .handle(&event("@acorn /dance"), Utc::now())
                .await,
        );
        assert!(text.starts_with("[ERROR]"), "{}", text);
        assert!(text.contains("dance"), "{}", text);
    }

    #[tokio::test]
    async fn test_plain_prompt_gets_the_chat_fallback() {
        let dispatcher = dispatcher();
        let text = reply_text(
            dispatcher
                .handle(&event("@acorn hello there!"), Utc::now())
                .await,
        );
        assert!(text.contains("Alice"), "{}", text);
    }

    #[tokio::test]
    async fn test_bot_senders_and_own_notes_are_dropped() {
        let dispatcher = dispatcher();
        let mut from_bot = event("@acorn /help");
        from_bot.sender_is_bot = true;
        assert!(matches!(
            dispatcher.handle(&from_bot, Utc::now()).await,
            Dispatch::Silent
        ));

        let mut own = event("@acorn /help");
        own.sender_id = "bot1".to_string();
        assert!(matches!(
            dispatcher.handle(&own, Utc::now()).await,
            Dispatch::Silent
        ));
    }

    #[tokio::test]
    async fn test_cooldown_notice_then_silence() {
        let dispatcher = dispatcher();
        let event = event("@acorn /help");
        assert!(matches!(
            dispatcher.handle(&event, Utc::now()).await,
            Dispatch::Reply(_)
        ));
        let text = reply_text(dispatcher.handle(&event, Utc::now()).await);
        assert!(text.contains("too fast"), "{}", text);
        assert!(matches!(
            dispatcher.handle(&event, Utc::now()).await,
            Dispatch::Silent
        ));
    }

    #[tokio::test]
    async fn test_store_failure_takes_the_unknown_error_path() {
        struct BrokenStore;

        #[async_trait]
        impl crate::store::ExpiryStore for BrokenStore {
            async fn get(&self, _key: &str) -> Result<Option<String>, BotError> {
                Err(BotError::Store("down".to_string()))
            }
            async fn put(
                &self,
                _key: &str,
                _value: &str,
                _ttl: Option<std::time::Duration>,
            ) -> Result<(), BotError> {
                Err(BotError::Store("down".to_string()))
            }
            async fn fetch_add(
                &self,
                _key: &str,
                _ttl: std::time::Duration,
            ) -> Result<u64, BotError> {
                Err(BotError::Store("down".to_string()))
            }
        }

        let sink = Arc::new(RecordingSink {
            raised: Mutex::new(Vec::new()),
        });
        let dispatcher =
            MentionDispatcher::from_config(&config(), Arc::new(BrokenStore), sink.clone()).unwrap();
        match dispatcher.handle(&event("@acorn /help"), Utc::now()).await {
            Dispatch::Failed { reply, error } => {
                assert!(reply.notable);
                assert!(reply.text.starts_with("[ERROR]"), "{}", reply.text);
                assert!(matches!(error, BotError::Store(_)));
            }
            other => panic!("expected the failure path, got {:?}", other),
        }
        assert_eq!(sink.raised.lock().unwrap().len(), 1);
    }
}
