//! Execution backend abstractions and the runner registry.
//!
//! Every backend implements the same [`Runner`] contract: take a canonical
//! language plus source and stdin, return one normalized
//! [`ExecutionResult`]. Only that result and [`BotError`] cross the
//! boundary; everything about a backend's own wire format stays inside its
//! module.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::BotConfig;
use crate::core_types::{ExecutionRequest, ExecutionResult};
use crate::errors::BotError;
use crate::langs::LangId;
use crate::text::normalize_token;

pub mod local;
pub mod paizaio;
pub mod wandbox;

pub use local::LocalRunner;
pub use paizaio::PaizaioRunner;
pub use wandbox::WandboxRunner;

pub type RunnerId = &'static str;

/// Static facts about one backend: its id, the names senders may pick it
/// by, and the canonical languages it accepts.
#[derive(Debug, Clone, Copy)]
pub struct RunnerDescriptor {
    pub id: RunnerId,
    /// Already normalized (lowercase).
    pub aliases: &'static [&'static str],
    pub langs: &'static [LangId],
}

impl RunnerDescriptor {
    pub fn supports(&self, lang: LangId) -> bool {
        self.langs.contains(&lang)
    }
}

#[async_trait]
pub trait Runner: Send + Sync {
    fn descriptor(&self) -> &RunnerDescriptor;

    /// Blocking network round-trip for the remote backends; there is no
    /// client-side retry, a single failure is terminal for the invocation.
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, BotError>;
}

/// Immutable, registration-ordered set of runners. Order matters: the
/// run command defaults to the first registered runner supporting the
/// resolved language.
pub struct RunnerRegistry {
    runners: Vec<Arc<dyn Runner>>,
}

impl RunnerRegistry {
    pub fn new() -> Self {
        Self {
            runners: Vec::new(),
        }
    }

    /// The production set, in the order the public deployment registers
    /// them: local, wandbox, paiza.io.
    pub fn builtin(config: &BotConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(LocalRunner::new()));
        registry.register(Arc::new(WandboxRunner::new(&config.wandbox)));
        registry.register(Arc::new(PaizaioRunner::new(&config.paizaio)));
        registry
    }

    pub fn register(&mut self, runner: Arc<dyn Runner>) {
        self.runners.push(runner);
    }

    /// Runners matching ALL supplied filters, in registration order.
    /// Returns an empty list rather than an error when nothing matches.
    pub fn find(&self, name: Option<&str>, lang: Option<LangId>) -> Vec<RunnerId> {
        let name = name.map(normalize_token);
        self.runners
            .iter()
            .map(|runner| runner.descriptor())
            .filter(|descriptor| {
                name.as_deref()
                    .map_or(true, |n| descriptor.aliases.contains(&n))
            })
            .filter(|descriptor| lang.map_or(true, |l| descriptor.supports(l)))
            .map(|descriptor| descriptor.id)
            .collect()
    }

    pub fn get(&self, id: RunnerId) -> Option<&Arc<dyn Runner>> {
        self.runners
            .iter()
            .find(|runner| runner.descriptor().id == id)
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}

impl Default for RunnerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
