//! Core library for the acorn mention bot.
//!
//! Acorn answers mentions on a federated microblogging instance with a
//! small command set, the main one being "run this code snippet on an
//! execution backend". This crate is the whole decision pipeline between
//! an inbound mention event and the outbound reply text:
//!
//! - **Mention dispatch**: prompt extraction and command routing
//! - **Rate limiting**: per-sender cooldown combos and hourly quotas
//! - **Alias resolution**: language and runner tokens through static
//!   catalogs with Unicode-aware matching
//! - **Execution backends**: one in-process and two remote integrations
//!   normalized onto a single result contract
//!
//! Everything the pipeline needs from the outside world (keyed-expiry
//! store, operator alerting) comes in as an injected capability trait;
//! webhook handling and reply delivery stay in the hosting environment.

pub mod alerts;
pub mod commands;
pub mod config;
pub mod core_types;
pub mod dispatch;
pub mod errors;
pub mod langs;
pub mod ratelimit;
pub mod runners;
pub mod store;
pub mod text;

pub use alerts::{AlertSink, LogAlertSink};
pub use config::{BotConfig, BotIdentity};
pub use core_types::{ExecutionRequest, ExecutionResult, MentionEvent, Reply, RunStatus, Visibility};
pub use dispatch::{Dispatch, MentionDispatcher};
pub use errors::BotError;
pub use langs::LanguageCatalog;
pub use ratelimit::{Gate, RateLimiter};
pub use runners::{Runner, RunnerRegistry};
pub use store::{ExpiryStore, MemoryStore};
