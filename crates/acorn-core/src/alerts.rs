//! Operator alert capability.
//!
//! The unknown-error path notifies an injected sink; the transport (mail,
//! pager, favorites on the reply) belongs to the hosting environment.

use async_trait::async_trait;

use crate::errors::BotError;

#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn raise(&self, context: &str, error: &BotError);
}

/// Default sink: logs at error level and nothing else.
pub struct LogAlertSink;

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn raise(&self, context: &str, error: &BotError) {
        log::error!("operator alert [{}]: {}", context, error);
    }
}
