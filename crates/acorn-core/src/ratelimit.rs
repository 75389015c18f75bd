//! Two-tier per-sender rate limiting.
//!
//! Tier one is a cooldown/combo gate: every message bumps a per-sender
//! counter whose expiry is re-armed each time, so rapid-fire mentions keep
//! the combo alive. The first message inside a live window gets exactly one
//! "too fast" notice; everything after that is dropped silently. Tier two
//! is an hourly quota keyed on (UTC hour bucket, sender): one notice at the
//! first over-quota message, silence for the rest of the bucket.
//!
//! Both counters live in the injected [`ExpiryStore`] and are only ever
//! touched through `fetch_add`, so concurrent deliveries for one sender
//! serialize inside the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::BotConfig;
use crate::core_types::MentionEvent;
use crate::errors::BotError;
use crate::store::ExpiryStore;

/// Outcome of the rate gate for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    Pass,
    /// Reply with this notice, process nothing else.
    Notice(String),
    /// Drop without any reply.
    Drop,
}

pub struct RateLimiter {
    store: Arc<dyn ExpiryStore>,
    hourly_quota: u64,
    local_cooldown: Duration,
    remote_cooldown: Duration,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn ExpiryStore>, config: &BotConfig) -> Self {
        Self {
            store,
            hourly_quota: config.hourly_quota,
            local_cooldown: Duration::from_secs(config.local_cooldown_secs),
            remote_cooldown: Duration::from_secs(config.remote_cooldown_secs),
        }
    }

    /// `now` is injected by the caller so hour buckets are testable; hosts
    /// pass `Utc::now()`.
    pub async fn check(&self, event: &MentionEvent, now: DateTime<Utc>) -> Result<Gate, BotError> {
        let cooldown = if event.sender_host.is_some() {
            self.remote_cooldown
        } else {
            self.local_cooldown
        };
        let combo_key = format!("cooldown/{}", event.sender_id);
        let combo = self.store.fetch_add(&combo_key, cooldown).await?;
        if combo >= 1 {
            log::debug!("cooldown combo {} for sender {}", combo, event.sender_id);
            return Ok(if combo == 1 {
                Gate::Notice(format!(
                    "[ERROR] you're mentioning me too fast! wait about {} seconds!",
                    cooldown.as_secs()
                ))
            } else {
                Gate::Drop
            });
        }

        let bucket = now.timestamp() / 3600;
        let quota_key = format!("quota/{}/{}", bucket, event.sender_id);
        let hits = self
            .store
            .fetch_add(&quota_key, Duration::from_secs(3600))
            .await?;
        if hits >= self.hourly_quota {
            log::info!("sender {} over hourly quota ({})", event.sender_id, hits);
            return Ok(if hits == self.hourly_quota {
                Gate::Notice(
                    "[ERROR] you've used up this hour's quota, come back later!".to_string(),
                )
            } else {
                Gate::Drop
            });
        }
        Ok(Gate::Pass)
    }
}
