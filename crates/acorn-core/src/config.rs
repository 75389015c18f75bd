//! Bot configuration.
//!
//! Loaded by the host from whatever persisted store it owns and handed in
//! as a typed value; the YAML helper exists for hosts that keep a plain
//! config document. Optional fields fall back to the defaults the public
//! deployments use.

use serde::{Deserialize, Serialize};

use crate::errors::BotError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub identity: BotIdentity,
    /// Messages accepted per sender per UTC hour.
    #[serde(default = "default_hourly_quota")]
    pub hourly_quota: u64,
    /// Cooldown between messages from senders on the bot's own instance.
    #[serde(default = "default_local_cooldown_secs")]
    pub local_cooldown_secs: u64,
    /// Cooldown for senders federated in from other instances.
    #[serde(default = "default_remote_cooldown_secs")]
    pub remote_cooldown_secs: u64,
    #[serde(default)]
    pub paizaio: PaizaioConfig,
    #[serde(default)]
    pub wandbox: WandboxConfig,
}

/// The bot's own account, as the host resolved it at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotIdentity {
    pub user_id: String,
    pub username: String,
    /// Instance domain, used to also match mentions written with an
    /// explicit `@host` suffix.
    pub host: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaizaioConfig {
    #[serde(default = "default_paizaio_base")]
    pub api_base: String,
    #[serde(default = "default_paizaio_key")]
    pub api_key: String,
}

impl Default for PaizaioConfig {
    fn default() -> Self {
        Self {
            api_base: default_paizaio_base(),
            api_key: default_paizaio_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WandboxConfig {
    #[serde(default = "default_wandbox_base")]
    pub api_base: String,
}

impl Default for WandboxConfig {
    fn default() -> Self {
        Self {
            api_base: default_wandbox_base(),
        }
    }
}

impl BotConfig {
    pub fn from_yaml(text: &str) -> Result<Self, BotError> {
        serde_yaml::from_str(text).map_err(|e| BotError::Config(e.to_string()))
    }
}

fn default_hourly_quota() -> u64 {
    100
}

fn default_local_cooldown_secs() -> u64 {
    10
}

fn default_remote_cooldown_secs() -> u64 {
    30
}

fn default_paizaio_base() -> String {
    "https://api.paiza.io".to_string()
}

fn default_paizaio_key() -> String {
    "guest".to_string()
}

fn default_wandbox_base() -> String {
    "https://wandbox.org/api".to_string()
}
