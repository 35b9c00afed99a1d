//! Configuration snapshot consumed by the network state and policy services.
//!
//! These types are deserialised by the server binary; nothing in this crate
//! reads configuration text itself.

use crate::types::Pattern;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig
{
    #[serde(default)]
    pub opers: Vec<OperConfig>,
    #[serde(default)]
    pub bans: BanConfig,
    #[serde(default = "default_classes")]
    pub classes: Vec<ConnectionClassConfig>,
    #[serde(default = "default_class_name")]
    pub default_class: String,
    #[serde(default)]
    pub motd: Vec<String>,
    #[serde(default)]
    pub limits: ServerLimits,
    #[serde(default)]
    pub flood: FloodSettings,
    #[serde(default)]
    pub timeouts: TimeoutSettings,
    #[serde(default)]
    pub channel_policy: ChannelPolicySettings,
    /// Require new connections to echo a PING cookie before registering
    #[serde(default)]
    pub require_spoof_check: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperConfig
{
    pub name: String,
    /// `user@host` pattern the authenticating client must match
    pub mask: Pattern,
    /// Unix crypt-format password hash
    pub hash: String,
    /// Connection class to move the operator into
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub super_oper: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanEntry
{
    pub pattern: Pattern,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BanConfig
{
    #[serde(default)]
    pub nicks: Vec<BanEntry>,
    #[serde(default)]
    pub ips: Vec<BanEntry>,
    #[serde(default)]
    pub user_hosts: Vec<BanEntry>,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionClassConfig
{
    pub name: String,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub ping_frequency: Duration,
    pub max_links: usize,
    pub sendq: usize,
    pub recvq: usize,
    #[serde(default)]
    pub restricted: bool,
    /// Address patterns admitted to this class; empty admits nobody by address
    #[serde(default)]
    pub allow: Vec<Pattern>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerLimits
{
    pub max_list_entries: usize,
    pub max_modes: usize,
    pub max_channels: usize,
    pub topic_len: usize,
    pub kick_len: usize,
    pub away_len: usize,
}

/// Parameters for the penalty-cursor flood governor
#[serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FloodSettings
{
    /// Cursor advance per processed message
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub penalty: Duration,
    /// Number of penalties the cursor may run ahead of the clock before messages are deferred
    pub burst: u32,
    /// How often deferred clients are re-admitted
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub sweep_interval: Duration,
}

#[serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings
{
    #[serde_as(as = "DurationSeconds<u64>")]
    pub registration: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub tls_handshake: Duration,
    #[serde_as(as = "DurationSeconds<u64>")]
    pub dns: Duration,
}

/// Authority boundaries for half-operators
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelPolicySettings
{
    pub halfop_can_kick: bool,
    pub halfop_can_set_topic: bool,
    /// Non-member channel modes a half-op may change
    pub halfop_modes: String,
}

fn default_class_name() -> String
{
    "users".to_string()
}

fn default_classes() -> Vec<ConnectionClassConfig>
{
    vec![ConnectionClassConfig {
        name: default_class_name(),
        ping_frequency: Duration::from_secs(120),
        max_links: 1000,
        sendq: 256 * 1024,
        recvq: 8 * 1024,
        restricted: false,
        allow: vec![Pattern::new("*".to_string())],
    }]
}

impl Default for ServerLimits
{
    fn default() -> Self
    {
        Self {
            max_list_entries: 64,
            max_modes: 6,
            max_channels: 20,
            topic_len: 390,
            kick_len: 255,
            away_len: 200,
        }
    }
}

impl Default for FloodSettings
{
    fn default() -> Self
    {
        Self {
            penalty: Duration::from_millis(500),
            burst: 0,
            sweep_interval: Duration::from_millis(100),
        }
    }
}

impl Default for TimeoutSettings
{
    fn default() -> Self
    {
        Self {
            registration: Duration::from_secs(60),
            tls_handshake: Duration::from_secs(30),
            dns: Duration::from_secs(5),
        }
    }
}

impl Default for ChannelPolicySettings
{
    fn default() -> Self
    {
        Self {
            halfop_can_kick: true,
            halfop_can_set_topic: true,
            halfop_modes: "bimnt".to_string(),
        }
    }
}

impl NetworkConfig
{
    pub fn new() -> Self
    {
        Self {
            opers: Vec::new(),
            bans: BanConfig::default(),
            classes: default_classes(),
            default_class: default_class_name(),
            motd: Vec::new(),
            limits: ServerLimits::default(),
            flood: FloodSettings::default(),
            timeouts: TimeoutSettings::default(),
            channel_policy: ChannelPolicySettings::default(),
            require_spoof_check: false,
        }
    }
}

impl Default for NetworkConfig
{
    fn default() -> Self
    {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let conf: NetworkConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(conf.classes.len(), 1);
        assert_eq!(conf.default_class, "users");
        assert_eq!(conf.flood.burst, 0);
        assert_eq!(conf.limits.max_channels, 20);
    }

    #[test]
    fn durations_and_bans() {
        let conf: NetworkConfig = serde_json::from_str(
            r#"{
                "flood": { "penalty": 250, "burst": 4 },
                "timeouts": { "registration": 10 },
                "bans": { "nicks": [ { "pattern": "bad*", "reason": "no" } ] },
                "classes": [ { "name": "c", "ping_frequency": 90, "max_links": 2, "sendq": 100, "recvq": 50 } ],
                "default_class": "c"
            }"#,
        )
        .unwrap();
        assert_eq!(conf.flood.penalty, Duration::from_millis(250));
        assert_eq!(conf.flood.sweep_interval, Duration::from_millis(100));
        assert_eq!(conf.timeouts.registration, Duration::from_secs(10));
        assert_eq!(conf.timeouts.dns, Duration::from_secs(5));
        assert!(conf.bans.nicks[0].pattern.matches("BADNICK"));
        assert_eq!(conf.classes[0].ping_frequency, Duration::from_secs(90));
    }
}
