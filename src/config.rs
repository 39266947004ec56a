use std::fmt;
use std::path::PathBuf;

use crate::types::ChannelKind;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_RETENTION_DAYS: i64 = 7;

/// Explicit configuration for one monitor instance.
///
/// Passed into the monitor's constructor; the monitor owns its lifecycle
/// and no ambient global state is consulted after construction.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Seconds between scheduled polling cycles.
    pub poll_interval_secs: u64,
    /// Days to retain snapshot history, change logs, and dedup fingerprints.
    pub retention_days: i64,
    /// Channels notifications are fanned out to.
    pub channels: Vec<ChannelKind>,
    /// When false, no background schedule is armed; polling is manual only.
    pub enable_scheduling: bool,
    pub channel_settings: ChannelSettings,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            retention_days: DEFAULT_RETENTION_DAYS,
            channels: vec![ChannelKind::Log],
            enable_scheduling: true,
            channel_settings: ChannelSettings::default(),
        }
    }
}

impl MonitorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let channels = std::env::var("MONITOR_CHANNELS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .filter(|s| !s.trim().is_empty())
                    .filter_map(|s| match s.parse::<ChannelKind>() {
                        Ok(kind) => Some(kind),
                        Err(e) => {
                            log::warn!("ignoring channel in MONITOR_CHANNELS: {}", e);
                            None
                        }
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|parsed| !parsed.is_empty())
            .unwrap_or(defaults.channels);

        Self {
            poll_interval_secs: std::env::var("MONITOR_POLL_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.poll_interval_secs),
            retention_days: std::env::var("MONITOR_RETENTION_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retention_days),
            channels,
            enable_scheduling: std::env::var("MONITOR_ENABLE_SCHEDULING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.enable_scheduling),
            channel_settings: ChannelSettings::from_env(),
        }
    }
}

/// Per-channel collaborator endpoints.
///
/// These are credentials-adjacent (webhook URLs frequently embed tokens),
/// so the Debug impl redacts values and nothing here is ever logged.
#[derive(Clone, Default)]
pub struct ChannelSettings {
    pub webhook_url: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub email_endpoint: Option<String>,
    pub sms_endpoint: Option<String>,
    /// Destination of the `file` channel's alert log.
    pub alert_file: Option<PathBuf>,
}

impl ChannelSettings {
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("NOTIFICATION_WEBHOOK_URL").ok(),
            slack_webhook_url: std::env::var("SLACK_WEBHOOK_URL").ok(),
            email_endpoint: std::env::var("NOTIFICATION_EMAIL_ENDPOINT").ok(),
            sms_endpoint: std::env::var("NOTIFICATION_SMS_ENDPOINT").ok(),
            alert_file: std::env::var("MONITOR_ALERT_FILE").ok().map(PathBuf::from),
        }
    }
}

impl fmt::Debug for ChannelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() {
                "<set>"
            } else {
                "<unset>"
            }
        }

        f.debug_struct("ChannelSettings")
            .field("webhook_url", &redact(&self.webhook_url))
            .field("slack_webhook_url", &redact(&self.slack_webhook_url))
            .field("email_endpoint", &redact(&self.email_endpoint))
            .field("sms_endpoint", &redact(&self.sms_endpoint))
            .field("alert_file", &self.alert_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval_secs, 60);
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.channels, vec![ChannelKind::Log]);
        assert!(config.enable_scheduling);
        assert!(config.channel_settings.webhook_url.is_none());
    }

    #[test]
    fn test_debug_redacts_endpoints() {
        let settings = ChannelSettings {
            webhook_url: Some("https://hooks.example.com/T123/secret-token".to_string()),
            ..ChannelSettings::default()
        };
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<set>"));
        assert!(rendered.contains("<unset>"));
    }
}
