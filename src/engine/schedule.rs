use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::time::Duration;

use crate::error::MonitorError;

/// When the scheduler should fire: a fixed interval or a cron pattern
/// evaluated against the wall clock.
#[derive(Debug, Clone)]
pub enum Schedule {
    Interval(Duration),
    Cron(cron::Schedule),
}

impl Schedule {
    pub fn every_secs(secs: u64) -> Self {
        Schedule::Interval(Duration::from_secs(secs))
    }

    /// Parse a schedule spec: bare seconds (`"90"`), a suffixed interval
    /// (`"90s"`, `"5m"`, `"2h"`, `"500ms"`), or a classic 5-field crontab
    /// pattern (`"*/1 * * * *"`). 5-field patterns are normalized to the
    /// 6-field form the cron crate expects by prepending a seconds field.
    pub fn parse(spec: &str) -> Result<Self, MonitorError> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(MonitorError::Scheduling("empty schedule spec".to_string()));
        }

        if let Some(interval) = parse_interval(spec) {
            if interval.is_zero() {
                return Err(MonitorError::Scheduling(
                    "poll interval must be positive".to_string(),
                ));
            }
            return Ok(Schedule::Interval(interval));
        }

        let normalized = if spec.split_whitespace().count() == 5 {
            format!("0 {}", spec)
        } else {
            spec.to_string()
        };

        cron::Schedule::from_str(&normalized)
            .map(Schedule::Cron)
            .map_err(|e| MonitorError::Scheduling(format!("invalid schedule '{}': {}", spec, e)))
    }

    /// Time until the next fire after `now`, or `None` when the schedule
    /// has no future occurrence.
    pub fn next_delay(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self {
            Schedule::Interval(interval) => Some(*interval),
            Schedule::Cron(schedule) => schedule
                .after(&now)
                .next()
                .map(|next| (next - now).to_std().unwrap_or(Duration::ZERO)),
        }
    }
}

fn parse_interval(spec: &str) -> Option<Duration> {
    if let Ok(secs) = spec.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let (value, unit) = spec.split_at(spec.find(|c: char| c.is_ascii_alphabetic())?);
    let value = value.parse::<u64>().ok()?;
    // An absurd value whose seconds conversion overflows is not a valid
    // interval; fall through to the cron parse and its error.
    match unit {
        "ms" => Some(Duration::from_millis(value)),
        "s" => Some(Duration::from_secs(value)),
        "m" => value.checked_mul(60).map(Duration::from_secs),
        "h" => value.checked_mul(3600).map(Duration::from_secs),
        _ => None,
    }
}
