//! # Alert Banners
//!
//! Transient, self-dismissing status banners driven by the API and router
//! error paths. Nothing is silently swallowed: every failure class surfaces
//! here, and the banner expires on its own after a fixed time-to-live.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(6);

/// How many banners are kept at once; older ones are dropped first.
const MAX_ALERTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub level: AlertLevel,
    pub text: String,
    raised_at: Instant,
}

/// Queue of live banners with automatic expiry.
pub struct AlertLog {
    alerts: VecDeque<Alert>,
    ttl: Duration,
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl AlertLog {
    pub fn new(ttl: Duration) -> Self {
        Self {
            alerts: VecDeque::new(),
            ttl,
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(AlertLevel::Info, text.into());
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(AlertLevel::Error, text.into());
    }

    fn push(&mut self, level: AlertLevel, text: String) {
        log::debug!("Alert raised ({:?}): {}", level, text);
        if self.alerts.len() == MAX_ALERTS {
            self.alerts.pop_front();
        }
        self.alerts.push_back(Alert {
            level,
            text,
            raised_at: Instant::now(),
        });
    }

    /// Drop banners older than the TTL. Called from the UI loop each tick.
    pub fn sweep(&mut self) {
        let ttl = self.ttl;
        self.alerts.retain(|a| a.raised_at.elapsed() < ttl);
    }

    /// Live banners, oldest first.
    pub fn active(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
