//! Capacity-bounded alert feed with deferred expiry.
//!
//! Entries are kept most-recent-first. Every entry that is not a danger
//! alert gets an [`ExpiryToken`] with a deadline [`ALERT_TTL`] after creation;
//! the host drives expiry either per token ([`AlertFeed::expire`]) or in bulk
//! on its refresh tick ([`AlertFeed::expire_due`]).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::reading::AlertSignal;

/// Maximum number of alerts kept in the feed.
pub const MAX_ALERTS: usize = 10;

/// Lifetime of non-danger alerts.
pub const ALERT_TTL: Duration = Duration::from_secs(5);

/// Identifier of an alert within its feed.
pub type AlertId = u64;

/// Severity of an alert entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Success,
    Warning,
    Danger,
}

impl AlertSeverity {
    /// Whether alerts of this severity expire on their own.
    pub fn expires(&self) -> bool {
        *self != AlertSeverity::Danger
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "INFO",
            AlertSeverity::Success => "OK",
            AlertSeverity::Warning => "WARN",
            AlertSeverity::Danger => "DANGER",
        }
    }
}

/// Handle to a pending expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryToken {
    id: AlertId,
    deadline: Instant,
}

impl ExpiryToken {
    pub fn id(&self) -> AlertId {
        self.id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether the deadline has been reached at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}

/// A human-readable alert.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEntry {
    pub id: AlertId,
    pub message: String,
    pub severity: AlertSeverity,
    pub created_at: Instant,
    /// When the entry expires; `None` for danger alerts or cancelled expiry.
    pub expires_at: Option<Instant>,
}

impl AlertEntry {
    /// Token for the pending expiry, if this entry has one.
    pub fn expiry(&self) -> Option<ExpiryToken> {
        self.expires_at.map(|deadline| ExpiryToken {
            id: self.id,
            deadline,
        })
    }
}

/// Ordered, capacity-bounded alert log (most recent first).
#[derive(Debug, Clone, Default)]
pub struct AlertFeed {
    entries: VecDeque<AlertEntry>,
    next_id: AlertId,
}

impl AlertFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an alert at the head, discarding the oldest beyond capacity.
    ///
    /// Returns a copy of the created entry so the caller can track its expiry.
    pub fn push(
        &mut self,
        message: impl Into<String>,
        severity: AlertSeverity,
        now: Instant,
    ) -> AlertEntry {
        let id = self.next_id;
        self.next_id += 1;

        let entry = AlertEntry {
            id,
            message: message.into(),
            severity,
            created_at: now,
            expires_at: severity.expires().then(|| now + ALERT_TTL),
        };

        self.entries.push_front(entry.clone());
        self.entries.truncate(MAX_ALERTS);
        entry
    }

    /// Remove an entry if it is still present.
    ///
    /// Returns false if the entry was already evicted or expired.
    pub fn expire(&mut self, id: AlertId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Cancel a pending expiry; the entry stays until capacity eviction.
    pub fn cancel_expiry(&mut self, token: ExpiryToken) -> bool {
        match self.entries.iter_mut().find(|e| e.id == token.id) {
            Some(entry) if entry.expires_at.is_some() => {
                entry.expires_at = None;
                true
            }
            _ => false,
        }
    }

    /// Remove every entry whose expiry deadline has passed.
    ///
    /// Returns the number of entries removed.
    pub fn expire_due(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.expires_at.map_or(true, |deadline| now < deadline));
        before - self.entries.len()
    }

    /// Current entries, most recent first.
    pub fn entries(&self) -> impl Iterator<Item = &AlertEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AlertSignal {
    /// Map the signal code to a message and severity.
    pub fn alert(&self) -> (String, AlertSeverity) {
        match self.code() {
            "GAS_HIGH" => ("Gas level is dangerously high!".to_string(), AlertSeverity::Danger),
            "TEMP_HIGH" => ("Temperature is too high!".to_string(), AlertSeverity::Danger),
            "OK" => ("System status: OK".to_string(), AlertSeverity::Success),
            other => (format!("Alert: {}", other), AlertSeverity::Info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_is_most_recent_first() {
        let mut feed = AlertFeed::new();
        let now = Instant::now();
        feed.push("first", AlertSeverity::Info, now);
        feed.push("second", AlertSeverity::Warning, now);

        let messages: Vec<&str> = feed.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
    }

    #[test]
    fn test_capacity_keeps_ten_most_recent() {
        let mut feed = AlertFeed::new();
        let now = Instant::now();
        for i in 0..12 {
            feed.push(format!("alert {}", i), AlertSeverity::Danger, now);
        }

        assert_eq!(feed.len(), MAX_ALERTS);
        let messages: Vec<String> = feed.entries().map(|e| e.message.clone()).collect();
        let expected: Vec<String> = (2..12).rev().map(|i| format!("alert {}", i)).collect();
        assert_eq!(messages, expected);
    }

    #[test]
    fn test_danger_alerts_have_no_expiry() {
        let mut feed = AlertFeed::new();
        let now = Instant::now();
        let entry = feed.push("boom", AlertSeverity::Danger, now);

        assert!(entry.expiry().is_none());
        assert_eq!(feed.expire_due(now + Duration::from_secs(3600)), 0);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_non_danger_alerts_expire_after_ttl() {
        let mut feed = AlertFeed::new();
        let now = Instant::now();
        let entry = feed.push("hello", AlertSeverity::Success, now);

        let token = entry.expiry().unwrap();
        assert_eq!(token.deadline(), now + ALERT_TTL);
        assert!(!token.is_due(now + Duration::from_secs(4)));

        assert_eq!(feed.expire_due(now + Duration::from_secs(4)), 0);
        assert_eq!(feed.expire_due(now + ALERT_TTL), 1);
        assert!(feed.is_empty());
    }

    #[test]
    fn test_expire_is_noop_after_eviction() {
        let mut feed = AlertFeed::new();
        let now = Instant::now();
        let first = feed.push("oldest", AlertSeverity::Info, now);
        for _ in 0..MAX_ALERTS {
            feed.push("newer", AlertSeverity::Info, now);
        }

        assert!(feed.entries().all(|e| e.id != first.id));
        assert!(!feed.expire(first.id));
        assert_eq!(feed.len(), MAX_ALERTS);
    }

    #[test]
    fn test_expire_by_token() {
        let mut feed = AlertFeed::new();
        let now = Instant::now();
        let keep = feed.push("keep", AlertSeverity::Danger, now);
        let gone = feed.push("gone", AlertSeverity::Info, now);

        assert!(feed.expire(gone.expiry().unwrap().id()));
        assert!(!feed.expire(gone.id));
        assert!(feed.entries().any(|e| e.id == keep.id));
    }

    #[test]
    fn test_cancel_expiry_keeps_entry() {
        let mut feed = AlertFeed::new();
        let now = Instant::now();
        let entry = feed.push("sticky", AlertSeverity::Warning, now);

        assert!(feed.cancel_expiry(entry.expiry().unwrap()));
        assert!(!feed.cancel_expiry(entry.expiry().unwrap()));
        assert_eq!(feed.expire_due(now + Duration::from_secs(60)), 0);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn test_signal_mapping() {
        assert_eq!(AlertSignal::new("GAS_HIGH").alert().1, AlertSeverity::Danger);
        assert_eq!(AlertSignal::new("TEMP_HIGH").alert().1, AlertSeverity::Danger);
        assert_eq!(AlertSignal::new("OK").alert().1, AlertSeverity::Success);

        let (message, severity) = AlertSignal::new("DOOR_OPEN").alert();
        assert_eq!(severity, AlertSeverity::Info);
        assert_eq!(message, "Alert: DOOR_OPEN");
    }
}
