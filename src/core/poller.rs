//! # Notification Poller
//!
//! Background loop that checks for pending approval work and raises a
//! deduplicated attention notification. The tick itself lives in the runtime
//! (a tokio interval that feeds `Action::PollTick` into the update loop);
//! this module holds the state machine: the open-notification flag, the
//! lazily-probed capability, and the decision of when a poll result turns
//! into a raised notification.
//!
//! Dedup contract: at most one notification is open at a time. While the
//! flag is set, further non-empty poll results raise nothing; interacting
//! with the notification clears the flag and navigates to the pending page.

use crate::api::types::ConsensusRequestInfo;

/// Default poll interval in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// API method polled for pending approval work.
pub const PENDING_METHOD: &str = "consensus_pending";

/// Page a notification interaction navigates to.
pub const PENDING_PAGE: &str = "consensus";

/// Outcome of probing whether notifications can be raised at all.
/// Probed once, lazily, on the first home-page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Permission {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// What gets raised to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

/// Raises attention notifications. The terminal implementation lives in the
/// TUI adapter; tests inject a recording implementation.
pub trait Notifier: Send + Sync {
    /// Resolve whether notifications are available. Called at most once.
    fn probe(&self) -> Permission;

    /// Raise a notification. Returns false when the notifier could not
    /// deliver it (the flag is then left unset so a later poll may retry).
    fn raise(&self, notice: &Notice) -> bool;
}

/// Poller state shared with the update loop.
#[derive(Debug, Default)]
pub struct NotificationState {
    /// True while a notification is open and unhandled.
    pub open: bool,
    pub permission: Permission,
}

impl NotificationState {
    /// Decide whether a poll result warrants a new notification. Sets the
    /// open flag when it does; the caller is responsible for actually
    /// raising it.
    pub fn on_pending_work(&mut self, pending: &[ConsensusRequestInfo]) -> Option<Notice> {
        if pending.is_empty() || self.open || self.permission == Permission::Denied {
            return None;
        }
        self.open = true;
        let title = "Pending approval requests".to_string();
        let body = if pending.len() == 1 {
            format!("\"{}\" is awaiting approval", pending[0].template_title)
        } else {
            format!("{} requests are awaiting approval", pending.len())
        };
        Some(Notice { title, body })
    }

    /// The user interacted with the open notification.
    pub fn acknowledge(&mut self) {
        self.open = false;
    }

    /// Delivery failed; allow a later poll to retry.
    pub fn delivery_failed(&mut self) {
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(n: usize) -> Vec<ConsensusRequestInfo> {
        (0..n)
            .map(|i| ConsensusRequestInfo {
                id: format!("cr-{i}"),
                template_id: format!("t-{i}"),
                template_title: format!("restart service {i}"),
                requested_by: "alice".to_string(),
                approvals: 0,
                quorum: 2,
                created_at: None,
            })
            .collect()
    }

    #[test]
    fn test_empty_work_set_raises_nothing() {
        let mut state = NotificationState::default();
        assert!(state.on_pending_work(&[]).is_none());
        assert!(!state.open);
    }

    #[test]
    fn test_non_empty_work_raises_once() {
        let mut state = NotificationState::default();
        let notice = state.on_pending_work(&pending(2)).unwrap();
        assert!(state.open);
        assert!(notice.body.contains("2 requests"));

        // Second poll with the flag still set: no duplicate.
        assert!(state.on_pending_work(&pending(3)).is_none());
    }

    #[test]
    fn test_single_request_names_the_template() {
        let mut state = NotificationState::default();
        let notice = state.on_pending_work(&pending(1)).unwrap();
        assert!(notice.body.contains("restart service 0"));
    }

    #[test]
    fn test_acknowledge_allows_next_notification() {
        let mut state = NotificationState::default();
        assert!(state.on_pending_work(&pending(1)).is_some());
        state.acknowledge();
        assert!(!state.open);
        assert!(state.on_pending_work(&pending(1)).is_some());
    }

    #[test]
    fn test_denied_permission_suppresses_notifications() {
        let mut state = NotificationState {
            permission: Permission::Denied,
            ..Default::default()
        };
        assert!(state.on_pending_work(&pending(1)).is_none());
        assert!(!state.open);
    }
}
