// Cooldown for "notify inactive referrals". The next eligible instant is the
// later of what this browser remembers and what the backend last reported.

use crate::config::NOTIFY_COOLDOWN_MS;
use crate::model::{NotifyResponse, NotifyStatus};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NotifyCooldown {
    local_next_ms: Option<f64>,
    backend_last_sent_ms: Option<f64>,
    pub remaining_today: Option<u32>,
}

impl NotifyCooldown {
    pub fn from_local(local_next_ms: Option<f64>) -> Self {
        Self {
            local_next_ms,
            ..Default::default()
        }
    }

    pub fn reconcile(&mut self, status: &NotifyStatus) {
        if status.last_sent_at.is_some() {
            self.backend_last_sent_ms = status.last_sent_at;
        }
        self.remaining_today = status.remaining_today;
    }

    pub fn next_eligible_ms(&self) -> Option<f64> {
        let backend_next = self.backend_last_sent_ms.map(|t| t + NOTIFY_COOLDOWN_MS);
        match (self.local_next_ms, backend_next) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        self.next_eligible_ms()
            .map(|at| (at - now_ms).max(0.0))
            .unwrap_or(0.0)
    }

    pub fn can_notify(&self, now_ms: f64) -> bool {
        self.remaining_ms(now_ms) <= 0.0 && self.remaining_today != Some(0)
    }

    /// Folds in the result of a notify call. Returns the new local timestamp
    /// to persist, or `None` when nothing was sent and the cooldown stands.
    pub fn record(&mut self, resp: &NotifyResponse, now_ms: f64) -> Option<f64> {
        if resp.last_sent_at.is_some() {
            self.backend_last_sent_ms = resp.last_sent_at;
        } else if resp.sent {
            self.backend_last_sent_ms = Some(now_ms);
        } else {
            return None;
        }
        let next = self.next_eligible_ms()?;
        self.local_next_ms = Some(next);
        Some(next)
    }
}

pub fn notify_message(resp: &NotifyResponse) -> String {
    if resp.sent {
        if resp.notified > 0 {
            format!("{} inactive referrals notified 🚀", resp.notified)
        } else {
            "Inactive referrals notified 🚀".to_string()
        }
    } else {
        match resp.reason.as_deref() {
            Some("NO_INACTIVE_REFERRALS") => "No inactive referrals to notify.".to_string(),
            Some("COOLDOWN") | Some("TOO_SOON") => "You can notify them again later.".to_string(),
            _ => "Could not notify referrals. Try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_of_local_and_backend_wins() {
        let mut cd = NotifyCooldown::from_local(Some(5_000.0));
        assert_eq!(cd.next_eligible_ms(), Some(5_000.0));
        cd.reconcile(&NotifyStatus {
            last_sent_at: Some(1_000.0),
            remaining_today: Some(2),
        });
        assert_eq!(cd.next_eligible_ms(), Some(1_000.0 + NOTIFY_COOLDOWN_MS));
        assert!(!cd.can_notify(2_000.0));
        assert!(cd.can_notify(1_000.0 + NOTIFY_COOLDOWN_MS));
    }

    #[test]
    fn fresh_state_allows_notify() {
        let cd = NotifyCooldown::default();
        assert!(cd.can_notify(0.0));
        assert_eq!(cd.remaining_ms(0.0), 0.0);
    }

    #[test]
    fn successful_send_starts_cooldown() {
        let mut cd = NotifyCooldown::default();
        let next = cd.record(
            &NotifyResponse {
                sent: true,
                notified: 3,
                last_sent_at: None,
                reason: None,
            },
            10.0,
        );
        assert_eq!(next, Some(10.0 + NOTIFY_COOLDOWN_MS));
        assert!(!cd.can_notify(11.0));
    }

    #[test]
    fn unsent_notify_leaves_button_available() {
        let mut cd = NotifyCooldown::default();
        let next = cd.record(
            &NotifyResponse {
                sent: false,
                notified: 0,
                last_sent_at: None,
                reason: Some("NO_INACTIVE_REFERRALS".into()),
            },
            1_000.0,
        );
        assert_eq!(next, None);
        assert_eq!(cd.next_eligible_ms(), None);
        assert!(cd.can_notify(61_000.0));
    }

    #[test]
    fn rejected_notify_with_backend_timestamp_follows_backend() {
        let mut cd = NotifyCooldown::from_local(Some(500.0));
        let next = cd.record(
            &NotifyResponse {
                sent: false,
                notified: 0,
                last_sent_at: Some(2_000.0),
                reason: Some("COOLDOWN".into()),
            },
            3_000.0,
        );
        assert_eq!(next, Some(2_000.0 + NOTIFY_COOLDOWN_MS));
        assert!(!cd.can_notify(3_000.0));
    }

    #[test]
    fn exhausted_daily_usage_blocks() {
        let mut cd = NotifyCooldown::default();
        cd.reconcile(&NotifyStatus {
            last_sent_at: None,
            remaining_today: Some(0),
        });
        assert!(!cd.can_notify(0.0));
    }
}
