// Shared balance store. One value, many writers (claims, referral payouts,
// the refresh poll); the last write wins and every subscriber hears it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use yew::Callback;

use crate::api::ApiError;
use crate::model::ClaimResponse;

/// Who wrote the balance. Lets subscribers tell a poll from a claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BalanceSource {
    Session,
    Poll,
    MissionClaim,
    ReferralClaim,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceUpdate {
    pub balance: u64,
    pub source: BalanceSource,
}

impl BalanceUpdate {
    /// Broadcast owed for a claim outcome: only a confirmed claim that
    /// carries the new balance produces one.
    pub fn from_claim(outcome: &Result<ClaimResponse, ApiError>, source: BalanceSource) -> Option<Self> {
        match outcome {
            Ok(ClaimResponse {
                claimed: true,
                new_balance: Some(balance),
                ..
            }) => Some(Self {
                balance: *balance,
                source,
            }),
            _ => None,
        }
    }
}

struct Inner {
    value: Option<u64>,
    next_id: u64,
    subscribers: Vec<(u64, Callback<BalanceUpdate>)>,
}

#[derive(Clone)]
pub struct BalanceStore {
    inner: Rc<RefCell<Inner>>,
}

impl PartialEq for BalanceStore {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for BalanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BalanceStore {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value: None,
                next_id: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> Option<u64> {
        self.inner.borrow().value
    }

    pub fn set(&self, balance: u64, source: BalanceSource) {
        let subscribers: Vec<Callback<BalanceUpdate>> = {
            let mut inner = self.inner.borrow_mut();
            inner.value = Some(balance);
            inner.subscribers.iter().map(|(_, cb)| cb.clone()).collect()
        };
        log::debug!("[BALANCE] {} via {:?}", balance, source);
        let update = BalanceUpdate { balance, source };
        for cb in subscribers {
            cb.emit(update);
        }
    }

    pub fn apply(&self, update: BalanceUpdate) {
        self.set(update.balance, update.source);
    }

    /// Registers `cb`; it stays registered until the returned handle drops.
    pub fn subscribe(&self, cb: Callback<BalanceUpdate>) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push((id, cb));
        Subscription {
            id,
            store: Rc::downgrade(&self.inner),
        }
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    store: Weak<RefCell<Inner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.borrow_mut().subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_see_every_write_and_last_writer_wins() {
        let store = BalanceStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = store.subscribe(Callback::from(move |u: BalanceUpdate| sink.borrow_mut().push(u)));
        store.set(100, BalanceSource::Poll);
        store.set(540, BalanceSource::MissionClaim);
        assert_eq!(store.get(), Some(540));
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(seen.borrow()[1].source, BalanceSource::MissionClaim);
    }

    #[test]
    fn only_confirmed_claims_with_a_balance_broadcast() {
        let ok = Ok(ClaimResponse {
            claimed: true,
            new_balance: Some(540),
            reason: None,
        });
        assert_eq!(
            BalanceUpdate::from_claim(&ok, BalanceSource::ReferralClaim),
            Some(BalanceUpdate {
                balance: 540,
                source: BalanceSource::ReferralClaim
            })
        );
        let no_balance = Ok(ClaimResponse {
            claimed: true,
            new_balance: None,
            reason: None,
        });
        assert_eq!(BalanceUpdate::from_claim(&no_balance, BalanceSource::MissionClaim), None);
        let rejected = Ok(ClaimResponse {
            claimed: false,
            new_balance: Some(540),
            reason: Some("TOO_EARLY".into()),
        });
        assert_eq!(BalanceUpdate::from_claim(&rejected, BalanceSource::MissionClaim), None);
        let failed = Err(ApiError::RateLimited);
        assert_eq!(BalanceUpdate::from_claim(&failed, BalanceSource::MissionClaim), None);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let store = BalanceStore::new();
        let sub = store.subscribe(Callback::from(|_| ()));
        assert_eq!(store.subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn subscriber_may_resubscribe_during_emit() {
        let store = BalanceStore::new();
        let again = store.clone();
        let held = Rc::new(RefCell::new(Vec::new()));
        let held_cb = held.clone();
        let _sub = store.subscribe(Callback::from(move |_| {
            held_cb.borrow_mut().push(again.subscribe(Callback::from(|_| ())));
        }));
        store.set(1, BalanceSource::Session);
        assert_eq!(store.subscriber_count(), 2);
    }
}
