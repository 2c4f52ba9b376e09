//! Mission status engine.
//!
//! Every mission item runs its own small state machine:
//!
//! ```text
//! open -> waiting -> claim -> claiming -> done
//!                      ^         |
//!   open <-------------+---------+   (rejection)
//! ```
//!
//! Kind-specific behaviour (how a mission is started, which endpoint claims
//! it, where its countdown comes from) is looked up once in [`descriptor`]
//! instead of being branched on by mission id.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use yew::Reducible;

use crate::api::ApiError;
use crate::config::{CLAIM_COOLDOWN_MS, LINK_DWELL_MS, NOTICE_DISPLAY_MS, STORY_DWELL_MS};
use crate::model::{ClaimResponse, Mission, MissionKind, MissionStatus};

impl MissionStatus {
    /// The only edges the engine may take.
    pub fn can_transition_to(self, next: MissionStatus) -> bool {
        use MissionStatus::*;
        matches!(
            (self, next),
            (Open, Waiting)
                | (Waiting, Claim)
                | (Claim, Claiming)
                | (Claiming, Done)
                | (Claiming, Open)
                | (Claiming, Claim)
        )
    }

    pub fn button_label(self) -> &'static str {
        match self {
            MissionStatus::Open => "Open",
            MissionStatus::Waiting => "Waiting...",
            MissionStatus::Claim => "Claim",
            MissionStatus::Claiming => "Claiming...",
            MissionStatus::Done => "Done",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartBehavior {
    /// Open the mission's link in the host (or a new tab).
    OpenLink,
    /// Tell the backend the mission was opened; it answers with an unlock time.
    NotifyBackend,
    /// Ask the backend for generated media and open the story composer.
    ShareStory,
    /// No start action; the mission is claimable as listed.
    None,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CountdownSource {
    Fixed(f64),
    /// Use the backend's unlock timestamp, or `fallback_ms` if it sent none.
    BackendUnlock { fallback_ms: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KindDescriptor {
    pub kind: MissionKind,
    pub start: StartBehavior,
    pub claim_path: &'static str,
    pub countdown: CountdownSource,
}

impl KindDescriptor {
    /// Status a fresh item of this kind is actionable from. Rejections fall
    /// back here, so a kind without a start action never lands on `Open`.
    pub fn initial_status(&self) -> MissionStatus {
        match self.start {
            StartBehavior::None => MissionStatus::Claim,
            _ => MissionStatus::Open,
        }
    }

    pub fn unlock_at(&self, now_ms: f64, backend_unlock_ms: Option<f64>) -> f64 {
        match self.countdown {
            CountdownSource::Fixed(d) => now_ms + d,
            CountdownSource::BackendUnlock { fallback_ms } => {
                backend_unlock_ms.unwrap_or(now_ms + fallback_ms)
            }
        }
    }
}

pub const DESCRIPTORS: [KindDescriptor; 4] = [
    KindDescriptor {
        kind: MissionKind::Link,
        start: StartBehavior::OpenLink,
        claim_path: "/claim_mission",
        countdown: CountdownSource::Fixed(LINK_DWELL_MS),
    },
    KindDescriptor {
        kind: MissionKind::Onboarding,
        start: StartBehavior::NotifyBackend,
        claim_path: "/claim_onboarding_mission",
        countdown: CountdownSource::BackendUnlock {
            fallback_ms: LINK_DWELL_MS,
        },
    },
    KindDescriptor {
        kind: MissionKind::Daily,
        start: StartBehavior::None,
        claim_path: "/claim_daily_mission",
        countdown: CountdownSource::Fixed(0.0),
    },
    KindDescriptor {
        kind: MissionKind::Story,
        start: StartBehavior::ShareStory,
        claim_path: "/claim_story_mission",
        countdown: CountdownSource::Fixed(STORY_DWELL_MS),
    },
];

pub fn descriptor(kind: MissionKind) -> &'static KindDescriptor {
    // Table covers every kind; Link is the catch-all should it ever not.
    DESCRIPTORS
        .iter()
        .find(|d| d.kind == kind)
        .unwrap_or(&DESCRIPTORS[0])
}

/// Negative claim outcomes the backend reports in a 2xx body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    NotEnoughInvites,
    MissionNotOpened,
    StoryNotShared,
    ConditionNotMet,
    TooEarly,
    AlreadyClaimed,
    Other(String),
}

impl RejectReason {
    pub fn parse(reason: Option<&str>) -> Self {
        match reason.unwrap_or_default() {
            "NOT_ENOUGH_INVITES" => RejectReason::NotEnoughInvites,
            "MISSION_NOT_OPENED" | "MUST_OPEN_FIRST" | "NOT_OPENED" => RejectReason::MissionNotOpened,
            "STORY_NOT_SHARED" => RejectReason::StoryNotShared,
            "CONDITION_NOT_MET" | "NOT_COMPLETED" | "NOT_SUBSCRIBED" => RejectReason::ConditionNotMet,
            "TOO_EARLY" | "WAIT" | "COOLDOWN" => RejectReason::TooEarly,
            "ALREADY_CLAIMED" => RejectReason::AlreadyClaimed,
            other => RejectReason::Other(other.to_string()),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::NotEnoughInvites => "Invite 2 people today to unlock this reward.",
            RejectReason::MissionNotOpened => "Open the mission first, then come back to claim.",
            RejectReason::StoryNotShared => "Share the story first, then claim your reward.",
            RejectReason::ConditionNotMet => "Complete the mission first, then try again.",
            RejectReason::TooEarly => "Not yet! Give it a few more seconds.",
            RejectReason::AlreadyClaimed => "Already claimed.",
            RejectReason::Other(_) => "Claim failed. Try again.",
        }
    }

    /// Where a `claiming` item goes after this rejection.
    pub fn revert_to(&self, desc: &KindDescriptor) -> MissionStatus {
        match self {
            RejectReason::AlreadyClaimed => MissionStatus::Done,
            RejectReason::TooEarly | RejectReason::Other(_) => MissionStatus::Claim,
            RejectReason::NotEnoughInvites
            | RejectReason::MissionNotOpened
            | RejectReason::StoryNotShared
            | RejectReason::ConditionNotMet => desc.initial_status(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MissionItem {
    pub id: String,
    pub name: String,
    pub points: u64,
    pub link_url: String,
    pub kind: MissionKind,
    pub status: MissionStatus,
    pub unlock_at_ms: Option<f64>,
}

impl MissionItem {
    pub fn from_listing(m: Mission, default_kind: MissionKind, now_ms: f64) -> Self {
        let kind = m.kind.unwrap_or(default_kind);
        let desc = descriptor(kind);
        let (status, unlock_at_ms) = match m.status {
            MissionStatus::Waiting => (
                MissionStatus::Waiting,
                Some(m.unlock_at.unwrap_or_else(|| desc.unlock_at(now_ms, None))),
            ),
            // A claim cannot be in flight for a freshly listed item.
            MissionStatus::Claiming => (MissionStatus::Claim, None),
            // Kinds without a start action are never shown as "open".
            MissionStatus::Open => (desc.initial_status(), None),
            s => (s, None),
        };
        Self {
            id: m.id,
            name: m.name,
            points: m.points,
            link_url: m.link_url,
            kind,
            status,
            unlock_at_ms,
        }
    }

    pub fn descriptor(&self) -> &'static KindDescriptor {
        descriptor(self.kind)
    }

    /// Milliseconds left on the countdown, clamped at zero.
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        match (self.status, self.unlock_at_ms) {
            (MissionStatus::Waiting, Some(at)) => (at - now_ms).max(0.0),
            _ => 0.0,
        }
    }

    fn transition(&mut self, next: MissionStatus) -> bool {
        if self.status.can_transition_to(next) {
            log::debug!("[MISSION] {} {:?} -> {:?}", self.id, self.status, next);
            self.status = next;
            if next != MissionStatus::Waiting {
                self.unlock_at_ms = None;
            }
            true
        } else {
            log::warn!(
                "[MISSION] rejected transition {} {:?} -> {:?}",
                self.id,
                self.status,
                next
            );
            false
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub mission_id: String,
    pub text: String,
    pub expires_at_ms: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MissionBoard {
    pub items: Vec<MissionItem>,
    pub notices: Vec<Notice>,
    pub loading: bool,
    pub error: Option<String>,
    pending_listings: usize,
}

#[derive(Clone, Debug)]
pub enum MissionAction {
    /// Panel opened: drop everything and wait for `listings` responses.
    Reset { listings: usize },
    Loaded { kind: MissionKind, missions: Vec<Mission>, now: f64 },
    LoadFailed { error: ApiError },
    Started { id: String, now: f64, backend_unlock: Option<f64> },
    StartFailed { id: String, now: f64, error: ApiError },
    Tick { now: f64 },
    ClaimSubmitted { id: String },
    ClaimResolved { id: String, now: f64, outcome: Result<ClaimResponse, ApiError> },
    DismissNotice { id: String },
}

impl MissionBoard {
    pub fn item(&self, id: &str) -> Option<&MissionItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn item_mut(&mut self, id: &str) -> Option<&mut MissionItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    pub fn notice_for(&self, id: &str) -> Option<&str> {
        self.notices
            .iter()
            .find(|n| n.mission_id == id)
            .map(|n| n.text.as_str())
    }

    /// Earliest pending unlock, used to schedule the next precise tick.
    pub fn next_unlock_ms(&self) -> Option<f64> {
        self.items
            .iter()
            .filter(|i| i.status == MissionStatus::Waiting)
            .filter_map(|i| i.unlock_at_ms)
            .reduce(f64::min)
    }

    fn push_notice(&mut self, id: &str, text: &str, now: f64) {
        self.notices.retain(|n| n.mission_id != id);
        self.notices.push(Notice {
            mission_id: id.to_string(),
            text: text.to_string(),
            expires_at_ms: now + NOTICE_DISPLAY_MS,
        });
    }

    fn listing_settled(&mut self) {
        self.pending_listings = self.pending_listings.saturating_sub(1);
        self.loading = self.pending_listings > 0;
    }

    pub fn apply(&mut self, action: MissionAction) {
        use MissionAction::*;
        match action {
            Reset { listings } => {
                *self = MissionBoard {
                    loading: listings > 0,
                    pending_listings: listings,
                    ..Default::default()
                };
            }
            Loaded { kind, missions, now } => {
                self.listing_settled();
                for m in missions {
                    if self.item(&m.id).is_some() {
                        log::debug!("[MISSION] duplicate listing for {} ignored", m.id);
                        continue;
                    }
                    self.items.push(MissionItem::from_listing(m, kind, now));
                }
                if !self.items.is_empty() {
                    self.error = None;
                }
            }
            LoadFailed { error } => {
                self.listing_settled();
                if self.items.is_empty() {
                    self.error = Some(format!("Could not fetch missions ({})", error));
                }
            }
            Started { id, now, backend_unlock } => {
                if let Some(item) = self.item_mut(&id) {
                    let unlock = item.descriptor().unlock_at(now, backend_unlock);
                    if item.transition(MissionStatus::Waiting) {
                        item.unlock_at_ms = Some(unlock);
                    }
                }
                self.apply(Tick { now });
            }
            StartFailed { id, now, error } => {
                self.push_notice(&id, error.user_message(), now);
            }
            Tick { now } => {
                for item in &mut self.items {
                    if item.status == MissionStatus::Waiting
                        && item.unlock_at_ms.is_some_and(|at| at <= now)
                    {
                        item.transition(MissionStatus::Claim);
                    }
                }
                self.notices.retain(|n| n.expires_at_ms > now);
            }
            ClaimSubmitted { id } => {
                if let Some(item) = self.item_mut(&id) {
                    item.transition(MissionStatus::Claiming);
                }
            }
            ClaimResolved { id, now, outcome } => {
                let Some(item) = self.item_mut(&id) else {
                    return;
                };
                if item.status != MissionStatus::Claiming {
                    return;
                }
                let notice = match outcome {
                    Ok(resp) if resp.claimed => {
                        item.transition(MissionStatus::Done);
                        None
                    }
                    Ok(resp) => {
                        let reason = RejectReason::parse(resp.reason.as_deref());
                        log::warn!("[MISSION] claim {} rejected: {:?}", id, reason);
                        item.transition(reason.revert_to(item.descriptor()));
                        Some(reason.message().to_string())
                    }
                    Err(e) => {
                        item.transition(MissionStatus::Claim);
                        Some(e.user_message().to_string())
                    }
                };
                if let Some(text) = notice {
                    self.push_notice(&id, &text, now);
                }
            }
            DismissNotice { id } => self.notices.retain(|n| n.mission_id != id),
        }
    }
}

impl Reducible for MissionBoard {
    type Action = MissionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut new = (*self).clone();
        new.apply(action);
        Rc::new(new)
    }
}

/// Per-mission cooldown on claim submission. Checked synchronously in the
/// click handler, so a double tap never reaches the network twice even
/// before the reducer has re-rendered. Advisory: the backend still decides.
#[derive(Debug)]
pub struct ClaimGuard {
    cooldown_ms: f64,
    last_ms: HashMap<String, f64>,
}

impl Default for ClaimGuard {
    fn default() -> Self {
        Self::new(CLAIM_COOLDOWN_MS)
    }
}

impl ClaimGuard {
    pub fn new(cooldown_ms: f64) -> Self {
        Self {
            cooldown_ms,
            last_ms: HashMap::new(),
        }
    }

    pub fn try_acquire(&mut self, id: &str, now_ms: f64) -> bool {
        match self.last_ms.get(id) {
            Some(t) if now_ms - t < self.cooldown_ms => false,
            _ => {
                self.last_ms.insert(id.to_string(), now_ms);
                true
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClaimTicket {
    pub mission_id: String,
    pub claim_path: &'static str,
}

/// Decides whether a claim click may go out. `None` means drop the click.
pub fn plan_claim(board: &MissionBoard, guard: &mut ClaimGuard, id: &str, now_ms: f64) -> Option<ClaimTicket> {
    let item = board.item(id)?;
    if item.status != MissionStatus::Claim || !guard.try_acquire(id, now_ms) {
        return None;
    }
    Some(ClaimTicket {
        mission_id: item.id.clone(),
        claim_path: item.descriptor().claim_path,
    })
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartPlan {
    pub mission_id: String,
    pub behavior: StartBehavior,
    pub link_url: String,
}

/// Starts that have gone out but not yet landed as `Started`/`StartFailed`.
/// A second tap on the same mission is dropped until [`StartGuard::finish`].
#[derive(Debug, Default)]
pub struct StartGuard {
    pending: HashSet<String>,
}

impl StartGuard {
    fn try_begin(&mut self, id: &str) -> bool {
        self.pending.insert(id.to_string())
    }

    pub fn finish(&mut self, id: &str) {
        self.pending.remove(id);
    }
}

pub fn plan_start(board: &MissionBoard, guard: &mut StartGuard, id: &str) -> Option<StartPlan> {
    let item = board.item(id)?;
    let behavior = item.descriptor().start;
    if item.status != MissionStatus::Open || behavior == StartBehavior::None || !guard.try_begin(id) {
        return None;
    }
    Some(StartPlan {
        mission_id: item.id.clone(),
        behavior,
        link_url: item.link_url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BalanceSource, BalanceStore, BalanceUpdate};
    use proptest::prelude::*;

    fn mission(id: &str, status: MissionStatus, kind: Option<MissionKind>) -> Mission {
        Mission {
            id: id.into(),
            name: id.into(),
            points: 100,
            link_url: format!("https://t.me/{}", id),
            status,
            unlock_at: None,
            kind,
        }
    }

    fn board_with(kind: MissionKind, missions: Vec<Mission>) -> MissionBoard {
        let mut b = MissionBoard::default();
        b.apply(MissionAction::Reset { listings: 1 });
        b.apply(MissionAction::Loaded { kind, missions, now: 0.0 });
        b
    }

    fn claimed(balance: u64) -> Result<ClaimResponse, ApiError> {
        Ok(ClaimResponse {
            claimed: true,
            new_balance: Some(balance),
            reason: None,
        })
    }

    fn rejected(reason: &str) -> Result<ClaimResponse, ApiError> {
        Ok(ClaimResponse {
            claimed: false,
            new_balance: None,
            reason: Some(reason.into()),
        })
    }

    #[test]
    fn successful_claim_reaches_done() {
        let mut b = board_with(MissionKind::Link, vec![mission("tw", MissionStatus::Claim, None)]);
        let mut guard = ClaimGuard::default();
        let ticket = plan_claim(&b, &mut guard, "tw", 0.0).unwrap();
        assert_eq!(ticket.claim_path, "/claim_mission");
        b.apply(MissionAction::ClaimSubmitted { id: "tw".into() });
        b.apply(MissionAction::ClaimResolved {
            id: "tw".into(),
            now: 10.0,
            outcome: claimed(540),
        });
        assert_eq!(b.item("tw").unwrap().status, MissionStatus::Done);
        assert!(b.notices.is_empty());
    }

    #[test]
    fn confirmed_claim_updates_item_and_balance() {
        let store = BalanceStore::new();
        store.set(500, BalanceSource::Session);
        let mut b = board_with(MissionKind::Link, vec![mission("tw", MissionStatus::Claim, None)]);
        b.apply(MissionAction::ClaimSubmitted { id: "tw".into() });
        let outcome = claimed(540);
        if let Some(update) = BalanceUpdate::from_claim(&outcome, BalanceSource::MissionClaim) {
            store.apply(update);
        }
        b.apply(MissionAction::ClaimResolved {
            id: "tw".into(),
            now: 10.0,
            outcome,
        });
        assert_eq!(b.item("tw").unwrap().status, MissionStatus::Done);
        assert_eq!(store.get(), Some(540));
    }

    #[test]
    fn daily_invite_rejection_reverts_to_claim_with_transient_notice() {
        let mut b = board_with(
            MissionKind::Daily,
            vec![mission("invite_daily", MissionStatus::Open, None)],
        );
        // Daily missions have no open action, so they list as claimable.
        assert_eq!(b.item("invite_daily").unwrap().status, MissionStatus::Claim);
        b.apply(MissionAction::ClaimSubmitted { id: "invite_daily".into() });
        assert_eq!(b.item("invite_daily").unwrap().status, MissionStatus::Claiming);
        b.apply(MissionAction::ClaimResolved {
            id: "invite_daily".into(),
            now: 1_000.0,
            outcome: rejected("NOT_ENOUGH_INVITES"),
        });
        assert_eq!(b.item("invite_daily").unwrap().status, MissionStatus::Claim);
        assert_eq!(
            b.notice_for("invite_daily"),
            Some("Invite 2 people today to unlock this reward.")
        );
        b.apply(MissionAction::Tick { now: 1_000.0 + NOTICE_DISPLAY_MS - 1.0 });
        assert!(b.notice_for("invite_daily").is_some());
        b.apply(MissionAction::Tick { now: 1_000.0 + NOTICE_DISPLAY_MS });
        assert!(b.notice_for("invite_daily").is_none());
    }

    #[test]
    fn not_opened_rejection_sends_link_mission_back_to_open() {
        let mut b = board_with(MissionKind::Link, vec![mission("yt", MissionStatus::Claim, None)]);
        b.apply(MissionAction::ClaimSubmitted { id: "yt".into() });
        b.apply(MissionAction::ClaimResolved {
            id: "yt".into(),
            now: 0.0,
            outcome: rejected("MISSION_NOT_OPENED"),
        });
        assert_eq!(b.item("yt").unwrap().status, MissionStatus::Open);
        assert!(plan_start(&b, &mut StartGuard::default(), "yt").is_some());
    }

    #[test]
    fn network_failure_keeps_item_claimable() {
        let mut b = board_with(MissionKind::Link, vec![mission("yt", MissionStatus::Claim, None)]);
        b.apply(MissionAction::ClaimSubmitted { id: "yt".into() });
        b.apply(MissionAction::ClaimResolved {
            id: "yt".into(),
            now: 0.0,
            outcome: Err(ApiError::Network("offline".into())),
        });
        assert_eq!(b.item("yt").unwrap().status, MissionStatus::Claim);
        assert_eq!(b.notice_for("yt"), Some("Network error. Check your connection."));
    }

    #[test]
    fn backend_unlock_drives_countdown() {
        let t = 1_700_000_000_000.0;
        let mut b = board_with(
            MissionKind::Onboarding,
            vec![mission("join_channel", MissionStatus::Open, None)],
        );
        let plan = plan_start(&b, &mut StartGuard::default(), "join_channel").unwrap();
        assert_eq!(plan.behavior, StartBehavior::NotifyBackend);
        b.apply(MissionAction::Started {
            id: "join_channel".into(),
            now: t,
            backend_unlock: Some(t + 8_000.0),
        });
        let item = b.item("join_channel").unwrap();
        assert_eq!(item.status, MissionStatus::Waiting);
        assert_eq!(item.remaining_ms(t + 3_000.0), 5_000.0);
        b.apply(MissionAction::Tick { now: t + 7_999.0 });
        assert_eq!(b.item("join_channel").unwrap().status, MissionStatus::Waiting);
        b.apply(MissionAction::Tick { now: t + 8_000.0 });
        assert_eq!(b.item("join_channel").unwrap().status, MissionStatus::Claim);
    }

    #[test]
    fn past_unlock_means_immediately_claimable() {
        let mut b = board_with(
            MissionKind::Onboarding,
            vec![mission("join", MissionStatus::Open, None)],
        );
        b.apply(MissionAction::Started {
            id: "join".into(),
            now: 10_000.0,
            backend_unlock: Some(2_000.0),
        });
        assert_eq!(b.item("join").unwrap().status, MissionStatus::Claim);
    }

    #[test]
    fn link_missions_use_fixed_dwell() {
        let mut b = board_with(MissionKind::Link, vec![mission("x", MissionStatus::Open, None)]);
        b.apply(MissionAction::Started {
            id: "x".into(),
            now: 0.0,
            backend_unlock: Some(1.0),
        });
        assert_eq!(b.item("x").unwrap().unlock_at_ms, Some(LINK_DWELL_MS));
        assert_eq!(b.next_unlock_ms(), Some(LINK_DWELL_MS));
    }

    #[test]
    fn rapid_double_claim_yields_one_ticket() {
        let b = board_with(MissionKind::Link, vec![mission("tw", MissionStatus::Claim, None)]);
        let mut guard = ClaimGuard::default();
        let first = plan_claim(&b, &mut guard, "tw", 100.0);
        let second = plan_claim(&b, &mut guard, "tw", 150.0);
        assert!(first.is_some());
        assert!(second.is_none());
        assert!(plan_claim(&b, &mut guard, "tw", 100.0 + CLAIM_COOLDOWN_MS).is_some());
    }

    #[test]
    fn pending_start_drops_repeat_taps() {
        let b = board_with(
            MissionKind::Onboarding,
            vec![mission("join", MissionStatus::Open, None)],
        );
        let mut guard = StartGuard::default();
        assert!(plan_start(&b, &mut guard, "join").is_some());
        assert!(plan_start(&b, &mut guard, "join").is_none());
        guard.finish("join");
        assert!(plan_start(&b, &mut guard, "join").is_some());
    }

    #[test]
    fn loading_holds_until_every_listing_settles() {
        let mut b = MissionBoard::default();
        b.apply(MissionAction::Reset { listings: 3 });
        b.apply(MissionAction::Loaded {
            kind: MissionKind::Link,
            missions: Vec::new(),
            now: 0.0,
        });
        assert!(b.loading);
        b.apply(MissionAction::LoadFailed {
            error: ApiError::Network("offline".into()),
        });
        assert!(b.loading);
        b.apply(MissionAction::Loaded {
            kind: MissionKind::Daily,
            missions: vec![mission("d", MissionStatus::Claim, None)],
            now: 0.0,
        });
        assert!(!b.loading);
        assert!(b.error.is_none());
        assert_eq!(b.items.len(), 1);
    }

    #[test]
    fn duplicate_ids_across_listings_are_shown_once() {
        let mut b = board_with(MissionKind::Link, vec![mission("a", MissionStatus::Open, None)]);
        b.apply(MissionAction::Loaded {
            kind: MissionKind::Daily,
            missions: vec![
                mission("a", MissionStatus::Claim, None),
                mission("b", MissionStatus::Claim, None),
            ],
            now: 0.0,
        });
        assert_eq!(b.items.len(), 2);
        assert_eq!(b.item("a").unwrap().kind, MissionKind::Link);
    }

    #[test]
    fn story_kind_from_payload_overrides_listing() {
        let b = board_with(
            MissionKind::Link,
            vec![mission("story", MissionStatus::Open, Some(MissionKind::Story))],
        );
        let item = b.item("story").unwrap();
        assert_eq!(item.descriptor().claim_path, "/claim_story_mission");
        assert_eq!(
            plan_start(&b, &mut StartGuard::default(), "story").unwrap().behavior,
            StartBehavior::ShareStory
        );
    }

    #[test]
    fn late_claim_response_is_ignored_after_reset() {
        let mut b = board_with(MissionKind::Link, vec![mission("tw", MissionStatus::Claim, None)]);
        b.apply(MissionAction::ClaimSubmitted { id: "tw".into() });
        b.apply(MissionAction::Reset { listings: 3 });
        b.apply(MissionAction::ClaimResolved {
            id: "tw".into(),
            now: 0.0,
            outcome: claimed(1),
        });
        assert!(b.items.is_empty());
    }

    #[derive(Clone, Debug)]
    enum Step {
        Start(usize, Option<u16>),
        Tick(u16),
        Claim(usize),
        Resolve(usize, u8),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0..3usize, proptest::option::of(any::<u16>())).prop_map(|(i, u)| Step::Start(i, u)),
            any::<u16>().prop_map(Step::Tick),
            (0..3usize).prop_map(Step::Claim),
            (0..3usize, 0..8u8).prop_map(|(i, r)| Step::Resolve(i, r)),
        ]
    }

    const IDS: [&str; 3] = ["link", "daily", "story"];

    fn outcome(code: u8) -> Result<ClaimResponse, ApiError> {
        match code {
            0 => claimed(10),
            1 => rejected("NOT_ENOUGH_INVITES"),
            2 => rejected("MISSION_NOT_OPENED"),
            3 => rejected("TOO_EARLY"),
            4 => rejected("ALREADY_CLAIMED"),
            5 => rejected("STORY_NOT_SHARED"),
            6 => rejected("SOMETHING_NEW"),
            _ => Err(ApiError::RateLimited),
        }
    }

    proptest! {
        #[test]
        fn status_moves_only_along_engine_edges(steps in proptest::collection::vec(step(), 1..60)) {
            let mut b = MissionBoard::default();
            b.apply(MissionAction::Reset { listings: 1 });
            b.apply(MissionAction::Loaded {
                kind: MissionKind::Link,
                missions: vec![
                    mission("link", MissionStatus::Open, None),
                    mission("daily", MissionStatus::Claim, Some(MissionKind::Daily)),
                    mission("story", MissionStatus::Open, Some(MissionKind::Story)),
                ],
                now: 0.0,
            });
            let mut clock = 0.0;
            for s in steps {
                let before: Vec<MissionStatus> = b.items.iter().map(|i| i.status).collect();
                clock += 100.0;
                let action = match s {
                    Step::Start(i, u) => MissionAction::Started {
                        id: IDS[i].into(),
                        now: clock,
                        backend_unlock: u.map(|v| clock + f64::from(v)),
                    },
                    Step::Tick(dt) => {
                        clock += f64::from(dt);
                        MissionAction::Tick { now: clock }
                    }
                    Step::Claim(i) => MissionAction::ClaimSubmitted { id: IDS[i].into() },
                    Step::Resolve(i, r) => MissionAction::ClaimResolved {
                        id: IDS[i].into(),
                        now: clock,
                        outcome: outcome(r),
                    },
                };
                b.apply(action);
                for (old, item) in before.iter().zip(&b.items) {
                    let new = item.status;
                    // A start may chain straight through waiting into claim.
                    let via_waiting = *old == MissionStatus::Open && new == MissionStatus::Claim;
                    prop_assert!(*old == new || old.can_transition_to(new) || via_waiting,
                        "{} jumped {:?} -> {:?}", item.id, old, new);
                    if new == MissionStatus::Done {
                        prop_assert!(matches!(*old, MissionStatus::Done | MissionStatus::Claiming));
                    }
                    if item.kind == MissionKind::Daily {
                        prop_assert_ne!(new, MissionStatus::Open);
                    }
                }
            }
        }
    }
}
