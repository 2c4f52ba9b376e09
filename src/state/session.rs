// Session gate: decides whether the visitor is ready or must onboard first.

use std::rc::Rc;

use yew::Reducible;

use super::onboarding::{OnboardingAction, OnboardingFlow, SessionIdentity};
use crate::api::ApiError;
use crate::model::{TelegramId, UserSnapshot};
use crate::persist::{self, KeyValueStore};

#[derive(Clone, Debug, PartialEq)]
pub enum GatePhase {
    Unresolved,
    Checking { tg_id: TelegramId },
    /// Lookup was rate limited; a single delayed page reload is pending.
    ReloadScheduled,
    OnboardingRequired(OnboardingFlow),
    Ready { identity: SessionIdentity, balance: Option<u64> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum GateAction {
    Resolve {
        persisted: Option<TelegramId>,
        host_username: Option<String>,
    },
    LookupFinished {
        result: Result<UserSnapshot, ApiError>,
        reload_attempted: bool,
    },
    Onboarding(OnboardingAction),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionGate {
    pub phase: GatePhase,
    host_username: Option<String>,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self {
            phase: GatePhase::Unresolved,
            host_username: None,
        }
    }
}

impl SessionGate {
    pub fn identity(&self) -> Option<&SessionIdentity> {
        match &self.phase {
            GatePhase::Ready { identity, .. } => Some(identity),
            _ => None,
        }
    }

    pub fn flow(&self) -> Option<&OnboardingFlow> {
        match &self.phase {
            GatePhase::OnboardingRequired(flow) => Some(flow),
            _ => None,
        }
    }

    fn onboarding(&self) -> GatePhase {
        GatePhase::OnboardingRequired(OnboardingFlow::new(self.host_username.clone()))
    }

    pub fn apply(&mut self, action: GateAction) {
        match action {
            GateAction::Resolve { persisted, host_username } => {
                if self.phase != GatePhase::Unresolved {
                    return;
                }
                self.host_username = host_username;
                self.phase = match persisted {
                    Some(tg_id) => GatePhase::Checking { tg_id },
                    None => {
                        log::info!("[SESSION] no stored identity, onboarding");
                        self.onboarding()
                    }
                };
            }
            GateAction::LookupFinished { result, reload_attempted } => {
                let GatePhase::Checking { tg_id } = self.phase else {
                    return;
                };
                self.phase = match result {
                    Ok(user) if user.first_login_completed => {
                        let tg_id = user.tg_id.unwrap_or(tg_id);
                        log::info!("[SESSION] {} ready", tg_id);
                        GatePhase::Ready {
                            identity: SessionIdentity {
                                tg_id,
                                username: user.username,
                                onboarded: true,
                                country_code: user.country_code,
                            },
                            balance: Some(user.balance),
                        }
                    }
                    Ok(_) => self.onboarding(),
                    Err(e) if e.is_rate_limited() && !reload_attempted => {
                        log::warn!("[SESSION] lookup rate limited, scheduling reload");
                        GatePhase::ReloadScheduled
                    }
                    Err(e) => {
                        log::warn!("[SESSION] lookup for {} failed: {}", tg_id, e);
                        self.onboarding()
                    }
                };
            }
            GateAction::Onboarding(inner) => {
                let GatePhase::OnboardingRequired(flow) = &mut self.phase else {
                    return;
                };
                flow.apply(inner);
                if let Some((identity, balance)) = flow.completed().cloned() {
                    self.phase = GatePhase::Ready { identity, balance };
                }
            }
        }
    }
}

impl Reducible for SessionGate {
    type Action = GateAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut new = (*self).clone();
        new.apply(action);
        Rc::new(new)
    }
}

/// Side effects of reaching `Ready`: remember the identity for next launch
/// and clear the one-shot reload marker.
pub fn persist_ready(local: &dyn KeyValueStore, session: &dyn KeyValueStore, identity: &SessionIdentity) {
    persist::save_identity(local, identity.tg_id, &identity.username);
    session.remove(persist::KEY_RELOAD_ATTEMPTED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProfileUpdateResponse, VerifyResponse};
    use crate::persist::MemoryStore;
    use crate::state::onboarding::OnboardingStep;

    fn user(done: bool) -> UserSnapshot {
        UserSnapshot {
            tg_id: Some(5),
            username: "wave".into(),
            first_login_completed: done,
            balance: 300,
            ..Default::default()
        }
    }

    #[test]
    fn cold_start_without_identity_opens_step_one() {
        let mut gate = SessionGate::default();
        gate.apply(GateAction::Resolve {
            persisted: None,
            host_username: Some("from_host".into()),
        });
        let flow = gate.flow().unwrap();
        assert_eq!(flow.step, OnboardingStep::RequestCode);
        assert_eq!(flow.username, "from_host");
    }

    #[test]
    fn stored_identity_checks_then_becomes_ready() {
        let mut gate = SessionGate::default();
        gate.apply(GateAction::Resolve { persisted: Some(5), host_username: None });
        assert_eq!(gate.phase, GatePhase::Checking { tg_id: 5 });
        gate.apply(GateAction::LookupFinished { result: Ok(user(true)), reload_attempted: false });
        match &gate.phase {
            GatePhase::Ready { identity, balance } => {
                assert_eq!(identity.tg_id, 5);
                assert_eq!(*balance, Some(300));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn lookup_without_telegram_id_keeps_stored_identity() {
        let mut gate = SessionGate::default();
        gate.apply(GateAction::Resolve { persisted: Some(5_550_001), host_username: None });
        let snapshot: UserSnapshot =
            serde_json::from_str(r#"{"id":3,"username":"wave","first_login_completed":true}"#).unwrap();
        gate.apply(GateAction::LookupFinished { result: Ok(snapshot), reload_attempted: false });
        assert_eq!(gate.identity().map(|i| i.tg_id), Some(5_550_001));
    }

    #[test]
    fn incomplete_or_failed_lookup_requires_onboarding() {
        for result in [Ok(user(false)), Err(ApiError::NotRegistered), Err(ApiError::Network("x".into()))] {
            let mut gate = SessionGate::default();
            gate.apply(GateAction::Resolve { persisted: Some(5), host_username: None });
            gate.apply(GateAction::LookupFinished { result, reload_attempted: false });
            assert!(gate.flow().is_some());
        }
    }

    #[test]
    fn rate_limit_reloads_once_then_falls_back_to_onboarding() {
        let mut gate = SessionGate::default();
        gate.apply(GateAction::Resolve { persisted: Some(5), host_username: None });
        gate.apply(GateAction::LookupFinished {
            result: Err(ApiError::RateLimited),
            reload_attempted: false,
        });
        assert_eq!(gate.phase, GatePhase::ReloadScheduled);

        let mut after_reload = SessionGate::default();
        after_reload.apply(GateAction::Resolve { persisted: Some(5), host_username: None });
        after_reload.apply(GateAction::LookupFinished {
            result: Err(ApiError::RateLimited),
            reload_attempted: true,
        });
        assert!(after_reload.flow().is_some());
    }

    #[test]
    fn completing_step_three_persists_identity_and_readies_session() {
        let local = MemoryStore::default();
        let session = MemoryStore::default();
        session.set(persist::KEY_RELOAD_ATTEMPTED, "1");
        let mut gate = SessionGate::default();
        gate.apply(GateAction::Resolve { persisted: persist::load_identity(&local), host_username: None });
        for action in [
            OnboardingAction::SetUsername("wave".into()),
            OnboardingAction::CodeRequested(Ok(())),
            OnboardingAction::SetCode("123456".into()),
            OnboardingAction::CodeVerified(Ok(VerifyResponse {
                tg_id: 42,
                username: "wave".into(),
                first_login_completed: false,
                country_code: None,
                points_balance: None,
            })),
            OnboardingAction::SelectCountry("NG".into()),
            OnboardingAction::ProfileSaved(Ok(ProfileUpdateResponse { success: true })),
        ] {
            gate.apply(GateAction::Onboarding(action));
        }
        let identity = gate.identity().cloned().unwrap();
        persist_ready(&local, &session, &identity);
        assert_eq!(persist::load_identity(&local), Some(42));
        assert_eq!(session.get(persist::KEY_RELOAD_ATTEMPTED), None);
    }
}
