use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::{
    balance_display::BalanceDisplay, globe_view::GlobeView, leaderboard::Leaderboard,
    loading_screen::LoadingScreen, marketplace::Marketplace, mission_center::MissionCenter,
    nav_bar::NavBar, onboarding_modal::OnboardingModal, profile::Profile,
};
use crate::api::{endpoints::balance_path, ApiClient, ApiError};
use crate::config::{AppConfig, BALANCE_POLL_MS, RATE_LIMIT_RELOAD_MS};
use crate::host;
use crate::model::{BalanceResponse, TelegramId};
use crate::persist::{self, BrowserStore, KeyValueStore};
use crate::state::onboarding::{OnboardingAction, SessionIdentity};
use crate::state::session::persist_ready;
use crate::state::{GateAction, GatePhase, RefreshScheduler, SessionGate};
use crate::store::{BalanceSource, BalanceStore};
use crate::util::{AliveFlag, Timer};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overlay {
    Missions,
    Leaderboard,
    Marketplace,
    Profile,
}

// Shared with every panel so none of them needs the client or the balance
// threaded through props.
#[derive(Clone, PartialEq)]
pub struct AppContext {
    pub client: ApiClient,
    pub balance: BalanceStore,
    pub identity: Option<SessionIdentity>,
}

impl AppContext {
    pub fn tg_id(&self) -> Option<TelegramId> {
        self.identity.as_ref().map(|i| i.tg_id)
    }
}

/// One refresh of the shared balance, skipped while another is in flight.
fn refresh_balance(client: &ApiClient, store: &BalanceStore, scheduler: &Rc<RefCell<RefreshScheduler>>, tg_id: TelegramId) {
    let Some(ticket) = scheduler.borrow_mut().try_begin() else {
        return;
    };
    let store = store.clone();
    let scheduler = scheduler.clone();
    client.cached_get(
        &balance_path(tg_id),
        Callback::from(move |result: Result<BalanceResponse, ApiError>| {
            if !scheduler.borrow_mut().finish(ticket) {
                return;
            }
            match result {
                Ok(resp) => store.set(resp.balance, BalanceSource::Poll),
                Err(e) => log::warn!("[POLL] balance refresh failed: {}", e),
            }
        }),
    );
}

#[function_component(App)]
pub fn app() -> Html {
    let client = use_memo((), |_| ApiClient::new(AppConfig::from_env()));
    let balance = use_memo((), |_| BalanceStore::new());
    let scheduler = use_mut_ref(RefreshScheduler::default);
    let gate = use_reducer(SessionGate::default);
    let overlay = use_state(|| None::<Overlay>);

    // Resolve the persisted identity once on mount
    {
        let gate = gate.clone();
        use_effect_with((), move |_| {
            let persisted = persist::load_identity(&BrowserStore::LOCAL);
            let host_username = host::host_user()
                .and_then(|u| u.username)
                .or_else(|| persist::load_username(&BrowserStore::LOCAL));
            gate.dispatch(GateAction::Resolve {
                persisted,
                host_username,
            });
            || ()
        });
    }

    // Backend lookup while checking
    let checking = match gate.phase {
        GatePhase::Checking { tg_id } => Some(tg_id),
        _ => None,
    };
    {
        let gate = gate.clone();
        let client = (*client).clone();
        use_effect_with(checking, move |checking| {
            let alive = AliveFlag::new();
            if let Some(tg_id) = *checking {
                let alive = alive.clone();
                spawn_local(async move {
                    let result = client.user(tg_id).await;
                    if !alive.is_alive() {
                        return;
                    }
                    let reload_attempted = BrowserStore::SESSION
                        .get(persist::KEY_RELOAD_ATTEMPTED)
                        .is_some();
                    gate.dispatch(GateAction::LookupFinished {
                        result,
                        reload_attempted,
                    });
                });
            }
            move || alive.kill()
        });
    }

    // Rate limited: mark the attempt for this tab and reload once after a pause
    let reload_pending = matches!(gate.phase, GatePhase::ReloadScheduled);
    use_effect_with(reload_pending, move |pending| {
        let timer = if *pending {
            BrowserStore::SESSION.set(persist::KEY_RELOAD_ATTEMPTED, "1");
            Timer::timeout(RATE_LIMIT_RELOAD_MS as i32, host::reload_page)
        } else {
            None
        };
        move || drop(timer)
    });

    // Ready: persist identity and seed the shared balance
    let identity = gate.identity().cloned();
    {
        let gate = gate.clone();
        let balance = balance.clone();
        use_effect_with(identity.clone(), move |identity| {
            if let Some(identity) = identity {
                persist_ready(&BrowserStore::LOCAL, &BrowserStore::SESSION, identity);
                if let GatePhase::Ready {
                    balance: Some(b), ..
                } = &gate.phase
                {
                    balance.set(*b, BalanceSource::Session);
                }
            }
            || ()
        });
    }

    // Single balance poll for the whole app
    {
        let client = (*client).clone();
        let balance = (*balance).clone();
        let scheduler = scheduler.clone();
        let tg_id = identity.as_ref().map(|i| i.tg_id);
        use_effect_with(tg_id, move |tg_id| {
            let timer = (*tg_id).and_then(|tg_id| {
                let scheduler = scheduler.clone();
                Timer::interval(BALANCE_POLL_MS as i32, move || {
                    refresh_balance(&client, &balance, &scheduler, tg_id)
                })
            });
            move || {
                scheduler.borrow_mut().cancel();
                drop(timer);
            }
        });
    }

    let on_toggle = {
        let overlay = overlay.clone();
        Callback::from(move |o: Overlay| {
            let next = if *overlay == Some(o) { None } else { Some(o) };
            overlay.set(next);
        })
    };
    let on_close = {
        let overlay = overlay.clone();
        Callback::from(move |_| overlay.set(None))
    };
    let on_onboarding = {
        let gate = gate.clone();
        Callback::from(move |a: OnboardingAction| gate.dispatch(GateAction::Onboarding(a)))
    };

    let ctx = AppContext {
        client: (*client).clone(),
        balance: (*balance).clone(),
        identity,
    };
    let is_open = |o: Overlay| *overlay == Some(o);

    let content = match &gate.phase {
        GatePhase::Unresolved | GatePhase::Checking { .. } => {
            html! { <LoadingScreen message="Connecting to the wave..." /> }
        }
        GatePhase::ReloadScheduled => {
            html! { <LoadingScreen message="Busy right now, retrying in a moment..." /> }
        }
        GatePhase::OnboardingRequired(flow) => html! {
            <OnboardingModal flow={flow.clone()} on_action={on_onboarding} />
        },
        GatePhase::Ready { .. } => html! {<>
            <BalanceDisplay />
            <NavBar active={*overlay} on_toggle={on_toggle} />
            <MissionCenter show={is_open(Overlay::Missions)} on_close={on_close.clone()} />
            <Leaderboard show={is_open(Overlay::Leaderboard)} on_close={on_close.clone()} />
            <Marketplace show={is_open(Overlay::Marketplace)} on_close={on_close.clone()} />
            <Profile show={is_open(Overlay::Profile)} on_close={on_close} />
        </>},
    };

    html! { <ContextProvider<AppContext> context={ctx}>
        <div style="position:fixed; inset:0; overflow:hidden; background:#000; color:#a5f3fc; font-family:system-ui, sans-serif;">
            <GlobeView />
            { content }
        </div>
    </ContextProvider<AppContext>> }
}
