use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::app::AppContext;
use super::mission_row::MissionRow;
use super::modal_frame::ModalFrame;
use crate::api::{ApiClient, ApiError};
use crate::host;
use crate::model::{MissionKind, TelegramId};
use crate::state::mission::{plan_claim, plan_start, ClaimGuard, StartBehavior, StartGuard};
use crate::state::{MissionAction, MissionBoard};
use crate::store::{BalanceSource, BalanceStore, BalanceUpdate};
use crate::util::{delay_until, now_ms, AliveFlag, Timer};

const LISTED_KINDS: [MissionKind; 3] = [MissionKind::Link, MissionKind::Onboarding, MissionKind::Daily];

#[derive(Properties, PartialEq, Clone)]
pub struct MissionCenterProps {
    pub show: bool,
    pub on_close: Callback<()>,
}

#[function_component]
pub fn MissionCenter(props: &MissionCenterProps) -> Html {
    let ctx = use_context::<AppContext>();
    let Some((ctx, tg_id)) = ctx.and_then(|c| c.tg_id().map(|id| (c, id))) else {
        return html! {};
    };
    if !props.show {
        return html! {};
    }
    html! { <MissionPanel
        client={ctx.client}
        balance={ctx.balance}
        tg_id={tg_id}
        on_close={props.on_close.clone()}
    /> }
}

#[derive(Properties, PartialEq, Clone)]
struct MissionPanelProps {
    client: ApiClient,
    balance: BalanceStore,
    tg_id: TelegramId,
    on_close: Callback<()>,
}

fn is_telegram_url(url: &str) -> bool {
    url.starts_with("https://t.me/") || url.starts_with("tg://")
}

#[function_component]
fn MissionPanel(props: &MissionPanelProps) -> Html {
    let board = use_reducer(MissionBoard::default);
    let guard = use_mut_ref(ClaimGuard::default);
    let starts = use_mut_ref(StartGuard::default);
    let alive = use_mut_ref(AliveFlag::new);

    // Fetch listings on mount; one-second ticks drive the countdown text
    {
        let board = board.clone();
        let client = props.client.clone();
        let alive = alive.clone();
        use_effect_with(props.tg_id, move |tg_id| {
            let tg_id = *tg_id;
            let flag = AliveFlag::new();
            *alive.borrow_mut() = flag.clone();
            board.dispatch(MissionAction::Reset { listings: LISTED_KINDS.len() });
            for kind in LISTED_KINDS {
                let board = board.clone();
                let client = client.clone();
                let flag = flag.clone();
                spawn_local(async move {
                    let result = client.missions(kind, tg_id).await;
                    if !flag.is_alive() {
                        return;
                    }
                    match result {
                        Ok(missions) => board.dispatch(MissionAction::Loaded {
                            kind,
                            missions,
                            now: now_ms(),
                        }),
                        Err(error) => {
                            log::error!("[MISSION] {:?} listing failed: {}", kind, error);
                            board.dispatch(MissionAction::LoadFailed { error });
                        }
                    }
                });
            }
            let tick = {
                let board = board.clone();
                Timer::interval(1_000, move || board.dispatch(MissionAction::Tick { now: now_ms() }))
            };
            move || {
                flag.kill();
                drop(tick);
            }
        });
    }

    // Precise unlock: fire exactly when the earliest countdown elapses
    {
        let board_tick = board.clone();
        let next_unlock = board.next_unlock_ms().map(|at| at as i64);
        use_effect_with(next_unlock, move |next_unlock| {
            let timer = next_unlock.and_then(|at| {
                Timer::timeout(delay_until(at as f64, now_ms()), move || {
                    board_tick.dispatch(MissionAction::Tick { now: now_ms() })
                })
            });
            move || drop(timer)
        });
    }

    let on_start = {
        let board = board.clone();
        let client = props.client.clone();
        let alive = alive.clone();
        let starts = starts.clone();
        let tg_id = props.tg_id;
        Callback::from(move |id: String| {
            let Some(plan) = plan_start(&board, &mut starts.borrow_mut(), &id) else {
                log::debug!("[MISSION] start click on {} dropped", id);
                return;
            };
            let flag = alive.borrow().clone();
            match plan.behavior {
                StartBehavior::OpenLink => {
                    if is_telegram_url(&plan.link_url) {
                        host::open_telegram_link(&plan.link_url);
                    } else {
                        host::open_link(&plan.link_url);
                    }
                    board.dispatch(MissionAction::Started {
                        id: id.clone(),
                        now: now_ms(),
                        backend_unlock: None,
                    });
                    starts.borrow_mut().finish(&id);
                }
                StartBehavior::NotifyBackend => {
                    if !plan.link_url.is_empty() {
                        host::open_link(&plan.link_url);
                    }
                    let board = board.clone();
                    let client = client.clone();
                    let starts = starts.clone();
                    spawn_local(async move {
                        let result = client.mission_opened(tg_id, &id).await;
                        starts.borrow_mut().finish(&id);
                        if !flag.is_alive() {
                            return;
                        }
                        let now = now_ms();
                        board.dispatch(match result {
                            Ok(resp) => MissionAction::Started {
                                id,
                                now,
                                backend_unlock: resp.unlock_at,
                            },
                            Err(error) => MissionAction::StartFailed { id, now, error },
                        });
                    });
                }
                StartBehavior::ShareStory => {
                    let board = board.clone();
                    let client = client.clone();
                    let starts = starts.clone();
                    spawn_local(async move {
                        let result = client.story_media(tg_id, &id).await;
                        starts.borrow_mut().finish(&id);
                        if !flag.is_alive() {
                            return;
                        }
                        let now = now_ms();
                        let action = match result {
                            Ok(media) if host::share_to_story(&media.media_url, media.text.as_deref()) => {
                                MissionAction::Started {
                                    id,
                                    now,
                                    backend_unlock: None,
                                }
                            }
                            Ok(_) => MissionAction::StartFailed {
                                id,
                                now,
                                error: ApiError::Validation("story sharing unavailable".into()),
                            },
                            Err(error) => MissionAction::StartFailed { id, now, error },
                        };
                        board.dispatch(action);
                    });
                }
                StartBehavior::None => {}
            }
        })
    };

    let on_claim = {
        let board = board.clone();
        let client = props.client.clone();
        let balance = props.balance.clone();
        let alive = alive.clone();
        let guard = guard.clone();
        let tg_id = props.tg_id;
        Callback::from(move |id: String| {
            let ticket = plan_claim(&board, &mut guard.borrow_mut(), &id, now_ms());
            let Some(ticket) = ticket else {
                log::debug!("[MISSION] claim click on {} dropped", id);
                return;
            };
            board.dispatch(MissionAction::ClaimSubmitted { id: id.clone() });
            let flag = alive.borrow().clone();
            let board = board.clone();
            let client = client.clone();
            let balance = balance.clone();
            spawn_local(async move {
                let outcome = client
                    .claim_mission(ticket.claim_path, tg_id, &ticket.mission_id)
                    .await;
                if matches!(&outcome, Ok(resp) if resp.claimed) {
                    log::info!("[MISSION] {} claimed", ticket.mission_id);
                    client.invalidate("/user/");
                    client.invalidate("/balance/");
                }
                if let Some(update) = BalanceUpdate::from_claim(&outcome, BalanceSource::MissionClaim) {
                    balance.apply(update);
                }
                if flag.is_alive() {
                    board.dispatch(MissionAction::ClaimResolved {
                        id,
                        now: now_ms(),
                        outcome,
                    });
                }
            });
        })
    };

    let on_dismiss = {
        let board = board.clone();
        Callback::from(move |id: String| board.dispatch(MissionAction::DismissNotice { id }))
    };

    let now = now_ms();
    html! {<ModalFrame title="MISSION CENTER" on_close={props.on_close.clone()}>
        { if board.loading && board.items.is_empty() { html!{ <p style="margin:0; text-align:center; color:#67e8f9;">{"Loading..."}</p> } } else { html!{} } }
        { if let Some(err) = &board.error { html!{ <p style="margin:0; text-align:center; color:#f87171;">{ err.clone() }</p> } } else { html!{} } }
        { if !board.loading && board.error.is_none() && board.items.is_empty() { html!{ <p style="margin:0; text-align:center; opacity:0.7;">{"No missions right now. Check back soon."}</p> } } else { html!{} } }
        <div style="display:flex; flex-direction:column; gap:10px;">
            { for board.items.iter().map(|item| html! {
                <MissionRow
                    key={item.id.clone()}
                    item={item.clone()}
                    now_ms={now}
                    notice={board.notice_for(&item.id).map(|t| AttrValue::from(t.to_string()))}
                    on_start={on_start.clone()}
                    on_claim={on_claim.clone()}
                    on_dismiss={on_dismiss.clone()}
                />
            }) }
        </div>
    </ModalFrame>}
}
