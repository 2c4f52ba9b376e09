use yew::prelude::*;

use super::app::AppContext;
use super::modal_frame::ModalFrame;
use crate::api::endpoints::{level_progress_path, LEADERBOARD_PATH};
use crate::api::{ApiClient, ApiError};
use crate::model::{LeaderboardEntry, LevelProgress, TelegramId};
use crate::state::leaderboard::{build, LeaderRow};
use crate::util::{format_points, AliveFlag};

#[derive(Properties, PartialEq, Clone)]
pub struct LeaderboardProps {
    pub show: bool,
    pub on_close: Callback<()>,
}

#[function_component]
pub fn Leaderboard(props: &LeaderboardProps) -> Html {
    let ctx = use_context::<AppContext>();
    let Some(ctx) = ctx else {
        return html! {};
    };
    if !props.show {
        return html! {};
    }
    html! { <LeaderboardPanel client={ctx.client.clone()} me={ctx.tg_id()} on_close={props.on_close.clone()} /> }
}

#[derive(Properties, PartialEq, Clone)]
struct LeaderboardPanelProps {
    client: ApiClient,
    me: Option<TelegramId>,
    on_close: Callback<()>,
}

fn row_html(row: &LeaderRow) -> Html {
    let bg = if row.is_me { "rgba(6,182,212,0.15)" } else { "rgba(0,0,0,0.3)" };
    html! {<div style={format!("display:flex; align-items:center; gap:8px; padding:6px 10px; border:1px solid #164e63; border-radius:10px; background:{}; font-size:13px;", bg)}>
        <span style="width:28px; color:#06b6d4; font-variant-numeric:tabular-nums;">{ format!("#{}", row.rank) }</span>
        <span>{ row.entry.country_flag.clone() }</span>
        <span style="flex:1; overflow:hidden; text-overflow:ellipsis; white-space:nowrap;">
            { row.entry.name.clone() }
            { if row.is_me { html!{ <span style="margin-left:6px; font-size:10px; padding:1px 5px; border-radius:4px; background:#0891b2; color:#ecfeff;">{"YOU"}</span> } } else { html!{} } }
        </span>
        <span style="font-variant-numeric:tabular-nums; color:#67e8f9;">{ format_points(row.entry.balance) }</span>
    </div>}
}

#[function_component]
fn LeaderboardPanel(props: &LeaderboardPanelProps) -> Html {
    let entries = use_state(|| None::<Result<Vec<LeaderboardEntry>, ApiError>>);
    let progress = use_state(|| None::<LevelProgress>);

    {
        let entries = entries.clone();
        let progress = progress.clone();
        let client = props.client.clone();
        use_effect_with(props.me, move |me| {
            let alive = AliveFlag::new();
            {
                let alive = alive.clone();
                client.cached_get(
                    LEADERBOARD_PATH,
                    Callback::from(move |r: Result<Vec<LeaderboardEntry>, ApiError>| {
                        if alive.is_alive() {
                            entries.set(Some(r));
                        }
                    }),
                );
            }
            if let Some(me) = *me {
                let alive = alive.clone();
                client.cached_get(
                    &level_progress_path(me),
                    Callback::from(move |r: Result<LevelProgress, ApiError>| match r {
                        Ok(p) if alive.is_alive() => progress.set(Some(p)),
                        Ok(_) => {}
                        Err(e) => log::warn!("[API] level progress unavailable: {}", e),
                    }),
                );
            }
            move || alive.kill()
        });
    }

    let body = match &*entries {
        None => html! { <p style="margin:0; text-align:center; color:#22d3ee;">{"Loading..."}</p> },
        Some(Err(_)) => html! { <p style="margin:0; text-align:center; color:#f87171;">{"Could not load leaderboard"}</p> },
        Some(Ok(list)) => {
            let view = build(list, (*progress).as_ref(), props.me);
            html! {<>
                { if let Some(level) = &view.level { html!{
                    <div style="display:flex; flex-direction:column; gap:6px; padding:10px; border:1px solid #164e63; border-radius:12px;">
                        <div style="font-size:13px; color:#22d3ee; font-weight:600;">{ level.current.clone() }</div>
                        <div style="height:6px; border-radius:3px; background:#083344; overflow:hidden;">
                            <div style={format!("height:100%; width:{}%; background:#22d3ee;", level.percent)}></div>
                        </div>
                        <div style="font-size:11px; opacity:0.8;">{ level.caption() }</div>
                    </div>
                } } else { html!{} } }
                <div style="display:flex; flex-direction:column; gap:6px;">
                    { for view.rows.iter().map(row_html) }
                </div>
                { if list.is_empty() { html!{ <p style="margin:0; text-align:center; opacity:0.7;">{"No one on the board yet."}</p> } } else { html!{} } }
                { if let Some(me) = &view.pinned_me { html!{
                    <div style="border-top:1px solid rgba(22,78,99,0.5); padding-top:8px;">{ row_html(me) }</div>
                } } else { html!{} } }
            </>}
        }
    };

    html! {<ModalFrame title="LEADERBOARD" on_close={props.on_close.clone()}>
        { body }
    </ModalFrame>}
}
