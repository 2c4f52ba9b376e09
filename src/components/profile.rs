use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use super::app::AppContext;
use super::modal_frame::{ModalFrame, BUTTON_DISABLED_STYLE, BUTTON_STYLE};
use crate::api::endpoints::user_path;
use crate::api::{ApiClient, ApiError};
use crate::countries;
use crate::host;
use crate::model::{TelegramId, UserSnapshot};
use crate::persist::{self, BrowserStore};
use crate::state::mission::RejectReason;
use crate::state::notify::{notify_message, NotifyCooldown};
use crate::store::{BalanceSource, BalanceStore, BalanceUpdate};
use crate::util::{format_countdown, format_join_date, format_points, now_ms, AliveFlag, Timer};

const AVATAR_PLACEHOLDER: &str = "https://via.placeholder.com/80";

#[derive(Properties, PartialEq, Clone)]
pub struct ProfileProps {
    pub show: bool,
    pub on_close: Callback<()>,
}

#[function_component]
pub fn Profile(props: &ProfileProps) -> Html {
    let ctx = use_context::<AppContext>();
    let Some((ctx, tg_id)) = ctx.and_then(|c| c.tg_id().map(|id| (c, id))) else {
        return html! {};
    };
    if !props.show {
        return html! {};
    }
    html! { <ProfilePanel
        client={ctx.client}
        balance={ctx.balance}
        tg_id={tg_id}
        on_close={props.on_close.clone()}
    /> }
}

#[derive(Properties, PartialEq, Clone)]
struct ProfilePanelProps {
    client: ApiClient,
    balance: BalanceStore,
    tg_id: TelegramId,
    on_close: Callback<()>,
}

fn country_label(code: Option<&str>) -> String {
    match code {
        Some(code) => {
            let name = countries::name_of(code).unwrap_or(code);
            format!("{} {}", countries::flag_emoji(code), name)
        }
        None => "-".to_string(),
    }
}

fn stat(label: &str, value: String) -> Html {
    html! {<p style="margin:0;">{ format!("{}: ", label) }<span style="color:#67e8f9;">{ value }</span></p>}
}

#[function_component]
fn ProfilePanel(props: &ProfilePanelProps) -> Html {
    let user = use_state(|| None::<Result<UserSnapshot, ApiError>>);
    let cooldown = use_state(|| NotifyCooldown::from_local(persist::load_notify_next(&BrowserStore::LOCAL)));
    let now = use_state(now_ms);
    let busy = use_state(|| false);
    let message = use_state(|| None::<String>);
    let alive = use_mut_ref(AliveFlag::new);

    // Load snapshot and notify usage; a one-second clock drives the countdown
    {
        let user = user.clone();
        let cooldown = cooldown.clone();
        let now = now.clone();
        let client = props.client.clone();
        let alive = alive.clone();
        use_effect_with(props.tg_id, move |tg_id| {
            let tg_id = *tg_id;
            let flag = AliveFlag::new();
            *alive.borrow_mut() = flag.clone();
            {
                let flag = flag.clone();
                client.cached_get(
                    &user_path(tg_id),
                    Callback::from(move |r: Result<UserSnapshot, ApiError>| {
                        if flag.is_alive() {
                            user.set(Some(r));
                        }
                    }),
                );
            }
            {
                let flag = flag.clone();
                spawn_local(async move {
                    match client.notify_status(tg_id).await {
                        Ok(status) if flag.is_alive() => {
                            let mut next = *cooldown;
                            next.reconcile(&status);
                            cooldown.set(next);
                        }
                        Ok(_) => {}
                        Err(e) => log::debug!("[PROFILE] notify status unavailable: {}", e),
                    }
                });
            }
            let clock = Timer::interval(1_000, move || now.set(now_ms()));
            move || {
                flag.kill();
                drop(clock);
            }
        });
    }

    let on_claim_referral = {
        let client = props.client.clone();
        let balance = props.balance.clone();
        let user = user.clone();
        let busy = busy.clone();
        let message = message.clone();
        let alive = alive.clone();
        let tg_id = props.tg_id;
        Callback::from(move |_| {
            if *busy {
                return;
            }
            busy.set(true);
            let flag = alive.borrow().clone();
            let client = client.clone();
            let balance = balance.clone();
            let user = user.clone();
            let busy = busy.clone();
            let message = message.clone();
            spawn_local(async move {
                let result = client.claim_referral(tg_id).await;
                if matches!(&result, Ok(resp) if resp.claimed) {
                    client.invalidate("/user/");
                    client.invalidate("/balance/");
                }
                if let Some(update) = BalanceUpdate::from_claim(&result, BalanceSource::ReferralClaim) {
                    balance.apply(update);
                }
                if !flag.is_alive() {
                    return;
                }
                busy.set(false);
                match result {
                    Ok(resp) if resp.claimed => {
                        if let Some(Ok(snapshot)) = &*user {
                            let mut snapshot = snapshot.clone();
                            snapshot.referral_earnings_pending = 0;
                            if let Some(b) = resp.new_balance {
                                snapshot.balance = b;
                            }
                            user.set(Some(Ok(snapshot)));
                        }
                        message.set(Some("Referral earnings claimed 🎉".into()));
                    }
                    Ok(resp) => {
                        let reason = RejectReason::parse(resp.reason.as_deref());
                        log::warn!("[PROFILE] referral claim rejected: {:?}", reason);
                        message.set(Some(reason.message().into()));
                    }
                    Err(e) => message.set(Some(e.user_message().into())),
                }
            });
        })
    };

    let on_notify = {
        let client = props.client.clone();
        let cooldown = cooldown.clone();
        let busy = busy.clone();
        let message = message.clone();
        let alive = alive.clone();
        let tg_id = props.tg_id;
        Callback::from(move |_| {
            if *busy || !cooldown.can_notify(now_ms()) {
                return;
            }
            busy.set(true);
            let flag = alive.borrow().clone();
            let client = client.clone();
            let cooldown = cooldown.clone();
            let busy = busy.clone();
            let message = message.clone();
            spawn_local(async move {
                let result = client.notify_inactive(tg_id).await;
                let text = match &result {
                    Ok(resp) => {
                        let mut next = *cooldown;
                        match next.record(resp, now_ms()) {
                            Some(at) => {
                                persist::save_notify_next(&BrowserStore::LOCAL, at);
                                log::info!("[PROFILE] notify sent={} next at {}", resp.sent, at);
                                if flag.is_alive() {
                                    cooldown.set(next);
                                }
                            }
                            None => log::warn!("[PROFILE] notify not sent: {:?}", resp.reason),
                        }
                        notify_message(resp)
                    }
                    Err(e) => e.user_message().to_string(),
                };
                if flag.is_alive() {
                    busy.set(false);
                    message.set(Some(text));
                }
            });
        })
    };

    let body = match &*user {
        None => html! { <p style="margin:0; text-align:center; color:#22d3ee;">{"Loading..."}</p> },
        Some(Err(_)) => html! { <p style="margin:0; text-align:center; color:#f87171;">{"Could not load profile"}</p> },
        Some(Ok(u)) => {
            let pending = u.referral_earnings_pending;
            let claim_button = if pending == 0 || *busy {
                html! { <button disabled=true style={BUTTON_DISABLED_STYLE}>{ if pending == 0 { "Claimed" } else { "Claim" } }</button> }
            } else {
                html! { <button onclick={on_claim_referral} style={BUTTON_STYLE}>{"Claim"}</button> }
            };
            let remaining = cooldown.remaining_ms(*now);
            let notify_button = if cooldown.can_notify(*now) && !*busy {
                html! { <button onclick={on_notify} style={format!("{} width:100%;", BUTTON_STYLE)}>{"Notify Them"}</button> }
            } else if remaining > 0.0 {
                html! { <button disabled=true style={format!("{} width:100%;", BUTTON_DISABLED_STYLE)}>{ format!("Notify again in {}", format_countdown(remaining)) }</button> }
            } else {
                html! { <button disabled=true style={format!("{} width:100%;", BUTTON_DISABLED_STYLE)}>{"Notify Them"}</button> }
            };
            let copy_link = {
                let link = u.referral_link.clone();
                let message = message.clone();
                Callback::from(move |_| {
                    let text = if host::copy_to_clipboard(&link) { "Referral link copied!" } else { "Copy failed. Long-press the link to copy." };
                    message.set(Some(text.to_string()));
                })
            };
            let share_link = {
                let link = u.referral_link.clone();
                Callback::from(move |_| {
                    let encoded = js_sys::encode_uri_component(&link);
                    host::open_telegram_link(&format!("https://t.me/share/url?url={}", String::from(encoded)));
                })
            };
            html! {<div style="display:flex; flex-direction:column; gap:12px; font-size:13px;">
                <div style="display:flex; flex-direction:column; align-items:center; gap:6px;">
                    <img src={u.photo_url.clone().unwrap_or_else(|| AVATAR_PLACEHOLDER.to_string())} alt="avatar" style="width:80px; height:80px; border-radius:50%; border:1px solid rgba(34,211,238,0.4);" />
                    <div style="font-weight:600;">{ format!("@{}", u.username) }</div>
                    { if u.streak > 0 { html!{ <div style="font-size:12px; color:#fb923c;">{ format!("🔥 {} Day Streak", u.streak) }</div> } } else { html!{} } }
                </div>
                <div style="display:grid; grid-template-columns:1fr 1fr; gap:6px; font-size:12px;">
                    { stat("Balance", format!("{} $BWAVE", format_points(u.balance))) }
                    { stat("Total Referrals", u.total_referrals.to_string()) }
                    { stat("Inactive Referrals", u.inactive_referrals_cache.to_string()) }
                    { stat("Country", country_label(u.country_code.as_deref())) }
                </div>
                <div style="border-top:1px solid rgba(22,78,99,0.5); padding-top:8px; display:flex; justify-content:space-between; align-items:center;">
                    { stat("Referral Earnings", format!("{} $BWAVE", format_points(pending))) }
                    { claim_button }
                </div>
                { notify_button }
                { if !u.referral_link.is_empty() { html!{
                    <div style="border-top:1px solid rgba(22,78,99,0.5); padding-top:8px; display:flex; flex-direction:column; align-items:center; gap:4px;">
                        <p style="margin:0; font-size:12px; color:#22d3ee;">{"Referral Link:"}</p>
                        <span style="font-size:11px; color:#67e8f9; max-width:220px; overflow:hidden; text-overflow:ellipsis; white-space:nowrap;">{ u.referral_link.clone() }</span>
                        <div style="display:flex; gap:6px;">
                            <button onclick={copy_link} style={BUTTON_STYLE}>{"Copy"}</button>
                            <button onclick={share_link} style={BUTTON_STYLE}>{"Share"}</button>
                        </div>
                    </div>
                } } else { html!{} } }
                { if let Some(joined) = &u.joined_at { html!{
                    <div style="text-align:center; font-size:12px; color:#06b6d4;">{ format!("Joined: {}", format_join_date(joined)) }</div>
                } } else { html!{} } }
            </div>}
        }
    };

    html! {<ModalFrame title="PROFILE" on_close={props.on_close.clone()}>
        { body }
        { if let Some(text) = &*message { html!{
            <div style="font-size:12px; text-align:center; color:#fcd34d;">{ text.clone() }</div>
        } } else { html!{} } }
    </ModalFrame>}
}
