use yew::prelude::*;

use super::modal_frame::{BUTTON_DISABLED_STYLE, BUTTON_STYLE};
use crate::model::MissionStatus;
use crate::state::mission::MissionItem;
use crate::util::{format_countdown, format_points};

#[derive(Properties, PartialEq, Clone)]
pub struct MissionRowProps {
    pub item: MissionItem,
    pub now_ms: f64,
    pub notice: Option<AttrValue>,
    pub on_start: Callback<String>,
    pub on_claim: Callback<String>,
    pub on_dismiss: Callback<String>,
}

#[function_component]
pub fn MissionRow(props: &MissionRowProps) -> Html {
    let item = &props.item;
    let done = item.status == MissionStatus::Done;
    let label = match item.status {
        MissionStatus::Waiting => {
            let left = item.remaining_ms(props.now_ms);
            if left > 0.0 {
                format!("Wait {}", format_countdown(left))
            } else {
                item.status.button_label().to_string()
            }
        }
        s => s.button_label().to_string(),
    };
    let action = match item.status {
        MissionStatus::Open => Some(props.on_start.clone()),
        MissionStatus::Claim => Some(props.on_claim.clone()),
        _ => None,
    };
    let button = match action {
        Some(cb) => {
            let id = item.id.clone();
            let onclick = Callback::from(move |_| cb.emit(id.clone()));
            let glow = if item.status == MissionStatus::Claim { " box-shadow:0 0 10px rgba(0,230,255,0.5);" } else { "" };
            html! { <button {onclick} style={format!("{}{}", BUTTON_STYLE, glow)}>{ label }</button> }
        }
        None => html! { <button disabled=true style={BUTTON_DISABLED_STYLE}>{ label }</button> },
    };
    let dismiss = {
        let cb = props.on_dismiss.clone();
        let id = item.id.clone();
        Callback::from(move |_| cb.emit(id.clone()))
    };
    let border = if done { "#374151" } else { "#164e63" };
    let opacity = if done { "0.5" } else { "1" };

    html! {<div style={format!("display:flex; flex-direction:column; gap:4px; padding:8px 12px; border:1px solid {}; border-radius:12px; background:rgba(0,0,0,0.3); opacity:{};", border, opacity)}>
        <div style="display:flex; justify-content:space-between; align-items:center; gap:8px;">
            <div>
                <p style="margin:0; font-size:14px; font-weight:600;">{ item.name.clone() }</p>
                <p style="margin:0; font-size:12px; color:#06b6d4;">{ format!("{} $BWAVE", format_points(item.points)) }</p>
            </div>
            { button }
        </div>
        { if let Some(text) = &props.notice { html!{
            <div onclick={dismiss} style="font-size:11px; color:#fcd34d; background:rgba(120,53,15,0.3); border:1px solid #92400e; border-radius:6px; padding:4px 6px;">{ text.clone() }</div>
        } } else { html!{} } }
    </div>}
}
