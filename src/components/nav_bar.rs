use yew::prelude::*;

use super::app::Overlay;

#[derive(Properties, PartialEq, Clone)]
pub struct NavBarProps {
    pub active: Option<Overlay>,
    pub on_toggle: Callback<Overlay>,
}

const ITEMS: [(Overlay, &str, &str); 4] = [
    (Overlay::Missions, "🎯", "Missions"),
    (Overlay::Leaderboard, "🏆", "Leaders"),
    (Overlay::Marketplace, "🛒", "Market"),
    (Overlay::Profile, "👤", "Profile"),
];

#[function_component]
pub fn NavBar(props: &NavBarProps) -> Html {
    html! {<div style="position:fixed; bottom:16px; left:50%; transform:translateX(-50%); z-index:30; display:flex; gap:8px; background:rgba(0,0,0,0.55); border:1px solid #164e63; border-radius:16px; padding:8px 10px;">
        { for ITEMS.iter().map(|(overlay, icon, label)| {
            let overlay = *overlay;
            let cb = props.on_toggle.clone();
            let onclick = Callback::from(move |_| cb.emit(overlay));
            let border = if props.active == Some(overlay) { "#22d3ee" } else { "transparent" };
            html! {
                <button {onclick} style={format!("display:flex; flex-direction:column; align-items:center; gap:2px; min-width:64px; padding:6px 4px; background:none; border:1px solid {}; border-radius:10px; color:#67e8f9; font-size:11px; cursor:pointer;", border)}>
                    <span style="font-size:18px;">{ *icon }</span>
                    <span>{ *label }</span>
                </button>
            }
        }) }
    </div>}
}
