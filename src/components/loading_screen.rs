use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct LoadingScreenProps {
    pub message: AttrValue,
}

#[function_component]
pub fn LoadingScreen(props: &LoadingScreenProps) -> Html {
    html! {<div style="position:fixed; inset:0; z-index:60; display:flex; flex-direction:column; align-items:center; justify-content:center; gap:18px; background:#000;">
        <div style="position:absolute; width:320px; height:320px; border-radius:50%; background:rgba(34,211,238,0.2); filter:blur(60px);"></div>
        <div style="position:relative; font-size:28px; font-weight:700; letter-spacing:0.2em; color:#22d3ee;">{"BLUEWAVE"}</div>
        <div style="position:relative; font-size:13px; color:#67e8f9; opacity:0.8;">{ props.message.clone() }</div>
    </div>}
}
