use yew::prelude::*;

use super::modal_frame::ModalFrame;

#[derive(Properties, PartialEq, Clone)]
pub struct MarketplaceProps {
    pub show: bool,
    pub on_close: Callback<()>,
}

#[function_component]
pub fn Marketplace(props: &MarketplaceProps) -> Html {
    if !props.show {
        return html! {};
    }
    html! {<ModalFrame title="MARKETPLACE" on_close={props.on_close.clone()}>
        <div style="display:flex; flex-direction:column; align-items:center; text-align:center; gap:10px;">
            <p style="margin:0; font-size:14px; color:rgba(103,232,249,0.8);">{"Exchange your presence for value"}</p>
            <p style="margin:0; font-size:16px; font-weight:600; color:#22d3ee;">{"Coming Soon"}</p>
        </div>
    </ModalFrame>}
}
