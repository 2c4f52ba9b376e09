use yew::prelude::*;

pub const PANEL_STYLE: &str = "position:fixed; z-index:50; left:50%; top:50%; transform:translate(-50%,-50%); width:90%; max-width:380px; max-height:80vh; overflow-y:auto; background:rgba(0,0,0,0.6); backdrop-filter:blur(8px); border:1px solid #164e63; border-radius:16px; padding:20px; color:#a5f3fc; box-shadow:0 0 25px rgba(0,230,255,0.19); display:flex; flex-direction:column; gap:12px;";
pub const BUTTON_STYLE: &str = "padding:4px 12px; font-size:12px; background:rgba(6,182,212,0.2); border:1px solid #22d3ee; color:#67e8f9; border-radius:6px; cursor:pointer;";
pub const BUTTON_DISABLED_STYLE: &str = "padding:4px 12px; font-size:12px; background:#374151; border:1px solid #4b5563; color:#9ca3af; border-radius:6px;";

#[derive(Properties, PartialEq, Clone)]
pub struct ModalFrameProps {
    pub title: AttrValue,
    /// `None` hides both the close button and backdrop dismissal.
    #[prop_or_default]
    pub on_close: Option<Callback<()>>,
    #[prop_or_default]
    pub children: Children,
}

#[function_component]
pub fn ModalFrame(props: &ModalFrameProps) -> Html {
    let close_cb = props.on_close.clone().map(|cb| Callback::from(move |_: MouseEvent| cb.emit(())));
    html! {<>
        <div onclick={close_cb.clone()} style="position:fixed; inset:0; background:rgba(0,0,0,0.5); z-index:40;"></div>
        <div style={PANEL_STYLE}>
            <div style="display:flex; justify-content:center; position:relative;">
                <h2 style="margin:0; color:#22d3ee; font-size:18px; font-weight:600; letter-spacing:0.05em;">{ props.title.clone() }</h2>
                { if let Some(cb) = close_cb { html!{
                    <button onclick={cb} style="position:absolute; right:0; top:0; background:none; border:none; color:#67e8f9; font-size:18px; cursor:pointer;">{"✕"}</button>
                } } else { html!{} } }
            </div>
            { for props.children.iter() }
        </div>
    </>}
}
