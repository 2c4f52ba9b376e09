use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use super::app::AppContext;
use super::modal_frame::ModalFrame;
use crate::countries;
use crate::state::onboarding::{OnboardingAction, OnboardingFlow, OnboardingStep, SubmitRequest};

const INPUT_STYLE: &str = "width:100%; box-sizing:border-box; padding:8px 10px; background:rgba(0,0,0,0.6); border:1px solid #155e75; border-radius:8px; color:#ecfeff; font-size:14px;";
const SUBMIT_STYLE: &str = "width:100%; padding:8px; background:rgba(6,182,212,0.2); border:1px solid #22d3ee; border-radius:8px; color:#ecfeff; font-size:14px; cursor:pointer;";

#[derive(Properties, PartialEq, Clone)]
pub struct OnboardingModalProps {
    pub flow: OnboardingFlow,
    pub on_action: Callback<OnboardingAction>,
}

fn input_cb(on_action: &Callback<OnboardingAction>, wrap: fn(String) -> OnboardingAction) -> Callback<InputEvent> {
    let cb = on_action.clone();
    Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        cb.emit(wrap(input.value()));
    })
}

#[function_component]
pub fn OnboardingModal(props: &OnboardingModalProps) -> Html {
    let client = use_context::<AppContext>().map(|c| c.client);
    let flow = &props.flow;

    let on_submit = {
        let flow = flow.clone();
        let on_action = props.on_action.clone();
        Callback::from(move |_: MouseEvent| {
            if flow.busy {
                return;
            }
            let request = match flow.submission() {
                Ok(r) => r,
                Err(msg) => {
                    on_action.emit(OnboardingAction::Invalid(msg.to_string()));
                    return;
                }
            };
            let Some(client) = client.clone() else {
                return;
            };
            on_action.emit(OnboardingAction::Submitted);
            let on_action = on_action.clone();
            spawn_local(async move {
                let action = match request {
                    SubmitRequest::RequestCode { username } => {
                        OnboardingAction::CodeRequested(client.request_code(&username).await)
                    }
                    SubmitRequest::VerifyCode { username, code } => {
                        OnboardingAction::CodeVerified(client.verify_code(&username, &code).await)
                    }
                    SubmitRequest::SaveProfile { tg_id, country_code } => {
                        OnboardingAction::ProfileSaved(client.update_profile(tg_id, &country_code).await)
                    }
                };
                on_action.emit(action);
            });
        })
    };

    let (label, busy_label) = match flow.step {
        OnboardingStep::RequestCode => ("Request Code", "Requesting..."),
        OnboardingStep::SubmitCode => ("Verify Code", "Verifying..."),
        OnboardingStep::SubmitProfile => ("Activate Presence", "Activating..."),
    };

    let step_body = match flow.step {
        OnboardingStep::RequestCode => html! {<>
            <label style="display:flex; flex-direction:column; gap:4px; font-size:12px;">
                {"Telegram username"}
                <input value={flow.username.clone()} oninput={input_cb(&props.on_action, OnboardingAction::SetUsername)} placeholder="@yourusername" style={INPUT_STYLE} />
            </label>
        </>},
        OnboardingStep::SubmitCode => html! {<>
            <p style="margin:0; font-size:12px; opacity:0.85;">
                {"A 6-digit code was sent to your Telegram account "}
                <span style="color:#67e8f9;">{ flow.username.trim().to_string() }</span>{"."}
            </p>
            <label style="display:flex; flex-direction:column; gap:4px; font-size:12px;">
                {"Verification code"}
                <input value={flow.code.clone()} oninput={input_cb(&props.on_action, OnboardingAction::SetCode)} placeholder="123456" maxlength="6" style={format!("{} text-align:center; letter-spacing:0.3em;", INPUT_STYLE)} />
            </label>
        </>},
        OnboardingStep::SubmitProfile => html! {<>
            <p style="margin:0; font-size:12px; opacity:0.85;">{"Last step: choose where your presence is mapped from."}</p>
            <label style="display:flex; flex-direction:column; gap:4px; font-size:12px;">
                {"Country"}
                <input value={flow.search.clone()} oninput={input_cb(&props.on_action, OnboardingAction::SetSearch)} placeholder="Search country..." style={INPUT_STYLE} />
            </label>
            <div style="max-height:180px; overflow-y:auto; display:flex; flex-direction:column; gap:2px; border:1px solid #164e63; border-radius:8px; padding:4px;">
                { for countries::search(&flow.search).map(|(code, name)| {
                    let selected = flow.country.as_deref() == Some(*code);
                    let cb = props.on_action.clone();
                    let code_owned = code.to_string();
                    let onclick = Callback::from(move |_| cb.emit(OnboardingAction::SelectCountry(code_owned.clone())));
                    let bg = if selected { "rgba(6,182,212,0.3)" } else { "transparent" };
                    html! {
                        <button key={code.to_string()} {onclick} style={format!("display:flex; gap:8px; align-items:center; text-align:left; padding:4px 8px; background:{}; border:none; border-radius:6px; color:#ecfeff; font-size:13px; cursor:pointer;", bg)}>
                            <span>{ countries::flag_emoji(code) }</span>
                            <span>{ *name }</span>
                        </button>
                    }
                }) }
            </div>
        </>},
    };

    html! {<ModalFrame title="Bluewave Onboarding">
        <h3 style="margin:0; text-align:center; font-size:16px; color:#ecfeff;">{"Activate Your Presence"}</h3>
        <p style="margin:0; text-align:center; font-size:12px; opacity:0.8;">{"This one-time setup links your Telegram account to the Bluewave ecosystem."}</p>
        <div style="font-size:11px; text-align:center; color:#06b6d4;">{ format!("Step {} of 3", flow.step.number()) }</div>
        { step_body }
        { if let Some(err) = &flow.error { html!{
            <p style="margin:0; font-size:12px; color:#f87171;">{ err.clone() }</p>
        } } else { html!{} } }
        <button onclick={on_submit} disabled={flow.busy} style={SUBMIT_STYLE}>{ if flow.busy { busy_label } else { label } }</button>
        <p style="margin:0; font-size:10px; text-align:center; opacity:0.6;">{"Your presence = your access. We never ask for passwords, only your Telegram identity."}</p>
    </ModalFrame>}
}
