// Bridge to the Telegram WebApp object injected by the host client. Every
// call degrades to a plain browser fallback (or a no-op) outside Telegram.

use js_sys::{Function, Reflect};
use wasm_bindgen::{JsCast, JsValue};

use crate::model::HostUser;

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn web_app() -> Option<JsValue> {
    let window: JsValue = web_sys::window()?.into();
    let telegram = get(&window, "Telegram")?;
    get(&telegram, "WebApp")
}

fn call(target: &JsValue, method: &str, args: &[JsValue]) -> Result<JsValue, JsValue> {
    let f: Function = get(target, method)
        .ok_or_else(|| JsValue::from_str(method))?
        .dyn_into()?;
    let array: js_sys::Array = args.iter().collect();
    f.apply(target, &array)
}

/// Tells the host the app has rendered and may be expanded.
pub fn ready() {
    let Some(app) = web_app() else {
        log::debug!("[SESSION] no Telegram host, running in browser mode");
        return;
    };
    let _ = call(&app, "ready", &[]);
    let _ = call(&app, "expand", &[]);
}

pub fn host_user() -> Option<HostUser> {
    let app = web_app()?;
    let unsafe_data = get(&app, "initDataUnsafe")?;
    let user = get(&unsafe_data, "user")?;
    let json = js_sys::JSON::stringify(&user).ok()?.as_string()?;
    match serde_json::from_str::<HostUser>(&json) {
        Ok(u) => Some(u),
        Err(e) => {
            log::warn!("[SESSION] host user not understood: {}", e);
            None
        }
    }
}

pub fn open_link(url: &str) {
    if let Some(app) = web_app() {
        if call(&app, "openLink", &[JsValue::from_str(url)]).is_ok() {
            return;
        }
    }
    if let Some(win) = web_sys::window() {
        let _ = win.open_with_url_and_target(url, "_blank");
    }
}

/// `t.me` links stay inside the Telegram client when possible.
pub fn open_telegram_link(url: &str) {
    if let Some(app) = web_app() {
        if call(&app, "openTelegramLink", &[JsValue::from_str(url)]).is_ok() {
            return;
        }
    }
    open_link(url);
}

/// Returns false when the host cannot share stories (older clients, browser).
pub fn share_to_story(media_url: &str, text: Option<&str>) -> bool {
    let Some(app) = web_app() else {
        return false;
    };
    let params = js_sys::Object::new();
    if let Some(text) = text {
        let _ = Reflect::set(&params, &JsValue::from_str("text"), &JsValue::from_str(text));
    }
    call(&app, "shareToStory", &[JsValue::from_str(media_url), params.into()]).is_ok()
}

pub fn copy_to_clipboard(text: &str) -> bool {
    let Some(win) = web_sys::window() else {
        return false;
    };
    let navigator: JsValue = win.navigator().into();
    match get(&navigator, "clipboard") {
        Some(clipboard) => call(&clipboard, "writeText", &[JsValue::from_str(text)]).is_ok(),
        None => false,
    }
}

pub fn reload_page() {
    if let Some(win) = web_sys::window() {
        if let Err(e) = win.location().reload() {
            log::error!("[SESSION] reload failed: {:?}", e);
        }
    }
}
