use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, Response};
use yew::Callback;

use super::cache::{DedupCache, Lookup};
use super::error::{interpret_response, ApiError};
use crate::config::{AppConfig, DEDUP_WINDOW_MS};

/// HTTP JSON client for the backend. Cheap to clone; clones share the read
/// cache. Provided to components through context.
#[derive(Clone)]
pub struct ApiClient {
    config: Rc<AppConfig>,
    cache: Rc<RefCell<DedupCache<Value>>>,
}

impl PartialEq for ApiClient {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cache, &other.cache)
    }
}

impl ApiClient {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config: Rc::new(config),
            cache: Rc::new(RefCell::new(DedupCache::new(DEDUP_WINDOW_MS))),
        }
    }

    pub async fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        self.send("GET", path, None).await
    }

    pub async fn post_value<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send("POST", path, Some(body)).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.get_value(path).await?)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        decode(self.post_value(path, body).await?)
    }

    /// Deduplicated read: identical concurrent requests collapse into one and
    /// a recent result is served without a request. Nothing revalidates on
    /// focus; callers refetch explicitly after mutations.
    pub fn cached_get<T: DeserializeOwned + 'static>(&self, path: &str, callback: Callback<Result<T, ApiError>>) {
        let waiter = callback.reform(|r: Result<Value, ApiError>| r.and_then(decode));
        let now = js_sys::Date::now();
        let lookup = self.cache.borrow_mut().lookup(path, now, waiter.clone());
        match lookup {
            Lookup::Fresh(v) => {
                log::debug!("[API] cache hit {}", path);
                waiter.emit(Ok(v));
            }
            Lookup::Joined => log::debug!("[API] joined in-flight {}", path),
            Lookup::Fetch => {
                let client = self.clone();
                let path = path.to_string();
                wasm_bindgen_futures::spawn_local(async move {
                    let result = client.get_value(&path).await;
                    let waiters = client
                        .cache
                        .borrow_mut()
                        .resolve(&path, js_sys::Date::now(), &result);
                    for w in waiters {
                        w.emit(result.clone());
                    }
                });
            }
        }
    }

    /// Forgets cached reads under `prefix` (e.g. after a claim changed them).
    pub fn invalidate(&self, prefix: &str) {
        self.cache.borrow_mut().invalidate_prefix(prefix);
    }

    async fn send(&self, method: &str, path: &str, body: Option<String>) -> Result<Value, ApiError> {
        let url = self.config.endpoint(path);
        let init = RequestInit::new();
        init.set_method(method);
        init.set_cache(RequestCache::NoCache);
        if let Some(body) = &body {
            init.set_body(&JsValue::from_str(body));
        }
        let request = Request::new_with_str_and_init(&url, &init).map_err(js_network)?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(js_network)?;
        }
        let window = web_sys::window().ok_or_else(|| ApiError::Network("no window".into()))?;
        let resp = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_network)?;
        let resp: Response = resp.dyn_into().map_err(js_network)?;
        let status = resp.status();
        let text = JsFuture::from(resp.text().map_err(js_network)?)
            .await
            .map_err(js_network)?;
        let text = text.as_string().unwrap_or_default();
        let result = interpret_response(status, &text);
        match &result {
            Ok(_) => log::debug!("[API] {} {} -> {}", method, path, status),
            Err(e) => log::error!("[API] {} {} failed: {}", method, path, e),
        }
        result
    }
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn js_network(err: JsValue) -> ApiError {
    ApiError::Network(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}
