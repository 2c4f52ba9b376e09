// Runtime configuration: backend location and timing constants.

/// Base URL used when `BLUEWAVE_API_URL` is not set at build time.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_PREFIX: &str = "/api";

/// Identical reads inside this window share one request.
pub const DEDUP_WINDOW_MS: f64 = 3_000.0;
pub const BALANCE_POLL_MS: u32 = 60_000;
pub const CLAIM_COOLDOWN_MS: f64 = 2_000.0;
pub const NOTICE_DISPLAY_MS: f64 = 3_500.0;
pub const RATE_LIMIT_RELOAD_MS: u32 = 5_000;
/// Dwell before a plain link mission becomes claimable.
pub const LINK_DWELL_MS: f64 = 10_000.0;
pub const STORY_DWELL_MS: f64 = 15_000.0;
pub const NOTIFY_COOLDOWN_MS: f64 = 24.0 * 60.0 * 60.0 * 1_000.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::with_base(option_env!("BLUEWAVE_API_URL").unwrap_or(DEFAULT_API_URL))
    }

    pub fn with_base(base: &str) -> Self {
        Self {
            api_url: base.trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for an API path such as `/user/42`.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}{}", self.api_url, API_PREFIX, path)
        } else {
            format!("{}{}/{}", self.api_url, API_PREFIX, path)
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
