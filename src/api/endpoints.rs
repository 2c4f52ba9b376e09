// Typed wrappers for every backend route the app consumes.

use serde_json::json;

use super::{ApiClient, ApiError};
use crate::model::{
    ClaimResponse, Mission, MissionKind, MissionOpenedResponse, NotifyResponse, NotifyStatus,
    ProfileUpdateResponse, StoryMediaResponse, TelegramId, UserSnapshot, VerifyResponse,
};

pub fn user_path(tg_id: TelegramId) -> String {
    format!("/user/{}", tg_id)
}

pub fn balance_path(tg_id: TelegramId) -> String {
    format!("/balance/{}", tg_id)
}

pub fn level_progress_path(tg_id: TelegramId) -> String {
    format!("/level_progress/{}", tg_id)
}

pub fn missions_path(kind: MissionKind, tg_id: TelegramId) -> Option<String> {
    match kind {
        MissionKind::Link => Some(format!("/missions/{}", tg_id)),
        MissionKind::Onboarding => Some(format!("/missions/onboarding/{}", tg_id)),
        MissionKind::Daily => Some(format!("/missions/daily/{}", tg_id)),
        // Story missions are delivered inside the general listing.
        MissionKind::Story => None,
    }
}

pub const LEADERBOARD_PATH: &str = "/leaderboard";
pub const COUNTRY_DOTS_PATH: &str = "/country_dots";

impl ApiClient {
    pub async fn user(&self, tg_id: TelegramId) -> Result<UserSnapshot, ApiError> {
        self.get(&user_path(tg_id)).await
    }

    /// Lists missions of one kind, tagging each item with the kind it was
    /// listed under unless the backend already said otherwise.
    pub async fn missions(&self, kind: MissionKind, tg_id: TelegramId) -> Result<Vec<Mission>, ApiError> {
        let Some(path) = missions_path(kind, tg_id) else {
            return Ok(Vec::new());
        };
        let mut list: Vec<Mission> = self.get(&path).await?;
        for m in &mut list {
            m.kind.get_or_insert(kind);
        }
        Ok(list)
    }

    pub async fn mission_opened(&self, tg_id: TelegramId, mission_id: &str) -> Result<MissionOpenedResponse, ApiError> {
        self.post(
            "/mission_opened",
            &json!({ "telegram_id": tg_id, "mission_id": mission_id }),
        )
        .await
    }

    pub async fn story_media(&self, tg_id: TelegramId, mission_id: &str) -> Result<StoryMediaResponse, ApiError> {
        self.post(
            "/story_media",
            &json!({ "telegram_id": tg_id, "mission_id": mission_id }),
        )
        .await
    }

    pub async fn claim_mission(&self, claim_path: &str, tg_id: TelegramId, mission_id: &str) -> Result<ClaimResponse, ApiError> {
        self.post(
            claim_path,
            &json!({ "telegram_id": tg_id, "mission_id": mission_id }),
        )
        .await
    }

    pub async fn claim_referral(&self, tg_id: TelegramId) -> Result<ClaimResponse, ApiError> {
        self.post("/claim_referral", &json!({ "telegram_id": tg_id }))
            .await
    }

    pub async fn notify_inactive(&self, tg_id: TelegramId) -> Result<NotifyResponse, ApiError> {
        self.post("/notify_inactive", &json!({ "telegram_id": tg_id }))
            .await
    }

    pub async fn notify_status(&self, tg_id: TelegramId) -> Result<NotifyStatus, ApiError> {
        self.get(&format!("/notify_inactive/status/{}", tg_id)).await
    }

    pub async fn request_code(&self, username: &str) -> Result<(), ApiError> {
        self.post_value("/login/request_code", &json!({ "username": username }))
            .await
            .map(|_| ())
    }

    pub async fn verify_code(&self, username: &str, code: &str) -> Result<VerifyResponse, ApiError> {
        self.post(
            "/login/verify_code",
            &json!({ "username": username, "code": code }),
        )
        .await
    }

    pub async fn update_profile(&self, tg_id: TelegramId, country_code: &str) -> Result<ProfileUpdateResponse, ApiError> {
        self.post(
            "/user/update_profile",
            &json!({ "tg_id": tg_id, "country_code": country_code }),
        )
        .await
    }
}
