//! Wire models for the Bluewave backend.
//! Every field the UI can live without carries `#[serde(default)]` so partial
//! payloads from older backend revisions still decode.

use serde::{Deserialize, Deserializer, Serialize};

pub type TelegramId = i64;

/// Status of a mission item as listed by the backend and advanced locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    #[serde(alias = "active", alias = "available")]
    Open,
    Waiting,
    #[serde(alias = "claimable", alias = "ready")]
    Claim,
    Claiming,
    #[serde(alias = "claimed", alias = "completed")]
    Done,
}

/// Which listing a mission came from; selects its behaviour descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionKind {
    Link,
    Onboarding,
    Daily,
    Story,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "reward")]
    pub points: u64,
    #[serde(default)]
    pub link_url: String,
    pub status: MissionStatus,
    /// Unlock instant for a mission the backend already considers opened.
    #[serde(default, deserialize_with = "de_opt_timestamp_ms")]
    pub unlock_at: Option<f64>,
    #[serde(default)]
    pub kind: Option<MissionKind>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSnapshot {
    /// The row `id` some backends also send is not the Telegram id and is
    /// left undecoded.
    #[serde(default, alias = "telegram_id")]
    pub tg_id: Option<TelegramId>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_login_completed: bool,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default, alias = "points_balance")]
    pub balance: u64,
    #[serde(default)]
    pub streak: u32,
    #[serde(default, alias = "referrals")]
    pub total_referrals: u32,
    #[serde(default, alias = "inactive_referrals")]
    pub inactive_referrals_cache: u32,
    #[serde(default, alias = "referral_earnings")]
    pub referral_earnings_pending: u64,
    #[serde(default)]
    pub referral_link: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub joined_at: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: u64,
}

/// Result of any claim call: missions and referral earnings alike.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimResponse {
    #[serde(default)]
    pub claimed: bool,
    #[serde(default)]
    pub new_balance: Option<u64>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionOpenedResponse {
    #[serde(default, deserialize_with = "de_opt_timestamp_ms")]
    pub unlock_at: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryMediaResponse {
    pub media_url: String,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub telegram_id: TelegramId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country_flag: String,
    #[serde(default)]
    pub balance: u64,
    #[serde(default)]
    pub referrals: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    #[serde(default)]
    pub current_level: String,
    #[serde(default)]
    pub next_level: Option<String>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub remaining: u64,
    #[serde(default, rename = "myRank")]
    pub my_rank: Option<LeaderboardEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountryDot {
    pub country_code: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub tg_id: TelegramId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_login_completed: bool,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub points_balance: Option<u64>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdateResponse {
    #[serde(default)]
    pub success: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifyResponse {
    #[serde(default, alias = "success")]
    pub sent: bool,
    #[serde(default)]
    pub notified: u32,
    #[serde(default, deserialize_with = "de_opt_timestamp_ms")]
    pub last_sent_at: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifyStatus {
    #[serde(default, deserialize_with = "de_opt_timestamp_ms")]
    pub last_sent_at: Option<f64>,
    #[serde(default)]
    pub remaining_today: Option<u32>,
}

/// Identity the Telegram host hands us through `initDataUnsafe.user`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: TelegramId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Backend timestamps arrive as unix seconds or milliseconds, sometimes
/// quoted. Normalised to epoch milliseconds.
fn de_opt_timestamp_ms<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(de)?;
    let num = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(num.map(|v| if v < 1e12 { v * 1_000.0 } else { v }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mission_status_accepts_backend_aliases() {
        let m: Mission = serde_json::from_str(
            r#"{"id":"tw","name":"Follow","points":50,"link_url":"https://x.com","status":"active"}"#,
        )
        .unwrap();
        assert_eq!(m.status, MissionStatus::Open);
        assert_eq!(m.kind, None);
        let done: MissionStatus = serde_json::from_str(r#""claimed""#).unwrap();
        assert_eq!(done, MissionStatus::Done);
    }

    #[test]
    fn timestamps_normalise_to_millis() {
        let r: MissionOpenedResponse = serde_json::from_str(r#"{"unlock_at": 1700000008}"#).unwrap();
        assert_eq!(r.unlock_at, Some(1_700_000_008_000.0));
        let r: MissionOpenedResponse =
            serde_json::from_str(r#"{"unlock_at": "1700000008000"}"#).unwrap();
        assert_eq!(r.unlock_at, Some(1_700_000_008_000.0));
        let r: MissionOpenedResponse = serde_json::from_str(r#"{"unlock_at": null}"#).unwrap();
        assert_eq!(r.unlock_at, None);
    }

    #[test]
    fn user_snapshot_tolerates_sparse_payloads() {
        let u: UserSnapshot =
            serde_json::from_str(r#"{"tg_id": 99, "points_balance": 540}"#).unwrap();
        assert_eq!(u.tg_id, Some(99));
        assert_eq!(u.balance, 540);
        assert!(!u.first_login_completed);
    }

    #[test]
    fn user_snapshot_with_row_id_and_telegram_id_decodes() {
        let u: UserSnapshot = serde_json::from_str(
            r#"{"id":3,"tg_id":5550001,"username":"wave","first_login_completed":true,"balance":12}"#,
        )
        .unwrap();
        assert_eq!(u.tg_id, Some(5_550_001));
        assert!(u.first_login_completed);

        let u: UserSnapshot = serde_json::from_str(r#"{"id":3,"telegram_id":7}"#).unwrap();
        assert_eq!(u.tg_id, Some(7));
    }

    #[test]
    fn level_progress_reads_camel_case_rank() {
        let p: LevelProgress = serde_json::from_str(
            r#"{"current_level":"Blue Seed","next_level":null,"progress":100,"remaining":0,
                "myRank":{"rank":42,"telegram_id":7,"name":"me","country_flag":"🇳🇬","balance":10,"referrals":1}}"#,
        )
        .unwrap();
        assert_eq!(p.my_rank.unwrap().rank, Some(42));
        assert!(p.next_level.is_none());
    }
}
