// Three-step registration flow: request code, verify code, pick country.
// Steps only move forward; a failed step stays put with an inline error.

use crate::api::ApiError;
use crate::model::{ProfileUpdateResponse, TelegramId, VerifyResponse};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OnboardingStep {
    RequestCode,
    SubmitCode,
    SubmitProfile,
}

impl OnboardingStep {
    pub fn number(self) -> u8 {
        match self {
            OnboardingStep::RequestCode => 1,
            OnboardingStep::SubmitCode => 2,
            OnboardingStep::SubmitProfile => 3,
        }
    }
}

/// Identity produced by a finished onboarding or a successful lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionIdentity {
    pub tg_id: TelegramId,
    pub username: String,
    pub onboarded: bool,
    pub country_code: Option<String>,
}

/// Backend call the current step wants to make.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitRequest {
    RequestCode { username: String },
    VerifyCode { username: String, code: String },
    SaveProfile { tg_id: TelegramId, country_code: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum OnboardingAction {
    SetUsername(String),
    SetCode(String),
    SetSearch(String),
    SelectCountry(String),
    Invalid(String),
    Submitted,
    CodeRequested(Result<(), ApiError>),
    CodeVerified(Result<VerifyResponse, ApiError>),
    ProfileSaved(Result<ProfileUpdateResponse, ApiError>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct OnboardingFlow {
    pub step: OnboardingStep,
    pub username: String,
    pub code: String,
    pub search: String,
    pub country: Option<String>,
    pub busy: bool,
    pub error: Option<String>,
    verified: Option<VerifyResponse>,
    completed: Option<(SessionIdentity, Option<u64>)>,
}

impl OnboardingFlow {
    pub fn new(prefill_username: Option<String>) -> Self {
        Self {
            step: OnboardingStep::RequestCode,
            username: prefill_username.unwrap_or_default(),
            code: String::new(),
            search: String::new(),
            country: None,
            busy: false,
            error: None,
            verified: None,
            completed: None,
        }
    }

    /// Set once the flow finished: identity plus the balance the backend reported.
    pub fn completed(&self) -> Option<&(SessionIdentity, Option<u64>)> {
        self.completed.as_ref()
    }

    /// Validates the inputs of the current step.
    pub fn submission(&self) -> Result<SubmitRequest, &'static str> {
        let username = self.username.trim();
        match self.step {
            OnboardingStep::RequestCode => {
                if username.is_empty() {
                    return Err("Enter your Telegram username.");
                }
                Ok(SubmitRequest::RequestCode {
                    username: username.to_string(),
                })
            }
            OnboardingStep::SubmitCode => {
                let code = self.code.trim();
                if code.is_empty() {
                    return Err("Enter the 6-digit code sent to your Telegram.");
                }
                Ok(SubmitRequest::VerifyCode {
                    username: username.to_string(),
                    code: code.to_string(),
                })
            }
            OnboardingStep::SubmitProfile => {
                let Some(verified) = &self.verified else {
                    return Err("Something went wrong. Please restart onboarding.");
                };
                let Some(country) = &self.country else {
                    return Err("Select your country to activate your presence.");
                };
                Ok(SubmitRequest::SaveProfile {
                    tg_id: verified.tg_id,
                    country_code: country.clone(),
                })
            }
        }
    }

    pub fn apply(&mut self, action: OnboardingAction) {
        use OnboardingAction::*;
        match action {
            SetUsername(v) => self.username = v,
            SetCode(v) => self.code = v.chars().filter(|c| !c.is_whitespace()).take(6).collect(),
            SetSearch(v) => self.search = v,
            SelectCountry(code) => self.country = Some(code),
            Invalid(msg) => self.error = Some(msg),
            Submitted => {
                self.busy = true;
                self.error = None;
            }
            CodeRequested(result) => {
                self.busy = false;
                match result {
                    Ok(()) if self.step == OnboardingStep::RequestCode => {
                        self.step = OnboardingStep::SubmitCode;
                    }
                    Ok(()) => {}
                    Err(e) => {
                        self.error = Some(match e {
                            ApiError::NotRegistered => e.user_message(),
                            ApiError::Network(_) => "Network error. Check your connection.",
                            _ => "Could not request code. Try again.",
                        }
                        .to_string())
                    }
                }
            }
            CodeVerified(result) => {
                self.busy = false;
                if self.step != OnboardingStep::SubmitCode {
                    return;
                }
                match result {
                    Ok(user) => {
                        // Already onboarded on another device: finish right away.
                        if user.first_login_completed && user.country_code.is_some() {
                            self.finish(&user, user.country_code.clone());
                        } else {
                            self.step = OnboardingStep::SubmitProfile;
                        }
                        self.verified = Some(user);
                    }
                    Err(e) => {
                        self.error = Some(match e {
                            ApiError::CodeInvalid
                            | ApiError::CodeExpired
                            | ApiError::NotRegistered
                            | ApiError::Network(_) => e.user_message(),
                            _ => "Verification failed. Try again.",
                        }
                        .to_string())
                    }
                }
            }
            ProfileSaved(result) => {
                self.busy = false;
                if self.step != OnboardingStep::SubmitProfile {
                    return;
                }
                match (result, self.verified.clone()) {
                    (Ok(r), Some(user)) if r.success => {
                        let country = self.country.clone();
                        self.finish(&user, country);
                    }
                    (Err(ApiError::Network(_)), _) => {
                        self.error = Some("Network error. Try again.".into());
                    }
                    _ => self.error = Some("Could not save profile. Try again.".into()),
                }
            }
        }
    }

    fn finish(&mut self, user: &VerifyResponse, country_code: Option<String>) {
        log::info!("[SESSION] onboarding complete for {}", user.tg_id);
        self.completed = Some((
            SessionIdentity {
                tg_id: user.tg_id,
                username: user.username.clone(),
                onboarded: true,
                country_code,
            },
            user.points_balance,
        ));
    }
}
