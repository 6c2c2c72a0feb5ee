use std::time::Duration;

use crate::adapter::RestResponse;
use crate::memo::{AccessToken, DEFAULT_LINK_URL, DEFAULT_TEXT, Link, MEMO_SEND_URL, TemplateObject};

pub const TOKEN_VAR: &str = "KAKAO_ACCESS_TOKEN";
pub const ENDPOINT_VAR: &str = "KAKAO_MEMO_ENDPOINT";
pub const TEXT_VAR: &str = "KAKAO_MEMO_TEXT";
pub const WEB_URL_VAR: &str = "KAKAO_MEMO_WEB_URL";
pub const MOBILE_WEB_URL_VAR: &str = "KAKAO_MEMO_MOBILE_WEB_URL";
pub const TIMEOUT_VAR: &str = "KAKAO_MEMO_TIMEOUT_SECS";
pub const STRICT_VAR: &str = "KAKAO_MEMO_STRICT";
pub const MEMBER_NAME_VAR: &str = "KAKAO_MEMO_MEMBER_NAME";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("KAKAO_ACCESS_TOKEN is not set")]
    MissingToken,
    #[error("KAKAO_ACCESS_TOKEN is empty")]
    EmptyToken,
    #[error("KAKAO_MEMO_TIMEOUT_SECS must be a positive number of seconds, got `{0}`")]
    InvalidTimeout(String),
    #[error("{name} must be one of 1/0/true/false/yes/no, got `{value}`")]
    InvalidFlag { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct SenderConfig {
    pub access_token: AccessToken,
    pub endpoint: String,
    pub text: String,
    pub web_url: String,
    pub mobile_web_url: String,
    pub timeout: Option<Duration>,
    /// Sends the member-join announcement instead of `text` when set.
    pub member_name: Option<String>,
    /// Exit non-zero after reporting a non-2xx status.
    pub strict: bool,
}

impl SenderConfig {
    pub fn new(access_token: AccessToken) -> Self {
        Self {
            access_token,
            endpoint: MEMO_SEND_URL.to_string(),
            text: DEFAULT_TEXT.to_string(),
            web_url: DEFAULT_LINK_URL.to_string(),
            mobile_web_url: DEFAULT_LINK_URL.to_string(),
            timeout: None,
            member_name: None,
            strict: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source. Unset and empty optional
    /// variables fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let raw_token = lookup(TOKEN_VAR).ok_or(ConfigError::MissingToken)?;
        let access_token = AccessToken::new(raw_token).map_err(|_| ConfigError::EmptyToken)?;
        let mut config = Self::new(access_token);

        if let Some(endpoint) = optional(ENDPOINT_VAR) {
            config.endpoint = endpoint;
        }
        if let Some(text) = optional(TEXT_VAR) {
            config.text = text;
        }
        if let Some(web_url) = optional(WEB_URL_VAR) {
            config.mobile_web_url = web_url.clone();
            config.web_url = web_url;
        }
        if let Some(mobile_web_url) = optional(MOBILE_WEB_URL_VAR) {
            config.mobile_web_url = mobile_web_url;
        }
        if let Some(raw) = optional(TIMEOUT_VAR) {
            config.timeout = Some(parse_timeout(&raw)?);
        }
        config.member_name = optional(MEMBER_NAME_VAR);
        if let Some(raw) = optional(STRICT_VAR) {
            config.strict = parse_flag(STRICT_VAR, &raw)?;
        }

        Ok(config)
    }

    pub fn link(&self) -> Link {
        Link::new(self.web_url.clone(), self.mobile_web_url.clone())
    }

    pub fn template(&self) -> TemplateObject {
        match &self.member_name {
            Some(name) => TemplateObject::member_join(name, self.link()),
            None => TemplateObject::text(self.text.clone(), self.link()),
        }
    }

    /// Whether a delivered response should still fail the run.
    pub fn rejects(&self, response: &RestResponse) -> bool {
        self.strict && !response.is_success()
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<f64>() {
        Ok(secs) if secs > 0.0 => match Duration::try_from_secs_f64(secs) {
            Ok(timeout) if !timeout.is_zero() => Ok(timeout),
            _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
        },
        _ => Err(ConfigError::InvalidTimeout(raw.to_string())),
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: raw.to_string(),
        }),
    }
}
