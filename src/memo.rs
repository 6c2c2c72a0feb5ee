//! Request construction for the KakaoTalk "send to me" memo API.
//!
//! The API takes one form field, `template_object`, holding a JSON document
//! that describes the message. Everything here is pure: nothing touches the
//! network until the built [`RestRequest`] is handed to a transport.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::adapter::RestRequest;

pub const MEMO_SEND_URL: &str = "https://kapi.kakao.com/v2/api/talk/memo/default/send";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const TEMPLATE_OBJECT_FIELD: &str = "template_object";

pub const DEFAULT_TEXT: &str = "회원가입 테스트 메시지입니다!";
pub const DEFAULT_LINK_URL: &str = "https://developers.kakao.com";
pub const MEMBER_JOIN_HEADLINE: &str = "🎉 새로운 회원이 가입했습니다!";

#[derive(Debug, thiserror::Error)]
pub enum MemoError {
    #[error("access token must not be empty")]
    EmptyToken,
    #[error("failed to encode template object: {0}")]
    Encode(String),
    #[error("failed to decode form body: {0}")]
    Decode(String),
    #[error("form body has no `template_object` field")]
    MissingTemplate,
}

/// Bearer credential. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Result<Self, MemoError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(MemoError::EmptyToken);
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    #[default]
    Text,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub web_url: String,
    pub mobile_web_url: String,
}

impl Link {
    pub fn new(web_url: impl Into<String>, mobile_web_url: impl Into<String>) -> Self {
        Self {
            web_url: web_url.into(),
            mobile_web_url: mobile_web_url.into(),
        }
    }

    /// Same URL for desktop and mobile.
    pub fn same(url: impl Into<String>) -> Self {
        let url = url.into();
        Self::new(url.clone(), url)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateObject {
    pub object_type: ObjectType,
    pub text: String,
    pub link: Link,
}

impl TemplateObject {
    pub fn text(text: impl Into<String>, link: Link) -> Self {
        Self {
            object_type: ObjectType::Text,
            text: text.into(),
            link,
        }
    }

    /// Announcement for a newly registered member. The name is carried as
    /// data, so quotes and line breaks in it stay inside the JSON string.
    pub fn member_join(name: &str, link: Link) -> Self {
        Self::text(format!("{MEMBER_JOIN_HEADLINE}\n회원명: {name}"), link)
    }

    pub fn to_json(&self) -> Result<String, MemoError> {
        sonic_rs::to_string(self).map_err(|err| MemoError::Encode(err.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, MemoError> {
        sonic_rs::from_str(json).map_err(|err| MemoError::Decode(err.to_string()))
    }
}

impl Default for TemplateObject {
    fn default() -> Self {
        Self::text(DEFAULT_TEXT, Link::same(DEFAULT_LINK_URL))
    }
}

pub fn bearer_authorization(token: &AccessToken) -> String {
    format!("Bearer {}", token.expose())
}

/// `template_object=<percent-encoded JSON>`
pub fn encode_form(template: &TemplateObject) -> Result<Bytes, MemoError> {
    let json = template.to_json()?;
    let body = serde_urlencoded::to_string([(TEMPLATE_OBJECT_FIELD, json.as_str())])
        .map_err(|err| MemoError::Encode(err.to_string()))?;
    Ok(Bytes::from(body))
}

/// Raw JSON text of the `template_object` field.
pub fn decode_form_json(body: &[u8]) -> Result<String, MemoError> {
    let fields: Vec<(String, String)> =
        serde_urlencoded::from_bytes(body).map_err(|err| MemoError::Decode(err.to_string()))?;
    fields
        .into_iter()
        .find(|(key, _)| key == TEMPLATE_OBJECT_FIELD)
        .map(|(_, value)| value)
        .ok_or(MemoError::MissingTemplate)
}

pub fn decode_form(body: &[u8]) -> Result<TemplateObject, MemoError> {
    TemplateObject::from_json(&decode_form_json(body)?)
}

pub fn memo_request(
    endpoint: &str,
    token: &AccessToken,
    template: &TemplateObject,
) -> Result<RestRequest, MemoError> {
    let body = encode_form(template)?;
    Ok(RestRequest::post(endpoint)
        .with_header("Authorization", bearer_authorization(token))
        .with_header("Content-Type", FORM_CONTENT_TYPE)
        .with_body(body))
}
