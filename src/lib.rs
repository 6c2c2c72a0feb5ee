//! Sends a KakaoTalk "send to me" text memo over a small reqwest wrapper, with
//! an in-memory mock transport for deterministic tests.

pub mod adapter;
pub mod config;
pub mod memo;
pub mod mock;
pub mod sender;
pub mod telemetry;

pub use reqwest::Method;

pub use adapter::{
    Client, ReqwestTransport, RestBytes, RestError, RestErrorKind, RestFuture, RestRequest,
    RestResponse, RestResult, RestTransport,
};
pub use config::{ConfigError, SenderConfig};
pub use memo::{
    AccessToken, Link, MemoError, ObjectType, TemplateObject, bearer_authorization, decode_form,
    encode_form, memo_request,
};
pub use mock::{MockFailure, MockResponse, MockRestAdapter};
pub use sender::{MemoSender, SendError, notify_member_join, report};
