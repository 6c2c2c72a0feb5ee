use std::io::{self, Write};

use tracing::{debug, error, info, instrument, warn};

use crate::adapter::{Client, RestError, RestResponse};
use crate::config::SenderConfig;
use crate::memo::{MemoError, TemplateObject, memo_request};

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error(transparent)]
    Memo(#[from] MemoError),
    #[error(transparent)]
    Transport(#[from] RestError),
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
    /// Strict mode only; the report was already written.
    #[error("memo api answered with status {status}")]
    Rejected { status: u16 },
}

/// Sends one memo per call. Non-2xx answers are returned as responses, only
/// transport failures are errors.
#[derive(Clone)]
pub struct MemoSender {
    client: Client,
    config: SenderConfig,
}

impl MemoSender {
    pub fn new(client: Client, config: SenderConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    #[instrument(name = "send_memo", skip_all, fields(endpoint = %self.config.endpoint))]
    pub async fn send(&self, template: &TemplateObject) -> Result<RestResponse, SendError> {
        let mut request = memo_request(&self.config.endpoint, &self.config.access_token, template)?;
        if let Some(timeout) = self.config.timeout {
            request = request.with_timeout(timeout);
        }
        debug!(bytes = request.body.as_ref().map_or(0, |b| b.len()), "posting memo");

        let response = self.client.execute(request).await.inspect_err(|err| {
            error!(kind = ?err.kind(), %err, "memo transport failed");
        })?;
        if response.is_success() {
            info!(status = response.status(), elapsed = ?response.elapsed, text = %template.text, "memo delivered");
        } else {
            warn!(status = response.status(), body = %response.text(), "memo api rejected the message");
        }
        Ok(response)
    }

    /// Writes the report, then applies strict mode.
    pub async fn send_and_report<W: Write>(
        &self,
        template: &TemplateObject,
        out: &mut W,
    ) -> Result<RestResponse, SendError> {
        let response = self.send(template).await?;
        report(out, &response)?;
        if self.config.rejects(&response) {
            return Err(SendError::Rejected {
                status: response.status(),
            });
        }
        Ok(response)
    }
}

pub fn report<W: Write>(out: &mut W, response: &RestResponse) -> io::Result<()> {
    writeln!(out, "Status Code: {}", response.status())?;
    writeln!(out, "Response: {}", response.text())?;
    out.flush()
}

/// Announces a new member. Without a configured sender the notification is
/// skipped with a warning and `Ok(None)` is returned.
pub async fn notify_member_join(
    sender: Option<&MemoSender>,
    member_name: &str,
) -> Result<Option<RestResponse>, SendError> {
    let Some(sender) = sender else {
        warn!("kakao access token is not configured, skipping member-join notification");
        return Ok(None);
    };
    let template = TemplateObject::member_join(member_name, sender.config().link());
    sender.send(&template).await.map(Some)
}
