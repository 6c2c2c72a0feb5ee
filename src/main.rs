use std::io;

use anyhow::Context;
use kakao_memo::telemetry::{get_subscriber, init_subscriber};
use kakao_memo::{Client, MemoSender, SenderConfig};
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_subscriber(get_subscriber("warn"))?;

    let config = SenderConfig::from_env().context("invalid configuration")?;
    info!(endpoint = %config.endpoint, "sending memo");

    let template = config.template();
    MemoSender::new(Client::new(), config)
        .send_and_report(&template, &mut io::stdout().lock())
        .await
        .context("failed to send memo")?;
    Ok(())
}
