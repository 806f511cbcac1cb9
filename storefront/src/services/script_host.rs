// storefront/src/services/script_host.rs

use anyhow::{bail, Context};
use async_trait::async_trait;
use paydesk::domain::WidgetScript;
use paydesk::ports::ScriptSource;
use reqwest::Client;
use tracing::{debug, instrument};

/// Fetches the hosted widget script over HTTP. A non-empty 2xx body counts
/// as loaded.
pub struct HttpScriptSource {
  http: Client,
}

impl HttpScriptSource {
  pub fn new(http: Client) -> Self {
    Self { http }
  }
}

#[async_trait]
impl ScriptSource for HttpScriptSource {
  #[instrument(name = "HttpScriptSource::fetch", skip_all, fields(url = %script.url))]
  async fn fetch(&self, script: &WidgetScript) -> anyhow::Result<()> {
    let response = self
      .http
      .get(&script.url)
      .send()
      .await
      .context("script request failed")?
      .error_for_status()?;
    let bytes = response.bytes().await.context("failed to read script body")?;
    if bytes.is_empty() {
      bail!("script body was empty");
    }
    debug!(size = bytes.len(), "Widget script fetched.");
    Ok(())
  }
}
