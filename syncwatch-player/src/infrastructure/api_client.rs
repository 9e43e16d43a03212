use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, header::AUTHORIZATION};
use syncwatch_core::commands::{CommandChannel, CredentialStore};
use syncwatch_core::error::CommandError;
use syncwatch_model::ControllerCommand;
use url::Url;

/// Controller command channel over HTTP.
///
/// The admin credential is read from the [`CredentialStore`] on every call
/// and sent verbatim as the `Authorization` header. Nothing is retried; a
/// non-2xx status comes back as [`CommandError::Rejected`].
#[derive(Clone)]
pub struct HttpCommandChannel {
    client: Client,
    base_url: Url,
    credentials: CredentialStore,
}

impl std::fmt::Debug for HttpCommandChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCommandChannel")
            .field("base_url", &self.base_url.as_str())
            .field("has_credential", &self.credentials.is_set())
            .finish()
    }
}

impl HttpCommandChannel {
    /// `base_url` must end with `/`; command routes are joined onto it.
    pub fn new(
        base_url: Url,
        credentials: CredentialStore,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;

        info!(
            "[HttpCommandChannel] Sending controller commands to {}",
            base_url
        );

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of a command route.
    pub fn endpoint(
        &self,
        command: &ControllerCommand,
    ) -> Result<Url, url::ParseError> {
        self.base_url.join(command.path().trim_start_matches('/'))
    }
}

#[async_trait]
impl CommandChannel for HttpCommandChannel {
    async fn issue(
        &self,
        command: &ControllerCommand,
    ) -> Result<(), CommandError> {
        let label = command.label();
        let url = self.endpoint(command).map_err(|err| {
            CommandError::Transport {
                command: label,
                source: Box::new(err),
            }
        })?;

        let mut request = self.client.post(url);
        if let Some(secret) = self.credentials.current() {
            request = request.header(AUTHORIZATION, secret);
        }
        if let Some(body) = command.body() {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|err| {
            warn!("[HttpCommandChannel] {} failed to send: {}", label, err);
            CommandError::Transport {
                command: label,
                source: Box::new(err),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("[HttpCommandChannel] {} accepted ({})", label, status);
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let reason = rejection_reason(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "rejected".to_string());
        warn!(
            "[HttpCommandChannel] {} rejected with status {}: {}",
            label, status, reason
        );
        Err(CommandError::Rejected {
            command: label,
            status: status.as_u16(),
            reason,
        })
    }
}

/// Prefers the controller's `{"error": {"message": ..}}` body, then any
/// non-blank text.
fn rejection_reason(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value["error"]["message"].as_str().map(str::to_string)
        });
    Some(message.unwrap_or_else(|| body.to_string()))
}
