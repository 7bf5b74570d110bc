use std::fmt;
use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use log::{error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;

const SLACK_API_URL: &str = "https://slack.com/api";
const ATTACHMENT_TITLE: &str = "resource-sweeper";

/// What was done to a workload. `Other` carries anything outside the known
/// set and maps to the default severity rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Created,
    Updated,
    Deleted,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Danger,
    Default,
}

impl Action {
    pub fn severity(&self) -> Severity {
        match self {
            Action::Created => Severity::Normal,
            Action::Updated => Severity::Warning,
            Action::Deleted => Severity::Danger,
            Action::Other(_) => Severity::Default,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Created => write!(f, "created"),
            Action::Updated => write!(f, "updated"),
            Action::Deleted => write!(f, "deleted"),
            Action::Other(action) => write!(f, "{action}"),
        }
    }
}

impl Severity {
    fn slack_color(&self) -> Option<&'static str> {
        match self {
            Severity::Normal => Some("good"),
            Severity::Warning => Some("warning"),
            Severity::Danger => Some("danger"),
            Severity::Default => None,
        }
    }
}

/// One remediation outcome, built the moment the action completes and handed
/// straight to a notifier. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemediationEvent {
    pub namespace: String,
    pub name: String,
    pub reason: String,
    pub action: Action,
}

impl RemediationEvent {
    pub fn new(namespace: &str, name: &str, reason: &str, action: Action) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            reason: reason.to_string(),
            action,
        }
    }

    pub fn severity(&self) -> Severity {
        self.action.severity()
    }

    /// Standard human-readable form, shared by every delivery channel.
    pub fn message(&self) -> String {
        format!(
            "`{}` in namespace `{}` has been `{}` due to `{}`",
            self.name, self.namespace, self.action, self.reason
        )
    }
}

/// Best-effort delivery: failures are logged, never surfaced to the caller.
/// The destructive action has already been committed by the time this runs.
pub trait Notify {
    fn notify(&self, event: &RemediationEvent) -> impl Future<Output = ()> + Send;
}

pub struct SlackNotifier {
    client: Client,
    api_url: String,
    token: String,
    channel: String,
}

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    as_user: bool,
    attachments: Vec<Attachment<'a>>,
}

#[derive(Serialize)]
struct Attachment<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'static str>,
    fields: Vec<AttachmentField<'a>>,
    mrkdwn_in: Vec<&'static str>,
}

#[derive(Serialize)]
struct AttachmentField<'a> {
    title: &'static str,
    value: &'a str,
}

#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    channel: Option<String>,
    ts: Option<String>,
    error: Option<String>,
}

impl SlackNotifier {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_api_url(config, SLACK_API_URL)
    }

    /// Base URL is injectable so tests can point at a local mock server.
    pub fn with_api_url(config: &Config, api_url: &str) -> Result<Self> {
        info!("initializing slack...");
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            channel: config.channel.clone(),
        })
    }

    async fn post_message(&self, event: &RemediationEvent) -> Result<(String, String)> {
        let message = event.message();
        let body = PostMessage {
            channel: &self.channel,
            as_user: true,
            attachments: vec![Attachment {
                color: event.severity().slack_color(),
                fields: vec![AttachmentField {
                    title: ATTACHMENT_TITLE,
                    value: &message,
                }],
                mrkdwn_in: vec!["fields"],
            }],
        };

        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .context("Failed to reach Slack")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Slack API error ({status})");
        }

        let response: PostMessageResponse = response
            .json()
            .await
            .context("Failed to parse Slack response")?;
        if !response.ok {
            bail!(
                "Slack rejected message: {}",
                response.error.unwrap_or_default()
            );
        }

        Ok((
            response.channel.unwrap_or_default(),
            response.ts.unwrap_or_default(),
        ))
    }
}

impl Notify for SlackNotifier {
    async fn notify(&self, event: &RemediationEvent) {
        match self.post_message(event).await {
            Ok((channel, ts)) => {
                info!("Message successfully sent to channel {channel} at {ts}");
            }
            Err(e) => error!("Failed to notify Slack: {e}"),
        }
    }
}
