use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace swept when none is given on the command line.
pub const DEFAULT_NAMESPACE: &str = "default";

const TOKEN_ENV: &str = "SLACK_TOKEN";
const CHANNEL_ENV: &str = "SLACK_CHANNEL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "missing slack token or channel\n\n\
         You need to set both slack token and channel for slack notify,\n\
         using \"--token\" and \"--channel\", or using environment variables:\n\n\
         export SLACK_TOKEN=slack_token\n\
         export SLACK_CHANNEL=slack_channel\n\n\
         Command line flags will override environment variables"
    )]
    MissingSlack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub namespace: String,
    pub token: String,
    pub channel: String,
}

impl Config {
    /// Flags take precedence; the environment fills whatever they leave
    /// empty. The process refuses to run without notification capability.
    pub fn new(
        namespace: &str,
        token: Option<String>,
        channel: Option<String>,
    ) -> Result<Self, ConfigError> {
        let token = token
            .filter(|t| !t.is_empty())
            .or_else(|| env::var(TOKEN_ENV).ok())
            .filter(|t| !t.is_empty());
        let channel = channel
            .filter(|c| !c.is_empty())
            .or_else(|| env::var(CHANNEL_ENV).ok())
            .filter(|c| !c.is_empty());

        match (token, channel) {
            (Some(token), Some(channel)) => Ok(Self {
                namespace: namespace.to_string(),
                token,
                channel,
            }),
            _ => Err(ConfigError::MissingSlack),
        }
    }
}
