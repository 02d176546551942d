//! Process configuration, read once from the environment at startup.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.watsonwork.ibm.com";
pub const DEFAULT_TRIGGER: &str = "@magic8ball";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Canned replies for the trigger keyword.
pub const DEFAULT_RESPONSES: &[&str] = &[
    "It is certain",
    "It is decidedly so",
    "Without a doubt",
    "Yes, definitely",
    "You may rely on it",
    "As I see it, yes",
    "Most likely",
    "Yes",
    "Signs point to yes",
    "Reply hazy try again",
    "Ask again later",
    "Better not tell you now",
    "Concentrate and ask again",
    "Don't count on it",
    "My reply is no",
    "My sources say no",
    "Outlook not so good",
    "Very doubtful",
    "Ask Anton",
    "Visit Cork, I hear its lovely this time of year!",
];

/// Application id/secret pair registered with Workspace.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub api_url: String,
    pub credentials: Credentials,
    pub webhook_secret: String,
    pub http_timeout: Duration,
    pub trigger: String,
    pub responses: Vec<String>,
    /// Stop serving once the token endpoint rejects our credentials.
    pub halt_on_auth_failure: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("api_url", &self.api_url)
            .field("credentials", &self.credentials)
            .field("http_timeout", &self.http_timeout)
            .field("trigger", &self.trigger)
            .field("responses", &self.responses.len())
            .field("halt_on_auth_failure", &self.halt_on_auth_failure)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup so tests stay off the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };

        let client_id = required("NEWRELIC_CLIENT_ID")?;
        let client_secret = required("NEWRELIC_CLIENT_SECRET")?;
        let webhook_secret = required("NEWRELIC_WEBHOOK_SECRET")?;

        let host: IpAddr = parse_or(&lookup, "BIND_HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let timeout_secs: u64 = parse_or(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "HTTP_TIMEOUT_SECS",
                reason: "must be greater than zero".into(),
            });
        }
        let halt_on_auth_failure = parse_or(&lookup, "HALT_ON_AUTH_FAILURE", true)?;

        let api_url = lookup("WORKSPACE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();
        let trigger = lookup("TRIGGER_KEYWORD")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_TRIGGER.into());

        Ok(Self {
            bind_address: SocketAddr::new(host, port),
            api_url,
            credentials: Credentials {
                client_id,
                client_secret,
            },
            webhook_secret,
            http_timeout: Duration::from_secs(timeout_secs),
            trigger,
            responses: DEFAULT_RESPONSES.iter().map(|s| s.to_string()).collect(),
            halt_on_auth_failure,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}
