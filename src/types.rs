use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const OPEN_COLOR: &str = "#CC0000";
pub const CLOSED_COLOR: &str = "#32CD32";
pub const DEFAULT_COLOR: &str = "#1DA1F2";

/// Display severity of an outbound annotation, derived from an alert state tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Open,
    Closed,
    Neutral,
}

impl Severity {
    pub fn from_state(state: Option<&str>) -> Self {
        match state {
            Some("open") => Severity::Open,
            Some("closed") => Severity::Closed,
            _ => Severity::Neutral,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Severity::Open => OPEN_COLOR,
            Severity::Closed => CLOSED_COLOR,
            Severity::Neutral => DEFAULT_COLOR,
        }
    }
}

/// A message bound for a Workspace space. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub space_id: String,
    pub title: String,
    pub text: String,
    pub severity: Severity,
}

impl OutboundMessage {
    pub fn new(
        space_id: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
        state: Option<&str>,
    ) -> Self {
        Self {
            space_id: space_id.into(),
            title: title.into(),
            text: text.into(),
            severity: Severity::from_state(state),
        }
    }

    /// The annotated `appMessage` body posted to `/v1/spaces/{id}/messages`.
    pub fn to_app_message(&self) -> AppMessage<'_> {
        AppMessage {
            kind: "appMessage",
            version: 1.0,
            annotations: vec![Annotation {
                kind: "generic",
                version: 1.0,
                color: self.severity.color(),
                title: &self.title,
                text: &self.text,
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AppMessage<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub version: f64,
    pub annotations: Vec<Annotation<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Annotation<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub version: f64,
    pub color: &'static str,
    pub title: &'a str,
    pub text: &'a str,
}

/// A `message-created` event that made it past dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub space_id: String,
    pub content: String,
}

/// Body of `POST /alert/{space_id}` as sent by the alerting source.
///
/// Scalar fields are accepted as strings or numbers (`incident_id` is numeric
/// in practice) and rendered as text; absent or null fields render empty.
/// `targets` may be null, a list of objects, or a list of bare names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlertPayload {
    #[serde(deserialize_with = "lenient_opt_string")]
    pub current_state: Option<String>,
    #[serde(deserialize_with = "lenient_targets")]
    pub targets: Vec<AlertTarget>,
    #[serde(deserialize_with = "lenient_string")]
    pub condition_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub details: String,
    #[serde(deserialize_with = "lenient_string")]
    pub incident_id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub incident_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct AlertTarget {
    pub name: String,
}

fn render(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(render)
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(render(other)),
    })
}

fn lenient_targets<'de, D>(deserializer: D) -> Result<Vec<AlertTarget>, D::Error>
where
    D: Deserializer<'de>,
{
    let target = |value: Value| AlertTarget {
        name: match value {
            Value::Object(mut fields) => fields.remove("name").map(render).unwrap_or_default(),
            other => render(other),
        },
    };

    Ok(match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(target).collect(),
        single => vec![target(single)],
    })
}

impl AlertPayload {
    pub fn title(&self) -> String {
        let state = self.current_state.as_deref().unwrap_or("");
        match self.targets.first() {
            Some(target) => format!("Incident {state} {} {}", target.name, self.condition_name),
            None => format!("Incident {state} {}", self.condition_name),
        }
    }

    pub fn text(&self) -> String {
        format!(
            "{}\nLink: [Incident {}]({})",
            self.details, self.incident_id, self.incident_url
        )
    }

    pub fn into_message(self, space_id: impl Into<String>) -> OutboundMessage {
        OutboundMessage::new(space_id, self.title(), self.text(), self.current_state.as_deref())
    }
}

/// Body returned to a verification handshake.
#[derive(Debug, Serialize)]
pub struct VerificationResponse<'a> {
    pub response: &'a str,
}
