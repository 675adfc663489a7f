//! Wire types for the agent-serving HTTP API.
//!
//! Request types are strict. Response types are lenient below the top-level
//! array: a field holding the wrong JSON type reads as absent instead of
//! failing the whole decode, so extraction can fall through its tiers.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::identity::Identity;

pub const USER_ROLE: &str = "user";

/// Body of the session-create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSessionRequest {
    pub state: SessionStatePayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatePayload {
    pub started_at: String,
}

impl CreateSessionRequest {
    pub fn started_at(now: DateTime<Utc>) -> Self {
        Self {
            state: SessionStatePayload {
                started_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        }
    }

    pub fn now() -> Self {
        Self::started_at(Utc::now())
    }
}

/// Outgoing message part. Only text is ever sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<TextPart>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: USER_ROLE.to_string(),
            parts: vec![TextPart { text: text.into() }],
        }
    }
}

/// Body of the `/run` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
    pub new_message: Content,
}

impl RunRequest {
    pub fn new(app_name: impl Into<String>, identity: &Identity, text: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: identity.user_id.as_str().to_string(),
            session_id: identity.session_id.as_str().to_string(),
            new_message: Content::user_text(text),
        }
    }
}

/// One element of the `/run` response array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Turn {
    #[serde(default, deserialize_with = "lenient")]
    pub content: Option<TurnContent>,
}

impl Turn {
    /// Decodes one turn, treating a non-object value as an empty turn.
    pub fn from_value(value: Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    /// First part of the turn's content, when there is one.
    pub fn first_part(&self) -> Option<&Part> {
        self.content
            .as_ref()
            .and_then(|content| content.parts.as_ref())
            .and_then(|parts| parts.first())
            .and_then(Option::as_ref)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TurnContent {
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub parts: Option<Vec<Option<Part>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Part {
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(
        default,
        rename = "functionResponse",
        deserialize_with = "lenient"
    )]
    pub function_response: Option<FunctionResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FunctionResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default)]
    pub response: Option<Value>,
}

impl FunctionResponse {
    /// `response.result`, if the tool produced one.
    pub fn result(&self) -> Option<&Value> {
        self.response.as_ref().and_then(|response| response.get("result"))
    }
}

/// Decodes the full `/run` body. Anything but a JSON array is rejected.
pub fn decode_turns(body: &[u8]) -> Result<Vec<Turn>, serde_json::Error> {
    let items: Vec<Value> = serde_json::from_slice(body)?;
    Ok(items.into_iter().map(Turn::from_value).collect())
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<Option<T>>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn run_request_uses_camel_case_envelope() {
        let identity = Identity::new("u_abc", "s_def");
        let request = RunRequest::new("pdfchat", &identity, "what is chapter 2 about?");

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "appName": "pdfchat",
                "userId": "u_abc",
                "sessionId": "s_def",
                "newMessage": {
                    "role": "user",
                    "parts": [{ "text": "what is chapter 2 about?" }]
                }
            })
        );
    }

    #[test]
    fn session_request_records_iso8601_start() {
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 8, 30, 0).unwrap();
        let request = CreateSessionRequest::started_at(now);

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "state": { "started_at": "2026-10-16T08:30:00.000Z" } })
        );
    }

    #[test]
    fn wrongly_typed_fields_read_as_absent() {
        let turns = decode_turns(
            br#"[
                {"content": {"parts": [{"text": 5}]}},
                {"content": {"parts": [null, {"text": "second"}]}},
                {"content": {"parts": "not-a-list"}},
                {"content": "flat"},
                "bare string",
                null
            ]"#,
        )
        .unwrap();

        assert_eq!(turns.len(), 6);
        assert_eq!(turns[0].first_part().and_then(|p| p.text.clone()), None);
        assert!(turns[0].first_part().is_some());
        assert!(turns[1].first_part().is_none());
        assert!(turns[2].first_part().is_none());
        assert_eq!(turns[3], Turn::default());
        assert_eq!(turns[4], Turn::default());
        assert_eq!(turns[5], Turn::default());
    }

    #[test]
    fn function_response_result_is_reachable() {
        let turns = decode_turns(
            br#"[{"content": {"role": "user", "parts": [{"functionResponse": {"name": "chatpdf", "response": {"result": "42"}}}]}}]"#,
        )
        .unwrap();

        let part = turns[0].first_part().unwrap();
        let function_response = part.function_response.as_ref().unwrap();
        assert_eq!(function_response.name.as_deref(), Some("chatpdf"));
        assert_eq!(function_response.result(), Some(&json!("42")));
    }

    #[test]
    fn non_array_body_is_a_decode_error() {
        assert!(decode_turns(br#"{"content": {}}"#).is_err());
        assert!(decode_turns(b"<html>bad gateway</html>").is_err());
        assert!(decode_turns(b"[]").unwrap().is_empty());
    }
}
