use serde_json::Value;

use crate::protocol::Turn;

/// Shown when the response parsed but held no usable reply.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't understand the response.";
/// Shown when the request or decode failed for any reason.
pub const FETCH_ERROR_REPLY: &str = "Error: Could not fetch response.";

/// Picks the bot reply out of a `/run` response.
///
/// Priority order matters and is not commutative:
/// 1. the last turn's first part, when it carries a string `text`;
/// 2. otherwise the first turn (scanning from the front) whose first part
///    carries a `functionResponse` with a non-empty `response.result`;
/// 3. otherwise [`FALLBACK_REPLY`].
pub fn extract_reply(turns: &[Turn]) -> String {
    if let Some(text) = last_turn_text(turns) {
        return text.to_string();
    }

    if let Some(result) = turns.iter().find_map(function_result) {
        return result;
    }

    tracing::warn!(
        turn_count = turns.len(),
        "agent response carried neither text nor a function result"
    );
    FALLBACK_REPLY.to_string()
}

fn last_turn_text(turns: &[Turn]) -> Option<&str> {
    turns.last()?.first_part()?.text.as_deref()
}

fn function_result(turn: &Turn) -> Option<String> {
    let result = turn.first_part()?.function_response.as_ref()?.result()?;
    match result {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            Some(result.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::protocol::decode_turns;

    fn reply_for(body: Value) -> String {
        let turns = decode_turns(body.to_string().as_bytes()).unwrap();
        extract_reply(&turns)
    }

    #[test]
    fn trailing_text_turn_is_the_reply() {
        assert_eq!(
            reply_for(json!([{ "content": { "parts": [{ "text": "hi" }] } }])),
            "hi"
        );
    }

    #[test]
    fn function_result_is_used_without_trailing_text() {
        assert_eq!(
            reply_for(json!([{
                "content": { "parts": [{ "functionResponse": { "response": { "result": "42" } } }] }
            }])),
            "42"
        );
    }

    #[test]
    fn empty_shapes_fall_back() {
        assert_eq!(reply_for(json!([{}])), FALLBACK_REPLY);
        assert_eq!(reply_for(json!([])), FALLBACK_REPLY);
        assert_eq!(
            reply_for(json!([{ "content": { "parts": [] } }])),
            FALLBACK_REPLY
        );
    }

    #[test]
    fn trailing_text_beats_earlier_function_result() {
        assert_eq!(
            reply_for(json!([
                { "content": { "parts": [{ "functionCall": { "name": "chatpdf" } }] } },
                { "content": { "parts": [{ "functionResponse": { "response": { "result": "tool says 42" } } }] } },
                { "content": { "parts": [{ "text": "The answer is 42." }] } }
            ])),
            "The answer is 42."
        );
    }

    #[test]
    fn text_in_a_non_final_turn_is_ignored() {
        assert_eq!(
            reply_for(json!([
                { "content": { "parts": [{ "text": "thinking..." }] } },
                { "content": { "parts": [{ "functionResponse": { "response": { "result": "from tool" } } }] } }
            ])),
            "from tool"
        );
        assert_eq!(
            reply_for(json!([
                { "content": { "parts": [{ "text": "thinking..." }] } },
                {}
            ])),
            FALLBACK_REPLY
        );
    }

    #[test]
    fn first_matching_function_result_wins() {
        assert_eq!(
            reply_for(json!([
                { "content": { "parts": [{ "functionResponse": { "response": {} } }] } },
                { "content": { "parts": [{ "functionResponse": { "response": { "result": "first" } } }] } },
                { "content": { "parts": [{ "functionResponse": { "response": { "result": "second" } } }] } }
            ])),
            "first"
        );
    }

    #[test]
    fn only_the_first_part_is_inspected() {
        assert_eq!(
            reply_for(json!([{
                "content": { "parts": [{ "inlineData": {} }, { "text": "hidden" }] }
            }])),
            FALLBACK_REPLY
        );
    }

    #[test]
    fn non_string_results_render_as_json() {
        assert_eq!(
            reply_for(json!([{
                "content": { "parts": [{ "functionResponse": { "response": { "result": 42 } } }] }
            }])),
            "42"
        );
        assert_eq!(
            reply_for(json!([{
                "content": { "parts": [{ "functionResponse": { "response": { "result": { "pages": [3, 4] } } } }] }
            }])),
            r#"{"pages":[3,4]}"#
        );
        assert_eq!(
            reply_for(json!([{
                "content": { "parts": [{ "functionResponse": { "response": { "result": "" } } }] }
            }])),
            FALLBACK_REPLY
        );
    }

    #[test]
    fn empty_trailing_text_is_still_a_reply() {
        assert_eq!(
            reply_for(json!([
                { "content": { "parts": [{ "functionResponse": { "response": { "result": "tool" } } }] } },
                { "content": { "parts": [{ "text": "" }] } }
            ])),
            ""
        );
    }
}
