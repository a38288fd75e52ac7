//! Best-effort extraction of a JSON field from free-form model output.
//!
//! Models asked for `{"text": "..."}` routinely wrap the object in code
//! fences or chatter, or answer with Python-style single quotes. Nothing in
//! here fails: anything unreadable becomes an empty string.

use serde_json::Value;

use super::prompts;

/// Pull the string stored under `field` out of the first JSON object
/// embedded in `raw`. Returns `""` when no such string can be recovered.
pub fn extract_text(raw: &str, field: &str) -> String {
    let cleaned = strip_noise(raw);
    let Some(candidate) = first_object(&cleaned) else {
        tracing::debug!(raw_len = raw.len(), "model output holds no JSON object");
        return String::new();
    };

    let value = serde_json::from_str::<Value>(candidate)
        .or_else(|_| serde_json::from_str::<Value>(&requote(candidate)));

    match value {
        Ok(Value::Object(map)) => match map.get(field) {
            Some(Value::String(text)) => text.clone(),
            _ => String::new(),
        },
        Ok(_) => String::new(),
        Err(e) => {
            tracing::debug!(error = %e, "model output is not recoverable JSON");
            String::new()
        }
    }
}

/// Drop code fences, an echoed reply instruction and a leading `json`.
fn strip_noise(raw: &str) -> String {
    let mut text = raw.replace("```json", "").replace("```JSON", "");
    text = text.replace("```", "");
    for phrase in [prompts::JSON_REPLY, prompts::REPLY_SHAPE] {
        text = text.replace(phrase, "");
    }

    let trimmed = text.trim_start();
    match trimmed.get(..4) {
        Some(word) if word.eq_ignore_ascii_case("json") => trimmed[4..].to_string(),
        _ => trimmed.to_string(),
    }
}

/// The first balanced `{...}` span. Braces inside double- or single-quoted
/// strings do not count. Falls back to everything from the first `{` when
/// the object never closes, so the caller still gets a parse attempt.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let chars: Vec<(usize, char)> = text[start..].char_indices().collect();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        match quote {
            Some(q) => {
                if c == '\\' {
                    i += 1;
                } else if c == q
                    && (q == '"' || closes_string(chars[i + 1..].iter().map(|(_, c)| c)))
                {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=start + offset]);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    Some(&text[start..])
}

/// Rewrite single-quoted strings as double-quoted ones.
///
/// A `'` inside a single-quoted string only closes it when the next
/// non-whitespace character is `:`, `,`, `}`, `]` or the end of input, so
/// apostrophes in prose survive.
fn requote(text: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Outside,
        Double,
        Single,
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut state = State::Outside;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match state {
            State::Outside => {
                match c {
                    '\'' => {
                        state = State::Single;
                        out.push('"');
                    }
                    '"' => {
                        state = State::Double;
                        out.push('"');
                    }
                    _ => out.push(c),
                }
            }
            State::Double => {
                out.push(c);
                if c == '\\' {
                    if let Some(&next) = chars.get(i + 1) {
                        out.push(next);
                        i += 1;
                    }
                } else if c == '"' {
                    state = State::Outside;
                }
            }
            State::Single => match c {
                '\\' => match chars.get(i + 1) {
                    Some('\'') => {
                        out.push('\'');
                        i += 1;
                    }
                    Some(&next) => {
                        out.push('\\');
                        out.push(next);
                        i += 1;
                    }
                    None => out.push('\\'),
                },
                '"' => out.push_str("\\\""),
                '\'' if closes_string(chars[i + 1..].iter()) => {
                    state = State::Outside;
                    out.push('"');
                }
                _ => out.push(c),
            },
        }
        i += 1;
    }

    out
}

fn closes_string<'a>(mut rest: impl Iterator<Item = &'a char>) -> bool {
    match rest.find(|c| !c.is_whitespace()) {
        None => true,
        Some(c) => matches!(c, ':' | ',' | '}' | ']'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        assert_eq!(extract_text(r#"{"text": "hello"}"#, "text"), "hello");
    }

    #[test]
    fn test_fenced_json_with_chatter() {
        let raw = "Sure! Here is the result:\n```json\n{\"text\": \"Bonjour le monde\"}\n```\nEnjoy.";
        assert_eq!(extract_text(raw, "text"), "Bonjour le monde");
    }

    #[test]
    fn test_leading_json_word() {
        assert_eq!(extract_text("json {\"text\": \"x\"}", "text"), "x");
    }

    #[test]
    fn test_single_quoted_object() {
        let raw = "{'text': 'It's a fine day, isn't it?'}";
        assert_eq!(extract_text(raw, "text"), "It's a fine day, isn't it?");
    }

    #[test]
    fn test_escaped_single_quote_and_inner_double_quote() {
        let raw = r#"{'text': 'She said \'hi\' and "bye"'}"#;
        assert_eq!(extract_text(raw, "text"), r#"She said 'hi' and "bye""#);
    }

    #[test]
    fn test_first_object_wins_over_trailing_braces() {
        let raw = "{\"text\": \"Bonjour\"} Note: I kept the {name} placeholder.";
        assert_eq!(extract_text(raw, "text"), "Bonjour");

        let raw = "{\"text\": \"first\"}\n{\"text\": \"second\"}";
        assert_eq!(extract_text(raw, "text"), "first");
    }

    #[test]
    fn test_braces_inside_strings_do_not_close_the_object() {
        let raw = r#"{"text": "Use {name} and } freely"} trailing }"#;
        assert_eq!(extract_text(raw, "text"), "Use {name} and } freely");

        let raw = "{'text': 'Set {x} to 1, it's fine'} then }";
        assert_eq!(extract_text(raw, "text"), "Set {x} to 1, it's fine");
    }

    #[test]
    fn test_echoed_reply_instruction_is_ignored() {
        let raw = format!(
            "{}\n```json\n{{\"text\": \"Le port dormait.\"}}\n```",
            prompts::JSON_REPLY
        );
        assert_eq!(extract_text(&raw, "text"), "Le port dormait.");

        let raw = "Sure, here it is in the shape {\"text\": \"...\"}: {\"text\": \"Done.\"}";
        assert_eq!(extract_text(raw, "text"), "Done.");
    }

    #[test]
    fn test_unrecoverable_yields_empty() {
        assert_eq!(extract_text("no json at all", "text"), "");
        assert_eq!(extract_text("{not: valid", "text"), "");
        assert_eq!(extract_text("{\"other\": \"x\"}", "text"), "");
        assert_eq!(extract_text("{\"text\": 42}", "text"), "");
        assert_eq!(extract_text("", "text"), "");
    }
}
