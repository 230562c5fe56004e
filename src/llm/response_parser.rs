//! JSON extraction from model replies that may wrap the payload in code fences
//! or surround it with prose.

use serde::de::DeserializeOwned;

/// Parse `T` from a reply. Tried in order: the whole trimmed text, a ```json
/// block, any fenced block, and finally the first JSON object in the text.
pub fn parse_json<T: DeserializeOwned>(content: &str) -> anyhow::Result<T> {
    let trimmed = content.trim();
    let candidates = [
        Some(trimmed.to_string()),
        extract_fenced_block(trimmed, Some("json")),
        extract_fenced_block(trimmed, None),
        extract_first_json_object(trimmed),
    ];

    candidates
        .into_iter()
        .flatten()
        .find_map(|candidate| serde_json::from_str::<T>(&candidate).ok())
        .ok_or_else(|| anyhow::anyhow!("no valid JSON payload in model response"))
}

/// Contents of the first fenced block, optionally restricted to a language tag.
pub fn extract_fenced_block(content: &str, language: Option<&str>) -> Option<String> {
    const FENCE: &str = "```";
    let mut search = content;

    loop {
        let start = search.find(FENCE)?;
        let after_start = &search[start + FENCE.len()..];
        let line_end = after_start.find('\n')?;
        let tag = after_start[..line_end].trim();
        let rest = &after_start[line_end + 1..];

        if let Some(expected) = language {
            if !tag.eq_ignore_ascii_case(expected) {
                search = after_start;
                continue;
            }
        }

        let end = rest.find(FENCE)?;
        return Some(rest[..end].trim().to_string());
    }
}

/// Uses the streaming deserializer to find where a valid JSON object ends.
pub fn extract_first_json_object(content: &str) -> Option<String> {
    content.char_indices().find_map(|(idx, ch)| {
        if ch != '{' {
            return None;
        }
        let candidate = &content[idx..];
        let mut values =
            serde_json::Deserializer::from_str(candidate).into_iter::<serde_json::Value>();
        match values.next() {
            Some(Ok(_)) => Some(candidate[..values.byte_offset()].to_string()),
            _ => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Payload {
        valid: bool,
    }

    #[test]
    fn test_plain_json() {
        let parsed: Payload = parse_json(" {\"valid\": true} ").unwrap();
        assert_eq!(parsed, Payload { valid: true });
    }

    #[test]
    fn test_fenced_json() {
        let reply = "Here you go:\n```json\n{\"valid\": false}\n```\nThanks";
        let parsed: Payload = parse_json(reply).unwrap();
        assert_eq!(parsed, Payload { valid: false });
    }

    #[test]
    fn test_untagged_fence_and_prose() {
        let parsed: Payload = parse_json("```\n{\"valid\": true}\n```").unwrap();
        assert!(parsed.valid);
        let parsed: Payload = parse_json("The answer is {\"valid\": true} as shown.").unwrap();
        assert!(parsed.valid);
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(parse_json::<Payload>("no json here").is_err());
    }
}
