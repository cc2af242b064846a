use regex::Regex;
use std::sync::OnceLock;

static OPENING_FENCE: OnceLock<Regex> = OnceLock::new();
static CLOSING_FENCE: OnceLock<Regex> = OnceLock::new();

fn opening_fence() -> &'static Regex {
    // ``` plus an optional language tag (json, JSON, jsonc, ...) and the rest of that line
    OPENING_FENCE.get_or_init(|| Regex::new(r"^```[A-Za-z0-9_+\-]*[ \t]*(?:\r?\n)?").unwrap())
}

fn closing_fence() -> &'static Regex {
    CLOSING_FENCE.get_or_init(|| Regex::new(r"(?:\r?\n)?[ \t]*```$").unwrap())
}

/// Strip markdown code fences from a model response.
/// Removes a leading fence with an optional language tag and a trailing fence.
/// Text with no fence at either end is returned unchanged, so applying this
/// twice gives the same result as applying it once.
pub fn strip_code_fences(content: &str) -> String {
    let trimmed = content.trim();
    if !trimmed.starts_with("```") && !trimmed.ends_with("```") {
        return content.to_string();
    }

    let mut inner = trimmed;
    if let Some(m) = opening_fence().find(inner) {
        inner = &inner[m.end()..];
    }
    if let Some(m) = closing_fence().find(inner) {
        inner = &inner[..m.start()];
    }
    inner.trim().to_string()
}

/// Cut `s` to at most `max` bytes on a char boundary, for error messages.
pub fn truncate_for_error(s: &str, max: usize) -> &str {
    if s.len() <= max {
        s
    } else {
        let mut i = max;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        &s[..i]
    }
}
