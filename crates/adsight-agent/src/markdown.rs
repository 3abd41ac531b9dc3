//! Defensive cleanup for language-model output.

/// Strips a surrounding markdown code fence, if present.
///
/// Models regularly wrap JSON answers in ```` ```json ... ``` ```` despite
/// being told not to. The opening fence line (including any language tag)
/// and a trailing fence line are removed; anything else passes through
/// trimmed.
pub(crate) fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    lines.remove(0);
    if lines.last().is_some_and(|l| l.trim() == "```") {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}
