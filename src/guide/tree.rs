use crate::types::TreeStep;

/// Spaces per nesting level in outline text.
pub(crate) const INDENT_WIDTH: usize = 2;

/// Parse an indentation-based outline into steps, skipping blank lines.
/// Line indices are kept from the original text so ids stay stable.
pub(crate) fn parse(source: &str) -> Vec<TreeStep> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let text = line.trim();
            if text.is_empty() {
                return None;
            }
            let indentation = line.chars().take_while(|c| c.is_whitespace()).count();
            Some(TreeStep {
                id: step_key(index, text),
                text: text.to_string(),
                level: indentation / INDENT_WIDTH,
            })
        })
        .collect()
}

/// Deterministic key for an outline line: `"<index>-<trimmed text>"`.
pub(crate) fn step_key(index: usize, text: &str) -> String {
    format!("{index}-{text}")
}
