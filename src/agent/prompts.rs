use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::Deserialize;

use crate::types::{GuideData, GuideStep, PotentialError};

pub(crate) const GUIDE_SYSTEM_PROMPT: &str = "\
You are an expert DevOps engineer. Generate a step-by-step guide for the task the user describes.

Reply with a single JSON object and nothing else:
{\"guide\":[{\"step\":\"short title\",\"details\":\"actionable instructions\"}],\
\"errors\":[{\"error\":\"what can go wrong\",\"solution\":\"how to fix it\"}]}

Formatting rules for `details` and `solution`:
- Wrap commands and file names in single backticks, e.g. `kubectl get pods`.
- Put multi-line code or config in triple backticks.
- Write UI navigation paths in bold with `>` separators, e.g. **Settings > Billing > Budgets**.
- Use lines starting with \"- \" for lists.
Each step should include actionable instructions.";

pub(crate) const TEXT_GUIDE_SYSTEM_PROMPT: &str = "\
You are an expert DevOps engineer. Generate a step-by-step guide for the task the user describes.
Format the guide in a clear and concise manner. Each step should include actionable instructions.";

pub(crate) const FORMAT_TREE_SYSTEM_PROMPT: &str = "\
You are a DevOps expert. Take the guide the user sends and format it as a tree, using indentation to show the hierarchy.
Rules:
- One step per line.
- Indent exactly two spaces per nesting level; no tabs, no bullets or numbering glyphs.
- Reply with the tree only.";

static FENCED_REPLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$").expect("valid regex")
});

#[derive(Deserialize)]
struct GuideReply {
    #[serde(default)]
    guide: Vec<GuideStep>,
    #[serde(default)]
    errors: Vec<PotentialError>,
}

#[derive(Deserialize)]
struct TreeReply {
    tree: String,
}

/// Parse a guide reply. Tolerates a ```json fence and prose around the object.
pub(crate) fn parse_guide_reply(reply: &str) -> Result<GuideData> {
    let body = strip_fence(reply);
    let json = extract_json_object(body).ok_or_else(|| anyhow!("reply has no JSON object"))?;
    let parsed: GuideReply = serde_json::from_str(json).context("invalid guide JSON")?;
    Ok(GuideData::Steps {
        guide: parsed.guide,
        errors: parsed.errors,
    })
}

/// Parse a tree reply: either `{"tree": "..."}` or the outline itself.
pub(crate) fn parse_tree_reply(reply: &str) -> String {
    let body = strip_fence(reply);
    if let Some(json) = extract_json_object(body) {
        if let Ok(parsed) = serde_json::from_str::<TreeReply>(json) {
            return parsed.tree;
        }
    }
    body.trim_matches(|c| c == '\n' || c == '\r').trim_end().to_string()
}

fn strip_fence(reply: &str) -> &str {
    FENCED_REPLY
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map_or(reply, |m| m.as_str())
}

fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::{parse_guide_reply, parse_tree_reply};
    use crate::types::GuideData;

    #[test]
    fn guide_reply_inside_json_fence() {
        let reply = "```json\n{\"guide\":[{\"step\":\"A\",\"details\":\"Run `x`\"}],\"errors\":[]}\n```";
        match parse_guide_reply(reply).expect("parse") {
            GuideData::Steps { guide, errors } => {
                assert_eq!(guide[0].step, "A");
                assert_eq!(guide[0].details, "Run `x`");
                assert!(errors.is_empty());
            }
            GuideData::Tree { .. } => panic!("expected steps"),
        }
    }

    #[test]
    fn guide_reply_with_surrounding_prose() {
        let reply = "Sure! {\"guide\":[{\"step\":\"A\",\"details\":\"b\"}]} Hope it helps.";
        assert!(!parse_guide_reply(reply).expect("parse").is_empty());
    }

    #[test]
    fn guide_reply_without_object_fails() {
        assert!(parse_guide_reply("I cannot help with that.").is_err());
    }

    #[test]
    fn empty_guide_reply_parses_to_empty_data() {
        assert!(parse_guide_reply("{}").expect("parse").is_empty());
    }

    #[test]
    fn tree_reply_plain_and_json() {
        assert_eq!(parse_tree_reply("\nRoot\n  Child\n"), "Root\n  Child");
        assert_eq!(parse_tree_reply("{\"tree\":\"a\\n  b\"}"), "a\n  b");
        assert_eq!(parse_tree_reply("```\nRoot\n  Child\n```"), "Root\n  Child");
    }
}
