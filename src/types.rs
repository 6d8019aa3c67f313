use std::fmt;

use serde::{Deserialize, Serialize};

/// One actionable instruction. `details` may carry inline markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuideStep {
    pub step: String,
    pub details: String,
}

/// An anticipated failure mode and its remedy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotentialError {
    pub error: String,
    pub solution: String,
}

/// Raw guide data as received from the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GuideData {
    Steps {
        guide: Vec<GuideStep>,
        #[serde(default)]
        errors: Vec<PotentialError>,
    },
    Tree {
        tree: String,
    },
}

impl GuideData {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Steps { guide, .. } => guide.is_empty(),
            Self::Tree { tree } => tree.trim().is_empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GuideMode {
    #[default]
    Steps,
    Tree,
}

impl GuideMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Steps => "steps",
            Self::Tree => "tree",
        }
    }
}

/// A typed span of a segmented detail/solution string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentBlock {
    Text(String),
    InlineCode(String),
    CodeBlock(String),
    Bold(String),
    Breadcrumb(Vec<String>),
    BulletItem(String),
}

/// One line of an indented outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeStep {
    pub id: String,
    pub text: String,
    pub level: usize,
}

/// Identifier used to key completion state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepId {
    /// Position in a `GuideData::Steps` array.
    Index(usize),
    /// `TreeStep::id` of a parsed outline line.
    Line(String),
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Line(key) => f.write_str(key),
        }
    }
}

impl Serialize for StepId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Index(i) => serializer.serialize_u64(*i as u64),
            Self::Line(key) => serializer.serialize_str(key),
        }
    }
}
