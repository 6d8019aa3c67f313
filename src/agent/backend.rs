use std::fs;
use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::agent::prompts::{
    FORMAT_TREE_SYSTEM_PROMPT, GUIDE_SYSTEM_PROMPT, TEXT_GUIDE_SYSTEM_PROMPT, parse_guide_reply,
    parse_tree_reply,
};
use crate::agent::provider::{Message, ProviderSettings, build_http_client, chat};
use crate::config::Config;
use crate::types::GuideData;

/// The generative-model collaborator. Empty results are returned as-is; the
/// pipeline decides what an empty guide or tree means.
pub(crate) trait GuideBackend: Send + Sync {
    /// Array form: `{guide, errors}`.
    fn generate_guide(&self, request: &str) -> impl Future<Output = Result<GuideData>> + Send;

    /// Free-text guide, first stage of the tree pipeline.
    fn generate_text(&self, request: &str) -> impl Future<Output = Result<String>> + Send;

    /// Second stage of the tree pipeline: linearized guide to outline text.
    fn format_tree(&self, guide: &str) -> impl Future<Output = Result<String>> + Send;
}

// ── HTTP model backend ────────────────────────────────────────────────────────

#[derive(Clone)]
pub(crate) struct LlmBackend {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl LlmBackend {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self {
            client: build_http_client(cfg)?,
            settings: ProviderSettings::from_config(cfg)?,
        })
    }

    async fn ask(&self, system: &str, user: &str) -> Result<String> {
        chat(
            &self.client,
            &self.settings,
            &[Message::system(system), Message::user(user)],
        )
        .await
    }
}

impl GuideBackend for LlmBackend {
    async fn generate_guide(&self, request: &str) -> Result<GuideData> {
        let reply = self.ask(GUIDE_SYSTEM_PROMPT, request).await?;
        if reply.trim().is_empty() {
            return Ok(GuideData::Steps {
                guide: Vec::new(),
                errors: Vec::new(),
            });
        }
        parse_guide_reply(&reply)
    }

    async fn generate_text(&self, request: &str) -> Result<String> {
        self.ask(TEXT_GUIDE_SYSTEM_PROMPT, request).await
    }

    async fn format_tree(&self, guide: &str) -> Result<String> {
        let reply = self
            .ask(FORMAT_TREE_SYSTEM_PROMPT, &format!("Guide:\n{guide}"))
            .await?;
        Ok(parse_tree_reply(&reply))
    }
}

// ── Fixture backend ───────────────────────────────────────────────────────────

/// Serves one fixed guide regardless of the request.
#[derive(Debug, Clone)]
pub(crate) struct FixtureBackend {
    data: GuideData,
}

impl FixtureBackend {
    pub fn new(data: GuideData) -> Self {
        Self { data }
    }

    /// Load `{guide, errors}` or `{tree}` JSON from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text =
            fs::read_to_string(path).with_context(|| format!("read fixture {}", path.display()))?;
        let data: GuideData = serde_json::from_str(&text)
            .with_context(|| format!("parse fixture {}", path.display()))?;
        Ok(Self::new(data))
    }
}

impl GuideBackend for FixtureBackend {
    async fn generate_guide(&self, _request: &str) -> Result<GuideData> {
        match &self.data {
            GuideData::Steps { .. } => Ok(self.data.clone()),
            GuideData::Tree { .. } => Err(anyhow!("fixture holds a tree, not a step list")),
        }
    }

    async fn generate_text(&self, _request: &str) -> Result<String> {
        Ok(match &self.data {
            GuideData::Tree { tree } => tree.clone(),
            GuideData::Steps { guide, .. } => guide
                .iter()
                .enumerate()
                .map(|(i, s)| format!("{}. {}\n{}", i + 1, s.step, s.details))
                .collect::<Vec<_>>()
                .join("\n"),
        })
    }

    /// Tree fixtures come back verbatim; step fixtures become a flat outline
    /// with each step's details indented one level.
    async fn format_tree(&self, _guide: &str) -> Result<String> {
        Ok(match &self.data {
            GuideData::Tree { tree } => tree.clone(),
            GuideData::Steps { guide, .. } => guide
                .iter()
                .flat_map(|s| {
                    std::iter::once(s.step.clone()).chain(
                        s.details
                            .lines()
                            .filter(|l| !l.trim().is_empty())
                            .map(|l| format!("  {}", l.trim())),
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        })
    }
}

// ── Runtime selection ─────────────────────────────────────────────────────────

pub(crate) enum AnyBackend {
    Llm(LlmBackend),
    Fixture(FixtureBackend),
}

impl GuideBackend for AnyBackend {
    async fn generate_guide(&self, request: &str) -> Result<GuideData> {
        match self {
            Self::Llm(b) => b.generate_guide(request).await,
            Self::Fixture(b) => b.generate_guide(request).await,
        }
    }

    async fn generate_text(&self, request: &str) -> Result<String> {
        match self {
            Self::Llm(b) => b.generate_text(request).await,
            Self::Fixture(b) => b.generate_text(request).await,
        }
    }

    async fn format_tree(&self, guide: &str) -> Result<String> {
        match self {
            Self::Llm(b) => b.format_tree(guide).await,
            Self::Fixture(b) => b.format_tree(guide).await,
        }
    }
}
