//! Serialized chapter parameters, extras and persisted state.

use content::ContentDefinition;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level parameter document: `{ "chapter": { "contents": [...] } }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterParams {
    #[serde(default)]
    pub chapter: ChapterConfig,
}

/// Ordered child slots of a chapter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterConfig {
    #[serde(default)]
    pub contents: Vec<ChildSpec>,
}

impl ChapterConfig {
    /// Guarantee at least one slot by padding with an empty placeholder.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.contents.is_empty() {
            self.contents.push(ChildSpec::default());
        }
        self
    }
}

/// One slot; no `content` means an empty slot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ContentDefinition>,
}

impl ChildSpec {
    pub fn with_content(content: ContentDefinition) -> Self {
        Self {
            content: Some(content),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub default_language: Option<String>,
}

/// Host-provided context for one chapter instance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extras {
    #[serde(default)]
    pub previous_state: Option<PersistedState>,
    #[serde(default)]
    pub metadata: Metadata,
    /// Top-level content, as opposed to a unit nested in another container.
    #[serde(default)]
    pub is_root: bool,
    #[serde(default)]
    pub sub_content_id: Option<String>,
}

/// Durable state layout: one opaque entry per child, in child order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub children: Vec<Value>,
}
