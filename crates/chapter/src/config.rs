//! Runtime options for chapter containers.
//!
//! Options can be loaded from environment variables or constructed in code.
//! They cover the fallback language, the interaction type reported for the
//! aggregate, how long completion reports are deferred and how activity ids
//! are formed.

use std::env;

use content::{ContentId, InteractionType};
use log::warn;

/// Frames between the last child finishing and the aggregate completion
/// report.
pub const DEFAULT_COMPLETION_DELAY_FRAMES: usize = 2;

/// Options shared by every chapter built from one [`Host`](crate::Host).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChapterOptions {
    /// Language used when content metadata names none
    pub default_language: String,
    /// Interaction type reported in the chapter's statement definition
    pub interaction_type: InteractionType,
    /// Frame yield points before the completion report is emitted (minimum 1)
    pub completion_delay_frames: usize,
    /// Base activity id; `urn:content:<id>` when unset
    pub content_url: Option<String>,
}

impl Default for ChapterOptions {
    fn default() -> Self {
        Self::new("en", InteractionType::Compound, DEFAULT_COMPLETION_DELAY_FRAMES)
    }
}

impl ChapterOptions {
    /// Construct options with explicit values.
    ///
    /// # Arguments
    ///
    /// * `default_language` - Fallback language tag
    /// * `interaction_type` - Interaction type of the aggregate statement
    /// * `completion_delay_frames` - Deferral of the completion report (minimum 1)
    #[must_use]
    pub fn new(
        default_language: &str,
        interaction_type: InteractionType,
        completion_delay_frames: usize,
    ) -> Self {
        Self {
            default_language: default_language.to_owned(),
            interaction_type,
            completion_delay_frames: completion_delay_frames.max(1),
            content_url: None,
        }
    }

    /// Load options from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `CHAPTER_DEFAULT_LANGUAGE`: Fallback language (default: `en`)
    /// - `CHAPTER_INTERACTION_TYPE`: `compound` or `other` (default: `compound`)
    /// - `CHAPTER_COMPLETION_DELAY_FRAMES`: Completion deferral in frames (default: 2)
    /// - `CHAPTER_CONTENT_URL`: Base activity id (default: unset)
    #[must_use]
    pub fn from_env() -> Self {
        let default_language = env::var("CHAPTER_DEFAULT_LANGUAGE")
            .ok()
            .filter(|lang| !lang.trim().is_empty())
            .unwrap_or_else(|| "en".to_owned());
        let interaction_type = env::var("CHAPTER_INTERACTION_TYPE")
            .ok()
            .and_then(|raw| {
                raw.parse::<InteractionType>()
                    .map_err(|err| {
                        warn!(target: "chapter", "ignoring CHAPTER_INTERACTION_TYPE: {err}");
                    })
                    .ok()
            })
            .unwrap_or_default();
        let completion_delay_frames = env::var("CHAPTER_COMPLETION_DELAY_FRAMES")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(DEFAULT_COMPLETION_DELAY_FRAMES)
            .max(1);
        let content_url = env::var("CHAPTER_CONTENT_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        Self {
            default_language,
            interaction_type,
            completion_delay_frames,
            content_url,
        }
    }

    #[must_use]
    pub fn with_content_url(mut self, url: &str) -> Self {
        self.content_url = Some(url.to_owned());
        self
    }

    /// Activity id for a content item, optionally narrowed to a sub-content.
    pub fn activity_id(&self, content_id: ContentId, sub_content_id: Option<&str>) -> String {
        let base = self
            .content_url
            .clone()
            .unwrap_or_else(|| format!("urn:content:{content_id}"));
        match sub_content_id {
            Some(sub) => format!("{base}?subContentId={sub}"),
            None => base,
        }
    }
}
