use core::fmt::{Display, Formatter, Result as FmtResult};
use core::str::FromStr;
use core::time::Duration;
use std::collections::BTreeMap;

use anyhow::{Error, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Language tag → text. Ordered so serialized statements are stable.
pub type LanguageMap = BTreeMap<String, String>;

pub const VERB_PREFIX: &str = "http://adlnet.gov/expapi/verbs/";
pub const ACTIVITY_TYPE_INTERACTION: &str = "http://adlnet.gov/expapi/activities/cmi.interaction";
pub const LOCAL_CONTENT_ID_EXTENSION: &str = "http://h5p.org/x-api/h5p-local-content-id";
pub const SUB_CONTENT_ID_EXTENSION: &str = "http://h5p.org/x-api/h5p-subContentId";
/// Language reporting backends fall back to.
pub const FALLBACK_LANGUAGE: &str = "en-US";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verb {
    pub id: String,
    #[serde(default)]
    pub display: LanguageMap,
}

impl Verb {
    /// A verb from the ADL vocabulary, e.g. `Verb::adl("answered")`.
    pub fn adl(short: &str) -> Self {
        let mut display = LanguageMap::new();
        display.insert(FALLBACK_LANGUAGE.to_owned(), short.to_owned());
        Self {
            id: format!("{VERB_PREFIX}{short}"),
            display,
        }
    }

    pub fn short_name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

/// Interaction type reported for aggregate content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    #[default]
    Compound,
    Other,
}

impl InteractionType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compound => "compound",
            Self::Other => "other",
        }
    }
}

impl Display for InteractionType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compound" => Ok(Self::Compound),
            "other" => Ok(Self::Other),
            unknown => Err(anyhow!("unknown interaction type '{unknown}'")),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub name: LanguageMap,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub description: LanguageMap,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<InteractionType>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub object_type: String,
    #[serde(default)]
    pub definition: Definition,
}

impl Activity {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            object_type: "Activity".to_owned(),
            definition: Definition::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub min: f64,
    pub max: f64,
    pub raw: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaled: Option<f64>,
}

impl Score {
    pub fn new(raw: f64, max: f64) -> Self {
        let scaled = (max > 0.0).then(|| (raw / max * 10_000.0).round() / 10_000.0);
        Self {
            min: 0.0,
            max,
            raw,
            scaled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    pub score: Score,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl ScoredResult {
    pub fn new(raw: f64, max: f64) -> Self {
        Self {
            score: Score::new(raw, max),
            completion: None,
            success: None,
            duration: None,
        }
    }

    #[must_use]
    pub fn with_completion(mut self, completion: bool) -> Self {
        self.completion = Some(completion);
        self
    }

    #[must_use]
    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration = Some(format_duration(elapsed));
        self
    }
}

/// ISO 8601 duration in seconds, rounded to hundredths (`PT12.34S`).
pub fn format_duration(elapsed: Duration) -> String {
    let seconds = (elapsed.as_secs_f64() * 100.0).round() / 100.0;
    format!("PT{seconds}S")
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub verb: Verb,
    pub object: Activity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ScoredResult>,
}

impl Statement {
    pub fn new(verb: Verb, object: Activity) -> Self {
        Self {
            verb,
            object,
            result: None,
        }
    }
}

/// Report tree returned by the reporting contract: the unit's own statement
/// followed by those of its children, in order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XapiData {
    pub statement: Statement,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XapiData>,
}

impl XapiData {
    pub fn leaf(statement: Statement) -> Self {
        Self {
            statement,
            children: Vec::new(),
        }
    }
}
