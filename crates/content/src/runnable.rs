//! Capability surface of content units and the runtime that builds them.

use core::fmt::{Display, Formatter, Result as FmtResult};
use std::rc::Rc;

use anyhow::Error;
use dom::NodeRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::events::EventDispatcher;
use crate::text::{DEFAULT_TITLE_MAX_LENGTH, create_title};
use crate::xapi::XapiData;

/// Identifier of a top-level content item as known to the host.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub u64);

impl Display for ContentId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        write!(formatter, "{}", self.0)
    }
}

/// Serialized definition of one content unit. `params` and `metadata` are
/// only meaningful to the runtime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDefinition {
    /// Library reference, `"<MachineName> <major>.<minor>"`.
    #[serde(default)]
    pub library: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_content_id: Option<String>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub metadata: Value,
}

impl ContentDefinition {
    pub fn machine_name(&self) -> &str {
        self.library.split_whitespace().next().unwrap_or_default()
    }
}

/// Construction options handed to [`ContentRuntime::instantiate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InstanceOptions {
    /// Draw into the render target right away rather than on a later
    /// [`Runnable::attach`].
    pub attach_now: bool,
    /// State previously produced by [`Runnable::current_state`], or `{}`.
    pub previous_state: Value,
}

/// A constructed content unit.
///
/// Apart from [`events`](Runnable::events) every member is optional; the
/// defaults describe a unit without that capability. Units are driven from a
/// single thread and mutate themselves through interior mutability.
pub trait Runnable {
    fn events(&self) -> &EventDispatcher;

    /// Draw into `target`.
    ///
    /// # Errors
    /// Implementations fail when `target` cannot take the unit's nodes.
    fn attach(&self, _target: &NodeRef) -> Result<(), Error> {
        Ok(())
    }

    /// Explicit self-classification as a scored task.
    fn task_flag(&self) -> Option<bool> {
        None
    }

    fn score(&self) -> Option<f64> {
        None
    }

    fn max_score(&self) -> Option<f64> {
        None
    }

    fn answer_given(&self) -> Option<bool> {
        None
    }

    fn show_solutions(&self) {}

    fn reset_task(&self) {}

    /// Serializable state to restore the unit from later.
    fn current_state(&self) -> Option<Value> {
        None
    }

    fn xapi_data(&self) -> Option<XapiData> {
        None
    }
}

/// The host side that knows how to turn definitions into units.
pub trait ContentRuntime {
    /// Construct the unit described by `definition`, bound to `target`.
    ///
    /// # Errors
    /// Implementations fail when the definition cannot be resolved or the
    /// unit's constructor fails.
    fn instantiate(
        &self,
        definition: &ContentDefinition,
        content_id: ContentId,
        target: &NodeRef,
        options: InstanceOptions,
    ) -> Result<Rc<dyn Runnable>, Error>;

    /// Sanitize a raw title for display.
    fn title_from(&self, raw: &str) -> String {
        create_title(raw, DEFAULT_TITLE_MAX_LENGTH)
    }
}
