//! Child instantiation.
//!
//! Every slot gets a fresh render target. Slots with a content definition get
//! a unit built by the runtime with the state restored for that position;
//! units are wired into the container's resize stream, and scored units also
//! report their `xAPI` events to the completion tracker.

use core::cell::Cell;
use core::fmt::{Debug, Formatter, Result as FmtResult};
use std::rc::Rc;

use anyhow::{Context as _, Error};
use content::events::{RESIZE, XAPI};
use content::{ContentId, ContentRuntime, Event, EventDispatcher, InstanceOptions, Runnable};
use dom::{Document, NodeRef};
use log::debug;
use serde_json::Value;
use tracing::debug_span;

use crate::bubbling::{UpwardGuard, bubble_down, bubble_up};
use crate::params::ChildSpec;
use crate::restore::state_for;

/// Class of each child's render target.
pub const CONTENT_CLASS: &str = "h5p-portfolio-chapter-content";

/// Receives `(event, child index)` for every `xAPI` event of a scored child.
pub type ScoringSink = Rc<dyn Fn(&Event, usize)>;

/// Whether `unit` counts towards completion. An explicit flag wins; without
/// one, exposing a max score makes a unit a task.
pub fn is_task(unit: &dyn Runnable) -> bool {
    unit.task_flag().unwrap_or_else(|| unit.max_score().is_some())
}

/// Runtime state of one child slot.
pub struct ChildRecord {
    target: NodeRef,
    instance: Option<Rc<dyn Runnable>>,
    done: Cell<bool>,
}

impl ChildRecord {
    pub(crate) fn new(target: NodeRef, instance: Option<Rc<dyn Runnable>>) -> Self {
        let record = Self {
            target,
            instance,
            done: Cell::new(true),
        };
        record.rearm();
        record
    }

    pub fn target(&self) -> &NodeRef {
        &self.target
    }

    pub fn instance(&self) -> Option<&Rc<dyn Runnable>> {
        self.instance.as_ref()
    }

    pub fn is_task(&self) -> bool {
        self.instance
            .as_deref()
            .is_some_and(|unit| is_task(unit))
    }

    pub fn is_done(&self) -> bool {
        self.done.get()
    }

    pub(crate) fn mark_done(&self) {
        self.done.set(true);
    }

    /// Recompute the done flag from classification alone.
    pub(crate) fn rearm(&self) {
        self.done.set(!self.is_task());
    }
}

impl Debug for ChildRecord {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("ChildRecord")
            .field("target", &self.target.id())
            .field("has_instance", &self.instance.is_some())
            .field("done", &self.done.get())
            .finish()
    }
}

/// Everything instantiation needs from the owning container.
pub struct BuildEnv<'env> {
    pub runtime: &'env dyn ContentRuntime,
    pub document: &'env Document,
    pub content_id: ContentId,
    pub parent: &'env EventDispatcher,
    pub guard: &'env UpwardGuard,
    pub on_scored: ScoringSink,
}

/// Build one record per spec, in order.
///
/// # Errors
/// Propagates the first construction failure from the runtime.
pub fn build_children(
    specs: &[ChildSpec],
    previous: &[Value],
    env: &BuildEnv<'_>,
) -> Result<Vec<ChildRecord>, Error> {
    let span = debug_span!(
        "chapter.build_children",
        content_id = env.content_id.0,
        slots = specs.len()
    );
    let _entered = span.enter();
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| build_child(index, spec, previous, env))
        .collect()
}

fn build_child(
    index: usize,
    spec: &ChildSpec,
    previous: &[Value],
    env: &BuildEnv<'_>,
) -> Result<ChildRecord, Error> {
    let target = env.document.create_element("div");
    target.add_class(CONTENT_CLASS);

    let Some(definition) = spec.content.as_ref() else {
        debug!(target: "chapter", "slot {index} of content {} is empty", env.content_id);
        return Ok(ChildRecord::new(target, None));
    };

    let options = InstanceOptions {
        attach_now: false,
        previous_state: state_for(previous, index),
    };
    let instance = env
        .runtime
        .instantiate(definition, env.content_id, &target, options)
        .with_context(|| {
            format!(
                "failed to instantiate child {index} ({}) of content {}",
                definition.library, env.content_id
            )
        })?;

    bubble_down(env.parent, RESIZE, vec![instance.events().clone()], env.guard);
    bubble_up(instance.events(), RESIZE, env.parent, env.guard);

    let record = ChildRecord::new(target, Some(instance));
    if let Some(unit) = record.instance().filter(|_| record.is_task()) {
        let sink = Rc::clone(&env.on_scored);
        unit.events().on(XAPI, move |event| sink(event, index));
    }
    debug!(
        target: "chapter",
        "slot {index} built from {} (task: {})",
        definition.machine_name(),
        record.is_task()
    );
    Ok(record)
}
