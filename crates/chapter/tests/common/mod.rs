//! Fake runtime and content units shared by the chapter integration tests.
//!
//! Units are configured through their definition's `params`:
//! `task` (explicit flag), `maxScore`, `score`, `answered`, `stateful`,
//! `state`, `report`, `fail` (construction error) and `attachFails`.
#![allow(dead_code, reason = "Not every test binary uses every helper")]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{Error, bail};
use chapter::{Chapter, ChapterParams, ChildSpec, Extras, Host};
use content::events::RESIZE;
use content::{
    Activity, ContentDefinition, ContentId, ContentRuntime, Event, EventDispatcher,
    InstanceOptions, Runnable, ScoredResult, Statement, Verb, XapiData,
};
use dom::NodeRef;
use serde_json::{Value, json};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct FakeUnit {
    events: EventDispatcher,
    pub library: String,
    pub flag: Option<bool>,
    pub max: Option<f64>,
    has_score: bool,
    pub score: Cell<Option<f64>>,
    pub answered: Cell<Option<bool>>,
    stateful: bool,
    pub state: RefCell<Value>,
    reports: bool,
    pub restored: Value,
    pub attach_now: bool,
    attach_fails: bool,
    pub target: NodeRef,
    pub resets: Cell<u32>,
    pub solutions: Cell<u32>,
    pub attached: Cell<u32>,
    pub resizes: Rc<Cell<u32>>,
}

impl FakeUnit {
    fn from_definition(
        definition: &ContentDefinition,
        target: &NodeRef,
        options: &InstanceOptions,
    ) -> Self {
        let params = &definition.params;
        let max = params.get("maxScore").and_then(Value::as_f64);
        let score = params.get("score").and_then(Value::as_f64);
        let restored = options.previous_state.clone();
        let state = if restored.as_object().is_some_and(|map| !map.is_empty()) {
            restored.clone()
        } else {
            params.get("state").cloned().unwrap_or_else(|| json!({}))
        };

        let events = EventDispatcher::new();
        let resizes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&resizes);
        events.on(RESIZE, move |_| counter.set(counter.get() + 1));

        Self {
            events,
            library: definition.library.clone(),
            flag: params.get("task").and_then(Value::as_bool),
            max,
            has_score: score.is_some() || max.is_some(),
            score: Cell::new(score),
            answered: Cell::new(params.get("answered").and_then(Value::as_bool)),
            stateful: params.get("stateful").and_then(Value::as_bool).unwrap_or(false),
            state: RefCell::new(state),
            reports: params.get("report").and_then(Value::as_bool).unwrap_or(false),
            restored,
            attach_now: options.attach_now,
            attach_fails: params.get("attachFails").and_then(Value::as_bool).unwrap_or(false),
            target: target.clone(),
            resets: Cell::new(0),
            solutions: Cell::new(0),
            attached: Cell::new(0),
            resizes,
        }
    }

    fn statement(&self, verb: &str) -> Statement {
        Statement::new(Verb::adl(verb), Activity::new(&format!("urn:fake:{}", self.library)))
    }

    /// Answer with `raw` points and emit the scored statement.
    pub fn answer(&self, raw: f64) {
        self.score.set(Some(raw));
        self.answered.set(Some(true));
        *self.state.borrow_mut() = json!({ "answer": raw });
        let mut statement = self.statement("answered");
        statement.result = Some(ScoredResult::new(raw, self.max.unwrap_or(raw)));
        self.events.trigger(&Event::statement(statement));
    }

    /// Emit a statement without a result.
    pub fn interact(&self) {
        self.events.trigger(&Event::statement(self.statement("interacted")));
    }

    pub fn resize(&self) {
        self.events.trigger_named(RESIZE);
    }
}

impl Runnable for FakeUnit {
    fn events(&self) -> &EventDispatcher {
        &self.events
    }

    fn attach(&self, target: &NodeRef) -> Result<(), Error> {
        self.attached.set(self.attached.get() + 1);
        if self.attach_fails {
            bail!("{} cannot draw", self.library);
        }
        let label = target.document().create_text(&self.library);
        target.append_child(&label)
    }

    fn task_flag(&self) -> Option<bool> {
        self.flag
    }

    fn score(&self) -> Option<f64> {
        self.has_score.then(|| self.score.get().unwrap_or(0.0))
    }

    fn max_score(&self) -> Option<f64> {
        self.max
    }

    fn answer_given(&self) -> Option<bool> {
        self.answered.get()
    }

    fn show_solutions(&self) {
        self.solutions.set(self.solutions.get() + 1);
    }

    fn reset_task(&self) {
        self.resets.set(self.resets.get() + 1);
        if self.has_score {
            self.score.set(Some(0.0));
        }
        if self.answered.get().is_some() {
            self.answered.set(Some(false));
        }
        *self.state.borrow_mut() = json!({});
    }

    fn current_state(&self) -> Option<Value> {
        self.stateful.then(|| self.state.borrow().clone())
    }

    fn xapi_data(&self) -> Option<XapiData> {
        self.reports.then(|| {
            let mut statement = self.statement("answered");
            if let (Some(raw), Some(max)) = (self.score.get(), self.max) {
                statement.result = Some(ScoredResult::new(raw, max));
            }
            XapiData::leaf(statement)
        })
    }
}

#[derive(Default)]
pub struct FakeRuntime {
    pub units: RefCell<Vec<Rc<FakeUnit>>>,
    pub content_ids: RefCell<Vec<ContentId>>,
}

impl FakeRuntime {
    pub fn unit(&self, position: usize) -> Rc<FakeUnit> {
        Rc::clone(&self.units.borrow()[position])
    }
}

impl ContentRuntime for FakeRuntime {
    fn instantiate(
        &self,
        definition: &ContentDefinition,
        content_id: ContentId,
        target: &NodeRef,
        options: InstanceOptions,
    ) -> Result<Rc<dyn Runnable>, Error> {
        if definition.params.get("fail").and_then(Value::as_bool) == Some(true) {
            bail!("constructor of {} failed", definition.library);
        }
        self.content_ids.borrow_mut().push(content_id);
        let unit = Rc::new(FakeUnit::from_definition(definition, target, &options));
        self.units.borrow_mut().push(Rc::clone(&unit));
        Ok(unit)
    }
}

pub fn setup() -> (Rc<FakeRuntime>, Host) {
    init_logging();
    let runtime = Rc::new(FakeRuntime::default());
    let host = Host::new(Rc::clone(&runtime) as Rc<dyn ContentRuntime>);
    (runtime, host)
}

pub fn child(library: &str, params: Value) -> ChildSpec {
    ChildSpec::with_content(ContentDefinition {
        library: library.to_owned(),
        params,
        ..ContentDefinition::default()
    })
}

/// A scored child worth `max` points.
pub fn task(max: f64) -> ChildSpec {
    child("Fake.Question 1.0", json!({ "maxScore": max }))
}

/// An unscored, stateless child.
pub fn text() -> ChildSpec {
    child("Fake.Text 1.0", json!({}))
}

pub fn params(children: Vec<ChildSpec>) -> ChapterParams {
    let mut params = ChapterParams::default();
    params.chapter.contents = children;
    params
}

/// Builds `Fake.Chapter` definitions as nested chapters and everything else
/// through the wrapped fake runtime.
pub struct NestingRuntime {
    leaves: Rc<FakeRuntime>,
    inner: Host,
}

impl ContentRuntime for NestingRuntime {
    fn instantiate(
        &self,
        definition: &ContentDefinition,
        content_id: ContentId,
        target: &NodeRef,
        options: InstanceOptions,
    ) -> Result<Rc<dyn Runnable>, Error> {
        if definition.machine_name() != "Fake.Chapter" {
            return self.leaves.instantiate(definition, content_id, target, options);
        }
        let params: ChapterParams = serde_json::from_value(definition.params.clone())?;
        let extras = Extras {
            sub_content_id: definition.sub_content_id.clone(),
            ..Extras::default()
        };
        Ok(Chapter::new(params, content_id, extras, &self.inner)?.into_runnable())
    }
}

/// Host whose runtime also builds nested chapters. Leaf units land in the
/// returned fake runtime in construction order.
pub fn setup_nested() -> (Rc<FakeRuntime>, Host) {
    let (leaves, inner) = setup();
    let runtime = NestingRuntime {
        leaves: Rc::clone(&leaves),
        inner: inner.clone(),
    };
    let host = Host {
        runtime: Rc::new(runtime),
        ..inner
    };
    (leaves, host)
}

pub fn nested(children: Vec<ChildSpec>) -> ChildSpec {
    let nested_params = serde_json::to_value(params(children)).unwrap_or_default();
    let mut spec = child("Fake.Chapter 1.0", nested_params);
    if let Some(content) = spec.content.as_mut() {
        content.sub_content_id = Some("inner".to_owned());
    }
    spec
}
