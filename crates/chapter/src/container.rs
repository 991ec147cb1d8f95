use core::cell::{Cell, OnceCell};
use core::fmt::{Debug, Formatter, Result as FmtResult};
use std::rc::{Rc, Weak};
use std::time::Instant;

use anyhow::{Context as _, Error, bail};
use content::events::RESIZE;
use content::text::format_language_code;
use content::xapi::{LOCAL_CONTENT_ID_EXTENSION, SUB_CONTENT_ID_EXTENSION};
use content::{
    Activity, ContentDefinition, ContentId, ContentRuntime, Event, EventDispatcher, Runnable,
    ScoredResult, Statement, Verb, XapiData,
};
use dom::{Document, NodeRef};
use log::{debug, info};
use serde_json::{Value, json};

use crate::bubbling::UpwardGuard;
use crate::children::{BuildEnv, ChildRecord, ScoringSink, build_children};
use crate::completion::{self, Progress};
use crate::config::ChapterOptions;
use crate::params::{ChapterParams, ChildSpec, Extras, PersistedState};
use crate::report;
use crate::scheduler::FrameScheduler;

/// Fallback title, and the description of every chapter.
pub const DEFAULT_DESCRIPTION: &str = "Portfolio chapter";
/// Class added to the wrapper a chapter is attached to.
pub const WRAPPER_CLASS: &str = "h5p-portfolio-chapter";
/// Class of the element holding the children's render targets.
pub const CONTENTS_CLASS: &str = "h5p-portfolio-chapter-contents";

/// Frames between mounting and the first resize request.
const ATTACH_RESIZE_DELAY_FRAMES: usize = 2;

/// Host services a chapter is built against.
#[derive(Clone)]
pub struct Host {
    pub runtime: Rc<dyn ContentRuntime>,
    pub document: Document,
    pub scheduler: FrameScheduler,
    pub options: ChapterOptions,
}

impl Host {
    pub fn new(runtime: Rc<dyn ContentRuntime>) -> Self {
        Self {
            runtime,
            document: Document::new(),
            scheduler: FrameScheduler::new(),
            options: ChapterOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ChapterOptions) -> Self {
        self.options = options;
        self
    }
}

impl Debug for Host {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("Host")
            .field("document", &self.document)
            .field("scheduler", &self.scheduler)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

struct Shared {
    content_id: ContentId,
    sub_content_id: Option<String>,
    events: EventDispatcher,
    records: Vec<ChildRecord>,
    specs: Vec<ChildSpec>,
    document: Document,
    scheduler: FrameScheduler,
    options: ChapterOptions,
    language_tag: String,
    title: String,
    is_task: bool,
    started: Cell<Option<Instant>>,
}

impl Shared {
    fn track_scoring(self: &Rc<Self>, event: Option<&Event>, index: usize) {
        match completion::track_scoring(&self.records, event, index) {
            Progress::Complete => self.schedule_completion(),
            Progress::Pending | Progress::Ignored => {}
        }
    }

    /// Defer the completion report so the child's own statement is handled
    /// first.
    fn schedule_completion(self: &Rc<Self>) {
        debug!(target: "chapter", "content {}: all children done", self.content_id);
        let weak = Rc::downgrade(self);
        self.scheduler
            .request_frames(self.options.completion_delay_frames, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.emit_completed();
                }
            });
    }

    fn emit_completed(&self) {
        let score = report::total_score(&self.records);
        let max_score = report::total_max_score(&self.records);
        info!(
            target: "chapter",
            "content {} completed with {score}/{max_score}",
            self.content_id
        );
        let mut statement = self.statement("completed");
        statement.result = Some(self.scored_result(score, max_score));
        self.events.trigger(&Event::statement(statement));
    }

    fn statement(&self, verb: &str) -> Statement {
        let activity_id = self
            .options
            .activity_id(self.content_id, self.sub_content_id.as_deref());
        let mut object = Activity::new(&activity_id);
        object.definition = report::definition(
            &self.title,
            DEFAULT_DESCRIPTION,
            &self.language_tag,
            self.options.interaction_type,
        );
        object
            .definition
            .extensions
            .insert(LOCAL_CONTENT_ID_EXTENSION.to_owned(), json!(self.content_id.0));
        if let Some(sub) = &self.sub_content_id {
            object
                .definition
                .extensions
                .insert(SUB_CONTENT_ID_EXTENSION.to_owned(), json!(sub));
        }
        Statement::new(Verb::adl(verb), object)
    }

    fn scored_result(&self, score: f64, max_score: f64) -> ScoredResult {
        let result = ScoredResult::new(score, max_score);
        match self.started.get() {
            Some(start) => result.with_duration(start.elapsed()),
            None => result,
        }
    }
}

/// A container of child content units.
///
/// Cloning yields another handle to the same chapter.
#[derive(Clone)]
pub struct Chapter {
    shared: Rc<Shared>,
}

impl Chapter {
    /// Build a chapter and all of its children.
    ///
    /// An empty content list is padded with one empty slot. Previous state is
    /// matched to children by position.
    ///
    /// # Errors
    /// Returns the first error raised by the runtime while constructing a
    /// child.
    pub fn new(
        params: ChapterParams,
        content_id: ContentId,
        extras: Extras,
        host: &Host,
    ) -> Result<Self, Error> {
        let config = params.chapter.normalized();
        let language = extras
            .metadata
            .default_language
            .as_deref()
            .unwrap_or(&host.options.default_language);
        let language_tag = format_language_code(language);
        let previous = extras.previous_state.unwrap_or_default().children;

        let events = EventDispatcher::new();
        let guard = UpwardGuard::new();
        let link: Rc<OnceCell<Weak<Shared>>> = Rc::default();
        let sink_link = Rc::clone(&link);
        let on_scored: ScoringSink = Rc::new(move |event: &Event, index: usize| {
            if let Some(shared) = sink_link.get().and_then(Weak::upgrade) {
                shared.track_scoring(Some(event), index);
            }
        });

        let records = {
            let env = BuildEnv {
                runtime: host.runtime.as_ref(),
                document: &host.document,
                content_id,
                parent: &events,
                guard: &guard,
                on_scored,
            };
            build_children(&config.contents, &previous, &env)?
        };
        let is_task = records.iter().any(ChildRecord::is_task);
        let title = host.runtime.title_from(
            extras
                .metadata
                .title
                .as_deref()
                .filter(|raw| !raw.trim().is_empty())
                .unwrap_or(DEFAULT_DESCRIPTION),
        );

        let shared = Rc::new(Shared {
            content_id,
            sub_content_id: extras.sub_content_id,
            events,
            records,
            specs: config.contents,
            document: host.document.clone(),
            scheduler: host.scheduler.clone(),
            options: host.options.clone(),
            language_tag,
            title,
            is_task,
            started: Cell::new(None),
        });
        link.get_or_init(|| Rc::downgrade(&shared));
        debug!(
            target: "chapter",
            "content {content_id}: built {} slot(s), task: {is_task}",
            shared.records.len()
        );

        let chapter = Self { shared };
        if extras.is_root {
            chapter.set_activity_started();
        }
        Ok(chapter)
    }

    /// Mount the children's render targets under `wrapper` and request a
    /// resize once the tree has had two frames to render.
    ///
    /// # Errors
    /// Fails without touching the tree if `wrapper` belongs to a different
    /// document than the chapter. Otherwise fails with the first child that
    /// cannot draw into its render target.
    pub fn attach(&self, wrapper: &NodeRef) -> Result<(), Error> {
        let shared = &self.shared;
        if !wrapper.document().same(&shared.document) {
            bail!(
                "cannot mount content {} into a wrapper from another document",
                shared.content_id
            );
        }
        wrapper.add_class(WRAPPER_CLASS);
        let contents = shared.document.create_element("div");
        contents.add_class(CONTENTS_CLASS);
        for record in &shared.records {
            contents.append_child(record.target())?;
        }
        wrapper
            .append_child(&contents)
            .with_context(|| format!("failed to mount content {}", shared.content_id))?;

        for (index, record) in shared.records.iter().enumerate() {
            if let Some(unit) = record.instance() {
                unit.attach(record.target()).with_context(|| {
                    format!("failed to attach child {index} of content {}", shared.content_id)
                })?;
            }
        }

        let events = shared.events.downgrade();
        shared
            .scheduler
            .request_frames(ATTACH_RESIZE_DELAY_FRAMES, move || {
                if let Some(dispatcher) = events.upgrade() {
                    dispatcher.trigger_named(RESIZE);
                }
            });
        Ok(())
    }

    /// Feed a scoring event from child `index` to the completion tracker.
    pub fn track_scoring(&self, event: Option<&Event>, index: usize) {
        self.shared.track_scoring(event, index);
    }

    /// Record the activity start once and announce the attempt.
    pub fn set_activity_started(&self) {
        let shared = &self.shared;
        if shared.started.get().is_some() {
            return;
        }
        shared.started.set(Some(Instant::now()));
        shared
            .events
            .trigger(&Event::statement(shared.statement("attempted")));
    }

    pub fn answer_given(&self) -> bool {
        report::any_answer_given(&self.shared.records)
    }

    pub fn score(&self) -> f64 {
        report::total_score(&self.shared.records)
    }

    pub fn max_score(&self) -> f64 {
        report::total_max_score(&self.shared.records)
    }

    pub fn show_solutions(&self) {
        report::reveal_solutions(&self.shared.records);
        self.shared.events.trigger_named(RESIZE);
    }

    /// Reset every child and forget completion progress.
    pub fn reset_task(&self) {
        completion::reset(&self.shared.records);
        self.shared.events.trigger_named(RESIZE);
    }

    /// Aggregate `answered` report with the children's reports attached.
    pub fn xapi_data(&self) -> XapiData {
        let score = self.score();
        let max_score = self.max_score();
        let mut statement = self.shared.statement("answered");
        statement.result = Some(
            self.shared
                .scored_result(score, max_score)
                .with_completion(true)
                .with_success((score - max_score).abs() < f64::EPSILON),
        );
        XapiData {
            statement,
            children: report::child_reports(&self.shared.records),
        }
    }

    pub fn current_state(&self) -> PersistedState {
        PersistedState {
            children: report::collect_states(&self.shared.records),
        }
    }

    pub fn instances(&self) -> Vec<Option<Rc<dyn Runnable>>> {
        self.shared
            .records
            .iter()
            .map(|record| record.instance().map(Rc::clone))
            .collect()
    }

    pub fn instances_semantics(&self) -> Vec<Option<&ContentDefinition>> {
        self.shared
            .specs
            .iter()
            .map(|spec| spec.content.as_ref())
            .collect()
    }

    /// Render targets, one per child.
    pub fn placeholder_doms(&self) -> Vec<NodeRef> {
        self.shared
            .records
            .iter()
            .map(|record| record.target().clone())
            .collect()
    }

    pub fn records(&self) -> &[ChildRecord] {
        &self.shared.records
    }

    pub fn is_done(&self, index: usize) -> Option<bool> {
        self.shared.records.get(index).map(ChildRecord::is_done)
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.shared.events
    }

    /// Whether any child counts towards completion.
    pub fn is_task(&self) -> bool {
        self.shared.is_task
    }

    pub fn content_id(&self) -> ContentId {
        self.shared.content_id
    }

    pub fn language_tag(&self) -> &str {
        &self.shared.language_tag
    }

    pub fn title(&self) -> &str {
        &self.shared.title
    }

    pub fn description(&self) -> &str {
        DEFAULT_DESCRIPTION
    }

    /// This chapter as a unit that another container can hold.
    pub fn into_runnable(self) -> Rc<dyn Runnable> {
        Rc::new(ChapterUnit(self))
    }
}

impl Debug for Chapter {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("Chapter")
            .field("content_id", &self.shared.content_id)
            .field("language_tag", &self.shared.language_tag)
            .field("records", &self.shared.records)
            .finish_non_exhaustive()
    }
}

/// [`Runnable`] view of a [`Chapter`], for nesting chapters in containers.
#[derive(Clone, Debug)]
pub struct ChapterUnit(pub Chapter);

impl Runnable for ChapterUnit {
    fn events(&self) -> &EventDispatcher {
        self.0.events()
    }

    fn attach(&self, target: &NodeRef) -> Result<(), Error> {
        self.0.attach(target)
    }

    fn task_flag(&self) -> Option<bool> {
        Some(self.0.is_task())
    }

    fn score(&self) -> Option<f64> {
        Some(self.0.score())
    }

    fn max_score(&self) -> Option<f64> {
        Some(self.0.max_score())
    }

    fn answer_given(&self) -> Option<bool> {
        Some(self.0.answer_given())
    }

    fn show_solutions(&self) {
        self.0.show_solutions();
    }

    fn reset_task(&self) {
        self.0.reset_task();
    }

    fn current_state(&self) -> Option<Value> {
        serde_json::to_value(self.0.current_state()).ok()
    }

    fn xapi_data(&self) -> Option<XapiData> {
        Some(self.0.xapi_data())
    }
}
