//! Single-threaded frame scheduler.
//!
//! Stands in for the host's animation-frame loop. Work requested for "the
//! next frame" is queued and runs when the embedder calls
//! [`FrameScheduler::run_frame`]. A frame runs exactly the tasks queued before
//! it started; anything queued while it runs waits for the following frame.
//! That gives deferred work a countable number of yield points.

use core::cell::{Cell, RefCell};
use core::fmt::{Debug, Formatter, Result as FmtResult};
use core::mem;
use std::rc::Rc;

use log::trace;

type FrameTask = Box<dyn FnOnce()>;

#[derive(Default)]
struct Inner {
    queue: RefCell<Vec<FrameTask>>,
    frames_run: Cell<u64>,
}

#[derive(Clone, Default)]
pub struct FrameScheduler {
    inner: Rc<Inner>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` on the next frame.
    pub fn request_frame<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.inner.queue.borrow_mut().push(Box::new(task));
    }

    /// Run `task` after `yields` frames; `0` and `1` both mean the next frame.
    pub fn request_frames<F>(&self, yields: usize, task: F)
    where
        F: FnOnce() + 'static,
    {
        if yields <= 1 {
            self.request_frame(task);
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        self.request_frame(move || {
            if let Some(inner) = weak.upgrade() {
                Self { inner }.request_frames(yields - 1, task);
            }
        });
    }

    /// Run one frame and return how many tasks it ran.
    pub fn run_frame(&self) -> usize {
        let tasks = mem::take(&mut *self.inner.queue.borrow_mut());
        self.inner
            .frames_run
            .set(self.inner.frames_run.get().saturating_add(1));
        let count = tasks.len();
        for task in tasks {
            task();
        }
        if count > 0 {
            trace!(target: "chapter::scheduler", "frame {} ran {count} task(s)", self.frames_run());
        }
        count
    }

    /// Run frames until nothing is queued or `max_frames` have run. Returns
    /// the number of frames run.
    pub fn run_until_idle(&self, max_frames: usize) -> usize {
        let mut frames = 0;
        while frames < max_frames && self.pending() > 0 {
            self.run_frame();
            frames += 1;
        }
        frames
    }

    pub fn pending(&self) -> usize {
        self.inner.queue.borrow().len()
    }

    pub fn frames_run(&self) -> u64 {
        self.inner.frames_run.get()
    }
}

impl Debug for FrameScheduler {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        formatter
            .debug_struct("FrameScheduler")
            .field("pending", &self.pending())
            .field("frames_run", &self.frames_run())
            .finish()
    }
}
