#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]
//! Chapter container for interactive content.
//!
//! A chapter owns an ordered list of child content units. It builds each one
//! through the host [`ContentRuntime`](content::ContentRuntime) into its own
//! render target, restoring state by position. Resize events flow both ways
//! between the chapter and its children without echoing back down. The
//! chapter tracks which scored children are done and, once all of them are,
//! reports an aggregate completion. Scores, answer state, saved state and
//! experience reports of the children are combined into the chapter's own
//! reporting contract.

pub mod bubbling;
pub mod children;
pub mod completion;
pub mod config;
/// The chapter container and its public contract.
mod container;
pub mod params;
pub mod report;
pub mod restore;
pub mod scheduler;

pub use config::ChapterOptions;
pub use container::{
    CONTENTS_CLASS, Chapter, ChapterUnit, DEFAULT_DESCRIPTION, Host, WRAPPER_CLASS,
};
pub use params::{ChapterConfig, ChapterParams, ChildSpec, Extras, Metadata, PersistedState};
pub use scheduler::FrameScheduler;
