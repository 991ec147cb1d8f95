#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]
//! Contract between content containers and the host content runtime.
//!
//! This crate centralizes the types shared by every content unit: the event
//! dispatcher each unit carries, the optional capability surface a unit may
//! expose ([`Runnable`]), the runtime that constructs units from serialized
//! definitions ([`ContentRuntime`]), and the experience statements units emit
//! for reporting.

pub mod events;
pub use events::{Event, EventDispatcher, EventPayload, WeakDispatcher};

pub mod runnable;
pub use runnable::{ContentDefinition, ContentId, ContentRuntime, InstanceOptions, Runnable};

/// Language tag, title and markup helpers.
pub mod text;

/// Experience (xAPI) statement model.
pub mod xapi;
pub use xapi::{
    Activity, Definition, InteractionType, Score, ScoredResult, Statement, Verb, XapiData,
};
