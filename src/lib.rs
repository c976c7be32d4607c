//! Offboarding workflow tracker.
//!
//! A ticket walks a fixed, ordered sequence of department-owned steps. The
//! [`workflow`] module holds the data model, the transition engine that is
//! the only writer of ticket state, and the visibility policy. Email drafts
//! come from an external text-generation service behind [`drafting`], which
//! never feeds back into the engine except as text the user chooses to send.

pub mod cli;
pub mod commands;
pub mod config;
pub mod drafting;
pub mod error;
pub mod gemini;
pub mod logging;
pub mod mailto;
pub mod store;
pub mod ui;
pub mod workflow;

pub use error::{OffboardError, WorkflowError};
