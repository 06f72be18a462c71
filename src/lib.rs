//! CircleCI API v2 and v1.1 actions.
//!
//! Every action is a named, parameterized call described in a static
//! catalog ([`actions::all`]). Running one resolves its parameters from
//! explicit values, the environment, config defaults and built-in defaults,
//! performs the request and mirrors the result into a [`context::RunContext`].
//! Two actions carry real control flow: the workflow artifact locator
//! ([`artifacts`]) and the pipeline poller ([`poller`]).

pub mod actions;
pub mod artifacts;
pub mod auth;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod links;
pub mod output;
pub mod poller;
pub mod types;

pub use error::{CircleCiError, Result};
