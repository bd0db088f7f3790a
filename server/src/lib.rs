//! daynote server - append endpoint and process glue for the daily journal.
//!
//! This crate wraps [`daynote_journal`] for long-running use:
//! - An HTTP endpoint that appends submitted text to today's note
//! - A client for that endpoint, used by `daynote append`
//! - Server configuration and error types
//!
//! The `daynote` binary combines these with the journal's scheduler into the
//! `run-once`, `watch`, `serve-api` and `serve-both` modes.

pub mod client;
pub mod config;
pub mod error;
pub mod routes;
