//! Declarative HTTP actions with a create/update/delete lifecycle.
//!
//! # Overview
//! A request is described as data (method, url, headers, body, expected
//! status), sent once, and accepted only if the status matches and the
//! response declares a text content type. Two modes share that routine:
//! - `run_query` issues a one-shot request and returns body and headers.
//! - `Lifecycle` runs the create, update or delete phase of a record and
//!   folds the response into the persisted `LifecycleRecord`.
//!
//! # Design
//! - The host validates input and stores records; the core never persists.
//! - Network I/O lives behind `Transport`; `UreqTransport` is the blocking
//!   implementation. Status and content-type checks are pure functions.
//! - Nothing is retried. Every failure aborts the current phase and is
//!   returned with the status, content type or transport cause attached.
//! - Bodies are read fully into memory, capped by
//!   `ExecutorConfig::max_body_bytes`.

pub mod config;
pub mod content_type;
pub mod error;
pub mod executor;
pub mod http;
pub mod lifecycle;
pub mod merge;
pub mod query;
pub mod types;

#[cfg(test)]
mod testing;

pub use crate::config::ExecutorConfig;
pub use crate::error::{ExecError, LifecycleError};
pub use crate::executor::{execute, RawResponse, ResponseCheck, Transport, UreqTransport};
pub use crate::http::{HttpMethod, RequestSpec, ResponseOutcome};
pub use crate::lifecycle::{Lifecycle, LifecycleEvent};
pub use crate::query::{run_query, QueryConfig};
pub use crate::types::{
    Action, LifecycleRecord, Phase, PhaseConfig, PhaseRecord, PhaseResponse, Phases, QueryOutcome,
};
