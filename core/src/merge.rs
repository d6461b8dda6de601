//! Folds one phase's outcome into a record's phases.
//!
//! Only the slot of the given phase is replaced. Create and update slots keep
//! the response body and headers (empty when the phase made no call); delete
//! slots keep the declared fields only.

use crate::http::ResponseOutcome;
use crate::types::{Phase, PhaseConfig, PhaseRecord, PhaseResponse, Phases};

pub fn merge(
    mut phases: Phases,
    phase: Phase,
    declared: &PhaseConfig,
    outcome: Option<&ResponseOutcome>,
) -> Phases {
    let response = outcome
        .map(|outcome| PhaseResponse {
            body: outcome.body_text(),
            headers: outcome.headers.clone(),
        })
        .unwrap_or_default();

    match phase {
        Phase::Create => {
            phases.create = PhaseRecord {
                request: declared.clone(),
                response: Some(response),
            };
        }
        Phase::Update => {
            phases.update = Some(PhaseRecord {
                request: declared.clone(),
                response: Some(response),
            });
        }
        Phase::Delete => {
            phases.delete = Some(PhaseRecord {
                request: declared.clone(),
                response: None,
            });
        }
    }
    phases
}
