//! Runs one phase per external lifecycle event and folds the result into the
//! persisted record.
//!
//! # Design
//! Each event is an independent invocation: the host passes the current
//! record in and stores whatever comes back. A failed call returns an error
//! before anything is merged, so the host keeps its last good record.
//!
//! | event  | method set                          | method unset                |
//! |--------|-------------------------------------|-----------------------------|
//! | create | call, merge, id = random UUID       | merge empty, id = timestamp |
//! | update | call, merge (skipped if unchanged)  | merge empty                 |
//! | delete | call, status check only             | record declared fields      |

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::LifecycleError;
use crate::executor::{execute, ResponseCheck, Transport};
use crate::http::ResponseOutcome;
use crate::merge::merge;
use crate::types::{Action, LifecycleRecord, Phase, PhaseConfig, Phases};

/// The external trigger for one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    Create { triggers: BTreeMap<String, String> },
    /// `changed` is the host's diff of the update block since the last apply.
    Update { changed: bool },
    Delete,
}

pub struct Lifecycle<T> {
    transport: T,
}

impl<T: Transport> Lifecycle<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Dispatch `event`. Update and delete need the current record.
    pub fn run_phase(
        &self,
        event: LifecycleEvent,
        current: Option<LifecycleRecord>,
        action: &Action,
    ) -> Result<LifecycleRecord, LifecycleError> {
        match event {
            LifecycleEvent::Create { triggers } => self.create(action, triggers),
            LifecycleEvent::Update { changed } => {
                let record = current.ok_or(LifecycleError::MissingRecord {
                    phase: Phase::Update,
                })?;
                self.update(record, action, changed)
            }
            LifecycleEvent::Delete => {
                let record = current.ok_or(LifecycleError::MissingRecord {
                    phase: Phase::Delete,
                })?;
                self.delete(record, action)
            }
        }
    }

    pub fn create(
        &self,
        action: &Action,
        triggers: BTreeMap<String, String>,
    ) -> Result<LifecycleRecord, LifecycleError> {
        let declared = declared_fields(action, Phase::Create);
        let (outcome, id) = match self.call(Phase::Create, &declared)? {
            Some(outcome) => (Some(outcome), Uuid::new_v4().to_string()),
            None => (None, timestamp_id()),
        };
        let phases = merge(Phases::default(), Phase::Create, &declared, outcome.as_ref());
        info!(%id, "record created");
        Ok(LifecycleRecord {
            id,
            triggers,
            phases,
        })
    }

    pub fn update(
        &self,
        mut record: LifecycleRecord,
        action: &Action,
        changed: bool,
    ) -> Result<LifecycleRecord, LifecycleError> {
        if !changed {
            info!(id = %record.id, "update action unchanged, nothing to do");
            return Ok(record);
        }
        let declared = declared_fields(action, Phase::Update);
        let outcome = self.call(Phase::Update, &declared)?;
        record.phases = merge(
            std::mem::take(&mut record.phases),
            Phase::Update,
            &declared,
            outcome.as_ref(),
        );
        info!(id = %record.id, "record updated");
        Ok(record)
    }

    /// The returned record is what the host had before removal; only an
    /// unconfigured delete records its declared fields.
    pub fn delete(
        &self,
        mut record: LifecycleRecord,
        action: &Action,
    ) -> Result<LifecycleRecord, LifecycleError> {
        let declared = declared_fields(action, Phase::Delete);
        if self.call(Phase::Delete, &declared)?.is_none() {
            record.phases = merge(
                std::mem::take(&mut record.phases),
                Phase::Delete,
                &declared,
                None,
            );
        }
        info!(id = %record.id, "record deleted");
        Ok(record)
    }

    /// `Ok(None)` when the phase has no method and therefore makes no call.
    fn call(
        &self,
        phase: Phase,
        declared: &PhaseConfig,
    ) -> Result<Option<ResponseOutcome>, LifecycleError> {
        let Some(spec) = declared.to_request() else {
            info!(%phase, "no action configured");
            return Ok(None);
        };
        execute(&self.transport, &spec, ResponseCheck::for_phase(phase))
            .map(Some)
            .map_err(|source| {
                warn!(%phase, error = %source, "action failed");
                LifecycleError::Exec { phase, source }
            })
    }
}

fn declared_fields(action: &Action, phase: Phase) -> PhaseConfig {
    action.phase(phase).cloned().unwrap_or_default()
}

fn timestamp_id() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}
