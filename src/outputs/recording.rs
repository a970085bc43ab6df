use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::kernel::body::{ActorId, Body};
use crate::kernel::collaborators::Presenter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    Status { actor: ActorId, health: i32 },
    Notify { actor: ActorId, message: String },
}

/// Shared view of the calls a [`RecordingPresenter`] received, in order.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<PresenterCall>>>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<PresenterCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn status_count(&self, actor: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, PresenterCall::Status { actor: a, .. } if a.as_str() == actor))
            .count()
    }

    pub fn notices_for(&self, actor: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                PresenterCall::Notify { actor: a, message } if a.as_str() == actor => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn push(&self, call: PresenterCall) -> anyhow::Result<()> {
        self.calls
            .lock()
            .map_err(|_| anyhow!("call log lock poisoned"))?
            .push(call);
        Ok(())
    }
}

/// Presenter that only remembers what it was asked to show. Used by
/// headless harnesses.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    log: CallLog,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Presenter for RecordingPresenter {
    fn display_status(&mut self, body: &Body) -> anyhow::Result<()> {
        self.log.push(PresenterCall::Status {
            actor: body.id().clone(),
            health: body.health(),
        })
    }

    fn notify(&mut self, actor: &ActorId, message: &str) -> anyhow::Result<()> {
        self.log.push(PresenterCall::Notify {
            actor: actor.clone(),
            message: message.to_string(),
        })
    }
}
