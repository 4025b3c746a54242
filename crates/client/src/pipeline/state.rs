//! Run state machine and stage-tagged failures.

use std::fmt;

use banner_core::Error;
use serde::Serialize;

/// Stage of a single acquisition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Fetching,
    Selecting,
    Downloading,
    Decoding,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Fetching => "fetching",
            Stage::Selecting => "selecting",
            Stage::Downloading => "downloading",
            Stage::Decoding => "decoding",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A run that ended in `Failed`, tagged with the stage that broke.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{stage} stage failed: {error}")]
pub struct Failure {
    pub stage: Stage,
    #[source]
    pub error: Error,
}

impl Failure {
    pub fn new(stage: Stage, error: Error) -> Self {
        Self { stage, error }
    }

    pub fn into_error(self) -> Error {
        self.error
    }
}

/// Tracks one run through its stages.
#[derive(Debug)]
pub(crate) struct Run {
    mode: &'static str,
    stage: Stage,
}

impl Run {
    pub(crate) fn start(mode: &'static str) -> Self {
        tracing::debug!(mode, "acquisition run started");
        Self { mode, stage: Stage::Idle }
    }

    pub(crate) fn stage(&self) -> Stage {
        self.stage
    }

    pub(crate) fn advance(&mut self, next: Stage) {
        tracing::debug!(mode = self.mode, from = %self.stage, to = %next, "stage transition");
        self.stage = next;
    }

    /// Move to `Failed`, remembering where the failure happened.
    pub(crate) fn fail(&mut self, error: Error) -> Failure {
        let stage = self.stage;
        tracing::warn!(mode = self.mode, %stage, %error, "acquisition run failed");
        self.stage = Stage::Failed;
        Failure::new(stage, error)
    }
}
