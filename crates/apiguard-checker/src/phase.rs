//! Run phases of a consistency check
//!
//! A run moves strictly forward: `Idle -> Scanning -> Aggregating ->
//! Reported`. There is no way back; a new run starts from `Idle`.

use crate::error::CheckError;
use serde::{Deserialize, Serialize};

/// Phase of one consistency run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Not started
    #[default]
    Idle,
    /// Walking and scanning files
    Scanning,
    /// Merging per-file results and classifying
    Aggregating,
    /// Report produced
    Reported,
}

impl RunPhase {
    /// Lower-case name
    #[inline]
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Scanning => "scanning",
            Self::Aggregating => "aggregating",
            Self::Reported => "reported",
        }
    }

    /// Whether the run has finished
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::Reported
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Phases reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: RunPhase) -> &'static [RunPhase] {
    use RunPhase::{Aggregating, Idle, Reported, Scanning};
    match from {
        Idle => &[Scanning],
        Scanning => &[Aggregating],
        Aggregating => &[Reported],
        Reported => &[],
    }
}

/// Validate a phase transition
///
/// # Errors
/// Returns [`CheckError::InvalidTransition`] unless `to` directly follows
/// `from`
pub fn validate_transition(from: RunPhase, to: RunPhase) -> Result<(), CheckError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(CheckError::InvalidTransition { from, to })
    }
}

/// Current phase of one run
#[derive(Debug, Default)]
pub struct PhaseTracker {
    phase: RunPhase,
}

impl PhaseTracker {
    /// Tracker in `Idle`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Move to `to`
    ///
    /// # Errors
    /// Returns [`CheckError::InvalidTransition`] for any non-forward step;
    /// the phase is left unchanged
    pub fn advance(&mut self, to: RunPhase) -> Result<(), CheckError> {
        validate_transition(self.phase, to)?;
        tracing::trace!("Run phase {} -> {}", self.phase, to);
        self.phase = to;
        Ok(())
    }
}
