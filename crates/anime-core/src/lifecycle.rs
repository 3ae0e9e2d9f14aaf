//! Worker lifecycle state machine and timing.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Lifecycle states of a worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Install hook is running.
    Installing,
    /// Installed, waiting to become active.
    Waiting,
    /// Activate hook is running.
    Activating,
    /// Controlling clients.
    Active,
    /// Failed or replaced.
    Redundant,
}

impl LifecycleState {
    /// Check whether a transition is allowed.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;

        matches!(
            (self, next),
            (Installing, Waiting)
                | (Installing, Redundant)
                | (Waiting, Activating)
                | (Activating, Active)
                | (Activating, Redundant)
                | (Active, Redundant)
        )
    }

    /// Validate a transition and return the new state.
    pub fn transition(self, next: LifecycleState) -> Result<LifecycleState, LifecycleError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(LifecycleError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Redundant)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Installing => write!(f, "installing"),
            Self::Waiting => write!(f, "waiting"),
            Self::Activating => write!(f, "activating"),
            Self::Active => write!(f, "active"),
            Self::Redundant => write!(f, "redundant"),
        }
    }
}

/// Lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },
}

/// Observer for lifecycle transitions.
pub trait LifecycleObserver: Send + Sync {
    /// Called after a transition has been applied.
    fn on_transition(&self, from: LifecycleState, to: LifecycleState);
}

/// Timing context for lifecycle hooks.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time from start to a mark.
    pub fn at(&self, name: &str) -> Option<Duration> {
        self.marks.get(name).map(|t| t.duration_since(self.start))
    }

    /// Time between two marks.
    pub fn between(&self, from: &str, to: &str) -> Option<Duration> {
        let from = self.marks.get(from)?;
        let to = self.marks.get(to)?;
        Some(to.saturating_duration_since(*from))
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleState::*;

    #[test]
    fn test_happy_path_transitions() {
        let state = Installing;
        let state = state.transition(Waiting).unwrap();
        let state = state.transition(Activating).unwrap();
        let state = state.transition(Active).unwrap();
        assert_eq!(state, Active);
    }

    #[test]
    fn test_failure_transitions() {
        assert!(Installing.can_transition_to(Redundant));
        assert!(Activating.can_transition_to(Redundant));
        assert!(Active.can_transition_to(Redundant));
    }

    #[test]
    fn test_invalid_transitions() {
        assert_eq!(
            Installing.transition(Active),
            Err(LifecycleError::InvalidTransition {
                from: Installing,
                to: Active
            })
        );
        assert!(!Redundant.can_transition_to(Installing));
        assert!(!Active.can_transition_to(Waiting));
        assert!(Redundant.is_terminal());
    }

    #[test]
    fn test_timing_marks() {
        let mut timing = TimingContext::new();
        timing.mark("install_start");
        timing.mark("install_done");
        assert!(timing.at("install_start").is_some());
        assert!(timing.between("install_start", "install_done").is_some());
        assert!(timing.between("install_start", "missing").is_none());
    }
}
