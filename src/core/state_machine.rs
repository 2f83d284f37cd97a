//! Stage machine for a publish run
//!
//! Tracks where a run is and rejects transitions that would skip the
//! credential gate. History lives in memory only.

use super::error::PublishError;
use chrono::{DateTime, Utc};
use std::fmt;

/// Run stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Initial,
    ResolvingCredential,
    PreparingRepository,
    Pushing,
    Succeeded,
    PushFailed,
    Aborted,
}

impl RunStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initial => "INITIAL",
            Self::ResolvingCredential => "RESOLVING_CREDENTIAL",
            Self::PreparingRepository => "PREPARING_REPOSITORY",
            Self::Pushing => "PUSHING",
            Self::Succeeded => "SUCCEEDED",
            Self::PushFailed => "PUSH_FAILED",
            Self::Aborted => "ABORTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::PushFailed | Self::Aborted)
    }

    fn can_transition_to(&self, to: RunStage) -> bool {
        use RunStage::*;
        matches!(
            (self, to),
            (Initial, ResolvingCredential)
                | (ResolvingCredential, PreparingRepository)
                | (ResolvingCredential, Aborted)
                | (PreparingRepository, Pushing)
                | (Pushing, Succeeded)
                | (Pushing, PushFailed)
        )
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage transition
#[derive(Debug, Clone, PartialEq)]
pub struct StageTransition {
    pub from: RunStage,
    pub to: RunStage,
    pub timestamp: DateTime<Utc>,
}

/// Stage machine for tracking a publish run
#[derive(Debug, Clone)]
pub struct RunStageMachine {
    current_stage: RunStage,
    transitions: Vec<StageTransition>,
}

impl Default for RunStageMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStageMachine {
    pub fn new() -> Self {
        Self {
            current_stage: RunStage::Initial,
            transitions: Vec::new(),
        }
    }

    /// Transition to a new stage
    pub fn transition(&mut self, to: RunStage) -> Result<(), PublishError> {
        if !self.current_stage.can_transition_to(to) {
            return Err(PublishError::InvalidStageTransition {
                from: self.current_stage.to_string(),
                to: to.to_string(),
            });
        }

        self.transitions.push(StageTransition {
            from: self.current_stage,
            to,
            timestamp: Utc::now(),
        });
        self.current_stage = to;

        Ok(())
    }

    pub fn current_stage(&self) -> RunStage {
        self.current_stage
    }

    pub fn transitions(&self) -> &[StageTransition] {
        &self.transitions
    }

    /// Whether the run got past the credential gate
    pub fn credential_resolved(&self) -> bool {
        self.transitions
            .iter()
            .any(|t| t.to == RunStage::PreparingRepository)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut machine = RunStageMachine::new();

        machine.transition(RunStage::ResolvingCredential).unwrap();
        machine.transition(RunStage::PreparingRepository).unwrap();
        machine.transition(RunStage::Pushing).unwrap();
        machine.transition(RunStage::Succeeded).unwrap();

        assert_eq!(machine.current_stage(), RunStage::Succeeded);
        assert!(machine.current_stage().is_terminal());
        assert_eq!(machine.transitions().len(), 4);
        assert!(machine.credential_resolved());
    }

    #[test]
    fn test_abort_at_credential_gate() {
        let mut machine = RunStageMachine::new();

        machine.transition(RunStage::ResolvingCredential).unwrap();
        machine.transition(RunStage::Aborted).unwrap();

        assert!(!machine.credential_resolved());
        assert!(machine.transition(RunStage::PreparingRepository).is_err());
    }

    #[test]
    fn test_cannot_skip_credential_stage() {
        let mut machine = RunStageMachine::new();

        let result = machine.transition(RunStage::PreparingRepository);

        assert_eq!(
            result,
            Err(PublishError::InvalidStageTransition {
                from: "INITIAL".to_string(),
                to: "PREPARING_REPOSITORY".to_string(),
            })
        );
        assert_eq!(machine.current_stage(), RunStage::Initial);
    }

    #[test]
    fn test_stage_display_names() {
        assert_eq!(RunStage::PushFailed.to_string(), "PUSH_FAILED");
        assert_eq!(RunStage::ResolvingCredential.to_string(), "RESOLVING_CREDENTIAL");
    }
}
