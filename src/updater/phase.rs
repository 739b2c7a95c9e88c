//! Update phases and their allowed transitions.

use std::fmt;

use crate::error::{NsplanError, Result};

/// Where an update currently stands.
///
/// `Idle → Validating → (Committed | RolledBack)`. Validation starts only
/// once a backup exists; both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Idle,
    Validating,
    Committed,
    RolledBack,
}

impl UpdatePhase {
    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: UpdatePhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Validating)
                | (Self::Validating, Self::Committed)
                | (Self::Validating, Self::RolledBack)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::RolledBack)
    }
}

impl fmt::Display for UpdatePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Committed => "committed",
            Self::RolledBack => "rolled back",
        };
        write!(f, "{}", name)
    }
}

/// Current phase plus the path taken to reach it.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    history: Vec<UpdatePhase>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            history: vec![UpdatePhase::Idle],
        }
    }

    pub fn current(&self) -> UpdatePhase {
        self.history
            .last()
            .copied()
            .unwrap_or(UpdatePhase::Idle)
    }

    /// Every phase visited, starting with `Idle`.
    pub fn history(&self) -> &[UpdatePhase] {
        &self.history
    }

    /// Move to `next`, refusing transitions the state machine does not allow.
    pub fn advance(&mut self, next: UpdatePhase) -> Result<()> {
        let current = self.current();
        if !current.can_transition_to(next) {
            return Err(NsplanError::Other(anyhow::anyhow!(
                "invalid update phase transition: {} -> {}",
                current,
                next
            )));
        }

        tracing::debug!("Update phase: {} -> {}", current, next);
        self.history.push(next);
        Ok(())
    }
}
