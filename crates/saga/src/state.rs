//! Saga state machine.

use serde::{Deserialize, Serialize};

/// The state of one order-creation saga instance.
///
/// State transitions:
/// ```text
/// Init ──► OrderCreated ──┬──► Committed
///                         └──► Compensating ──┬──► RolledBack
///                                             └──► CompensationFailed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SagaState {
    /// Nothing has happened yet.
    #[default]
    Init,

    /// Step A committed: the order record exists with status Normal.
    OrderCreated,

    /// Step B committed: stock decremented, saga done (terminal state).
    Committed,

    /// Step B failed; the compensation edge is being taken.
    Compensating,

    /// Compensation completed: stock reverted, order deleted (terminal
    /// state).
    RolledBack,

    /// Compensation itself failed. The system is inconsistent and needs
    /// out-of-band reconciliation (terminal state).
    CompensationFailed,
}

impl SagaState {
    /// Returns true if `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: SagaState) -> bool {
        matches!(
            (self, next),
            (SagaState::Init, SagaState::OrderCreated)
                | (SagaState::OrderCreated, SagaState::Committed)
                | (SagaState::OrderCreated, SagaState::Compensating)
                | (SagaState::Compensating, SagaState::RolledBack)
                | (SagaState::Compensating, SagaState::CompensationFailed)
        )
    }

    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SagaState::Committed | SagaState::RolledBack | SagaState::CompensationFailed
        )
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaState::Init => "Init",
            SagaState::OrderCreated => "OrderCreated",
            SagaState::Committed => "Committed",
            SagaState::Compensating => "Compensating",
            SagaState::RolledBack => "RolledBack",
            SagaState::CompensationFailed => "CompensationFailed",
        }
    }
}

impl std::fmt::Display for SagaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
