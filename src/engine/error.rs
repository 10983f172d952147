use super::game::GamePhase;

/// The Result type for engine operations.
pub(crate) type Result<T> = std::result::Result<T, EngineError>;

#[derive(thiserror::Error, Debug)]
pub(crate) enum EngineError {
    #[error("cannot {operation} while the game is {phase}")]
    InvalidState {
        operation: &'static str,
        phase: GamePhase,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
