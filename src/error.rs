use thiserror::Error;

/// Rejected table actions. The table state is left exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Bet must be between ${min} and ${max}.")]
    BetOutOfRange { min: u64, max: u64 },

    #[error("Not enough chips to place that bet!")]
    InsufficientChips,

    #[error("Cannot {action} right now.")]
    OutOfTurn { action: &'static str },

    #[error("Double down is only allowed on your first two cards with enough chips to match the bet.")]
    DoubleDownUnavailable,

    #[error("Split is not supported at this table.")]
    SplitUnsupported,

    #[error("Dealer tick for round {0} is stale")]
    StaleTick(u64),

    #[error("Number of decks must be between 1 and 8, got {0}.")]
    InvalidDeckCount(u8),

    #[error("The shoe is empty.")]
    ShoeEmpty,

    #[error("Invalid table rules: {0}")]
    InvalidRules(&'static str),
}
