//! Single-player blackjack table: round state machine, chip accounting and
//! session persistence on top of the `blackjack` engine.

mod error;
mod round;
mod session;

pub use error::TableError;
pub use round::{reduce, Action, Outcome, Phase, TableState};
pub use session::SessionSnapshot;

// Re-export from blackjack package
pub use blackjack::{Card, Estimator, Hand, ProbabilitySnapshot, RunningCount, Shoe, TableRules};
