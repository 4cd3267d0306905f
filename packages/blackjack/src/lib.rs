mod card;
mod count;
mod estimator;
mod hand;
mod rules;
mod shoe;

pub use card::{Card, ParseCardError, Rank, Suit, VALUE_CLASSES};
pub use count::{hi_lo, RunningCount};
pub use estimator::{
    bust_probability_on_hit, monetary_ev, DoubleDownEstimate, Estimator, Outcomes,
    ProbabilitySnapshot, DEFAULT_SIMULATIONS,
};
pub use hand::{
    can_split_cards, dealer_should_hit, is_blackjack, is_busted, score_hand, Hand, HandScore,
    DEALER_STANDS_ON,
};
pub use rules::{PayoutRatio, TableRules, MAX_DECKS};
pub use shoe::{create_shoe, shuffle, Composition, Shoe, DECK_SIZE};
