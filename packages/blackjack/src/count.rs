use crate::{Card, Rank};
use serde::{Deserialize, Serialize};

/// Hi-Lo weight of a card: low cards +1, tens and aces -1, 7-9 neutral.
pub fn hi_lo(card: &Card) -> i32 {
    match card.rank {
        Rank::Two | Rank::Three | Rank::Four | Rank::Five | Rank::Six => 1,
        Rank::Seven | Rank::Eight | Rank::Nine => 0,
        Rank::Ten | Rank::Jack | Rank::Queen | Rank::King | Rank::Ace => -1,
    }
}

/// Hi-Lo running count over one shoe. Only a reshuffle resets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunningCount(i32);

impl RunningCount {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn observe(&mut self, card: &Card) {
        self.0 += hi_lo(card);
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Running count per remaining deck. Zero once the shoe is empty.
    pub fn true_count(&self, cards_remaining: usize) -> f64 {
        if cards_remaining == 0 {
            return 0.0;
        }
        let decks_remaining = cards_remaining as f64 / 52.0;
        self.0 as f64 / decks_remaining
    }
}
