use crate::card::VALUE_CLASSES;
use crate::{Card, Rank, Suit};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DECK_SIZE: usize = 52;

/// `num_decks` full decks back to back, unshuffled.
pub fn create_shoe(num_decks: u8) -> Vec<Card> {
    let mut cards = Vec::with_capacity(num_decks as usize * DECK_SIZE);
    for _ in 0..num_decks {
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
    }
    cards
}

/// Fisher-Yates: every permutation equally likely given a uniform `rng`.
pub fn shuffle<R: Rng + ?Sized>(cards: &mut [Card], rng: &mut R) {
    for i in (1..cards.len()).rev() {
        let j = rng.gen_range(0..=i);
        cards.swap(i, j);
    }
}

/// The multi-deck shoe for one session. Cards are drawn from the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shoe {
    cards: Vec<Card>,
    num_decks: u8,
}

impl Shoe {
    pub fn new(num_decks: u8) -> Self {
        Self {
            cards: create_shoe(num_decks),
            num_decks,
        }
    }

    pub fn shuffled<R: Rng + ?Sized>(num_decks: u8, rng: &mut R) -> Self {
        let mut shoe = Self::new(num_decks);
        shoe.shuffle(rng);
        shoe
    }

    /// A shoe stacked in a known order; the last card is drawn first.
    pub fn from_cards(cards: Vec<Card>, num_decks: u8) -> Self {
        Self { cards, num_decks }
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        shuffle(&mut self.cards, rng);
        log::debug!("shuffled {} cards", self.cards.len());
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn num_decks(&self) -> u8 {
        self.num_decks
    }

    pub fn full_size(&self) -> usize {
        self.num_decks as usize * DECK_SIZE
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// True once fewer than `threshold` of the full shoe remains.
    pub fn needs_reshuffle(&self, threshold: f64) -> bool {
        (self.cards.len() as f64) < self.full_size() as f64 * threshold
    }

    pub fn composition(&self) -> Composition {
        Composition::from_cards(&self.cards)
    }
}

/// Card counts by value class (0 = Ace, 1..=8 = Two..Nine, 9 = ten-valued).
/// Scoring only depends on value, so the estimator works on this instead of
/// individual cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Composition {
    counts: [u16; VALUE_CLASSES],
}

impl Composition {
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut counts = [0u16; VALUE_CLASSES];
        for card in cards {
            counts[card.value_class()] += 1;
        }
        Self { counts }
    }

    /// Point value of a class, aces as 11.
    pub fn class_value(class: usize) -> u8 {
        match class {
            0 => 11,
            c => (c + 1).min(10) as u8,
        }
    }

    pub fn count(&self, class: usize) -> u16 {
        self.counts[class]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Take one card of `class` out. Returns false if none are left.
    pub fn remove(&mut self, class: usize) -> bool {
        if self.counts[class] == 0 {
            return false;
        }
        self.counts[class] -= 1;
        true
    }

    /// Value classes that still have cards, with their counts.
    pub fn classes(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &n)| n > 0)
            .map(|(class, &n)| (class, n))
    }

    /// Uniform draw without replacement. `None` when empty.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut pick = rng.gen_range(0..total);
        for class in 0..VALUE_CLASSES {
            let n = self.counts[class] as u32;
            if pick < n {
                self.counts[class] -= 1;
                return Some(class);
            }
            pick -= n;
        }
        None
    }
}
