use crate::Card;
use serde::{Deserialize, Serialize};

/// Total the dealer stands on.
pub const DEALER_STANDS_ON: u8 = 17;

/// Best blackjack total of a set of cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HandScore {
    pub score: u8,
    /// An ace is still counted as 11 in `score`.
    pub is_soft: bool,
}

/// Score a hand: every ace starts at 11 and is demoted to 1 while the total is over 21.
pub fn score_hand(cards: &[Card]) -> HandScore {
    let mut total: u16 = 0;
    let mut aces = 0;

    for card in cards {
        if card.is_ace() {
            aces += 1;
        }
        total += card.value() as u16;
    }

    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }

    HandScore {
        score: u8::try_from(total).unwrap_or(u8::MAX),
        is_soft: aces > 0 && total <= 21,
    }
}

pub fn is_busted(cards: &[Card]) -> bool {
    score_hand(cards).score > 21
}

/// 21 with the first two cards.
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && score_hand(cards).score == 21
}

pub fn can_split_cards(card1: &Card, card2: &Card) -> bool {
    card1.rank == card2.rank
}

/// Whether a dealer holding `score` draws another card.
pub fn dealer_should_hit(score: HandScore, hits_soft_17: bool) -> bool {
    if score.score < DEALER_STANDS_ON {
        true
    } else {
        score.score == DEALER_STANDS_ON && score.is_soft && hits_soft_17
    }
}

/// Cards plus their score. The score is rebuilt from the cards on every push.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Card>", into = "Vec<Card>")]
pub struct Hand {
    cards: Vec<Card>,
    score: HandScore,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        let score = score_hand(&cards);
        Self { cards, score }
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
        self.score = score_hand(&self.cards);
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.score = HandScore::default();
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn score(&self) -> u8 {
        self.score.score
    }

    pub fn is_soft(&self) -> bool {
        self.score.is_soft
    }

    pub fn hand_score(&self) -> HandScore {
        self.score
    }

    pub fn is_busted(&self) -> bool {
        self.score.score > 21
    }

    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.score.score == 21
    }

    pub fn can_split(&self) -> bool {
        self.cards.len() == 2 && can_split_cards(&self.cards[0], &self.cards[1])
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Self::from_cards(cards)
    }
}

impl From<Hand> for Vec<Card> {
    fn from(hand: Hand) -> Self {
        hand.cards
    }
}
