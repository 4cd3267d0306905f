use blackjack::{
    dealer_should_hit, Card, Estimator, Hand, ProbabilitySnapshot, RunningCount, Shoe, TableRules,
    MAX_DECKS,
};
use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::TableError;

/// Cards needed for the initial deal.
const INITIAL_DEAL: usize = 4;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Betting,
    Dealing,
    PlayerTurn,
    DealerTurn,
    Settlement,
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Blackjack,
    PlayerBust,
    DealerBust,
    PlayerWin,
    DealerWin,
    Push,
    /// Dealer needed a card and the shoe was empty. The wager is forfeit.
    ShoeExhausted,
}

impl Outcome {
    /// Chips returned to the player for a wager that was already deducted.
    pub fn credit(&self, bet: u64, rules: &TableRules) -> u64 {
        match self {
            Outcome::Blackjack => rules.blackjack_payout.total_return(bet),
            Outcome::DealerBust | Outcome::PlayerWin => bet * 2,
            Outcome::Push => bet,
            Outcome::PlayerBust | Outcome::DealerWin | Outcome::ShoeExhausted => 0,
        }
    }
}

/// Everything the player (or a scheduled dealer tick) can ask the table to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    PlaceBet(u64),
    Deal,
    Hit,
    Stand,
    DoubleDown,
    Split,
    /// One paced step of dealer play. Only valid for the round it was scheduled in.
    DealerTick { round_id: u64 },
    SetNumDecks(u8),
    ResetShoe,
}

/// One table session: the live round plus chips, shoe and count carried across rounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    pub rules: TableRules,
    pub phase: Phase,
    pub player: Hand,
    pub dealer: Hand,
    pub hole_revealed: bool,
    pub current_bet: u64,
    pub player_chips: u64,
    pub running_count: RunningCount,
    pub shoe: Shoe,
    /// Bumped on every deal and reshuffle so stale dealer ticks can be told apart
    pub round_id: u64,
    pub doubled: bool,
    pub outcome: Option<Outcome>,
    pub message: String,
}

/// Apply one action. On error the caller keeps `state`; nothing is half-applied.
pub fn reduce<R: Rng + ?Sized>(
    state: &TableState,
    action: Action,
    rng: &mut R,
) -> Result<TableState, TableError> {
    let mut next = state.clone();
    match action {
        Action::PlaceBet(amount) => next.place_bet(amount)?,
        Action::Deal => next.deal(rng)?,
        Action::Hit => next.hit()?,
        Action::Stand => next.stand()?,
        Action::DoubleDown => next.double_down()?,
        Action::Split => return Err(TableError::SplitUnsupported),
        Action::DealerTick { round_id } => next.dealer_tick(round_id)?,
        Action::SetNumDecks(num_decks) => next.set_num_decks(num_decks, rng)?,
        Action::ResetShoe => {
            next.reset(rng);
            next.message = "Shoe reset. Place your bet!".to_string();
        }
    }
    Ok(next)
}

impl TableState {
    pub fn new<R: Rng + ?Sized>(rules: TableRules, rng: &mut R) -> Result<Self, TableError> {
        rules.validate().map_err(TableError::InvalidRules)?;
        let shoe = Shoe::shuffled(rules.num_decks, rng);
        Ok(Self::with_shoe(rules, rules.starting_chips, shoe))
    }

    /// A table on a specific shoe, e.g. a stacked one.
    pub fn with_shoe(rules: TableRules, player_chips: u64, shoe: Shoe) -> Self {
        Self {
            rules,
            phase: Phase::Betting,
            player: Hand::new(),
            dealer: Hand::new(),
            hole_revealed: false,
            current_bet: 0,
            player_chips,
            running_count: RunningCount::new(),
            shoe,
            round_id: 0,
            doubled: false,
            outcome: None,
            message: "Place your bet!".to_string(),
        }
    }

    pub fn dealer_up_card(&self) -> Option<&Card> {
        self.dealer.cards().first()
    }

    /// Dealer cards the player may see.
    pub fn visible_dealer_cards(&self) -> &[Card] {
        let cards = self.dealer.cards();
        if self.hole_revealed {
            cards
        } else {
            &cards[..cards.len().min(1)]
        }
    }

    /// A hand is in progress and a wager is on the table.
    pub fn is_hand_live(&self) -> bool {
        matches!(
            self.phase,
            Phase::Dealing | Phase::PlayerTurn | Phase::DealerTurn
        )
    }

    pub fn can_double_down(&self) -> bool {
        self.phase == Phase::PlayerTurn
            && !self.doubled
            && self.player.len() == 2
            && self.player_chips >= self.current_bet
    }

    /// Cards the player has not seen: the undealt shoe plus a face-down hole card.
    pub fn unseen_cards(&self) -> Vec<Card> {
        let mut unseen = self.shoe.cards().to_vec();
        if !self.hole_revealed {
            unseen.extend(self.dealer.cards().get(1).copied());
        }
        unseen
    }

    /// Sidebar numbers for the current decision. Zeroed outside the player's turn.
    pub fn probabilities<R: Rng + ?Sized>(
        &self,
        estimator: &Estimator,
        rng: &mut R,
    ) -> ProbabilitySnapshot {
        let Some(up) = self.dealer_up_card() else {
            return ProbabilitySnapshot::default();
        };
        if self.phase != Phase::PlayerTurn {
            return ProbabilitySnapshot::default();
        }
        estimator.snapshot(
            &self.player,
            up,
            &self.unseen_cards(),
            self.current_bet,
            rng,
        )
    }

    fn draw(&mut self) -> Option<Card> {
        let card = self.shoe.draw()?;
        self.running_count.observe(&card);
        debug!(
            "drew {} (count {}, {} left)",
            card,
            self.running_count.value(),
            self.shoe.len()
        );
        Some(card)
    }

    fn place_bet(&mut self, amount: u64) -> Result<(), TableError> {
        if !matches!(self.phase, Phase::Betting | Phase::Settlement) {
            return Err(TableError::OutOfTurn {
                action: "place a bet",
            });
        }
        if amount < self.rules.min_bet || amount > self.rules.max_bet {
            return Err(TableError::BetOutOfRange {
                min: self.rules.min_bet,
                max: self.rules.max_bet,
            });
        }
        if amount > self.player_chips {
            return Err(TableError::InsufficientChips);
        }

        self.player_chips -= amount;
        self.current_bet = amount;
        self.player.clear();
        self.dealer.clear();
        self.hole_revealed = false;
        self.doubled = false;
        self.outcome = None;
        self.phase = Phase::Dealing;
        self.message = format!("Bet ${amount}. Dealing...");
        Ok(())
    }

    fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), TableError> {
        if self.phase != Phase::Dealing {
            return Err(TableError::OutOfTurn { action: "deal" });
        }

        if self.shoe.len() < INITIAL_DEAL || self.shoe.needs_reshuffle(self.rules.reshuffle_threshold)
        {
            info!(
                "shoe down to {} of {} cards, reshuffling before the deal",
                self.shoe.len(),
                self.shoe.full_size()
            );
            self.player_chips += self.current_bet;
            self.current_bet = 0;
            self.reshuffle(rng);
            self.phase = Phase::Betting;
            self.message = "Shuffling the shoe... Please place your bet!".to_string();
            return Ok(());
        }

        self.round_id += 1;
        for i in 0..INITIAL_DEAL {
            let card = self.draw().ok_or(TableError::ShoeEmpty)?;
            if i % 2 == 0 {
                self.player.push(card);
            } else {
                self.dealer.push(card);
            }
        }

        if self.player.score() == 21 {
            self.finish(Outcome::Blackjack);
        } else {
            self.phase = Phase::PlayerTurn;
            self.message = "Hit or Stand?".to_string();
        }
        Ok(())
    }

    fn hit(&mut self) -> Result<(), TableError> {
        if self.phase != Phase::PlayerTurn {
            return Err(TableError::OutOfTurn { action: "hit" });
        }
        let card = self.draw().ok_or(TableError::ShoeEmpty)?;
        self.player.push(card);

        if self.player.is_busted() {
            self.finish(Outcome::PlayerBust);
        } else if self.player.score() == 21 {
            self.phase = Phase::DealerTurn;
            self.message = "21! Waiting for dealer...".to_string();
        } else {
            self.message = "Hit or Stand?".to_string();
        }
        Ok(())
    }

    fn stand(&mut self) -> Result<(), TableError> {
        if self.phase != Phase::PlayerTurn {
            return Err(TableError::OutOfTurn { action: "stand" });
        }
        self.phase = Phase::DealerTurn;
        self.message = "Player stands. Dealer's turn.".to_string();
        Ok(())
    }

    fn double_down(&mut self) -> Result<(), TableError> {
        if self.phase != Phase::PlayerTurn {
            return Err(TableError::OutOfTurn {
                action: "double down",
            });
        }
        if !self.can_double_down() {
            return Err(TableError::DoubleDownUnavailable);
        }

        let card = self.draw().ok_or(TableError::ShoeEmpty)?;
        self.player_chips -= self.current_bet;
        self.current_bet *= 2;
        self.doubled = true;
        self.player.push(card);

        // A doubled hand that survives always goes to the dealer.
        if self.player.is_busted() {
            self.finish(Outcome::PlayerBust);
        } else {
            self.phase = Phase::DealerTurn;
            self.message = "Player doubled down. Dealer's turn.".to_string();
        }
        Ok(())
    }

    fn dealer_tick(&mut self, round_id: u64) -> Result<(), TableError> {
        if round_id != self.round_id || self.phase != Phase::DealerTurn {
            return Err(TableError::StaleTick(round_id));
        }

        if !self.hole_revealed {
            self.hole_revealed = true;
            if let Some(hole) = self.dealer.cards().get(1) {
                self.message = format!("Dealer reveals {hole}.");
            }
        } else {
            let Some(card) = self.draw() else {
                self.finish(Outcome::ShoeExhausted);
                return Ok(());
            };
            self.dealer.push(card);
            self.message = format!("Dealer draws {card}.");
        }

        if !dealer_should_hit(self.dealer.hand_score(), self.rules.dealer_hits_soft_17) {
            self.settle();
        } else if self.shoe.is_empty() {
            self.finish(Outcome::ShoeExhausted);
        }
        Ok(())
    }

    fn settle(&mut self) {
        let player = self.player.score();
        let dealer = self.dealer.score();
        let outcome = if dealer > 21 {
            Outcome::DealerBust
        } else if player > dealer {
            Outcome::PlayerWin
        } else if player < dealer {
            Outcome::DealerWin
        } else {
            Outcome::Push
        };
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: Outcome) {
        let bet = self.current_bet;
        let credit = outcome.credit(bet, &self.rules);
        self.player_chips += credit;
        self.current_bet = 0;
        self.hole_revealed = true;
        self.outcome = Some(outcome);
        self.phase = Phase::Settlement;
        self.message = match outcome {
            Outcome::Blackjack => format!(
                "Blackjack! You win ${}!",
                self.rules.blackjack_payout.calculate_payout(bet)
            ),
            Outcome::PlayerBust if self.doubled => {
                "Player busts on double down! You lose.".to_string()
            }
            Outcome::PlayerBust => "Player busts! You lose.".to_string(),
            Outcome::DealerBust => "Dealer busts! You win!".to_string(),
            Outcome::PlayerWin => "You win!".to_string(),
            Outcome::DealerWin => "Dealer wins! You lose.".to_string(),
            Outcome::Push => "Push!".to_string(),
            Outcome::ShoeExhausted => "Deck ran out!".to_string(),
        };
        info!(
            "round {} settled: {:?}, bet {}, credited {}, chips {}",
            self.round_id, outcome, bet, credit, self.player_chips
        );
    }

    fn set_num_decks<R: Rng + ?Sized>(
        &mut self,
        num_decks: u8,
        rng: &mut R,
    ) -> Result<(), TableError> {
        if num_decks == 0 || num_decks > MAX_DECKS {
            return Err(TableError::InvalidDeckCount(num_decks));
        }
        self.rules.num_decks = num_decks;
        self.reset(rng);
        self.message = "Number of decks changed. Place your bet!".to_string();
        Ok(())
    }

    /// Fresh shoe and count. A hand in progress is voided and its wager returned.
    fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.is_hand_live() {
            info!("voiding round {}, returning {}", self.round_id, self.current_bet);
            self.player_chips += self.current_bet;
        }
        self.current_bet = 0;
        self.player.clear();
        self.dealer.clear();
        self.hole_revealed = false;
        self.doubled = false;
        self.outcome = None;
        self.reshuffle(rng);
        self.phase = Phase::Betting;
    }

    fn reshuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.shoe = Shoe::shuffled(self.rules.num_decks, rng);
        self.running_count.reset();
        self.round_id += 1;
        info!(
            "new {}-deck shoe ({} cards)",
            self.rules.num_decks,
            self.shoe.len()
        );
    }
}
