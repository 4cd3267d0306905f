use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::hand::{dealer_should_hit, HandScore};
use crate::shoe::Composition;
use crate::{Card, Hand};

/// Dealer playouts per stand estimate.
pub const DEFAULT_SIMULATIONS: usize = 2000;

/// Player-perspective result fractions. Sum to 1, or all zero when no
/// playout could run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Outcomes {
    pub win: f64,
    pub push: f64,
    pub loss: f64,
}

impl Outcomes {
    pub const CERTAIN_LOSS: Self = Self {
        win: 0.0,
        push: 0.0,
        loss: 1.0,
    };

    pub fn total(&self) -> f64 {
        self.win + self.push + self.loss
    }
}

/// Win probability (percent) and monetary EV of doubling down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DoubleDownEstimate {
    pub win_probability: f64,
    pub ev: f64,
}

/// Everything the probability sidebar shows for one decision point.
/// Probabilities are percentages, EVs are in chips.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProbabilitySnapshot {
    pub hit_bust_probability: f64,
    pub stand_win_probability: f64,
    pub double_down_win_probability: f64,
    pub hit_ev: f64,
    pub stand_ev: f64,
    pub double_down_ev: f64,
}

/// EV of a wager given result fractions. A push returns the stake, so it
/// contributes nothing.
pub fn monetary_ev(outcomes: &Outcomes, bet: u64, multiplier: u8) -> f64 {
    let stake = bet as f64 * multiplier as f64;
    outcomes.win * stake - outcomes.loss * stake
}

/// Percentage of unseen cards that would bust `hand` if drawn next.
/// Exact, not sampled.
pub fn bust_probability_on_hit(hand: &Hand, unseen: &[Card]) -> f64 {
    if hand.is_busted() {
        return 100.0;
    }
    let comp = Composition::from_cards(unseen);
    let total = comp.total();
    if total == 0 {
        return 0.0;
    }
    let start = hand.hand_score();
    let busting: u32 = comp
        .classes()
        .filter(|&(class, _)| add_to_score(start, class).score > 21)
        .map(|(_, n)| n as u32)
        .sum();
    busting as f64 / total as f64 * 100.0
}

/// Add one card of `class` to a non-busted score.
fn add_to_score(score: HandScore, class: usize) -> HandScore {
    if class == 0 {
        if score.score + 11 <= 21 {
            HandScore {
                score: score.score + 11,
                is_soft: true,
            }
        } else if score.score + 1 > 21 && score.is_soft {
            HandScore {
                score: score.score + 1 - 10,
                is_soft: false,
            }
        } else {
            HandScore {
                score: score.score + 1,
                is_soft: score.is_soft,
            }
        }
    } else {
        let total = score.score + Composition::class_value(class);
        if total > 21 && score.is_soft {
            HandScore {
                score: total - 10,
                is_soft: false,
            }
        } else {
            HandScore {
                score: total,
                is_soft: score.is_soft,
            }
        }
    }
}

/// Monte Carlo and enumeration estimates for hit, stand and double down.
///
/// `unseen` is every card the player cannot see: the undealt shoe plus the
/// dealer's hole card. Known cards must not be in it. Nothing here mutates
/// the shoe or the hands it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimator {
    pub simulations: usize,
    pub dealer_hits_soft_17: bool,
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            simulations: DEFAULT_SIMULATIONS,
            dealer_hits_soft_17: false,
        }
    }
}

impl Estimator {
    pub fn new(simulations: usize, dealer_hits_soft_17: bool) -> Self {
        Self {
            simulations,
            dealer_hits_soft_17,
        }
    }

    /// Play the dealer out `simulations` times against a fixed player hand.
    pub fn simulate_dealer_outcomes<R: Rng + ?Sized>(
        &self,
        player: &Hand,
        dealer_up: &Card,
        unseen: &[Card],
        rng: &mut R,
    ) -> Outcomes {
        if player.is_busted() {
            return Outcomes::CERTAIN_LOSS;
        }
        let comp = Composition::from_cards(unseen);
        self.simulate(player.score(), dealer_up, &comp, rng)
    }

    fn simulate<R: Rng + ?Sized>(
        &self,
        player_score: u8,
        dealer_up: &Card,
        comp: &Composition,
        rng: &mut R,
    ) -> Outcomes {
        if player_score > 21 {
            return Outcomes::CERTAIN_LOSS;
        }
        if comp.is_empty() {
            return Outcomes::default();
        }

        let up = add_to_score(HandScore::default(), dealer_up.value_class());
        let (mut wins, mut pushes, mut losses) = (0u32, 0u32, 0u32);

        for _ in 0..self.simulations {
            let mut deck = *comp;
            let Some(hole) = deck.draw(rng) else {
                continue;
            };
            let mut dealer = add_to_score(up, hole);
            while dealer_should_hit(dealer, self.dealer_hits_soft_17) {
                match deck.draw(rng) {
                    Some(class) => dealer = add_to_score(dealer, class),
                    None => break,
                }
            }

            if dealer.score > 21 || player_score > dealer.score {
                wins += 1;
            } else if player_score < dealer.score {
                losses += 1;
            } else {
                pushes += 1;
            }
        }

        let played = wins + pushes + losses;
        if played == 0 {
            return Outcomes::default();
        }
        let played = played as f64;
        Outcomes {
            win: wins as f64 / played,
            push: pushes as f64 / played,
            loss: losses as f64 / played,
        }
    }

    /// Chance of beating the dealer by standing now, in percent.
    pub fn win_probability_on_stand<R: Rng + ?Sized>(
        &self,
        player: &Hand,
        dealer_up: &Card,
        unseen: &[Card],
        rng: &mut R,
    ) -> f64 {
        self.simulate_dealer_outcomes(player, dealer_up, unseen, rng).win * 100.0
    }

    pub fn ev_on_stand<R: Rng + ?Sized>(
        &self,
        player: &Hand,
        dealer_up: &Card,
        unseen: &[Card],
        bet: u64,
        rng: &mut R,
    ) -> f64 {
        let outcomes = self.simulate_dealer_outcomes(player, dealer_up, unseen, rng);
        monetary_ev(&outcomes, bet, 1)
    }

    /// EV of taking exactly one more card and then standing.
    pub fn ev_on_hit<R: Rng + ?Sized>(
        &self,
        player: &Hand,
        dealer_up: &Card,
        unseen: &[Card],
        bet: u64,
        rng: &mut R,
    ) -> f64 {
        if player.is_busted() {
            return -(bet as f64);
        }
        self.one_card_lookahead(player, dealer_up, unseen, bet, 1, rng).ev
    }

    /// Same lookahead as `ev_on_hit` with the stake doubled. Only two-card
    /// hands may double.
    pub fn double_down<R: Rng + ?Sized>(
        &self,
        player: &Hand,
        dealer_up: &Card,
        unseen: &[Card],
        bet: u64,
        rng: &mut R,
    ) -> DoubleDownEstimate {
        if player.len() != 2 {
            return DoubleDownEstimate {
                win_probability: 0.0,
                ev: -(bet as f64),
            };
        }
        self.one_card_lookahead(player, dealer_up, unseen, bet, 2, rng)
    }

    // Enumerates every next-card value class, weighted by how many of them
    // are unseen, and plays the dealer out against each resulting hand.
    fn one_card_lookahead<R: Rng + ?Sized>(
        &self,
        player: &Hand,
        dealer_up: &Card,
        unseen: &[Card],
        bet: u64,
        multiplier: u8,
        rng: &mut R,
    ) -> DoubleDownEstimate {
        let comp = Composition::from_cards(unseen);
        let total = comp.total();
        if total == 0 {
            return DoubleDownEstimate::default();
        }

        let start = player.hand_score();
        let mut ev = 0.0;
        let mut win = 0.0;
        for (class, n) in comp.classes() {
            let weight = n as f64 / total as f64;
            let next = add_to_score(start, class);
            if next.score > 21 {
                ev -= weight * bet as f64 * multiplier as f64;
                continue;
            }
            let mut rest = comp;
            rest.remove(class);
            let outcomes = self.simulate(next.score, dealer_up, &rest, rng);
            ev += weight * monetary_ev(&outcomes, bet, multiplier);
            win += weight * outcomes.win;
        }

        DoubleDownEstimate {
            win_probability: win * 100.0,
            ev,
        }
    }

    /// All six sidebar numbers for the current decision.
    pub fn snapshot<R: Rng + ?Sized>(
        &self,
        player: &Hand,
        dealer_up: &Card,
        unseen: &[Card],
        bet: u64,
        rng: &mut R,
    ) -> ProbabilitySnapshot {
        let stand = self.simulate_dealer_outcomes(player, dealer_up, unseen, rng);
        let double = self.double_down(player, dealer_up, unseen, bet, rng);
        let snapshot = ProbabilitySnapshot {
            hit_bust_probability: bust_probability_on_hit(player, unseen),
            stand_win_probability: stand.win * 100.0,
            double_down_win_probability: double.win_probability,
            hit_ev: self.ev_on_hit(player, dealer_up, unseen, bet, rng),
            stand_ev: monetary_ev(&stand, bet, 1),
            double_down_ev: double.ev,
        };
        debug!(
            "estimate for {} vs {} over {} unseen: {:?}",
            player.score(),
            dealer_up,
            unseen.len(),
            snapshot
        );
        snapshot
    }
}

#[cfg(test)]
mod tests;
