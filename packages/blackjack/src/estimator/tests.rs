use super::*;
use crate::hand::score_hand;
use crate::shoe::create_shoe;
use crate::{Rank, Suit};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn c(rank: Rank) -> Card {
    Card::new(rank, Suit::Diamonds)
}

fn hand(ranks: &[Rank]) -> Hand {
    Hand::from_cards(ranks.iter().map(|&r| c(r)).collect())
}

fn many(rank: Rank, n: usize) -> Vec<Card> {
    vec![c(rank); n]
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(2024)
}

#[test]
fn test_add_to_score_matches_full_rescore() {
    let mut starts: Vec<Vec<Rank>> = vec![
        vec![],
        vec![Rank::Ten, Rank::Six],
        vec![Rank::Ace, Rank::Ace],
        vec![Rank::Ten, Rank::Ten],
        vec![Rank::Ace, Rank::Five, Rank::Five],
        vec![Rank::Ace, Rank::Ace, Rank::Nine],
    ];
    // Every soft total from 12 (A+A) up to 21 (A+10).
    for rank in [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
    ] {
        starts.push(vec![Rank::Ace, rank]);
    }
    for start in &starts {
        let base = hand(start);
        for rank in Rank::ALL {
            let next = c(rank);
            let mut cards = base.cards().to_vec();
            cards.push(next);
            let added = add_to_score(base.hand_score(), next.value_class());
            assert_eq!(added, score_hand(&cards), "{:?} + {}", start, next);
            assert!(added.score <= 21 || !added.is_soft, "{:?} + {}", start, next);
        }
    }
}

#[test]
fn test_ace_never_busts_soft_21() {
    let aces = many(Rank::Ace, 4);
    for start in [
        &[Rank::Ace, Rank::Ten][..],
        &[Rank::Ace, Rank::Five, Rank::Five],
        &[Rank::Ace, Rank::Ace, Rank::Nine],
    ] {
        assert_eq!(bust_probability_on_hit(&hand(start), &aces), 0.0, "{:?}", start);
    }
    // No single card busts a soft hand.
    let mut unseen = many(Rank::Ace, 3);
    unseen.push(c(Rank::King));
    assert_eq!(bust_probability_on_hit(&hand(&[Rank::Ace, Rank::Nine]), &unseen), 0.0);
}

#[test]
fn test_bust_probability_three_of_ten() {
    let player = hand(&[Rank::Ten, Rank::Six]);
    let mut unseen = vec![
        c(Rank::Six),
        c(Rank::Seven),
        c(Rank::Eight),
    ];
    unseen.extend([
        c(Rank::Two),
        c(Rank::Three),
        c(Rank::Four),
        c(Rank::Five),
        c(Rank::Ace),
        c(Rank::Two),
        c(Rank::Three),
    ]);
    assert_eq!(unseen.len(), 10);
    let p = bust_probability_on_hit(&player, &unseen);
    assert!((p - 30.0).abs() < 1e-9, "got {p}");
}

#[test]
fn test_bust_probability_edges() {
    let busted = hand(&[Rank::King, Rank::Queen, Rank::Five]);
    assert_eq!(bust_probability_on_hit(&busted, &create_shoe(1)), 100.0);
    let fine = hand(&[Rank::Two, Rank::Three]);
    assert_eq!(bust_probability_on_hit(&fine, &[]), 0.0);
    assert_eq!(bust_probability_on_hit(&fine, &create_shoe(1)), 0.0);
    // Soft hands never bust on one card.
    let soft = hand(&[Rank::Ace, Rank::Nine]);
    assert_eq!(bust_probability_on_hit(&soft, &create_shoe(1)), 0.0);
}

#[test]
fn test_simulated_outcomes_sum_to_one() {
    let estimator = Estimator::default();
    let mut rng = rng();
    let shoe = create_shoe(6);
    for ranks in [
        &[Rank::Ten, Rank::Eight][..],
        &[Rank::Ten, Rank::Two],
        &[Rank::Ace, Rank::Seven],
    ] {
        let out = estimator.simulate_dealer_outcomes(&hand(ranks), &c(Rank::Six), &shoe, &mut rng);
        assert!((out.total() - 1.0).abs() < 1e-9, "{:?}", out);
    }
}

#[test]
fn test_busted_player_always_loses() {
    let out = Estimator::default().simulate_dealer_outcomes(
        &hand(&[Rank::King, Rank::Queen, Rank::Two]),
        &c(Rank::Six),
        &create_shoe(1),
        &mut rng(),
    );
    assert_eq!(out, Outcomes::CERTAIN_LOSS);
}

#[test]
fn test_empty_shoe_is_neutral() {
    let estimator = Estimator::default();
    let player = hand(&[Rank::Ten, Rank::Six]);
    let up = c(Rank::Nine);
    let mut rng = rng();
    assert_eq!(
        estimator.simulate_dealer_outcomes(&player, &up, &[], &mut rng),
        Outcomes::default()
    );
    assert_eq!(estimator.ev_on_hit(&player, &up, &[], 50, &mut rng), 0.0);
    assert_eq!(estimator.ev_on_stand(&player, &up, &[], 50, &mut rng), 0.0);
    assert_eq!(
        estimator.double_down(&player, &up, &[], 50, &mut rng),
        DoubleDownEstimate::default()
    );
    assert_eq!(
        estimator.snapshot(&player, &up, &[], 50, &mut rng),
        ProbabilitySnapshot::default()
    );
}

#[test]
fn test_stacked_shoe_push() {
    // Dealer 10 up, only tens left: dealer always makes 20.
    let out = Estimator::default().simulate_dealer_outcomes(
        &hand(&[Rank::King, Rank::Queen]),
        &c(Rank::Ten),
        &many(Rank::Jack, 20),
        &mut rng(),
    );
    assert_eq!(out.push, 1.0);
}

#[test]
fn test_stacked_shoe_dealer_busts() {
    // Dealer 6 up, tens only: 16 then a forced hit to 26.
    let estimator = Estimator::default();
    let player = hand(&[Rank::Ten, Rank::Two]);
    let unseen = many(Rank::King, 20);
    let mut rng = rng();
    let out = estimator.simulate_dealer_outcomes(&player, &c(Rank::Six), &unseen, &mut rng);
    assert_eq!(out.win, 1.0);
    assert_eq!(estimator.win_probability_on_stand(&player, &c(Rank::Six), &unseen, &mut rng), 100.0);
    assert_eq!(estimator.ev_on_stand(&player, &c(Rank::Six), &unseen, 40, &mut rng), 40.0);
}

#[test]
fn test_dealer_soft_17_rule() {
    // Dealer A up with a six underneath is soft 17.
    let player = hand(&[Rank::Ten, Rank::Seven]);
    let unseen = many(Rank::Six, 1);
    let stands = Estimator::new(100, false).simulate_dealer_outcomes(&player, &c(Rank::Ace), &unseen, &mut rng());
    assert_eq!(stands.push, 1.0);
    // With H17 the dealer wants another card but the shoe is dry, so still 17.
    let hits = Estimator::new(100, true).simulate_dealer_outcomes(&player, &c(Rank::Ace), &unseen, &mut rng());
    assert_eq!(hits.push, 1.0);
    let unseen = vec![c(Rank::Six), c(Rank::Two)];
    let hits = Estimator::new(500, true).simulate_dealer_outcomes(&player, &c(Rank::Ace), &unseen, &mut rng());
    // Either hole card ends on soft 19: A+6 hits soft 17 and takes the two,
    // A+2 takes the six.
    assert_eq!(hits.loss, 1.0);
}

#[test]
fn test_monetary_ev() {
    let outcomes = Outcomes {
        win: 0.5,
        push: 0.1,
        loss: 0.4,
    };
    assert!((monetary_ev(&outcomes, 100, 1) - 10.0).abs() < 1e-9);
    assert!((monetary_ev(&outcomes, 100, 2) - 20.0).abs() < 1e-9);
    assert_eq!(monetary_ev(&Outcomes::CERTAIN_LOSS, 25, 1), -25.0);
}

#[test]
fn test_ev_on_hit_certain_bust() {
    let player = hand(&[Rank::King, Rank::Queen]);
    let ev = Estimator::default().ev_on_hit(&player, &c(Rank::Nine), &many(Rank::Ten, 30), 50, &mut rng());
    assert_eq!(ev, -50.0);
}

#[test]
fn test_ev_on_hit_and_double_with_stacked_tens() {
    // Player 5 draws a ten to 15; dealer 6 + ten must hit and busts.
    let estimator = Estimator::default();
    let player = hand(&[Rank::Two, Rank::Three]);
    let unseen = many(Rank::Queen, 30);
    let mut rng = rng();
    assert_eq!(estimator.ev_on_hit(&player, &c(Rank::Six), &unseen, 50, &mut rng), 50.0);
    let double = estimator.double_down(&player, &c(Rank::Six), &unseen, 50, &mut rng);
    assert_eq!(double.ev, 100.0);
    assert!((double.win_probability - 100.0).abs() < 1e-9);
}

#[test]
fn test_double_down_requires_two_cards() {
    let player = hand(&[Rank::Two, Rank::Three, Rank::Four]);
    let double = Estimator::default().double_down(&player, &c(Rank::Six), &create_shoe(1), 30, &mut rng());
    assert_eq!(double.win_probability, 0.0);
    assert_eq!(double.ev, -30.0);
}

#[test]
fn test_hit_ev_weights_by_multiplicity() {
    // Hitting 16 against a ten with {10, 2, 2, 2} unseen:
    //   ten (1/4) busts for -100.
    //   two (3/4) makes 18. The dealer then holds the ten hole card a third
    //   of the time (20, player loses); otherwise 12, and every remaining
    //   draw busts the dealer. Expected EV = -25 + 0.75 * 100 * (2/3 - 1/3) = 0.
    let estimator = Estimator::new(2000, false);
    let player = hand(&[Rank::Ten, Rank::Six]);
    let unseen = vec![c(Rank::Ten), c(Rank::Two), c(Rank::Two), c(Rank::Two)];
    let ev = estimator.ev_on_hit(&player, &c(Rank::Ten), &unseen, 100, &mut rng());
    assert!(ev.abs() < 10.0, "got {ev}");
}

#[test]
fn test_same_seed_same_estimate() {
    let estimator = Estimator::default();
    let player = hand(&[Rank::Ten, Rank::Five]);
    let shoe = create_shoe(2);
    let a = estimator.snapshot(&player, &c(Rank::Nine), &shoe, 20, &mut ChaCha8Rng::seed_from_u64(5));
    let b = estimator.snapshot(&player, &c(Rank::Nine), &shoe, 20, &mut ChaCha8Rng::seed_from_u64(5));
    assert_eq!(a, b);
}

#[test]
fn test_snapshot_ranges_on_fresh_shoe() {
    let player = hand(&[Rank::Ten, Rank::Six]);
    let snap = Estimator::default().snapshot(&player, &c(Rank::Ten), &create_shoe(6), 10, &mut rng());
    for p in [
        snap.hit_bust_probability,
        snap.stand_win_probability,
        snap.double_down_win_probability,
    ] {
        assert!((0.0..=100.0).contains(&p), "{p}");
    }
    for ev in [snap.hit_ev, snap.stand_ev] {
        assert!((-10.0..=10.0).contains(&ev), "{ev}");
    }
    assert!((-20.0..=20.0).contains(&snap.double_down_ev));
    // Hard 16 against a ten is a losing spot either way.
    assert!(snap.stand_ev < 0.0);
    // 6, 7, 8, 9 and the four ten-valued ranks bust a hard 16.
    assert!((snap.hit_bust_probability - 8.0 / 13.0 * 100.0).abs() < 1e-9);
}
