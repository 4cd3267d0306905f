use blackjack::{score_hand, Card, ProbabilitySnapshot};
use blackjack_table::{Phase, TableState};

fn cards(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn signed(value: f64) -> String {
    format!("{value:+.2}")
}

/// The whole table as printed after every transition.
pub fn table(state: &TableState, sidebar: Option<&ProbabilitySnapshot>) -> String {
    let mut lines = Vec::new();

    if !state.dealer.is_empty() {
        let visible = state.visible_dealer_cards();
        let mut dealer = cards(visible);
        if !state.hole_revealed {
            dealer.push_str(" ??");
        }
        lines.push(format!(
            "Dealer: {:<24} ({})",
            dealer,
            score_hand(visible).score
        ));
        let soft = if state.player.is_soft() { "soft " } else { "" };
        lines.push(format!(
            "Player: {:<24} ({}{})",
            cards(state.player.cards()),
            soft,
            state.player.score()
        ));
    }

    let true_count = state.running_count.true_count(state.shoe.len());
    lines.push(format!(
        "Chips: ${}  Bet: ${}  Decks: {}  Cards left: {}  Count: {:+} (true {:+.1})",
        state.player_chips,
        state.current_bet,
        state.rules.num_decks,
        state.shoe.len(),
        state.running_count.value(),
        true_count
    ));

    if let Some(snap) = sidebar {
        lines.push(format!(
            "  Hit:    bust {:5.1}%  EV {}",
            snap.hit_bust_probability,
            signed(snap.hit_ev)
        ));
        lines.push(format!(
            "  Stand:  win  {:5.1}%  EV {}",
            snap.stand_win_probability,
            signed(snap.stand_ev)
        ));
        if state.can_double_down() {
            lines.push(format!(
                "  Double: win  {:5.1}%  EV {}",
                snap.double_down_win_probability,
                signed(snap.double_down_ev)
            ));
        }
    }

    lines.push(state.message.clone());
    if state.phase == Phase::PlayerTurn && state.player.can_split() {
        lines.push("Pairs cannot be split at this table.".to_string());
    }
    if matches!(state.phase, Phase::Betting | Phase::Settlement)
        && state.player_chips < state.rules.min_bet
    {
        lines.push(format!(
            "Not enough chips for the ${} minimum. Start over with --fresh.",
            state.rules.min_bet
        ));
    }
    lines.join("\n")
}

/// Sidebar numbers for the `odds` subcommand.
pub fn odds(player: &[Card], dealer_up: &Card, snap: &ProbabilitySnapshot) -> String {
    let score = score_hand(player);
    [
        format!(
            "Player {} ({}) vs dealer {}",
            cards(player),
            score.score,
            dealer_up
        ),
        format!(
            "Hit:    bust {:5.1}%  EV {}",
            snap.hit_bust_probability,
            signed(snap.hit_ev)
        ),
        format!(
            "Stand:  win  {:5.1}%  EV {}",
            snap.stand_win_probability,
            signed(snap.stand_ev)
        ),
        format!(
            "Double: win  {:5.1}%  EV {}",
            snap.double_down_win_probability,
            signed(snap.double_down_ev)
        ),
    ]
    .join("\n")
}
