use blackjack_table::Action;
use std::str::FromStr;

/// One line typed at the table prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Bet(u64),
    Hit,
    Stand,
    Double,
    Split,
    Decks(u8),
    Reset,
    /// Reprint the table
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  b, bet <amount>   place a bet and deal
  h, hit            take a card
  s, stand          hold your total
  d, double         double the bet, take one card
  p, split          (not offered at this table)
  decks <1-8>       change the number of decks and reshuffle
  reset             reshuffle the shoe
  <enter>           show the table
  ?, help           this list
  q, quit           save and leave";

impl Command {
    /// Table actions for this command, in order. `Bet` also deals.
    pub fn actions(&self) -> Vec<Action> {
        match *self {
            Command::Bet(amount) => vec![Action::PlaceBet(amount), Action::Deal],
            Command::Hit => vec![Action::Hit],
            Command::Stand => vec![Action::Stand],
            Command::Double => vec![Action::DoubleDown],
            Command::Split => vec![Action::Split],
            Command::Decks(n) => vec![Action::SetNumDecks(n)],
            Command::Reset => vec![Action::ResetShoe],
            Command::Show | Command::Help | Command::Quit => Vec::new(),
        }
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(Command::Show);
        };
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(format!("Too many arguments: {s}"));
        }

        let command = match (word.to_ascii_lowercase().as_str(), arg) {
            ("b" | "bet", Some(amount)) => Command::Bet(
                amount
                    .trim_start_matches('$')
                    .parse()
                    .map_err(|_| format!("Invalid bet amount: {amount}"))?,
            ),
            ("b" | "bet", None) => return Err("Usage: bet <amount>".to_string()),
            ("decks", Some(n)) => Command::Decks(
                n.parse()
                    .map_err(|_| format!("Invalid number of decks: {n}"))?,
            ),
            ("decks", None) => return Err("Usage: decks <1-8>".to_string()),
            ("h" | "hit", None) => Command::Hit,
            ("s" | "stand", None) => Command::Stand,
            ("d" | "double", None) => Command::Double,
            ("p" | "split", None) => Command::Split,
            ("reset", None) => Command::Reset,
            ("?" | "help", None) => Command::Help,
            ("q" | "quit" | "exit", None) => Command::Quit,
            (_, Some(_)) if is_known(word) => {
                return Err(format!("{word} takes no arguments"));
            }
            _ => return Err(format!("Unknown command: {word}. Type ? for help.")),
        };
        Ok(command)
    }
}

fn is_known(word: &str) -> bool {
    matches!(
        word.to_ascii_lowercase().as_str(),
        "h" | "hit" | "s" | "stand" | "d" | "double" | "p" | "split" | "reset" | "?" | "help" | "q"
            | "quit" | "exit"
    )
}
