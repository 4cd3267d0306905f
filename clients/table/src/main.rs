mod command;
mod render;

use blackjack::{create_shoe, Card, Hand, PayoutRatio, DEFAULT_SIMULATIONS};
use blackjack_table::{
    reduce, Action, Estimator, Phase, SessionSnapshot, TableError, TableRules, TableState,
};
use clap::{Parser, Subcommand};
use command::Command;
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

type BoxErr = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(
    name = "blackjack-table",
    about = "Single-player blackjack table with a card-counting sidebar"
)]
struct Cli {
    /// Rules preset: default, casual or high_roller
    #[arg(long, env = "BJ_PRESET", default_value = "default")]
    preset: String,

    /// Minimum bet (overrides the preset)
    #[arg(long, env = "BJ_MIN_BET")]
    min_bet: Option<u64>,

    /// Maximum bet (overrides the preset)
    #[arg(long, env = "BJ_MAX_BET")]
    max_bet: Option<u64>,

    /// Chips for a brand new session
    #[arg(long, env = "BJ_STARTING_CHIPS")]
    starting_chips: Option<u64>,

    /// Number of decks in the shoe (1-8)
    #[arg(long, env = "BJ_DECKS")]
    decks: Option<u8>,

    /// Blackjack payout ratio (e.g. "3:2")
    #[arg(long, env = "BJ_BLACKJACK_PAYOUT")]
    blackjack_payout: Option<PayoutRatio>,

    /// Dealer hits soft 17
    #[arg(long, env = "BJ_HITS_SOFT_17")]
    dealer_hits_soft_17: Option<bool>,

    /// Reshuffle before a deal once less than this fraction of the shoe is left
    #[arg(long, env = "BJ_RESHUFFLE_AT")]
    reshuffle_threshold: Option<f64>,

    /// Dealer playouts per estimate
    #[arg(long, env = "BJ_SIMULATIONS", default_value_t = DEFAULT_SIMULATIONS)]
    simulations: usize,

    /// Seed for the shuffle and the estimator (random if unset)
    #[arg(long, env = "BJ_SEED")]
    seed: Option<u64>,

    /// Where chips and deck count are kept between runs
    #[arg(long, env = "BJ_STATE_FILE", default_value = "blackjack-session.json")]
    state_file: PathBuf,

    /// Pause between dealer cards, in milliseconds
    #[arg(long, env = "BJ_DEALER_DELAY_MS", default_value_t = 600)]
    dealer_delay_ms: u64,

    /// Ignore any saved session and start with fresh chips
    #[arg(long)]
    fresh: bool,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Estimate hit, stand and double down for one hand against a full shoe
    Odds {
        /// Player cards, comma separated (e.g. 10h,6c)
        #[arg(long, value_delimiter = ',', required = true)]
        player: Vec<Card>,

        /// Dealer up card (e.g. 9s)
        #[arg(long)]
        dealer: Card,

        #[arg(long, default_value_t = 10)]
        bet: u64,

        /// Print the numbers as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    fn rules(&self) -> Result<TableRules, BoxErr> {
        let mut rules = TableRules::preset(&self.preset)
            .ok_or_else(|| format!("Unknown preset: {}", self.preset))?;
        if let Some(min_bet) = self.min_bet {
            rules.min_bet = min_bet;
        }
        if let Some(max_bet) = self.max_bet {
            rules.max_bet = max_bet;
        }
        if let Some(chips) = self.starting_chips {
            rules.starting_chips = chips;
        }
        if let Some(decks) = self.decks {
            rules.num_decks = decks;
        }
        if let Some(payout) = self.blackjack_payout {
            rules.blackjack_payout = payout;
        }
        if let Some(h17) = self.dealer_hits_soft_17 {
            rules.dealer_hits_soft_17 = h17;
        }
        if let Some(threshold) = self.reshuffle_threshold {
            rules.reshuffle_threshold = threshold;
        }
        rules.validate()?;
        Ok(rules)
    }
}

enum Event {
    Line(Option<String>),
    Tick(u64),
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BoxErr> {
    let rules = cli.rules()?;
    let estimator = Estimator::new(cli.simulations, rules.dealer_hits_soft_17);
    let mut rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    match cli.mode {
        Some(Mode::Odds {
            player,
            dealer,
            bet,
            json,
        }) => odds(&rules, &estimator, &player, &dealer, bet, json, &mut rng),
        None => {
            let state = load_or_new(&cli.state_file, rules, cli.decks, cli.fresh, &mut rng)?;
            let delay = Duration::from_millis(cli.dealer_delay_ms);
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(play(state, &estimator, &mut rng, delay, &cli.state_file))
        }
    }
}

fn odds(
    rules: &TableRules,
    estimator: &Estimator,
    player: &[Card],
    dealer: &Card,
    bet: u64,
    json: bool,
    rng: &mut ChaCha8Rng,
) -> Result<(), BoxErr> {
    let mut unseen = create_shoe(rules.num_decks);
    for card in player.iter().chain(std::iter::once(dealer)) {
        let pos = unseen.iter().position(|c| c == card).ok_or_else(|| {
            format!(
                "{card} appears more often than a {}-deck shoe holds",
                rules.num_decks
            )
        })?;
        unseen.swap_remove(pos);
    }

    let hand = Hand::from_cards(player.to_vec());
    let snap = estimator.snapshot(&hand, dealer, &unseen, bet, rng);
    if json {
        println!("{}", serde_json::to_string_pretty(&snap)?);
    } else {
        println!("{}", render::odds(player, dealer, &snap));
    }
    Ok(())
}

/// A deck count given with `--decks` or `BJ_DECKS` beats the saved one.
fn resume_decks(snapshot: SessionSnapshot, decks: Option<u8>) -> SessionSnapshot {
    match decks {
        Some(decks) if decks != snapshot.num_decks => {
            log::info!(
                "Using {decks} decks from the command line instead of the saved {}",
                snapshot.num_decks
            );
            SessionSnapshot {
                num_decks: decks,
                ..snapshot
            }
        }
        _ => snapshot,
    }
}

fn load_or_new(
    path: &Path,
    rules: TableRules,
    decks: Option<u8>,
    fresh: bool,
    rng: &mut ChaCha8Rng,
) -> Result<TableState, BoxErr> {
    if !fresh {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let resumed = SessionSnapshot::from_json(&json)
                    .map_err(BoxErr::from)
                    .and_then(|snapshot| {
                        TableState::resume(resume_decks(snapshot, decks), rules, rng)
                            .map_err(BoxErr::from)
                    });
                match resumed {
                    Ok(state) => {
                        log::info!(
                            "Resumed session from {}: ${} chips, {} decks",
                            path.display(),
                            state.player_chips,
                            state.rules.num_decks
                        );
                        return Ok(state);
                    }
                    Err(e) => log::warn!("Ignoring session file {}: {e}", path.display()),
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not read {}: {e}", path.display()),
        }
    }
    Ok(TableState::new(rules, rng)?)
}

fn save(path: &Path, state: &TableState) {
    let result = state
        .snapshot()
        .to_json()
        .map_err(BoxErr::from)
        .and_then(|json| std::fs::write(path, json).map_err(BoxErr::from));
    match result {
        Ok(()) => log::debug!("Saved session to {}", path.display()),
        Err(e) => log::warn!("Could not save session to {}: {e}", path.display()),
    }
}

fn show(state: &TableState, estimator: &Estimator, rng: &mut ChaCha8Rng) {
    let sidebar = (state.phase == Phase::PlayerTurn).then(|| state.probabilities(estimator, rng));
    println!("\n{}", render::table(state, sidebar.as_ref()));
}

async fn play(
    mut state: TableState,
    estimator: &Estimator,
    rng: &mut ChaCha8Rng,
    delay: Duration,
    path: &Path,
) -> Result<(), BoxErr> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    show(&state, estimator, rng);
    println!("Type ? for help.");

    loop {
        // Typing anything while the dealer plays drops the pending tick.
        let event = if state.phase == Phase::DealerTurn {
            let round_id = state.round_id;
            tokio::select! {
                line = lines.next_line() => Event::Line(line?),
                _ = tokio::time::sleep(delay) => Event::Tick(round_id),
            }
        } else {
            Event::Line(lines.next_line().await?)
        };

        let actions = match event {
            Event::Tick(round_id) => vec![Action::DealerTick { round_id }],
            Event::Line(None) => break,
            Event::Line(Some(line)) => match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => {
                    println!("{}", command::HELP);
                    continue;
                }
                Ok(Command::Show) => {
                    show(&state, estimator, rng);
                    continue;
                }
                Ok(command) => command.actions(),
                Err(e) => {
                    println!("{e}");
                    continue;
                }
            },
        };

        let mut changed = false;
        for action in actions {
            match reduce(&state, action, rng) {
                Ok(next) => {
                    state = next;
                    changed = true;
                }
                Err(TableError::StaleTick(round_id)) => {
                    log::debug!("Dropped stale dealer tick for round {round_id}");
                    break;
                }
                Err(e) => {
                    println!("{e}");
                    break;
                }
            }
        }

        if changed {
            if !state.is_hand_live() {
                save(path, &state);
            }
            show(&state, estimator, rng);
        }
    }

    if state.is_hand_live() {
        println!("Leaving mid-hand forfeits the ${} bet.", state.current_bet);
    }
    save(path, &state);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved() -> SessionSnapshot {
        SessionSnapshot {
            player_chips: 730,
            num_decks: 2,
        }
    }

    #[test]
    fn test_decks_flag_beats_saved_session() {
        assert_eq!(
            resume_decks(saved(), Some(6)),
            SessionSnapshot {
                player_chips: 730,
                num_decks: 6,
            }
        );
        assert_eq!(resume_decks(saved(), Some(2)), saved());
        assert_eq!(resume_decks(saved(), None), saved());
    }

    #[test]
    fn test_load_or_new_applies_decks_flag() {
        let path = std::env::temp_dir().join(format!(
            "blackjack-session-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, saved().to_json().unwrap()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        let state = load_or_new(&path, TableRules::default(), Some(6), false, &mut rng).unwrap();
        assert_eq!(state.player_chips, 730);
        assert_eq!(state.rules.num_decks, 6);
        assert_eq!(state.shoe.len(), 6 * 52);

        let state = load_or_new(&path, TableRules::default(), None, false, &mut rng).unwrap();
        assert_eq!(state.rules.num_decks, 2);

        std::fs::remove_file(&path).unwrap();
    }
}
