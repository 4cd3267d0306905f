use blackjack::{Shoe, TableRules};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{TableError, TableState};

/// What survives between runs. The shoe and count do not: a resumed session
/// starts on a fresh shoe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub player_chips: u64,
    pub num_decks: u8,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl TableState {
    /// Chips already staked on a live hand are not included.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            player_chips: self.player_chips,
            num_decks: self.rules.num_decks,
        }
    }

    /// Pick a session back up under `rules`, keeping the saved deck count.
    pub fn resume<R: Rng + ?Sized>(
        snapshot: SessionSnapshot,
        rules: TableRules,
        rng: &mut R,
    ) -> Result<Self, TableError> {
        let rules = TableRules {
            num_decks: snapshot.num_decks,
            ..rules
        };
        rules.validate().map_err(|e| {
            if snapshot.num_decks == 0 || snapshot.num_decks > blackjack::MAX_DECKS {
                TableError::InvalidDeckCount(snapshot.num_decks)
            } else {
                TableError::InvalidRules(e)
            }
        })?;
        let shoe = Shoe::shuffled(rules.num_decks, rng);
        Ok(Self::with_shoe(rules, snapshot.player_chips, shoe))
    }
}
