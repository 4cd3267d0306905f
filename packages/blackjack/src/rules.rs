use serde::{Deserialize, Serialize};

/// Blackjack payout multiplier as a ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRatio {
    pub numerator: u16,
    pub denominator: u16,
}

impl PayoutRatio {
    pub const THREE_TO_TWO: Self = Self {
        numerator: 3,
        denominator: 2,
    };
    pub const SIX_TO_FIVE: Self = Self {
        numerator: 6,
        denominator: 5,
    };
    pub const ONE_TO_ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };

    pub fn new(numerator: u16, denominator: u16) -> Result<Self, &'static str> {
        if denominator == 0 {
            return Err("Denominator cannot be zero");
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Winnings on top of the returned stake, rounded down.
    pub fn calculate_payout(&self, bet: u64) -> u64 {
        (bet * self.numerator as u64) / self.denominator as u64
    }

    /// Stake plus winnings. 3:2 on a 50 bet returns 125.
    pub fn total_return(&self, bet: u64) -> u64 {
        bet + self.calculate_payout(bet)
    }
}

impl std::str::FromStr for PayoutRatio {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num, den) = s.split_once(':').ok_or("expected N:D (e.g. 3:2)")?;
        let num = num.trim().parse().map_err(|_| "invalid numerator")?;
        let den = den.trim().parse().map_err(|_| "invalid denominator")?;
        Self::new(num, den)
    }
}

/// Limits and house rules for one table session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRules {
    /// Smallest accepted wager
    pub min_bet: u64,

    /// Largest accepted wager
    pub max_bet: u64,

    /// Chips a brand new session starts with
    pub starting_chips: u64,

    /// Number of decks in the shoe
    pub num_decks: u8,

    /// Payout on a two-card 21
    pub blackjack_payout: PayoutRatio,

    /// Dealer hits on soft 17
    pub dealer_hits_soft_17: bool,

    /// Reshuffle before a deal once less than this fraction of the shoe is left
    pub reshuffle_threshold: f64,
}

pub const MAX_DECKS: u8 = 8;

impl Default for TableRules {
    fn default() -> Self {
        Self {
            min_bet: 10,
            max_bet: 500,
            starting_chips: 1000,
            num_decks: 6,
            blackjack_payout: PayoutRatio::THREE_TO_TWO,
            dealer_hits_soft_17: false,
            reshuffle_threshold: 0.25,
        }
    }
}

impl TableRules {
    /// Low limits, two decks
    pub fn casual() -> Self {
        Self {
            min_bet: 1,
            max_bet: 100,
            starting_chips: 200,
            num_decks: 2,
            ..Self::default()
        }
    }

    /// High limits on an eight-deck shoe with 6:5 naturals
    pub fn high_roller() -> Self {
        Self {
            min_bet: 100,
            max_bet: 10_000,
            starting_chips: 50_000,
            num_decks: 8,
            blackjack_payout: PayoutRatio::SIX_TO_FIVE,
            dealer_hits_soft_17: true,
            reshuffle_threshold: 0.25,
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "casual" => Some(Self::casual()),
            "high_roller" => Some(Self::high_roller()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.min_bet == 0 || self.min_bet > self.max_bet {
            return Err("Bet limits must satisfy 0 < min_bet <= max_bet");
        }
        if self.num_decks == 0 || self.num_decks > MAX_DECKS {
            return Err("Number of decks must be between 1 and 8");
        }
        if !(0.0..1.0).contains(&self.reshuffle_threshold) {
            return Err("Reshuffle threshold must be in [0, 1)");
        }
        if self.blackjack_payout.denominator == 0 {
            return Err("Denominator cannot be zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payout_ratio_three_to_two() {
        let ratio = PayoutRatio::THREE_TO_TWO;
        assert_eq!(ratio.calculate_payout(100), 150);
        assert_eq!(ratio.calculate_payout(50), 75);
        assert_eq!(ratio.total_return(50), 125);
    }

    #[test]
    fn test_payout_ratio_six_to_five() {
        let ratio = PayoutRatio::SIX_TO_FIVE;
        assert_eq!(ratio.calculate_payout(100), 120);
        assert_eq!(ratio.calculate_payout(10), 12);
    }

    #[test]
    fn test_payout_ratio_rounds_down() {
        assert_eq!(PayoutRatio::THREE_TO_TWO.calculate_payout(15), 22);
    }

    #[test]
    fn test_payout_ratio_zero_denominator() {
        assert!(PayoutRatio::new(3, 0).is_err());
    }

    #[test]
    fn test_payout_ratio_parse() {
        assert_eq!("3:2".parse::<PayoutRatio>(), Ok(PayoutRatio::THREE_TO_TWO));
        assert_eq!(" 6 : 5 ".parse::<PayoutRatio>(), Ok(PayoutRatio::SIX_TO_FIVE));
        assert!("3/2".parse::<PayoutRatio>().is_err());
        assert!("3:0".parse::<PayoutRatio>().is_err());
    }

    #[test]
    fn test_default_rules() {
        let rules = TableRules::default();
        assert_eq!(rules.min_bet, 10);
        assert_eq!(rules.max_bet, 500);
        assert_eq!(rules.starting_chips, 1000);
        assert_eq!(rules.num_decks, 6);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        for name in ["default", "casual", "high_roller"] {
            assert!(TableRules::preset(name).unwrap().validate().is_ok(), "{name}");
        }
        assert!(TableRules::preset("vegas").is_none());
    }

    #[test]
    fn test_invalid_rules() {
        let rules = TableRules {
            min_bet: 600,
            ..TableRules::default()
        };
        assert!(rules.validate().is_err());
        let rules = TableRules {
            num_decks: 9,
            ..TableRules::default()
        };
        assert!(rules.validate().is_err());
    }
}
