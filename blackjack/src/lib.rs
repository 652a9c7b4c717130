pub mod aggregator;
pub mod autoplay;
mod card;
mod deck;
mod error;
mod hand;
pub mod rollout;
mod scenario;
pub mod strategy;

use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::EnumIter;

pub use aggregator::{best_action, DecisionKey, Estimator, EstimatorConfig, EvResult, EvTable, OutcomeStats};
pub use card::{Card, Rank, Suit};
pub use deck::{BustOdds, Deck, RankCounts};
pub use error::{Error, Result};
pub use hand::Hand;
pub use rollout::{HandResult, Outcome, RolloutEngine};
pub use scenario::Scenario;
pub use strategy::{legal_actions, BasicStrategy, Strategy};

/// Table rules shared by the policy, the rollout engine and the round player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub dealer_hit_on_soft17: bool,
    pub payout_blackjack: f64,
    /// Total splits allowed in one round. 2 means one split plus one resplit.
    pub split_limit: u8,
    pub allow_das: bool,
    pub hit_split_aces: bool,
    pub peek_policy: PeekPolicy,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            dealer_hit_on_soft17: false,
            payout_blackjack: 1.5,
            split_limit: 2,
            allow_das: false,
            hit_split_aces: false,
            peek_policy: PeekPolicy::UpAceOrTen,
        }
    }
}

impl Rule {
    /// Whether the dealer checks the hole card for a natural with this up card.
    pub fn dealer_peeks(&self, dealer_up_card: Card) -> bool {
        let up = dealer_up_card.blackjack_value();
        match self.peek_policy {
            PeekPolicy::UpAceOrTen => up == 1 || up == 10,
            PeekPolicy::UpAce => up == 1,
            PeekPolicy::NoPeek => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum PeekPolicy {
    UpAceOrTen,
    UpAce,
    NoPeek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize_enum_str, Deserialize_enum_str)]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
}
