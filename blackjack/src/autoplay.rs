use rand::Rng;

use crate::rollout::net_units;
use crate::{
    BasicStrategy, Card, DecisionKey, Deck, EvTable, Hand, HandResult, Outcome, OutcomeStats, Result,
    RolloutEngine, Rule, Strategy,
};

/// What happened in one automatically played round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundRecord {
    pub bet: f64,
    pub player: Hand,
    pub dealer_up_card: Card,
    /// The first decision of the round. `None` when a natural ended the round
    /// before the player had to decide.
    pub key: Option<DecisionKey>,
    pub outcomes: Vec<Outcome>,
}

impl RoundRecord {
    pub fn net_units(&self) -> f64 {
        net_units(&self.outcomes)
    }

    pub fn amount(&self) -> f64 {
        self.net_units() * self.bet
    }
}

/// Plays whole rounds from a fresh deck, every decision taken by the strategy.
#[derive(Debug, Clone)]
pub struct RoundPlayer<S: Strategy = BasicStrategy> {
    engine: RolloutEngine<S>,
}

impl RoundPlayer<BasicStrategy> {
    pub fn new(rule: &Rule) -> Self {
        RoundPlayer {
            engine: RolloutEngine::new(rule),
        }
    }
}

impl<S: Strategy> RoundPlayer<S> {
    pub fn with_engine(engine: RolloutEngine<S>) -> Self {
        RoundPlayer { engine }
    }

    pub fn play_round<R: Rng + ?Sized>(&self, bet: f64, rng: &mut R) -> Result<RoundRecord> {
        let mut deck = Deck::new_shuffled(rng);
        let mut player = Hand::new();
        player.add_card(deck.draw()?);
        let dealer_up_card = deck.draw()?;
        player.add_card(deck.draw()?);
        let mut dealer = Hand::new();
        dealer.add_card(dealer_up_card);
        dealer.add_card(deck.draw()?);

        let rule = self.engine.rule();
        let dealer_natural = dealer.is_blackjack() && rule.dealer_peeks(dealer_up_card);
        if player.is_blackjack() || dealer_natural {
            let outcome = match (player.is_blackjack(), dealer.is_blackjack()) {
                (true, true) => Outcome {
                    result: HandResult::Push,
                    units: 0.0,
                    doubled: false,
                },
                (true, false) => Outcome {
                    result: HandResult::Blackjack,
                    units: rule.payout_blackjack,
                    doubled: false,
                },
                _ => Outcome {
                    result: HandResult::Loss,
                    units: -1.0,
                    doubled: false,
                },
            };
            log::trace!("{} vs {} ends on a natural", player, dealer);
            return Ok(RoundRecord {
                bet,
                player,
                dealer_up_card,
                key: None,
                outcomes: vec![outcome],
            });
        }

        let action = self.engine.strategy().decide(&player, dealer_up_card, true, 1);
        let key = DecisionKey::new(&player, dealer_up_card, action);
        let outcomes = self.engine.play_out(&mut deck, player.clone(), dealer, action, 1)?;
        log::trace!("{} -> {:?}", key, outcomes);
        Ok(RoundRecord {
            bet,
            player,
            dealer_up_card,
            key: Some(key),
            outcomes,
        })
    }

    /// Plays `rounds` rounds, folding every first decision into `table` and
    /// returning the overall per-round statistics.
    pub fn play_rounds<R: Rng + ?Sized>(
        &self,
        rounds: u64,
        bet: f64,
        table: &mut EvTable,
        rng: &mut R,
    ) -> Result<OutcomeStats> {
        let mut overall = OutcomeStats::default();
        for _ in 0..rounds {
            let record = self.play_round(bet, rng)?;
            if let Some(key) = record.key {
                table.record(key, record.net_units());
            }
            overall.record(record.net_units());
        }
        Ok(overall)
    }
}
