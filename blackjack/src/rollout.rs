use rand::Rng;
use serde::Serialize;

use crate::strategy::illegal_reason;
use crate::{Action, BasicStrategy, Card, Deck, Error, Hand, Result, Rule, Scenario, Strategy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandResult {
    Win,
    Loss,
    Push,
    Blackjack,
}

/// The settled result of one player hand, in multiples of the bet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outcome {
    pub result: HandResult,
    pub units: f64,
    pub doubled: bool,
}

impl Outcome {
    pub fn amount(&self, bet: f64) -> f64 {
        self.units * bet
    }
}

/// Net result of one trial: the sum over every hand the seat ended up playing.
pub fn net_units(outcomes: &[Outcome]) -> f64 {
    outcomes.iter().map(|o| o.units).sum()
}

#[derive(Debug)]
struct PlayedHand {
    hand: Hand,
    doubled: bool,
}

/// Plays single hands to the end: the chosen first action, then the strategy for
/// everything after it, then the dealer, then settlement.
#[derive(Debug, Clone)]
pub struct RolloutEngine<S: Strategy = BasicStrategy> {
    rule: Rule,
    strategy: S,
}

impl RolloutEngine<BasicStrategy> {
    pub fn new(rule: &Rule) -> Self {
        RolloutEngine {
            rule: *rule,
            strategy: BasicStrategy::new(rule),
        }
    }
}

impl<S: Strategy> RolloutEngine<S> {
    pub fn with_strategy(rule: &Rule, strategy: S) -> Self {
        RolloutEngine { rule: *rule, strategy }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Fails with `IllegalAction` if `action` cannot be the first action for the
    /// scenario's hand.
    pub fn check_action(&self, scenario: &Scenario, action: Action) -> Result<()> {
        self.check_first_action(&scenario.player_hand(), action, scenario.hand_count())
    }

    fn check_first_action(&self, hand: &Hand, action: Action, hand_count: u8) -> Result<()> {
        match illegal_reason(action, hand, hand_count, &self.rule) {
            Some(reason) => Err(Error::IllegalAction { action, reason }),
            None => Ok(()),
        }
    }

    /// Runs one trial: a fresh deck without the known cards, a hole card for the
    /// dealer, then the hand played out under `action`. Returns one outcome per
    /// player hand.
    pub fn simulate_one<R: Rng + ?Sized>(&self, scenario: &Scenario, action: Action, rng: &mut R) -> Result<Vec<Outcome>> {
        self.check_action(scenario, action)?;
        let known = scenario.known_cards().len();
        let out_of_cards = |e: Error| match e {
            Error::EmptyDeck => Error::InsufficientDeck { known },
            e => e,
        };

        let mut deck = Deck::new_conditioned(scenario.known_cards(), rng)?;
        let dealer = self
            .deal_dealer_hand(&mut deck, scenario.dealer_up_card(), rng)
            .map_err(out_of_cards)?;
        let outcomes = self
            .play_out(&mut deck, scenario.player_hand(), dealer, action, scenario.hand_count())
            .map_err(out_of_cards)?;
        log::trace!("{} with {} -> {:?}", scenario.player_hand(), action, outcomes);
        Ok(outcomes)
    }

    /// Gives the dealer a hole card. If the dealer would have peeked with this up
    /// card, the hole card is picked at random among the cards that do not make a
    /// natural.
    pub fn deal_dealer_hand<R: Rng + ?Sized>(&self, deck: &mut Deck, dealer_up_card: Card, rng: &mut R) -> Result<Hand> {
        let mut dealer = Hand::new();
        dealer.add_card(dealer_up_card);
        let hole = if self.rule.dealer_peeks(dealer_up_card) {
            deck.draw_where(|c| !makes_natural(dealer_up_card, *c), rng)?
        } else {
            deck.draw()?
        };
        dealer.add_card(hole);
        Ok(dealer)
    }

    /// Plays `player` to the end starting with `first_action`, then the dealer, and
    /// settles every resulting hand. `first_action` must be legal for `player`.
    pub fn play_out(
        &self,
        deck: &mut Deck,
        player: Hand,
        mut dealer: Hand,
        first_action: Action,
        hand_count: u8,
    ) -> Result<Vec<Outcome>> {
        self.check_first_action(&player, first_action, hand_count)?;
        let played = self.play_hands(deck, player, dealer.cards()[0], first_action, hand_count)?;

        if played.iter().any(|p| !p.hand.is_bust()) {
            while self.dealer_must_hit(&dealer) {
                dealer.add_card(deck.draw()?);
            }
        }

        Ok(played.iter().map(|p| self.settle(p, &dealer)).collect())
    }

    /// Split hands wait on a stack and are played one after another.
    fn play_hands(
        &self,
        deck: &mut Deck,
        player: Hand,
        dealer_up_card: Card,
        first_action: Action,
        mut hand_count: u8,
    ) -> Result<Vec<PlayedHand>> {
        let mut pending: Vec<(Hand, Option<Action>)> = vec![(player, Some(first_action))];
        let mut played: Vec<PlayedHand> = Vec::with_capacity(2);

        'hands: while let Some((mut hand, mut next_action)) = pending.pop() {
            let is_split_ace = hand.split_depth() > 0 && hand.cards()[0].is_ace();
            if next_action.is_none() && is_split_ace && !self.rule.hit_split_aces {
                played.push(PlayedHand { hand, doubled: false });
                continue;
            }

            let mut is_first_decision = true;
            let mut doubled = false;
            loop {
                let action = next_action
                    .take()
                    .unwrap_or_else(|| self.strategy.decide(&hand, dealer_up_card, is_first_decision, hand_count));
                match action {
                    Action::Stand => break,
                    Action::Hit => {
                        hand.add_card(deck.draw()?);
                        if hand.is_bust() {
                            break;
                        }
                    }
                    Action::Double => {
                        hand.add_card(deck.draw()?);
                        doubled = true;
                        break;
                    }
                    Action::Split => {
                        hand_count += 1;
                        let (mut left, mut right) = hand.split();
                        left.add_card(deck.draw()?);
                        right.add_card(deck.draw()?);
                        pending.push((right, None));
                        pending.push((left, None));
                        continue 'hands;
                    }
                }
                is_first_decision = false;
            }
            played.push(PlayedHand { hand, doubled });
        }
        Ok(played)
    }

    fn dealer_must_hit(&self, dealer: &Hand) -> bool {
        let total = dealer.total();
        total < 17 || (total == 17 && dealer.is_soft() && self.rule.dealer_hit_on_soft17)
    }

    fn settle(&self, played: &PlayedHand, dealer: &Hand) -> Outcome {
        let stake = if played.doubled { 2.0 } else { 1.0 };
        let hand = &played.hand;
        let (result, units) = if hand.is_bust() {
            (HandResult::Loss, -stake)
        } else if hand.is_blackjack() {
            if dealer.is_blackjack() {
                (HandResult::Push, 0.0)
            } else {
                (HandResult::Blackjack, self.rule.payout_blackjack * stake)
            }
        } else if dealer.is_blackjack() || (!dealer.is_bust() && hand.total() < dealer.total()) {
            (HandResult::Loss, -stake)
        } else if dealer.is_bust() || hand.total() > dealer.total() {
            (HandResult::Win, stake)
        } else {
            (HandResult::Push, 0.0)
        };

        Outcome {
            result,
            units,
            doubled: played.doubled,
        }
    }
}

fn makes_natural(up: Card, hole: Card) -> bool {
    (up.is_ace() && hole.blackjack_value() == 10) || (up.blackjack_value() == 10 && hole.is_ace())
}
