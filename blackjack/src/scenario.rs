use crate::{Card, Error, Hand, Result};

/// An immutable snapshot of what the evaluator can see when asking for an EV.
///
/// Every rollout builds its own deck and hands from this; nothing here is mutated
/// by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    player_cards: Vec<Card>,
    dealer_up_card: Card,
    known_cards: Vec<Card>,
    bet: f64,
    hand_count: u8,
}

impl Scenario {
    /// `known_cards` must contain the player cards and the dealer up card, plus
    /// any other card already seen (e.g. the other hands of a split).
    pub fn new(player_cards: &[Card], dealer_up_card: Card, known_cards: &[Card], bet: f64) -> Result<Scenario> {
        if player_cards.len() < 2 {
            return Err(Error::InvalidScenario(format!(
                "the player hand needs at least 2 cards, got {}",
                player_cards.len()
            )));
        }
        if !bet.is_finite() || bet <= 0.0 {
            return Err(Error::InvalidScenario(format!("bet must be positive, got {}", bet)));
        }

        let mut seen = [false; 52];
        for card in known_cards {
            if seen[card.index()] {
                return Err(Error::DuplicateCard(*card));
            }
            seen[card.index()] = true;
        }

        let mut visible = [false; 52];
        for card in player_cards.iter().chain(std::iter::once(&dealer_up_card)) {
            if visible[card.index()] {
                return Err(Error::DuplicateCard(*card));
            }
            visible[card.index()] = true;
            if !seen[card.index()] {
                return Err(Error::InvalidScenario(format!("{} is visible but not among the known cards", card)));
            }
        }

        let scenario = Scenario {
            player_cards: player_cards.to_vec(),
            dealer_up_card,
            known_cards: known_cards.to_vec(),
            bet,
            hand_count: 1,
        };
        if scenario.player_hand().is_bust() {
            return Err(Error::InvalidScenario(format!(
                "the player hand {} is already bust",
                scenario.player_hand()
            )));
        }
        Ok(scenario)
    }

    /// A scenario where the only known cards are the player cards and the up card.
    pub fn with_visible_cards(player_cards: &[Card], dealer_up_card: Card, bet: f64) -> Result<Scenario> {
        let mut known_cards = player_cards.to_vec();
        known_cards.push(dealer_up_card);
        Scenario::new(player_cards, dealer_up_card, &known_cards, bet)
    }

    /// Declares that the hand under evaluation is one of `hand_count` hands the seat
    /// holds after splitting.
    pub fn with_hand_count(mut self, hand_count: u8) -> Result<Scenario> {
        if hand_count == 0 {
            return Err(Error::InvalidScenario(String::from("hand_count must be at least 1")));
        }
        self.hand_count = hand_count;
        Ok(self)
    }

    /// Builds the player hand. Hands from a split carry their split depth so they
    /// can never count as a natural.
    pub fn player_hand(&self) -> Hand {
        Hand::from_cards(&self.player_cards).with_split_depth(self.hand_count - 1)
    }

    pub fn player_cards(&self) -> &[Card] {
        &self.player_cards
    }

    pub fn dealer_up_card(&self) -> Card {
        self.dealer_up_card
    }

    pub fn known_cards(&self) -> &[Card] {
        &self.known_cards
    }

    pub fn bet(&self) -> f64 {
        self.bet
    }

    pub fn hand_count(&self) -> u8 {
        self.hand_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(list: &str) -> Vec<Card> {
        list.split(',').map(|s| s.parse().unwrap()).collect()
    }

    #[test]
    fn visible_cards_become_known() {
        let scenario = Scenario::with_visible_cards(&cards("TS,6H"), "TD".parse().unwrap(), 10.0).unwrap();
        assert_eq!(scenario.known_cards().len(), 3);
        assert_eq!(scenario.player_hand().total(), 16);
        assert_eq!(scenario.hand_count(), 1);
    }

    #[test]
    fn known_cards_must_cover_visible_cards() {
        let result = Scenario::new(&cards("TS,6H"), "TD".parse().unwrap(), &cards("TS,6H"), 10.0);
        assert!(matches!(result, Err(Error::InvalidScenario(_))));
    }

    #[test]
    fn rejects_duplicates_and_bad_bets() {
        let up: Card = "TD".parse().unwrap();
        let dup = Scenario::new(&cards("TS,TS"), up, &cards("TS,TD"), 10.0);
        assert_eq!(dup.unwrap_err(), Error::DuplicateCard("TS".parse().unwrap()));

        let known_dup = Scenario::new(&cards("TS,6H"), up, &cards("TS,6H,TD,6H"), 10.0);
        assert!(matches!(known_dup, Err(Error::DuplicateCard(_))));

        assert!(Scenario::with_visible_cards(&cards("TS,6H"), up, 0.0).is_err());
        assert!(Scenario::with_visible_cards(&cards("TS,6H"), up, f64::NAN).is_err());
        assert!(Scenario::with_visible_cards(&cards("TS"), up, 5.0).is_err());
        assert!(Scenario::with_visible_cards(&cards("TS,6H,9C"), up, 5.0).is_err());
    }

    #[test]
    fn split_hands_are_not_naturals() {
        let scenario = Scenario::with_visible_cards(&cards("AS,KH"), "5D".parse().unwrap(), 10.0)
            .unwrap()
            .with_hand_count(2)
            .unwrap();
        assert!(!scenario.player_hand().is_blackjack());
        assert_eq!(scenario.player_hand().total(), 21);
    }
}
