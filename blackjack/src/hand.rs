use crate::{Card, Rank};

/// One group of cards held by the player or the dealer.
///
/// The total always counts as many aces as 11 as it can without busting. This is
/// re-established after every card.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hand {
    cards: Vec<Card>,
    total: u8,
    soft_aces: u8,
    split_depth: u8,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(4),
            ..Default::default()
        }
    }

    pub fn from_cards(cards: &[Card]) -> Hand {
        let mut hand = Hand::new();
        for card in cards {
            hand.add_card(*card);
        }
        hand
    }

    /// Marks a hand as coming from `split_depth` earlier splits.
    pub fn with_split_depth(mut self, split_depth: u8) -> Hand {
        self.split_depth = split_depth;
        self
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        if card.is_ace() {
            self.total += 11;
            self.soft_aces += 1;
        } else {
            self.total += card.blackjack_value();
        }
        self.adjust_for_aces();
    }

    fn adjust_for_aces(&mut self) {
        while self.total > 21 && self.soft_aces > 0 {
            self.total -= 10;
            self.soft_aces -= 1;
        }
    }

    /// Splits a two-card hand into two one-card hands, one level deeper.
    ///
    /// Panics if the hand does not hold exactly two cards.
    pub fn split(&self) -> (Hand, Hand) {
        assert_eq!(self.cards.len(), 2, "Only a two-card hand can be split");
        let depth = self.split_depth + 1;
        let first = Hand::from_cards(&self.cards[..1]).with_split_depth(depth);
        let second = Hand::from_cards(&self.cards[1..]).with_split_depth(depth);
        (first, second)
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    pub fn is_soft(&self) -> bool {
        self.soft_aces > 0
    }

    pub fn is_bust(&self) -> bool {
        self.total > 21
    }

    /// A natural: two cards worth 21 on a hand that never went through a split.
    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.total == 21 && self.split_depth == 0
    }

    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0].rank == self.cards[1].rank
    }

    pub fn can_split(&self, split_limit: u8) -> bool {
        self.is_pair() && self.split_depth < split_limit
    }

    pub fn pair_rank(&self) -> Option<Rank> {
        if self.is_pair() {
            Some(self.cards[0].rank)
        } else {
            None
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn split_depth(&self) -> u8 {
        self.split_depth
    }
}

impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, card) in self.cards.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}
