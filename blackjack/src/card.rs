use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::Error;

static RANK_TO_BLACKJACK_VALUE: [u8; 13] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize)]
pub enum Suit {
    Diamond = 0,
    Club,
    Heart,
    Spade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize)]
pub enum Rank {
    Ace = 0,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    /// Ace counts as 1 here. `Hand` decides when it is worth 11.
    pub fn blackjack_value(&self) -> u8 {
        RANK_TO_BLACKJACK_VALUE[*self as usize]
    }

    pub fn symbol(&self) -> char {
        match self {
            Rank::Ace => 'A',
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Eight => '8',
            Rank::Nine => '9',
            Rank::Ten => 'T',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
        }
    }

    fn from_index(index: u8) -> Option<Rank> {
        let rank = match index {
            0 => Rank::Ace,
            1 => Rank::Two,
            2 => Rank::Three,
            3 => Rank::Four,
            4 => Rank::Five,
            5 => Rank::Six,
            6 => Rank::Seven,
            7 => Rank::Eight,
            8 => Rank::Nine,
            9 => Rank::Ten,
            10 => Rank::Jack,
            11 => Rank::Queen,
            12 => Rank::King,
            _ => return None,
        };
        Some(rank)
    }
}

impl Suit {
    pub fn symbol(&self) -> char {
        match self {
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        }
    }
}

/// Represents a card in the real world with a rank and a suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    pub fn blackjack_value(&self) -> u8 {
        self.rank.blackjack_value()
    }

    pub fn is_ace(&self) -> bool {
        self.rank == Rank::Ace
    }

    /// Position of this card in a canonical 52-card deck.
    pub fn index(&self) -> usize {
        self.suit as usize * 13 + self.rank as usize
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

impl From<Card> for u8 {
    fn from(card: Card) -> u8 {
        card.index() as u8
    }
}

impl TryFrom<u8> for Card {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let suit = match value / 13 {
            0 => Suit::Diamond,
            1 => Suit::Club,
            2 => Suit::Heart,
            3 => Suit::Spade,
            _ => return Err(Error::InvalidCard(value.to_string())),
        };
        let rank = Rank::from_index(value % 13).ok_or_else(|| Error::InvalidCard(value.to_string()))?;
        Ok(Card { rank, suit })
    }
}

/// Parses `"AS"`, `"td"` or `"10H"`: a rank followed by a suit letter.
impl FromStr for Card {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_uppercase();
        let invalid = || Error::InvalidCard(s.to_string());
        let suit_char = text.chars().last().ok_or_else(invalid)?;
        let rank_text = &text[..text.len() - suit_char.len_utf8()];

        let suit = match suit_char {
            'D' => Suit::Diamond,
            'C' => Suit::Club,
            'H' => Suit::Heart,
            'S' => Suit::Spade,
            _ => return Err(invalid()),
        };
        let rank = match rank_text {
            "A" => Rank::Ace,
            "2" => Rank::Two,
            "3" => Rank::Three,
            "4" => Rank::Four,
            "5" => Rank::Five,
            "6" => Rank::Six,
            "7" => Rank::Seven,
            "8" => Rank::Eight,
            "9" => Rank::Nine,
            "T" | "10" => Rank::Ten,
            "J" => Rank::Jack,
            "Q" => Rank::Queen,
            "K" => Rank::King,
            _ => return Err(invalid()),
        };
        Ok(Card { rank, suit })
    }
}
