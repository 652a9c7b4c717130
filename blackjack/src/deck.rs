use std::ops::Index;

use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::{Card, Error, Hand, Rank, Result, Suit};

/// A single 52-card deck with some cards possibly taken out before shuffling.
///
/// Cards are dealt from the front. A deck is built for one trial and thrown away
/// afterwards.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    current_index: usize,
}

impl Deck {
    /// Creates a shuffled deck holding every card except the ones in `excluding`.
    pub fn new_conditioned<R: Rng + ?Sized>(excluding: &[Card], rng: &mut R) -> Result<Deck> {
        let mut removed = [false; 52];
        for card in excluding {
            if removed[card.index()] {
                return Err(Error::DuplicateCard(*card));
            }
            removed[card.index()] = true;
        }

        let mut cards = Vec::with_capacity(52 - excluding.len());
        for suit in Suit::iter() {
            for rank in Rank::iter() {
                let card = Card::new(rank, suit);
                if !removed[card.index()] {
                    cards.push(card);
                }
            }
        }
        cards.shuffle(rng);

        Ok(Deck {
            cards,
            current_index: 0,
        })
    }

    pub fn new_shuffled<R: Rng + ?Sized>(rng: &mut R) -> Deck {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::iter() {
            for rank in Rank::iter() {
                cards.push(Card::new(rank, suit));
            }
        }
        cards.shuffle(rng);

        Deck {
            cards,
            current_index: 0,
        }
    }

    /// A deck that deals `cards` in the given order, without shuffling.
    pub fn from_ordered(cards: Vec<Card>) -> Result<Deck> {
        let mut seen = [false; 52];
        for card in &cards {
            if seen[card.index()] {
                return Err(Error::DuplicateCard(*card));
            }
            seen[card.index()] = true;
        }
        Ok(Deck {
            cards,
            current_index: 0,
        })
    }

    /// Deals the next card.
    pub fn draw(&mut self) -> Result<Card> {
        let card = *self.cards.get(self.current_index).ok_or(Error::EmptyDeck)?;
        self.current_index += 1;
        Ok(card)
    }

    /// Deals a card chosen uniformly among the remaining cards matching
    /// `predicate`. Every other card keeps its relative order, so the rest of the
    /// deck stays a uniform permutation of what is left.
    pub fn draw_where<R: Rng + ?Sized, P: Fn(&Card) -> bool>(&mut self, predicate: P, rng: &mut R) -> Result<Card> {
        let remaining = &self.cards[self.current_index..];
        let offset = (0..remaining.len())
            .filter(|&i| predicate(&remaining[i]))
            .choose(rng)
            .ok_or(Error::EmptyDeck)?;
        self.cards[self.current_index..=self.current_index + offset].rotate_right(1);
        self.draw()
    }

    pub fn len(&self) -> usize {
        self.cards.len() - self.current_index
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, card: &Card) -> bool {
        self.cards[self.current_index..].contains(card)
    }

    pub fn remaining_rank_counts(&self) -> RankCounts {
        let mut counts = RankCounts::default();
        for card in &self.cards[self.current_index..] {
            counts.counts[card.rank as usize] += 1;
        }
        counts
    }
}

/// Number of cards of each rank left to be dealt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RankCounts {
    counts: [u8; 13],
}

impl RankCounts {
    /// Counts of the cards a player cannot see, i.e. a full deck minus `known`.
    pub fn unseen(known: &[Card]) -> Result<RankCounts> {
        let mut seen = [false; 52];
        let mut counts = RankCounts { counts: [4; 13] };
        for card in known {
            if seen[card.index()] {
                return Err(Error::DuplicateCard(*card));
            }
            seen[card.index()] = true;
            counts.counts[card.rank as usize] -= 1;
        }
        Ok(counts)
    }

    pub fn count(&self, rank: Rank) -> u8 {
        self.counts[rank as usize]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&c| c as u32).sum()
    }

    /// Splits the remaining cards into those that would bust `hand` if dealt next
    /// and those that would not.
    pub fn bust_odds(&self, hand: &Hand) -> BustOdds {
        let mut odds = BustOdds::default();
        for rank in Rank::iter() {
            let count = self.count(rank);
            if count == 0 {
                continue;
            }
            let mut next = hand.clone();
            next.add_card(Card::new(rank, Suit::Spade));
            if next.is_bust() {
                odds.bust += count as u32;
                odds.bust_ranks.push((rank, count));
            } else {
                odds.safe += count as u32;
                odds.safe_ranks.push((rank, count));
            }
        }
        odds
    }
}

impl Index<Rank> for RankCounts {
    type Output = u8;
    fn index(&self, rank: Rank) -> &Self::Output {
        &self.counts[rank as usize]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BustOdds {
    pub bust: u32,
    pub safe: u32,
    pub bust_ranks: Vec<(Rank, u8)>,
    pub safe_ranks: Vec<(Rank, u8)>,
}

impl BustOdds {
    pub fn bust_probability(&self) -> f64 {
        let total = self.bust + self.safe;
        if total == 0 {
            0.0
        } else {
            self.bust as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn card(s: &str) -> Card {
        s.parse().unwrap()
    }

    #[test]
    fn conditioned_deck_never_holds_known_cards() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let known = vec![card("TS"), card("6H"), card("TD"), card("AC")];
        for _ in 0..20 {
            let mut deck = Deck::new_conditioned(&known, &mut rng).unwrap();
            assert_eq!(deck.len(), 52 - known.len());
            assert!(known.iter().all(|k| !deck.contains(k)));
            let mut seen = [false; 52];
            while let Ok(dealt) = deck.draw() {
                assert!(!known.contains(&dealt));
                assert!(!seen[dealt.index()]);
                seen[dealt.index()] = true;
            }
            assert_eq!(seen.iter().filter(|&&s| s).count(), 48);
        }
    }

    #[test]
    fn duplicate_known_card_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = Deck::new_conditioned(&[card("9C"), card("9C")], &mut rng);
        assert_eq!(result.unwrap_err(), Error::DuplicateCard(card("9C")));
    }

    #[test]
    fn drawing_from_empty_deck_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut deck = Deck::new_shuffled(&mut rng);
        for _ in 0..52 {
            deck.draw().unwrap();
        }
        assert!(deck.is_empty());
        assert_eq!(deck.draw(), Err(Error::EmptyDeck));
    }

    #[test]
    fn same_seed_gives_same_order() {
        let mut a = Deck::new_shuffled(&mut ChaCha8Rng::seed_from_u64(42));
        let mut b = Deck::new_shuffled(&mut ChaCha8Rng::seed_from_u64(42));
        for _ in 0..52 {
            assert_eq!(a.draw().unwrap(), b.draw().unwrap());
        }
    }

    #[test]
    fn draw_where_keeps_the_rest_in_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut deck = Deck::new_shuffled(&mut rng);
        let mut reference = deck.clone();
        let picked = deck.draw_where(|c| c.blackjack_value() == 10, &mut rng).unwrap();
        assert_eq!(picked.blackjack_value(), 10);
        assert!(!deck.contains(&picked));

        let mut rest = Vec::new();
        while let Ok(c) = reference.draw() {
            if c != picked {
                rest.push(c);
            }
        }
        for expected in rest {
            assert_eq!(deck.draw().unwrap(), expected);
        }
        assert!(deck.is_empty());
    }

    #[test]
    fn draw_where_leaves_the_rest_uniform() {
        // Only AS, 2S and 3S left. Whichever non-ace is drawn, the ace must lead the
        // rest half of the time.
        let mut known = Vec::new();
        for index in 0..52u8 {
            let candidate = Card::try_from(index).unwrap();
            if ![card("AS"), card("2S"), card("3S")].contains(&candidate) {
                known.push(candidate);
            }
        }
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let rounds = 6_000;
        let mut ace_next = 0;
        let mut two_drawn = 0;
        for _ in 0..rounds {
            let mut deck = Deck::new_conditioned(&known, &mut rng).unwrap();
            let drawn = deck.draw_where(|c| !c.is_ace(), &mut rng).unwrap();
            assert!(!drawn.is_ace());
            if drawn == card("2S") {
                two_drawn += 1;
            }
            if deck.draw().unwrap().is_ace() {
                ace_next += 1;
            }
        }
        let ace_next = ace_next as f64 / rounds as f64;
        let two_drawn = two_drawn as f64 / rounds as f64;
        assert!((ace_next - 0.5).abs() < 0.04, "ace next {}", ace_next);
        assert!((two_drawn - 0.5).abs() < 0.04, "2S drawn {}", two_drawn);
    }

    #[test]
    fn draw_where_with_no_match_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut deck = Deck::from_ordered(vec![card("2S"), card("3S")]).unwrap();
        assert_eq!(deck.draw_where(|c| c.is_ace(), &mut rng), Err(Error::EmptyDeck));
        assert_eq!(deck.len(), 2);
    }

    #[test]
    fn rank_counts_match_remaining_cards() {
        let known = vec![card("KS"), card("KD"), card("5H")];
        let unseen = RankCounts::unseen(&known).unwrap();
        assert_eq!(unseen.count(Rank::King), 2);
        assert_eq!(unseen[Rank::Five], 3);
        assert_eq!(unseen.total(), 49);

        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut deck = Deck::new_conditioned(&known, &mut rng).unwrap();
        assert_eq!(deck.remaining_rank_counts(), unseen);
        let dealt = deck.draw().unwrap();
        assert_eq!(deck.remaining_rank_counts()[dealt.rank], unseen[dealt.rank] - 1);
    }

    #[test]
    fn bust_odds_for_hard_and_soft_hands() {
        let known = vec![card("TS"), card("6H"), card("TD")];
        let unseen = RankCounts::unseen(&known).unwrap();

        let hard_sixteen = Hand::from_cards(&known[..2]);
        let odds = unseen.bust_odds(&hard_sixteen);
        // Six through King bust a hard 16: 3 sixes, 4 each of 7-9, 14 ten-valued cards.
        assert_eq!(odds.bust, 3 + 12 + 14);
        assert_eq!(odds.safe, 49 - 29);
        assert!((odds.bust_probability() - 29.0 / 49.0).abs() < 1e-12);

        let soft_seventeen = Hand::from_cards(&[card("AS"), card("6S")]);
        assert_eq!(unseen.bust_odds(&soft_seventeen).bust, 0);
    }
}
