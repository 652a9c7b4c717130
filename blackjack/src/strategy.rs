use crate::{Action, Card, Hand, Rule};

/// Chooses the next action for a player hand without looking any further ahead.
pub trait Strategy {
    /// `is_first_decision` is true only for the first action on a hand (including
    /// the first action on each hand made by a split). `hand_count` is the number of
    /// hands the seat currently holds.
    fn decide(&self, hand: &Hand, dealer_up_card: Card, is_first_decision: bool, hand_count: u8) -> Action;
}

type Cell = (Action, Action);

/// Chart-driven basic strategy. Each cell holds the preferred action and the one
/// to use when the preferred action is not allowed.
#[derive(Debug, Clone)]
pub struct BasicStrategy {
    rule: Rule,
    hard_charts: [[Cell; 10]; 14],
    soft_charts: [[Cell; 10]; 10],
    pair_charts: [[Cell; 10]; 10],
}

impl BasicStrategy {
    pub fn new(rule: &Rule) -> BasicStrategy {
        const H: Cell = (Action::Hit, Action::Hit);
        const S: Cell = (Action::Stand, Action::Stand);
        const P: Cell = (Action::Split, Action::Hit);
        const PS: Cell = (Action::Split, Action::Stand);
        const DH: Cell = (Action::Double, Action::Hit);
        const DS: Cell = (Action::Double, Action::Stand);

        // Columns are dealer up cards: A, 2, 3, ..., 9, 10.
        let hard_charts = [
            [H, H, H, H, H, H, H, H, H, H], // 5 or less
            [H, H, H, H, H, H, H, H, H, H],
            [H, H, H, H, H, H, H, H, H, H],
            [H, H, H, H, H, H, H, H, H, H],
            [H, H, DH, DH, DH, DH, H, H, H, H],
            [H, DH, DH, DH, DH, DH, DH, DH, DH, H],
            [DH, DH, DH, DH, DH, DH, DH, DH, DH, DH],
            [H, H, H, S, S, S, H, H, H, H], // 12
            [H, S, S, S, S, S, H, H, H, H],
            [H, S, S, S, S, S, H, H, H, H],
            [H, S, S, S, S, S, H, H, H, H],
            [H, S, S, S, S, S, H, H, H, S], // 16
            [S, S, S, S, S, S, S, S, S, S], // 17
            [S, S, S, S, S, S, S, S, S, S], // 18 or more
        ];
        let soft_charts = [
            [H, H, H, H, H, H, H, H, H, H], // Ace + Ace
            [H, H, H, H, DH, DH, H, H, H, H], // Ace + 2
            [H, H, H, H, DH, DH, H, H, H, H],
            [H, H, H, DH, DH, DH, H, H, H, H],
            [H, H, H, DH, DH, DH, H, H, H, H],
            [H, H, DH, DH, DH, DH, H, H, H, H],
            [H, DS, DS, DS, DS, DS, S, S, H, H], // Soft 18
            [S, S, S, S, S, DS, S, S, S, S],
            [S, S, S, S, S, S, S, S, S, S],
            [S, S, S, S, S, S, S, S, S, S], // Soft 21
        ];
        let pair_charts = [
            [P, P, P, P, P, P, P, P, P, P], // Double Ace
            [H, P, P, P, P, P, P, H, H, H], // Double 2
            [H, P, P, P, P, P, P, H, H, H],
            [H, H, H, H, P, P, H, H, H, H],
            [H, DH, DH, DH, DH, DH, DH, DH, DH, H],
            [H, P, P, P, P, P, H, H, H, H],
            [H, P, P, P, P, P, P, H, H, H],
            [P, P, P, P, P, P, P, P, P, P],
            [S, PS, PS, PS, PS, PS, S, PS, PS, S],
            [S, S, S, S, S, S, S, S, S, S], // Double 10
        ];

        BasicStrategy {
            rule: *rule,
            hard_charts,
            soft_charts,
            pair_charts,
        }
    }

    fn chart_cell(&self, hand: &Hand, col: usize) -> Cell {
        let total = hand.total() as usize;
        if hand.is_soft() {
            let row = total.clamp(12, 21) - 12;
            self.soft_charts[row][col]
        } else {
            let row = total.clamp(5, 18) - 5;
            self.hard_charts[row][col]
        }
    }
}

impl Strategy for BasicStrategy {
    fn decide(&self, hand: &Hand, dealer_up_card: Card, is_first_decision: bool, hand_count: u8) -> Action {
        if hand.is_bust() {
            return Action::Stand;
        }
        let col = (dealer_up_card.blackjack_value() - 1) as usize;
        let double_allowed = is_first_decision && can_double(hand, hand_count, &self.rule);
        let split_allowed = is_first_decision && can_split(hand, hand_count, &self.rule);

        let cell = match hand.pair_rank() {
            Some(rank) if split_allowed => {
                let cell = self.pair_charts[(rank.blackjack_value() - 1) as usize][col];
                if cell.0 == Action::Split {
                    return Action::Split;
                }
                cell
            }
            _ => self.chart_cell(hand, col),
        };

        match cell.0 {
            Action::Double if !double_allowed => cell.1,
            Action::Split => cell.1,
            action => action,
        }
    }
}

fn can_double(hand: &Hand, hand_count: u8, rule: &Rule) -> bool {
    hand.len() == 2 && (hand_count == 1 || rule.allow_das)
}

fn can_split(hand: &Hand, hand_count: u8, rule: &Rule) -> bool {
    hand.can_split(rule.split_limit) && hand_count <= rule.split_limit
}

/// Actions a caller may request as the first action on `hand`.
pub fn legal_actions(hand: &Hand, hand_count: u8, rule: &Rule) -> Vec<Action> {
    if hand.is_bust() {
        return Vec::new();
    }
    let mut actions = vec![Action::Hit, Action::Stand];
    if can_double(hand, hand_count, rule) {
        actions.push(Action::Double);
    }
    if can_split(hand, hand_count, rule) {
        actions.push(Action::Split);
    }
    actions
}

/// Explains why `action` cannot be the first action on `hand`, if it cannot.
pub(crate) fn illegal_reason(action: Action, hand: &Hand, hand_count: u8, rule: &Rule) -> Option<String> {
    if hand.is_bust() {
        return Some(format!("hand {} is already bust", hand));
    }
    match action {
        Action::Hit | Action::Stand => None,
        Action::Double if hand.len() != 2 => Some(format!("double needs exactly 2 cards, hand has {}", hand.len())),
        Action::Double if !can_double(hand, hand_count, rule) => Some(String::from("double after split is not allowed")),
        Action::Split if !hand.is_pair() => Some(format!("{} is not a pair", hand)),
        Action::Split if !can_split(hand, hand_count, rule) => {
            Some(format!("split limit of {} reached", rule.split_limit))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rank, Suit};
    use strum::IntoEnumIterator;

    fn card(rank: Rank) -> Card {
        Card::new(rank, Suit::Club)
    }

    fn hand(ranks: &[Rank]) -> Hand {
        let mut hand = Hand::new();
        for (i, rank) in ranks.iter().enumerate() {
            let suit = Suit::iter().nth(i % 4).unwrap();
            hand.add_card(Card::new(*rank, suit));
        }
        hand
    }

    fn up_cards() -> Vec<Card> {
        [
            Rank::Two,
            Rank::Three,
            Rank::Four,
            Rank::Five,
            Rank::Six,
            Rank::Seven,
            Rank::Eight,
            Rank::Nine,
            Rank::Ten,
            Rank::Ace,
        ]
        .iter()
        .map(|r| Card::new(*r, Suit::Heart))
        .collect()
    }

    /// Every hard total 4..=21, every soft total 12..=21 and every pair, as two- and
    /// three-card hands where possible.
    fn every_hand() -> Vec<Hand> {
        let mut hands = Vec::new();
        for first in Rank::iter() {
            for second in Rank::iter() {
                hands.push(hand(&[first, second]));
                for third in [Rank::Two, Rank::Five, Rank::Ace] {
                    let three = hand(&[first, second, third]);
                    if !three.is_bust() {
                        hands.push(three);
                    }
                }
            }
        }
        hands
    }

    #[test]
    fn decide_is_total_and_deterministic() {
        let rule = Rule::default();
        let strategy = BasicStrategy::new(&rule);
        let mut totals_seen = [[false; 22]; 2];
        for h in every_hand() {
            totals_seen[h.is_soft() as usize][h.total() as usize] = true;
            for up in up_cards() {
                for first in [true, false] {
                    for hand_count in 1..=3 {
                        let action = strategy.decide(&h, up, first, hand_count);
                        assert_eq!(action, strategy.decide(&h, up, first, hand_count));
                        if action == Action::Double || action == Action::Split {
                            assert!(first);
                            assert!(legal_actions(&h, hand_count, &rule).contains(&action));
                        }
                    }
                }
            }
        }
        for total in 4..=21 {
            assert!(totals_seen[0][total], "hard {} not covered", total);
        }
        for total in 12..=21 {
            assert!(totals_seen[1][total], "soft {} not covered", total);
        }
    }

    #[test]
    fn stands_on_hard_sixteen_against_ten() {
        let strategy = BasicStrategy::new(&Rule::default());
        let sixteen = hand(&[Rank::Ten, Rank::Six]);
        assert_eq!(strategy.decide(&sixteen, card(Rank::Ten), true, 1), Action::Stand);
        assert_eq!(strategy.decide(&sixteen, card(Rank::Seven), true, 1), Action::Hit);
        assert_eq!(strategy.decide(&sixteen, card(Rank::Six), true, 1), Action::Stand);
    }

    #[test]
    fn splits_aces_against_six() {
        let strategy = BasicStrategy::new(&Rule::default());
        let aces = hand(&[Rank::Ace, Rank::Ace]);
        assert!(aces.can_split(Rule::default().split_limit));
        assert_eq!(strategy.decide(&aces, card(Rank::Six), true, 1), Action::Split);
        // Out of splits: a soft 12 is hit.
        assert_eq!(strategy.decide(&aces, card(Rank::Six), true, 3), Action::Hit);
    }

    #[test]
    fn double_falls_back_after_first_decision() {
        let strategy = BasicStrategy::new(&Rule::default());
        let eleven = hand(&[Rank::Six, Rank::Five]);
        assert_eq!(strategy.decide(&eleven, card(Rank::Six), true, 1), Action::Double);
        assert_eq!(strategy.decide(&eleven, card(Rank::Six), false, 1), Action::Hit);
        // No double after split by default.
        assert_eq!(strategy.decide(&eleven, card(Rank::Six), true, 2), Action::Hit);

        let soft_eighteen = hand(&[Rank::Ace, Rank::Seven]);
        assert_eq!(strategy.decide(&soft_eighteen, card(Rank::Four), true, 1), Action::Double);
        assert_eq!(strategy.decide(&soft_eighteen, card(Rank::Four), false, 1), Action::Stand);
        assert_eq!(strategy.decide(&soft_eighteen, card(Rank::Nine), true, 1), Action::Hit);
    }

    #[test]
    fn das_rule_enables_double_after_split() {
        let rule = Rule {
            allow_das: true,
            ..Default::default()
        };
        let strategy = BasicStrategy::new(&rule);
        let eleven = hand(&[Rank::Six, Rank::Five]);
        assert_eq!(strategy.decide(&eleven, card(Rank::Six), true, 2), Action::Double);
    }

    #[test]
    fn nines_stand_when_they_cannot_split() {
        let strategy = BasicStrategy::new(&Rule::default());
        let nines = hand(&[Rank::Nine, Rank::Nine]);
        assert_eq!(strategy.decide(&nines, card(Rank::Eight), true, 1), Action::Split);
        assert_eq!(strategy.decide(&nines, card(Rank::Seven), true, 1), Action::Stand);
        assert_eq!(strategy.decide(&nines, card(Rank::Eight), false, 1), Action::Stand);
    }

    #[test]
    fn legal_actions_and_reasons_agree() {
        let rule = Rule::default();
        let eights = hand(&[Rank::Eight, Rank::Eight]);
        assert_eq!(
            legal_actions(&eights, 1, &rule),
            vec![Action::Hit, Action::Stand, Action::Double, Action::Split]
        );
        assert!(illegal_reason(Action::Split, &eights, 3, &rule).is_some());

        let three = hand(&[Rank::Two, Rank::Three, Rank::Four]);
        assert_eq!(legal_actions(&three, 1, &rule), vec![Action::Hit, Action::Stand]);
        for action in Action::iter() {
            assert_eq!(
                illegal_reason(action, &three, 1, &rule).is_none(),
                legal_actions(&three, 1, &rule).contains(&action)
            );
        }
    }
}
