use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod combination;
pub mod config;
pub mod database;
pub mod deck;
pub mod error;
pub mod evaluate;
pub mod game;
pub mod player;
pub mod policy;
pub mod scoring;
pub mod simulator;
pub mod survey;
pub mod trick;

pub use error::WizardError;

/// Highest rank of a colored card.
pub const RANKS_PER_COLOR: u8 = 13;
pub const NUMBER_OF_MAGICIANS: usize = 2;
pub const NUMBER_OF_JESTERS: usize = 2;
pub const DECK_SIZE: usize = 4 * RANKS_PER_COLOR as usize + NUMBER_OF_MAGICIANS + NUMBER_OF_JESTERS;

pub const TRUMP_COLOR: Color = Color::Red;
/// Color every non-trump card is mapped to first when canonicalizing a hand.
pub const FIRST_OTHER_COLOR: Color = Color::Blue;
pub const SECOND_OTHER_COLOR: Color = Color::Green;

/// Separator used between cards in hand labels.
pub const LABEL_DELIMITER: &str = " - ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// Position in the base color order. Lower sorts higher.
    pub fn base_index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Blue => 1,
            Color::Green => 2,
            Color::Yellow => 3,
        }
    }

    pub fn is_trump(self) -> bool {
        self == TRUMP_COLOR
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Color::Red => "Red",
            Color::Blue => "Blue",
            Color::Green => "Green",
            Color::Yellow => "Yellow",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Color {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Red" => Ok(Color::Red),
            "Blue" => Ok(Color::Blue),
            "Green" => Ok(Color::Green),
            "Yellow" => Ok(Color::Yellow),
            _ => Err(WizardError::UnknownCard(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Special {
    Magician,
    Jester,
}

impl std::fmt::Display for Special {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Special::Magician => "Magician",
            Special::Jester => "Jester",
        };
        write!(f, "{}", s)
    }
}

/// A playing card. Either a colored card with a rank, or a special card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Card {
    Plain { color: Color, rank: u8 },
    Special(Special),
}

impl Card {
    pub const MAGICIAN: Card = Card::Special(Special::Magician);
    pub const JESTER: Card = Card::Special(Special::Jester);

    pub fn new(color: Color, rank: u8) -> Self {
        Card::Plain { color, rank }
    }

    /// Build a card from loose parts, rejecting any combination that is not
    /// exactly one of `{color and rank}` or `{special}`.
    pub fn try_from_parts(
        color: Option<Color>,
        rank: Option<u8>,
        special: Option<Special>,
    ) -> Result<Self, WizardError> {
        match (color, rank, special) {
            (None, None, Some(special)) => Ok(Card::Special(special)),
            (Some(color), Some(rank), None) if (1..=RANKS_PER_COLOR).contains(&rank) => {
                Ok(Card::Plain { color, rank })
            }
            _ => Err(WizardError::InvalidCard),
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Card::Plain { color, .. } => Some(*color),
            Card::Special(_) => None,
        }
    }

    pub fn rank(&self) -> Option<u8> {
        match self {
            Card::Plain { rank, .. } => Some(*rank),
            Card::Special(_) => None,
        }
    }

    pub fn special(&self) -> Option<Special> {
        match self {
            Card::Plain { .. } => None,
            Card::Special(special) => Some(*special),
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Card::Special(_))
    }

    pub fn is_magician(&self) -> bool {
        *self == Card::MAGICIAN
    }

    pub fn is_jester(&self) -> bool {
        *self == Card::JESTER
    }

    pub fn is_trump(&self) -> bool {
        self.color().map_or(false, Color::is_trump)
    }

    fn tier(&self) -> u8 {
        match self {
            Card::Special(Special::Jester) => 0,
            Card::Plain { .. } => 1,
            Card::Special(Special::Magician) => 2,
        }
    }
}

// Display ordering, used for sorting hands and building labels. Trick
// resolution goes through `trick::PlayedCard::beats` instead.
impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Card::Plain { color: c1, rank: r1 }, Card::Plain { color: c2, rank: r2 }) => c2
                .base_index()
                .cmp(&c1.base_index())
                .then(r1.cmp(r2)),
            _ => self.tier().cmp(&other.tier()),
        }
    }
}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Card::Plain { color, rank } => write!(f, "{} {}", rank, color),
            Card::Special(special) => write!(f, "{}", special),
        }
    }
}

impl FromStr for Card {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Magician" => return Ok(Card::MAGICIAN),
            "Jester" => return Ok(Card::JESTER),
            _ => {}
        }
        let unknown = || WizardError::UnknownCard(s.to_string());
        let (rank, color) = s.trim().split_once(' ').ok_or_else(unknown)?;
        let rank: u8 = rank.parse().map_err(|_| unknown())?;
        let color: Color = color.parse().map_err(|_| unknown())?;
        Card::try_from_parts(Some(color), Some(rank), None).map_err(|_| unknown())
    }
}

/// Sort cards by descending display order.
pub fn sort_descending(cards: &mut [Card]) {
    cards.sort_by(|a, b| b.cmp(a));
}

/// Label of a hand in the given order, e.g. `"10 Red - Jester"`.
pub fn hand_label(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(LABEL_DELIMITER)
}

/// Label of a hand independent of the order it was given in.
pub fn combination_label(cards: &[Card]) -> String {
    let mut sorted = cards.to_vec();
    sort_descending(&mut sorted);
    hand_label(&sorted)
}

/// Parse a label produced by [`hand_label`] or [`combination_label`],
/// keeping the order found in the label.
pub fn parse_hand_label(label: &str) -> Result<Vec<Card>, WizardError> {
    label.split(LABEL_DELIMITER).map(str::parse).collect()
}

/// Generate all permutations of the indices `0..n` (Heap's algorithm).
/// The first permutation is the identity.
pub fn hand_orders(n: usize) -> Vec<Vec<usize>> {
    fn permute(result: &mut Vec<Vec<usize>>, arr: &mut [usize], k: usize) {
        if k <= 1 {
            result.push(arr.to_vec());
        } else {
            for i in 0..k {
                permute(result, arr, k - 1);
                if k % 2 == 0 {
                    arr.swap(i, k - 1);
                } else {
                    arr.swap(0, k - 1);
                }
            }
        }
    }
    let mut data: Vec<usize> = (0..n).collect();
    let mut result = Vec::with_capacity(factorial(n));
    permute(&mut result, &mut data, n);
    result
}

pub const fn factorial(n: usize) -> usize {
    match n {
        0 | 1 => 1,
        _ => n * factorial(n - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn special_and_color_is_invalid() {
        let card = Card::try_from_parts(Some(Color::Red), Some(3), Some(Special::Magician));
        assert!(matches!(card, Err(WizardError::InvalidCard)));
        assert!(Card::try_from_parts(None, None, None).is_err());
        assert!(Card::try_from_parts(Some(Color::Blue), None, None).is_err());
        assert!(Card::try_from_parts(Some(Color::Blue), Some(14), None).is_err());
        assert_eq!(
            Card::try_from_parts(None, None, Some(Special::Jester)).unwrap(),
            Card::JESTER
        );
    }

    #[test]
    fn magician_never_equals_jester() {
        assert_ne!(Card::MAGICIAN, Card::JESTER);
        assert_eq!(Card::MAGICIAN, Card::MAGICIAN);
        assert_eq!(Card::new(Color::Green, 4), Card::new(Color::Green, 4));
        assert_ne!(Card::new(Color::Green, 4), Card::new(Color::Blue, 4));
    }

    #[test]
    fn display_order_puts_trump_first() {
        let trump = Card::new(Color::Red, 1);
        let blue = Card::new(Color::Blue, 13);
        let yellow = Card::new(Color::Yellow, 13);
        assert!(trump > blue);
        assert!(blue > yellow);
        assert!(Card::new(Color::Blue, 12) < blue);
        assert!(Card::MAGICIAN > trump);
        assert!(Card::JESTER < yellow);
        assert!(Card::MAGICIAN > Card::JESTER);
        assert_eq!(Card::MAGICIAN.cmp(&Card::MAGICIAN), Ordering::Equal);
    }

    #[test]
    fn labels_parse_back() {
        let hand = vec![Card::new(Color::Blue, 9), Card::MAGICIAN, Card::new(Color::Red, 10)];
        assert_eq!(hand_label(&hand), "9 Blue - Magician - 10 Red");
        assert_eq!(combination_label(&hand), "Magician - 10 Red - 9 Blue");
        assert_eq!(parse_hand_label(&hand_label(&hand)).unwrap(), hand);
        assert!(parse_hand_label("11 Purple").is_err());
        assert!("0 Red".parse::<Card>().is_err());
    }

    #[test]
    fn hand_order_permutations() {
        let perms = hand_orders(3);
        assert_eq!(perms.len(), factorial(3));
        assert_eq!(perms[0], vec![0, 1, 2]);
        let unique: std::collections::HashSet<_> = perms.iter().collect();
        assert_eq!(unique.len(), 6);
        assert_eq!(hand_orders(2), vec![vec![0, 1], vec![1, 0]]);
        assert_eq!(hand_orders(1), vec![vec![0]]);
    }

    fn any_card() -> impl Strategy<Value = Card> {
        prop_oneof![
            Just(Card::MAGICIAN),
            Just(Card::JESTER),
            (0usize..4, 1u8..=13).prop_map(|(c, r)| Card::new(Color::ALL[c], r)),
        ]
    }

    proptest! {
        #[test]
        fn equality_is_symmetric_and_matches_ordering(a in any_card(), b in any_card()) {
            prop_assert_eq!(a == b, b == a);
            prop_assert_eq!(a == b, a.cmp(&b) == Ordering::Equal);
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        }

        #[test]
        fn text_form_parses_back(card in any_card()) {
            prop_assert_eq!(card.to_string().parse::<Card>().unwrap(), card);
        }
    }
}
