//! Canonical two-card hand combinations.
//!
//! Only three things about a two-card hand matter strategically: whether each
//! card is trump (or special), whether two plain non-trump cards share a color,
//! and which of them ranks higher. Every hand is mapped to a representative
//! that keeps those facts and relabels non-trump colors to [`FIRST_OTHER_COLOR`]
//! and [`SECOND_OTHER_COLOR`].

use itertools::Itertools;

use crate::deck::Deck;
use crate::{Card, FIRST_OTHER_COLOR, SECOND_OTHER_COLOR, TRUMP_COLOR};

fn is_trump_or_special(card: &Card) -> bool {
    card.is_special() || card.is_trump()
}

fn recolor(card: &Card, color: crate::Color) -> Card {
    match card {
        Card::Plain { rank, .. } => Card::new(color, *rank),
        Card::Special(_) => *card,
    }
}

/// Canonical form of a two-card hand. Positions are preserved.
pub fn canonicalize(cards: &[Card]) -> Vec<Card> {
    assert_eq!(cards.len(), 2, "only two-card hands can be canonicalized");
    let (a, b) = (&cards[0], &cards[1]);
    match (is_trump_or_special(a), is_trump_or_special(b)) {
        (true, true) => vec![*a, *b],
        (true, false) => vec![*a, recolor(b, FIRST_OTHER_COLOR)],
        (false, true) => vec![recolor(a, FIRST_OTHER_COLOR), *b],
        (false, false) if a.color() == b.color() => {
            vec![recolor(a, FIRST_OTHER_COLOR), recolor(b, FIRST_OTHER_COLOR)]
        }
        (false, false) if a.rank() >= b.rank() => {
            vec![recolor(a, FIRST_OTHER_COLOR), recolor(b, SECOND_OTHER_COLOR)]
        }
        (false, false) => vec![recolor(a, SECOND_OTHER_COLOR), recolor(b, FIRST_OTHER_COLOR)],
    }
}

/// One concrete hand per canonical class, drawn from `deck`.
pub fn enumerate_representative_classes(deck: &Deck) -> Vec<Vec<Card>> {
    let trumps_and_specials = deck.filter(&[TRUMP_COLOR], true, false);
    let first_other = deck.filter(&[FIRST_OTHER_COLOR], false, false);
    let second_other = deck.filter(&[SECOND_OTHER_COLOR], false, false);

    let mut classes = vec![
        vec![Card::MAGICIAN, Card::MAGICIAN],
        vec![Card::JESTER, Card::JESTER],
    ];
    classes.extend(
        trumps_and_specials
            .iter()
            .copied()
            .tuple_combinations()
            .map(|(a, b)| vec![a, b]),
    );
    classes.extend(
        trumps_and_specials
            .iter()
            .cartesian_product(&first_other)
            .map(|(a, b)| vec![*a, *b]),
    );
    classes.extend(
        first_other
            .iter()
            .cartesian_product(&second_other)
            .filter(|(a, b)| a.rank() >= b.rank())
            .map(|(a, b)| vec![*a, *b]),
    );
    classes.extend(
        first_other
            .iter()
            .copied()
            .tuple_combinations()
            .map(|(a, b)| vec![a, b]),
    );
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{combination_label, Color};
    use std::collections::HashSet;

    fn c(color: Color, rank: u8) -> Card {
        Card::new(color, rank)
    }

    #[test]
    fn higher_plain_card_gets_first_other_color() {
        assert_eq!(
            canonicalize(&[c(Color::Yellow, 10), c(Color::Blue, 9)]),
            vec![c(Color::Blue, 10), c(Color::Green, 9)]
        );
        assert_eq!(
            canonicalize(&[c(Color::Blue, 9), c(Color::Yellow, 10)]),
            vec![c(Color::Green, 9), c(Color::Blue, 10)]
        );
    }

    #[test]
    fn same_color_collapses_to_first_other_color() {
        assert_eq!(
            canonicalize(&[c(Color::Green, 9), c(Color::Green, 10)]),
            vec![c(Color::Blue, 9), c(Color::Blue, 10)]
        );
    }

    #[test]
    fn trump_and_specials_are_untouched() {
        assert_eq!(
            canonicalize(&[c(Color::Red, 9), c(Color::Green, 10)]),
            vec![c(Color::Red, 9), c(Color::Blue, 10)]
        );
        assert_eq!(
            canonicalize(&[c(Color::Yellow, 3), Card::JESTER]),
            vec![c(Color::Blue, 3), Card::JESTER]
        );
        assert_eq!(
            canonicalize(&[Card::MAGICIAN, c(Color::Red, 1)]),
            vec![Card::MAGICIAN, c(Color::Red, 1)]
        );
    }

    #[test]
    fn equal_ranks_in_different_colors() {
        assert_eq!(
            canonicalize(&[c(Color::Yellow, 4), c(Color::Green, 4)]),
            vec![c(Color::Blue, 4), c(Color::Green, 4)]
        );
    }

    #[test]
    fn enumeration_covers_471_classes() {
        let classes = enumerate_representative_classes(&Deck::new());
        // 2 special pairs, C(15,2) trump/special pairs, 15 * 13 trump-other
        // pairs, 91 cross-color pairs and C(13,2) same-color pairs.
        assert_eq!(classes.len(), 2 + 105 + 195 + 91 + 78);
        let labels: HashSet<String> = classes.iter().map(|h| combination_label(h)).collect();
        assert_eq!(labels.len(), classes.len());
    }

    #[test]
    fn every_dealt_hand_maps_to_an_enumerated_class() {
        let deck = Deck::new();
        let labels: HashSet<String> = enumerate_representative_classes(&deck)
            .iter()
            .map(|h| combination_label(h))
            .collect();
        for (a, b) in deck.cards().iter().tuple_combinations() {
            let canonical = canonicalize(&[*a, *b]);
            assert!(
                labels.contains(&combination_label(&canonical)),
                "{} - {} has no class",
                a,
                b
            );
        }
    }
}
