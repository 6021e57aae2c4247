use rand::seq::SliceRandom;
use rand::Rng;

use crate::{Card, Color, Special, NUMBER_OF_JESTERS, NUMBER_OF_MAGICIANS, RANKS_PER_COLOR};

/// A stack of cards, top of the stack first.
///
/// The deck remembers a snapshot it can be reset to. The snapshot is taken on
/// creation and again every time cards are removed with [`Deck::remove_all`],
/// so a deck stripped of a hand can be reshuffled and restored repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
    snapshot: Vec<Card>,
}

impl Deck {
    /// Return a deck containing all 56 cards in base order.
    pub fn new() -> Self {
        let mut cards = Vec::with_capacity(crate::DECK_SIZE);
        for &color in &Color::ALL {
            for rank in 1..=RANKS_PER_COLOR {
                cards.push(Card::new(color, rank));
            }
        }
        cards.extend(std::iter::repeat(Card::MAGICIAN).take(NUMBER_OF_MAGICIANS));
        cards.extend(std::iter::repeat(Card::JESTER).take(NUMBER_OF_JESTERS));
        Self::from_cards(cards)
    }

    pub fn create<R: Rng + ?Sized>(shuffled: bool, rng: &mut R) -> Self {
        let mut deck = Self::new();
        if shuffled {
            deck.cards.shuffle(rng);
            deck.snapshot = deck.cards.clone();
        }
        deck
    }

    pub fn from_cards(cards: Vec<Card>) -> Self {
        Self {
            snapshot: cards.clone(),
            cards,
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

    /// Shuffle the current cards in place. The snapshot is left untouched.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Cards of the requested colors, in deck order, plus specials if asked.
    /// Unless `keep_duplicate_specials` is set only the first card of each
    /// special kind is kept.
    pub fn filter(
        &self,
        colors: &[Color],
        keep_specials: bool,
        keep_duplicate_specials: bool,
    ) -> Vec<Card> {
        let mut seen: Vec<Special> = Vec::new();
        let mut filtered = Vec::new();
        for card in &self.cards {
            match card {
                Card::Plain { color, .. } if colors.contains(color) => filtered.push(*card),
                Card::Special(special) if keep_specials => {
                    if keep_duplicate_specials || !seen.contains(special) {
                        filtered.push(*card);
                        seen.push(*special);
                    }
                }
                _ => {}
            }
        }
        filtered
    }

    /// Remove one structurally equal card per requested card. Cards that are
    /// not in the deck are skipped. The result becomes the new snapshot.
    pub fn remove_all(&mut self, cards: &[Card]) {
        for card in cards {
            if let Some(idx) = self.cards.iter().position(|c| c == card) {
                self.cards.remove(idx);
            }
        }
        self.snapshot = self.cards.clone();
    }

    /// Restore the cards captured by the last snapshot.
    pub fn reset(&mut self) {
        self.cards = self.snapshot.clone();
    }

    /// Remove and return the first card of the given color.
    pub fn take_first_of_color(&mut self, color: Color) -> Option<Card> {
        let idx = self.cards.iter().position(|c| c.color() == Some(color))?;
        Some(self.cards.remove(idx))
    }

    /// Remove and return the top `n` cards.
    pub fn draw(&mut self, n: usize) -> Vec<Card> {
        assert!(n <= self.cards.len(), "not enough cards to draw {}", n);
        self.cards.drain(..n).collect()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn deck_has_56_cards() {
        let d = Deck::new();
        assert_eq!(d.len(), 56);
        assert_eq!(d.len(), crate::DECK_SIZE);
        assert_eq!(d.cards().iter().filter(|c| c.is_magician()).count(), 2);
        assert_eq!(d.cards().iter().filter(|c| c.is_jester()).count(), 2);
    }

    #[test]
    fn shuffled_deck_keeps_cards() {
        let mut rng = StdRng::seed_from_u64(7);
        let d = Deck::create(true, &mut rng);
        let mut shuffled = d.cards().to_vec();
        let mut ordered = Deck::new().cards().to_vec();
        shuffled.sort();
        ordered.sort();
        assert_eq!(shuffled, ordered);
    }

    #[test]
    fn filter_dedups_specials() {
        let d = Deck::new();
        let trumps = d.filter(&[Color::Red], true, false);
        assert_eq!(trumps.len(), 15);
        assert_eq!(trumps.iter().filter(|c| c.is_magician()).count(), 1);
        let all = d.filter(&[Color::Red], true, true);
        assert_eq!(all.len(), 17);
        let blue = d.filter(&[Color::Blue], false, false);
        assert_eq!(blue.len(), 13);
        assert!(blue.iter().all(|c| c.color() == Some(Color::Blue)));
    }

    #[test]
    fn remove_all_removes_one_copy_and_ignores_missing() {
        let mut d = Deck::new();
        d.remove_all(&[Card::MAGICIAN, Card::new(Color::Red, 3)]);
        assert_eq!(d.len(), 54);
        assert_eq!(d.cards().iter().filter(|c| c.is_magician()).count(), 1);
        d.remove_all(&[Card::new(Color::Red, 3)]);
        assert_eq!(d.len(), 54);
    }

    #[test]
    fn reset_restores_last_snapshot() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut d = Deck::new();
        d.remove_all(&[Card::JESTER]);
        let before = d.clone();
        d.shuffle(&mut rng);
        d.draw(5);
        d.reset();
        assert_eq!(d, before);
    }

    #[test]
    fn take_first_trump() {
        let mut d = Deck::from_cards(vec![Card::MAGICIAN, Card::new(Color::Blue, 2), Card::new(Color::Red, 5)]);
        assert_eq!(d.take_first_of_color(Color::Red), Some(Card::new(Color::Red, 5)));
        assert_eq!(d.take_first_of_color(Color::Red), None);
        assert_eq!(d.len(), 2);
    }
}
