use crate::{Card, Color};

/// A card as it was played into a trick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedCard {
    pub card: Card,
    /// Lead color of the trick when this card was played, if one existed.
    pub lead_color: Option<Color>,
    /// Zero-based position within the trick.
    pub position: usize,
    /// Seat of the player who played the card.
    pub player: usize,
}

impl PlayedCard {
    pub fn new(card: Card, lead_color: Option<Color>, position: usize, player: usize) -> Self {
        Self {
            card,
            lead_color,
            position,
            player,
        }
    }

    fn strength(&self, lead: Option<Color>) -> (bool, bool, u8) {
        match self.card {
            Card::Plain { color, rank } => (color.is_trump(), Some(color) == lead, rank),
            Card::Special(_) => (false, false, 0),
        }
    }

    /// Whether this card takes the trick over `other`.
    ///
    /// Plain cards compare by `(trump, lead color, rank)` under this card's
    /// lead color. As soon as a special is involved the outcome depends on
    /// play order: the earlier card keeps the trick if it is a Magician or
    /// the later card is a Jester, otherwise the later card takes it.
    pub fn beats(&self, other: &PlayedCard) -> bool {
        if !self.card.is_special() && !other.card.is_special() {
            return self.strength(self.lead_color) > other.strength(self.lead_color);
        }
        let (earlier, later) = if self.position < other.position {
            (self, other)
        } else {
            (other, self)
        };
        let earlier_wins = earlier.card.is_magician() || later.card.is_jester();
        if self.position < other.position {
            earlier_wins
        } else {
            !earlier_wins
        }
    }
}

/// Resolve a trick by folding [`PlayedCard::beats`] left to right over the
/// plays in play order. The relation is pairwise, so this is not a sort.
pub fn trick_winner(plays: &[PlayedCard]) -> &PlayedCard {
    assert!(!plays.is_empty(), "cannot resolve an empty trick");
    plays[1..]
        .iter()
        .fold(&plays[0], |best, play| if play.beats(best) { play } else { best })
}
