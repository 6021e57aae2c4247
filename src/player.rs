use crate::policy::{FixedPriorityPolicy, GameView, Policy, TableView};
use crate::Card;

pub struct Player {
    pub id: usize,
    hand: Vec<Card>,
    initial_hand: Vec<Card>,
    policy: Box<dyn Policy>,
}

impl Player {
    pub fn new(id: usize, policy: Box<dyn Policy>) -> Self {
        Self {
            id,
            hand: Vec::new(),
            initial_hand: Vec::new(),
            policy,
        }
    }

    /// A player whose policy is an empty fixed-priority list, to be replaced
    /// before play.
    pub fn placeholder(id: usize) -> Self {
        Self::new(id, Box::new(FixedPriorityPolicy::default()))
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn initial_hand(&self) -> &[Card] {
        &self.initial_hand
    }

    /// Take a hand if the player holds none yet. Returns whether the cards
    /// were accepted.
    pub fn receive_cards(&mut self, cards: Vec<Card>) -> bool {
        if !self.hand.is_empty() {
            return false;
        }
        self.initial_hand = cards.clone();
        self.hand = cards;
        true
    }

    pub fn clear_hand(&mut self) {
        self.hand.clear();
        self.initial_hand.clear();
    }

    pub fn reset_hand(&mut self) {
        self.hand = self.initial_hand.clone();
    }

    pub fn set_policy(&mut self, policy: Box<dyn Policy>) {
        self.policy = policy;
    }

    pub fn make_prediction(&mut self, table: TableView<'_>) -> usize {
        let view = GameView {
            hand: &self.hand,
            initial_hand: &self.initial_hand,
            table,
        };
        self.policy.choose_bid(&view)
    }

    /// Ask the policy for a card and remove it from the hand.
    pub fn play_card(&mut self, table: TableView<'_>) -> Card {
        let view = GameView {
            hand: &self.hand,
            initial_hand: &self.initial_hand,
            table,
        };
        let legal = view.legal_plays();
        let card = self.policy.choose_play(&view);
        assert!(
            legal.contains(&card),
            "seat {} played {} which is not a legal card",
            self.id,
            card
        );
        if let Some(idx) = self.hand.iter().position(|c| *c == card) {
            self.hand.remove(idx);
        }
        card
    }
}
