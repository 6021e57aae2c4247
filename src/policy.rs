//! Bid and play policies.
//!
//! A [`Policy`] sees the player's own hand plus the public state of the game
//! and answers with a bid or a card. Players are composed with a boxed policy
//! at construction time, so random, fixed-priority and table-driven players
//! are interchangeable.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::warn;

use crate::combination::canonicalize;
use crate::config::IMPLEMENTED_COMBINATIONS;
use crate::survey::SurveyTable;
use crate::trick::PlayedCard;
use crate::{combination_label, parse_hand_label, Card, Color, WizardError};

/// Public state of a game as seen from one seat.
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    pub seat: usize,
    pub players: usize,
    pub cards_per_player: usize,
    /// Position of this seat in the current play order.
    pub order_position: usize,
    pub lead_color: Option<Color>,
    pub trick: &'a [PlayedCard],
    pub predictions: &'a [Option<usize>],
}

/// Everything a policy may look at when deciding.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub hand: &'a [Card],
    pub initial_hand: &'a [Card],
    pub table: TableView<'a>,
}

impl GameView<'_> {
    pub fn legal_plays(&self) -> Vec<Card> {
        legal_plays(self.hand, self.table.lead_color)
    }

    pub fn legal_bids(&self) -> Vec<usize> {
        let t = &self.table;
        let is_last = t.order_position + 1 == t.players;
        let announced: usize = t
            .predictions
            .iter()
            .enumerate()
            .filter(|&(seat, _)| seat != t.seat)
            .filter_map(|(_, p)| *p)
            .sum();
        legal_bids(t.cards_per_player, is_last, announced)
    }
}

/// Cards that may be played from `hand`. With a lead color established, a
/// player holding that color must play it or a special.
pub fn legal_plays(hand: &[Card], lead: Option<Color>) -> Vec<Card> {
    if let Some(lead) = lead {
        if hand.iter().any(|c| c.color() == Some(lead)) {
            return hand
                .iter()
                .copied()
                .filter(|c| c.color() == Some(lead) || c.is_special())
                .collect();
        }
    }
    hand.to_vec()
}

/// Bids in `0..=cards_per_player`. The last bidder may not bring the total to
/// exactly the number of cards.
pub fn legal_bids(cards_per_player: usize, is_last: bool, announced: usize) -> Vec<usize> {
    let forbidden = if is_last {
        cards_per_player.checked_sub(announced)
    } else {
        None
    };
    (0..=cards_per_player)
        .filter(|&bid| Some(bid) != forbidden)
        .collect()
}

pub trait Policy: Send {
    fn choose_bid(&mut self, view: &GameView) -> usize;

    /// Must return one of `view.legal_plays()`.
    fn choose_play(&mut self, view: &GameView) -> Card;
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn random_legal_bid(rng: &mut StdRng, view: &GameView) -> usize {
    *view.legal_bids().choose(rng).unwrap_or(&0)
}

/// Uniformly random legal bids and plays.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: rng_from(seed) }
    }
}

impl Policy for RandomPolicy {
    fn choose_bid(&mut self, view: &GameView) -> usize {
        random_legal_bid(&mut self.rng, view)
    }

    fn choose_play(&mut self, view: &GameView) -> Card {
        let legal = view.legal_plays();
        match legal.choose(&mut self.rng) {
            Some(card) => *card,
            None => panic!("seat {} has no card to play", view.table.seat),
        }
    }
}

/// Random legal bid, always plays the highest legal card.
pub struct HighestCardPolicy {
    rng: StdRng,
}

impl HighestCardPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: rng_from(seed) }
    }
}

impl Policy for HighestCardPolicy {
    fn choose_bid(&mut self, view: &GameView) -> usize {
        random_legal_bid(&mut self.rng, view)
    }

    fn choose_play(&mut self, view: &GameView) -> Card {
        match view.legal_plays().into_iter().max() {
            Some(card) => card,
            None => panic!("seat {} has no card to play", view.table.seat),
        }
    }
}

/// Random legal bid, always plays the lowest legal card.
pub struct LowestCardPolicy {
    rng: StdRng,
}

impl LowestCardPolicy {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: rng_from(seed) }
    }
}

impl Policy for LowestCardPolicy {
    fn choose_bid(&mut self, view: &GameView) -> usize {
        random_legal_bid(&mut self.rng, view)
    }

    fn choose_play(&mut self, view: &GameView) -> Card {
        match view.legal_plays().into_iter().min() {
            Some(card) => card,
            None => panic!("seat {} has no card to play", view.table.seat),
        }
    }
}

/// Bid a fixed value and play the first legal card of a priority list.
#[derive(Debug, Clone, Default)]
pub struct FixedPriorityPolicy {
    prediction: usize,
    priority: Vec<Card>,
}

impl FixedPriorityPolicy {
    pub fn new(prediction: usize, priority: Vec<Card>) -> Self {
        Self {
            prediction,
            priority,
        }
    }

    pub fn priority(&self) -> &[Card] {
        &self.priority
    }
}

fn bid_or_next(prediction: usize, view: &GameView) -> usize {
    if view.legal_bids().contains(&prediction) {
        prediction
    } else {
        prediction + 1
    }
}

fn first_legal(priority: &[Card], view: &GameView) -> Option<Card> {
    let legal = view.legal_plays();
    priority.iter().copied().find(|card| legal.contains(card))
}

impl Policy for FixedPriorityPolicy {
    fn choose_bid(&mut self, view: &GameView) -> usize {
        bid_or_next(self.prediction, view)
    }

    fn choose_play(&mut self, view: &GameView) -> Card {
        match first_legal(&self.priority, view) {
            Some(card) => card,
            None => panic!(
                "priority list of seat {} covers none of its legal cards",
                view.table.seat
            ),
        }
    }
}

/// Follow the best strategy a survey table lists for the player's hand.
pub struct TablePolicy {
    table: Arc<SurveyTable>,
}

impl TablePolicy {
    /// Fails for hand sizes the table cannot have classes for.
    pub fn new(table: Arc<SurveyTable>, cards_per_player: usize) -> Result<Self, WizardError> {
        if !IMPLEMENTED_COMBINATIONS.contains(&cards_per_player) {
            return Err(WizardError::CombinationNotImplemented(cards_per_player));
        }
        Ok(Self { table })
    }

    /// The initial hand ordered by the table's best own-order for its class.
    fn priority(&self, view: &GameView) -> Option<Vec<Card>> {
        let combination = canonicalize(view.initial_hand);
        let strategy = self.table.best_strategy(&combination_label(&combination))?;
        let order = parse_hand_label(&strategy.own_order).ok()?;
        order
            .iter()
            .map(|placeholder| {
                combination
                    .iter()
                    .position(|c| c == placeholder)
                    .map(|idx| view.initial_hand[idx])
            })
            .collect()
    }
}

impl Policy for TablePolicy {
    fn choose_bid(&mut self, view: &GameView) -> usize {
        let combination = canonicalize(view.initial_hand);
        match self.table.best_strategy(&combination_label(&combination)) {
            Some(strategy) => bid_or_next(strategy.prediction, view),
            None => {
                warn!(seat = view.table.seat, "hand missing from survey table, bidding lowest legal");
                view.legal_bids().first().copied().unwrap_or(0)
            }
        }
    }

    fn choose_play(&mut self, view: &GameView) -> Card {
        if let Some(card) = self.priority(view).and_then(|p| first_legal(&p, view)) {
            return card;
        }
        warn!(seat = view.table.seat, "hand missing from survey table, playing first legal card");
        match view.legal_plays().first() {
            Some(card) => *card,
            None => panic!("seat {} has no card to play", view.table.seat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view<'a>(hand: &'a [Card], lead: Option<Color>, predictions: &'a [Option<usize>], order_position: usize) -> GameView<'a> {
        GameView {
            hand,
            initial_hand: hand,
            table: TableView {
                seat: 0,
                players: 3,
                cards_per_player: 2,
                order_position,
                lead_color: lead,
                trick: &[],
                predictions,
            },
        }
    }

    #[test]
    fn must_follow_lead_color_or_play_special() {
        let hand = [Card::new(Color::Blue, 3), Card::new(Color::Green, 9), Card::JESTER];
        let legal = legal_plays(&hand, Some(Color::Blue));
        assert_eq!(legal, vec![Card::new(Color::Blue, 3), Card::JESTER]);
    }

    #[test]
    fn any_card_when_void_or_no_lead() {
        let hand = [Card::new(Color::Green, 9), Card::MAGICIAN];
        assert_eq!(legal_plays(&hand, Some(Color::Blue)), hand.to_vec());
        assert_eq!(legal_plays(&hand, None), hand.to_vec());
    }

    #[test]
    fn last_bidder_cannot_match_card_count() {
        assert_eq!(legal_bids(2, true, 1), vec![0, 2]);
        assert_eq!(legal_bids(2, true, 3), vec![0, 1, 2]);
        assert_eq!(legal_bids(2, false, 1), vec![0, 1, 2]);
    }

    #[test]
    fn view_computes_forbidden_bid_for_last_seat() {
        let hand = [Card::new(Color::Green, 9), Card::MAGICIAN];
        let predictions = [None, Some(1), Some(1)];
        assert_eq!(view(&hand, None, &predictions, 2).legal_bids(), vec![1, 2]);
        assert_eq!(view(&hand, None, &predictions, 0).legal_bids(), vec![0, 1, 2]);
    }

    #[test]
    fn fixed_priority_skips_illegal_cards() {
        let hand = [Card::new(Color::Green, 9), Card::new(Color::Blue, 2)];
        let mut policy = FixedPriorityPolicy::new(0, hand.to_vec());
        assert_eq!(policy.choose_play(&view(&hand, Some(Color::Blue), &[], 0)), Card::new(Color::Blue, 2));
        assert_eq!(policy.choose_play(&view(&hand, None, &[], 0)), Card::new(Color::Green, 9));
    }

    #[test]
    fn fixed_bid_moves_up_when_forbidden() {
        let hand = [Card::new(Color::Green, 9), Card::MAGICIAN];
        let predictions = [None, Some(1), Some(1)];
        let mut policy = FixedPriorityPolicy::new(0, hand.to_vec());
        assert_eq!(policy.choose_bid(&view(&hand, None, &predictions, 2)), 1);
        assert_eq!(policy.choose_bid(&view(&hand, None, &predictions, 1)), 0);
    }

    #[test]
    fn highest_and_lowest_pick_by_display_order() {
        let hand = [Card::new(Color::Green, 9), Card::MAGICIAN, Card::JESTER];
        let v = view(&hand, None, &[], 0);
        assert_eq!(HighestCardPolicy::new(Some(1)).choose_play(&v), Card::MAGICIAN);
        assert_eq!(LowestCardPolicy::new(Some(1)).choose_play(&v), Card::JESTER);
    }

    #[test]
    fn random_policy_stays_legal() {
        let hand = [Card::new(Color::Blue, 3), Card::new(Color::Green, 9)];
        let mut policy = RandomPolicy::new(Some(42));
        for _ in 0..20 {
            let v = view(&hand, Some(Color::Blue), &[], 2);
            assert_eq!(policy.choose_play(&v), Card::new(Color::Blue, 3));
            assert!(v.legal_bids().contains(&policy.choose_bid(&v)));
        }
    }
}
