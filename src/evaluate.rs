//! Scoring a set of players over a fixed list of decks.

use tracing::debug;

use crate::config::{GameConfig, ScoringRules};
use crate::deck::Deck;
use crate::game::Game;
use crate::player::Player;
use crate::WizardError;

/// Play one full game per deck and return the tracked player's mean score,
/// or `None` when no decks are given.
///
/// Hands are cleared before every deal. Without an explicit starting seat the
/// game on deck `i` starts at seat `i % players`.
pub fn evaluate_fixed_decks(
    config: GameConfig,
    decks: &[Deck],
    players: &mut Vec<Player>,
    tracked_player: usize,
    starting_player: Option<usize>,
    rules: &ScoringRules,
) -> Result<Option<f64>, WizardError> {
    if tracked_player >= players.len() {
        return Err(WizardError::LearningPlayerNotPlaying {
            tracked: tracked_player,
            players: players.len(),
        });
    }
    if decks.is_empty() {
        return Ok(None);
    }

    let mut total = 0i64;
    for (i, deck) in decks.iter().enumerate() {
        for player in players.iter_mut() {
            player.clear_hand();
        }
        let starting = starting_player.unwrap_or(i % players.len());
        let mut game = Game::new(config);
        game.initialize(deck.clone(), std::mem::take(players), starting);
        game.request_predictions();
        game.play_game();
        let score = game.scores(rules)[tracked_player].unwrap_or(0);
        debug!(deck = i, starting, score, "evaluated deck");
        total += i64::from(score);
        *players = game.into_players();
    }
    Ok(Some(total as f64 / decks.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FixedPriorityPolicy;
    use crate::{Card, Color};

    /// Bid 0 and always play the highest legal card.
    fn players() -> Vec<Player> {
        let mut highest_first = Deck::new().cards().to_vec();
        crate::sort_descending(&mut highest_first);
        (0..3)
            .map(|id| Player::new(id, Box::new(FixedPriorityPolicy::new(0, highest_first.clone()))))
            .collect()
    }

    fn deck() -> Deck {
        // Trump 1 Red is revealed, then seats take two cards each.
        let mut cards = vec![
            Card::new(Color::Red, 1),
            Card::MAGICIAN,
            Card::new(Color::Red, 13),
            Card::JESTER,
            Card::new(Color::Blue, 2),
            Card::JESTER,
            Card::new(Color::Green, 3),
        ];
        cards.extend((1..=5).map(|r| Card::new(Color::Yellow, r)));
        Deck::from_cards(cards)
    }

    #[test]
    fn empty_deck_list_has_no_score() {
        let mut p = players();
        let mean = evaluate_fixed_decks(GameConfig::default(), &[], &mut p, 0, None, &ScoringRules::default());
        assert_eq!(mean.unwrap(), None);
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn tracked_player_must_be_seated() {
        let mut p = players();
        assert!(matches!(
            evaluate_fixed_decks(GameConfig::default(), &[deck()], &mut p, 3, None, &ScoringRules::default()),
            Err(WizardError::LearningPlayerNotPlaying { tracked: 3, players: 3 })
        ));
    }

    #[test]
    fn strong_hand_overshoots_a_zero_bid() {
        // Seat 0 holds Magician and 13 Red and takes both tricks.
        let mut p = players();
        let mean = evaluate_fixed_decks(
            GameConfig::default(),
            &[deck(), deck()],
            &mut p,
            0,
            Some(0),
            &ScoringRules::default(),
        )
        .unwrap();
        assert_eq!(mean, Some(-20.0));
        assert_eq!(p.len(), 3);
        assert!(p.iter().all(|player| player.hand().is_empty()));
    }
}
