use tracing::{debug, trace};

use crate::config::{GameConfig, ScoringRules};
use crate::deck::Deck;
use crate::player::Player;
use crate::policy::{Policy, TableView};
use crate::scoring::score_round;
use crate::trick::{trick_winner, PlayedCard};
use crate::{Card, Color, TRUMP_COLOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Bidding,
    Playing { trick: usize },
    Scored,
}

/// Fixed once a game is initialized.
#[derive(Debug, Clone)]
pub struct GameDefinition {
    pub starting_player: usize,
    /// Trump-color card taken out of the deck before dealing.
    pub trump_card: Option<Card>,
    /// Cards left over after dealing.
    pub deck: Deck,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub phase: Phase,
    pub predictions: Vec<Option<usize>>,
    pub tricks_won: Vec<usize>,
    pub current_trick: Vec<PlayedCard>,
    pub lead_color: Option<Color>,
    pub history: Vec<Vec<PlayedCard>>,
    /// Seat leading the current trick.
    pub player_starting: usize,
    /// Position within the current trick.
    pub position: usize,
}

impl GameState {
    fn new(players: usize, starting_player: usize) -> Self {
        Self {
            phase: Phase::Bidding,
            predictions: vec![None; players],
            tricks_won: vec![0; players],
            current_trick: Vec::new(),
            lead_color: None,
            history: Vec::new(),
            player_starting: starting_player,
            position: 0,
        }
    }
}

pub struct Game {
    config: GameConfig,
    players: Vec<Player>,
    definition: Option<GameDefinition>,
    state: Option<GameState>,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            players: Vec::new(),
            definition: None,
            state: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Seat the players, reveal the trump and deal. Players already holding
    /// cards keep them and take nothing from the deck.
    pub fn initialize(&mut self, mut deck: Deck, mut players: Vec<Player>, starting_player: usize) {
        assert!(!players.is_empty(), "no players");
        assert_eq!(
            players.len(),
            self.config.players,
            "configured for {} players",
            self.config.players
        );
        assert!(starting_player < players.len(), "starting player is not seated");

        let trump_card = deck.take_first_of_color(TRUMP_COLOR);
        let cards = self.config.cards_per_player;
        assert!(
            cards * players.len() < deck.len(),
            "not enough cards: {} players x {} cards from {}",
            players.len(),
            cards,
            deck.len()
        );
        for player in players.iter_mut() {
            if player.hand().is_empty() {
                player.receive_cards(deck.draw(cards));
            }
        }
        debug!(?trump_card, starting_player, "game initialized");

        self.state = Some(GameState::new(players.len(), starting_player));
        self.definition = Some(GameDefinition {
            starting_player,
            trump_card,
            deck,
        });
        self.players = players;
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn into_players(self) -> Vec<Player> {
        self.players
    }

    pub fn set_policy(&mut self, seat: usize, policy: Box<dyn Policy>) {
        self.players[seat].set_policy(policy);
    }

    pub fn definition(&self) -> &GameDefinition {
        match &self.definition {
            Some(definition) => definition,
            None => panic!("game is not initialized"),
        }
    }

    pub fn state(&self) -> &GameState {
        match &self.state {
            Some(state) => state,
            None => panic!("game is not initialized"),
        }
    }

    fn state_mut(&mut self) -> &mut GameState {
        match &mut self.state {
            Some(state) => state,
            None => panic!("game is not initialized"),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.as_ref().map_or(Phase::Uninitialized, |s| s.phase)
    }

    /// Seat expected to play next.
    pub fn current_player(&self) -> usize {
        let state = self.state();
        (state.player_starting + state.position) % self.players.len()
    }

    /// Seats in play order, starting with the player leading the trick.
    pub fn ordered_players(&self) -> Vec<usize> {
        let n = self.players.len();
        let start = self.state().player_starting;
        (0..n).map(|offset| (start + offset) % n).collect()
    }

    fn table_view<'a>(config: &GameConfig, state: &'a GameState, seat: usize, order_position: usize) -> TableView<'a> {
        TableView {
            seat,
            players: config.players,
            cards_per_player: config.cards_per_player,
            order_position,
            lead_color: state.lead_color,
            trick: &state.current_trick,
            predictions: &state.predictions,
        }
    }

    /// Ask every player for a bid, in play order.
    pub fn request_predictions(&mut self) {
        assert_eq!(self.phase(), Phase::Bidding, "bids are only taken before play");
        for (order_position, seat) in self.ordered_players().into_iter().enumerate() {
            let prediction = {
                let Some(state) = &self.state else {
                    panic!("game is not initialized")
                };
                let table = Self::table_view(&self.config, state, seat, order_position);
                let player = &mut self.players[seat];
                player.make_prediction(table)
            };
            self.state_mut().predictions[seat] = Some(prediction);
        }
        self.state_mut().phase = Phase::Playing { trick: 0 };
    }

    /// Let the next player play a card, resolving the trick once everyone
    /// played. Returns whether the round is over.
    pub fn play_next_card(&mut self) -> bool {
        let trick = match self.phase() {
            Phase::Bidding => 0,
            Phase::Playing { trick } => trick,
            phase => panic!("cannot play a card in phase {:?}", phase),
        };
        let seat = self.current_player();
        let card = {
            let Some(state) = &self.state else {
                panic!("game is not initialized")
            };
            let table = Self::table_view(&self.config, state, seat, state.position);
            self.players[seat].play_card(table)
        };
        trace!(seat, %card, "card played");

        let players = self.players.len();
        let cards_per_player = self.config.cards_per_player;
        let state = self.state_mut();
        if state.lead_color.is_none() {
            state.lead_color = card.color();
        }
        let played = PlayedCard::new(card, state.lead_color, state.position, seat);
        state.current_trick.push(played);
        state.position += 1;

        if state.position < players {
            state.phase = Phase::Playing { trick };
            return false;
        }

        let winner = trick_winner(&state.current_trick).player;
        state.tricks_won[winner] += 1;
        state.player_starting = winner;
        let finished = std::mem::take(&mut state.current_trick);
        debug!(trick, winner, plays = ?finished, "trick resolved");
        state.history.push(finished);
        state.lead_color = None;
        state.position = 0;

        let round_over = state.history.len() == cards_per_player;
        state.phase = if round_over {
            Phase::Scored
        } else {
            Phase::Playing { trick: trick + 1 }
        };
        round_over
    }

    pub fn play_round(&mut self) {
        while !self.play_next_card() {}
    }

    /// A game is a single round, since each player holds a fixed hand.
    pub fn play_game(&mut self) {
        self.play_round();
    }

    /// Restore bids, tricks and hands to their state right after dealing.
    /// The deck is not reshuffled.
    pub fn reset_game(&mut self) {
        let starting_player = self.definition().starting_player;
        let players = self.players.len();
        self.state = Some(GameState::new(players, starting_player));
        for player in self.players.iter_mut() {
            player.reset_hand();
        }
    }

    /// Tricks won per seat.
    pub fn tricks_won(&self) -> &[usize] {
        &self.state().tricks_won
    }

    /// Points per seat for the round, `None` for seats that never bid.
    pub fn scores(&self, rules: &ScoringRules) -> Vec<Option<i32>> {
        let state = self.state();
        score_round(rules, &state.predictions, &state.tricks_won)
    }
}
