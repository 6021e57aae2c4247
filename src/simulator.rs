//! Exhaustive simulation of every deterministic play order.
//!
//! For each representative hand combination the tracked player is dealt that
//! hand, the rest of the deck is shuffled and dealt to the other players, and
//! the round is replayed once for every assignment of a priority order to
//! every player. Work is split into (combination, trial) units which run in
//! parallel, each with its own deck copy, game and RNG.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::combination::enumerate_representative_classes;
use crate::config::SimulationConfig;
use crate::deck::Deck;
use crate::game::Game;
use crate::player::Player;
use crate::policy::FixedPriorityPolicy;
use crate::{combination_label, hand_label, hand_orders, Card, WizardError};

/// Outcome of one fully determined round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    pub trial: usize,
    /// Combination label of the tracked player's hand.
    pub combination: String,
    /// Priority order the tracked player followed.
    pub own_order: String,
    /// Tricks won, keyed by player id.
    pub tricks_won: BTreeMap<usize, usize>,
}

/// Cooperative cancellation for long simulations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

struct WorkUnit {
    serial: u64,
    combination: usize,
    trial: usize,
}

/// Every ordering of `hand`, identity first.
pub fn priority_orders(hand: &[Card]) -> Vec<Vec<Card>> {
    hand_orders(hand.len())
        .into_iter()
        .map(|order| order.into_iter().map(|i| hand[i]).collect())
        .collect()
}

pub struct Simulator {
    config: SimulationConfig,
    deck: Deck,
    cancel: CancelToken,
}

impl Simulator {
    pub fn new(config: SimulationConfig, deck: Deck) -> Result<Self, WizardError> {
        config.validate()?;
        Ok(Self {
            config,
            deck,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn combinations(&self) -> Vec<Vec<Card>> {
        enumerate_representative_classes(&self.deck)
    }

    /// Simulate every representative combination.
    pub fn simulate(&self) -> Result<Vec<SimulationResult>, WizardError> {
        self.simulate_combinations(&self.combinations())
    }

    pub fn simulate_combinations(
        &self,
        combinations: &[Vec<Card>],
    ) -> Result<Vec<SimulationResult>, WizardError> {
        let trials = self.config.trials;
        let units: Vec<WorkUnit> = (0..combinations.len())
            .flat_map(|combination| (0..trials).map(move |trial| (combination, trial)))
            .enumerate()
            .map(|(serial, (combination, trial))| WorkUnit {
                serial: serial as u64,
                combination,
                trial,
            })
            .collect();
        let threads = self.config.thread_count();
        info!(
            combinations = combinations.len(),
            trials,
            threads,
            "starting exhaustive simulation"
        );

        let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
        // Indexed collect keeps the units in serial order.
        let batches: Vec<Option<Vec<SimulationResult>>> = pool.install(|| {
            units
                .par_iter()
                .map(|unit| {
                    if self.cancel.is_cancelled() {
                        return None;
                    }
                    let combination = &combinations[unit.combination];
                    if unit.trial == 0 {
                        debug!(combination = %combination_label(combination), "simulating combination");
                    }
                    let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(unit.serial));
                    Some(self.simulate_trial(combination, unit.trial, &mut rng))
                })
                .collect()
        });

        let mut results = Vec::new();
        for batch in batches {
            match batch {
                Some(batch) => results.extend(batch),
                None => return Err(WizardError::Cancelled),
            }
        }
        info!(results = results.len(), "exhaustive simulation finished");
        Ok(results)
    }

    /// Deal one random trial around `combination` and play out every
    /// assignment of priority orders to players.
    pub fn simulate_trial<R: Rng + ?Sized>(
        &self,
        combination: &[Card],
        trial: usize,
        rng: &mut R,
    ) -> Vec<SimulationResult> {
        let tracked = self.config.tracked_player;
        let mut deck = self.deck.clone();
        deck.remove_all(combination);
        deck.shuffle(rng);

        let mut players: Vec<Player> = (0..self.config.game.players)
            .map(Player::placeholder)
            .collect();
        players[tracked].receive_cards(combination.to_vec());
        let mut game = Game::new(self.config.game);
        game.initialize(deck, players, self.config.starting_player);

        let orders: Vec<Vec<Vec<Card>>> = game
            .players()
            .iter()
            .map(|p| priority_orders(p.hand()))
            .collect();
        let label = combination_label(combination);
        let mut results = Vec::with_capacity(orders.iter().map(Vec::len).product());

        for assignment in orders.iter().map(|o| o.iter()).multi_cartesian_product() {
            for (seat, order) in assignment.iter().enumerate() {
                game.set_policy(seat, Box::new(FixedPriorityPolicy::new(0, order.to_vec())));
            }
            game.reset_game();
            game.play_game();
            let tricks_won = game
                .players()
                .iter()
                .zip(game.tricks_won())
                .map(|(p, &tricks)| (p.id, tricks))
                .collect();
            results.push(SimulationResult {
                trial,
                combination: label.clone(),
                own_order: hand_label(assignment[tracked]),
                tricks_won,
            });
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn config(trials: usize) -> SimulationConfig {
        SimulationConfig {
            trials,
            seed: 11,
            threads: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn priority_orders_of_two_cards() {
        let hand = [Card::MAGICIAN, Card::new(Color::Red, 4)];
        assert_eq!(
            priority_orders(&hand),
            vec![hand.to_vec(), vec![hand[1], hand[0]]]
        );
    }

    #[test]
    fn one_trial_enumerates_every_order_assignment() {
        let sim = Simulator::new(config(1), Deck::new()).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let combination = vec![Card::new(Color::Red, 10), Card::new(Color::Blue, 9)];
        let results = sim.simulate_trial(&combination, 0, &mut rng);
        assert_eq!(results.len(), 8);
        for r in &results {
            assert_eq!(r.tricks_won.values().sum::<usize>(), 2);
            assert_eq!(r.combination, "10 Red - 9 Blue");
        }
        let own: std::collections::HashSet<_> = results.iter().map(|r| r.own_order.as_str()).collect();
        assert_eq!(own.len(), 2);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let combinations = vec![
            vec![Card::MAGICIAN, Card::JESTER],
            vec![Card::new(Color::Blue, 2), Card::new(Color::Green, 2)],
        ];
        let a = Simulator::new(config(3), Deck::new()).unwrap().simulate_combinations(&combinations).unwrap();
        let mut single = config(3);
        single.threads = Some(1);
        let b = Simulator::new(single, Deck::new()).unwrap().simulate_combinations(&combinations).unwrap();
        assert_eq!(a.len(), 2 * 3 * 8);
        assert_eq!(a, b);
    }

    #[test]
    fn cancelled_simulation_stops() {
        let sim = Simulator::new(config(2), Deck::new()).unwrap();
        sim.cancel_token().cancel();
        assert!(matches!(sim.simulate(), Err(WizardError::Cancelled)));
    }

    #[test]
    fn invalid_configuration_fails_before_work() {
        let mut bad = config(1);
        bad.tracked_player = 5;
        assert!(matches!(
            Simulator::new(bad, Deck::new()),
            Err(WizardError::LearningPlayerNotPlaying { .. })
        ));
    }
}
