use serde::{Deserialize, Serialize};

use crate::WizardError;

pub const DEFAULT_PLAYERS: usize = 3;
pub const DEFAULT_CARDS_PER_PLAYER: usize = 2;
pub const DEFAULT_TRIALS: usize = 500;

pub const BASE_REWARD: i32 = 20;
pub const DYNAMIC_REWARD: i32 = 10;
pub const DYNAMIC_LOSS: i32 = -10;

/// Hand sizes the canonicalizer can enumerate classes for.
pub const IMPLEMENTED_COMBINATIONS: [usize; 1] = [2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub players: usize,
    pub cards_per_player: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: DEFAULT_PLAYERS,
            cards_per_player: DEFAULT_CARDS_PER_PLAYER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRules {
    pub base: i32,
    pub reward: i32,
    pub loss: i32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            base: BASE_REWARD,
            reward: DYNAMIC_REWARD,
            loss: DYNAMIC_LOSS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub game: GameConfig,
    /// Seat whose hand is fixed to each representative combination.
    pub tracked_player: usize,
    pub starting_player: usize,
    pub trials: usize,
    pub seed: u64,
    pub simulation_id: u64,
    /// Worker threads; `None` uses one per logical CPU.
    pub threads: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            tracked_player: 2,
            starting_player: 0,
            trials: DEFAULT_TRIALS,
            seed: 0,
            simulation_id: 0,
            threads: None,
        }
    }
}

impl SimulationConfig {
    /// Reject configurations the simulator cannot run, before any work starts.
    pub fn validate(&self) -> Result<(), WizardError> {
        if !IMPLEMENTED_COMBINATIONS.contains(&self.game.cards_per_player) {
            return Err(WizardError::CombinationNotImplemented(
                self.game.cards_per_player,
            ));
        }
        if self.tracked_player >= self.game.players {
            return Err(WizardError::LearningPlayerNotPlaying {
                tracked: self.tracked_player,
                players: self.game.players,
            });
        }
        Ok(())
    }

    pub fn thread_count(&self) -> usize {
        self.threads.filter(|&n| n > 0).unwrap_or_else(num_cpus::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn unsupported_hand_size_is_rejected() {
        let mut config = SimulationConfig::default();
        config.game.cards_per_player = 3;
        assert!(matches!(
            config.validate(),
            Err(WizardError::CombinationNotImplemented(3))
        ));
    }

    #[test]
    fn tracked_player_must_be_seated() {
        let config = SimulationConfig {
            tracked_player: 3,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(WizardError::LearningPlayerNotPlaying { tracked: 3, players: 3 })
        ));
    }

    #[test]
    fn explicit_thread_count_wins() {
        let config = SimulationConfig {
            threads: Some(3),
            ..Default::default()
        };
        assert_eq!(config.thread_count(), 3);
        assert!(SimulationConfig::default().thread_count() >= 1);
    }
}
