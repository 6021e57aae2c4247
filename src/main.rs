//! Survey driver: simulate every two-card combination, store the raw
//! outcomes and the aggregated policy table.

use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use wizard::config::{
    GameConfig, ScoringRules, SimulationConfig, DEFAULT_CARDS_PER_PLAYER, DEFAULT_PLAYERS,
    DEFAULT_TRIALS,
};
use wizard::database::{CsvStorage, ResultStorage, SimulationMetadata};
use wizard::deck::Deck;
use wizard::evaluate::evaluate_fixed_decks;
use wizard::player::Player;
use wizard::policy::{RandomPolicy, TablePolicy};
use wizard::simulator::Simulator;
use wizard::survey::survey;

#[derive(Parser)]
#[command(name = "wizard-survey")]
#[command(about = "Exhaustive play-order survey for two-card Wizard rounds")]
struct Args {
    /// Number of players at the table
    #[arg(long, default_value_t = DEFAULT_PLAYERS)]
    players: usize,

    /// Cards dealt to each player
    #[arg(long, default_value_t = DEFAULT_CARDS_PER_PLAYER)]
    cards: usize,

    /// Seat whose outcomes are surveyed
    #[arg(long, default_value_t = 2)]
    tracked: usize,

    /// Random deals per combination
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    trials: usize,

    /// Master seed for all deals
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long)]
    threads: Option<usize>,

    /// Identifier written into the result file names
    #[arg(long, default_value_t = 0)]
    simulation_id: u64,

    /// Directory receiving the CSV tables
    #[arg(long, default_value = "./simulation-results")]
    output_dir: String,

    /// Random decks on which to score the resulting table against random players
    #[arg(long, default_value_t = 0)]
    evaluate: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = SimulationConfig {
        game: GameConfig {
            players: args.players,
            cards_per_player: args.cards,
        },
        tracked_player: args.tracked,
        trials: args.trials,
        seed: args.seed,
        simulation_id: args.simulation_id,
        threads: args.threads,
        ..Default::default()
    };
    let rules = ScoringRules::default();
    let meta = SimulationMetadata::from_config(&config);
    let mut storage = CsvStorage::new(&args.output_dir);

    let started = Instant::now();
    let simulator = Simulator::new(config.clone(), Deck::new())?;
    let results = simulator.simulate()?;
    info!(
        results = results.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "simulation complete"
    );
    storage.save_results(&meta, &results)?;

    let table = survey(&results, config.tracked_player, config.game.cards_per_player, &rules)?;
    storage.save_survey(&meta, &table)?;
    let strategies = table.best_strategies();
    info!(
        combinations = table.combinations().len(),
        strategies = strategies.len(),
        "survey stored"
    );

    if args.evaluate > 0 {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let decks: Vec<Deck> = (0..args.evaluate).map(|_| Deck::create(true, &mut rng)).collect();
        let table_policy = TablePolicy::new(Arc::new(table), config.game.cards_per_player)?;
        let mut players: Vec<Player> = (0..config.game.players)
            .map(|id| Player::new(id, Box::new(RandomPolicy::new(Some(config.seed.wrapping_add(id as u64))))))
            .collect();
        players[config.tracked_player].set_policy(Box::new(table_policy));
        let mean = evaluate_fixed_decks(
            config.game,
            &decks,
            &mut players,
            config.tracked_player,
            None,
            &rules,
        )?;
        if let Some(mean) = mean {
            info!(decks = decks.len(), mean, "table policy evaluated");
        }
    }
    Ok(())
}
