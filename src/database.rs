use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimulationConfig;
use crate::simulator::SimulationResult;
use crate::survey::{SurveyRow, SurveyTable};
use crate::WizardError;

const TRICKS_PREFIX: &str = "tricks_player_";
const SCORE_PREFIX: &str = "score_prediction_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    AllOutcome,
    Survey,
}

impl ResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResultKind::AllOutcome => "all_outcome",
            ResultKind::Survey => "survey",
        }
    }
}

/// Identifies one stored simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimulationMetadata {
    pub simulation_id: u64,
    pub tracked_player: usize,
    pub players: usize,
    pub cards_per_player: usize,
    pub trials: usize,
}

impl SimulationMetadata {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            simulation_id: config.simulation_id,
            tracked_player: config.tracked_player,
            players: config.game.players,
            cards_per_player: config.game.cards_per_player,
            trials: config.trials,
        }
    }
}

/// API for persisting raw results and survey tables.
pub trait ResultStorage {
    fn save_results(
        &mut self,
        meta: &SimulationMetadata,
        results: &[SimulationResult],
    ) -> Result<(), WizardError>;

    fn load_results(&self, meta: &SimulationMetadata) -> Result<Vec<SimulationResult>, WizardError>;

    fn save_survey(&mut self, meta: &SimulationMetadata, table: &SurveyTable) -> Result<(), WizardError>;

    fn load_survey(&self, meta: &SimulationMetadata) -> Result<SurveyTable, WizardError>;

    /// Survey with the most trials stored for this configuration, if any.
    fn latest_survey(
        &self,
        players: usize,
        cards_per_player: usize,
        tracked_player: usize,
    ) -> Result<Option<SurveyTable>, WizardError>;
}

/// In-memory implementation of [`ResultStorage`].
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    results: HashMap<SimulationMetadata, Vec<SimulationResult>>,
    surveys: HashMap<SimulationMetadata, SurveyTable>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(meta: &SimulationMetadata, kind: ResultKind) -> WizardError {
    WizardError::MalformedTable(format!(
        "no {} table stored for simulation {}",
        kind.as_str(),
        meta.simulation_id
    ))
}

impl ResultStorage for InMemoryStorage {
    fn save_results(
        &mut self,
        meta: &SimulationMetadata,
        results: &[SimulationResult],
    ) -> Result<(), WizardError> {
        self.results.insert(*meta, results.to_vec());
        Ok(())
    }

    fn load_results(&self, meta: &SimulationMetadata) -> Result<Vec<SimulationResult>, WizardError> {
        self.results
            .get(meta)
            .cloned()
            .ok_or_else(|| not_found(meta, ResultKind::AllOutcome))
    }

    fn save_survey(&mut self, meta: &SimulationMetadata, table: &SurveyTable) -> Result<(), WizardError> {
        self.surveys.insert(*meta, table.clone());
        Ok(())
    }

    fn load_survey(&self, meta: &SimulationMetadata) -> Result<SurveyTable, WizardError> {
        self.surveys
            .get(meta)
            .cloned()
            .ok_or_else(|| not_found(meta, ResultKind::Survey))
    }

    fn latest_survey(
        &self,
        players: usize,
        cards_per_player: usize,
        tracked_player: usize,
    ) -> Result<Option<SurveyTable>, WizardError> {
        Ok(self
            .surveys
            .iter()
            .filter(|(m, _)| {
                m.players == players
                    && m.cards_per_player == cards_per_player
                    && m.tracked_player == tracked_player
            })
            .max_by_key(|(m, _)| (m.trials, m.simulation_id))
            .map(|(_, table)| table.clone()))
    }
}

/// Stores tables as CSV files below a base directory.
#[derive(Debug, Clone)]
pub struct CsvStorage {
    base: PathBuf,
}

impl CsvStorage {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn directory(&self, players: usize, cards_per_player: usize, tracked_player: usize, kind: ResultKind) -> PathBuf {
        self.base
            .join(format!("number_of_players={}", players))
            .join(format!("number_cards_per_player={}", cards_per_player))
            .join(format!("learning_player_position={}", tracked_player))
            .join(kind.as_str())
    }

    pub fn path(&self, meta: &SimulationMetadata, kind: ResultKind) -> PathBuf {
        self.directory(meta.players, meta.cards_per_player, meta.tracked_player, kind)
            .join(format!("{}_trials_id_{}.csv", meta.trials, meta.simulation_id))
    }

    /// Headers are written by hand since records end in a variable number
    /// of columns, which csv cannot derive a header for.
    fn writer(path: &Path, header: &[String]) -> Result<csv::Writer<fs::File>, WizardError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
        writer.write_record(header)?;
        Ok(writer)
    }

    fn read_survey(path: &Path) -> Result<SurveyTable, WizardError> {
        let mut reader = csv::Reader::from_path(path)?;
        let predictions = reader
            .headers()?
            .iter()
            .filter(|h| h.starts_with(SCORE_PREFIX))
            .count();
        let mut rows = Vec::new();
        for record in reader.records() {
            let row: SurveyRow = record?.deserialize(None)?;
            if row.scores.len() != predictions {
                return Err(WizardError::MalformedTable(format!(
                    "expected {} scores, found {}",
                    predictions,
                    row.scores.len()
                )));
            }
            rows.push(row);
        }
        SurveyTable::from_rows(rows)
    }
}

/// One line of the raw outcome table, trick counts in seat order.
#[derive(Debug, Serialize, Deserialize)]
struct OutcomeRecord {
    trial: usize,
    combination: String,
    own_order: String,
    tricks: Vec<usize>,
}

/// `(trials, simulation_id)` of a `{trials}_trials_id_{id}.csv` file name.
fn parse_file_name(name: &str) -> Option<(usize, u64)> {
    let (trials, id) = name.strip_suffix(".csv")?.split_once("_trials_id_")?;
    Some((trials.parse().ok()?, id.parse().ok()?))
}

fn parse_count(value: &str) -> Result<usize, WizardError> {
    value
        .parse()
        .map_err(|_| WizardError::MalformedTable(format!("not a count: {}", value)))
}

impl ResultStorage for CsvStorage {
    fn save_results(
        &mut self,
        meta: &SimulationMetadata,
        results: &[SimulationResult],
    ) -> Result<(), WizardError> {
        let path = self.path(meta, ResultKind::AllOutcome);
        let mut header = vec![
            "trial_number".to_string(),
            "tested_combination".to_string(),
            "combination_played_order".to_string(),
        ];
        header.extend((0..meta.players).map(|id| format!("{}{}", TRICKS_PREFIX, id)));
        let mut writer = Self::writer(&path, &header)?;
        for result in results {
            writer.serialize(OutcomeRecord {
                trial: result.trial,
                combination: result.combination.clone(),
                own_order: result.own_order.clone(),
                tricks: (0..meta.players)
                    .map(|id| result.tricks_won.get(&id).copied().unwrap_or(0))
                    .collect(),
            })?;
        }
        writer.flush()?;
        info!(path = %path.display(), rows = results.len(), "saved raw results");
        Ok(())
    }

    fn load_results(&self, meta: &SimulationMetadata) -> Result<Vec<SimulationResult>, WizardError> {
        let mut reader = csv::Reader::from_path(self.path(meta, ResultKind::AllOutcome))?;
        let ids = reader
            .headers()?
            .iter()
            .filter_map(|h| h.strip_prefix(TRICKS_PREFIX))
            .map(parse_count)
            .collect::<Result<Vec<_>, _>>()?;
        let mut results = Vec::new();
        for record in reader.records() {
            let record: OutcomeRecord = record?.deserialize(None)?;
            if record.tricks.len() != ids.len() {
                return Err(WizardError::MalformedTable(format!(
                    "expected {} trick counts, found {}",
                    ids.len(),
                    record.tricks.len()
                )));
            }
            results.push(SimulationResult {
                trial: record.trial,
                combination: record.combination,
                own_order: record.own_order,
                tricks_won: ids.iter().copied().zip(record.tricks).collect(),
            });
        }
        Ok(results)
    }

    fn save_survey(&mut self, meta: &SimulationMetadata, table: &SurveyTable) -> Result<(), WizardError> {
        let path = self.path(meta, ResultKind::Survey);
        let mut header = vec![
            "tested_combination".to_string(),
            "combination_played_order".to_string(),
        ];
        header.extend((0..table.predictions()).map(|p| format!("{}{}", SCORE_PREFIX, p)));
        let mut writer = Self::writer(&path, &header)?;
        for row in table.rows() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!(path = %path.display(), rows = table.rows().len(), "saved survey table");
        Ok(())
    }

    fn load_survey(&self, meta: &SimulationMetadata) -> Result<SurveyTable, WizardError> {
        Self::read_survey(&self.path(meta, ResultKind::Survey))
    }

    fn latest_survey(
        &self,
        players: usize,
        cards_per_player: usize,
        tracked_player: usize,
    ) -> Result<Option<SurveyTable>, WizardError> {
        let dir = self.directory(players, cards_per_player, tracked_player, ResultKind::Survey);
        if !dir.is_dir() {
            return Ok(None);
        }
        // Highest trial count wins, then the highest simulation id.
        let mut latest: Option<((usize, u64), PathBuf)> = None;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let key = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(parse_file_name);
            if let Some(key) = key {
                if latest.as_ref().map_or(true, |(best, _)| key > *best) {
                    latest = Some((key, path));
                }
            }
        }
        latest.map(|(_, path)| Self::read_survey(&path)).transpose()
    }
}
