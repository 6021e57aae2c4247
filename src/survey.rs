//! Aggregation of raw simulation results into a policy table.
//!
//! For every bid the tracked player could make, each outcome is scored, the
//! worst score over all opponent orders is kept per trial, and those minima
//! are averaged over trials. The resulting table says how well each own
//! priority order holds up against adversarial opponents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::ScoringRules;
use crate::simulator::SimulationResult;
use crate::{parse_hand_label, Card, WizardError};

/// One line of the survey table. Serialized positionally, scores last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRow {
    pub combination: String,
    pub own_order: String,
    /// Mean worst-case score, indexed by prediction.
    pub scores: Vec<f64>,
}

/// Best own order and bid for a combination.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub own_order: String,
    pub prediction: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurveyTable {
    rows: Vec<SurveyRow>,
}

impl SurveyTable {
    /// Build a table from rows, ordering them by combination in descending
    /// card order. Rows of the same combination keep their relative order.
    pub fn from_rows(mut rows: Vec<SurveyRow>) -> Result<Self, WizardError> {
        let mut keys: BTreeMap<String, Vec<Card>> = BTreeMap::new();
        for row in &rows {
            if !keys.contains_key(&row.combination) {
                let mut cards = parse_hand_label(&row.combination)
                    .map_err(|e| WizardError::MalformedTable(e.to_string()))?;
                crate::sort_descending(&mut cards);
                keys.insert(row.combination.clone(), cards);
            }
        }
        rows.sort_by(|a, b| keys[&b.combination].cmp(&keys[&a.combination]));
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[SurveyRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of predictions scored per row.
    pub fn predictions(&self) -> usize {
        self.rows.first().map_or(0, |r| r.scores.len())
    }

    pub fn combinations(&self) -> Vec<&str> {
        let mut combinations: Vec<&str> = self.rows.iter().map(|r| r.combination.as_str()).collect();
        combinations.dedup();
        combinations
    }

    fn rows_for<'a>(&'a self, combination: &'a str) -> impl Iterator<Item = &'a SurveyRow> + 'a {
        self.rows.iter().filter(move |r| r.combination == combination)
    }

    pub fn score(&self, combination: &str, own_order: &str, prediction: usize) -> Option<f64> {
        self.rows_for(combination)
            .find(|r| r.own_order == own_order)
            .and_then(|r| r.scores.get(prediction).copied())
    }

    /// Own order and bid with the highest score. Ties go to the earlier row,
    /// then the lower bid.
    pub fn best_strategy(&self, combination: &str) -> Option<Strategy> {
        let mut best: Option<Strategy> = None;
        for row in self.rows_for(combination) {
            for (prediction, &score) in row.scores.iter().enumerate() {
                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(Strategy {
                        own_order: row.own_order.clone(),
                        prediction,
                        score,
                    });
                }
            }
        }
        best
    }

    /// Score of the best own order when committing to `prediction`.
    pub fn worst_case_score(&self, combination: &str, prediction: usize) -> Option<f64> {
        self.rows_for(combination)
            .filter_map(|r| r.scores.get(prediction).copied())
            .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))
    }

    pub fn best_strategies(&self) -> Vec<(String, Strategy)> {
        self.combinations()
            .into_iter()
            .filter_map(|c| self.best_strategy(c).map(|s| (c.to_string(), s)))
            .collect()
    }
}

/// Aggregate raw results for the tracked player into a [`SurveyTable`].
pub fn survey(
    results: &[SimulationResult],
    tracked_player: usize,
    cards_per_player: usize,
    rules: &ScoringRules,
) -> Result<SurveyTable, WizardError> {
    let predictions = cards_per_player + 1;
    // (combination, own order) -> trial -> minimum score per prediction
    let mut worst: BTreeMap<(&str, &str), BTreeMap<usize, Vec<i32>>> = BTreeMap::new();
    for result in results {
        let tricks = *result.tricks_won.get(&tracked_player).ok_or_else(|| {
            WizardError::MalformedTable(format!(
                "trial {} has no trick count for player {}",
                result.trial, tracked_player
            ))
        })?;
        let minima = worst
            .entry((result.combination.as_str(), result.own_order.as_str()))
            .or_default()
            .entry(result.trial)
            .or_insert_with(|| vec![i32::MAX; predictions]);
        for (prediction, min) in minima.iter_mut().enumerate() {
            *min = (*min).min(rules.score(prediction, tricks));
        }
    }

    let rows = worst
        .into_iter()
        .map(|((combination, own_order), trials)| {
            let count = trials.len() as f64;
            let scores = (0..predictions)
                .map(|p| trials.values().map(|m| m[p] as f64).sum::<f64>() / count)
                .collect();
            SurveyRow {
                combination: combination.to_string(),
                own_order: own_order.to_string(),
                scores,
            }
        })
        .collect();
    SurveyTable::from_rows(rows)
}
