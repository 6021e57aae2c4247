use crate::config::ScoringRules;

impl ScoringRules {
    /// Points for a round: `reward * prediction + base` on an exact bid,
    /// otherwise `loss` per trick of difference.
    pub fn score(&self, prediction: usize, tricks_won: usize) -> i32 {
        if prediction == tricks_won {
            self.reward * prediction as i32 + self.base
        } else {
            self.loss * prediction.abs_diff(tricks_won) as i32
        }
    }

    /// Lowest and highest score reachable with `cards_per_player` tricks.
    pub fn point_range(&self, cards_per_player: usize) -> (i32, i32) {
        let cards = cards_per_player as i32;
        (self.loss * cards, self.reward * cards + self.base)
    }
}

/// Score with the default rules.
pub fn score(prediction: usize, tricks_won: usize) -> i32 {
    ScoringRules::default().score(prediction, tricks_won)
}

/// Score every seat of a round. Seats without a bid get `None`.
pub fn score_round(
    rules: &ScoringRules,
    predictions: &[Option<usize>],
    tricks_won: &[usize],
) -> Vec<Option<i32>> {
    predictions
        .iter()
        .zip(tricks_won)
        .map(|(prediction, &tricks)| prediction.map(|p| rules.score(p, tricks)))
        .collect()
}
