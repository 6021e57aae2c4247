use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("a card must have either a color and a rank or a special, not both")]
    InvalidCard,

    #[error("unknown card representation: {0}")]
    UnknownCard(String),

    #[error("hand combinations are not implemented for {0} cards per player")]
    CombinationNotImplemented(usize),

    #[error("tracked player {tracked} is not seated in a game of {players} players")]
    LearningPlayerNotPlaying { tracked: usize, players: usize },

    #[error("simulation cancelled")]
    Cancelled,

    #[error("malformed result table: {0}")]
    MalformedTable(String),

    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
