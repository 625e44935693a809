use thiserror::Error;

/// Errors raised while preparing a game.  Nothing in the per-frame path
/// returns an error; bad frames degrade to an indeterminate reading.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {field} {reason}")]
    Invalid {
        field:  &'static str,
        reason: &'static str,
    },
}

impl GameError {
    pub(crate) fn invalid(field: &'static str, reason: &'static str) -> Self {
        GameError::Invalid { field, reason }
    }
}
