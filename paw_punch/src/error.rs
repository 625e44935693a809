//! Errors that stop the game before or during the main loop.

use paw_core::GameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not open window: {0}")]
    Window(String),

    #[error("configuration: {0}")]
    Config(#[from] GameError),

    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
}

impl From<minifb::Error> for AppError {
    fn from(e: minifb::Error) -> Self {
        AppError::Window(e.to_string())
    }
}
