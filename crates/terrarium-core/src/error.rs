//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Layout has no rows")]
    EmptyLayout,

    #[error("Layout row {row} is {found} cells wide, expected {expected}")]
    RaggedLayout {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Symbol '{0}' is not in the legend")]
    UnknownSymbol(char),

    #[error("Requested {requested} entities for an interior of {capacity} cells")]
    Overcrowded { requested: usize, capacity: usize },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
