//! Error types for the fleet shooter core.

use std::path::PathBuf;

/// Errors that can surface from the collaborators the core talks to.
/// Nothing in the simulation itself is fallible.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Reading or writing a file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file exists but is not valid TOML for `GameConfig`
    #[error("Invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The config parsed but holds a value the simulation cannot run with
    #[error("Invalid config file {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    /// A leaderboard line could not be parsed
    #[error("Invalid leaderboard entry on line {line}: {message}")]
    InvalidEntry { line: usize, message: String },
}

/// Result type alias for core operations
pub type GameResult<T> = Result<T, GameError>;
