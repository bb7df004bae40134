//! Error types for the reordering engine

use std::path::PathBuf;
use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ReorderError>;

/// How the engine reacts to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// A caller bypassed the resolver. Never expected at runtime.
    Logic,
    /// The in-memory board no longer matches the store.
    Desync,
    /// A remote write or read failed or timed out.
    Persistence,
    /// A gesture arrived in the wrong session state, or bad input/config.
    Usage,
}

/// Errors that can occur while reordering a board
#[derive(Debug, Error)]
pub enum ReorderError {
    /// Negative insertion index
    #[error("invalid index {index}")]
    InvalidIndex { index: isize },

    /// Index outside the lane
    #[error("index {index} out of range for lane '{lane}' of length {len}")]
    IndexOutOfRange {
        lane: String,
        index: usize,
        len: usize,
    },

    /// Item not present anywhere on the board
    #[error("item not found: {id}")]
    ItemNotFound { id: String },

    /// Lane not present on the board
    #[error("lane not found: {id}")]
    LaneNotFound { id: String },

    /// Item expected in a specific lane but absent there
    #[error("item '{item}' is not in lane '{lane}'")]
    ItemNotInLane { item: String, lane: String },

    /// Stored item references a lane that does not exist
    #[error("item '{item}' references unknown lane '{lane}'")]
    UnknownLane { item: String, lane: String },

    /// The same item id appears twice
    #[error("duplicate item id: {id}")]
    DuplicateItem { id: String },

    /// A board invariant does not hold
    #[error("corrupt board: {message}")]
    CorruptBoard { message: String },

    /// A drag is already in progress
    #[error("drag already in progress for item '{item}'")]
    SessionActive { item: String },

    /// A drop or hover arrived with no drag in progress
    #[error("no drag in progress")]
    NoActiveDrag,

    /// The last reload failed; the local board cannot be trusted
    #[error("board is stale; reload required")]
    StaleBoard,

    /// A rank string failed validation
    #[error("invalid rank '{rank}': {message}")]
    InvalidRank { rank: String, message: String },

    /// Remote store rejected or failed an operation
    #[error("persistence error: {message}")]
    Persistence { message: String },

    /// Remote store did not answer in time
    #[error("persistence timeout after {elapsed_ms}ms")]
    PersistenceTimeout { elapsed_ms: u64 },

    /// Store has no board with this id
    #[error("board not found: {id}")]
    BoardNotFound { id: String },

    /// Board storage directory not initialized
    #[error("board not initialized at {path}")]
    NotInitialized { path: PathBuf },

    /// Board storage already exists
    #[error("board already exists at {path}")]
    AlreadyExists { path: PathBuf },

    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {message}")]
    Config { message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl From<figment::Error> for ReorderError {
    fn from(error: figment::Error) -> Self {
        Self::Config {
            message: error.to_string(),
        }
    }
}

impl ReorderError {
    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Create a corrupt board error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::CorruptBoard {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify the error for recovery
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidIndex { .. } | Self::IndexOutOfRange { .. } => ErrorClass::Logic,
            Self::ItemNotFound { .. }
            | Self::LaneNotFound { .. }
            | Self::ItemNotInLane { .. }
            | Self::UnknownLane { .. }
            | Self::DuplicateItem { .. }
            | Self::CorruptBoard { .. }
            | Self::InvalidRank { .. } => ErrorClass::Desync,
            Self::Persistence { .. }
            | Self::PersistenceTimeout { .. }
            | Self::BoardNotFound { .. }
            | Self::Io(_)
            | Self::Json(_)
            | Self::Yaml(_) => ErrorClass::Persistence,
            Self::SessionActive { .. }
            | Self::NoActiveDrag
            | Self::StaleBoard
            | Self::NotInitialized { .. }
            | Self::AlreadyExists { .. }
            | Self::Config { .. } => ErrorClass::Usage,
        }
    }

    /// Whether the engine answers this error by reloading the board
    pub fn requires_reload(&self) -> bool {
        matches!(self.class(), ErrorClass::Desync | ErrorClass::Persistence)
    }
}
