use std::path::PathBuf;

/// Key substituted when a write arrives without one.
pub const DEFAULT_KEY: &str = "default";

/// Reserved key whose write clears the store.
pub const RESET_KEY: &str = "reset";

/// Reserved key whose write terminates the service.
pub const STOP_KEY: &str = "stop";

/// A single key/value pair held by the state store.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StateEntry {
    pub key: String,
    pub value: String,
}

impl StateEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        StateEntry { key: key.into(), value: value.into() }
    }
}

/// Out-of-band control signals carried on the store's write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOp {
    Reset,
    Stop,
}

/// Ordinary data mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOp {
    Write { key: String, value: String },
}

/// Everything a client can ask the store to do through its write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateOp {
    Control(ControlOp),
    Data(DataOp),
}

impl StateOp {
    /// Classify a raw `(key, value)` write.
    ///
    /// This is the only place where the reserved key names are interpreted;
    /// everything downstream matches on the variant. An empty key stays empty
    /// here and is replaced by [`DEFAULT_KEY`] when the store applies it.
    pub fn from_write(key: &str, value: impl Into<String>) -> Self {
        match key {
            RESET_KEY => StateOp::Control(ControlOp::Reset),
            STOP_KEY => StateOp::Control(ControlOp::Stop),
            _ => StateOp::Data(DataOp::Write { key: key.to_string(), value: value.into() }),
        }
    }
}

/// Result of applying a [`StateOp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateOutcome {
    Stored(StateEntry),
    Reset,
    Stopped,
}

#[derive(thiserror::Error, Debug)]
pub enum CorkError {
    #[error("seed input cannot be hashed: {0}")]
    UnhashableSeed(String),
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no non-empty line found in {}", .0.display())]
    NoLine(PathBuf),
    #[error("Argument must be in the form \"KEY=VALUE\" (was \"{0}\")")]
    MalformedInput(String),
    #[error("state store has been stopped")]
    Stopped,
    #[error("client error: {0}")]
    Client(String),
}

impl CorkError {
    /// Wrap an I/O error for `path`, folding `NotFound` into [`CorkError::FileNotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CorkError::FileNotFound(path)
        } else {
            CorkError::Io { path, source }
        }
    }
}
