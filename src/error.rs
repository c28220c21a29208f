//! Error types for the chess client.
//!
//! Parse failures and trust violations are recovered locally by the session;
//! transport errors end the session.

use std::path::PathBuf;

use shakmaty::Square;
use thiserror::Error;

use crate::domain::PieceColor;

/// A line that does not match any recognized command shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty line")]
    Empty,

    #[error("unknown command `{0}`")]
    UnknownCommand(String),

    #[error("`{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("invalid square `{0}`")]
    InvalidSquare(String),

    #[error("invalid value `{value}` for `{command}`")]
    InvalidValue {
        command: &'static str,
        value: String,
    },
}

/// A server update that does not fit the local position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrustViolation {
    #[error("no piece on {0}")]
    EmptySquare(Square),

    #[error("cannot castle: no {color} piece on {square}")]
    CastlingPieceMissing { color: PieceColor, square: Square },
}

/// Failures of the underlying line stream
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed by server")]
    Closed,

    #[error("send failed: writer has stopped")]
    SendFailed,

    #[error("outbound line contains a line break: {0:?}")]
    LineBreak(String),
}

/// Errors while loading client configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
