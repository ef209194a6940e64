//! 错误类型

use std::time::Duration;

use thiserror::Error;

use crate::types::{Camp, Location};

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ChessError {
    #[error("location {location} is outside the 9x10 board")]
    LocationOutOfRange { location: Location },

    #[error("no pawn at {location} to move")]
    EmptySquare { location: Location },

    #[error("cannot {operation} {requested} step(s): {available} available")]
    HistoryOutOfRange {
        operation: &'static str,
        requested: usize,
        available: usize,
    },

    #[error("search depth must be positive, got {depth}")]
    InvalidDepth { depth: u32 },

    #[error("robot plays {robot} but it is {current}'s turn")]
    NotRobotTurn { robot: Camp, current: Camp },

    #[error("invalid exchange string '{fen}': {message}")]
    InvalidFen { fen: String, message: String },

    #[error("unknown robot strategy '{name}' (available: {available})")]
    UnknownStrategy { name: String, available: String },

    #[error("malformed engine reply '{line}': {message}")]
    MalformedReply { line: String, message: String },

    #[error("engine closed its output while waiting for {expected}")]
    EngineClosed { expected: &'static str },

    #[error("engine gave no answer within {timeout:?} while waiting for {expected}")]
    EngineTimeout {
        expected: &'static str,
        timeout: Duration,
    },

    #[error("engine robot has been disposed")]
    Disposed,

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChessError>;

impl ChessError {
    pub(crate) fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        ChessError::Io {
            operation: operation.into(),
            source,
        }
    }
}
