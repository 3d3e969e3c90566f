//! This module defines the core data structures and types used throughout the Turing Machine
//! simulator, including transition requests and responses, trace records, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The default blank symbol used to extend the tape.
pub const DEFAULT_BLANK_SYMBOL: &str = "0";
/// The state every run starts in.
pub const INITIAL_STATE: i64 = 0;
/// The maximum size for an instruction block in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The default number of steps a driver executes before giving up on a run.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// A transition lookup key: the current state and the symbol under the head.
///
/// Two requests are equal when both fields are equal, so freshly built requests
/// hit the same table entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Request {
    pub state: i64,
    pub symbol: String,
}

impl Request {
    pub fn new(state: i64, symbol: impl Into<String>) -> Self {
        Self {
            state,
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.state, self.symbol)
    }
}

/// The answer of a transition lookup: the next state, the symbol to write and
/// the head displacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Response {
    pub state: i64,
    pub symbol: String,
    pub direction: Direction,
}

impl Response {
    pub fn new(state: i64, symbol: impl Into<String>, direction: Direction) -> Self {
        Self {
            state,
            symbol: symbol.into(),
            direction,
        }
    }

    /// Returns `true` if applying this response halts the machine.
    pub fn is_halting(&self) -> bool {
        self.state < 0
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) {}", self.state, self.symbol, self.direction)
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Keep the head in the same position.
    Stay,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// Resolves a move code (`L`, `S` or `R`).
    pub fn from_code(code: &str) -> Result<Self, TuringMachineError> {
        match code {
            "L" => Ok(Direction::Left),
            "S" => Ok(Direction::Stay),
            "R" => Ok(Direction::Right),
            _ => Err(TuringMachineError::InvalidMove(code.to_string())),
        }
    }

    pub fn code(&self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Stay => 'S',
            Direction::Right => 'R',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An immutable snapshot of one execution step.
///
/// The record owns a copy of the tape, so it stays valid after the run moves on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// The request that was looked up at this step.
    pub request: Request,
    /// The head position at this step.
    pub index: usize,
    /// The tape contents before the response was applied.
    pub tape: Vec<String>,
}

impl TraceRecord {
    /// Returns the symbol under the head when the record was taken.
    pub fn symbol(&self) -> Option<&str> {
        self.tape.get(self.index).map(String::as_str)
    }
}

impl fmt::Display for TraceRecord {
    /// Formats the record as `state(symbol): a [b] c`, marking the cell under the head.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.request)?;
        for (i, cell) in self.tape.iter().enumerate() {
            if i == self.index {
                write!(f, " [{cell}]")?;
            } else {
                write!(f, " {cell}")?;
            }
        }
        Ok(())
    }
}

/// Which part of an instruction line failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Line,
    Request,
    Response,
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Part::Line => "line",
            Part::Request => "request",
            Part::Response => "response",
        };
        f.write_str(name)
    }
}

/// Broad classification of a [`TuringMachineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed instruction text.
    Syntax,
    /// A well-formed value of the wrong shape (move code, tape seed, settings).
    Type,
    /// A value outside its allowed range (rate limit, tape index).
    Range,
    /// An internal table inconsistency.
    Reference,
    /// File system failures.
    File,
}

/// Represents various errors that can occur during Turing Machine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates text that does not match the instruction grammar.
    #[error("Invalid {part} syntax at part '{text}'")]
    Syntax { part: Part, text: String },
    /// Indicates a move code other than `L`, `S` or `R`.
    #[error("Invalid move {0} type")]
    InvalidMove(String),
    /// Indicates an unusable tape seed.
    #[error("Invalid tape: {0}")]
    InvalidTape(String),
    /// Indicates settings of the wrong shape.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    /// Indicates a rate limit that is not strictly positive.
    #[error("Rate limit must be higher than 0, got {0}")]
    InvalidRateLimit(f64),
    /// Indicates a tape access outside the materialized cells.
    #[error("Tape index {index} is out of range (tape has {len} cells)")]
    OutOfRange { index: usize, len: usize },
    /// Indicates a table entry whose response has gone missing.
    #[error("Request {0} is missing")]
    MissingResponse(Request),
    /// Wraps an error raised while loading a specific line of an instruction block.
    #[error("Line {line}: {source}")]
    Instruction {
        line: usize,
        source: Box<TuringMachineError>,
    },
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
}

impl TuringMachineError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TuringMachineError::Syntax { .. } => ErrorKind::Syntax,
            TuringMachineError::InvalidMove(_)
            | TuringMachineError::InvalidTape(_)
            | TuringMachineError::InvalidSettings(_) => ErrorKind::Type,
            TuringMachineError::InvalidRateLimit(_) | TuringMachineError::OutOfRange { .. } => {
                ErrorKind::Range
            }
            TuringMachineError::MissingResponse(_) => ErrorKind::Reference,
            TuringMachineError::Instruction { source, .. } => source.kind(),
            TuringMachineError::FileError(_) => ErrorKind::File,
        }
    }
}
