//! This crate provides the core logic for a single-tape Turing Machine simulator.
//! It includes modules for parsing the instruction notation, building transition tables,
//! stepping a tape one transition at a time, and pacing automatic stepping against a host
//! clock.

pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the machine and its runs from the machine module.
pub use machine::{Execution, Step, TuringMachine};
/// Re-exports the parsing functions from the parser module.
pub use parser::{parse_instructions, parse_line, parse_tape};
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `Scheduler` and its `Event`s from the scheduler module.
pub use scheduler::{Event, Scheduler};
/// Re-exports the `Session` struct from the session module.
pub use session::Session;
/// Re-exports the `Settings` struct from the settings module.
pub use settings::Settings;
/// Re-exports the `TransitionTable` struct from the table module.
pub use table::TransitionTable;
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the transition and trace types from the types module.
pub use types::{
    Direction, ErrorKind, Request, Response, TraceRecord, TuringMachineError, MAX_EXECUTION_STEPS,
    MAX_PROGRAM_SIZE,
};
