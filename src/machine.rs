//! This module defines the `TuringMachine` struct, which owns the transition table of a
//! single-tape machine, and the `Execution` it launches to step a tape one transition at a
//! time. An execution is a pull-driven cursor: it does no work between calls to
//! [`Execution::advance`] and produces one [`TraceRecord`] per transition.

use crate::table::TransitionTable;
use crate::tape::Tape;
use crate::types::{
    Direction, Request, TraceRecord, TuringMachineError, DEFAULT_BLANK_SYMBOL, INITIAL_STATE,
};
use std::iter::FusedIterator;
use std::sync::Arc;

/// Represents a single-tape Turing Machine: a blank symbol and a set of instructions.
///
/// The instructions are shared with every execution launched from the machine. Editing them
/// through [`TuringMachine::instructions_mut`] copies the table if a run still holds it, so
/// a running execution never observes a change.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    blank: String,
    instructions: Arc<TransitionTable>,
}

impl Default for TuringMachine {
    fn default() -> Self {
        Self::new(DEFAULT_BLANK_SYMBOL)
    }
}

impl TuringMachine {
    /// Creates a machine with no instructions.
    ///
    /// # Arguments
    ///
    /// * `blank` - The symbol used to extend the tape.
    pub fn new(blank: impl Into<String>) -> Self {
        Self::with_instructions(blank, TransitionTable::new())
    }

    pub fn with_instructions(blank: impl Into<String>, instructions: TransitionTable) -> Self {
        Self {
            blank: blank.into(),
            instructions: Arc::new(instructions),
        }
    }

    pub fn blank(&self) -> &str {
        &self.blank
    }

    pub fn instructions(&self) -> &TransitionTable {
        &self.instructions
    }

    pub fn instructions_mut(&mut self) -> &mut TransitionTable {
        Arc::make_mut(&mut self.instructions)
    }

    /// Loads an instruction block into the machine's table.
    ///
    /// Returns the requests that were overwritten.
    pub fn load(&mut self, block: &str) -> Result<Vec<Request>, TuringMachineError> {
        self.instructions_mut().load(block)
    }

    /// Starts a new run on `tape`.
    pub fn launch(&self, tape: Tape) -> Execution {
        Execution::new(Arc::clone(&self.instructions), tape)
    }

    /// Starts a new run on a tape built from a whitespace-separated seed and the machine's
    /// blank symbol.
    pub fn launch_seed(&self, seed: &str) -> Result<Execution, TuringMachineError> {
        Ok(self.launch(Tape::from_seed(seed, self.blank.as_str())?))
    }
}

/// Represents the outcome of a call to [`Execution::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A transition was applied and the machine keeps running.
    Continue(TraceRecord),
    /// A transition was applied and entered a halting state. The record is the final value
    /// of the run.
    Halt(TraceRecord),
    /// The machine had already halted; nothing was produced.
    Halted,
}

impl Step {
    pub fn record(&self) -> Option<&TraceRecord> {
        match self {
            Step::Continue(record) | Step::Halt(record) => Some(record),
            Step::Halted => None,
        }
    }

    pub fn into_record(self) -> Option<TraceRecord> {
        match self {
            Step::Continue(record) | Step::Halt(record) => Some(record),
            Step::Halted => None,
        }
    }
}

/// One run of a machine over a tape.
///
/// Runs cannot be rewound; launch a new one to start over. Once `advance` fails, the run is
/// poisoned and keeps returning the same error.
#[derive(Debug)]
pub struct Execution {
    table: Arc<TransitionTable>,
    tape: Tape,
    state: i64,
    cursor: usize,
    step_count: usize,
    fault: Option<TuringMachineError>,
}

impl Execution {
    pub fn new(table: Arc<TransitionTable>, tape: Tape) -> Self {
        Self {
            table,
            tape,
            state: INITIAL_STATE,
            cursor: 0,
            step_count: 0,
            fault: None,
        }
    }

    /// Executes a single transition.
    ///
    /// The halting check happens before the lookup: once the state is negative, no further
    /// record is produced.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue(record))` or `Ok(Step::Halt(record))` with the snapshot taken
    ///   before the response was applied.
    /// * `Ok(Step::Halted)` if the run had already halted.
    /// * `Err(TuringMachineError)` if the tape or the table is inconsistent. The run is
    ///   aborted.
    pub fn advance(&mut self) -> Result<Step, TuringMachineError> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        if self.is_halted() {
            return Ok(Step::Halted);
        }

        self.transition().inspect_err(|e| {
            log::error!("Run aborted after {} steps: {e}", self.step_count);
            self.fault = Some(e.clone());
        })
    }

    fn transition(&mut self) -> Result<Step, TuringMachineError> {
        let request = Request::new(self.state, self.tape.read(self.cursor)?);
        let response = self.table.get(&request)?;

        let record = TraceRecord {
            request,
            index: self.cursor,
            tape: self.tape.snapshot(),
        };

        self.tape.write(self.cursor, response.symbol)?;
        self.state = response.state;
        self.cursor = match response.direction {
            Direction::Left => self.tape.ensure(self.cursor as isize - 1),
            Direction::Stay => self.cursor,
            Direction::Right => self.tape.ensure(self.cursor as isize + 1),
        };
        self.step_count += 1;

        if self.is_halted() {
            log::debug!(
                "Halted in state {} after {} steps",
                self.state,
                self.step_count
            );
            Ok(Step::Halt(record))
        } else {
            Ok(Step::Continue(record))
        }
    }

    /// Pulls up to `max_steps` records, stopping early when the machine halts.
    pub fn run(&mut self, max_steps: usize) -> Result<Vec<TraceRecord>, TuringMachineError> {
        self.by_ref().take(max_steps).collect()
    }

    pub fn is_halted(&self) -> bool {
        self.state < 0
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn state(&self) -> i64 {
        self.state
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the number of transitions applied so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn instructions(&self) -> &TransitionTable {
        &self.table
    }
}

/// Yields every record of the run, the halting one included, then stops. A fault is
/// yielded once as an error.
impl Iterator for Execution {
    type Item = Result<TraceRecord, TuringMachineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fault.is_some() {
            return None;
        }

        match self.advance() {
            Ok(step) => step.into_record().map(Ok),
            Err(e) => Some(Err(e)),
        }
    }
}

impl FusedIterator for Execution {}
