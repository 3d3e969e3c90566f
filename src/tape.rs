//! This module defines the `Tape`, a lazily materialized, bidirectionally growing sequence
//! of symbols. Cells are only created when visited or provided up front; every new cell is
//! filled with the tape's blank symbol.

use crate::parser::parse_tape;
use crate::types::TuringMachineError;
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<String>,
    initial: String,
}

impl Tape {
    /// Creates a tape from explicit cells and the blank symbol used to extend it.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::InvalidTape)` if `cells` is empty.
    pub fn new(
        cells: impl IntoIterator<Item = String>,
        initial: impl Into<String>,
    ) -> Result<Self, TuringMachineError> {
        let cells: VecDeque<String> = cells.into_iter().collect();
        if cells.is_empty() {
            return Err(TuringMachineError::InvalidTape(
                "tape must contain at least one symbol".to_string(),
            ));
        }

        Ok(Self {
            cells,
            initial: initial.into(),
        })
    }

    /// Creates a tape from a whitespace-separated seed such as `"1 1 0"`.
    pub fn from_seed(seed: &str, initial: impl Into<String>) -> Result<Self, TuringMachineError> {
        Self::new(parse_tape(seed)?, initial)
    }

    pub fn read(&self, index: usize) -> Result<&str, TuringMachineError> {
        self.cells
            .get(index)
            .map(String::as_str)
            .ok_or(TuringMachineError::OutOfRange {
                index,
                len: self.cells.len(),
            })
    }

    pub fn write(
        &mut self,
        index: usize,
        symbol: impl Into<String>,
    ) -> Result<(), TuringMachineError> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(TuringMachineError::OutOfRange { index, len })?;
        *cell = symbol.into();
        Ok(())
    }

    /// Grows the tape until `index` is addressable and returns its position afterwards.
    ///
    /// Negative indices prepend one blank per missing cell, which shifts every existing
    /// cell to the right; the requested cell then sits at position 0. Indices past the end
    /// append blanks and keep their position.
    pub fn ensure(&mut self, index: isize) -> usize {
        if index < 0 {
            for _ in 0..index.unsigned_abs() {
                self.cells.push_front(self.initial.clone());
            }
            return 0;
        }

        let index = index.unsigned_abs();
        while index >= self.cells.len() {
            self.cells.push_back(self.initial.clone());
        }
        index
    }

    /// Copies the current cells.
    pub fn snapshot(&self) -> Vec<String> {
        self.cells.iter().cloned().collect()
    }

    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The blank symbol used to extend the tape.
    pub fn initial(&self) -> &str {
        &self.initial
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<&str> = self.cells().collect();
        f.write_str(&cells.join(" "))
    }
}
