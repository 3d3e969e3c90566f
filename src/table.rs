//! This module defines the `TransitionTable`, which maps requests to responses.
//!
//! Keys are compared by value. Re-inserting an existing request overwrites its response in
//! place and keeps the slot it was first inserted into, so iteration follows first-insertion
//! order. Looking up an unknown request never fails: it answers with the default response
//! `(state, symbol, Stay)`.

use crate::parser::parse_instructions;
use crate::types::{Direction, Request, Response, TuringMachineError};
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    entries: Vec<(Request, Response)>,
    index: HashMap<Request, usize>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the response for `request`.
    ///
    /// # Returns
    ///
    /// * `Some(Response)` holding the previous response if an entry was overwritten.
    /// * `None` if the request was new.
    pub fn set(&mut self, request: Request, response: Response) -> Option<Response> {
        let slot = self.index.get(&request).copied();
        if let Some((_, current)) = slot.and_then(|slot| self.entries.get_mut(slot)) {
            log::debug!("Overwriting transition for {request} with {response}");
            return Some(std::mem::replace(current, response));
        }

        self.index.insert(request.clone(), self.entries.len());
        self.entries.push((request, response));
        None
    }

    /// Looks up the response for `request`.
    ///
    /// Unknown requests answer `(state, symbol, Stay)`.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::MissingResponse)` if the request is indexed but its slot is
    ///   gone, which means the table is corrupt.
    pub fn get(&self, request: &Request) -> Result<Response, TuringMachineError> {
        match self.index.get(request) {
            Some(&slot) => self
                .entries
                .get(slot)
                .filter(|(key, _)| key == request)
                .map(|(_, response)| response.clone())
                .ok_or_else(|| TuringMachineError::MissingResponse(request.clone())),
            None => Ok(Response::new(
                request.state,
                request.symbol.clone(),
                Direction::Stay,
            )),
        }
    }

    /// Parses an instruction block and inserts every instruction.
    ///
    /// The whole block is parsed before the table is touched, so a malformed line leaves the
    /// table unchanged.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Request>)` listing the requests whose responses were overwritten, in the
    ///   order the overwrites happened.
    pub fn load(&mut self, block: &str) -> Result<Vec<Request>, TuringMachineError> {
        let instructions = parse_instructions(block)?;
        let count = instructions.len();

        let overwritten: Vec<Request> = instructions
            .into_iter()
            .filter_map(|(request, response)| {
                let key = request.clone();
                self.set(request, response).map(|_| key)
            })
            .collect();

        log::info!(
            "Loaded {count} instructions ({} distinct, {} overwritten)",
            self.len(),
            overwritten.len()
        );

        Ok(overwritten)
    }

    pub fn contains(&self, request: &Request) -> bool {
        self.index.contains_key(request)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Iterates over the entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Request, &Response)> {
        self.entries.iter().map(|(request, response)| (request, response))
    }

    /// Returns `true` if any response leads to a halting state.
    pub fn has_halting_response(&self) -> bool {
        self.entries.iter().any(|(_, response)| response.is_halting())
    }
}

impl FromStr for TransitionTable {
    type Err = TuringMachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut table = TransitionTable::new();
        table.load(s)?;
        Ok(table)
    }
}
