//! This module provides the `Session`, which ties a machine, its current run and the
//! scheduler's notifications together for a host front end.
//!
//! A session is either idle or compiled. Compiling loads the instruction block and launches
//! a run on the tape seed; records are then pulled manually with [`Session::next_record`] or
//! automatically whenever the scheduler renders and auto mode is on.

use crate::machine::{Execution, Step, TuringMachine};
use crate::scheduler::Event;
use crate::settings::Settings;
use crate::types::{Request, TraceRecord, TuringMachineError};

#[derive(Debug, Default)]
pub struct Session {
    machine: TuringMachine,
    execution: Option<Execution>,
    last: Option<TraceRecord>,
    finished: bool,
    auto: bool,
}

impl Session {
    /// Creates an idle session whose tape is extended with `blank`.
    pub fn new(blank: impl Into<String>) -> Self {
        Self {
            machine: TuringMachine::new(blank),
            ..Self::default()
        }
    }

    /// Creates an idle session configured from `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        let mut session = Self::new(settings.blank.as_str());
        session.auto = settings.auto;
        session
    }

    /// Loads `instructions` and launches a run on `tape`.
    ///
    /// Nothing changes if either input is malformed.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Request>)` listing the requests that appeared more than once; only the
    ///   last instruction for each of them is kept.
    pub fn compile(
        &mut self,
        instructions: &str,
        tape: &str,
    ) -> Result<Vec<Request>, TuringMachineError> {
        let mut machine = TuringMachine::new(self.machine.blank());
        let overwritten = machine.load(instructions)?;
        let execution = machine.launch_seed(tape)?;

        for request in &overwritten {
            log::warn!("Instruction for {request} repeated; the last one wins");
        }

        self.machine = machine;
        self.execution = Some(execution);
        self.last = None;
        self.finished = false;
        Ok(overwritten)
    }

    /// Drops the current run and clears the instructions.
    pub fn decompile(&mut self) {
        self.machine.instructions_mut().clear();
        self.execution = None;
        self.last = None;
        self.finished = false;
    }

    /// Pulls the next record of the current run.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` if nothing is compiled or the run has already produced its final record.
    /// * `Err(TuringMachineError)` if the run faulted. The run is dropped.
    pub fn next_record(&mut self) -> Result<Option<TraceRecord>, TuringMachineError> {
        let Some(execution) = self.execution.as_mut() else {
            return Ok(None);
        };

        let step = match execution.advance() {
            Ok(step) => step,
            Err(e) => {
                self.execution = None;
                self.finished = true;
                return Err(e);
            }
        };

        let record = match step {
            Step::Continue(record) => record,
            Step::Halt(record) => {
                self.finished = true;
                record
            }
            Step::Halted => {
                self.finished = true;
                return Ok(None);
            }
        };

        self.last = Some(record.clone());
        Ok(Some(record))
    }

    /// Reacts to a scheduler notification, pulling one record on `Render` in auto mode.
    pub fn handle(&mut self, event: Event) -> Result<Option<TraceRecord>, TuringMachineError> {
        match event {
            Event::Render if self.auto => self.next_record(),
            _ => Ok(None),
        }
    }

    /// Pulls records until the run halts or `limit` records were produced.
    pub fn skip(&mut self, limit: usize) -> Result<Vec<TraceRecord>, TuringMachineError> {
        let mut records = Vec::new();

        while records.len() < limit {
            match self.next_record()? {
                Some(record) => records.push(record),
                None => return Ok(records),
            }
        }

        if !self.finished {
            log::warn!("Stopped after {limit} records without halting");
        }
        Ok(records)
    }

    /// A one-line summary of the last record, e.g. `state: 0, value: 1`.
    pub fn status(&self) -> Option<String> {
        self.last.as_ref().map(|record| {
            format!(
                "state: {}, value: {}",
                record.request.state, record.request.symbol
            )
        })
    }

    pub fn set_auto(&mut self, auto: bool) {
        self.auto = auto;
    }

    pub fn is_auto(&self) -> bool {
        self.auto
    }

    pub fn is_compiled(&self) -> bool {
        self.execution.is_some()
    }

    /// Returns `true` once the run has produced its final record or faulted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn last_record(&self) -> Option<&TraceRecord> {
        self.last.as_ref()
    }

    pub fn execution(&self) -> Option<&Execution> {
        self.execution.as_ref()
    }

    pub fn machine(&self) -> &TuringMachine {
        &self.machine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;
    use crate::settings::DEFAULT_INSTRUCTIONS;
    use crate::types::ErrorKind;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn compiled(tape: &str) -> Session {
        let mut session = Session::new("0");
        session.compile(DEFAULT_INSTRUCTIONS, tape).unwrap();
        session
    }

    #[test]
    fn test_idle_session_produces_nothing() {
        let mut session = Session::new("0");

        assert!(!session.is_compiled());
        assert_eq!(session.next_record().unwrap(), None);
        assert_eq!(session.status(), None);
    }

    #[test]
    fn test_manual_stepping() {
        let mut session = compiled("1 0");

        let first = session.next_record().unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(session.status().unwrap(), "state: 0, value: 1");
        assert!(!session.is_finished());

        let last = session.next_record().unwrap().unwrap();
        assert_eq!(last.request, Request::new(0, "0"));
        assert!(session.is_finished());

        assert_eq!(session.next_record().unwrap(), None);
        assert_eq!(session.status().unwrap(), "state: 0, value: 0");
    }

    #[test]
    fn test_compile_reports_repetitions() {
        let mut session = Session::new("0");
        let repeated = session
            .compile("0(1) => 0(1) R\n0(1) => -1(1) S\n0(0) => -1(0) S", "1")
            .unwrap();

        assert_eq!(repeated, vec![Request::new(0, "1")]);
        assert_eq!(session.machine().instructions().len(), 2);
    }

    #[test]
    fn test_failed_compile_keeps_previous_run() {
        let mut session = compiled("1 0");
        session.next_record().unwrap();

        let error = session.compile("0(1) => 0(1) Q", "1").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Type);
        let error = session.compile(DEFAULT_INSTRUCTIONS, "  ").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Type);

        let record = session.next_record().unwrap().unwrap();
        assert_eq!(record.index, 1);
    }

    #[test]
    fn test_decompile() {
        let mut session = compiled("1");
        session.next_record().unwrap();

        session.decompile();

        assert!(!session.is_compiled());
        assert!(session.machine().instructions().is_empty());
        assert_eq!(session.last_record(), None);
        assert_eq!(session.next_record().unwrap(), None);
    }

    #[test]
    fn test_skip_drains_to_halt() {
        let mut session = compiled("1 1 1 1 1 1 1 1");

        let records = session.skip(100).unwrap();

        assert_eq!(records.len(), 9);
        assert!(session.is_finished());
        assert_eq!(
            session.execution().unwrap().tape().to_string(),
            "1 1 1 1 1 1 1 1 1"
        );
    }

    #[test]
    fn test_skip_respects_limit() {
        let mut session = Session::new("0");
        session.compile("0(1) => 0(1) R\n0(0) => 0(0) R", "1").unwrap();

        assert_eq!(session.skip(25).unwrap().len(), 25);
        assert!(!session.is_finished());
    }

    #[test]
    fn test_handle_respects_auto_mode() {
        let mut session = compiled("1 1 0");

        assert_eq!(session.handle(Event::Render).unwrap(), None);
        session.set_auto(true);
        assert_eq!(session.handle(Event::Initialize).unwrap(), None);
        assert!(session.handle(Event::Render).unwrap().is_some());
    }

    #[test]
    fn test_scheduler_drives_session() {
        let session = Rc::new(RefCell::new(Session::from_settings(&Settings::default())));
        session
            .borrow_mut()
            .compile(DEFAULT_INSTRUCTIONS, "1 1 0")
            .unwrap();

        let records = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = Scheduler::with_rate_limit(2.0).unwrap();
        {
            let session = Rc::clone(&session);
            let records = Rc::clone(&records);
            scheduler.subscribe(move |event| {
                if let Ok(Some(record)) = session.borrow_mut().handle(event) {
                    records.borrow_mut().push(record);
                }
            });
        }

        scheduler.launch();
        for i in 0..20 {
            scheduler.tick(Duration::from_millis(250 * i));
        }

        let records = records.borrow();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].request, Request::new(0, "0"));
        assert!(session.borrow().is_finished());
    }
}
