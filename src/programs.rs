//! Built-in instruction sets, embedded at compile time.

use crate::machine::{Execution, TuringMachine};
use crate::settings::Settings;
use crate::types::TuringMachineError;

/// A named instruction set together with the tape and blank symbol it is meant to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub instructions: &'static str,
    pub tape: &'static str,
    pub blank: &'static str,
}

impl ProgramInfo {
    /// Builds a machine loaded with this program's instructions.
    pub fn machine(&self) -> Result<TuringMachine, TuringMachineError> {
        let mut machine = TuringMachine::new(self.blank);
        machine.load(self.instructions)?;
        Ok(machine)
    }

    /// Launches a run on the program's own tape.
    pub fn launch(&self) -> Result<Execution, TuringMachineError> {
        self.machine()?.launch_seed(self.tape)
    }

    /// Settings that reproduce this program, keeping every other field from `base`.
    pub fn settings(&self, base: Settings) -> Settings {
        Settings {
            instructions: self.instructions.to_string(),
            tape: self.tape.to_string(),
            blank: self.blank.to_string(),
            ..base
        }
    }
}

pub const PROGRAMS: [ProgramInfo; 3] = [
    ProgramInfo {
        name: "unary-fill",
        description: "Walks right over 1s and turns the first 0 into a 1",
        instructions: include_str!("../programs/unary-fill.tm"),
        tape: "1 1 1 1 1 1 1 1",
        blank: "0",
    },
    ProgramInfo {
        name: "binary-increment",
        description: "Adds one to a binary number, most significant bit first",
        instructions: include_str!("../programs/binary-increment.tm"),
        tape: "1 0 1 1",
        blank: "_",
    },
    ProgramInfo {
        name: "busy-beaver-2",
        description: "Two-state busy beaver, writes four 1s in six steps",
        instructions: include_str!("../programs/busy-beaver-2.tm"),
        tape: "0",
        blank: "0",
    },
];

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        PROGRAMS.get(index).copied().ok_or_else(|| {
            TuringMachineError::FileError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<ProgramInfo, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .copied()
            .ok_or_else(|| TuringMachineError::FileError(format!("Program '{}' not found", name)))
    }

    /// Get all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|program| program.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TraceRecord;

    fn run(program: &ProgramInfo) -> (Vec<TraceRecord>, Execution) {
        let mut execution = program.launch().unwrap();
        let records = execution.run(1000).unwrap();
        (records, execution)
    }

    #[test]
    fn test_all_programs_load_and_halt() {
        for program in PROGRAMS.iter() {
            let (_, execution) = run(program);
            assert!(execution.is_halted(), "{} did not halt", program.name);
        }
    }

    #[test]
    fn test_unary_fill() {
        let program = ProgramManager::get_program_by_name("unary-fill").unwrap();
        let (records, execution) = run(&program);

        assert_eq!(records.len(), 9);
        assert_eq!(execution.tape().to_string(), "1 1 1 1 1 1 1 1 1");
    }

    #[test]
    fn test_binary_increment() {
        let program = ProgramManager::get_program_by_name("binary-increment").unwrap();
        let (records, execution) = run(&program);

        assert_eq!(records.len(), 8);
        assert_eq!(execution.tape().to_string(), "1 1 0 0 _");
    }

    #[test]
    fn test_binary_increment_grows_left() {
        let program = ProgramManager::get_program_by_name("binary-increment").unwrap();
        let mut execution = program.machine().unwrap().launch_seed("1 1").unwrap();

        let records = execution.run(100).unwrap();

        assert_eq!(records.len(), 6);
        assert_eq!(execution.tape().to_string(), "1 0 0 _");
    }

    #[test]
    fn test_busy_beaver() {
        let program = ProgramManager::get_program_by_name("busy-beaver-2").unwrap();
        let (records, execution) = run(&program);

        assert_eq!(records.len(), 6);
        assert_eq!(execution.tape().cells().filter(|c| *c == "1").count(), 4);
    }

    #[test]
    fn test_lookup() {
        assert_eq!(ProgramManager::get_program_count(), 3);
        assert_eq!(
            ProgramManager::get_program_by_index(1).unwrap().name,
            "binary-increment"
        );
        assert!(ProgramManager::get_program_by_index(9).is_err());
        assert!(ProgramManager::get_program_by_name("missing").is_err());
        assert_eq!(
            ProgramManager::list_program_names(),
            vec!["unary-fill", "binary-increment", "busy-beaver-2"]
        );
    }

    #[test]
    fn test_settings() {
        let program = ProgramManager::get_program_by_index(2).unwrap();
        let settings = program.settings(Settings::default());

        assert_eq!(settings.tape, "0");
        assert_eq!(settings.rate_limit, Settings::default().rate_limit);
    }
}
