//! This module provides the `ProgramLoader` struct, responsible for reading instruction blocks
//! and settings from files and strings.

use crate::settings::Settings;
use crate::table::TransitionTable;
use crate::types::{TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// The file extension of instruction files.
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading instruction blocks and settings.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Reads an instruction file into a string.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read or exceeds
    ///   `MAX_PROGRAM_SIZE`.
    pub fn read_program(path: &Path) -> Result<String, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::check_size(&content)?;
        Ok(content)
    }

    /// Loads an instruction file into a new transition table.
    pub fn load_program(path: &Path) -> Result<TransitionTable, TuringMachineError> {
        Self::load_program_from_string(&Self::read_program(path)?)
    }

    /// Loads an instruction block from a string into a new transition table.
    pub fn load_program_from_string(content: &str) -> Result<TransitionTable, TuringMachineError> {
        Self::check_size(content)?;
        content.parse()
    }

    /// Loads and validates a JSON settings file.
    pub fn load_settings(path: &Path) -> Result<Settings, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!(
                "Failed to read settings {}: {}",
                path.display(),
                e
            ))
        })?;

        let settings = Settings::import(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Writes settings as JSON.
    pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), TuringMachineError> {
        fs::write(path, settings.export()?).map_err(|e| {
            TuringMachineError::FileError(format!(
                "Failed to write settings {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Loads every instruction file (`.tm` extension) in a directory.
    ///
    /// Directories and files with other extensions are skipped. Each element of the result
    /// is either the path and its table, or the error raised while loading that file.
    pub fn load_programs(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, TransitionTable), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                    return None;
                }

                Some(Self::load_program(&path).map(|table| (path, table)))
            })
            .collect()
    }

    fn check_size(content: &str) -> Result<(), TuringMachineError> {
        if content.len() > MAX_PROGRAM_SIZE {
            return Err(TuringMachineError::FileError(format!(
                "Program is {} bytes, the limit is {} bytes",
                content.len(),
                MAX_PROGRAM_SIZE
            )));
        }
        Ok(())
    }
}
