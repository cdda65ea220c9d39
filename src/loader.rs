//! This module provides the `ProgramLoader` struct, responsible for reading transition
//! tables from files, directories, and strings.

use crate::parser::parse;
use crate::types::{MachineError, Program, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// `ProgramLoader` is a utility struct for loading programs.
/// Program files use the `.tur` extension when discovered from a directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Reads the raw text of a program file.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` with the file content.
    /// * `Err(MachineError::FileError)` if the file cannot be read or exceeds `MAX_PROGRAM_SIZE`.
    pub fn load_text(path: &Path) -> Result<String, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if content.len() > MAX_PROGRAM_SIZE {
            return Err(MachineError::FileError(format!(
                "File {} is {} bytes, larger than the {} byte limit",
                path.display(),
                content.len(),
                MAX_PROGRAM_SIZE
            )));
        }

        Ok(content)
    }

    /// Loads and parses a single program file.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is read and parsed successfully.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::ParseError)` if a line of the file is malformed.
    pub fn load_program(path: &Path) -> Result<Program, MachineError> {
        let content = Self::load_text(path)?;
        tracing::debug!(path = %path.display(), "loading program");

        parse(&content)
    }

    /// Parses a program from string content, e.g. piped input.
    pub fn load_program_from_string(content: &str) -> Result<Program, MachineError> {
        parse(content)
    }

    /// Loads every `.tur` file in `directory`.
    ///
    /// Directories and files with other extensions are skipped. Each entry of the result is
    /// either the path and parsed program, or the error that file produced.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), MachineError>> {
        if !directory.exists() {
            return vec![Err(MachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(MachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(MachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir() || path.extension().is_none_or(|ext| ext != "tur") {
                    return None;
                }

                Some(Self::load_program(&path).map(|program| (path, program)))
            })
            .collect();

        // Directory order is platform dependent.
        results.sort_by(|a, b| match (a, b) {
            (Ok((a, _)), Ok((b, _))) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });

        results
    }
}
