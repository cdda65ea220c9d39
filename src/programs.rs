//! A registry of transition tables embedded in the crate, used by the command-line front
//! end and as known-good fixtures.

use crate::parser::parse;
use crate::types::{MachineError, Program};

/// An embedded program: its lookup name, a one-line description and its source text.
#[derive(Debug, Clone, Copy)]
pub struct ProgramEntry {
    pub name: &'static str,
    pub description: &'static str,
    pub text: &'static str,
}

const PROGRAM_ENTRIES: [ProgramEntry; 4] = [
    ProgramEntry {
        name: "div-three",
        description: "Halts in Qak iff the binary input is a multiple of three, else in Qab",
        text: include_str!("../programs/div-three.tur"),
    },
    ProgramEntry {
        name: "unary-successor",
        description: "Appends one 1 to a unary number and halts in Qf",
        text: include_str!("../programs/unary-successor.tur"),
    },
    ProgramEntry {
        name: "zeros-then-ones",
        description: "Halts in Qak iff the input is 0^n 1^n with n >= 1, else in Qab",
        text: include_str!("../programs/zeros-then-ones.tur"),
    },
    ProgramEntry {
        name: "binary-increment",
        description: "Adds one to a binary number and halts in Qf on its leftmost digit",
        text: include_str!("../programs/binary-increment.tur"),
    },
];

lazy_static::lazy_static! {
    /// The embedded programs that parsed successfully, in declaration order.
    pub static ref PROGRAMS: Vec<(ProgramEntry, Program)> = PROGRAM_ENTRIES
        .iter()
        .filter_map(|entry| match parse(entry.text) {
            Ok(program) => Some((*entry, program)),
            Err(e) => {
                tracing::warn!(name = entry.name, error = %e, "failed to parse embedded program");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|(entry, _)| entry.name).collect()
    }

    /// Get a parsed program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, MachineError> {
        Self::find(name).map(|(_, program)| program.clone())
    }

    /// Get the original text of a program by its name
    pub fn get_program_text(name: &str) -> Result<&'static str, MachineError> {
        Self::find(name).map(|(entry, _)| entry.text)
    }

    /// Get information about a program by its name
    pub fn get_program_info(name: &str) -> Result<ProgramInfo, MachineError> {
        let (entry, program) = Self::find(name)?;

        Ok(ProgramInfo {
            name: entry.name,
            description: entry.description,
            state_count: program.states().len(),
            transition_count: program.len(),
        })
    }

    fn find(name: &str) -> Result<&'static (ProgramEntry, Program), MachineError> {
        PROGRAMS
            .iter()
            .find(|(entry, _)| entry.name == name)
            .ok_or_else(|| MachineError::UnknownProgram(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub state_count: usize,
    pub transition_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::Machine;
    use crate::types::START_STATE;

    const STEP_LIMIT: usize = 100_000;

    fn machine(name: &str) -> Machine {
        Machine::new(ProgramManager::get_program_by_name(name).unwrap())
    }

    fn run(machine: &Machine, input: &str) -> (String, String) {
        let outcome = machine
            .run_limited(input.chars().collect(), START_STATE, STEP_LIMIT)
            .unwrap();
        (outcome.tape_string(), outcome.state)
    }

    #[test]
    fn test_all_programs_parse() {
        assert_eq!(ProgramManager::get_program_count(), PROGRAM_ENTRIES.len());
        assert_eq!(
            ProgramManager::list_program_names(),
            vec![
                "div-three",
                "unary-successor",
                "zeros-then-ones",
                "binary-increment"
            ]
        );
    }

    #[test]
    fn test_program_lookup() {
        assert!(ProgramManager::get_program_text("div-three")
            .unwrap()
            .starts_with("Q0 0 Q0 0 R"));

        let error = ProgramManager::get_program_by_name("Nonexistent").unwrap_err();
        assert_eq!(error, MachineError::UnknownProgram("Nonexistent".to_string()));
    }

    #[test]
    fn test_program_info() {
        let info = ProgramManager::get_program_info("div-three").unwrap();

        assert_eq!(info.name, "div-three");
        assert_eq!(info.transition_count, 9);
        assert_eq!(info.state_count, 5);
        assert!(ProgramManager::get_program_info("missing").is_err());
    }

    #[test]
    fn test_div_three_accepts_exactly_multiples_of_three() {
        let machine = machine("div-three");

        for c in 0..1000u32 {
            let (_, state) = run(&machine, &format!("{c:b}"));
            let expected = if c % 3 == 0 { "Qak" } else { "Qab" };
            assert_eq!(state, expected, "input {c} ({c:b})");
        }
    }

    #[test]
    fn test_unary_successor_on_two() {
        let (tape, state) = run(&machine("unary-successor"), "11");

        assert_eq!(tape, "111");
        assert_eq!(state, "Qf");
    }

    #[test]
    fn test_zeros_then_ones() {
        let machine = machine("zeros-then-ones");

        for n in 1..6 {
            let input = format!("{}{}", "0".repeat(n), "1".repeat(n));
            assert_eq!(run(&machine, &input).1, "Qak", "input {input}");
        }

        let rejected = [
            "", "0", "1", "10", "001", "011", "0101", "00000111111", "000000", "00011110",
        ];
        for input in rejected {
            assert_eq!(run(&machine, input).1, "Qab", "input {input}");
        }
    }

    #[test]
    fn test_zeros_then_ones_marks_tape() {
        let (tape, state) = run(&machine("zeros-then-ones"), "01");

        assert_eq!(tape, "XYb");
        assert_eq!(state, "Qak");
    }

    #[test]
    fn test_binary_increment() {
        let machine = machine("binary-increment");

        assert_eq!(
            run(&machine, "1011"),
            ("b1100b".to_string(), "Qf".to_string())
        );
        assert_eq!(run(&machine, "11"), ("100b".to_string(), "Qf".to_string()));

        for n in 0..64u32 {
            let (tape, state) = run(&machine, &format!("{n:b}"));
            let digits: String = tape.chars().filter(|&c| c != 'b').collect();

            assert_eq!(digits, format!("{:b}", n + 1));
            assert_eq!(state, "Qf");
        }
    }
}
