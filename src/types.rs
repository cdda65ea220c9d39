//! This module defines the core data structures and types used throughout the simulator,
//! including head moves, transition rules, the program table, run outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// The blank symbol used to fill newly grown tape cells.
pub const BLANK_SYMBOL: char = 'b';
/// The state a run starts in unless the caller picks another one.
pub const START_STATE: &str = "Q0";
/// The maximum allowed size for a program file in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The step cap used by the command-line front end unless overridden.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Represents the possible directions the head can move after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Maps a move code (`L`, `R` or `S`, case-sensitive) to a `Direction`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "L" => Some(Direction::Left),
            "R" => Some(Direction::Right),
            "S" => Some(Direction::Stay),
            _ => None,
        }
    }

    /// The single-letter code used in program text.
    pub fn code(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        }
    }

    /// Head displacement in cells.
    pub fn offset(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            Direction::Stay => 0,
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = MachineError;

    fn try_from(displacement: i64) -> Result<Self, Self::Error> {
        match displacement {
            -1 => Ok(Direction::Left),
            1 => Ok(Direction::Right),
            0 => Ok(Direction::Stay),
            other => Err(MachineError::InvalidTransition(format!(
                "Move must be either L=-1, R=1 or S=0, but is {other}"
            ))),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single rule of the form `(from_state, from_symbol) -> (to_state, to_symbol, direction)`.
///
/// Transitions are immutable once built; [`Transition::new`] is the only way to obtain one
/// (deserialization goes through it as well), so every value upholds the one-symbol invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransitionRecord")]
pub struct Transition {
    from_state: String,
    from_symbol: char,
    to_state: String,
    to_symbol: char,
    direction: Direction,
}

impl Transition {
    /// Creates a new `Transition`.
    ///
    /// # Returns
    ///
    /// * `Ok(Transition)` if both symbols are exactly one character long.
    /// * `Err(MachineError::InvalidTransition)` otherwise.
    pub fn new(
        from_state: impl Into<String>,
        from_symbol: &str,
        to_state: impl Into<String>,
        to_symbol: &str,
        direction: Direction,
    ) -> Result<Self, MachineError> {
        Ok(Self {
            from_state: from_state.into(),
            from_symbol: single_symbol("from_symbol", from_symbol)?,
            to_state: to_state.into(),
            to_symbol: single_symbol("to_symbol", to_symbol)?,
            direction,
        })
    }

    /// Parses one line of program text. See [`crate::parser::parse_transition`].
    pub fn parse(line: &str) -> Result<Self, MachineError> {
        crate::parser::parse_transition(line)
    }

    pub fn from_state(&self) -> &str {
        &self.from_state
    }

    pub fn from_symbol(&self) -> char {
        self.from_symbol
    }

    pub fn to_state(&self) -> &str {
        &self.to_state
    }

    pub fn to_symbol(&self) -> char {
        self.to_symbol
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The table key this transition is stored under.
    pub fn key(&self) -> (String, char) {
        (self.from_state.clone(), self.from_symbol)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.from_state, self.from_symbol, self.to_state, self.to_symbol, self.direction
        )
    }
}

impl FromStr for Transition {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unvalidated wire form of a [`Transition`].
#[derive(Deserialize)]
struct TransitionRecord {
    from_state: String,
    from_symbol: String,
    to_state: String,
    to_symbol: String,
    direction: Direction,
}

impl TryFrom<TransitionRecord> for Transition {
    type Error = MachineError;

    fn try_from(record: TransitionRecord) -> Result<Self, Self::Error> {
        Transition::new(
            record.from_state,
            &record.from_symbol,
            record.to_state,
            &record.to_symbol,
            record.direction,
        )
    }
}

fn single_symbol(field: &str, symbol: &str) -> Result<char, MachineError> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(MachineError::InvalidTransition(format!(
            "Symbols need to have length one, but {field} is '{symbol}' with length {}",
            symbol.chars().count()
        ))),
    }
}

/// A deterministic transition table keyed by `(state, symbol)`.
///
/// Inserting a transition whose key is already present replaces the earlier entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    table: HashMap<(String, char), Transition>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses multi-line program text. See [`crate::parser::parse`].
    pub fn parse(text: &str) -> Result<Self, MachineError> {
        crate::parser::parse(text)
    }

    /// Inserts a transition, returning the one it replaced, if any.
    pub fn insert(&mut self, transition: Transition) -> Option<Transition> {
        self.table.insert(transition.key(), transition)
    }

    /// Looks up the transition for the given configuration.
    pub fn get(&self, state: &str, symbol: char) -> Option<&Transition> {
        // The key owns its state name, so a borrowed lookup needs a probe key.
        self.table.get(&(state.to_string(), symbol))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// All transitions, ordered by `(from_state, from_symbol)`.
    pub fn transitions(&self) -> Vec<&Transition> {
        let mut transitions: Vec<_> = self.table.values().collect();
        transitions.sort_by(|a, b| {
            (a.from_state.as_str(), a.from_symbol).cmp(&(b.from_state.as_str(), b.from_symbol))
        });
        transitions
    }

    /// Every state name mentioned by the table, either as a source or as a target.
    pub fn states(&self) -> BTreeSet<&str> {
        self.table
            .values()
            .flat_map(|t| [t.from_state.as_str(), t.to_state.as_str()])
            .collect()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for transition in self.transitions() {
            writeln!(f, "{transition}")?;
        }
        Ok(())
    }
}

impl FromStr for Program {
    type Err = MachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromIterator<Transition> for Program {
    fn from_iter<I: IntoIterator<Item = Transition>>(iter: I) -> Self {
        let mut program = Program::new();
        for transition in iter {
            program.insert(transition);
        }
        program
    }
}

/// The final configuration of a run that halted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// The final tape contents, including any grown blank cells.
    pub tape: Vec<char>,
    /// The state the machine halted in.
    pub state: String,
    /// The number of transitions applied.
    pub steps: usize,
}

impl Outcome {
    /// The final tape as a string.
    pub fn tape_string(&self) -> String {
        self.tape.iter().collect()
    }

    pub fn into_parts(self) -> (Vec<char>, String) {
        (self.tape, self.state)
    }
}

/// How much of a run is reported through `tracing`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TraceLevel {
    /// Nothing is emitted.
    #[default]
    Silent,
    /// The final tape and state are emitted once after halting.
    Summary,
    /// The full configuration is emitted before every step, plus the summary.
    Steps,
}

impl From<u8> for TraceLevel {
    fn from(level: u8) -> Self {
        match level {
            0 => TraceLevel::Silent,
            1 => TraceLevel::Summary,
            _ => TraceLevel::Steps,
        }
    }
}

/// Represents various errors that can occur while building or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// A line of program text is malformed.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// A transition violates the one-symbol or legal-move invariants.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    /// A transition was applied while the machine was in a different state.
    #[error("Command requires state {expected}, but current state is {actual}")]
    StateMismatch { expected: String, actual: String },
    /// A transition was applied while the head was over a different symbol.
    #[error("Command requires symbol {expected}, but current symbol is {actual}")]
    SymbolMismatch { expected: char, actual: char },
    /// A bounded run reached its cap before halting.
    #[error("No halt after {limit} steps (current state {state})")]
    StepLimitExceeded { limit: usize, state: String },
    /// No embedded program carries the requested name.
    #[error("Program '{0}' not found")]
    UnknownProgram(String),
    /// Reading a program from disk failed.
    #[error("File error: {0}")]
    FileError(String),
}
