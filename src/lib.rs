//! This crate provides the core logic for a single-tape deterministic Turing machine simulator.
//! It includes modules for parsing transition tables, the tape and head mechanics, the
//! step/run execution loop, loading programs from disk, and a set of embedded programs.

pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `Machine` struct and the `Observer` hook from the machine module.
pub use machine::{Machine, Observer};
/// Re-exports the `parse` and `parse_transition` functions from the parser module.
pub use parser::{parse, parse_transition};
/// Re-exports `ProgramEntry`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramEntry, ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `ExecutionState` struct from the tape module.
pub use tape::ExecutionState;
/// Re-exports the core types from the types module.
pub use types::{
    Direction, MachineError, Outcome, Program, TraceLevel, Transition, BLANK_SYMBOL,
    DEFAULT_STEP_LIMIT, MAX_PROGRAM_SIZE, START_STATE,
};
