//! This module defines the [`Machine`] struct, which owns a read-only transition table and
//! drives [`ExecutionState`]s through it until no transition applies.

use crate::tape::ExecutionState;
use crate::types::{MachineError, Outcome, Program, TraceLevel, BLANK_SYMBOL};

/// Hooks invoked while a run progresses.
///
/// Observers only look at the execution state; they cannot influence the run.
pub trait Observer {
    /// Called before every step, including the final lookup that finds no transition.
    fn before_step(&mut self, _state: &ExecutionState) {}

    /// Called once when the machine halts, with the number of transitions applied.
    fn halted(&mut self, _state: &ExecutionState, _steps: usize) {}
}

impl Observer for TraceLevel {
    fn before_step(&mut self, state: &ExecutionState) {
        if *self >= TraceLevel::Steps {
            tracing::info!(target: "quintuple::trace", "\n{state}");
        }
    }

    fn halted(&mut self, state: &ExecutionState, steps: usize) {
        if *self >= TraceLevel::Summary {
            tracing::info!(
                target: "quintuple::trace",
                steps,
                "Program finished on state {} and tape: {}",
                state.state(),
                state.tape_string()
            );
        }
    }
}

/// A deterministic single-tape Turing machine.
///
/// The transition table is never mutated by a run, so a `Machine` can be reused for any
/// number of runs and shared between threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    program: Program,
    blank: char,
}

impl Machine {
    /// Creates a machine from a parsed program, using the default blank symbol.
    pub fn new(program: Program) -> Self {
        Self {
            program,
            blank: BLANK_SYMBOL,
        }
    }

    /// Parses program text and builds a machine from it.
    pub fn parse(text: &str) -> Result<Self, MachineError> {
        Ok(Self::new(Program::parse(text)?))
    }

    /// Replaces the symbol used to fill grown tape cells.
    pub fn with_blank(mut self, blank: char) -> Self {
        self.blank = blank;
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    /// Executes a single step on `state`.
    ///
    /// # Returns
    ///
    /// * `true` if a transition matched `(state, symbol under head)` and was applied.
    /// * `false` if none matched. `state` is left untouched; this is the halting condition.
    pub fn step(&self, state: &mut ExecutionState) -> bool {
        let Some(transition) = self.program.get(state.state(), state.symbol()) else {
            return false;
        };

        match state.apply(transition) {
            Ok(()) => true,
            Err(e) => unreachable!("looked-up transition rejected by its own configuration: {e}"),
        }
    }

    /// Runs the machine on `tape` from `start_state` until it halts.
    ///
    /// There is no step limit: a program without a halting path for this input never
    /// returns. Use [`Machine::run_limited`] when a cap is needed.
    pub fn run(
        &self,
        tape: Vec<char>,
        start_state: &str,
        mut trace: TraceLevel,
    ) -> (Vec<char>, String) {
        self.run_observed(tape, start_state, &mut trace)
    }

    /// Like [`Machine::run`], reporting progress to `observer`.
    pub fn run_observed<O: Observer + ?Sized>(
        &self,
        tape: Vec<char>,
        start_state: &str,
        observer: &mut O,
    ) -> (Vec<char>, String) {
        let mut state = ExecutionState::new(tape, start_state, self.blank);
        self.drive(&mut state, observer, None);
        state.into_parts()
    }

    /// Runs the machine for at most `limit` steps.
    ///
    /// # Returns
    ///
    /// * `Ok(Outcome)` if the machine halted within `limit` steps.
    /// * `Err(MachineError::StepLimitExceeded)` if a transition still applied after `limit` steps.
    pub fn run_limited(
        &self,
        tape: Vec<char>,
        start_state: &str,
        limit: usize,
    ) -> Result<Outcome, MachineError> {
        self.execute(tape, start_state, &mut TraceLevel::Silent, Some(limit))
    }

    /// Runs the machine with an observer and an optional step cap.
    pub fn execute<O: Observer + ?Sized>(
        &self,
        tape: Vec<char>,
        start_state: &str,
        observer: &mut O,
        limit: Option<usize>,
    ) -> Result<Outcome, MachineError> {
        let mut state = ExecutionState::new(tape, start_state, self.blank);

        match self.drive(&mut state, observer, limit) {
            Some(steps) => {
                let (tape, state) = state.into_parts();
                Ok(Outcome { tape, state, steps })
            }
            None => Err(MachineError::StepLimitExceeded {
                // `drive` only gives up when a limit was set.
                limit: limit.unwrap_or_default(),
                state: state.state().to_string(),
            }),
        }
    }

    /// Steps `state` until it halts, returning the step count, or `None` if `limit`
    /// steps were applied and another transition would still fire.
    fn drive<O: Observer + ?Sized>(
        &self,
        state: &mut ExecutionState,
        observer: &mut O,
        limit: Option<usize>,
    ) -> Option<usize> {
        let mut steps = 0;

        loop {
            if limit.is_some_and(|limit| steps >= limit)
                && self.program.get(state.state(), state.symbol()).is_some()
            {
                tracing::debug!(steps, state = state.state(), "step limit reached");
                return None;
            }

            observer.before_step(state);

            if !self.step(state) {
                break;
            }
            steps += 1;
        }

        tracing::debug!(steps, state = state.state(), "machine halted");
        observer.halted(state, steps);

        Some(steps)
    }
}
