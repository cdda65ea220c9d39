//! This module defines [`ExecutionState`], the mutable part of a run: the tape, the head
//! position and the current state name.
//!
//! The head position is logical and may become negative. The tape is stored as a single
//! `Vec` together with a storage offset, so the physical index of the head is always
//! `head + offset`. Whenever the head steps past either end, exactly one blank cell is
//! grown on that side; growing on the left shifts the offset by one.

use crate::types::{MachineError, Transition, BLANK_SYMBOL};
use std::fmt;

/// The tape, head and control state of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionState {
    tape: Vec<char>,
    head: isize,
    offset: usize,
    state: String,
    blank: char,
}

impl ExecutionState {
    /// Creates a fresh execution state with the head on the first cell.
    ///
    /// An empty tape is seeded with a single blank so the head always has a cell to read.
    pub fn new(tape: Vec<char>, state: impl Into<String>, blank: char) -> Self {
        let tape = if tape.is_empty() { vec![blank] } else { tape };

        Self {
            tape,
            head: 0,
            offset: 0,
            state: state.into(),
            blank,
        }
    }

    /// Creates an execution state using the default blank symbol.
    pub fn with_default_blank(tape: Vec<char>, state: impl Into<String>) -> Self {
        Self::new(tape, state, BLANK_SYMBOL)
    }

    /// The physical index of the head into the tape.
    fn index(&self) -> usize {
        // `head + offset` never goes negative once `grow` has run.
        (self.head + self.offset as isize) as usize
    }

    /// Returns the symbol under the head.
    pub fn symbol(&self) -> char {
        self.tape[self.index()]
    }

    /// Applies `transition` to this state.
    ///
    /// The transition must match the current state and the symbol under the head.
    /// The cell is overwritten, the state replaced, the head moved and, if the head
    /// left the stored tape, one blank cell is grown on that side.
    ///
    /// # Returns
    ///
    /// * `Ok(())` once the transition has been applied.
    /// * `Err(MachineError::StateMismatch)` or `Err(MachineError::SymbolMismatch)` if the
    ///   transition does not belong to the current configuration. Nothing is mutated then.
    pub fn apply(&mut self, transition: &Transition) -> Result<(), MachineError> {
        if transition.from_state() != self.state {
            return Err(MachineError::StateMismatch {
                expected: transition.from_state().to_string(),
                actual: self.state.clone(),
            });
        }

        let symbol = self.symbol();
        if transition.from_symbol() != symbol {
            return Err(MachineError::SymbolMismatch {
                expected: transition.from_symbol(),
                actual: symbol,
            });
        }

        let index = self.index();
        self.tape[index] = transition.to_symbol();
        self.state = transition.to_state().to_string();
        self.head += transition.direction().offset();
        self.grow();

        debug_assert!(self.in_bounds(), "head left the tape after growth");

        Ok(())
    }

    /// Grows the tape by one blank on the side the head fell off, if any.
    fn grow(&mut self) {
        let position = self.head + self.offset as isize;

        if position < 0 {
            self.tape.insert(0, self.blank);
            self.offset += 1;
        } else if position as usize >= self.tape.len() {
            self.tape.push(self.blank);
        }
    }

    /// Whether the head currently addresses a stored cell.
    pub fn in_bounds(&self) -> bool {
        let position = self.head + self.offset as isize;
        position >= 0 && (position as usize) < self.tape.len()
    }

    pub fn tape(&self) -> &[char] {
        &self.tape
    }

    /// The tape contents as a string.
    pub fn tape_string(&self) -> String {
        self.tape.iter().collect()
    }

    /// The logical head position. Negative once the tape has grown to the left.
    pub fn head(&self) -> isize {
        self.head
    }

    /// The number of cells grown on the left so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    /// Consumes the state, returning the final tape and state name.
    pub fn into_parts(self) -> (Vec<char>, String) {
        (self.tape, self.state)
    }
}

impl fmt::Display for ExecutionState {
    /// Renders the tape on one line and a caret under the head followed by the state name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.tape_string())?;
        write!(f, "{}^{}", " ".repeat(self.index()), self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use proptest::prelude::*;

    fn tape(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn transition(from: &str, read: &str, to: &str, write: &str, dir: Direction) -> Transition {
        Transition::new(from, read, to, write, dir).unwrap()
    }

    #[test]
    fn test_new_state() {
        let state = ExecutionState::with_default_blank(tape("01"), "Q0");

        assert_eq!(state.symbol(), '0');
        assert_eq!(state.head(), 0);
        assert_eq!(state.offset(), 0);
        assert_eq!(state.state(), "Q0");
        assert_eq!(state.blank(), BLANK_SYMBOL);
    }

    #[test]
    fn test_empty_tape_is_seeded_with_blank() {
        let state = ExecutionState::new(Vec::new(), "Q0", '_');
        assert_eq!(state.tape(), &['_']);
        assert_eq!(state.symbol(), '_');
    }

    #[test]
    fn test_apply_move_within_tape() {
        let mut state = ExecutionState::with_default_blank(tape("012"), "Q1");
        state
            .apply(&transition("Q1", "0", "Q2", "3", Direction::Right))
            .unwrap();

        assert_eq!(state.tape(), &tape("312"));
        assert_eq!(state.head(), 1);
        assert_eq!(state.state(), "Q2");
        assert_eq!(state.symbol(), '1');
    }

    #[test]
    fn test_grow_left() {
        let mut state = ExecutionState::with_default_blank(tape("01"), "Q1");
        state
            .apply(&transition("Q1", "0", "Q2", "0", Direction::Left))
            .unwrap();

        assert_eq!(state.tape(), &tape("b01"));
        assert_eq!(state.head(), -1);
        assert_eq!(state.offset(), 1);
        assert_eq!(state.symbol(), 'b');

        // The old cell keeps its symbol and sits one logical step to the right.
        state
            .apply(&transition("Q2", "b", "Q3", "b", Direction::Right))
            .unwrap();
        assert_eq!(state.head(), 0);
        assert_eq!(state.symbol(), '0');
        assert_eq!(state.tape().len(), 3);
    }

    #[test]
    fn test_grow_right() {
        let mut state = ExecutionState::with_default_blank(tape("01"), "Q1");
        state
            .apply(&transition("Q1", "0", "Q1", "0", Direction::Right))
            .unwrap();
        state
            .apply(&transition("Q1", "1", "Q2", "1", Direction::Right))
            .unwrap();

        assert_eq!(state.tape(), &tape("01b"));
        assert_eq!(state.head(), 2);
        assert_eq!(state.offset(), 0);
        assert_eq!(state.symbol(), 'b');
    }

    #[test]
    fn test_stay_does_not_grow() {
        let mut state = ExecutionState::with_default_blank(tape("0"), "Q0");
        state
            .apply(&transition("Q0", "0", "Q0", "1", Direction::Stay))
            .unwrap();

        assert_eq!(state.tape(), &['1']);
        assert_eq!(state.head(), 0);
    }

    #[test]
    fn test_state_mismatch_leaves_state_untouched() {
        let mut state = ExecutionState::with_default_blank(tape("0"), "Q0");
        let before = state.clone();

        let error = state
            .apply(&transition("Q1", "0", "Q2", "1", Direction::Right))
            .unwrap_err();

        assert_eq!(
            error,
            MachineError::StateMismatch {
                expected: "Q1".to_string(),
                actual: "Q0".to_string()
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_symbol_mismatch_leaves_state_untouched() {
        let mut state = ExecutionState::with_default_blank(tape("0"), "Q0");
        let before = state.clone();

        let error = state
            .apply(&transition("Q0", "1", "Q2", "1", Direction::Right))
            .unwrap_err();

        assert_eq!(
            error,
            MachineError::SymbolMismatch {
                expected: '1',
                actual: '0'
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_display_marks_head() {
        let mut state = ExecutionState::with_default_blank(tape("01"), "Q0");
        assert_eq!(state.to_string(), "01\n^Q0");

        state
            .apply(&transition("Q0", "0", "Q0", "0", Direction::Left))
            .unwrap();
        state
            .apply(&transition("Q0", "b", "Q1", "b", Direction::Right))
            .unwrap();
        state
            .apply(&transition("Q1", "0", "Q2", "0", Direction::Right))
            .unwrap();
        assert_eq!(state.to_string(), "b01\n  ^Q2");
    }

    proptest! {
        #[test]
        fn test_head_stays_in_bounds(moves in prop::collection::vec(-1i64..=1, 0..200)) {
            let mut state = ExecutionState::with_default_blank(vec!['b'], "Q0");
            let mut logical = 0isize;

            for displacement in moves {
                let direction = Direction::try_from(displacement).unwrap();
                let length = state.tape().len();
                let offset = state.offset();
                let under = state.symbol().to_string();

                state
                    .apply(&transition("Q0", &under, "Q0", "x", direction))
                    .unwrap();
                logical += direction.offset();

                prop_assert!(state.in_bounds());
                prop_assert_eq!(state.head(), logical);

                let grown = state.tape().len() - length;
                prop_assert!(grown <= 1);
                if grown == 1 && direction == Direction::Left {
                    prop_assert_eq!(state.offset(), offset + 1);
                    prop_assert_eq!(state.tape()[0], 'b');
                } else {
                    prop_assert_eq!(state.offset(), offset);
                }
            }
        }
    }
}
