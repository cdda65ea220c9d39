//! This module provides the parser for transition tables, utilizing the `pest` crate.
//! It defines the grammar for `.tur` files and functions to turn their text into
//! [`Transition`]s and a [`Program`].

use crate::types::{Direction, MachineError, Program, Transition};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

/// The number of fields in one command line.
const FIELD_COUNT: usize = 5;

/// Derives a `PestParser` for the line grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TransitionTableParser;

/// Parses multi-line program text into a [`Program`].
///
/// Empty lines are skipped anywhere in the input. Every other line must be a single
/// command; the first malformed line aborts parsing and no partial table is returned.
/// When two lines share the same `(from_state, from_symbol)` key the later one wins.
///
/// # Returns
///
/// * `Ok(Program)` if every non-empty line is a valid command.
/// * `Err(MachineError::ParseError)` pointing at the offending line and token if a line has
///   the wrong field count or an unknown move code.
/// * `Err(MachineError::InvalidTransition)` if a symbol is not exactly one character long.
pub fn parse(input: &str) -> Result<Program, MachineError> {
    let root = TransitionTableParser::parse(Rule::program, input)
        .map_err(|e| MachineError::ParseError(e.into()))?
        .next()
        .unwrap_or_else(|| unreachable!("successful parse yields a program pair"));

    let mut program = Program::new();

    for command in root.into_inner() {
        if command.as_rule() != Rule::command || command.as_str().is_empty() {
            continue;
        }

        let transition = parse_command(command)?;
        if let Some(previous) = program.insert(transition) {
            tracing::debug!(replaced = %previous, "duplicate transition key, later line wins");
        }
    }

    tracing::debug!(transitions = program.len(), "parsed transition table");

    Ok(program)
}

/// Parses a single command line into a [`Transition`].
///
/// The line must split into exactly five space-separated fields
/// `from_state from_symbol to_state to_symbol move`, where `move` is one of `L`, `R` or `S`.
pub fn parse_transition(line: &str) -> Result<Transition, MachineError> {
    let root = TransitionTableParser::parse(Rule::line, line)
        .map_err(|e| MachineError::ParseError(e.into()))?
        .next()
        .unwrap_or_else(|| unreachable!("successful parse yields a line pair"));

    let command = root
        .into_inner()
        .find(|p| p.as_rule() == Rule::command)
        .unwrap_or_else(|| unreachable!("successful parse yields a command pair"));

    parse_command(command)
}

/// Turns a `Pair<Rule::command>` into a validated [`Transition`].
fn parse_command(pair: Pair<Rule>) -> Result<Transition, MachineError> {
    let span = pair.as_span();
    let line = pair.as_str();
    let fields: Vec<Pair<Rule>> = pair.into_inner().collect();

    let [from_state, from_symbol, to_state, to_symbol, direction]: [Pair<Rule>; FIELD_COUNT] =
        fields.try_into().map_err(|fields: Vec<Pair<Rule>>| {
            parse_error(
                &format!(
                    "Expected {FIELD_COUNT} fields but found {} in command '{line}'",
                    fields.len()
                ),
                span,
            )
        })?;

    let direction = parse_direction(&direction, line)?;

    Transition::new(
        from_state.as_str(),
        from_symbol.as_str(),
        to_state.as_str(),
        to_symbol.as_str(),
        direction,
    )
    .map_err(|e| match e {
        MachineError::InvalidTransition(msg) => {
            MachineError::InvalidTransition(format!("{msg} in command '{line}'"))
        }
        other => other,
    })
}

/// Parses a move code from a `Pair<Rule::field>`.
fn parse_direction(pair: &Pair<Rule>, line: &str) -> Result<Direction, MachineError> {
    Direction::from_code(pair.as_str()).ok_or_else(|| {
        parse_error(
            &format!(
                "Unsupported move code '{}' in command '{line}', expected 'L', 'R' or 'S'",
                pair.as_str()
            ),
            pair.as_span(),
        )
    })
}

/// Creates a `MachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> MachineError {
    MachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}
