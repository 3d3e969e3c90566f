//! This module provides the parser for the instruction notation, utilizing the `pest` crate.
//! It defines functions to parse single lines, whole instruction blocks and tape seeds.
//!
//! An instruction has the form `<state>(<symbol>) => <state>(<symbol>) <move>`, where states
//! are (optionally negative) integers, symbols are word characters and the move is one of
//! `L`, `S` or `R`.

use crate::types::{Direction, Part, Request, Response, TuringMachineError};
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;
use std::str::FromStr;

/// Derives a `PestParser` for the instruction grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct InstructionParser;

/// Parses a single instruction line into its request and response.
///
/// # Arguments
///
/// * `text` - One line of the form `<request> => <response>`.
///
/// # Returns
///
/// * `Ok((Request, Response))` if the line matches the grammar.
/// * `Err(TuringMachineError::Syntax)` naming the offending part if it does not.
/// * `Err(TuringMachineError::InvalidMove)` if the move code is not `L`, `S` or `R`.
pub fn parse_line(text: &str) -> Result<(Request, Response), TuringMachineError> {
    let text = text.trim();
    let root = parse_rule(Rule::instruction, Part::Line, text)?;

    let mut request = None;
    let mut response = None;

    // Rule: instruction > lhs ~ rhs
    for p in root.into_inner() {
        match p.as_rule() {
            Rule::lhs => request = Some(parse_request(p.as_str().trim())?),
            Rule::rhs => response = Some(parse_response(p.as_str().trim())?),
            _ => {}
        }
    }

    Ok((
        check_required(request, Part::Line, text)?,
        check_required(response, Part::Line, text)?,
    ))
}

/// Parses an instruction block, one instruction per line.
///
/// Blank lines are skipped. The first malformed line aborts the whole block and is
/// reported with its 1-based line number.
pub fn parse_instructions(block: &str) -> Result<Vec<(Request, Response)>, TuringMachineError> {
    block
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            parse_line(line).map_err(|e| TuringMachineError::Instruction {
                line: i + 1,
                source: Box::new(e),
            })
        })
        .collect()
}

/// Splits a tape seed into its symbols.
///
/// The seed must contain at least one symbol, since every run starts reading at index 0.
pub fn parse_tape(seed: &str) -> Result<Vec<String>, TuringMachineError> {
    let cells: Vec<String> = seed.split_whitespace().map(String::from).collect();

    if cells.is_empty() {
        return Err(TuringMachineError::InvalidTape(
            "tape must contain at least one symbol".to_string(),
        ));
    }

    Ok(cells)
}

/// Parses the request part of an instruction, e.g. `0(1)`.
pub fn parse_request(text: &str) -> Result<Request, TuringMachineError> {
    let pair = parse_rule(Rule::request, Part::Request, text)?;
    let (state, symbol, _) = parse_fields(pair, Part::Request, text)?;

    Ok(Request::new(
        check_required(state, Part::Request, text)?,
        check_required(symbol, Part::Request, text)?,
    ))
}

/// Parses the response part of an instruction, e.g. `-1(1) S`.
pub fn parse_response(text: &str) -> Result<Response, TuringMachineError> {
    let pair = parse_rule(Rule::response, Part::Response, text)?;
    let (state, symbol, code) = parse_fields(pair, Part::Response, text)?;
    let code = check_required(code, Part::Response, text)?;

    Ok(Response::new(
        check_required(state, Part::Response, text)?,
        check_required(symbol, Part::Response, text)?,
        Direction::from_code(&code)?,
    ))
}

/// Runs the pest parser for `rule`, mapping any failure to a syntax error on `part`.
fn parse_rule<'i>(
    rule: Rule,
    part: Part,
    text: &'i str,
) -> Result<Pair<'i, Rule>, TuringMachineError> {
    InstructionParser::parse(rule, text)
        .map_err(|e| {
            log::trace!("{part} rejected by grammar: {e}");
            syntax_error(part, text)
        })?
        .next()
        .ok_or_else(|| syntax_error(part, text))
}

type Fields = (Option<i64>, Option<String>, Option<String>);

/// Extracts the state, symbol and move code children of a request or response pair.
fn parse_fields(pair: Pair<Rule>, part: Part, text: &str) -> Result<Fields, TuringMachineError> {
    let mut state = None;
    let mut symbol = None;
    let mut code = None;

    for p in pair.into_inner() {
        match p.as_rule() {
            // Out-of-range states are malformed text, not a runtime fault.
            Rule::state => {
                state = Some(
                    p.as_str()
                        .parse::<i64>()
                        .map_err(|_| syntax_error(part, text))?,
                )
            }
            Rule::symbol => symbol = Some(p.as_str().to_string()),
            Rule::move_code => code = Some(p.as_str().to_string()),
            _ => {}
        }
    }

    Ok((state, symbol, code))
}

/// Checks if a required element is present, returning a syntax error if it's missing.
fn check_required<T>(value: Option<T>, part: Part, text: &str) -> Result<T, TuringMachineError> {
    value.ok_or_else(|| syntax_error(part, text))
}

fn syntax_error(part: Part, text: &str) -> TuringMachineError {
    TuringMachineError::Syntax {
        part,
        text: text.to_string(),
    }
}

impl FromStr for Request {
    type Err = TuringMachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_request(s.trim())
    }
}

impl FromStr for Response {
    type Err = TuringMachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_response(s.trim())
    }
}

impl FromStr for Direction {
    type Err = TuringMachineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::from_code(s.trim())
    }
}
