//! # tabula
//!
//! tabula is an evaluator for a small typed lambda calculus whose values
//! include records and relational tables. Programs are sequences of
//! top-level statements; each one is parsed and then reduced to a value
//! with call-by-value, substitution-based reduction.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::{error::Error, io::Write};

use tracing::debug;

use crate::{
    ast::Term,
    interpreter::{
        evaluator::core::{EvalConfig, Evaluator},
        lexer::tokenize,
        parser::{core::Scope, statement::next_statement},
    },
};

/// The term language.
///
/// This module declares the `Term` enum and the types, definitions, records
/// and tables it is built from. The parser produces terms and the evaluator
/// reduces them.
///
/// # Responsibilities
/// - Defines every term and type form of the language.
/// - Holds top-level definitions and their memoized values.
pub mod ast;
/// Error types for parsing and evaluation.
///
/// # Responsibilities
/// - Defines `ParseError`, which carries the line of the failure.
/// - Defines `RuntimeError`, which names the offending term and the expected
///   shape.
pub mod error;
/// Lexing, parsing and reduction.
///
/// This module ties the phases together and exposes them to the driver
/// functions below.
pub mod interpreter;
/// Helpers shared across the interpreter: natural number arithmetic and
/// fresh names for capture-avoiding substitution.
pub mod util;

/// Runs a program and returns the value of its last statement.
///
/// Statements are parsed and reduced one at a time, so the prints of earlier
/// statements are written even when a later statement fails. Print output
/// goes to `out`.
///
/// # Errors
/// The first `ParseError` or `RuntimeError` encountered.
///
/// # Examples
/// ```
/// use tabula::{ast::Term, interpreter::evaluator::core::EvalConfig, run};
///
/// let mut out = Vec::new();
/// let value = run("def two = succ succ 0\nprint two\niszero two", &mut out, EvalConfig::default()).unwrap();
///
/// assert_eq!(value, Some(Term::Bool(false)));
/// assert_eq!(out, b"2\n");
/// ```
pub fn run<W: Write>(source: &str, out: W, config: EvalConfig) -> Result<Option<Term>, Box<dyn Error>> {
    let tokens = tokenize(source)?;
    let mut iter = tokens.iter().peekable();
    let mut scope = Scope::new();
    let mut evaluator = Evaluator::with_config(out, config);
    let mut result = None;

    while let Some(statement) = next_statement(&mut iter, &mut scope)? {
        let value = evaluator.reduce(statement)?;
        debug!(steps = evaluator.steps(), "statement reduced");
        result = Some(value);
    }

    Ok(result)
}

/// Runs a program, printing to stdout.
///
/// With `auto_print`, the value of the last statement is printed after the
/// program finishes.
///
/// # Errors
/// Returns an error if parsing or evaluation fails.
///
/// # Examples
/// ```
/// use tabula::get_result;
///
/// let source = "def id = \\x:Nat. x\nid 3";
/// assert!(get_result(source, false).is_ok());
///
/// // `y` is never bound.
/// assert!(get_result("succ y", false).is_err());
/// ```
pub fn get_result(source: &str, auto_print: bool) -> Result<(), Box<dyn Error>> {
    get_result_with_config(source, auto_print, EvalConfig::default())
}

/// [`get_result`] with explicit evaluator settings.
///
/// # Errors
/// Returns an error if parsing or evaluation fails, including when the step
/// budget runs out.
pub fn get_result_with_config(source: &str, auto_print: bool, config: EvalConfig) -> Result<(), Box<dyn Error>> {
    let stdout = std::io::stdout();
    let result = run(source, stdout.lock(), config)?;

    if auto_print && let Some(v) = result {
        println!("{v}");
    }

    Ok(())
}
