/// Expression entry point and name resolution.
///
/// Contains the `Scope` threaded through every parsing function, the
/// `ParseResult` alias, and the keyword-introduced expression forms.
pub mod core;

/// Prefix operators, application and postfix access.
///
/// Handles `not`, `succ`, `pred` and `iszero`, application by juxtaposition,
/// member access, calls and the primary expressions.
pub mod unary;

/// Binary operator parsing.
///
/// One precedence level each for `or`, `and`, the comparisons and the table
/// set operators.
pub mod binary;

/// `do` blocks.
pub mod block;

/// Utility functions for the parser.
///
/// Comma-separated lists, identifiers, expected tokens and column lists.
pub mod utils;

/// Statement parsing.
///
/// Top-level definitions, type declarations and expression statements, plus
/// the program loop that separates them.
pub mod statement;

/// Type annotations and schemas.
pub mod types;

/// Table literals, queries and joins.
pub mod relational;
