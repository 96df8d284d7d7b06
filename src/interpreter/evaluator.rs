/// Binary combinator evaluation.
///
/// Applies the logical, comparison and set operators to reduced operands.
pub mod binary;

/// The reduction machine.
///
/// Contains the evaluator itself, its settings, the step loop and the
/// dispatch from terms and frames to the handlers in the sibling modules.
pub mod core;

/// Definitions, `print` and statement sequences.
///
/// Resolves references to top-level definitions, memoizes their values and
/// detects cycles.
pub mod definition;

/// The machine's work stack.
pub mod frame;

/// Application of abstractions and calls of multi-parameter functions.
pub mod function;

/// Records, tables, member access, queries and joins.
pub mod relational;

/// Prefix operators and conditionals.
pub mod scalar;
