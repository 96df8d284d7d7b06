/// Parsing errors.
///
/// Defines all error types that can occur during lexing and parsing of source
/// code: unexpected tokens, premature end of input, and misplaced or repeated
/// definitions.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during reduction. They are
/// fatal: a reduction that fails returns no partial result.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
