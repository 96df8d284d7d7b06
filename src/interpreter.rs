/// The evaluator reduces terms to values.
///
/// Reduction is call-by-value and substitution based. It runs on an explicit
/// work stack, so the depth of a term or of a reduction chain is bounded by
/// memory rather than by the native call stack.
///
/// # Responsibilities
/// - Reduces every term form, including the relational ones.
/// - Memoizes top-level definitions and detects cyclic ones.
/// - Writes `print` output to a caller-supplied sink.
/// - Enforces an optional step budget.
pub mod evaluator;
/// Structural ordering and equality of values.
pub mod compare;
/// The lexer turns source text into tokens with line numbers.
///
/// # Responsibilities
/// - Recognizes keywords, identifiers, natural literals and punctuation.
/// - Skips whitespace and comments and counts lines.
/// - Reports characters that start no token.
pub mod lexer;
/// The parser builds terms from tokens.
///
/// Names are resolved while parsing: a name bound by an enclosing binder
/// becomes a variable, a name of an earlier top-level definition becomes a
/// reference to it.
///
/// # Responsibilities
/// - Parses statements, expressions, types and relational forms.
/// - Maintains the scope of binders and definitions.
/// - Reports syntax errors with the line they occur on.
pub mod parser;
/// Renders terms and types in concrete syntax.
pub mod render;
/// Capture-avoiding substitution and free variables.
pub mod subst;
/// Predicates and extractors over reduced terms.
pub mod value;
