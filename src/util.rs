/// Natural number helpers.
///
/// Literal parsing and the saturating successor/predecessor arithmetic used by
/// the lexer and the evaluator. Naturals are arbitrary precision, so these
/// helpers never overflow.
pub mod num;

/// Fresh name generation.
///
/// Substitution renames binders that would capture a free variable of the
/// substituted value. The names produced here are unique for the lifetime of
/// the process.
pub mod names;
