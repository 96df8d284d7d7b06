use std::mem;

use num_bigint::BigUint;

use crate::{
    ast::{Column, Table, Term, Type},
    error::RuntimeError,
};

/// Returns `true` when `term` is a value, i.e. reduction leaves it unchanged.
///
/// Values are booleans, naturals, `unit`, abstractions and function values,
/// plus tuples, records and tables whose components are all values.
///
/// ## Example
/// ```
/// use tabula::{
///     ast::{Field, Term},
///     interpreter::value::is_value,
/// };
///
/// assert!(is_value(&Term::nat(1)));
/// assert!(is_value(&Term::Record(vec![Field::new("a", Term::Unit)])));
/// assert!(!is_value(&Term::succ(Term::nat(1))));
/// ```
#[must_use]
pub fn is_value(term: &Term) -> bool {
    match term {
        Term::Bool(_) | Term::Nat(_) | Term::Unit | Term::Abs { .. } | Term::Fn { .. } => true,
        Term::Tuple(elements) => elements.iter().all(is_value),
        Term::Record(fields) => fields.iter().all(|f| is_value(&f.value)),
        Term::Table(table) => table.rows.iter().flatten().all(|f| is_value(&f.value)),
        _ => false,
    }
}

/// Extracts a boolean from a reduced term.
///
/// # Errors
/// `ExpectedBoolean` naming the term when it is not a boolean literal.
pub fn expect_bool(term: &Term) -> Result<bool, RuntimeError> {
    match term {
        Term::Bool(b) => Ok(*b),
        other => Err(RuntimeError::ExpectedBoolean { found: other.to_string() }),
    }
}

/// Extracts a natural number from a reduced term.
///
/// # Errors
/// `ExpectedNatural` naming the term when it is not a natural literal.
pub fn expect_nat(mut term: Term) -> Result<BigUint, RuntimeError> {
    match &mut term {
        Term::Nat(n) => Ok(mem::take(n)),
        other => Err(RuntimeError::ExpectedNatural { found: other.to_string() }),
    }
}

/// Extracts a table from a reduced term.
///
/// # Errors
/// `ExpectedTable` naming the term when it is not a table.
pub fn expect_table(mut term: Term) -> Result<Table, RuntimeError> {
    match &mut term {
        Term::Table(table) => Ok(mem::take(table)),
        other => Err(RuntimeError::ExpectedTable { found: other.to_string() }),
    }
}

/// Renders a schema the way a table type is written.
#[must_use]
pub fn render_schema(schema: &[Column]) -> String {
    Type::Table(schema.to_vec()).to_string()
}
