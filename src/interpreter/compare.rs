use std::cmp::Ordering;

use crate::ast::{Column, Field, Term};

/// Orders the kinds of terms that can be compared structurally.
///
/// Terms of different kinds compare by this rank; everything that is not
/// plain data shares the last rank and compares by its rendering.
const fn rank(term: &Term) -> u8 {
    match term {
        Term::Bool(_) => 0,
        Term::Nat(_) => 1,
        Term::Unit => 2,
        Term::Tuple(_) => 3,
        Term::Record(_) => 4,
        Term::Table(_) => 5,
        _ => 6,
    }
}

/// Total structural ordering of terms.
///
/// - Naturals compare by value and `false < true`.
/// - Tuples and records compare lexicographically, records by field name
///   first and then by value.
/// - Tables compare by schema, then row by row.
/// - Terms of different kinds compare by a fixed kind order.
/// - Non-data terms (abstractions, functions, unreduced expressions) compare
///   by their rendered text, which keeps the order total.
///
/// ## Example
/// ```
/// use std::cmp::Ordering;
///
/// use tabula::{ast::Term, interpreter::compare::compare};
///
/// assert_eq!(compare(&Term::nat(2), &Term::nat(10)), Ordering::Less);
/// assert_eq!(compare(&Term::Bool(true), &Term::Bool(false)), Ordering::Greater);
/// assert_eq!(compare(&Term::Tuple(vec![Term::nat(1), Term::nat(2)]),
///                    &Term::Tuple(vec![Term::nat(1), Term::nat(2)])),
///            Ordering::Equal);
/// ```
#[must_use]
pub fn compare(a: &Term, b: &Term) -> Ordering {
    match (a, b) {
        (Term::Bool(x), Term::Bool(y)) => x.cmp(y),
        (Term::Nat(x), Term::Nat(y)) => x.cmp(y),
        (Term::Unit, Term::Unit) => Ordering::Equal,
        (Term::Tuple(xs), Term::Tuple(ys)) => compare_terms(xs, ys),
        (Term::Record(xs), Term::Record(ys)) => compare_fields(xs, ys),
        (Term::Table(x), Term::Table(y)) => {
            compare_schemas(&x.schema, &y.schema).then_with(|| {
                                                     x.rows
                                                      .iter()
                                                      .zip(&y.rows)
                                                      .map(|(r, s)| compare_fields(r, s))
                                                      .find(|o| o.is_ne())
                                                      .unwrap_or_else(|| x.rows.len().cmp(&y.rows.len()))
                                                 })
        },
        _ => match rank(a).cmp(&rank(b)) {
            Ordering::Equal => a.to_string().cmp(&b.to_string()),
            other => other,
        },
    }
}

/// Structural equality.
///
/// ## Example
/// ```
/// use tabula::{
///     ast::{Field, Term},
///     interpreter::compare::equal,
/// };
///
/// let a = Term::Record(vec![Field::new("x", Term::nat(1))]);
/// let b = Term::Record(vec![Field::new("x", Term::nat(1))]);
///
/// assert!(equal(&a, &b));
/// assert!(!equal(&Term::nat(1), &Term::Bool(true)));
/// ```
#[must_use]
pub fn equal(a: &Term, b: &Term) -> bool {
    compare(a, b).is_eq()
}

/// Strict structural ordering.
#[must_use]
pub fn less(a: &Term, b: &Term) -> bool {
    compare(a, b).is_lt()
}

fn compare_terms(xs: &[Term], ys: &[Term]) -> Ordering {
    xs.iter()
      .zip(ys)
      .map(|(x, y)| compare(x, y))
      .find(|o| o.is_ne())
      .unwrap_or_else(|| xs.len().cmp(&ys.len()))
}

/// Lexicographic comparison of field lists, name before value.
#[must_use]
pub fn compare_fields(xs: &[Field], ys: &[Field]) -> Ordering {
    xs.iter()
      .zip(ys)
      .map(|(x, y)| x.name.cmp(&y.name).then_with(|| compare(&x.value, &y.value)))
      .find(|o| o.is_ne())
      .unwrap_or_else(|| xs.len().cmp(&ys.len()))
}

fn compare_schemas(xs: &[Column], ys: &[Column]) -> Ordering {
    xs.iter()
      .zip(ys)
      .map(|(x, y)| {
          x.name
           .cmp(&y.name)
           .then_with(|| x.ty.to_string().cmp(&y.ty.to_string()))
      })
      .find(|o| o.is_ne())
      .unwrap_or_else(|| xs.len().cmp(&ys.len()))
}

/// A borrowed table row ordered by [`compare_fields`].
///
/// Lets rows live in ordered sets, which is how the set operators detect
/// duplicates.
#[derive(Debug, Clone, Copy)]
pub struct RowKey<'a>(pub &'a [Field]);

impl PartialEq for RowKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        compare_fields(self.0, other.0).is_eq()
    }
}

impl Eq for RowKey<'_> {}

impl PartialOrd for RowKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RowKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_fields(self.0, other.0)
    }
}
