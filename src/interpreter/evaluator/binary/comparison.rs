use std::io::Write;

use crate::{
    ast::{BinaryOperator, Term},
    error::RuntimeError,
    interpreter::{
        compare::{equal, less},
        evaluator::core::{EvalResult, Evaluator},
    },
};

impl<W: Write> Evaluator<W> {
    /// Evaluates `==` or `<` structurally.
    ///
    /// Any two values can be compared; values of different kinds are simply
    /// unequal.
    ///
    /// # Example
    /// ```
    /// use tabula::{
    ///     ast::{BinaryOperator, Field, Term},
    ///     interpreter::evaluator::core::Evaluator,
    /// };
    ///
    /// type E = Evaluator<Vec<u8>>;
    ///
    /// let r = Term::Record(vec![Field::new("a", Term::nat(1))]);
    ///
    /// assert_eq!(E::eval_comparison(BinaryOperator::Equal, &r, &r.clone()).unwrap(),
    ///            Term::Bool(true));
    /// assert_eq!(E::eval_comparison(BinaryOperator::Equal, &r, &Term::nat(1)).unwrap(),
    ///            Term::Bool(false));
    /// ```
    ///
    /// # Errors
    /// `OperatorMismatch` for anything but `==` and `<`.
    pub fn eval_comparison(op: BinaryOperator, left: &Term, right: &Term) -> EvalResult<Term> {
        use BinaryOperator::{And, Equal, Except, Intersect, Less, Or, Union};

        match op {
            Equal => Ok(Term::Bool(equal(left, right))),
            Less => Ok(Term::Bool(less(left, right))),
            And | Or | Union | Intersect | Except => {
                Err(RuntimeError::OperatorMismatch { operator: op.to_string(),
                                                     expected: "a comparison", })
            },
        }
    }
}
