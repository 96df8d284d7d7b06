use std::io::Write;

use crate::{
    ast::{BinaryOperator, Term},
    interpreter::{
        evaluator::core::{EvalResult, Evaluator},
        value::expect_table,
    },
};

impl<W: Write> Evaluator<W> {
    /// Applies a binary combinator to two reduced operands.
    ///
    /// Logical operators require booleans, comparisons accept any two values,
    /// and the set operators require tables with equal schemas.
    ///
    /// # Example
    /// ```
    /// use tabula::{
    ///     ast::{BinaryOperator, Term},
    ///     interpreter::evaluator::core::Evaluator,
    /// };
    ///
    /// type E = Evaluator<Vec<u8>>;
    ///
    /// let result = E::apply_binary(BinaryOperator::Less, Term::nat(2), Term::nat(3));
    /// assert_eq!(result.unwrap(), Term::Bool(true));
    ///
    /// let result = E::apply_binary(BinaryOperator::And, Term::Bool(true), Term::nat(1));
    /// assert!(result.is_err());
    /// ```
    ///
    /// # Errors
    /// `ExpectedBoolean`, `ExpectedTable` or `SchemaMismatch` when the operands
    /// do not fit the operator.
    pub fn apply_binary(op: BinaryOperator, left: Term, right: Term) -> EvalResult<Term> {
        use BinaryOperator::{And, Equal, Except, Intersect, Less, Or, Union};

        match op {
            And | Or => Self::eval_logic(op, &left, &right),
            Equal | Less => Self::eval_comparison(op, &left, &right),
            Union | Intersect | Except => {
                let left = expect_table(left)?;
                let right = expect_table(right)?;
                Self::eval_set_op(op, left, &right).map(Term::Table)
            },
        }
    }
}
