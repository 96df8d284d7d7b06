use std::io::Write;

use crate::{
    ast::{BinaryOperator, Term},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalResult, Evaluator},
        value::expect_bool,
    },
};

impl<W: Write> Evaluator<W> {
    /// Evaluates a logical operation between two reduced operands.
    ///
    /// Both operands have already been reduced, so there is no
    /// short-circuiting; both must be booleans. Only `and` and `or` are
    /// accepted.
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
    /// let result = E::eval_logic(BinaryOperator::Or, &Term::Bool(false), &Term::Bool(true));
    /// assert_eq!(result.unwrap(), Term::Bool(true));
    ///
    /// let result = E::eval_logic(BinaryOperator::Less, &Term::Bool(false), &Term::Bool(true));
    /// assert!(result.is_err());
    /// ```
    ///
    /// # Errors
    /// `OperatorMismatch` for an operator that is not logical, then
    /// `ExpectedBoolean` naming the first operand that is not a boolean.
    pub fn eval_logic(op: BinaryOperator, left: &Term, right: &Term) -> EvalResult<Term> {
        use BinaryOperator::{And, Equal, Except, Intersect, Less, Or, Union};

        let combine: fn(bool, bool) -> bool = match op {
            And => |a, b| a && b,
            Or => |a, b| a || b,
            Equal | Less | Union | Intersect | Except => {
                return Err(RuntimeError::OperatorMismatch { operator: op.to_string(),
                                                            expected: "a logical operator", });
            },
        };

        Ok(Term::Bool(combine(expect_bool(left)?, expect_bool(right)?)))
    }
}
