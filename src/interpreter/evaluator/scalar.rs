use std::io::Write;

use num_traits::Zero;

use crate::{
    ast::Term,
    interpreter::{
        evaluator::{
            core::{EvalResult, Evaluator},
            frame::{Control, Frame, Prefix},
        },
        value::{expect_bool, expect_nat},
    },
    util::num::{saturating_predecessor, successor},
};

impl<W: Write> Evaluator<W> {
    /// Schedules a prefix operator: its operand is reduced first.
    pub(in crate::interpreter::evaluator) fn prefix(op: Prefix,
                                                    operand: Term,
                                                    stack: &mut Vec<Frame>)
                                                    -> Control {
        stack.push(Frame::Prefix(op));
        Control::Eval(operand)
    }

    /// Applies a prefix operator to its reduced operand.
    ///
    /// - `succ n` is `n + 1`.
    /// - `pred n` is `n - 1`, saturating at `0`.
    /// - `iszero n` is `true` iff `n` is `0`.
    /// - `not b` negates a boolean.
    ///
    /// # Example
    /// ```
    /// use tabula::{
    ///     ast::Term,
    ///     interpreter::evaluator::{core::Evaluator, frame::Prefix},
    /// };
    ///
    /// type E = Evaluator<Vec<u8>>;
    ///
    /// assert_eq!(E::apply_prefix(Prefix::Pred, Term::nat(0)).unwrap(), Term::nat(0));
    /// assert_eq!(E::apply_prefix(Prefix::IsZero, Term::nat(0)).unwrap(), Term::Bool(true));
    /// assert!(E::apply_prefix(Prefix::Succ, Term::Bool(true)).is_err());
    /// ```
    ///
    /// # Errors
    /// `ExpectedNatural` for arithmetic on anything but a natural,
    /// `ExpectedBoolean` for `not` on anything but a boolean.
    pub fn apply_prefix(op: Prefix, value: Term) -> EvalResult<Term> {
        match op {
            Prefix::Succ => Ok(Term::Nat(successor(&expect_nat(value)?))),
            Prefix::Pred => Ok(Term::Nat(saturating_predecessor(&expect_nat(value)?))),
            Prefix::IsZero => Ok(Term::Bool(expect_nat(value)?.is_zero())),
            Prefix::Not => Ok(Term::Bool(!expect_bool(&value)?)),
        }
    }

    /// Continues a conditional with the branch selected by its reduced
    /// condition. The branch is reduced in tail position.
    pub(in crate::interpreter::evaluator) fn choose_branch(condition: &Term,
                                                           then_branch: Term,
                                                           else_branch: Term)
                                                           -> EvalResult<Control> {
        if expect_bool(condition)? {
            Ok(Control::Eval(then_branch))
        } else {
            Ok(Control::Eval(else_branch))
        }
    }
}
