use std::{io::Write, mem};

use tracing::debug;

use crate::{
    ast::{Param, Term, tree::take},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{EvalResult, Evaluator},
            frame::{Assemble, Control, Frame},
        },
        subst::substitute,
    },
};

impl<W: Write> Evaluator<W> {
    /// Continues an application once its function position is reduced.
    ///
    /// The function must be an abstraction; its argument is reduced next.
    pub(in crate::interpreter::evaluator) fn apply_function(mut function: Term,
                                                            argument: Term,
                                                            stack: &mut Vec<Frame>)
                                                            -> EvalResult<Control> {
        match &mut function {
            Term::Abs { param, body, .. } => {
                stack.push(Frame::ApplyArgument { param: mem::take(param),
                                                  body:  take(body), });
                Ok(Control::Eval(argument))
            },
            other => Err(RuntimeError::ExpectedAbstraction { found: other.to_string() }),
        }
    }

    /// Beta reduction: substitutes the reduced argument into the body, which is
    /// then reduced in tail position.
    pub(in crate::interpreter::evaluator) fn beta(param: &str, body: &Term, argument: Term) -> Control {
        debug!(%param, "beta");
        Control::Eval(substitute(body, &[(param.to_string(), argument)]))
    }

    /// Continues a call once its function position is reduced.
    ///
    /// The function must be a function value taking exactly as many
    /// parameters as there are arguments. Arguments are then reduced left to
    /// right.
    pub(in crate::interpreter::evaluator) fn call_function(mut function: Term,
                                                           arguments: Vec<Term>,
                                                           stack: &mut Vec<Frame>)
                                                           -> EvalResult<Control> {
        match &mut function {
            Term::Fn { params, body } => {
                if params.len() != arguments.len() {
                    return Err(RuntimeError::ArgumentCountMismatch { expected: params.len(),
                                                                     found:    arguments.len(), });
                }
                Self::collect(arguments,
                              Assemble::Call { params: mem::take(params),
                                               body:   take(body), },
                              stack)
            },
            other => Err(RuntimeError::ExpectedFunction { found: other.to_string() }),
        }
    }

    /// Substitutes every reduced argument for its parameter at once and
    /// reduces the body in tail position.
    pub(in crate::interpreter::evaluator) fn enter_call(params: &[Param],
                                                        body: &Term,
                                                        arguments: Vec<Term>)
                                                        -> Control {
        debug!(arity = params.len(), "call");
        let bindings: Vec<(String, Term)> = params.iter()
                                                  .map(|p| p.name.clone())
                                                  .zip(arguments)
                                                  .collect();
        Control::Eval(substitute(body, &bindings))
    }
}
