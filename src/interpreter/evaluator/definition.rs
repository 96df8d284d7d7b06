use std::{io::Write, rc::Rc, vec::IntoIter};

use tracing::debug;

use crate::{
    ast::{Binding, Definition, Term},
    error::RuntimeError,
    interpreter::evaluator::{
        core::{EvalResult, Evaluator},
        frame::{Control, Frame},
    },
};

impl<W: Write> Evaluator<W> {
    /// Resolves a reference to its definition's value.
    ///
    /// A memoized value is returned as is. Otherwise the initializer is
    /// reduced and cached first. References to type declarations have no
    /// value.
    pub(in crate::interpreter::evaluator) fn resolve_reference(def: Rc<Definition>,
                                                               stack: &mut Vec<Frame>)
                                                               -> EvalResult<Control> {
        if let Some(value) = def.cached() {
            return Ok(Control::Return(value.clone()));
        }
        match def.binding() {
            Some(Binding::Term(initializer)) => {
                let initializer = initializer.clone();
                Self::begin_definition(def, initializer, false, stack)
            },
            Some(Binding::Type(_)) => Err(RuntimeError::TypeHasNoValue { name: def.name.clone() }),
            None => Err(RuntimeError::UnboundVariable { name: def.name.clone() }),
        }
    }

    /// Reduces a `def` statement: the initializer is reduced and cached once,
    /// and the definition node itself is the result.
    pub(in crate::interpreter::evaluator) fn reduce_definition(def: Rc<Definition>,
                                                               stack: &mut Vec<Frame>)
                                                               -> EvalResult<Control> {
        match def.binding() {
            Some(Binding::Term(initializer)) if def.cached().is_none() => {
                let initializer = initializer.clone();
                Self::begin_definition(def, initializer, true, stack)
            },
            _ => Ok(Control::Return(Term::Def(def))),
        }
    }

    fn begin_definition(def: Rc<Definition>,
                        initializer: Term,
                        yield_definition: bool,
                        stack: &mut Vec<Frame>)
                        -> EvalResult<Control> {
        if def.is_pending() {
            return Err(RuntimeError::CyclicDefinition { name: def.name.clone() });
        }
        def.set_pending();
        stack.push(Frame::Memoize { def,
                                    yield_definition });
        Ok(Control::Eval(initializer))
    }

    /// Stores a definition's reduced initializer.
    pub(in crate::interpreter::evaluator) fn memoize(def: Rc<Definition>,
                                                     value: Term,
                                                     yield_definition: bool)
                                                     -> Control {
        debug!(name = %def.name, "memoize");
        def.memoize(value.clone());
        if yield_definition {
            Control::Return(Term::Def(def))
        } else {
            Control::Return(value)
        }
    }

    /// Starts a `print`.
    ///
    /// A reference to a type declaration is printed as written, without
    /// reduction. Anything else is reduced first.
    pub(in crate::interpreter::evaluator) fn start_print(&mut self,
                                                         target: Term,
                                                         stack: &mut Vec<Frame>)
                                                         -> EvalResult<Control> {
        if target.type_reference().is_some() {
            return self.print(&target);
        }
        stack.push(Frame::Print);
        Ok(Control::Eval(target))
    }

    /// Writes one line to the print sink. The result of a `print` is `unit`.
    pub(in crate::interpreter::evaluator) fn print(&mut self, value: &Term) -> EvalResult<Control> {
        writeln!(self.out, "{value}")?;
        Ok(Control::Return(Term::Unit))
    }

    /// Starts a sequence. The empty sequence is `unit`.
    pub(in crate::interpreter::evaluator) fn start_sequence(statements: Vec<Term>,
                                                            stack: &mut Vec<Frame>)
                                                            -> Control {
        Self::continue_sequence(statements.into_iter(), stack)
    }

    /// Reduces the next statement of a sequence, discarding the previous value.
    /// The last statement is reduced in tail position.
    pub(in crate::interpreter::evaluator) fn continue_sequence(mut pending: IntoIter<Term>,
                                                               stack: &mut Vec<Frame>)
                                                               -> Control {
        match pending.next() {
            None => Control::Return(Term::Unit),
            Some(next) => {
                if pending.len() > 0 {
                    stack.push(Frame::Sequence { pending });
                }
                Control::Eval(next)
            },
        }
    }
}
