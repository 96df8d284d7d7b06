use std::{io::Write, mem, rc::Rc};

use tracing::trace;

use crate::{
    ast::{Term, tree::take},
    error::RuntimeError,
    interpreter::{
        evaluator::frame::{Assemble, Control, Frame, Prefix},
        value::is_value,
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// Evaluator settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum number of machine steps across every reduction performed by one
    /// evaluator. `None` means unlimited.
    pub max_steps: Option<u64>,
}

/// The reduction engine.
///
/// Drives terms to values with call-by-value, substitution-based reduction.
/// Reduction runs on an explicit stack of [`Frame`]s instead of native
/// recursion: reducing a term pushes the frames needed to resume its parent
/// and moves to a subterm, and a value pops one frame. Beta reduction, calls,
/// the last statement of a sequence and the branches of a conditional
/// continue without pushing, so long reduction chains run in constant stack.
///
/// `print` writes one line per value to `out`.
///
/// ## Usage
/// ```
/// use tabula::{
///     ast::{Term, Type},
///     interpreter::evaluator::core::Evaluator,
/// };
///
/// let mut evaluator = Evaluator::new(Vec::new());
///
/// let inc = Term::abs("x", Type::Nat, Term::succ(Term::var("x")));
/// let value = evaluator.reduce(Term::app(inc, Term::nat(3))).unwrap();
/// assert_eq!(value, Term::nat(4));
///
/// evaluator.reduce(Term::print(Term::iszero(Term::nat(0)))).unwrap();
/// assert_eq!(evaluator.into_output(), b"true\n");
/// ```
pub struct Evaluator<W: Write> {
    pub(in crate::interpreter::evaluator) out: W,
    config:                                    EvalConfig,
    steps:                                     u64,
}

impl<W: Write> Evaluator<W> {
    /// Creates an evaluator that prints to `out`, with no step budget.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self::with_config(out, EvalConfig::default())
    }

    /// Creates an evaluator with explicit settings.
    #[must_use]
    pub const fn with_config(out: W, config: EvalConfig) -> Self {
        Self { out,
               config,
               steps: 0 }
    }

    /// Number of machine steps taken so far.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Consumes the evaluator and returns the print sink.
    #[must_use]
    pub fn into_output(self) -> W {
        self.out
    }

    /// Reduces `term` to a value.
    ///
    /// A `def` statement reduces to the definition node itself, after its
    /// initializer has been reduced and cached.
    ///
    /// # Errors
    /// Any [`RuntimeError`]. Errors are fatal to this reduction; no partial
    /// result is returned.
    pub fn reduce(&mut self, term: Term) -> EvalResult<Term> {
        let mut stack = Vec::new();
        let result = self.run(term, &mut stack);

        if result.is_err() {
            for def in stack.iter().filter_map(Frame::pending_definition) {
                def.release();
            }
        }

        result
    }

    fn run(&mut self, term: Term, stack: &mut Vec<Frame>) -> EvalResult<Term> {
        let mut control = Control::Eval(term);

        loop {
            self.tick()?;
            control = match control {
                Control::Eval(term) => {
                    trace!(step = self.steps, depth = stack.len(), kind = term.kind(), "reduce");
                    self.step(term, stack)?
                },
                Control::Return(value) => match stack.pop() {
                    None => return Ok(value),
                    Some(frame) => self.resume(frame, value, stack)?,
                },
            };
        }
    }

    fn tick(&mut self) -> EvalResult<()> {
        self.steps += 1;
        if let Some(limit) = self.config.max_steps
           && self.steps > limit
        {
            return Err(RuntimeError::StepLimitExceeded { limit });
        }
        Ok(())
    }

    /// Starts reducing `term`.
    ///
    /// Subterms are moved out of `term` before it is dropped.
    fn step(&mut self, mut term: Term, stack: &mut Vec<Frame>) -> EvalResult<Control> {
        match &mut term {
            Term::Bool(_) | Term::Nat(_) | Term::Unit | Term::Abs { .. } | Term::Fn { .. } => {
                Ok(Control::Return(term))
            },
            Term::Var(name) => Err(RuntimeError::UnboundVariable { name: mem::take(name) }),
            Term::If { condition,
                       then_branch,
                       else_branch, } => {
                stack.push(Frame::IfCondition { then_branch: take(then_branch),
                                                else_branch: take(else_branch), });
                Ok(Control::Eval(take(condition)))
            },
            Term::Succ(t) => Ok(Self::prefix(Prefix::Succ, take(t), stack)),
            Term::Pred(t) => Ok(Self::prefix(Prefix::Pred, take(t), stack)),
            Term::IsZero(t) => Ok(Self::prefix(Prefix::IsZero, take(t), stack)),
            Term::Not(t) => Ok(Self::prefix(Prefix::Not, take(t), stack)),
            Term::App { function, argument } => {
                stack.push(Frame::ApplyFunction { argument: take(argument) });
                Ok(Control::Eval(take(function)))
            },
            Term::Call { function, arguments } => {
                stack.push(Frame::CallFunction { arguments: mem::take(arguments) });
                Ok(Control::Eval(take(function)))
            },
            Term::Ref(def) => Self::resolve_reference(Rc::clone(def), stack),
            Term::Def(def) => Self::reduce_definition(Rc::clone(def), stack),
            Term::Print(target) => self.start_print(take(target), stack),
            Term::Seq(statements) => Ok(Self::start_sequence(mem::take(statements), stack)),
            Term::Tuple(elements) => {
                if elements.iter().all(is_value) {
                    return Ok(Control::Return(term));
                }
                Self::collect(mem::take(elements), Assemble::Tuple, stack)
            },
            Term::Binary { op, left, right } => {
                stack.push(Frame::BinaryLeft { op:    *op,
                                               right: take(right), });
                Ok(Control::Eval(take(left)))
            },
            Term::Record(fields) => Self::start_record(mem::take(fields), stack),
            Term::Table(table) => Self::start_table(mem::take(table), stack),
            Term::Member { receiver, accessor } => {
                stack.push(Frame::MemberReceiver { accessor: accessor.clone() });
                Ok(Control::Eval(take(receiver)))
            },
            Term::Query { projection,
                          source,
                          predicate, } => {
                stack.push(Frame::QuerySource { projection: mem::take(projection),
                                                predicate:  take(predicate), });
                Ok(Control::Eval(take(source)))
            },
            Term::Join { left,
                         right,
                         predicate,
                         projection, } => Ok(Self::start_join(take(left),
                                                              take(right),
                                                              take(predicate),
                                                              projection.take(),
                                                              stack)),
        }
    }

    /// Hands `value` to `frame`.
    fn resume(&mut self, frame: Frame, value: Term, stack: &mut Vec<Frame>) -> EvalResult<Control> {
        match frame {
            Frame::IfCondition { then_branch,
                                 else_branch, } => Self::choose_branch(&value, then_branch, else_branch),
            Frame::Prefix(op) => Self::apply_prefix(op, value).map(Control::Return),
            Frame::ApplyFunction { argument } => Self::apply_function(value, argument, stack),
            Frame::ApplyArgument { param, body } => Ok(Self::beta(&param, &body, value)),
            Frame::CallFunction { arguments } => Self::call_function(value, arguments, stack),
            Frame::Collect { mut done,
                             mut pending,
                             assemble, } => {
                done.push(value);
                match pending.next() {
                    Some(next) => {
                        stack.push(Frame::Collect { done,
                                                    pending,
                                                    assemble });
                        Ok(Control::Eval(next))
                    },
                    None => Self::assemble(assemble, done),
                }
            },
            Frame::Memoize { def,
                             yield_definition, } => Ok(Self::memoize(def, value, yield_definition)),
            Frame::Print => self.print(&value),
            Frame::Sequence { pending } => Ok(Self::continue_sequence(pending, stack)),
            Frame::BinaryLeft { op, right } => {
                stack.push(Frame::BinaryRight { op, left: value });
                Ok(Control::Eval(right))
            },
            Frame::BinaryRight { op, left } => Self::apply_binary(op, left, value).map(Control::Return),
            Frame::MemberReceiver { accessor } => Self::member(value, &accessor).map(Control::Return),
            Frame::QuerySource { projection,
                                 predicate, } => Self::query_source(value, projection, predicate, stack),
            Frame::JoinLeft { right,
                              predicate,
                              projection,
                              qualifiers, } => Self::join_left(value, right, predicate, projection, qualifiers, stack),
            Frame::JoinRight { left,
                               predicate,
                               projection,
                               qualifiers, } => Self::join_right(left, value, predicate, projection, &qualifiers, stack),
            Frame::Filter(selection) => Self::filter_row(&value, selection, stack),
        }
    }

    /// Reduces `items` left to right and then builds the result described by
    /// `assemble`.
    pub(in crate::interpreter::evaluator) fn collect(items: Vec<Term>,
                                                     assemble: Assemble,
                                                     stack: &mut Vec<Frame>)
                                                     -> EvalResult<Control> {
        let mut pending = items.into_iter();
        match pending.next() {
            Some(first) => {
                stack.push(Frame::Collect { done: Vec::with_capacity(pending.len() + 1),
                                            pending,
                                            assemble });
                Ok(Control::Eval(first))
            },
            None => Self::assemble(assemble, Vec::new()),
        }
    }

    fn assemble(assemble: Assemble, values: Vec<Term>) -> EvalResult<Control> {
        match assemble {
            Assemble::Tuple => Ok(Control::Return(Term::Tuple(values))),
            Assemble::Record(names) => Ok(Control::Return(Self::build_record(names, values))),
            Assemble::Table { schema, rows } => Self::build_table(schema, &rows, values).map(Control::Return),
            Assemble::Call { params, body } => Ok(Self::enter_call(&params, &body, values)),
        }
    }
}
