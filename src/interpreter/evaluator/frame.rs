use std::{rc::Rc, vec::IntoIter};

use crate::ast::{Accessor, BinaryOperator, Column, Definition, Param, Row, Table, Term};

/// What the machine does next: reduce a term, or hand a value to the
/// innermost pending frame.
#[derive(Debug)]
pub enum Control {
    /// Reduce this term.
    Eval(Term),
    /// This value is the result of the most recent reduction.
    Return(Term),
}

/// The prefix operators, which all take one reduced operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// `succ`
    Succ,
    /// `pred`
    Pred,
    /// `iszero`
    IsZero,
    /// `not`
    Not,
}

/// How the reduced components of a composite term are put back together.
#[derive(Debug)]
pub enum Assemble {
    /// Into a tuple.
    Tuple,
    /// Into a record with these field names.
    Record(Vec<String>),
    /// Into a table. `rows` holds the field names of every row, in source
    /// order.
    Table {
        /// The declared schema.
        schema: Vec<Column>,
        /// Field names per row.
        rows:   Vec<Vec<String>>,
    },
    /// Into the simultaneous substitution of a call's arguments into the
    /// function body.
    Call {
        /// The function's parameters.
        params: Vec<Param>,
        /// The function body.
        body:   Term,
    },
}

/// A pending construct waiting for the value of one of its subterms.
///
/// Each variant names the construct and carries whatever is needed to resume
/// it once the value arrives.
#[derive(Debug)]
pub enum Frame {
    /// The condition of an `if`.
    IfCondition {
        /// Taken on `true`.
        then_branch: Term,
        /// Taken on `false`.
        else_branch: Term,
    },
    /// The operand of a prefix operator.
    Prefix(Prefix),
    /// The function position of an application.
    ApplyFunction {
        /// The unreduced argument.
        argument: Term,
    },
    /// The argument of an application whose function is known.
    ApplyArgument {
        /// The abstraction's parameter.
        param: String,
        /// The abstraction's body.
        body:  Term,
    },
    /// The function position of a call.
    CallFunction {
        /// The unreduced arguments.
        arguments: Vec<Term>,
    },
    /// Components of a composite, reduced left to right.
    Collect {
        /// Values reduced so far.
        done:     Vec<Term>,
        /// Components still to reduce.
        pending:  IntoIter<Term>,
        /// What to build from the values.
        assemble: Assemble,
    },
    /// The initializer of a definition.
    Memoize {
        /// The definition being reduced.
        def:              Rc<Definition>,
        /// Return the definition node (a `def` statement) rather than its
        /// value (a reference).
        yield_definition: bool,
    },
    /// The target of a `print`.
    Print,
    /// The remaining statements of a sequence. The last one is reduced in
    /// tail position.
    Sequence {
        /// Statements after the one being reduced.
        pending: IntoIter<Term>,
    },
    /// The left operand of a binary combinator.
    BinaryLeft {
        /// The operator.
        op:    BinaryOperator,
        /// The unreduced right operand.
        right: Term,
    },
    /// The right operand of a binary combinator.
    BinaryRight {
        /// The operator.
        op:   BinaryOperator,
        /// The reduced left operand.
        left: Term,
    },
    /// The receiver of a member access.
    MemberReceiver {
        /// The requested field or columns.
        accessor: Accessor,
    },
    /// The source table of a query.
    QuerySource {
        /// Columns kept in the result.
        projection: Vec<String>,
        /// Row filter.
        predicate:  Term,
    },
    /// The left operand of a join.
    JoinLeft {
        /// The unreduced right operand.
        right:      Term,
        /// Row filter over the product.
        predicate:  Term,
        /// Optional columns kept in the result.
        projection: Option<Vec<String>>,
        /// Prefixes for colliding column names.
        qualifiers: (String, String),
    },
    /// The right operand of a join.
    JoinRight {
        /// The reduced left operand.
        left:       Table,
        /// Row filter over the product.
        predicate:  Term,
        /// Optional columns kept in the result.
        projection: Option<Vec<String>>,
        /// Prefixes for colliding column names.
        qualifiers: (String, String),
    },
    /// A predicate being decided for one row of a selection. The frame
    /// re-pushes itself for each remaining row.
    Filter(Selection),
}

/// The state of a selection in progress.
#[derive(Debug)]
pub struct Selection {
    /// The schema of the table being filtered.
    pub schema:     Vec<Column>,
    /// The row whose predicate is being reduced.
    pub current:    Row,
    /// Rows not yet decided.
    pub pending:    IntoIter<Row>,
    /// Rows kept so far.
    pub kept:       Vec<Row>,
    /// The unsubstituted predicate.
    pub predicate:  Term,
    /// Optional columns kept in the result.
    pub projection: Option<Vec<String>>,
}

impl Frame {
    /// The definition this frame is reducing, if any.
    pub fn pending_definition(&self) -> Option<&Rc<Definition>> {
        match self {
            Self::Memoize { def, .. } => Some(def),
            _ => None,
        }
    }
}
