use std::{
    cell::{Cell, OnceCell},
    fmt,
    rc::Rc,
};

use num_bigint::BigUint;

pub(crate) mod tree;

/// A term of the calculus.
///
/// `Term` is the closed set of shapes the reduction engine understands. Terms
/// are produced by the parser (or built directly by library users), consumed
/// read-only by the evaluator, and rebuilt freshly by substitution and
/// reduction. The only interior mutability lives in [`Definition`], whose
/// reduced value is cached exactly once.
///
/// Values are the terms reduction leaves unchanged: booleans, naturals, unit,
/// abstractions, function values, and records, tables and tuples whose
/// components are values.
///
/// Cloning and dropping never recurse on the native stack, so a term may nest
/// arbitrarily deep.
#[derive(Debug, Default, PartialEq)]
pub enum Term {
    /// A boolean literal: `true` or `false`.
    Bool(bool),
    /// An arbitrary-precision natural number literal.
    Nat(BigUint),
    /// The trivial value, written `unit`.
    #[default]
    Unit,
    /// A bound name (abstraction or function parameter, or a column
    /// referenced by a table predicate).
    Var(String),
    /// Conditional expression (`if c then a else b`).
    If {
        /// Must reduce to a boolean literal.
        condition:   Box<Self>,
        /// Reduced when the condition is `true`.
        then_branch: Box<Self>,
        /// Reduced when the condition is `false`.
        else_branch: Box<Self>,
    },
    /// Successor of a natural (`succ t`).
    Succ(Box<Self>),
    /// Saturating predecessor of a natural (`pred t`).
    Pred(Box<Self>),
    /// Zero test (`iszero t`).
    IsZero(Box<Self>),
    /// Single-parameter abstraction (`\x:T. body`).
    Abs {
        /// The bound name.
        param: String,
        /// Declared type of the bound name.
        ty:    Type,
        /// The body, which may reference `param` freely.
        body:  Box<Self>,
    },
    /// Application of an abstraction to one argument (`f x`).
    App {
        /// Must reduce to an abstraction.
        function: Box<Self>,
        /// The argument, reduced before substitution.
        argument: Box<Self>,
    },
    /// Multi-parameter function value (`fn(x: Nat, y: Nat) => body`).
    Fn {
        /// Named, typed parameters.
        params: Vec<Param>,
        /// The body.
        body:   Box<Self>,
    },
    /// Call of a function value with an ordered argument list (`f[a, b]`).
    Call {
        /// Must reduce to a function value.
        function:  Box<Self>,
        /// Arguments, reduced left to right.
        arguments: Vec<Self>,
    },
    /// Reference to a prior definition.
    Ref(Rc<Definition>),
    /// A definition statement (`def x = t` or `type T = ...`).
    Def(Rc<Definition>),
    /// Print statement. Always reduces to `unit`.
    Print(Box<Self>),
    /// Statement sequence (`do { s1; s2 }`). Its value is the last value.
    Seq(Vec<Self>),
    /// Tuple (`(a, b)`).
    Tuple(Vec<Self>),
    /// Logical negation (`not t`).
    Not(Box<Self>),
    /// Binary combinator: logic, comparison or table set algebra.
    Binary {
        /// The operator.
        op:    BinaryOperator,
        /// Left operand.
        left:  Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },
    /// Record literal (`{a = 1, b = true}`).
    Record(Vec<Field>),
    /// Table literal.
    Table(Table),
    /// Member access on a record or table (`r.a`, `t.{a, b}`).
    Member {
        /// A record or a table.
        receiver: Box<Self>,
        /// Field name or column list.
        accessor: Accessor,
    },
    /// Query: `select {cols} from source where predicate`.
    Query {
        /// Columns kept in the result.
        projection: Vec<String>,
        /// Must reduce to a table.
        source:     Box<Self>,
        /// Evaluated once per row with the row's fields substituted in.
        predicate:  Box<Self>,
    },
    /// Join: `join l with r on predicate [project {cols}]`.
    Join {
        /// Left table.
        left:       Box<Self>,
        /// Right table.
        right:      Box<Self>,
        /// Evaluated once per row of the product.
        predicate:  Box<Self>,
        /// Optional columns kept in the result.
        projection: Option<Vec<String>>,
    },
}

impl Term {
    /// Builds a natural number literal.
    ///
    /// ## Example
    /// ```
    /// use tabula::ast::Term;
    ///
    /// assert_eq!(Term::nat(3).to_string(), "3");
    /// ```
    #[must_use]
    pub fn nat(n: u64) -> Self {
        Self::Nat(BigUint::from(n))
    }

    /// Builds a `Var` term.
    #[must_use]
    pub fn var(name: &str) -> Self {
        Self::Var(name.to_string())
    }

    /// Wraps a term in `succ`.
    #[must_use]
    pub fn succ(t: Self) -> Self {
        Self::Succ(Box::new(t))
    }

    /// Wraps a term in `pred`.
    #[must_use]
    pub fn pred(t: Self) -> Self {
        Self::Pred(Box::new(t))
    }

    /// Wraps a term in `iszero`.
    #[must_use]
    pub fn iszero(t: Self) -> Self {
        Self::IsZero(Box::new(t))
    }

    /// Wraps a term in `not`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(t: Self) -> Self {
        Self::Not(Box::new(t))
    }

    /// Builds `if condition then then_branch else else_branch`.
    #[must_use]
    pub fn if_then_else(condition: Self, then_branch: Self, else_branch: Self) -> Self {
        Self::If { condition:   Box::new(condition),
                   then_branch: Box::new(then_branch),
                   else_branch: Box::new(else_branch), }
    }

    /// Builds `\param:ty. body`.
    #[must_use]
    pub fn abs(param: &str, ty: Type, body: Self) -> Self {
        Self::Abs { param: param.to_string(),
                    ty,
                    body: Box::new(body) }
    }

    /// Builds the application `function argument`.
    #[must_use]
    pub fn app(function: Self, argument: Self) -> Self {
        Self::App { function: Box::new(function),
                    argument: Box::new(argument), }
    }

    /// Builds a binary combinator.
    #[must_use]
    pub fn binary(op: BinaryOperator, left: Self, right: Self) -> Self {
        Self::Binary { op,
                       left: Box::new(left),
                       right: Box::new(right) }
    }

    /// Wraps a term in `print`.
    #[must_use]
    pub fn print(t: Self) -> Self {
        Self::Print(Box::new(t))
    }

    /// A short name for the term's variant, used in trace output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Nat(_) => "nat",
            Self::Unit => "unit",
            Self::Var(_) => "var",
            Self::If { .. } => "if",
            Self::Succ(_) => "succ",
            Self::Pred(_) => "pred",
            Self::IsZero(_) => "iszero",
            Self::Abs { .. } => "abs",
            Self::App { .. } => "app",
            Self::Fn { .. } => "fn",
            Self::Call { .. } => "call",
            Self::Ref(_) => "ref",
            Self::Def(_) => "def",
            Self::Print(_) => "print",
            Self::Seq(_) => "seq",
            Self::Tuple(_) => "tuple",
            Self::Not(_) => "not",
            Self::Binary { .. } => "binary",
            Self::Record(_) => "record",
            Self::Table(_) => "table",
            Self::Member { .. } => "member",
            Self::Query { .. } => "query",
            Self::Join { .. } => "join",
        }
    }

    /// Returns the definition this term refers to when it is a reference to a
    /// type-level declaration.
    ///
    /// Such references have no value; only `print` accepts them.
    #[must_use]
    pub fn type_reference(&self) -> Option<&Rc<Definition>> {
        match self {
            Self::Ref(def) if matches!(def.binding(), Some(Binding::Type(_))) => Some(def),
            _ => None,
        }
    }
}

impl Clone for Term {
    fn clone(&self) -> Self {
        tree::deep_clone(self)
    }
}

impl Drop for Term {
    fn drop(&mut self) {
        tree::dismantle(self);
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for Term {
    fn from(value: u64) -> Self {
        Self::nat(value)
    }
}

impl From<BigUint> for Term {
    fn from(value: BigUint) -> Self {
        Self::Nat(value)
    }
}

impl From<Table> for Term {
    fn from(value: Table) -> Self {
        Self::Table(value)
    }
}

/// What a definition binds its name to.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// A term-valued definition (`def x = t`).
    Term(Term),
    /// A type-level declaration (`type T = ...`).
    Type(Type),
}

/// A named definition with a write-once cache of its reduced value.
///
/// Definitions are shared by identity: every [`Term::Ref`] that names a
/// definition holds the same `Rc`. The binding is set once, after the
/// definition has been registered in scope, which is what allows a
/// definition's initializer to refer to itself. The cache is written the first
/// time the initializer is reduced and read by every later reference.
pub struct Definition {
    /// The defined name.
    pub name: String,
    binding:  OnceCell<Binding>,
    cache:    OnceCell<Term>,
    pending:  Cell<bool>,
}

impl Definition {
    /// Creates a definition whose binding will be supplied later with
    /// [`Definition::bind`].
    #[must_use]
    pub fn declare(name: &str) -> Rc<Self> {
        Rc::new(Self { name:    name.to_string(),
                       binding: OnceCell::new(),
                       cache:   OnceCell::new(),
                       pending: Cell::new(false), })
    }

    /// Creates a term-valued definition.
    ///
    /// ## Example
    /// ```
    /// use tabula::ast::{Binding, Definition, Term};
    ///
    /// let def = Definition::with_term("x", Term::nat(1));
    /// assert_eq!(def.binding(), Some(&Binding::Term(Term::nat(1))));
    /// assert!(def.cached().is_none());
    /// ```
    #[must_use]
    pub fn with_term(name: &str, term: Term) -> Rc<Self> {
        let def = Self::declare(name);
        def.bind(Binding::Term(term));
        def
    }

    /// Creates a type-level declaration.
    #[must_use]
    pub fn with_type(name: &str, ty: Type) -> Rc<Self> {
        let def = Self::declare(name);
        def.bind(Binding::Type(ty));
        def
    }

    /// Sets the binding. Later calls are ignored.
    pub fn bind(&self, binding: Binding) {
        let _ = self.binding.set(binding);
    }

    /// The binding, if one has been supplied.
    #[must_use]
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.get()
    }

    /// The memoized value, if the initializer has been reduced.
    #[must_use]
    pub fn cached(&self) -> Option<&Term> {
        self.cache.get()
    }

    /// Stores the reduced value. Only the first write takes effect.
    pub(crate) fn memoize(&self, value: Term) {
        let _ = self.cache.set(value);
        self.pending.set(false);
    }

    /// Whether the initializer is currently being reduced.
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.get()
    }

    pub(crate) fn set_pending(&self) {
        self.pending.set(true);
    }

    /// Clears the in-progress flag after a reduction was abandoned.
    pub(crate) fn release(&self) {
        self.pending.set(false);
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
         .field("name", &self.name)
         .field("memoized", &self.cache.get().is_some())
         .finish_non_exhaustive()
    }
}

// Definitions compare by identity.
impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

/// A named field of a record or table row.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Field name.
    pub name:  String,
    /// Field value.
    pub value: Term,
}

impl Field {
    /// Creates a field.
    #[must_use]
    pub fn new(name: &str, value: Term) -> Self {
        Self { name: name.to_string(),
               value }
    }
}

/// A table row: one field per schema column.
pub type Row = Vec<Field>;

/// A column descriptor of a table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Column type.
    pub ty:   Type,
}

impl Column {
    /// Creates a column descriptor.
    #[must_use]
    pub fn new(name: &str, ty: Type) -> Self {
        Self { name: name.to_string(),
               ty }
    }
}

/// A named, typed function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub ty:   Type,
}

impl Param {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: &str, ty: Type) -> Self {
        Self { name: name.to_string(),
               ty }
    }
}

/// A table value: an ordered schema and an ordered list of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Ordered column descriptors.
    pub schema: Vec<Column>,
    /// Ordered rows, each conforming to `schema`.
    pub rows:   Vec<Row>,
}

impl Table {
    /// Creates a table.
    #[must_use]
    pub const fn new(schema: Vec<Column>, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    /// Column names, in schema order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.schema.iter().map(|c| c.name.as_str())
    }
}

/// The accessor of a member access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// A single name (`r.a`).
    Field(String),
    /// A list of names (`t.{a, b}`).
    Columns(Vec<String>),
}

/// Types, carried by abstractions, parameters, schemas and type declarations.
///
/// The evaluator never inspects types; they exist for declarations and for
/// rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// `Bool`
    Bool,
    /// `Nat`
    Nat,
    /// `Unit`
    Unit,
    /// A reference to a declared type by name.
    Named(String),
    /// `T -> U`
    Arrow(Box<Self>, Box<Self>),
    /// `(T, U) -> V`
    Function(Vec<Self>, Box<Self>),
    /// `{a: T, b: U}`
    Record(Vec<Column>),
    /// `table {a: T, b: U}`
    Table(Vec<Column>),
}

/// Represents a binary combinator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Logical and (`and`)
    And,
    /// Logical or (`or`)
    Or,
    /// Structural equality (`==`)
    Equal,
    /// Structural ordering (`<`)
    Less,
    /// Table union (`union`)
    Union,
    /// Table intersection (`intersect`)
    Intersect,
    /// Table difference (`except`)
    Except,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOperator::{And, Equal, Except, Intersect, Less, Or, Union};
        let operator = match self {
            And => "and",
            Or => "or",
            Equal => "==",
            Less => "<",
            Union => "union",
            Intersect => "intersect",
            Except => "except",
        };
        write!(f, "{operator}")
    }
}
