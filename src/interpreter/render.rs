use std::{borrow::Cow, fmt};

use crate::ast::{Accessor, Binding, Column, Field, Term, Type};

/// Joins rendered items with `", "`.
fn list<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    items.iter().map(render).collect::<Vec<_>>().join(", ")
}

fn columns(columns: &[Column]) -> String {
    format!("{{{}}}", list(columns, |c| format!("{}: {}", c.name, c.ty)))
}

fn names(names: &[String]) -> String {
    format!("{{{}}}", names.join(", "))
}

/// Terms that never need parentheses as an operand.
const fn is_atomic(term: &Term) -> bool {
    matches!(term,
             Term::Bool(_)
             | Term::Nat(_)
             | Term::Unit
             | Term::Var(_)
             | Term::Ref(_)
             | Term::Tuple(_)
             | Term::Record(_)
             | Term::Table(_)
             | Term::Seq(_)
             | Term::Member { .. }
             | Term::Call { .. })
}

const fn is_prefix(term: &Term) -> bool {
    matches!(term,
             Term::Succ(_) | Term::Pred(_) | Term::IsZero(_) | Term::Not(_))
}

/// One piece of rendered output: literal text, or a subterm still to render.
enum Piece<'t> {
    Text(Cow<'t, str>),
    Term(&'t Term),
}

impl<'t> From<&'t str> for Piece<'t> {
    fn from(text: &'t str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl From<String> for Piece<'_> {
    fn from(text: String) -> Self {
        Self::Text(Cow::Owned(text))
    }
}

/// Output pieces for one node, left to right.
struct Pieces<'t>(Vec<Piece<'t>>);

impl<'t> Pieces<'t> {
    fn text(&mut self, text: impl Into<Piece<'t>>) -> &mut Self {
        self.0.push(text.into());
        self
    }

    fn term(&mut self, term: &'t Term) -> &mut Self {
        self.0.push(Piece::Term(term));
        self
    }

    /// `term` as an operand, parenthesized unless `bare` holds.
    fn operand(&mut self, term: &'t Term, bare: bool) -> &mut Self {
        if bare {
            self.term(term)
        } else {
            self.text("(").term(term).text(")")
        }
    }

    /// `terms` separated by `", "`.
    fn terms(&mut self, terms: &'t [Term]) -> &mut Self {
        for (index, term) in terms.iter().enumerate() {
            if index > 0 {
                self.text(", ");
            }
            self.term(term);
        }
        self
    }

    fn fields(&mut self, fields: &'t [Field]) -> &mut Self {
        self.text("{");
        for (index, field) in fields.iter().enumerate() {
            if index > 0 {
                self.text(", ");
            }
            self.text(field.name.as_str()).text(" = ").term(&field.value);
        }
        self.text("}")
    }
}

/// Splits one node into text and subterms.
fn expand(term: &Term) -> Vec<Piece<'_>> {
    let mut out = Pieces(Vec::new());
    match term {
        Term::Bool(b) => {
            out.text(b.to_string());
        },
        Term::Nat(n) => {
            out.text(n.to_string());
        },
        Term::Unit => {
            out.text("unit");
        },
        Term::Var(name) => {
            out.text(name.as_str());
        },
        Term::If { condition,
                   then_branch,
                   else_branch, } => {
            out.text("if ")
               .term(condition)
               .text(" then ")
               .term(then_branch)
               .text(" else ")
               .term(else_branch);
        },
        Term::Succ(t) | Term::Pred(t) | Term::IsZero(t) | Term::Not(t) => {
            let keyword = match term {
                Term::Succ(_) => "succ ",
                Term::Pred(_) => "pred ",
                Term::IsZero(_) => "iszero ",
                _ => "not ",
            };
            out.text(keyword)
               .operand(t, is_atomic(t) || is_prefix(t) || matches!(**t, Term::App { .. }));
        },
        Term::Abs { param, ty, body } => {
            out.text(format!("\\{param}:{ty}. ")).term(body);
        },
        Term::App { function, argument } => {
            out.operand(function, is_atomic(function) || matches!(**function, Term::App { .. }))
               .text(" ")
               .operand(argument, is_atomic(argument));
        },
        Term::Fn { params, body } => {
            out.text(format!("fn({}) => ", list(params, |p| format!("{}: {}", p.name, p.ty))))
               .term(body);
        },
        Term::Call { function, arguments } => {
            out.operand(function, is_atomic(function))
               .text("[")
               .terms(arguments)
               .text("]");
        },
        Term::Ref(def) => {
            out.text(def.name.as_str());
        },
        Term::Def(def) => match def.binding() {
            Some(Binding::Type(ty)) => {
                out.text(format!("type {} = {ty}", def.name));
            },
            Some(Binding::Term(initializer)) => {
                out.text(format!("def {} = ", def.name))
                   .term(def.cached().unwrap_or(initializer));
            },
            None => {
                out.text(format!("def {}", def.name));
            },
        },
        Term::Print(t) => {
            out.text("print ").term(t);
        },
        Term::Seq(statements) => {
            out.text("do {");
            for (index, statement) in statements.iter().enumerate() {
                out.text(if index == 0 { " " } else { "; " }).term(statement);
            }
            out.text(" }");
        },
        Term::Tuple(elements) => {
            out.text("(").terms(elements).text(")");
        },
        Term::Binary { op, left, right } => {
            let bare = |t: &Term| is_atomic(t) || is_prefix(t) || matches!(t, Term::App { .. });
            out.operand(left, bare(left))
               .text(format!(" {op} "))
               .operand(right, bare(right));
        },
        Term::Record(fields) => {
            out.fields(fields);
        },
        Term::Table(table) => {
            out.text(format!("table {} [", columns(&table.schema)));
            for (index, row) in table.rows.iter().enumerate() {
                if index > 0 {
                    out.text(", ");
                }
                out.fields(row);
            }
            out.text("]");
        },
        Term::Member { receiver, accessor } => {
            out.operand(receiver, is_atomic(receiver));
            match accessor {
                Accessor::Field(name) => out.text(format!(".{name}")),
                Accessor::Columns(columns) => out.text(format!(".{}", names(columns))),
            };
        },
        Term::Query { projection,
                      source,
                      predicate, } => {
            out.text(format!("select {} from ", names(projection)))
               .term(source)
               .text(" where ")
               .term(predicate);
        },
        Term::Join { left,
                     right,
                     predicate,
                     projection, } => {
            out.text("join ")
               .term(left)
               .text(" with ")
               .term(right)
               .text(" on ")
               .term(predicate);
            if let Some(columns) = projection {
                out.text(format!(" project {}", names(columns)));
            }
        },
    }
    out.0
}

/// Renders terms in the concrete syntax accepted by the parser.
///
/// This is the text `print` writes and the text error messages quote.
/// Operands are parenthesized where the grammar requires it. Nodes are
/// expanded from a work list, so deeply nested terms render without
/// recursion.
///
/// ## Example
/// ```
/// use tabula::ast::{Term, Type};
///
/// let id = Term::abs("x", Type::Nat, Term::succ(Term::var("x")));
/// assert_eq!(id.to_string(), "\\x:Nat. succ x");
///
/// let app = Term::app(id, Term::nat(3));
/// assert_eq!(app.to_string(), "(\\x:Nat. succ x) 3");
/// ```
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending = vec![Piece::Term(self)];
        while let Some(piece) = pending.pop() {
            match piece {
                Piece::Text(text) => f.write_str(&text)?,
                Piece::Term(term) => pending.extend(expand(term).into_iter().rev()),
            }
        }
        Ok(())
    }
}

/// Renders types in the concrete syntax accepted by the parser.
///
/// ## Example
/// ```
/// use tabula::ast::Type;
///
/// let ty = Type::Arrow(Box::new(Type::Arrow(Box::new(Type::Nat), Box::new(Type::Nat))),
///                      Box::new(Type::Bool));
/// assert_eq!(ty.to_string(), "(Nat -> Nat) -> Bool");
/// ```
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "Bool"),
            Self::Nat => write!(f, "Nat"),
            Self::Unit => write!(f, "Unit"),
            Self::Named(name) => write!(f, "{name}"),
            Self::Arrow(parameter, result) => {
                if matches!(**parameter, Self::Arrow(..) | Self::Function(..)) {
                    write!(f, "({parameter}) -> {result}")
                } else {
                    write!(f, "{parameter} -> {result}")
                }
            },
            Self::Function(parameters, result) => {
                write!(f, "({}) -> {result}", list(parameters, ToString::to_string))
            },
            Self::Record(fields) => write!(f, "{}", columns(fields)),
            Self::Table(fields) => write!(f, "table {}", columns(fields)),
        }
    }
}
