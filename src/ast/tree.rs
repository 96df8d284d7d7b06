//! Stack-safe structural traversals of [`Term`].
//!
//! Terms nest as deeply as the programs that produce them, so cloning and
//! dropping walk the tree with an explicit work list instead of native
//! recursion. [`children`] and [`rebuild`] are the two halves every such walk
//! is written in terms of: one lists a node's direct subterms, the other puts
//! a node of the same shape back together from replacements.

use std::{rc::Rc, vec::IntoIter};

use super::{Field, Table, Term};

/// Moves the term out of `slot`, leaving `unit` behind.
pub(crate) fn take(slot: &mut Box<Term>) -> Term {
    std::mem::take(&mut **slot)
}

/// The direct subterms of `term`, in source order.
///
/// Table rows contribute their field values row by row. Definitions are
/// shared, not owned, so references and `def` statements have no children.
pub(crate) fn children(term: &Term) -> Vec<&Term> {
    match term {
        Term::Bool(_) | Term::Nat(_) | Term::Unit | Term::Var(_) | Term::Ref(_) | Term::Def(_) => Vec::new(),
        Term::Succ(t) | Term::Pred(t) | Term::IsZero(t) | Term::Not(t) | Term::Print(t) => vec![&**t],
        Term::Abs { body, .. } | Term::Fn { body, .. } => vec![&**body],
        Term::If { condition,
                   then_branch,
                   else_branch, } => vec![&**condition, &**then_branch, &**else_branch],
        Term::App { function, argument } => vec![&**function, &**argument],
        Term::Call { function, arguments } => std::iter::once(&**function).chain(arguments).collect(),
        Term::Seq(terms) | Term::Tuple(terms) => terms.iter().collect(),
        Term::Binary { left, right, .. } => vec![&**left, &**right],
        Term::Record(fields) => fields.iter().map(|f| &f.value).collect(),
        Term::Table(table) => table.rows.iter().flatten().map(|f| &f.value).collect(),
        Term::Member { receiver, .. } => vec![&**receiver],
        Term::Query { source, predicate, .. } => vec![&**source, &**predicate],
        Term::Join { left,
                     right,
                     predicate,
                     .. } => vec![&**left, &**right, &**predicate],
    }
}

/// Moves the direct subterms out of `term`, in the order of [`children`].
/// Every slot left behind holds `unit`.
fn detach(term: &mut Term) -> Vec<Term> {
    match term {
        Term::Bool(_) | Term::Nat(_) | Term::Unit | Term::Var(_) | Term::Ref(_) | Term::Def(_) => Vec::new(),
        Term::Succ(t) | Term::Pred(t) | Term::IsZero(t) | Term::Not(t) | Term::Print(t) => vec![take(t)],
        Term::Abs { body, .. } | Term::Fn { body, .. } => vec![take(body)],
        Term::If { condition,
                   then_branch,
                   else_branch, } => vec![take(condition), take(then_branch), take(else_branch)],
        Term::App { function, argument } => vec![take(function), take(argument)],
        Term::Call { function, arguments } => {
            let mut detached = vec![take(function)];
            detached.append(arguments);
            detached
        },
        Term::Seq(terms) | Term::Tuple(terms) => std::mem::take(terms),
        Term::Binary { left, right, .. } => vec![take(left), take(right)],
        Term::Record(fields) => fields.drain(..).map(|f| f.value).collect(),
        Term::Table(table) => table.rows.drain(..).flatten().map(|f| f.value).collect(),
        Term::Member { receiver, .. } => vec![take(receiver)],
        Term::Query { source, predicate, .. } => vec![take(source), take(predicate)],
        Term::Join { left,
                     right,
                     predicate,
                     .. } => vec![take(left), take(right), take(predicate)],
    }
}

fn next(subterms: &mut IntoIter<Term>) -> Box<Term> {
    Box::new(subterms.next().unwrap_or_default())
}

/// Builds a node shaped like `shape` whose subterms are `subterms`, given in
/// the order of [`children`].
///
/// Everything that is not a subterm (names, types, operators, schemas,
/// accessors, projections and shared definitions) is copied from `shape`.
pub(crate) fn rebuild(shape: &Term, subterms: Vec<Term>) -> Term {
    let mut subterms = subterms.into_iter();
    let s = &mut subterms;
    match shape {
        Term::Bool(b) => Term::Bool(*b),
        Term::Nat(n) => Term::Nat(n.clone()),
        Term::Unit => Term::Unit,
        Term::Var(name) => Term::Var(name.clone()),
        Term::Ref(def) => Term::Ref(Rc::clone(def)),
        Term::Def(def) => Term::Def(Rc::clone(def)),
        Term::Succ(_) => Term::Succ(next(s)),
        Term::Pred(_) => Term::Pred(next(s)),
        Term::IsZero(_) => Term::IsZero(next(s)),
        Term::Not(_) => Term::Not(next(s)),
        Term::Print(_) => Term::Print(next(s)),
        Term::Abs { param, ty, .. } => Term::Abs { param: param.clone(),
                                                   ty:    ty.clone(),
                                                   body:  next(s), },
        Term::Fn { params, .. } => Term::Fn { params: params.clone(),
                                              body:   next(s), },
        Term::If { .. } => Term::If { condition:   next(s),
                                      then_branch: next(s),
                                      else_branch: next(s), },
        Term::App { .. } => Term::App { function: next(s),
                                        argument: next(s), },
        Term::Call { .. } => Term::Call { function:  next(s),
                                          arguments: s.collect(), },
        Term::Seq(_) => Term::Seq(s.collect()),
        Term::Tuple(_) => Term::Tuple(s.collect()),
        Term::Binary { op, .. } => Term::Binary { op:    *op,
                                                  left:  next(s),
                                                  right: next(s), },
        Term::Record(fields) => Term::Record(refill(fields, s)),
        Term::Table(table) => {
            let rows = table.rows.iter().map(|row| refill(row, s)).collect();
            Term::Table(Table::new(table.schema.clone(), rows))
        },
        Term::Member { accessor, .. } => Term::Member { receiver: next(s),
                                                        accessor: accessor.clone(), },
        Term::Query { projection, .. } => Term::Query { projection: projection.clone(),
                                                        source:     next(s),
                                                        predicate:  next(s), },
        Term::Join { projection, .. } => Term::Join { left:       next(s),
                                                      right:      next(s),
                                                      predicate:  next(s),
                                                      projection: projection.clone(), },
    }
}

fn refill(fields: &[Field], subterms: &mut IntoIter<Term>) -> Vec<Field> {
    fields.iter()
          .map(|f| Field { name:  f.name.clone(),
                           value: subterms.next().unwrap_or_default(), })
          .collect()
}

enum Visit<'t> {
    Enter(&'t Term),
    Leave(&'t Term, usize),
}

/// Copies `term` bottom-up.
pub(crate) fn deep_clone(term: &Term) -> Term {
    let mut work = vec![Visit::Enter(term)];
    let mut built: Vec<Term> = Vec::new();

    while let Some(visit) = work.pop() {
        match visit {
            Visit::Enter(node) => {
                let subterms = children(node);
                work.push(Visit::Leave(node, subterms.len()));
                work.extend(subterms.into_iter().rev().map(Visit::Enter));
            },
            Visit::Leave(node, count) => {
                let subterms = built.split_off(built.len().saturating_sub(count));
                built.push(rebuild(node, subterms));
            },
        }
    }

    built.pop().unwrap_or_default()
}

/// Takes `term` apart one level at a time so that no drop recurses deeper
/// than a single node.
pub(crate) fn dismantle(term: &mut Term) {
    let mut pending = detach(term);
    while let Some(mut node) = pending.pop() {
        pending.append(&mut detach(&mut node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Accessor, BinaryOperator, Column, Type};

    fn tower(depth: usize) -> Term {
        (0..depth).fold(Term::nat(0), |t, _| Term::succ(t))
    }

    #[test]
    fn children_follow_source_order() {
        let term = Term::if_then_else(Term::Bool(true), Term::nat(1), Term::nat(2));
        let kinds: Vec<_> = children(&term).into_iter().map(ToString::to_string).collect();
        assert_eq!(kinds, ["true", "1", "2"]);

        let join = Term::Join { left:       Box::new(Term::var("l")),
                                right:      Box::new(Term::var("r")),
                                predicate:  Box::new(Term::Bool(true)),
                                projection: Some(vec!["a".into()]), };
        assert_eq!(children(&join).len(), 3);
    }

    #[test]
    fn rebuild_keeps_everything_but_subterms() {
        let table = Term::Table(Table::new(vec![Column::new("a", Type::Nat)],
                                           vec![vec![Field::new("a", Term::var("x"))],
                                                vec![Field::new("a", Term::var("y"))]]));
        let rebuilt = rebuild(&table, vec![Term::nat(1), Term::nat(2)]);
        assert_eq!(rebuilt.to_string(), "table {a: Nat} [{a = 1}, {a = 2}]");

        let member = Term::Member { receiver: Box::new(Term::var("r")),
                                    accessor: Accessor::Field("a".into()), };
        assert_eq!(rebuild(&member, vec![Term::var("s")]).to_string(), "s.a");

        let binary = Term::binary(BinaryOperator::Union, Term::var("a"), Term::var("b"));
        assert_eq!(rebuild(&binary, vec![Term::var("c"), Term::var("d")]).to_string(), "c union d");
    }

    #[test]
    fn deep_terms_clone_and_drop() {
        let deep = tower(200_000);
        let copy = deep.clone();
        assert_eq!(children(&copy).len(), 1);
        drop(deep);
        drop(copy);
    }

    #[test]
    fn dismantle_leaves_unit_slots() {
        let mut term = Term::app(Term::var("f"), tower(3));
        dismantle(&mut term);
        assert_eq!(term, Term::app(Term::Unit, Term::Unit));
    }
}
