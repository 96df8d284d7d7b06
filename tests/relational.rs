use std::rc::Rc;

use tabula::{
    ast::{Accessor, BinaryOperator, Column, Definition, Field, Row, Table, Term, Type},
    error::RuntimeError,
    interpreter::{compare::equal, evaluator::core::Evaluator, value::expect_table},
};

fn reduce(term: Term) -> Result<Term, RuntimeError> {
    Evaluator::new(Vec::new()).reduce(term)
}

fn table(term: Term) -> Table {
    let value = reduce(term).unwrap_or_else(|e| panic!("reduction failed: {e}"));
    expect_table(value).unwrap_or_else(|e| panic!("{e}"))
}

fn ab_schema() -> Vec<Column> {
    vec![Column::new("a", Type::Nat), Column::new("b", Type::Nat)]
}

fn ab_row(a: u64, b: u64) -> Row {
    vec![Field::new("a", Term::nat(a)), Field::new("b", Term::nat(b))]
}

fn ab_table(rows: &[(u64, u64)]) -> Term {
    Term::Table(Table::new(ab_schema(), rows.iter().map(|&(a, b)| ab_row(a, b)).collect()))
}

fn set_op(op: BinaryOperator, left: Term, right: Term) -> Table {
    table(Term::binary(op, left, right))
}

fn contains(table: &Table, row: &Row) -> bool {
    table.rows
         .iter()
         .any(|r| equal(&Term::Record(r.clone()), &Term::Record(row.clone())))
}

fn same_rows(x: &Table, y: &Table) -> bool {
    x.rows.iter().all(|r| contains(y, r)) && y.rows.iter().all(|r| contains(x, r))
}

#[test]
fn scenario_set_operators_on_equal_tables() {
    let t = || ab_table(&[(1, 2)]);

    assert_eq!(set_op(BinaryOperator::Union, t(), t()).rows.len(), 1);
    assert_eq!(set_op(BinaryOperator::Intersect, t(), t()).rows.len(), 1);
    assert_eq!(set_op(BinaryOperator::Except, t(), t()).rows.len(), 0);
}

#[test]
fn union_is_idempotent_and_commutative_as_row_sets() {
    let x = ab_table(&[(1, 2), (3, 4), (1, 2)]);
    let y = ab_table(&[(3, 4), (5, 6)]);

    let xx = set_op(BinaryOperator::Union, x.clone(), x.clone());
    assert_eq!(xx.rows, vec![ab_row(1, 2), ab_row(3, 4)]);

    let xy = set_op(BinaryOperator::Union, x.clone(), y.clone());
    let yx = set_op(BinaryOperator::Union, y, x);
    assert!(same_rows(&xy, &yx));
    assert_eq!(xy.rows, vec![ab_row(1, 2), ab_row(3, 4), ab_row(5, 6)]);
}

#[test]
fn intersect_is_contained_in_both_sides() {
    let x = ab_table(&[(1, 2), (3, 4), (3, 4)]);
    let y = ab_table(&[(3, 4), (5, 6)]);

    let both = set_op(BinaryOperator::Intersect, x.clone(), y.clone());
    let (Term::Table(xt), Term::Table(yt)) = (&x, &y) else { unreachable!() };

    assert_eq!(both.rows, vec![ab_row(3, 4)]);
    assert!(both.rows.iter().all(|r| contains(&xt, r) && contains(&yt, r)));
}

#[test]
fn except_is_difference() {
    let x = ab_table(&[(1, 2), (3, 4), (1, 2)]);
    let y = ab_table(&[(3, 4)]);

    let diff = set_op(BinaryOperator::Except, x, y);
    assert_eq!(diff.rows, vec![ab_row(1, 2), ab_row(1, 2)]);
}

#[test]
fn set_operators_require_matching_schemas() {
    let other = Term::Table(Table::new(vec![Column::new("a", Type::Nat)], vec![]));
    assert!(matches!(reduce(Term::binary(BinaryOperator::Union, ab_table(&[]), other)),
                     Err(RuntimeError::SchemaMismatch { .. })));
    assert!(matches!(reduce(Term::binary(BinaryOperator::Except, ab_table(&[]), Term::nat(1))),
                     Err(RuntimeError::ExpectedTable { .. })));
}

#[test]
fn table_rows_are_put_in_schema_order() {
    let literal = Table::new(ab_schema(),
                             vec![vec![Field::new("b", Term::succ(Term::nat(1))), Field::new("a", Term::nat(1))]]);
    assert_eq!(table(Term::Table(literal)).rows, vec![ab_row(1, 2)]);

    let bad = Table::new(ab_schema(), vec![vec![Field::new("a", Term::nat(1))]]);
    assert!(matches!(reduce(Term::Table(bad)), Err(RuntimeError::SchemaMismatch { .. })));
}

#[test]
fn scenario_select() {
    let query = Term::Query { projection: vec!["a".to_string()],
                              source:     Box::new(ab_table(&[(1, 2), (3, 4)])),
                              predicate:  Box::new(Term::binary(BinaryOperator::Equal,
                                                                Term::var("b"),
                                                                Term::nat(2))), };
    let result = table(query);

    assert_eq!(result.schema, vec![Column::new("a", Type::Nat)]);
    assert_eq!(result.rows, vec![vec![Field::new("a", Term::nat(1))]]);
}

#[test]
fn selection_is_sound_and_complete() {
    let rows = [(1, 5), (2, 2), (3, 9), (4, 4), (5, 0)];
    // a < b
    let predicate = Term::binary(BinaryOperator::Less, Term::var("a"), Term::var("b"));
    let query = Term::Query { projection: vec!["a".to_string(), "b".to_string()],
                              source:     Box::new(ab_table(&rows)),
                              predicate:  Box::new(predicate), };
    let result = table(query);

    let expected: Vec<Row> = rows.iter().filter(|(a, b)| a < b).map(|&(a, b)| ab_row(a, b)).collect();
    assert_eq!(result.rows, expected);
}

#[test]
fn selection_predicate_must_be_boolean() {
    let query = Term::Query { projection: vec!["a".to_string()],
                              source:     Box::new(ab_table(&[(1, 2)])),
                              predicate:  Box::new(Term::var("a")), };
    assert!(matches!(reduce(query), Err(RuntimeError::ExpectedBoolean { .. })));
}

#[test]
fn join_is_left_major_and_qualifies_collisions() {
    let left = Definition::with_term("l", ab_table(&[(1, 10), (2, 20)]));
    let right = Table::new(vec![Column::new("a", Type::Nat), Column::new("c", Type::Bool)],
                           vec![vec![Field::new("a", Term::nat(7)), Field::new("c", Term::Bool(true))],
                                vec![Field::new("a", Term::nat(8)), Field::new("c", Term::Bool(false))]]);
    let join = Term::Join { left:       Box::new(Term::Ref(Rc::clone(&left))),
                            right:      Box::new(Term::Table(right)),
                            predicate:  Box::new(Term::Bool(true)),
                            projection: None, };
    let result = table(join);

    let names: Vec<&str> = result.column_names().collect();
    assert_eq!(names, ["l_a", "b", "right_a", "c"]);

    let firsts: Vec<(Term, Term)> = result.rows
                                          .iter()
                                          .map(|r| (r[0].value.clone(), r[2].value.clone()))
                                          .collect();
    assert_eq!(firsts,
               vec![(Term::nat(1), Term::nat(7)),
                    (Term::nat(1), Term::nat(8)),
                    (Term::nat(2), Term::nat(7)),
                    (Term::nat(2), Term::nat(8)),]);
}

#[test]
fn self_join_under_one_name_collides() {
    let t = Definition::with_term("t", ab_table(&[(1, 2)]));
    let join = Term::Join { left:       Box::new(Term::Ref(Rc::clone(&t))),
                            right:      Box::new(Term::Ref(Rc::clone(&t))),
                            predicate:  Box::new(Term::Bool(true)),
                            projection: None, };
    assert!(matches!(reduce(join), Err(RuntimeError::DuplicateColumn { .. })));
}

#[test]
fn join_filters_and_projects() {
    let left = ab_table(&[(1, 10), (2, 20)]);
    let right = Term::Table(Table::new(vec![Column::new("k", Type::Nat)],
                                       vec![vec![Field::new("k", Term::nat(2))]]));
    let join = Term::Join { left:       Box::new(left),
                            right:      Box::new(right),
                            predicate:  Box::new(Term::binary(BinaryOperator::Equal, Term::var("a"), Term::var("k"))),
                            projection: Some(vec!["b".to_string()]), };

    let result = table(join);
    assert_eq!(result.rows, vec![vec![Field::new("b", Term::nat(20))]]);
}

#[test]
fn member_access() {
    let record = Term::Record(vec![Field::new("x", Term::nat(1)), Field::new("y", Term::Bool(true))]);
    let member = |receiver: Term, accessor| reduce(Term::Member { receiver: Box::new(receiver),
                                                                  accessor });

    assert_eq!(member(record.clone(), Accessor::Field("y".into())).ok(), Some(Term::Bool(true)));
    assert_eq!(member(record.clone(), Accessor::Columns(vec!["y".into()])).ok(),
               Some(Term::Record(vec![Field::new("y", Term::Bool(true))])));
    assert!(matches!(member(record, Accessor::Field("z".into())),
                     Err(RuntimeError::UnknownField { .. })));

    let projected = member(ab_table(&[(1, 2), (1, 3)]), Accessor::Field("a".into()))
        .and_then(expect_table)
        .expect("a projected table");
    assert_eq!(projected.rows.len(), 2);
    assert!(matches!(member(ab_table(&[]), Accessor::Columns(vec!["a".into(), "a".into()])),
                     Err(RuntimeError::DuplicateColumn { .. })));
    assert!(matches!(member(Term::nat(1), Accessor::Field("a".into())),
                     Err(RuntimeError::ExpectedRecordOrTable { .. })));
}

#[test]
fn binary_routines_reject_foreign_operators() {
    type E = Evaluator<Vec<u8>>;

    let t = expect_table(ab_table(&[(1, 2)])).expect("a table literal");
    assert!(matches!(E::eval_set_op(BinaryOperator::And, t.clone(), &t),
                     Err(RuntimeError::OperatorMismatch { .. })));
    assert!(matches!(E::eval_set_op(BinaryOperator::Less, t.clone(), &t),
                     Err(RuntimeError::OperatorMismatch { .. })));

    let one = Term::nat(1);
    assert!(matches!(E::eval_comparison(BinaryOperator::Or, &one, &one),
                     Err(RuntimeError::OperatorMismatch { .. })));
    assert!(matches!(E::eval_comparison(BinaryOperator::Union, &one, &one),
                     Err(RuntimeError::OperatorMismatch { .. })));

    let yes = Term::Bool(true);
    assert!(matches!(E::eval_logic(BinaryOperator::Equal, &yes, &yes),
                     Err(RuntimeError::OperatorMismatch { .. })));
    assert!(matches!(E::eval_logic(BinaryOperator::Except, &yes, &yes),
                     Err(RuntimeError::OperatorMismatch { .. })));

    // Each family still evaluates its own operators.
    assert_eq!(E::eval_set_op(BinaryOperator::Except, t.clone(), &t).map(|r| r.rows.len()).ok(), Some(0));
    assert_eq!(E::eval_comparison(BinaryOperator::Less, &one, &one).ok(), Some(Term::Bool(false)));
    assert_eq!(E::eval_logic(BinaryOperator::And, &yes, &yes).ok(), Some(yes.clone()));
}
