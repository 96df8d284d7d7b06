use std::rc::Rc;

use tabula::{
    ast::{BinaryOperator, Binding, Definition, Param, Term, Type},
    error::RuntimeError,
    interpreter::{
        compare::equal,
        evaluator::core::{EvalConfig, Evaluator},
        subst::{free_vars, substitute},
    },
};

fn reduce(term: Term) -> Result<Term, RuntimeError> {
    Evaluator::new(Vec::new()).reduce(term)
}

fn value(term: Term) -> Term {
    reduce(term).unwrap_or_else(|e| panic!("reduction failed: {e}"))
}

fn printed(terms: Vec<Term>) -> String {
    let mut evaluator = Evaluator::new(Vec::new());
    for term in terms {
        evaluator.reduce(term).unwrap_or_else(|e| panic!("reduction failed: {e}"));
    }
    String::from_utf8(evaluator.into_output()).expect("print output is UTF-8")
}

fn seq(statements: Vec<Term>) -> Term {
    Term::Seq(statements)
}

#[test]
fn values_reduce_to_themselves() {
    let values = [Term::Bool(true),
                  Term::nat(7),
                  Term::Unit,
                  Term::abs("x", Type::Nat, Term::var("x")),
                  Term::Tuple(vec![Term::nat(1), Term::Bool(false)])];

    for v in values {
        assert_eq!(value(v.clone()), v);
    }
}

#[test]
fn arithmetic() {
    assert_eq!(value(Term::succ(Term::nat(41))), Term::nat(42));
    assert_eq!(value(Term::pred(Term::nat(1))), Term::nat(0));
    assert_eq!(value(Term::pred(Term::nat(0))), Term::nat(0));
    assert_eq!(value(Term::iszero(Term::pred(Term::nat(1)))), Term::Bool(true));
    assert_eq!(value(Term::iszero(Term::nat(3))), Term::Bool(false));
}

#[test]
fn arithmetic_rejects_non_naturals() {
    assert!(matches!(reduce(Term::succ(Term::Bool(true))),
                     Err(RuntimeError::ExpectedNatural { .. })));
    assert!(matches!(reduce(Term::iszero(Term::Unit)),
                     Err(RuntimeError::ExpectedNatural { .. })));
    assert!(matches!(reduce(Term::not(Term::nat(0))),
                     Err(RuntimeError::ExpectedBoolean { .. })));
}

#[test]
fn conditional_picks_one_branch() {
    let noisy = |n| seq(vec![Term::print(Term::nat(n)), Term::nat(n)]);

    let out = printed(vec![Term::if_then_else(Term::Bool(true), noisy(1), noisy(2)),
                           Term::if_then_else(Term::Bool(false), noisy(3), noisy(4))]);
    assert_eq!(out, "1\n4\n");

    assert!(matches!(reduce(Term::if_then_else(Term::nat(0), Term::Unit, Term::Unit)),
                     Err(RuntimeError::ExpectedBoolean { .. })));
}

#[test]
fn beta_matches_substitution() {
    let body = Term::if_then_else(Term::iszero(Term::var("x")), Term::nat(10), Term::pred(Term::var("x")));
    let abs = Term::abs("x", Type::Nat, body.clone());

    for n in [0, 1, 5] {
        let direct = value(Term::app(abs.clone(), Term::nat(n)));
        let substituted = value(substitute(&body, &[("x".to_string(), Term::nat(n))]));
        assert_eq!(direct, substituted);
    }
}

#[test]
fn substitution_avoids_capture() {
    // (\x:Nat. \y:Nat. x) y, with y free, must not capture the free y.
    let konst = Term::abs("x", Type::Nat, Term::abs("y", Type::Nat, Term::var("x")));
    let partial = value(Term::app(konst, Term::abs("z", Type::Nat, Term::var("y"))));

    let Term::Abs { param, body, .. } = &partial else {
        panic!("expected an abstraction");
    };
    assert_eq!(**body, Term::abs("z", Type::Nat, Term::var("y")));
    assert_ne!(param, "y");
}

#[test]
fn shadowed_parameters_are_left_alone() {
    let inner = Term::abs("x", Type::Nat, Term::var("x"));
    let outer = Term::abs("x", Type::Nat, inner.clone());
    assert_eq!(value(Term::app(outer, Term::nat(5))), inner);
}

#[test]
fn application_of_a_non_abstraction_fails() {
    assert!(matches!(reduce(Term::app(Term::nat(1), Term::nat(2))),
                     Err(RuntimeError::ExpectedAbstraction { .. })));
}

#[test]
fn boolean_truth_tables() {
    for a in [false, true] {
        for b in [false, true] {
            let and = Term::binary(BinaryOperator::And, Term::Bool(a), Term::Bool(b));
            let or = Term::binary(BinaryOperator::Or, Term::Bool(a), Term::Bool(b));
            assert_eq!(value(and), Term::Bool(a && b));
            assert_eq!(value(or), Term::Bool(a || b));
        }
        assert_eq!(value(Term::not(Term::Bool(a))), Term::Bool(!a));
    }
}

#[test]
fn logic_does_not_short_circuit() {
    let right = seq(vec![Term::print(Term::nat(1)), Term::Bool(true)]);
    let out = printed(vec![Term::binary(BinaryOperator::And, Term::Bool(false), right.clone()),
                           Term::binary(BinaryOperator::Or, Term::Bool(true), right)]);
    assert_eq!(out, "1\n1\n");

    assert!(matches!(reduce(Term::binary(BinaryOperator::Or, Term::Bool(true), Term::nat(0))),
                     Err(RuntimeError::ExpectedBoolean { .. })));
}

#[test]
fn comparison_is_structural() {
    let eq = |a, b| value(Term::binary(BinaryOperator::Equal, a, b));
    let lt = |a, b| value(Term::binary(BinaryOperator::Less, a, b));

    assert_eq!(eq(Term::nat(3), Term::succ(Term::nat(2))), Term::Bool(true));
    assert_eq!(eq(Term::nat(3), Term::Bool(true)), Term::Bool(false));
    assert_eq!(lt(Term::nat(3), Term::nat(4)), Term::Bool(true));
    assert_eq!(lt(Term::Bool(false), Term::Bool(true)), Term::Bool(true));
    assert_eq!(lt(Term::nat(4), Term::nat(4)), Term::Bool(false));
}

#[test]
fn call_arguments_print_before_the_body() {
    let function = Term::Fn { params: vec![Param::new("a", Type::Nat), Param::new("b", Type::Nat)],
                              body:   Box::new(seq(vec![Term::print(Term::nat(3)), Term::var("b")])), };
    let noisy = |n| seq(vec![Term::print(Term::nat(n)), Term::nat(n)]);
    let call = Term::Call { function:  Box::new(function),
                            arguments: vec![noisy(1), noisy(2)], };

    assert_eq!(printed(vec![Term::print(call)]), "1\n2\n3\n2\n");
}

#[test]
fn call_checks_arity_and_target() {
    let function = Term::Fn { params: vec![Param::new("a", Type::Nat)],
                              body:   Box::new(Term::var("a")), };
    let call = Term::Call { function:  Box::new(function),
                            arguments: vec![Term::nat(1), Term::nat(2)], };
    assert!(matches!(reduce(call),
                     Err(RuntimeError::ArgumentCountMismatch { expected: 1, found: 2 })));

    let call = Term::Call { function:  Box::new(Term::nat(1)),
                            arguments: vec![], };
    assert!(matches!(reduce(call), Err(RuntimeError::ExpectedFunction { .. })));
}

#[test]
fn definitions_are_memoized() {
    let def = Definition::with_term("x", seq(vec![Term::print(Term::nat(9)), Term::nat(1)]));
    let reference = || Term::Ref(Rc::clone(&def));

    let out = printed(vec![Term::print(reference()),
                           Term::print(reference()),
                           Term::succ(reference())]);
    assert_eq!(out, "9\n1\n1\n");
    assert_eq!(def.cached(), Some(&Term::nat(1)));
}

#[test]
fn definition_statement_yields_the_definition() {
    let def = Definition::with_term("two", Term::succ(Term::succ(Term::nat(0))));
    let result = value(Term::Def(Rc::clone(&def)));

    assert_eq!(result, Term::Def(Rc::clone(&def)));
    assert_eq!(result.to_string(), "def two = 2");
}

#[test]
fn cyclic_definition_is_detected() {
    let def = Definition::declare("x");
    def.bind(Binding::Term(Term::succ(Term::Ref(Rc::clone(&def)))));

    let mut evaluator = Evaluator::new(Vec::new());
    for _ in 0..2 {
        let err = evaluator.reduce(Term::Def(Rc::clone(&def))).expect_err("x depends on itself");
        assert!(matches!(err, RuntimeError::CyclicDefinition { ref name } if name == "x"));
    }
    assert!(def.cached().is_none());
}

#[test]
fn unbound_names_and_types() {
    assert!(matches!(reduce(Term::var("nope")),
                     Err(RuntimeError::UnboundVariable { ref name }) if name == "nope"));

    let ty = Definition::with_type("T", Type::Nat);
    assert!(matches!(reduce(Term::succ(Term::Ref(Rc::clone(&ty)))),
                     Err(RuntimeError::TypeHasNoValue { .. })));
    assert_eq!(printed(vec![Term::print(Term::Ref(ty))]), "T\n");
}

/// `succ` applied `depth` times to `base`.
fn succ_tower(depth: usize, base: Term) -> Term {
    (0..depth).fold(base, |term, _| Term::succ(term))
}

const DEEP: usize = 100_000;

#[test]
fn deep_succ_nest() {
    assert_eq!(value(succ_tower(DEEP, Term::nat(0))), Term::nat(100_000));
}

#[test]
fn beta_into_a_deep_body() {
    let abs = Term::abs("x", Type::Nat, succ_tower(DEEP, Term::var("x")));
    assert_eq!(value(Term::app(abs, Term::nat(0))), Term::nat(100_000));
}

#[test]
fn deep_definition_is_resolved_and_memoized() {
    let def = Definition::with_term("d", succ_tower(DEEP, Term::nat(0)));

    assert_eq!(value(Term::Ref(Rc::clone(&def))), Term::nat(100_000));
    assert_eq!(def.cached(), Some(&Term::nat(100_000)));
    assert_eq!(value(Term::succ(Term::Ref(def))), Term::nat(100_001));
}

#[test]
fn deep_argument_value() {
    // (\f:Nat->Nat. (\y:Nat. f y) 0) (\x:Nat. succ ... x): the deep value is
    // substituted under a binder, so its free variables are computed too.
    let arrow = Type::Arrow(Box::new(Type::Nat), Box::new(Type::Nat));
    let inner = Term::app(Term::abs("y", Type::Nat, Term::app(Term::var("f"), Term::var("y"))),
                          Term::nat(0));
    let apply_at_zero = Term::abs("f", arrow, inner);
    let deep = Term::abs("x", Type::Nat, succ_tower(DEEP, Term::var("x")));

    assert_eq!(value(Term::app(apply_at_zero, deep)), Term::nat(100_000));
}

#[test]
fn deep_terms_substitute_render_and_compare() {
    let body = succ_tower(DEEP, Term::var("x"));
    assert!(free_vars(&body).contains("x"));

    let closed = substitute(&body, &[("x".to_string(), Term::nat(1))]);
    assert!(free_vars(&closed).is_empty());

    let abs = Term::abs("x", Type::Nat, body);
    let rendered = abs.to_string();
    assert!(rendered.starts_with("\\x:Nat. succ succ"));
    assert!(rendered.ends_with("succ x"));
    assert_eq!(rendered.matches("succ").count(), DEEP);

    assert!(equal(&abs, &abs.clone()));
    let line = printed(vec![Term::print(abs)]);
    assert_eq!(line.len(), rendered.len() + 1);
}

#[test]
fn long_recursive_countdown() {
    let count = Definition::declare("count");
    let body = Term::if_then_else(Term::iszero(Term::var("n")),
                                  Term::Bool(true),
                                  Term::app(Term::Ref(Rc::clone(&count)), Term::pred(Term::var("n"))));
    count.bind(Binding::Term(Term::abs("n", Type::Nat, body)));

    let result = value(Term::app(Term::Ref(Rc::clone(&count)), Term::nat(100_000)));
    assert_eq!(result, Term::Bool(true));
}

#[test]
fn step_budget_is_enforced() {
    let config = EvalConfig { max_steps: Some(50) };
    let mut evaluator = Evaluator::with_config(Vec::new(), config);

    let mut term = Term::nat(0);
    for _ in 0..100 {
        term = Term::succ(term);
    }
    assert!(matches!(evaluator.reduce(term),
                     Err(RuntimeError::StepLimitExceeded { limit: 50 })));

    // The budget is shared by every reduction on the same evaluator.
    assert!(evaluator.reduce(Term::nat(1)).is_err());
}

#[test]
fn sequences() {
    assert_eq!(value(seq(vec![])), Term::Unit);
    assert_eq!(value(seq(vec![Term::nat(1), Term::nat(2)])), Term::nat(2));
    assert_eq!(printed(vec![seq(vec![Term::print(Term::nat(1)), Term::print(Term::nat(2))])]),
               "1\n2\n");
}
