use std::fs::{self};

use tabula::{get_result, interpreter::evaluator::core::EvalConfig, run};
use walkdir::WalkDir;

#[test]
fn book_examples_work() {
    let mut count = 0;

    for entry in
        WalkDir::new("book/src").into_iter()
                                .filter_map(Result::ok)
                                .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        for (i, code) in extract_tabula_blocks(&content).into_iter().enumerate() {
            count += 1;
            if let Err(e) = run(&code, Vec::new(), EvalConfig::default()) {
                panic!("Example {} in {:?} failed:\n{}\nError: {:?}", i + 1, path, code, e);
            }
        }
    }

    assert!(count > 0, "No tabula examples found in book/src");
}

#[test]
fn example_script_runs() {
    let source = fs::read_to_string("tests/example.tab").expect("tests/example.tab should exist");
    assert_eq!(output(&source), "3\ntrue\ntable {name: Nat} [{name = 20}]\n");
}

fn extract_tabula_blocks(content: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut inside = false;
    let mut buf = String::new();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```tabula") {
            inside = true;
            buf.clear();
            continue;
        }
        if inside && trimmed.starts_with("```") {
            inside = false;
            blocks.push(buf.clone());
            continue;
        }
        if inside {
            buf.push_str(line);
            buf.push('\n');
        }
    }

    blocks
}

fn assert_success(src: &str) {
    if let Err(e) = get_result(src, false) {
        panic!("Script failed: {e}");
    }
}

fn assert_failure(src: &str) {
    if run(src, Vec::new(), EvalConfig::default()).is_ok() {
        panic!("Script succeeded but was expected to fail")
    }
}

/// Everything the script printed.
fn output(src: &str) -> String {
    let mut out = Vec::new();
    if let Err(e) = run(src, &mut out, EvalConfig::default()) {
        panic!("Script failed: {e}\n{src}");
    }
    String::from_utf8(out).expect("print output is UTF-8")
}

/// The error message of a failing script.
fn error_of(src: &str) -> String {
    match run(src, Vec::new(), EvalConfig::default()) {
        Ok(_) => panic!("Script succeeded but was expected to fail:\n{src}"),
        Err(e) => e.to_string(),
    }
}

#[test]
fn printing_scalars() {
    assert_eq!(output("print iszero 0"), "true\n");
    assert_eq!(output("print pred 0"), "0\n");
    assert_eq!(output("print (\\x:Nat. succ x) 3"), "4\n");
    assert_eq!(output("print unit"), "unit\n");
    assert_eq!(output("print ()"), "unit\n");
}

#[test]
fn natural_literals_are_unbounded() {
    assert_eq!(output("print succ 18446744073709551615"), "18446744073709551616\n");
    assert_eq!(output("print pred 100000000000000000000000"), "99999999999999999999999\n");
}

#[test]
fn lambda_spelling() {
    assert_eq!(output("print (λx:Nat. pred x) 5"), "4\n");
}

#[test]
fn conditionals() {
    assert_eq!(output("print if true then 1 else 2"), "1\n");
    assert_eq!(output("print if iszero 1 then 1 else 2"), "2\n");
    assert_failure("if 0 then 1 else 2");
}

#[test]
fn logic_and_comparison() {
    assert_eq!(output("print true and not false"), "true\n");
    assert_eq!(output("print false or false"), "false\n");
    assert_eq!(output("print 2 < 10"), "true\n");
    assert_eq!(output("print (1, true) == (1, true)"), "true\n");
    assert_eq!(output("print {a = 1} == {a = 2}"), "false\n");
    assert_failure("true and 1");
}

#[test]
fn definitions_and_recursion() {
    let src = "def double = \\n:Nat. if iszero n then 0 else succ succ double (pred n)\nprint double 21";
    assert_eq!(output(src), "42\n");
}

#[test]
fn functions_take_argument_lists() {
    let src = "def add = fn(x: Nat, y: Nat) => if iszero y then x else add[succ x, pred y]\nprint add[2, 3]";
    assert_eq!(output(src), "5\n");
    assert!(error_of("def k = fn(x: Nat, y: Nat) => x\nk[1]").contains("Argument count"));
}

#[test]
fn do_blocks_sequence_prints() {
    assert_eq!(output("print do { print 1; print 2; 3 }"), "1\n2\n3\n");
    assert_eq!(output("print do {}"), "unit\n");
    assert_eq!(output("do {\n  print 1\n  print 2\n}"), "1\n2\n");
}

#[test]
fn definitions_print_once() {
    let src = "def x = do { print 7; 1 }\nprint x\nprint x";
    assert_eq!(output(src), "7\n1\n1\n");
}

#[test]
fn records_and_members() {
    assert_eq!(output("print {a = 1, b = succ 1}.b"), "2\n");
    assert_eq!(output("print {a = 1, b = 2, c = 3}.{c, a}"), "{c = 3, a = 1}\n");
    assert_failure("{a = 1}.b");
    assert_failure("{a = 1, a = 2}");
    assert_failure("(1, 2).a");
}

#[test]
fn scenario_set_operators() {
    let src = "def t = table {a: Nat, b: Nat} [{a = 1, b = 2}]\n\
               def u = table {a: Nat, b: Nat} [{b = 2, a = 1}]\n\
               print t union u\n\
               print t intersect u\n\
               print t except u";
    assert_eq!(output(src),
               "table {a: Nat, b: Nat} [{a = 1, b = 2}]\n\
                table {a: Nat, b: Nat} [{a = 1, b = 2}]\n\
                table {a: Nat, b: Nat} []\n");
}

#[test]
fn scenario_select() {
    let src = "def t = table {a: Nat, b: Nat} [{a = 1, b = 2}, {a = 3, b = 4}]\n\
               print select {a} from t where b == 2";
    assert_eq!(output(src), "table {a: Nat} [{a = 1}]\n");
}

#[test]
fn joins_qualify_colliding_columns() {
    let src = "def people = table {id: Nat, age: Nat} [{id = 1, age = 30}, {id = 2, age = 40}]\n\
               def pets = table {id: Nat, owner: Nat} [{id = 7, owner = 2}]\n\
               print join people with pets on people_id == owner project {age, pets_id}";
    assert_eq!(output(src), "table {age: Nat, pets_id: Nat} [{age = 40, pets_id = 7}]\n");
}

#[test]
fn type_declarations() {
    assert_success("type Row = {a: Nat}\ndef f = \\r:Row. r.a\nf {a = 1}");
    assert_eq!(output("type Pair = (Nat, Bool) -> Nat\nprint Pair"), "Pair\n");
    assert!(error_of("type T = Nat\nsucc T").contains("names a type"));
}

#[test]
fn comments_and_separators() {
    assert_eq!(output("// nothing here\nprint 1; print 2 // trailing\n\n;;print 3"), "1\n2\n3\n");
}

#[test]
fn syntax_errors() {
    assert_failure("print (1");
    assert_failure("1 )");
    assert_failure("def x = 1\ndef x = 2");
    assert_failure("do { def y = 1 }");
    assert_failure("if true then 1");
    assert_failure("#");
}

#[test]
fn runtime_errors() {
    assert!(error_of("succ z").contains('z'));
    assert!(error_of("def x = succ x").contains("its own value"));
    assert_failure("1 2");
    assert_failure("succ true");
    assert_failure("table {a: Nat} [{b = 1}]");
    assert_failure("table {a: Nat} [{a = 1}] union table {b: Nat} []");
}

#[test]
fn earlier_statements_run_before_a_failure() {
    let mut out = Vec::new();
    assert!(run("print 1\nsucc true\nprint 2", &mut out, EvalConfig::default()).is_err());
    assert_eq!(out, b"1\n");
}

#[test]
fn step_budget() {
    let src = "def loop = \\n:Nat. loop (succ n)\nloop 0";
    let config = EvalConfig { max_steps: Some(10_000) };
    let err = run(src, Vec::new(), config).expect_err("an endless loop must hit the budget");
    assert!(err.to_string().contains("10000"));
}

#[test]
fn long_prefix_chains() {
    let chain = "succ ".repeat(100_000);
    assert_eq!(output(&format!("print {chain}0")), "100000\n");
    assert_eq!(output(&format!("def f = \\x:Nat. {chain}x\nprint f 0\nprint f 1")),
               "100000\n100001\n");
}

#[test]
fn definitions_shadow_columns_in_predicates() {
    let src = "def ages = table {age: Nat} [{age = 30}, {age = 50}]\n\
               def age = 40\n\
               print select {age} from ages where age < 45";
    assert_eq!(output(src), "table {age: Nat} [{age = 30}, {age = 50}]\n");

    // `owner` is the definition, not the column, so only `id = 1` matches.
    let src = "def people = table {id: Nat} [{id = 1}, {id = 2}]\n\
               def pets = table {owner: Nat} [{owner = 2}]\n\
               def owner = 1\n\
               print join people with pets on id == owner";
    assert_eq!(output(src), "table {id: Nat, owner: Nat} [{id = 1, owner = 2}]\n");
}
