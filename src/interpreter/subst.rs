use std::{
    cell::OnceCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use crate::{
    ast::{
        Term,
        tree::{children, rebuild},
    },
    util::names::fresh_name,
};

/// Simultaneous capture-avoiding substitution: `term[x1 := v1, ..., xn := vn]`.
///
/// Every free occurrence of each bound name is replaced by its value in one
/// pass, so a value that mentions another substituted name is not substituted
/// again. Abstraction and function parameters are the only binders; a binder
/// that would capture a free variable of a substituted value is renamed to a
/// fresh name first. References and definitions are closed and returned
/// unchanged.
///
/// The input is not modified. The walk keeps its own work list, so the depth
/// of `term` is not limited by the native stack.
///
/// ## Example
/// ```
/// use tabula::{
///     ast::{Term, Type},
///     interpreter::subst::substitute,
/// };
///
/// let body = Term::succ(Term::var("x"));
/// let result = substitute(&body, &[("x".to_string(), Term::nat(2))]);
///
/// assert_eq!(result, Term::succ(Term::nat(2)));
///
/// // `y` is free in the value, so the binder `y` is renamed.
/// let abs = Term::abs("y", Type::Nat, Term::app(Term::var("x"), Term::var("y")));
/// let result = substitute(&abs, &[("x".to_string(), Term::var("y"))]);
///
/// let Term::Abs { param, body, .. } = &result else { panic!("expected an abstraction") };
/// assert_ne!(param, "y");
/// assert_eq!(**body, Term::app(Term::var("y"), Term::var(param)));
/// ```
#[must_use]
pub fn substitute(term: &Term, bindings: &[(String, Term)]) -> Term {
    if bindings.is_empty() {
        return term.clone();
    }

    let mut work = vec![Task::Visit(term, Rc::new(Env::new(bindings.to_vec())))];
    let mut built: Vec<Term> = Vec::new();

    while let Some(task) = work.pop() {
        match task {
            Task::Visit(node, env) => {
                if let Term::Var(name) = node {
                    built.push(env.lookup(name).unwrap_or(node).clone());
                    continue;
                }
                if env.bindings.is_empty() {
                    built.push(node.clone());
                    continue;
                }

                let subterms = children(node);
                let params = binder_names(node);
                if params.is_empty() {
                    work.push(Task::Build(node, subterms.len(), None));
                    work.extend(subterms.into_iter().rev().map(|t| Task::Visit(t, Rc::clone(&env))));
                } else {
                    let (renamed, inner) = enter_binders(&params, node, &env);
                    work.push(Task::Build(node, subterms.len(), Some(renamed)));
                    work.extend(subterms.into_iter().map(|t| Task::Visit(t, Rc::clone(&inner))));
                }
            },
            Task::Build(node, count, renamed) => {
                let subterms = built.split_off(built.len().saturating_sub(count));
                let mut rebuilt = rebuild(node, subterms);
                if let Some(names) = renamed {
                    rename_binders(&mut rebuilt, names);
                }
                built.push(rebuilt);
            },
        }
    }

    built.pop().unwrap_or_default()
}

/// The bindings in force at one point of a substitution.
struct Env {
    bindings: Vec<(String, Term)>,
    /// Free variables of the bound values, computed on first use.
    captured: OnceCell<HashSet<String>>,
}

impl Env {
    fn new(bindings: Vec<(String, Term)>) -> Self {
        Self { bindings,
               captured: OnceCell::new() }
    }

    fn lookup(&self, name: &str) -> Option<&Term> {
        self.bindings.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    fn captured(&self) -> &HashSet<String> {
        self.captured.get_or_init(|| {
                         self.bindings
                             .iter()
                             .flat_map(|(_, value)| free_vars(value))
                             .collect()
                     })
    }
}

enum Task<'t> {
    /// Substitute into this subterm.
    Visit(&'t Term, Rc<Env>),
    /// Reassemble this node from the last `usize` results, renaming its
    /// binders when given names.
    Build(&'t Term, usize, Option<Vec<String>>),
}

/// The names bound by `term`: an abstraction's parameter or a function's
/// parameters.
fn binder_names(term: &Term) -> Vec<&str> {
    match term {
        Term::Abs { param, .. } => vec![param.as_str()],
        Term::Fn { params, .. } => params.iter().map(|p| p.name.as_str()).collect(),
        _ => Vec::new(),
    }
}

/// Works out the bindings in force under the binders `params` of `binder`.
///
/// Bindings shadowed by a parameter are dropped. Parameters that occur free in
/// a remaining value are renamed, and the renaming joins the bindings. Returns
/// the (possibly renamed) parameters and the inner bindings.
fn enter_binders(params: &[&str], binder: &Term, env: &Rc<Env>) -> (Vec<String>, Rc<Env>) {
    let unchanged = || params.iter().map(ToString::to_string).collect::<Vec<_>>();

    let shadows = env.bindings.iter().any(|(name, _)| params.contains(&name.as_str()));
    if !shadows && params.iter().all(|p| !env.captured().contains(*p)) {
        return (unchanged(), Rc::clone(env));
    }

    let inner = Env::new(env.bindings
                            .iter()
                            .filter(|(name, _)| !params.contains(&name.as_str()))
                            .cloned()
                            .collect());
    if inner.bindings.is_empty() || params.iter().all(|p| !inner.captured().contains(*p)) {
        return (unchanged(), Rc::new(inner));
    }

    let mut avoid = inner.captured().clone();
    avoid.extend(free_vars(binder));
    avoid.extend(unchanged());

    let captured = inner.captured().clone();
    let mut bindings = inner.bindings;
    let mut renamed = Vec::with_capacity(params.len());
    for &param in params {
        if captured.contains(param) {
            let mut fresh = fresh_name(param);
            while avoid.contains(&fresh) {
                fresh = fresh_name(param);
            }
            avoid.insert(fresh.clone());
            bindings.push((param.to_string(), Term::Var(fresh.clone())));
            renamed.push(fresh);
        } else {
            renamed.push(param.to_string());
        }
    }

    (renamed, Rc::new(Env::new(bindings)))
}

fn rename_binders(term: &mut Term, names: Vec<String>) {
    match term {
        Term::Abs { param, .. } => {
            if let Some(name) = names.into_iter().next() {
                *param = name;
            }
        },
        Term::Fn { params, .. } => {
            for (p, name) in params.iter_mut().zip(names) {
                p.name = name;
            }
        },
        _ => {},
    }
}

/// The free variables of `term`.
///
/// ## Example
/// ```
/// use tabula::{
///     ast::{Term, Type},
///     interpreter::subst::free_vars,
/// };
///
/// let term = Term::abs("x", Type::Nat, Term::app(Term::var("x"), Term::var("y")));
/// let free = free_vars(&term);
///
/// assert!(free.contains("y"));
/// assert!(!free.contains("x"));
/// ```
#[must_use]
pub fn free_vars(term: &Term) -> HashSet<String> {
    enum Walk<'t> {
        Enter(&'t Term),
        Unbind(Vec<&'t str>),
    }

    let mut bound: HashMap<&str, usize> = HashMap::new();
    let mut free = HashSet::new();
    let mut work = vec![Walk::Enter(term)];

    while let Some(step) = work.pop() {
        match step {
            Walk::Enter(Term::Var(name)) => {
                if !bound.contains_key(name.as_str()) {
                    free.insert(name.clone());
                }
            },
            Walk::Enter(node) => {
                let params = binder_names(node);
                if !params.is_empty() {
                    for &p in &params {
                        *bound.entry(p).or_default() += 1;
                    }
                    work.push(Walk::Unbind(params));
                }
                work.extend(children(node).into_iter().map(Walk::Enter));
            },
            Walk::Unbind(params) => {
                for p in params {
                    if let Some(count) = bound.get_mut(p) {
                        *count -= 1;
                        if *count == 0 {
                            bound.remove(p);
                        }
                    }
                }
            },
        }
    }

    free
}
