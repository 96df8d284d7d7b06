use std::{collections::HashMap, iter::Peekable, rc::Rc};

use crate::{
    ast::{Definition, Term},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            binary::parse_logical_or,
            relational::{parse_join, parse_query},
            types::parse_type,
            utils::{expect, parse_comma_separated, parse_identifier},
        },
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Name resolution state threaded through the parser.
///
/// Identifiers are resolved while parsing, in this order:
/// 1. The innermost enclosing abstraction or function parameter.
/// 2. A definition made by an earlier top-level statement.
/// 3. Otherwise the identifier stays a free variable, which is how table
///    predicates refer to columns.
///
/// A definition is registered before its initializer is parsed, so the
/// initializer may refer to the definition itself.
#[derive(Default)]
pub struct Scope {
    definitions: HashMap<String, Rc<Definition>>,
    binders:     Vec<String>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves an identifier to a term.
    ///
    /// # Example
    /// ```
    /// use tabula::{
    ///     ast::{Definition, Term},
    ///     interpreter::parser::core::Scope,
    /// };
    ///
    /// let mut scope = Scope::new();
    /// scope.define(Definition::with_term("x", Term::nat(1)), 1).unwrap();
    ///
    /// assert!(matches!(scope.resolve("x"), Term::Ref(_)));
    /// assert_eq!(scope.resolve("y"), Term::var("y"));
    ///
    /// scope.push_binder("x");
    /// assert_eq!(scope.resolve("x"), Term::var("x"));
    /// ```
    #[must_use]
    pub fn resolve(&self, name: &str) -> Term {
        if self.binders.iter().rev().any(|b| b == name) {
            return Term::Var(name.to_string());
        }
        self.definitions
            .get(name)
            .map_or_else(|| Term::Var(name.to_string()), |def| Term::Ref(Rc::clone(def)))
    }

    /// Registers a top-level definition.
    ///
    /// # Errors
    /// Returns `ParseError::Redefinition` when the name is already defined.
    pub fn define(&mut self, def: Rc<Definition>, line: usize) -> ParseResult<()> {
        if self.definitions.contains_key(&def.name) {
            return Err(ParseError::Redefinition { name: def.name.clone(),
                                                  line });
        }
        self.definitions.insert(def.name.clone(), def);
        Ok(())
    }

    /// Brings a parameter name into scope.
    pub fn push_binder(&mut self, name: &str) {
        self.binders.push(name.to_string());
    }

    /// Removes the `count` most recently bound parameter names.
    pub fn pop_binders(&mut self, count: usize) {
        let len = self.binders.len().saturating_sub(count);
        self.binders.truncate(len);
    }
}

/// Parses a full expression.
///
/// This is the entry point for expression parsing. Keyword-introduced forms
/// (`if`, abstractions, `fn`, `print`, `select`, `join`) extend as far to the
/// right as possible; everything else descends through the operator
/// precedence hierarchy starting at logical OR.
///
/// Grammar:
/// ```text
///     expression := "if" expression "then" expression "else" expression
///                 | "\" IDENT ":" type "." expression
///                 | "fn" "(" params ")" "=>" expression
///                 | "print" expression
///                 | query | join
///                 | logical_or
/// ```
///
/// # Parameters
/// - `tokens`: Token iterator providing `(Token, line)` pairs.
/// - `scope`: Name resolution state.
///
/// # Returns
/// The parsed term.
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    match tokens.peek() {
        Some((Token::If, line)) => {
            let line = *line;
            tokens.next();
            parse_if(tokens, scope, line)
        },
        Some((Token::Lambda, _)) => {
            tokens.next();
            parse_abstraction(tokens, scope)
        },
        Some((Token::Fn, _)) => {
            tokens.next();
            parse_function(tokens, scope)
        },
        Some((Token::Print, _)) => {
            tokens.next();
            Ok(Term::print(parse_expression(tokens, scope)?))
        },
        Some((Token::Select, _)) => parse_query(tokens, scope),
        Some((Token::Join, _)) => parse_join(tokens, scope),
        _ => parse_logical_or(tokens, scope),
    }
}

/// Parses an `if` expression. Both branches are mandatory.
///
/// Syntax:
/// ```text
///     if <condition> then <expression> else <expression>
/// ```
///
/// # Parameters
/// - `tokens`: Token stream positioned after the `if` keyword.
/// - `scope`: Name resolution state.
/// - `line`: Line number of the `if` token.
///
/// # Errors
/// - `UnexpectedToken` if `then` or `else` is missing.
/// - Propagates any errors from sub-expression parsing.
pub fn parse_if<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope, line: usize) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let condition = parse_expression(tokens, scope)?;
    expect(tokens, &Token::Then, "'then' after if condition", line)?;
    let then_branch = parse_expression(tokens, scope)?;
    expect(tokens, &Token::Else, "'else' after then branch", line)?;
    let else_branch = parse_expression(tokens, scope)?;

    Ok(Term::if_then_else(condition, then_branch, else_branch))
}

/// Parses an abstraction of the form `\x:T. body` (the `\` is already
/// consumed). `x` is bound while the body is parsed.
fn parse_abstraction<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    let param = parse_identifier(tokens)?;
    expect(tokens, &Token::Colon, "':' after abstraction parameter", line)?;
    let ty = parse_type(tokens)?;
    expect(tokens, &Token::Dot, "'.' before abstraction body", line)?;

    scope.push_binder(&param);
    let body = parse_expression(tokens, scope);
    scope.pop_binders(1);

    Ok(Term::abs(&param, ty, body?))
}

/// Parses a function value of the form `fn(x: T, y: U) => body` (the `fn` is
/// already consumed). Every parameter is bound while the body is parsed.
fn parse_function<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    expect(tokens, &Token::LParen, "'(' after 'fn'", line)?;
    let params = parse_comma_separated(tokens, scope, |t, _| parse_param(t), &Token::RParen)?;
    expect(tokens, &Token::FatArrow, "'=>' before function body", line)?;

    for param in &params {
        scope.push_binder(&param.name);
    }
    let body = parse_expression(tokens, scope);
    scope.pop_binders(params.len());

    Ok(Term::Fn { params,
                  body: Box::new(body?) })
}

/// Parses one `name: Type` parameter.
fn parse_param<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<crate::ast::Param>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    let name = parse_identifier(tokens)?;
    expect(tokens, &Token::Colon, "':' after parameter name", line)?;
    let ty = parse_type(tokens)?;
    Ok(crate::ast::Param { name, ty })
}
