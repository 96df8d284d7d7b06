use std::iter::Peekable;

use crate::{
    ast::{Row, Table, Term},
    interpreter::{
        lexer::Token,
        parser::{
            binary::parse_set_op,
            core::{ParseResult, Scope, parse_expression},
            types::parse_schema_body,
            utils::{expect, parse_column_list, parse_comma_separated, parse_record_fields},
        },
    },
};

/// Parses a table literal.
///
/// Rows are record literals. Their fields may be written in any order; the
/// evaluator puts them in schema order.
///
/// Grammar: `table := "table" "{" (IDENT ":" type),* "}" "[" record,* "]"`
///
/// # Example
/// ```
/// use tabula::{
///     ast::Term,
///     interpreter::{
///         lexer::tokenize,
///         parser::{core::Scope, relational::parse_table_literal},
///     },
/// };
///
/// let tokens = tokenize("table {a: Nat} [{a = 1}, {a = 2}]").unwrap();
/// let term = parse_table_literal(&mut tokens.iter().peekable(), &mut Scope::new()).unwrap();
///
/// let Term::Table(table) = &term else { panic!("expected a table") };
/// assert_eq!(table.rows.len(), 2);
/// ```
///
/// # Errors
/// Returns a `ParseError` for a malformed schema or row.
pub fn parse_table_literal<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    expect(tokens, &Token::Table, "'table'", line)?;
    expect(tokens, &Token::LBrace, "'{' to open the table schema", line)?;
    let schema = parse_schema_body(tokens)?;
    expect(tokens, &Token::LBracket, "'[' to open the table rows", line)?;
    let rows = parse_comma_separated(tokens, scope, parse_row, &Token::RBracket)?;

    Ok(Term::Table(Table::new(schema, rows)))
}

fn parse_row<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Row>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    expect(tokens, &Token::LBrace, "'{' to open a row", line)?;
    parse_record_fields(tokens, scope)
}

/// Parses a query.
///
/// Column names in the predicate are free variables bound per row when the
/// query runs.
///
/// Grammar: `query := "select" columns "from" set_op "where" expression`
pub fn parse_query<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    expect(tokens, &Token::Select, "'select'", line)?;
    let projection = parse_column_list(tokens, scope)?;
    expect(tokens, &Token::From, "'from' after the selected columns", line)?;
    let source = parse_set_op(tokens, scope)?;
    expect(tokens, &Token::Where, "'where' after the query source", line)?;
    let predicate = parse_expression(tokens, scope)?;

    Ok(Term::Query { projection,
                     source: Box::new(source),
                     predicate: Box::new(predicate) })
}

/// Parses a join.
///
/// Grammar:
/// `join := "join" set_op "with" set_op "on" expression ("project" columns)?`
pub fn parse_join<'a, I>(tokens: &mut Peekable<I>, scope: &mut Scope) -> ParseResult<Term>
    where I: Iterator<Item = &'a (Token, usize)> + Clone
{
    let line = tokens.peek().map_or(0, |(_, l)| *l);
    expect(tokens, &Token::Join, "'join'", line)?;
    let left = parse_set_op(tokens, scope)?;
    expect(tokens, &Token::With, "'with' after the left join operand", line)?;
    let right = parse_set_op(tokens, scope)?;
    expect(tokens, &Token::On, "'on' after the right join operand", line)?;
    let predicate = parse_expression(tokens, scope)?;

    let projection = if let Some((Token::Project, _)) = tokens.peek() {
        tokens.next();
        Some(parse_column_list(tokens, scope)?)
    } else {
        None
    };

    Ok(Term::Join { left: Box::new(left),
                    right: Box::new(right),
                    predicate: Box::new(predicate),
                    projection })
}
