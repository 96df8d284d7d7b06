use std::{collections::HashSet, io::Write, mem};

use tracing::debug;

use crate::{
    ast::{Accessor, Column, Field, Row, Table, Term},
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{EvalResult, Evaluator},
            frame::{Assemble, Control, Frame, Selection},
        },
        subst::substitute,
        value::{expect_bool, expect_table, is_value, render_schema},
    },
};

/// Fails with `DuplicateColumn` on the first name that occurs twice.
fn ensure_unique<'n>(names: impl IntoIterator<Item = &'n str>) -> EvalResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(RuntimeError::DuplicateColumn { name: name.to_string() });
        }
    }
    Ok(())
}

/// Renders the field names of a row as a column list, for error messages.
fn row_names(row: &[Field]) -> String {
    let names: Vec<&str> = row.iter().map(|f| f.name.as_str()).collect();
    format!("{{{}}}", names.join(", "))
}

/// Puts the fields of `row` in schema order.
///
/// The row's field names must be a permutation of the schema's column names.
fn conform_row(schema: &[Column], row: Row) -> EvalResult<Row> {
    let found = row_names(&row);
    if row.len() != schema.len() {
        return Err(RuntimeError::SchemaMismatch { expected: render_schema(schema),
                                                  found });
    }

    let mut slots: Vec<Option<Field>> = row.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(schema.len());

    for column in schema {
        let field = slots.iter_mut()
                         .find(|slot| slot.as_ref().is_some_and(|f| f.name == column.name))
                         .and_then(Option::take);
        match field {
            Some(field) => ordered.push(field),
            None => {
                return Err(RuntimeError::SchemaMismatch { expected: render_schema(schema),
                                                          found });
            },
        }
    }

    Ok(ordered)
}

/// Restricts `table` to `names`, in that order.
///
/// ## Example
/// ```
/// use tabula::{
///     ast::{Column, Field, Table, Type},
///     interpreter::evaluator::relational::project,
/// };
///
/// let table = Table::new(vec![Column::new("a", Type::Nat), Column::new("b", Type::Bool)],
///                        vec![vec![Field::new("a", 1u64.into()), Field::new("b", true.into())]]);
///
/// let projected = project(table, &["b".to_string()]).unwrap();
///
/// assert_eq!(projected.schema, vec![Column::new("b", Type::Bool)]);
/// assert_eq!(projected.rows, vec![vec![Field::new("b", true.into())]]);
/// ```
///
/// # Errors
/// `UnknownField` for a name the schema lacks, `DuplicateColumn` for a name
/// listed twice.
pub fn project(table: Table, names: &[String]) -> EvalResult<Table> {
    ensure_unique(names.iter().map(String::as_str))?;

    let mut indices = Vec::with_capacity(names.len());
    for name in names {
        match table.schema.iter().position(|c| &c.name == name) {
            Some(index) => indices.push(index),
            None => {
                return Err(RuntimeError::UnknownField { name:     name.clone(),
                                                        receiver: render_schema(&table.schema), });
            },
        }
    }

    let schema = indices.iter().map(|&i| table.schema[i].clone()).collect();
    let rows = table.rows
                    .into_iter()
                    .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
                    .collect();

    Ok(Table::new(schema, rows))
}

/// Cartesian product of two tables.
///
/// Column names present on both sides are renamed to `<qualifier>_<name>`
/// on both sides, using `qualifiers.0` for the left table and `qualifiers.1`
/// for the right one. Rows are left-major: every right row is paired with
/// the first left row before the second left row is used.
///
/// ## Example
/// ```
/// use tabula::{
///     ast::{Column, Field, Table, Type},
///     interpreter::evaluator::relational::product,
/// };
///
/// let people = Table::new(vec![Column::new("id", Type::Nat), Column::new("name", Type::Nat)],
///                         vec![vec![Field::new("id", 1u64.into()), Field::new("name", 7u64.into())]]);
/// let orders = Table::new(vec![Column::new("id", Type::Nat)],
///                         vec![vec![Field::new("id", 1u64.into())], vec![Field::new("id", 2u64.into())]]);
///
/// let joined = product(people, orders, &("people".to_string(), "orders".to_string())).unwrap();
///
/// let names: Vec<&str> = joined.column_names().collect();
/// assert_eq!(names, ["people_id", "name", "orders_id"]);
/// assert_eq!(joined.rows.len(), 2);
/// ```
///
/// # Errors
/// `DuplicateColumn` when qualification does not make the names unique, for
/// example when a table is joined with itself under the same qualifier.
pub fn product(left: Table, right: Table, qualifiers: &(String, String)) -> EvalResult<Table> {
    let left_names: HashSet<&str> = left.column_names().collect();
    let right_names: HashSet<&str> = right.column_names().collect();
    let rename = |qualifier: &str, column: &Column| {
        if left_names.contains(column.name.as_str()) && right_names.contains(column.name.as_str()) {
            Column::new(&format!("{qualifier}_{}", column.name), column.ty.clone())
        } else {
            column.clone()
        }
    };

    let schema: Vec<Column> = left.schema
                                  .iter()
                                  .map(|c| rename(&qualifiers.0, c))
                                  .chain(right.schema.iter().map(|c| rename(&qualifiers.1, c)))
                                  .collect();
    ensure_unique(schema.iter().map(|c| c.name.as_str()))?;

    let mut rows = Vec::with_capacity(left.rows.len() * right.rows.len());
    for l in &left.rows {
        for r in &right.rows {
            let row = schema.iter()
                            .zip(l.iter().chain(r))
                            .map(|(column, field)| Field::new(&column.name, field.value.clone()))
                            .collect();
            rows.push(row);
        }
    }

    Ok(Table::new(schema, rows))
}

/// The prefix used for colliding join columns: the definition name when the
/// operand is a reference, otherwise `fallback`.
fn qualifier(operand: &Term, fallback: &str) -> String {
    match operand {
        Term::Ref(def) => def.name.clone(),
        _ => fallback.to_string(),
    }
}

/// Substitutes the row's values for the predicate's column names.
fn instantiate(predicate: &Term, row: &[Field]) -> Term {
    let bindings: Vec<(String, Term)> = row.iter().map(|f| (f.name.clone(), f.value.clone())).collect();
    substitute(predicate, &bindings)
}

impl<W: Write> Evaluator<W> {
    /// Starts a record literal. Field values are reduced left to right.
    pub(in crate::interpreter::evaluator) fn start_record(fields: Vec<Field>,
                                                          stack: &mut Vec<Frame>)
                                                          -> EvalResult<Control> {
        ensure_unique(fields.iter().map(|f| f.name.as_str()))?;
        if fields.iter().all(|f| is_value(&f.value)) {
            return Ok(Control::Return(Term::Record(fields)));
        }

        let (names, values) = fields.into_iter().map(|f| (f.name, f.value)).unzip();
        Self::collect(values, Assemble::Record(names), stack)
    }

    pub(in crate::interpreter::evaluator) fn build_record(names: Vec<String>, values: Vec<Term>) -> Term {
        Term::Record(names.into_iter()
                          .zip(values)
                          .map(|(name, value)| Field { name, value })
                          .collect())
    }

    /// Starts a table literal.
    ///
    /// Every row must name exactly the schema's columns. Field values are
    /// reduced row by row in source order; the result has its fields in
    /// schema order.
    pub(in crate::interpreter::evaluator) fn start_table(table: Table,
                                                         stack: &mut Vec<Frame>)
                                                         -> EvalResult<Control> {
        ensure_unique(table.column_names())?;
        for row in &table.rows {
            if row.len() != table.schema.len()
               || table.schema.iter().any(|c| !row.iter().any(|f| f.name == c.name))
            {
                return Err(RuntimeError::SchemaMismatch { expected: render_schema(&table.schema),
                                                          found:    row_names(row), });
            }
        }

        if table.rows.iter().flatten().all(|f| is_value(&f.value)) {
            let Table { schema, rows } = table;
            let rows = rows.into_iter()
                           .map(|row| conform_row(&schema, row))
                           .collect::<EvalResult<Vec<_>>>()?;
            return Ok(Control::Return(Term::Table(Table::new(schema, rows))));
        }

        let mut shape = Vec::with_capacity(table.rows.len());
        let mut values = Vec::new();
        for row in table.rows {
            let (names, row_values): (Vec<String>, Vec<Term>) = row.into_iter().map(|f| (f.name, f.value)).unzip();
            shape.push(names);
            values.extend(row_values);
        }

        Self::collect(values,
                      Assemble::Table { schema: table.schema,
                                        rows:   shape, },
                      stack)
    }

    pub(in crate::interpreter::evaluator) fn build_table(schema: Vec<Column>,
                                                         shape: &[Vec<String>],
                                                         values: Vec<Term>)
                                                         -> EvalResult<Term> {
        let mut values = values.into_iter();
        let mut rows = Vec::with_capacity(shape.len());

        for names in shape {
            let row: Row = names.iter()
                                .zip(values.by_ref())
                                .map(|(name, value)| Field::new(name, value))
                                .collect();
            rows.push(conform_row(&schema, row)?);
        }

        Ok(Term::Table(Table::new(schema, rows)))
    }

    /// Member access on a reduced receiver.
    ///
    /// - `record.name` is the value of the first field called `name`.
    /// - `record.{a, b}` is a record with just those fields, in that order.
    /// - `table.{a, b}` projects the table onto those columns.
    /// - `table.a` projects the table onto one column.
    ///
    /// # Example
    /// ```
    /// use tabula::{
    ///     ast::{Accessor, Field, Term},
    ///     interpreter::evaluator::core::Evaluator,
    /// };
    ///
    /// type E = Evaluator<Vec<u8>>;
    ///
    /// let r = Term::Record(vec![Field::new("a", Term::nat(1)), Field::new("b", Term::nat(2))]);
    ///
    /// assert_eq!(E::member(r.clone(), &Accessor::Field("b".into())).unwrap(), Term::nat(2));
    /// assert!(E::member(r, &Accessor::Field("c".into())).is_err());
    /// ```
    ///
    /// # Errors
    /// `UnknownField` for a missing name, `DuplicateColumn` for a name listed
    /// twice, `ExpectedRecordOrTable` for any other receiver.
    pub fn member(mut receiver: Term, accessor: &Accessor) -> EvalResult<Term> {
        let unknown = |name: &String, receiver: &Term| RuntimeError::UnknownField { name:     name.clone(),
                                                                                    receiver: receiver.to_string(), };
        match (&mut receiver, accessor) {
            (Term::Record(fields), Accessor::Field(name)) => match fields.iter().position(|f| &f.name == name) {
                Some(index) => Ok(fields.swap_remove(index).value),
                None => Err(unknown(name, &receiver)),
            },
            (Term::Record(fields), Accessor::Columns(names)) => {
                ensure_unique(names.iter().map(String::as_str))?;
                let mut selected = Vec::with_capacity(names.len());
                for name in names {
                    match fields.iter().find(|f| &f.name == name) {
                        Some(field) => selected.push(field.clone()),
                        None => return Err(unknown(name, &receiver)),
                    }
                }
                Ok(Term::Record(selected))
            },
            (Term::Table(table), Accessor::Columns(names)) => project(mem::take(table), names).map(Term::Table),
            (Term::Table(table), Accessor::Field(name)) => {
                project(mem::take(table), std::slice::from_ref(name)).map(Term::Table)
            },
            (other, _) => Err(RuntimeError::ExpectedRecordOrTable { found: other.to_string() }),
        }
    }

    /// Continues a query once its source is reduced: filter, then project.
    pub(in crate::interpreter::evaluator) fn query_source(source: Term,
                                                          projection: Vec<String>,
                                                          predicate: Term,
                                                          stack: &mut Vec<Frame>)
                                                          -> EvalResult<Control> {
        let table = expect_table(source)?;
        debug!(rows = table.rows.len(), "query");
        Self::start_filter(table, predicate, Some(projection), stack)
    }

    /// Starts a join. The column qualifiers are taken from the unreduced
    /// operands, since reduction replaces references by their values.
    pub(in crate::interpreter::evaluator) fn start_join(left: Term,
                                                        right: Term,
                                                        predicate: Term,
                                                        projection: Option<Vec<String>>,
                                                        stack: &mut Vec<Frame>)
                                                        -> Control {
        let qualifiers = (qualifier(&left, "left"), qualifier(&right, "right"));
        stack.push(Frame::JoinLeft { right,
                                     predicate,
                                     projection,
                                     qualifiers });
        Control::Eval(left)
    }

    pub(in crate::interpreter::evaluator) fn join_left(left: Term,
                                                       right: Term,
                                                       predicate: Term,
                                                       projection: Option<Vec<String>>,
                                                       qualifiers: (String, String),
                                                       stack: &mut Vec<Frame>)
                                                       -> EvalResult<Control> {
        let left = expect_table(left)?;
        stack.push(Frame::JoinRight { left,
                                      predicate,
                                      projection,
                                      qualifiers });
        Ok(Control::Eval(right))
    }

    /// Continues a join once both operands are reduced: product, then
    /// selection, then the optional projection.
    pub(in crate::interpreter::evaluator) fn join_right(left: Table,
                                                        right: Term,
                                                        predicate: Term,
                                                        projection: Option<Vec<String>>,
                                                        qualifiers: &(String, String),
                                                        stack: &mut Vec<Frame>)
                                                        -> EvalResult<Control> {
        let right = expect_table(right)?;
        debug!(left = left.rows.len(), right = right.rows.len(), "join");
        let table = product(left, right, qualifiers)?;
        Self::start_filter(table, predicate, projection, stack)
    }

    /// Starts a selection: the predicate is reduced once per row, with the
    /// row's values substituted for its column names.
    fn start_filter(table: Table,
                    predicate: Term,
                    projection: Option<Vec<String>>,
                    stack: &mut Vec<Frame>)
                    -> EvalResult<Control> {
        let Table { schema, rows } = table;
        let mut pending = rows.into_iter();

        match pending.next() {
            Some(current) => {
                let instance = instantiate(&predicate, &current);
                stack.push(Frame::Filter(Selection { schema,
                                                     current,
                                                     pending,
                                                     kept: Vec::new(),
                                                     predicate,
                                                     projection }));
                Ok(Control::Eval(instance))
            },
            None => Self::finish_selection(schema, Vec::new(), projection),
        }
    }

    /// Decides one row of a selection and moves to the next.
    pub(in crate::interpreter::evaluator) fn filter_row(decision: &Term,
                                                        selection: Selection,
                                                        stack: &mut Vec<Frame>)
                                                        -> EvalResult<Control> {
        let Selection { schema,
                        current,
                        mut pending,
                        mut kept,
                        predicate,
                        projection, } = selection;

        if expect_bool(decision)? {
            kept.push(current);
        }

        match pending.next() {
            Some(next) => {
                let instance = instantiate(&predicate, &next);
                stack.push(Frame::Filter(Selection { schema,
                                                     current: next,
                                                     pending,
                                                     kept,
                                                     predicate,
                                                     projection }));
                Ok(Control::Eval(instance))
            },
            None => Self::finish_selection(schema, kept, projection),
        }
    }

    fn finish_selection(schema: Vec<Column>,
                        kept: Vec<Row>,
                        projection: Option<Vec<String>>)
                        -> EvalResult<Control> {
        debug!(kept = kept.len(), "selection");
        let table = Table::new(schema, kept);
        let table = match projection {
            Some(names) => project(table, &names)?,
            None => table,
        };
        Ok(Control::Return(Term::Table(table)))
    }
}
