use std::{collections::BTreeSet, io::Write};

use tracing::debug;

use crate::{
    ast::{BinaryOperator, Row, Table},
    error::RuntimeError,
    interpreter::{
        compare::RowKey,
        evaluator::core::{EvalResult, Evaluator},
        value::render_schema,
    },
};

impl<W: Write> Evaluator<W> {
    /// Evaluates a set operation on two tables with equal schemas.
    ///
    /// Rows are compared structurally:
    /// - `union` keeps the left rows in order followed by the right rows not
    ///   already present, without duplicates.
    /// - `intersect` keeps the left rows, in order, that occur in the right
    ///   table, each at most once.
    /// - `except` keeps the left rows, in order and with their duplicates,
    ///   that do not occur in the right table.
    ///
    /// # Example
    /// ```
    /// use tabula::{
    ///     ast::{BinaryOperator, Column, Field, Table, Type},
    ///     interpreter::evaluator::core::Evaluator,
    /// };
    ///
    /// type E = Evaluator<Vec<u8>>;
    ///
    /// let row = |a: u64| vec![Field::new("a", a.into())];
    /// let schema = vec![Column::new("a", Type::Nat)];
    /// let left = Table::new(schema.clone(), vec![row(1), row(2)]);
    /// let right = Table::new(schema, vec![row(2), row(3)]);
    ///
    /// let union = E::eval_set_op(BinaryOperator::Union, left.clone(), &right).unwrap();
    /// assert_eq!(union.rows, vec![row(1), row(2), row(3)]);
    ///
    /// let except = E::eval_set_op(BinaryOperator::Except, left, &right).unwrap();
    /// assert_eq!(except.rows, vec![row(1)]);
    /// ```
    ///
    /// # Errors
    /// `SchemaMismatch` when the schemas differ, `OperatorMismatch` for an
    /// operator that is not a set operator.
    pub fn eval_set_op(op: BinaryOperator, left: Table, right: &Table) -> EvalResult<Table> {
        use BinaryOperator::{And, Equal, Except, Intersect, Less, Or, Union};

        if left.schema != right.schema {
            return Err(RuntimeError::SchemaMismatch { expected: render_schema(&left.schema),
                                                      found:    render_schema(&right.schema), });
        }

        let in_right: BTreeSet<RowKey> = right.rows.iter().map(|r| RowKey(r)).collect();

        let rows: Vec<Row> = match op {
            Union => {
                let mut seen = BTreeSet::new();
                let mut rows = Vec::with_capacity(left.rows.len() + right.rows.len());
                for row in left.rows.iter().chain(&right.rows) {
                    if seen.insert(RowKey(row)) {
                        rows.push(row.clone());
                    }
                }
                rows
            },
            Intersect => {
                let mut seen = BTreeSet::new();
                let mut rows = Vec::new();
                for row in &left.rows {
                    if in_right.contains(&RowKey(row)) && seen.insert(RowKey(row)) {
                        rows.push(row.clone());
                    }
                }
                rows
            },
            Except => left.rows
                          .iter()
                          .filter(|row| !in_right.contains(&RowKey(row)))
                          .cloned()
                          .collect(),
            And | Or | Equal | Less => {
                return Err(RuntimeError::OperatorMismatch { operator: op.to_string(),
                                                            expected: "a set operator", });
            },
        };

        debug!(%op, left = left.rows.len(), right = right.rows.len(), result = rows.len(), "set operation");

        Ok(Table::new(left.schema, rows))
    }
}
