//! Predicate evaluator
//!
//! Evaluates an AST against one row at a time. Column lookups are the only
//! access the evaluator has to the outside world.

use super::parser::{CompareOp, Expr};
use crate::types::Cell;
use std::cmp::Ordering;
use std::fmt;

/// Value produced while evaluating an expression
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Empty cell
    Null,
}

impl Value {
    fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
        }
    }
}

impl From<&Cell> for Value {
    fn from(cell: &Cell) -> Self {
        match cell {
            Cell::Null => Value::Null,
            Cell::Bool(b) => Value::Boolean(*b),
            Cell::Int(i) => Value::Number(*i as f64),
            Cell::Float(f) => Value::Number(*f),
            Cell::Text(s) => Value::Text(s.clone()),
        }
    }
}

/// Error during evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct EvalError(pub String);

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for EvalError {}

static NULL_CELL: Cell = Cell::Null;

/// One row of a table, addressed by column name
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub columns: &'a [String],
    pub cells: &'a [Cell],
}

impl<'a> RowContext<'a> {
    pub fn new(columns: &'a [String], cells: &'a [Cell]) -> Self {
        Self { columns, cells }
    }

    /// Cell for a known column; a row shorter than the header reads as null
    pub fn lookup(&self, name: &str) -> Option<&'a Cell> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.cells.get(idx).unwrap_or(&NULL_CELL))
    }
}

/// Evaluate an expression for one row
pub fn evaluate(expr: &Expr, row: &RowContext<'_>) -> Result<Value, EvalError> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Column(name) => row
            .lookup(name)
            .map(Value::from)
            .ok_or_else(|| EvalError(format!("Unknown column '{}'", name))),
        Expr::Negate(inner) => match evaluate(inner, row)? {
            Value::Number(n) => Ok(Value::Number(-n)),
            Value::Null => Ok(Value::Null),
            other => Err(EvalError(format!("Cannot negate a {}", other.type_name()))),
        },
        Expr::Compare { op, left, right } => {
            let left = evaluate(left, row)?;
            let right = evaluate(right, row)?;
            compare(*op, &left, &right).map(Value::Boolean)
        }
        Expr::And(left, right) => {
            if !expect_bool(evaluate(left, row)?, "and")? {
                return Ok(Value::Boolean(false));
            }
            expect_bool(evaluate(right, row)?, "and").map(Value::Boolean)
        }
        Expr::Or(left, right) => {
            if expect_bool(evaluate(left, row)?, "or")? {
                return Ok(Value::Boolean(true));
            }
            expect_bool(evaluate(right, row)?, "or").map(Value::Boolean)
        }
        Expr::Not(inner) => expect_bool(evaluate(inner, row)?, "not").map(|b| Value::Boolean(!b)),
    }
}

/// Evaluate an expression that must produce a boolean
pub fn evaluate_predicate(expr: &Expr, row: &RowContext<'_>) -> Result<bool, EvalError> {
    match evaluate(expr, row)? {
        Value::Boolean(b) => Ok(b),
        other => Err(EvalError(format!(
            "Expression must evaluate to a boolean, got {}",
            other.type_name()
        ))),
    }
}

fn expect_bool(value: Value, operator: &str) -> Result<bool, EvalError> {
    match value {
        Value::Boolean(b) => Ok(b),
        other => Err(EvalError(format!(
            "Operand of '{}' must be a boolean, got {}",
            operator,
            other.type_name()
        ))),
    }
}

/// Compare two values.
///
/// Null never equals anything and never orders. Booleans compare as 0/1
/// against numbers. Text only orders against text.
fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, EvalError> {
    let ordering = match (left, right) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Number(b)) => bool_number(*a).partial_cmp(b),
        (Value::Number(a), Value::Boolean(b)) => a.partial_cmp(&bool_number(*b)),
        (a, b) => {
            if matches!(op, CompareOp::Eq | CompareOp::Ne) {
                return Ok(op == CompareOp::Ne);
            }
            return Err(EvalError(format!(
                "Cannot compare {} with {} using '{}'",
                a.type_name(),
                b.type_name(),
                op
            )));
        }
    };

    Ok(match (op, ordering) {
        (CompareOp::Ne, None) => true,
        (_, None) => false,
        (CompareOp::Eq, Some(o)) => o == Ordering::Equal,
        (CompareOp::Ne, Some(o)) => o != Ordering::Equal,
        (CompareOp::Lt, Some(o)) => o == Ordering::Less,
        (CompareOp::Le, Some(o)) => o != Ordering::Greater,
        (CompareOp::Gt, Some(o)) => o == Ordering::Greater,
        (CompareOp::Ge, Some(o)) => o != Ordering::Less,
    })
}

fn bool_number(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
