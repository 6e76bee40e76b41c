pub mod evaluator;
pub mod parser;
pub mod tokenizer;

use crate::error::{SpliceError, SpliceResult};
use crate::types::Table;
use evaluator::{evaluate_predicate, RowContext};
use parser::Expr;
use tracing::debug;

/// A parsed where clause
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    source: String,
    expr: Expr,
}

impl Predicate {
    /// Parse a where clause. Syntax errors carry the original text.
    pub fn parse(text: &str) -> SpliceResult<Self> {
        let tokens = tokenizer::tokenize(text)
            .map_err(|e| SpliceError::expression(text, e.to_string()))?;
        let expr = parser::parse(tokens).map_err(|e| SpliceError::expression(text, e.to_string()))?;
        Ok(Self {
            source: text.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Fail with ColumnNotFound if the predicate names a column the table
    /// lacks
    pub fn check_columns(&self, table: &Table) -> SpliceResult<()> {
        match self
            .expr
            .columns()
            .into_iter()
            .find(|c| table.column_index(c).is_none())
        {
            Some(missing) => Err(SpliceError::ColumnNotFound {
                column: missing.to_string(),
                available: table.columns.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Does row `idx` of `table` satisfy the predicate?
    pub fn matches(&self, table: &Table, idx: usize) -> SpliceResult<bool> {
        let cells = table.rows.get(idx).ok_or_else(|| {
            SpliceError::expression(
                &self.source,
                format!("row {} out of range ({} rows)", idx, table.row_count()),
            )
        })?;
        let row = RowContext::new(&table.columns, cells);
        evaluate_predicate(&self.expr, &row).map_err(|e| SpliceError::expression(&self.source, e.0))
    }
}

/// Column selection plus row predicate applied to an extracted table
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    select: Option<Vec<String>>,
    predicate: Option<Predicate>,
}

impl QueryFilter {
    /// Build a filter from the raw `--select` and `--where` strings. Blank
    /// strings count as absent.
    pub fn new(select_columns: Option<&str>, where_clause: Option<&str>) -> SpliceResult<Self> {
        let select = select_columns
            .filter(|s| !s.trim().is_empty())
            .map(parse_selection)
            .transpose()?;
        let predicate = where_clause
            .filter(|w| !w.trim().is_empty())
            .map(Predicate::parse)
            .transpose()?;
        Ok(Self { select, predicate })
    }

    pub fn is_identity(&self) -> bool {
        self.select.is_none() && self.predicate.is_none()
    }

    /// Apply the predicate (against all columns), then the column selection.
    /// Either the whole result is returned or an error; never partial rows.
    pub fn apply(&self, table: &Table) -> SpliceResult<Table> {
        let mut keep: Vec<usize> = (0..table.row_count()).collect();

        if let Some(predicate) = &self.predicate {
            predicate.check_columns(table)?;
            let mut matched = Vec::with_capacity(keep.len());
            for idx in keep {
                if predicate.matches(table, idx)? {
                    matched.push(idx);
                }
            }
            keep = matched;
        }

        let (columns, positions) = match &self.select {
            Some(names) => {
                let positions = names
                    .iter()
                    .map(|name| {
                        table
                            .column_index(name)
                            .ok_or_else(|| SpliceError::ColumnNotFound {
                                column: name.clone(),
                                available: table.columns.clone(),
                            })
                    })
                    .collect::<SpliceResult<Vec<_>>>()?;
                (names.clone(), positions)
            }
            None => (table.columns.clone(), (0..table.column_count()).collect()),
        };

        let rows = keep
            .into_iter()
            .map(|idx| {
                let row = &table.rows[idx];
                positions
                    .iter()
                    .map(|&p| row.get(p).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        let filtered = Table { columns, rows };
        debug!(
            rows_in = table.row_count(),
            rows_out = filtered.row_count(),
            columns_out = filtered.column_count(),
            "filtered table"
        );
        Ok(filtered)
    }
}

/// Split a comma-separated column list. Names are trimmed, empty entries
/// skipped, repeats rejected. A list with no names at all is rejected.
pub fn parse_selection(select: &str) -> SpliceResult<Vec<String>> {
    let mut names: Vec<String> = Vec::new();
    for name in select.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if names.iter().any(|n| n == name) {
            return Err(SpliceError::Config(format!(
                "Column '{}' selected more than once",
                name
            )));
        }
        names.push(name.to_string());
    }
    if names.is_empty() {
        return Err(SpliceError::Config(format!(
            "No columns selected in '{}'",
            select
        )));
    }
    Ok(names)
}

/// Filter a table with optional `select_columns` and `where_clause`
pub fn filter_table(
    table: &Table,
    select_columns: Option<&str>,
    where_clause: Option<&str>,
) -> SpliceResult<Table> {
    QueryFilter::new(select_columns, where_clause)?.apply(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;
    use pretty_assertions::assert_eq;

    fn animals() -> Table {
        Table::with_rows(
            vec!["kind".into(), "DOG".into(), "SIZE".into()],
            vec![
                vec![Cell::text("H"), Cell::text("DOG_t"), Cell::Int(25)],
                vec![Cell::text("H"), Cell::text("DOG_u"), Cell::Int(30)],
                vec![Cell::text("H"), Cell::text("DOG_t"), Cell::Int(40)],
            ],
        )
    }

    #[test]
    fn test_identity_when_no_options() {
        let table = animals();
        let filter = QueryFilter::new(None, None).unwrap();
        assert!(filter.is_identity());
        assert_eq!(filter.apply(&table).unwrap(), table);
    }

    #[test]
    fn test_blank_options_are_identity() {
        let table = animals();
        assert_eq!(filter_table(&table, Some(""), Some("  ")).unwrap(), table);
    }

    #[test]
    fn test_where_keeps_matching_rows_in_order() {
        let out = filter_table(&animals(), None, Some("DOG == \"DOG_t\"")).unwrap();
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.get(0, "SIZE"), Some(&Cell::Int(25)));
        assert_eq!(out.get(1, "SIZE"), Some(&Cell::Int(40)));
    }

    #[test]
    fn test_select_reorders_columns() {
        let out = filter_table(&animals(), Some("SIZE, DOG"), None).unwrap();
        assert_eq!(out.columns, vec!["SIZE".to_string(), "DOG".to_string()]);
        assert_eq!(out.rows[1], vec![Cell::Int(30), Cell::text("DOG_u")]);
    }

    #[test]
    fn test_where_may_use_unselected_columns() {
        let out = filter_table(&animals(), Some("DOG"), Some("SIZE > 26")).unwrap();
        assert_eq!(
            out.rows,
            vec![vec![Cell::text("DOG_u")], vec![Cell::text("DOG_t")]]
        );
    }

    #[test]
    fn test_select_unknown_column() {
        let err = filter_table(&animals(), Some("DOG,WEIGHT"), None).unwrap_err();
        match err {
            SpliceError::ColumnNotFound { column, available } => {
                assert_eq!(column, "WEIGHT");
                assert_eq!(available.len(), 3);
            }
            other => panic!("expected ColumnNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_where_unknown_column_fails_even_on_empty_table() {
        let empty = Table::new(vec!["DOG".into()]);
        let err = filter_table(&empty, None, Some("SIZE == 1")).unwrap_err();
        assert!(matches!(err, SpliceError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_malformed_where_carries_text() {
        let err = filter_table(&animals(), None, Some("SIZE >")).unwrap_err();
        match err {
            SpliceError::Expression { expression, .. } => assert_eq!(expression, "SIZE >"),
            other => panic!("expected Expression, got {:?}", other),
        }
    }

    #[test]
    fn test_runtime_type_error_returns_no_rows() {
        let err = filter_table(&animals(), None, Some("SIZE > 26 and DOG > 1")).unwrap_err();
        assert!(matches!(err, SpliceError::Expression { .. }));
    }

    #[test]
    fn test_duplicate_selection_rejected() {
        assert!(matches!(
            parse_selection("DOG, SIZE,DOG"),
            Err(SpliceError::Config(_))
        ));
        assert_eq!(
            parse_selection(" DOG ,, SIZE ").unwrap(),
            vec!["DOG".to_string(), "SIZE".to_string()]
        );
    }

    #[test]
    fn test_selection_without_names_rejected() {
        for select in [" , ", ",,"] {
            assert!(matches!(
                parse_selection(select),
                Err(SpliceError::Config(_))
            ));
            let err = filter_table(&animals(), Some(select), None).unwrap_err();
            assert!(err.to_string().contains("No columns selected"));
        }
    }

    #[test]
    fn test_short_rows_read_as_null() {
        let table = Table {
            columns: vec!["DOG".into(), "SIZE".into()],
            rows: vec![
                vec![Cell::text("DOG_t")],
                vec![Cell::text("DOG_u"), Cell::Int(30)],
            ],
        };

        let out = filter_table(&table, Some("SIZE, DOG"), None).unwrap();
        assert_eq!(out.rows[0], vec![Cell::Null, Cell::text("DOG_t")]);

        let out = filter_table(&table, Some("DOG"), Some("SIZE > 1")).unwrap();
        assert_eq!(out.rows, vec![vec![Cell::text("DOG_u")]]);
    }

    #[test]
    fn test_matches_out_of_range_row_is_error() {
        let predicate = Predicate::parse("SIZE > 1").unwrap();
        let err = predicate.matches(&animals(), 3).unwrap_err();
        assert!(matches!(err, SpliceError::Expression { .. }));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let table = animals();
        let before = table.clone();
        filter_table(&table, Some("DOG"), Some("SIZE == 25")).unwrap();
        assert_eq!(table, before);
    }
}
