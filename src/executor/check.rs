//! Compares what the engine returned with what the case expects.

use tracing::debug;

use super::{CaseFailure, Stage};
use crate::case::datum::render_row;
use crate::case::{ColumnDef, ColumnType, Datum, Expectation};
use crate::engine::{EngineError, ResultSet};

/// Checks a query outcome against the case expectation.
pub fn verify(
    expect: &Expectation,
    outcome: Result<ResultSet, EngineError>,
) -> Result<(), CaseFailure> {
    match (expect.success, outcome) {
        (false, Ok(result)) => Err(CaseFailure::UnexpectedSuccess {
            rows: result.rows.len(),
        }),
        (false, Err(err)) => {
            debug!(error = %err, "query failed as expected");
            Ok(())
        }
        (true, Err(err)) => Err(CaseFailure::Engine {
            stage: Stage::Execute,
            source: err,
        }),
        (true, Ok(result)) => compare(expect, result),
    }
}

fn compare(expect: &Expectation, result: ResultSet) -> Result<(), CaseFailure> {
    let expected_columns = expect
        .column_defs()
        .map_err(|e| CaseFailure::Definition(e.to_string()))?;

    if !expected_columns.is_empty() && expected_columns != result.columns {
        return Err(CaseFailure::ColumnMismatch {
            expected: render_columns(&expected_columns),
            actual: render_columns(&result.columns),
        });
    }

    if let Some(count) = expect.count {
        if count != result.rows.len() {
            return Err(CaseFailure::CountMismatch {
                expected: count,
                actual: result.rows.len(),
            });
        }
    }

    let Some(expected_rows) = &expect.rows else {
        return Ok(());
    };
    let columns = if expected_columns.is_empty() {
        &result.columns
    } else {
        &expected_columns
    };
    let types: Vec<Option<ColumnType>> = columns.iter().map(|c| Some(c.ty)).collect();

    let mut expected_rows = expected_rows.clone();
    let mut actual_rows = result.rows;
    if let Some(order) = &expect.order {
        let idx = columns
            .iter()
            .position(|c| &c.name == order)
            .ok_or_else(|| {
                CaseFailure::Definition(format!("order column '{}' is not in the result", order))
            })?;
        sort_rows(&mut expected_rows, idx);
        sort_rows(&mut actual_rows, idx);
    }

    let mismatch = expected_rows
        .iter()
        .zip(&actual_rows)
        .position(|(e, a)| !rows_match(e, a, &types))
        .or_else(|| {
            (expected_rows.len() != actual_rows.len())
                .then(|| expected_rows.len().min(actual_rows.len()))
        });

    match mismatch {
        Some(index) => Err(CaseFailure::RowMismatch {
            index,
            expected: render_rows(&expected_rows),
            actual: render_rows(&actual_rows),
        }),
        None => Ok(()),
    }
}

fn rows_match(expected: &[Datum], actual: &[Datum], types: &[Option<ColumnType>]) -> bool {
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual)
            .enumerate()
            .all(|(i, (e, a))| e.matches(a, types.get(i).copied().flatten()))
}

fn sort_rows(rows: &mut [Vec<Datum>], idx: usize) {
    rows.sort_by(|a, b| match (a.get(idx), b.get(idx)) {
        (Some(x), Some(y)) => x.sort_cmp(y),
        (x, y) => x.is_some().cmp(&y.is_some()),
    });
}

fn render_columns(columns: &[ColumnDef]) -> String {
    columns
        .iter()
        .map(ColumnDef::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_rows(rows: &[Vec<Datum>]) -> String {
    rows.iter()
        .map(|r| render_row(r))
        .collect::<Vec<_>>()
        .join("\n")
}
