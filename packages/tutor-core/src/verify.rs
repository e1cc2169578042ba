//! Comparison of actual scenario rows against expected rows.

use serde::Serialize;
use thiserror::Error;

use crate::engine::{format_row, Row, Value};
use crate::scenario::RowOrder;

/// Query succeeded but returned different rows than expected.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error(
    "{} expected rows missing, {} unexpected rows returned{}",
    .missing.len(),
    .extra.len(),
    order_note(.order_mismatch)
)]
pub struct VerificationFailure {
    /// Expected rows not found in the result
    pub missing: Vec<Row>,
    /// Returned rows not present in the expectation
    pub extra: Vec<Row>,
    /// Same rows, different sequence (only for `RowOrder::Exact`)
    pub order_mismatch: bool,
}

fn order_note(order_mismatch: &bool) -> &'static str {
    if *order_mismatch {
        ", rows out of order"
    } else {
        ""
    }
}

impl VerificationFailure {
    /// Human-readable diff, one row per line.
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();
        lines.extend(self.missing.iter().map(|r| format!("- {}", format_row(r))));
        lines.extend(self.extra.iter().map(|r| format!("+ {}", format_row(r))));
        if self.order_mismatch {
            lines.push("~ rows returned in a different order".to_string());
        }
        lines.join("\n")
    }
}

/// Compares two rows field by field.
pub fn rows_match(a: &[Value], b: &[Value], tolerance: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.approx_eq(y, tolerance))
}

/// Verifies `actual` against `expected`.
///
/// Unordered comparison treats both sides as multisets: every expected row
/// must be matched by a distinct actual row. Numeric fields compare within
/// `tolerance`.
///
/// # Returns
/// `Ok(())` on a match, otherwise the missing and extra rows.
pub fn verify(
    actual: &[Row],
    expected: &[Row],
    order: RowOrder,
    tolerance: f64,
) -> Result<(), VerificationFailure> {
    let (missing, extra) = multiset_diff(actual, expected, tolerance);

    let order_mismatch = order == RowOrder::Exact
        && missing.is_empty()
        && extra.is_empty()
        && !actual
            .iter()
            .zip(expected)
            .all(|(a, e)| rows_match(a, e, tolerance));

    if missing.is_empty() && extra.is_empty() && !order_mismatch {
        Ok(())
    } else {
        Err(VerificationFailure {
            missing,
            extra,
            order_mismatch,
        })
    }
}

/// Pairs expected rows with actual rows one-to-one through a maximum
/// bipartite matching, so overlapping tolerance windows cannot strand a row
/// that another pairing would have matched. Missing and extra rows keep
/// their input order.
fn multiset_diff(actual: &[Row], expected: &[Row], tolerance: f64) -> (Vec<Row>, Vec<Row>) {
    let candidates: Vec<Vec<usize>> = expected
        .iter()
        .map(|want| {
            actual
                .iter()
                .enumerate()
                .filter(|(_, got)| rows_match(got, want, tolerance))
                .map(|(i, _)| i)
                .collect()
        })
        .collect();

    // owner[i] is the expected row currently paired with actual row i
    let mut owner: Vec<Option<usize>> = vec![None; actual.len()];
    let mut missing = Vec::new();
    for (want, row) in expected.iter().enumerate() {
        let mut visited = vec![false; actual.len()];
        if !augment(want, &candidates, &mut owner, &mut visited) {
            missing.push(row.clone());
        }
    }

    let extra = actual
        .iter()
        .zip(&owner)
        .filter(|(_, paired)| paired.is_none())
        .map(|(row, _)| row.clone())
        .collect();

    (missing, extra)
}

/// Finds an augmenting path for `want`, re-pairing earlier rows if needed.
/// Leaves `owner` untouched when no path exists.
fn augment(
    want: usize,
    candidates: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &got in &candidates[want] {
        if visited[got] {
            continue;
        }
        visited[got] = true;
        let free = match owner[got] {
            None => true,
            Some(other) => augment(other, candidates, owner, visited),
        };
        if free {
            owner[got] = Some(want);
            return true;
        }
    }
    false
}
