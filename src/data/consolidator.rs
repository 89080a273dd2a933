// ============================================================
// Layer 4 — Consolidator
// ============================================================
// Turns many raw listing tables into one clean table:
//
//   1. Union the tables. Columns keep first-seen order; a row
//      from a file without some column gets a missing cell.
//   2. Drop duplicate rows, keeping the first occurrence. Cells
//      of numeric columns compare by value ("100" == "100.0"),
//      everything else compares as text.
//   3. Drop every row that still has a missing cell.
//
// No imputation and no partial repair: a row is either kept
// exactly as it was read, or dropped.

use serde::Serialize;
use std::collections::HashSet;

use crate::data::schema::{column_kind, ColumnKind};
use crate::domain::table::Table;

/// Counts describing one consolidation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidationReport {
    pub files:              usize,
    pub raw_rows:           usize,
    pub duplicates_removed: usize,
    pub incomplete_removed: usize,
    pub rows_written:       usize,
    pub columns:            Vec<String>,
}

/// Concatenate tables under the union of their headers.
pub fn merge_tables(tables: &[Table]) -> Table {
    let mut headers: Vec<String> = Vec::new();
    for table in tables {
        for h in &table.headers {
            if !headers.contains(h) {
                headers.push(h.clone());
            }
        }
    }

    let mut merged = Table::new("merged", headers);
    for table in tables {
        // Position of each merged column inside this table, if any
        let mapping: Vec<Option<usize>> = merged
            .headers
            .iter()
            .map(|h| table.column_index(h))
            .collect();

        for row in &table.rows {
            let out = mapping
                .iter()
                .map(|idx| idx.and_then(|i| row.get(i).cloned().flatten()))
                .collect();
            merged.push_row(out);
        }
    }
    merged
}

/// Remove duplicates in place; returns how many were removed.
/// The surviving row keeps its original text.
pub fn drop_duplicates(table: &mut Table) -> usize {
    let numeric: Vec<bool> = (0..table.headers.len())
        .map(|i| column_kind(table, i) == ColumnKind::Numeric)
        .collect();

    let before = table.rows.len();
    let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(before);
    table.rows.retain(|row| seen.insert(dedupe_key(row, &numeric)));
    before - table.rows.len()
}

fn dedupe_key(row: &[Option<String>], numeric: &[bool]) -> Vec<Option<String>> {
    row.iter()
        .zip(numeric)
        .map(|(cell, &is_numeric)| {
            cell.as_deref().map(|text| match text.trim().parse::<f64>() {
                // + 0.0 folds -0 into 0
                Ok(value) if is_numeric => (value + 0.0).to_string(),
                _ => text.to_string(),
            })
        })
        .collect()
}

/// Remove rows with any missing cell; returns how many were removed.
pub fn drop_incomplete(table: &mut Table) -> usize {
    let before = table.rows.len();
    table.rows.retain(|row| row.iter().all(Option::is_some));
    before - table.rows.len()
}

/// Run the full merge → dedupe → drop-incomplete sequence.
pub fn consolidate(tables: &[Table]) -> (Table, ConsolidationReport) {
    let mut merged = merge_tables(tables);
    merged.source  = "consolidated".to_string();
    let raw_rows   = merged.len();

    let duplicates_removed = drop_duplicates(&mut merged);
    let incomplete_removed = drop_incomplete(&mut merged);

    let report = ConsolidationReport {
        files:   tables.len(),
        raw_rows,
        duplicates_removed,
        incomplete_removed,
        rows_written: merged.len(),
        columns: merged.headers.clone(),
    };
    (merged, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::new("t", headers.iter().map(|h| h.to_string()).collect());
        for r in rows {
            t.push_row(
                r.iter()
                    .map(|c| (!c.is_empty()).then(|| c.to_string()))
                    .collect(),
            );
        }
        t
    }

    #[test]
    fn test_duplicates_and_incomplete_rows_removed() {
        let a = table(&["price", "fuel"], &[&["100", "gas"], &["100", "gas"], &["200", ""]]);
        let b = table(&["price", "fuel"], &[&["100", "gas"], &["300", "oil"]]);

        let (out, report) = consolidate(&[a, b]);
        assert_eq!(out.rows.len(), 2);
        assert_eq!(report.raw_rows, 5);
        assert_eq!(report.duplicates_removed, 2);
        assert_eq!(report.incomplete_removed, 1);
        assert_eq!(report.rows_written, 2);
        assert_eq!(out.rows[0], vec![Some("100".into()), Some("gas".into())]);
        assert_eq!(out.rows[1], vec![Some("300".into()), Some("oil".into())]);
    }

    #[test]
    fn test_numeric_duplicates_compare_by_value() {
        let mut t = table(
            &["price", "lotSize", "fuel"],
            &[&["100", "0.5", "gas"], &["100.0", "0.50", "gas"], &["100", "0.5", "Gas"]],
        );

        assert_eq!(drop_duplicates(&mut t), 1);
        // First spelling wins; labels stay case-sensitive
        assert_eq!(t.rows[0][0].as_deref(), Some("100"));
        assert_eq!(t.rows[1][2].as_deref(), Some("Gas"));
    }

    #[test]
    fn test_union_of_headers_marks_absent_columns_missing() {
        let a = table(&["price", "fuel"], &[&["100", "gas"]]);
        let b = table(&["fuel", "price", "age"], &[&["oil", "200", "5"]]);

        let merged = merge_tables(&[a, b]);
        assert_eq!(merged.headers, vec!["price", "fuel", "age"]);
        assert_eq!(merged.rows[0], vec![Some("100".into()), Some("gas".into()), None]);
        assert_eq!(
            merged.rows[1],
            vec![Some("200".into()), Some("oil".into()), Some("5".into())]
        );

        // the first row lacks 'age' and cannot survive
        let (out, _) = consolidate(&[merged]);
        assert_eq!(out.rows.len(), 1);
    }

    #[test]
    fn test_consolidation_is_idempotent() {
        let a = table(&["price", "fuel"], &[&["100", "gas"], &["100", "gas"], &["", "oil"]]);
        let (first, _)  = consolidate(&[a.clone()]);
        let (second, _) = consolidate(&[first.clone()]);
        assert_eq!(first.rows, second.rows);
    }
}
