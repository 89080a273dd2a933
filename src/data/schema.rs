// ============================================================
// Layer 4 — Schema Inference
// ============================================================
// Splits the dataset's columns into numeric and categorical
// without a hand-written schema:
//
//   numeric     → every present value parses as a finite number
//   categorical → anything else (labels like "gas", "Yes", ...)
//
// The target column (price) must exist and must be numeric;
// it is kept out of the feature columns.

use serde::{Deserialize, Serialize};

use crate::domain::table::Table;
use crate::error::EstimatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// One feature column and where it sits in the source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name:  String,
    pub kind:  ColumnKind,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub target:       String,
    /// Feature columns in table order, target excluded
    pub columns:      Vec<ColumnSpec>,
}

impl Schema {
    /// Infer the schema of `table`, requiring `target` to be present.
    pub fn infer(table: &Table, target: &str) -> Result<Self, EstimatorError> {
        let target_index = table
            .column_index(target)
            .ok_or_else(|| EstimatorError::MissingTargetColumn {
                column: target.to_string(),
                path:   table.source.clone(),
            })?;

        if column_kind(table, target_index) != ColumnKind::Numeric {
            return Err(EstimatorError::TargetNotNumeric { column: target.to_string() });
        }

        let columns = table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target_index)
            .map(|(index, name)| ColumnSpec {
                name: name.clone(),
                kind: column_kind(table, index),
                index,
            })
            .collect();

        Ok(Self {
            target: target.to_string(),
            columns,
        })
    }

    pub fn numeric(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.kind == ColumnKind::Numeric)
    }

    pub fn categorical(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|c| c.kind == ColumnKind::Categorical)
    }
}

/// Numeric when every present cell of column `index` is a finite number.
pub fn column_kind(table: &Table, index: usize) -> ColumnKind {
    let all_numeric = table
        .rows
        .iter()
        .filter_map(|row| row.get(index).and_then(|c| c.as_deref()))
        .all(|v| v.trim().parse::<f64>().is_ok_and(f64::is_finite));

    if all_numeric {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}
