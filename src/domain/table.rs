// ============================================================
// Layer 3 — Table Domain Type
// ============================================================
// A loaded CSV file: a header row plus data rows whose cells
// are `None` when the value was missing in the source file.
//
// Keeping "missing" explicit (instead of an empty string)
// lets consolidation drop incomplete rows and lets schema
// inference ignore holes without guessing.

/// A rectangular table of optional string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Where the table came from (file name or a synthetic label)
    pub source: String,

    /// Column names in file order
    pub headers: Vec<String>,

    /// Data rows; every row has `headers.len()` cells
    pub rows: Vec<Vec<Option<String>>>,
}

impl Table {
    pub fn new(source: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            source:  source.into(),
            headers,
            rows:    Vec::new(),
        }
    }

    /// Append a row, padding short rows with missing cells.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows without any missing cell, borrowed as plain strings.
    pub fn complete_rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.rows.iter().filter_map(|row| {
            row.iter()
                .map(|cell| cell.as_deref())
                .collect::<Option<Vec<&str>>>()
        })
    }

    /// Number of rows that have at least one missing cell.
    pub fn incomplete_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| row.iter().any(Option::is_none))
            .count()
    }
}
