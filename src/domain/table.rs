//! In-memory data table as delivered by the loading collaborator.
//!
//! File parsing (CSV/Excel/etc.) lives outside this crate; whatever the loader
//! produces arrives here as a rectangular matrix of cells. Cells may still be
//! raw text, spreadsheets being what they are, so coercion to `f64` happens at
//! column extraction time, with errors that name the exact cell.

use crate::error::FitError;

/// A single table cell: already numeric, or raw text awaiting coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Num(f64),
    Text(String),
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Num(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

/// Rectangular matrix of cells; rows are observations, columns are fields.
#[derive(Debug, Clone)]
pub struct DataTable {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl DataTable {
    /// Build a table from rows, enforcing rectangularity.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, FitError> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(FitError::conversion(format!(
                    "row {} has {} columns, expected {width}",
                    i + 1,
                    row.len()
                )));
            }
        }
        Ok(Self { rows, width })
    }

    /// Build a table from equal-length numeric columns.
    pub fn from_columns(columns: Vec<Vec<f64>>) -> Result<Self, FitError> {
        let n_rows = columns.first().map(|c| c.len()).unwrap_or(0);
        for (i, col) in columns.iter().enumerate() {
            if col.len() != n_rows {
                return Err(FitError::conversion(format!(
                    "column {i} has {} values, expected {n_rows}",
                    col.len()
                )));
            }
        }
        let rows = (0..n_rows)
            .map(|r| columns.iter().map(|c| Cell::Num(c[r])).collect())
            .collect();
        Ok(Self {
            rows,
            width: columns.len(),
        })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.width
    }

    /// Extract one column as `f64`, coercing text cells (trimmed) on the way.
    pub fn column(&self, index: usize) -> Result<Vec<f64>, FitError> {
        if index >= self.width {
            return Err(FitError::configuration(format!(
                "column index {index} is out of range for a table with {} columns",
                self.width
            )));
        }
        let mut out = Vec::with_capacity(self.rows.len());
        for (i, row) in self.rows.iter().enumerate() {
            out.push(coerce(&row[index], index, i)?);
        }
        Ok(out)
    }
}

fn coerce(cell: &Cell, column: usize, row: usize) -> Result<f64, FitError> {
    match cell {
        Cell::Num(v) => Ok(*v),
        Cell::Text(s) => s.trim().parse::<f64>().map_err(|_| {
            FitError::conversion(format!(
                "column {column}, row {}: cannot convert {s:?} to a number",
                row + 1
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn ragged_rows_are_rejected() {
        let rows = vec![
            vec![Cell::Num(1.0), Cell::Num(2.0)],
            vec![Cell::Num(3.0)],
        ];
        let err = DataTable::from_rows(rows).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert!(err.message().contains("row 2"));
    }

    #[test]
    fn text_cells_coerce_with_whitespace() {
        let table = DataTable::from_rows(vec![
            vec![Cell::from(" 1.5 "), Cell::Num(2.0)],
            vec![Cell::from("-3e2"), Cell::Num(4.0)],
        ])
        .unwrap();
        assert_eq!(table.column(0).unwrap(), vec![1.5, -300.0]);
    }

    #[test]
    fn non_numeric_cell_names_column_and_row() {
        let table = DataTable::from_rows(vec![
            vec![Cell::Num(1.0), Cell::from("ok?")],
            vec![Cell::Num(2.0), Cell::from("oops")],
        ])
        .unwrap();
        let err = table.column(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
        assert!(err.message().contains("column 1"));
        assert!(err.message().contains("row 1"));
        assert!(err.message().contains("ok?"));
    }

    #[test]
    fn out_of_range_index_is_a_configuration_error() {
        let table = DataTable::from_columns(vec![vec![1.0, 2.0]]).unwrap();
        let err = table.column(3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn from_columns_requires_equal_lengths() {
        let err = DataTable::from_columns(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conversion);
    }

    #[test]
    fn from_columns_round_trips() {
        let table = DataTable::from_columns(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(table.n_rows(), 3);
        assert_eq!(table.n_cols(), 2);
        assert_eq!(table.column(1).unwrap(), vec![4.0, 5.0, 6.0]);
    }
}
