use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tubescan_core::{rack_label, row_letter, RACK_COLS, RACK_ROWS};

/// A serialized rack table did not have 8 rows of 12 cells.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("rack table must be 8x12, got {rows} rows (row widths {widths:?})")]
pub struct GridShapeError {
    pub rows: usize,
    pub widths: Vec<usize>,
}

/// Fixed 8×12 table of decoded payloads, indexed `(row, col)` from 0.
///
/// Rows map to rack letters `A`..`H`, columns to `1`..`12`. A cell holds at
/// most one payload; empty cells are tubes with no readable symbol.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Option<String>>>", into = "Vec<Vec<Option<String>>>")]
pub struct RackGrid {
    cells: Vec<Option<String>>,
}

impl Default for RackGrid {
    fn default() -> Self {
        Self {
            cells: vec![None; RACK_ROWS * RACK_COLS],
        }
    }
}

impl RackGrid {
    /// Empty rack.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn index(row: usize, col: usize) -> Option<usize> {
        (row < RACK_ROWS && col < RACK_COLS).then_some(row * RACK_COLS + col)
    }

    /// Payload at `(row, col)`, if the cell is filled.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        Self::index(row, col).and_then(|i| self.cells[i].as_deref())
    }

    /// Write `payload` into an empty cell.
    ///
    /// Returns the current occupant if the cell is already filled, or
    /// `Err(None)` if `(row, col)` is outside the rack.
    pub(crate) fn place(
        &mut self,
        row: usize,
        col: usize,
        payload: &str,
    ) -> Result<(), Option<String>> {
        let i = Self::index(row, col).ok_or(None)?;
        if let Some(existing) = &self.cells[i] {
            return Err(Some(existing.clone()));
        }
        self.cells[i] = Some(payload.to_owned());
        Ok(())
    }

    /// Number of filled cells.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Rack positions `(row, col)` without a payload, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        (0..RACK_ROWS)
            .flat_map(|r| (0..RACK_COLS).map(move |c| (r, c)))
            .filter(|&(r, c)| self.get(r, c).is_none())
            .collect()
    }

    /// Filled cells as `(row, col, payload)`, row-major.
    pub fn iter_filled(&self) -> impl Iterator<Item = (usize, usize, &str)> + '_ {
        self.cells.iter().enumerate().filter_map(|(i, cell)| {
            cell.as_deref()
                .map(|payload| (i / RACK_COLS, i % RACK_COLS, payload))
        })
    }

    /// Number of rows and columns spanned by the filled cells, counted from
    /// the rack origin: `(max_row + 1, max_col + 1)`, or `(0, 0)` when empty.
    pub fn extent(&self) -> (usize, usize) {
        self.iter_filled()
            .fold((0, 0), |(rows, cols), (r, c, _)| (rows.max(r + 1), cols.max(c + 1)))
    }

    /// Rack label such as `"A1"`.
    pub fn label(row: usize, col: usize) -> Option<String> {
        rack_label(row, col)
    }

    /// Text export, one `plate,row,col,barcode` line per filled cell after a
    /// `#Plate,Row,Col,Barcode` header. Rows are letters, columns 1-based.
    pub fn to_csv(&self, plate: u8) -> String {
        let mut out = String::from("#Plate,Row,Col,Barcode\n");
        for (row, col, payload) in self.iter_filled() {
            let letter = row_letter(row).unwrap_or('?');
            let _ = writeln!(out, "{plate},{letter},{},{payload}", col + 1);
        }
        out
    }

    /// Human-readable table with rack letters and column numbers; empty cells
    /// print as `-`.
    pub fn to_table(&self) -> String {
        let width = self
            .iter_filled()
            .map(|(_, _, p)| p.chars().count())
            .max()
            .unwrap_or(1)
            .max(2);
        let mut out = String::from(" ");
        for col in 0..RACK_COLS {
            let _ = write!(out, " {:>width$}", col + 1);
        }
        out.push('\n');
        for row in 0..RACK_ROWS {
            out.push(row_letter(row).unwrap_or('?'));
            for col in 0..RACK_COLS {
                let _ = write!(out, " {:>width$}", self.get(row, col).unwrap_or("-"));
            }
            out.push('\n');
        }
        out
    }
}

impl From<RackGrid> for Vec<Vec<Option<String>>> {
    fn from(grid: RackGrid) -> Self {
        grid.cells.chunks(RACK_COLS).map(<[_]>::to_vec).collect()
    }
}

impl TryFrom<Vec<Vec<Option<String>>>> for RackGrid {
    type Error = GridShapeError;

    fn try_from(rows: Vec<Vec<Option<String>>>) -> Result<Self, Self::Error> {
        if rows.len() != RACK_ROWS || rows.iter().any(|r| r.len() != RACK_COLS) {
            return Err(GridShapeError {
                rows: rows.len(),
                widths: rows.iter().map(Vec::len).collect(),
            });
        }
        Ok(Self {
            cells: rows.into_iter().flatten().collect(),
        })
    }
}
