/// Number of tube rows in a rack (letters `A`..`H`).
pub const RACK_ROWS: usize = 8;

/// Number of tube columns in a rack (numbers `1`..`12`).
pub const RACK_COLS: usize = 12;

/// Letter used on the rack for a 0-based row index.
pub fn row_letter(row: usize) -> Option<char> {
    if row >= RACK_ROWS {
        return None;
    }
    Some(char::from(b'A' + row as u8))
}

/// Rack position label such as `"A1"` or `"H12"` for 0-based indices.
pub fn rack_label(row: usize, col: usize) -> Option<String> {
    if col >= RACK_COLS {
        return None;
    }
    let letter = row_letter(row)?;
    Some(format!("{letter}{}", col + 1))
}
