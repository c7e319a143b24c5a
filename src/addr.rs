//! Cell address and range algebra.
//!
//! Rows and columns are 1-based `u32`; column letters use bijective base-26
//! (A=1 .. Z=26, AA=27, ZZ=702, AAA=703). There is no zero digit, so the
//! usual base conversion is shifted by one on each step.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FramexlError, Result};

/// Render a 1-based column number as letters ("A", "Z", "AA", "ZZZ").
pub fn column_name(mut column: u32) -> String {
    let mut name = String::new();
    while column > 0 {
        let rem = ((column - 1) % 26) as u8;
        name.insert(0, (b'A' + rem) as char);
        column = (column - 1) / 26;
    }
    name
}

/// Parse column letters back to the 1-based number. Empty or non-alphabetic
/// input is InvalidAddress.
pub fn column_number(name: &str) -> Result<u32> {
    if name.is_empty() {
        return Err(FramexlError::InvalidAddress(name.to_string()));
    }
    let mut column: u32 = 0;
    for ch in name.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(FramexlError::InvalidAddress(name.to_string()));
        }
        let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        column = column
            .checked_mul(26)
            .and_then(|c| c.checked_add(digit))
            .ok_or_else(|| FramexlError::InvalidAddress(name.to_string()))?;
    }
    Ok(column)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: u32,
    pub col: u32,
}

impl CellAddress {
    /// Both coordinates are 1-based; zero is OutOfBounds.
    pub fn new(row: u32, col: u32) -> Result<Self> {
        if row == 0 || col == 0 {
            return Err(FramexlError::OutOfBounds(format!(
                "cell coordinates are 1-based, got row {row}, col {col}"
            )));
        }
        Ok(Self { row, col })
    }

    /// Move by a signed delta, erroring if the result would leave the grid.
    pub fn offset(&self, dr: i64, dc: i64) -> Result<Self> {
        self.checked_offset(dr, dc).ok_or_else(|| {
            FramexlError::OutOfBounds(format!(
                "offset ({dr}, {dc}) from {self} would move before A1"
            ))
        })
    }

    /// Like `offset` but returns None off-grid. Used by the sentinel probes
    /// that hug the table edges.
    pub fn checked_offset(&self, dr: i64, dc: i64) -> Option<Self> {
        let row = i64::from(self.row) + dr;
        let col = i64::from(self.col) + dc;
        if row < 1 || col < 1 || row > i64::from(u32::MAX) || col > i64::from(u32::MAX) {
            return None;
        }
        Some(Self {
            row: row as u32,
            col: col as u32,
        })
    }

    /// Grow into a range of `height` x `width` cells with self as the
    /// top-left corner. Zero extents are OutOfBounds.
    pub fn resize(&self, height: u32, width: u32) -> Result<CellRange> {
        if height == 0 || width == 0 {
            return Err(FramexlError::OutOfBounds(format!(
                "resize to {height}x{width} from {self}: extents must be at least 1"
            )));
        }
        Ok(CellRange {
            start: *self,
            end: Self {
                row: self.row + (height - 1),
                col: self.col + (width - 1),
            },
        })
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row)
    }
}

impl FromStr for CellAddress {
    type Err = FramexlError;

    fn from_str(s: &str) -> Result<Self> {
        let split = s.find(|c: char| c.is_ascii_digit());
        let Some(split) = split else {
            return Err(FramexlError::InvalidAddress(s.to_string()));
        };
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || digits.chars().any(|c| !c.is_ascii_digit()) {
            return Err(FramexlError::InvalidAddress(s.to_string()));
        }
        let col = column_number(letters)?;
        let row: u32 = digits
            .parse()
            .map_err(|_| FramexlError::InvalidAddress(s.to_string()))?;
        if row == 0 {
            return Err(FramexlError::InvalidAddress(s.to_string()));
        }
        Ok(Self { row, col })
    }
}

/// Rectangular block of cells. `start` is always the top-left corner and
/// `end` the bottom-right; construction normalizes unordered corner pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress {
                row: a.row.min(b.row),
                col: a.col.min(b.col),
            },
            end: CellAddress {
                row: a.row.max(b.row),
                col: a.col.max(b.col),
            },
        }
    }

    pub fn single(cell: CellAddress) -> Self {
        Self {
            start: cell,
            end: cell,
        }
    }

    pub fn rows(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    pub fn cols(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    pub fn contains(&self, cell: CellAddress) -> bool {
        cell.row >= self.start.row
            && cell.row <= self.end.row
            && cell.col >= self.start.col
            && cell.col <= self.end.col
    }

    /// Translate the whole range, erroring if either corner would leave the
    /// grid.
    pub fn offset(&self, dr: i64, dc: i64) -> Result<Self> {
        Ok(Self {
            start: self.start.offset(dr, dc)?,
            end: self.end.offset(dr, dc)?,
        })
    }

    /// Keep the top-left corner, change the extents.
    pub fn resize(&self, height: u32, width: u32) -> Result<Self> {
        self.start.resize(height, width)
    }

    pub fn resize_rows(&self, height: u32) -> Result<Self> {
        self.start.resize(height, self.cols())
    }

    pub fn resize_cols(&self, width: u32) -> Result<Self> {
        self.start.resize(self.rows(), width)
    }

    /// Row-major cell iterator, used to align rectangular value payloads.
    pub fn iter_cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        let (r0, r1) = (self.start.row, self.end.row);
        let (c0, c1) = (self.start.col, self.end.col);
        (r0..=r1).flat_map(move |row| (c0..=c1).map(move |col| CellAddress { row, col }))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

impl FromStr for CellRange {
    type Err = FramexlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((a, b)) => Ok(Self::new(a.parse()?, b.parse()?)),
            None => Ok(Self::single(s.parse()?)),
        }
    }
}
