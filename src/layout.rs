//! Band geometry for one exported table.
//!
//! The anchor is the top-left cell of the overall block. Depending on the
//! inclusion flags the block decomposes into up to four disjoint bands:
//!
//! ```text
//!   index corner | header band
//!   -------------+------------
//!   index band   | data band
//! ```
//!
//! Absent bands are `None`, never degenerate ranges. Probe ranges hug the
//! outside of the block and degrade to `None` at the sheet edge.

use crate::addr::{CellAddress, CellRange};
use crate::error::{FramexlError, Result};

#[derive(Debug, Clone)]
pub struct TableLayout {
    anchor: CellAddress,
    rows: u32,
    cols: u32,
    header_rows: u32,
    index_cols: u32,
}

impl TableLayout {
    pub fn build(
        anchor: CellAddress,
        rows: usize,
        cols: usize,
        header_levels: usize,
        index_levels: usize,
        include_header: bool,
        include_index: bool,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(FramexlError::LayoutConflict(format!(
                "cannot lay out an empty table ({rows} rows x {cols} cols)"
            )));
        }
        if include_header && header_levels == 0 {
            return Err(FramexlError::LayoutConflict(
                "header requested but the frame has no header levels".to_string(),
            ));
        }
        if include_index && index_levels == 0 {
            return Err(FramexlError::LayoutConflict(
                "index requested but the frame has no index levels".to_string(),
            ));
        }
        Ok(Self {
            anchor,
            rows: rows as u32,
            cols: cols as u32,
            header_rows: if include_header { header_levels as u32 } else { 0 },
            index_cols: if include_index { index_levels as u32 } else { 0 },
        })
    }

    pub fn anchor(&self) -> CellAddress {
        self.anchor
    }

    pub fn header_rows(&self) -> u32 {
        self.header_rows
    }

    pub fn index_cols(&self) -> u32 {
        self.index_cols
    }

    /// Total block height including header rows.
    pub fn total_rows(&self) -> u32 {
        self.header_rows + self.rows
    }

    /// Total block width including index columns.
    pub fn total_cols(&self) -> u32 {
        self.index_cols + self.cols
    }

    /// Top-left cell of the data band.
    pub fn data_anchor(&self) -> CellAddress {
        CellAddress {
            row: self.anchor.row + self.header_rows,
            col: self.anchor.col + self.index_cols,
        }
    }

    /// The whole block. Always present.
    pub fn overall(&self) -> CellRange {
        CellRange {
            start: self.anchor,
            end: CellAddress {
                row: self.anchor.row + self.total_rows() - 1,
                col: self.anchor.col + self.total_cols() - 1,
            },
        }
    }

    /// Header rows over the data columns only.
    pub fn header_band(&self) -> Option<CellRange> {
        if self.header_rows == 0 {
            return None;
        }
        let start = CellAddress {
            row: self.anchor.row,
            col: self.anchor.col + self.index_cols,
        };
        Some(CellRange {
            start,
            end: CellAddress {
                row: start.row + self.header_rows - 1,
                col: start.col + self.cols - 1,
            },
        })
    }

    /// Index columns beside the data rows only.
    pub fn index_band(&self) -> Option<CellRange> {
        if self.index_cols == 0 {
            return None;
        }
        let start = CellAddress {
            row: self.anchor.row + self.header_rows,
            col: self.anchor.col,
        };
        Some(CellRange {
            start,
            end: CellAddress {
                row: start.row + self.rows - 1,
                col: start.col + self.index_cols - 1,
            },
        })
    }

    /// Header-rows x index-cols block above the index. Present only when
    /// both bands are.
    pub fn index_corner(&self) -> Option<CellRange> {
        if self.header_rows == 0 || self.index_cols == 0 {
            return None;
        }
        Some(CellRange {
            start: self.anchor,
            end: CellAddress {
                row: self.anchor.row + self.header_rows - 1,
                col: self.anchor.col + self.index_cols - 1,
            },
        })
    }

    pub fn data_band(&self) -> CellRange {
        let start = self.data_anchor();
        CellRange {
            start,
            end: CellAddress {
                row: start.row + self.rows - 1,
                col: start.col + self.cols - 1,
            },
        }
    }

    pub fn top_right(&self) -> CellAddress {
        let overall = self.overall();
        CellAddress {
            row: overall.start.row,
            col: overall.end.col,
        }
    }

    pub fn bottom_left(&self) -> CellAddress {
        let overall = self.overall();
        CellAddress {
            row: overall.end.row,
            col: overall.start.col,
        }
    }

    pub fn bottom_right(&self) -> CellAddress {
        self.overall().end
    }

    /// One-row range immediately above the block, or None on row 1.
    pub fn probe_above(&self) -> Option<CellRange> {
        let overall = self.overall();
        let start = overall.start.checked_offset(-1, 0)?;
        Some(CellRange::new(
            start,
            CellAddress {
                row: start.row,
                col: overall.end.col,
            },
        ))
    }

    /// One-row range immediately below the block.
    pub fn probe_below(&self) -> Option<CellRange> {
        let overall = self.overall();
        let start = CellAddress {
            row: overall.end.row,
            col: overall.start.col,
        }
        .checked_offset(1, 0)?;
        Some(CellRange::new(
            start,
            CellAddress {
                row: start.row,
                col: overall.end.col,
            },
        ))
    }

    /// One-column range immediately left of the block, or None in column A.
    pub fn probe_left(&self) -> Option<CellRange> {
        let overall = self.overall();
        let start = overall.start.checked_offset(0, -1)?;
        Some(CellRange::new(
            start,
            CellAddress {
                row: overall.end.row,
                col: start.col,
            },
        ))
    }

    /// One-column range immediately right of the block.
    pub fn probe_right(&self) -> Option<CellRange> {
        let overall = self.overall();
        let start = CellAddress {
            row: overall.start.row,
            col: overall.end.col,
        }
        .checked_offset(0, 1)?;
        Some(CellRange::new(
            start,
            CellAddress {
                row: overall.end.row,
                col: start.col,
            },
        ))
    }
}
