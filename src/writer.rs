//! FrameWriter: binds a frame to an anchored layout and answers every
//! range question the export pipeline asks.
//!
//! All resolution is pure address algebra over the frame's label vectors;
//! nothing here touches a document.

use tracing::debug;

use crate::addr::{CellAddress, CellRange};
use crate::error::{FramexlError, Result};
use crate::frame::{ColumnKey, Frame};
use crate::layout::TableLayout;
use crate::wildcard;

/// Vertical extent of a column range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnScope {
    /// Data rows only.
    Data,
    /// Header rows plus data rows. Falls back to data rows when the layout
    /// carries no header band.
    WithHeader,
    /// Header rows only.
    HeaderOnly,
}

/// One maximal run of equal labels in an index level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRun {
    pub value: String,
    pub start_offset: usize,
    pub len: usize,
}

/// A label run widened to the full table block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSection {
    pub label: String,
    pub range: CellRange,
}

/// Typed range-request dispatch. Each variant maps to one resolver method;
/// there is no name-string parsing.
#[derive(Debug, Clone)]
pub enum RangeRequest {
    Column { key: String, scope: ColumnScope },
    Columns { prompt: String, scope: ColumnScope },
    Span { start: String, stop: String, scope: ColumnScope },
    IndexLevel(String),
    MergeRuns { level: String, columns: Option<String> },
    GroupSections { level: String },
    Header,
    HeaderOuter,
    Index,
    IndexOuter,
    Data,
    All,
}

pub struct FrameWriter {
    frame: Frame,
    layout: TableLayout,
}

impl FrameWriter {
    pub fn new(
        frame: Frame,
        anchor: CellAddress,
        include_header: bool,
        include_index: bool,
    ) -> Result<Self> {
        let (rows, cols) = frame.shape();
        let layout = TableLayout::build(
            anchor,
            rows,
            cols,
            frame.header_depth(),
            frame.index_depth(),
            include_header,
            include_index,
        )?;
        debug!(
            anchor = %anchor,
            overall = %layout.overall(),
            rows,
            cols,
            "frame writer bound"
        );
        Ok(Self { frame, layout })
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    fn has_header(&self) -> bool {
        self.layout.header_rows() > 0
    }

    fn has_index(&self) -> bool {
        self.layout.index_cols() > 0
    }

    /// Materialize the rectangular payload aligned to `layout.overall()`.
    /// Index names sit in the bottom header row of the corner block.
    pub fn export_cells(&self) -> Vec<Vec<String>> {
        let total_cols = self.layout.total_cols() as usize;
        let header_rows = self.layout.header_rows() as usize;
        let index_cols = self.layout.index_cols() as usize;
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(self.layout.total_rows() as usize);

        for level in 0..header_rows {
            let mut row = Vec::with_capacity(total_cols);
            for corner_col in 0..index_cols {
                if level + 1 == header_rows {
                    row.push(self.frame.index_names()[corner_col].clone());
                } else {
                    row.push(String::new());
                }
            }
            for key in self.frame.columns() {
                row.push(key.levels().get(level).cloned().unwrap_or_default());
            }
            grid.push(row);
        }

        for r in 0..self.frame.rows() {
            let mut row = Vec::with_capacity(total_cols);
            for level in 0..index_cols {
                let labels = self.frame.index_level_at(level).unwrap_or(&[]);
                row.push(labels.get(r).cloned().unwrap_or_default());
            }
            for key in self.frame.columns() {
                // column_values cannot miss for keys taken from the frame
                let values = self.frame.column_values(key).unwrap_or(&[]);
                row.push(values.get(r).cloned().unwrap_or_default());
            }
            grid.push(row);
        }
        grid
    }

    /// On-sheet column number for a data column or an included index level.
    fn locate_column(&self, name: &str) -> Result<u32> {
        if let Some(key) = self.frame.resolve_column(name) {
            let pos = self
                .frame
                .column_position(&key)
                .ok_or_else(|| FramexlError::UnresolvedColumn(name.to_string()))?;
            return Ok(self.layout.data_anchor().col + pos as u32);
        }
        if let Some(level) = self.frame.index_position(name) {
            if !self.has_index() {
                return Err(FramexlError::UnresolvedColumn(format!(
                    "index level '{name}' is not placed on the sheet"
                )));
            }
            return Ok(self.layout.anchor().col + level as u32);
        }
        Err(FramexlError::UnresolvedColumn(name.to_string()))
    }

    fn scoped_rows(&self, scope: ColumnScope) -> Result<(u32, u32)> {
        let anchor = self.layout.anchor();
        let data_top = self.layout.data_anchor().row;
        let bottom = anchor.row + self.layout.total_rows() - 1;
        match scope {
            ColumnScope::Data => Ok((data_top, bottom)),
            ColumnScope::WithHeader => Ok((anchor.row, bottom)),
            ColumnScope::HeaderOnly => {
                if !self.has_header() {
                    return Err(FramexlError::LayoutConflict(
                        "header scope requested but the layout has no header band".to_string(),
                    ));
                }
                Ok((anchor.row, data_top - 1))
            }
        }
    }

    /// Single-column range for a data column or named index level.
    pub fn column_range(&self, name: &str, scope: ColumnScope) -> Result<CellRange> {
        let col = self.locate_column(name)?;
        let (top, bottom) = self.scoped_rows(scope)?;
        Ok(CellRange::new(
            CellAddress { row: top, col },
            CellAddress { row: bottom, col },
        ))
    }

    /// Wildcard prompt over data-column and index-level names.
    pub fn columns_ranges(&self, prompt: &str, scope: ColumnScope) -> Result<Vec<CellRange>> {
        let mut names = self.frame.column_names();
        names.extend(self.frame.index_names().iter().cloned());
        let resolved = wildcard::resolve(prompt, &names)?;
        resolved
            .iter()
            .map(|name| self.column_range(name, scope))
            .collect()
    }

    /// Rectangle spanning two columns inclusive, order-insensitive.
    pub fn column_span(&self, start: &str, stop: &str, scope: ColumnScope) -> Result<CellRange> {
        let a = self.locate_column(start)?;
        let b = self.locate_column(stop)?;
        let (top, bottom) = self.scoped_rows(scope)?;
        Ok(CellRange::new(
            CellAddress { row: top, col: a.min(b) },
            CellAddress { row: bottom, col: a.max(b) },
        ))
    }

    /// Full-height (data rows) range of one placed index level.
    pub fn index_level_range(&self, name: &str) -> Result<CellRange> {
        if self.frame.index_position(name).is_none() {
            return Err(FramexlError::UnresolvedColumn(name.to_string()));
        }
        self.column_range(name, ColumnScope::Data)
    }

    pub fn index_level_ranges(&self) -> Result<Vec<CellRange>> {
        self.frame
            .index_names()
            .iter()
            .map(|name| self.index_level_range(name))
            .collect()
    }

    /// Single scan over an index level, comparing display strings. Missing
    /// values were folded to `""` at frame construction, so consecutive
    /// blanks form one run.
    pub fn label_runs(&self, level: &str) -> Result<Vec<LabelRun>> {
        let labels = self.frame.index_level(level)?;
        let mut runs: Vec<LabelRun> = Vec::new();
        for (offset, value) in labels.iter().enumerate() {
            match runs.last_mut() {
                Some(run) if &run.value == value => run.len += 1,
                _ => runs.push(LabelRun {
                    value: value.clone(),
                    start_offset: offset,
                    len: 1,
                }),
            }
        }
        Ok(runs)
    }

    fn run_rows(&self, run: &LabelRun) -> (u32, u32) {
        let top = self.layout.data_anchor().row + run.start_offset as u32;
        (top, top + run.len as u32 - 1)
    }

    /// Merge targets: one 1-wide range per multi-row run of the level, plus
    /// the same row spans in any extra columns selected by `columns`.
    pub fn merge_ranges(&self, level: &str, columns: Option<&str>) -> Result<Vec<CellRange>> {
        let level_col = self.locate_column(level)?;
        let runs = self.label_runs(level)?;
        let mut extra_cols: Vec<u32> = Vec::new();
        if let Some(prompt) = columns {
            for range in self.columns_ranges(prompt, ColumnScope::Data)? {
                extra_cols.push(range.start.col);
            }
        }
        let mut out = Vec::new();
        for run in runs.iter().filter(|r| r.len >= 2) {
            let (top, bottom) = self.run_rows(run);
            out.push(CellRange::new(
                CellAddress { row: top, col: level_col },
                CellAddress { row: bottom, col: level_col },
            ));
            for &col in &extra_cols {
                out.push(CellRange::new(
                    CellAddress { row: top, col },
                    CellAddress { row: bottom, col },
                ));
            }
        }
        debug!(level, merges = out.len(), "merge ranges resolved");
        Ok(out)
    }

    /// One full-width band per run of the level, labeled with the run value.
    pub fn group_sections(&self, level: &str) -> Result<Vec<LabelSection>> {
        let overall = self.layout.overall();
        let runs = self.label_runs(level)?;
        Ok(runs
            .iter()
            .map(|run| {
                let (top, bottom) = self.run_rows(run);
                LabelSection {
                    label: run.value.clone(),
                    range: CellRange::new(
                        CellAddress { row: top, col: overall.start.col },
                        CellAddress { row: bottom, col: overall.end.col },
                    ),
                }
            })
            .collect())
    }

    /// First-occurrence section for a literal label, if present.
    pub fn section_for_label(&self, level: &str, value: &str) -> Result<Option<CellRange>> {
        Ok(self
            .group_sections(level)?
            .into_iter()
            .find(|section| section.label == value)
            .map(|section| section.range))
    }

    /// Full-width sections whose label matches a wildcard pattern, with
    /// adjacent matching runs coalesced into one range.
    pub fn sections_matching(&self, level: &str, pattern: &str) -> Result<Vec<CellRange>> {
        let sections = self.group_sections(level)?;
        let mut out: Vec<CellRange> = Vec::new();
        for section in sections {
            if !wildcard::matches(pattern, &section.label)? {
                continue;
            }
            match out.last_mut() {
                Some(prev) if prev.end.row + 1 == section.range.start.row => {
                    prev.end = section.range.end;
                }
                _ => out.push(section.range),
            }
        }
        Ok(out)
    }

    /// Per header level, merge ranges for consecutive equal header labels
    /// (runs of length >= 2 only).
    pub fn header_merge_ranges(&self) -> Result<Vec<CellRange>> {
        let Some(header) = self.layout.header_band() else {
            return Ok(Vec::new());
        };
        let keys: Vec<&ColumnKey> = self.frame.columns().collect();
        let mut out = Vec::new();
        for level in 0..self.frame.header_depth() {
            let row = header.start.row + level as u32;
            let mut run_start = 0usize;
            for i in 1..=keys.len() {
                let same = i < keys.len()
                    && keys[i].levels().get(level) == keys[run_start].levels().get(level);
                if same {
                    continue;
                }
                if i - run_start >= 2 {
                    out.push(CellRange::new(
                        CellAddress { row, col: header.start.col + run_start as u32 },
                        CellAddress { row, col: header.start.col + (i - 1) as u32 },
                    ));
                }
                run_start = i;
            }
        }
        Ok(out)
    }

    /// Resolve one typed request to its range set. Absent bands resolve to
    /// an empty set.
    pub fn resolve(&self, request: &RangeRequest) -> Result<Vec<CellRange>> {
        let overall = self.layout.overall();
        match request {
            RangeRequest::Column { key, scope } => Ok(vec![self.column_range(key, *scope)?]),
            RangeRequest::Columns { prompt, scope } => self.columns_ranges(prompt, *scope),
            RangeRequest::Span { start, stop, scope } => {
                Ok(vec![self.column_span(start, stop, *scope)?])
            }
            RangeRequest::IndexLevel(name) => Ok(vec![self.index_level_range(name)?]),
            RangeRequest::MergeRuns { level, columns } => {
                self.merge_ranges(level, columns.as_deref())
            }
            RangeRequest::GroupSections { level } => Ok(self
                .group_sections(level)?
                .into_iter()
                .map(|section| section.range)
                .collect()),
            RangeRequest::Header => Ok(self.layout.header_band().into_iter().collect()),
            RangeRequest::HeaderOuter => {
                if !self.has_header() {
                    return Ok(Vec::new());
                }
                Ok(vec![overall.resize_rows(self.layout.header_rows())?])
            }
            RangeRequest::Index => Ok(self.layout.index_band().into_iter().collect()),
            RangeRequest::IndexOuter => {
                if !self.has_index() {
                    return Ok(Vec::new());
                }
                Ok(vec![overall.resize_cols(self.layout.index_cols())?])
            }
            RangeRequest::Data => Ok(vec![self.layout.data_band()]),
            RangeRequest::All => Ok(vec![overall]),
        }
    }
}
