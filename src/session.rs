//! Export session: one open workbook handle and the ordered put pipeline.
//!
//! The session owns the `umya_spreadsheet::Spreadsheet` for its whole life;
//! there is no process-global workbook state. A `put` always writes values
//! first and formats after, so a formatting failure can never leave a table
//! half-painted with no data.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use umya_spreadsheet::Spreadsheet;

use crate::catalog::Catalog;
use crate::cdformat::{self, CdFormat, COALESCE_THRESHOLD};
use crate::error::{FramexlError, Result};
use crate::sink::{DocumentSink, XlsxSheet};
use crate::style::FormatDirective;
use crate::writer::{ColumnScope, FrameWriter, RangeRequest};

/// Painted on the overall block when an overwrite probe finds content.
const OVERWRITE_WARNING_DIRECTIVE: &str = "border=outer_thick_#FF0000";

#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Probe around the target block and highlight it when neighbors are
    /// already filled.
    pub replace_warning: bool,
    /// Index level whose label runs get merged vertically.
    pub merge_index: Option<String>,
    /// Column prompt merged alongside the index runs.
    pub merge_extra_columns: Option<String>,
    /// Merge consecutive equal header labels per level.
    pub merge_headers: bool,
    /// Catalog sheet applied before the inline styles.
    pub style_sheet: Option<String>,
    /// Inline request/directive pairs, applied in order.
    pub styles: Vec<(RangeRequest, String)>,
    /// Column prompt -> width.
    pub column_widths: Vec<(String, f64)>,
    /// Column prompt -> number format code.
    pub number_formats: Vec<(String, String)>,
    pub cd: Vec<CdFormat>,
}

pub struct ExportSession {
    book: Spreadsheet,
    path: PathBuf,
}

impl ExportSession {
    /// Open an existing workbook or start a fresh one for the path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let book = if path.exists() {
            info!(path = %path.display(), "opening workbook");
            umya_spreadsheet::reader::xlsx::read(&path)
                .map_err(|err| FramexlError::Document(err.to_string()))?
        } else {
            info!(path = %path.display(), "creating workbook");
            umya_spreadsheet::new_file()
        };
        Ok(Self { book, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.book
            .get_sheet_collection()
            .iter()
            .map(|ws| ws.get_name().to_string())
            .collect()
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.book.get_sheet_by_name(name).is_some()
    }

    /// Drop a sheet's contents by removing and recreating it.
    pub fn replace_sheet(&mut self, name: &str) -> Result<()> {
        if self.book.get_sheet_by_name(name).is_none() {
            return Err(FramexlError::SheetNotFound(name.to_string()));
        }
        self.book
            .remove_sheet_by_name(name)
            .map_err(|err| FramexlError::Document(err.to_string()))?;
        self.book
            .new_sheet(name)
            .map_err(|err| FramexlError::Document(err.to_string()))?;
        info!(sheet = %name, "sheet replaced");
        Ok(())
    }

    /// Add-or-get a sheet as a sink, for writes outside the put pipeline.
    pub fn sheet(&mut self, name: &str) -> Result<XlsxSheet<'_>> {
        Ok(XlsxSheet::new(self.ensure_sheet(name)?))
    }

    fn ensure_sheet(&mut self, name: &str) -> Result<&mut umya_spreadsheet::Worksheet> {
        if self.book.get_sheet_by_name(name).is_none() {
            self.book
                .new_sheet(name)
                .map_err(|err| FramexlError::Document(err.to_string()))?;
        }
        self.book
            .get_sheet_by_name_mut(name)
            .ok_or_else(|| FramexlError::SheetNotFound(name.to_string()))
    }

    /// The full pipeline: sentinel probe, values, merges, styles, column
    /// config, conditional formats.
    pub fn put(
        &mut self,
        sheet_name: &str,
        writer: &FrameWriter,
        catalog: &Catalog,
        options: &PutOptions,
    ) -> Result<()> {
        let overall = writer.layout().overall();
        info!(sheet = %sheet_name, range = %overall, "putting frame");

        // resolve everything that can fail before touching the sheet
        let values = writer.export_cells();
        let index_merges = match &options.merge_index {
            Some(level) => {
                writer.merge_ranges(level, options.merge_extra_columns.as_deref())?
            }
            None => Vec::new(),
        };
        let header_merges = if options.merge_headers {
            writer.header_merge_ranges()?
        } else {
            Vec::new()
        };
        let mut styles: Vec<(Vec<crate::addr::CellRange>, FormatDirective)> = Vec::new();
        if let Some(sheet) = &options.style_sheet {
            let style_sheet = catalog.get(sheet)?;
            for (target, directive) in &style_sheet.rules {
                let request = target_request(target);
                styles.push((writer.resolve(&request)?, FormatDirective::parse(directive)?));
            }
        }
        for (request, directive) in &options.styles {
            styles.push((writer.resolve(request)?, FormatDirective::parse(directive)?));
        }
        let mut width_cols: Vec<(u32, f64)> = Vec::new();
        for (prompt, width) in &options.column_widths {
            for range in writer.columns_ranges(prompt, ColumnScope::Data)? {
                width_cols.push((range.start.col, *width));
            }
        }
        let mut format_cols: Vec<(crate::addr::CellRange, FormatDirective)> = Vec::new();
        for (prompt, code) in &options.number_formats {
            let directive = FormatDirective {
                number_format: Some(code.clone()),
                ..FormatDirective::default()
            };
            for range in writer.columns_ranges(prompt, ColumnScope::Data)? {
                format_cols.push((range, directive.clone()));
            }
        }
        let mut cd_rules = Vec::new();
        for format in &options.cd {
            cd_rules.extend(cdformat::resolve(writer, format)?);
        }

        let worksheet = self.ensure_sheet(sheet_name)?;
        let mut sink = XlsxSheet::new(worksheet);

        if options.replace_warning {
            let layout = writer.layout();
            let probes = [
                layout.probe_above(),
                layout.probe_below(),
                layout.probe_left(),
                layout.probe_right(),
            ];
            let neighbors_filled = probes
                .iter()
                .flatten()
                .any(|probe| sink.is_range_filled(probe));
            if neighbors_filled || sink.is_range_filled(&overall) {
                warn!(sheet = %sheet_name, range = %overall, "export overlaps existing content");
                sink.apply_format(
                    &overall,
                    &FormatDirective::parse(OVERWRITE_WARNING_DIRECTIVE)?,
                )?;
            }
        }

        sink.write_values(&overall, &values)?;

        for merge in index_merges.iter().chain(header_merges.iter()) {
            sink.merge_range(merge)?;
        }
        for (ranges, directive) in &styles {
            for range in ranges {
                sink.apply_format(range, directive)?;
            }
        }
        for (col, width) in width_cols {
            sink.set_column_width(col, width)?;
        }
        for (range, directive) in &format_cols {
            sink.apply_format(range, directive)?;
        }
        for rule in &cd_rules {
            if rule.cells.is_empty() {
                continue;
            }
            let directive = FormatDirective::parse(&rule.directive)?;
            let ranges = rule.cells.coalesced(COALESCE_THRESHOLD);
            debug!(hits = rule.cells.len(), ranges = ranges.len(), "applying cd rule");
            for range in ranges {
                sink.apply_format(&range, &directive)?;
            }
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        umya_spreadsheet::writer::xlsx::write(&self.book, &self.path)
            .map_err(|err| FramexlError::Document(err.to_string()))?;
        info!(path = %self.path.display(), "workbook saved");
        Ok(())
    }
}

/// Band names resolve to band requests; anything else is a column prompt.
fn target_request(target: &str) -> RangeRequest {
    match target {
        "header" => RangeRequest::Header,
        "header_outer" => RangeRequest::HeaderOuter,
        "index" => RangeRequest::Index,
        "index_outer" => RangeRequest::IndexOuter,
        "data" => RangeRequest::Data,
        "all" => RangeRequest::All,
        prompt => RangeRequest::Columns {
            prompt: prompt.to_string(),
            scope: ColumnScope::Data,
        },
    }
}
