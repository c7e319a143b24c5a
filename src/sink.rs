//! Document sink seam.
//!
//! The mapper and session talk to a `DocumentSink`; the only shipped
//! implementation wraps a `umya_spreadsheet::Worksheet`. Keeping the trait
//! narrow keeps every range computation testable without a workbook.

use std::str::FromStr;

use umya_spreadsheet::structs::{HorizontalAlignmentValues, VerticalAlignmentValues};
use umya_spreadsheet::{Border, PatternValues, Style, Worksheet};

use crate::addr::{CellRange, column_name};
use crate::error::Result;
use crate::style::{BorderSide, BorderSpec, FormatDirective};

pub trait DocumentSink {
    /// Write a rectangular payload aligned to `range`, row-major. An empty
    /// string clears a previously written cell and otherwise leaves the
    /// cell untouched.
    fn write_values(&mut self, range: &CellRange, values: &[Vec<String>]) -> Result<()>;

    fn apply_format(&mut self, range: &CellRange, directive: &FormatDirective) -> Result<()>;

    fn merge_range(&mut self, range: &CellRange) -> Result<()>;

    fn set_column_width(&mut self, col: u32, width: f64) -> Result<()>;

    /// True when any cell in the range already holds a value. Used by the
    /// overwrite sentinel before an export lands.
    fn is_range_filled(&self, range: &CellRange) -> bool;
}

pub struct XlsxSheet<'a> {
    worksheet: &'a mut Worksheet,
}

impl<'a> XlsxSheet<'a> {
    pub fn new(worksheet: &'a mut Worksheet) -> Self {
        Self { worksheet }
    }
}

impl DocumentSink for XlsxSheet<'_> {
    fn write_values(&mut self, range: &CellRange, values: &[Vec<String>]) -> Result<()> {
        for (r, row) in values.iter().enumerate() {
            let sheet_row = range.start.row + r as u32;
            if sheet_row > range.end.row {
                break;
            }
            for (c, value) in row.iter().enumerate() {
                let sheet_col = range.start.col + c as u32;
                if sheet_col > range.end.col {
                    continue;
                }
                if value.is_empty() {
                    // clear stale content without materializing new cells
                    if self.worksheet.get_cell((sheet_col, sheet_row)).is_some() {
                        self.worksheet
                            .get_cell_mut((sheet_col, sheet_row))
                            .set_value("");
                    }
                    continue;
                }
                let cell = self.worksheet.get_cell_mut((sheet_col, sheet_row));
                if let Ok(number) = value.parse::<f64>() {
                    cell.set_value_number(number);
                } else {
                    cell.set_value(value.clone());
                }
            }
        }
        Ok(())
    }

    fn apply_format(&mut self, range: &CellRange, directive: &FormatDirective) -> Result<()> {
        for cell in range.iter_cells() {
            let style = self.worksheet.get_style_mut((cell.col, cell.row));
            apply_cell_style(style, directive);
            for border in &directive.borders {
                let on_left = cell.col == range.start.col;
                let on_right = cell.col == range.end.col;
                let on_top = cell.row == range.start.row;
                let on_bottom = cell.row == range.end.row;
                let (left, right, top, bottom) = match border.side {
                    BorderSide::All => (true, true, true, true),
                    BorderSide::Outer => (on_left, on_right, on_top, on_bottom),
                    BorderSide::Inner => (!on_left, !on_right, !on_top, !on_bottom),
                    BorderSide::Left => (on_left, false, false, false),
                    BorderSide::Right => (false, on_right, false, false),
                    BorderSide::Top => (false, false, on_top, false),
                    BorderSide::Bottom => (false, false, false, on_bottom),
                };
                let borders = style.get_borders_mut();
                if left {
                    set_border(borders.get_left_border_mut(), border);
                }
                if right {
                    set_border(borders.get_right_border_mut(), border);
                }
                if top {
                    set_border(borders.get_top_border_mut(), border);
                }
                if bottom {
                    set_border(borders.get_bottom_border_mut(), border);
                }
            }
        }
        if let Some(width) = directive.width {
            for col in range.start.col..=range.end.col {
                self.set_column_width(col, width)?;
            }
        }
        if directive.merge {
            self.merge_range(range)?;
        }
        Ok(())
    }

    fn merge_range(&mut self, range: &CellRange) -> Result<()> {
        if range.start != range.end {
            self.worksheet.add_merge_cells(range.to_string());
        }
        Ok(())
    }

    fn set_column_width(&mut self, col: u32, width: f64) -> Result<()> {
        self.worksheet
            .get_column_dimension_mut(&column_name(col))
            .set_width(width);
        Ok(())
    }

    fn is_range_filled(&self, range: &CellRange) -> bool {
        range
            .iter_cells()
            .any(|cell| !self.worksheet.get_value((cell.col, cell.row)).is_empty())
    }
}

fn apply_cell_style(style: &mut Style, directive: &FormatDirective) {
    if directive.bold
        || directive.italic
        || directive.underline
        || directive.strikeout
        || directive.font.is_some()
        || directive.font_size.is_some()
        || directive.font_color.is_some()
    {
        let font = style.get_font_mut();
        if directive.bold {
            font.set_bold(true);
        }
        if directive.italic {
            font.set_italic(true);
        }
        if directive.underline {
            font.set_underline("single");
        }
        if directive.strikeout {
            font.set_strikethrough(true);
        }
        if let Some(name) = &directive.font {
            font.set_name(name.clone());
        }
        if let Some(size) = directive.font_size {
            font.set_size(size);
        }
        if let Some(color) = &directive.font_color {
            font.get_color_mut().set_argb(argb(color));
        }
    }

    if directive.fill.is_some() || directive.fill_pattern.is_some() {
        let pattern = style.get_fill_mut().get_pattern_fill_mut();
        pattern.set_pattern_type(pattern_value(directive.fill_pattern.as_deref()));
        if let Some(fill) = &directive.fill {
            pattern.get_foreground_color_mut().set_argb(argb(fill));
        }
    }

    if directive.align.is_some() || directive.valign.is_some() || directive.wrap {
        let alignment = style.get_alignment_mut();
        if let Some(h) = &directive.align
            && let Ok(value) = HorizontalAlignmentValues::from_str(h)
        {
            alignment.set_horizontal(value);
        }
        if let Some(v) = &directive.valign
            && let Ok(value) = VerticalAlignmentValues::from_str(v)
        {
            alignment.set_vertical(value);
        }
        if directive.wrap {
            alignment.set_wrap_text(true);
        }
    }

    if let Some(code) = &directive.number_format {
        style.get_number_format_mut().set_format_code(code.clone());
    }
}

fn set_border(border: &mut Border, spec: &BorderSpec) {
    border.set_border_style(spec.style.clone());
    let color = spec.color.as_deref().unwrap_or("000000");
    border.get_color_mut().set_argb(argb(color));
}

fn pattern_value(name: Option<&str>) -> PatternValues {
    match name {
        Some("none") => PatternValues::None,
        Some("gray125") => PatternValues::Gray125,
        Some("lightup") => PatternValues::LightUp,
        Some("lightdown") => PatternValues::LightDown,
        // a bare fill color means a solid pattern
        _ => PatternValues::Solid,
    }
}

fn argb(rgb: &str) -> String {
    format!("FF{rgb}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_land_typed_and_empties_are_skipped() {
        let mut book = umya_spreadsheet::new_file();
        let worksheet = book.get_sheet_mut(&0).unwrap();
        let mut sink = XlsxSheet::new(worksheet);
        let range: CellRange = "B2:C3".parse().unwrap();
        sink.write_values(
            &range,
            &[
                vec!["label".to_string(), "3.5".to_string()],
                vec!["".to_string(), "7".to_string()],
            ],
        )
        .unwrap();
        assert_eq!(worksheet.get_value((2u32, 2u32)), "label");
        assert_eq!(worksheet.get_value((3u32, 2u32)), "3.5");
        assert_eq!(worksheet.get_value((2u32, 3u32)), "");
        assert_eq!(worksheet.get_value((3u32, 3u32)), "7");
    }

    #[test]
    fn blank_values_clear_stale_cells_only() {
        let mut book = umya_spreadsheet::new_file();
        let worksheet = book.get_sheet_mut(&0).unwrap();
        worksheet.get_cell_mut((2u32, 2u32)).set_value("stale");
        let mut sink = XlsxSheet::new(worksheet);
        let range: CellRange = "B2:C2".parse().unwrap();
        sink.write_values(&range, &[vec!["".to_string(), "".to_string()]])
            .unwrap();
        assert_eq!(worksheet.get_value((2u32, 2u32)), "");
        // the never-written neighbor is not materialized
        assert!(worksheet.get_cell((3u32, 2u32)).is_none());
    }

    #[test]
    fn filled_probe_sees_existing_content() {
        let mut book = umya_spreadsheet::new_file();
        let worksheet = book.get_sheet_mut(&0).unwrap();
        worksheet.get_cell_mut((1u32, 1u32)).set_value("occupied");
        let sink = XlsxSheet::new(worksheet);
        assert!(sink.is_range_filled(&"A1:B2".parse().unwrap()));
        assert!(!sink.is_range_filled(&"D4:E5".parse().unwrap()));
    }

    #[test]
    fn merge_skips_single_cells() {
        let mut book = umya_spreadsheet::new_file();
        let worksheet = book.get_sheet_mut(&0).unwrap();
        let mut sink = XlsxSheet::new(worksheet);
        sink.merge_range(&"A1".parse().unwrap()).unwrap();
        sink.merge_range(&"A2:A4".parse().unwrap()).unwrap();
        assert_eq!(worksheet.get_merge_cells().len(), 1);
    }

    #[test]
    fn formats_reach_the_style_table() {
        let mut book = umya_spreadsheet::new_file();
        let worksheet = book.get_sheet_mut(&0).unwrap();
        let mut sink = XlsxSheet::new(worksheet);
        let directive =
            FormatDirective::parse("bold; fill=#DDEBF7; align=center; width=18").unwrap();
        sink.apply_format(&"B2:B3".parse().unwrap(), &directive).unwrap();
        let cell = worksheet.get_cell((2u32, 2u32)).unwrap();
        let font = cell.get_style().get_font().cloned().unwrap();
        assert!(*font.get_bold());
    }
}
