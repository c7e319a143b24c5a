//! Conditional formatting: map value- and mask-keyed rules over one frame
//! column to the cell sets their directives should hit.
//!
//! A rule that selects no rows resolves to `RuleCells::NoCells`, a sentinel
//! the sink treats as a guaranteed no-op. An unknown rule column is
//! tolerated the same way rather than failing the whole export.

use tracing::debug;

use crate::addr::{CellAddress, CellRange};
use crate::error::{FramexlError, Result};
use crate::writer::{ColumnScope, FrameWriter};

/// Flat cell lists longer than this are handed to the sink as coalesced
/// vertical runs instead. Tunable; not part of any output contract.
pub const COALESCE_THRESHOLD: usize = 45;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKey {
    /// Match rows whose display value equals this literal.
    Literal(String),
    /// Named rule resolved through an explicit values list or row mask.
    Named(String),
}

#[derive(Debug, Clone)]
pub struct CdRule {
    pub key: RuleKey,
    /// Style directive string, parsed by the style module at apply time.
    pub directive: String,
    pub values: Option<Vec<String>>,
    pub mask: Option<Vec<bool>>,
}

impl CdRule {
    pub fn literal(value: impl Into<String>, directive: impl Into<String>) -> Self {
        Self {
            key: RuleKey::Literal(value.into()),
            directive: directive.into(),
            values: None,
            mask: None,
        }
    }

    pub fn with_values(
        name: impl Into<String>,
        values: Vec<String>,
        directive: impl Into<String>,
    ) -> Self {
        Self {
            key: RuleKey::Named(name.into()),
            directive: directive.into(),
            values: Some(values),
            mask: None,
        }
    }

    pub fn with_mask(
        name: impl Into<String>,
        mask: Vec<bool>,
        directive: impl Into<String>,
    ) -> Self {
        Self {
            key: RuleKey::Named(name.into()),
            directive: directive.into(),
            values: None,
            mask: Some(mask),
        }
    }
}

/// Which cells a matched row contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyTo {
    /// The rule column's own cell.
    SelfColumn,
    /// Every data column's cell in the matched row.
    Row,
    /// Cells of the columns a wildcard prompt selects.
    Columns(String),
}

#[derive(Debug, Clone)]
pub struct CdFormat {
    pub column: String,
    pub rules: Vec<CdRule>,
    pub apply: ApplyTo,
}

/// Resolution result for one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleCells {
    /// Guaranteed no-op; the sink writes nothing.
    NoCells,
    Cells(Vec<CellAddress>),
}

impl RuleCells {
    pub fn is_empty(&self) -> bool {
        match self {
            RuleCells::NoCells => true,
            RuleCells::Cells(cells) => cells.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RuleCells::NoCells => 0,
            RuleCells::Cells(cells) => cells.len(),
        }
    }

    /// Ranges for the sink: single cells while the list is at or under
    /// `threshold`, column-wise vertical runs above it.
    pub fn coalesced(&self, threshold: usize) -> Vec<CellRange> {
        let RuleCells::Cells(cells) = self else {
            return Vec::new();
        };
        if cells.len() <= threshold {
            return cells.iter().copied().map(CellRange::single).collect();
        }
        let mut sorted: Vec<CellAddress> = cells.clone();
        sorted.sort_by_key(|c| (c.col, c.row));
        sorted.dedup();
        let mut ranges: Vec<CellRange> = Vec::new();
        for cell in sorted {
            match ranges.last_mut() {
                Some(run)
                    if run.end.col == cell.col && run.end.row + 1 == cell.row =>
                {
                    run.end = cell;
                }
                _ => ranges.push(CellRange::single(cell)),
            }
        }
        ranges
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedRule {
    pub key: RuleKey,
    pub directive: String,
    pub cells: RuleCells,
}

/// Resolve every rule of `format` against the writer's frame and layout.
/// The rule column may be a data column or an index level.
pub fn resolve(writer: &FrameWriter, format: &CdFormat) -> Result<Vec<ResolvedRule>> {
    let frame = writer.frame();
    let values: Option<&[String]> = match frame.resolve_column(&format.column) {
        Some(key) => Some(frame.column_values(&key)?),
        None => frame
            .index_position(&format.column)
            .and_then(|level| frame.index_level_at(level)),
    };
    let Some(values) = values else {
        debug!(column = %format.column, "cd column absent, all rules resolve to no cells");
        return Ok(format
            .rules
            .iter()
            .map(|rule| ResolvedRule {
                key: rule.key.clone(),
                directive: rule.directive.clone(),
                cells: RuleCells::NoCells,
            })
            .collect());
    };
    let target_cols = target_columns(writer, format)?;

    let mut resolved = Vec::with_capacity(format.rules.len());
    for rule in &format.rules {
        let selected = select_rows(rule, values)?;
        let cells: Vec<CellAddress> = selected
            .iter()
            .enumerate()
            .filter(|(_, hit)| **hit)
            .flat_map(|(row_offset, _)| {
                let row = writer.layout().data_anchor().row + row_offset as u32;
                target_cols.iter().map(move |&col| CellAddress { row, col })
            })
            .collect();
        let cells = if cells.is_empty() {
            RuleCells::NoCells
        } else {
            RuleCells::Cells(cells)
        };
        debug!(column = %format.column, hits = cells.len(), "cd rule resolved");
        resolved.push(ResolvedRule {
            key: rule.key.clone(),
            directive: rule.directive.clone(),
            cells,
        });
    }
    Ok(resolved)
}

fn target_columns(writer: &FrameWriter, format: &CdFormat) -> Result<Vec<u32>> {
    match &format.apply {
        ApplyTo::SelfColumn => Ok(vec![
            writer
                .column_range(&format.column, ColumnScope::Data)?
                .start
                .col,
        ]),
        ApplyTo::Row => {
            let data = writer.layout().data_band();
            Ok((data.start.col..=data.end.col).collect())
        }
        ApplyTo::Columns(prompt) => Ok(writer
            .columns_ranges(prompt, ColumnScope::Data)?
            .into_iter()
            .map(|range| range.start.col)
            .collect()),
    }
}

fn select_rows(rule: &CdRule, values: &[String]) -> Result<Vec<bool>> {
    match (&rule.key, &rule.values, &rule.mask) {
        (RuleKey::Literal(literal), None, None) => {
            Ok(values.iter().map(|v| v == literal).collect())
        }
        (RuleKey::Literal(_), _, _) => Err(FramexlError::AmbiguousRule(
            "a literal rule carries its own matcher and takes no values or mask".to_string(),
        )),
        (RuleKey::Named(name), Some(_), Some(_)) => Err(FramexlError::AmbiguousRule(format!(
            "rule '{name}' supplies both a values list and a mask"
        ))),
        (RuleKey::Named(name), None, None) => Err(FramexlError::AmbiguousRule(format!(
            "rule '{name}' supplies neither a values list nor a mask"
        ))),
        (RuleKey::Named(_), Some(list), None) => {
            Ok(values.iter().map(|v| list.contains(v)).collect())
        }
        (RuleKey::Named(name), None, Some(mask)) => {
            if mask.len() != values.len() {
                return Err(FramexlError::AmbiguousRule(format!(
                    "rule '{name}' mask has {} entries for {} rows",
                    mask.len(),
                    values.len()
                )));
            }
            Ok(mask.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use assert_matches::assert_matches;

    fn writer() -> FrameWriter {
        let frame = Frame::new(vec![
            ("status", vec!["ok", "bad", "ok", "bad"]),
            ("score", vec!["1", "2", "3", "4"]),
        ])
        .unwrap();
        FrameWriter::new(frame, "A1".parse().unwrap(), true, false).unwrap()
    }

    #[test]
    fn literal_rule_selects_matching_rows_in_own_column() {
        let format = CdFormat {
            column: "status".into(),
            rules: vec![CdRule::literal("bad", "#FF0000")],
            apply: ApplyTo::SelfColumn,
        };
        let resolved = resolve(&writer(), &format).unwrap();
        let RuleCells::Cells(cells) = &resolved[0].cells else {
            panic!("expected cells");
        };
        let rendered: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered, ["A3", "A5"]);
    }

    #[test]
    fn row_apply_spans_the_data_band() {
        let format = CdFormat {
            column: "status".into(),
            rules: vec![CdRule::literal("bad", "bold")],
            apply: ApplyTo::Row,
        };
        let resolved = resolve(&writer(), &format).unwrap();
        let RuleCells::Cells(cells) = &resolved[0].cells else {
            panic!("expected cells");
        };
        let rendered: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered, ["A3", "B3", "A5", "B5"]);
    }

    #[test]
    fn index_level_keyed_rules_select_rows() {
        let frame = Frame::new(vec![
            ("score", vec!["10", "20", "30", "40"]),
            ("grade", vec!["1", "2", "3", "4"]),
        ])
        .unwrap()
        .with_index(vec![(
            "region".to_string(),
            vec!["north", "north", "south", "south"],
        )])
        .unwrap();
        let writer = FrameWriter::new(frame, "B2".parse().unwrap(), true, true).unwrap();

        let row_wide = CdFormat {
            column: "region".into(),
            rules: vec![CdRule::literal("south", "fill=light_yellow")],
            apply: ApplyTo::Row,
        };
        let resolved = resolve(&writer, &row_wide).unwrap();
        let RuleCells::Cells(cells) = &resolved[0].cells else {
            panic!("expected cells");
        };
        let rendered: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered, ["C5", "D5", "C6", "D6"]);

        let own_column = CdFormat {
            column: "region".into(),
            rules: vec![CdRule::literal("north", "bold")],
            apply: ApplyTo::SelfColumn,
        };
        let resolved = resolve(&writer, &own_column).unwrap();
        let RuleCells::Cells(cells) = &resolved[0].cells else {
            panic!("expected cells");
        };
        let rendered: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        assert_eq!(rendered, ["B3", "B4"]);
    }

    #[test]
    fn unmatched_rule_and_unknown_column_are_no_cells() {
        let miss = CdFormat {
            column: "status".into(),
            rules: vec![CdRule::literal("missing", "bold")],
            apply: ApplyTo::SelfColumn,
        };
        let resolved = resolve(&writer(), &miss).unwrap();
        assert_eq!(resolved[0].cells, RuleCells::NoCells);

        let unknown = CdFormat {
            column: "nope".into(),
            rules: vec![CdRule::literal("x", "bold"), CdRule::literal("y", "bold")],
            apply: ApplyTo::Row,
        };
        let resolved = resolve(&writer(), &unknown).unwrap();
        assert!(resolved.iter().all(|r| r.cells == RuleCells::NoCells));
    }

    #[test]
    fn named_rules_need_exactly_one_matcher() {
        let both = CdFormat {
            column: "status".into(),
            rules: vec![CdRule {
                key: RuleKey::Named("r".into()),
                directive: "bold".into(),
                values: Some(vec!["ok".into()]),
                mask: Some(vec![true, false, false, false]),
            }],
            apply: ApplyTo::SelfColumn,
        };
        assert_matches!(
            resolve(&writer(), &both),
            Err(FramexlError::AmbiguousRule(_))
        );

        let neither = CdFormat {
            column: "status".into(),
            rules: vec![CdRule {
                key: RuleKey::Named("r".into()),
                directive: "bold".into(),
                values: None,
                mask: None,
            }],
            apply: ApplyTo::SelfColumn,
        };
        assert_matches!(
            resolve(&writer(), &neither),
            Err(FramexlError::AmbiguousRule(_))
        );
    }

    #[test]
    fn mask_rule_length_is_checked() {
        let format = CdFormat {
            column: "status".into(),
            rules: vec![CdRule::with_mask("short", vec![true, false], "bold")],
            apply: ApplyTo::SelfColumn,
        };
        assert_matches!(
            resolve(&writer(), &format),
            Err(FramexlError::AmbiguousRule(_))
        );
    }

    #[test]
    fn coalescing_kicks_in_above_the_threshold() {
        let cells: Vec<CellAddress> = (1..=50)
            .map(|row| CellAddress { row, col: 2 })
            .collect();
        let rule = RuleCells::Cells(cells.clone());

        let flat = rule.coalesced(100);
        assert_eq!(flat.len(), 50);
        assert_eq!(flat[0].to_string(), "B1");

        let runs = rule.coalesced(COALESCE_THRESHOLD);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].to_string(), "B1:B50");

        assert!(RuleCells::NoCells.coalesced(0).is_empty());
    }

    #[test]
    fn coalescing_breaks_runs_per_column_and_gap() {
        let mut cells: Vec<CellAddress> = (1..=30).map(|row| CellAddress { row, col: 1 }).collect();
        cells.extend((40..=60).map(|row| CellAddress { row, col: 1 }));
        cells.extend((1..=10).map(|row| CellAddress { row, col: 3 }));
        let runs = RuleCells::Cells(cells).coalesced(45);
        let rendered: Vec<String> = runs.iter().map(|r| r.to_string()).collect();
        assert_eq!(rendered, ["A1:A30", "A40:A60", "C1:C10"]);
    }
}
