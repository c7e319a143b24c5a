mod support;

use framexl::cdformat::{self, ApplyTo, CdFormat, CdRule, RuleCells, COALESCE_THRESHOLD};
use framexl::sink::DocumentSink;
use framexl::style::FormatDirective;
use framexl::{CellRange, Frame, FrameWriter, Result};

/// Counts sink traffic instead of touching a workbook.
#[derive(Default)]
struct RecordingSink {
    value_writes: usize,
    format_writes: usize,
    merges: usize,
}

impl DocumentSink for RecordingSink {
    fn write_values(&mut self, _range: &CellRange, _values: &[Vec<String>]) -> Result<()> {
        self.value_writes += 1;
        Ok(())
    }

    fn apply_format(&mut self, _range: &CellRange, _directive: &FormatDirective) -> Result<()> {
        self.format_writes += 1;
        Ok(())
    }

    fn merge_range(&mut self, _range: &CellRange) -> Result<()> {
        self.merges += 1;
        Ok(())
    }

    fn set_column_width(&mut self, _col: u32, _width: f64) -> Result<()> {
        Ok(())
    }

    fn is_range_filled(&self, _range: &CellRange) -> bool {
        false
    }
}

fn apply_rules(sink: &mut RecordingSink, writer: &FrameWriter, format: &CdFormat) {
    for rule in cdformat::resolve(writer, format).unwrap() {
        if rule.cells.is_empty() {
            continue;
        }
        let directive = FormatDirective::parse(&rule.directive).unwrap();
        for range in rule.cells.coalesced(COALESCE_THRESHOLD) {
            sink.apply_format(&range, &directive).unwrap();
        }
    }
}

#[test]
fn no_cells_sentinel_means_zero_sink_writes() {
    let writer = support::region_writer("B2");
    let mut sink = RecordingSink::default();
    let dead = CdFormat {
        column: "score".to_string(),
        rules: vec![CdRule::literal("999", "bold")],
        apply: ApplyTo::Row,
    };
    apply_rules(&mut sink, &writer, &dead);
    assert_eq!(sink.format_writes, 0);

    let unknown_column = CdFormat {
        column: "not_a_column".to_string(),
        rules: vec![CdRule::literal("10", "bold")],
        apply: ApplyTo::Row,
    };
    apply_rules(&mut sink, &writer, &unknown_column);
    assert_eq!(sink.format_writes, 0);
}

#[test]
fn live_rules_write_once_per_resolved_range() {
    let writer = support::region_writer("B2");
    let mut sink = RecordingSink::default();
    let format = CdFormat {
        column: "region".to_string(),
        rules: vec![CdRule::literal("north", "#FFF2CC")],
        apply: ApplyTo::SelfColumn,
    };
    apply_rules(&mut sink, &writer, &format);
    // two matching rows, under the threshold, one single-cell range each
    assert_eq!(sink.format_writes, 2);
}

#[test]
fn tall_selections_coalesce_into_runs() {
    let rows = 120usize;
    let flags: Vec<String> = vec!["on".to_string(); rows];
    let values: Vec<String> = (0..rows).map(|n| n.to_string()).collect();
    let frame = Frame::new(vec![("flag", flags), ("value", values)]).unwrap();
    let writer = FrameWriter::new(frame, "A1".parse().unwrap(), true, false).unwrap();
    let format = CdFormat {
        column: "flag".to_string(),
        rules: vec![CdRule::literal("on", "fill=light_green")],
        apply: ApplyTo::Row,
    };
    let resolved = cdformat::resolve(&writer, &format).unwrap();
    let RuleCells::Cells(cells) = &resolved[0].cells else {
        panic!("expected cells");
    };
    assert_eq!(cells.len(), rows * 2);
    let runs = resolved[0].cells.coalesced(COALESCE_THRESHOLD);
    let rendered: Vec<String> = runs.iter().map(|r| r.to_string()).collect();
    assert_eq!(rendered, ["A2:A121", "B2:B121"]);
}

#[test]
fn mask_rules_follow_precomputed_predicates() {
    let frame = support::region_frame();
    let mask = frame
        .mask(&framexl::ColumnKey::single("score"), |v| {
            v.parse::<i64>().map(|n| n >= 30).unwrap_or(false)
        })
        .unwrap();
    let writer = FrameWriter::new(frame, "B2".parse().unwrap(), true, true).unwrap();
    let format = CdFormat {
        column: "score".to_string(),
        rules: vec![CdRule::with_mask("high", mask, "bold")],
        apply: ApplyTo::SelfColumn,
    };
    let resolved = cdformat::resolve(&writer, &format).unwrap();
    let RuleCells::Cells(cells) = &resolved[0].cells else {
        panic!("expected cells");
    };
    let rendered: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
    assert_eq!(rendered, ["C5", "C6"]);
}
