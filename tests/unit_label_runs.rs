use framexl::writer::LabelRun;
use framexl::{Frame, FrameWriter};

fn writer_for(labels: Vec<&str>) -> FrameWriter {
    let values: Vec<String> = (0..labels.len()).map(|n| n.to_string()).collect();
    let frame = Frame::new(vec![("v", values)])
        .unwrap()
        .with_index(vec![("k".to_string(), labels)])
        .unwrap();
    FrameWriter::new(frame, "A1".parse().unwrap(), true, true).unwrap()
}

fn run(value: &str, start_offset: usize, len: usize) -> LabelRun {
    LabelRun {
        value: value.to_string(),
        start_offset,
        len,
    }
}

#[test]
fn mixed_runs_scan_in_one_pass() {
    let writer = writer_for(vec!["A", "A", "B", "B", "B", "C"]);
    assert_eq!(
        writer.label_runs("k").unwrap(),
        vec![run("A", 0, 2), run("B", 2, 3), run("C", 5, 1)]
    );
}

#[test]
fn constant_column_is_one_run() {
    let writer = writer_for(vec!["x", "x", "x", "x"]);
    assert_eq!(writer.label_runs("k").unwrap(), vec![run("x", 0, 4)]);
}

#[test]
fn all_distinct_is_one_run_each() {
    let writer = writer_for(vec!["a", "b", "c"]);
    assert_eq!(
        writer.label_runs("k").unwrap(),
        vec![run("a", 0, 1), run("b", 1, 1), run("c", 2, 1)]
    );
}

#[test]
fn single_row_is_one_run_of_one() {
    let writer = writer_for(vec!["only"]);
    assert_eq!(writer.label_runs("k").unwrap(), vec![run("only", 0, 1)]);
}

#[test]
fn missing_labels_collapse_into_one_blank_run() {
    let values: Vec<String> = (0..4).map(|n| n.to_string()).collect();
    let labels: Vec<Option<&str>> = vec![Some("a"), None, None, Some("b")];
    let frame = Frame::new(vec![("v", values)])
        .unwrap()
        .with_index(vec![("k".to_string(), labels)])
        .unwrap();
    let writer = FrameWriter::new(frame, "A1".parse().unwrap(), true, true).unwrap();
    assert_eq!(
        writer.label_runs("k").unwrap(),
        vec![run("a", 0, 1), run("", 1, 2), run("b", 3, 1)]
    );
}

#[test]
fn numeric_and_text_labels_compare_by_display() {
    let frame = Frame::new(vec![("v", vec!["0", "1", "2"])])
        .unwrap()
        .with_index(vec![(
            "k".to_string(),
            vec![
                framexl::CellScalar::Int(1),
                framexl::CellScalar::Text("1".to_string()),
                framexl::CellScalar::Float(1.0),
            ],
        )])
        .unwrap();
    let writer = FrameWriter::new(frame, "A1".parse().unwrap(), true, true).unwrap();
    assert_eq!(writer.label_runs("k").unwrap(), vec![run("1", 0, 3)]);
}
