#![allow(dead_code)]

use std::path::{Path, PathBuf};

use framexl::{CellAddress, Frame, FrameWriter};
use tempfile::{TempDir, tempdir};
use umya_spreadsheet::{self, Spreadsheet};

pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn write_file(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("write file");
        path
    }

    pub fn create_workbook<F>(&self, name: &str, f: F) -> PathBuf
    where
        F: FnOnce(&mut Spreadsheet),
    {
        let path = self.path(name);
        let mut book = umya_spreadsheet::new_file();
        f(&mut book);
        umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write workbook");
        path
    }
}

/// 4-row frame with a 2-run region index; the table most tests anchor at B2.
pub fn region_frame() -> Frame {
    Frame::new(vec![
        ("score", vec![10i64, 20, 30, 40]),
        ("grade", vec![1i64, 2, 3, 4]),
    ])
    .expect("frame")
    .with_index(vec![(
        "region".to_string(),
        vec!["north", "north", "south", "south"],
    )])
    .expect("index")
}

pub fn region_writer(anchor: &str) -> FrameWriter {
    let anchor: CellAddress = anchor.parse().expect("anchor");
    FrameWriter::new(region_frame(), anchor, true, true).expect("writer")
}
