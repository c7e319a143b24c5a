//! The labeled tabular block the mapper consumes.
//!
//! A `Frame` is immutable once built: named columns in authoritative order,
//! an optional multi-level row index, and cells held as display strings.
//! Missing values normalize to a single `""` sentinel at construction, so a
//! run scan over an index level never fragments on not-a-value markers.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FramexlError, Result};

/// Level separator used only at the string boundary of the API. Internally a
/// column key is a typed level list.
pub const LEVEL_SEPARATOR: &str = "__";

/// Multi-level column key. A flat frame has single-level keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnKey(Vec<String>);

impl ColumnKey {
    pub fn single(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    pub fn from_levels(levels: Vec<String>) -> Self {
        Self(levels)
    }

    /// Split a boundary string on the `__` separator.
    pub fn parse(joined: &str) -> Self {
        Self(joined.split(LEVEL_SEPARATOR).map(str::to_string).collect())
    }

    pub fn levels(&self) -> &[String] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Innermost (bottom header row) level.
    pub fn leaf(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(LEVEL_SEPARATOR))
    }
}

/// Scalar cell input. Constructors coerce everything to display strings and
/// fold missing values into `""`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellScalar {
    Missing,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl CellScalar {
    pub fn to_display(&self) -> String {
        match self {
            CellScalar::Missing => String::new(),
            CellScalar::Text(s) => s.clone(),
            CellScalar::Int(i) => i.to_string(),
            CellScalar::Float(v) => {
                if v.is_nan() {
                    String::new()
                } else if v.fract() == 0.0 && v.abs() < 1e15 {
                    format!("{}", *v as i64)
                } else {
                    v.to_string()
                }
            }
            CellScalar::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for CellScalar {
    fn from(s: &str) -> Self {
        CellScalar::Text(s.to_string())
    }
}

impl From<String> for CellScalar {
    fn from(s: String) -> Self {
        CellScalar::Text(s)
    }
}

impl From<i64> for CellScalar {
    fn from(i: i64) -> Self {
        CellScalar::Int(i)
    }
}

impl From<f64> for CellScalar {
    fn from(v: f64) -> Self {
        CellScalar::Float(v)
    }
}

impl From<bool> for CellScalar {
    fn from(b: bool) -> Self {
        CellScalar::Bool(b)
    }
}

impl<T: Into<CellScalar>> From<Option<T>> for CellScalar {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(CellScalar::Missing)
    }
}

#[derive(Debug, Clone)]
pub struct Frame {
    columns: IndexMap<ColumnKey, Vec<String>>,
    index_names: Vec<String>,
    index_levels: Vec<Vec<String>>,
    rows: usize,
    header_depth: usize,
}

impl Frame {
    /// Build from ordered `(key, values)` pairs. All columns must share one
    /// length and one key depth.
    pub fn new<K, V>(columns: Vec<(K, Vec<V>)>) -> Result<Self>
    where
        K: Into<ColumnKey>,
        V: Into<CellScalar>,
    {
        if columns.is_empty() {
            return Err(FramexlError::LayoutConflict(
                "a frame needs at least one column".to_string(),
            ));
        }
        let mut map: IndexMap<ColumnKey, Vec<String>> = IndexMap::new();
        let mut rows: Option<usize> = None;
        let mut depth: Option<usize> = None;
        for (key, values) in columns {
            let key = key.into();
            match depth {
                None => depth = Some(key.depth()),
                Some(d) if d != key.depth() => {
                    return Err(FramexlError::LayoutConflict(format!(
                        "column '{key}' has {} header levels, expected {d}",
                        key.depth()
                    )));
                }
                Some(_) => {}
            }
            match rows {
                None => rows = Some(values.len()),
                Some(n) if n != values.len() => {
                    return Err(FramexlError::LayoutConflict(format!(
                        "column '{key}' has {} rows, expected {n}",
                        values.len()
                    )));
                }
                Some(_) => {}
            }
            let rendered = values.into_iter().map(|v| v.into().to_display()).collect();
            if map.insert(key.clone(), rendered).is_some() {
                return Err(FramexlError::LayoutConflict(format!(
                    "duplicate column key '{key}'"
                )));
            }
        }
        Ok(Self {
            columns: map,
            index_names: Vec::new(),
            index_levels: Vec::new(),
            rows: rows.unwrap_or(0),
            header_depth: depth.unwrap_or(1),
        })
    }

    /// Attach a row index: one labeled level per entry, outermost first.
    pub fn with_index<V>(mut self, levels: Vec<(String, Vec<V>)>) -> Result<Self>
    where
        V: Into<CellScalar>,
    {
        for (name, labels) in levels {
            if labels.len() != self.rows {
                return Err(FramexlError::LayoutConflict(format!(
                    "index level '{name}' has {} labels, expected {}",
                    labels.len(),
                    self.rows
                )));
            }
            self.index_names.push(name);
            self.index_levels
                .push(labels.into_iter().map(|v| v.into().to_display()).collect());
        }
        Ok(self)
    }

    /// (rows, data columns).
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns.len())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> impl Iterator<Item = &ColumnKey> {
        self.columns.keys()
    }

    /// Number of header rows the column keys need.
    pub fn header_depth(&self) -> usize {
        self.header_depth
    }

    pub fn index_names(&self) -> &[String] {
        &self.index_names
    }

    pub fn index_depth(&self) -> usize {
        self.index_levels.len()
    }

    pub fn index_level_at(&self, level: usize) -> Option<&[String]> {
        self.index_levels.get(level).map(Vec::as_slice)
    }

    pub fn index_level(&self, name: &str) -> Result<&[String]> {
        let pos = self
            .index_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| FramexlError::UnresolvedColumn(name.to_string()))?;
        Ok(&self.index_levels[pos])
    }

    pub fn index_position(&self, name: &str) -> Option<usize> {
        self.index_names.iter().position(|n| n == name)
    }

    /// Position of a data column in authoritative order.
    pub fn column_position(&self, key: &ColumnKey) -> Option<usize> {
        self.columns.get_index_of(key)
    }

    pub fn column_values(&self, key: &ColumnKey) -> Result<&[String]> {
        self.columns
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| FramexlError::UnresolvedColumn(key.to_string()))
    }

    /// Resolve a boundary string to a column key: the joined `__` form first,
    /// then a unique leaf-level match.
    pub fn resolve_column(&self, name: &str) -> Option<ColumnKey> {
        let parsed = ColumnKey::parse(name);
        if self.columns.contains_key(&parsed) {
            return Some(parsed);
        }
        let mut leaf_matches = self.columns.keys().filter(|k| k.leaf() == name);
        match (leaf_matches.next(), leaf_matches.next()) {
            (Some(key), None) => Some(key.clone()),
            _ => None,
        }
    }

    /// Boundary names of the data columns, in order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().map(ColumnKey::to_string).collect()
    }

    /// Per-row boolean mask from a predicate over one column's display
    /// values.
    pub fn mask<F>(&self, key: &ColumnKey, predicate: F) -> Result<Vec<bool>>
    where
        F: Fn(&str) -> bool,
    {
        Ok(self
            .column_values(key)?
            .iter()
            .map(|v| predicate(v))
            .collect())
    }
}

impl From<&str> for ColumnKey {
    fn from(name: &str) -> Self {
        ColumnKey::parse(name)
    }
}

impl From<String> for ColumnKey {
    fn from(name: String) -> Self {
        ColumnKey::parse(&name)
    }
}
