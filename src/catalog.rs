//! Named style-sheet catalog.
//!
//! A style sheet maps band targets to directive strings. Targets are the
//! band names (`header`, `header_outer`, `index`, `index_outer`, `data`,
//! `all`) or any column prompt the wildcard resolver accepts. Catalogs ship
//! with built-in sheets and can be extended from a YAML or JSON file.

use std::fs;
use std::path::Path;

use anyhow::{Context, ensure};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{FramexlError, Result};
use crate::style::FormatDirective;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleSheet {
    /// Target -> directive string, applied in declaration order.
    pub rules: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub sheets: IndexMap<String, StyleSheet>,
}

impl Catalog {
    /// The sheets available without any configuration file.
    pub fn builtin() -> Self {
        let mut sheets = IndexMap::new();
        sheets.insert(
            "plain".to_string(),
            StyleSheet {
                rules: IndexMap::from([
                    ("header".to_string(), "bold; border=bottom_thin".to_string()),
                    ("index".to_string(), "bold".to_string()),
                ]),
            },
        );
        sheets.insert(
            "report_blue".to_string(),
            StyleSheet {
                rules: IndexMap::from([
                    (
                        "header_outer".to_string(),
                        "bold; font_color=white; fill=#0070C0; align=center".to_string(),
                    ),
                    ("index_outer".to_string(), "bold; fill=light_blue".to_string()),
                    ("all".to_string(), "border=all_thin".to_string()),
                ]),
            },
        );
        Self { sheets }
    }

    pub fn get(&self, name: &str) -> Result<&StyleSheet> {
        self.sheets
            .get(name)
            .ok_or_else(|| FramexlError::UnknownStyleSheet(name.to_string()))
    }

    /// Parse a catalog file by extension. Every directive must parse; a bad
    /// directive fails the load rather than the later export.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading style catalog {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let catalog: Catalog = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&raw)
                .with_context(|| format!("parsing YAML catalog {}", path.display()))?,
            "json" => serde_json::from_str(&raw)
                .with_context(|| format!("parsing JSON catalog {}", path.display()))?,
            other => anyhow::bail!("unsupported catalog extension '{other}' (expected yaml or json)"),
        };
        for (sheet_name, sheet) in &catalog.sheets {
            for (target, directive) in &sheet.rules {
                ensure!(
                    !target.trim().is_empty(),
                    "sheet '{sheet_name}' has an empty target"
                );
                FormatDirective::parse(directive).with_context(|| {
                    format!("sheet '{sheet_name}', target '{target}': bad directive")
                })?;
            }
        }
        Ok(catalog)
    }

    /// Built-ins overlaid with a file; file sheets win on name clashes.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut catalog = Self::builtin();
        let overlay = Self::from_file(path)?;
        for (name, sheet) in overlay.sheets {
            catalog.sheets.insert(name, sheet);
        }
        Ok(catalog)
    }
}
