//! The formatting mini-language.
//!
//! A directive string is a list of tokens separated by semicolons or commas:
//! bare keywords (`bold`, `merge`), `key=value` pairs (`font_size=12`,
//! `border=outer_thin`), `#RRGGBB` color literals (a bare literal sets the
//! fill color), and palette names. Unknown tokens are hard errors so a typo
//! never silently produces an unstyled export.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FramexlError, Result};

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

/// Named colors accepted wherever a `#RRGGBB` literal is.
static PALETTE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("black", "000000"),
        ("white", "FFFFFF"),
        ("red", "FF0000"),
        ("green", "00B050"),
        ("blue", "0070C0"),
        ("yellow", "FFFF00"),
        ("orange", "FFC000"),
        ("gray", "808080"),
        ("grey", "808080"),
        ("light_gray", "D9D9D9"),
        ("light_blue", "DDEBF7"),
        ("light_green", "E2EFDA"),
        ("light_yellow", "FFF2CC"),
        ("light_orange", "FCE4D6"),
    ])
});

const HORIZONTAL_ALIGNMENTS: &[&str] =
    &["general", "left", "center", "right", "fill", "justify"];
const VERTICAL_ALIGNMENTS: &[&str] = &["top", "center", "bottom", "justify"];
const BORDER_SIDES: &[&str] = &["all", "outer", "inner", "left", "right", "top", "bottom"];
const BORDER_STYLES: &[&str] = &["thin", "medium", "thick", "double", "dashed", "dotted"];
const FILL_PATTERNS: &[&str] = &["solid", "none", "gray125", "lightup", "lightdown"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderSide {
    All,
    Outer,
    Inner,
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorderSpec {
    pub side: BorderSide,
    /// One of the `BORDER_STYLES` names, passed through to the document
    /// layer as is.
    pub style: String,
    /// `RRGGBB`, defaulting to black at apply time when absent.
    pub color: Option<String>,
}

/// Typed form of one parsed directive. All fields are additive; absent
/// means "leave the existing style alone".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatDirective {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikeout: bool,
    pub merge: bool,
    pub wrap: bool,
    pub font: Option<String>,
    pub font_size: Option<f64>,
    /// `RRGGBB` without the leading `#`.
    pub font_color: Option<String>,
    pub fill: Option<String>,
    pub fill_pattern: Option<String>,
    pub align: Option<String>,
    pub valign: Option<String>,
    pub width: Option<f64>,
    pub number_format: Option<String>,
    pub borders: Vec<BorderSpec>,
}

impl FormatDirective {
    pub fn parse(directive: &str) -> Result<Self> {
        let mut out = Self::default();
        for token in tokenize(directive) {
            out.consume(&token)?;
        }
        Ok(out)
    }

    fn consume(&mut self, token: &str) -> Result<()> {
        if let Some((key, value)) = token.split_once('=') {
            return self.consume_pair(key.trim(), value.trim(), token);
        }
        match token {
            "bold" => self.bold = true,
            "italic" => self.italic = true,
            "underline" => self.underline = true,
            "strikeout" => self.strikeout = true,
            "merge" => self.merge = true,
            "wrap" => self.wrap = true,
            _ => {
                // bare color literal or palette name sets the fill
                let color = parse_color(token)?;
                self.set_fill(color)?;
            }
        }
        Ok(())
    }

    fn consume_pair(&mut self, key: &str, value: &str, token: &str) -> Result<()> {
        match key {
            "font" => self.font = Some(value.to_string()),
            "font_size" => {
                let size: f64 = value
                    .parse()
                    .map_err(|_| FramexlError::UnsupportedRuleToken(token.to_string()))?;
                self.font_size = Some(size);
            }
            "font_color" => self.font_color = Some(parse_color(value)?),
            "fill" => {
                let color = parse_color(value)?;
                self.set_fill(color)?;
            }
            "pattern" => {
                if !FILL_PATTERNS.contains(&value) {
                    return Err(FramexlError::UnsupportedRuleToken(token.to_string()));
                }
                if self.fill_pattern.is_some() {
                    return Err(FramexlError::AmbiguousRule(format!(
                        "two fill patterns in one directive, second was '{value}'"
                    )));
                }
                self.fill_pattern = Some(value.to_string());
            }
            "align" => {
                if !HORIZONTAL_ALIGNMENTS.contains(&value) {
                    return Err(FramexlError::UnsupportedRuleToken(token.to_string()));
                }
                self.align = Some(value.to_string());
            }
            "valign" => {
                if !VERTICAL_ALIGNMENTS.contains(&value) {
                    return Err(FramexlError::UnsupportedRuleToken(token.to_string()));
                }
                self.valign = Some(value.to_string());
            }
            "width" => {
                let width: f64 = value
                    .parse()
                    .map_err(|_| FramexlError::UnsupportedRuleToken(token.to_string()))?;
                self.width = Some(width);
            }
            "number_format" => self.number_format = Some(value.to_string()),
            "border" => self.borders.push(parse_border(value, token)?),
            _ => return Err(FramexlError::UnsupportedRuleToken(token.to_string())),
        }
        Ok(())
    }

    fn set_fill(&mut self, color: String) -> Result<()> {
        if let Some(existing) = &self.fill {
            return Err(FramexlError::AmbiguousRule(format!(
                "two fill colors in one directive: '{existing}' and '{color}'"
            )));
        }
        self.fill = Some(color);
        Ok(())
    }

    /// True when the directive changes nothing at all.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Semicolon segments, then commas inside each segment. A
/// `number_format=` segment stays whole because format codes may contain
/// commas (`#,##0.00`).
fn tokenize(directive: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for segment in directive.split(';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        if segment.starts_with("number_format=") {
            tokens.push(segment.to_string());
            continue;
        }
        for token in segment.split(',') {
            let token = token.trim();
            if !token.is_empty() {
                tokens.push(token.to_string());
            }
        }
    }
    tokens
}

/// `#RRGGBB` literal or palette name, returned as bare `RRGGBB`.
fn parse_color(value: &str) -> Result<String> {
    if HEX_COLOR.is_match(value) {
        return Ok(value[1..].to_ascii_uppercase());
    }
    PALETTE
        .get(value)
        .map(|hex| hex.to_string())
        .ok_or_else(|| FramexlError::UnsupportedRuleToken(value.to_string()))
}

/// `side_style` compounds (`outer_thin`), optionally with a color suffix
/// (`outer_thick_#FF0000`).
fn parse_border(value: &str, token: &str) -> Result<BorderSpec> {
    let mut parts = value.splitn(3, '_');
    let side = parts
        .next()
        .filter(|s| BORDER_SIDES.contains(s))
        .ok_or_else(|| FramexlError::UnsupportedRuleToken(token.to_string()))?;
    let style = parts
        .next()
        .filter(|s| BORDER_STYLES.contains(s))
        .ok_or_else(|| FramexlError::UnsupportedRuleToken(token.to_string()))?;
    let color = match parts.next() {
        Some(rest) => Some(parse_color(rest)?),
        None => None,
    };
    let side = match side {
        "all" => BorderSide::All,
        "outer" => BorderSide::Outer,
        "inner" => BorderSide::Inner,
        "left" => BorderSide::Left,
        "right" => BorderSide::Right,
        "top" => BorderSide::Top,
        "bottom" => BorderSide::Bottom,
        _ => unreachable!("validated against BORDER_SIDES"),
    };
    Ok(BorderSpec {
        side,
        style: style.to_string(),
        color,
    })
}
