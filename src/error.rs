//! Error taxonomy for the address algebra, range mapper, and export pipeline.
//!
//! Everything here is raised synchronously at the point of detection. Typed
//! absences (an off-grid sentinel probe, a conditional rule matching zero
//! rows) are `Option` / `RuleCells::NoCells` on the calling side and never
//! travel through this enum.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FramexlError>;

#[derive(Debug, Error)]
pub enum FramexlError {
    /// Malformed cell reference string ("B7", "A1:C3").
    #[error("invalid cell address '{0}'")]
    InvalidAddress(String),

    /// An offset or resize would produce a row or column below 1.
    #[error("out of bounds: {0}")]
    OutOfBounds(String),

    /// Requested header/index bands are inconsistent with the frame's
    /// label-level counts, or the frame shape is empty.
    #[error("layout conflict: {0}")]
    LayoutConflict(String),

    /// A requested column or index-level name is not present in the frame.
    #[error("column or level '{0}' not found")]
    UnresolvedColumn(String),

    /// Style mini-language parse failure. Unknown tokens are hard errors,
    /// never silently skipped.
    #[error("unsupported style token '{0}'")]
    UnsupportedRuleToken(String),

    /// A rule mixes incompatible parts, e.g. two fill colors in one
    /// directive, or a named conditional rule with both a value list and a
    /// mask.
    #[error("ambiguous rule: {0}")]
    AmbiguousRule(String),

    /// A style or conditional-format catalog lookup missed.
    #[error("style sheet '{0}' not found in catalog")]
    UnknownStyleSheet(String),

    /// Sheet name not present in the open workbook.
    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    /// Failure reported by the underlying spreadsheet document layer.
    #[error("document error: {0}")]
    Document(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FramexlError {
    /// Coarse error class used in log fields and test assertions.
    pub fn category(&self) -> &'static str {
        match self {
            FramexlError::InvalidAddress(_)
            | FramexlError::OutOfBounds(_)
            | FramexlError::UnsupportedRuleToken(_)
            | FramexlError::AmbiguousRule(_) => "validation",
            FramexlError::UnresolvedColumn(_)
            | FramexlError::UnknownStyleSheet(_)
            | FramexlError::SheetNotFound(_) => "resolution",
            FramexlError::LayoutConflict(_) => "conflict",
            FramexlError::Document(_) | FramexlError::Io(_) => "io",
        }
    }
}
