//! framexl maps labeled tabular blocks onto spreadsheet cell ranges.
//!
//! The core pieces:
//!
//! - [`addr`]: cell address and range algebra with bijective base-26 column
//!   letters.
//! - [`frame`]: the immutable labeled block being exported.
//! - [`layout`] and [`writer`]: band geometry and every range question the
//!   export pipeline asks (columns, spans, label runs, merges, sections).
//! - [`cdformat`]: value- and mask-driven conditional cell sets.
//! - [`style`] and [`catalog`]: the formatting mini-language and named
//!   style sheets.
//! - [`sink`] and [`session`]: the document seam and the ordered put
//!   pipeline over `umya-spreadsheet`.

pub mod addr;
pub mod catalog;
pub mod cdformat;
pub mod error;
pub mod frame;
pub mod layout;
pub mod logging;
pub mod session;
pub mod sink;
pub mod style;
pub mod wildcard;
pub mod writer;

pub use addr::{CellAddress, CellRange};
pub use catalog::Catalog;
pub use cdformat::{ApplyTo, CdFormat, CdRule, RuleCells, RuleKey};
pub use error::{FramexlError, Result};
pub use frame::{CellScalar, ColumnKey, Frame};
pub use layout::TableLayout;
pub use session::{ExportSession, PutOptions};
pub use sink::{DocumentSink, XlsxSheet};
pub use style::FormatDirective;
pub use writer::{ColumnScope, FrameWriter, LabelRun, RangeRequest};
