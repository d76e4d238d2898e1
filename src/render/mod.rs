//! Document renderer.
//!
//! Turns fetched bytes into a preview the content page can show inline:
//!
//! - PDF: the whole payload base64-encoded into a `data:application/pdf`
//!   URI, ready to drop into an embeddable object/frame. No pagination, no
//!   size limit.
//! - DOCX: top-level paragraphs joined into one text block, plus each table
//!   as a 2-D grid of cell strings. Table position relative to surrounding
//!   text is not preserved.
//! - PPTX and anything else: `Unsupported`. Expected, not exceptional.
//!
//! Preview failure never blocks the download path; the caller still serves
//! the raw bytes.

mod docx;

pub use docx::{extract_docx, DocxContent, Table};

use crate::errors::{PortalError, PortalResult};
use crate::source::FileKind;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;

/// Renderable preview of one fetched file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Preview {
    /// Inline PDF viewer payload.
    Pdf {
        /// `data:application/pdf;base64,<...>` over the full file.
        data_uri: String,
    },
    /// Extracted DOCX content.
    Docx {
        /// Top-level paragraphs joined with newlines.
        text: String,
        /// Tables in document order, each a grid of cell text.
        tables: Vec<Table>,
    },
    /// No preview path for this kind; download remains available.
    Unsupported {
        kind: FileKind,
    },
}

/// Render a preview for fetched bytes of a known kind.
///
/// `docx_enabled` is the configured capability switch: when off, DOCX falls
/// through to `Unsupported` exactly like PPTX does.
pub fn preview(bytes: &[u8], kind: FileKind, docx_enabled: bool) -> PortalResult<Preview> {
    match kind {
        FileKind::Pdf => Ok(Preview::Pdf {
            data_uri: pdf_data_uri(bytes),
        }),
        FileKind::Docx if docx_enabled => {
            let content = extract_docx(bytes)
                .map_err(|e| PortalError::preview(format!("Cannot parse DOCX: {}", e)))?;
            Ok(Preview::Docx {
                text: content.paragraphs.join("\n"),
                tables: content.tables,
            })
        }
        FileKind::Docx | FileKind::Pptx => Ok(Preview::Unsupported { kind }),
    }
}

/// Encode bytes as an embeddable PDF data URI.
pub fn pdf_data_uri(bytes: &[u8]) -> String {
    format!("data:application/pdf;base64,{}", STANDARD.encode(bytes))
}
