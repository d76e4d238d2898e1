//! DOCX text and table extraction.
//!
//! A .docx file is an OPC zip container; the document body lives in
//! `word/document.xml`. The body is a flat stream of `w:p` paragraphs and
//! `w:tbl` tables; visible text sits inside `w:t` elements. We collect
//! top-level paragraphs (paragraph text inside table cells belongs to the
//! cell, not the text block) and each table as a grid of cell strings.

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::io::{Cursor, Read};

/// A table as a 2-D grid of cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Rows in document order; each row holds its cells' text left to right.
    pub rows: Vec<Vec<String>>,
}

/// Extracted document content.
#[derive(Debug, Clone, Default)]
pub struct DocxContent {
    /// Top-level paragraphs in document order, empty ones included.
    pub paragraphs: Vec<String>,
    /// Tables in document order.
    pub tables: Vec<Table>,
}

/// Open the container and extract paragraphs and tables.
pub fn extract_docx(bytes: &[u8]) -> Result<DocxContent> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("Not a valid DOCX container")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX container has no word/document.xml")?
        .read_to_string(&mut xml)
        .context("Cannot read word/document.xml")?;

    parse_document_xml(&xml)
}

/// Walk the document XML event stream.
///
/// State tracked: table nesting depth (only depth-1 tables become grids;
/// deeper nesting folds into the enclosing cell), whether we are inside a
/// `w:t` text run, and the paragraph buffer for top-level text.
fn parse_document_xml(xml: &str) -> Result<DocxContent> {
    let mut reader = Reader::from_str(xml);

    let mut content = DocxContent::default();
    let mut table_depth = 0usize;
    let mut in_text_run = false;
    let mut paragraph: Option<String> = None;

    loop {
        match reader.read_event().context("Malformed document XML")? {
            Event::Eof => break,

            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => {
                    table_depth += 1;
                    if table_depth == 1 {
                        content.tables.push(Table::default());
                    }
                }
                b"w:tr" if table_depth == 1 => {
                    if let Some(table) = content.tables.last_mut() {
                        table.rows.push(Vec::new());
                    }
                }
                b"w:tc" if table_depth == 1 => {
                    if let Some(row) = content.tables.last_mut().and_then(|t| t.rows.last_mut()) {
                        row.push(String::new());
                    }
                }
                b"w:p" => {
                    if table_depth == 0 {
                        paragraph = Some(String::new());
                    } else if let Some(cell) = current_cell(&mut content) {
                        // Paragraphs after the first within a cell stack with
                        // newlines, the way the cell reads.
                        if !cell.is_empty() {
                            cell.push('\n');
                        }
                    }
                }
                b"w:t" => in_text_run = true,
                _ => {}
            },

            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" if table_depth == 0 => {
                    if let Some(text) = paragraph.take() {
                        content.paragraphs.push(text);
                    }
                }
                b"w:t" => in_text_run = false,
                _ => {}
            },

            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => push_text(&mut content, &mut paragraph, table_depth, "\t"),
                b"w:br" | b"w:cr" => push_text(&mut content, &mut paragraph, table_depth, "\n"),
                _ => {}
            },

            Event::Text(t) if in_text_run => {
                let text = t.unescape().context("Malformed text node")?;
                push_text(&mut content, &mut paragraph, table_depth, &text);
            }

            _ => {}
        }
    }

    Ok(content)
}

/// Route a piece of text to the paragraph buffer or the open table cell.
fn push_text(
    content: &mut DocxContent,
    paragraph: &mut Option<String>,
    table_depth: usize,
    text: &str,
) {
    if table_depth == 0 {
        if let Some(buf) = paragraph.as_mut() {
            buf.push_str(text);
        }
    } else if let Some(cell) = current_cell(content) {
        cell.push_str(text);
    }
}

fn current_cell(content: &mut DocxContent) -> Option<&mut String> {
    content
        .tables
        .last_mut()
        .and_then(|t| t.rows.last_mut())
        .and_then(|r| r.last_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Build an in-memory .docx with the given document.xml body content.
    fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{body}</w:body>
</w:document>"#
        );

        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            writer
                .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    fn para(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    fn cell(text: &str) -> String {
        format!("<w:tc>{}</w:tc>", para(text))
    }

    #[test]
    fn test_two_paragraphs_and_one_table() {
        let body = format!(
            "{}{}<w:tbl><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr></w:tbl>",
            para("First paragraph."),
            para("Second paragraph."),
            cell("a1"),
            cell("b1"),
            cell("a2"),
            cell("b2"),
        );
        let content = extract_docx(&docx_with_body(&body)).unwrap();

        assert_eq!(
            content.paragraphs,
            vec!["First paragraph.", "Second paragraph."]
        );
        assert_eq!(content.tables.len(), 1);
        assert_eq!(
            content.tables[0].rows,
            vec![vec!["a1", "b1"], vec!["a2", "b2"]]
        );
    }

    #[test]
    fn test_cell_paragraphs_stay_out_of_text_block() {
        let body = format!(
            "{}<w:tbl><w:tr>{}</w:tr></w:tbl>",
            para("outside"),
            cell("inside"),
        );
        let content = extract_docx(&docx_with_body(&body)).unwrap();

        assert_eq!(content.paragraphs, vec!["outside"]);
        assert_eq!(content.tables[0].rows, vec![vec!["inside"]]);
    }

    #[test]
    fn test_multi_paragraph_cell_joins_with_newline() {
        let body = format!(
            "<w:tbl><w:tr><w:tc>{}{}</w:tc></w:tr></w:tbl>",
            para("line one"),
            para("line two"),
        );
        let content = extract_docx(&docx_with_body(&body)).unwrap();
        assert_eq!(content.tables[0].rows, vec![vec!["line one\nline two"]]);
    }

    #[test]
    fn test_split_runs_and_entities() {
        let body = "<w:p><w:r><w:t>Tom</w:t></w:r><w:r><w:t> &amp; Jerry</w:t></w:r></w:p>";
        let content = extract_docx(&docx_with_body(body)).unwrap();
        assert_eq!(content.paragraphs, vec!["Tom & Jerry"]);
    }

    #[test]
    fn test_tabs_and_breaks() {
        let body = "<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>c</w:t></w:r></w:p>";
        let content = extract_docx(&docx_with_body(body)).unwrap();
        assert_eq!(content.paragraphs, vec!["a\tb\nc"]);
    }

    #[test]
    fn test_empty_paragraphs_are_kept() {
        let body = format!("{}<w:p/>{}", para("a"), para("b"));
        let content = extract_docx(&docx_with_body(&body)).unwrap();
        // <w:p/> is an empty element, so it produces no Start/End pair and no
        // paragraph; an explicit empty pair does.
        assert_eq!(content.paragraphs, vec!["a", "b"]);

        let body = format!("{}<w:p></w:p>{}", para("a"), para("b"));
        let content = extract_docx(&docx_with_body(&body)).unwrap();
        assert_eq!(content.paragraphs, vec!["a", "", "b"]);
    }

    #[test]
    fn test_not_a_zip_fails() {
        assert!(extract_docx(b"plain text").is_err());
    }

    #[test]
    fn test_zip_without_document_xml_fails() {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            writer
                .start_file("other.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"x").unwrap();
            writer.finish().unwrap();
        }
        assert!(extract_docx(&buf).is_err());
    }
}
