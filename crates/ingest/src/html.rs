//! HTML table extraction.
//!
//! BOM exports from browser tools arrive as HTML pages with one or more
//! `<table>` elements. The reader is configured for tag-soup tolerance:
//! unclosed `<td>`/`<tr>` are closed implicitly by the next opener, case is
//! ignored, and a parse error mid-stream keeps the tables collected so far.

use std::borrow::Cow;

use quick_xml::events::Event;
use quick_xml::Reader;

use bomdiff_core::CellValue;

use crate::grid::Grid;

/// Extract every table in document order, one grid per table.
pub fn read_table_grids(html: &str) -> Vec<Grid> {
    let html = escape_bare_ampersands(html);
    let mut reader = Reader::from_str(&html);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut collector = TableCollector::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match e.name().as_ref().to_ascii_lowercase().as_slice() {
                b"table" => collector.open_table(),
                b"tr" => collector.open_row(),
                b"td" | b"th" => collector.open_cell(),
                b"br" => collector.push_text("\n"),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref().to_ascii_lowercase().as_slice() {
                b"td" | b"th" => {
                    collector.open_cell();
                    collector.close_cell();
                }
                b"br" => collector.push_text("\n"),
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.name().as_ref().to_ascii_lowercase().as_slice() {
                b"table" => collector.close_table(),
                b"tr" => collector.close_row(),
                b"td" | b"th" => collector.close_cell(),
                _ => {}
            },
            Ok(Event::Text(ref t)) => {
                collector.push_text(&decode_entities(&String::from_utf8_lossy(t)));
            }
            Ok(Event::CData(ref t)) => collector.push_text(&String::from_utf8_lossy(t)),
            Ok(Event::GeneralRef(ref r)) => collector.push_entity(&String::from_utf8_lossy(r)),
            Ok(Event::Eof) => break,
            // Malformed markup from here on; keep what already parsed.
            Err(_) => break,
            Ok(_) => {}
        }
    }

    collector.finish()
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Streaming table builder. Openers implicitly close whatever the source
/// left open, so `<tr><td>a<td>b<tr>...` parses the way a browser reads it.
/// Text outside a cell is discarded.
#[derive(Default)]
struct TableCollector {
    tables: Vec<Grid>,
    rows: Grid,
    cells: Vec<CellValue>,
    text: String,
    in_table: bool,
    in_row: bool,
    in_cell: bool,
}

impl TableCollector {
    fn open_table(&mut self) {
        self.close_table();
        self.in_table = true;
    }

    fn open_row(&mut self) {
        if !self.in_table {
            return;
        }
        self.close_row();
        self.in_row = true;
    }

    fn open_cell(&mut self) {
        if !self.in_row {
            return;
        }
        self.close_cell();
        self.in_cell = true;
    }

    fn push_text(&mut self, text: &str) {
        if self.in_cell {
            self.text.push_str(text);
        }
    }

    fn push_entity(&mut self, name: &str) {
        if !self.in_cell {
            return;
        }
        match decode_entity(name) {
            Some(ch) => self.text.push(ch),
            None => {
                // Unknown reference stays literal, the way a browser shows it.
                self.text.push('&');
                self.text.push_str(name);
                self.text.push(';');
            }
        }
    }

    fn close_cell(&mut self) {
        if self.in_cell {
            self.cells.push(CellValue::from(collapse_whitespace(&self.text)));
            self.text.clear();
            self.in_cell = false;
        }
    }

    fn close_row(&mut self) {
        self.close_cell();
        if self.in_row {
            self.rows.push(std::mem::take(&mut self.cells));
            self.in_row = false;
        }
    }

    fn close_table(&mut self) {
        self.close_row();
        if self.in_table {
            self.tables.push(std::mem::take(&mut self.rows));
            self.in_table = false;
        }
    }

    fn finish(mut self) -> Vec<Grid> {
        // Flush a table left open at end of input.
        self.close_table();
        self.tables
    }
}

// ---------------------------------------------------------------------------
// Text handling
// ---------------------------------------------------------------------------

/// Escape ampersands that do not open a reference, so soup like `R&D`
/// reads as text instead of failing the parse.
fn escape_bare_ampersands(html: &str) -> Cow<'_, str> {
    if !html.contains('&') {
        return Cow::Borrowed(html);
    }
    let mut out = String::with_capacity(html.len() + 8);
    let mut rest = html;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let opens_reference = rest[1..].find(';').is_some_and(|end| {
            (1..=10).contains(&end)
                && rest[1..1 + end]
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'#')
        });
        out.push_str(if opens_reference { "&" } else { "&amp;" });
        rest = &rest[1..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Collapse runs of markup whitespace to a single space and trim the ends.
/// Non-breaking spaces are content, not markup whitespace, and survive.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if matches!(ch, ' ' | '\t' | '\n' | '\r') {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    out
}

/// Decode entity references the reader split out of text, plus anything
/// still inline. Handles the XML five, `nbsp` and numeric references.
fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = match digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match rest[1..].find(';') {
            // Entity names are short; a distant semicolon means a bare ampersand.
            Some(end) if end <= 10 => {
                let name = &rest[1..1 + end];
                match decode_entity(name) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('&');
                        out.push_str(name);
                        out.push(';');
                    }
                }
                rest = &rest[end + 2..];
            }
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
