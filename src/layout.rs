//! Word wrapping for the message log.
//!
//! The renderer draws exactly the rows produced here, so the row count used
//! for scrolling is the row count on screen.

use std::ops::Range;

use ratatui::text::Span;

use crate::state::{Message, Role};

/// One character of message body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub bold: bool,
}

/// Terminal columns taken by `c`, measured the way ratatui measures spans.
pub fn char_width(c: char) -> usize {
    let mut buf = [0u8; 4];
    Span::raw(&*c.encode_utf8(&mut buf)).width()
}

pub fn str_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Split a bot line on `**` markers; an unmatched `**` is kept as literal text.
pub fn bold_cells(text: &str) -> Vec<Cell> {
    let parts: Vec<&str> = text.split("**").collect();
    // An even number of parts means the last `**` was never closed
    let closed = parts.len() % 2 == 1;
    let mut cells = Vec::with_capacity(text.len());

    for (i, part) in parts.iter().enumerate() {
        let is_bold = i % 2 == 1;
        let is_last = i == parts.len() - 1;
        if is_bold && is_last && !closed {
            cells.extend("**".chars().chain(part.chars()).map(|ch| Cell { ch, bold: false }));
        } else {
            cells.extend(part.chars().map(|ch| Cell { ch, bold: is_bold }));
        }
    }

    cells
}

fn plain_cells(text: &str) -> Vec<Cell> {
    text.chars().map(|ch| Cell { ch, bold: false }).collect()
}

/// Greedy word wrap of one source line into rows no wider than `width`.
///
/// Rows break at the last space that fits and the space itself is not
/// drawn. Words wider than a row are split.
pub fn wrap(cells: &[Cell], width: usize) -> Vec<Range<usize>> {
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut start = 0;
    let mut row_width = 0;
    let mut last_break: Option<usize> = None;

    let mut i = 0;
    while i < cells.len() {
        let c = cells[i];
        let w = char_width(c.ch);

        if row_width + w > width && i > start {
            if c.ch == ' ' {
                rows.push(start..i);
                start = i + 1;
                row_width = 0;
                last_break = None;
                i += 1;
                continue;
            }
            match last_break {
                Some(b) if b > start => {
                    // b - 1 is the space the row breaks on
                    rows.push(start..b - 1);
                    row_width = cells[b..i].iter().map(|c| char_width(c.ch)).sum();
                    start = b;
                }
                _ => {
                    rows.push(start..i);
                    row_width = 0;
                    start = i;
                }
            }
            last_break = None;
            if row_width + w > width && i > start {
                rows.push(start..i);
                row_width = 0;
                start = i;
            }
        }

        row_width += w;
        if c.ch == ' ' {
            last_break = Some(i + 1);
        }
        i += 1;
    }

    if start < cells.len() || rows.is_empty() {
        rows.push(start..cells.len());
    }
    rows
}

/// Wrapped body rows of a message; always at least one row.
pub fn message_rows(msg: &Message, width: u16) -> Vec<Vec<Cell>> {
    let mut rows = Vec::new();
    for line in msg.text.lines() {
        let cells = match msg.role {
            Role::Bot => bold_cells(line),
            Role::User | Role::Error => plain_cells(line),
        };
        for range in wrap(&cells, width as usize) {
            rows.push(cells[range].to_vec());
        }
    }
    if rows.is_empty() {
        rows.push(Vec::new());
    }
    rows
}

/// Rows a message takes on screen: label, body, blank separator.
pub fn message_height(msg: &Message, width: u16) -> usize {
    message_rows(msg, width).len() + 2
}

/// Rows the whole log takes at `width` columns.
pub fn total_rows(messages: &[Message], width: u16) -> u16 {
    let total: usize = messages.iter().map(|m| message_height(m, width)).sum();
    total.min(u16::MAX as usize) as u16
}
