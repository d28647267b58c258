//! Row-based document storage.
//!
//! The document is an arena of rows, each row a `Vec<char>`. Rows never contain the row
//! separator; multi-row text ("chunks") is expressed as a single string where rows are joined
//! with [`ROW_SEPARATOR`].
//!
//! All geometry is clamped rather than rejected: a row index past the end resolves to the last
//! row, a column past the end of a row either pads (inserts) or clamps (deletes, splits).

use crate::selection::{Position, Selection};
use std::collections::BTreeSet;

/// Marker separating rows inside a chunk.
pub const ROW_SEPARATOR: char = '\n';

/// A single row of characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    chars: Vec<char>,
}

impl Row {
    fn from_line(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }

    /// Characters of the row.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of characters in the row.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Whether the row has no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn pad_to(&mut self, col: usize) {
        if col > self.chars.len() {
            self.chars.resize(col, ' ');
        }
    }
}

/// Furthest a position may sit past the end of its row, in columns.
pub const MAX_VIRTUAL_COLUMNS: usize = 1024;

/// In-memory plain-text document.
#[derive(Debug, Clone)]
pub struct Document {
    rows: Vec<Row>,
    dirty: BTreeSet<usize>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding a single empty row.
    pub fn new() -> Self {
        Self {
            rows: vec![Row::default()],
            dirty: BTreeSet::new(),
        }
    }

    /// Build a document from text, splitting on [`ROW_SEPARATOR`].
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        doc.set_text(text);
        doc
    }

    /// Number of rows (always at least one).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether `row` exists.
    pub fn has_row(&self, row: usize) -> bool {
        row < self.rows.len()
    }

    /// Index of the last row.
    pub fn last_row(&self) -> usize {
        self.rows.len() - 1
    }

    /// Clamp a row index into the document.
    pub fn clamp_row(&self, row: usize) -> usize {
        row.min(self.last_row())
    }

    /// Clamp the row of `pos` and keep the column within [`MAX_VIRTUAL_COLUMNS`] of the row
    /// end. Columns past the row end stay virtual.
    pub fn clamp_position(&self, pos: Position) -> Position {
        let row = self.clamp_row(pos.row);
        let limit = self.rows[row].len() + MAX_VIRTUAL_COLUMNS;
        Position::new(row, pos.col.min(limit))
    }

    /// Clamp both the row and the column of `pos` into existing text.
    pub fn clamp_position_strict(&self, pos: Position) -> Position {
        let row = self.clamp_row(pos.row);
        Position::new(row, pos.col.min(self.rows[row].len()))
    }

    /// Length of `row` in characters (clamped row).
    pub fn row_length(&self, row: usize) -> usize {
        self.rows[self.clamp_row(row)].len()
    }

    /// Characters of `row` (clamped row).
    pub fn row_chars(&self, row: usize) -> &[char] {
        self.rows[self.clamp_row(row)].chars()
    }

    /// Text of `row` (clamped row).
    pub fn row_text(&self, row: usize) -> String {
        self.row_chars(row).iter().collect()
    }

    /// Iterate over all rows.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Whether the document is a single empty row.
    pub fn is_empty(&self) -> bool {
        self.rows.len() == 1 && self.rows[0].is_empty()
    }

    /// Position just after the last character of the last row.
    pub fn end_position(&self) -> Position {
        let row = self.last_row();
        Position::new(row, self.rows[row].len())
    }

    /// Grow the arena so that `index` is a valid row; new rows are empty.
    pub fn ensure_row(&mut self, index: usize) {
        if index < self.rows.len() {
            return;
        }
        let first_new = self.rows.len();
        self.rows.resize_with(index + 1, Row::default);
        self.dirty.extend(first_new..=index);
    }

    /// Insert characters (no row separators) at `pos`, padding with spaces when `pos.col` is
    /// past the row end. Returns the position just after the inserted text.
    pub fn insert_characters(&mut self, pos: Position, text: &str) -> Position {
        let pos = self.clamp_position(pos);
        let row_index = pos.row;
        let row = &mut self.rows[row_index];
        row.pad_to(pos.col);

        let inserted: Vec<char> = text.chars().filter(|&ch| ch != ROW_SEPARATOR).collect();
        let count = inserted.len();
        row.chars.splice(pos.col..pos.col, inserted);

        self.dirty.insert(row_index);
        Position::new(row_index, pos.col + count)
    }

    /// Delete up to `length` characters starting at `pos`. Returns the removed text.
    pub fn delete_characters(&mut self, pos: Position, length: usize) -> String {
        let row_index = self.clamp_row(pos.row);
        let row = &mut self.rows[row_index];
        let start = pos.col.min(row.len());
        let end = start.saturating_add(length).min(row.len());
        if start == end {
            return String::new();
        }

        let removed: String = row.chars.drain(start..end).collect();
        self.dirty.insert(row_index);
        removed
    }

    /// Split the row at `pos.col` (clamped to the row length). The new row starts with
    /// `indent_columns` spaces followed by the carried-over right-hand content.
    pub fn split_row(&mut self, pos: Position, indent_columns: usize) -> Position {
        let row_index = self.clamp_row(pos.row);
        let split_at = pos.col.min(self.rows[row_index].len());

        let tail = self.rows[row_index].chars.split_off(split_at);
        let mut chars = vec![' '; indent_columns];
        chars.extend(tail);
        self.rows.insert(row_index + 1, Row { chars });

        self.mark_dirty_from(row_index);
        Position::new(row_index + 1, indent_columns)
    }

    /// Merge `row + 1` into `row`. No-op when `row` is the last row.
    pub fn join_row(&mut self, row: usize) {
        if row >= self.last_row() {
            return;
        }
        let previous = self.rows.len();
        let next = self.rows.remove(row + 1);
        self.rows[row].chars.extend(next.chars);
        self.dirty.extend(row..previous);
    }

    /// Text covered by `selection`, rows joined with [`ROW_SEPARATOR`].
    pub fn get_chunk(&self, selection: &Selection) -> String {
        let start = self.clamp_position_strict(selection.start);
        let end = self.clamp_position_strict(selection.end);
        if end <= start {
            return String::new();
        }

        if start.row == end.row {
            return self.rows[start.row].chars[start.col..end.col].iter().collect();
        }

        let mut chunk: String = self.rows[start.row].chars[start.col..].iter().collect();
        for row in &self.rows[start.row + 1..end.row] {
            chunk.push(ROW_SEPARATOR);
            chunk.extend(row.chars.iter());
        }
        chunk.push(ROW_SEPARATOR);
        chunk.extend(self.rows[end.row].chars[..end.col].iter());
        chunk
    }

    /// Remove the text covered by `selection`, joining the boundary rows. Returns the removed
    /// chunk.
    pub fn delete_chunk(&mut self, selection: &Selection) -> String {
        let start = self.clamp_position_strict(selection.start);
        let end = self.clamp_position_strict(selection.end);
        if end <= start {
            return String::new();
        }

        let chunk = self.get_chunk(&Selection { start, end });
        if start.row == end.row {
            self.rows[start.row].chars.drain(start.col..end.col);
            self.dirty.insert(start.row);
            return chunk;
        }

        let previous = self.rows.len();
        let tail = self.rows[end.row].chars.split_off(end.col);
        self.rows[start.row].chars.truncate(start.col);
        self.rows[start.row].chars.extend(tail);
        self.rows.drain(start.row + 1..=end.row);

        // Removed rows stay dirty.
        self.dirty.extend(start.row..previous);
        chunk
    }

    /// Insert a (possibly multi-row) chunk at `pos`, padding the row if needed. Returns the
    /// position just after the inserted text.
    pub fn insert_chunk(&mut self, pos: Position, text: &str) -> Position {
        let pos = self.clamp_position(pos);
        let mut segments = text.split(ROW_SEPARATOR);
        let first = segments.next().unwrap_or_default();
        let mut end = self.insert_characters(pos, first);

        for segment in segments {
            end = self.split_row(end, 0);
            end = self.insert_characters(end, segment);
        }
        end
    }

    /// Rows changed since the last call, in ascending order. Clears the set.
    pub fn take_dirty_rows(&mut self) -> Vec<usize> {
        let rows: Vec<usize> = std::mem::take(&mut self.dirty).into_iter().collect();
        rows
    }

    /// Whether any row changed since the last [`Document::take_dirty_rows`].
    pub fn has_dirty_rows(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Reset to a single empty row.
    pub fn clear(&mut self) {
        let previous = self.rows.len();
        self.rows = vec![Row::default()];
        self.dirty.extend(0..previous);
    }

    /// Whole document text, rows joined with [`ROW_SEPARATOR`].
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                out.push(ROW_SEPARATOR);
            }
            out.extend(row.chars.iter());
        }
        out
    }

    /// Replace the whole content: clear, then bulk insert. `"\r\n"` line endings are
    /// normalized to [`ROW_SEPARATOR`].
    pub fn set_text(&mut self, text: &str) {
        self.clear();
        let lines: Vec<&str> = text.split(ROW_SEPARATOR).collect();
        self.ensure_row(lines.len() - 1);
        for (index, line) in lines.iter().enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.rows[index] = Row::from_line(line);
        }
    }

    fn mark_dirty_from(&mut self, row: usize) {
        self.dirty.extend(row..self.rows.len());
    }
}

/// Position just after `text` when inserted at `pos`.
pub fn chunk_end(pos: Position, text: &str) -> Position {
    let mut segments = text.split(ROW_SEPARATOR);
    let first_len = segments.next().map_or(0, |s| s.chars().count());
    let mut end = Position::new(pos.row, pos.col + first_len);
    for segment in segments {
        end = Position::new(end.row + 1, segment.chars().count());
    }
    end
}
