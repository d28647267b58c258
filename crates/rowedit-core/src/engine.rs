//! Descriptor execution.
//!
//! [`ActionEngine`] owns the document, the caret and the selection, and is the only place where
//! an [`EditOp`] touches them. Each descriptor leaves the caret at a fixed place:
//!
//! - insertions: just after the inserted text
//! - deletions: at the deletion start
//! - `newline`: after the indent of the new row
//! - `joinLine`: at the join point
//! - `indent`/`unindent`: caret column shifted by its row's delta
//! - the `...AndSelect` descriptors: at the end of the restored selection, which becomes active
//!
//! `indent` and `unindent` shift the selection with the text, the `...AndSelect` descriptors set
//! it, and everything else clears it.
//!
//! Performing a descriptor emits an [`UndoItem`] tagged with a [`RecordScope`]; compound
//! descriptors run their inner steps under [`RecordScope::Queued`], so only the outer item is
//! eligible for the undo stack.

use crate::cursor::{CursorManager, CursorPolicy};
use crate::descriptor::{EditOp, JoinDirection, RecordScope, UndoItem};
use crate::document::{Document, ROW_SEPARATOR, chunk_end};
use crate::selection::{Position, Selection, SelectionState};

/// Owns the editable state and applies descriptors to it.
#[derive(Debug, Clone, Default)]
pub struct ActionEngine {
    document: Document,
    cursor: CursorManager,
    selection: SelectionState,
    emitted: Vec<(UndoItem, RecordScope)>,
}

impl ActionEngine {
    /// Create an engine over `document`.
    pub fn new(document: Document, policy: CursorPolicy) -> Self {
        Self {
            document,
            cursor: CursorManager::new(policy),
            selection: SelectionState::new(),
            emitted: Vec::new(),
        }
    }

    /// The document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The caret.
    pub fn cursor(&self) -> &CursorManager {
        &self.cursor
    }

    /// The caret, mutably.
    pub fn cursor_mut(&mut self) -> &mut CursorManager {
        &mut self.cursor
    }

    /// The selection.
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// The selection, mutably.
    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    /// Split borrow of the document and the caret.
    pub(crate) fn document_and_cursor(&mut self) -> (&Document, &mut CursorManager) {
        (&self.document, &mut self.cursor)
    }

    /// Caret in model coordinates.
    pub fn model_position(&self) -> Position {
        self.cursor.model_position(&self.document)
    }

    /// Mark rows changed since the last call.
    pub fn take_dirty_rows(&mut self) -> Vec<usize> {
        self.document.take_dirty_rows()
    }

    /// Replace the whole document, resetting caret and selection.
    pub fn load_text(&mut self, text: &str) {
        self.document.set_text(text);
        self.selection.clear();
        self.cursor.set_model_position(&self.document, Position::default());
        self.emitted.clear();
    }

    /// Perform `op` as a top-level edit.
    ///
    /// Returns the resolved descriptor, or `None` when the edit changed nothing.
    pub fn perform(&mut self, op: EditOp) -> Option<EditOp> {
        self.perform_scoped(op, RecordScope::Direct)
    }

    /// Undo items emitted since the last call.
    pub fn take_emitted(&mut self) -> Vec<(UndoItem, RecordScope)> {
        std::mem::take(&mut self.emitted)
    }

    fn perform_scoped(&mut self, op: EditOp, scope: RecordScope) -> Option<EditOp> {
        let redo_cursor = self.cursor.position();
        let resolved = self.apply(op)?;
        let undo_cursor = self.cursor.position();

        self.emitted.push((
            UndoItem {
                undo: resolved.inverse(),
                redo: resolved.clone(),
                undo_cursor,
                redo_cursor,
            },
            scope,
        ));
        Some(resolved)
    }

    /// Apply `op` without emitting a top-level undo item.
    ///
    /// Returns the resolved descriptor, or `None` when the edit changed nothing.
    pub fn apply(&mut self, op: EditOp) -> Option<EditOp> {
        tracing::trace!(action = op.key(), "applying descriptor");

        match op {
            EditOp::InsertCharacter { pos, text } => {
                let (pos, text) = self.insert_inline(pos, &text)?;
                Some(EditOp::InsertCharacter { pos, text })
            }
            EditOp::DeleteCharacter { pos, text } => {
                let (pos, text) = self.delete_inline(pos, text.chars().count())?;
                Some(EditOp::DeleteCharacter { pos, text })
            }
            EditOp::InsertTab { pos, text } => {
                let (pos, text) = self.insert_inline(pos, &text)?;
                Some(EditOp::InsertTab { pos, text })
            }
            EditOp::RemoveTab { pos, text } => {
                let (pos, text) = self.delete_inline(pos, text.chars().count())?;
                Some(EditOp::RemoveTab { pos, text })
            }
            EditOp::InsertChunk { pos, text } => {
                let (pos, text) = self.insert_chunk(pos, &text)?;
                self.selection.clear();
                Some(EditOp::InsertChunk { pos, text })
            }
            EditOp::DeleteChunk { start, end, .. } => {
                let (selection, text) = self.delete_chunk(Selection::new(start, end))?;
                Some(EditOp::DeleteChunk {
                    start: selection.start,
                    end: selection.end,
                    text,
                })
            }
            EditOp::Indent { first_row, history } => {
                let history = self.indent(first_row, history)?;
                Some(EditOp::Indent { first_row, history })
            }
            EditOp::Unindent { first_row, history } => {
                let history = self.unindent(first_row, history)?;
                Some(EditOp::Unindent { first_row, history })
            }
            EditOp::Newline { pos, indent } => {
                let row = self.document.clamp_row(pos.row);
                let col = pos.col.min(self.document.row_length(row));
                let pos = Position::new(row, col);

                let end = self.document.split_row(pos, indent);
                self.selection.clear();
                self.cursor.set_model_position(&self.document, end);
                Some(EditOp::Newline { pos, indent })
            }
            EditOp::JoinLine {
                row,
                direction,
                strip,
                ..
            } => self.join_line(row, direction, strip),
            EditOp::DeleteSelection { selection, .. } => {
                let (selection, text) = self.delete_chunk(selection)?;
                Some(EditOp::DeleteSelection { selection, text })
            }
            EditOp::InsertChunkAndSelect { selection, text } => {
                let (pos, text) = self.insert_chunk(selection.start, &text)?;
                let selection = Selection::new(pos, chunk_end(pos, &text));
                self.select_and_place_caret(selection);
                Some(EditOp::InsertChunkAndSelect { selection, text })
            }
            EditOp::DeleteSelectionAndInsertChunk {
                selection, text, ..
            } => {
                let removed = self.perform_scoped(
                    EditOp::DeleteSelection {
                        selection,
                        text: String::new(),
                    },
                    RecordScope::Queued,
                );
                let (selection, deleted) = match removed {
                    Some(EditOp::DeleteSelection { selection, text }) => (selection, text),
                    _ => {
                        let start = self.document.clamp_position_strict(selection.start);
                        (Selection::new(start, start), String::new())
                    }
                };

                let inserted = self.perform_scoped(
                    EditOp::InsertChunk {
                        pos: selection.start,
                        text,
                    },
                    RecordScope::Queued,
                );
                let text = match inserted {
                    Some(EditOp::InsertChunk { text, .. }) => text,
                    _ => String::new(),
                };

                if deleted.is_empty() && text.is_empty() {
                    return None;
                }
                Some(EditOp::DeleteSelectionAndInsertChunk {
                    selection,
                    deleted,
                    text,
                })
            }
            EditOp::DeleteChunkAndInsertChunkAndSelect {
                inserted,
                selection,
                restore,
            } => {
                let start = self.document.clamp_position_strict(selection.start);
                let removed = self.perform_scoped(
                    EditOp::DeleteChunk {
                        start,
                        end: chunk_end(start, &inserted),
                        text: String::new(),
                    },
                    RecordScope::Queued,
                );
                let inserted = match removed {
                    Some(EditOp::DeleteChunk { text, .. }) => text,
                    _ => String::new(),
                };

                let restored = self.perform_scoped(
                    EditOp::InsertChunkAndSelect {
                        selection: Selection::new(start, start),
                        text: restore,
                    },
                    RecordScope::Queued,
                );
                let (selection, restore) = match restored {
                    Some(EditOp::InsertChunkAndSelect { selection, text }) => (selection, text),
                    _ => {
                        self.selection.clear();
                        self.cursor.set_model_position(&self.document, start);
                        (Selection::new(start, start), String::new())
                    }
                };

                if inserted.is_empty() && restore.is_empty() {
                    return None;
                }
                Some(EditOp::DeleteChunkAndInsertChunkAndSelect {
                    inserted,
                    selection,
                    restore,
                })
            }
        }
    }

    /// Insert single-row text, folding any padding into the resolved text.
    fn insert_inline(&mut self, pos: Position, text: &str) -> Option<(Position, String)> {
        let text: String = text.chars().filter(|&ch| ch != ROW_SEPARATOR).collect();
        let (pos, text) = self.fold_padding(pos, text)?;

        let end = self.document.insert_characters(pos, &text);
        self.selection.clear();
        self.cursor.set_model_position(&self.document, end);
        Some((pos, text))
    }

    fn delete_inline(&mut self, pos: Position, count: usize) -> Option<(Position, String)> {
        let pos = self.document.clamp_position(pos);
        let removed = self.document.delete_characters(pos, count);
        if removed.is_empty() {
            return None;
        }

        self.selection.clear();
        self.cursor.set_model_position(&self.document, pos);
        Some((pos, removed))
    }

    fn insert_chunk(&mut self, pos: Position, text: &str) -> Option<(Position, String)> {
        let (pos, text) = self.fold_padding(pos, text.to_string())?;
        let end = self.document.insert_chunk(pos, &text);
        self.cursor.set_model_position(&self.document, end);
        Some((pos, text))
    }

    fn delete_chunk(&mut self, selection: Selection) -> Option<(Selection, String)> {
        let start = self.document.clamp_position_strict(selection.start);
        let end = self.document.clamp_position_strict(selection.end);
        let selection = Selection::new(start, end);

        let text = self.document.delete_chunk(&selection);
        if text.is_empty() {
            return None;
        }

        self.selection.clear();
        self.cursor.set_model_position(&self.document, selection.start);
        Some((selection, text))
    }

    /// Move an insertion point past the row end back to the row end, prefixing the padding.
    fn fold_padding(&self, pos: Position, text: String) -> Option<(Position, String)> {
        if text.is_empty() {
            return None;
        }
        let pos = self.document.clamp_position(pos);
        let len = self.document.row_length(pos.row);
        if pos.col <= len {
            return Some((pos, text));
        }

        let mut padded = " ".repeat(pos.col - len);
        padded.push_str(&text);
        Some((Position::new(pos.row, len), padded))
    }

    fn indent(&mut self, first_row: usize, history: Vec<String>) -> Option<Vec<String>> {
        let caret = self.model_position();
        let available = self.document.row_count().saturating_sub(first_row);
        let history: Vec<String> = history.into_iter().take(available).collect();
        if history.iter().all(String::is_empty) {
            return None;
        }

        let mut caret_col = caret.col;
        for (offset, text) in history.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let row = first_row + offset;
            let delta = text.chars().count();
            self.document.insert_characters(Position::new(row, 0), text);
            self.selection.shift_row(row, delta as isize);
            if row == caret.row {
                caret_col += delta;
            }
        }

        self.cursor
            .set_model_position(&self.document, Position::new(caret.row, caret_col));
        Some(history)
    }

    fn unindent(&mut self, first_row: usize, history: Vec<String>) -> Option<Vec<String>> {
        let caret = self.model_position();
        let available = self.document.row_count().saturating_sub(first_row);

        let mut removed_history = Vec::with_capacity(history.len().min(available));
        let mut caret_col = caret.col;
        for (offset, text) in history.iter().take(available).enumerate() {
            let row = first_row + offset;
            let leading = self
                .document
                .row_chars(row)
                .iter()
                .take_while(|&&ch| ch == ' ' || ch == '\t')
                .count();
            let count = text.chars().count().min(leading);

            let removed = self.document.delete_characters(Position::new(row, 0), count);
            let delta = removed.chars().count();
            self.selection.shift_row(row, -(delta as isize));
            if row == caret.row {
                caret_col = caret_col.saturating_sub(delta);
            }
            removed_history.push(removed);
        }

        if removed_history.iter().all(String::is_empty) {
            return None;
        }

        self.cursor
            .set_model_position(&self.document, Position::new(caret.row, caret_col));
        Some(removed_history)
    }

    fn join_line(&mut self, row: usize, direction: JoinDirection, strip: usize) -> Option<EditOp> {
        let row = self.document.clamp_row(row);
        let upper = match direction {
            JoinDirection::Up => row.checked_sub(1)?,
            JoinDirection::Down => row,
        };
        if upper >= self.document.last_row() {
            return None;
        }

        let lower = upper + 1;
        let leading_spaces = self
            .document
            .row_chars(lower)
            .iter()
            .take_while(|&&ch| ch == ' ')
            .count();
        let strip = strip.min(leading_spaces);
        self.document
            .delete_characters(Position::new(lower, 0), strip);

        let col = self.document.row_length(upper);
        self.document.join_row(upper);

        self.selection.clear();
        self.cursor
            .set_model_position(&self.document, Position::new(upper, col));
        Some(EditOp::JoinLine {
            row,
            direction,
            col,
            strip,
        })
    }

    fn select_and_place_caret(&mut self, selection: Selection) {
        self.selection.set(selection.start, selection.end);
        self.cursor.set_model_position(&self.document, selection.end);
    }
}
