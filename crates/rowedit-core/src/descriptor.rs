//! Edit descriptors.
//!
//! Every reversible edit is one variant of [`EditOp`]. A descriptor carries everything needed to
//! perform the edit *and* to build its inverse, so [`EditOp::inverse`] is a pure function.
//!
//! Some fields are only known once the edit runs (the text a deletion removed, the padding an
//! insertion past the row end needed, the column two rows were joined at).
//! [`crate::ActionEngine::apply`] returns the descriptor in *resolved* form with those fields
//! filled in; the inverse of a resolved descriptor restores the document exactly.
//!
//! | forward                         | inverse                              |
//! |---------------------------------|--------------------------------------|
//! | `insertCharacter`               | `deleteCharacter`                    |
//! | `insertChunk`                   | `deleteChunk`                        |
//! | `insertTab`                     | `removeTab`                          |
//! | `indent`                        | `unindent`                           |
//! | `newline`                       | `joinLine`                           |
//! | `deleteSelection`               | `insertChunkAndSelect`               |
//! | `deleteSelectionAndInsertChunk` | `deleteChunkAndInsertChunkAndSelect` |

use crate::document::chunk_end;
use crate::selection::{Position, Selection};

/// Which neighbour merges into the caret row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JoinDirection {
    /// The caret row merges into the row above it.
    Up,
    /// The row below merges into the caret row.
    Down,
}

/// A reversible edit. Positions are model positions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "action", rename_all = "camelCase"))]
pub enum EditOp {
    /// Insert characters (no row separators) at `pos`.
    InsertCharacter {
        /// Insertion point.
        pos: Position,
        /// Inserted characters.
        text: String,
    },
    /// Delete `text.chars().count()` characters at `pos`.
    DeleteCharacter {
        /// Deletion start.
        pos: Position,
        /// Deleted characters (filled in on apply).
        text: String,
    },
    /// Insert a possibly multi-row chunk at `pos`.
    InsertChunk {
        /// Insertion point.
        pos: Position,
        /// Inserted chunk.
        text: String,
    },
    /// Delete the chunk between `start` and `end`.
    DeleteChunk {
        /// Chunk start.
        start: Position,
        /// Chunk end (exclusive).
        end: Position,
        /// Deleted chunk (filled in on apply).
        text: String,
    },
    /// Insert the tab text (a literal tab or spaces) at `pos`.
    InsertTab {
        /// Insertion point.
        pos: Position,
        /// Exact tab text.
        text: String,
    },
    /// Remove previously inserted tab text at `pos`.
    RemoveTab {
        /// Removal start.
        pos: Position,
        /// Exact tab text.
        text: String,
    },
    /// Insert `history[i]` at the start of row `first_row + i`.
    Indent {
        /// First affected row.
        first_row: usize,
        /// Per-row leading text to insert.
        history: Vec<String>,
    },
    /// Remove the leading `history[i]` from row `first_row + i`.
    Unindent {
        /// First affected row.
        first_row: usize,
        /// Per-row leading text to remove (exact removed text once applied).
        history: Vec<String>,
    },
    /// Split the row at `pos`; the new row starts with `indent` spaces.
    Newline {
        /// Split point.
        pos: Position,
        /// Spaces carried into the new row.
        indent: usize,
    },
    /// Join the caret row `row` with its neighbour in `direction`.
    JoinLine {
        /// Caret row.
        row: usize,
        /// Which neighbour merges.
        direction: JoinDirection,
        /// Column in the upper row where the rows met (filled in on apply).
        col: usize,
        /// Leading spaces stripped from the lower row.
        strip: usize,
    },
    /// Delete the selected chunk.
    DeleteSelection {
        /// Selection to delete.
        selection: Selection,
        /// Deleted chunk (filled in on apply).
        text: String,
    },
    /// Insert a chunk at `selection.start` and select it.
    InsertChunkAndSelect {
        /// Selection the inserted chunk covers.
        selection: Selection,
        /// Inserted chunk.
        text: String,
    },
    /// Replace the selection with `text`.
    DeleteSelectionAndInsertChunk {
        /// Replaced selection.
        selection: Selection,
        /// Replaced chunk (filled in on apply).
        deleted: String,
        /// Inserted chunk.
        text: String,
    },
    /// Remove `inserted` from `selection.start`, put `restore` back and select it.
    DeleteChunkAndInsertChunkAndSelect {
        /// Chunk to remove, starting at `selection.start`.
        inserted: String,
        /// Selection covering `restore` once it is back.
        selection: Selection,
        /// Chunk to restore.
        restore: String,
    },
}

impl EditOp {
    /// Every descriptor key, in catalog order.
    pub const KEYS: [&'static str; 14] = [
        "insertCharacter",
        "deleteCharacter",
        "insertChunk",
        "deleteChunk",
        "insertTab",
        "removeTab",
        "indent",
        "unindent",
        "newline",
        "joinLine",
        "deleteSelection",
        "insertChunkAndSelect",
        "deleteSelectionAndInsertChunk",
        "deleteChunkAndInsertChunkAndSelect",
    ];

    /// Stable action key of this descriptor.
    pub fn key(&self) -> &'static str {
        match self {
            Self::InsertCharacter { .. } => "insertCharacter",
            Self::DeleteCharacter { .. } => "deleteCharacter",
            Self::InsertChunk { .. } => "insertChunk",
            Self::DeleteChunk { .. } => "deleteChunk",
            Self::InsertTab { .. } => "insertTab",
            Self::RemoveTab { .. } => "removeTab",
            Self::Indent { .. } => "indent",
            Self::Unindent { .. } => "unindent",
            Self::Newline { .. } => "newline",
            Self::JoinLine { .. } => "joinLine",
            Self::DeleteSelection { .. } => "deleteSelection",
            Self::InsertChunkAndSelect { .. } => "insertChunkAndSelect",
            Self::DeleteSelectionAndInsertChunk { .. } => "deleteSelectionAndInsertChunk",
            Self::DeleteChunkAndInsertChunkAndSelect { .. } => {
                "deleteChunkAndInsertChunkAndSelect"
            }
        }
    }

    /// Whether this descriptor runs inner steps.
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            Self::DeleteSelectionAndInsertChunk { .. }
                | Self::DeleteChunkAndInsertChunkAndSelect { .. }
        )
    }

    /// The descriptor undoing this one. Exact for resolved descriptors.
    pub fn inverse(&self) -> EditOp {
        match self {
            Self::InsertCharacter { pos, text } => Self::DeleteCharacter {
                pos: *pos,
                text: text.clone(),
            },
            Self::DeleteCharacter { pos, text } => Self::InsertCharacter {
                pos: *pos,
                text: text.clone(),
            },
            Self::InsertChunk { pos, text } => Self::DeleteChunk {
                start: *pos,
                end: chunk_end(*pos, text),
                text: text.clone(),
            },
            Self::DeleteChunk { start, text, .. } => Self::InsertChunk {
                pos: *start,
                text: text.clone(),
            },
            Self::InsertTab { pos, text } => Self::RemoveTab {
                pos: *pos,
                text: text.clone(),
            },
            Self::RemoveTab { pos, text } => Self::InsertTab {
                pos: *pos,
                text: text.clone(),
            },
            Self::Indent { first_row, history } => Self::Unindent {
                first_row: *first_row,
                history: history.clone(),
            },
            Self::Unindent { first_row, history } => Self::Indent {
                first_row: *first_row,
                history: history.clone(),
            },
            Self::Newline { pos, indent } => Self::JoinLine {
                row: pos.row,
                direction: JoinDirection::Down,
                col: pos.col,
                strip: *indent,
            },
            Self::JoinLine {
                row,
                direction,
                col,
                strip,
            } => {
                let upper = match direction {
                    JoinDirection::Up => row.saturating_sub(1),
                    JoinDirection::Down => *row,
                };
                Self::Newline {
                    pos: Position::new(upper, *col),
                    indent: *strip,
                }
            }
            Self::DeleteSelection { selection, text } => Self::InsertChunkAndSelect {
                selection: *selection,
                text: text.clone(),
            },
            Self::InsertChunkAndSelect { selection, text } => Self::DeleteSelection {
                selection: *selection,
                text: text.clone(),
            },
            Self::DeleteSelectionAndInsertChunk {
                selection,
                deleted,
                text,
            } => Self::DeleteChunkAndInsertChunkAndSelect {
                inserted: text.clone(),
                selection: *selection,
                restore: deleted.clone(),
            },
            Self::DeleteChunkAndInsertChunkAndSelect {
                inserted,
                selection,
                restore,
            } => Self::DeleteSelectionAndInsertChunk {
                selection: *selection,
                deleted: restore.clone(),
                text: inserted.clone(),
            },
        }
    }
}

/// Whether an emitted undo item may enter the undo stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    /// A top-level edit.
    Direct,
    /// An inner step of a compound edit or of a replay.
    Queued,
}

/// One undoable step: the descriptor pair plus where to put the caret before replaying each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoItem {
    /// Descriptor applied by undo.
    pub undo: EditOp,
    /// Descriptor applied by redo.
    pub redo: EditOp,
    /// Caret (screen) position restored before `undo` runs.
    pub undo_cursor: Position,
    /// Caret (screen) position restored before `redo` runs.
    pub redo_cursor: Position,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_cover_catalog() {
        let samples = [
            EditOp::InsertCharacter {
                pos: Position::new(0, 0),
                text: "a".into(),
            },
            EditOp::InsertChunk {
                pos: Position::new(0, 0),
                text: "a\nb".into(),
            },
            EditOp::InsertTab {
                pos: Position::new(0, 0),
                text: "\t".into(),
            },
            EditOp::Indent {
                first_row: 0,
                history: vec!["\t".into()],
            },
            EditOp::Newline {
                pos: Position::new(0, 1),
                indent: 2,
            },
            EditOp::DeleteSelection {
                selection: Selection::new(Position::new(0, 0), Position::new(0, 1)),
                text: "a".into(),
            },
            EditOp::DeleteSelectionAndInsertChunk {
                selection: Selection::new(Position::new(0, 0), Position::new(0, 1)),
                deleted: "a".into(),
                text: "b".into(),
            },
        ];

        let mut keys = Vec::new();
        for op in &samples {
            keys.push(op.key());
            keys.push(op.inverse().key());
        }
        assert_eq!(keys, EditOp::KEYS.to_vec());
    }

    #[test]
    fn test_double_inverse_is_identity() {
        let op = EditOp::InsertChunk {
            pos: Position::new(1, 2),
            text: "ab\ncd".into(),
        };
        assert_eq!(
            op.inverse(),
            EditOp::DeleteChunk {
                start: Position::new(1, 2),
                end: Position::new(2, 2),
                text: "ab\ncd".into(),
            }
        );
        assert_eq!(op.inverse().inverse(), op);

        let op = EditOp::Newline {
            pos: Position::new(3, 4),
            indent: 2,
        };
        assert_eq!(op.inverse().inverse(), op);

        let op = EditOp::DeleteSelectionAndInsertChunk {
            selection: Selection::new(Position::new(0, 0), Position::new(1, 1)),
            deleted: "ab\nc".into(),
            text: "x".into(),
        };
        assert!(op.is_compound());
        assert_eq!(op.inverse().inverse(), op);
    }

    #[test]
    fn test_join_up_inverse_targets_upper_row() {
        let op = EditOp::JoinLine {
            row: 3,
            direction: JoinDirection::Up,
            col: 5,
            strip: 0,
        };
        assert_eq!(
            op.inverse(),
            EditOp::Newline {
                pos: Position::new(2, 5),
                indent: 0,
            }
        );
    }
}
