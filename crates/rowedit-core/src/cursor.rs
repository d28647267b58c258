//! Caret management.
//!
//! The caret is stored as a single screen position. Every motion goes through
//! [`CursorManager::move_cursor`], which clamps the row, applies the strict-lines column clamp and
//! snaps out of tab shadows:
//!
//! - requested column larger than the current one: snap to the right edge of the shadow
//! - smaller or equal: snap to the left edge
//!
//! Each motion returns a [`CursorMove`] so callers can decide whether anything happened and
//! extend selections from the old position.

use crate::document::{Document, MAX_VIRTUAL_COLUMNS};
use crate::layout::{
    DEFAULT_TAB_WIDTH, model_col_for_screen, row_screen_width, screen_col_for_model, shadow_bounds,
};
use crate::selection::{Position, Selection};
use std::fmt;
use std::sync::Arc;

/// Motion policy injected by the session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPolicy {
    /// Tab stop distance in cells.
    pub tab_width: usize,
    /// Wrap horizontal motion across row ends and keep the caret inside row content.
    pub strict_lines: bool,
}

impl Default for CursorPolicy {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            strict_lines: true,
        }
    }
}

/// Predicate deciding which characters belong to a word for word motion.
#[derive(Clone)]
pub struct WordClassifier(Arc<dyn Fn(char) -> bool + Send + Sync>);

impl WordClassifier {
    /// Wrap a predicate.
    pub fn new(predicate: impl Fn(char) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Whether `ch` is part of a word.
    pub fn is_word_char(&self, ch: char) -> bool {
        (self.0)(ch)
    }
}

impl Default for WordClassifier {
    fn default() -> Self {
        Self::new(|ch| ch == '_' || ch.is_alphanumeric())
    }
}

impl fmt::Debug for WordClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WordClassifier(..)")
    }
}

/// Caret positions (screen space) before and after a motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorMove {
    /// Position before the motion.
    pub old: Position,
    /// Position after the motion.
    pub new: Position,
}

impl CursorMove {
    /// Whether the caret actually moved.
    pub fn moved(&self) -> bool {
        self.old != self.new
    }
}

/// The single logical caret.
#[derive(Debug, Clone, Default)]
pub struct CursorManager {
    position: Position,
    policy: CursorPolicy,
    classifier: WordClassifier,
}

impl CursorManager {
    /// Create a caret at (0, 0) with the given policy.
    pub fn new(policy: CursorPolicy) -> Self {
        Self {
            position: Position::default(),
            policy,
            classifier: WordClassifier::default(),
        }
    }

    /// Current motion policy.
    pub fn policy(&self) -> CursorPolicy {
        self.policy
    }

    /// Replace the motion policy.
    pub fn set_policy(&mut self, policy: CursorPolicy) {
        self.policy = policy;
    }

    /// Replace the word classifier used by word motion.
    pub fn set_classifier(&mut self, classifier: WordClassifier) {
        self.classifier = classifier;
    }

    /// Current word classifier.
    pub fn classifier(&self) -> &WordClassifier {
        &self.classifier
    }

    /// Caret position in screen coordinates.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Caret position converted to model coordinates.
    pub fn model_position(&self, doc: &Document) -> Position {
        let row = doc.clamp_row(self.position.row);
        let col = model_col_for_screen(
            doc.row_chars(row),
            self.position.col,
            self.policy.tab_width,
        );
        Position::new(row, col)
    }

    /// Screen position of a model position.
    pub fn screen_position_for(&self, doc: &Document, model: Position) -> Position {
        let row = doc.clamp_row(model.row);
        let col = screen_col_for_model(doc.row_chars(row), model.col, self.policy.tab_width);
        Position::new(row, col)
    }

    /// Screen width of `row`.
    pub fn row_screen_length(&self, doc: &Document, row: usize) -> usize {
        row_screen_width(doc.row_chars(row), self.policy.tab_width)
    }

    /// Place the caret on a model position. Model positions never fall inside a shadow.
    pub fn set_model_position(&mut self, doc: &Document, model: Position) -> CursorMove {
        let target = self.screen_position_for(doc, model);
        let old = self.position;
        self.position = target;
        CursorMove { old, new: target }
    }

    /// Move the caret to a screen position, clamping and snapping out of shadows.
    ///
    /// Outside strict-lines mode the caret may rest in virtual space, at most
    /// [`MAX_VIRTUAL_COLUMNS`] cells past the row end.
    pub fn move_cursor(&mut self, doc: &Document, new_pos: Position) -> CursorMove {
        let old = self.position;
        let row = doc.clamp_row(new_pos.row);
        let row_end = self.row_screen_length(doc, row);
        let mut col = if self.policy.strict_lines {
            new_pos.col.min(row_end)
        } else {
            new_pos.col.min(row_end.saturating_add(MAX_VIRTUAL_COLUMNS))
        };

        if let Some((left, right)) = shadow_bounds(doc.row_chars(row), col, self.policy.tab_width) {
            col = if old.col < col { right } else { left };
        }

        self.position = Position::new(row, col);
        CursorMove {
            old,
            new: self.position,
        }
    }

    /// One column left; wraps to the previous row end in strict-lines mode.
    pub fn move_left(&mut self, doc: &Document) -> CursorMove {
        let pos = self.position;
        if pos.col > 0 {
            return self.move_cursor(doc, Position::new(pos.row, pos.col - 1));
        }
        if self.policy.strict_lines && pos.row > 0 {
            let row = pos.row - 1;
            let end = self.row_screen_length(doc, row);
            return self.move_cursor(doc, Position::new(row, end));
        }
        self.stay()
    }

    /// One column right; wraps to the next row start in strict-lines mode.
    pub fn move_right(&mut self, doc: &Document) -> CursorMove {
        let pos = self.position;
        if self.policy.strict_lines && pos.col >= self.row_screen_length(doc, pos.row) {
            if pos.row < doc.last_row() {
                return self.move_cursor(doc, Position::new(pos.row + 1, 0));
            }
            return self.stay();
        }
        self.move_cursor(doc, Position::new(pos.row, pos.col.saturating_add(1)))
    }

    /// One row up, keeping the screen column where possible.
    pub fn move_up(&mut self, doc: &Document) -> CursorMove {
        let pos = self.position;
        if pos.row == 0 {
            return self.stay();
        }
        self.move_cursor(doc, Position::new(pos.row - 1, pos.col))
    }

    /// One row down, keeping the screen column where possible.
    pub fn move_down(&mut self, doc: &Document) -> CursorMove {
        let pos = self.position;
        if pos.row >= doc.last_row() {
            return self.stay();
        }
        self.move_cursor(doc, Position::new(pos.row + 1, pos.col))
    }

    /// Smart home: jump to the first non-blank character, or to column 0 when already there.
    pub fn move_to_line_start(&mut self, doc: &Document) -> CursorMove {
        let model = self.model_position(doc);
        let first_non_blank = doc
            .row_chars(model.row)
            .iter()
            .position(|&ch| ch != ' ' && ch != '\t')
            .unwrap_or_else(|| doc.row_length(model.row));

        let col = if model.col == first_non_blank {
            0
        } else {
            first_non_blank
        };
        self.set_model_position(doc, Position::new(model.row, col))
    }

    /// Jump to the end of the row content.
    pub fn move_to_line_end(&mut self, doc: &Document) -> CursorMove {
        let row = doc.clamp_row(self.position.row);
        let end = self.row_screen_length(doc, row);
        self.move_cursor(doc, Position::new(row, end))
    }

    /// Jump to (0, 0).
    pub fn move_to_file_top(&mut self, doc: &Document) -> CursorMove {
        self.move_cursor(doc, Position::new(0, 0))
    }

    /// Jump to the end of the last row.
    pub fn move_to_file_bottom(&mut self, doc: &Document) -> CursorMove {
        let end = doc.end_position();
        self.set_model_position(doc, end)
    }

    /// Move `rows` rows up.
    pub fn move_page_up(&mut self, doc: &Document, rows: usize) -> CursorMove {
        let pos = self.position;
        self.move_cursor(doc, Position::new(pos.row.saturating_sub(rows), pos.col))
    }

    /// Move `rows` rows down.
    pub fn move_page_down(&mut self, doc: &Document, rows: usize) -> CursorMove {
        let pos = self.position;
        self.move_cursor(doc, Position::new(pos.row.saturating_add(rows), pos.col))
    }

    /// Move to the start of the previous word.
    pub fn move_word_left(&mut self, doc: &Document) -> CursorMove {
        let target = self.word_left_target(doc);
        self.set_model_position(doc, target)
    }

    /// Move past the end of the next word.
    pub fn move_word_right(&mut self, doc: &Document) -> CursorMove {
        let target = self.word_right_target(doc);
        self.set_model_position(doc, target)
    }

    /// Model position word-left motion would land on.
    pub fn word_left_target(&self, doc: &Document) -> Position {
        let model = self.model_position(doc);
        let chars = doc.row_chars(model.row);
        let len = chars.len();

        if model.col == 0 {
            if model.row == 0 {
                return model;
            }
            let row = model.row - 1;
            return Position::new(row, doc.row_length(row));
        }
        if model.col > len {
            return Position::new(model.row, len);
        }

        let start = model.col;
        let mut col = start;
        while col > 0 && chars[col - 1] == ' ' {
            col -= 1;
        }
        if col > 0 {
            if self.classifier.is_word_char(chars[col - 1]) {
                while col > 0 && self.classifier.is_word_char(chars[col - 1]) {
                    col -= 1;
                }
            } else if col == start {
                col -= 1;
            }
        }
        Position::new(model.row, col)
    }

    /// Model position word-right motion would land on.
    pub fn word_right_target(&self, doc: &Document) -> Position {
        let model = self.model_position(doc);
        let chars = doc.row_chars(model.row);
        let len = chars.len();

        if model.col >= len {
            if model.row < doc.last_row() {
                return Position::new(model.row + 1, 0);
            }
            return Position::new(model.row, len);
        }

        let start = model.col;
        let mut col = start;
        while col < len && chars[col] == ' ' {
            col += 1;
        }
        if col < len {
            if self.classifier.is_word_char(chars[col]) {
                while col < len && self.classifier.is_word_char(chars[col]) {
                    col += 1;
                }
            } else if col == start {
                col += 1;
            }
        }
        Position::new(model.row, col)
    }

    /// Bounds of the word under the model position `model`.
    ///
    /// A word is a run of characters the classifier accepts, or a run of other non-blank
    /// characters. `None` when `model` sits on a blank or past the row end.
    pub fn word_bounds(&self, doc: &Document, model: Position) -> Option<Selection> {
        let row = doc.clamp_row(model.row);
        let chars = doc.row_chars(row);
        let &ch = chars.get(model.col)?;
        if ch == ' ' || ch == '\t' {
            return None;
        }

        let word = self.classifier.is_word_char(ch);
        let same_kind = |c: char| {
            if word {
                self.classifier.is_word_char(c)
            } else {
                c != ' ' && c != '\t' && !self.classifier.is_word_char(c)
            }
        };

        let mut start = model.col;
        while start > 0 && same_kind(chars[start - 1]) {
            start -= 1;
        }
        let mut end = model.col + 1;
        while end < chars.len() && same_kind(chars[end]) {
            end += 1;
        }
        Some(Selection::new(
            Position::new(row, start),
            Position::new(row, end),
        ))
    }

    fn stay(&self) -> CursorMove {
        CursorMove {
            old: self.position,
            new: self.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor_at(row: usize, col: usize, strict_lines: bool) -> CursorManager {
        let mut cursor = CursorManager::new(CursorPolicy {
            tab_width: 4,
            strict_lines,
        });
        cursor.position = Position::new(row, col);
        cursor
    }

    #[test]
    fn test_tab_shadow_tie_break() {
        let doc = Document::from_text("\tx");

        let mut cursor = cursor_at(0, 0, true);
        let step = cursor.move_right(&doc);
        assert_eq!(step.new, Position::new(0, 4));

        let step = cursor.move_left(&doc);
        assert_eq!(step.new, Position::new(0, 0));

        // Undirected request into the shadow snaps left.
        let mut cursor = cursor_at(0, 2, true);
        cursor.move_cursor(&doc, Position::new(0, 2));
        assert_eq!(cursor.position(), Position::new(0, 0));
    }

    #[test]
    fn test_vertical_move_into_shadow_snaps_left() {
        let doc = Document::from_text("abcdef\n\tx");
        let mut cursor = cursor_at(0, 2, true);
        cursor.move_down(&doc);
        assert_eq!(cursor.position(), Position::new(1, 0));
    }

    #[test]
    fn test_model_position_resolves_tabs() {
        let doc = Document::from_text("a\tb");
        let cursor = cursor_at(0, 4, true);
        assert_eq!(cursor.model_position(&doc), Position::new(0, 2));
        assert_eq!(
            cursor.screen_position_for(&doc, Position::new(0, 3)),
            Position::new(0, 5)
        );
    }

    #[test]
    fn test_strict_lines_wraps_horizontally() {
        let doc = Document::from_text("ab\ncd");
        let mut cursor = cursor_at(1, 0, true);
        cursor.move_left(&doc);
        assert_eq!(cursor.position(), Position::new(0, 2));
        cursor.move_right(&doc);
        assert_eq!(cursor.position(), Position::new(1, 0));
    }

    #[test]
    fn test_loose_lines_allow_virtual_space() {
        let doc = Document::from_text("ab\ncd");
        let mut cursor = cursor_at(0, 2, false);
        cursor.move_right(&doc);
        assert_eq!(cursor.position(), Position::new(0, 3));

        let mut cursor = cursor_at(1, 0, false);
        let step = cursor.move_left(&doc);
        assert!(!step.moved());
    }

    #[test]
    fn test_word_bounds() {
        let doc = Document::from_text("let x_1 = a->b;  ");
        let cursor = cursor_at(0, 0, true);
        let bounds = |col| cursor.word_bounds(&doc, Position::new(0, col));

        assert_eq!(
            bounds(5),
            Some(Selection::new(Position::new(0, 4), Position::new(0, 7)))
        );
        assert_eq!(
            bounds(11),
            Some(Selection::new(Position::new(0, 11), Position::new(0, 13)))
        );
        assert_eq!(
            bounds(14),
            Some(Selection::new(Position::new(0, 14), Position::new(0, 15)))
        );
        assert_eq!(bounds(3), None);
        assert_eq!(bounds(16), None);
        assert_eq!(bounds(40), None);
    }

    #[test]
    fn test_virtual_space_is_bounded() {
        let doc = Document::from_text("ab");
        let mut cursor = cursor_at(0, usize::MAX, false);
        cursor.move_right(&doc);
        assert_eq!(cursor.position(), Position::new(0, 2 + MAX_VIRTUAL_COLUMNS));

        cursor.move_cursor(&doc, Position::new(0, usize::MAX));
        assert_eq!(cursor.position(), Position::new(0, 2 + MAX_VIRTUAL_COLUMNS));
        assert_eq!(
            cursor.model_position(&doc),
            Position::new(0, 2 + MAX_VIRTUAL_COLUMNS)
        );
    }

    #[test]
    fn test_strict_vertical_snaps_to_shorter_row_end() {
        let doc = Document::from_text("long line\nab");
        let mut cursor = cursor_at(0, 7, true);
        cursor.move_down(&doc);
        assert_eq!(cursor.position(), Position::new(1, 2));

        let mut cursor = cursor_at(0, 7, false);
        cursor.move_down(&doc);
        assert_eq!(cursor.position(), Position::new(1, 7));
    }

    #[test]
    fn test_smart_home() {
        let doc = Document::from_text("    let x;");
        let mut cursor = cursor_at(0, 8, true);
        cursor.move_to_line_start(&doc);
        assert_eq!(cursor.position(), Position::new(0, 4));
        cursor.move_to_line_start(&doc);
        assert_eq!(cursor.position(), Position::new(0, 0));
    }

    #[test]
    fn test_word_motion() {
        let doc = Document::from_text("foo  bar.baz");
        let mut cursor = cursor_at(0, 0, true);

        cursor.move_word_right(&doc);
        assert_eq!(cursor.position().col, 3);
        cursor.move_word_right(&doc);
        assert_eq!(cursor.position().col, 8);
        cursor.move_word_right(&doc);
        assert_eq!(cursor.position().col, 9);
        cursor.move_word_right(&doc);
        assert_eq!(cursor.position().col, 12);

        cursor.move_word_left(&doc);
        assert_eq!(cursor.position().col, 9);
        cursor.move_word_left(&doc);
        assert_eq!(cursor.position().col, 8);
        cursor.move_word_left(&doc);
        assert_eq!(cursor.position().col, 5);
    }

    #[test]
    fn test_custom_classifier() {
        let doc = Document::from_text("a-b c");
        let mut cursor = cursor_at(0, 0, true);
        cursor.set_classifier(WordClassifier::new(|ch| ch != ' '));
        cursor.move_word_right(&doc);
        assert_eq!(cursor.position().col, 3);
    }

    #[test]
    fn test_page_and_file_motion() {
        let doc = Document::from_text("a\nb\nc\nd\nlast");
        let mut cursor = cursor_at(0, 0, true);
        cursor.move_page_down(&doc, 3);
        assert_eq!(cursor.position(), Position::new(3, 0));
        cursor.move_page_down(&doc, 3);
        assert_eq!(cursor.position(), Position::new(4, 0));
        cursor.move_to_file_bottom(&doc);
        assert_eq!(cursor.position(), Position::new(4, 4));
        cursor.move_page_up(&doc, 10);
        assert_eq!(cursor.position(), Position::new(0, 1));
        cursor.move_to_file_top(&doc);
        assert_eq!(cursor.position(), Position::new(0, 0));
    }
}
