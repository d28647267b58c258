//! Editing session settings.

use crate::cursor::CursorPolicy;
use crate::layout::DEFAULT_TAB_WIDTH;

/// Default number of undo steps kept.
pub const DEFAULT_UNDO_CAPACITY: usize = 100;

/// Default number of rows moved by page up/down.
pub const DEFAULT_PAGE_ROWS: usize = 30;

/// Controls what the tab key inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TabKeyBehavior {
    /// Insert a literal tab character (`'\t'`).
    #[default]
    Tab,
    /// Insert spaces up to the next tab stop.
    Spaces,
}

/// Configuration of an [`crate::EditSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EditorSettings {
    /// Tab stop distance in cells.
    pub tab_width: usize,
    /// What the tab key inserts.
    pub tab_key_behavior: TabKeyBehavior,
    /// Wrap horizontal caret motion at row ends and keep the caret inside row content.
    pub strict_lines: bool,
    /// Carry the leading indentation over to rows created by `newline`.
    pub auto_indent: bool,
    /// Maximum number of undo steps.
    pub undo_capacity: usize,
    /// Rows moved by page up/down.
    pub page_rows: usize,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            tab_key_behavior: TabKeyBehavior::Tab,
            strict_lines: true,
            auto_indent: true,
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            page_rows: DEFAULT_PAGE_ROWS,
        }
    }
}

impl EditorSettings {
    /// Set the tab width (at least one cell).
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    /// Set the tab key behavior.
    pub fn with_tab_key_behavior(mut self, behavior: TabKeyBehavior) -> Self {
        self.tab_key_behavior = behavior;
        self
    }

    /// Enable or disable strict lines.
    pub fn with_strict_lines(mut self, strict_lines: bool) -> Self {
        self.strict_lines = strict_lines;
        self
    }

    /// Enable or disable auto indent.
    pub fn with_auto_indent(mut self, auto_indent: bool) -> Self {
        self.auto_indent = auto_indent;
        self
    }

    /// Set the undo capacity.
    pub fn with_undo_capacity(mut self, capacity: usize) -> Self {
        self.undo_capacity = capacity;
        self
    }

    /// Set the page size used by page up/down.
    pub fn with_page_rows(mut self, rows: usize) -> Self {
        self.page_rows = rows;
        self
    }

    /// Caret policy derived from these settings.
    pub fn cursor_policy(&self) -> CursorPolicy {
        CursorPolicy {
            tab_width: self.tab_width.max(1),
            strict_lines: self.strict_lines,
        }
    }

    /// Text the tab key inserts at screen column `screen_col`.
    pub fn tab_text(&self, screen_col: usize) -> String {
        match self.tab_key_behavior {
            TabKeyBehavior::Tab => "\t".to_string(),
            TabKeyBehavior::Spaces => {
                let tab_width = self.tab_width.max(1);
                " ".repeat(tab_width - screen_col % tab_width)
            }
        }
    }

    /// One indentation unit inserted by `indent`.
    pub fn indent_unit(&self) -> String {
        match self.tab_key_behavior {
            TabKeyBehavior::Tab => "\t".to_string(),
            TabKeyBehavior::Spaces => " ".repeat(self.tab_width.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_text_reaches_next_stop() {
        let settings = EditorSettings::default()
            .with_tab_width(4)
            .with_tab_key_behavior(TabKeyBehavior::Spaces);
        assert_eq!(settings.tab_text(0), "    ");
        assert_eq!(settings.tab_text(1), "   ");
        assert_eq!(settings.tab_text(4), "    ");

        let settings = settings.with_tab_key_behavior(TabKeyBehavior::Tab);
        assert_eq!(settings.tab_text(3), "\t");
    }

    #[test]
    fn test_defaults() {
        let settings = EditorSettings::default();
        assert_eq!(settings.undo_capacity, 100);
        assert!(settings.strict_lines);
        assert_eq!(settings.cursor_policy().tab_width, 4);
    }
}
