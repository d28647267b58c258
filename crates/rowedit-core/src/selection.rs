//! Positions and selection state.
//!
//! A [`Position`] is a `{row, col}` pair. Whether `col` is a model column (character index) or a
//! screen column (tab-expanded cell) depends on who hands it out: the caret lives in screen
//! space, selections and edit descriptors live in model space.
//!
//! [`SelectionState`] keeps the raw anchor/extent exactly as the user produced them (drag
//! upwards, shift+left, ...) and only ever exposes the normalized `start <= end` form.

use std::cmp::Ordering;

/// Row/column coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Zero-based row index.
    pub row: usize,
    /// Zero-based column.
    pub col: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row
            .cmp(&other.row)
            .then_with(|| self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A normalized selection (`start <= end` in row-major order), in model coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    /// First selected position (inclusive).
    pub start: Position,
    /// Position just past the last selected character.
    pub end: Position,
}

impl Selection {
    /// Build a selection from two positions given in any order.
    pub fn new(a: Position, b: Position) -> Self {
        let (start, end) = ordered(a, b);
        Self { start, end }
    }

    /// Returns `true` when the selection covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` when `pos` lies within `[start, end]`.
    pub fn contains_inclusive(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// Order in which the raw selection was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionDirection {
    /// Anchor before extent.
    Forward,
    /// Extent before anchor.
    Backward,
}

pub(crate) fn ordered(a: Position, b: Position) -> (Position, Position) {
    if a <= b { (a, b) } else { (b, a) }
}

pub(crate) fn selection_direction(anchor: Position, extent: Position) -> SelectionDirection {
    if anchor <= extent {
        SelectionDirection::Forward
    } else {
        SelectionDirection::Backward
    }
}

/// End of a row's selected span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanEnd {
    /// The selection stops at this (exclusive) column of the row.
    Col(usize),
    /// The selection continues past this row; highlight to the row's visual end.
    RowEnd,
}

/// The part of a single row covered by the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    /// First selected column (inclusive).
    pub start_col: usize,
    /// Where the selected span on this row ends.
    pub end: SpanEnd,
}

/// Raw anchor/extent selection, exposed only in normalized form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    raw: Option<(Position, Position)>,
}

impl SelectionState {
    /// Create an empty selection state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the raw selection. An empty selection (anchor == extent) clears the state.
    pub fn set(&mut self, anchor: Position, extent: Position) {
        if anchor == extent {
            self.raw = None;
        } else {
            self.raw = Some((anchor, extent));
        }
    }

    /// Replace the selection with an already normalized one (or clear it).
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        match selection {
            Some(sel) => self.set(sel.start, sel.end),
            None => self.clear(),
        }
    }

    /// Drop the selection.
    pub fn clear(&mut self) {
        self.raw = None;
    }

    /// Whether there is a non-empty selection.
    pub fn is_active(&self) -> bool {
        self.raw.is_some()
    }

    /// The fixed end of the raw selection.
    pub fn anchor(&self) -> Option<Position> {
        self.raw.map(|(anchor, _)| anchor)
    }

    /// The moving end of the raw selection.
    pub fn extent(&self) -> Option<Position> {
        self.raw.map(|(_, extent)| extent)
    }

    /// Whether the raw selection was recorded forwards or backwards.
    pub fn direction(&self) -> Option<SelectionDirection> {
        self.raw
            .map(|(anchor, extent)| selection_direction(anchor, extent))
    }

    /// The selection with `start <= end`.
    pub fn normalized(&self) -> Option<Selection> {
        self.raw
            .map(|(anchor, extent)| Selection::new(anchor, extent))
    }

    /// Move the extent, keeping the anchor. Starts a new selection at `anchor` when none exists.
    pub fn extend_to(&mut self, anchor: Position, extent: Position) {
        let anchor = self.anchor().unwrap_or(anchor);
        self.set(anchor, extent);
    }

    /// Shift every raw endpoint on `row` by `delta` columns (saturating at zero).
    pub(crate) fn shift_row(&mut self, row: usize, delta: isize) {
        let Some((anchor, extent)) = self.raw else {
            return;
        };
        let shift = |pos: Position| {
            if pos.row != row {
                return pos;
            }
            Position::new(pos.row, pos.col.saturating_add_signed(delta))
        };
        self.set(shift(anchor), shift(extent));
    }

    /// Selected span of `row`, or `None` when the row does not intersect the selection.
    pub fn row_span(&self, row: usize) -> Option<RowSpan> {
        let sel = self.normalized()?;
        if sel.end.row < row || sel.start.row > row {
            return None;
        }

        let start_col = if sel.start.row < row { 0 } else { sel.start.col };
        let end = if sel.end.row > row {
            SpanEnd::RowEnd
        } else {
            SpanEnd::Col(sel.end.col)
        };

        Some(RowSpan { start_col, end })
    }
}
