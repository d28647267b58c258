//! Screen column math.
//!
//! Converts between model columns (character indices) and screen columns (cells). A tab
//! advances to the next multiple of `tab_width`; every other character occupies its UAX #11
//! width, with a minimum of one cell so that every screen column left of the row end maps to
//! exactly one character.
//!
//! Cells covered by a character other than its first one form that character's *shadow*. A
//! caret is never allowed to rest inside a shadow.

use unicode_width::UnicodeWidthChar;

/// Default tab width (in cells).
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Visual width of a non-tab character (UAX #11, never less than one cell).
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1).max(1)
}

/// Width (in cells) of `ch` when it starts at cell `cell_offset_in_line`.
///
/// For `'\t'` the width runs to the next tab stop.
pub fn cell_width_at(ch: char, cell_offset_in_line: usize, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        let rem = cell_offset_in_line % tab_width;
        tab_width - rem
    } else {
        char_width(ch)
    }
}

/// Screen width of a whole row.
pub fn row_screen_width(row: &[char], tab_width: usize) -> usize {
    let mut x = 0usize;
    for &ch in row {
        x = x.saturating_add(cell_width_at(ch, x, tab_width));
    }
    x
}

/// Screen column of model column `column`.
///
/// Columns past the row end are virtual spaces and map one cell per column.
pub fn screen_col_for_model(row: &[char], column: usize, tab_width: usize) -> usize {
    let mut x = 0usize;
    for &ch in row.iter().take(column) {
        x = x.saturating_add(cell_width_at(ch, x, tab_width));
    }
    x.saturating_add(column.saturating_sub(row.len()))
}

/// Model column for screen column `screen_col`.
///
/// A screen column inside a character's shadow resolves to that character, so the result is
/// never greater than `screen_col`.
pub fn model_col_for_screen(row: &[char], screen_col: usize, tab_width: usize) -> usize {
    let mut x = 0usize;
    for (index, &ch) in row.iter().enumerate() {
        let width = cell_width_at(ch, x, tab_width);
        if screen_col < x + width {
            return index;
        }
        x += width;
    }
    row.len() + (screen_col - x)
}

/// Bounds of the shadow `screen_col` falls into, if any.
///
/// Returns `(left, right)` where `left` is the cell where the character starts and `right` the
/// cell just after it, with `left < screen_col < right`.
pub fn shadow_bounds(row: &[char], screen_col: usize, tab_width: usize) -> Option<(usize, usize)> {
    let mut x = 0usize;
    for &ch in row {
        let width = cell_width_at(ch, x, tab_width);
        if screen_col < x + width {
            return (screen_col > x).then_some((x, x + width));
        }
        x += width;
    }
    None
}

/// Render a row with tabs expanded to spaces.
pub fn expand_tabs(row: &[char], tab_width: usize) -> String {
    let mut out = String::with_capacity(row.len());
    let mut x = 0usize;
    for &ch in row {
        let width = cell_width_at(ch, x, tab_width);
        if ch == '\t' {
            out.extend(std::iter::repeat_n(' ', width));
        } else {
            out.push(ch);
        }
        x += width;
    }
    out
}
