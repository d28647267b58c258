//! Named actions and their registry.
//!
//! An [`Action`] is looked up by its stable key and invoked with an [`ActionInput`]. Built-in
//! actions translate user intent (typing, deleting, caret motion, document commands) into
//! [`EditOp`] descriptors and commit them through the [`ActionEngine`], recording one undo step
//! per invocation.
//!
//! Every descriptor key is also registered: invoked with [`ActionInput::Descriptor`] it replays the
//! descriptor as-is without touching the history. Keys shared with a user action (for example
//! `insertCharacter`) accept both kinds of input.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::cursor::{CursorManager, CursorMove};
use crate::descriptor::{EditOp, JoinDirection};
use crate::document::{Document, ROW_SEPARATOR};
use crate::engine::ActionEngine;
use crate::error::EditError;
use crate::layout::row_screen_width;
use crate::search::{SearchOptions, replace_all};
use crate::selection::{Position, Selection};
use crate::settings::{EditorSettings, TabKeyBehavior};
use crate::undo::UndoManager;

/// Row order used by `sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortOrder {
    /// Lexicographic ascending.
    #[default]
    Ascending,
    /// Lexicographic descending.
    Descending,
}

/// Which side `trim` strips spaces from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrimSide {
    /// Leading spaces.
    Left,
    /// Trailing spaces.
    #[default]
    Right,
    /// Both ends.
    Both,
}

/// Argument passed to an action.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActionInput {
    /// No argument.
    #[default]
    None,
    /// Motion that extends the selection (shift held).
    Extend,
    /// A single typed character.
    Char(char),
    /// A piece of text.
    Text(String),
    /// A screen position.
    Position(Position),
    /// A screen position the selection extends to (shift-click, drag).
    ExtendTo(Position),
    /// A model selection.
    Selection(Selection),
    /// A 1-based line number.
    Line(usize),
    /// Arguments of `replace`.
    Replace {
        /// Search query.
        query: String,
        /// Replacement text.
        replacement: String,
        /// Match options.
        options: SearchOptions,
    },
    /// Argument of `sort`.
    Sort(SortOrder),
    /// Argument of `trim`.
    Trim(TrimSide),
    /// A descriptor to replay.
    Descriptor(EditOp),
}

/// Outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    /// The document or selection changed.
    Success,
    /// The caret moved.
    Moved(CursorMove),
    /// Text produced by the action (copy/cut).
    Text(String),
    /// Number of items affected (replace).
    Count(usize),
    /// Nothing changed.
    NoOp,
}

/// Mutable view of a session handed to an action.
pub struct ActionContext<'a> {
    action: &'a str,
    engine: &'a mut ActionEngine,
    undo: &'a mut UndoManager,
    settings: &'a EditorSettings,
}

impl<'a> ActionContext<'a> {
    pub(crate) fn new(
        action: &'a str,
        engine: &'a mut ActionEngine,
        undo: &'a mut UndoManager,
        settings: &'a EditorSettings,
    ) -> Self {
        Self {
            action,
            engine,
            undo,
            settings,
        }
    }

    /// Key of the action being performed.
    pub fn action(&self) -> &str {
        self.action
    }

    /// The engine.
    pub fn engine(&self) -> &ActionEngine {
        &*self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut ActionEngine {
        &mut *self.engine
    }

    /// Session settings.
    pub fn settings(&self) -> &EditorSettings {
        self.settings
    }

    /// Perform `op` and record it as one undo step.
    pub fn commit(&mut self, op: EditOp) -> ActionResult {
        let resolved = self.engine.perform(op);
        self.undo.record_emitted(self.engine);
        match resolved {
            Some(_) => ActionResult::Success,
            None => ActionResult::NoOp,
        }
    }

    /// Apply `op` without recording it.
    pub fn replay(&mut self, op: EditOp) -> ActionResult {
        let resolved = self.engine.apply(op);
        self.engine.take_emitted();
        match resolved {
            Some(_) => ActionResult::Success,
            None => ActionResult::NoOp,
        }
    }

    /// Error for an input this action cannot use.
    pub fn invalid_input(&self, expected: &'static str) -> EditError {
        EditError::InvalidInput {
            action: self.action.to_string(),
            expected,
        }
    }

    fn caret(&self) -> Position {
        self.engine.model_position()
    }

    fn active_selection(&self) -> Option<Selection> {
        self.engine.selection().normalized()
    }

    fn undo_step(&mut self) -> bool {
        self.undo.undo(self.engine)
    }

    fn redo_step(&mut self) -> bool {
        self.undo.redo(self.engine)
    }
}

/// A named operation dispatched by key.
pub trait Action: Send + Sync {
    /// Stable registry key.
    fn key(&self) -> &str;

    /// Run the action.
    fn perform(
        &self,
        ctx: &mut ActionContext<'_>,
        input: &ActionInput,
    ) -> Result<ActionResult, EditError>;
}

/// An [`Action`] backed by a closure.
pub struct FnAction<F> {
    key: String,
    run: F,
}

impl<F> FnAction<F>
where
    F: Fn(&mut ActionContext<'_>, &ActionInput) -> Result<ActionResult, EditError> + Send + Sync,
{
    /// Wrap `run` under `key`.
    pub fn new(key: impl Into<String>, run: F) -> Self {
        Self {
            key: key.into(),
            run,
        }
    }
}

impl<F> Action for FnAction<F>
where
    F: Fn(&mut ActionContext<'_>, &ActionInput) -> Result<ActionResult, EditError> + Send + Sync,
{
    fn key(&self) -> &str {
        &self.key
    }

    fn perform(
        &self,
        ctx: &mut ActionContext<'_>,
        input: &ActionInput,
    ) -> Result<ActionResult, EditError> {
        (self.run)(ctx, input)
    }
}

impl<F> fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnAction").field("key", &self.key).finish()
    }
}

type BuiltinFn = fn(&mut ActionContext<'_>, &ActionInput) -> Result<ActionResult, EditError>;

struct Builtin {
    key: &'static str,
    run: BuiltinFn,
}

impl Action for Builtin {
    fn key(&self) -> &str {
        self.key
    }

    fn perform(
        &self,
        ctx: &mut ActionContext<'_>,
        input: &ActionInput,
    ) -> Result<ActionResult, EditError> {
        if let ActionInput::Descriptor(op) = input {
            if !EditOp::KEYS.contains(&self.key) {
                return Err(ctx.invalid_input("no descriptor"));
            }
            if op.key() != self.key {
                return Err(EditError::DescriptorMismatch {
                    action: self.key.to_string(),
                    descriptor: op.key(),
                });
            }
            return Ok(ctx.replay(op.clone()));
        }
        (self.run)(ctx, input)
    }
}

/// Actions by key.
#[derive(Clone)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

impl ActionRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// A registry holding every built-in action.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for &(key, run) in BUILTINS {
            registry.register(Arc::new(Builtin { key, run }));
        }
        for key in EditOp::KEYS {
            if !registry.contains(key) {
                registry.register(Arc::new(Builtin {
                    key,
                    run: descriptor_only,
                }));
            }
        }
        registry
    }

    /// Register `action`, returning the action it replaced.
    pub fn register(&mut self, action: Arc<dyn Action>) -> Option<Arc<dyn Action>> {
        self.actions.insert(action.key().to_string(), action)
    }

    /// Remove the action under `key`.
    pub fn unregister(&mut self, key: &str) -> Option<Arc<dyn Action>> {
        self.actions.remove(key)
    }

    /// The action under `key`.
    pub fn get(&self, key: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(key).cloned()
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.actions.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("insertCharacter", insert_character),
    ("insertChunk", insert_chunk),
    ("insertTab", insert_tab),
    ("indent", indent),
    ("unindent", unindent),
    ("newline", newline),
    ("backspace", backspace),
    ("deleteKey", delete_key),
    ("deleteWordLeft", delete_word_left),
    ("deleteWordRight", delete_word_right),
    ("killLine", kill_line),
    ("deleteSelection", cut_selection),
    ("copySelection", copy_selection),
    ("selectAll", select_all),
    ("select", select),
    ("selectWord", select_word),
    ("selectRow", select_row),
    ("moveCursorTo", move_cursor_to),
    ("moveCursorLeft", move_cursor_left),
    ("moveCursorRight", move_cursor_right),
    ("moveCursorUp", move_cursor_up),
    ("moveCursorDown", move_cursor_down),
    ("moveWordLeft", move_word_left),
    ("moveWordRight", move_word_right),
    ("moveToLineStart", move_to_line_start),
    ("moveToLineEnd", move_to_line_end),
    ("moveToFileTop", move_to_file_top),
    ("moveToFileBottom", move_to_file_bottom),
    ("movePageUp", move_page_up),
    ("movePageDown", move_page_down),
    ("gotoLine", goto_line),
    ("undo", undo),
    ("redo", redo),
    ("replace", replace),
    ("sort", sort),
    ("trim", trim),
    ("clear", clear),
];

fn descriptor_only(
    ctx: &mut ActionContext<'_>,
    _: &ActionInput,
) -> Result<ActionResult, EditError> {
    Err(ctx.invalid_input("a descriptor"))
}

fn no_input(ctx: &ActionContext<'_>, input: &ActionInput) -> Result<(), EditError> {
    match input {
        ActionInput::None => Ok(()),
        _ => Err(ctx.invalid_input("no input")),
    }
}

fn text_input(ctx: &ActionContext<'_>, input: &ActionInput) -> Result<String, EditError> {
    match input {
        ActionInput::Char(ch) => Ok(ch.to_string()),
        ActionInput::Text(text) => Ok(text.clone()),
        _ => Err(ctx.invalid_input("a character or text")),
    }
}

fn replace_selection(
    ctx: &mut ActionContext<'_>,
    selection: Selection,
    text: String,
) -> ActionResult {
    ctx.commit(EditOp::DeleteSelectionAndInsertChunk {
        selection,
        deleted: String::new(),
        text,
    })
}

// Editing

fn insert_character(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    let text = text_input(ctx, input)?;
    if text.contains(ROW_SEPARATOR) {
        return insert_chunk(ctx, &ActionInput::Text(text));
    }
    if let Some(selection) = ctx.active_selection() {
        return Ok(replace_selection(ctx, selection, text));
    }

    let pos = ctx.caret();
    Ok(ctx.commit(EditOp::InsertCharacter { pos, text }))
}

fn insert_chunk(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    let text = text_input(ctx, input)?;
    if let Some(selection) = ctx.active_selection() {
        return Ok(replace_selection(ctx, selection, text));
    }

    let pos = ctx.caret();
    Ok(ctx.commit(EditOp::InsertChunk { pos, text }))
}

fn insert_tab(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    if let Some(selection) = ctx.active_selection() {
        if selection.start.row != selection.end.row {
            return indent(ctx, input);
        }
        let screen = ctx
            .engine
            .cursor()
            .screen_position_for(ctx.engine.document(), selection.start);
        let text = ctx.settings.tab_text(screen.col);
        return Ok(replace_selection(ctx, selection, text));
    }

    let pos = ctx.caret();
    let text = ctx.settings.tab_text(ctx.engine.cursor().position().col);
    Ok(ctx.commit(EditOp::InsertTab { pos, text }))
}

/// Rows covered by the selection, or the caret row. A trailing row the selection only touches at
/// column 0 is left out.
fn affected_rows(ctx: &ActionContext<'_>) -> (usize, usize) {
    match ctx.active_selection() {
        Some(sel) if sel.end.row > sel.start.row && sel.end.col == 0 => {
            (sel.start.row, sel.end.row - 1)
        }
        Some(sel) => (sel.start.row, sel.end.row),
        None => {
            let row = ctx.caret().row;
            (row, row)
        }
    }
}

fn indent(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    let (first_row, last_row) = affected_rows(ctx);
    let unit = ctx.settings.indent_unit();
    let history = vec![unit; last_row - first_row + 1];
    Ok(ctx.commit(EditOp::Indent { first_row, history }))
}

fn unindent(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    let (first_row, last_row) = affected_rows(ctx);
    let tab_width = ctx.settings.tab_width.max(1);

    let doc = ctx.engine.document();
    let history: Vec<String> = (first_row..=last_row)
        .map(|row| {
            let chars = doc.row_chars(row);
            if chars.first() == Some(&'\t') {
                "\t".to_string()
            } else {
                let spaces = chars
                    .iter()
                    .take(tab_width)
                    .take_while(|&&ch| ch == ' ')
                    .count();
                " ".repeat(spaces)
            }
        })
        .collect();

    if history.iter().all(String::is_empty) {
        return Ok(ActionResult::NoOp);
    }
    Ok(ctx.commit(EditOp::Unindent { first_row, history }))
}

fn newline(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    if let Some(selection) = ctx.active_selection() {
        return Ok(replace_selection(ctx, selection, ROW_SEPARATOR.to_string()));
    }

    let pos = ctx.caret();
    let indent = if ctx.settings.auto_indent {
        let chars = ctx.engine.document().row_chars(pos.row);
        let leading = chars
            .iter()
            .take_while(|&&ch| ch == ' ' || ch == '\t')
            .count();
        let width = row_screen_width(&chars[..leading], ctx.settings.tab_width);
        width.min(ctx.engine.cursor().position().col)
    } else {
        0
    };
    Ok(ctx.commit(EditOp::Newline { pos, indent }))
}

fn backspace(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    if let Some(selection) = ctx.active_selection() {
        return Ok(ctx.commit(EditOp::DeleteSelection {
            selection,
            text: String::new(),
        }));
    }

    let pos = ctx.caret();
    let doc = ctx.engine.document();
    let chars = doc.row_chars(pos.row);

    if pos.col > chars.len() {
        let (doc, cursor) = ctx.engine.document_and_cursor();
        return Ok(ActionResult::Moved(cursor.move_left(doc)));
    }
    if pos.col == 0 {
        if pos.row == 0 {
            return Ok(ActionResult::NoOp);
        }
        return Ok(ctx.commit(EditOp::JoinLine {
            row: pos.row,
            direction: JoinDirection::Up,
            col: 0,
            strip: 0,
        }));
    }

    let spaces_mode = ctx.settings.tab_key_behavior == TabKeyBehavior::Spaces;
    let in_indent = chars[..pos.col].iter().all(|&ch| ch == ' ');
    let count = if spaces_mode && in_indent {
        let tab_width = ctx.settings.tab_width.max(1);
        pos.col - (pos.col - 1) / tab_width * tab_width
    } else {
        1
    };

    let start = Position::new(pos.row, pos.col - count);
    let text: String = chars[start.col..pos.col].iter().collect();
    Ok(ctx.commit(EditOp::DeleteCharacter { pos: start, text }))
}

fn delete_key(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    if let Some(selection) = ctx.active_selection() {
        return Ok(ctx.commit(EditOp::DeleteSelection {
            selection,
            text: String::new(),
        }));
    }

    let pos = ctx.caret();
    let doc = ctx.engine.document();
    let chars = doc.row_chars(pos.row);

    if pos.col >= chars.len() {
        if pos.row >= doc.last_row() {
            return Ok(ActionResult::NoOp);
        }
        return Ok(ctx.commit(EditOp::JoinLine {
            row: pos.row,
            direction: JoinDirection::Down,
            col: 0,
            strip: 0,
        }));
    }

    let text = chars[pos.col].to_string();
    Ok(ctx.commit(EditOp::DeleteCharacter { pos, text }))
}

fn delete_word_left(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    if let Some(selection) = ctx.active_selection() {
        return Ok(ctx.commit(EditOp::DeleteSelection {
            selection,
            text: String::new(),
        }));
    }

    let end = ctx.caret();
    let len = ctx.engine.document().row_length(end.row);
    if end.col > len {
        let (doc, cursor) = ctx.engine.document_and_cursor();
        return Ok(ActionResult::Moved(
            cursor.set_model_position(doc, Position::new(end.row, len)),
        ));
    }

    let start = ctx.engine.cursor().word_left_target(ctx.engine.document());
    if start == end {
        return Ok(ActionResult::NoOp);
    }
    Ok(ctx.commit(EditOp::DeleteChunk {
        start,
        end,
        text: String::new(),
    }))
}

fn delete_word_right(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    if let Some(selection) = ctx.active_selection() {
        return Ok(ctx.commit(EditOp::DeleteSelection {
            selection,
            text: String::new(),
        }));
    }

    let start = ctx.caret();
    let end = ctx.engine.cursor().word_right_target(ctx.engine.document());
    if end <= start {
        return Ok(ActionResult::NoOp);
    }
    Ok(ctx.commit(EditOp::DeleteChunk {
        start,
        end,
        text: String::new(),
    }))
}

fn kill_line(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    let row = ctx.caret().row;
    let doc = ctx.engine.document();

    let (start, end) = if row < doc.last_row() {
        (Position::new(row, 0), Position::new(row + 1, 0))
    } else {
        (Position::new(row, 0), Position::new(row, doc.row_length(row)))
    };
    if start == end {
        return Ok(ActionResult::NoOp);
    }
    Ok(ctx.commit(EditOp::DeleteChunk {
        start,
        end,
        text: String::new(),
    }))
}

// Selection and clipboard

fn cut_selection(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    let Some(selection) = ctx.active_selection() else {
        return Ok(ActionResult::NoOp);
    };

    let text = ctx.engine.document().get_chunk(&selection);
    match ctx.commit(EditOp::DeleteSelection {
        selection,
        text: String::new(),
    }) {
        ActionResult::Success => Ok(ActionResult::Text(text)),
        other => Ok(other),
    }
}

fn copy_selection(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    match ctx.active_selection() {
        Some(selection) => Ok(ActionResult::Text(
            ctx.engine.document().get_chunk(&selection),
        )),
        None => Ok(ActionResult::NoOp),
    }
}

fn select_all(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    if ctx.engine.document().is_empty() {
        return Ok(ActionResult::NoOp);
    }

    let end = ctx.engine.document().end_position();
    ctx.engine.selection_mut().set(Position::default(), end);
    let (doc, cursor) = ctx.engine.document_and_cursor();
    cursor.set_model_position(doc, end);
    Ok(ActionResult::Success)
}

fn select(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    let ActionInput::Selection(selection) = input else {
        return Err(ctx.invalid_input("a selection"));
    };

    let doc = ctx.engine.document();
    let start = doc.clamp_position_strict(selection.start);
    let end = doc.clamp_position_strict(selection.end);
    ctx.engine.selection_mut().set(start, end);
    let (doc, cursor) = ctx.engine.document_and_cursor();
    cursor.set_model_position(doc, end);
    Ok(ActionResult::Success)
}

/// Caret after placing it on the screen position in `input`, or the current caret.
fn pointed_position(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<Position, EditError> {
    match *input {
        ActionInput::None => {}
        ActionInput::Position(target) => {
            let (doc, cursor) = ctx.engine.document_and_cursor();
            cursor.move_cursor(doc, target);
        }
        _ => return Err(ctx.invalid_input("no input or a position")),
    }
    Ok(ctx.caret())
}

fn select_word(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    let pos = pointed_position(ctx, input)?;
    let Some(word) = ctx.engine.cursor().word_bounds(ctx.engine.document(), pos) else {
        ctx.engine.selection_mut().clear();
        return Ok(ActionResult::NoOp);
    };

    ctx.engine.selection_mut().set(word.start, word.end);
    let (doc, cursor) = ctx.engine.document_and_cursor();
    cursor.set_model_position(doc, word.start);
    Ok(ActionResult::Success)
}

fn select_row(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    let row = pointed_position(ctx, input)?.row;
    let doc = ctx.engine.document();
    let start = Position::new(row, 0);
    let end = if row < doc.last_row() {
        Position::new(row + 1, 0)
    } else {
        Position::new(row, doc.row_length(row))
    };
    if start == end {
        return Ok(ActionResult::NoOp);
    }

    ctx.engine.selection_mut().set(start, end);
    Ok(ActionResult::Success)
}

// Motion

fn motion(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
    step: impl FnOnce(&mut CursorManager, &Document, &EditorSettings) -> CursorMove,
) -> Result<ActionResult, EditError> {
    let extend = match input {
        ActionInput::None => false,
        ActionInput::Extend => true,
        _ => return Err(ctx.invalid_input("no input or Extend")),
    };

    let before = ctx.caret();
    let settings = ctx.settings;
    let (doc, cursor) = ctx.engine.document_and_cursor();
    let moved = step(cursor, doc, settings);

    let after = ctx.caret();
    if extend {
        ctx.engine.selection_mut().extend_to(before, after);
    } else {
        ctx.engine.selection_mut().clear();
    }
    Ok(ActionResult::Moved(moved))
}

fn move_cursor_to(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    let (target, mode) = match *input {
        ActionInput::Position(target) => (target, ActionInput::None),
        ActionInput::ExtendTo(target) => (target, ActionInput::Extend),
        _ => return Err(ctx.invalid_input("a position")),
    };
    motion(ctx, &mode, |cursor, doc, _| cursor.move_cursor(doc, target))
}

fn move_cursor_left(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, _| cursor.move_left(doc))
}

fn move_cursor_right(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, _| cursor.move_right(doc))
}

fn move_cursor_up(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, _| cursor.move_up(doc))
}

fn move_cursor_down(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, _| cursor.move_down(doc))
}

fn move_word_left(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, _| cursor.move_word_left(doc))
}

fn move_word_right(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, _| cursor.move_word_right(doc))
}

fn move_to_line_start(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, _| cursor.move_to_line_start(doc))
}

fn move_to_line_end(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, _| cursor.move_to_line_end(doc))
}

fn move_to_file_top(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, _| cursor.move_to_file_top(doc))
}

fn move_to_file_bottom(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, _| cursor.move_to_file_bottom(doc))
}

fn move_page_up(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, settings| {
        cursor.move_page_up(doc, settings.page_rows)
    })
}

fn move_page_down(
    ctx: &mut ActionContext<'_>,
    input: &ActionInput,
) -> Result<ActionResult, EditError> {
    motion(ctx, input, |cursor, doc, settings| {
        cursor.move_page_down(doc, settings.page_rows)
    })
}

fn goto_line(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    let ActionInput::Line(line) = *input else {
        return Err(ctx.invalid_input("a line number"));
    };
    let row = line.saturating_sub(1);
    motion(ctx, &ActionInput::None, |cursor, doc, _| {
        cursor.move_cursor(doc, Position::new(row, 0))
    })
}

// History

fn undo(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    Ok(if ctx.undo_step() {
        ActionResult::Success
    } else {
        ActionResult::NoOp
    })
}

fn redo(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    Ok(if ctx.redo_step() {
        ActionResult::Success
    } else {
        ActionResult::NoOp
    })
}

// Document commands

/// Replace the whole document with `text` as one undoable step.
fn rewrite_document(ctx: &mut ActionContext<'_>, text: String) -> ActionResult {
    let doc = ctx.engine.document();
    if doc.text() == text {
        return ActionResult::NoOp;
    }

    let selection = Selection::new(Position::default(), doc.end_position());
    replace_selection(ctx, selection, text)
}

fn replace(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    let ActionInput::Replace {
        query,
        replacement,
        options,
    } = input
    else {
        return Err(ctx.invalid_input("replace arguments"));
    };

    let (text, count) = replace_all(&ctx.engine.document().text(), query, replacement, *options)?;
    if count == 0 {
        return Ok(ActionResult::Count(0));
    }
    rewrite_document(ctx, text);
    Ok(ActionResult::Count(count))
}

fn sort(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    let order = match input {
        ActionInput::None => SortOrder::default(),
        ActionInput::Sort(order) => *order,
        _ => return Err(ctx.invalid_input("a sort order")),
    };

    let mut rows: Vec<String> = ctx
        .engine
        .document()
        .rows()
        .map(|row| row.chars().iter().collect())
        .collect();
    rows.sort();
    if order == SortOrder::Descending {
        rows.reverse();
    }
    Ok(rewrite_document(ctx, rows.join("\n")))
}

fn trim(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    let side = match input {
        ActionInput::None => TrimSide::default(),
        ActionInput::Trim(side) => *side,
        _ => return Err(ctx.invalid_input("a trim side")),
    };

    let rows: Vec<String> = ctx
        .engine
        .document()
        .rows()
        .map(|row| {
            let text: String = row.chars().iter().collect();
            match side {
                TrimSide::Left => text.trim_start_matches(' ').to_string(),
                TrimSide::Right => text.trim_end_matches(' ').to_string(),
                TrimSide::Both => text.trim_matches(' ').to_string(),
            }
        })
        .collect();
    Ok(rewrite_document(ctx, rows.join("\n")))
}

fn clear(ctx: &mut ActionContext<'_>, input: &ActionInput) -> Result<ActionResult, EditError> {
    no_input(ctx, input)?;
    Ok(rewrite_document(ctx, String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixture {
        engine: ActionEngine,
        undo: UndoManager,
        settings: EditorSettings,
        registry: ActionRegistry,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            let settings = EditorSettings::default();
            Self {
                engine: ActionEngine::new(Document::from_text(text), settings.cursor_policy()),
                undo: UndoManager::new(settings.undo_capacity),
                settings,
                registry: ActionRegistry::with_builtins(),
            }
        }

        fn run(&mut self, key: &str, input: ActionInput) -> Result<ActionResult, EditError> {
            let Some(action) = self.registry.get(key) else {
                return Err(EditError::UnknownAction(key.to_string()));
            };
            let mut ctx = ActionContext::new(key, &mut self.engine, &mut self.undo, &self.settings);
            action.perform(&mut ctx, &input)
        }

        fn text(&self) -> String {
            self.engine.document().text()
        }
    }

    #[test]
    fn test_registry_covers_descriptor_keys() {
        let registry = ActionRegistry::with_builtins();
        for key in EditOp::KEYS {
            assert!(registry.contains(key), "missing {key}");
        }
        assert!(registry.contains("moveWordRight"));
        assert!(!registry.contains("scrollIntoView"));
    }

    #[test]
    fn test_typing_replaces_selection_in_one_step() {
        let mut fx = Fixture::new("hello world");
        fx.run(
            "select",
            ActionInput::Selection(Selection::new(Position::new(0, 0), Position::new(0, 5))),
        )
        .unwrap();
        fx.run("insertCharacter", ActionInput::Char('J')).unwrap();
        assert_eq!(fx.text(), "J world");
        assert_eq!(fx.undo.undo_depth(), 1);

        fx.run("undo", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "hello world");
        assert_eq!(
            fx.engine.selection().normalized(),
            Some(Selection::new(Position::new(0, 0), Position::new(0, 5)))
        );
    }

    #[test]
    fn test_select_word_at_position() {
        let mut fx = Fixture::new("let value = a+b;");
        let result = fx
            .run("selectWord", ActionInput::Position(Position::new(0, 6)))
            .unwrap();
        assert_eq!(result, ActionResult::Success);
        assert_eq!(
            fx.engine.selection().normalized(),
            Some(Selection::new(Position::new(0, 4), Position::new(0, 9)))
        );
        assert_eq!(fx.engine.cursor().position(), Position::new(0, 4));

        let result = fx
            .run("selectWord", ActionInput::Position(Position::new(0, 3)))
            .unwrap();
        assert_eq!(result, ActionResult::NoOp);
        assert_eq!(fx.engine.selection().normalized(), None);

        fx.run("moveCursorTo", ActionInput::Position(Position::new(0, 13)))
            .unwrap();
        fx.run("selectWord", ActionInput::None).unwrap();
        assert_eq!(
            fx.engine.selection().normalized(),
            Some(Selection::new(Position::new(0, 13), Position::new(0, 14)))
        );
    }

    #[test]
    fn test_select_row_includes_separator() {
        let mut fx = Fixture::new("one
two
three");
        fx.run("selectRow", ActionInput::Position(Position::new(1, 2)))
            .unwrap();
        assert_eq!(
            fx.engine.selection().normalized(),
            Some(Selection::new(Position::new(1, 0), Position::new(2, 0)))
        );

        fx.run("deleteSelection", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "one
three");

        fx.run("selectRow", ActionInput::Position(Position::new(1, 0)))
            .unwrap();
        assert_eq!(
            fx.engine.selection().normalized(),
            Some(Selection::new(Position::new(1, 0), Position::new(1, 5)))
        );

        let mut fx = Fixture::new("a\n");
        fx.run("moveToFileBottom", ActionInput::None).unwrap();
        assert_eq!(fx.run("selectRow", ActionInput::None).unwrap(), ActionResult::NoOp);
    }

    #[test]
    fn test_move_cursor_to_can_extend() {
        let mut fx = Fixture::new("hello world");
        fx.run("moveCursorTo", ActionInput::Position(Position::new(0, 2)))
            .unwrap();
        fx.run("moveCursorTo", ActionInput::ExtendTo(Position::new(0, 7)))
            .unwrap();
        assert_eq!(
            fx.engine.selection().normalized(),
            Some(Selection::new(Position::new(0, 2), Position::new(0, 7)))
        );

        fx.run("moveCursorTo", ActionInput::ExtendTo(Position::new(0, 0)))
            .unwrap();
        assert_eq!(
            fx.engine.selection().normalized(),
            Some(Selection::new(Position::new(0, 0), Position::new(0, 2)))
        );

        fx.run("moveCursorTo", ActionInput::Position(Position::new(0, 4)))
            .unwrap();
        assert_eq!(fx.engine.selection().normalized(), None);
    }

    #[test]
    fn test_backspace_edges() {
        let mut fx = Fixture::new("ab\ncd");
        assert_eq!(fx.run("backspace", ActionInput::None).unwrap(), ActionResult::NoOp);

        fx.run("moveCursorTo", ActionInput::Position(Position::new(1, 0)))
            .unwrap();
        fx.run("backspace", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "abcd");
        assert_eq!(fx.engine.cursor().position(), Position::new(0, 2));

        fx.run("backspace", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "acd");
    }

    #[test]
    fn test_backspace_removes_to_previous_tab_stop_in_spaces_mode() {
        let mut fx = Fixture::new("      x");
        fx.settings = fx
            .settings
            .clone()
            .with_tab_key_behavior(TabKeyBehavior::Spaces);
        fx.run("moveCursorTo", ActionInput::Position(Position::new(0, 6)))
            .unwrap();
        fx.run("backspace", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "    x");
        fx.run("backspace", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "x");
    }

    #[test]
    fn test_delete_key_at_document_end_is_noop() {
        let mut fx = Fixture::new("ab\ncd");
        fx.run("moveToFileBottom", ActionInput::None).unwrap();
        assert_eq!(fx.run("deleteKey", ActionInput::None).unwrap(), ActionResult::NoOp);

        fx.run("moveCursorTo", ActionInput::Position(Position::new(0, 2)))
            .unwrap();
        fx.run("deleteKey", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "abcd");
    }

    #[test]
    fn test_newline_carries_indent() {
        let mut fx = Fixture::new("\tfoo");
        fx.run("moveToLineEnd", ActionInput::None).unwrap();
        fx.run("newline", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "\tfoo\n    ");
        assert_eq!(fx.engine.cursor().position(), Position::new(1, 4));
    }

    #[test]
    fn test_motion_extends_selection() {
        let mut fx = Fixture::new("one two");
        fx.run("moveWordRight", ActionInput::Extend).unwrap();
        fx.run("moveCursorRight", ActionInput::Extend).unwrap();
        assert_eq!(
            fx.engine.selection().normalized(),
            Some(Selection::new(Position::new(0, 0), Position::new(0, 4)))
        );

        fx.run("moveCursorLeft", ActionInput::None).unwrap();
        assert!(!fx.engine.selection().is_active());
    }

    #[test]
    fn test_indent_and_unindent_selection() {
        let mut fx = Fixture::new("a\nb\nc");
        fx.run(
            "select",
            ActionInput::Selection(Selection::new(Position::new(0, 0), Position::new(2, 0))),
        )
        .unwrap();
        fx.run("insertTab", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "\ta\n\tb\nc");

        fx.run("unindent", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "a\nb\nc");
        assert_eq!(fx.run("unindent", ActionInput::None).unwrap(), ActionResult::NoOp);
    }

    #[test]
    fn test_kill_line_and_clipboard() {
        let mut fx = Fixture::new("one\ntwo\nthree");
        fx.run("gotoLine", ActionInput::Line(2)).unwrap();
        fx.run("killLine", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "one\nthree");

        fx.run("selectAll", ActionInput::None).unwrap();
        assert_eq!(
            fx.run("copySelection", ActionInput::None).unwrap(),
            ActionResult::Text("one\nthree".into())
        );
        assert_eq!(
            fx.run("deleteSelection", ActionInput::None).unwrap(),
            ActionResult::Text("one\nthree".into())
        );
        assert_eq!(fx.text(), "");
        assert_eq!(fx.run("selectAll", ActionInput::None).unwrap(), ActionResult::NoOp);
    }

    #[test]
    fn test_document_commands() {
        let mut fx = Fixture::new("pear  \n  apple\nfig");
        fx.run("trim", ActionInput::Trim(TrimSide::Both)).unwrap();
        assert_eq!(fx.text(), "pear\napple\nfig");

        fx.run("sort", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "apple\nfig\npear");
        fx.run("sort", ActionInput::Sort(SortOrder::Descending)).unwrap();
        assert_eq!(fx.text(), "pear\nfig\napple");

        let result = fx
            .run(
                "replace",
                ActionInput::Replace {
                    query: "p(\\w)".into(),
                    replacement: "P$1".into(),
                    options: SearchOptions {
                        regex: true,
                        ..SearchOptions::default()
                    },
                },
            )
            .unwrap();
        assert_eq!(result, ActionResult::Count(2));
        assert_eq!(fx.text(), "Pear\nfig\naPple");

        fx.run("undo", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "pear\nfig\napple");

        fx.run("clear", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "");
    }

    #[test]
    fn test_replay_rejects_mismatched_descriptor() {
        let mut fx = Fixture::new("ab");
        let op = EditOp::InsertChunk {
            pos: Position::new(0, 0),
            text: "x".into(),
        };
        assert!(matches!(
            fx.run("insertCharacter", ActionInput::Descriptor(op.clone())),
            Err(EditError::DescriptorMismatch { .. })
        ));

        assert_eq!(
            fx.run("insertChunk", ActionInput::Descriptor(op)).unwrap(),
            ActionResult::Success
        );
        assert_eq!(fx.text(), "xab");
        assert_eq!(fx.undo.undo_depth(), 0);
    }

    #[test]
    fn test_invalid_input() {
        let mut fx = Fixture::new("");
        assert!(matches!(
            fx.run("gotoLine", ActionInput::None),
            Err(EditError::InvalidInput { expected: "a line number", .. })
        ));
        assert!(matches!(
            fx.run("joinLine", ActionInput::None),
            Err(EditError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_fn_action_runs_closure() {
        let mut fx = Fixture::new("abc");
        fx.registry.register(Arc::new(FnAction::new(
            "upcaseRow",
            |ctx: &mut ActionContext<'_>, _: &ActionInput| {
                let row = ctx.engine().model_position().row;
                let doc = ctx.engine().document();
                let end = Position::new(row, doc.row_length(row));
                let text = doc.row_text(row).to_uppercase();
                Ok(ctx.commit(EditOp::DeleteSelectionAndInsertChunk {
                    selection: Selection::new(Position::new(row, 0), end),
                    deleted: String::new(),
                    text,
                }))
            },
        )));
        fx.run("upcaseRow", ActionInput::None).unwrap();
        assert_eq!(fx.text(), "ABC");
    }
}
