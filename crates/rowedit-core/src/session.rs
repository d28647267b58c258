//! The editing session: the single entry point for collaborators.

use std::sync::Arc;

use crate::actions::{Action, ActionContext, ActionInput, ActionRegistry, ActionResult};
use crate::cursor::{CursorMove, WordClassifier};
use crate::descriptor::EditOp;
use crate::document::Document;
use crate::engine::ActionEngine;
use crate::error::EditError;
use crate::selection::{Position, RowSpan, Selection};
use crate::settings::EditorSettings;
use crate::undo::UndoManager;

/// One document being edited: text, caret, selection, history, settings and actions.
///
/// # Example
///
/// ```rust
/// use rowedit_core::{ActionInput, EditSession};
///
/// let mut session = EditSession::with_text("hello", Default::default());
/// session.execute("moveToLineEnd", ActionInput::None).unwrap();
/// session.execute("insertCharacter", ActionInput::Char('!')).unwrap();
/// assert_eq!(session.text(), "hello!");
///
/// session.execute("undo", ActionInput::None).unwrap();
/// assert_eq!(session.text(), "hello");
/// ```
#[derive(Debug)]
pub struct EditSession {
    engine: ActionEngine,
    undo: UndoManager,
    settings: EditorSettings,
    registry: ActionRegistry,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

impl EditSession {
    /// An empty document (one empty row).
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            engine: ActionEngine::new(Document::new(), settings.cursor_policy()),
            undo: UndoManager::new(settings.undo_capacity),
            settings,
            registry: ActionRegistry::with_builtins(),
        }
    }

    /// A session over `text`.
    pub fn with_text(text: &str, settings: EditorSettings) -> Self {
        let mut session = Self::new(settings);
        session.engine.load_text(text);
        session
    }

    /// Replace the whole document. Resets caret, selection and history.
    pub fn load_text(&mut self, text: &str) {
        tracing::debug!(rows = text.split('\n').count(), "loading document");
        self.engine.load_text(text);
        self.undo.clear();
    }

    /// Current settings.
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Replace the settings. The caret policy is re-applied and history trimmed to the new
    /// capacity.
    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.engine.cursor_mut().set_policy(settings.cursor_policy());
        self.undo.set_capacity(settings.undo_capacity);
        self.settings = settings;
    }

    /// Replace the word classifier used by word motion and word deletion.
    pub fn set_word_classifier(&mut self, classifier: WordClassifier) {
        self.engine.cursor_mut().set_classifier(classifier);
    }

    /// Register an action, returning the one it replaced.
    pub fn register(&mut self, action: Arc<dyn Action>) -> Option<Arc<dyn Action>> {
        self.registry.register(action)
    }

    /// The action registry.
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Run the action registered under `key`.
    pub fn execute(&mut self, key: &str, input: ActionInput) -> Result<ActionResult, EditError> {
        let Some(action) = self.registry.get(key) else {
            tracing::warn!(action = key, "unknown action");
            return Err(EditError::UnknownAction(key.to_string()));
        };

        tracing::debug!(action = key, "dispatching action");
        let mut ctx = ActionContext::new(key, &mut self.engine, &mut self.undo, &self.settings);
        action.perform(&mut ctx, &input)
    }

    /// Perform a descriptor as one undoable step.
    pub fn perform(&mut self, op: EditOp) -> Option<EditOp> {
        let resolved = self.engine.perform(op);
        self.undo.record_emitted(&mut self.engine);
        resolved
    }

    /// Undo the last step. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.undo.undo(&mut self.engine)
    }

    /// Redo the last undone step. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.undo.redo(&mut self.engine)
    }

    /// Number of undo steps.
    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    /// Number of redo steps.
    pub fn redo_depth(&self) -> usize {
        self.undo.redo_depth()
    }

    /// The document.
    pub fn document(&self) -> &Document {
        self.engine.document()
    }

    /// Whole document text.
    pub fn text(&self) -> String {
        self.engine.document().text()
    }

    /// Rows changed since the last call.
    pub fn take_dirty_rows(&mut self) -> Vec<usize> {
        self.engine.take_dirty_rows()
    }

    /// Caret in screen coordinates.
    pub fn cursor_position(&self) -> Position {
        self.engine.cursor().position()
    }

    /// Move the caret to a screen position (clamped, snapped out of tab shadows).
    pub fn set_cursor_position(&mut self, pos: Position) -> CursorMove {
        let (doc, cursor) = self.engine.document_and_cursor();
        cursor.move_cursor(doc, pos)
    }

    /// Caret in model coordinates.
    pub fn model_position(&self) -> Position {
        self.engine.model_position()
    }

    /// The normalized selection.
    pub fn selection(&self) -> Option<Selection> {
        self.engine.selection().normalized()
    }

    /// Set the raw selection; `anchor == extent` clears it.
    pub fn set_selection(&mut self, anchor: Position, extent: Position) {
        self.engine.selection_mut().set(anchor, extent);
    }

    /// Drop the selection.
    pub fn clear_selection(&mut self) {
        self.engine.selection_mut().clear();
    }

    /// Text covered by the selection.
    pub fn selection_text(&self) -> Option<String> {
        let selection = self.selection()?;
        Some(self.engine.document().get_chunk(&selection))
    }

    /// Selected span of `row`.
    pub fn row_selection_span(&self, row: usize) -> Option<RowSpan> {
        self.engine.selection().row_span(row)
    }
}
