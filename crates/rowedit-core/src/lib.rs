#![warn(missing_docs)]
//! Rowedit Core - Headless Row-Based Text Editing Kernel
//!
//! # Overview
//!
//! `rowedit-core` is the part of a text editor that does not draw anything: a row-based document
//! model, caret and selection coordinate math for tab-expanded screens, and an undo/redo engine
//! built from paired, invertible edit descriptors. Painting, key bindings, clipboard and
//! persistence live in the layers that call into it.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditSession (named action dispatch)        │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Actions + ActionRegistry                   │  ← User intent → descriptors
//! ├─────────────────────────────────────────────┤
//! │  UndoManager (bounded dual stack)           │  ← History
//! ├─────────────────────────────────────────────┤
//! │  ActionEngine + EditOp descriptors          │  ← Reversible edits
//! ├─────────────────────────────────────────────┤
//! │  CursorManager / SelectionState (layout)    │  ← Screen ↔ model math
//! ├─────────────────────────────────────────────┤
//! │  Document (rows of chars)                   │  ← Text storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use rowedit_core::{ActionInput, EditSession, EditorSettings, Position};
//!
//! let mut session = EditSession::with_text("fn main() {\n\n}", EditorSettings::default());
//!
//! session.execute("gotoLine", ActionInput::Line(2)).unwrap();
//! session.execute("insertTab", ActionInput::None).unwrap();
//! session.execute("insertChunk", ActionInput::Text("run();".into())).unwrap();
//!
//! assert_eq!(session.text(), "fn main() {\n\trun();\n}");
//! // The caret lives in screen space: the tab occupies four cells.
//! assert_eq!(session.cursor_position(), Position::new(1, 10));
//! assert_eq!(session.model_position(), Position::new(1, 7));
//!
//! session.execute("undo", ActionInput::None).unwrap();
//! assert_eq!(session.text(), "fn main() {\n\t\n}");
//! ```
//!
//! # Module Description
//!
//! - [`document`] - Row storage and dirty-row tracking
//! - [`layout`] - Tab and wide-character cell math
//! - [`cursor`] - Caret motion in screen space
//! - [`selection`] - Positions and anchor/extent selection
//! - [`descriptor`] - Invertible edit descriptors
//! - [`engine`] - Descriptor execution
//! - [`undo`] - Bounded undo/redo history
//! - [`actions`] - Named actions and their registry
//! - [`search`] - Find and replace
//! - [`session`] - The editing session
//!
//! # Unicode Support
//!
//! - Rows store `char`s; model columns are character indices
//! - Tabs expand to the next tab stop, CJK double-width characters occupy two cells
//! - A caret landing inside a multi-cell character snaps out of its shadow

pub mod actions;
pub mod cursor;
pub mod descriptor;
pub mod document;
pub mod engine;
pub mod error;
pub mod layout;
pub mod search;
pub mod selection;
pub mod session;
pub mod settings;
pub mod undo;

pub use actions::{
    Action, ActionContext, ActionInput, ActionRegistry, ActionResult, FnAction, SortOrder,
    TrimSide,
};
pub use cursor::{CursorManager, CursorMove, CursorPolicy, WordClassifier};
pub use descriptor::{EditOp, JoinDirection, RecordScope, UndoItem};
pub use document::{Document, MAX_VIRTUAL_COLUMNS, ROW_SEPARATOR, Row};
pub use engine::ActionEngine;
pub use error::EditError;
pub use search::SearchOptions;
pub use selection::{Position, RowSpan, Selection, SelectionDirection, SelectionState, SpanEnd};
pub use session::EditSession;
pub use settings::{EditorSettings, TabKeyBehavior};
pub use undo::UndoManager;
