//! Undo/redo history.
//!
//! Two bounded LIFO stacks of [`UndoItem`]s. Recording a new item clears the redo stack; when the
//! undo stack is over capacity the oldest item is evicted.
//!
//! Replaying an item goes through [`ActionEngine::apply`], and whatever the replay emits is
//! discarded, so undo and redo never feed back into the history.

use std::collections::VecDeque;

use crate::descriptor::{RecordScope, UndoItem};
use crate::engine::ActionEngine;
use crate::settings::DEFAULT_UNDO_CAPACITY;

/// Bounded dual-stack undo history.
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: VecDeque<UndoItem>,
    redo_stack: VecDeque<UndoItem>,
    capacity: usize,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoManager {
    /// Create an empty history holding at most `capacity` undo steps.
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            capacity,
        }
    }

    /// Maximum number of undo steps.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting the oldest steps if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict();
    }

    /// Whether there is anything to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there is anything to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo steps.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo steps.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recent undo step.
    pub fn peek_undo(&self) -> Option<&UndoItem> {
        self.undo_stack.back()
    }

    /// Drop the whole history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Record an item. Items from a queued scope are rejected.
    ///
    /// Returns whether the item entered the undo stack.
    pub fn record(&mut self, item: UndoItem, scope: RecordScope) -> bool {
        if scope == RecordScope::Queued {
            return false;
        }

        self.redo_stack.clear();
        self.undo_stack.push_back(item);
        self.evict();
        true
    }

    /// Record every direct item the engine emitted since the last drain.
    pub fn record_emitted(&mut self, engine: &mut ActionEngine) -> usize {
        let mut recorded = 0;
        for (item, scope) in engine.take_emitted() {
            if self.record(item, scope) {
                recorded += 1;
            }
        }
        recorded
    }

    /// Undo the most recent step. No-op (returns `false`) when the stack is empty.
    pub fn undo(&mut self, engine: &mut ActionEngine) -> bool {
        let Some(item) = self.undo_stack.pop_back() else {
            return false;
        };
        tracing::debug!(action = item.undo.key(), "undo");

        Self::replay(engine, &item, Direction::Undo);
        self.redo_stack.push_back(item);
        true
    }

    /// Redo the most recently undone step. No-op (returns `false`) when the stack is empty.
    pub fn redo(&mut self, engine: &mut ActionEngine) -> bool {
        let Some(item) = self.redo_stack.pop_back() else {
            return false;
        };
        tracing::debug!(action = item.redo.key(), "redo");

        Self::replay(engine, &item, Direction::Redo);
        self.undo_stack.push_back(item);
        self.evict();
        true
    }

    fn replay(engine: &mut ActionEngine, item: &UndoItem, direction: Direction) {
        let (cursor, op) = match direction {
            Direction::Undo => (item.undo_cursor, &item.undo),
            Direction::Redo => (item.redo_cursor, &item.redo),
        };

        let (doc, caret) = engine.document_and_cursor();
        caret.move_cursor(doc, cursor);
        engine.apply(op.clone());
        engine.take_emitted();
    }

    fn evict(&mut self) {
        while self.undo_stack.len() > self.capacity {
            if let Some(evicted) = self.undo_stack.pop_front() {
                tracing::debug!(action = evicted.redo.key(), "evicted oldest undo step");
            }
        }
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Undo,
    Redo,
}
