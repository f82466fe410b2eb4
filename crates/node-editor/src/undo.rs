//! Undo/redo history of edit commands
//!
//! Linear history: `index` is the slot the next `redo` will apply. Pushing
//! while not at the tail discards everything after `index`. Obsolete
//! commands never enter the history, and consecutive commands of the same
//! kind may merge into one entry (see [`EditCommand::merge`]).

use std::collections::VecDeque;

use crate::commands::{EditCommand, EditContext};

/// Undo/redo stack of [`EditCommand`]s
#[derive(Debug)]
pub struct UndoStack {
    commands: VecDeque<EditCommand>,
    /// Next slot to redo
    index: usize,
    /// Maximum number of entries to keep
    undo_limit: usize,
}

impl UndoStack {
    /// Create a new stack keeping at most `undo_limit` entries
    pub fn new(undo_limit: usize) -> Self {
        Self {
            commands: VecDeque::new(),
            index: 0,
            undo_limit: undo_limit.max(1),
        }
    }

    pub fn undo_limit(&self) -> usize {
        self.undo_limit
    }

    /// Change the limit, dropping the oldest entries if needed
    pub fn set_undo_limit(&mut self, undo_limit: usize) {
        self.undo_limit = undo_limit.max(1);
        self.enforce_limit();
    }

    /// Apply `command` and record it
    ///
    /// Returns `true` if the history changed, either by appending or by
    /// merging into the previous entry.
    pub fn push(&mut self, mut command: EditCommand, ctx: &mut EditContext<'_>) -> bool {
        if command.is_obsolete() {
            log::debug!("Discarding obsolete {} command", command.kind());
            return false;
        }

        // Truncate redo history
        self.commands.truncate(self.index);

        command.redo(ctx);
        if command.is_obsolete() {
            log::debug!("{} command had no effect", command.kind());
            return false;
        }

        if let Some(previous) = self.commands.back_mut() {
            if previous.merge(&command) {
                log::debug!("Merged into '{}'", previous.text());
                return true;
            }
        }

        log::debug!("Pushed '{}'", command.text());
        self.commands.push_back(command);
        self.index = self.commands.len();
        self.enforce_limit();
        true
    }

    /// Undo the command before `index`; `false` at the beginning
    pub fn undo(&mut self, ctx: &mut EditContext<'_>) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        let command = &mut self.commands[self.index];
        log::debug!("Undo '{}'", command.text());
        command.undo(ctx);
        true
    }

    /// Redo the command at `index`; `false` at the tail
    ///
    /// A command that turns obsolete while being redone is dropped from the
    /// history.
    pub fn redo(&mut self, ctx: &mut EditContext<'_>) -> bool {
        if self.index >= self.commands.len() {
            return false;
        }
        let command = &mut self.commands[self.index];
        log::debug!("Redo '{}'", command.text());
        command.redo(ctx);
        if command.is_obsolete() {
            self.commands.remove(self.index);
        } else {
            self.index += 1;
        }
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.index < self.commands.len()
    }

    /// Text of the command `undo` would reverse
    pub fn undo_text(&self) -> Option<String> {
        self.index
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .map(EditCommand::text)
    }

    /// Text of the command `redo` would apply
    pub fn redo_text(&self) -> Option<String> {
        self.commands.get(self.index).map(EditCommand::text)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Forget all history without touching the graph
    pub fn clear(&mut self) {
        self.commands.clear();
        self.index = 0;
    }

    fn enforce_limit(&mut self) {
        while self.commands.len() > self.undo_limit {
            self.commands.pop_front();
            self.index = self.index.saturating_sub(1);
        }
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(100)
    }
}
