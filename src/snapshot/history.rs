use tracing::debug;

use super::codec::Snapshot;
use crate::error::Result;
use crate::workspace::Workspace;

/// Bounded undo/redo over workspace snapshots.
///
/// Holds up to `max_steps + 1` snapshots: the current state plus
/// `max_steps` undo steps. Recording while not at the newest entry drops
/// everything after the current one.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    index: usize,
    max_steps: usize,
}

impl History {
    pub fn new(max_steps: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: 0,
            max_steps,
        }
    }

    /// Capture the workspace as the newest state.
    pub fn record(&mut self, workspace: &Workspace) -> Result<()> {
        let snapshot = Snapshot::capture(workspace)?;

        if !self.entries.is_empty() {
            self.entries.truncate(self.index + 1);
        }
        self.entries.push(snapshot);
        if self.entries.len() > self.max_steps + 1 {
            self.entries.remove(0);
        }
        self.index = self.entries.len() - 1;

        debug!(index = self.index, len = self.entries.len(), "Recorded history");
        Ok(())
    }

    /// Restore the previous state. `Ok(false)` when there is nothing to undo.
    pub fn undo(&mut self, workspace: &mut Workspace) -> Result<bool> {
        if !self.can_undo() {
            return Ok(false);
        }
        self.entries[self.index - 1].restore(workspace)?;
        self.index -= 1;
        Ok(true)
    }

    /// Re-apply the next state. `Ok(false)` when there is nothing to redo.
    pub fn redo(&mut self, workspace: &mut Workspace) -> Result<bool> {
        if !self.can_redo() {
            return Ok(false);
        }
        self.entries[self.index + 1].restore(workspace)?;
        self.index += 1;
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.entries.is_empty() && self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
    }
}
