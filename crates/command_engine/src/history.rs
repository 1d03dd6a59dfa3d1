use serde::Serialize;
use tracing::{debug, warn};

use crate::command::{Command, CommandKind};
use crate::target::TargetRegistry;
use crate::world::{EntityId, TargetWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub kind: CommandKind,
    pub target: EntityId,
}

/// Serializable view of both stacks, bottom first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistorySnapshot {
    pub active_target: EntityId,
    pub undo: Vec<HistoryEntry>,
    pub redo: Vec<HistoryEntry>,
}

/// Dual-stack undo/redo engine.
///
/// Commands move between `undo_history` and `redo_history` by value, so an
/// executed command is owned by exactly one stack at any time. Undo order is
/// global across targets: each command reverts against the target it was
/// bound to, never against the currently active one.
#[derive(Debug)]
pub struct HistoryEngine {
    registry: TargetRegistry,
    undo_history: Vec<Command>,
    redo_history: Vec<Command>,
    max_undo_depth: Option<usize>,
}

impl HistoryEngine {
    pub fn new(registry: TargetRegistry) -> Self {
        Self {
            registry,
            undo_history: Vec::new(),
            redo_history: Vec::new(),
            max_undo_depth: None,
        }
    }

    /// Caps undo depth, evicting the oldest entries from the bottom.
    pub fn with_max_undo_depth(mut self, max_undo_depth: usize) -> Self {
        self.max_undo_depth = Some(max_undo_depth.max(1));
        self.evict_oldest();
        self
    }

    pub fn execute<W>(&mut self, kind: CommandKind, world: &mut W) -> bool
    where
        W: TargetWorld + ?Sized,
    {
        let target_id = self.registry.current();
        let Some(target) = world.target_mut(target_id) else {
            warn!(kind = kind.label(), target = %target_id, "execute_target_missing");
            return false;
        };

        let mut command = Command::new(kind, target_id);
        command.apply(target);
        debug!(
            kind = kind.label(),
            target = %target_id,
            position = %target.position(),
            "command_executed"
        );

        self.undo_history.push(command);
        self.redo_history.clear();
        self.evict_oldest();
        true
    }

    pub fn undo<W>(&mut self, world: &mut W) -> bool
    where
        W: TargetWorld + ?Sized,
    {
        let Some(command) = self.undo_history.last_mut() else {
            debug!("undo_history_empty");
            return false;
        };

        // The command only leaves its stack once its target resolves.
        let target_id = command.target();
        let Some(target) = world.target_mut(target_id) else {
            warn!(kind = command.kind().label(), target = %target_id, "undo_target_missing");
            return false;
        };

        command.revert(target);
        debug!(
            kind = command.kind().label(),
            target = %target_id,
            position = %target.position(),
            "command_undone"
        );
        if let Some(command) = self.undo_history.pop() {
            self.redo_history.push(command);
        }
        true
    }

    pub fn redo<W>(&mut self, world: &mut W) -> bool
    where
        W: TargetWorld + ?Sized,
    {
        let Some(command) = self.redo_history.last_mut() else {
            debug!("redo_history_empty");
            return false;
        };

        // The command only leaves its stack once its target resolves.
        let target_id = command.target();
        let Some(target) = world.target_mut(target_id) else {
            warn!(kind = command.kind().label(), target = %target_id, "redo_target_missing");
            return false;
        };

        command.reapply(target);
        debug!(
            kind = command.kind().label(),
            target = %target_id,
            position = %target.position(),
            "command_redone"
        );
        if let Some(command) = self.redo_history.pop() {
            self.undo_history.push(command);
        }
        self.evict_oldest();
        true
    }

    pub fn cycle_target(&mut self) -> EntityId {
        let next = self.registry.cycle_next();
        if let Some(top) = self.undo_history.last_mut() {
            top.on_target_switch();
        }
        debug!(target = %next, cursor = self.registry.cursor(), "target_cycled");
        next
    }

    pub fn active_target(&self) -> EntityId {
        self.registry.current()
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_history.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_history.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_history.len()
    }

    pub fn max_undo_depth(&self) -> Option<usize> {
        self.max_undo_depth
    }

    /// Forgets both stacks. Entity positions are left as they are.
    pub fn clear(&mut self) {
        self.undo_history.clear();
        self.redo_history.clear();
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            active_target: self.registry.current(),
            undo: self.undo_history.iter().map(entry_of).collect(),
            redo: self.redo_history.iter().map(entry_of).collect(),
        }
    }

    fn evict_oldest(&mut self) {
        let Some(max_depth) = self.max_undo_depth else {
            return;
        };
        if self.undo_history.len() > max_depth {
            let excess = self.undo_history.len() - max_depth;
            self.undo_history.drain(..excess);
            debug!(evicted = excess, max_depth, "undo_history_trimmed");
        }
    }
}

fn entry_of(command: &Command) -> HistoryEntry {
    HistoryEntry {
        kind: command.kind(),
        target: command.target(),
    }
}
