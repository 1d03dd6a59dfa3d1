use thiserror::Error;

use crate::world::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TargetRegistryError {
    #[error("target registry needs at least one entity")]
    Empty,
    #[error("initial target index {index} is out of range for {len} targets")]
    CursorOutOfRange { index: usize, len: usize },
}

/// Fixed, ordered set of controllable entities plus the active cursor.
///
/// The cursor always points at an existing entry; there is no way to build an
/// empty registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRegistry {
    targets: Vec<EntityId>,
    cursor: usize,
}

impl TargetRegistry {
    pub fn new(targets: Vec<EntityId>) -> Result<Self, TargetRegistryError> {
        Self::with_cursor(targets, 0)
    }

    pub fn with_cursor(targets: Vec<EntityId>, cursor: usize) -> Result<Self, TargetRegistryError> {
        if targets.is_empty() {
            return Err(TargetRegistryError::Empty);
        }
        if cursor >= targets.len() {
            return Err(TargetRegistryError::CursorOutOfRange {
                index: cursor,
                len: targets.len(),
            });
        }
        Ok(Self { targets, cursor })
    }

    pub fn current(&self) -> EntityId {
        self.targets[self.cursor]
    }

    pub fn cycle_next(&mut self) -> EntityId {
        self.cursor = (self.cursor + 1) % self.targets.len();
        self.current()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}
