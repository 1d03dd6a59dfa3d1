use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::math::Vec3;
use crate::world::{EntityId, Movable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
}

impl CommandKind {
    pub const ALL: [CommandKind; 4] = [
        CommandKind::MoveForward,
        CommandKind::MoveBackward,
        CommandKind::MoveLeft,
        CommandKind::MoveRight,
    ];

    /// Unit displacement applied by a move of this kind.
    pub const fn displacement(self) -> Vec3 {
        match self {
            CommandKind::MoveForward => Vec3::new(0.0, 0.0, 1.0),
            CommandKind::MoveBackward => Vec3::new(0.0, 0.0, -1.0),
            CommandKind::MoveLeft => Vec3::new(-1.0, 0.0, 0.0),
            CommandKind::MoveRight => Vec3::new(1.0, 0.0, 0.0),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CommandKind::MoveForward => "move_forward",
            CommandKind::MoveBackward => "move_backward",
            CommandKind::MoveLeft => "move_left",
            CommandKind::MoveRight => "move_right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPhase {
    Pending,
    Applied,
    Reverted,
}

/// A reversible unit of work bound to exactly one target for its lifetime.
///
/// `revert` restores the snapshot taken by `apply`, and `reapply` restores the
/// snapshot taken by `revert`. Neither re-derives the displacement, so any
/// number of undo/redo cycles lands on bit-identical positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    kind: CommandKind,
    target: EntityId,
    phase: CommandPhase,
    prior_position: Vec3,
    post_undo_position: Vec3,
}

impl Command {
    pub fn new(kind: CommandKind, target: EntityId) -> Self {
        Self {
            kind,
            target,
            phase: CommandPhase::Pending,
            prior_position: Vec3::ZERO,
            post_undo_position: Vec3::ZERO,
        }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    pub fn phase(&self) -> CommandPhase {
        self.phase
    }

    pub fn prior_position(&self) -> Option<Vec3> {
        match self.phase {
            CommandPhase::Pending => None,
            CommandPhase::Applied | CommandPhase::Reverted => Some(self.prior_position),
        }
    }

    pub fn apply(&mut self, target: &mut dyn Movable) {
        debug_assert_eq!(
            self.phase,
            CommandPhase::Pending,
            "command applied more than once"
        );
        if self.phase != CommandPhase::Pending {
            warn!(kind = self.kind.label(), target = %self.target, "command_apply_repeated");
            return;
        }

        self.prior_position = target.position();
        target.set_position(self.prior_position + self.kind.displacement());
        self.phase = CommandPhase::Applied;
    }

    pub fn revert(&mut self, target: &mut dyn Movable) {
        debug_assert_eq!(
            self.phase,
            CommandPhase::Applied,
            "command reverted without being applied"
        );
        if self.phase != CommandPhase::Applied {
            warn!(kind = self.kind.label(), target = %self.target, "command_revert_out_of_order");
            return;
        }

        self.post_undo_position = target.position();
        target.set_position(self.prior_position);
        self.phase = CommandPhase::Reverted;
    }

    pub fn reapply(&mut self, target: &mut dyn Movable) {
        debug_assert_eq!(
            self.phase,
            CommandPhase::Reverted,
            "command reapplied without being reverted"
        );
        if self.phase != CommandPhase::Reverted {
            warn!(kind = self.kind.label(), target = %self.target, "command_reapply_out_of_order");
            return;
        }

        target.set_position(self.post_undo_position);
        self.phase = CommandPhase::Applied;
    }

    /// Called on the most recent undoable command when the active target
    /// changes. Move commands ignore it.
    pub fn on_target_switch(&mut self) {
        match self.kind {
            CommandKind::MoveForward
            | CommandKind::MoveBackward
            | CommandKind::MoveLeft
            | CommandKind::MoveRight => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Entity, EntityId};

    fn entity_at(position: Vec3) -> Entity {
        Entity {
            id: EntityId(0),
            name: "cube".to_string(),
            position,
        }
    }

    #[test]
    fn displacements_match_axis_conventions() {
        assert_eq!(CommandKind::MoveForward.displacement(), Vec3::UNIT_Z);
        assert_eq!(CommandKind::MoveBackward.displacement(), -Vec3::UNIT_Z);
        assert_eq!(CommandKind::MoveLeft.displacement(), -Vec3::UNIT_X);
        assert_eq!(CommandKind::MoveRight.displacement(), Vec3::UNIT_X);
    }

    #[test]
    fn apply_records_prior_and_translates() {
        let mut entity = entity_at(Vec3::new(2.0, 1.0, -3.0));
        let mut command = Command::new(CommandKind::MoveForward, entity.id);
        assert_eq!(command.prior_position(), None);

        command.apply(&mut entity);

        assert_eq!(entity.position, Vec3::new(2.0, 1.0, -2.0));
        assert_eq!(command.prior_position(), Some(Vec3::new(2.0, 1.0, -3.0)));
        assert_eq!(command.phase(), CommandPhase::Applied);
    }

    #[test]
    fn revert_restores_exact_prior_position() {
        let start = Vec3::new(0.1, 0.2, 0.3);
        let mut entity = entity_at(start);
        let mut command = Command::new(CommandKind::MoveLeft, entity.id);

        command.apply(&mut entity);
        command.revert(&mut entity);

        assert_eq!(entity.position, start);
        assert_eq!(command.phase(), CommandPhase::Reverted);
    }

    #[test]
    fn reapply_restores_post_undo_snapshot_not_displacement() {
        let mut entity = entity_at(Vec3::ZERO);
        let mut command = Command::new(CommandKind::MoveRight, entity.id);

        command.apply(&mut entity);
        // Something outside the command nudges the entity before undo.
        entity.position = Vec3::new(5.0, 0.0, 0.0);
        command.revert(&mut entity);
        assert_eq!(entity.position, Vec3::ZERO);

        command.reapply(&mut entity);
        assert_eq!(entity.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(command.phase(), CommandPhase::Applied);
    }

    #[test]
    fn repeated_undo_redo_cycles_do_not_drift() {
        let start = Vec3::new(0.1, 0.7, 0.3);
        let mut entity = entity_at(start);
        let mut command = Command::new(CommandKind::MoveBackward, entity.id);
        command.apply(&mut entity);
        let applied = entity.position;

        for _ in 0..1000 {
            command.revert(&mut entity);
            assert_eq!(entity.position, start);
            command.reapply(&mut entity);
            assert_eq!(entity.position, applied);
        }
    }

    #[test]
    fn target_switch_hook_leaves_move_commands_untouched() {
        let mut entity = entity_at(Vec3::ZERO);
        let mut command = Command::new(CommandKind::MoveForward, entity.id);
        command.apply(&mut entity);
        let before = command.clone();

        command.on_target_switch();

        assert_eq!(command, before);
    }
}
