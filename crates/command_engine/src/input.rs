use crate::command::CommandKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    Undo,
    Redo,
    CycleTarget,
    Quit,
}

const ACTION_COUNT: usize = 8;

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::MoveForward,
        InputAction::MoveBackward,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Undo,
        InputAction::Redo,
        InputAction::CycleTarget,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::MoveForward => 0,
            InputAction::MoveBackward => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Undo => 4,
            InputAction::Redo => 5,
            InputAction::CycleTarget => 6,
            InputAction::Quit => 7,
        }
    }

    pub const fn command_kind(self) -> Option<CommandKind> {
        match self {
            InputAction::MoveForward => Some(CommandKind::MoveForward),
            InputAction::MoveBackward => Some(CommandKind::MoveBackward),
            InputAction::MoveLeft => Some(CommandKind::MoveLeft),
            InputAction::MoveRight => Some(CommandKind::MoveRight),
            InputAction::Undo
            | InputAction::Redo
            | InputAction::CycleTarget
            | InputAction::Quit => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    pressed: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, pressed: bool) {
        self.pressed[action.index()] = pressed;
    }

    pub(crate) fn is_pressed(&self, action: InputAction) -> bool {
        self.pressed[action.index()]
    }
}

/// Actions whose input fired during one tick (edge, not level).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_pressed(mut self, action: InputAction, pressed: bool) -> Self {
        self.actions.set(action, pressed);
        self
    }

    pub fn from_actions(actions: &[InputAction]) -> Self {
        actions
            .iter()
            .fold(Self::empty(), |snapshot, action| snapshot.with_pressed(*action, true))
    }

    pub fn is_pressed(&self, action: InputAction) -> bool {
        self.actions.is_pressed(action)
    }

    pub fn quit_requested(&self) -> bool {
        self.is_pressed(InputAction::Quit)
    }

    pub fn is_empty(&self) -> bool {
        InputAction::ALL
            .iter()
            .all(|action| !self.is_pressed(*action))
    }
}
