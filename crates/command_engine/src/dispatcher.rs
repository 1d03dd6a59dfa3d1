use crate::command::CommandKind;
use crate::input::{InputAction, InputSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCall {
    Execute(CommandKind),
    Undo,
    Redo,
    CycleTarget,
}

/// Order in which fired inputs are turned into engine calls within one tick.
const DISPATCH_ORDER: [InputAction; 7] = [
    InputAction::MoveForward,
    InputAction::MoveBackward,
    InputAction::MoveLeft,
    InputAction::MoveRight,
    InputAction::Undo,
    InputAction::Redo,
    InputAction::CycleTarget,
];

#[derive(Debug, Default)]
pub struct InputDispatcher {
    calls: Vec<EngineCall>,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// At most one call per fired action, in `DISPATCH_ORDER`. Quit is not an
    /// engine call; callers read it from the snapshot.
    pub fn dispatch(&mut self, input: &InputSnapshot) -> &[EngineCall] {
        self.calls.clear();
        for action in DISPATCH_ORDER {
            if !input.is_pressed(action) {
                continue;
            }
            if let Some(call) = call_for(action) {
                self.calls.push(call);
            }
        }
        &self.calls
    }
}

fn call_for(action: InputAction) -> Option<EngineCall> {
    match action {
        InputAction::MoveForward
        | InputAction::MoveBackward
        | InputAction::MoveLeft
        | InputAction::MoveRight => action.command_kind().map(EngineCall::Execute),
        InputAction::Undo => Some(EngineCall::Undo),
        InputAction::Redo => Some(EngineCall::Redo),
        InputAction::CycleTarget => Some(EngineCall::CycleTarget),
        InputAction::Quit => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_dispatches_nothing() {
        let mut dispatcher = InputDispatcher::new();
        assert!(dispatcher.dispatch(&InputSnapshot::empty()).is_empty());
    }

    #[test]
    fn calls_follow_fixed_order_regardless_of_press_order() {
        let mut dispatcher = InputDispatcher::new();
        let snapshot = InputSnapshot::from_actions(&[
            InputAction::CycleTarget,
            InputAction::Undo,
            InputAction::MoveRight,
            InputAction::MoveForward,
        ]);

        assert_eq!(
            dispatcher.dispatch(&snapshot),
            &[
                EngineCall::Execute(CommandKind::MoveForward),
                EngineCall::Execute(CommandKind::MoveRight),
                EngineCall::Undo,
                EngineCall::CycleTarget,
            ]
        );
    }

    #[test]
    fn quit_alone_produces_no_engine_call() {
        let mut dispatcher = InputDispatcher::new();
        let snapshot = InputSnapshot::from_actions(&[InputAction::Quit]);
        assert!(dispatcher.dispatch(&snapshot).is_empty());
    }

    #[test]
    fn every_non_quit_action_maps_to_one_call() {
        let mut dispatcher = InputDispatcher::new();
        for action in InputAction::ALL {
            let snapshot = InputSnapshot::from_actions(&[action]);
            let expected = usize::from(action != InputAction::Quit);
            assert_eq!(dispatcher.dispatch(&snapshot).len(), expected, "{action:?}");
        }
    }

    #[test]
    fn redo_maps_to_redo_call() {
        let mut dispatcher = InputDispatcher::new();
        let snapshot = InputSnapshot::from_actions(&[InputAction::Redo]);
        assert_eq!(dispatcher.dispatch(&snapshot), &[EngineCall::Redo]);
    }
}
