use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::dispatcher::{EngineCall, InputDispatcher};
use crate::history::{HistoryEngine, HistorySnapshot};
use crate::input::InputSnapshot;
use crate::math::Vec3;
use crate::target::{TargetRegistry, TargetRegistryError};
use crate::world::{Entity, World};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub name: String,
    #[serde(default)]
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    pub targets: Vec<TargetConfig>,
    #[serde(default)]
    pub initial_target: Option<String>,
    #[serde(default)]
    pub max_undo_depth: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            targets: vec![
                TargetConfig {
                    name: "cube".to_string(),
                    position: Vec3::ZERO,
                },
                TargetConfig {
                    name: "sphere".to_string(),
                    position: Vec3::new(3.0, 0.0, 0.0),
                },
            ],
            initial_target: None,
            max_undo_depth: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Registry(#[from] TargetRegistryError),
    #[error("duplicate target name '{name}'")]
    DuplicateTargetName { name: String },
    #[error("target name cannot be empty (entry {index})")]
    EmptyTargetName { index: usize },
    #[error("target '{name}' has a non-finite position {position}")]
    NonFinitePosition { name: String, position: Vec3 },
    #[error("initial target '{name}' is not one of the configured targets")]
    UnknownInitialTarget { name: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub calls: usize,
    pub effective_calls: usize,
    pub quit_requested: bool,
}

/// Owns the world, the history engine and the dispatcher for one run.
#[derive(Debug)]
pub struct Session {
    world: World,
    engine: HistoryEngine,
    dispatcher: InputDispatcher,
}

impl Session {
    pub fn from_config(config: &SessionConfig) -> Result<Self, SessionError> {
        let mut world = World::default();
        let mut seen_names = HashSet::with_capacity(config.targets.len());
        let mut target_ids = Vec::with_capacity(config.targets.len());

        for (index, target) in config.targets.iter().enumerate() {
            if target.name.trim().is_empty() {
                return Err(SessionError::EmptyTargetName { index });
            }
            if !seen_names.insert(target.name.as_str()) {
                return Err(SessionError::DuplicateTargetName {
                    name: target.name.clone(),
                });
            }
            if !target.position.is_finite() {
                return Err(SessionError::NonFinitePosition {
                    name: target.name.clone(),
                    position: target.position,
                });
            }
            target_ids.push(world.spawn(target.name.clone(), target.position));
        }

        let cursor = match config.initial_target.as_deref() {
            None => 0,
            Some(name) => config
                .targets
                .iter()
                .position(|target| target.name == name)
                .ok_or_else(|| SessionError::UnknownInitialTarget {
                    name: name.to_string(),
                })?,
        };

        let registry = TargetRegistry::with_cursor(target_ids, cursor)?;
        let mut engine = HistoryEngine::new(registry);
        if let Some(max_undo_depth) = config.max_undo_depth {
            engine = engine.with_max_undo_depth(max_undo_depth);
        }

        let session = Self {
            world,
            engine,
            dispatcher: InputDispatcher::new(),
        };
        info!(
            target_count = session.engine.registry().target_count(),
            active = session.active_name(),
            max_undo_depth = ?session.engine.max_undo_depth(),
            "session_ready"
        );
        Ok(session)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn engine(&self) -> &HistoryEngine {
        &self.engine
    }

    pub fn active_entity(&self) -> Option<&Entity> {
        self.world.find_entity(self.engine.active_target())
    }

    pub fn active_name(&self) -> &str {
        self.active_entity()
            .map(|entity| entity.name.as_str())
            .unwrap_or("<missing>")
    }

    pub fn history_snapshot(&self) -> HistorySnapshot {
        self.engine.snapshot()
    }

    /// Returns whether the call had an observable effect.
    pub fn apply(&mut self, call: EngineCall) -> bool {
        apply_call(&mut self.engine, &mut self.world, call)
    }

    pub fn tick(&mut self, input: &InputSnapshot) -> TickOutcome {
        let mut outcome = TickOutcome {
            quit_requested: input.quit_requested(),
            ..TickOutcome::default()
        };
        for call in self.dispatcher.dispatch(input) {
            outcome.calls += 1;
            if apply_call(&mut self.engine, &mut self.world, *call) {
                outcome.effective_calls += 1;
            }
        }
        debug!(
            calls = outcome.calls,
            effective = outcome.effective_calls,
            quit = outcome.quit_requested,
            "tick_processed"
        );
        outcome
    }
}

fn apply_call(engine: &mut HistoryEngine, world: &mut World, call: EngineCall) -> bool {
    match call {
        EngineCall::Execute(kind) => engine.execute(kind, world),
        EngineCall::Undo => engine.undo(world),
        EngineCall::Redo => engine.redo(world),
        EngineCall::CycleTarget => {
            engine.cycle_target();
            true
        }
    }
}
