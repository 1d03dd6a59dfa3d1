//! Reversible command execution with undo/redo history and an active-target
//! selector.
//!
//! A [`HistoryEngine`] executes [`CommandKind`]s against whichever entity the
//! [`TargetRegistry`] currently points at, and undoes or redoes them in strict
//! execution order. Cycling the active target never disturbs history: every
//! command stays bound to the entity it was executed against.

mod command;
mod dispatcher;
mod history;
mod input;
mod math;
mod session;
mod target;
mod world;

pub use command::{Command, CommandKind, CommandPhase};
pub use dispatcher::{EngineCall, InputDispatcher};
pub use history::{HistoryEngine, HistoryEntry, HistorySnapshot};
pub use input::{InputAction, InputSnapshot};
pub use math::Vec3;
pub use session::{Session, SessionConfig, SessionError, TargetConfig, TickOutcome};
pub use target::{TargetRegistry, TargetRegistryError};
pub use world::{Entity, EntityId, EntityIdAllocator, Movable, TargetWorld, World};
