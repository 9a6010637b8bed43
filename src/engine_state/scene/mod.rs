//! # Scene System
//!
//! A scene is one distinct state of the program: the main menu, gameplay, the pause screen.
//! The [`SceneManager`] keeps exactly one of them active and an ordered sequence of
//! suspended scenes waiting their turn.
//!
//! ```text
//! SceneManager
//!   ├─ current:   Option<Box<dyn Scene>>
//!   └─ suspended: VecDeque<Box<dyn Scene>>   (front resumes first)
//! ```
//!
//! Scenes cannot reach the manager while it is updating them. Instead they queue
//! [`SceneTransition`]s through the [`SceneContext`] they are handed, and the manager applies
//! those in order once the update returned successfully.

use thiserror::Error;

use crate::{
    application_state::input_state::ProcessedInputState,
    engine_state::{rendering::RenderTarget, voxels::world::WorldError},
};

mod scene_manager;
mod transition_queue;

pub use scene_manager::{SceneManager, SceneManagerState, TickControl};
pub use transition_queue::{SceneTransition, TransitionQueue};

/// Errors a scene's update hook can fail with. All of them end the program.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The player asked to quit.
    #[error("exit requested")]
    ExitRequested,

    #[error(transparent)]
    World(#[from] WorldError),

    #[error("{0}")]
    Other(String),
}

/// Defines scene behavior.
///
/// Only `update` and `draw` are required; `destroy` defaults to doing nothing.
pub trait Scene {
    /// Name used in log output. Defaults to the type name without its module path.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Called once per tick while the scene is active.
    ///
    /// Returning an error stops the program; transitions queued during a failed update
    /// are discarded.
    fn update(&mut self, context: &mut SceneContext<'_>) -> Result<(), SceneError>;

    /// Called once per frame while the scene is active.
    fn draw(&self, target: &mut dyn RenderTarget);

    /// Called when the scene is about to be discarded.
    fn destroy(&mut self) {}
}

/// What a scene sees during its update.
pub struct SceneContext<'a> {
    /// Number of ticks completed before this one.
    pub tick: u64,
    pub input: &'a ProcessedInputState,
    transitions: &'a mut TransitionQueue,
}

impl<'a> SceneContext<'a> {
    pub fn new(
        tick: u64,
        input: &'a ProcessedInputState,
        transitions: &'a mut TransitionQueue,
    ) -> Self {
        Self {
            tick,
            input,
            transitions,
        }
    }

    /// Queues `scene` at the end of the suspended sequence.
    pub fn push_suspended(&mut self, scene: Box<dyn Scene>) {
        self.transitions.push(SceneTransition::PushSuspended(scene));
    }

    /// Suspends the calling scene at the front of the sequence and activates `next`.
    pub fn switch_and_suspend_current(&mut self, next: Box<dyn Scene>) {
        self.transitions
            .push(SceneTransition::SwitchAndSuspendCurrent(next));
    }

    /// Replaces the calling scene with `next` without tearing it down.
    pub fn replace_current(&mut self, next: Box<dyn Scene>) {
        self.transitions.push(SceneTransition::ReplaceCurrent(next));
    }

    /// Tears the active scene down and resumes the front of the sequence.
    pub fn end_current(&mut self) {
        self.transitions.push(SceneTransition::EndCurrent);
    }

    /// Tears every scene down and stops the manager.
    pub fn terminate(&mut self) {
        self.transitions.push(SceneTransition::Terminate);
    }

    pub fn queued_transitions(&self) -> usize {
        self.transitions.len()
    }
}
