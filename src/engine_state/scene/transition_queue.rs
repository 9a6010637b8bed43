//! # Transition Queue
//!
//! Scenes queue transitions here during updates. The scene manager processes the queue
//! once the update returns.

use std::fmt;

use super::Scene;

/// Encapsulates one scene stack operation.
pub enum SceneTransition {
    /// Appends a scene to the end of the suspended sequence.
    PushSuspended(Box<dyn Scene>),

    /// Suspends the active scene at the front of the sequence and activates the new one.
    SwitchAndSuspendCurrent(Box<dyn Scene>),

    /// Replaces the active scene without tearing it down.
    ReplaceCurrent(Box<dyn Scene>),

    /// Tears the active scene down and resumes the front of the sequence.
    EndCurrent,

    /// Tears every scene down and stops the manager.
    Terminate,
}

impl fmt::Debug for SceneTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneTransition::PushSuspended(scene) => write!(f, "PushSuspended({})", scene.name()),
            SceneTransition::SwitchAndSuspendCurrent(scene) => {
                write!(f, "SwitchAndSuspendCurrent({})", scene.name())
            }
            SceneTransition::ReplaceCurrent(scene) => write!(f, "ReplaceCurrent({})", scene.name()),
            SceneTransition::EndCurrent => write!(f, "EndCurrent"),
            SceneTransition::Terminate => write!(f, "Terminate"),
        }
    }
}

/// FIFO queue of scene transitions.
#[derive(Debug, Default)]
pub struct TransitionQueue {
    queue: Vec<SceneTransition>,
}

impl TransitionQueue {
    /// Creates a new empty transition queue.
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queues a scene transition to be processed after the current update.
    pub fn push(&mut self, transition: SceneTransition) {
        self.queue.push(transition);
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Returns the number of queued transitions.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Takes all transitions from the queue in the order they were queued, leaving it empty.
    pub fn take(&mut self) -> Vec<SceneTransition> {
        std::mem::take(&mut self.queue)
    }
}
