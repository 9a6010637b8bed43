//! # Scene Manager
//!
//! Owns the active scene and the sequence of suspended scenes, and drives them one tick
//! at a time.
//!
//! ## States
//!
//! ```text
//! Empty ──(scene becomes active)──▶ Running ──terminate()──▶ Terminated
//!   ▲                                  │
//!   └──(active ends, sequence empty)───┘
//! ```
//!
//! ## Resumption order
//!
//! The suspended sequence is consumed from the front. [`SceneManager::push_suspended`]
//! appends to the back, so scenes pushed that way resume in the order they were pushed,
//! while [`SceneManager::switch_and_suspend_current`] puts the interrupted scene at the front
//! so it is the next to resume.

use std::collections::VecDeque;

use log::{debug, info, warn};

use super::{Scene, SceneContext, SceneError, SceneTransition, TransitionQueue};
use crate::{
    application_state::input_state::ProcessedInputState, engine_state::rendering::RenderTarget,
};

/// What the driver should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    /// Keep ticking.
    Continue,
    /// Nothing is left to run; stop the program.
    Exit,
}

/// Lifecycle state of a [`SceneManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneManagerState {
    /// No active scene. The next tick promotes the front of the sequence, if any.
    Empty,
    /// A scene is active.
    Running,
    /// Every scene was torn down. Terminal.
    Terminated,
}

/// Manages the active scene and the suspended sequence.
pub struct SceneManager {
    current: Option<Box<dyn Scene>>,
    suspended: VecDeque<Box<dyn Scene>>,
    counter: u64,
    terminated: bool,
}

impl SceneManager {
    /// Creates a manager with no scenes.
    pub fn new() -> Self {
        Self {
            current: None,
            suspended: VecDeque::new(),
            counter: 0,
            terminated: false,
        }
    }

    //--- Stack operations -------------------------------------------------

    /// Appends `scene` to the end of the suspended sequence.
    pub fn push_suspended(&mut self, scene: Box<dyn Scene>) {
        if self.reject_after_termination("push_suspended") {
            return;
        }
        self.suspended.push_back(scene);
        self.log_stack("push_suspended");
    }

    /// Activates `next`, inserting the active scene (if any) at the front of the sequence.
    pub fn switch_and_suspend_current(&mut self, next: Box<dyn Scene>) {
        if self.reject_after_termination("switch_and_suspend_current") {
            return;
        }
        if let Some(current) = self.current.take() {
            self.suspended.push_front(current);
        }
        self.current = Some(next);
        self.log_stack("switch_and_suspend_current");
    }

    /// Replaces the active scene with `next`. The old scene is dropped without teardown.
    pub fn replace_current(&mut self, next: Box<dyn Scene>) {
        if self.reject_after_termination("replace_current") {
            return;
        }
        self.current = Some(next);
        self.log_stack("replace_current");
    }

    /// Tears the active scene down and promotes the front of the sequence.
    ///
    /// With an empty sequence the manager becomes [`SceneManagerState::Empty`].
    pub fn end_current(&mut self) {
        if self.reject_after_termination("end_current") {
            return;
        }
        if let Some(mut current) = self.current.take() {
            current.destroy();
        }
        self.current = self.suspended.pop_front();
        self.log_stack("end_current");
    }

    /// Tears down every suspended scene front to back, then the active one.
    ///
    /// Calling it again does nothing.
    pub fn terminate(&mut self) {
        if self.terminated {
            return;
        }
        info!("Terminating all scenes");

        for mut scene in self.suspended.drain(..) {
            scene.destroy();
        }
        if let Some(mut current) = self.current.take() {
            current.destroy();
        }
        self.terminated = true;
    }

    //--- Driving ----------------------------------------------------------

    /// Runs one tick of the active scene.
    ///
    /// # Returns
    /// * `Ok(TickControl::Exit)` if the manager is terminated, or empty with nothing to resume
    /// * `Ok(TickControl::Continue)` after a successful update
    ///
    /// # Errors
    /// The active scene's update error, verbatim. Nothing is torn down and the tick counter
    /// is not incremented.
    pub fn tick(&mut self, input: &ProcessedInputState) -> Result<TickControl, SceneError> {
        if self.terminated {
            return Ok(TickControl::Exit);
        }

        if self.current.is_none() {
            match self.suspended.pop_front() {
                Some(next) => {
                    self.current = Some(next);
                    self.log_stack("tick");
                }
                None => {
                    debug!("No scenes left to run");
                    return Ok(TickControl::Exit);
                }
            }
        }

        let mut transitions = TransitionQueue::new();
        if let Some(current) = self.current.as_mut() {
            let mut context = SceneContext::new(self.counter, input, &mut transitions);
            if let Err(error) = current.update(&mut context) {
                if !transitions.is_empty() {
                    warn!(
                        "Discarding {} scene transitions queued by failed update of {}",
                        transitions.len(),
                        current.name()
                    );
                }
                return Err(error);
            }
        }

        self.counter += 1;
        for transition in transitions.take() {
            self.apply(transition);
        }

        Ok(if self.terminated {
            TickControl::Exit
        } else {
            TickControl::Continue
        })
    }

    /// Draws the active scene, if any.
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        if let Some(current) = &self.current {
            current.draw(target);
        }
    }

    /// Applies one queued transition.
    pub fn apply(&mut self, transition: SceneTransition) {
        match transition {
            SceneTransition::PushSuspended(scene) => self.push_suspended(scene),
            SceneTransition::SwitchAndSuspendCurrent(scene) => {
                self.switch_and_suspend_current(scene)
            }
            SceneTransition::ReplaceCurrent(scene) => self.replace_current(scene),
            SceneTransition::EndCurrent => self.end_current(),
            SceneTransition::Terminate => self.terminate(),
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Number of successful ticks so far.
    pub fn tick_count(&self) -> u64 {
        self.counter
    }

    pub fn state(&self) -> SceneManagerState {
        if self.terminated {
            SceneManagerState::Terminated
        } else if self.current.is_some() {
            SceneManagerState::Running
        } else {
            SceneManagerState::Empty
        }
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref().map(|scene| scene.name())
    }

    /// Names of the suspended scenes, front first.
    pub fn suspended_names(&self) -> Vec<&str> {
        self.suspended.iter().map(|scene| scene.name()).collect()
    }

    //--- Internal Helpers -------------------------------------------------

    fn reject_after_termination(&self, operation: &str) -> bool {
        if self.terminated {
            warn!("SceneManager::{} called after termination, ignoring", operation);
        }
        self.terminated
    }

    fn log_stack(&self, operation: &str) {
        debug!(
            "SceneManager::{} - current {:?}; suspended {:?}",
            operation,
            self.current_name(),
            self.suspended_names()
        );
    }
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StResource;

    type Log = StResource<Vec<String>>;
    type UpdateHook = Box<dyn FnMut(&mut SceneContext<'_>) -> Result<(), SceneError>>;

    /// Records every lifecycle call into a shared log.
    struct MockScene {
        name: &'static str,
        log: Log,
        on_update: Option<UpdateHook>,
    }

    impl MockScene {
        fn boxed(name: &'static str, log: &Log) -> Box<dyn Scene> {
            Box::new(Self {
                name,
                log: log.clone(),
                on_update: None,
            })
        }

        fn with_hook(
            name: &'static str,
            log: &Log,
            hook: impl FnMut(&mut SceneContext<'_>) -> Result<(), SceneError> + 'static,
        ) -> Box<dyn Scene> {
            Box::new(Self {
                name,
                log: log.clone(),
                on_update: Some(Box::new(hook)),
            })
        }
    }

    impl Scene for MockScene {
        fn name(&self) -> &str {
            self.name
        }

        fn update(&mut self, context: &mut SceneContext<'_>) -> Result<(), SceneError> {
            self.log.get_mut().push(format!("update {}", self.name));
            match self.on_update.as_mut() {
                Some(hook) => hook(context),
                None => Ok(()),
            }
        }

        fn draw(&self, _target: &mut dyn RenderTarget) {
            self.log.get_mut().push(format!("draw {}", self.name));
        }

        fn destroy(&mut self) {
            self.log.get_mut().push(format!("destroy {}", self.name));
        }
    }

    fn input() -> ProcessedInputState {
        ProcessedInputState::default()
    }

    fn entries(log: &Log) -> Vec<String> {
        log.get().clone()
    }

    #[test]
    fn empty_manager_exits_without_counting() {
        let mut manager = SceneManager::new();
        assert_eq!(manager.state(), SceneManagerState::Empty);
        assert_eq!(manager.tick(&input()).unwrap(), TickControl::Exit);
        assert_eq!(manager.tick_count(), 0);
        assert_eq!(manager.state(), SceneManagerState::Empty);
    }

    #[test]
    fn pushed_scenes_resume_in_push_order() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.push_suspended(MockScene::boxed("A", &log));
        manager.push_suspended(MockScene::boxed("B", &log));

        manager.end_current();
        assert_eq!(manager.current_name(), Some("A"));
        manager.end_current();
        assert_eq!(manager.current_name(), Some("B"));
        manager.end_current();
        assert_eq!(manager.state(), SceneManagerState::Empty);
        assert_eq!(manager.tick(&input()).unwrap(), TickControl::Exit);

        assert_eq!(entries(&log), vec!["destroy A", "destroy B"]);
    }

    #[test]
    fn first_tick_promotes_the_front_without_teardown() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.push_suspended(MockScene::boxed("A", &log));

        assert_eq!(manager.tick(&input()).unwrap(), TickControl::Continue);
        assert_eq!(manager.state(), SceneManagerState::Running);
        assert_eq!(manager.tick_count(), 1);
        assert_eq!(entries(&log), vec!["update A"]);
    }

    #[test]
    fn switched_away_scene_resumes_first() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.switch_and_suspend_current(MockScene::boxed("X", &log));
        manager.push_suspended(MockScene::boxed("A", &log));
        manager.push_suspended(MockScene::boxed("B", &log));

        manager.switch_and_suspend_current(MockScene::boxed("Y", &log));
        assert_eq!(manager.suspended_names(), vec!["X", "A", "B"]);

        manager.end_current();
        assert_eq!(manager.current_name(), Some("X"));
        assert_eq!(manager.suspended_names(), vec!["A", "B"]);
        assert_eq!(entries(&log), vec!["destroy Y"]);
    }

    #[test]
    fn replace_current_skips_teardown() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.switch_and_suspend_current(MockScene::boxed("A", &log));
        manager.replace_current(MockScene::boxed("B", &log));

        assert_eq!(manager.current_name(), Some("B"));
        assert!(manager.suspended_names().is_empty());
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn terminate_tears_down_suspended_then_active_once() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.switch_and_suspend_current(MockScene::boxed("X", &log));
        manager.push_suspended(MockScene::boxed("A", &log));
        manager.push_suspended(MockScene::boxed("B", &log));

        manager.terminate();
        manager.terminate();

        assert_eq!(entries(&log), vec!["destroy A", "destroy B", "destroy X"]);
        assert_eq!(manager.state(), SceneManagerState::Terminated);
        assert_eq!(manager.current_name(), None);
        assert!(manager.suspended_names().is_empty());

        assert_eq!(manager.tick(&input()).unwrap(), TickControl::Exit);
        assert_eq!(manager.tick_count(), 0);
        assert_eq!(entries(&log).len(), 3);
    }

    #[test]
    fn operations_after_termination_are_ignored() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.terminate();

        manager.push_suspended(MockScene::boxed("A", &log));
        manager.switch_and_suspend_current(MockScene::boxed("B", &log));
        manager.end_current();

        assert_eq!(manager.state(), SceneManagerState::Terminated);
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn update_errors_are_returned_verbatim() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.switch_and_suspend_current(MockScene::with_hook("A", &log, |context| {
            context.end_current();
            Err(SceneError::Other("boom".to_string()))
        }));

        match manager.tick(&input()) {
            Err(SceneError::Other(message)) => assert_eq!(message, "boom"),
            other => panic!("expected the scene's error, got {:?}", other),
        }
        assert_eq!(manager.tick_count(), 0);
        assert_eq!(manager.current_name(), Some("A"));
        assert_eq!(entries(&log), vec!["update A"]);
    }

    #[test]
    fn queued_transitions_apply_in_order_after_the_update() {
        let log = Log::default();
        let pause_log = log.clone();
        let mut manager = SceneManager::new();
        manager.switch_and_suspend_current(MockScene::with_hook("game", &log, move |context| {
            if context.tick == 0 {
                context.switch_and_suspend_current(MockScene::boxed("pause", &pause_log));
                context.push_suspended(MockScene::boxed("credits", &pause_log));
            }
            Ok(())
        }));

        assert_eq!(manager.tick(&input()).unwrap(), TickControl::Continue);
        assert_eq!(manager.tick_count(), 1);
        assert_eq!(manager.current_name(), Some("pause"));
        assert_eq!(manager.suspended_names(), vec!["game", "credits"]);

        assert_eq!(manager.tick(&input()).unwrap(), TickControl::Continue);
        manager.end_current();
        assert_eq!(manager.current_name(), Some("game"));
        assert_eq!(manager.tick(&input()).unwrap(), TickControl::Continue);

        assert_eq!(
            entries(&log),
            vec!["update game", "update pause", "destroy pause", "update game"]
        );
    }

    #[test]
    fn terminate_from_a_scene_stops_the_manager() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.switch_and_suspend_current(MockScene::with_hook("menu", &log, |context| {
            context.terminate();
            Ok(())
        }));

        assert_eq!(manager.tick(&input()).unwrap(), TickControl::Exit);
        assert_eq!(manager.tick_count(), 1);
        assert_eq!(manager.state(), SceneManagerState::Terminated);
        assert_eq!(entries(&log), vec!["update menu", "destroy menu"]);
    }

    #[test]
    fn draw_reaches_only_the_active_scene() {
        let log = Log::default();
        let mut manager = SceneManager::new();
        manager.switch_and_suspend_current(MockScene::boxed("A", &log));
        manager.switch_and_suspend_current(MockScene::boxed("B", &log));

        let mut canvas = crate::engine_state::rendering::Canvas::new(1, 1);
        manager.draw(&mut canvas);
        assert_eq!(entries(&log), vec!["draw B"]);
    }
}
