//! # Engine State Module
//!
//! The core of the engine: the scene manager and everything scenes build on.
//!
//! ## Key Components
//!
//! * `EngineState` - Drives the scene manager one tick at a time and draws the active scene
//! * `assets` - Loads textures and connected texture families from disk
//! * `rendering` - Atlas slicing, connected texture resolution and the CPU canvas
//! * `scene` - The scene stack and the transitions scenes request
//! * `voxels` - Blocks, their variant registry, chunks and worlds
//!
//! ## Architecture
//!
//! `EngineState` does not know about any concrete scene. The application shell pushes the
//! first scene and ticks the engine until it reports [`TickControl::Exit`]; from then on the
//! scenes decide everything through the transitions they queue.

use log::{error, info};
use thiserror::Error;

use crate::{
    application_state::input_state::ProcessedInputState,
    config::ConfigError,
};

use assets::AssetError;
use rendering::Canvas;
use scene::{Scene, SceneError, SceneManager, TickControl};
use voxels::{block::registry::RegistryError, world::WorldError};

pub mod assets;
pub mod rendering;
pub mod scene;
pub mod voxels;

/// Everything that can stop the engine from starting or running.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Assets(#[from] AssetError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create the window: {0}")]
    Window(#[from] winit::error::OsError),
}

/// The main state container for the engine
///
/// Holds the scene manager and the canvas the active scene draws into.
///
/// # Examples
///
/// ```
/// use tile_sandbox::{
///     application_state::input_state::ProcessedInputState,
///     engine_state::{scene::TickControl, EngineState},
/// };
///
/// let mut engine = EngineState::new(320, 240);
/// // Nothing was pushed, so there is nothing to run.
/// assert_eq!(engine.tick(&ProcessedInputState::default()), TickControl::Exit);
/// ```
pub struct EngineState {
    /// The scene stack driven by [`EngineState::tick`]
    pub scene_manager: SceneManager,
    /// The frame the active scene draws into
    canvas: Canvas,
}

impl EngineState {
    /// Creates an engine with no scenes and a canvas of the given size in pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            scene_manager: SceneManager::new(),
            canvas: Canvas::new(width, height),
        }
    }

    /// Queues `scene` to run once the scenes before it have ended.
    pub fn push_scene(&mut self, scene: Box<dyn Scene>) {
        self.scene_manager.push_suspended(scene);
    }

    /// Runs one tick of the active scene.
    ///
    /// A failing scene ends the program: the error is logged, every scene is torn down
    /// and [`TickControl::Exit`] is returned.
    ///
    /// # Arguments
    /// * `input` - The keyboard state of this tick
    pub fn tick(&mut self, input: &ProcessedInputState) -> TickControl {
        match self.scene_manager.tick(input) {
            Ok(control) => control,
            Err(SceneError::ExitRequested) => {
                info!("Exit requested by {}", self.scene_manager.current_name().unwrap_or("?"));
                self.scene_manager.terminate();
                TickControl::Exit
            }
            Err(error) => {
                error!("Scene update failed: {}", error);
                self.scene_manager.terminate();
                TickControl::Exit
            }
        }
    }

    /// Draws the active scene into the canvas and returns it.
    pub fn render(&mut self) -> &Canvas {
        self.scene_manager.draw(&mut self.canvas);
        &self.canvas
    }

    /// Resizes the canvas. Zero-sized requests (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.canvas.resize(width, height);
        }
    }

    /// Tears every scene down. Safe to call more than once.
    pub fn shutdown(&mut self) {
        self.scene_manager.terminate();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use image::Rgba;

    use super::*;
    use crate::engine_state::{
        rendering::RenderTarget,
        scene::{SceneContext, SceneManagerState},
    };

    struct Scripted {
        name: &'static str,
        fail_with: Option<fn() -> SceneError>,
        destroyed: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Scene for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        fn update(&mut self, _context: &mut SceneContext<'_>) -> Result<(), SceneError> {
            match self.fail_with {
                Some(error) => Err(error()),
                None => Ok(()),
            }
        }

        fn draw(&self, target: &mut dyn RenderTarget) {
            target.clear(Rgba([9, 9, 9, 255]));
        }

        fn destroy(&mut self) {
            self.destroyed.borrow_mut().push(self.name);
        }
    }

    type Destroyed = Rc<RefCell<Vec<&'static str>>>;

    fn engine_with(fail_with: Option<fn() -> SceneError>) -> (EngineState, Destroyed) {
        let destroyed = Rc::new(RefCell::new(Vec::new()));
        let mut engine = EngineState::new(8, 8);
        engine.push_scene(Box::new(Scripted {
            name: "first",
            fail_with,
            destroyed: Rc::clone(&destroyed),
        }));
        engine.push_scene(Box::new(Scripted {
            name: "second",
            fail_with: None,
            destroyed: Rc::clone(&destroyed),
        }));
        (engine, destroyed)
    }

    #[test]
    fn healthy_scenes_keep_running() {
        let (mut engine, destroyed) = engine_with(None);
        let input = ProcessedInputState::default();

        assert_eq!(engine.tick(&input), TickControl::Continue);
        assert_eq!(engine.tick(&input), TickControl::Continue);
        assert_eq!(engine.scene_manager.tick_count(), 2);
        assert!(destroyed.borrow().is_empty());

        let canvas = engine.render();
        assert_eq!(canvas.image().get_pixel(0, 0), &Rgba([9, 9, 9, 255]));
    }

    #[test]
    fn exit_request_tears_everything_down() {
        let (mut engine, destroyed) = engine_with(Some(|| SceneError::ExitRequested));

        assert_eq!(engine.tick(&ProcessedInputState::default()), TickControl::Exit);
        assert_eq!(engine.scene_manager.state(), SceneManagerState::Terminated);
        assert_eq!(*destroyed.borrow(), ["second", "first"]);
    }

    #[test]
    fn failing_scene_stops_the_engine() {
        let (mut engine, destroyed) = engine_with(Some(|| SceneError::Other("boom".to_string())));

        assert_eq!(engine.tick(&ProcessedInputState::default()), TickControl::Exit);
        assert_eq!(engine.tick(&ProcessedInputState::default()), TickControl::Exit);
        assert_eq!(destroyed.borrow().len(), 2);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let (mut engine, destroyed) = engine_with(None);
        engine.tick(&ProcessedInputState::default());
        engine.shutdown();
        engine.shutdown();
        assert_eq!(*destroyed.borrow(), ["second", "first"]);
    }

    #[test]
    fn zero_sized_resize_is_ignored() {
        let mut engine = EngineState::new(8, 8);
        engine.resize(0, 10);
        assert_eq!(engine.render().size(), (8, 8));
        engine.resize(16, 4);
        assert_eq!(engine.render().size(), (16, 4));
    }
}
