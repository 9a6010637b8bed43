#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Tile Sandbox
//!
//! A 2D tile sandbox engine: scenes stacked on top of each other, tile worlds made of
//! chunks of blocks assembled from capability fragments, and connected textures that
//! follow their neighbors.
//!
//! ## Key Modules
//!
//! * `application_state` - The window, keyboard input and the fixed-rate tick loop
//! * `config` - Engine settings read from `config.json`
//! * `core` - Shared single-threaded state
//! * `engine_state` - Scenes, blocks, chunks, worlds, textures and rendering
//! * `game` - The main menu, gameplay and pause scenes
//!
//! ## Usage
//!
//! ```no_run
//! fn main() -> Result<(), tile_sandbox::engine_state::EngineError> {
//!     tile_sandbox::run()
//! }
//! ```

use std::rc::Rc;

use application_state::ApplicationState;
use config::{EngineConfig, CONFIG_FILE_NAME};
use engine_state::{
    assets::TextureTable,
    voxels::{block::VariantRegistry, chunk::storage::DirectoryChunkStorage},
    EngineError, EngineState,
};
use game::{MainMenuScene, SessionResources};
use log::info;
use winit::event_loop::EventLoop;

pub mod application_state;
pub mod config;
pub mod core;
pub mod engine_state;
pub mod game;

/// Starts the engine and blocks until the last scene ended or the window was closed.
///
/// # Errors
/// Any [`EngineError`] hit while loading the configuration and assets, or while running.
pub fn run() -> Result<(), EngineError> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = EngineConfig::load_or_default(CONFIG_FILE_NAME)?;

    let textures = Rc::new(TextureTable::load(&config.assets_dir)?);
    let registry = Rc::new(VariantRegistry::with_default_variants(textures)?);
    let storage = DirectoryChunkStorage::new(config.saves_dir.clone());

    let mut engine_state = EngineState::new(config.window_width, config.window_height);
    let resources = SessionResources::new(registry, Box::new(storage), config.clone());
    engine_state.push_scene(Box::new(MainMenuScene::new(resources)));

    let event_loop = EventLoop::new()?;
    let mut state = ApplicationState::new(engine_state, &config);
    event_loop.run_app(&mut state)?;

    match state.take_error() {
        Some(error) => Err(error),
        None => {
            info!("Goodbye");
            Ok(())
        }
    }
}
