//! # Game Session
//!
//! The scenes the player actually sees: the main menu, the gameplay scene walking a
//! [`World`](crate::engine_state::voxels::world::World), and the pause screen. They only
//! talk to the rest of the engine through the scene context and the shared
//! [`SessionResources`].

use std::{cell::RefMut, rc::Rc};

use crate::{
    config::EngineConfig,
    core::StResource,
    engine_state::{
        assets::TextureTable,
        voxels::{block::VariantRegistry, chunk::storage::ChunkStorage},
    },
};

pub mod menu;
pub mod pause;
pub mod player;
pub mod session;

pub use menu::MainMenuScene;
pub use pause::PauseScene;
pub use player::Player;
pub use session::GameScene;

/// Everything a game session needs from the engine, shared by the menu and every
/// session it starts.
#[derive(Clone)]
pub struct SessionResources {
    pub textures: Rc<TextureTable>,
    pub registry: Rc<VariantRegistry>,
    pub storage: StResource<Box<dyn ChunkStorage>>,
    pub config: Rc<EngineConfig>,
}

impl SessionResources {
    pub fn new(
        registry: Rc<VariantRegistry>,
        storage: Box<dyn ChunkStorage>,
        config: EngineConfig,
    ) -> Self {
        Self {
            textures: Rc::clone(registry.textures()),
            registry,
            storage: StResource::new(storage),
            config: Rc::new(config),
        }
    }

    /// Exclusive access to the chunk storage.
    pub fn storage_mut(&self) -> RefMut<'_, Box<dyn ChunkStorage>> {
        self.storage.get_mut()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::rc::Rc;

    use winit::keyboard::KeyCode;

    use super::SessionResources;
    use crate::{
        application_state::input_state::{ProcessedInputState, RawInputState},
        config::EngineConfig,
        engine_state::{
            assets::test_textures,
            voxels::{block::VariantRegistry, chunk::storage::MemoryChunkStorage},
        },
    };

    pub fn resources() -> SessionResources {
        let registry = VariantRegistry::with_default_variants(Rc::new(test_textures())).unwrap();
        let config = EngineConfig {
            autosave_interval_ticks: 100,
            player_speed: 0.25,
            ..EngineConfig::default()
        };
        SessionResources::new(Rc::new(registry), Box::new(MemoryChunkStorage::new()), config)
    }

    pub fn pressed(keys: &[KeyCode]) -> ProcessedInputState {
        ProcessedInputState::from_keys(keys.iter().map(|&key| (key, RawInputState::Pressed)))
    }
}
