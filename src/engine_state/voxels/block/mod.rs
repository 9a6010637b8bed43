//! # Block Module
//!
//! This module provides the block model of the tile world: the closed set of block types,
//! the capability fragments blocks are assembled from, the concrete variants, and the
//! registry that saves and loads them polymorphically.

use cgmath::Vector2;
use serde::Serialize;

use crate::engine_state::{assets::TextureTable, rendering::RenderTarget};

pub mod block_side;
pub mod block_type;
pub mod capabilities;
pub mod registry;
pub mod variants;

pub use block_side::{BlockSide, Neighbors};
pub use block_type::BlockType;
pub use capabilities::{Collidable, Connected, Identified, Identity, StableId, Textured};
pub use registry::{RegistryError, SavedBlock, VariantRegistry};
pub use variants::{
    CaveEntranceBlock, CaveEntranceBlockState, ConnectedTerrainBlock, ConnectedTerrainBlockState,
    EmptyBlock, EmptyBlockState, TerrainBlock, TerrainBlockState,
};

/// The underlying integer type used to represent block types in saved chunks.
pub type BlockTypeSize = u8;

/// Represents a single tile of the world.
///
/// A closed sum over every concrete variant. Capabilities are queried through the
/// `as_*` accessors, which return `None` for variants lacking the capability.
#[derive(Debug, Clone)]
pub enum Block {
    Empty(EmptyBlock),
    Terrain(TerrainBlock),
    Connected(ConnectedTerrainBlock),
    CaveEntrance(CaveEntranceBlock),
}

/// The saved state of any block, one shape per variant.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockState {
    Empty(EmptyBlockState),
    Terrain(TerrainBlockState),
    Connected(ConnectedTerrainBlockState),
    CaveEntrance(CaveEntranceBlockState),
}

impl Block {
    /// Creates an empty tile.
    pub fn empty() -> Self {
        Block::Empty(EmptyBlock::new())
    }

    pub fn block_type(&self) -> BlockType {
        self.as_identity().block_type()
    }

    pub fn as_identity(&self) -> &dyn Identity {
        match self {
            Block::Empty(block) => block,
            Block::Terrain(block) => block,
            Block::Connected(block) => block,
            Block::CaveEntrance(block) => block,
        }
    }

    pub fn as_textured(&self) -> Option<&dyn Textured> {
        match self {
            Block::Empty(_) => None,
            Block::Terrain(block) => Some(block),
            Block::Connected(block) => Some(block),
            Block::CaveEntrance(block) => Some(block),
        }
    }

    pub fn as_connected(&self) -> Option<&dyn Connected> {
        match self {
            Block::Connected(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_connected_mut(&mut self) -> Option<&mut dyn Connected> {
        match self {
            Block::Connected(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_collidable(&self) -> Option<&dyn Collidable> {
        match self {
            Block::Terrain(block) => Some(block),
            Block::Connected(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_identified(&self) -> Option<&dyn Identified> {
        match self {
            Block::CaveEntrance(block) => Some(block),
            _ => None,
        }
    }

    /// Whether the player is stopped by this tile. Tiles without collision never stop it.
    pub fn is_collidable(&self) -> bool {
        self.as_collidable()
            .is_some_and(|block| block.is_collidable())
    }

    /// Factor applied to the player's speed on this tile, `1.0` without collision data.
    pub fn speed_multiplier(&self) -> f64 {
        self.as_collidable()
            .map_or(1.0, |block| block.speed_multiplier())
    }

    /// Whether the connected texture still waits for its neighbors.
    pub fn is_stale(&self) -> bool {
        self.as_connected().is_some_and(|block| block.is_stale())
    }

    /// Draws the tile if it has a texture.
    pub fn render(&self, target: &mut dyn RenderTarget, position: Vector2<f64>) {
        if let Some(block) = self.as_textured() {
            block.render(target, position);
        }
    }

    /// Collects the state of every fragment in this block.
    pub fn state(&self) -> BlockState {
        match self {
            Block::Empty(block) => BlockState::Empty(block.state()),
            Block::Terrain(block) => BlockState::Terrain(block.state()),
            Block::Connected(block) => BlockState::Connected(block.state()),
            Block::CaveEntrance(block) => BlockState::CaveEntrance(block.state()),
        }
    }

    /// Feeds a decoded state into a freshly constructed block.
    ///
    /// # Errors
    /// [`RegistryError::CorruptState`] if `state` belongs to another variant.
    pub fn load_state(
        &mut self,
        state: BlockState,
        textures: &TextureTable,
    ) -> Result<(), RegistryError> {
        let tag = self.block_type().tag();
        match (self, state) {
            (Block::Empty(block), BlockState::Empty(state)) => block.load_state(state),
            (Block::Terrain(block), BlockState::Terrain(state)) => block.load_state(state),
            (Block::Connected(block), BlockState::Connected(state)) => {
                block.load_state(state, textures)
            }
            (Block::CaveEntrance(block), BlockState::CaveEntrance(state)) => {
                block.load_state(state)
            }
            (_, state) => {
                return Err(RegistryError::CorruptState {
                    tag,
                    reason: format!("state of a {} block", state.block_type()),
                })
            }
        }
        Ok(())
    }
}

impl BlockState {
    /// The block type recorded in the identity fragment.
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockState::Empty(state) => state.base.block_type,
            BlockState::Terrain(state) => state.base.block_type,
            BlockState::Connected(state) => state.base.block_type,
            BlockState::CaveEntrance(state) => state.base.block_type,
        }
    }

    /// Serializes the state record without any variant wrapper; the tag is stored beside it.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        fn encode<S: Serialize>(state: &S) -> Result<Vec<u8>, serde_json::Error> {
            serde_json::to_vec(state)
        }

        match self {
            BlockState::Empty(state) => encode(state),
            BlockState::Terrain(state) => encode(state),
            BlockState::Connected(state) => encode(state),
            BlockState::CaveEntrance(state) => encode(state),
        }
    }
}

impl From<EmptyBlockState> for BlockState {
    fn from(state: EmptyBlockState) -> Self {
        BlockState::Empty(state)
    }
}

impl From<TerrainBlockState> for BlockState {
    fn from(state: TerrainBlockState) -> Self {
        BlockState::Terrain(state)
    }
}

impl From<ConnectedTerrainBlockState> for BlockState {
    fn from(state: ConnectedTerrainBlockState) -> Self {
        BlockState::Connected(state)
    }
}

impl From<CaveEntranceBlockState> for BlockState {
    fn from(state: CaveEntranceBlockState) -> Self {
        BlockState::CaveEntrance(state)
    }
}
