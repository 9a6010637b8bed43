//! # Block Variants
//!
//! The concrete blocks of the tile world. Each one embeds the fragments it needs from
//! [`super::capabilities`] and forwards the matching capability traits to them.

use serde::{Deserialize, Serialize};

use super::{
    block_side::Neighbors,
    block_type::BlockType,
    capabilities::{
        BaseBlock, BaseBlockState, Collidable, CollidableBlock, CollidableBlockState, Connected,
        ConnectedBlock, ConnectedBlockState, Identified, IdentifiedBlock, IdentifiedBlockState,
        Identity, StableId, Textured, TexturedBlock,
    },
};
use crate::engine_state::{
    assets::TextureTable,
    rendering::{ConnectedSides, TextureRef},
};

/// Speed multiplier while wading through water.
pub const WATER_SPEED: f64 = 0.2;
/// Speed multiplier on sand.
pub const SAND_SPEED: f64 = 0.8;
/// Speed multiplier on a path.
pub const PATH_SPEED: f64 = 1.25;

//--- Empty -------------------------------------------------------------------

/// Nothing. Has an identity and nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyBlock {
    base: BaseBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmptyBlockState {
    pub base: BaseBlockState,
}

impl EmptyBlock {
    pub fn new() -> Self {
        Self {
            base: BaseBlock::new(BlockType::Empty),
        }
    }

    pub fn state(&self) -> EmptyBlockState {
        EmptyBlockState {
            base: self.base.state(),
        }
    }

    pub fn load_state(&mut self, state: EmptyBlockState) {
        self.base.load_state(state.base);
    }
}

impl Default for EmptyBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl Identity for EmptyBlock {
    fn block_type(&self) -> BlockType {
        self.base.block_type()
    }
}

//--- Terrain -----------------------------------------------------------------

/// A plain textured tile with collision properties: grass, sand and stone.
#[derive(Debug, Clone)]
pub struct TerrainBlock {
    base: BaseBlock,
    textured: TexturedBlock,
    collidable: CollidableBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainBlockState {
    pub base: BaseBlockState,
    pub collidable: CollidableBlockState,
}

impl TerrainBlock {
    pub fn new(
        block_type: BlockType,
        texture_name: &'static str,
        collidable: bool,
        player_speed: f64,
        textures: &TextureTable,
    ) -> Self {
        Self {
            base: BaseBlock::new(block_type),
            textured: TexturedBlock::new(texture_name, textures),
            collidable: CollidableBlock::new(collidable, player_speed),
        }
    }

    pub fn grass(textures: &TextureTable) -> Self {
        Self::new(BlockType::Grass, "grass", false, 1.0, textures)
    }

    pub fn sand(textures: &TextureTable) -> Self {
        Self::new(BlockType::Sand, "sand", false, SAND_SPEED, textures)
    }

    pub fn stone(textures: &TextureTable) -> Self {
        Self::new(BlockType::Stone, "stone", true, 1.0, textures)
    }

    pub fn state(&self) -> TerrainBlockState {
        TerrainBlockState {
            base: self.base.state(),
            collidable: self.collidable.state(),
        }
    }

    pub fn load_state(&mut self, state: TerrainBlockState) {
        self.base.load_state(state.base);
        self.collidable.load_state(state.collidable);
    }
}

impl Identity for TerrainBlock {
    fn block_type(&self) -> BlockType {
        self.base.block_type()
    }
}

impl Textured for TerrainBlock {
    fn texture(&self) -> &TextureRef {
        self.textured.texture()
    }
}

impl Collidable for TerrainBlock {
    fn is_collidable(&self) -> bool {
        self.collidable.is_collidable()
    }

    fn speed_multiplier(&self) -> f64 {
        self.collidable.speed_multiplier()
    }
}

//--- Connected terrain -------------------------------------------------------

/// A tile that merges visually with its neighbors: water and paths.
#[derive(Debug, Clone)]
pub struct ConnectedTerrainBlock {
    base: BaseBlock,
    connected: ConnectedBlock,
    collidable: CollidableBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedTerrainBlockState {
    pub base: BaseBlockState,
    pub connected: ConnectedBlockState,
    pub collidable: CollidableBlockState,
}

impl ConnectedTerrainBlock {
    pub fn new(
        block_type: BlockType,
        family: &str,
        connects_to: Vec<BlockType>,
        collidable: CollidableBlock,
        textures: &TextureTable,
    ) -> Self {
        Self {
            base: BaseBlock::new(block_type),
            connected: ConnectedBlock::new(family, connects_to, textures),
            collidable,
        }
    }

    pub fn water(textures: &TextureTable) -> Self {
        Self::new(
            BlockType::Water,
            "lake",
            vec![BlockType::Water],
            CollidableBlock::new(false, WATER_SPEED),
            textures,
        )
    }

    pub fn path(textures: &TextureTable) -> Self {
        Self::new(
            BlockType::Path,
            "path",
            vec![BlockType::Path],
            CollidableBlock::new(false, PATH_SPEED),
            textures,
        )
    }

    pub fn state(&self) -> ConnectedTerrainBlockState {
        ConnectedTerrainBlockState {
            base: self.base.state(),
            connected: self.connected.state(),
            collidable: self.collidable.state(),
        }
    }

    pub fn load_state(&mut self, state: ConnectedTerrainBlockState, textures: &TextureTable) {
        self.base.load_state(state.base);
        self.connected.load_state(state.connected, textures);
        self.collidable.load_state(state.collidable);
    }
}

impl Identity for ConnectedTerrainBlock {
    fn block_type(&self) -> BlockType {
        self.base.block_type()
    }
}

impl Textured for ConnectedTerrainBlock {
    fn texture(&self) -> &TextureRef {
        self.connected.texture()
    }
}

impl Connected for ConnectedTerrainBlock {
    fn connected_sides(&self) -> ConnectedSides {
        self.connected.sides()
    }

    fn connects_to(&self) -> &[BlockType] {
        self.connected.connects_to()
    }

    fn is_stale(&self) -> bool {
        self.connected.is_stale()
    }

    fn update_connections(&mut self, neighbors: &Neighbors, textures: &TextureTable) {
        self.connected.update(neighbors, textures);
    }
}

impl Collidable for ConnectedTerrainBlock {
    fn is_collidable(&self) -> bool {
        self.collidable.is_collidable()
    }

    fn speed_multiplier(&self) -> f64 {
        self.collidable.speed_multiplier()
    }
}

//--- Cave entrance -----------------------------------------------------------

/// A portal to another world. Its stable id is the id of the world it leads to.
#[derive(Debug, Clone)]
pub struct CaveEntranceBlock {
    base: BaseBlock,
    textured: TexturedBlock,
    identified: IdentifiedBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaveEntranceBlockState {
    pub base: BaseBlockState,
    pub identified: IdentifiedBlockState,
}

impl CaveEntranceBlock {
    /// A new entrance leading to a world that does not exist yet.
    pub fn new(textures: &TextureTable) -> Self {
        Self::with_identified(IdentifiedBlock::generate(), textures)
    }

    /// An entrance leading to the world `id`.
    pub fn leading_to(id: StableId, textures: &TextureTable) -> Self {
        Self::with_identified(IdentifiedBlock::with_id(id), textures)
    }

    fn with_identified(identified: IdentifiedBlock, textures: &TextureTable) -> Self {
        Self {
            base: BaseBlock::new(BlockType::CaveEntrance),
            textured: TexturedBlock::new("cave", textures),
            identified,
        }
    }

    pub fn state(&self) -> CaveEntranceBlockState {
        CaveEntranceBlockState {
            base: self.base.state(),
            identified: self.identified.state(),
        }
    }

    pub fn load_state(&mut self, state: CaveEntranceBlockState) {
        self.base.load_state(state.base);
        self.identified.load_state(state.identified);
    }
}

impl Identity for CaveEntranceBlock {
    fn block_type(&self) -> BlockType {
        self.base.block_type()
    }
}

impl Textured for CaveEntranceBlock {
    fn texture(&self) -> &TextureRef {
        self.textured.texture()
    }
}

impl Identified for CaveEntranceBlock {
    fn stable_id(&self) -> StableId {
        self.identified.id()
    }
}
