//! # Block Capabilities
//!
//! Blocks are not arranged in a class hierarchy. Each concrete variant is assembled from a
//! handful of small fragments and implements the capability traits matching the fragments
//! it embeds:
//!
//! | Capability   | Trait          | Fragment          | Saved state                     |
//! |--------------|----------------|-------------------|---------------------------------|
//! | Identity     | [`Identity`]   | [`BaseBlock`]     | [`BaseBlockState`] (block type) |
//! | Texture      | [`Textured`]   | [`TexturedBlock`] | nothing, re-resolved by name    |
//! | Connectivity | [`Connected`]  | [`ConnectedBlock`]| [`ConnectedBlockState`]         |
//! | Collision    | [`Collidable`] | [`CollidableBlock`]| [`CollidableBlockState`]       |
//! | Stable id    | [`Identified`] | [`IdentifiedBlock`]| [`IdentifiedBlockState`]       |
//!
//! A variant's saved state is the concatenation of its fragments' states.

use std::fmt;

use cgmath::Vector2;
use serde::{Deserialize, Serialize};

use super::{block_side::Neighbors, block_type::BlockType};
use crate::engine_state::{
    assets::TextureTable,
    rendering::{ConnectedSides, RenderTarget, TextureRef},
};

//--- Capability traits -------------------------------------------------------

/// Every block knows its own type.
pub trait Identity {
    fn block_type(&self) -> BlockType;
}

/// Blocks that draw a texture.
pub trait Textured: Identity {
    fn texture(&self) -> &TextureRef;

    /// Draws the block's current texture at `position` (screen pixels).
    fn render(&self, target: &mut dyn RenderTarget, position: Vector2<f64>) {
        target.draw_texture(self.texture(), position);
    }
}

/// Blocks whose texture depends on which neighbors are of a related type.
pub trait Connected: Textured {
    /// The sides currently touching a related neighbor.
    fn connected_sides(&self) -> ConnectedSides;

    /// Block types this block visually merges with.
    fn connects_to(&self) -> &[BlockType];

    /// `true` until the first [`Connected::update_connections`] after construction or load.
    fn is_stale(&self) -> bool;

    /// Recomputes the connected sides from `neighbors` and re-resolves the texture.
    fn update_connections(&mut self, neighbors: &Neighbors, textures: &TextureTable);
}

/// Blocks that affect player movement.
pub trait Collidable {
    /// Whether the player is stopped by this block.
    fn is_collidable(&self) -> bool;

    /// Factor applied to the player's speed while standing on or in this block.
    fn speed_multiplier(&self) -> f64;
}

/// Blocks correlated with an external resource through a stable identifier.
pub trait Identified {
    fn stable_id(&self) -> StableId;
}

//--- Stable identifiers ------------------------------------------------------

/// A 128-bit identifier generated once and persisted forever after.
///
/// Serialized as 32 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct StableId(u128);

impl StableId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(fastrand::u128(..))
    }

    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl From<StableId> for String {
    fn from(id: StableId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for StableId {
    type Error = std::num::ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        u128::from_str_radix(&value, 16).map(StableId)
    }
}

//--- Fragments ---------------------------------------------------------------

/// Identity fragment. Present in every block.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseBlock {
    block_type: BlockType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseBlockState {
    pub block_type: BlockType,
}

impl BaseBlock {
    pub fn new(block_type: BlockType) -> Self {
        Self { block_type }
    }

    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    pub fn state(&self) -> BaseBlockState {
        BaseBlockState {
            block_type: self.block_type,
        }
    }

    pub fn load_state(&mut self, state: BaseBlockState) {
        self.block_type = state.block_type;
    }
}

/// Static texture fragment. Stores nothing when saved: the texture name is part of the
/// variant, so a loaded block resolves it again through its constructor.
#[derive(Debug, Clone)]
pub struct TexturedBlock {
    texture: TextureRef,
}

impl TexturedBlock {
    pub fn new(name: &'static str, textures: &TextureTable) -> Self {
        Self {
            texture: textures.texture(name),
        }
    }

    pub fn texture(&self) -> &TextureRef {
        &self.texture
    }
}

/// Connected texture fragment.
#[derive(Debug, Clone)]
pub struct ConnectedBlock {
    base_name: String,
    connects_to: Vec<BlockType>,
    sides: ConnectedSides,
    texture: TextureRef,
    stale: bool,
}

/// Connected sides are not saved. They are recomputed from the neighbors after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectedBlockState {
    pub base_name: String,
    pub connects_to: Vec<BlockType>,
}

impl ConnectedBlock {
    pub fn new(
        base_name: impl Into<String>,
        connects_to: Vec<BlockType>,
        textures: &TextureTable,
    ) -> Self {
        let base_name = base_name.into();
        let texture = textures.connected_texture(&base_name, ConnectedSides::NONE);
        Self {
            base_name,
            connects_to,
            sides: ConnectedSides::NONE,
            texture,
            stale: true,
        }
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn connects_to(&self) -> &[BlockType] {
        &self.connects_to
    }

    pub fn sides(&self) -> ConnectedSides {
        self.sides
    }

    pub fn texture(&self) -> &TextureRef {
        &self.texture
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn update(&mut self, neighbors: &Neighbors, textures: &TextureTable) {
        self.sides = neighbors.connected_sides(&self.connects_to);
        self.texture = textures.connected_texture(&self.base_name, self.sides);
        self.stale = false;
    }

    pub fn state(&self) -> ConnectedBlockState {
        ConnectedBlockState {
            base_name: self.base_name.clone(),
            connects_to: self.connects_to.clone(),
        }
    }

    /// Restores the saved fields and marks the fragment stale until its neighbors are known.
    pub fn load_state(&mut self, state: ConnectedBlockState, textures: &TextureTable) {
        self.base_name = state.base_name;
        self.connects_to = state.connects_to;
        self.sides = ConnectedSides::NONE;
        self.texture = textures.connected_texture(&self.base_name, ConnectedSides::NONE);
        self.stale = true;
    }
}

/// Collision fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct CollidableBlock {
    collidable: bool,
    player_speed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollidableBlockState {
    pub collidable: bool,
    pub player_speed: f64,
}

impl CollidableBlock {
    pub fn new(collidable: bool, player_speed: f64) -> Self {
        Self {
            collidable,
            player_speed,
        }
    }

    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.player_speed
    }

    pub fn state(&self) -> CollidableBlockState {
        CollidableBlockState {
            collidable: self.collidable,
            player_speed: self.player_speed,
        }
    }

    pub fn load_state(&mut self, state: CollidableBlockState) {
        self.collidable = state.collidable;
        self.player_speed = state.player_speed;
    }
}

/// Stable identifier fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiedBlock {
    id: StableId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifiedBlockState {
    pub id: StableId,
}

impl IdentifiedBlock {
    /// Generates a new identifier. Only called when a block is first created.
    pub fn generate() -> Self {
        Self {
            id: StableId::generate(),
        }
    }

    pub fn with_id(id: StableId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> StableId {
        self.id
    }

    pub fn state(&self) -> IdentifiedBlockState {
        IdentifiedBlockState { id: self.id }
    }

    /// Adopts the persisted identifier; nothing is regenerated.
    pub fn load_state(&mut self, state: IdentifiedBlockState) {
        self.id = state.id;
    }
}
