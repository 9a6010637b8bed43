//! # Variant Registry
//!
//! Maps every block type tag to a constructor and a state decoder, so chunks can be saved
//! as `(tag, bytes)` pairs and rebuilt without knowing the concrete variants up front.

use std::{collections::HashMap, rc::Rc};

use log::debug;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use super::{
    block_type::BlockType,
    variants::{
        CaveEntranceBlock, CaveEntranceBlockState, ConnectedTerrainBlock,
        ConnectedTerrainBlockState, EmptyBlockState, TerrainBlock, TerrainBlockState,
    },
    Block, BlockState, BlockTypeSize,
};
use crate::engine_state::assets::TextureTable;

/// Builds a fresh block of one variant.
pub type BlockConstructor = fn(&TextureTable) -> Block;

/// Decodes the saved bytes of one variant.
pub type StateDecoder = fn(&[u8]) -> Result<BlockState, serde_json::Error>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("block variant {0} is registered twice")]
    DuplicateVariant(BlockType),

    #[error("no block variant is registered for tag {0}")]
    UnknownVariant(BlockTypeSize),

    #[error("corrupt state for block tag {tag}: {reason}")]
    CorruptState { tag: BlockTypeSize, reason: String },

    #[error("failed to encode block state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A block as it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedBlock {
    pub tag: BlockTypeSize,
    pub state: Vec<u8>,
}

/// Decodes bytes into the state shape `S` of one variant.
pub fn decode_state<S>(bytes: &[u8]) -> Result<BlockState, serde_json::Error>
where
    S: DeserializeOwned + Into<BlockState>,
{
    serde_json::from_slice::<S>(bytes).map(Into::into)
}

struct VariantEntry {
    constructor: BlockConstructor,
    decoder: StateDecoder,
}

/// Tag -> (constructor, decoder). Populated once at startup, read-only afterwards.
pub struct VariantRegistry {
    textures: Rc<TextureTable>,
    variants: HashMap<BlockType, VariantEntry>,
}

impl VariantRegistry {
    /// Creates an empty registry resolving textures from `textures`.
    pub fn new(textures: Rc<TextureTable>) -> Self {
        Self {
            textures,
            variants: HashMap::new(),
        }
    }

    /// Creates a registry holding every built-in variant.
    pub fn with_default_variants(textures: Rc<TextureTable>) -> Result<Self, RegistryError> {
        let mut registry = Self::new(textures);

        registry.register(BlockType::Empty, |_| Block::empty(), decode_state::<EmptyBlockState>)?;
        registry.register(
            BlockType::Grass,
            |textures| Block::Terrain(TerrainBlock::grass(textures)),
            decode_state::<TerrainBlockState>,
        )?;
        registry.register(
            BlockType::Sand,
            |textures| Block::Terrain(TerrainBlock::sand(textures)),
            decode_state::<TerrainBlockState>,
        )?;
        registry.register(
            BlockType::Stone,
            |textures| Block::Terrain(TerrainBlock::stone(textures)),
            decode_state::<TerrainBlockState>,
        )?;
        registry.register(
            BlockType::Water,
            |textures| Block::Connected(ConnectedTerrainBlock::water(textures)),
            decode_state::<ConnectedTerrainBlockState>,
        )?;
        registry.register(
            BlockType::Path,
            |textures| Block::Connected(ConnectedTerrainBlock::path(textures)),
            decode_state::<ConnectedTerrainBlockState>,
        )?;
        registry.register(
            BlockType::CaveEntrance,
            |textures| Block::CaveEntrance(CaveEntranceBlock::new(textures)),
            decode_state::<CaveEntranceBlockState>,
        )?;

        debug!("Registered {} block variants", registry.variants.len());
        Ok(registry)
    }

    /// Registers a variant.
    ///
    /// # Errors
    /// [`RegistryError::DuplicateVariant`] if `block_type` already has an entry. The existing
    /// entry is left untouched.
    pub fn register(
        &mut self,
        block_type: BlockType,
        constructor: BlockConstructor,
        decoder: StateDecoder,
    ) -> Result<(), RegistryError> {
        if self.variants.contains_key(&block_type) {
            return Err(RegistryError::DuplicateVariant(block_type));
        }
        self.variants
            .insert(block_type, VariantEntry { constructor, decoder });
        Ok(())
    }

    pub fn textures(&self) -> &Rc<TextureTable> {
        &self.textures
    }

    /// Builds a fresh block of `block_type`.
    pub fn construct(&self, block_type: BlockType) -> Result<Block, RegistryError> {
        let entry = self.entry(block_type.tag())?;
        Ok((entry.constructor)(&self.textures))
    }

    /// Serializes `block` into its tag and state bytes.
    pub fn save(&self, block: &Block) -> Result<SavedBlock, RegistryError> {
        let tag = block.block_type().tag();
        self.entry(tag)?;
        Ok(SavedBlock {
            tag,
            state: block.state().encode()?,
        })
    }

    /// Rebuilds a block from its tag and state bytes.
    ///
    /// Connected blocks come back stale; their sides are recomputed by the world once the
    /// neighbors are in place.
    ///
    /// # Errors
    /// * [`RegistryError::UnknownVariant`] if nothing is registered for `tag`
    /// * [`RegistryError::CorruptState`] if `bytes` do not decode into the registered shape
    pub fn load(&self, tag: BlockTypeSize, bytes: &[u8]) -> Result<Block, RegistryError> {
        let entry = self.entry(tag)?;

        let state = (entry.decoder)(bytes).map_err(|error| RegistryError::CorruptState {
            tag,
            reason: error.to_string(),
        })?;
        if state.block_type().tag() != tag {
            return Err(RegistryError::CorruptState {
                tag,
                reason: format!("state records block type {}", state.block_type()),
            });
        }

        let mut block = (entry.constructor)(&self.textures);
        block.load_state(state, &self.textures)?;
        Ok(block)
    }

    /// Shorthand for [`VariantRegistry::load`] on a [`SavedBlock`].
    pub fn load_saved(&self, saved: &SavedBlock) -> Result<Block, RegistryError> {
        self.load(saved.tag, &saved.state)
    }

    fn entry(&self, tag: BlockTypeSize) -> Result<&VariantEntry, RegistryError> {
        BlockType::from_tag(tag)
            .and_then(|block_type| self.variants.get(&block_type))
            .ok_or(RegistryError::UnknownVariant(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::{
        assets::test_textures,
        rendering::ConnectedSides,
        voxels::block::{BlockSide, Neighbors, StableId},
    };

    fn registry() -> VariantRegistry {
        VariantRegistry::with_default_variants(Rc::new(test_textures())).unwrap()
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry();
        let result = registry.register(
            BlockType::Grass,
            |_| Block::empty(),
            decode_state::<EmptyBlockState>,
        );

        assert!(matches!(result, Err(RegistryError::DuplicateVariant(BlockType::Grass))));
        let grass = registry.construct(BlockType::Grass).unwrap();
        assert_eq!(grass.block_type(), BlockType::Grass);
    }

    #[test]
    fn every_variant_survives_save_and_load() {
        let registry = registry();
        for block_type in BlockType::ALL {
            let block = registry.construct(block_type).unwrap();
            let saved = registry.save(&block).unwrap();
            let loaded = registry.load_saved(&saved).unwrap();

            assert_eq!(saved.tag, block_type.tag());
            assert_eq!(loaded.block_type(), block_type);
            assert_eq!(loaded.is_collidable(), block.is_collidable());
            assert_eq!(loaded.speed_multiplier(), block.speed_multiplier());
            assert_eq!(
                loaded.as_identified().map(|block| block.stable_id()),
                block.as_identified().map(|block| block.stable_id())
            );
        }
    }

    #[test]
    fn loaded_connected_block_recomputes_the_same_sides() {
        let registry = registry();
        let neighbors = Neighbors::from_fn(|side| match side {
            BlockSide::Left | BlockSide::Bottom => Some(BlockType::Water),
            _ => Some(BlockType::Stone),
        });

        let mut fresh = registry.construct(BlockType::Water).unwrap();
        if let Some(block) = fresh.as_connected_mut() {
            block.update_connections(&neighbors, registry.textures());
        }

        let mut loaded = registry.load_saved(&registry.save(&fresh).unwrap()).unwrap();
        let connected = loaded.as_connected_mut().unwrap();
        assert!(connected.is_stale());
        assert_eq!(connected.connected_sides(), ConnectedSides::NONE);
        assert_eq!(connected.connects_to(), &[BlockType::Water]);

        connected.update_connections(&neighbors, registry.textures());
        assert_eq!(
            loaded.as_connected().unwrap().connected_sides(),
            fresh.as_connected().unwrap().connected_sides()
        );
        assert!(loaded
            .as_textured()
            .unwrap()
            .texture()
            .ptr_eq(fresh.as_textured().unwrap().texture()));
    }

    #[test]
    fn stable_id_is_not_regenerated_on_load() {
        let registry = registry();
        let id = StableId::from_u128(0x1234);
        let cave = Block::CaveEntrance(CaveEntranceBlock::leading_to(id, registry.textures()));

        let loaded = registry.load_saved(&registry.save(&cave).unwrap()).unwrap();
        assert_eq!(loaded.as_identified().unwrap().stable_id(), id);
    }

    #[test]
    fn unknown_tags_are_reported() {
        let registry = registry();
        assert!(matches!(registry.load(200, b"{}"), Err(RegistryError::UnknownVariant(200))));

        let partial = VariantRegistry::new(Rc::new(test_textures()));
        let block = Block::empty();
        assert!(matches!(partial.save(&block), Err(RegistryError::UnknownVariant(0))));
    }

    #[test]
    fn corrupt_bytes_are_reported() {
        let registry = registry();
        let grass = registry.construct(BlockType::Grass).unwrap();
        let saved = registry.save(&grass).unwrap();

        assert!(matches!(
            registry.load(BlockType::Grass.tag(), b"not json"),
            Err(RegistryError::CorruptState { tag: 1, .. })
        ));
        // Terrain state of a grass block fed to the sand tag.
        assert!(matches!(
            registry.load(BlockType::Sand.tag(), &saved.state),
            Err(RegistryError::CorruptState { tag: 2, .. })
        ));
        // Terrain bytes fed to the water tag do not fit its shape.
        assert!(matches!(
            registry.load(BlockType::Water.tag(), &saved.state),
            Err(RegistryError::CorruptState { tag: 4, .. })
        ));
    }
}
