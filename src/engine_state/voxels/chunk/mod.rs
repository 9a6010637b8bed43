//! # Chunk Module
//!
//! This module provides the `Chunk` struct, a 16x16 square of tiles, and its persisted
//! form, the [`ChunkSnapshot`].
//!
//! ## Stale tracking
//!
//! Connected blocks need all four neighbors before they can pick a texture. A freshly
//! loaded chunk does not know its neighbors yet, so every connected tile in it is flagged
//! in the `stale` bit vector (1 bit per tile) and recomputed by the world once the
//! surrounding chunks are in place.

use bitvec::prelude::BitVec;
use cgmath::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use super::{
    block::{registry::RegistryError, Block, Connected, SavedBlock, VariantRegistry},
    world::WorldError,
};

pub mod storage;

/// The width and height of a chunk in tiles.
pub const CHUNK_DIMENSION: i64 = 16;
/// The total number of tiles in a chunk (CHUNK_DIMENSION²).
pub const CHUNK_SIZE: usize = (CHUNK_DIMENSION * CHUNK_DIMENSION) as usize;

/// Represents a 16x16 square of tiles.
#[derive(Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates (not tile coordinates).
    pub position: Point2<i64>,

    /// Tiles in row-major order (x, then y).
    blocks: Vec<Block>,

    /// One bit per tile, set while the tile's connected texture waits for its neighbors.
    stale: BitVec,

    /// Whether anything changed since the chunk was last saved or loaded.
    modified: bool,
}

/// The persisted form of a chunk: every tile as a `(tag, bytes)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    pub position: (i64, i64),
    pub blocks: Vec<SavedBlock>,
}

impl Chunk {
    /// Creates a chunk with every tile built by `fill`.
    ///
    /// # Arguments
    /// * `position` - The chunk coordinates of the new chunk
    /// * `fill` - Called once per tile, in row-major order
    pub fn filled(position: Point2<i64>, mut fill: impl FnMut() -> Block) -> Self {
        let blocks: Vec<Block> = (0..CHUNK_SIZE).map(|_| fill()).collect();
        let mut chunk = Self {
            position,
            blocks,
            stale: BitVec::repeat(false, CHUNK_SIZE),
            modified: true,
        };
        chunk.flag_stale_blocks();
        chunk
    }

    /// Rebuilds the chunk at `position` from its snapshot through `registry`.
    ///
    /// Every connected tile of the result is stale.
    ///
    /// # Errors
    /// * [`WorldError::MalformedChunk`] if the snapshot was taken at another position or does
    ///   not hold exactly one entry per tile
    /// * [`WorldError::Registry`] if any tile fails to load
    pub fn from_snapshot(
        snapshot: &ChunkSnapshot,
        position: Point2<i64>,
        registry: &VariantRegistry,
    ) -> Result<Self, WorldError> {
        let saved_at = Point2::new(snapshot.position.0, snapshot.position.1);
        if saved_at != position {
            return Err(WorldError::MalformedChunk {
                position,
                reason: format!("snapshot belongs to chunk {:?}", saved_at),
            });
        }
        if snapshot.blocks.len() != CHUNK_SIZE {
            return Err(WorldError::MalformedChunk {
                position,
                reason: format!("expected {} tiles, found {}", CHUNK_SIZE, snapshot.blocks.len()),
            });
        }

        let blocks = snapshot
            .blocks
            .iter()
            .map(|saved| registry.load_saved(saved))
            .collect::<Result<Vec<_>, _>>()?;

        let mut chunk = Self {
            position,
            blocks,
            stale: BitVec::repeat(false, CHUNK_SIZE),
            modified: false,
        };
        chunk.flag_stale_blocks();
        Ok(chunk)
    }

    /// Serializes every tile through `registry`.
    pub fn snapshot(&self, registry: &VariantRegistry) -> Result<ChunkSnapshot, RegistryError> {
        let blocks = self
            .blocks
            .iter()
            .map(|block| registry.save(block))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ChunkSnapshot {
            position: (self.position.x, self.position.y),
            blocks,
        })
    }

    /// Tile coordinate of this chunk's top-left tile.
    pub fn origin(&self) -> Point2<i64> {
        Point2::new(self.position.x * CHUNK_DIMENSION, self.position.y * CHUNK_DIMENSION)
    }

    /// Returns the tile at local coordinates `local` (each component in `0..16`).
    pub fn block_at(&self, local: Vector2<usize>) -> &Block {
        &self.blocks[Self::index(local)]
    }

    /// The connected block at `local`, if any. Updating its connections is not a modification.
    pub fn connected_at_mut(&mut self, local: Vector2<usize>) -> Option<&mut dyn Connected> {
        self.blocks[Self::index(local)].as_connected_mut()
    }

    /// Replaces the tile at `local`, returning the previous one.
    pub fn set_block(&mut self, local: Vector2<usize>, block: Block) -> Block {
        let index = Self::index(local);
        self.stale.set(index, block.is_stale());
        self.modified = true;
        std::mem::replace(&mut self.blocks[index], block)
    }

    /// Local coordinates of every tile flagged stale.
    pub fn stale_tiles(&self) -> Vec<Vector2<usize>> {
        self.stale.iter_ones().map(Self::local).collect()
    }

    pub fn has_stale_tiles(&self) -> bool {
        self.stale.any()
    }

    /// Flags the tile at `local` for a connectivity refresh if it is a connected block.
    pub fn mark_stale(&mut self, local: Vector2<usize>) {
        let index = Self::index(local);
        if self.blocks[index].as_connected().is_some() {
            self.stale.set(index, true);
        }
    }

    pub fn clear_stale(&mut self, local: Vector2<usize>) {
        self.stale.set(Self::index(local), false);
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Iterates over all tiles with their local coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (Vector2<usize>, &Block)> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (Self::local(index), block))
    }

    fn flag_stale_blocks(&mut self) {
        for (index, block) in self.blocks.iter().enumerate() {
            self.stale.set(index, block.is_stale());
        }
    }

    fn index(local: Vector2<usize>) -> usize {
        debug_assert!(local.x < CHUNK_DIMENSION as usize && local.y < CHUNK_DIMENSION as usize);
        local.y * CHUNK_DIMENSION as usize + local.x
    }

    fn local(index: usize) -> Vector2<usize> {
        Vector2::new(index % CHUNK_DIMENSION as usize, index / CHUNK_DIMENSION as usize)
    }
}
