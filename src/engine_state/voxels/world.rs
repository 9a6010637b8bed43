//! # World Module
//!
//! This module provides the `World` struct which manages the chunks of one tile world.
//! It serves as the central coordinator for chunk loading, block placement, connected
//! texture updates and persistence.
//!
//! ## Architecture
//!
//! The world is a sparse, unbounded 2D grid of 16x16 chunks. Only chunks that have been
//! requested are kept in memory; tiles of unloaded chunks read as "nothing" for neighbor
//! queries.
//!
//! ## Connected textures
//!
//! Placing or removing a tile refreshes the tile itself and its four cardinal neighbors
//! immediately. Loading a chunk flags its connected tiles and the facing edges of the
//! already-loaded chunks around it as stale; [`World::refresh_stale`] then recomputes them
//! once all neighbor context is in place.

use std::{collections::HashMap, path::PathBuf, rc::Rc};

use cgmath::{Point2, Vector2};
use log::{debug, info};
use thiserror::Error;
use web_time::{SystemTime, UNIX_EPOCH};

use super::{
    block::{
        registry::RegistryError, Block, BlockSide, BlockType, Neighbors, StableId,
        VariantRegistry,
    },
    chunk::{
        storage::{ChunkStorage, WorldMetadata},
        Chunk, CHUNK_DIMENSION,
    },
};
use crate::engine_state::rendering::{RenderTarget, TILE_SIZE};

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to (de)serialize {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("chunk {position:?} is malformed: {reason}")]
    MalformedChunk { position: Point2<i64>, reason: String },

    #[error("chunk {0:?} is not loaded")]
    ChunkNotLoaded(Point2<i64>),
}

/// Answers "what is next to this tile?".
pub trait NeighborQuery {
    /// The type of the tile at `position`, or `None` if it is not loaded.
    fn block_type_at(&self, position: Point2<i64>) -> Option<BlockType>;

    /// The types on the four sides of `position`.
    fn neighbors(&self, position: Point2<i64>) -> Neighbors {
        Neighbors::from_fn(|side| self.block_type_at(position + side.offset()))
    }
}

/// Splits a tile coordinate into the chunk holding it and the local coordinate inside it.
pub fn split_position(position: Point2<i64>) -> (Point2<i64>, Vector2<usize>) {
    let chunk = Point2::new(
        position.x.div_euclid(CHUNK_DIMENSION),
        position.y.div_euclid(CHUNK_DIMENSION),
    );
    let local = Vector2::new(
        position.x.rem_euclid(CHUNK_DIMENSION) as usize,
        position.y.rem_euclid(CHUNK_DIMENSION) as usize,
    );
    (chunk, local)
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Represents one tile world.
pub struct World {
    metadata: WorldMetadata,
    registry: Rc<VariantRegistry>,

    /// A mapping from chunk coordinates to chunk data.
    chunks: HashMap<Point2<i64>, Chunk>,
}

impl World {
    /// Creates a new world with no chunks loaded and the player in the middle of tile (0, 0).
    pub fn new(id: StableId, name: impl Into<String>, registry: Rc<VariantRegistry>) -> Self {
        Self {
            metadata: WorldMetadata {
                id,
                name: name.into(),
                player_position: (0.5, 0.5),
                last_saved: 0,
            },
            registry,
            chunks: HashMap::new(),
        }
    }

    /// Restores a saved world's metadata. Chunks are loaded on demand.
    ///
    /// # Returns
    /// `Ok(None)` if `storage` holds no world with this id.
    pub fn load(
        id: StableId,
        registry: Rc<VariantRegistry>,
        storage: &dyn ChunkStorage,
    ) -> Result<Option<Self>, WorldError> {
        Ok(storage.load_metadata(id)?.map(|metadata| {
            info!("Loaded world `{}` ({})", metadata.name, metadata.id);
            Self {
                metadata,
                registry,
                chunks: HashMap::new(),
            }
        }))
    }

    pub fn id(&self) -> StableId {
        self.metadata.id
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn registry(&self) -> &Rc<VariantRegistry> {
        &self.registry
    }

    pub fn player_position(&self) -> Point2<f64> {
        Point2::new(self.metadata.player_position.0, self.metadata.player_position.1)
    }

    pub fn set_player_position(&mut self, position: Point2<f64>) {
        self.metadata.player_position = (position.x, position.y);
    }

    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Makes sure the chunk at `position` (chunk coordinates) is in memory.
    ///
    /// The chunk is read from `storage` if it was saved before, otherwise it is created
    /// filled with grass. Connected tiles affected by the new chunk are refreshed.
    pub fn load_or_create_chunk(
        &mut self,
        position: Point2<i64>,
        storage: &dyn ChunkStorage,
    ) -> Result<(), WorldError> {
        if self.chunks.contains_key(&position) {
            return Ok(());
        }

        let chunk = match storage.load_chunk(self.metadata.id, position)? {
            Some(snapshot) => {
                debug!("Loaded chunk {:?} of world {}", position, self.metadata.id);
                Chunk::from_snapshot(&snapshot, position, &self.registry)?
            }
            None => {
                debug!("Creating chunk {:?} of world {}", position, self.metadata.id);
                let grass = self.registry.construct(BlockType::Grass)?;
                Chunk::filled(position, || grass.clone())
            }
        };
        self.chunks.insert(position, chunk);
        self.flag_facing_edges(position);
        self.refresh_stale();
        Ok(())
    }

    /// Loads every chunk within `radius` chunks of the tile `center`.
    pub fn load_area(
        &mut self,
        center: Point2<i64>,
        radius: i64,
        storage: &dyn ChunkStorage,
    ) -> Result<(), WorldError> {
        let (center_chunk, _) = split_position(center);
        for y in -radius..=radius {
            for x in -radius..=radius {
                self.load_or_create_chunk(center_chunk + Vector2::new(x, y), storage)?;
            }
        }
        Ok(())
    }

    /// Returns the tile at `position`, if its chunk is loaded.
    pub fn block_at(&self, position: Point2<i64>) -> Option<&Block> {
        let (chunk, local) = split_position(position);
        self.chunks.get(&chunk).map(|chunk| chunk.block_at(local))
    }

    /// Places `block` at `position` and refreshes it and its four neighbors.
    ///
    /// # Returns
    /// The tile that was there before.
    ///
    /// # Errors
    /// [`WorldError::ChunkNotLoaded`] if the chunk holding `position` is not in memory.
    pub fn set_block(&mut self, position: Point2<i64>, block: Block) -> Result<Block, WorldError> {
        let (chunk_position, local) = split_position(position);
        let chunk = self
            .chunks
            .get_mut(&chunk_position)
            .ok_or(WorldError::ChunkNotLoaded(chunk_position))?;
        let previous = chunk.set_block(local, block);

        self.refresh_tile(position);
        for side in BlockSide::all() {
            self.refresh_tile(position + side.offset());
        }
        Ok(previous)
    }

    /// Replaces the tile at `position` with an empty one.
    pub fn remove_block(&mut self, position: Point2<i64>) -> Result<Block, WorldError> {
        self.set_block(position, Block::empty())
    }

    /// Recomputes every stale connected tile in the loaded chunks.
    pub fn refresh_stale(&mut self) {
        let stale: Vec<Point2<i64>> = self
            .chunks
            .values()
            .filter(|chunk| chunk.has_stale_tiles())
            .flat_map(|chunk| {
                let origin = chunk.origin();
                chunk
                    .stale_tiles()
                    .into_iter()
                    .map(move |local| {
                        Point2::new(origin.x + local.x as i64, origin.y + local.y as i64)
                    })
            })
            .collect();

        for position in stale {
            self.refresh_tile(position);
        }
    }

    /// Writes every modified chunk and the metadata to `storage`.
    pub fn save(&mut self, storage: &mut dyn ChunkStorage) -> Result<(), WorldError> {
        let mut saved = 0;
        for chunk in self.chunks.values_mut().filter(|chunk| chunk.is_modified()) {
            let snapshot = chunk.snapshot(&self.registry)?;
            storage.save_chunk(self.metadata.id, &snapshot)?;
            chunk.mark_saved();
            saved += 1;
        }
        self.metadata.last_saved = unix_millis();
        storage.save_metadata(&self.metadata)?;

        info!(
            "Saved world `{}` ({}): {} chunks written",
            self.metadata.name, self.metadata.id, saved
        );
        Ok(())
    }

    /// Draws every loaded tile visible on `target`, with the tile `camera` at the centre.
    pub fn render(&self, target: &mut dyn RenderTarget, camera: Point2<f64>) {
        let (width, height) = target.size();
        let tile = TILE_SIZE as f64;
        let half_width = width as f64 / 2.0;
        let half_height = height as f64 / 2.0;

        let min_x = (camera.x - half_width / tile).floor() as i64 - 1;
        let max_x = (camera.x + half_width / tile).ceil() as i64 + 1;
        let min_y = (camera.y - half_height / tile).floor() as i64 - 1;
        let max_y = (camera.y + half_height / tile).ceil() as i64 + 1;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if let Some(block) = self.block_at(Point2::new(x, y)) {
                    let screen = Vector2::new(
                        (x as f64 - camera.x) * tile + half_width,
                        (y as f64 - camera.y) * tile + half_height,
                    );
                    block.render(target, screen);
                }
            }
        }
    }

    /// Recomputes the connected texture of the tile at `position`, if it has one.
    fn refresh_tile(&mut self, position: Point2<i64>) {
        let neighbors = self.neighbors(position);
        let (chunk_position, local) = split_position(position);
        let Some(chunk) = self.chunks.get_mut(&chunk_position) else {
            return;
        };

        if let Some(block) = chunk.connected_at_mut(local) {
            block.update_connections(&neighbors, self.registry.textures());
        }
        chunk.clear_stale(local);
    }

    /// Flags the edge tiles of loaded chunks that face the chunk at `position`.
    fn flag_facing_edges(&mut self, position: Point2<i64>) {
        let last = CHUNK_DIMENSION as usize - 1;
        for side in BlockSide::all() {
            let Some(neighbor) = self.chunks.get_mut(&(position + side.offset())) else {
                continue;
            };
            for i in 0..CHUNK_DIMENSION as usize {
                let local = match side {
                    BlockSide::Left => Vector2::new(last, i),
                    BlockSide::Right => Vector2::new(0, i),
                    BlockSide::Top => Vector2::new(i, last),
                    BlockSide::Bottom => Vector2::new(i, 0),
                };
                neighbor.mark_stale(local);
            }
        }
    }
}

impl NeighborQuery for World {
    fn block_type_at(&self, position: Point2<i64>) -> Option<BlockType> {
        self.block_at(position).map(Block::block_type)
    }
}
