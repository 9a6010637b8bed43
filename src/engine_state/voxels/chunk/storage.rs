//! Chunk persistence.
//!
//! Worlds never touch the filesystem themselves; they hand snapshots to a [`ChunkStorage`].
//! Bytes produced by the variant registry are stored and returned verbatim.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use cgmath::Point2;
use log::debug;
use serde::{Deserialize, Serialize};

use super::ChunkSnapshot;
use crate::engine_state::voxels::{block::StableId, world::WorldError};

/// Everything about a world that is not a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldMetadata {
    pub id: StableId,
    pub name: String,
    /// Where the player stood when the world was last saved, in tiles.
    pub player_position: (f64, f64),
    /// Unix time of the last save in milliseconds. Zero for worlds never saved.
    #[serde(default)]
    pub last_saved: u64,
}

/// Where worlds keep their chunks between sessions.
pub trait ChunkStorage {
    fn save_chunk(&mut self, world: StableId, snapshot: &ChunkSnapshot) -> Result<(), WorldError>;

    /// Returns `Ok(None)` if the chunk was never saved.
    fn load_chunk(
        &self,
        world: StableId,
        position: Point2<i64>,
    ) -> Result<Option<ChunkSnapshot>, WorldError>;

    fn save_metadata(&mut self, metadata: &WorldMetadata) -> Result<(), WorldError>;

    /// Returns `Ok(None)` if the world was never saved.
    fn load_metadata(&self, world: StableId) -> Result<Option<WorldMetadata>, WorldError>;

    /// Metadata of every saved world, in no particular order.
    fn list_worlds(&self) -> Result<Vec<WorldMetadata>, WorldError>;
}

/// Keeps everything in memory. Used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryChunkStorage {
    chunks: HashMap<(StableId, (i64, i64)), ChunkSnapshot>,
    metadata: HashMap<StableId, WorldMetadata>,
}

impl MemoryChunkStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks saved across all worlds.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

impl ChunkStorage for MemoryChunkStorage {
    fn save_chunk(&mut self, world: StableId, snapshot: &ChunkSnapshot) -> Result<(), WorldError> {
        self.chunks.insert((world, snapshot.position), snapshot.clone());
        Ok(())
    }

    fn load_chunk(
        &self,
        world: StableId,
        position: Point2<i64>,
    ) -> Result<Option<ChunkSnapshot>, WorldError> {
        Ok(self.chunks.get(&(world, (position.x, position.y))).cloned())
    }

    fn save_metadata(&mut self, metadata: &WorldMetadata) -> Result<(), WorldError> {
        self.metadata.insert(metadata.id, metadata.clone());
        Ok(())
    }

    fn load_metadata(&self, world: StableId) -> Result<Option<WorldMetadata>, WorldError> {
        Ok(self.metadata.get(&world).cloned())
    }

    fn list_worlds(&self) -> Result<Vec<WorldMetadata>, WorldError> {
        Ok(self.metadata.values().cloned().collect())
    }
}

/// Writes one JSON file per chunk under `root/<world id>/`.
///
/// ```text
/// saves/
///   0000...2a/
///     world.json
///     chunk_0_0.json
///     chunk_-1_0.json
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryChunkStorage {
    root: PathBuf,
}

const METADATA_FILE_NAME: &str = "world.json";

impl DirectoryChunkStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn world_dir(&self, world: StableId) -> PathBuf {
        self.root.join(world.to_string())
    }

    fn chunk_path(&self, world: StableId, position: Point2<i64>) -> PathBuf {
        self.world_dir(world)
            .join(format!("chunk_{}_{}.json", position.x, position.y))
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), WorldError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| WorldError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let bytes = serde_json::to_vec(value).map_err(|source| WorldError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, bytes).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn read_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &Path,
    ) -> Result<Option<T>, WorldError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(WorldError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| WorldError::Serialization {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl ChunkStorage for DirectoryChunkStorage {
    fn save_chunk(&mut self, world: StableId, snapshot: &ChunkSnapshot) -> Result<(), WorldError> {
        let position = Point2::new(snapshot.position.0, snapshot.position.1);
        let path = self.chunk_path(world, position);
        debug!("Saving chunk {:?} to {}", snapshot.position, path.display());
        self.write_json(&path, snapshot)
    }

    fn load_chunk(
        &self,
        world: StableId,
        position: Point2<i64>,
    ) -> Result<Option<ChunkSnapshot>, WorldError> {
        self.read_json(&self.chunk_path(world, position))
    }

    fn save_metadata(&mut self, metadata: &WorldMetadata) -> Result<(), WorldError> {
        let path = self.world_dir(metadata.id).join(METADATA_FILE_NAME);
        self.write_json(&path, metadata)
    }

    fn load_metadata(&self, world: StableId) -> Result<Option<WorldMetadata>, WorldError> {
        self.read_json(&self.world_dir(world).join(METADATA_FILE_NAME))
    }

    fn list_worlds(&self) -> Result<Vec<WorldMetadata>, WorldError> {
        let io_error = |source| WorldError::Io {
            path: self.root.clone(),
            source,
        };
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(io_error(source)),
        };

        let mut worlds = Vec::new();
        for entry in entries {
            let path = entry.map_err(io_error)?.path();
            if !path.is_dir() {
                continue;
            }
            match self.read_json(&path.join(METADATA_FILE_NAME))? {
                Some(metadata) => worlds.push(metadata),
                None => debug!("Skipping {}: no {}", path.display(), METADATA_FILE_NAME),
            }
        }
        Ok(worlds)
    }
}
