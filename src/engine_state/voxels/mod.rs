//! # Tile World
//!
//! This module contains the tile world: typed blocks, the chunks holding them and the
//! world coordinating chunk loading, placement and persistence.
//!
//! ## Architecture
//!
//! * **Block**: Block types, capability fragments, concrete variants and the registry that
//!   saves and loads them as `(tag, bytes)` pairs
//! * **Chunk**: 16x16 squares of blocks, their snapshots and the storage they are kept in
//! * **World**: Coordinates chunks and keeps connected textures in sync with their neighbors
//!
//! ## Data Flow
//!
//! 1. A scene asks the world for the area around the player
//! 2. The world loads saved chunks through the registry or creates fresh ones
//! 3. Placing or removing a block refreshes the connected textures around it
//! 4. Saving turns modified chunks back into snapshots

pub mod block;
pub mod chunk;
pub mod world;
