//! # Block Side Module
//!
//! This module defines the four cardinal sides of a tile and the neighbor snapshot that
//! connected blocks compute their adjacency from.

use cgmath::Vector2;

use super::block_type::BlockType;
use crate::engine_state::rendering::ConnectedSides;

/// One of the four cardinal sides of a tile.
///
/// Screen coordinates grow rightwards and downwards, so `Top` is `y - 1`.
/// The order is: [LEFT, RIGHT, TOP, BOTTOM], matching [`ConnectedSides`].
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    Left = 0,
    Right = 1,
    Top = 2,
    Bottom = 3,
}

impl BlockSide {
    /// Returns all four sides in a consistent order.
    pub fn all() -> [BlockSide; 4] {
        [
            BlockSide::Left,
            BlockSide::Right,
            BlockSide::Top,
            BlockSide::Bottom,
        ]
    }

    /// Offset from a tile to its neighbor on this side.
    pub fn offset(self) -> Vector2<i64> {
        match self {
            BlockSide::Left => Vector2::new(-1, 0),
            BlockSide::Right => Vector2::new(1, 0),
            BlockSide::Top => Vector2::new(0, -1),
            BlockSide::Bottom => Vector2::new(0, 1),
        }
    }

    /// The side facing back at this one from the neighbor.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::Left => BlockSide::Right,
            BlockSide::Right => BlockSide::Left,
            BlockSide::Top => BlockSide::Bottom,
            BlockSide::Bottom => BlockSide::Top,
        }
    }
}

/// The block types found on the four sides of a tile, `None` where nothing is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Neighbors {
    types: [Option<BlockType>; 4],
}

impl Neighbors {
    /// Builds a snapshot by asking `lookup` for each side.
    pub fn from_fn(mut lookup: impl FnMut(BlockSide) -> Option<BlockType>) -> Self {
        let mut types = [None; 4];
        for side in BlockSide::all() {
            types[side as usize] = lookup(side);
        }
        Self { types }
    }

    /// The neighbor on `side`.
    pub fn get(&self, side: BlockSide) -> Option<BlockType> {
        self.types[side as usize]
    }

    /// Which sides hold a neighbor whose type is in `connects_to`.
    pub fn connected_sides(&self, connects_to: &[BlockType]) -> ConnectedSides {
        let connects = |side: BlockSide| {
            self.get(side)
                .is_some_and(|neighbor| connects_to.contains(&neighbor))
        };

        ConnectedSides {
            left: connects(BlockSide::Left),
            right: connects(BlockSide::Right),
            top: connects(BlockSide::Top),
            bottom: connects(BlockSide::Bottom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_sides_cancel_out() {
        for side in BlockSide::all() {
            assert_eq!(side.offset() + side.opposite().offset(), Vector2::new(0, 0));
            assert_eq!(side.opposite().opposite(), side);
        }
    }

    #[test]
    fn connected_sides_only_count_listed_types() {
        let neighbors = Neighbors::from_fn(|side| match side {
            BlockSide::Left => Some(BlockType::Water),
            BlockSide::Right => Some(BlockType::Grass),
            BlockSide::Top => None,
            BlockSide::Bottom => Some(BlockType::Water),
        });

        assert_eq!(
            neighbors.connected_sides(&[BlockType::Water]),
            ConnectedSides::new(true, false, false, true)
        );
        assert_eq!(
            neighbors.connected_sides(&[BlockType::Water, BlockType::Grass]),
            ConnectedSides::new(true, true, false, true)
        );
        assert_eq!(neighbors.connected_sides(&[]), ConnectedSides::NONE);
    }
}
