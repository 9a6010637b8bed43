//! The player: a position in tiles and the movement rules around it.

use cgmath::{InnerSpace, Point2, Vector2};

use crate::engine_state::{
    rendering::{RenderTarget, TextureRef, TILE_SIZE},
    voxels::{block::Block, world::World},
};

pub struct Player {
    /// Centre of the player, in tiles. Tile `(x, y)` spans `[x, x + 1) × [y, y + 1)`.
    pub position: Point2<f64>,
    texture: TextureRef,
}

impl Player {
    pub fn new(position: Point2<f64>, texture: TextureRef) -> Self {
        Self { position, texture }
    }

    /// The tile the player stands on.
    pub fn tile(&self) -> Point2<i64> {
        Point2::new(self.position.x.floor() as i64, self.position.y.floor() as i64)
    }

    /// Moves one tick in `direction`, scaled by the speed multiplier of the current tile.
    ///
    /// Tiles that are collidable or not loaded block the move. A blocked diagonal move
    /// still slides along whichever axis is free.
    pub fn step(&mut self, direction: Vector2<f64>, world: &World, base_speed: f64) {
        if direction.magnitude2() == 0.0 {
            return;
        }

        let multiplier = world
            .block_at(self.tile())
            .map_or(1.0, Block::speed_multiplier);
        let delta = direction.normalize() * base_speed * multiplier;

        for candidate in [delta, Vector2::new(delta.x, 0.0), Vector2::new(0.0, delta.y)] {
            if candidate.magnitude2() == 0.0 {
                continue;
            }
            let target = self.position + candidate;
            if Self::is_walkable(world, target) {
                self.position = target;
                return;
            }
        }
    }

    /// Draws the player centred on `camera`, which the world is drawn around too.
    pub fn render(&self, target: &mut dyn RenderTarget, camera: Point2<f64>) {
        let (width, height) = target.size();
        let tile = TILE_SIZE as f64;
        let half_texture =
            Vector2::new(self.texture.width() as f64, self.texture.height() as f64) / 2.0;
        let screen = Vector2::new(
            (self.position.x - camera.x) * tile + width as f64 / 2.0 - half_texture.x,
            (self.position.y - camera.y) * tile + height as f64 / 2.0 - half_texture.y,
        );
        target.draw_texture(&self.texture, screen);
    }

    fn is_walkable(world: &World, position: Point2<f64>) -> bool {
        let tile = Point2::new(position.x.floor() as i64, position.y.floor() as i64);
        world
            .block_at(tile)
            .is_some_and(|block| !block.is_collidable())
    }
}
