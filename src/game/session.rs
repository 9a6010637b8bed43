//! # Gameplay Scene
//!
//! Walks the player around a world, keeps the chunks around them loaded and saves the
//! world when pausing, every `autosave_interval_ticks` ticks and on teardown.

use cgmath::{Point2, Vector2};
use image::Rgba;
use log::{error, info};
use winit::keyboard::KeyCode;

use super::{pause::PauseScene, player::Player, SessionResources};
use crate::engine_state::{
    rendering::RenderTarget,
    scene::{Scene, SceneContext, SceneError},
    voxels::{
        block::{Block, CaveEntranceBlock, StableId},
        world::{World, WorldError},
    },
};

/// Chunks kept loaded in every direction around the player's chunk.
const LOAD_RADIUS: i64 = 1;
/// Offset from the arrival point at which the way back is placed in a fresh cave.
const CAVE_EXIT_OFFSET: Vector2<i64> = Vector2::new(2, 0);
const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

pub struct GameScene {
    world: World,
    player: Player,
    resources: SessionResources,
}

impl GameScene {
    /// Starts a session in `world`, placing the player where they last stood in it.
    ///
    /// The world is saved right away so it exists in storage from the first tick.
    pub fn new(world: World, resources: SessionResources) -> Result<Self, WorldError> {
        let player = Player::new(world.player_position(), resources.textures.texture("player"));
        let mut scene = Self {
            world,
            player,
            resources,
        };
        scene.load_around_player()?;
        scene.save()?;
        info!("Started a session in world `{}` ({})", scene.world.name(), scene.world.id());
        Ok(scene)
    }

    /// Starts a session in a brand new world.
    pub fn create_world(name: &str, resources: SessionResources) -> Result<Self, WorldError> {
        let world = World::new(StableId::generate(), name, resources.registry.clone());
        Self::new(world, resources)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Writes the world and the player's position to storage.
    pub fn save(&mut self) -> Result<(), WorldError> {
        self.world.set_player_position(self.player.position);
        let mut storage = self.resources.storage_mut();
        self.world.save(&mut **storage)
    }

    fn load_around_player(&mut self) -> Result<(), WorldError> {
        let storage = self.resources.storage.get();
        self.world
            .load_area(self.player.tile(), LOAD_RADIUS, &**storage)
    }

    fn movement(context: &SceneContext<'_>) -> Vector2<f64> {
        let axis = |negative, positive| {
            let mut value = 0.0;
            if context.input.is_down(negative) {
                value -= 1.0;
            }
            if context.input.is_down(positive) {
                value += 1.0;
            }
            value
        };
        Vector2::new(axis(KeyCode::KeyA, KeyCode::KeyD), axis(KeyCode::KeyW, KeyCode::KeyS))
    }

    /// Travels through the cave entrance leading to `destination`.
    ///
    /// A world visited for the first time gets an entrance back to the current world next
    /// to the arrival point.
    fn enter_cave(&mut self, destination: StableId) -> Result<(), WorldError> {
        self.save()?;

        let registry = self.resources.registry.clone();
        let existing = World::load(destination, registry.clone(), &**self.resources.storage.get())?;
        let is_new = existing.is_none();
        let mut world = match existing {
            Some(world) => world,
            None => World::new(destination, format!("{} cave", self.world.name()), registry),
        };

        info!(
            "Entering world `{}` ({}) from ({})",
            world.name(),
            world.id(),
            self.world.id()
        );

        self.player.position = world.player_position();
        world.load_area(self.player.tile(), LOAD_RADIUS, &**self.resources.storage.get())?;
        if is_new {
            let exit = CaveEntranceBlock::leading_to(self.world.id(), &self.resources.textures);
            world.set_block(self.player.tile() + CAVE_EXIT_OFFSET, Block::CaveEntrance(exit))?;
        }

        self.world = world;
        self.save()
    }
}

impl Scene for GameScene {
    fn update(&mut self, context: &mut SceneContext<'_>) -> Result<(), SceneError> {
        if context.input.just_pressed(KeyCode::Escape) {
            self.save()?;
            context.switch_and_suspend_current(Box::new(PauseScene::new(self.resources.clone())));
            return Ok(());
        }

        let direction = Self::movement(context);
        self.player
            .step(direction, &self.world, self.resources.config.player_speed);
        self.load_around_player()?;

        if context.input.just_pressed(KeyCode::KeyC) {
            let destination = self
                .world
                .block_at(self.player.tile())
                .and_then(Block::as_identified)
                .map(|entrance| entrance.stable_id());
            if let Some(destination) = destination {
                self.enter_cave(destination)?;
            }
        }

        if context.tick % self.resources.config.autosave_interval_ticks == 0 {
            self.save()?;
        }
        Ok(())
    }

    fn draw(&self, target: &mut dyn RenderTarget) {
        target.clear(BACKGROUND);
        self.world.render(target, self.player.position);
        self.player.render(target, self.player.position);
    }

    fn destroy(&mut self) {
        if let Err(error) = self.save() {
            error!("Failed to save world `{}` on exit: {}", self.world.name(), error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine_state::{
            scene::TransitionQueue,
            voxels::{block::BlockType, world::NeighborQuery},
        },
        game::test_support::{pressed, resources},
    };

    fn update(scene: &mut GameScene, tick: u64, keys: &[KeyCode]) -> TransitionQueue {
        let input = pressed(keys);
        let mut transitions = TransitionQueue::new();
        let mut context = SceneContext::new(tick, &input, &mut transitions);
        scene.update(&mut context).unwrap();
        transitions
    }

    fn saved_position(scene: &GameScene) -> Option<(f64, f64)> {
        scene
            .resources
            .storage
            .get()
            .load_metadata(scene.world.id())
            .unwrap()
            .map(|metadata| metadata.player_position)
    }

    #[test]
    fn new_session_is_saved_immediately() {
        let scene = GameScene::create_world("meadow", resources()).unwrap();
        assert_eq!(saved_position(&scene), Some((0.5, 0.5)));
        assert_eq!(scene.world().loaded_chunk_count(), 9);
    }

    #[test]
    fn movement_follows_wasd() {
        let mut scene = GameScene::create_world("meadow", resources()).unwrap();
        update(&mut scene, 1, &[KeyCode::KeyD, KeyCode::KeyS]);

        let position = scene.player().position;
        assert!(position.x > 0.5);
        assert!(position.y > 0.5);
    }

    #[test]
    fn escape_saves_and_pauses() {
        let mut scene = GameScene::create_world("meadow", resources()).unwrap();
        update(&mut scene, 1, &[KeyCode::KeyD]);
        let queued = update(&mut scene, 2, &[KeyCode::Escape]);

        assert_eq!(queued.len(), 1);
        assert_eq!(saved_position(&scene), Some((0.75, 0.5)));
    }

    #[test]
    fn autosave_runs_on_the_interval() {
        let mut scene = GameScene::create_world("meadow", resources()).unwrap();
        update(&mut scene, 1, &[KeyCode::KeyD]);
        assert_eq!(saved_position(&scene), Some((0.5, 0.5)));

        update(&mut scene, 100, &[]);
        assert_eq!(saved_position(&scene), Some((0.75, 0.5)));
    }

    #[test]
    fn cave_entrance_leads_to_a_new_world_and_back() {
        let mut scene = GameScene::create_world("meadow", resources()).unwrap();
        let overworld = scene.world().id();
        let cave_id = StableId::from_u128(0xcafe);
        let entrance = CaveEntranceBlock::leading_to(cave_id, &scene.resources.textures);
        scene
            .world
            .set_block(Point2::new(0, 0), Block::CaveEntrance(entrance))
            .unwrap();

        update(&mut scene, 1, &[KeyCode::KeyC]);
        assert_eq!(scene.world().id(), cave_id);
        assert_eq!(scene.world().name(), "meadow cave");

        let exit = scene
            .world()
            .block_at(Point2::new(2, 0))
            .and_then(Block::as_identified)
            .map(|block| block.stable_id());
        assert_eq!(exit, Some(overworld));
        assert_eq!(scene.world().block_type_at(Point2::new(0, 0)), Some(BlockType::Grass));

        // Walk onto the exit and take it back.
        scene.player.position = Point2::new(2.5, 0.5);
        update(&mut scene, 2, &[KeyCode::KeyC]);
        assert_eq!(scene.world().id(), overworld);
        assert_eq!(scene.player().position, Point2::new(0.5, 0.5));
        assert_eq!(scene.world().block_type_at(Point2::new(0, 0)), Some(BlockType::CaveEntrance));
    }

    #[test]
    fn teardown_saves() {
        let mut scene = GameScene::create_world("meadow", resources()).unwrap();
        update(&mut scene, 1, &[KeyCode::KeyS]);
        scene.destroy();
        assert_eq!(saved_position(&scene), Some((0.5, 0.75)));
    }
}
