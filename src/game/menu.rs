//! The title screen. Enter starts a new world, C continues the most recently saved one
//! and Escape quits.

use cgmath::Vector2;
use image::Rgba;
use log::info;
use winit::keyboard::KeyCode;

use super::{session::GameScene, SessionResources};
use crate::engine_state::{
    rendering::RenderTarget,
    scene::{Scene, SceneContext, SceneError},
    voxels::{
        chunk::storage::WorldMetadata,
        world::{World, WorldError},
    },
};

const BACKGROUND: Rgba<u8> = Rgba([24, 48, 32, 255]);
const NEW_WORLD_NAME: &str = "world";

pub struct MainMenuScene {
    resources: SessionResources,
}

impl MainMenuScene {
    pub fn new(resources: SessionResources) -> Self {
        Self { resources }
    }

    fn most_recent_world(&self) -> Result<Option<WorldMetadata>, WorldError> {
        let worlds = self.resources.storage.get().list_worlds()?;
        Ok(worlds.into_iter().max_by_key(|world| (world.last_saved, world.id)))
    }

    /// Reopens the most recently saved world, or returns `Ok(None)` if nothing was saved.
    fn continue_session(&self) -> Result<Option<GameScene>, WorldError> {
        let Some(metadata) = self.most_recent_world()? else {
            return Ok(None);
        };
        let registry = self.resources.registry.clone();
        let world = World::load(metadata.id, registry, &**self.resources.storage.get())?;
        world
            .map(|world| GameScene::new(world, self.resources.clone()))
            .transpose()
    }
}

impl Scene for MainMenuScene {
    fn update(&mut self, context: &mut SceneContext<'_>) -> Result<(), SceneError> {
        if context.input.just_pressed(KeyCode::Escape) {
            return Err(SceneError::ExitRequested);
        }

        if context.input.just_pressed(KeyCode::Enter) {
            info!("Starting a new world from the main menu");
            let game = GameScene::create_world(NEW_WORLD_NAME, self.resources.clone())?;
            context.switch_and_suspend_current(Box::new(game));
        } else if context.input.just_pressed(KeyCode::KeyC) {
            match self.continue_session()? {
                Some(game) => context.switch_and_suspend_current(Box::new(game)),
                None => info!("No saved world to continue"),
            }
        }
        Ok(())
    }

    fn draw(&self, target: &mut dyn RenderTarget) {
        target.clear(BACKGROUND);
        let font = self.resources.textures.font();
        let (width, height) = target.size();
        let position = Vector2::new(
            (width as f64 - font.width() as f64) / 2.0,
            (height as f64 - font.height() as f64) / 2.0,
        );
        target.draw_texture(font, position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Point2;

    use crate::{
        engine_state::{rendering::Canvas, scene::TransitionQueue, voxels::block::StableId},
        game::test_support::{pressed, resources},
    };

    #[test]
    fn escape_requests_exit() {
        let mut menu = MainMenuScene::new(resources());
        let input = pressed(&[KeyCode::Escape]);
        let mut transitions = TransitionQueue::new();
        let result = menu.update(&mut SceneContext::new(0, &input, &mut transitions));

        assert!(matches!(result, Err(SceneError::ExitRequested)));
        assert!(transitions.is_empty());
    }

    #[test]
    fn enter_starts_a_new_world() {
        let resources = resources();
        let mut menu = MainMenuScene::new(resources.clone());
        let input = pressed(&[KeyCode::Enter]);
        let mut transitions = TransitionQueue::new();
        menu.update(&mut SceneContext::new(0, &input, &mut transitions))
            .unwrap();

        let queued = transitions.take();
        assert_eq!(queued.len(), 1);
        assert_eq!(format!("{:?}", queued[0]), "SwitchAndSuspendCurrent(GameScene)");
    }

    fn saved_world(id: u128, last_saved: u64, player_position: (f64, f64)) -> WorldMetadata {
        WorldMetadata {
            id: StableId::from_u128(id),
            name: format!("world {}", id),
            player_position,
            last_saved,
        }
    }

    #[test]
    fn continue_without_saves_stays_on_the_menu() {
        let mut menu = MainMenuScene::new(resources());
        let input = pressed(&[KeyCode::KeyC]);
        let mut transitions = TransitionQueue::new();
        menu.update(&mut SceneContext::new(0, &input, &mut transitions))
            .unwrap();
        assert!(transitions.is_empty());
    }

    #[test]
    fn continue_resumes_the_most_recent_world() {
        let resources = resources();
        {
            let mut storage = resources.storage_mut();
            storage.save_metadata(&saved_world(1, 10, (0.5, 0.5))).unwrap();
            storage.save_metadata(&saved_world(2, 20, (3.5, -4.5))).unwrap();
        }
        let menu = MainMenuScene::new(resources.clone());

        let game = menu.continue_session().unwrap().unwrap();
        assert_eq!(game.world().id(), StableId::from_u128(2));
        assert_eq!(game.world().name(), "world 2");
        assert_eq!(game.player().position, Point2::new(3.5, -4.5));

        // Resuming saves the world again, making it the most recent one for good.
        let storage = resources.storage.get();
        let untouched = storage.load_metadata(StableId::from_u128(1)).unwrap().unwrap();
        assert_eq!(untouched.last_saved, 10);
        let resumed = storage.load_metadata(StableId::from_u128(2)).unwrap().unwrap();
        assert!(resumed.last_saved > 20);
    }

    #[test]
    fn saved_session_is_resumed_by_a_new_menu() {
        let resources = resources();
        let mut previous = GameScene::create_world("meadow", resources.clone()).unwrap();
        let walk = pressed(&[KeyCode::KeyD]);
        let mut transitions = TransitionQueue::new();
        previous
            .update(&mut SceneContext::new(1, &walk, &mut transitions))
            .unwrap();
        previous.save().unwrap();
        let world_id = previous.world().id();
        drop(previous);

        let mut menu = MainMenuScene::new(resources);
        let resumed = menu.continue_session().unwrap().unwrap();
        assert_eq!(resumed.world().id(), world_id);
        assert_eq!(resumed.world().name(), "meadow");
        assert_eq!(resumed.player().position, Point2::new(0.75, 0.5));

        let input = pressed(&[KeyCode::KeyC]);
        menu.update(&mut SceneContext::new(0, &input, &mut transitions))
            .unwrap();
        let queued = transitions.take();
        assert_eq!(queued.len(), 1);
        assert_eq!(format!("{:?}", queued[0]), "SwitchAndSuspendCurrent(GameScene)");
    }

    #[test]
    fn idle_menu_does_nothing() {
        let mut menu = MainMenuScene::new(resources());
        let input = pressed(&[]);
        let mut transitions = TransitionQueue::new();
        menu.update(&mut SceneContext::new(0, &input, &mut transitions))
            .unwrap();
        assert!(transitions.is_empty());

        let mut canvas = Canvas::new(64, 64);
        menu.draw(&mut canvas);
        assert_eq!(canvas.image().get_pixel(0, 0), &BACKGROUND);
    }
}
