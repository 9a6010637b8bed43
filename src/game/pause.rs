//! The pause screen shown over a game session.
//!
//! Escape or Enter resumes the session. Q leaves it and returns to whatever was suspended
//! behind it, usually the main menu.

use cgmath::Vector2;
use image::Rgba;
use winit::keyboard::KeyCode;

use super::SessionResources;
use crate::engine_state::{
    rendering::RenderTarget,
    scene::{Scene, SceneContext, SceneError},
};

const DIM: Rgba<u8> = Rgba([0, 0, 0, 128]);

pub struct PauseScene {
    resources: SessionResources,
}

impl PauseScene {
    pub fn new(resources: SessionResources) -> Self {
        Self { resources }
    }
}

impl Scene for PauseScene {
    fn update(&mut self, context: &mut SceneContext<'_>) -> Result<(), SceneError> {
        let input = context.input;
        if input.just_pressed(KeyCode::Escape) || input.just_pressed(KeyCode::Enter) {
            context.end_current();
        } else if input.just_pressed(KeyCode::KeyQ) {
            // Once for the pause screen, once for the session resumed behind it.
            context.end_current();
            context.end_current();
        }
        Ok(())
    }

    fn draw(&self, target: &mut dyn RenderTarget) {
        let (width, height) = target.size();
        target.fill_rect(Vector2::new(0.0, 0.0), (width, height), DIM);

        let font = self.resources.textures.font();
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
    use crate::{
        engine_state::scene::TransitionQueue,
        game::test_support::{pressed, resources},
    };

    fn queued_after(keys: &[KeyCode]) -> Vec<String> {
        let mut pause = PauseScene::new(resources());
        let input = pressed(keys);
        let mut transitions = TransitionQueue::new();
        pause
            .update(&mut SceneContext::new(0, &input, &mut transitions))
            .unwrap();
        transitions
            .take()
            .iter()
            .map(|transition| format!("{:?}", transition))
            .collect()
    }

    #[test]
    fn escape_and_enter_resume() {
        assert_eq!(queued_after(&[KeyCode::Escape]), ["EndCurrent"]);
        assert_eq!(queued_after(&[KeyCode::Enter]), ["EndCurrent"]);
    }

    #[test]
    fn quit_leaves_the_session_too() {
        assert_eq!(queued_after(&[KeyCode::KeyQ]), ["EndCurrent", "EndCurrent"]);
    }

    #[test]
    fn other_keys_do_nothing() {
        assert!(queued_after(&[KeyCode::KeyW]).is_empty());
    }
}
