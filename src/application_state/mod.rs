//! # Application State Management
//!
//! This module handles the application's state management, including:
//! - Window creation
//! - Input handling
//! - Fixed-rate ticking of the engine
//! - Application lifecycle events

pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use input_manager::InputManager;
use log::{error, info};
use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow},
    window::{Window, WindowId},
};

use crate::{
    config::EngineConfig,
    engine_state::{scene::TickControl, EngineError, EngineState},
};

/// Schedules ticks at a fixed rate.
///
/// When the loop falls behind, missed ticks are dropped instead of being run back to back.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    interval: Duration,
    next_tick: Instant,
}

impl TickClock {
    /// Creates a clock whose first tick is due at `start`.
    pub fn new(ticks_per_second: u32, start: Instant) -> Self {
        Self {
            interval: Duration::from_secs(1) / ticks_per_second.max(1),
            next_tick: start,
        }
    }

    /// Returns whether a tick is due at `now`, and schedules the next one if so.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_tick {
            return false;
        }
        self.next_tick += self.interval;
        if self.next_tick <= now {
            self.next_tick = now + self.interval;
        }
        true
    }

    /// When the next tick is due.
    pub fn next_tick(&self) -> Instant {
        self.next_tick
    }
}

/// The main application state container that manages the application's lifecycle.
///
/// This struct owns the engine, the window and the input manager. It implements
/// `ApplicationHandler` to react to window events and to tick the engine.
pub struct ApplicationState {
    /// The core engine state and logic
    pub engine_state: EngineState,

    /// Handle to the application window, created on the first resume
    pub window: Option<Arc<Window>>,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    clock: TickClock,
    window_title: String,
    window_size: LogicalSize<u32>,
    error: Option<EngineError>,
}

impl ApplicationState {
    /// Wraps `engine_state`, which should already hold the first scene.
    pub fn new(engine_state: EngineState, config: &EngineConfig) -> Self {
        Self {
            engine_state,
            window: None,
            input_manager: InputManager::new(),
            clock: TickClock::new(config.ticks_per_second, Instant::now()),
            window_title: config.window_title.clone(),
            window_size: LogicalSize::new(config.window_width, config.window_height),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<EngineError> {
        self.error.take()
    }

    /// Tears the scenes down and leaves the event loop.
    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        info!("Shutting down");
        self.engine_state.shutdown();
        event_loop.exit();
    }
}

impl ApplicationHandler for ApplicationState {
    /// Creates the window the first time the application is resumed.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = Window::default_attributes()
            .with_title(self.window_title.clone())
            .with_inner_size(self.window_size);
        match event_loop.create_window(attributes) {
            Ok(window) => {
                let size = window.inner_size();
                self.engine_state.resize(size.width, size.height);
                self.window = Some(Arc::new(window));
                info!("Window created ({}x{})", size.width, size.height);
            }
            Err(os_error) => {
                error!("Failed to create the window: {}", os_error);
                self.error = Some(EngineError::Window(os_error));
                self.shut_down(event_loop);
            }
        }
    }

    /// Handles window-related events such as resize, focus changes, and input events.
    ///
    /// # Arguments
    /// * `event_loop` - Reference to the active event loop
    /// * `_window_id` - ID of the window that generated the event
    /// * `event` - The window event to process
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                self.engine_state.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                self.engine_state.render();
            }
            WindowEvent::CloseRequested => self.shut_down(event_loop),
            _ => (),
        }
    }

    /// Ticks the engine when a tick is due and sleeps until the next one.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.clock.poll(Instant::now()) {
            let input = self.input_manager.get_and_reset_processed_input();
            if self.engine_state.tick(&input) == TickControl::Exit {
                self.shut_down(event_loop);
                return;
            }
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }

        event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.next_tick()));
    }
}
