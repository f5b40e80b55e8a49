//! The update/render cycle.
//!
//! [`FrameLoop::step`] runs one frame against abstract collaborators: it
//! samples time and input, applies pause/resume and selection, advances the
//! simulation by one tick when running, updates the camera and composes the
//! scene. It is safe to call repeatedly forever; only an exit intent ends it.

use crate::bodies::{BodyDefinition, BodyId, SOLAR_SYSTEM};
use crate::camera::{CameraController, CameraFrame};
use crate::config::SimulationConfig;
use crate::error::BodyTableError;
use crate::input::{InputSource, KeyBindings};
use crate::overlay::{InfoPanel, TextOverlay};
use crate::registry::BodyRegistry;
use crate::scene::{RenderBackend, SceneComposer};
use crate::time::TimeSource;

/// Frame loop state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Paused,
    /// Terminal.
    Exit,
}

/// Whether simulated time advances, and how many ticks it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationClock {
    pub running: bool,
    pub ticks: u64,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self {
            running: true,
            ticks: 0,
        }
    }
}

/// Everything that changes from frame to frame.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub registry: BodyRegistry,
    pub camera: CameraController,
    pub clock: SimulationClock,
    /// Time source reading at the previous step.
    pub last_time: Option<f64>,
}

/// Owns the simulation state and drives one frame per [`step`](Self::step).
#[derive(Debug, Clone)]
pub struct FrameLoop {
    state: SimulationState,
    loop_state: LoopState,
    bindings: KeyBindings,
    composer: SceneComposer,
    panel: InfoPanel,
}

impl FrameLoop {
    /// Build a loop over the built-in solar system.
    pub fn new(config: &SimulationConfig) -> Result<Self, BodyTableError> {
        Self::with_table(&SOLAR_SYSTEM, config)
    }

    /// Build a loop over a custom body table.
    pub fn with_table(table: &[BodyDefinition], config: &SimulationConfig) -> Result<Self, BodyTableError> {
        let registry = BodyRegistry::new(table, config.orbit)?;
        tracing::info!(bodies = registry.len(), "Body registry ready");

        Ok(Self {
            state: SimulationState {
                registry,
                camera: CameraController::new(config.camera),
                clock: SimulationClock::default(),
                last_time: None,
            },
            loop_state: LoopState::Running,
            bindings: config.keys.clone(),
            composer: SceneComposer::new(config),
            panel: InfoPanel::default(),
        })
    }

    /// Run one frame. Returns the state after the frame.
    ///
    /// Once [`LoopState::Exit`] is reached, further calls do nothing.
    pub fn step<I, T, R, O>(&mut self, input: &I, time: &T, backend: &mut R, overlay: &mut O) -> LoopState
    where
        I: InputSource + ?Sized,
        T: TimeSource + ?Sized,
        R: RenderBackend + ?Sized,
        O: TextOverlay + ?Sized,
    {
        if self.loop_state == LoopState::Exit {
            return LoopState::Exit;
        }

        let now = time.elapsed_seconds();
        let dt = match self.state.last_time {
            Some(last) => (now - last) as f32,
            None => 0.0,
        };
        self.state.last_time = Some(now);

        let intents = self.bindings.read(input);

        if intents.exit {
            self.request_exit();
            return LoopState::Exit;
        }

        if intents.pause {
            self.set_running(false);
        } else if intents.resume {
            self.set_running(true);
        }

        let state = &mut self.state;
        if let Some(id) = intents.select {
            if state.camera.select(id, &state.registry) {
                tracing::info!(body = %body_name(&state.registry, id), "Following");
            }
        }
        if intents.deselect && state.camera.deselect() {
            tracing::info!("Free flight");
        }

        if state.clock.running {
            state.registry.advance(1.0);
            state.clock.ticks += 1;
        }

        let frame = state.camera.update(&intents.camera, dt, &state.registry);
        self.render(&frame, backend, overlay);

        self.loop_state
    }

    fn render<R, O>(&self, frame: &CameraFrame, backend: &mut R, overlay: &mut O)
    where
        R: RenderBackend + ?Sized,
        O: TextOverlay + ?Sized,
    {
        let state = &self.state;
        self.composer.compose(frame, &state.registry, backend);

        if let Some(body) = state.camera.target().and_then(|id| state.registry.get(id)) {
            self.panel.draw(&body.definition, overlay);
        }
    }

    fn set_running(&mut self, running: bool) {
        if self.state.clock.running == running {
            return;
        }
        self.state.clock.running = running;
        self.loop_state = if running { LoopState::Running } else { LoopState::Paused };
        tracing::info!(ticks = self.state.clock.ticks, "Simulation {}", if running { "resumed" } else { "paused" });
    }

    /// Enter the terminal state, e.g. when the window is closed.
    pub fn request_exit(&mut self) {
        if self.loop_state != LoopState::Exit {
            tracing::info!("Exit requested");
            self.loop_state = LoopState::Exit;
            self.state.clock.running = false;
        }
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.state.registry
    }

    /// Mutable registry access, used to bind textures after upload.
    pub fn registry_mut(&mut self) -> &mut BodyRegistry {
        &mut self.state.registry
    }

    pub fn camera(&self) -> &CameraController {
        &self.state.camera
    }

    pub fn composer_mut(&mut self) -> &mut SceneComposer {
        &mut self.composer
    }
}

fn body_name(registry: &BodyRegistry, id: BodyId) -> &'static str {
    registry.get(id).map_or("?", |body| body.definition.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;
    use crate::scene::{DrawUniforms, TextureHandle};
    use glam::Vec2;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Keys {
        held: HashSet<KeyCode>,
    }

    impl InputSource for Keys {
        fn is_key_held(&self, key: KeyCode) -> bool {
            self.held.contains(&key)
        }
        fn cursor_delta(&self) -> Vec2 {
            Vec2::ZERO
        }
    }

    struct Clock(f64);

    impl TimeSource for Clock {
        fn elapsed_seconds(&self) -> f64 {
            self.0
        }
    }

    #[derive(Default)]
    struct Counter {
        draws: usize,
        lines: usize,
    }

    impl RenderBackend for Counter {
        fn set_uniforms(&mut self, _: &DrawUniforms) {}
        fn bind_texture(&mut self, _: TextureHandle) {}
        fn draw_sphere(&mut self, _: f32, _: u32, _: u32) {
            self.draws += 1;
        }
    }

    impl TextOverlay for Counter {
        fn draw_text(&mut self, _: &str, _: f32, _: f32, _: f32, _: [f32; 3]) {
            self.lines += 1;
        }
    }

    fn run(frame_loop: &mut FrameLoop, keys: &Keys, t: f64) -> (LoopState, Counter) {
        let mut backend = Counter::default();
        let mut overlay = Counter::default();
        let state = frame_loop.step(keys, &Clock(t), &mut backend, &mut overlay);
        backend.lines = overlay.lines;
        (state, backend)
    }

    #[test]
    fn test_running_step_advances_once() {
        let mut fl = FrameLoop::new(&SimulationConfig::default()).unwrap();
        let (state, counts) = run(&mut fl, &Keys::default(), 0.0);
        assert_eq!(state, LoopState::Running);
        assert_eq!(fl.state().clock.ticks, 1);
        assert_eq!(counts.draws, 11);
        assert_eq!(counts.lines, 0);
    }

    #[test]
    fn test_exit_draws_nothing() {
        let mut fl = FrameLoop::new(&SimulationConfig::default()).unwrap();
        let mut keys = Keys::default();
        keys.held.insert(KeyCode::Escape);
        let (state, counts) = run(&mut fl, &keys, 0.0);
        assert_eq!(state, LoopState::Exit);
        assert_eq!(counts.draws, 0);

        keys.held.clear();
        let (state, counts) = run(&mut fl, &keys, 1.0);
        assert_eq!(state, LoopState::Exit);
        assert_eq!(counts.draws, 0);
        assert_eq!(fl.state().clock.ticks, 0);
    }

    #[test]
    fn test_pause_wins_over_resume() {
        let mut fl = FrameLoop::new(&SimulationConfig::default()).unwrap();
        let mut keys = Keys::default();
        keys.held.insert(KeyCode::P);
        keys.held.insert(KeyCode::R);
        let (state, _) = run(&mut fl, &keys, 0.0);
        assert_eq!(state, LoopState::Paused);
        assert_eq!(fl.state().clock.ticks, 0);

        keys.held.remove(&KeyCode::P);
        let (state, _) = run(&mut fl, &keys, 0.1);
        assert_eq!(state, LoopState::Running);
        assert_eq!(fl.state().clock.ticks, 1);
    }

    #[test]
    fn test_panel_only_while_following() {
        let mut fl = FrameLoop::new(&SimulationConfig::default()).unwrap();
        let mut keys = Keys::default();
        keys.held.insert(KeyCode::Key4);
        let (_, counts) = run(&mut fl, &keys, 0.0);
        assert_eq!(fl.camera().target(), Some(BodyId::MARS));
        assert_eq!(counts.lines, 4);

        keys.held.clear();
        keys.held.insert(KeyCode::F);
        let (_, counts) = run(&mut fl, &keys, 0.1);
        assert_eq!(fl.camera().target(), None);
        assert_eq!(counts.lines, 0);
    }

    #[test]
    fn test_request_exit() {
        let mut fl = FrameLoop::new(&SimulationConfig::default()).unwrap();
        fl.request_exit();
        assert_eq!(fl.loop_state(), LoopState::Exit);
        let (state, counts) = run(&mut fl, &Keys::default(), 0.0);
        assert_eq!(state, LoopState::Exit);
        assert_eq!(counts.draws, 0);
    }
}
