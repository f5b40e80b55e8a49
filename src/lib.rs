//! # Solarium
//!
//! A real-time 3D solar system viewer: textured spheres moving on Keplerian
//! ellipses, a free-flying camera that can lock onto any body, and a small
//! info panel for the body being followed.
//!
//! ## Quick Start
//!
//! ```ignore
//! use solarium::prelude::*;
//!
//! fn main() -> Result<(), AppError> {
//!     let config = SimulationConfig::new()
//!         .with_speed_factor(4.0)
//!         .with_texture_dir("assets/textures");
//!     solarium::run(config)
//! }
//! ```
//!
//! ## Controls
//!
//! | Key | Action |
//! |-----|--------|
//! | Mouse | Look around |
//! | Arrow keys | Fly (free flight only) |
//! | W / S | Zoom in / out |
//! | 0-9 | Follow a body (0 Sun, 3 Earth, 9 Moon) |
//! | F | Back to free flight |
//! | P / R | Pause / resume (held) |
//! | Escape | Quit |
//!
//! ## Architecture
//!
//! The simulation core never touches winit or wgpu directly. Each frame,
//! [`FrameLoop::step`] reads an [`InputSource`] and a [`TimeSource`],
//! advances the [`BodyRegistry`] by one tick, updates the
//! [`CameraController`] and hands draw calls to a [`RenderBackend`] and text
//! to a [`TextOverlay`]. The window module plugs in the real implementations.
//!
//! ```ignore
//! let mut frame_loop = FrameLoop::new(&SimulationConfig::default())?;
//! loop {
//!     if frame_loop.step(&input, &time, &mut backend, &mut overlay) == LoopState::Exit {
//!         break;
//!     }
//! }
//! ```

pub mod bodies;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
mod gpu;
pub mod input;
pub mod orbit;
pub mod overlay;
pub mod registry;
pub mod scene;
pub mod textures;
pub mod time;
mod window;

pub use bodies::{BodyDefinition, BodyId, OrbitalParameters, PhysicalInfo, SOLAR_SYSTEM};
pub use camera::{CameraController, CameraFrame, CameraInput, CameraMode, FreeFlyPose, MIN_FRAME_DT};
pub use config::{CameraConfig, LightingConfig, OrbitConfig, SimulationConfig, StarfieldConfig, WindowConfig};
pub use error::{AppError, BodyTableError, ConfigError, GpuError, TextureError};
pub use frame::{FrameLoop, LoopState, SimulationClock, SimulationState};
pub use glam::{DVec2, Mat4, Vec2, Vec3};
pub use input::{FrameIntents, Input, InputSource, KeyBindings, KeyCode};
pub use overlay::{InfoPanel, TextOverlay, TitleOverlay};
pub use registry::{Body, BodyRegistry, BodyState};
pub use scene::{DrawUniforms, Material, RenderBackend, SceneComposer, TextureHandle};
pub use time::{Time, TimeSource};
pub use window::run;

/// Convenient imports for building and running the viewer.
pub mod prelude {
    pub use crate::bodies::{BodyId, SOLAR_SYSTEM};
    pub use crate::camera::{CameraController, CameraInput};
    pub use crate::config::SimulationConfig;
    pub use crate::error::AppError;
    pub use crate::frame::{FrameLoop, LoopState};
    pub use crate::input::{InputSource, KeyBindings, KeyCode};
    pub use crate::overlay::TextOverlay;
    pub use crate::registry::BodyRegistry;
    pub use crate::scene::{DrawUniforms, RenderBackend, TextureHandle};
    pub use crate::time::TimeSource;
    pub use crate::{Vec2, Vec3};
}
