//! Free-fly camera with a body-follow mode.
//!
//! In free flight the mouse turns the camera and the movement keys fly it
//! along its own axes. Selecting a body switches to follow mode: the camera is
//! pinned at a fixed offset from that body every frame while the mouse keeps
//! steering the view. Deselecting puts the camera back exactly where it was
//! before the first selection.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec2, Vec3};

use crate::bodies::BodyId;
use crate::config::CameraConfig;
use crate::registry::BodyRegistry;

/// Smallest frame delta in seconds. Non-positive or non-finite deltas are
/// replaced with this.
pub const MIN_FRAME_DT: f32 = 1e-4;

/// Upper bound on the field of view when zoomed far out.
pub const MAX_FOV_DEGREES: f32 = 179.0;

/// Camera-related input for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    /// Cursor movement in pixels since the previous frame.
    pub look: Vec2,
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
}

/// Position and orientation of the camera in free flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeFlyPose {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMode {
    FreeFly,
    Follow {
        target: BodyId,
        /// Pose restored when follow mode ends.
        resume: FreeFlyPose,
    },
}

/// Matrices and vectors produced by one camera update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
    pub forward: Vec3,
}

/// Two-mode camera driven by [`CameraInput`].
#[derive(Debug, Clone)]
pub struct CameraController {
    config: CameraConfig,
    position: Vec3,
    /// Horizontal angle in radians; π faces -Z.
    yaw: f32,
    /// Vertical angle in radians.
    pitch: f32,
    zoom: f32,
    mode: CameraMode,
}

impl CameraController {
    /// Create a free-flying camera at the configured start pose, zoom 1
    /// (or `zoom_min` if that is larger).
    pub fn new(config: CameraConfig) -> Self {
        Self {
            position: config.start_position(),
            yaw: config.yaw,
            pitch: config.pitch,
            zoom: 1.0f32.max(config.zoom_min),
            mode: CameraMode::FreeFly,
            config,
        }
    }

    /// Integrate one frame of input and build the view and projection.
    ///
    /// `dt` is the frame delta in seconds; it only scales free-fly movement.
    pub fn update(&mut self, input: &CameraInput, dt: f32, registry: &BodyRegistry) -> CameraFrame {
        let dt = clamp_dt(dt);
        let cfg = self.config;

        self.yaw -= cfg.mouse_speed * input.look.x;
        self.pitch -= cfg.mouse_speed * input.look.y;

        if input.zoom_in {
            self.zoom += cfg.zoom_step;
        }
        if input.zoom_out {
            self.zoom -= cfg.zoom_step;
        }
        self.zoom = self.zoom.max(cfg.zoom_min);

        let forward = self.direction();
        let right = self.right();

        match self.mode {
            CameraMode::FreeFly => {
                let step = cfg.speed * dt;
                if input.forward {
                    self.position += forward * step;
                }
                if input.backward {
                    self.position -= forward * step;
                }
                if input.right {
                    self.position += right * step;
                }
                if input.left {
                    self.position -= right * step;
                }
            }
            CameraMode::Follow { target, .. } => {
                if let Some(anchor) = self.follow_anchor(target, registry) {
                    self.position = anchor;
                }
            }
        }

        let up = right.cross(forward);
        CameraFrame {
            view: Mat4::look_at_rh(self.position, self.position + forward, up),
            projection: Mat4::perspective_rh(self.fov(), cfg.aspect, cfg.near, cfg.far),
            position: self.position,
            forward,
        }
    }

    /// Start (or retarget) follow mode. Unknown ids are ignored.
    ///
    /// The camera snaps to the new target immediately. When already following,
    /// the pose saved on the first selection is kept.
    pub fn select(&mut self, id: BodyId, registry: &BodyRegistry) -> bool {
        let Some(anchor) = self.follow_anchor(id, registry) else {
            return false;
        };

        let resume = match self.mode {
            CameraMode::FreeFly => self.pose(),
            CameraMode::Follow { target, resume } => {
                if target == id {
                    return false;
                }
                resume
            }
        };

        self.mode = CameraMode::Follow { target: id, resume };
        self.position = anchor;
        true
    }

    /// Leave follow mode and restore the saved free-fly pose.
    pub fn deselect(&mut self) -> bool {
        match self.mode {
            CameraMode::FreeFly => false,
            CameraMode::Follow { resume, .. } => {
                self.position = resume.position;
                self.yaw = resume.yaw;
                self.pitch = resume.pitch;
                self.mode = CameraMode::FreeFly;
                true
            }
        }
    }

    fn follow_anchor(&self, id: BodyId, registry: &BodyRegistry) -> Option<Vec3> {
        let body = registry.get(id)?;
        let radius = body.definition.orbit.visual_radius;
        let offset = Vec3::new(
            0.0,
            radius * self.config.follow_height,
            radius * self.config.follow_distance,
        );
        Some(body.world_position() + offset)
    }

    /// Unit view direction from yaw and pitch.
    pub fn direction(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        )
    }

    /// Horizontal right vector.
    pub fn right(&self) -> Vec3 {
        Vec3::new((self.yaw - FRAC_PI_2).sin(), 0.0, (self.yaw - FRAC_PI_2).cos())
    }

    /// Vertical field of view in radians: base fov divided by zoom.
    pub fn fov(&self) -> f32 {
        (self.config.base_fov_degrees / self.zoom)
            .min(MAX_FOV_DEGREES)
            .to_radians()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn pose(&self) -> FreeFlyPose {
        FreeFlyPose {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Followed body, if any.
    pub fn target(&self) -> Option<BodyId> {
        match self.mode {
            CameraMode::FreeFly => None,
            CameraMode::Follow { target, .. } => Some(target),
        }
    }
}

#[inline]
fn clamp_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.max(MIN_FRAME_DT)
    } else {
        MIN_FRAME_DT
    }
}
