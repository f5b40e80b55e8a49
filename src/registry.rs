//! Mutable per-body simulation state.
//!
//! The registry is an arena: bodies live in table order and refer to their
//! parent by [`BodyId`]. One call to [`BodyRegistry::advance`] is one tick.

use std::f64::consts::TAU;

use glam::{DVec2, Vec3};

use crate::bodies::{self, BodyDefinition, BodyId};
use crate::config::OrbitConfig;
use crate::error::BodyTableError;
use crate::orbit;
use crate::scene::TextureHandle;

/// Simulation state of a single body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    /// Accumulated orbital angle in radians. Never wrapped.
    pub orbital_angle: f64,
    /// Accumulated self-rotation angle in radians. Never wrapped.
    pub rotation_angle: f64,
    /// Orbital-plane position relative to the parent (or the Sun).
    pub local_position: DVec2,
    /// Orbital-plane position relative to the Sun.
    pub world_position: DVec2,
}

impl BodyState {
    fn at_rest() -> Self {
        Self {
            orbital_angle: 0.0,
            rotation_angle: 0.0,
            local_position: DVec2::ZERO,
            world_position: DVec2::ZERO,
        }
    }
}

/// A registered body: its fixed definition, live state and bound texture.
#[derive(Debug, Clone)]
pub struct Body {
    pub definition: BodyDefinition,
    pub state: BodyState,
    pub texture: TextureHandle,
}

impl Body {
    #[inline]
    pub fn id(&self) -> BodyId {
        self.definition.id
    }

    /// Current position in world space.
    #[inline]
    pub fn world_position(&self) -> Vec3 {
        orbit::to_world(self.state.world_position)
    }
}

/// Owner of every body's simulation state.
#[derive(Debug, Clone)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
    settings: OrbitConfig,
}

impl BodyRegistry {
    /// Build a registry from a body table.
    ///
    /// The table is validated first. Every body starts with zero angles, and
    /// positions are computed right away so a paused start already shows each
    /// body on its orbit.
    pub fn new(table: &[BodyDefinition], settings: OrbitConfig) -> Result<Self, BodyTableError> {
        bodies::validate(table)?;

        let bodies = table
            .iter()
            .map(|definition| Body {
                definition: *definition,
                state: BodyState::at_rest(),
                texture: TextureHandle::default(),
            })
            .collect();

        let mut registry = Self {
            bodies,
            settings,
        };
        registry.resolve_positions();
        Ok(registry)
    }

    /// Advance every body by `dt_ticks` ticks.
    ///
    /// Orbital angle grows by `(2π / period) · speed_factor` per tick and the
    /// self-rotation by `rotation_rate · rotation_scale`. Children read their
    /// parent's position from this same pass. Negative or non-finite
    /// `dt_ticks` is ignored, so angles never decrease.
    pub fn advance(&mut self, dt_ticks: f64) {
        if !(dt_ticks.is_finite() && dt_ticks > 0.0) {
            tracing::debug!(dt_ticks, "Ignoring non-positive tick step");
            return;
        }

        let speed = self.settings.speed_factor;
        let rotation_scale = self.settings.rotation_scale;

        for body in &mut self.bodies {
            let orbit = &body.definition.orbit;
            body.state.orbital_angle += (TAU / orbit.period_days) * speed * dt_ticks;
            body.state.rotation_angle += orbit.rotation_rate * rotation_scale * dt_ticks;
        }

        self.resolve_positions();
    }

    /// Recompute local and world positions from the current angles.
    fn resolve_positions(&mut self) {
        let scale = self.settings.orbit_scale;

        for i in 0..self.bodies.len() {
            let body = &self.bodies[i];
            let theta = body.state.orbital_angle;
            let r = orbit::scaled_radius(theta, &body.definition.orbit, scale);
            let local = orbit::position(theta, r);

            // Parents precede children (validated), so this is already current.
            let origin = match body.definition.parent {
                Some(parent) => self.bodies[parent.index()].state.world_position,
                None => DVec2::ZERO,
            };

            let state = &mut self.bodies[i].state;
            state.local_position = local;
            state.world_position = origin + local;
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Look up a body. Unknown ids yield `None`.
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.index())
    }

    /// World position of a body, if it exists.
    pub fn world_position(&self, id: BodyId) -> Option<Vec3> {
        self.get(id).map(Body::world_position)
    }

    /// Bodies in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    /// Attach a texture to a body. Returns `false` for unknown ids.
    pub fn set_texture(&mut self, id: BodyId, texture: TextureHandle) -> bool {
        match self.bodies.get_mut(id.index()) {
            Some(body) => {
                body.texture = texture;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::SOLAR_SYSTEM;

    fn registry() -> BodyRegistry {
        BodyRegistry::new(&SOLAR_SYSTEM, OrbitConfig::default()).unwrap()
    }

    #[test]
    fn test_earth_step() {
        let mut reg = registry();
        let step = (TAU / 365.25) * 10.0;

        let before = reg.get(BodyId::EARTH).unwrap().state.orbital_angle;
        reg.advance(1.0);
        let after = reg.get(BodyId::EARTH).unwrap().state.orbital_angle;
        assert!((after - before - step).abs() < 1e-12);

        let mut last = after;
        for _ in 0..1_000 {
            reg.advance(1.0);
            let theta = reg.get(BodyId::EARTH).unwrap().state.orbital_angle;
            assert!(theta > last);
            last = theta;
        }
        assert!((last - 1001.0 * step).abs() < 1e-9);
    }

    #[test]
    fn test_angles_never_wrap() {
        let mut reg = registry();
        for _ in 0..500 {
            reg.advance(1.0);
        }
        // Mercury has gone around many times; the angle keeps growing past 2π.
        let mercury = reg.get(BodyId::MERCURY).unwrap();
        assert!(mercury.state.orbital_angle > 10.0 * TAU);
    }

    #[test]
    fn test_initial_positions_are_resolved() {
        let reg = registry();
        let earth = reg.get(BodyId::EARTH).unwrap();
        let expected = 30.0 * crate::orbit::radius(0.0, 0.017, 1.0);
        assert!(earth.state.world_position.x.abs() < 1e-12);
        assert!((earth.state.world_position.y - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sun_stays_at_origin() {
        let mut reg = registry();
        for _ in 0..100 {
            reg.advance(1.0);
        }
        assert_eq!(reg.world_position(BodyId::SUN), Some(Vec3::ZERO));
    }

    #[test]
    fn test_moon_follows_earth() {
        let mut reg = registry();
        for _ in 0..37 {
            reg.advance(1.0);
        }
        let earth = reg.get(BodyId::EARTH).unwrap().state;
        let moon = reg.get(BodyId::MOON).unwrap().state;
        let offset = moon.world_position - earth.world_position;
        assert!((offset - moon.local_position).length() < 1e-12);

        let r = crate::orbit::scaled_radius(
            moon.orbital_angle,
            &SOLAR_SYSTEM[BodyId::MOON.index()].orbit,
            30.0,
        );
        assert!((moon.local_position.length() - r).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_independent_per_body() {
        let mut reg = registry();
        reg.advance(1.0);
        let earth = reg.get(BodyId::EARTH).unwrap().state.rotation_angle;
        let moon = reg.get(BodyId::MOON).unwrap().state.rotation_angle;
        assert!((earth - 1574.0 * 0.00005).abs() < 1e-12);
        assert!((moon - 16.66 * 0.00005).abs() < 1e-12);
    }

    #[test]
    fn test_fractional_ticks_scale_step() {
        let mut a = registry();
        let mut b = registry();
        a.advance(0.5);
        a.advance(0.5);
        b.advance(1.0);
        let ta = a.get(BodyId::MARS).unwrap().state.orbital_angle;
        let tb = b.get(BodyId::MARS).unwrap().state.orbital_angle;
        assert!((ta - tb).abs() < 1e-12);
    }

    #[test]
    fn test_bad_tick_steps_ignored() {
        let mut reg = registry();
        reg.advance(1.0);
        let snapshot: Vec<BodyState> = reg.iter().map(|b| b.state).collect();

        reg.advance(-5.0);
        reg.advance(0.0);
        reg.advance(f64::NAN);
        reg.advance(f64::INFINITY);
        reg.advance(f64::NEG_INFINITY);

        let after: Vec<BodyState> = reg.iter().map(|b| b.state).collect();
        assert_eq!(after, snapshot);
        for state in &after {
            assert!(state.orbital_angle.is_finite() && state.orbital_angle >= 0.0);
        }

        reg.advance(1.0);
        let earth = reg.get(BodyId::EARTH).unwrap().state.orbital_angle;
        assert!(earth > snapshot[BodyId::EARTH.index()].orbital_angle);
    }

    #[test]
    fn test_unknown_id() {
        let mut reg = registry();
        assert!(reg.get(BodyId(42)).is_none());
        assert!(reg.world_position(BodyId(42)).is_none());
        assert!(!reg.set_texture(BodyId(42), TextureHandle(1)));
    }

    #[test]
    fn test_invalid_table_rejected() {
        let mut table = SOLAR_SYSTEM;
        table[5].orbit.eccentricity = 1.2;
        assert!(BodyRegistry::new(&table, OrbitConfig::default()).is_err());
    }
}
