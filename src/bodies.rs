//! The built-in table of celestial bodies.
//!
//! Each entry pairs immutable orbital parameters with the physical facts shown
//! in the info panel. Ids are table indices and double as the digit key that
//! selects the body (`0` is the Sun, `3` is Earth, `9` is the Moon).
//!
//! Orbital values are the scene's visual constants: semi-major axes in AU,
//! periods in days, self-rotation as equatorial speed in km/h, visual radii in
//! scene units (Earth = 1).

use std::fmt;

use crate::error::BodyTableError;

/// Index of a body in the body table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub usize);

impl BodyId {
    pub const SUN: BodyId = BodyId(0);
    pub const MERCURY: BodyId = BodyId(1);
    pub const VENUS: BodyId = BodyId(2);
    pub const EARTH: BodyId = BodyId(3);
    pub const MARS: BodyId = BodyId(4);
    pub const JUPITER: BodyId = BodyId(5);
    pub const SATURN: BodyId = BodyId(6);
    pub const URANUS: BodyId = BodyId(7);
    pub const NEPTUNE: BodyId = BodyId(8);
    pub const MOON: BodyId = BodyId(9);

    /// Table index for this id.
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape and timing of a body's orbit plus its on-screen size and spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalParameters {
    /// Orbit eccentricity, `0 <= e < 1`.
    pub eccentricity: f64,
    /// Semi-major axis in AU. Zero keeps the body at the focus.
    pub semi_major_axis: f64,
    /// Time for one revolution, in simulated days.
    pub period_days: f64,
    /// Equatorial rotation speed in km/h.
    pub rotation_rate: f64,
    /// Sphere radius in scene units.
    pub visual_radius: f32,
}

/// Facts shown in the info panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalInfo {
    /// Mean orbital speed in km/s.
    pub mean_orbital_speed: f64,
    /// Mass in kg.
    pub mass: f64,
    /// Surface gravity in m/s².
    pub surface_gravity: f64,
}

/// One row of the body table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDefinition {
    pub id: BodyId,
    pub name: &'static str,
    /// File stem looked up in the texture directory.
    pub texture: &'static str,
    /// RGB used when the texture file cannot be loaded.
    pub fallback_color: [u8; 3],
    /// Body this one orbits. `None` orbits the Sun at the origin.
    pub parent: Option<BodyId>,
    /// Drawn without diffuse shading (the light source itself).
    pub emissive: bool,
    pub orbit: OrbitalParameters,
    pub info: PhysicalInfo,
}

const DAYS_PER_YEAR: f64 = 365.0;

/// The Sun, eight planets and the Moon, in selector order.
pub const SOLAR_SYSTEM: [BodyDefinition; 10] = [
    BodyDefinition {
        id: BodyId::SUN,
        name: "Sun",
        texture: "sun",
        fallback_color: [255, 200, 64],
        parent: None,
        emissive: true,
        orbit: OrbitalParameters {
            eccentricity: 0.0,
            semi_major_axis: 0.0,
            // One galactic year; the Sun never leaves the focus.
            period_days: 8.2e10,
            rotation_rate: 0.0,
            visual_radius: 10.0,
        },
        info: PhysicalInfo {
            mean_orbital_speed: 220.0,
            mass: 1.989e30,
            surface_gravity: 274.0,
        },
    },
    BodyDefinition {
        id: BodyId::MERCURY,
        name: "Mercury",
        texture: "mercury",
        fallback_color: [140, 130, 120],
        parent: None,
        emissive: false,
        orbit: OrbitalParameters {
            eccentricity: 0.206,
            semi_major_axis: 0.387,
            period_days: 87.97,
            rotation_rate: 10.83,
            visual_radius: 0.383,
        },
        info: PhysicalInfo {
            mean_orbital_speed: 47.36,
            mass: 3.301e23,
            surface_gravity: 3.7,
        },
    },
    BodyDefinition {
        id: BodyId::VENUS,
        name: "Venus",
        texture: "venus",
        fallback_color: [230, 190, 120],
        parent: None,
        emissive: false,
        orbit: OrbitalParameters {
            eccentricity: 0.007,
            semi_major_axis: 0.723,
            period_days: 224.70,
            rotation_rate: 1.52,
            visual_radius: 0.95,
        },
        info: PhysicalInfo {
            mean_orbital_speed: 35.02,
            mass: 4.867e24,
            surface_gravity: 8.87,
        },
    },
    BodyDefinition {
        id: BodyId::EARTH,
        name: "Earth",
        texture: "earth",
        fallback_color: [60, 110, 200],
        parent: None,
        emissive: false,
        orbit: OrbitalParameters {
            eccentricity: 0.017,
            semi_major_axis: 1.0,
            period_days: 365.25,
            rotation_rate: 1574.0,
            visual_radius: 1.0,
        },
        info: PhysicalInfo {
            mean_orbital_speed: 29.78,
            mass: 5.972e24,
            surface_gravity: 9.807,
        },
    },
    BodyDefinition {
        id: BodyId::MARS,
        name: "Mars",
        texture: "mars",
        fallback_color: [190, 90, 50],
        parent: None,
        emissive: false,
        orbit: OrbitalParameters {
            eccentricity: 0.093,
            semi_major_axis: 1.524,
            period_days: 687.0,
            rotation_rate: 866.0,
            visual_radius: 1.2,
        },
        info: PhysicalInfo {
            mean_orbital_speed: 24.07,
            mass: 6.417e23,
            surface_gravity: 3.721,
        },
    },
    BodyDefinition {
        id: BodyId::JUPITER,
        name: "Jupiter",
        texture: "jupiter",
        fallback_color: [200, 170, 130],
        parent: None,
        emissive: false,
        orbit: OrbitalParameters {
            eccentricity: 0.007,
            semi_major_axis: 5.204,
            period_days: 4328.9,
            rotation_rate: 45583.0,
            visual_radius: 4.2,
        },
        info: PhysicalInfo {
            mean_orbital_speed: 13.07,
            mass: 1.898e27,
            surface_gravity: 24.79,
        },
    },
    BodyDefinition {
        id: BodyId::SATURN,
        name: "Saturn",
        texture: "saturn",
        fallback_color: [220, 200, 150],
        parent: None,
        emissive: false,
        orbit: OrbitalParameters {
            eccentricity: 0.056,
            semi_major_axis: 9.582,
            period_days: 29.46 * DAYS_PER_YEAR,
            rotation_rate: 36840.0,
            visual_radius: 3.7,
        },
        info: PhysicalInfo {
            mean_orbital_speed: 9.68,
            mass: 5.683e26,
            surface_gravity: 10.44,
        },
    },
    BodyDefinition {
        id: BodyId::URANUS,
        name: "Uranus",
        texture: "uranus",
        fallback_color: [150, 210, 220],
        parent: None,
        emissive: false,
        orbit: OrbitalParameters {
            eccentricity: 0.046,
            semi_major_axis: 19.22,
            period_days: 84.01 * DAYS_PER_YEAR,
            rotation_rate: 14794.0,
            visual_radius: 2.9,
        },
        info: PhysicalInfo {
            mean_orbital_speed: 6.80,
            mass: 8.681e25,
            surface_gravity: 8.87,
        },
    },
    BodyDefinition {
        id: BodyId::NEPTUNE,
        name: "Neptune",
        texture: "neptune",
        fallback_color: [70, 100, 220],
        parent: None,
        emissive: false,
        orbit: OrbitalParameters {
            eccentricity: 0.01,
            semi_major_axis: 30.05,
            period_days: 164.8 * DAYS_PER_YEAR,
            rotation_rate: 9719.0,
            visual_radius: 0.78,
        },
        info: PhysicalInfo {
            mean_orbital_speed: 5.43,
            mass: 1.024e26,
            surface_gravity: 11.15,
        },
    },
    BodyDefinition {
        id: BodyId::MOON,
        name: "Moon",
        texture: "moon",
        fallback_color: [170, 170, 170],
        parent: Some(BodyId::EARTH),
        emissive: false,
        orbit: OrbitalParameters {
            eccentricity: 0.0549,
            // Exaggerated so the Moon clears Earth's sphere.
            semi_major_axis: 0.1,
            period_days: 27.32,
            rotation_rate: 16.66,
            visual_radius: 0.55,
        },
        info: PhysicalInfo {
            mean_orbital_speed: 1.022,
            mass: 7.342e22,
            surface_gravity: 1.62,
        },
    },
];

/// Check every entry of a body table.
///
/// Ids must equal table indices and parents must come before their children,
/// which lets the registry resolve parent positions in a single pass.
pub fn validate(table: &[BodyDefinition]) -> Result<(), BodyTableError> {
    if table.is_empty() {
        return Err(BodyTableError::Empty);
    }

    for (index, body) in table.iter().enumerate() {
        let orbit = &body.orbit;
        let name = body.name;

        if body.id.index() != index {
            return Err(BodyTableError::IdMismatch { body: name, id: body.id, index });
        }
        if !(0.0..1.0).contains(&orbit.eccentricity) {
            return Err(BodyTableError::Eccentricity { body: name, value: orbit.eccentricity });
        }
        if !(orbit.period_days.is_finite() && orbit.period_days > 0.0) {
            return Err(BodyTableError::Period { body: name, value: orbit.period_days });
        }
        if !(orbit.semi_major_axis.is_finite() && orbit.semi_major_axis >= 0.0) {
            return Err(BodyTableError::SemiMajorAxis { body: name, value: orbit.semi_major_axis });
        }
        if !(orbit.visual_radius.is_finite() && orbit.visual_radius > 0.0) {
            return Err(BodyTableError::VisualRadius { body: name, value: orbit.visual_radius });
        }
        if let Some(parent) = body.parent {
            if parent.index() >= index {
                return Err(BodyTableError::Parent { body: name, parent });
            }
        }
    }

    Ok(())
}
