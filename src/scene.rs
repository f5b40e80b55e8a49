//! Per-frame scene composition.
//!
//! The composer turns registry state and a camera frame into draw calls on a
//! [`RenderBackend`]: the starfield backdrop first, then every body in table
//! order. For each sphere it uploads [`DrawUniforms`], binds the body's texture
//! and issues one `draw_sphere`. It owns no GPU resources.

use std::f64::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::camera::CameraFrame;
use crate::config::{LightingConfig, SimulationConfig};
use crate::registry::{Body, BodyRegistry};

/// Opaque handle to a texture owned by the render backend.
///
/// Handle 0 is the default and means "whatever the backend uses when nothing
/// was loaded".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// Uniform block for one sphere draw.
///
/// Layout matches the `Draw` struct in the sphere shader (192 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniforms {
    pub mvp: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub light_color: [f32; 4],
    pub light_position: [f32; 4],
    pub viewer_position: [f32; 4],
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

/// Drawing surface the composer talks to.
pub trait RenderBackend {
    /// Set the uniforms used by the next draw.
    fn set_uniforms(&mut self, uniforms: &DrawUniforms);

    /// Bind the texture sampled by the next draw.
    fn bind_texture(&mut self, texture: TextureHandle);

    /// Draw a UV sphere centred at the model origin.
    fn draw_sphere(&mut self, radius: f32, sectors: u32, stacks: u32);

    /// Draw the backdrop sphere. It must not occlude anything drawn after it,
    /// whatever its distance from the camera.
    fn draw_backdrop(&mut self, radius: f32, sectors: u32, stacks: u32) {
        self.draw_sphere(radius, sectors, stacks);
    }
}

/// Phong material factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

impl Material {
    /// Self-lit surface: texture colour only.
    pub const UNLIT: Material = Material {
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,
        shininess: 1.0,
    };

    pub fn lit(lighting: &LightingConfig) -> Self {
        Self {
            ambient: lighting.ambient,
            diffuse: lighting.diffuse,
            specular: lighting.specular,
            shininess: lighting.shininess,
        }
    }
}

/// Backdrop sphere centred on the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Starfield {
    radius: f32,
    texture: TextureHandle,
}

/// Builds draw calls for the backdrop and every body.
#[derive(Debug, Clone)]
pub struct SceneComposer {
    lighting: LightingConfig,
    starfield: Option<Starfield>,
    sectors: u32,
    stacks: u32,
}

impl SceneComposer {
    pub fn new(config: &SimulationConfig) -> Self {
        let starfield = config.starfield.enabled.then(|| Starfield {
            radius: config.starfield.radius,
            texture: TextureHandle::default(),
        });

        Self {
            lighting: config.lighting,
            starfield,
            sectors: config.sphere_sectors,
            stacks: config.sphere_stacks,
        }
    }

    /// Bind the backdrop texture. Ignored when no starfield is configured.
    pub fn set_starfield_texture(&mut self, texture: TextureHandle) {
        if let Some(starfield) = &mut self.starfield {
            starfield.texture = texture;
        }
    }

    /// Emit every draw for one frame.
    pub fn compose<R: RenderBackend + ?Sized>(
        &self,
        camera: &CameraFrame,
        registry: &BodyRegistry,
        backend: &mut R,
    ) {
        let view_proj = camera.projection * camera.view;

        if let Some(starfield) = &self.starfield {
            let model = Mat4::from_translation(camera.position);
            backend.set_uniforms(&self.uniforms(view_proj, model, camera.position, Material::UNLIT));
            backend.bind_texture(starfield.texture);
            backend.draw_backdrop(starfield.radius, self.sectors, self.stacks);
        }

        let lit = Material::lit(&self.lighting);
        for body in registry.iter() {
            let material = if body.definition.emissive { Material::UNLIT } else { lit };
            backend.set_uniforms(&self.uniforms(
                view_proj,
                model_matrix(body),
                camera.position,
                material,
            ));
            backend.bind_texture(body.texture);
            backend.draw_sphere(body.definition.orbit.visual_radius, self.sectors, self.stacks);
        }
    }

    fn uniforms(&self, view_proj: Mat4, model: Mat4, viewer: Vec3, material: Material) -> DrawUniforms {
        let [r, g, b] = self.lighting.color;
        let [lx, ly, lz] = self.lighting.position;

        DrawUniforms {
            mvp: (view_proj * model).to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            light_color: [r, g, b, 1.0],
            light_position: [lx, ly, lz, 1.0],
            viewer_position: viewer.extend(1.0).to_array(),
            ambient: material.ambient,
            diffuse: material.diffuse,
            specular: material.specular,
            shininess: material.shininess,
        }
    }
}

/// `translate(world) · rotate_y(rotation)` for a body.
pub fn model_matrix(body: &Body) -> Mat4 {
    // The accumulated angle is kept unwrapped in f64; reduce before narrowing.
    let rotation = body.state.rotation_angle.rem_euclid(TAU) as f32;
    Mat4::from_translation(body.world_position()) * Mat4::from_rotation_y(rotation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bodies::{BodyId, SOLAR_SYSTEM};
    use crate::config::{OrbitConfig, StarfieldConfig};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Uniforms(DrawUniforms),
        Texture(TextureHandle),
        Sphere(f32, u32, u32),
        Backdrop(f32),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl RenderBackend for Recorder {
        fn set_uniforms(&mut self, uniforms: &DrawUniforms) {
            self.calls.push(Call::Uniforms(*uniforms));
        }
        fn bind_texture(&mut self, texture: TextureHandle) {
            self.calls.push(Call::Texture(texture));
        }
        fn draw_sphere(&mut self, radius: f32, sectors: u32, stacks: u32) {
            self.calls.push(Call::Sphere(radius, sectors, stacks));
        }
        fn draw_backdrop(&mut self, radius: f32, _sectors: u32, _stacks: u32) {
            self.calls.push(Call::Backdrop(radius));
        }
    }

    fn camera() -> CameraFrame {
        let position = Vec3::new(0.0, 120.0, 500.0);
        CameraFrame {
            view: Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(45f32.to_radians(), 4.0 / 3.0, 0.1, 4000.0),
            position,
            forward: -position.normalize(),
        }
    }

    fn registry() -> BodyRegistry {
        BodyRegistry::new(&SOLAR_SYSTEM, OrbitConfig::default()).unwrap()
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<DrawUniforms>(), 192);
    }

    #[test]
    fn test_draw_order_and_counts() {
        let composer = SceneComposer::new(&SimulationConfig::default());
        let mut rec = Recorder::default();
        composer.compose(&camera(), &registry(), &mut rec);

        // Starfield plus ten bodies, three calls each.
        assert_eq!(rec.calls.len(), 33);
        assert_eq!(rec.calls[2], Call::Backdrop(3000.0));
        assert_eq!(rec.calls[5], Call::Sphere(10.0, 36, 18));
        assert_eq!(rec.calls[32], Call::Sphere(0.55, 36, 18));
    }

    #[test]
    fn test_without_starfield() {
        let config = SimulationConfig::default().with_starfield(StarfieldConfig {
            enabled: false,
            ..Default::default()
        });
        let composer = SceneComposer::new(&config);
        let mut rec = Recorder::default();
        composer.compose(&camera(), &registry(), &mut rec);
        assert_eq!(rec.calls.len(), 30);
        assert_eq!(rec.calls[2], Call::Sphere(10.0, 36, 18));
    }

    #[test]
    fn test_materials() {
        let composer = SceneComposer::new(&SimulationConfig::default());
        let mut rec = Recorder::default();
        composer.compose(&camera(), &registry(), &mut rec);

        let uniforms: Vec<DrawUniforms> = rec
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Uniforms(u) => Some(*u),
                _ => None,
            })
            .collect();

        // Starfield and Sun are unlit.
        for u in &uniforms[..2] {
            assert_eq!((u.ambient, u.diffuse, u.specular), (1.0, 0.0, 0.0));
        }
        let earth = &uniforms[1 + BodyId::EARTH.index()];
        assert_eq!((earth.ambient, earth.diffuse, earth.specular, earth.shininess), (0.1, 1.0, 0.3, 16.0));
        assert_eq!(earth.light_position, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(earth.viewer_position, [0.0, 120.0, 500.0, 1.0]);
    }

    #[test]
    fn test_model_matrix_places_body() {
        let mut reg = registry();
        for _ in 0..10 {
            reg.advance(1.0);
        }
        let earth = reg.get(BodyId::EARTH).unwrap();
        let model = model_matrix(earth);
        let origin = model.transform_point3(Vec3::ZERO);
        assert!((origin - earth.world_position()).length() < 1e-4);
    }

    #[test]
    fn test_starfield_follows_camera() {
        let mut composer = SceneComposer::new(&SimulationConfig::default());
        composer.set_starfield_texture(TextureHandle(7));
        let mut rec = Recorder::default();
        let cam = camera();
        composer.compose(&cam, &registry(), &mut rec);

        assert_eq!(rec.calls[1], Call::Texture(TextureHandle(7)));
        let Call::Uniforms(u) = &rec.calls[0] else {
            panic!("expected uniforms first");
        };
        let model = Mat4::from_cols_array_2d(&u.model);
        assert!((model.transform_point3(Vec3::ZERO) - cam.position).length() < 1e-4);
    }

    #[test]
    fn test_backdrop_drawn_once_before_bodies() {
        let composer = SceneComposer::new(&SimulationConfig::default());
        let mut rec = Recorder::default();
        composer.compose(&camera(), &registry(), &mut rec);

        let backdrops: Vec<usize> = rec
            .calls
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, Call::Backdrop(_)))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(backdrops, vec![2]);
        let spheres = rec.calls.iter().filter(|c| matches!(c, Call::Sphere(..))).count();
        assert_eq!(spheres, 10);
    }

    #[test]
    fn test_backdrop_falls_back_to_sphere() {
        #[derive(Default)]
        struct Plain {
            spheres: Vec<f32>,
        }

        impl RenderBackend for Plain {
            fn set_uniforms(&mut self, _: &DrawUniforms) {}
            fn bind_texture(&mut self, _: TextureHandle) {}
            fn draw_sphere(&mut self, radius: f32, _: u32, _: u32) {
                self.spheres.push(radius);
            }
        }

        let composer = SceneComposer::new(&SimulationConfig::default());
        let mut plain = Plain::default();
        composer.compose(&camera(), &registry(), &mut plain);
        assert_eq!(plain.spheres.len(), 11);
        assert_eq!(plain.spheres[0], 3000.0);
    }
}
