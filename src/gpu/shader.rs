//! WGSL source for textured, Phong-lit spheres.

/// Sphere shader. `Draw` mirrors [`DrawUniforms`](crate::scene::DrawUniforms).
pub const SPHERE_SHADER: &str = r#"
struct Draw {
    mvp: mat4x4<f32>,
    model: mat4x4<f32>,
    light_color: vec4<f32>,
    light_position: vec4<f32>,
    viewer_position: vec4<f32>,
    ambient: f32,
    diffuse: f32,
    specular: f32,
    shininess: f32,
};

@group(0) @binding(0)
var<uniform> draw: Draw;

@group(1) @binding(0)
var surface_texture: texture_2d<f32>;
@group(1) @binding(1)
var surface_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = draw.mvp * vec4<f32>(in.position, 1.0);
    out.world_position = (draw.model * vec4<f32>(in.position, 1.0)).xyz;
    // Model matrices are rigid (translation + rotation), so no inverse-transpose.
    out.normal = (draw.model * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSample(surface_texture, surface_sampler, in.uv).rgb;
    let light = draw.light_color.rgb;

    let n = normalize(in.normal);
    let l = normalize(draw.light_position.xyz - in.world_position);
    let v = normalize(draw.viewer_position.xyz - in.world_position);
    let r = reflect(-l, n);

    let ambient = draw.ambient * light;
    let diffuse = draw.diffuse * max(dot(n, l), 0.0) * light;
    let specular = draw.specular * pow(max(dot(v, r), 0.0), draw.shininess) * light;

    return vec4<f32>((ambient + diffuse) * base + specular, 1.0);
}
"#;
