/// WGSL shader for instanced point sprites.
///
/// `params.x` is the point diameter in world units at unit depth and
/// `params.y` the surface aspect ratio. A clip-space half extent of `size / 2`
/// shrinks with depth after the perspective divide, like attenuated points.
pub const POINT_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    color: vec4<f32>,
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

var<private> CORNERS: array<vec2<f32>, 6> = array<vec2<f32>, 6>(
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 1.0, -1.0),
    vec2<f32>( 1.0,  1.0),
    vec2<f32>(-1.0, -1.0),
    vec2<f32>( 1.0,  1.0),
    vec2<f32>(-1.0,  1.0),
);

struct InstanceInput {
    @location(0) position: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, instance: InstanceInput) -> VertexOutput {
    let corner = CORNERS[vertex_index];
    let clip = uniforms.view_proj * uniforms.model * vec4<f32>(instance.position, 1.0);
    let half_size = uniforms.params.x * 0.5;
    let offset = vec2<f32>(corner.x * half_size / uniforms.params.y, corner.y * half_size);

    var out: VertexOutput;
    out.clip_position = vec4<f32>(clip.xy + offset, clip.zw);
    out.color = uniforms.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;
