/// Per-draw uniforms shared by both programs. Bound with a dynamic offset.
const UNIFORMS: &str = r#"
struct DrawUniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> draw: DrawUniforms;
"#;

/// Lit proxy mesh for scene models.
const MESH_BODY: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
};

@vertex
fn vs_mesh(vertex: VertexInput) -> VertexOutput {
    let world_pos = draw.model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (draw.model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = draw.projection * draw.view * world_pos;
    out.world_normal = normalize(world_normal);
    return out;
}

@fragment
fn fs_mesh(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    let lighting = 0.3 + max(dot(in.world_normal, light_dir), 0.0) * 0.7;
    return vec4<f32>(draw.color.rgb * lighting, draw.color.a);
}
"#;

/// Cubemap background. Writes z = w so the cube sits on the far plane.
const SKYBOX_BODY: &str = r#"
@group(1) @binding(0)
var skybox: texture_cube<f32>;
@group(1) @binding(1)
var skybox_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_sky(@location(0) position: vec3<f32>) -> SkyOutput {
    let pos = draw.projection * draw.view * vec4<f32>(position, 1.0);

    var out: SkyOutput;
    out.clip_position = pos.xyww;
    out.direction = position;
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    return textureSample(skybox, skybox_sampler, in.direction);
}
"#;

pub fn mesh_shader() -> String {
    format!("{UNIFORMS}{MESH_BODY}")
}

pub fn skybox_shader() -> String {
    format!("{UNIFORMS}{SKYBOX_BODY}")
}
