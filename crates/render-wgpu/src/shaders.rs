/// WGSL shader for instanced meshes.
///
/// Fixed contract with the renderer: six vertex streams at locations 0-5
/// (offset vec3, normal vec3, instance position vec3, instance rotation u32,
/// uv vec2, instance texture id u32) and six group-0 bindings (light count,
/// light array, view, projection, sampler, texture array). The rotation code
/// indexes the fixed model-matrix array below; its order (top, bottom,
/// south, north, east, west) must match `dicefield_common::Face`.
pub const MESH_SHADER: &str = r#"
struct VertexOut {
  @builtin(position) position: vec4f,
  @location(0) diffuse: f32,
  @location(1) @interpolate(flat) texture_id: u32,
  @location(2) uv: vec2f,
}

@group(0) @binding(0) var<uniform> num_lights: u32;
@group(0) @binding(1) var<uniform> lights: array<vec3f, 20>;
@group(0) @binding(2) var<uniform> view: mat4x4f;
@group(0) @binding(3) var<uniform> projection: mat4x4f;
@group(0) @binding(4) var tex_sampler: sampler;
@group(0) @binding(5) var tex_array: texture_2d_array<f32>;

var<private> model = array<mat4x4f, 6>(
  // top = (-pi/2, 0)
  mat4x4f(1.0, 0.0, 0.0, 0.0,
      0.0, 0.0, -1.0, 0.0,
      0.0, 1.0, 0.0, 0.0,
      0.0, 0.0, 0.0, 1.0),
  // bottom = (pi/2, 0)
  mat4x4f(1.0, 0.0, 0.0, 0.0,
      0.0, 0.0, 1.0, 0.0,
      0.0, -1.0, 0.0, 0.0,
      0.0, 0.0, 0.0, 1.0),
  // south = (0, 0)
  mat4x4f(1.0, 0.0, 0.0, 0.0,
      0.0, 1.0, 0.0, 0.0,
      0.0, 0.0, 1.0, 0.0,
      0.0, 0.0, 0.0, 1.0),
  // north = (0, pi)
  mat4x4f(-1.0, 0.0, 0.0, 0.0,
      0.0, 1.0, 0.0, 0.0,
      0.0, 0.0, -1.0, 0.0,
      0.0, 0.0, 0.0, 1.0),
  // east = (0, pi/2)
  mat4x4f(0.0, 0.0, -1.0, 0.0,
      0.0, 1.0, 0.0, 0.0,
      1.0, 0.0, 0.0, 0.0,
      0.0, 0.0, 0.0, 1.0),
  // west = (0, -pi/2)
  mat4x4f(0.0, 0.0, 1.0, 0.0,
      0.0, 1.0, 0.0, 0.0,
      -1.0, 0.0, 0.0, 0.0,
      0.0, 0.0, 0.0, 1.0)
);

var<private> scale = mat4x4f(
  1.0, 0.0, 0.0, 0.0,
  0.0, 1.0, 0.0, 0.0,
  0.0, 0.0, 1.0, 0.0,
  0.0, 0.0, 0.0, 1.0
);

@vertex
fn vertex_main(
  @location(0) offset: vec3f,
  @location(1) normal: vec3f,
  @location(2) position: vec3f,
  @location(3) rotation: u32,
  @location(4) uv: vec2f,
  @location(5) texture_id: u32
) -> VertexOut {
  var out: VertexOut;
  out.position = projection * view *
    (vec4f(position, 1.0) + scale * model[rotation] * vec4f(offset, 1.0));

  var diffuse = 0.0;
  for (var i = 0u; i < num_lights; i++) {
    diffuse += max(0.0,
      -dot(model[rotation] * vec4f(normalize(normal), 0.0), vec4f(normalize(lights[i]), 0.0)));
  }
  out.diffuse = diffuse;

  out.texture_id = texture_id;
  out.uv = uv;
  return out;
}

@fragment
fn fragment_main(frag: VertexOut) -> @location(0) vec4f {
  let tex_color = textureSample(tex_array, tex_sampler, frag.uv, frag.texture_id);
  // Treat mostly-transparent texels as cutouts.
  if (tex_color.a <= 0.5) {
    discard;
  }
  return vec4f(frag.diffuse * tex_color.rgb, 1.0);
}
"#;
