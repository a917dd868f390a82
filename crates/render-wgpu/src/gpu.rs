use crate::camera::PerspectiveCamera;
use crate::shaders;
use dicefield_common::{MeshId, TextureImage};
use dicefield_scene::Scene;
use std::collections::BTreeMap;
use wgpu::util::DeviceExt;

/// Capacity of the light array uniform; fixed by the shader contract.
pub const MAX_LIGHTS: usize = 20;

/// Errors from GPU resource construction.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(
        "mesh {mesh:?}: texture {index} is {got_width}x{got_height}, \
         expected {width}x{height}"
    )]
    TextureShapeMismatch {
        mesh: MeshId,
        index: usize,
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },
    #[error("mesh {0:?} has no texture images")]
    EmptyTextureList(MeshId),
}

/// GPU-side bundle for one mesh, built on first render and never rebuilt.
///
/// Vertex and instance counts are snapshotted at build time; instances
/// appended to the mesh afterwards are not picked up (documented caller
/// precondition).
struct MeshBinding {
    bind_group: wgpu::BindGroup,
    offsets: wgpu::Buffer,
    normals: wgpu::Buffer,
    instance_positions: wgpu::Buffer,
    instance_rotations: wgpu::Buffer,
    uvs: wgpu::Buffer,
    instance_texture_ids: wgpu::Buffer,
    vertex_count: u32,
    instance_count: u32,
}

/// wgpu renderer for instanced mesh scenes.
///
/// Owns the pipeline, the depth target, one shared sampler, one shared set
/// of per-frame uniform buffers (light count, lights, view, projection), and
/// a cache of per-mesh GPU bundles keyed by the mesh's scene handle.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    num_lights_buffer: wgpu::Buffer,
    lights_buffer: wgpu::Buffer,
    view_buffer: wgpu::Buffer,
    projection_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    bindings: BTreeMap<MeshId, MeshBinding>,
    surface_format: wgpu::TextureFormat,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        // Shared per-frame uniforms, written once per frame before any draw.
        let num_lights_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("num_lights_buffer"),
            size: 4,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let lights_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("lights_buffer"),
            // vec3f entries are padded to 16 bytes in the uniform layout.
            size: (MAX_LIGHTS * 16) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let view_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("view_buffer"),
            size: 64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let projection_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("projection_buffer"),
            size: 64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("mesh_bind_group_layout"),
            entries: &[
                uniform_entry(0),
                uniform_entry(1),
                uniform_entry(2),
                uniform_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2Array,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });

        // Six separate streams: per-vertex offsets/normals/uvs, per-instance
        // positions/rotations/texture ids. Locations fixed by the shader.
        let vertex_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: 4 * 3,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![0 => Float32x3],
            },
            wgpu::VertexBufferLayout {
                array_stride: 4 * 3,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![1 => Float32x3],
            },
            wgpu::VertexBufferLayout {
                array_stride: 4 * 3,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![2 => Float32x3],
            },
            wgpu::VertexBufferLayout {
                array_stride: 4,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![3 => Uint32],
            },
            wgpu::VertexBufferLayout {
                array_stride: 4 * 2,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![4 => Float32x2],
            },
            wgpu::VertexBufferLayout {
                array_stride: 4,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![5 => Uint32],
            },
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vertex_main"),
                compilation_options: Default::default(),
                buffers: &vertex_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fragment_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("mesh_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipeline,
            bind_group_layout,
            sampler,
            num_lights_buffer,
            lights_buffer,
            view_buffer,
            projection_buffer,
            depth_texture,
            bindings: BTreeMap::new(),
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Render one frame.
    ///
    /// Writes the shared per-frame uniforms, lazily builds GPU bundles for
    /// meshes seen for the first time, then draws every mesh in scene
    /// iteration order within a single cleared pass.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<(), RenderError> {
        let (num_lights, lights_data) = pack_lights(scene);
        queue.write_buffer(&self.num_lights_buffer, 0, &num_lights.to_le_bytes());
        queue.write_buffer(&self.lights_buffer, 0, bytemuck::bytes_of(&lights_data));
        queue.write_buffer(
            &self.view_buffer,
            0,
            bytemuck::bytes_of(&camera.view_matrix().to_cols_array()),
        );
        queue.write_buffer(
            &self.projection_buffer,
            0,
            bytemuck::bytes_of(&camera.projection_matrix().to_cols_array()),
        );

        for (&id, mesh) in scene.meshes() {
            if !self.bindings.contains_key(&id) {
                let binding = self.build_binding(device, queue, id, mesh.as_ref())?;
                self.bindings.insert(id, binding);
            }
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("mesh_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_pipeline(&self.pipeline);
            for id in scene.meshes().keys() {
                let binding = &self.bindings[id];
                pass.set_bind_group(0, &binding.bind_group, &[]);
                pass.set_vertex_buffer(0, binding.offsets.slice(..));
                pass.set_vertex_buffer(1, binding.normals.slice(..));
                pass.set_vertex_buffer(2, binding.instance_positions.slice(..));
                pass.set_vertex_buffer(3, binding.instance_rotations.slice(..));
                pass.set_vertex_buffer(4, binding.uvs.slice(..));
                pass.set_vertex_buffer(5, binding.instance_texture_ids.slice(..));
                pass.draw(0..binding.vertex_count, 0..binding.instance_count);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Build the GPU bundle for a mesh: texture array, six device buffers,
    /// and the bind group tying them to the shared per-frame uniforms.
    fn build_binding(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        id: MeshId,
        mesh: &dyn dicefield_geometry::InstancedMesh,
    ) -> Result<MeshBinding, RenderError> {
        let images = mesh.texture_images();
        let (width, height) = validate_texture_shapes(id, images)?;

        // A single-layer texture would not bind as texture_2d_array, so the
        // layer count is at least 2 even for one image.
        let layer_count = (images.len() as u32).max(2);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("mesh_texture_array"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: layer_count,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        for (layer, image) in images.iter().enumerate() {
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d {
                        x: 0,
                        y: 0,
                        z: layer as u32,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                image.pixels(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * width),
                    rows_per_image: Some(height),
                },
                wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
            );
        }
        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor {
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        let vertex_buffer = |label, contents: &[u8]| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        };
        let offsets = vertex_buffer("mesh_offsets", bytemuck::cast_slice(mesh.offsets()));
        let normals = vertex_buffer("mesh_normals", bytemuck::cast_slice(mesh.normals()));
        let instance_positions = vertex_buffer(
            "mesh_instance_positions",
            bytemuck::cast_slice(mesh.instance_positions()),
        );
        let instance_rotations = vertex_buffer(
            "mesh_instance_rotations",
            bytemuck::cast_slice(mesh.instance_rotations()),
        );
        let uvs = vertex_buffer("mesh_uvs", bytemuck::cast_slice(mesh.uv_coords()));
        let instance_texture_ids = vertex_buffer(
            "mesh_instance_texture_ids",
            bytemuck::cast_slice(mesh.instance_texture_ids()),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("mesh_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.num_lights_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.lights_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.view_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.projection_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
            ],
        });

        tracing::debug!(
            mesh = id.0,
            vertices = mesh.vertex_count(),
            instances = mesh.instance_count(),
            layers = layer_count,
            "built gpu resources"
        );

        Ok(MeshBinding {
            bind_group,
            offsets,
            normals,
            instance_positions,
            instance_rotations,
            uvs,
            instance_texture_ids,
            vertex_count: mesh.vertex_count(),
            instance_count: mesh.instance_count(),
        })
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth24Plus,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

/// Flatten the scene's lights into the uniform layout: one vec4 slot per
/// light (w is alignment padding), capped at `MAX_LIGHTS`.
fn pack_lights(scene: &Scene) -> (u32, [[f32; 4]; MAX_LIGHTS]) {
    let mut data = [[0.0; 4]; MAX_LIGHTS];
    let mut count = 0;
    for light in scene.lights().values().take(MAX_LIGHTS) {
        data[count] = [
            light.direction.x,
            light.direction.y,
            light.direction.z,
            0.0,
        ];
        count += 1;
    }
    (count as u32, data)
}

/// All images of a mesh must share dimensions; returns them.
fn validate_texture_shapes(
    id: MeshId,
    images: &[TextureImage],
) -> Result<(u32, u32), RenderError> {
    let first = images.first().ok_or(RenderError::EmptyTextureList(id))?;
    let (width, height) = (first.width(), first.height());
    for (index, image) in images.iter().enumerate().skip(1) {
        if image.width() != width || image.height() != height {
            return Err(RenderError::TextureShapeMismatch {
                mesh: id,
                index,
                width,
                height,
                got_width: image.width(),
                got_height: image.height(),
            });
        }
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dicefield_scene::Light;

    #[test]
    fn pack_lights_pads_each_light_to_a_vec4() {
        let mut scene = Scene::new();
        scene.add_light(Light::new(1.0, 2.0, 3.0));
        scene.add_light(Light::new(-1.0, -2.0, -3.0));
        let (count, data) = pack_lights(&scene);
        assert_eq!(count, 2);
        assert_eq!(data[0], [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(data[1], [-1.0, -2.0, -3.0, 0.0]);
        assert_eq!(data[2], [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn pack_lights_caps_at_max_lights() {
        let mut scene = Scene::new();
        for i in 0..MAX_LIGHTS + 5 {
            scene.add_light(Light::new(i as f32, 0.0, 0.0));
        }
        let (count, _) = pack_lights(&scene);
        assert_eq!(count, MAX_LIGHTS as u32);
    }

    #[test]
    fn empty_scene_has_zero_lights() {
        let scene = Scene::new();
        let (count, data) = pack_lights(&scene);
        assert_eq!(count, 0);
        assert!(data.iter().flatten().all(|&c| c == 0.0));
    }

    #[test]
    fn uniform_texture_shapes_pass_validation() {
        let images = vec![
            TextureImage::solid(8, 4, [0, 0, 0, 255]),
            TextureImage::solid(8, 4, [255, 255, 255, 255]),
        ];
        let dims = validate_texture_shapes(MeshId(0), &images).unwrap();
        assert_eq!(dims, (8, 4));
    }

    #[test]
    fn mismatched_texture_shapes_are_rejected() {
        let images = vec![
            TextureImage::solid(8, 4, [0, 0, 0, 255]),
            TextureImage::solid(4, 4, [0, 0, 0, 255]),
        ];
        let err = validate_texture_shapes(MeshId(7), &images).unwrap_err();
        assert!(matches!(
            err,
            RenderError::TextureShapeMismatch {
                mesh: MeshId(7),
                index: 1,
                width: 8,
                got_width: 4,
                ..
            }
        ));
    }

    #[test]
    fn empty_texture_list_is_rejected() {
        assert!(matches!(
            validate_texture_shapes(MeshId(3), &[]),
            Err(RenderError::EmptyTextureList(MeshId(3)))
        ));
    }
}
