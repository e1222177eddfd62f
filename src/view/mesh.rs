use bytemuck::NoUninit;

use crate::model::world::render_info::{FaceRenderInfo, RenderInfoCache};

/// Per-instance data of one textured unit quad
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, NoUninit)]
pub struct FaceInstance {
    pub transform: [[f32; 4]; 4],
    pub uv_offset: [f32; 2],
    pub ambient: f32,
    pub normal: [f32; 3],
}

impl FaceInstance {
    /// floats per instance in a flattened buffer
    pub const FLOATS: usize = std::mem::size_of::<FaceInstance>() / std::mem::size_of::<f32>();

    pub fn from_face(face: &FaceRenderInfo) -> Self {
        Self {
            transform: face.transform.to_cols_array_2d(),
            uv_offset: face.uv_offset,
            ambient: face.ambient,
            normal: face.direction.normal().to_array(),
        }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 7] = [
            wgpu::VertexAttribute { offset: 0, shader_location: 2, format: wgpu::VertexFormat::Float32x4 },
            wgpu::VertexAttribute { offset: 16, shader_location: 3, format: wgpu::VertexFormat::Float32x4 },
            wgpu::VertexAttribute { offset: 32, shader_location: 4, format: wgpu::VertexFormat::Float32x4 },
            wgpu::VertexAttribute { offset: 48, shader_location: 5, format: wgpu::VertexFormat::Float32x4 },
            wgpu::VertexAttribute { offset: 64, shader_location: 6, format: wgpu::VertexFormat::Float32x2 },
            wgpu::VertexAttribute { offset: 72, shader_location: 7, format: wgpu::VertexFormat::Float32 },
            wgpu::VertexAttribute { offset: 76, shader_location: 8, format: wgpu::VertexFormat::Float32x3 },
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FaceInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Instance arrays for the opaque pass and the blended transparent pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceMesh {
    pub opaque: Vec<FaceInstance>,
    pub transparent: Vec<FaceInstance>,
}

impl InstanceMesh {
    pub fn empty() -> Self {
        Self::default()
    }

    /// One instance per cached face; total length equals the cache's render count
    pub fn build(cache: &RenderInfoCache) -> Self {
        let mut mesh = Self {
            opaque: Vec::with_capacity(cache.render_count()),
            transparent: Vec::new(),
        };
        for face in cache.faces() {
            let instance = FaceInstance::from_face(face);
            if face.transparent {
                mesh.transparent.push(instance);
            } else {
                mesh.opaque.push(instance);
            }
        }
        mesh
    }

    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn opaque_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.opaque)
    }

    pub fn transparent_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.transparent)
    }
}
