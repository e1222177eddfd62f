use tracing::debug;
use wgpu::util::DeviceExt;

use super::mesh::{FaceInstance, InstanceMesh};
use crate::model::world::World;
use crate::model::Camera;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self { view_proj: camera.view_proj().to_cols_array_2d() }
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_uniform"),
            contents: bytemuck::bytes_of(self),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn write(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::bytes_of(self));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshPass {
    Opaque,
    /// drawn after the opaque pass with blending enabled
    Transparent,
}

pub struct InstanceBuffer {
    pub buffer: wgpu::Buffer,
    pub count: u32,
}

impl InstanceBuffer {
    fn create(device: &wgpu::Device, label: &str, instances: &[FaceInstance]) -> Option<Self> {
        if instances.is_empty() {
            return None;
        }
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(instances),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Some(Self { buffer, count: instances.len() as u32 })
    }
}

/// GPU copies of the world's instance mesh. The previous buffers are destroyed
/// only once both replacements exist.
#[derive(Default)]
pub struct GpuInstanceBuffers {
    opaque: Option<InstanceBuffer>,
    transparent: Option<InstanceBuffer>,
    version: Option<u64>,
}

impl GpuInstanceBuffers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn is_stale(&self, world: &World) -> bool {
        world.mesh().is_some() && self.version != Some(world.mesh_version())
    }

    /// Uploads the world's mesh if it changed since the last sync
    pub fn sync(&mut self, device: &wgpu::Device, world: &World) -> bool {
        if !self.is_stale(world) {
            return false;
        }
        match world.mesh() {
            Some(mesh) => {
                self.upload(device, mesh, world.mesh_version());
                true
            }
            None => false,
        }
    }

    pub fn upload(&mut self, device: &wgpu::Device, mesh: &InstanceMesh, version: u64) {
        let opaque = InstanceBuffer::create(device, "opaque_faces", &mesh.opaque);
        let transparent = InstanceBuffer::create(device, "transparent_faces", &mesh.transparent);

        for old in [
            std::mem::replace(&mut self.opaque, opaque),
            std::mem::replace(&mut self.transparent, transparent),
        ]
        .into_iter()
        .flatten()
        {
            old.buffer.destroy();
        }
        self.version = Some(version);
        debug!(
            "uploaded mesh v{}: {} opaque, {} transparent faces",
            version,
            mesh.opaque.len(),
            mesh.transparent.len()
        );
    }

    pub fn get(&self, pass: MeshPass) -> Option<&InstanceBuffer> {
        match pass {
            MeshPass::Opaque => self.opaque.as_ref(),
            MeshPass::Transparent => self.transparent.as_ref(),
        }
    }

    /// Binds the instances at `slot` and draws one quad of `face_vertices`
    /// vertices per face
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, pass: MeshPass, slot: u32, face_vertices: u32) {
        if let Some(instances) = self.get(pass) {
            render_pass.set_vertex_buffer(slot, instances.buffer.slice(..));
            render_pass.draw(0..face_vertices, 0..instances.count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};

    #[test]
    fn test_camera_uniform_matches_view_proj() {
        let mut camera = Camera::new(800, 600);
        camera.eye = Vec3::new(1.0, 20.0, -3.0);
        let uniform = CameraUniform::from_camera(&camera);
        assert_eq!(Mat4::from_cols_array_2d(&uniform.view_proj), camera.view_proj());
        assert_eq!(std::mem::size_of::<CameraUniform>(), 64);
    }

    #[test]
    fn test_new_buffers_are_stale_for_rendered_world() {
        use crate::config::WorldConfig;
        use crate::model::world::MaterialTable;
        use crate::utils::WorldCoord;

        let config = WorldConfig { world_size: 4, map_height: 4, chunk_size: 4, ..Default::default() };
        let mut world = World::new(&config, MaterialTable::default()).unwrap();
        let buffers = GpuInstanceBuffers::new();
        assert!(!buffers.is_stale(&world), "nothing to upload before the first render");

        world.render(WorldCoord(0, 0, 0), 2);
        assert!(buffers.is_stale(&world));
        assert!(buffers.get(MeshPass::Opaque).is_none());
    }
}
