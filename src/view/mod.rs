// VIEW: Instance buffers for rendering
pub mod mesh;
pub mod gpu;

pub use mesh::{FaceInstance, InstanceMesh};
pub use gpu::{CameraUniform, GpuInstanceBuffers, InstanceBuffer, MeshPass};
