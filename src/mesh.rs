use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

const ATTRIBUTES: [wgpu::VertexAttributeDescriptor; 2] = [
    wgpu::VertexAttributeDescriptor {
        format: wgpu::VertexFormat::Float3,
        offset: 0,
        shader_location: 0,
    },
    wgpu::VertexAttributeDescriptor {
        format: wgpu::VertexFormat::Float3,
        offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
        shader_location: 1,
    },
];

impl Vertex {
    pub fn desc<'a>() -> wgpu::VertexBufferDescriptor<'a> {
        wgpu::VertexBufferDescriptor {
            stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::InputStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

const fn vertex(position: [f32; 3], color: [f32; 3]) -> Vertex {
    Vertex { position, color }
}

/// Unit cube centred on the origin, one color per corner.
pub const CUBE_VERTICES: [Vertex; 8] = [
    vertex([0.5, 0.5, 0.5], [1.0, 1.0, 1.0]),
    vertex([0.5, -0.5, 0.5], [1.0, 0.0, 1.0]),
    vertex([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0]),
    vertex([-0.5, 0.5, 0.5], [1.0, 1.0, 0.0]),
    vertex([0.5, 0.5, -0.5], [1.0, 1.0, 0.0]),
    vertex([0.5, -0.5, -0.5], [1.0, 0.0, 0.0]),
    vertex([-0.5, -0.5, -0.5], [0.0, 0.0, 0.0]),
    vertex([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0]),
];

pub const CUBE_INDICES: [u32; 36] = [
    3, 1, 0, 1, 3, 2, // near
    5, 7, 4, 7, 5, 6, // far
    5, 0, 1, 0, 5, 4, // right
    7, 0, 4, 0, 7, 3, // top
    6, 1, 2, 1, 6, 5, // bottom
    6, 3, 7, 3, 6, 2, // left
];

pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32], name: &str) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(format!("{} vertex buffer", name).as_str()),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsage::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(format!("{} index buffer", name).as_str()),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsage::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }

    pub fn cube(device: &wgpu::Device) -> Self {
        Self::new(device, &CUBE_VERTICES, &CUBE_INDICES, "cube")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_stay_in_bounds() {
        assert!(CUBE_INDICES.iter().all(|&i| (i as usize) < CUBE_VERTICES.len()));
    }

    #[test]
    fn every_corner_is_used() {
        for i in 0..CUBE_VERTICES.len() as u32 {
            assert!(CUBE_INDICES.contains(&i), "vertex {} unused", i);
        }
    }

    #[test]
    fn no_degenerate_triangles() {
        for tri in CUBE_INDICES.chunks(3) {
            assert!(tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2]);
        }
    }

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(Vertex::desc().stride, 24);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&CUBE_VERTICES).len(), 8 * 24);
    }
}
