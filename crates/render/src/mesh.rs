use bytemuck::{Pod, Zeroable};

/// Cube vertex: object-space position and texture coordinate.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct CubeVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

const fn v(position: [f32; 3], uv: [f32; 2]) -> CubeVertex {
    CubeVertex { position, uv }
}

const P: f32 = 0.5;

/// Unit cube centred on the origin, four vertices per face.
#[rustfmt::skip]
pub const CUBE_VERTICES: [CubeVertex; 24] = [
    // +Z
    v([-P, -P,  P], [0.0, 0.0]), v([ P, -P,  P], [1.0, 0.0]),
    v([ P,  P,  P], [1.0, 1.0]), v([-P,  P,  P], [0.0, 1.0]),
    // -Z
    v([ P, -P, -P], [0.0, 0.0]), v([-P, -P, -P], [1.0, 0.0]),
    v([-P,  P, -P], [1.0, 1.0]), v([ P,  P, -P], [0.0, 1.0]),
    // +X
    v([ P, -P,  P], [0.0, 0.0]), v([ P, -P, -P], [1.0, 0.0]),
    v([ P,  P, -P], [1.0, 1.0]), v([ P,  P,  P], [0.0, 1.0]),
    // -X
    v([-P, -P, -P], [0.0, 0.0]), v([-P, -P,  P], [1.0, 0.0]),
    v([-P,  P,  P], [1.0, 1.0]), v([-P,  P, -P], [0.0, 1.0]),
    // +Y
    v([-P,  P,  P], [0.0, 0.0]), v([ P,  P,  P], [1.0, 0.0]),
    v([ P,  P, -P], [1.0, 1.0]), v([-P,  P, -P], [0.0, 1.0]),
    // -Y
    v([-P, -P, -P], [0.0, 0.0]), v([ P, -P, -P], [1.0, 0.0]),
    v([ P, -P,  P], [1.0, 1.0]), v([-P, -P,  P], [0.0, 1.0]),
];

/// Counter-clockwise when viewed from outside.
#[rustfmt::skip]
pub const CUBE_INDICES: [u32; 36] = [
    0, 1, 2, 2, 3, 0,
    4, 5, 6, 6, 7, 4,
    8, 9, 10, 10, 11, 8,
    12, 13, 14, 14, 15, 12,
    16, 17, 18, 18, 19, 16,
    20, 21, 22, 22, 23, 20,
];

pub const CUBE_VERTEX_STRIDE: usize = std::mem::size_of::<CubeVertex>();
