use glam::Vec3;

use super::Vertex;

/// Outward normal and in-plane axes of each cube face. `u x v == normal`, so
/// corners emitted in (-u-v, +u-v, +u+v, -u+v) order wind counter-clockwise
/// seen from outside.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

/// Vertices and indices of a cube with edge `size` centered at the origin.
///
/// Four vertices per face so each face gets its own normal and a full 0..1
/// texture square.
pub fn cube_geometry(size: f32) -> (Vec<Vertex>, Vec<u32>) {
    let h = size * 0.5;
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, u, v) in CUBE_FACES {
        let base = vertices.len() as u32;
        let corners = [
            (-u - v, [0.0, 1.0]),
            (u - v, [1.0, 1.0]),
            (u + v, [1.0, 0.0]),
            (-u + v, [0.0, 0.0]),
        ];

        for (offset, tex_coord) in corners {
            let position = (normal + offset) * h;
            vertices.push(Vertex::new(position.into(), normal.into(), tex_coord));
        }

        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    (vertices, indices)
}
