//! Fixtures shared by unit tests.

use crate::scene::{Mesh, Triangle, DEFAULT_BASE_COLOR};

/// Two-unit cube centered on the origin with outward winding
pub fn unit_cube() -> Mesh {
    let positions = vec![
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
    ];
    let faces = [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 4, 7, 3],
        [1, 2, 6, 5],
        [0, 1, 5, 4],
        [3, 7, 6, 2],
    ];
    let triangles = faces
        .iter()
        .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
        .map(|indices| Triangle {
            indices,
            color: DEFAULT_BASE_COLOR,
            double_sided: false,
        })
        .collect();
    let mut mesh = Mesh {
        positions,
        normals: Vec::new(),
        triangles,
    };
    mesh.compute_normals();
    mesh
}
