//! Scene graph for a single section: one optional model and two lights.

use crate::color::Color;
use crate::math::{add, calculate_normal, multiply_matrix_vector, normalize, rotation_y, Aabb};

/// Default surface color for primitives without a material
pub const DEFAULT_BASE_COLOR: Color = Color::rgb8(200, 200, 200);

/// Triangle referencing three mesh vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub indices: [u32; 3],
    pub color: Color,
    pub double_sided: bool,
}

/// Triangle mesh in model space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Fills in smooth vertex normals by accumulating face normals
    pub fn compute_normals(&mut self) {
        let mut normals = vec![[0.0; 3]; self.positions.len()];
        for triangle in &self.triangles {
            let [a, b, c] = triangle.indices.map(|i| i as usize);
            let normal = calculate_normal(&self.positions[a], &self.positions[b], &self.positions[c]);
            for index in [a, b, c] {
                normals[index] = add(&normals[index], &normal);
            }
        }
        self.normals = normals.iter().map(normalize).collect();
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_points(self.positions.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// A mesh placed in the scene with a translation and a yaw about +Y
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub mesh: Mesh,
    pub position: [f64; 3],
    pub yaw: f64,
}

impl Model {
    pub fn new(mesh: Mesh) -> Self {
        Model {
            mesh,
            position: [0.0; 3],
            yaw: 0.0,
        }
    }

    /// Rotates the model about its local vertical axis
    pub fn rotate_on_vertical_axis(&mut self, angle: f64) {
        self.yaw += angle;
    }

    /// Maps a model-space point into world space (rotation, then translation)
    pub fn to_world(&self, point: &[f64; 3]) -> [f64; 3] {
        add(&multiply_matrix_vector(&rotation_y(self.yaw), point), &self.position)
    }

    pub fn normal_to_world(&self, normal: &[f64; 3]) -> [f64; 3] {
        multiply_matrix_vector(&rotation_y(self.yaw), normal)
    }

    /// World-space bounding box of the transformed vertices
    pub fn world_bounding_box(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for position in &self.mesh.positions {
            aabb.expand(&self.to_world(position));
        }
        aabb
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f64,
}

/// Light shining from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f64,
    pub position: [f64; 3],
}

impl DirectionalLight {
    /// Unit vector pointing from the scene towards the light
    pub fn direction(&self) -> [f64; 3] {
        normalize(&self.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub model: Option<Model>,
}

impl Scene {
    /// Empty scene with the showcase lighting rig
    pub fn new() -> Self {
        Scene {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.6,
            },
            directional: DirectionalLight {
                color: Color::WHITE,
                intensity: 1.0,
                position: [5.0, 10.0, 7.5],
            },
            model: None,
        }
    }

    /// Light intensity reaching a surface with the given world normal
    pub fn light_intensity(&self, normal: &[f64; 3]) -> f64 {
        let diffuse = crate::math::dot(normal, &self.directional.direction()).max(0.0);
        self.ambient.intensity + self.directional.intensity * diffuse
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::unit_cube;
    use std::f64::consts::PI;

    #[test]
    fn cube_normals_point_outwards() {
        let mesh = unit_cube();
        for (position, normal) in mesh.positions.iter().zip(&mesh.normals) {
            assert!(crate::math::dot(position, normal) > 0.0);
        }
    }

    #[test]
    fn world_transform_rotates_before_translating() {
        let mut model = Model::new(unit_cube());
        model.position = [10.0, 0.0, 0.0];
        model.rotate_on_vertical_axis(PI);
        let world = model.to_world(&[1.0, 0.0, 0.0]);
        assert!((world[0] - 9.0).abs() < 1e-12);
        assert!(world[2].abs() < 1e-12);
    }

    #[test]
    fn lights_match_the_showcase_rig() {
        let scene = Scene::new();
        assert_eq!(scene.ambient.intensity, 0.6);
        assert_eq!(scene.directional.intensity, 1.0);
        assert_eq!(scene.directional.position, [5.0, 10.0, 7.5]);
        assert!(scene.model.is_none());
        let facing = scene.directional.direction();
        assert!((scene.light_intensity(&facing) - 1.6).abs() < 1e-12);
        let away = facing.map(|c| -c);
        assert!((scene.light_intensity(&away) - 0.6).abs() < 1e-12);
    }
}
