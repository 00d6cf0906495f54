//! Perspective camera and the one-shot camera fit.
//!
//! The camera sits on the +Z axis looking down -Z with +Y up, so the view
//! transform is a plain translation by `-position`.

use crate::math::{multiply_mat4_vector, sub, Aabb, Mat4};

/// Vertical field of view used by every section camera
pub const FIELD_OF_VIEW_DEGREES: f64 = 75.0;
/// Clip planes used until the camera is fitted to a model
pub const DEFAULT_NEAR: f64 = 0.1;
pub const DEFAULT_FAR: f64 = 10000.0;
/// Extra distance kept between the camera and the fitted model
pub const FIT_MARGIN: f64 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
    pub position: [f64; 3],
    projection: Mat4,
}

impl PerspectiveCamera {
    pub fn new(fov: f64, aspect: f64, near: f64, far: f64) -> Self {
        let mut camera = PerspectiveCamera {
            fov,
            aspect,
            near,
            far,
            position: [0.0; 3],
            projection: [[0.0; 4]; 4],
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    /// Recomputes the projection from fov/aspect/near/far
    pub fn update_projection_matrix(&mut self) {
        let f = 1.0 / (self.fov.to_radians() / 2.0).tan();
        let range = self.near - self.far;
        self.projection = [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, (self.far + self.near) / range, 2.0 * self.far * self.near / range],
            [0.0, 0.0, -1.0, 0.0],
        ];
    }

    /// Transforms a world-space point into homogeneous clip space
    pub fn clip_position(&self, point: &[f64; 3]) -> [f64; 4] {
        let view = sub(point, &self.position);
        multiply_mat4_vector(&self.projection, &[view[0], view[1], view[2], 1.0])
    }

    /// Projects a world-space point to normalized device coordinates.
    ///
    /// Returns `None` when the point lies behind the camera or outside the
    /// near/far range.
    pub fn project(&self, point: &[f64; 3]) -> Option<[f64; 3]> {
        let clip = self.clip_position(point);
        if clip[3] <= 0.0 {
            return None;
        }
        let ndc = [clip[0] / clip[3], clip[1] / clip[3], clip[2] / clip[3]];
        if !(-1.0..=1.0).contains(&ndc[2]) {
            return None;
        }
        Some(ndc)
    }

    /// Applies a fit: moves the camera onto the view axis and resets the clip planes
    pub fn apply_fit(&mut self, fit: &CameraFit) {
        self.position = [0.0, 0.0, fit.camera_z];
        self.near = fit.near;
        self.far = fit.far;
        self.update_projection_matrix();
    }
}

/// Result of fitting a camera to a bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFit {
    /// Distance at which the box's largest extent fills the field of view
    pub distance: f64,
    /// Camera position on the view axis, `distance` plus margin
    pub camera_z: f64,
    pub near: f64,
    pub far: f64,
}

impl CameraFit {
    /// Fits a camera with the given vertical field of view to `aabb`.
    ///
    /// Returns `None` for boxes without a positive finite extent.
    pub fn compute(aabb: &Aabb, fov_degrees: f64) -> Option<Self> {
        let max_dim = aabb.max_extent();
        if !max_dim.is_finite() || max_dim <= 0.0 {
            return None;
        }
        let fov = fov_degrees.to_radians();
        let distance = (max_dim / 2.0) / (fov / 2.0).tan();
        Some(CameraFit {
            distance,
            camera_z: distance * FIT_MARGIN,
            near: distance / 10.0,
            far: distance * 10.0,
        })
    }
}
