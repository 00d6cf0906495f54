/// Row-major 4x4 matrix
pub type Mat4 = [[f64; 4]; 4];

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &[[f64; 3]; 3], vector: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies a 4x4 matrix by a homogeneous vector
pub fn multiply_mat4_vector(matrix: &Mat4, vector: &[f64; 4]) -> [f64; 4] {
    let mut result = [0.0; 4];
    for i in 0..4 {
        for j in 0..4 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Rotation about the vertical (Y) axis
pub fn rotation_y(angle: f64) -> [[f64; 3]; 3] {
    let (sin_a, cos_a) = angle.sin_cos();
    [[cos_a, 0.0, sin_a], [0.0, 1.0, 0.0], [-sin_a, 0.0, cos_a]]
}

pub fn add(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Normalizes a vector; the zero vector is returned unchanged
pub fn normalize(v: &[f64; 3]) -> [f64; 3] {
    let length = dot(v, v).sqrt();
    if length == 0.0 {
        return *v;
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

/// Calculates the normal vector of a triangle
pub fn calculate_normal(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3]) -> [f64; 3] {
    normalize(&cross(&sub(b, a), &sub(c, a)))
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Aabb {
    /// An empty box that any point expands
    pub fn empty() -> Self {
        Aabb {
            min: [f64::INFINITY; 3],
            max: [f64::NEG_INFINITY; 3],
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a [f64; 3]>) -> Self {
        let mut aabb = Aabb::empty();
        for point in points {
            aabb.expand(point);
        }
        aabb
    }

    pub fn expand(&mut self, point: &[f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(point[axis]);
            self.max[axis] = self.max[axis].max(point[axis]);
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.max[axis] < self.min[axis])
    }

    pub fn center(&self) -> [f64; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }

    pub fn size(&self) -> [f64; 3] {
        if self.is_empty() {
            return [0.0; 3];
        }
        sub(&self.max, &self.min)
    }

    /// Largest extent across the three axes
    pub fn max_extent(&self) -> f64 {
        let size = self.size();
        size[0].max(size[1]).max(size[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn rotation_y_turns_x_into_negative_z() {
        let rotated = multiply_matrix_vector(&rotation_y(FRAC_PI_2), &[1.0, 0.0, 0.0]);
        assert!(rotated[0].abs() < 1e-12);
        assert!((rotated[2] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn aabb_reports_center_and_extent() {
        let points = [[-1.0, 0.0, 2.0], [3.0, 4.0, 2.5], [0.0, -2.0, 3.0]];
        let aabb = Aabb::from_points(points.iter());
        assert_eq!(aabb.center(), [1.0, 1.0, 2.5]);
        assert_eq!(aabb.size(), [4.0, 6.0, 1.0]);
        assert_eq!(aabb.max_extent(), 6.0);
    }

    #[test]
    fn empty_aabb_has_zero_size() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert_eq!(aabb.max_extent(), 0.0);
    }

    #[test]
    fn normal_of_counter_clockwise_triangle_points_towards_viewer() {
        let normal = calculate_normal(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]);
        assert_eq!(normal, [0.0, 0.0, 1.0]);
    }
}
