/// Projected vertex with world position, screen position, depth and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f64; 3],
    pub screen_position: [f64; 2],
    /// Normalized device depth in [-1, 1]
    pub depth: f64,
    pub normal: [f64; 3],
}
