//! Software renderer drawing a section scene into its surface.

use crate::camera::PerspectiveCamera;
use crate::color::Color;
use crate::graphics::{draw_line, draw_triangle};
use crate::scene::{Model, Scene};
use crate::surface::RenderSurface;
use crate::vertex::Vertex;

/// Wireframe edge color
const WIREFRAME_COLOR: Color = Color::rgb8(230, 230, 230);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Shaded,
    Wireframe,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    pub mode: RenderMode,
}

impl Renderer {
    pub fn new(mode: RenderMode) -> Self {
        Renderer { mode }
    }

    /// Clears the surface and draws the scene's model, if any.
    ///
    /// A scene without a model leaves the surface transparent so the
    /// section background shows through.
    pub fn render(&self, scene: &Scene, camera: &PerspectiveCamera, surface: &mut RenderSurface) {
        surface.clear();
        let Some(model) = &scene.model else {
            return;
        };

        let vertices = transform_vertices(model, camera);
        let (width, height) = (surface.width() as f64, surface.height() as f64);

        for triangle in &model.mesh.triangles {
            let [a, b, c] = triangle.indices.map(|i| vertices[i as usize]);
            match self.mode {
                RenderMode::Shaded => {
                    let polygon = clip_polygon(vec![a, b, c]);
                    if polygon.len() < 3 {
                        continue;
                    }
                    let screen: Vec<Vertex> = polygon.iter().map(|v| v.to_screen(width, height)).collect();
                    for i in 1..screen.len() - 1 {
                        draw_triangle(
                            &screen[0],
                            &screen[i],
                            &screen[i + 1],
                            surface,
                            scene,
                            triangle.color,
                            triangle.double_sided,
                        );
                    }
                }
                RenderMode::Wireframe => {
                    for (from, to) in [(a, b), (b, c), (c, a)] {
                        let Some((from, to)) = clip_segment(from, to) else {
                            continue;
                        };
                        let (from, to) = (from.to_screen(width, height), to.to_screen(width, height));
                        draw_line(
                            from.screen_position[0],
                            from.screen_position[1],
                            to.screen_position[0],
                            to.screen_position[1],
                            surface,
                            WIREFRAME_COLOR,
                        );
                    }
                }
            }
        }
    }
}

/// Vertex in homogeneous clip space, carrying what shading needs
#[derive(Debug, Clone, Copy, PartialEq)]
struct ClipVertex {
    clip: [f64; 4],
    position: [f64; 3],
    normal: [f64; 3],
}

impl ClipVertex {
    fn lerp(&self, other: &ClipVertex, t: f64) -> ClipVertex {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        ClipVertex {
            clip: std::array::from_fn(|i| mix(self.clip[i], other.clip[i])),
            position: std::array::from_fn(|i| mix(self.position[i], other.position[i])),
            normal: std::array::from_fn(|i| mix(self.normal[i], other.normal[i])),
        }
    }

    /// Signed distance from the near plane, negative on the camera side
    fn near_distance(&self) -> f64 {
        self.clip[2] + self.clip[3]
    }

    /// Signed distance to the far plane, negative beyond it
    fn far_distance(&self) -> f64 {
        self.clip[3] - self.clip[2]
    }

    /// Perspective divide and viewport mapping; only valid once clipped
    fn to_screen(&self, width: f64, height: f64) -> Vertex {
        let w = self.clip[3];
        let (x, y, z) = (self.clip[0] / w, self.clip[1] / w, self.clip[2] / w);
        Vertex {
            position: self.position,
            screen_position: [(x + 1.0) * 0.5 * width, (1.0 - y) * 0.5 * height],
            depth: z,
            normal: self.normal,
        }
    }
}

const CLIP_PLANES: [fn(&ClipVertex) -> f64; 2] = [ClipVertex::near_distance, ClipVertex::far_distance];

/// Clips a convex polygon against the near and far planes
fn clip_polygon(mut polygon: Vec<ClipVertex>) -> Vec<ClipVertex> {
    for distance in CLIP_PLANES {
        let mut clipped = Vec::with_capacity(polygon.len() + 1);
        for (i, current) in polygon.iter().enumerate() {
            let next = &polygon[(i + 1) % polygon.len()];
            let (d_current, d_next) = (distance(current), distance(next));
            if d_current >= 0.0 {
                clipped.push(*current);
            }
            if (d_current >= 0.0) != (d_next >= 0.0) {
                clipped.push(current.lerp(next, d_current / (d_current - d_next)));
            }
        }
        polygon = clipped;
        if polygon.is_empty() {
            break;
        }
    }
    polygon
}

/// Clips a line segment against the near and far planes
fn clip_segment(mut a: ClipVertex, mut b: ClipVertex) -> Option<(ClipVertex, ClipVertex)> {
    for distance in CLIP_PLANES {
        let (da, db) = (distance(&a), distance(&b));
        match (da >= 0.0, db >= 0.0) {
            (true, true) => {}
            (false, false) => return None,
            (true, false) => b = a.lerp(&b, da / (da - db)),
            (false, true) => a = a.lerp(&b, da / (da - db)),
        }
    }
    Some((a, b))
}

/// Transforms every mesh vertex into world space and then clip space
fn transform_vertices(model: &Model, camera: &PerspectiveCamera) -> Vec<ClipVertex> {
    let mesh = &model.mesh;
    mesh.positions
        .iter()
        .enumerate()
        .map(|(index, local)| {
            let position = model.to_world(local);
            let normal = mesh
                .normals
                .get(index)
                .map(|n| model.normal_to_world(n))
                .unwrap_or([0.0, 0.0, 1.0]);
            ClipVertex {
                clip: camera.clip_position(&position),
                position,
                normal,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraFit, FIELD_OF_VIEW_DEGREES};
    use crate::scene::{Mesh, Triangle, DEFAULT_BASE_COLOR};
    use crate::test_utils::unit_cube;

    /// A thin slab facing the camera, so the fit leaves a border around it
    fn fitted_scene(surface: &RenderSurface) -> (Scene, PerspectiveCamera) {
        let mut scene = Scene::new();
        let mut slab = unit_cube();
        for position in &mut slab.positions {
            position[2] *= 0.05;
        }
        slab.compute_normals();
        let model = Model::new(slab);
        let fit = CameraFit::compute(&model.world_bounding_box(), FIELD_OF_VIEW_DEGREES).unwrap();
        scene.model = Some(model);
        let (w, h) = surface.css_size();
        let mut camera = PerspectiveCamera::new(FIELD_OF_VIEW_DEGREES, w / h, 0.1, 10000.0);
        camera.apply_fit(&fit);
        (scene, camera)
    }

    #[test]
    fn empty_scene_leaves_surface_transparent() {
        let mut surface = RenderSurface::new(16.0, 16.0, 1.0);
        let camera = PerspectiveCamera::new(FIELD_OF_VIEW_DEGREES, 1.0, 0.1, 10000.0);
        Renderer::default().render(&Scene::new(), &camera, &mut surface);
        assert!(surface.pixels().iter().all(|p| *p == Color::TRANSPARENT));
    }

    #[test]
    fn fitted_slab_covers_the_center_but_not_the_corners() {
        let mut surface = RenderSurface::new(32.0, 32.0, 1.0);
        let (scene, camera) = fitted_scene(&surface);
        Renderer::default().render(&scene, &camera, &mut surface);
        assert_eq!(surface.pixel(16, 16).a, 255);
        assert_eq!(surface.pixel(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn wireframe_draws_edges_only() {
        let mut surface = RenderSurface::new(32.0, 32.0, 1.0);
        let (scene, camera) = fitted_scene(&surface);
        Renderer::new(RenderMode::Wireframe).render(&scene, &camera, &mut surface);
        let drawn = surface.pixels().iter().filter(|p| **p == WIREFRAME_COLOR).count();
        assert!(drawn > 0);
        assert!(drawn < 32 * 32 / 2);
    }

    /// Triangle reaching from in front of the camera to behind it
    fn scene_crossing_near_plane() -> (Scene, PerspectiveCamera) {
        let mesh = Mesh {
            positions: vec![[-1.0, -1.0, -2.0], [1.0, -1.0, -2.0], [0.0, 0.0, 1.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            triangles: vec![Triangle {
                indices: [0, 1, 2],
                color: DEFAULT_BASE_COLOR,
                double_sided: true,
            }],
        };
        let mut scene = Scene::new();
        scene.model = Some(Model::new(mesh));
        let camera = PerspectiveCamera::new(90.0, 1.0, 1.0, 100.0);
        (scene, camera)
    }

    #[test]
    fn triangles_crossing_the_near_plane_are_clipped_not_dropped() {
        let mut surface = RenderSurface::new(32.0, 32.0, 1.0);
        let (scene, camera) = scene_crossing_near_plane();
        Renderer::default().render(&scene, &camera, &mut surface);

        // Visible part spans ndc y from -0.5 (z = -2) to -2/3 (near plane)
        assert_eq!(surface.pixel(16, 25).a, 255);
        assert_eq!(surface.pixel(16, 10), Color::TRANSPARENT);

        let mut surface = RenderSurface::new(32.0, 32.0, 1.0);
        Renderer::new(RenderMode::Wireframe).render(&scene, &camera, &mut surface);
        assert!(surface.pixels().iter().any(|p| *p == WIREFRAME_COLOR));
    }

    #[test]
    fn polygon_behind_the_camera_is_discarded() {
        let camera = PerspectiveCamera::new(90.0, 1.0, 1.0, 100.0);
        let vertex = |z: f64| ClipVertex {
            clip: camera.clip_position(&[0.0, 0.0, z]),
            position: [0.0, 0.0, z],
            normal: [0.0, 0.0, 1.0],
        };
        assert!(clip_polygon(vec![vertex(1.0), vertex(2.0), vertex(0.5)]).is_empty());
        assert_eq!(clip_polygon(vec![vertex(-2.0), vertex(-3.0), vertex(-4.0)]).len(), 3);

        let (near, _) = clip_segment(vertex(0.5), vertex(-2.0)).unwrap();
        assert!((near.clip[3] - 1.0).abs() < 1e-9);
    }
}
