use crate::color::Color;
use crate::math::{edge_function, normalize};
use crate::scene::Scene;
use crate::surface::RenderSurface;
use crate::vertex::Vertex;

/// Draws a triangle with per-pixel lighting.
///
/// Back-facing triangles are skipped unless `double_sided` is set, in which
/// case the interpolated normal is flipped.
pub fn draw_triangle(
    v0: &Vertex,
    v1: &Vertex,
    v2: &Vertex,
    surface: &mut RenderSurface,
    scene: &Scene,
    base_color: Color,
    double_sided: bool,
) {
    let width = surface.width();
    let height = surface.height();

    // Precompute area of the triangle
    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area == 0.0 || (area < 0.0 && !double_sided) {
        return;
    }
    let facing = area.signum();

    // Compute bounding box of the triangle
    let min_x = v0.screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0);
    let max_x = v0.screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(width as f64 - 1.0);
    let min_y = v0.screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0);
    let max_y = v0.screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(height as f64 - 1.0);
    if max_x < min_x || max_y < min_y {
        return;
    }

    for y in min_y as usize..=max_y as usize {
        for x in min_x as usize..=max_x as usize {
            let p = [x as f64 + 0.5, y as f64 + 0.5];

            // Normalized barycentric coordinates
            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;

            let normal = normalize(&[
                (v0.normal[0] * w0 + v1.normal[0] * w1 + v2.normal[0] * w2) * facing,
                (v0.normal[1] * w0 + v1.normal[1] * w1 + v2.normal[1] * w2) * facing,
                (v0.normal[2] * w0 + v1.normal[2] * w1 + v2.normal[2] * w2) * facing,
            ]);
            let shaded = base_color.with_intensity(scene.light_intensity(&normal));

            surface.plot(x, y, depth, Color { a: 255, ..shaded });
        }
    }
}

/// Draws a line between two points using Bresenham's algorithm
pub fn draw_line(x0: f64, y0: f64, x1: f64, y1: f64, surface: &mut RenderSurface, color: Color) {
    let width = surface.width() as isize;
    let height = surface.height() as isize;
    let (mut x0, mut y0, x1, y1) = (
        x0.round() as isize,
        y0.round() as isize,
        x1.round() as isize,
        y1.round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && x0 < width && y0 >= 0 && y0 < height {
            surface.put(x0 as usize, y0 as usize, color);
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
