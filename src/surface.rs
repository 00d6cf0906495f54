use crate::color::Color;

/// Per-section render target with a color and a depth buffer.
///
/// The logical size is in CSS pixels; the buffers are allocated in device
/// pixels (`css size * pixel_ratio`).
#[derive(Debug, Clone)]
pub struct RenderSurface {
    css_width: f64,
    css_height: f64,
    pixel_ratio: f64,
    width: usize,
    height: usize,
    pixels: Vec<Color>,
    depth: Vec<f64>,
}

impl RenderSurface {
    pub fn new(css_width: f64, css_height: f64, pixel_ratio: f64) -> Self {
        let mut surface = RenderSurface {
            css_width: 0.0,
            css_height: 0.0,
            pixel_ratio,
            width: 0,
            height: 0,
            pixels: Vec::new(),
            depth: Vec::new(),
        };
        surface.set_size(css_width, css_height);
        surface
    }

    /// Resizes the surface; the buffers are cleared
    pub fn set_size(&mut self, css_width: f64, css_height: f64) {
        self.css_width = css_width;
        self.css_height = css_height;
        self.width = device_pixels(css_width, self.pixel_ratio);
        self.height = device_pixels(css_height, self.pixel_ratio);
        self.pixels = vec![Color::TRANSPARENT; self.width * self.height];
        self.depth = vec![f64::INFINITY; self.width * self.height];
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.pixel_ratio = pixel_ratio;
        self.set_size(self.css_width, self.css_height);
    }

    /// Clears to transparent and resets depth
    pub fn clear(&mut self) {
        self.pixels.fill(Color::TRANSPARENT);
        self.depth.fill(f64::INFINITY);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn css_size(&self) -> (f64, f64) {
        (self.css_width, self.css_height)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Writes a pixel if `depth` passes the depth test
    pub fn plot(&mut self, x: usize, y: usize, depth: f64, color: Color) {
        let offset = y * self.width + x;
        if depth < self.depth[offset] {
            self.depth[offset] = depth;
            self.pixels[offset] = color;
        }
    }

    /// Writes a pixel without touching the depth buffer
    pub fn put(&mut self, x: usize, y: usize, color: Color) {
        let offset = y * self.width + x;
        self.pixels[offset] = color;
    }
}

fn device_pixels(css: f64, pixel_ratio: f64) -> usize {
    let scaled = (css * pixel_ratio).round();
    if scaled.is_finite() && scaled >= 1.0 {
        scaled as usize
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_are_sized_in_device_pixels() {
        let surface = RenderSurface::new(800.0, 600.0, 2.0);
        assert_eq!((surface.width(), surface.height()), (1600, 1200));
        assert_eq!(surface.pixels().len(), 1600 * 1200);
    }

    #[test]
    fn terminal_ratio_maps_cells_to_half_blocks() {
        let surface = RenderSurface::new(80.0 * 8.0, 24.0 * 16.0, 0.125);
        assert_eq!((surface.width(), surface.height()), (80, 48));
    }

    #[test]
    fn depth_test_keeps_nearest_fragment() {
        let mut surface = RenderSurface::new(2.0, 2.0, 1.0);
        surface.plot(0, 0, 0.5, Color::WHITE);
        surface.plot(0, 0, 0.9, Color::BLACK);
        assert_eq!(surface.pixel(0, 0), Color::WHITE);
        surface.clear();
        assert_eq!(surface.pixel(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn resize_keeps_pixel_ratio() {
        let mut surface = RenderSurface::new(10.0, 10.0, 0.5);
        surface.set_size(40.0, 20.0);
        assert_eq!((surface.width(), surface.height()), (20, 10));
        assert_eq!(surface.css_size(), (40.0, 20.0));
    }
}
