/// User-facing view state of the showcase
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewState {
    /// Page scroll offset in CSS px
    pub scroll_y: f64,
    /// Enable debug overlay
    pub debug: bool,
    /// Wireframe mode enabled
    pub wireframe: bool,
}
