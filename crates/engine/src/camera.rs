use crate::geometry::{Rect, Vec2};

/// Scroll camera for the rendering collaborator: follows an actor rectangle
/// in world pixels and produces a render offset. Scrolling is clamped to the
/// level bounds, so the view never shows space outside the world; levels
/// smaller than the viewport pin to the origin.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    viewport: Vec2,
    scroll: Vec2,
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport: Vec2::new(viewport_width, viewport_height),
            scroll: Vec2::default(),
        }
    }

    pub fn follow(&mut self, target: Rect, bounds: Rect) {
        let center = target.center();
        self.scroll = Vec2 {
            x: clamp_axis(center.x - self.viewport.x / 2.0, bounds.width, self.viewport.x),
            y: clamp_axis(center.y - self.viewport.y / 2.0, bounds.height, self.viewport.y),
        };
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Offset to add to a world-space rectangle to place it on screen.
    pub fn render_offset(&self) -> Vec2 {
        Vec2 {
            x: -self.scroll.x,
            y: -self.scroll.y,
        }
    }
}

fn clamp_axis(scroll: f32, world_extent: f32, viewport_extent: f32) -> f32 {
    let max_scroll = (world_extent - viewport_extent).max(0.0);
    scroll.clamp(0.0, max_scroll)
}
