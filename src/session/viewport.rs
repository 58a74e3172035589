use eframe::egui::Vec2;

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 10.0;

/// Translate-then-scale transform applied to the whole content group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    /// Layout coordinates to container coordinates.
    pub fn apply(&self, point: Vec2) -> Vec2 {
        point * self.scale + self.translate
    }

    /// Container coordinates to layout coordinates.
    pub fn invert(&self, point: Vec2) -> Vec2 {
        (point - self.translate) / self.scale
    }
}

/// Pan/zoom state. Gestures only ever change this transform, never the
/// layout coordinates of individual nodes.
#[derive(Clone, Debug, Default)]
pub struct Viewport {
    transform: Transform,
}

impl Viewport {
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Scales by `factor` around `anchor` (container coordinates), keeping
    /// the layout point under the anchor fixed.
    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let world = self.transform.invert(anchor);
        let scale = (self.transform.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.transform = Transform {
            translate: anchor - world * scale,
            scale,
        };
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if delta.x.is_finite() && delta.y.is_finite() {
            self.transform.translate += delta;
        }
    }

    pub fn reset(&mut self) {
        self.transform = Transform::IDENTITY;
    }
}

/// Zoom factor for a wheel delta in points, matching the usual
/// exponential wheel response.
pub fn wheel_zoom_factor(scroll_delta: f32) -> f32 {
    2.0_f32.powf(scroll_delta * 0.002)
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn zoom_keeps_the_anchor_fixed() {
        let mut viewport = Viewport::default();
        let anchor = vec2(200.0, 150.0);
        let world_before = viewport.transform().invert(anchor);

        viewport.zoom_at(anchor, 2.5);
        let world_after = viewport.transform().invert(anchor);

        assert!((world_before - world_after).length() < 1e-4);
        assert_eq!(viewport.transform().scale, 2.5);
    }

    #[test]
    fn scale_is_clamped() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(Vec2::ZERO, 1_000.0);
        assert_eq!(viewport.transform().scale, MAX_SCALE);

        viewport.zoom_at(Vec2::ZERO, 1e-6);
        assert_eq!(viewport.transform().scale, MIN_SCALE);

        viewport.zoom_at(Vec2::ZERO, f32::NAN);
        assert_eq!(viewport.transform().scale, MIN_SCALE);
    }

    #[test]
    fn pan_moves_only_the_translation() {
        let mut viewport = Viewport::default();
        viewport.zoom_at(Vec2::ZERO, 2.0);
        viewport.pan_by(vec2(30.0, -10.0));

        let transform = viewport.transform();
        assert_eq!(transform.translate, vec2(30.0, -10.0));
        assert_eq!(transform.apply(vec2(10.0, 10.0)), vec2(50.0, 10.0));

        viewport.reset();
        assert_eq!(viewport.transform(), Transform::IDENTITY);
    }

    #[test]
    fn wheel_factor_is_symmetric() {
        let zoom_in = wheel_zoom_factor(120.0);
        let zoom_out = wheel_zoom_factor(-120.0);
        assert!(zoom_in > 1.0);
        assert!((zoom_in * zoom_out - 1.0).abs() < 1e-5);
    }
}
