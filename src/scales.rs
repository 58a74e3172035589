//! Mappings from domain values to visual attributes.
//!
//! Every factory returns a fresh, independently owned mapping; nothing is
//! shared between two calls.

use eframe::egui::Color32;

/// Tableau10, used for node kinds.
pub const TABLEAU10: [Color32; 10] = [
    Color32::from_rgb(0x4e, 0x79, 0xa7),
    Color32::from_rgb(0xf2, 0x8e, 0x2c),
    Color32::from_rgb(0xe1, 0x57, 0x59),
    Color32::from_rgb(0x76, 0xb7, 0xb2),
    Color32::from_rgb(0x59, 0xa1, 0x4f),
    Color32::from_rgb(0xed, 0xc9, 0x49),
    Color32::from_rgb(0xaf, 0x7a, 0xa1),
    Color32::from_rgb(0xff, 0x9d, 0xa7),
    Color32::from_rgb(0x9c, 0x75, 0x5f),
    Color32::from_rgb(0xba, 0xb0, 0xab),
];

/// ColorBrewer Set2, used for link kinds.
pub const SET2: [Color32; 8] = [
    Color32::from_rgb(0x66, 0xc2, 0xa5),
    Color32::from_rgb(0xfc, 0x8d, 0x62),
    Color32::from_rgb(0x8d, 0xa0, 0xcb),
    Color32::from_rgb(0xe7, 0x8a, 0xc3),
    Color32::from_rgb(0xa6, 0xd8, 0x54),
    Color32::from_rgb(0xff, 0xd9, 0x2f),
    Color32::from_rgb(0xe5, 0xc4, 0x94),
    Color32::from_rgb(0xb3, 0xb3, 0xb3),
];

const RADIUS_DOMAIN: (f64, f64) = (0.0, 2000.0);
const RADIUS_RANGE: (f64, f64) = (4.0, 20.0);
const UNKNOWN_RADIUS: f32 = 6.0;

const WEIGHT_DOMAIN: (f64, f64) = (0.0, 20.0);
const WEIGHT_RANGE: (f64, f64) = (1.0, 8.0);

/// Categorical scale: the n-th distinct kind seen gets the n-th palette
/// color, wrapping once the palette is exhausted.
#[derive(Clone, Debug, PartialEq)]
pub struct OrdinalScale {
    palette: &'static [Color32],
    domain: Vec<String>,
}

impl OrdinalScale {
    fn new(palette: &'static [Color32]) -> Self {
        Self {
            palette,
            domain: Vec::new(),
        }
    }

    pub fn color(&mut self, kind: &str) -> Color32 {
        let slot = match self.domain.iter().position(|known| known == kind) {
            Some(slot) => slot,
            None => {
                self.domain.push(kind.to_owned());
                self.domain.len() - 1
            }
        };
        self.palette[slot % self.palette.len()]
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}

/// Square-root scale clamped to its domain, so visual area grows linearly
/// with the magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SqrtScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if value.is_nan() {
            return r0;
        }

        let value = value.clamp(d0, d1);
        let span = d1.sqrt() - d0.sqrt();
        if span.abs() < f64::EPSILON {
            return r0;
        }
        let t = (value.sqrt() - d0.sqrt()) / span;
        r0 + (t * (r1 - r0))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusScale {
    scale: SqrtScale,
}

impl RadiusScale {
    /// Marker radius for a lines-of-code count; unknown counts get a fixed
    /// radius distinct from the known-zero radius.
    pub fn radius(&self, loc: Option<f64>) -> f32 {
        match loc {
            Some(loc) => self.scale.map(loc) as f32,
            None => UNKNOWN_RADIUS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightScale {
    scale: SqrtScale,
}

impl WeightScale {
    pub fn width(&self, weight: f64) -> f32 {
        self.scale.map(weight) as f32
    }
}

pub fn node_color_scale() -> OrdinalScale {
    OrdinalScale::new(&TABLEAU10)
}

pub fn link_color_scale() -> OrdinalScale {
    OrdinalScale::new(&SET2)
}

pub fn radius_scale() -> RadiusScale {
    RadiusScale {
        scale: SqrtScale::new(RADIUS_DOMAIN, RADIUS_RANGE),
    }
}

pub fn weight_scale() -> WeightScale {
    WeightScale {
        scale: SqrtScale::new(WEIGHT_DOMAIN, WEIGHT_RANGE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn radius_clamps_and_handles_unknown() {
        let scale = radius_scale();
        assert!(close(scale.radius(Some(0.0)), 4.0));
        assert!(close(scale.radius(Some(2000.0)), 20.0));
        assert!(close(scale.radius(Some(5000.0)), 20.0));
        assert!(close(scale.radius(Some(-50.0)), 4.0));
        assert!(close(scale.radius(None), 6.0));
        assert!(close(scale.radius(Some(500.0)), 12.0));
    }

    #[test]
    fn radius_is_monotonic_until_the_clamp() {
        let scale = radius_scale();
        let mut previous = scale.radius(Some(0.0));
        for loc in (0..=2500).step_by(50) {
            let radius = scale.radius(Some(loc as f64));
            assert!(radius >= previous);
            assert_eq!(radius, scale.radius(Some(loc as f64)));
            previous = radius;
        }
    }

    #[test]
    fn weight_maps_to_stroke_width() {
        let scale = weight_scale();
        assert!(close(scale.width(0.0), 1.0));
        assert!(close(scale.width(20.0), 8.0));
        assert!(close(scale.width(100.0), 8.0));
        assert!(close(scale.width(5.0), 4.5));
    }

    #[test]
    fn ordinal_scale_assigns_first_seen_slots() {
        let mut scale = node_color_scale();
        assert_eq!(scale.color("script"), TABLEAU10[0]);
        assert_eq!(scale.color("scene"), TABLEAU10[1]);
        assert_eq!(scale.color("script"), TABLEAU10[0]);
        assert_eq!(scale.domain(), ["script", "scene"]);
    }

    #[test]
    fn ordinal_scale_keeps_a_color_per_kind_past_the_palette() {
        let mut scale = link_color_scale();
        let kinds = (0..12).map(|index| format!("kind-{index}")).collect::<Vec<_>>();
        let first = kinds
            .iter()
            .map(|kind| scale.color(kind))
            .collect::<Vec<_>>();
        let second = kinds
            .iter()
            .map(|kind| scale.color(kind))
            .collect::<Vec<_>>();
        assert_eq!(first, second);
    }

    #[test]
    fn factories_return_independent_mappings() {
        let mut first = node_color_scale();
        let second = node_color_scale();
        assert_eq!(first, second);

        first.color("script");
        assert_ne!(first, second);
        assert!(second.domain().is_empty());

        let mut nodes = node_color_scale();
        let mut links = link_color_scale();
        assert_eq!(nodes.color("calls"), TABLEAU10[0]);
        assert_eq!(links.color("preload"), SET2[0]);
        assert_eq!(links.color("calls"), SET2[1]);
    }
}
