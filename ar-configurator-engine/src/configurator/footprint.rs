use serde::{Deserialize, Serialize};

use super::shapes::Bounds3;

/// Axis-aligned extent of the placed product, in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Footprint {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub area: f32,
}

impl Footprint {
    /// Width is the X extent, depth Z, height Y. Empty bounds measure zero.
    pub fn from_bounds(bounds: &Bounds3) -> Self {
        let size = bounds.size();
        Self {
            width: size.x,
            depth: size.z,
            height: size.y,
            area: size.x * size.z,
        }
    }
}

/// Footprint as displayed and exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintText {
    pub w: String,
    pub d: String,
    pub h: String,
    pub area: String,
}

const BLANK: &str = "-";

impl FootprintText {
    pub fn blank() -> Self {
        Self {
            w: BLANK.to_string(),
            d: BLANK.to_string(),
            h: BLANK.to_string(),
            area: BLANK.to_string(),
        }
    }

    pub fn from_footprint(footprint: Option<&Footprint>) -> Self {
        let Some(fp) = footprint else {
            return Self::blank();
        };
        Self {
            w: format!("{:.2} m", fp.width),
            d: format!("{:.2} m", fp.depth),
            h: format!("{:.2} m", fp.height),
            area: format!("{:.2} m²", fp.area),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;

    #[test]
    fn measures_extents_and_area() {
        let bounds = Bounds3::new(Vec3::new(-0.37, 0.0, -0.37), Vec3::new(0.37, 0.35, 0.37));
        let fp = Footprint::from_bounds(&bounds);

        assert!((fp.width - 0.74).abs() < 1.0e-6);
        assert!((fp.height - 0.35).abs() < 1.0e-6);
        assert!((fp.area - 0.74 * 0.74).abs() < 1.0e-6);

        let text = FootprintText::from_footprint(Some(&fp));
        assert_eq!(text.w, "0.74 m");
        assert_eq!(text.h, "0.35 m");
        assert_eq!(text.area, "0.55 m²");
    }

    #[test]
    fn unmeasured_footprint_reads_blank() {
        assert_eq!(FootprintText::from_footprint(None), FootprintText::blank());
        assert_eq!(Footprint::from_bounds(&Bounds3::EMPTY), Footprint::default());
    }
}
