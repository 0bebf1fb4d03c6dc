use bevy::math::Affine3A;
use bevy::prelude::*;

use super::color::ColorHex;

/// Axis-aligned bounds. An empty box has `min > max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Bounds3 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Bounds3 {
    pub const EMPTY: Self = Self {
        min: Vec3::INFINITY,
        max: Vec3::NEG_INFINITY,
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: max.max(min),
        }
    }

    pub fn from_half_extents(center: Vec3, half: Vec3) -> Self {
        Self::new(center - half, center + half)
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut bounds = Self::EMPTY;
        for p in points {
            bounds.include_point(p);
        }
        bounds
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn include_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Bounds3) -> Bounds3 {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Bounds3 {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn expanded(&self, by: f32) -> Bounds3 {
        if self.is_empty() {
            return *self;
        }
        Bounds3 {
            min: self.min - Vec3::splat(by),
            max: self.max + Vec3::splat(by),
        }
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            self.max - self.min
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Axis-aligned box enclosing this box after an affine transform.
    pub fn transformed(&self, xf: &Affine3A) -> Bounds3 {
        if self.is_empty() {
            return *self;
        }
        Bounds3::from_points(self.corners().into_iter().map(|c| xf.transform_point3(c)))
    }
}

/// Primitive geometry of a single part, in part-local space.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Cuboid { size: Vec3 },
    /// Axis along local Y, centred on the origin.
    Cylinder { radius: f32, height: f32, open_ended: bool },
    /// Ring lying flat in the XZ plane.
    Torus { major_radius: f32, minor_radius: f32 },
    /// Circular tube swept along a sampled centreline.
    Tube { path: Vec<Vec3>, radius: f32 },
}

impl Shape {
    pub fn local_bounds(&self) -> Bounds3 {
        match self {
            Shape::Cuboid { size } => Bounds3::from_half_extents(Vec3::ZERO, *size * 0.5),
            Shape::Cylinder { radius, height, .. } => {
                Bounds3::from_half_extents(Vec3::ZERO, Vec3::new(*radius, height * 0.5, *radius))
            }
            Shape::Torus {
                major_radius,
                minor_radius,
            } => {
                let outer = major_radius + minor_radius;
                Bounds3::from_half_extents(Vec3::ZERO, Vec3::new(outer, *minor_radius, outer))
            }
            Shape::Tube { path, radius } => {
                Bounds3::from_points(path.iter().copied()).expanded(*radius)
            }
        }
    }
}

/// Material description of a colourable surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceStyle {
    pub base_color: ColorHex,
    pub opacity: f32,
    pub unlit: bool,
    pub double_sided: bool,
    pub metallic: f32,
    pub roughness: f32,
}

impl SurfaceStyle {
    pub fn lit(base_color: u32, metallic: f32, roughness: f32) -> Self {
        Self {
            base_color: ColorHex::new(base_color),
            opacity: 1.0,
            unlit: false,
            double_sided: false,
            metallic,
            roughness,
        }
    }

    pub fn translucent(base_color: u32, opacity: f32) -> Self {
        Self {
            base_color: ColorHex::new(base_color),
            opacity,
            unlit: true,
            double_sided: false,
            metallic: 0.0,
            roughness: 1.0,
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    pub fn is_translucent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// One mesh of a procedural recipe: shape, placement inside its node, surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: &'static str,
    pub shape: Shape,
    pub offset: Transform,
    pub surface: SurfaceStyle,
}

impl Part {
    pub fn new(name: &'static str, shape: Shape, offset: Transform, surface: SurfaceStyle) -> Self {
        Self {
            name,
            shape,
            offset,
            surface,
        }
    }

    /// Bounds of the part after its offset and the given parent transform.
    pub fn bounds_in(&self, parent: &Affine3A) -> Bounds3 {
        let local = Affine3A::from_scale_rotation_translation(
            self.offset.scale,
            self.offset.rotation,
            self.offset.translation,
        );
        self.shape.local_bounds().transformed(&(*parent * local))
    }
}

/// Samples a centripetal Catmull-Rom spline through `points`.
///
/// Returns `segments + 1` points from the first control point to the last.
/// End tangents are formed by mirroring the neighbouring control point.
pub fn sample_catmull_rom(points: &[Vec3], segments: usize) -> Vec<Vec3> {
    match points.len() {
        0 => return Vec::new(),
        1 => return vec![points[0]; segments + 1],
        _ => {}
    }

    let segments = segments.max(1);
    (0..=segments)
        .map(|i| catmull_rom_point(points, i as f32 / segments as f32))
        .collect()
}

fn catmull_rom_point(points: &[Vec3], t: f32) -> Vec3 {
    let count = points.len();
    let p = (count - 1) as f32 * t;
    let mut index = p.floor() as usize;
    let mut weight = p - index as f32;

    if index >= count - 1 {
        index = count - 2;
        weight = 1.0;
    }

    let p1 = points[index];
    let p2 = points[index + 1];
    let p0 = if index > 0 {
        points[index - 1]
    } else {
        p1 * 2.0 - p2
    };
    let p3 = if index + 2 < count {
        points[index + 2]
    } else {
        p2 * 2.0 - p1
    };

    // Centripetal parameterisation: knot spacing is the square root of chord length.
    let mut dt0 = p0.distance_squared(p1).powf(0.25);
    let mut dt1 = p1.distance_squared(p2).powf(0.25);
    let mut dt2 = p2.distance_squared(p3).powf(0.25);
    if dt1 < 1.0e-4 {
        dt1 = 1.0;
    }
    if dt0 < 1.0e-4 {
        dt0 = dt1;
    }
    if dt2 < 1.0e-4 {
        dt2 = dt1;
    }

    let mut t1 = (p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1;
    let mut t2 = (p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2;
    t1 *= dt1;
    t2 *= dt1;

    let c0 = p1;
    let c1 = t1;
    let c2 = -3.0 * p1 + 3.0 * p2 - 2.0 * t1 - t2;
    let c3 = 2.0 * p1 - 2.0 * p2 + t1 + t2;

    let w2 = weight * weight;
    c0 + c1 * weight + c2 * w2 + c3 * w2 * weight
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1.0e-4)
    }

    #[test]
    fn empty_bounds_are_identity_for_union() {
        let b = Bounds3::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(Bounds3::EMPTY.union(&b), b);
        assert_eq!(b.union(&Bounds3::EMPTY), b);
        assert_eq!(Bounds3::EMPTY.size(), Vec3::ZERO);
    }

    #[test]
    fn rotated_cylinder_bounds_swap_axes() {
        let part = Part::new(
            "pipe",
            Shape::Cylinder {
                radius: 0.06,
                height: 0.36,
                open_ended: false,
            },
            Transform::from_xyz(0.18, 0.23, 0.0).with_rotation(Quat::from_rotation_z(FRAC_PI_2)),
            SurfaceStyle::lit(0xf59e0b, 0.2, 0.4),
        );

        let bounds = part.bounds_in(&Affine3A::IDENTITY);
        assert!(approx(bounds.min, Vec3::new(0.0, 0.17, -0.06)));
        assert!(approx(bounds.max, Vec3::new(0.36, 0.29, 0.06)));
    }

    #[test]
    fn torus_lies_flat() {
        let shape = Shape::Torus {
            major_radius: 0.36,
            minor_radius: 0.01,
        };
        assert!(approx(shape.local_bounds().size(), Vec3::new(0.74, 0.02, 0.74)));
    }

    #[test]
    fn catmull_rom_passes_through_control_points() {
        let controls = [
            Vec3::new(0.18, 0.23, 0.0),
            Vec3::new(0.35, 0.30, 0.10),
            Vec3::new(0.50, 0.20, 0.20),
        ];
        let samples = sample_catmull_rom(&controls, 32);

        assert_eq!(samples.len(), 33);
        assert!(approx(samples[0], controls[0]));
        assert!(approx(samples[16], controls[1]));
        assert!(approx(samples[32], controls[2]));
    }
}
