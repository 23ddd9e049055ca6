// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-component placement transforms
//!
//! A [`Transform`] is applied in the fixed order rotate → scale → translate.
//! Rotations compose left to right: `rotate_x(a).rotate_y(b)` rotates about X
//! first, then about Y.

use crate::buffer::GeometryBuffer;
use nalgebra::{Matrix4, Point3, Unit, UnitQuaternion, Vector3};

/// Golden ratio φ = (1 + √5) / 2
pub const PHI: f64 = 1.618_033_988_749_895;

/// Golden angle 2π / φ², in radians
pub const GOLDEN_ANGLE: f64 = std::f64::consts::TAU / (PHI * PHI);

/// Coordinate axis selector for sweeps and twists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Parse an axis key ("x", "y", "z", case-insensitive)
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        }
    }

    #[inline]
    pub fn unit(&self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

/// Rotation, scale and translation placing one compound component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
    pub translation: Vector3<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            translation: Vector3::zeros(),
        }
    }

    /// Append a rotation of `angle` radians about `axis`
    pub fn rotate(self, axis: Vector3<f64>, angle: f64) -> Self {
        let step = UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), angle);
        Self {
            rotation: step * self.rotation,
            ..self
        }
    }

    #[inline]
    pub fn rotate_x(self, angle: f64) -> Self {
        self.rotate(Vector3::x(), angle)
    }

    #[inline]
    pub fn rotate_y(self, angle: f64) -> Self {
        self.rotate(Vector3::y(), angle)
    }

    #[inline]
    pub fn rotate_z(self, angle: f64) -> Self {
        self.rotate(Vector3::z(), angle)
    }

    pub fn uniform_scale(self, factor: f64) -> Self {
        Self {
            scale: self.scale * factor,
            ..self
        }
    }

    pub fn scale_by(self, factors: Vector3<f64>) -> Self {
        Self {
            scale: self.scale.component_mul(&factors),
            ..self
        }
    }

    pub fn translate(self, offset: Vector3<f64>) -> Self {
        Self {
            translation: self.translation + offset,
            ..self
        }
    }

    /// Apply rotate → scale → translate to a point
    #[inline]
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        let rotated = self.rotation.transform_point(point);
        Point3::from(rotated.coords.component_mul(&self.scale) + self.translation)
    }

    /// Image of the local origin
    #[inline]
    pub fn origin(&self) -> Point3<f64> {
        Point3::from(self.translation)
    }

    /// Homogeneous matrix equivalent of [`Transform::apply`]
    pub fn to_matrix(&self) -> Matrix4<f64> {
        let rotation = self.rotation.to_homogeneous();
        let scale = Matrix4::new_nonuniform_scaling(&self.scale);
        let translation = Matrix4::new_translation(&self.translation);
        translation * scale * rotation
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Apply a transform to every position of a buffer in place.
///
/// Normals are left untouched; the assembler recomputes them after merging.
pub fn apply_transform(buffer: &mut GeometryBuffer, transform: &Transform) {
    if transform.is_identity() {
        return;
    }
    buffer.positions.chunks_exact_mut(3).for_each(|chunk| {
        let p = transform.apply(&Point3::new(
            chunk[0] as f64,
            chunk[1] as f64,
            chunk[2] as f64,
        ));
        chunk[0] = p.x as f32;
        chunk[1] = p.y as f32;
        chunk[2] = p.z as f32;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, TAU};

    #[test]
    fn test_golden_angle_is_exact() {
        let phi = (1.0 + 5.0f64.sqrt()) / 2.0;
        assert_relative_eq!(PHI, phi, max_relative = 1e-15);
        assert_relative_eq!(GOLDEN_ANGLE, TAU / (phi * phi), max_relative = 1e-15);
        assert_relative_eq!(GOLDEN_ANGLE, 2.399_963_229_728_653, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_then_scale_then_translate() {
        let t = Transform::identity()
            .rotate_z(FRAC_PI_2)
            .scale_by(Vector3::new(2.0, 3.0, 1.0))
            .translate(Vector3::new(0.0, 0.0, 5.0));
        // (1,0,0) rotates to (0,1,0), scales to (0,3,0), translates to (0,3,5)
        let p = t.apply(&Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 3.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotations_compose_in_call_order() {
        let t = Transform::identity().rotate_x(FRAC_PI_2).rotate_z(FRAC_PI_2);
        // X rotation takes (0,1,0) to (0,0,1); Z rotation leaves it there
        let p = t.apply(&Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(p.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_matrix_matches_apply() {
        let t = Transform::identity()
            .rotate_y(0.7)
            .rotate_x(-0.3)
            .uniform_scale(1.5)
            .translate(Vector3::new(0.1, -0.2, 0.3));
        let p = Point3::new(0.4, 0.5, -0.6);
        let a = t.apply(&p);
        let b = t.to_matrix().transform_point(&p);
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }

    #[test]
    fn test_axis_from_key() {
        assert_eq!(Axis::from_key("Y"), Some(Axis::Y));
        assert_eq!(Axis::from_key(" z "), Some(Axis::Z));
        assert_eq!(Axis::from_key("w"), None);
    }
}
