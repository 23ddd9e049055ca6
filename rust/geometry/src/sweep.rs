// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Swept tube geometry - a circular cross-section swept along a closed curve.

use crate::buffer::{GeometryBuffer, ShapeKind, ShapeTags};
use crate::error::{Error, Result};
use crate::normals::compute_normals;
use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;

/// Torus knot tube parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusKnot {
    /// Windings around the rotational axis
    pub p: u32,
    /// Windings through the torus hole
    pub q: u32,
    /// Overall radius of the knot
    pub radius: f64,
    /// Radius of the swept tube
    pub tube_radius: f64,
    pub tubular_segments: usize,
    pub radial_segments: usize,
}

impl Default for TorusKnot {
    fn default() -> Self {
        Self {
            p: 2,
            q: 3,
            radius: 1.0,
            tube_radius: 0.12,
            tubular_segments: 128,
            radial_segments: 12,
        }
    }
}

impl TorusKnot {
    /// Point on the knot centre line at parameter `t ∈ [0, 1]`
    pub fn curve_point(&self, t: f64) -> Point3<f64> {
        let u = t * TAU * self.p as f64;
        let qu_over_p = self.q as f64 / self.p as f64 * u;
        let cs = qu_over_p.cos();
        Point3::new(
            self.radius * (2.0 + cs) * 0.5 * u.cos(),
            self.radius * (2.0 + cs) * 0.5 * u.sin(),
            self.radius * qu_over_p.sin() * 0.5,
        )
    }

    pub fn build(&self) -> Result<GeometryBuffer> {
        if self.p == 0 || self.q == 0 {
            return Err(Error::invalid("torus knot windings must be non-zero"));
        }
        if self.tubular_segments < 3 || self.radial_segments < 3 {
            return Err(Error::invalid(format!(
                "torus knot needs at least 3 segments, got {}x{}",
                self.tubular_segments, self.radial_segments
            )));
        }

        let curve: Vec<Point3<f64>> = (0..=self.tubular_segments)
            .map(|i| self.curve_point(i as f64 / self.tubular_segments as f64))
            .collect();

        let buffer = sweep_closed_tube(&curve, self.tube_radius, self.radial_segments);
        let variant = format!("torus-knot-{}-{}", self.p, self.q);
        Ok(buffer.with_tags(ShapeTags::single(ShapeKind::TorusKnot).with_variant(variant)))
    }
}

/// Sweep a circle of `radius` along a closed polyline whose last point repeats
/// the first.
///
/// Every curve point gets a ring of `segments + 1` vertices (the ring seam is
/// duplicated like the parametric tessellator's), consecutive rings are joined
/// by quads. No end caps are emitted since the tube is closed.
pub fn sweep_closed_tube(curve: &[Point3<f64>], radius: f64, segments: usize) -> GeometryBuffer {
    let tags = ShapeTags::single(ShapeKind::TorusKnot);
    if curve.len() < 3 {
        return GeometryBuffer::new(tags);
    }

    let ring = segments + 1;
    let mut buffer = GeometryBuffer::with_capacity(tags, curve.len() * ring, (curve.len() - 1) * segments * 6);
    let last = curve.len() - 1;

    for i in 0..curve.len() {
        let p = curve[i];

        // Central difference, wrapping across the duplicated closing point
        let prev = if i == 0 { curve[last - 1] } else { curve[i - 1] };
        let next = if i == last { curve[1] } else { curve[i + 1] };
        let tangent = (next - prev).normalize();

        // Pick a reference vector not parallel to the tangent
        let up = if tangent.z.abs() < 0.9 {
            Vector3::new(0.0, 0.0, 1.0)
        } else {
            Vector3::new(1.0, 0.0, 0.0)
        };

        let perp1 = tangent.cross(&up).normalize();
        let perp2 = tangent.cross(&perp1).normalize();

        for j in 0..=segments {
            let angle = TAU * j as f64 / segments as f64;
            let offset = perp1 * (radius * angle.cos()) + perp2 * (radius * angle.sin());
            buffer.add_vertex(p + offset);
        }

        if i < last {
            let base = (i * ring) as u32;
            let next_base = ((i + 1) * ring) as u32;
            for j in 0..segments as u32 {
                buffer.add_triangle(base + j, next_base + j, next_base + j + 1);
                buffer.add_triangle(base + j, next_base + j + 1, base + j + 1);
            }
        }
    }

    compute_normals(&mut buffer);
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torus_knot_counts() {
        let knot = TorusKnot {
            tubular_segments: 64,
            radial_segments: 8,
            ..TorusKnot::default()
        };
        let buffer = knot.build().unwrap();
        assert_eq!(buffer.vertex_count(), 65 * 9);
        assert_eq!(buffer.triangle_count(), 64 * 8 * 2);
        assert!(buffer.is_finite());
        assert!(buffer.validate().is_ok());
        assert_eq!(buffer.tags().kind(), ShapeKind::TorusKnot);
        assert_eq!(buffer.tags().variant(), Some("torus-knot-2-3"));
    }

    #[test]
    fn test_curve_is_closed() {
        let knot = TorusKnot::default();
        let start = knot.curve_point(0.0);
        let end = knot.curve_point(1.0);
        assert!((start - end).norm() < 1e-9);
    }

    #[test]
    fn test_tube_radius() {
        let knot = TorusKnot::default();
        let buffer = knot.build().unwrap();
        let center = knot.curve_point(0.0);
        for j in 0..knot.radial_segments {
            let d = (buffer.position(j) - center).norm();
            assert!((d - knot.tube_radius).abs() < 1e-5);
        }
    }

    #[test]
    fn test_zero_windings_rejected() {
        let knot = TorusKnot {
            p: 0,
            ..TorusKnot::default()
        };
        assert!(knot.build().is_err());
    }
}
