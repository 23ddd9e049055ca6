// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hyperframe construction
//!
//! A hyperframe is a decorative structure layered over a solid: an inner
//! shrunk shell (`core`) plus connectors between the inner shell and the
//! solid (`spokes`). Two strategies exist and are selected by shape kind:
//!
//! - canonical (tetrahedron, box, octahedron, icosahedron): per placed
//!   component, the canonical corners are matched to merged-buffer vertices,
//!   shrunk towards the component centre and connected.
//! - generic (everything else): spiral polylines along a sample of the
//!   shape's own edges, plus curved connectors between nearby edges. There
//!   is no inner shell.

use crate::buffer::{GeometryBuffer, ShapeKind};
use crate::solids::{canonical_edges, canonical_vertices};
use crate::transform::Transform;
use crate::vertex_index::VertexLookup;
use crate::wireframe::{Edge, WireframeExtractor, WireframeOptions, DEFAULT_GRID_THRESHOLD};
use nalgebra::{Point3, Vector3};
use std::f64::consts::{PI, TAU};

/// Inner shell scale unless configured otherwise
pub const DEFAULT_INNER_SCALE: f64 = 0.5;

/// Ordered list of points drawn as a connected line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point3<f64>>,
}

impl Polyline {
    pub fn new(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Straight two-point connector
    pub fn segment(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self { points: vec![a, b] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point3<f64>> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&Point3<f64>> {
        self.points.last()
    }

    /// Sum of segment lengths
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

/// The two line groups of a hyperframe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HyperframeProxy {
    pub core: Vec<Polyline>,
    pub spokes: Vec<Polyline>,
}

impl HyperframeProxy {
    pub fn is_empty(&self) -> bool {
        self.core.is_empty() && self.spokes.is_empty()
    }
}

/// Hyperframe settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HyperframeOptions {
    /// Inner shell size relative to the outer solid
    pub inner_scale: f64,
    /// Upper bound on generic spiral core lines; edges are sampled evenly beyond it
    pub max_core_lines: usize,
    /// Points per generic spiral, minus one
    pub spiral_samples: usize,
    /// Full turns of each generic spiral
    pub spiral_turns: f64,
    /// Upper bound on generic curved connectors
    pub max_connectors: usize,
    /// Points per curved connector, minus one
    pub curve_samples: usize,
    /// Midpoint distance under which two edges get a connector; `None` uses 1.5 × mean edge length
    pub connector_threshold: Option<f64>,
    pub tolerance_digits: u32,
    pub grid_threshold: Option<usize>,
}

impl Default for HyperframeOptions {
    fn default() -> Self {
        Self {
            inner_scale: DEFAULT_INNER_SCALE,
            max_core_lines: 96,
            spiral_samples: 24,
            spiral_turns: 1.5,
            max_connectors: 128,
            curve_samples: 12,
            connector_threshold: None,
            tolerance_digits: crate::wireframe::DEFAULT_TOLERANCE_DIGITS,
            grid_threshold: Some(DEFAULT_GRID_THRESHOLD),
        }
    }
}

/// Build a hyperframe with default settings and the given inner scale
pub fn build_hyperframe(buffer: &GeometryBuffer, kind: ShapeKind, inner_scale: f64) -> HyperframeProxy {
    HyperframeBuilder::new(HyperframeOptions {
        inner_scale,
        ..HyperframeOptions::default()
    })
    .build(buffer, kind)
}

/// True for kinds handled by the canonical inner-shell strategy
#[inline]
pub fn has_canonical_hyperframe(kind: ShapeKind) -> bool {
    matches!(
        kind,
        ShapeKind::Tetrahedron | ShapeKind::Cube | ShapeKind::Octahedron | ShapeKind::Icosahedron
    )
}

#[derive(Debug, Clone, Default)]
pub struct HyperframeBuilder {
    options: HyperframeOptions,
}

impl HyperframeBuilder {
    pub fn new(options: HyperframeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HyperframeOptions {
        &self.options
    }

    pub fn build(&self, buffer: &GeometryBuffer, kind: ShapeKind) -> HyperframeProxy {
        if buffer.is_empty() {
            return HyperframeProxy::default();
        }
        if has_canonical_hyperframe(kind) {
            self.build_canonical(buffer, kind)
        } else {
            self.build_generic(buffer)
        }
    }

    /// Inner shell and inner-to-outer spokes per placed canonical solid
    pub fn build_canonical(&self, buffer: &GeometryBuffer, kind: ShapeKind) -> HyperframeProxy {
        let mut proxy = HyperframeProxy::default();
        let (Some(_), Some(edges)) = (canonical_vertices(kind, 1.0), canonical_edges(kind)) else {
            return proxy;
        };
        let lookup = VertexLookup::new(buffer, self.options.grid_threshold);

        for (size, transform) in placements(buffer, kind) {
            let Some(corners) = canonical_vertices(kind, size) else {
                continue;
            };
            let center = transform.origin();

            // Snap the expected corners onto the vertices actually in the buffer
            let outer: Vec<Point3<f64>> = corners
                .iter()
                .map(|c| {
                    let expected = transform.apply(c);
                    lookup
                        .nearest(&expected)
                        .map(|i| buffer.position(i))
                        .unwrap_or(expected)
                })
                .collect();
            let inner: Vec<Point3<f64>> = outer
                .iter()
                .map(|p| center + (p - center) * self.options.inner_scale)
                .collect();

            for (i, j) in &edges {
                proxy.core.push(Polyline::segment(inner[*i], inner[*j]));
            }
            for (a, b) in inner.iter().zip(&outer) {
                proxy.spokes.push(Polyline::segment(*a, *b));
            }

            if kind == ShapeKind::Tetrahedron {
                proxy.spokes.extend(star_connectors(&inner, &outer, center));
            }
        }
        proxy
    }

    /// Spiral core lines and curved connectors over the shape's own edges
    pub fn build_generic(&self, buffer: &GeometryBuffer) -> HyperframeProxy {
        let extractor = WireframeExtractor::new(WireframeOptions {
            tolerance_digits: self.options.tolerance_digits,
            grid_threshold: self.options.grid_threshold,
            ..WireframeOptions::default()
        });
        let edges: Vec<Edge> = extractor
            .generic_edges(buffer)
            .into_iter()
            .filter(|e| is_finite_point(&e.start) && is_finite_point(&e.end) && e.length() > 0.0)
            .collect();
        let sampled = sample_evenly(&edges, self.options.max_core_lines);
        if sampled.is_empty() {
            return HyperframeProxy::default();
        }

        let center = buffer
            .vertices()
            .filter(is_finite_point)
            .fold((Vector3::zeros(), 0usize), |(sum, n), p| (sum + p.coords, n + 1));
        let center = if center.1 > 0 {
            Point3::from(center.0 / center.1 as f64)
        } else {
            Point3::origin()
        };

        let core = sampled
            .iter()
            .map(|e| self.spiral(e))
            .collect::<Vec<_>>();

        let threshold = self.options.connector_threshold.unwrap_or_else(|| {
            let mean = sampled.iter().map(|e| e.length()).sum::<f64>() / sampled.len() as f64;
            mean * 1.5
        });
        let midpoints: Vec<Point3<f64>> = sampled.iter().map(|e| e.midpoint()).collect();

        let mut spokes = Vec::new();
        'pairs: for i in 0..midpoints.len() {
            for j in (i + 1)..midpoints.len() {
                if spokes.len() >= self.options.max_connectors {
                    break 'pairs;
                }
                let d = (midpoints[j] - midpoints[i]).norm();
                if d > 0.0 && d <= threshold {
                    spokes.push(self.curve(midpoints[i], midpoints[j], center));
                }
            }
        }

        HyperframeProxy { core, spokes }
    }

    /// Helix wound around the edge, pinned to both endpoints
    fn spiral(&self, edge: &Edge) -> Polyline {
        let axis = edge.end - edge.start;
        let length = axis.norm();
        let direction = axis / length;
        let up = if direction.z.abs() < 0.9 {
            Vector3::z()
        } else {
            Vector3::x()
        };
        let perp1 = direction.cross(&up).normalize();
        let perp2 = direction.cross(&perp1);

        let samples = self.options.spiral_samples.max(2);
        let amplitude = length * 0.25 * (1.0 - self.options.inner_scale.clamp(0.0, 1.0));
        let points = (0..=samples)
            .map(|s| {
                let t = s as f64 / samples as f64;
                let angle = self.options.spiral_turns * TAU * t;
                let radius = amplitude * (PI * t).sin();
                edge.start + axis * t + (perp1 * angle.cos() + perp2 * angle.sin()) * radius
            })
            .collect();
        Polyline::new(points)
    }

    /// Quadratic Bézier from `a` to `b` bowed towards `center`
    fn curve(&self, a: Point3<f64>, b: Point3<f64>, center: Point3<f64>) -> Polyline {
        let mid = nalgebra::center(&a, &b);
        let control = center + (mid - center) * self.options.inner_scale;
        let samples = self.options.curve_samples.max(2);
        let points = (0..=samples)
            .map(|s| {
                let t = s as f64 / samples as f64;
                let u = 1.0 - t;
                Point3::from(a.coords * (u * u) + control.coords * (2.0 * u * t) + b.coords * (t * t))
            })
            .collect();
        Polyline::new(points)
    }
}

/// Size and placement of every copy of `kind` inside the buffer
fn placements(buffer: &GeometryBuffer, kind: ShapeKind) -> Vec<(f64, Transform)> {
    let fallback_size = || buffer.tags().size().unwrap_or_else(|| buffer.bounding_radius());
    let found: Vec<(f64, Transform)> = buffer
        .components()
        .iter()
        .filter(|span| span.source.kind() == kind && !span.source.is_compound())
        .map(|span| (span.source.size().unwrap_or_else(fallback_size), span.transform))
        .collect();
    if found.is_empty() {
        vec![(fallback_size(), Transform::identity())]
    } else {
        found
    }
}

/// Diagonals from each inner corner through the centre to the opposite outer face
fn star_connectors<'a>(
    inner: &'a [Point3<f64>],
    outer: &'a [Point3<f64>],
    center: Point3<f64>,
) -> impl Iterator<Item = Polyline> + 'a {
    inner.iter().enumerate().map(move |(i, start)| {
        let opposite: Vector3<f64> = outer
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, p)| p.coords)
            .sum::<Vector3<f64>>()
            / (outer.len() - 1).max(1) as f64;
        Polyline::new(vec![*start, center, Point3::from(opposite)])
    })
}

fn is_finite_point(p: &Point3<f64>) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

fn sample_evenly(edges: &[Edge], limit: usize) -> Vec<&Edge> {
    if limit == 0 {
        return Vec::new();
    }
    if edges.len() <= limit {
        return edges.iter().collect();
    }
    let stride = edges.len().div_ceil(limit);
    edges.iter().step_by(stride).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::{assemble, Component};
    use crate::solids::{build_base, BaseSolid};
    use crate::sweep::TorusKnot;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_single_icosahedron_shell() {
        let buffer = build_base(BaseSolid::Icosahedron, 2.0);
        let proxy = build_hyperframe(&buffer, ShapeKind::Icosahedron, DEFAULT_INNER_SCALE);
        assert_eq!(proxy.spokes.len(), 12);
        assert_eq!(proxy.core.len(), 30);
        for spoke in &proxy.spokes {
            let inner = spoke.first().unwrap();
            let outer = spoke.last().unwrap();
            assert_relative_eq!(inner.coords.norm(), 1.0, epsilon = 1e-5);
            assert_relative_eq!(outer.coords.norm(), 2.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_compound_matches_each_copy() {
        let base = build_base(BaseSolid::Octahedron, 1.0);
        let offset = Vector3::new(5.0, 0.0, 0.0);
        let compound = assemble(&[
            Component::new(base.clone(), Transform::identity()),
            Component::new(base, Transform::identity().rotate_z(0.3).translate(offset)),
        ]);
        let proxy = build_hyperframe(&compound, ShapeKind::Octahedron, 0.5);
        assert_eq!(proxy.spokes.len(), 12);
        assert_eq!(proxy.core.len(), 24);

        // Second copy shrinks about its own centre
        for spoke in &proxy.spokes[6..] {
            let inner = spoke.first().unwrap();
            assert_relative_eq!((inner - Point3::from(offset)).norm(), 0.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_tetrahedron_star_connectors() {
        let base = build_base(BaseSolid::Tetrahedron, 1.0);
        let compound = assemble(&[
            Component::new(base.clone(), Transform::identity()),
            Component::new(base, Transform::identity().rotate_z(FRAC_PI_2)),
        ]);
        let proxy = build_hyperframe(&compound, ShapeKind::Tetrahedron, 0.5);
        assert_eq!(proxy.core.len(), 12);
        // 4 radial spokes and 4 star diagonals per copy
        assert_eq!(proxy.spokes.len(), 16);
        let stars: Vec<_> = proxy.spokes.iter().filter(|s| s.len() == 3).collect();
        assert_eq!(stars.len(), 8);
        for star in stars {
            assert_relative_eq!(star.points[1].coords.norm(), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_generic_fallback_for_torus_knot() {
        let knot = TorusKnot {
            tubular_segments: 32,
            radial_segments: 8,
            ..TorusKnot::default()
        };
        let buffer = knot.build().unwrap();
        let builder = HyperframeBuilder::default();
        let proxy = builder.build(&buffer, ShapeKind::TorusKnot);

        assert!(!proxy.core.is_empty());
        assert!(proxy.core.len() <= builder.options().max_core_lines);
        assert!(proxy.spokes.len() <= builder.options().max_connectors);
        for line in &proxy.core {
            assert_eq!(line.len(), builder.options().spiral_samples + 1);
            assert!(line.points.iter().all(is_finite_point));
        }
    }

    #[test]
    fn test_spiral_is_pinned_to_edge_endpoints() {
        let builder = HyperframeBuilder::default();
        let edge = Edge::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 0.0), 6);
        let line = builder.spiral(&edge);
        assert_relative_eq!((line.first().unwrap() - edge.start).norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!((line.last().unwrap() - edge.end).norm(), 0.0, epsilon = 1e-9);
        assert!(line.length() > edge.length());
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = GeometryBuffer::new(crate::buffer::ShapeTags::single(ShapeKind::Surface));
        assert!(build_hyperframe(&buffer, ShapeKind::Surface, 0.5).is_empty());
    }
}
