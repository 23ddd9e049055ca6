// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Base solid library
//!
//! Canonical convex solids (platonic solids plus the cuboctahedron) and the
//! nested-shell approximations of 4D polytope projections built from them.
//!
//! Every canonical solid is indexed with exactly one vertex per corner, has
//! circumradius `size` and outward triangle winding. Faces are derived from
//! the dual solid's vertex directions: the corners with maximal projection
//! onto a dual direction form one face.
//!
//! Nested-shell polytopes are K concentric copies of one canonical solid at
//! fixed relative sizes. They are not true 4D boundaries; the shell counts and
//! sizes are part of the output contract.

use crate::buffer::{GeometryBuffer, ShapeKind, ShapeTags};
use crate::compound::{Component, CompoundAssembler};
use crate::normals::compute_normals;
use crate::transform::{Transform, PHI};
use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

const FACE_PLANE_EPSILON: f64 = 1e-9;

const TESSERACT_SHELLS: [f64; 2] = [1.0, 0.5];
const SIXTEEN_CELL_SHELLS: [f64; 3] = [1.0, 0.62, 0.3];
const TWENTY_FOUR_CELL_SHELLS: [f64; 3] = [1.0, 0.72, 0.45];
const HUNDRED_TWENTY_CELL_SHELLS: [f64; 5] = [1.0, 0.82, 0.64, 0.46, 0.28];
const SIX_HUNDRED_CELL_SHELLS: [f64; 4] = [1.0, 0.78, 0.56, 0.34];

/// Entries of the base solid library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseSolid {
    Tetrahedron,
    Cube,
    Octahedron,
    Icosahedron,
    Dodecahedron,
    Cuboctahedron,
    /// Two concentric cubes
    Tesseract,
    /// Three concentric octahedra
    SixteenCell,
    /// Three concentric cuboctahedra
    TwentyFourCell,
    /// Five concentric dodecahedra
    HundredTwentyCell,
    /// Four concentric icosahedra
    SixHundredCell,
}

impl BaseSolid {
    pub const ALL: [BaseSolid; 11] = [
        BaseSolid::Tetrahedron,
        BaseSolid::Cube,
        BaseSolid::Octahedron,
        BaseSolid::Icosahedron,
        BaseSolid::Dodecahedron,
        BaseSolid::Cuboctahedron,
        BaseSolid::Tesseract,
        BaseSolid::SixteenCell,
        BaseSolid::TwentyFourCell,
        BaseSolid::HundredTwentyCell,
        BaseSolid::SixHundredCell,
    ];

    /// Shape kind of the canonical solid, or of the shell solid for polytopes
    pub fn kind(&self) -> ShapeKind {
        match self {
            BaseSolid::Tetrahedron => ShapeKind::Tetrahedron,
            BaseSolid::Cube => ShapeKind::Cube,
            BaseSolid::Octahedron => ShapeKind::Octahedron,
            BaseSolid::Icosahedron => ShapeKind::Icosahedron,
            BaseSolid::Dodecahedron => ShapeKind::Dodecahedron,
            BaseSolid::Cuboctahedron => ShapeKind::Cuboctahedron,
            BaseSolid::Tesseract
            | BaseSolid::SixteenCell
            | BaseSolid::TwentyFourCell
            | BaseSolid::HundredTwentyCell
            | BaseSolid::SixHundredCell => ShapeKind::Polytope,
        }
    }

    /// Shell solid and relative shell sizes for nested-shell polytopes
    pub fn shells(&self) -> Option<(BaseSolid, &'static [f64])> {
        match self {
            BaseSolid::Tesseract => Some((BaseSolid::Cube, &TESSERACT_SHELLS)),
            BaseSolid::SixteenCell => Some((BaseSolid::Octahedron, &SIXTEEN_CELL_SHELLS)),
            BaseSolid::TwentyFourCell => Some((BaseSolid::Cuboctahedron, &TWENTY_FOUR_CELL_SHELLS)),
            BaseSolid::HundredTwentyCell => {
                Some((BaseSolid::Dodecahedron, &HUNDRED_TWENTY_CELL_SHELLS))
            }
            BaseSolid::SixHundredCell => Some((BaseSolid::Icosahedron, &SIX_HUNDRED_CELL_SHELLS)),
            _ => None,
        }
    }

    /// Variant tag attached to polytope projections
    pub fn variant(&self) -> Option<&'static str> {
        match self {
            BaseSolid::Tesseract => Some("tesseract"),
            BaseSolid::SixteenCell => Some("16-cell"),
            BaseSolid::TwentyFourCell => Some("24-cell"),
            BaseSolid::HundredTwentyCell => Some("120-cell"),
            BaseSolid::SixHundredCell => Some("600-cell"),
            _ => None,
        }
    }
}

/// Build a base solid of circumradius `size`
pub fn build_base(solid: BaseSolid, size: f64) -> GeometryBuffer {
    match solid.shells() {
        Some((shell, factors)) => build_nested_shells(solid, shell, factors, size),
        None => build_convex(solid.kind(), size),
    }
}

/// Canonical corner list of a canonical solid at circumradius `size`
pub fn canonical_vertices(kind: ShapeKind, size: f64) -> Option<Vec<Point3<f64>>> {
    let directions = match kind {
        ShapeKind::Tetrahedron => tetrahedron_directions(),
        ShapeKind::Cube => cube_directions(),
        ShapeKind::Octahedron => octahedron_directions(),
        ShapeKind::Icosahedron => icosahedron_directions(),
        ShapeKind::Dodecahedron => dodecahedron_directions(),
        ShapeKind::Cuboctahedron => cuboctahedron_directions(),
        _ => return None,
    };
    Some(
        directions
            .into_iter()
            .map(|d| Point3::from(d.normalize() * size))
            .collect(),
    )
}

/// Index pairs of the canonical edges: every pair at the minimum corner distance
pub fn canonical_edges(kind: ShapeKind) -> Option<Vec<(usize, usize)>> {
    let vertices = canonical_vertices(kind, 1.0)?;
    Some(edges_within(&vertices, None))
}

/// Enumerate vertex pairs closer than `threshold`.
///
/// Without an explicit threshold the minimum pairwise distance × 1.01 is used,
/// which selects exactly the edges of a regular convex solid.
pub fn edges_within(vertices: &[Point3<f64>], threshold: Option<f64>) -> Vec<(usize, usize)> {
    let limit = match threshold {
        Some(t) => t,
        None => {
            let mut min = f64::INFINITY;
            for i in 0..vertices.len() {
                for j in (i + 1)..vertices.len() {
                    min = min.min((vertices[i] - vertices[j]).norm());
                }
            }
            if !min.is_finite() {
                return Vec::new();
            }
            min * 1.01
        }
    };

    let mut edges = Vec::new();
    for i in 0..vertices.len() {
        for j in (i + 1)..vertices.len() {
            if (vertices[i] - vertices[j]).norm() <= limit {
                edges.push((i, j));
            }
        }
    }
    edges
}

fn build_convex(kind: ShapeKind, size: f64) -> GeometryBuffer {
    let Some((corners, face_directions)) = corner_and_face_directions(kind) else {
        return GeometryBuffer::new(ShapeTags::solid(kind, size));
    };

    let unit: Vec<Vector3<f64>> = corners.iter().map(|c| c.normalize()).collect();
    let mut buffer = GeometryBuffer::with_capacity(
        ShapeTags::solid(kind, size),
        unit.len(),
        face_directions.len() * 9,
    );
    for corner in &unit {
        buffer.add_vertex(Point3::from(corner * size));
    }

    for direction in &face_directions {
        let normal = direction.normalize();
        let face = face_corners(&unit, &normal);
        for k in 1..face.len().saturating_sub(1) {
            buffer.add_triangle(face[0] as u32, face[k] as u32, face[k + 1] as u32);
        }
    }

    compute_normals(&mut buffer);
    buffer
}

fn corner_and_face_directions(kind: ShapeKind) -> Option<(Vec<Vector3<f64>>, Vec<Vector3<f64>>)> {
    let directions = match kind {
        ShapeKind::Tetrahedron => (
            tetrahedron_directions(),
            tetrahedron_directions().into_iter().map(|d| -d).collect(),
        ),
        ShapeKind::Cube => (cube_directions(), octahedron_directions()),
        ShapeKind::Octahedron => (octahedron_directions(), cube_directions()),
        ShapeKind::Icosahedron => (icosahedron_directions(), dodecahedron_directions()),
        ShapeKind::Dodecahedron => (dodecahedron_directions(), icosahedron_directions()),
        ShapeKind::Cuboctahedron => {
            let mut faces = octahedron_directions();
            faces.extend(cube_directions());
            (cuboctahedron_directions(), faces)
        }
        _ => return None,
    };
    Some(directions)
}

/// Corners lying on the support plane for `normal`, ordered counter-clockwise
/// when viewed from outside
fn face_corners(corners: &[Vector3<f64>], normal: &Vector3<f64>) -> SmallVec<[usize; 5]> {
    let support = corners
        .iter()
        .map(|c| c.dot(normal))
        .fold(f64::NEG_INFINITY, f64::max);

    let mut face: SmallVec<[usize; 5]> = corners
        .iter()
        .enumerate()
        .filter(|(_, c)| c.dot(normal) >= support - FACE_PLANE_EPSILON)
        .map(|(i, _)| i)
        .collect();

    let center = face.iter().map(|&i| corners[i]).sum::<Vector3<f64>>() / face.len() as f64;
    let u = (corners[face[0]] - center).normalize();
    let w = normal.cross(&u);
    let angle = |i: usize| {
        let d = corners[i] - center;
        d.dot(&w).atan2(d.dot(&u))
    };
    face.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
    face
}

fn build_nested_shells(
    solid: BaseSolid,
    shell: BaseSolid,
    factors: &[f64],
    size: f64,
) -> GeometryBuffer {
    let base = build_convex(shell.kind(), size);
    let components: Vec<Component> = factors
        .iter()
        .map(|&factor| Component::new(base.clone(), Transform::identity().uniform_scale(factor)))
        .collect();

    let merged = CompoundAssembler::new().assemble(&components);
    let mut tags = ShapeTags::compound(ShapeKind::Polytope, factors.len()).with_size(size);
    if let Some(variant) = solid.variant() {
        tags = tags.with_variant(variant);
    }
    merged.with_tags(tags)
}

fn tetrahedron_directions() -> Vec<Vector3<f64>> {
    vec![
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(1.0, -1.0, -1.0),
        Vector3::new(-1.0, 1.0, -1.0),
        Vector3::new(-1.0, -1.0, 1.0),
    ]
}

fn cube_directions() -> Vec<Vector3<f64>> {
    let mut out = Vec::with_capacity(8);
    for &x in &[-1.0, 1.0] {
        for &y in &[-1.0, 1.0] {
            for &z in &[-1.0, 1.0] {
                out.push(Vector3::new(x, y, z));
            }
        }
    }
    out
}

fn octahedron_directions() -> Vec<Vector3<f64>> {
    vec![
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(-1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
        Vector3::new(0.0, -1.0, 0.0),
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(0.0, 0.0, -1.0),
    ]
}

fn icosahedron_directions() -> Vec<Vector3<f64>> {
    let mut out = Vec::with_capacity(12);
    for &a in &[-1.0, 1.0] {
        for &b in &[-PHI, PHI] {
            out.push(Vector3::new(0.0, a, b));
            out.push(Vector3::new(a, b, 0.0));
            out.push(Vector3::new(b, 0.0, a));
        }
    }
    out
}

fn dodecahedron_directions() -> Vec<Vector3<f64>> {
    let inv = 1.0 / PHI;
    let mut out = cube_directions();
    // Oriented so the corners are the face directions of the icosahedron above
    for &a in &[-inv, inv] {
        for &b in &[-PHI, PHI] {
            out.push(Vector3::new(0.0, b, a));
            out.push(Vector3::new(a, 0.0, b));
            out.push(Vector3::new(b, a, 0.0));
        }
    }
    out
}

fn cuboctahedron_directions() -> Vec<Vector3<f64>> {
    let mut out = Vec::with_capacity(12);
    for &a in &[-1.0, 1.0] {
        for &b in &[-1.0, 1.0] {
            out.push(Vector3::new(a, b, 0.0));
            out.push(Vector3::new(a, 0.0, b));
            out.push(Vector3::new(0.0, a, b));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn signed_volume(buffer: &GeometryBuffer) -> f64 {
        buffer
            .triangles()
            .map(|[a, b, c]| {
                let (a, b, c) = (buffer.position(a), buffer.position(b), buffer.position(c));
                a.coords.dot(&b.coords.cross(&c.coords)) / 6.0
            })
            .sum()
    }

    #[test]
    fn test_canonical_vertex_and_face_counts() {
        let expected = [
            (BaseSolid::Tetrahedron, 4, 4),
            (BaseSolid::Cube, 8, 12),
            (BaseSolid::Octahedron, 6, 8),
            (BaseSolid::Icosahedron, 12, 20),
            (BaseSolid::Dodecahedron, 20, 36),
            (BaseSolid::Cuboctahedron, 12, 20),
        ];
        for (solid, vertices, triangles) in expected {
            let buffer = build_base(solid, 1.0);
            assert_eq!(buffer.vertex_count(), vertices, "{:?} vertices", solid);
            assert_eq!(buffer.triangle_count(), triangles, "{:?} triangles", solid);
            assert!(buffer.validate().is_ok());
        }
    }

    #[test]
    fn test_outward_winding() {
        for solid in BaseSolid::ALL {
            let buffer = build_base(solid, 1.0);
            assert!(signed_volume(&buffer) > 0.0, "{:?} winds inward", solid);
        }
    }

    #[test]
    fn test_circumradius_equals_size() {
        let buffer = build_base(BaseSolid::Icosahedron, 2.5);
        for p in buffer.vertices() {
            assert_relative_eq!(p.coords.norm(), 2.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_canonical_edge_counts() {
        assert_eq!(canonical_edges(ShapeKind::Tetrahedron).unwrap().len(), 6);
        assert_eq!(canonical_edges(ShapeKind::Cube).unwrap().len(), 12);
        assert_eq!(canonical_edges(ShapeKind::Octahedron).unwrap().len(), 12);
        assert_eq!(canonical_edges(ShapeKind::Icosahedron).unwrap().len(), 30);
        assert_eq!(canonical_edges(ShapeKind::Dodecahedron).unwrap().len(), 30);
        assert_eq!(canonical_edges(ShapeKind::Cuboctahedron).unwrap().len(), 24);
        assert!(canonical_edges(ShapeKind::Surface).is_none());
    }

    #[test]
    fn test_nested_shell_counts_and_sizes() {
        let buffer = build_base(BaseSolid::HundredTwentyCell, 1.0);
        assert_eq!(buffer.tags().component_count(), 5);
        assert!(buffer.tags().is_compound());
        assert_eq!(buffer.tags().kind(), ShapeKind::Polytope);
        assert_eq!(buffer.tags().variant(), Some("120-cell"));
        assert_eq!(buffer.vertex_count(), 5 * 20);

        let spans = buffer.components();
        assert_eq!(spans.len(), 5);
        for (span, &factor) in spans.iter().zip(HUNDRED_TWENTY_CELL_SHELLS.iter()) {
            let p = buffer.position(span.vertex_start);
            assert_relative_eq!(p.coords.norm(), factor, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_tesseract_is_two_cubes() {
        let buffer = build_base(BaseSolid::Tesseract, 1.0);
        assert_eq!(buffer.tags().component_count(), 2);
        assert_eq!(buffer.vertex_count(), 16);
        assert_eq!(buffer.tags().variant(), Some("tesseract"));
    }
}
