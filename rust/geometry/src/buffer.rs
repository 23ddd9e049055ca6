// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry buffer data structures

use crate::error::{Error, Result};
use crate::transform::Transform;
use nalgebra::Point3;
use std::fmt;

/// Family of a generated shape, used to select wireframe and hyperframe strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Tetrahedron,
    Cube,
    Octahedron,
    Icosahedron,
    Dodecahedron,
    Cuboctahedron,
    /// Nested-shell projection of a 4D polytope
    Polytope,
    /// Sampled parametric surface
    Surface,
    TorusKnot,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Tetrahedron => "tetrahedron",
            ShapeKind::Cube => "box",
            ShapeKind::Octahedron => "octahedron",
            ShapeKind::Icosahedron => "icosahedron",
            ShapeKind::Dodecahedron => "dodecahedron",
            ShapeKind::Cuboctahedron => "cuboctahedron",
            ShapeKind::Polytope => "polytope",
            ShapeKind::Surface => "surface",
            ShapeKind::TorusKnot => "torusknot",
        }
    }

    /// Shapes with a small fixed canonical vertex list
    #[inline]
    pub fn is_canonical_solid(&self) -> bool {
        matches!(
            self,
            ShapeKind::Tetrahedron
                | ShapeKind::Cube
                | ShapeKind::Octahedron
                | ShapeKind::Icosahedron
                | ShapeKind::Dodecahedron
                | ShapeKind::Cuboctahedron
        )
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable shape metadata carried alongside a buffer.
///
/// Tags are replaced by value (`with_variant`, `GeometryBuffer::with_tags`),
/// never mutated through a shared buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTags {
    kind: ShapeKind,
    is_compound: bool,
    component_count: usize,
    variant: Option<String>,
    size: Option<f64>,
}

impl ShapeTags {
    /// Tags for a single canonical solid of circumradius `size`
    pub fn solid(kind: ShapeKind, size: f64) -> Self {
        Self {
            kind,
            is_compound: false,
            component_count: 1,
            variant: None,
            size: Some(size),
        }
    }

    /// Tags for a single non-canonical shape (surfaces, tubes)
    pub fn single(kind: ShapeKind) -> Self {
        Self {
            kind,
            is_compound: false,
            component_count: 1,
            variant: None,
            size: None,
        }
    }

    /// Tags for a merge of `component_count` components
    pub fn compound(kind: ShapeKind, component_count: usize) -> Self {
        Self {
            kind,
            is_compound: true,
            component_count,
            variant: None,
            size: None,
        }
    }

    pub fn with_variant(self, variant: impl Into<String>) -> Self {
        Self {
            variant: Some(variant.into()),
            ..self
        }
    }

    pub fn with_size(self, size: f64) -> Self {
        Self {
            size: Some(size),
            ..self
        }
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[inline]
    pub fn is_compound(&self) -> bool {
        self.is_compound
    }

    #[inline]
    pub fn component_count(&self) -> usize {
        self.component_count
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    /// Canonical circumradius, only set for base solids
    #[inline]
    pub fn size(&self) -> Option<f64> {
        self.size
    }
}

/// Where one assembled component landed inside a merged buffer
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpan {
    /// First vertex of the component in the merged buffer
    pub vertex_start: usize,
    /// Number of vertices the component contributed
    pub vertex_count: usize,
    /// Tags of the component before merging
    pub source: ShapeTags,
    /// Placement applied to the component
    pub transform: Transform,
}

/// Renderable triangle buffer
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBuffer {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Option<Vec<f32>>,
    /// Texture coordinates (u, v)
    pub uvs: Option<Vec<f32>>,
    /// Triangle indices (i0, i1, i2); `None` means positions are a plain triangle list
    pub indices: Option<Vec<u32>>,
    tags: ShapeTags,
    components: Vec<ComponentSpan>,
}

impl GeometryBuffer {
    /// Create an empty indexed buffer
    pub fn new(tags: ShapeTags) -> Self {
        Self {
            positions: Vec::new(),
            normals: None,
            uvs: None,
            indices: Some(Vec::new()),
            tags,
            components: Vec::new(),
        }
    }

    /// Create an indexed buffer with capacity
    pub fn with_capacity(tags: ShapeTags, vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: None,
            uvs: None,
            indices: Some(Vec::with_capacity(index_count)),
            tags,
            components: Vec::new(),
        }
    }

    /// Create a buffer from raw parts
    pub fn from_parts(tags: ShapeTags, positions: Vec<f32>, indices: Option<Vec<u32>>) -> Self {
        Self {
            positions,
            normals: None,
            uvs: None,
            indices,
            tags,
            components: Vec::new(),
        }
    }

    #[inline]
    pub fn tags(&self) -> &ShapeTags {
        &self.tags
    }

    /// Replace the tags, consuming the buffer
    pub fn with_tags(self, tags: ShapeTags) -> Self {
        Self { tags, ..self }
    }

    #[inline]
    pub fn components(&self) -> &[ComponentSpan] {
        &self.components
    }

    pub fn with_components(self, components: Vec<ComponentSpan>) -> Self {
        Self { components, ..self }
    }

    /// Add a vertex
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) {
        self.positions.push(position.x as f32);
        self.positions.push(position.y as f32);
        self.positions.push(position.z as f32);
    }

    /// Add a triangle (buffer must be indexed)
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        let indices = self.indices.get_or_insert_with(Vec::new);
        indices.push(i0);
        indices.push(i1);
        indices.push(i2);
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    #[inline]
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Check if buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of vertex `index` in f64
    #[inline]
    pub fn position(&self, index: usize) -> Point3<f64> {
        let base = index * 3;
        Point3::new(
            self.positions[base] as f64,
            self.positions[base + 1] as f64,
            self.positions[base + 2] as f64,
        )
    }

    /// Iterate over vertex positions in f64
    pub fn vertices(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0] as f64, c[1] as f64, c[2] as f64))
    }

    /// Vertex indices of triangle `t`, resolving implicit ordering
    #[inline]
    pub fn triangle(&self, t: usize) -> [usize; 3] {
        match &self.indices {
            Some(indices) => [
                indices[t * 3] as usize,
                indices[t * 3 + 1] as usize,
                indices[t * 3 + 2] as usize,
            ],
            None => [t * 3, t * 3 + 1, t * 3 + 2],
        }
    }

    /// Iterate over triangles as vertex index triples
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        (0..self.triangle_count()).map(move |t| self.triangle(t))
    }

    /// True when every position is finite
    pub fn is_finite(&self) -> bool {
        self.positions.iter().all(|v| v.is_finite())
    }

    /// Check the structural invariants of the buffer
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() % 3 != 0 {
            return Err(Error::AttributeMismatch(format!(
                "positions length {} is not a multiple of 3",
                self.positions.len()
            )));
        }
        let vertex_count = self.vertex_count();
        if let Some(normals) = &self.normals {
            if normals.len() != self.positions.len() {
                return Err(Error::AttributeMismatch(format!(
                    "normals length {} does not match positions length {}",
                    normals.len(),
                    self.positions.len()
                )));
            }
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != vertex_count * 2 {
                return Err(Error::AttributeMismatch(format!(
                    "uvs length {} does not match {} vertices",
                    uvs.len(),
                    vertex_count
                )));
            }
        }
        match &self.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(Error::AttributeMismatch(format!(
                        "indices length {} is not a multiple of 3",
                        indices.len()
                    )));
                }
                if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(Error::AttributeMismatch(format!(
                        "index {} out of range for {} vertices",
                        bad, vertex_count
                    )));
                }
            }
            None => {
                if vertex_count % 3 != 0 {
                    return Err(Error::AttributeMismatch(format!(
                        "non-indexed buffer has {} vertices",
                        vertex_count
                    )));
                }
            }
        }
        Ok(())
    }

    /// Calculate bounds (min, max)
    #[inline]
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Average of all vertex positions in f64 precision
    #[inline]
    pub fn centroid_f64(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }

        let mut sum = Point3::new(0.0f64, 0.0f64, 0.0f64);
        let count = self.vertex_count();

        self.positions.chunks_exact(3).for_each(|chunk| {
            sum.x += chunk[0] as f64;
            sum.y += chunk[1] as f64;
            sum.z += chunk[2] as f64;
        });

        Point3::new(
            sum.x / count as f64,
            sum.y / count as f64,
            sum.z / count as f64,
        )
    }

    /// Largest distance of any vertex from the centroid
    pub fn bounding_radius(&self) -> f64 {
        let center = self.centroid_f64();
        self.vertices()
            .map(|p| (p - center).norm())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_buffer() -> GeometryBuffer {
        let mut buffer = GeometryBuffer::new(ShapeTags::single(ShapeKind::Surface));
        buffer.add_vertex(Point3::new(0.0, 0.0, 0.0));
        buffer.add_vertex(Point3::new(1.0, 0.0, 0.0));
        buffer.add_vertex(Point3::new(0.0, 1.0, 0.0));
        buffer.add_triangle(0, 1, 2);
        buffer
    }

    #[test]
    fn test_buffer_creation() {
        let buffer = GeometryBuffer::new(ShapeTags::single(ShapeKind::Surface));
        assert!(buffer.is_empty());
        assert_eq!(buffer.vertex_count(), 0);
        assert_eq!(buffer.triangle_count(), 0);
        assert!(buffer.validate().is_ok());
    }

    #[test]
    fn test_add_vertex_and_triangle() {
        let buffer = triangle_buffer();
        assert_eq!(buffer.vertex_count(), 3);
        assert_eq!(buffer.triangle_count(), 1);
        assert_eq!(buffer.triangle(0), [0, 1, 2]);
        assert!(buffer.validate().is_ok());
    }

    #[test]
    fn test_implicit_triangle_order() {
        let mut buffer = triangle_buffer();
        buffer.indices = None;
        assert_eq!(buffer.triangle_count(), 1);
        assert_eq!(buffer.triangles().collect::<Vec<_>>(), vec![[0, 1, 2]]);
    }

    #[test]
    fn test_validate_rejects_out_of_range_index() {
        let mut buffer = triangle_buffer();
        buffer.add_triangle(0, 1, 7);
        assert!(matches!(
            buffer.validate(),
            Err(Error::AttributeMismatch(_))
        ));
    }

    #[test]
    fn test_tags_are_replaced_by_value() {
        let tags = ShapeTags::solid(ShapeKind::Icosahedron, 1.0);
        let variant = tags.clone().with_variant("600-cell");
        assert_eq!(tags.variant(), None);
        assert_eq!(variant.variant(), Some("600-cell"));
        assert_eq!(variant.size(), Some(1.0));
        assert!(!variant.is_compound());
    }

    #[test]
    fn test_clone_is_deep() {
        let buffer = triangle_buffer();
        let copy = buffer.clone();
        assert_eq!(buffer.positions, copy.positions);
        assert_ne!(buffer.positions.as_ptr(), copy.positions.as_ptr());
    }

    #[test]
    fn test_bounds_and_centroid() {
        let buffer = triangle_buffer();
        let (min, max) = buffer.bounds();
        assert_eq!(min, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3::new(1.0, 1.0, 0.0));
        let centroid = buffer.centroid_f64();
        assert!((centroid.x - 1.0 / 3.0).abs() < 1e-6);
        assert!((centroid.y - 1.0 / 3.0).abs() < 1e-6);
    }
}
