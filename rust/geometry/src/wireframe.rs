// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wireframe edge extraction
//!
//! Derives the undirected edge set of a buffer and describes each edge as a
//! thick-line proxy (`start_index`, `end_index`, `length`, `thickness`) for the
//! renderer. Two modes:
//!
//! - generic: every triangle contributes its three edges, deduplicated by a
//!   canonical key built from the endpoints rounded to a fixed number of
//!   decimals. Edges whose keys differ after rounding stay distinct.
//! - canonical: for canonical solids the edges are enumerated directly from
//!   the known corner list, which is exact and skips face diagonals.
//!
//! Endpoint indices are resolved with the nearest-vertex lookup so animation
//! code can perturb the original vertex.

use crate::buffer::{ComponentSpan, GeometryBuffer, ShapeKind};
use crate::solids::{canonical_edges, canonical_vertices, edges_within};
use crate::vertex_index::VertexLookup;
use nalgebra::Point3;
use rustc_hash::FxHashSet;

/// Decimal digits used for edge keys unless configured otherwise
pub const DEFAULT_TOLERANCE_DIGITS: u32 = 6;

/// Largest usable tolerance; beyond it the rounding factor leaves f64 range
pub const MAX_TOLERANCE_DIGITS: u32 = 12;

/// Proxy thickness unless configured otherwise
pub const DEFAULT_THICKNESS: f64 = 0.012;

/// Vertex count above which endpoint lookups use a spatial grid
pub const DEFAULT_GRID_THRESHOLD: usize = 2048;

/// Edge enumeration strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    /// Scan triangles
    Generic,
    /// Enumerate canonical corner pairs per component
    Canonical,
    /// Canonical when every component is a plain canonical solid, else generic
    Auto,
}

/// Round a coordinate to `digits` decimals, folding -0 into 0.
/// `digits` above [`MAX_TOLERANCE_DIGITS`] are clamped.
#[inline]
fn round_to(v: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits.min(MAX_TOLERANCE_DIGITS) as i32);
    let r = (v * factor).round() / factor;
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Fixed-precision key of one point
pub fn point_key(p: &Point3<f64>, digits: u32) -> String {
    let digits = digits.min(MAX_TOLERANCE_DIGITS);
    let d = digits as usize;
    format!(
        "{:.*},{:.*},{:.*}",
        d,
        round_to(p.x, digits),
        d,
        round_to(p.y, digits),
        d,
        round_to(p.z, digits)
    )
}

/// Unordered edge between two points
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
    /// Order-independent key; `start` is always the lexicographically smaller endpoint
    pub key: String,
}

impl Edge {
    pub fn new(a: Point3<f64>, b: Point3<f64>, digits: u32) -> Self {
        let ka = point_key(&a, digits);
        let kb = point_key(&b, digits);
        if ka <= kb {
            Self {
                start: a,
                end: b,
                key: format!("{}|{}", ka, kb),
            }
        } else {
            Self {
                start: b,
                end: a,
                key: format!("{}|{}", kb, ka),
            }
        }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    #[inline]
    pub fn midpoint(&self) -> Point3<f64> {
        nalgebra::center(&self.start, &self.end)
    }
}

/// Thick-line descriptor for one edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeSegment {
    pub start_index: usize,
    pub end_index: usize,
    pub length: f64,
    pub thickness: f64,
}

/// Deduplicated edges plus their thick-line descriptors, index aligned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireframeProxy {
    pub edges: Vec<Edge>,
    pub segments: Vec<EdgeSegment>,
}

impl WireframeProxy {
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Wireframe extraction settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireframeOptions {
    pub tolerance_digits: u32,
    pub thickness: f64,
    pub mode: EdgeMode,
    /// Canonical-mode distance threshold; `None` derives it from the edge length
    pub edge_threshold: Option<f64>,
    /// Vertex count at which endpoint lookup switches to a grid; `None` disables the grid
    pub grid_threshold: Option<usize>,
}

impl Default for WireframeOptions {
    fn default() -> Self {
        Self {
            tolerance_digits: DEFAULT_TOLERANCE_DIGITS,
            thickness: DEFAULT_THICKNESS,
            mode: EdgeMode::Auto,
            edge_threshold: None,
            grid_threshold: Some(DEFAULT_GRID_THRESHOLD),
        }
    }
}

/// Generic triangle-scan extraction with default thickness
pub fn extract_edges(buffer: &GeometryBuffer, tolerance_digits: u32) -> WireframeProxy {
    WireframeExtractor::new(WireframeOptions {
        tolerance_digits,
        mode: EdgeMode::Generic,
        ..WireframeOptions::default()
    })
    .extract(buffer)
}

/// Derives wireframe proxies from buffers
#[derive(Debug, Clone, Default)]
pub struct WireframeExtractor {
    options: WireframeOptions,
}

impl WireframeExtractor {
    pub fn new(options: WireframeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WireframeOptions {
        &self.options
    }

    pub fn extract(&self, buffer: &GeometryBuffer) -> WireframeProxy {
        let edges = match self.options.mode {
            EdgeMode::Generic => self.generic_edges(buffer),
            EdgeMode::Canonical => self
                .canonical_edges(buffer)
                .unwrap_or_else(|| self.generic_edges(buffer)),
            EdgeMode::Auto => {
                if supports_canonical(buffer) {
                    self.canonical_edges(buffer)
                        .unwrap_or_else(|| self.generic_edges(buffer))
                } else {
                    self.generic_edges(buffer)
                }
            }
        };
        self.with_segments(buffer, edges)
    }

    /// Scan every triangle and keep the first edge seen for each key
    pub fn generic_edges(&self, buffer: &GeometryBuffer) -> Vec<Edge> {
        let digits = self.options.tolerance_digits;
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut edges = Vec::new();

        for [a, b, c] in buffer.triangles() {
            for (i, j) in [(a, b), (b, c), (c, a)] {
                let edge = Edge::new(buffer.position(i), buffer.position(j), digits);
                if seen.insert(edge.key.clone()) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Enumerate canonical edges component by component.
    ///
    /// Returns `None` when some component is not a plain canonical solid.
    pub fn canonical_edges(&self, buffer: &GeometryBuffer) -> Option<Vec<Edge>> {
        let digits = self.options.tolerance_digits;
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut edges = Vec::new();

        for (start, count, kind) in canonical_ranges(buffer)? {
            let corners: Vec<Point3<f64>> =
                (start..start + count).map(|i| buffer.position(i)).collect();
            let pairs = match self.options.edge_threshold {
                Some(threshold) => edges_within(&corners, Some(threshold)),
                None => canonical_edges(kind)?,
            };
            for (i, j) in pairs {
                let edge = Edge::new(corners[i], corners[j], digits);
                if seen.insert(edge.key.clone()) {
                    edges.push(edge);
                }
            }
        }
        Some(edges)
    }

    fn with_segments(&self, buffer: &GeometryBuffer, edges: Vec<Edge>) -> WireframeProxy {
        let lookup = VertexLookup::new(buffer, self.options.grid_threshold);
        let segments = edges
            .iter()
            .map(|edge| EdgeSegment {
                start_index: lookup.nearest(&edge.start).unwrap_or(0),
                end_index: lookup.nearest(&edge.end).unwrap_or(0),
                length: edge.length(),
                thickness: self.options.thickness,
            })
            .collect();
        WireframeProxy { edges, segments }
    }
}

/// True when every component of the buffer is an unmodified canonical solid
pub fn supports_canonical(buffer: &GeometryBuffer) -> bool {
    canonical_ranges(buffer).is_some()
}

/// Vertex ranges of canonical solids making up the buffer
fn canonical_ranges(buffer: &GeometryBuffer) -> Option<Vec<(usize, usize, ShapeKind)>> {
    let spans: &[ComponentSpan] = buffer.components();
    if spans.is_empty() {
        let kind = buffer.tags().kind();
        if buffer.tags().is_compound() || !kind.is_canonical_solid() {
            return None;
        }
        let expected = canonical_vertices(kind, 1.0)?.len();
        return (buffer.vertex_count() == expected).then(|| vec![(0, expected, kind)]);
    }

    let mut ranges = Vec::with_capacity(spans.len());
    for span in spans {
        let kind = span.source.kind();
        if span.source.is_compound() || !kind.is_canonical_solid() {
            return None;
        }
        let expected = canonical_vertices(kind, 1.0)?.len();
        if span.vertex_count != expected || span.vertex_start + expected > buffer.vertex_count() {
            return None;
        }
        ranges.push((span.vertex_start, expected, kind));
    }
    Some(ranges)
}
