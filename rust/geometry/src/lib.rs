// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polyframe Geometry
//!
//! Procedural solids, parametric surfaces and the derived wireframe and
//! hyperframe structures, using nalgebra for transformations.

pub mod buffer;
pub mod compound;
pub mod error;
pub mod hyperframe;
pub mod normals;
pub mod solids;
pub mod surface;
pub mod sweep;
pub mod transform;
pub mod vertex_index;
pub mod wireframe;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

pub use buffer::{ComponentSpan, GeometryBuffer, ShapeKind, ShapeTags};
pub use compound::{assemble, weld_vertices, Component, CompoundAssembler};
pub use error::{Error, Result};
pub use hyperframe::{
    build_hyperframe, HyperframeBuilder, HyperframeOptions, HyperframeProxy, Polyline,
    DEFAULT_INNER_SCALE,
};
pub use normals::compute_normals;
pub use solids::{build_base, canonical_edges, canonical_vertices, edges_within, BaseSolid};
pub use surface::{tessellate, Surface};
pub use sweep::{sweep_closed_tube, TorusKnot};
pub use transform::{apply_transform, Axis, Transform, GOLDEN_ANGLE, PHI};
pub use vertex_index::{nearest_vertex_index, VertexGrid, VertexLookup};
pub use wireframe::{
    extract_edges, Edge, EdgeMode, EdgeSegment, WireframeExtractor, WireframeOptions,
    WireframeProxy, DEFAULT_THICKNESS, DEFAULT_TOLERANCE_DIGITS,
};
