// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compound solid assembly
//!
//! Places N component buffers under per-component transforms and merges them
//! into one buffer. Components keep their own vertices unless welding is
//! requested, so the merged vertex count is the sum of the component counts.

use crate::buffer::{ComponentSpan, GeometryBuffer, ShapeKind, ShapeTags};
use crate::error::{Error, Result};
use crate::normals::compute_normals;
use crate::transform::{apply_transform, Transform};
use rustc_hash::FxHashMap;

/// Default rounding used to detect coincident vertices when welding
const WELD_DIGITS: u32 = 6;

/// One placed instance of a compound
#[derive(Debug, Clone)]
pub struct Component {
    pub buffer: GeometryBuffer,
    pub transform: Transform,
}

impl Component {
    pub fn new(buffer: GeometryBuffer, transform: Transform) -> Self {
        Self { buffer, transform }
    }
}

/// Merges transformed components into a single buffer
#[derive(Debug, Clone)]
pub struct CompoundAssembler {
    weld: bool,
    weld_digits: u32,
}

impl CompoundAssembler {
    pub fn new() -> Self {
        Self {
            weld: false,
            weld_digits: WELD_DIGITS,
        }
    }

    /// Merge coincident vertices before computing normals
    pub fn weld(self, weld: bool) -> Self {
        Self { weld, ..self }
    }

    /// Decimal digits used to decide that two vertices coincide when welding
    pub fn weld_digits(self, weld_digits: u32) -> Self {
        Self {
            weld_digits,
            ..self
        }
    }

    /// Assemble the components into one buffer.
    ///
    /// On an attribute-set mismatch between components the first component is
    /// returned alone (placed by its own transform) and the discrepancy is
    /// logged; the request is never aborted.
    pub fn assemble(&self, components: &[Component]) -> GeometryBuffer {
        let Some(first) = components.first() else {
            return GeometryBuffer::new(ShapeTags::compound(ShapeKind::Polytope, 0));
        };

        if let Err(e) = check_compatible(components) {
            tracing::warn!(
                components = components.len(),
                error = %e,
                "Compound merge failed, falling back to first component"
            );
            let mut fallback = first.buffer.clone();
            apply_transform(&mut fallback, &first.transform);
            compute_normals(&mut fallback);
            return fallback;
        }

        let merged = self.merge(components);
        if self.weld {
            let mut welded = weld_vertices(&merged, self.weld_digits).with_components(Vec::new());
            compute_normals(&mut welded);
            welded
        } else {
            merged
        }
    }

    fn merge(&self, components: &[Component]) -> GeometryBuffer {
        let total_positions: usize = components.iter().map(|c| c.buffer.positions.len()).sum();
        let indexed = components[0].buffer.is_indexed();
        let with_uvs = components[0].buffer.uvs.is_some();

        let kind = common_kind(components);
        let mut positions = Vec::with_capacity(total_positions);
        let mut uvs = with_uvs.then(|| Vec::with_capacity(total_positions / 3 * 2));
        let mut indices = indexed.then(Vec::new);
        let mut spans = Vec::with_capacity(components.len());

        for component in components {
            let vertex_offset = positions.len() / 3;
            let mut placed = component.buffer.clone();
            apply_transform(&mut placed, &component.transform);
            positions.extend_from_slice(&placed.positions);

            if let (Some(out), Some(src)) = (uvs.as_mut(), placed.uvs.as_ref()) {
                out.extend_from_slice(src);
            }
            if let (Some(out), Some(src)) = (indices.as_mut(), placed.indices.as_ref()) {
                out.extend(src.iter().map(|&i| i + vertex_offset as u32));
            }

            spans.push(ComponentSpan {
                vertex_start: vertex_offset,
                vertex_count: placed.vertex_count(),
                source: component.buffer.tags().clone(),
                transform: component.transform,
            });
        }

        let mut merged =
            GeometryBuffer::from_parts(ShapeTags::compound(kind, components.len()), positions, indices)
                .with_components(spans);
        merged.uvs = uvs;
        compute_normals(&mut merged);
        merged
    }
}

impl Default for CompoundAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Merge `components` without welding
pub fn assemble(components: &[Component]) -> GeometryBuffer {
    CompoundAssembler::new().assemble(components)
}

fn common_kind(components: &[Component]) -> ShapeKind {
    let first = components[0].buffer.tags().kind();
    if components.iter().all(|c| c.buffer.tags().kind() == first) {
        first
    } else {
        ShapeKind::Polytope
    }
}

fn check_compatible(components: &[Component]) -> Result<()> {
    let first = &components[0].buffer;
    for (i, component) in components.iter().enumerate() {
        let buffer = &component.buffer;
        buffer.validate()?;
        if buffer.is_indexed() != first.is_indexed() {
            return Err(Error::AttributeMismatch(format!(
                "component {} indexed={} but component 0 indexed={}",
                i,
                buffer.is_indexed(),
                first.is_indexed()
            )));
        }
        if buffer.uvs.is_some() != first.uvs.is_some() {
            return Err(Error::AttributeMismatch(format!(
                "component {} uvs={} but component 0 uvs={}",
                i,
                buffer.uvs.is_some(),
                first.uvs.is_some()
            )));
        }
    }
    Ok(())
}

/// Merge vertices whose positions agree to `digits` decimals.
///
/// The first occurrence of a position keeps its UV. The result is always
/// indexed.
pub fn weld_vertices(buffer: &GeometryBuffer, digits: u32) -> GeometryBuffer {
    let factor = 10f64.powi(digits as i32);
    let key = |v: f32| (v as f64 * factor).round() as i64;

    let mut lookup: FxHashMap<[i64; 3], u32> = FxHashMap::default();
    let mut remap = Vec::with_capacity(buffer.vertex_count());
    let mut positions = Vec::new();
    let mut uvs = buffer.uvs.as_ref().map(|_| Vec::new());

    for (i, chunk) in buffer.positions.chunks_exact(3).enumerate() {
        let k = [key(chunk[0]), key(chunk[1]), key(chunk[2])];
        let next = (positions.len() / 3) as u32;
        let index = *lookup.entry(k).or_insert_with(|| {
            positions.extend_from_slice(chunk);
            if let (Some(out), Some(src)) = (uvs.as_mut(), buffer.uvs.as_ref()) {
                out.extend_from_slice(&src[i * 2..i * 2 + 2]);
            }
            next
        });
        remap.push(index);
    }

    let indices: Vec<u32> = buffer
        .triangles()
        .flat_map(|tri| tri.map(|i| remap[i]))
        .collect();

    let mut welded = GeometryBuffer::from_parts(buffer.tags().clone(), positions, Some(indices))
        .with_components(buffer.components().to_vec());
    welded.uvs = uvs;
    welded
}
