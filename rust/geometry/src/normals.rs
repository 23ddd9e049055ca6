// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex normal generation

use crate::buffer::GeometryBuffer;
use nalgebra::Vector3;

/// Recompute vertex normals by accumulating triangle normals through the index
/// buffer.
///
/// Every vertex receives the sum of the (area weighted) normals of the
/// triangles that reference it, so a non-indexed buffer gets flat per-triangle
/// normals and an indexed one gets normals smoothed over shared vertices.
/// Vertices with no usable triangle fall back to +Z. Non-finite positions are
/// not repaired and yield non-finite normals.
pub fn compute_normals(buffer: &mut GeometryBuffer) {
    let vertex_count = buffer.vertex_count();
    if vertex_count == 0 {
        buffer.normals = Some(Vec::new());
        return;
    }

    let mut normals = vec![Vector3::<f64>::zeros(); vertex_count];

    for [i0, i1, i2] in buffer.triangles() {
        let v0 = buffer.position(i0);
        let v1 = buffer.position(i1);
        let v2 = buffer.position(i2);

        let normal = (v1 - v0).cross(&(v2 - v0));

        normals[i0] += normal;
        normals[i1] += normal;
        normals[i2] += normal;
    }

    let mut out = Vec::with_capacity(vertex_count * 3);
    for normal in normals {
        let normalized = if normal.iter().all(|c| c.is_finite()) {
            normal.try_normalize(1e-12).unwrap_or_else(Vector3::z)
        } else {
            normal
        };
        out.push(normalized.x as f32);
        out.push(normalized.y as f32);
        out.push(normalized.z as f32);
    }
    buffer.normals = Some(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{ShapeKind, ShapeTags};
    use nalgebra::Point3;

    #[test]
    fn test_flat_triangle_normal() {
        let mut buffer = GeometryBuffer::new(ShapeTags::single(ShapeKind::Surface));
        buffer.add_vertex(Point3::new(0.0, 0.0, 0.0));
        buffer.add_vertex(Point3::new(1.0, 0.0, 0.0));
        buffer.add_vertex(Point3::new(0.0, 1.0, 0.0));
        buffer.add_triangle(0, 1, 2);

        compute_normals(&mut buffer);
        let normals = buffer.normals.unwrap();
        assert_eq!(normals.len(), 9);
        for n in normals.chunks_exact(3) {
            assert_eq!(n, &[0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn test_unreferenced_vertex_gets_fallback() {
        let mut buffer = GeometryBuffer::new(ShapeTags::single(ShapeKind::Surface));
        buffer.add_vertex(Point3::new(3.0, 3.0, 3.0));
        compute_normals(&mut buffer);
        assert_eq!(buffer.normals.unwrap(), vec![0.0, 0.0, 1.0]);
    }
}
