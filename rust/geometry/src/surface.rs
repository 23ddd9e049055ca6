// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric surface tessellation
//!
//! A surface function `f(u, v) -> (x, y, z)` is sampled on a closed
//! `[0, 2π] × [0, 2π]` grid of `(U + 1) × (V + 1)` points. The seam row and
//! column are duplicated so UVs run cleanly from 0 to 1.

use crate::buffer::{GeometryBuffer, ShapeKind, ShapeTags};
use crate::error::{Error, Result};
use crate::normals::compute_normals;
use nalgebra::Point3;
use std::f64::consts::TAU;

/// Smallest accepted segment count in either direction
pub const MIN_SEGMENTS: usize = 8;

/// Tessellate `surface` into an indexed buffer tagged as a single surface.
///
/// Non-finite samples are kept as they are; the tessellator has no way to
/// validate an arbitrary surface function.
pub fn tessellate<F>(surface: F, u_segments: usize, v_segments: usize, scale: f64) -> Result<GeometryBuffer>
where
    F: Fn(f64, f64) -> Point3<f64>,
{
    if u_segments < MIN_SEGMENTS || v_segments < MIN_SEGMENTS {
        return Err(Error::invalid(format!(
            "surface needs at least {} segments per direction, got {}x{}",
            MIN_SEGMENTS, u_segments, v_segments
        )));
    }
    if !(scale.is_finite() && scale > 0.0) {
        return Err(Error::invalid(format!("surface scale must be positive, got {}", scale)));
    }

    let columns = v_segments + 1;
    let vertex_count = (u_segments + 1) * columns;
    let mut buffer = GeometryBuffer::with_capacity(
        ShapeTags::single(ShapeKind::Surface),
        vertex_count,
        u_segments * v_segments * 6,
    );
    let mut uvs = Vec::with_capacity(vertex_count * 2);

    for i in 0..=u_segments {
        let s = i as f64 / u_segments as f64;
        for j in 0..=v_segments {
            let t = j as f64 / v_segments as f64;
            let p = surface(s * TAU, t * TAU);
            buffer.add_vertex(Point3::from(p.coords * scale));
            uvs.push(s as f32);
            uvs.push(t as f32);
        }
    }

    for i in 0..u_segments {
        for j in 0..v_segments {
            let a = (i * columns + j) as u32;
            let b = ((i + 1) * columns + j) as u32;
            let c = ((i + 1) * columns + j + 1) as u32;
            let d = (i * columns + j + 1) as u32;
            buffer.add_triangle(a, b, d);
            buffer.add_triangle(b, c, d);
        }
    }

    buffer.uvs = Some(uvs);
    compute_normals(&mut buffer);
    Ok(buffer)
}

/// Built-in non-orientable surfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    KleinBottle,
    MobiusStrip,
    RomanSurface,
}

impl Surface {
    pub fn variant(&self) -> &'static str {
        match self {
            Surface::KleinBottle => "klein-bottle",
            Surface::MobiusStrip => "mobius-strip",
            Surface::RomanSurface => "roman-surface",
        }
    }

    /// Evaluate the surface at `(u, v)`, both in `[0, 2π]`
    pub fn evaluate(&self, u: f64, v: f64) -> Point3<f64> {
        match self {
            Surface::KleinBottle => klein_bottle(u, v),
            Surface::MobiusStrip => mobius_strip(u, v),
            Surface::RomanSurface => roman_surface(u, v),
        }
    }

    /// Tessellate this surface and tag the result with its variant
    pub fn tessellate(&self, u_segments: usize, v_segments: usize, scale: f64) -> Result<GeometryBuffer> {
        let buffer = tessellate(|u, v| self.evaluate(u, v), u_segments, v_segments, scale)?;
        Ok(buffer.with_tags(ShapeTags::single(ShapeKind::Surface).with_variant(self.variant())))
    }
}

/// Figure-8 immersion of the Klein bottle
pub fn klein_bottle(u: f64, v: f64) -> Point3<f64> {
    const R: f64 = 2.0;
    let (half_sin, half_cos) = (u * 0.5).sin_cos();
    let r = R + half_cos * v.sin() - half_sin * (2.0 * v).sin();
    Point3::new(
        r * u.cos(),
        r * u.sin(),
        half_sin * v.sin() + half_cos * (2.0 * v).sin(),
    )
}

/// Möbius strip of unit radius; `v` sweeps across the band width
pub fn mobius_strip(u: f64, v: f64) -> Point3<f64> {
    const HALF_WIDTH: f64 = 0.4;
    let w = (v / std::f64::consts::PI - 1.0) * HALF_WIDTH;
    let (half_sin, half_cos) = (u * 0.5).sin_cos();
    let r = 1.0 + w * half_cos;
    Point3::new(r * u.cos(), r * u.sin(), w * half_sin)
}

/// Steiner's Roman surface
pub fn roman_surface(u: f64, v: f64) -> Point3<f64> {
    let half_v = v * 0.5;
    let (sin_u, cos_u) = u.sin_cos();
    let (sin_v, cos_v) = half_v.sin_cos();
    Point3::new(
        cos_u * sin_v * cos_v * 2.0,
        sin_u * sin_v * cos_v * 2.0,
        cos_u * sin_u * cos_v * cos_v * 2.0,
    )
}
