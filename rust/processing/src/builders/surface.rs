// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parametric surfaces, the layered quantum manifold and the torus knot.

use super::helpers::{finite, parse_size, positive};
use crate::config::GeometryConfig;
use crate::error::{Error, Result};
use crate::options::ShapeOptions;
use crate::registry::{ShapeBuilder, ShapeId};
use polyframe_geometry::{
    assemble, Component, GeometryBuffer, ShapeKind, ShapeTags, Surface, TorusKnot, Transform,
    Vector3, GOLDEN_ANGLE,
};

/// Klein bottle copies in the quantum manifold
const MANIFOLD_LAYERS: usize = 3;

pub struct SurfaceBuilder;

/// Grid resolution and scale of one surface
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sampling {
    u_segments: usize,
    v_segments: usize,
    scale: f64,
}

impl Sampling {
    fn parse(options: &ShapeOptions, defaults: Sampling) -> Result<Self> {
        Ok(Self {
            u_segments: options.usize_or("uSegments", defaults.u_segments),
            v_segments: options.usize_or("vSegments", defaults.v_segments),
            scale: positive(options, "scale", defaults.scale)?,
        })
    }

    fn tessellate(&self, surface: Surface) -> Result<GeometryBuffer> {
        Ok(surface.tessellate(self.u_segments, self.v_segments, self.scale)?)
    }
}

fn default_sampling(shape: ShapeId) -> Sampling {
    match shape {
        ShapeId::KleinBottle => Sampling {
            u_segments: 160,
            v_segments: 80,
            scale: 0.52,
        },
        ShapeId::MobiusStrip => Sampling {
            u_segments: 128,
            v_segments: 16,
            scale: 1.0,
        },
        ShapeId::QuantumManifold => Sampling {
            u_segments: 96,
            v_segments: 48,
            scale: 0.52,
        },
        _ => Sampling {
            u_segments: 96,
            v_segments: 96,
            scale: 1.0,
        },
    }
}

impl SurfaceBuilder {
    /// Klein bottles twisted by the golden angle and lifted apart along Y
    fn quantum_manifold(options: &ShapeOptions, config: &GeometryConfig) -> Result<GeometryBuffer> {
        let sampling = Sampling::parse(options, default_sampling(ShapeId::QuantumManifold))?;
        let offset = finite(options, "layerOffset", config.layer_offset)?;
        let base = sampling.tessellate(Surface::KleinBottle)?;

        let components: Vec<Component> = (0..MANIFOLD_LAYERS)
            .map(|k| {
                let k = k as f64;
                let transform = Transform::identity()
                    .rotate_y(k * GOLDEN_ANGLE)
                    .translate(Vector3::y() * (k * offset));
                Component::new(base.clone(), transform)
            })
            .collect();

        let merged = assemble(&components);
        let tags = ShapeTags::compound(ShapeKind::Surface, merged.tags().component_count())
            .with_variant("quantum-manifold");
        Ok(merged.with_tags(tags))
    }

    fn torus_knot(options: &ShapeOptions) -> Result<GeometryBuffer> {
        let defaults = TorusKnot::default();
        let knot = TorusKnot {
            p: options.u32_or("p", defaults.p),
            q: options.u32_or("q", defaults.q),
            radius: parse_size(options)?,
            tube_radius: positive(options, "tubeRadius", defaults.tube_radius)?,
            tubular_segments: options.usize_or("tubularSegments", defaults.tubular_segments),
            radial_segments: options.usize_or("radialSegments", defaults.radial_segments),
        };
        Ok(knot.build()?)
    }
}

impl ShapeBuilder for SurfaceBuilder {
    fn build(&self, shape: ShapeId, options: &ShapeOptions, config: &GeometryConfig) -> Result<GeometryBuffer> {
        let surface = match shape {
            ShapeId::KleinBottle => Surface::KleinBottle,
            ShapeId::MobiusStrip => Surface::MobiusStrip,
            ShapeId::RomanSurface => Surface::RomanSurface,
            ShapeId::QuantumManifold => return Self::quantum_manifold(options, config),
            ShapeId::TorusKnot => return Self::torus_knot(options),
            _ => return Err(Error::UnknownShape(shape.as_str().to_string())),
        };
        Sampling::parse(options, default_sampling(shape))?.tessellate(surface)
    }

    fn supported_shapes(&self) -> Vec<ShapeId> {
        vec![
            ShapeId::KleinBottle,
            ShapeId::MobiusStrip,
            ShapeId::RomanSurface,
            ShapeId::QuantumManifold,
            ShapeId::TorusKnot,
        ]
    }
}
