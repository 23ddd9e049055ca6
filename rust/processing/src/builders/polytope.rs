// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nested-shell polytope projections and compounds of them.

use super::helpers::parse_size;
use crate::config::GeometryConfig;
use crate::error::{Error, Result};
use crate::options::ShapeOptions;
use crate::registry::{ShapeBuilder, ShapeId};
use polyframe_geometry::{
    assemble, build_base, BaseSolid, Component, GeometryBuffer, ShapeKind, ShapeTags, Transform,
    Vector3, GOLDEN_ANGLE, PHI,
};
use std::f64::consts::PI;

pub struct PolytopeBuilder;

/// `count` copies of `solid`, copy `k` placed by `place(k)`
fn compound(
    solid: BaseSolid,
    size: f64,
    count: usize,
    variant: &str,
    place: impl Fn(f64) -> Transform,
) -> GeometryBuffer {
    let base = build_base(solid, size);
    let components: Vec<Component> = (0..count)
        .map(|k| Component::new(base.clone(), place(k as f64)))
        .collect();
    let merged = assemble(&components);
    let tags = ShapeTags::compound(ShapeKind::Polytope, merged.tags().component_count())
        .with_size(size)
        .with_variant(variant);
    merged.with_tags(tags)
}

impl ShapeBuilder for PolytopeBuilder {
    fn build(&self, shape: ShapeId, options: &ShapeOptions, _config: &GeometryConfig) -> Result<GeometryBuffer> {
        let size = parse_size(options)?;
        let buffer = match shape {
            ShapeId::Tesseract => build_base(BaseSolid::Tesseract, size),
            ShapeId::SixteenCell => build_base(BaseSolid::SixteenCell, size),
            ShapeId::TwentyFourCell => build_base(BaseSolid::TwentyFourCell, size),
            ShapeId::HundredTwentyCell => build_base(BaseSolid::HundredTwentyCell, size),
            ShapeId::SixHundredCell => build_base(BaseSolid::SixHundredCell, size),
            ShapeId::HessianPolychoron => {
                let axis = Vector3::new(1.0, 1.0, 1.0);
                compound(BaseSolid::SixteenCell, size, 3, "hessian-polychoron", |k| {
                    Transform::identity().rotate(axis, k * GOLDEN_ANGLE)
                })
            }
            ShapeId::CompoundTesseract => {
                compound(BaseSolid::Tesseract, size, 3, "compound-tesseract", |k| {
                    Transform::identity()
                        .rotate_y(k * GOLDEN_ANGLE)
                        .rotate_x(k * PI / 5.0)
                })
            }
            ShapeId::Compound600Cell => {
                let axis = Vector3::new(1.0, PHI, 0.0);
                compound(BaseSolid::SixHundredCell, size, 5, "compound-600-cell", |k| {
                    Transform::identity().rotate(axis, k * GOLDEN_ANGLE)
                })
            }
            _ => return Err(Error::UnknownShape(shape.as_str().to_string())),
        };
        Ok(buffer)
    }

    fn supported_shapes(&self) -> Vec<ShapeId> {
        vec![
            ShapeId::Tesseract,
            ShapeId::SixteenCell,
            ShapeId::TwentyFourCell,
            ShapeId::HundredTwentyCell,
            ShapeId::SixHundredCell,
            ShapeId::HessianPolychoron,
            ShapeId::CompoundTesseract,
            ShapeId::Compound600Cell,
        ]
    }
}
