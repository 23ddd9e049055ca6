// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platonic compounds - two rotated copies of one solid.

use super::helpers::parse_size;
use crate::config::GeometryConfig;
use crate::error::{Error, Result};
use crate::options::ShapeOptions;
use crate::registry::{ShapeBuilder, ShapeId};
use polyframe_geometry::{assemble, build_base, BaseSolid, Component, GeometryBuffer, Transform};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6};

/// Builds `tetrahedron`, `box`, `octahedron`, `icosahedron` and `dodecahedron`
pub struct PlatonicBuilder;

impl PlatonicBuilder {
    /// Base solid and placement of the second copy; `None` for single solids
    fn compound_of(shape: ShapeId) -> Option<(BaseSolid, Option<(Transform, &'static str)>)> {
        let layout = match shape {
            // Stella octangula: the quarter turn maps the tetrahedron onto its dual
            ShapeId::Tetrahedron => (
                BaseSolid::Tetrahedron,
                Some((Transform::identity().rotate_z(FRAC_PI_2), "stella-octangula")),
            ),
            ShapeId::Box => (
                BaseSolid::Cube,
                Some((Transform::identity().rotate_y(FRAC_PI_4), "compound-cube")),
            ),
            ShapeId::Octahedron => (
                BaseSolid::Octahedron,
                Some((Transform::identity().rotate_z(FRAC_PI_4), "compound-octahedron")),
            ),
            ShapeId::Icosahedron => (
                BaseSolid::Icosahedron,
                Some((
                    Transform::identity().rotate_x(FRAC_PI_2).rotate_y(FRAC_PI_6),
                    "compound-icosahedron",
                )),
            ),
            ShapeId::Dodecahedron => (BaseSolid::Dodecahedron, None),
            _ => return None,
        };
        Some(layout)
    }
}

impl ShapeBuilder for PlatonicBuilder {
    fn build(&self, shape: ShapeId, options: &ShapeOptions, _config: &GeometryConfig) -> Result<GeometryBuffer> {
        let (solid, second) =
            Self::compound_of(shape).ok_or_else(|| Error::UnknownShape(shape.as_str().to_string()))?;
        let size = parse_size(options)?;
        let base = build_base(solid, size);

        let Some((transform, variant)) = second else {
            return Ok(base);
        };

        let merged = assemble(&[
            Component::new(base.clone(), Transform::identity()),
            Component::new(base, transform),
        ]);
        let tags = merged.tags().clone().with_size(size).with_variant(variant);
        Ok(merged.with_tags(tags))
    }

    fn supported_shapes(&self) -> Vec<ShapeId> {
        vec![
            ShapeId::Tetrahedron,
            ShapeId::Box,
            ShapeId::Octahedron,
            ShapeId::Icosahedron,
            ShapeId::Dodecahedron,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyframe_geometry::ShapeKind;

    fn build(shape: ShapeId, options: &ShapeOptions) -> GeometryBuffer {
        PlatonicBuilder
            .build(shape, options, &GeometryConfig::default())
            .unwrap()
    }

    #[test]
    fn test_stella_octangula() {
        let buffer = build(ShapeId::Tetrahedron, &ShapeOptions::new());
        assert_eq!(buffer.tags().component_count(), 2);
        assert_eq!(buffer.vertex_count(), 8);
        assert_eq!(buffer.tags().kind(), ShapeKind::Tetrahedron);
        assert_eq!(buffer.tags().variant(), Some("stella-octangula"));

        // Second tetrahedron sits on the remaining cube corners
        let second: Vec<_> = (4..8).map(|i| buffer.position(i)).collect();
        for p in &second {
            assert!((p.x * p.y * p.z) < 0.0);
        }
    }

    #[test]
    fn test_size_option() {
        let options = ShapeOptions::new().with("size", 2.0);
        let buffer = build(ShapeId::Box, &options);
        assert!((buffer.bounding_radius() - 2.0).abs() < 1e-5);
        assert_eq!(buffer.tags().size(), Some(2.0));
    }

    #[test]
    fn test_dodecahedron_is_single() {
        let buffer = build(ShapeId::Dodecahedron, &ShapeOptions::new());
        assert!(!buffer.tags().is_compound());
        assert_eq!(buffer.vertex_count(), 20);
    }

    #[test]
    fn test_rejects_bad_size() {
        let options = ShapeOptions::new().with("size", -1.0);
        let result = PlatonicBuilder.build(ShapeId::Box, &options, &GeometryConfig::default());
        assert!(matches!(result, Err(Error::Geometry(_))));
    }
}
