// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry service - owns the registry and cache and produces shape bundles.

use crate::cache::GeometryCache;
use crate::config::GeometryConfig;
use crate::error::{Error, Result};
use crate::options::{options_key, ShapeOptions};
use crate::registry::{ShapeId, ShapeRegistry};
use polyframe_geometry::{
    GeometryBuffer, HyperframeBuilder, Polyline, ShapeKind, ShapeTags, WireframeExtractor,
    WireframeProxy,
};
use rayon::prelude::*;
use std::str::FromStr;

/// Everything the scene layer needs for one shape
#[derive(Debug, Clone)]
pub struct ShapeBundle {
    /// Shape that was actually built
    pub shape: ShapeId,
    /// Identifier as requested by the caller
    pub requested: String,
    /// True when the default shape was substituted
    pub fallback: bool,
    pub solid: GeometryBuffer,
    pub wireframe: WireframeProxy,
    pub hyperframe_core: Vec<Polyline>,
    pub hyperframe_spokes: Vec<Polyline>,
}

/// Shape generation service
///
/// Holds its own cache, so independent services never share buffers.
pub struct GeometryService {
    registry: ShapeRegistry,
    cache: GeometryCache,
    config: GeometryConfig,
    wireframe: WireframeExtractor,
    hyperframe: HyperframeBuilder,
}

impl GeometryService {
    /// Service with every built-in shape family
    pub fn new(config: GeometryConfig) -> Result<Self> {
        Self::with_registry(ShapeRegistry::with_defaults()?, config)
    }

    /// Service over a custom registry, which must cover every shape identifier
    pub fn with_registry(registry: ShapeRegistry, config: GeometryConfig) -> Result<Self> {
        registry.validate()?;
        Ok(Self {
            registry,
            cache: GeometryCache::with_capacity(config.cache_capacity),
            wireframe: WireframeExtractor::new(config.wireframe_options()),
            hyperframe: HyperframeBuilder::new(config.hyperframe_options()),
            config,
        })
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    pub fn cache(&self) -> &GeometryCache {
        &self.cache
    }

    /// Map an identifier to a shape, substituting the default for unknown ones
    pub fn resolve(&self, id: &str) -> (ShapeId, bool) {
        match ShapeId::from_str(id) {
            Ok(shape) => (shape, false),
            Err(_) => {
                tracing::warn!(
                    shape = %id,
                    fallback = %ShapeId::DEFAULT,
                    "Unknown shape identifier, using default shape"
                );
                (ShapeId::DEFAULT, true)
            }
        }
    }

    /// Build (or fetch from cache) the solid for `shape`
    pub fn build_solid(&self, shape: ShapeId, options: Option<&ShapeOptions>) -> Result<GeometryBuffer> {
        let key = options_key(options).map(|k| format!("{}:{}", shape, k));
        let empty = ShapeOptions::new();
        let options = options.unwrap_or(&empty);

        self.cache.get_or_build(key.as_deref(), || {
            let buffer = self.registry.build(shape, options, &self.config)?;
            if buffer.is_empty() {
                return Err(Error::Geometry(polyframe_geometry::Error::EmptyGeometry(format!(
                    "{} produced no vertices",
                    shape
                ))));
            }
            tracing::debug!(
                shape = %shape,
                vertices = buffer.vertex_count(),
                triangles = buffer.triangle_count(),
                components = buffer.tags().component_count(),
                "Built shape"
            );
            Ok(buffer)
        })
    }

    /// Build the full bundle for an identifier.
    ///
    /// Never fails: unknown identifiers and failed builds fall back to the
    /// default shape with a warning.
    pub fn build_geometry(&self, id: &str, options: Option<&ShapeOptions>) -> ShapeBundle {
        let (shape, mut fallback) = self.resolve(id);
        let options = if fallback { None } else { options };

        let (shape, solid) = match self.build_solid(shape, options) {
            Ok(solid) => (shape, solid),
            Err(e) => {
                tracing::warn!(
                    shape = %shape,
                    error = %e,
                    fallback = %ShapeId::DEFAULT,
                    "Shape build failed, using default shape"
                );
                fallback = true;
                (ShapeId::DEFAULT, self.default_solid())
            }
        };

        self.bundle(shape, id, fallback, solid)
    }

    /// Build several shapes on the rayon pool, preserving request order
    pub fn build_batch(&self, requests: &[(String, Option<ShapeOptions>)]) -> Vec<ShapeBundle> {
        requests
            .par_iter()
            .map(|(id, options)| self.build_geometry(id, options.as_ref()))
            .collect()
    }

    /// Derive wireframe and hyperframe for an already built solid
    pub fn bundle(&self, shape: ShapeId, requested: &str, fallback: bool, solid: GeometryBuffer) -> ShapeBundle {
        let wireframe = self.wireframe.extract(&solid);
        let hyperframe = self.hyperframe.build(&solid, solid.tags().kind());
        ShapeBundle {
            shape,
            requested: requested.to_string(),
            fallback,
            solid,
            wireframe,
            hyperframe_core: hyperframe.core,
            hyperframe_spokes: hyperframe.spokes,
        }
    }

    fn default_solid(&self) -> GeometryBuffer {
        match self.build_solid(ShapeId::DEFAULT, None) {
            Ok(solid) => solid,
            Err(e) => {
                tracing::error!(error = %e, "Default shape failed to build");
                GeometryBuffer::new(ShapeTags::compound(ShapeKind::Icosahedron, 0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ShapeBuilder;

    struct EmptyBuilder;

    impl ShapeBuilder for EmptyBuilder {
        fn build(&self, _shape: ShapeId, _options: &ShapeOptions, _config: &GeometryConfig) -> Result<GeometryBuffer> {
            Ok(GeometryBuffer::new(ShapeTags::single(ShapeKind::Surface)))
        }

        fn supported_shapes(&self) -> Vec<ShapeId> {
            vec![ShapeId::RomanSurface]
        }
    }

    #[test]
    fn test_rejects_incomplete_registry() {
        let result = GeometryService::with_registry(ShapeRegistry::new(), GeometryConfig::default());
        assert!(matches!(result, Err(Error::IncompleteRegistry(_))));
    }

    #[test]
    fn test_empty_build_falls_back() {
        let mut registry = ShapeRegistry::with_defaults().unwrap();
        registry.register(Box::new(EmptyBuilder));
        let service = GeometryService::with_registry(registry, GeometryConfig::default()).unwrap();

        let bundle = service.build_geometry("romansurface", None);
        assert!(bundle.fallback);
        assert_eq!(bundle.shape, ShapeId::DEFAULT);
        assert!(!bundle.solid.is_empty());
    }

    #[test]
    fn test_resolve() {
        let service = GeometryService::new(GeometryConfig::default()).unwrap();
        assert_eq!(service.resolve("box"), (ShapeId::Box, false));
        assert_eq!(service.resolve("cube?"), (ShapeId::DEFAULT, true));
    }
}
