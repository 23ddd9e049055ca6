// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mega-tesseract sweeps
//!
//! N layers, each an outer cube and a half-size inner cube. Layer `k` is
//! twisted by `k · twistStep` about the sweep axis, shrunk by
//! `k · radialStep` (or taken from a numeric `scales[k]`) and pushed along the axis by
//! `baseOffset + k · translationStep`. The inner cube sits a further
//! `layerGap` along the axis. The small offsets only keep coincident faces
//! from z-fighting.

use super::helpers::{finite, parse_size};
use crate::config::GeometryConfig;
use crate::error::{Error, Result};
use crate::options::ShapeOptions;
use crate::registry::{ShapeBuilder, ShapeId};
use polyframe_geometry::{
    assemble, build_base, Axis, BaseSolid, Component, GeometryBuffer, Transform, GOLDEN_ANGLE,
};

/// Sweep parameters parsed from shape options
#[derive(Debug, Clone, PartialEq)]
pub struct SweepParams {
    pub size: f64,
    pub axis: Axis,
    pub twist_step: f64,
    pub radial_step: f64,
    pub translation_step: f64,
    pub layer_gap: f64,
    pub base_offset: f64,
    /// Per-layer scale overrides; `None` entries use the radial step
    pub scales: Option<Vec<Option<f64>>>,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            size: 1.0,
            axis: Axis::Y,
            twist_step: GOLDEN_ANGLE,
            radial_step: 0.12,
            translation_step: 0.01,
            layer_gap: 0.065,
            base_offset: 0.01,
            scales: None,
        }
    }
}

impl SweepParams {
    pub fn from_options(options: &ShapeOptions) -> Result<Self> {
        let defaults = Self::default();
        let axis = match options.get("axisKey").and_then(|v| v.as_str()) {
            Some(key) => Axis::from_key(key).ok_or_else(|| {
                polyframe_geometry::Error::invalid(format!("axisKey must be x, y or z, got {:?}", key))
            })?,
            None => defaults.axis,
        };
        Ok(Self {
            size: parse_size(options)?,
            axis,
            twist_step: finite(options, "twistStep", defaults.twist_step)?,
            radial_step: finite(options, "radialStep", defaults.radial_step)?,
            translation_step: finite(options, "translationStep", defaults.translation_step)?,
            layer_gap: finite(options, "layerGap", defaults.layer_gap)?,
            base_offset: finite(options, "baseOffset", defaults.base_offset)?,
            scales: options.f64_list("scales"),
        })
    }

    /// Outer cube scale of layer `k`, before `size`
    pub fn layer_scale(&self, k: usize) -> f64 {
        self.scales
            .as_ref()
            .and_then(|scales| scales.get(k).copied().flatten())
            .unwrap_or(1.0 - k as f64 * self.radial_step)
    }

    /// Outer and inner cube placement of layer `k`
    pub fn layer_transforms(&self, k: usize) -> Result<(Transform, Transform)> {
        let scale = self.layer_scale(k) * self.size;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(polyframe_geometry::Error::invalid(format!(
                "layer {} scale must be positive, got {}",
                k, scale
            ))
            .into());
        }

        let axis = self.axis.unit();
        let shift = self.base_offset + k as f64 * self.translation_step;
        let twisted = Transform::identity().rotate(axis, k as f64 * self.twist_step);
        let outer = twisted.uniform_scale(scale).translate(axis * shift);
        let inner = twisted
            .uniform_scale(scale * 0.5)
            .translate(axis * (shift + self.layer_gap));
        Ok((outer, inner))
    }
}

/// Builds `cpd-megatesseract-2` … `cpd-megatesseract-6`
pub struct MegaTesseractBuilder;

impl MegaTesseractBuilder {
    pub fn sweep(layers: usize, params: &SweepParams) -> Result<GeometryBuffer> {
        let cube = build_base(BaseSolid::Cube, 1.0);
        let mut components = Vec::with_capacity(layers * 2);
        for k in 0..layers {
            let (outer, inner) = params.layer_transforms(k)?;
            components.push(Component::new(cube.clone(), outer));
            components.push(Component::new(cube.clone(), inner));
        }

        let merged = assemble(&components);
        let tags = merged
            .tags()
            .clone()
            .with_size(params.size)
            .with_variant(format!("megatesseract-{}", layers));
        Ok(merged.with_tags(tags))
    }
}

impl ShapeBuilder for MegaTesseractBuilder {
    fn build(&self, shape: ShapeId, options: &ShapeOptions, _config: &GeometryConfig) -> Result<GeometryBuffer> {
        let layers = shape
            .sweep_layers()
            .ok_or_else(|| Error::UnknownShape(shape.as_str().to_string()))?;
        let params = SweepParams::from_options(options)?;
        tracing::debug!(
            shape = %shape,
            layers,
            axis = ?params.axis,
            layer_gap = params.layer_gap,
            "Building mega-tesseract sweep"
        );
        Self::sweep(layers, &params)
    }

    fn supported_shapes(&self) -> Vec<ShapeId> {
        vec![
            ShapeId::MegaTesseract2,
            ShapeId::MegaTesseract3,
            ShapeId::MegaTesseract4,
            ShapeId::MegaTesseract5,
            ShapeId::MegaTesseract6,
        ]
    }
}
