// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Generation settings, optionally loaded from environment variables.

use polyframe_geometry::hyperframe::HyperframeOptions;
use polyframe_geometry::wireframe::{
    EdgeMode, WireframeOptions, DEFAULT_GRID_THRESHOLD, MAX_TOLERANCE_DIGITS,
};
use polyframe_geometry::{DEFAULT_INNER_SCALE, DEFAULT_THICKNESS, DEFAULT_TOLERANCE_DIGITS};
use std::str::FromStr;

/// Settings shared by every build of a [`crate::GeometryService`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryConfig {
    /// Decimal digits used for edge keys.
    pub edge_tolerance_digits: u32,
    /// Thickness written into every wireframe segment.
    pub wireframe_thickness: f64,
    /// Inner shell scale of canonical hyperframes.
    pub hyperframe_inner_scale: f64,
    /// Maximum spiral core lines of a generic hyperframe.
    pub hyperframe_max_core_lines: usize,
    /// Maximum curved connectors of a generic hyperframe.
    pub hyperframe_max_connectors: usize,
    /// Maximum cached shapes, `None` for unbounded.
    pub cache_capacity: Option<usize>,
    /// Vertex count from which nearest-vertex lookups use a spatial grid, `None` to always scan.
    pub spatial_index_threshold: Option<usize>,
    /// Offset between stacked surface layers to avoid z-fighting.
    pub layer_offset: f64,
}

impl GeometryConfig {
    /// Load configuration from `POLYFRAME_*` environment variables.
    ///
    /// Unset or unparsable variables keep their default. A capacity or
    /// threshold of `0` disables the limit. Tolerance digits are clamped to
    /// [`MAX_TOLERANCE_DIGITS`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            edge_tolerance_digits: env_or("POLYFRAME_EDGE_TOLERANCE_DIGITS", defaults.edge_tolerance_digits)
                .min(MAX_TOLERANCE_DIGITS),
            wireframe_thickness: env_or("POLYFRAME_WIREFRAME_THICKNESS", defaults.wireframe_thickness),
            hyperframe_inner_scale: env_or("POLYFRAME_HYPERFRAME_INNER_SCALE", defaults.hyperframe_inner_scale),
            hyperframe_max_core_lines: env_or(
                "POLYFRAME_HYPERFRAME_MAX_CORE_LINES",
                defaults.hyperframe_max_core_lines,
            ),
            hyperframe_max_connectors: env_or(
                "POLYFRAME_HYPERFRAME_MAX_CONNECTORS",
                defaults.hyperframe_max_connectors,
            ),
            cache_capacity: env_limit("POLYFRAME_CACHE_CAPACITY", defaults.cache_capacity),
            spatial_index_threshold: env_limit(
                "POLYFRAME_SPATIAL_INDEX_THRESHOLD",
                defaults.spatial_index_threshold,
            ),
            layer_offset: env_or("POLYFRAME_LAYER_OFFSET", defaults.layer_offset),
        }
    }

    pub fn wireframe_options(&self) -> WireframeOptions {
        WireframeOptions {
            tolerance_digits: self.edge_tolerance_digits.min(MAX_TOLERANCE_DIGITS),
            thickness: self.wireframe_thickness,
            mode: EdgeMode::Auto,
            edge_threshold: None,
            grid_threshold: self.spatial_index_threshold,
        }
    }

    pub fn hyperframe_options(&self) -> HyperframeOptions {
        HyperframeOptions {
            inner_scale: self.hyperframe_inner_scale,
            max_core_lines: self.hyperframe_max_core_lines,
            max_connectors: self.hyperframe_max_connectors,
            tolerance_digits: self.edge_tolerance_digits.min(MAX_TOLERANCE_DIGITS),
            grid_threshold: self.spatial_index_threshold,
            ..HyperframeOptions::default()
        }
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            edge_tolerance_digits: DEFAULT_TOLERANCE_DIGITS,
            wireframe_thickness: DEFAULT_THICKNESS,
            hyperframe_inner_scale: DEFAULT_INNER_SCALE,
            hyperframe_max_core_lines: 96,
            hyperframe_max_connectors: 128,
            cache_capacity: None,
            spatial_index_threshold: Some(DEFAULT_GRID_THRESHOLD),
            layer_offset: 0.02,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_limit(name: &str, default: Option<usize>) -> Option<usize> {
    match std::env::var(name).ok().and_then(|v| v.trim().parse::<usize>().ok()) {
        Some(0) => None,
        Some(n) => Some(n),
        None => default,
    }
}
