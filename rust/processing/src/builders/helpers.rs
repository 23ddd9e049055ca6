// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Result;
use crate::options::ShapeOptions;
use polyframe_geometry::Error;

/// Positive finite `size` option, defaulting to 1
pub(super) fn parse_size(options: &ShapeOptions) -> Result<f64> {
    positive(options, "size", 1.0)
}

/// Positive finite numeric option
pub(super) fn positive(options: &ShapeOptions, key: &str, default: f64) -> Result<f64> {
    let value = options.f64_or(key, default);
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::invalid(format!("{} must be positive, got {}", key, value)).into())
    }
}

/// Finite numeric option
pub(super) fn finite(options: &ShapeOptions, key: &str, default: f64) -> Result<f64> {
    let value = options.f64_or(key, default);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::invalid(format!("{} must be finite, got {}", key, value)).into())
    }
}
