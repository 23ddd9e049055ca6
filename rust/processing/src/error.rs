// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for shape processing
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the registry, builders and export layer
#[derive(Error, Debug)]
pub enum Error {
    #[error("Geometry error: {0}")]
    Geometry(#[from] polyframe_geometry::Error),

    #[error("Shape registry is missing builders for: {}", .0.join(", "))]
    IncompleteRegistry(Vec<String>),

    #[error("Unknown shape identifier: {0}")]
    UnknownShape(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
