// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape processing pipeline shared by the CLI and embedders.
//!
//! A shape identifier plus an options record goes through the
//! [`ShapeRegistry`], the result is memoized in a [`GeometryCache`] owned by
//! a [`GeometryService`], and the service derives the wireframe and
//! hyperframe that complete a [`ShapeBundle`].

pub mod builders;
pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod options;
pub mod registry;
pub mod service;

pub use cache::{CacheStats, GeometryCache};
pub use config::GeometryConfig;
pub use error::{Error, Result};
pub use export::BundleExport;
pub use options::{ShapeOptions, DEFAULT_OPTIONS_KEY};
pub use registry::{ShapeBuilder, ShapeId, ShapeRegistry};
pub use service::{GeometryService, ShapeBundle};
