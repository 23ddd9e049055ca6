// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape builders
//!
//! Each sub-module handles one family of shape identifiers:
//!
//! - `platonic`: two-copy platonic compounds and the single dodecahedron
//! - `polytope`: nested-shell 4D projections and their compounds
//! - `surface`: parametric surfaces, the layered manifold and the torus knot
//! - `megatesseract`: layered cube sweeps
//! - `helpers`: option parsing shared by the builders

mod helpers;
mod megatesseract;
mod platonic;
mod polytope;
mod surface;

pub use megatesseract::{MegaTesseractBuilder, SweepParams};
pub use platonic::PlatonicBuilder;
pub use polytope::PolytopeBuilder;
pub use surface::SurfaceBuilder;
