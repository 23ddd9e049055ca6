// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shape identifiers and the builder registry.

use crate::builders::{MegaTesseractBuilder, PlatonicBuilder, PolytopeBuilder, SurfaceBuilder};
use crate::config::GeometryConfig;
use crate::error::{Error, Result};
use crate::options::ShapeOptions;
use polyframe_geometry::GeometryBuffer;
use rustc_hash::FxHashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Closed enumeration of buildable shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeId {
    Tetrahedron,
    Box,
    Octahedron,
    Icosahedron,
    Dodecahedron,
    Tesseract,
    SixteenCell,
    TwentyFourCell,
    HundredTwentyCell,
    SixHundredCell,
    HessianPolychoron,
    KleinBottle,
    MobiusStrip,
    RomanSurface,
    QuantumManifold,
    TorusKnot,
    CompoundTesseract,
    Compound600Cell,
    MegaTesseract2,
    MegaTesseract3,
    MegaTesseract4,
    MegaTesseract5,
    MegaTesseract6,
}

impl ShapeId {
    pub const ALL: [ShapeId; 23] = [
        ShapeId::Tetrahedron,
        ShapeId::Box,
        ShapeId::Octahedron,
        ShapeId::Icosahedron,
        ShapeId::Dodecahedron,
        ShapeId::Tesseract,
        ShapeId::SixteenCell,
        ShapeId::TwentyFourCell,
        ShapeId::HundredTwentyCell,
        ShapeId::SixHundredCell,
        ShapeId::HessianPolychoron,
        ShapeId::KleinBottle,
        ShapeId::MobiusStrip,
        ShapeId::RomanSurface,
        ShapeId::QuantumManifold,
        ShapeId::TorusKnot,
        ShapeId::CompoundTesseract,
        ShapeId::Compound600Cell,
        ShapeId::MegaTesseract2,
        ShapeId::MegaTesseract3,
        ShapeId::MegaTesseract4,
        ShapeId::MegaTesseract5,
        ShapeId::MegaTesseract6,
    ];

    /// Shape used when an identifier is unknown or its build fails
    pub const DEFAULT: ShapeId = ShapeId::Icosahedron;

    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeId::Tetrahedron => "tetrahedron",
            ShapeId::Box => "box",
            ShapeId::Octahedron => "octahedron",
            ShapeId::Icosahedron => "icosahedron",
            ShapeId::Dodecahedron => "dodecahedron",
            ShapeId::Tesseract => "tesseract",
            ShapeId::SixteenCell => "sixteencell",
            ShapeId::TwentyFourCell => "twentyfourcell",
            ShapeId::HundredTwentyCell => "hundredtwentycell",
            ShapeId::SixHundredCell => "sixhundredcell",
            ShapeId::HessianPolychoron => "hessianpolychoron",
            ShapeId::KleinBottle => "kleinbottle",
            ShapeId::MobiusStrip => "mobiusstrip",
            ShapeId::RomanSurface => "romansurface",
            ShapeId::QuantumManifold => "quantummanifold",
            ShapeId::TorusKnot => "torusknot",
            ShapeId::CompoundTesseract => "cpd-tesseract",
            ShapeId::Compound600Cell => "cpd-600cell",
            ShapeId::MegaTesseract2 => "cpd-megatesseract-2",
            ShapeId::MegaTesseract3 => "cpd-megatesseract-3",
            ShapeId::MegaTesseract4 => "cpd-megatesseract-4",
            ShapeId::MegaTesseract5 => "cpd-megatesseract-5",
            ShapeId::MegaTesseract6 => "cpd-megatesseract-6",
        }
    }

    /// Layer count of the mega-tesseract sweeps
    pub fn sweep_layers(&self) -> Option<usize> {
        match self {
            ShapeId::MegaTesseract2 => Some(2),
            ShapeId::MegaTesseract3 => Some(3),
            ShapeId::MegaTesseract4 => Some(4),
            ShapeId::MegaTesseract5 => Some(5),
            ShapeId::MegaTesseract6 => Some(6),
            _ => None,
        }
    }
}

impl FromStr for ShapeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        ShapeId::ALL
            .into_iter()
            .find(|id| id.as_str() == needle)
            .ok_or_else(|| Error::UnknownShape(s.to_string()))
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape builder trait
/// Each builder handles one family of shapes
pub trait ShapeBuilder: Send + Sync {
    /// Build the solid for `shape`
    fn build(&self, shape: ShapeId, options: &ShapeOptions, config: &GeometryConfig) -> Result<GeometryBuffer>;

    /// Get supported shapes
    fn supported_shapes(&self) -> Vec<ShapeId>;
}

/// Shape registry - routes identifiers to builders
pub struct ShapeRegistry {
    builders: FxHashMap<ShapeId, Arc<dyn ShapeBuilder>>,
}

impl ShapeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            builders: FxHashMap::default(),
        }
    }

    /// Registry with every built-in family, checked for completeness
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(PlatonicBuilder));
        registry.register(Box::new(PolytopeBuilder));
        registry.register(Box::new(SurfaceBuilder));
        registry.register(Box::new(MegaTesseractBuilder));
        registry.validate()?;
        Ok(registry)
    }

    /// Register a builder for all of its supported shapes, replacing earlier ones
    pub fn register(&mut self, builder: Box<dyn ShapeBuilder>) {
        let builder: Arc<dyn ShapeBuilder> = Arc::from(builder);
        for shape in builder.supported_shapes() {
            self.builders.insert(shape, Arc::clone(&builder));
        }
    }

    pub fn get(&self, shape: ShapeId) -> Option<&Arc<dyn ShapeBuilder>> {
        self.builders.get(&shape)
    }

    /// Identifiers without a builder, in enumeration order
    pub fn missing(&self) -> Vec<ShapeId> {
        ShapeId::ALL
            .into_iter()
            .filter(|id| !self.builders.contains_key(id))
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::IncompleteRegistry(
                missing.iter().map(|id| id.as_str().to_string()).collect(),
            ))
        }
    }

    pub fn build(&self, shape: ShapeId, options: &ShapeOptions, config: &GeometryConfig) -> Result<GeometryBuffer> {
        let builder = self
            .get(shape)
            .ok_or_else(|| Error::UnknownShape(shape.as_str().to_string()))?;
        builder.build(shape, options, config)
    }
}

impl Default for ShapeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
