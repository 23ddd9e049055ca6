// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use polyframe_geometry::{extract_edges, nearest_vertex_index, tessellate, ShapeKind};
use polyframe_geometry::surface::klein_bottle;
use polyframe_processing::{
    GeometryCache, GeometryConfig, GeometryService, ShapeId, ShapeOptions,
};
use std::cell::Cell;

fn service() -> GeometryService {
    GeometryService::new(GeometryConfig::default()).expect("default registry is complete")
}

fn sweep_options() -> ShapeOptions {
    ShapeOptions::from_json(r#"{"translationStep":0.01,"layerGap":0.065,"baseOffset":0.01}"#)
        .unwrap()
}

/// Small option sets so every shape builds quickly
fn light_options(shape: ShapeId) -> Option<ShapeOptions> {
    match shape {
        ShapeId::KleinBottle
        | ShapeId::MobiusStrip
        | ShapeId::RomanSurface
        | ShapeId::QuantumManifold => Some(
            ShapeOptions::new()
                .with("uSegments", 24)
                .with("vSegments", 12),
        ),
        ShapeId::TorusKnot => Some(ShapeOptions::new().with("tubularSegments", 48)),
        _ => None,
    }
}

#[test]
fn test_stella_octangula_bundle() {
    let bundle = service().build_geometry("tetrahedron", None);
    assert!(!bundle.fallback);
    assert_eq!(bundle.solid.tags().component_count(), 2);
    assert_eq!(bundle.solid.vertex_count(), 2 * 4);
    assert_eq!(bundle.wireframe.len(), 12);
}

#[test]
fn test_icosahedron_compound_bundle() {
    let bundle = service().build_geometry("icosahedron", None);
    assert_eq!(bundle.solid.tags().component_count(), 2);
    assert_eq!(extract_edges(&bundle.solid, 6).len(), 60);
    // 12 canonical corners per copy, each shrunk by half
    assert_eq!(bundle.hyperframe_spokes.len(), 24);
    for spoke in &bundle.hyperframe_spokes {
        let inner = spoke.points[0].coords.norm();
        let outer = spoke.points[1].coords.norm();
        assert!((inner - 0.5 * outer).abs() < 1e-6);
    }
}

#[test]
fn test_klein_tessellation_is_deterministic() {
    let a = tessellate(klein_bottle, 160, 80, 0.52).unwrap();
    let b = tessellate(klein_bottle, 160, 80, 0.52).unwrap();
    assert_eq!(a.positions, b.positions);
    assert_eq!(a.vertex_count(), 161 * 81);
}

#[test]
fn test_unknown_shape_falls_back() {
    let service = service();
    let bundle = service.build_geometry("doesnotexist", None);
    assert!(bundle.fallback);
    assert_eq!(bundle.shape, ShapeId::DEFAULT);
    assert_eq!(bundle.requested, "doesnotexist");

    let default = service.build_geometry("icosahedron", None);
    assert_eq!(bundle.solid.positions, default.solid.positions);
}

#[test]
fn test_megatesseract_sweep_is_pure() {
    let service = service();
    let a = service.build_geometry("cpd-megatesseract-4", Some(&sweep_options()));
    // Fresh service so the second build is not a cache hit
    let b = self::service().build_geometry("cpd-megatesseract-4", Some(&sweep_options()));
    assert_eq!(a.solid.positions, b.solid.positions);
    assert_eq!(a.solid.indices, b.solid.indices);

    let wider = sweep_options().with("layerGap", 0.2);
    let c = service.build_geometry("cpd-megatesseract-4", Some(&wider));
    assert_ne!(a.solid.positions, c.solid.positions);
    assert_eq!(
        a.solid.tags().component_count(),
        c.solid.tags().component_count()
    );
}

#[test]
fn test_every_shape_builds_valid_buffers() {
    let service = service();
    for shape in ShapeId::ALL {
        let options = light_options(shape);
        let bundle = service.build_geometry(shape.as_str(), options.as_ref());
        assert!(!bundle.fallback, "{} fell back", shape);
        assert_eq!(bundle.shape, shape);

        let solid = &bundle.solid;
        assert_eq!(solid.positions.len() % 3, 0, "{}", shape);
        if let Some(indices) = &solid.indices {
            assert_eq!(indices.len() % 3, 0, "{}", shape);
        }
        assert!(solid.is_finite(), "{} has non-finite positions", shape);
        assert!(solid.validate().is_ok(), "{}", shape);
        assert!(!bundle.wireframe.is_empty(), "{} has no wireframe", shape);
        assert!(!bundle.hyperframe_core.is_empty(), "{} has no hyperframe", shape);
    }
}

#[test]
fn test_cache_builds_once_for_equal_options() {
    let cache = GeometryCache::new();
    let calls = Cell::new(0);
    let first = ShapeOptions::from_json(r#"{"size":1.5,"scale":2}"#).unwrap();
    let second = ShapeOptions::from_json(r#"{"scale":2,"size":1.5}"#).unwrap();

    let build = || -> polyframe_processing::Result<_> {
        calls.set(calls.get() + 1);
        Ok(polyframe_geometry::build_base(polyframe_geometry::BaseSolid::Cube, 1.5))
    };
    let a = cache
        .get_or_build(first.cache_key().as_deref(), build)
        .unwrap();
    let b = cache
        .get_or_build(second.cache_key().as_deref(), build)
        .unwrap();

    assert_eq!(calls.get(), 1);
    assert_eq!(a.positions, b.positions);
    assert_ne!(a.positions.as_ptr(), b.positions.as_ptr());
}

#[test]
fn test_service_cache_hits() {
    let service = service();
    service.build_geometry("box", None);
    service.build_geometry("box", Some(&ShapeOptions::new()));
    let stats = service.cache().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn test_equal_numbers_build_once() {
    let service = service();
    let int = ShapeOptions::from_json(r#"{"size":2}"#).unwrap();
    let float = ShapeOptions::from_json(r#"{"size":2.0}"#).unwrap();
    let a = service.build_geometry("box", Some(&int));
    let b = service.build_geometry("box", Some(&float));

    let stats = service.cache().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(a.solid.positions, b.solid.positions);
}

#[test]
fn test_nearest_vertex_of_buffer_points() {
    let bundle = service().build_geometry("sixhundredcell", None);
    let solid = &bundle.solid;
    for p in solid.vertices() {
        let q = solid.position(nearest_vertex_index(solid, &p).unwrap());
        assert!((p - q).abs().max() < 1e-6);
    }
}

#[test]
fn test_styling_options_do_not_change_geometry() {
    let service = service();
    let plain = service.build_geometry("kleinbottle", light_options(ShapeId::KleinBottle).as_ref());
    let styled = light_options(ShapeId::KleinBottle)
        .unwrap()
        .with("color", "#44aaff")
        .with("emissiveIntensity", 0.8);
    let styled = service.build_geometry("kleinbottle", Some(&styled));

    assert_eq!(plain.solid.positions, styled.solid.positions);
    assert_eq!(plain.solid.indices, styled.solid.indices);
}

#[test]
fn test_batch_matches_sequential() {
    let service = service();
    let requests: Vec<(String, Option<ShapeOptions>)> = ["box", "octahedron", "nope", "box"]
        .iter()
        .map(|id| (id.to_string(), None))
        .collect();
    let bundles = service.build_batch(&requests);

    assert_eq!(bundles.len(), 4);
    assert_eq!(bundles[0].shape, ShapeId::Box);
    assert_eq!(bundles[1].solid.tags().kind(), ShapeKind::Octahedron);
    assert!(bundles[2].fallback);
    assert_eq!(bundles[0].solid.positions, bundles[3].solid.positions);
}

#[test]
fn test_invalid_options_fall_back() {
    let options = ShapeOptions::new().with("size", -2.0);
    let bundle = service().build_geometry("box", Some(&options));
    assert!(bundle.fallback);
    assert_eq!(bundle.shape, ShapeId::DEFAULT);
}
