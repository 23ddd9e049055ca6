// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Benchmarks for shape generation and derived structures.
//!
//! Compares:
//! 1. Cold builds (fresh service, cache miss) per shape family
//! 2. Warm builds served from the cache
//! 3. Nearest-vertex lookup: linear scan vs spatial grid
//!
//! Run with: cargo bench -p polyframe-processing --bench generation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use polyframe_geometry::{nearest_vertex_index, tessellate, VertexGrid};
use polyframe_geometry::surface::klein_bottle;
use polyframe_processing::{GeometryConfig, GeometryService, ShapeOptions};

const SHAPES: [&str; 6] = [
    "icosahedron",
    "hundredtwentycell",
    "cpd-600cell",
    "kleinbottle",
    "torusknot",
    "cpd-megatesseract-6",
];

fn bench_cold_builds(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_build");
    group.sample_size(20);
    for shape in SHAPES {
        group.bench_with_input(BenchmarkId::from_parameter(shape), &shape, |b, &shape| {
            b.iter(|| {
                let service = GeometryService::new(GeometryConfig::default()).unwrap();
                black_box(service.build_geometry(shape, None))
            })
        });
    }
    group.finish();
}

fn bench_warm_builds(c: &mut Criterion) {
    let service = GeometryService::new(GeometryConfig::default()).unwrap();
    let options = ShapeOptions::new().with("size", 1.0);
    service.build_solid("cpd-600cell".parse().unwrap(), Some(&options)).unwrap();

    c.bench_function("warm_build/cpd-600cell", |b| {
        b.iter(|| black_box(service.build_solid("cpd-600cell".parse().unwrap(), Some(&options))))
    });
}

fn bench_nearest_vertex(c: &mut Criterion) {
    let buffer = tessellate(klein_bottle, 160, 80, 0.52).unwrap();
    let probes: Vec<_> = buffer.vertices().step_by(97).collect();
    let grid = VertexGrid::new(&buffer);

    let mut group = c.benchmark_group("nearest_vertex");
    group.bench_function("linear", |b| {
        b.iter(|| {
            for p in &probes {
                black_box(nearest_vertex_index(&buffer, p));
            }
        })
    });
    group.bench_function("grid", |b| {
        b.iter(|| {
            for p in &probes {
                black_box(grid.nearest(p));
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_cold_builds, bench_warm_builds, bench_nearest_vertex);
criterion_main!(benches);
