// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Build one shape bundle and print it as JSON.
//!
//! Usage: `shape_dump <shape-id> [options-json] [--pretty]`
//!
//! Configuration comes from `POLYFRAME_*` environment variables, log
//! verbosity from `RUST_LOG`.

use anyhow::{bail, Context};
use polyframe_processing::{BundleExport, GeometryConfig, GeometryService, ShapeId, ShapeOptions};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,polyframe_processing=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut pretty = false;
    let mut positional = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--pretty" => pretty = true,
            "--list" => {
                for id in ShapeId::ALL {
                    println!("{}", id);
                }
                return Ok(());
            }
            _ => positional.push(arg),
        }
    }

    let Some(shape) = positional.first() else {
        bail!("usage: shape_dump <shape-id> [options-json] [--pretty] | --list");
    };
    let options = positional
        .get(1)
        .map(|json| ShapeOptions::from_json(json))
        .transpose()
        .context("options must be a JSON object")?;

    let config = GeometryConfig::from_env();
    tracing::info!(
        shape = %shape,
        tolerance_digits = config.edge_tolerance_digits,
        inner_scale = config.hyperframe_inner_scale,
        "Building shape"
    );

    let service = GeometryService::new(config)?;
    let bundle = service.build_geometry(shape, options.as_ref());
    tracing::info!(
        shape = %bundle.shape,
        fallback = bundle.fallback,
        vertices = bundle.solid.vertex_count(),
        edges = bundle.wireframe.len(),
        core = bundle.hyperframe_core.len(),
        spokes = bundle.hyperframe_spokes.len(),
        "Built bundle"
    );

    let export = BundleExport::from(&bundle);
    let json = if pretty {
        export.to_json_pretty()?
    } else {
        export.to_json()?
    };
    println!("{}", json);
    Ok(())
}
