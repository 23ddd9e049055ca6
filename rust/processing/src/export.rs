// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Serializable bundle types for the scene layer.

use crate::error::Result;
use crate::service::ShapeBundle;
use polyframe_geometry::{GeometryBuffer, Point3, Polyline, ShapeTags};
use serde::{Deserialize, Serialize};

/// Shape tags as plain fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagsExport {
    pub shape_kind: String,
    pub is_compound: bool,
    pub component_count: usize,
    pub variant: Option<String>,
}

impl From<&ShapeTags> for TagsExport {
    fn from(tags: &ShapeTags) -> Self {
        Self {
            shape_kind: tags.kind().as_str().to_string(),
            is_compound: tags.is_compound(),
            component_count: tags.component_count(),
            variant: tags.variant().map(str::to_string),
        }
    }
}

/// Flat attribute arrays ready for upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferExport {
    pub positions: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uvs: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<u32>>,
    pub tags: TagsExport,
}

impl From<&GeometryBuffer> for BufferExport {
    fn from(buffer: &GeometryBuffer) -> Self {
        Self {
            positions: buffer.positions.clone(),
            normals: buffer.normals.clone(),
            uvs: buffer.uvs.clone(),
            indices: buffer.indices.clone(),
            tags: buffer.tags().into(),
        }
    }
}

/// One thick-line wireframe segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentExport {
    pub start_index: usize,
    pub end_index: usize,
    pub length: f64,
    pub thickness: f64,
    pub start: [f64; 3],
    pub end: [f64; 3],
}

/// Complete bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleExport {
    pub shape: String,
    pub requested: String,
    pub fallback: bool,
    pub solid: BufferExport,
    pub wireframe: Vec<SegmentExport>,
    pub hyperframe_core: Vec<Vec<[f64; 3]>>,
    pub hyperframe_spokes: Vec<Vec<[f64; 3]>>,
}

fn point(p: &Point3<f64>) -> [f64; 3] {
    [p.x, p.y, p.z]
}

fn polylines(lines: &[Polyline]) -> Vec<Vec<[f64; 3]>> {
    lines
        .iter()
        .map(|line| line.points.iter().map(point).collect())
        .collect()
}

impl From<&ShapeBundle> for BundleExport {
    fn from(bundle: &ShapeBundle) -> Self {
        let wireframe = bundle
            .wireframe
            .edges
            .iter()
            .zip(&bundle.wireframe.segments)
            .map(|(edge, segment)| SegmentExport {
                start_index: segment.start_index,
                end_index: segment.end_index,
                length: segment.length,
                thickness: segment.thickness,
                start: point(&edge.start),
                end: point(&edge.end),
            })
            .collect();

        Self {
            shape: bundle.shape.as_str().to_string(),
            requested: bundle.requested.clone(),
            fallback: bundle.fallback,
            solid: (&bundle.solid).into(),
            wireframe,
            hyperframe_core: polylines(&bundle.hyperframe_core),
            hyperframe_spokes: polylines(&bundle.hyperframe_spokes),
        }
    }
}

impl BundleExport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeometryConfig;
    use crate::service::GeometryService;

    #[test]
    fn test_export_shape() {
        let service = GeometryService::new(GeometryConfig::default()).unwrap();
        let bundle = service.build_geometry("octahedron", None);
        let export = BundleExport::from(&bundle);

        assert_eq!(export.shape, "octahedron");
        assert_eq!(export.solid.tags.shape_kind, "octahedron");
        assert_eq!(export.solid.tags.component_count, 2);
        assert_eq!(export.wireframe.len(), 24);
        assert_eq!(export.hyperframe_spokes.len(), 12);

        let json = export.to_json().unwrap();
        assert!(json.contains("\"hyperframeCore\""));
        assert!(json.contains("\"startIndex\""));
        assert!(!json.contains("\"uvs\""));
    }
}
