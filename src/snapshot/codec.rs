use std::collections::BTreeSet;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use glam::Vec3;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::atlas;
use crate::error::{AtlasError, Result};
use crate::geometry;
use crate::raster::codec;
use crate::types::{Island, Shape, ShapeId, ShapeKind, Transform, UvPoint};
use crate::workspace::Workspace;

const PNG_DATA_URL: &str = "data:image/png;base64,";

/// A world-space point as stored in project files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<Vec3> for PointRecord {
    fn from(p: Vec3) -> Self {
        Self { x: p.x, y: p.y, z: p.z }
    }
}

impl From<PointRecord> for Vec3 {
    fn from(p: PointRecord) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

/// How to rebuild a shape's geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryConfig {
    #[serde(rename = "cardboard")]
    Outline { points: Vec<PointRecord> },
    #[serde(rename = "fill")]
    Triangle { points: Vec<PointRecord> },
}

impl GeometryConfig {
    pub fn from_kind(kind: &ShapeKind) -> Self {
        let points = kind.points().iter().map(|p| PointRecord::from(*p)).collect();
        match kind {
            ShapeKind::Outline(_) => GeometryConfig::Outline { points },
            ShapeKind::Triangle(_) => GeometryConfig::Triangle { points },
        }
    }

    pub fn to_kind(&self) -> Result<ShapeKind> {
        match self {
            GeometryConfig::Outline { points } => {
                Ok(ShapeKind::Outline(points.iter().map(|p| Vec3::from(*p)).collect()))
            }
            GeometryConfig::Triangle { points } => match points.as_slice() {
                [a, b, c] => Ok(ShapeKind::Triangle([(*a).into(), (*b).into(), (*c).into()])),
                _ => Err(AtlasError::Snapshot(format!(
                    "fill shape needs exactly 3 points, got {}",
                    points.len()
                ))),
            },
        }
    }
}

/// One shape as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ShapeId>,
    pub geometry_config: GeometryConfig,
    #[serde(default)]
    pub transform: Transform,
    /// Records without an island get a fresh one from the allocator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_bounds: Option<Island>,
    #[serde(default, rename = "uvShape", skip_serializing_if = "Vec::is_empty")]
    pub uv_outline: Vec<UvPoint>,
}

impl ShapeRecord {
    pub fn from_shape(shape: &Shape) -> Self {
        Self {
            id: Some(shape.id),
            geometry_config: GeometryConfig::from_kind(&shape.kind),
            transform: shape.transform,
            uv_bounds: Some(shape.island),
            uv_outline: shape.uv_outline.clone(),
        }
    }
}

/// Immutable capture of every shape and the raster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub objects: Vec<ShapeRecord>,
    /// Raster as a PNG data URL. Absent in the legacy bare-array format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atlas_data: Option<String>,
}

impl Snapshot {
    pub fn capture(workspace: &Workspace) -> Result<Self> {
        let png = workspace.raster().encode_png()?;
        Ok(Self {
            objects: workspace.shapes().map(ShapeRecord::from_shape).collect(),
            atlas_data: Some(format!("{PNG_DATA_URL}{}", STANDARD.encode(png))),
        })
    }

    /// Replace the workspace's scene with this snapshot.
    ///
    /// Everything is built before anything is swapped in; on error the
    /// workspace is left exactly as it was.
    pub fn restore(&self, workspace: &mut Workspace) -> Result<()> {
        let config = workspace.config().clone();

        let raster = match &self.atlas_data {
            Some(url) => {
                let (format, bytes) = decode_data_url(url)?;
                let image = codec::decode_image_as(&bytes, format)
                    .map_err(|e| AtlasError::Snapshot(format!("corrupt atlas data: {e}")))?;
                Some(codec::fit_to_size(image, config.size))
            }
            None => None,
        };

        let max_record_id = self.objects.iter().filter_map(|r| r.id).map(|id| id.0).max();
        let mut fresh_id = workspace
            .peek_next_id()
            .max(max_record_id.map_or(0, |id| id + 1));
        let mut seen = BTreeSet::new();
        let mut shapes: Vec<Shape> = Vec::with_capacity(self.objects.len());

        for (index, record) in self.objects.iter().enumerate() {
            let kind = record.geometry_config.to_kind()?;
            let panel = geometry::build(&kind)
                .map_err(|e| AtlasError::Snapshot(format!("object {index}: {e}")))?;

            let island = match record.uv_bounds {
                Some(island) => checked_island(index, island)?,
                None => {
                    let (width, height) = panel.island_size(&config);
                    atlas::allocate(width, height, shapes.iter().map(|s| &s.island), &config)?
                }
            };

            let id = record.id.unwrap_or_else(|| {
                let id = ShapeId(fresh_id);
                fresh_id += 1;
                id
            });
            if !seen.insert(id) {
                return Err(AtlasError::Snapshot(format!("duplicate {id}")));
            }

            let mut shape = panel.into_shape(id, island, config.size);
            shape.transform = record.transform;
            if !record.uv_outline.is_empty() {
                shape.uv_outline = record.uv_outline.clone();
            }
            shapes.push(shape);
        }

        debug!(
            shapes = shapes.len(),
            raster = raster.is_some(),
            "Restoring snapshot"
        );
        workspace.install(shapes, raster);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| AtlasError::Snapshot(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| AtlasError::Snapshot(e.to_string()))
    }

    /// Parse a snapshot. A bare array of shape records is accepted as the
    /// shape list of a snapshot without raster data.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| AtlasError::Snapshot(e.to_string()))?;

        if value.is_array() {
            let objects = serde_json::from_value(value).map_err(|e| AtlasError::Snapshot(e.to_string()))?;
            Ok(Self {
                objects,
                atlas_data: None,
            })
        } else {
            serde_json::from_value(value).map_err(|e| AtlasError::Snapshot(e.to_string()))
        }
    }
}

/// Stored islands must have a positive size and edges that fit in `u32`.
fn checked_island(index: usize, island: Island) -> Result<Island> {
    if island.width == 0 || island.height == 0 {
        return Err(AtlasError::Snapshot(format!(
            "object {index}: empty island {}x{}",
            island.width, island.height
        )));
    }
    if island.x.checked_add(island.width).is_none() || island.y.checked_add(island.height).is_none() {
        return Err(AtlasError::Snapshot(format!(
            "object {index}: island at ({}, {}) overflows the atlas coordinate range",
            island.x, island.y
        )));
    }
    Ok(island)
}

/// Split a `data:<mime>;base64,<payload>` URL into its image format and bytes.
fn decode_data_url(url: &str) -> Result<(ImageFormat, Vec<u8>)> {
    let (header, payload) = url
        .split_once(',')
        .ok_or_else(|| AtlasError::Snapshot("atlas data is not a data URL".into()))?;
    let mime = header
        .strip_prefix("data:")
        .and_then(|h| h.strip_suffix(";base64"))
        .ok_or_else(|| AtlasError::Snapshot(format!("unsupported atlas data header: {header}")))?;
    let format = ImageFormat::from_mime_type(mime)
        .ok_or_else(|| AtlasError::Snapshot(format!("unsupported atlas data type: {mime}")))?;
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| AtlasError::Snapshot(format!("atlas data is not valid base64: {e}")))?;
    Ok((format, bytes))
}

/// Write a snapshot as a pretty-printed JSON project file.
pub fn save_project(path: &Path, snapshot: &Snapshot) -> Result<()> {
    std::fs::write(path, snapshot.to_json_pretty()?)?;
    info!(path = %path.display(), shapes = snapshot.objects.len(), "Saved project");
    Ok(())
}

pub fn load_project(path: &Path) -> Result<Snapshot> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| AtlasError::Input(format!("Cannot read {}: {e}", path.display())))?;
    let snapshot = Snapshot::from_json(&json)?;
    info!(path = %path.display(), shapes = snapshot.objects.len(), "Loaded project");
    Ok(snapshot)
}
