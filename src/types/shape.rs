use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::{Island, PanelMesh};

/// Stable identifier of a shape, preserved across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub u64);

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}

/// How a shape was produced, with its world-space points.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// Closed polyline drawn on the ground grid (uses X/Z).
    Outline(Vec<Vec3>),
    /// Gap-filling triangle between three arbitrary points.
    Triangle([Vec3; 3]),
}

impl ShapeKind {
    pub fn points(&self) -> &[Vec3] {
        match self {
            ShapeKind::Outline(points) => points,
            ShapeKind::Triangle(points) => points,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Outline(_) => "outline",
            ShapeKind::Triangle(_) => "triangle",
        }
    }
}

/// Axis-aligned bounds of a shape in its own 2D plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub width: f32,
    pub height: f32,
}

impl LocalBounds {
    /// Smallest bounds containing all points. `None` for an empty slice.
    pub fn from_points(points: &[[f32; 2]]) -> Option<Self> {
        let first = points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min[0] = min[0].min(p[0]);
            min[1] = min[1].min(p[1]);
            max[0] = max[0].max(p[0]);
            max[1] = max[1].max(p[1]);
        }
        Some(Self {
            min_x: min[0],
            min_y: min[1],
            width: max[0] - min[0],
            height: max[1] - min[1],
        })
    }

    pub fn center(&self) -> [f32; 2] {
        [
            self.min_x + self.width * 0.5,
            self.min_y + self.height * 0.5,
        ]
    }
}

/// Point of a UV outline, normalized to the shape's own bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvPoint {
    pub u: f32,
    pub v: f32,
}

/// Placement of the panel mesh in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn apply(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * (local * self.scale)
    }
}

/// A flat panel together with its atlas island and UV data.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub transform: Transform,
    pub bounds: LocalBounds,
    pub island: Island,
    pub uv_outline: Vec<UvPoint>,
    pub mesh: PanelMesh,
    /// Outline corners in mesh-local space.
    pub snap_points: Vec<Vec3>,
}

impl Shape {
    /// Snap points transformed into world space.
    pub fn world_snap_points(&self) -> Vec<Vec3> {
        self.snap_points
            .iter()
            .map(|p| self.transform.apply(*p))
            .collect()
    }
}
