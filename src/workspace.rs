//! The owned scene: every shape, its island, and the shared raster.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::atlas::{self, guide, uv_mapper, PackSummary};
use crate::config::AtlasConfig;
use crate::error::Result;
use crate::geometry::{self, PanelGeometry};
use crate::raster::{DecodeOutcome, DecodeQueue, DecodeTicket, RasterSurface};
use crate::types::{Island, Shape, ShapeId, Transform};

/// A background texture import that has finished, applied or not.
#[derive(Debug)]
pub struct TextureImport {
    pub ticket: DecodeTicket,
    pub result: Result<()>,
}

/// Shapes keyed by id plus the atlas they share.
///
/// Iteration follows id order, which is also insertion order since ids are
/// handed out monotonically and never reused.
#[derive(Debug)]
pub struct Workspace {
    config: AtlasConfig,
    raster: RasterSurface,
    shapes: BTreeMap<ShapeId, Shape>,
    next_id: u64,
    decodes: DecodeQueue,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(AtlasConfig::default())
    }
}

impl Workspace {
    pub fn new(config: AtlasConfig) -> Self {
        let raster = RasterSurface::new(config.size);
        Self {
            config,
            raster,
            shapes: BTreeMap::new(),
            next_id: 1,
            decodes: DecodeQueue::new(),
        }
    }

    pub fn config(&self) -> &AtlasConfig {
        &self.config
    }

    pub fn raster(&self) -> &RasterSurface {
        &self.raster
    }

    pub fn raster_mut(&mut self) -> &mut RasterSurface {
        &mut self.raster
    }

    /// Shapes in insertion order.
    pub fn shapes(&self) -> impl DoubleEndedIterator<Item = &Shape> {
        self.shapes.values()
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn islands(&self) -> impl Iterator<Item = &Island> {
        self.shapes.values().map(|s| &s.island)
    }

    /// Add a flat panel from a closed outline on the ground grid.
    pub fn add_outline(&mut self, points: &[Vec3]) -> Result<ShapeId> {
        let panel = geometry::build_outline(points)?;
        self.insert_panel(panel)
    }

    /// Add a triangle panel spanning three arbitrary points.
    pub fn add_triangle(&mut self, p1: Vec3, p2: Vec3, p3: Vec3) -> Result<ShapeId> {
        let panel = geometry::build_triangle(p1, p2, p3)?;
        self.insert_panel(panel)
    }

    fn insert_panel(&mut self, panel: PanelGeometry) -> Result<ShapeId> {
        let (width, height) = panel.island_size(&self.config);
        let island = atlas::allocate(width, height, self.islands(), &self.config)?;

        let id = ShapeId(self.next_id);
        self.next_id += 1;

        let shape = panel.into_shape(id, island, self.config.size);
        info!(
            %id,
            kind = shape.kind.name(),
            x = island.x,
            y = island.y,
            width,
            height,
            "Added shape"
        );
        self.shapes.insert(id, shape);
        Ok(id)
    }

    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let removed = self.shapes.remove(&id);
        if removed.is_some() {
            debug!(%id, "Removed shape");
        }
        removed
    }

    /// Replace a shape's scene transform. Snap points follow it.
    pub fn set_transform(&mut self, id: ShapeId, transform: Transform) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                shape.transform = transform;
                true
            }
            None => false,
        }
    }

    /// Move an island's top-left corner and refresh the shape's UVs.
    ///
    /// No overlap or bounds checks happen here; callers clamp.
    pub fn set_island_position(&mut self, id: ShapeId, x: u32, y: u32) -> Option<Island> {
        let size = self.config.size;
        let shape = self.shapes.get_mut(&id)?;
        shape.island.x = x;
        shape.island.y = y;
        uv_mapper::recompute_uv(shape, size);
        Some(shape.island)
    }

    /// Repack every island with the shelf packer.
    pub fn auto_pack(&mut self) -> PackSummary {
        atlas::auto_pack(self.shapes.values_mut(), &self.config)
    }

    pub fn recompute_all_uvs(&mut self) {
        let size = self.config.size;
        for shape in self.shapes.values_mut() {
            uv_mapper::recompute_uv(shape, size);
        }
    }

    /// Remove every shape. The raster is kept.
    pub fn clear_shapes(&mut self) {
        self.shapes.clear();
    }

    /// Decode `bytes` on the calling thread and replace the raster.
    pub fn import_texture(&mut self, bytes: &[u8]) -> Result<()> {
        self.raster.load_image(bytes)?;
        info!(size = self.raster.size(), "Imported texture");
        Ok(())
    }

    /// Decode `bytes` in the background. Nothing changes until
    /// [`Workspace::poll_texture_imports`] sees the result.
    pub fn queue_texture_import(&mut self, bytes: Vec<u8>) -> DecodeTicket {
        self.decodes.submit(bytes, self.config.size)
    }

    pub fn pending_texture_imports(&self) -> usize {
        self.decodes.in_flight()
    }

    /// Apply every finished background decode, in completion order.
    pub fn poll_texture_imports(&mut self) -> Vec<TextureImport> {
        self.decodes
            .try_drain()
            .into_iter()
            .map(|outcome| self.apply_decode(outcome))
            .collect()
    }

    /// Block until every queued decode has been applied, waiting at most
    /// `timeout` for each one.
    pub fn wait_texture_imports(&mut self, timeout: Duration) -> Vec<TextureImport> {
        let mut applied = Vec::new();
        while let Some(outcome) = self.decodes.wait_next(timeout) {
            applied.push(self.apply_decode(outcome));
        }
        applied
    }

    fn apply_decode(&mut self, outcome: DecodeOutcome) -> TextureImport {
        let DecodeOutcome { ticket, result } = outcome;
        let result = match result {
            Ok(image) => {
                self.raster.replace(image);
                info!(ticket = ticket.0, "Applied texture import");
                Ok(())
            }
            Err(e) => {
                warn!(ticket = ticket.0, %e, "Texture import failed");
                Err(e)
            }
        };
        TextureImport { ticket, result }
    }

    /// Closest world-space snap point within `threshold` of `point`.
    pub fn nearest_snap_point(&self, point: Vec3, threshold: f32) -> Option<Vec3> {
        self.shapes
            .values()
            .flat_map(|s| s.world_snap_points())
            .map(|p| (p.distance(point), p))
            .filter(|(d, _)| *d < threshold)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, p)| p)
    }

    /// Guide overlay at `export_size`.
    pub fn render_guide(&self, export_size: u32) -> RgbaImage {
        guide::render_guide(&self.raster, self.shapes.values(), export_size, &guide::GuideStyle::default())
    }

    /// Write the guide overlay at the configured export size.
    pub fn write_guide(&self, path: &Path) -> Result<()> {
        guide::write_guide(path, &self.raster, self.shapes.values(), self.config.export_size)
    }

    /// Swap in a fully built scene. Ids stay monotonic across the swap.
    pub(crate) fn install(&mut self, shapes: Vec<Shape>, raster: Option<RgbaImage>) {
        let max_id = shapes.iter().map(|s| s.id.0).max().unwrap_or(0);
        self.next_id = self.next_id.max(max_id + 1);
        self.shapes = shapes.into_iter().map(|s| (s.id, s)).collect();
        if let Some(image) = raster {
            self.raster.replace(image);
        }
        debug!(shapes = self.shapes.len(), "Installed scene");
    }

    /// Id the next added shape will get.
    pub(crate) fn peek_next_id(&self) -> u64 {
        self.next_id
    }
}
