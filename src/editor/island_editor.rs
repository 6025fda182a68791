use glam::Vec3;
use image::Rgba;
use tracing::debug;

use crate::config::EditorConfig;
use crate::error::Result;
use crate::raster::parse_hex_color;
use crate::types::{Island, ShapeId};
use crate::workspace::Workspace;

/// What a primary-button gesture on the atlas does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorTool {
    #[default]
    Paint,
    Move,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Idle,
    Painting,
    Dragging {
        shape: ShapeId,
        origin: (i32, i32),
        start: (u32, u32),
    },
}

/// Pointer-driven painting and island dragging on the atlas.
///
/// All coordinates are raster pixels. Out-of-range input is clipped or
/// clamped, never an error.
#[derive(Debug, Clone)]
pub struct IslandEditor {
    tool: EditorTool,
    color: Rgba<u8>,
    palette: Vec<Rgba<u8>>,
    brush: u32,
    grid_snap: u32,
    snap_threshold: f32,
    selected: Option<ShapeId>,
    gesture: Gesture,
}

impl IslandEditor {
    pub fn new(config: &EditorConfig) -> Result<Self> {
        let palette = config
            .palette
            .iter()
            .map(|hex| parse_hex_color(hex))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            tool: EditorTool::default(),
            color: parse_hex_color(&config.default_color)?,
            palette,
            brush: config.brush_size.max(1),
            grid_snap: config.grid_snap.max(1),
            snap_threshold: config.snap_threshold,
            selected: None,
            gesture: Gesture::Idle,
        })
    }

    pub fn tool(&self) -> EditorTool {
        self.tool
    }

    /// Switching tools ends any gesture in progress.
    pub fn set_tool(&mut self, tool: EditorTool) {
        self.tool = tool;
        self.gesture = Gesture::Idle;
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba<u8>) {
        self.color = color;
    }

    pub fn set_color_hex(&mut self, hex: &str) -> Result<()> {
        self.color = parse_hex_color(hex)?;
        Ok(())
    }

    pub fn palette(&self) -> &[Rgba<u8>] {
        &self.palette
    }

    /// Make palette entry `index` the paint color. `None` when out of range.
    pub fn select_swatch(&mut self, index: usize) -> Option<Rgba<u8>> {
        let color = *self.palette.get(index)?;
        self.color = color;
        Some(color)
    }

    pub fn brush_size(&self) -> u32 {
        self.brush
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.brush = size.max(1);
    }

    pub fn grid_snap(&self) -> u32 {
        self.grid_snap
    }

    /// Pull a world-space point onto the nearest panel corner within the
    /// snap threshold; points with nothing in range come back unchanged.
    pub fn snap_point(&self, workspace: &Workspace, point: Vec3) -> Vec3 {
        workspace
            .nearest_snap_point(point, self.snap_threshold)
            .unwrap_or(point)
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn select(&mut self, shape: Option<ShapeId>) {
        self.selected = shape;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// Topmost island containing the point (bounds inclusive).
    pub fn hit_test(&self, workspace: &Workspace, x: i32, y: i32) -> Option<ShapeId> {
        workspace
            .shapes()
            .rev()
            .find(|s| s.island.contains(x, y))
            .map(|s| s.id)
    }

    pub fn pointer_down(&mut self, workspace: &mut Workspace, x: i32, y: i32) {
        match self.tool {
            EditorTool::Paint => {
                self.gesture = Gesture::Painting;
                self.paint_at(workspace, x, y);
            }
            EditorTool::Move => {
                self.selected = self.hit_test(workspace, x, y);
                self.gesture = match self.selected.and_then(|id| workspace.shape(id)) {
                    Some(shape) => Gesture::Dragging {
                        shape: shape.id,
                        origin: (x, y),
                        start: (shape.island.x, shape.island.y),
                    },
                    None => Gesture::Idle,
                };
            }
        }
    }

    pub fn pointer_move(&mut self, workspace: &mut Workspace, x: i32, y: i32) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Painting => {
                self.paint_at(workspace, x, y);
            }
            Gesture::Dragging { shape, origin, start } => {
                let target_x = start.0 as i64 + (x as i64 - origin.0 as i64);
                let target_y = start.1 as i64 + (y as i64 - origin.1 as i64);
                self.move_island(workspace, shape, target_x, target_y);
            }
        }
    }

    /// Ends the current gesture. Returns `true` when a paint stroke or drag
    /// was in progress, i.e. when the caller should record history.
    pub fn pointer_up(&mut self) -> bool {
        let active = self.gesture != Gesture::Idle;
        self.gesture = Gesture::Idle;
        active
    }

    /// Stamp a `brush x brush` square centred on the point. Returns the
    /// number of pixels written.
    pub fn paint_at(&self, workspace: &mut Workspace, x: i32, y: i32) -> usize {
        let half = (self.brush / 2) as i32;
        workspace
            .raster_mut()
            .write_rect(x - half, y - half, self.brush, self.brush, self.color)
    }

    /// Snap the requested corner to the grid, clamp it inside the atlas and
    /// move the island there.
    pub fn move_island(&self, workspace: &mut Workspace, shape: ShapeId, x: i64, y: i64) -> Option<Island> {
        let size = workspace.config().size;
        let island = workspace.shape(shape)?.island;

        let x = clamp_axis(snap(x, self.grid_snap), island.width, size);
        let y = clamp_axis(snap(y, self.grid_snap), island.height, size);
        if (x, y) == (island.x, island.y) {
            return Some(island);
        }

        debug!(%shape, x, y, "Moving island");
        workspace.set_island_position(shape, x, y)
    }

    /// Flood the selected island's rectangle with the paint color.
    pub fn fill_selected(&self, workspace: &mut Workspace) -> usize {
        let Some(island) = self.selected.and_then(|id| workspace.shape(id)).map(|s| s.island) else {
            return 0;
        };
        let color = self.color;
        workspace
            .raster_mut()
            .write_rect(island.x as i32, island.y as i32, island.width, island.height, color)
    }
}

/// Round to the nearest multiple of `step`, halves rounding up.
fn snap(value: i64, step: u32) -> i64 {
    let step = step.max(1) as f64;
    ((value as f64 / step + 0.5).floor() * step) as i64
}

fn clamp_axis(value: i64, dimension: u32, size: u32) -> u32 {
    let max = size.saturating_sub(dimension) as i64;
    value.clamp(0, max) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AtlasError;
    use crate::raster::WHITE;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn square(origin: f32, side: f32) -> Vec<Vec3> {
        vec![
            Vec3::new(origin, 0.0, origin),
            Vec3::new(origin + side, 0.0, origin),
            Vec3::new(origin + side, 0.0, origin + side),
            Vec3::new(origin, 0.0, origin + side),
        ]
    }

    fn editor() -> IslandEditor {
        IslandEditor::new(&EditorConfig::default()).unwrap()
    }

    #[test]
    fn defaults_from_config() {
        let ed = editor();
        assert_eq!(ed.tool(), EditorTool::Paint);
        assert_eq!(ed.color(), Rgba([0, 0, 0, 255]));
        assert_eq!(ed.brush_size(), 1);
        assert_eq!(ed.grid_snap(), 16);
    }

    #[test]
    fn swatches_come_from_the_palette() {
        let mut ed = editor();
        assert_eq!(ed.palette().len(), 11);
        assert_eq!(ed.select_swatch(1), Some(Rgba([0xff, 0xad, 0xad, 255])));
        assert_eq!(ed.color(), Rgba([0xff, 0xad, 0xad, 255]));

        assert_eq!(ed.select_swatch(11), None);
        assert_eq!(ed.color(), Rgba([0xff, 0xad, 0xad, 255]));
    }

    #[test]
    fn bad_palette_entry_is_rejected() {
        let config = EditorConfig {
            palette: vec!["#ffffff".into(), "teal".into()],
            ..Default::default()
        };
        assert!(matches!(IslandEditor::new(&config), Err(AtlasError::Input(_))));
    }

    #[test]
    fn vertex_snap_uses_configured_threshold() {
        let mut ws = Workspace::default();
        ws.add_outline(&square(0.0, 2.0)).unwrap();
        let corner = Vec3::new(2.0, 0.05, 2.0);
        let near = Vec3::new(2.3, 0.0, 2.3);

        let snapped = editor().snap_point(&ws, near);
        assert!((snapped - corner).length() < 1e-5);

        let tight = IslandEditor::new(&EditorConfig {
            snap_threshold: 0.1,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(tight.snap_point(&ws, near), near);
    }

    #[test]
    fn snap_rounds_half_up() {
        assert_eq!(snap(53, 16), 48);
        assert_eq!(snap(10, 16), 16);
        assert_eq!(snap(8, 16), 16);
        assert_eq!(snap(7, 16), 0);
        assert_eq!(snap(-9, 16), -16);
    }

    #[test]
    fn move_snaps_to_grid() {
        let mut ws = Workspace::default();
        let id = ws.add_outline(&square(0.0, 1.0)).unwrap();
        let island = editor().move_island(&mut ws, id, 53, 10).unwrap();
        assert_eq!((island.x, island.y), (48, 16));
    }

    #[test]
    fn move_clamps_inside_atlas() {
        let mut ws = Workspace::default();
        let id = ws.add_outline(&square(0.0, 1.0)).unwrap();
        let ed = editor();

        let island = ed.move_island(&mut ws, id, -100, 10_000).unwrap();
        assert_eq!((island.x, island.y), (0, 512 - 32));
    }

    #[test]
    fn moves_stay_on_grid_or_edge() {
        let mut ws = Workspace::default();
        let id = ws.add_outline(&square(0.0, 1.5)).unwrap();
        let ed = editor();
        let island = ws.shape(id).unwrap().island;
        let max = 512 - island.width;

        for raw in (-40..600).step_by(7) {
            let moved = ed.move_island(&mut ws, id, raw, raw / 2).unwrap();
            for v in [moved.x, moved.y] {
                assert!(v <= max);
                assert!(v % 16 == 0 || v == max, "{v} off grid");
            }
        }
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let mut ws = Workspace::default();
        let a = ws.add_outline(&square(0.0, 1.0)).unwrap();
        let b = ws.add_outline(&square(3.0, 1.0)).unwrap();
        // Stack b on top of a
        ws.set_island_position(b, 8, 8).unwrap();

        let ed = editor();
        assert_eq!(ed.hit_test(&ws, 8, 8), Some(b));
        // Inclusive far edge
        assert_eq!(ed.hit_test(&ws, 40, 40), Some(b));
        assert_eq!(ed.hit_test(&ws, 41, 41), None);
        ws.remove_shape(b);
        assert_eq!(ed.hit_test(&ws, 20, 20), Some(a));
    }

    #[test]
    fn hit_test_on_oversized_panel() {
        let mut ws = Workspace::default();
        let id = ws.add_outline(&square(0.0, 2.0e8)).unwrap();
        assert_eq!(ws.shape(id).unwrap().island, Island::new(8, 8, 496, 496));

        let ed = editor();
        assert_eq!(ed.hit_test(&ws, 10, 10), Some(id));
        assert_eq!(ed.hit_test(&ws, 505, 505), None);
    }

    #[test]
    fn paint_stamp_is_centred_and_clipped() {
        let mut ws = Workspace::default();
        let mut ed = editor();
        ed.set_color(RED);
        ed.set_brush_size(4);

        assert_eq!(ed.paint_at(&mut ws, 10, 10), 16);
        // Offsets -2..2
        assert_eq!(ws.raster().read_pixel(8, 8), RED);
        assert_eq!(ws.raster().read_pixel(11, 11), RED);
        assert_eq!(ws.raster().read_pixel(12, 12), WHITE);

        // Corner stamp keeps only the in-range part
        assert_eq!(ed.paint_at(&mut ws, 0, 0), 4);
        assert_eq!(ed.paint_at(&mut ws, -50, -50), 0);
    }

    #[test]
    fn paint_stroke_follows_pointer() {
        let mut ws = Workspace::default();
        let mut ed = editor();
        ed.set_color(RED);

        ed.pointer_down(&mut ws, 5, 5);
        ed.pointer_move(&mut ws, 6, 5);
        ed.pointer_move(&mut ws, 7, 5);
        assert!(ed.pointer_up());
        assert!(!ed.pointer_up());

        for x in 5..=7 {
            assert_eq!(ws.raster().read_pixel(x, 5), RED);
        }
        // Moving without a pressed pointer paints nothing
        ed.pointer_move(&mut ws, 100, 100);
        assert_eq!(ws.raster().read_pixel(100, 100), WHITE);
    }

    #[test]
    fn drag_moves_selected_island() {
        let mut ws = Workspace::default();
        let id = ws.add_outline(&square(0.0, 1.0)).unwrap();
        let mut ed = editor();
        ed.set_tool(EditorTool::Move);

        ed.pointer_down(&mut ws, 20, 20);
        assert_eq!(ed.selected(), Some(id));
        assert!(ed.is_dragging());

        // Start (8,8) + (45,2) = (53,10) -> (48,16)
        ed.pointer_move(&mut ws, 65, 22);
        assert!(ed.pointer_up());
        let island = ws.shape(id).unwrap().island;
        assert_eq!((island.x, island.y), (48, 16));
    }

    #[test]
    fn pressing_empty_space_clears_selection() {
        let mut ws = Workspace::default();
        ws.add_outline(&square(0.0, 1.0)).unwrap();
        let mut ed = editor();
        ed.set_tool(EditorTool::Move);

        ed.pointer_down(&mut ws, 20, 20);
        ed.pointer_up();
        assert!(ed.selected().is_some());

        ed.pointer_down(&mut ws, 400, 400);
        assert_eq!(ed.selected(), None);
        assert!(!ed.is_dragging());
    }

    #[test]
    fn fill_covers_selected_island() {
        let mut ws = Workspace::default();
        let id = ws.add_outline(&square(0.0, 1.0)).unwrap();
        let mut ed = editor();
        ed.set_color(RED);
        assert_eq!(ed.fill_selected(&mut ws), 0);

        ed.select(Some(id));
        assert_eq!(ed.fill_selected(&mut ws), 32 * 32);
        assert_eq!(ws.raster().read_pixel(8, 8), RED);
        assert_eq!(ws.raster().read_pixel(39, 39), RED);
        assert_eq!(ws.raster().read_pixel(40, 40), WHITE);
    }
}
