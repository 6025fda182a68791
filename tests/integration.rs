//! End-to-end integration tests.
//!
//! These tests build projects through the public API, run the batch
//! pipeline on them and check the files it writes.

use std::fs;
use std::path::Path;

use glam::Vec3;
use image::Rgba;

use cardboard_atlas::config::{AtlasConfig, EditorConfig, PipelineConfig};
use cardboard_atlas::snapshot::{self, History, Snapshot};
use cardboard_atlas::{EditorTool, Island, IslandEditor, Pipeline, Workspace};

fn rect(x: f32, z: f32, w: f32, h: f32) -> Vec<Vec3> {
    vec![
        Vec3::new(x, 0.0, z),
        Vec3::new(x + w, 0.0, z),
        Vec3::new(x + w, 0.0, z + h),
        Vec3::new(x, 0.0, z + h),
    ]
}

/// Write a small project with two outlines and a fill triangle to `path`.
fn write_project(path: &Path) -> Workspace {
    let mut ws = Workspace::default();
    ws.add_outline(&rect(0.0, 0.0, 2.0, 1.0)).unwrap();
    ws.add_outline(&rect(3.0, 0.0, 1.0, 3.0)).unwrap();
    ws.add_triangle(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 0.5, 1.0))
        .unwrap();
    ws.raster_mut().write_rect(0, 0, 4, 4, Rgba([255, 0, 0, 255]));

    snapshot::save_project(path, &Snapshot::capture(&ws).unwrap()).unwrap();
    ws
}

fn config_for(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        input: dir.join("project.json"),
        output: Some(dir.join("out.json")),
        ..Default::default()
    }
}

#[test]
fn pipeline_round_trips_project() {
    let tmp = tempfile::tempdir().unwrap();
    let original = write_project(&tmp.path().join("project.json"));

    let result = Pipeline::run(&config_for(tmp.path())).unwrap();
    assert_eq!(result.shape_count, 3);

    let out = snapshot::load_project(&tmp.path().join("out.json")).unwrap();
    let mut restored = Workspace::default();
    out.restore(&mut restored).unwrap();

    let islands: Vec<Island> = restored.islands().copied().collect();
    let expected: Vec<Island> = original.islands().copied().collect();
    assert_eq!(islands, expected);
    assert_eq!(restored.raster().as_raw(), original.raster().as_raw());
}

#[test]
fn pipeline_auto_packs_tallest_first() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(&tmp.path().join("project.json"));

    let config = PipelineConfig {
        auto_pack: true,
        ..config_for(tmp.path())
    };
    Pipeline::run(&config).unwrap();

    let out = snapshot::load_project(&tmp.path().join("out.json")).unwrap();
    let islands: Vec<Island> = out.objects.iter().filter_map(|r| r.uv_bounds).collect();
    // The 1x3 outline (96 px tall) leads the first shelf
    assert_eq!(islands[1], Island::new(8, 8, 32, 96));
    assert!(islands.iter().all(|i| i.y == 8));
}

#[test]
fn pipeline_imports_texture_and_writes_guide() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(&tmp.path().join("project.json"));
    let texture = tmp.path().join("paint.png");
    image::RgbaImage::from_pixel(8, 8, Rgba([0, 128, 0, 255]))
        .save(&texture)
        .unwrap();

    let config = PipelineConfig {
        texture: Some(texture),
        guide: Some(tmp.path().join("guide.png")),
        ..config_for(tmp.path())
    };
    Pipeline::run(&config).unwrap();

    let guide = image::open(tmp.path().join("guide.png")).unwrap().to_rgba8();
    assert_eq!(guide.dimensions(), (1024, 1024));
    // Far corner has no overlay, only the imported texture
    assert_eq!(guide.get_pixel(1023, 1023), &Rgba([0, 128, 0, 255]));

    let out = snapshot::load_project(&tmp.path().join("out.json")).unwrap();
    let mut restored = Workspace::default();
    out.restore(&mut restored).unwrap();
    assert_eq!(restored.raster().read_pixel(0, 0), Rgba([0, 128, 0, 255]));
}

#[test]
fn dry_run_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    write_project(&tmp.path().join("project.json"));

    let config = PipelineConfig {
        dry_run: true,
        guide: Some(tmp.path().join("guide.png")),
        ..config_for(tmp.path())
    };
    let result = Pipeline::run(&config).unwrap();

    assert_eq!(result.shape_count, 3);
    assert!(!tmp.path().join("out.json").exists());
    assert!(!tmp.path().join("guide.png").exists());
}

#[test]
fn legacy_project_is_accepted() {
    let tmp = tempfile::tempdir().unwrap();
    let legacy = r#"[
        {"geometryConfig": {"type": "cardboard", "points": [
            {"x": 0, "y": 0, "z": 0}, {"x": 2, "y": 0, "z": 0}, {"x": 2, "y": 0, "z": 2}, {"x": 0, "y": 0, "z": 2}
        ]}},
        {"geometryConfig": {"type": "fill", "points": [
            {"x": 0, "y": 0, "z": 0}, {"x": 1, "y": 0, "z": 0}, {"x": 0, "y": 1, "z": 0}
        ]}, "uvBounds": {"x": 200, "y": 200, "width": 32, "height": 32}}
    ]"#;
    fs::write(tmp.path().join("project.json"), legacy).unwrap();

    let result = Pipeline::run(&config_for(tmp.path())).unwrap();
    assert_eq!(result.shape_count, 2);

    let out = snapshot::load_project(&tmp.path().join("out.json")).unwrap();
    assert_eq!(out.objects[0].uv_bounds, Some(Island::new(8, 8, 64, 64)));
    assert_eq!(out.objects[1].uv_bounds, Some(Island::new(200, 200, 32, 32)));
    assert!(out.atlas_data.is_some());
}

#[test]
fn strict_packing_fails_on_full_atlas() {
    let tmp = tempfile::tempdir().unwrap();
    // Two 288 px islands cannot share a 512 px atlas
    let objects: Vec<String> = (0..2)
        .map(|i| {
            let x = i * 20;
            format!(
                r#"{{"geometryConfig": {{"type": "cardboard", "points": [
                    {{"x": {x}, "y": 0, "z": 0}}, {{"x": {}, "y": 0, "z": 0}}, {{"x": {}, "y": 0, "z": 9}}
                ]}}}}"#,
                x + 9,
                x + 9
            )
        })
        .collect();
    fs::write(
        tmp.path().join("project.json"),
        format!("[{}]", objects.join(",")),
    )
    .unwrap();

    let mut config = config_for(tmp.path());
    config.atlas.policy = cardboard_atlas::AllocationPolicy::Reject;
    let err = Pipeline::run(&config).unwrap_err();
    assert!(matches!(err, cardboard_atlas::AtlasError::AtlasFull { .. }));
    assert!(!tmp.path().join("out.json").exists());
}

#[test]
fn editing_session_with_undo() {
    let mut ws = Workspace::new(AtlasConfig::default());
    let editor_config = EditorConfig::default();
    let mut editor = IslandEditor::new(&editor_config).unwrap();
    let mut history = History::new(editor_config.max_history);
    history.record(&ws).unwrap();

    let id = ws.add_outline(&rect(0.0, 0.0, 1.0, 1.0)).unwrap();
    history.record(&ws).unwrap();

    // Paint a stroke across the island
    editor.set_color_hex("#ff0000").unwrap();
    editor.set_brush_size(3);
    editor.pointer_down(&mut ws, 10, 20);
    for x in 11..30 {
        editor.pointer_move(&mut ws, x, 20);
    }
    if editor.pointer_up() {
        history.record(&ws).unwrap();
    }
    assert_eq!(ws.raster().read_pixel(20, 21), Rgba([255, 0, 0, 255]));

    // Drag the island by (45, 2): (8,8) -> raw (53,10) -> snapped (48,16)
    editor.set_tool(EditorTool::Move);
    editor.pointer_down(&mut ws, 20, 20);
    editor.pointer_move(&mut ws, 65, 22);
    if editor.pointer_up() {
        history.record(&ws).unwrap();
    }
    let moved = ws.shape(id).unwrap().island;
    assert_eq!((moved.x, moved.y), (48, 16));

    // Undo the drag, then the paint
    history.undo(&mut ws).unwrap();
    assert_eq!(ws.shape(id).unwrap().island, Island::new(8, 8, 32, 32));
    history.undo(&mut ws).unwrap();
    assert_eq!(ws.raster().read_pixel(20, 21), Rgba([255, 255, 255, 255]));

    // Redo both
    history.redo(&mut ws).unwrap();
    history.redo(&mut ws).unwrap();
    assert_eq!(ws.shape(id).unwrap().island.x, 48);
    assert!(!history.can_redo());
}
