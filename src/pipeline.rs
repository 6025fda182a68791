use std::time::{Duration, Instant};

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::{AtlasError, Result};
use crate::snapshot::{self, Snapshot};
use crate::workspace::Workspace;

const TEXTURE_DECODE_TIMEOUT: Duration = Duration::from_secs(60);

/// Summary of a completed pipeline run.
#[derive(Debug)]
pub struct ProcessingResult {
    pub shape_count: usize,
    pub duration: Duration,
}

/// Batch driver: load a project, optionally re-texture and repack it, then
/// write the project and guide image.
pub struct Pipeline;

impl Pipeline {
    pub fn run(config: &PipelineConfig) -> Result<ProcessingResult> {
        let start = Instant::now();

        info!(input = %config.input.display(), "Starting pipeline");

        info!("Stage 1/5: Load project");
        let mut workspace = Self::load(config)?;

        if config.dry_run {
            info!("--dry-run: summarizing project without writing");
            print_dry_run_summary(&workspace);
            return Ok(ProcessingResult {
                shape_count: workspace.shape_count(),
                duration: start.elapsed(),
            });
        }

        if let Some(texture) = &config.texture {
            info!(texture = %texture.display(), "Stage 2/5: Import texture");
            let bytes = std::fs::read(texture)
                .map_err(|e| AtlasError::Input(format!("Cannot read {}: {e}", texture.display())))?;
            Self::import_texture(&mut workspace, bytes)?;
        }

        if config.auto_pack {
            info!("Stage 3/5: Auto-pack");
            let summary = workspace.auto_pack();
            print_pack_summary(&workspace, summary.rows, summary.overflowed);
        }

        if let Some(output) = &config.output {
            info!(output = %output.display(), "Stage 4/5: Write project");
            let snapshot = Snapshot::capture(&workspace)?;
            snapshot::save_project(output, &snapshot)?;
        }

        if let Some(guide) = &config.guide {
            info!(guide = %guide.display(), "Stage 5/5: Write guide");
            workspace.write_guide(guide)?;
        }

        let duration = start.elapsed();
        info!(shapes = workspace.shape_count(), elapsed = ?duration, "Pipeline complete");

        Ok(ProcessingResult {
            shape_count: workspace.shape_count(),
            duration,
        })
    }

    /// Decode on the rayon pool and wait for the result.
    fn import_texture(workspace: &mut Workspace, bytes: Vec<u8>) -> Result<()> {
        let ticket = workspace.queue_texture_import(bytes);
        let imports = workspace.wait_texture_imports(TEXTURE_DECODE_TIMEOUT);
        match imports.into_iter().find(|i| i.ticket == ticket) {
            Some(import) => import.result,
            None => Err(AtlasError::Decode(format!(
                "texture decode did not finish within {}s",
                TEXTURE_DECODE_TIMEOUT.as_secs()
            ))),
        }
    }

    fn load(config: &PipelineConfig) -> Result<Workspace> {
        let snapshot = snapshot::load_project(&config.input)?;
        let mut workspace = Workspace::new(config.atlas.clone());
        snapshot.restore(&mut workspace)?;
        Ok(workspace)
    }
}

/// Share of the atlas covered by islands, in percent. Overlaps count twice.
fn coverage(workspace: &Workspace) -> f64 {
    let size = workspace.config().size as f64;
    let used: u64 = workspace.islands().map(|i| i.area()).sum();
    used as f64 / (size * size) * 100.0
}

fn print_pack_summary(workspace: &Workspace, rows: usize, overflowed: bool) {
    println!("=== Auto-pack ===");
    println!("  Rows:      {rows}");
    println!("  Coverage:  {:.1}%", coverage(workspace));
    if overflowed {
        println!("  Warning:   islands run past the atlas edge");
    }
}

fn print_dry_run_summary(workspace: &Workspace) {
    let config = workspace.config();
    println!("=== Dry Run Summary ===");
    println!("  Atlas:     {0}x{0}", config.size);
    println!("  Shapes:    {}", workspace.shape_count());
    println!("  Coverage:  {:.1}%", coverage(workspace));
    println!("  Policy:    {}", config.policy);
    for shape in workspace.shapes() {
        let island = &shape.island;
        println!(
            "  {:<10} {:<9} {:>4},{:<4} {}x{}",
            shape.id.to_string(),
            shape.kind.name(),
            island.x,
            island.y,
            island.width,
            island.height
        );
    }
}
