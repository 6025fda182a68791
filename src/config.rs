use std::path::PathBuf;

use clap::Parser;

/// What the allocator does when no free region is left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AllocationPolicy {
    /// Fall back to `(padding, padding)` and accept the overlap.
    #[default]
    #[value(name = "best-effort")]
    BestEffort,
    /// Refuse the allocation with `AtlasError::AtlasFull`.
    #[value(name = "reject")]
    Reject,
}

impl std::fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationPolicy::BestEffort => write!(f, "best-effort"),
            AllocationPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Atlas geometry and island sizing parameters.
///
/// The atlas size is fixed for the lifetime of a workspace.
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    /// Edge length of the square atlas in pixels.
    pub size: u32,
    /// Minimum gap kept between islands by the allocator and auto-packer.
    pub padding: u32,
    /// Candidate grid used by the allocator.
    pub grid_step: u32,
    /// Texture pixels per world unit when sizing a new island.
    pub pixels_per_unit: f32,
    /// Smallest island edge.
    pub min_island: u32,
    /// Island edges are rounded up to a multiple of this.
    pub island_quantum: u32,
    /// Edge length of exported guide images.
    pub export_size: u32,
    pub policy: AllocationPolicy,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            size: 512,
            padding: 8,
            grid_step: 16,
            pixels_per_unit: 32.0,
            min_island: 32,
            island_quantum: 16,
            export_size: 1024,
            policy: AllocationPolicy::BestEffort,
        }
    }
}

impl AtlasConfig {
    /// Largest island edge: the atlas minus padding on both sides.
    pub fn max_island(&self) -> u32 {
        self.size.saturating_sub(self.padding.saturating_mul(2)).max(1)
    }

    /// Pixel size of an island for a shape extent given in world units,
    /// clamped to `[min_island, max_island]`.
    pub fn island_extent(&self, extent: f32) -> u32 {
        let quantum = self.island_quantum.max(1) as f32;
        let quantized = ((extent * self.pixels_per_unit / quantum).ceil() * quantum) as u32;
        quantized.max(self.min_island).min(self.max_island())
    }
}

/// Island editor defaults.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Paint palette as `#rrggbb` strings.
    pub palette: Vec<String>,
    pub default_color: String,
    pub brush_size: u32,
    pub grid_snap: u32,
    /// Undo steps kept by `History`.
    pub max_history: usize,
    /// World-space distance for vertex snapping.
    pub snap_threshold: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            palette: [
                "#ffffff", "#ffadad", "#ffd6a5", "#fdffb6", "#caffbf", "#9bf6ff", "#a0c4ff",
                "#bdb2ff", "#ffc6ff", "#555555", "#000000",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            default_color: "#000000".into(),
            brush_size: 1,
            grid_snap: 16,
            max_history: 10,
            snap_threshold: 1.0,
        }
    }
}

/// Fully resolved batch configuration (constructed from CLI args).
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub texture: Option<PathBuf>,
    pub guide: Option<PathBuf>,
    pub auto_pack: bool,
    pub dry_run: bool,
    pub verbose: bool,
    /// Worker threads for background decoding (default: rayon's choice).
    pub threads: Option<usize>,
    pub atlas: AtlasConfig,
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(
    name = "cardboard-atlas",
    about = "Texture atlas packing and UV mapping for cardboard panel projects",
    version
)]
pub struct CliArgs {
    /// Project file (JSON)
    #[arg(short = 'i', long)]
    pub input: PathBuf,

    /// Write the resulting project to this file
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Image to import into the atlas (scaled to atlas size)
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Repack every island with the shelf packer
    #[arg(long)]
    pub auto_pack: bool,

    /// Write a PNG with island borders and UV outlines
    #[arg(long)]
    pub guide: Option<PathBuf>,

    /// Guide image edge length in pixels
    #[arg(long, default_value_t = 1024)]
    pub guide_size: u32,

    /// Gap between islands in pixels
    #[arg(long, default_value_t = 8)]
    pub padding: u32,

    /// Allocator candidate grid in pixels
    #[arg(long, default_value_t = 16)]
    pub grid_step: u32,

    /// Fail instead of overlapping when the atlas is full
    #[arg(long)]
    pub strict_packing: bool,

    /// Print a project summary and exit without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Number of worker threads (default: all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl From<CliArgs> for PipelineConfig {
    fn from(args: CliArgs) -> Self {
        let policy = if args.strict_packing {
            AllocationPolicy::Reject
        } else {
            AllocationPolicy::BestEffort
        };

        PipelineConfig {
            input: args.input,
            output: args.output,
            texture: args.texture,
            guide: args.guide,
            auto_pack: args.auto_pack,
            dry_run: args.dry_run,
            verbose: args.verbose,
            threads: args.threads,
            atlas: AtlasConfig {
                padding: args.padding,
                grid_step: args.grid_step.max(1),
                export_size: args.guide_size,
                policy,
                ..Default::default()
            },
        }
    }
}
