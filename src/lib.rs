pub mod atlas;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod raster;
pub mod snapshot;
pub mod types;
pub mod workspace;

pub use config::{AllocationPolicy, AtlasConfig, EditorConfig, PipelineConfig};
pub use editor::{EditorTool, IslandEditor};
pub use error::{AtlasError, Result};
pub use pipeline::Pipeline;
pub use raster::RasterSurface;
pub use snapshot::{History, Snapshot};
pub use types::{Island, PanelMesh, Shape, ShapeId, ShapeKind};
pub use workspace::Workspace;
