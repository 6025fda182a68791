//! Capture and restore of the whole workspace, for undo/redo and project
//! files.

pub mod codec;
pub mod history;

pub use codec::{load_project, save_project, GeometryConfig, PointRecord, ShapeRecord, Snapshot};
pub use history::History;
