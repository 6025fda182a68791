pub mod island;
pub mod mesh;
pub mod shape;

pub use island::Island;
pub use mesh::PanelMesh;
pub use shape::{LocalBounds, Shape, ShapeId, ShapeKind, Transform, UvPoint};
