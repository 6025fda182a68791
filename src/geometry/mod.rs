pub mod builder;

pub use builder::{build, build_outline, build_triangle, PanelGeometry};
